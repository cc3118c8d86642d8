pub mod billing;
pub mod seed;
