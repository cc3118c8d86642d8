use serde::Deserialize;
use uuid::Uuid;
use validator::Validate;

use crate::error::AppError;
use crate::models::{amount_or_zero, Bill};

pub fn validate_input<T: Validate>(input: &T) -> Result<(), AppError> {
    input
        .validate()
        .map_err(|errors| AppError::UnprocessableEntity(format!("Validation failed: {errors}")))
}

fn default_limit_100() -> i64 {
    100
}

pub fn clamp_limit(limit: i64) -> i64 {
    limit.clamp(1, 500)
}

#[derive(Debug, Clone, Deserialize, serde::Serialize, Validate)]
pub struct AdminLoginInput {
    #[validate(length(min = 1, max = 255))]
    pub username: String,
    #[validate(length(min = 1, max = 255))]
    pub password: String,
}

#[derive(Debug, Clone, Deserialize, serde::Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ResidentLoginInput {
    pub resident_id: Uuid,
}

#[derive(Debug, Clone, Deserialize, serde::Serialize, Validate)]
pub struct CreateResidentInput {
    #[validate(length(min = 1, max = 255))]
    pub name: String,
    #[validate(length(min = 1, max = 32))]
    pub room: String,
    #[validate(length(min = 1, max = 32))]
    pub phone: String,
    #[validate(email)]
    pub email: Option<String>,
}

#[derive(Debug, Clone, Deserialize, serde::Serialize)]
pub struct UpdateResidentInput {
    pub name: Option<String>,
    pub room: Option<String>,
    pub phone: Option<String>,
    pub email: Option<String>,
}

impl UpdateResidentInput {
    pub fn is_empty(&self) -> bool {
        self.name.is_none() && self.room.is_none() && self.phone.is_none() && self.email.is_none()
    }
}

/// Bill payload for create-or-update. Charge amounts share the zero-coercion
/// policy of the domain model, so a sparse payload is still a full bill.
#[derive(Debug, Clone, Deserialize, serde::Serialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct UpsertBillInput {
    #[validate(length(min = 1, max = 32))]
    pub month: String,
    #[validate(range(min = 2000, max = 2100))]
    pub year: i32,
    #[serde(default, deserialize_with = "amount_or_zero")]
    #[validate(range(min = 0.0))]
    pub rent: f64,
    #[serde(default, deserialize_with = "amount_or_zero")]
    #[validate(range(min = 0.0))]
    pub electricity: f64,
    #[serde(default, deserialize_with = "amount_or_zero")]
    #[validate(range(min = 0.0))]
    pub food: f64,
    #[serde(default, deserialize_with = "amount_or_zero")]
    #[validate(range(min = 0.0))]
    pub other: f64,
    #[serde(default, deserialize_with = "amount_or_zero")]
    #[validate(range(min = 0.0))]
    pub paid_amount: f64,
    #[validate(length(min = 1, max = 32))]
    pub due_date: String,
    #[serde(default)]
    pub paid_date: Option<String>,
}

impl UpsertBillInput {
    pub fn into_bill(self) -> Bill {
        Bill {
            month: self.month.trim().to_string(),
            year: self.year,
            rent: self.rent,
            electricity: self.electricity,
            food: self.food,
            other: self.other,
            paid_amount: self.paid_amount,
            due_date: self.due_date,
            paid_date: self.paid_date,
        }
    }
}

#[derive(Debug, Clone, Deserialize, serde::Serialize)]
pub struct ResidentsQuery {
    #[serde(default = "default_limit_100")]
    pub limit: i64,
}

#[derive(Debug, Clone, Deserialize, serde::Serialize)]
pub struct ResidentPath {
    pub resident_id: Uuid,
}

#[cfg(test)]
mod tests {
    use super::{clamp_limit, validate_input, UpsertBillInput};
    use serde_json::json;

    #[test]
    fn clamps_limits_into_range() {
        assert_eq!(clamp_limit(0), 1);
        assert_eq!(clamp_limit(100), 100);
        assert_eq!(clamp_limit(10_000), 500);
    }

    #[test]
    fn sparse_bill_payload_fills_amounts_with_zero() {
        let input: UpsertBillInput = serde_json::from_value(json!({
            "month": "November",
            "year": 2024,
            "rent": 5000,
            "dueDate": "2024-11-05"
        }))
        .expect("payload should deserialize");

        assert!(validate_input(&input).is_ok());
        let bill = input.into_bill();
        assert_eq!(bill.rent, 5000.0);
        assert_eq!(bill.electricity, 0.0);
        assert_eq!(bill.paid_amount, 0.0);
    }

    #[test]
    fn negative_amounts_are_rejected() {
        let input: UpsertBillInput = serde_json::from_value(json!({
            "month": "November",
            "year": 2024,
            "rent": -10,
            "dueDate": "2024-11-05"
        }))
        .expect("payload should deserialize");

        assert!(validate_input(&input).is_err());
    }
}
