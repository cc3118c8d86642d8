use sqlx::PgPool;
use tracing::info;

use crate::error::AppResult;
use crate::models::Bill;
use crate::repository::residents as repo;
use crate::schemas::CreateResidentInput;

struct SeedResident {
    name: &'static str,
    room: &'static str,
    phone: &'static str,
    email: &'static str,
    join_date: &'static str,
    bills: Vec<Bill>,
}

/// Insert the demo residents when the database is empty. Keeps a fresh
/// deployment usable without any manual data entry.
pub async fn seed_sample_data(pool: &PgPool) -> AppResult<u32> {
    if repo::count_residents(pool).await? > 0 {
        return Ok(0);
    }

    info!("Database is empty, seeding sample residents");
    let mut created = 0;
    for seed in sample_residents() {
        let input = CreateResidentInput {
            name: seed.name.to_string(),
            room: seed.room.to_string(),
            phone: seed.phone.to_string(),
            email: Some(seed.email.to_string()),
        };
        let resident = repo::create_resident(pool, &input, seed.join_date).await?;
        for bill in &seed.bills {
            repo::upsert_bill(pool, resident.id, bill).await?;
        }
        created += 1;
    }
    Ok(created)
}

fn bill(
    month: &str,
    year: i32,
    charges: [f64; 4],
    paid_amount: f64,
    due_date: &str,
    paid_date: Option<&str>,
) -> Bill {
    Bill {
        month: month.to_string(),
        year,
        rent: charges[0],
        electricity: charges[1],
        food: charges[2],
        other: charges[3],
        paid_amount,
        due_date: due_date.to_string(),
        paid_date: paid_date.map(ToOwned::to_owned),
    }
}

fn sample_residents() -> Vec<SeedResident> {
    vec![
        SeedResident {
            name: "Rahul Kumar",
            room: "101",
            phone: "9876543210",
            email: "rahul@example.com",
            join_date: "2024-01-01",
            bills: vec![
                bill(
                    "November",
                    2024,
                    [5000.0, 800.0, 3500.0, 200.0],
                    0.0,
                    "2024-11-05",
                    None,
                ),
                bill(
                    "October",
                    2024,
                    [5000.0, 750.0, 3500.0, 150.0],
                    9400.0,
                    "2024-10-05",
                    Some("2024-10-03"),
                ),
            ],
        },
        SeedResident {
            name: "Priya Sharma",
            room: "102",
            phone: "9876543211",
            email: "priya@example.com",
            join_date: "2024-02-15",
            bills: vec![
                bill(
                    "November",
                    2024,
                    [5000.0, 650.0, 3500.0, 0.0],
                    0.0,
                    "2024-11-05",
                    None,
                ),
                bill(
                    "October",
                    2024,
                    [5000.0, 700.0, 3500.0, 100.0],
                    9300.0,
                    "2024-10-05",
                    Some("2024-10-02"),
                ),
            ],
        },
        SeedResident {
            name: "Amit Patel",
            room: "103",
            phone: "9876543212",
            email: "amit@example.com",
            join_date: "2024-01-20",
            bills: vec![bill(
                "November",
                2024,
                [5000.0, 900.0, 3500.0, 500.0],
                0.0,
                "2024-11-05",
                None,
            )],
        },
    ]
}
