use std::collections::HashMap;

use sqlx::PgPool;
use uuid::Uuid;

use crate::db::map_db_error;
use crate::error::{AppError, AppResult};
use crate::models::{Bill, Resident};
use crate::schemas::{CreateResidentInput, UpdateResidentInput};

#[derive(Debug, sqlx::FromRow)]
struct ResidentRow {
    id: Uuid,
    name: String,
    room: String,
    phone: String,
    email: Option<String>,
    join_date: String,
}

#[derive(Debug, sqlx::FromRow)]
struct BillRow {
    resident_id: Uuid,
    month: String,
    year: i32,
    rent: f64,
    electricity: f64,
    food: f64,
    other: f64,
    paid_amount: f64,
    due_date: String,
    paid_date: Option<String>,
}

impl BillRow {
    fn into_bill(self) -> Bill {
        Bill {
            month: self.month,
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

fn assemble(row: ResidentRow, bills: Vec<Bill>) -> Resident {
    let mut resident = Resident {
        id: row.id,
        name: row.name,
        room: row.room,
        phone: row.phone,
        email: row.email,
        join_date: row.join_date,
        bills,
    };
    resident.sort_bills_newest_first();
    resident
}

pub async fn list_residents(pool: &PgPool, limit: i64) -> AppResult<Vec<Resident>> {
    let rows = sqlx::query_as::<_, ResidentRow>(
        "SELECT id, name, room, phone, email, join_date
         FROM residents
         ORDER BY created_at ASC
         LIMIT $1",
    )
    .bind(limit)
    .fetch_all(pool)
    .await
    .map_err(map_db_error)?;

    if rows.is_empty() {
        return Ok(Vec::new());
    }

    let ids = rows.iter().map(|row| row.id).collect::<Vec<_>>();
    let bill_rows = sqlx::query_as::<_, BillRow>(
        "SELECT resident_id, month, year, rent, electricity, food, other,
                paid_amount, due_date, paid_date
         FROM bills
         WHERE resident_id = ANY($1)",
    )
    .bind(&ids)
    .fetch_all(pool)
    .await
    .map_err(map_db_error)?;

    let mut bills_by_resident: HashMap<Uuid, Vec<Bill>> = HashMap::new();
    for bill_row in bill_rows {
        bills_by_resident
            .entry(bill_row.resident_id)
            .or_default()
            .push(bill_row.into_bill());
    }

    Ok(rows
        .into_iter()
        .map(|row| {
            let bills = bills_by_resident.remove(&row.id).unwrap_or_default();
            assemble(row, bills)
        })
        .collect())
}

pub async fn get_resident(pool: &PgPool, resident_id: Uuid) -> AppResult<Resident> {
    let row = sqlx::query_as::<_, ResidentRow>(
        "SELECT id, name, room, phone, email, join_date
         FROM residents
         WHERE id = $1",
    )
    .bind(resident_id)
    .fetch_optional(pool)
    .await
    .map_err(map_db_error)?
    .ok_or_else(|| AppError::NotFound("Resident not found.".to_string()))?;

    let bills = fetch_bills(pool, resident_id).await?;
    Ok(assemble(row, bills))
}

async fn fetch_bills(pool: &PgPool, resident_id: Uuid) -> AppResult<Vec<Bill>> {
    let rows = sqlx::query_as::<_, BillRow>(
        "SELECT resident_id, month, year, rent, electricity, food, other,
                paid_amount, due_date, paid_date
         FROM bills
         WHERE resident_id = $1",
    )
    .bind(resident_id)
    .fetch_all(pool)
    .await
    .map_err(map_db_error)?;

    Ok(rows.into_iter().map(BillRow::into_bill).collect())
}

pub async fn create_resident(
    pool: &PgPool,
    input: &CreateResidentInput,
    join_date: &str,
) -> AppResult<Resident> {
    let row = sqlx::query_as::<_, ResidentRow>(
        "INSERT INTO residents (name, room, phone, email, join_date)
         VALUES ($1, $2, $3, $4, $5)
         RETURNING id, name, room, phone, email, join_date",
    )
    .bind(input.name.trim())
    .bind(input.room.trim())
    .bind(input.phone.trim())
    .bind(input.email.as_deref().map(str::trim))
    .bind(join_date)
    .fetch_one(pool)
    .await
    .map_err(map_db_error)?;

    Ok(assemble(row, Vec::new()))
}

pub async fn update_resident(
    pool: &PgPool,
    resident_id: Uuid,
    updates: &UpdateResidentInput,
) -> AppResult<Resident> {
    let row = sqlx::query_as::<_, ResidentRow>(
        "UPDATE residents
         SET name = COALESCE($2, name),
             room = COALESCE($3, room),
             phone = COALESCE($4, phone),
             email = COALESCE($5, email)
         WHERE id = $1
         RETURNING id, name, room, phone, email, join_date",
    )
    .bind(resident_id)
    .bind(updates.name.as_deref().map(str::trim))
    .bind(updates.room.as_deref().map(str::trim))
    .bind(updates.phone.as_deref().map(str::trim))
    .bind(updates.email.as_deref().map(str::trim))
    .fetch_optional(pool)
    .await
    .map_err(map_db_error)?
    .ok_or_else(|| AppError::NotFound("Resident not found.".to_string()))?;

    let bills = fetch_bills(pool, resident_id).await?;
    Ok(assemble(row, bills))
}

pub async fn delete_resident(pool: &PgPool, resident_id: Uuid) -> AppResult<()> {
    let result = sqlx::query("DELETE FROM residents WHERE id = $1")
        .bind(resident_id)
        .execute(pool)
        .await
        .map_err(map_db_error)?;

    if result.rows_affected() == 0 {
        return Err(AppError::NotFound("Resident not found.".to_string()));
    }
    Ok(())
}

/// Create or replace the bill identified by (resident_id, month, year). The
/// composite primary key makes this idempotent for identical payloads and
/// guarantees one bill per month.
pub async fn upsert_bill(pool: &PgPool, resident_id: Uuid, bill: &Bill) -> AppResult<()> {
    sqlx::query(
        "INSERT INTO bills (resident_id, month, year, rent, electricity, food, other,
                            paid_amount, due_date, paid_date)
         VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10)
         ON CONFLICT (resident_id, month, year)
         DO UPDATE SET rent = EXCLUDED.rent,
                       electricity = EXCLUDED.electricity,
                       food = EXCLUDED.food,
                       other = EXCLUDED.other,
                       paid_amount = EXCLUDED.paid_amount,
                       due_date = EXCLUDED.due_date,
                       paid_date = EXCLUDED.paid_date",
    )
    .bind(resident_id)
    .bind(&bill.month)
    .bind(bill.year)
    .bind(bill.rent)
    .bind(bill.electricity)
    .bind(bill.food)
    .bind(bill.other)
    .bind(bill.paid_amount)
    .bind(&bill.due_date)
    .bind(&bill.paid_date)
    .execute(pool)
    .await
    .map_err(map_db_error)?;

    Ok(())
}

pub async fn count_residents(pool: &PgPool) -> AppResult<i64> {
    let count: (i64,) = sqlx::query_as("SELECT COUNT(*) FROM residents")
        .fetch_one(pool)
        .await
        .map_err(map_db_error)?;
    Ok(count.0)
}
