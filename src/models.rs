use std::collections::HashMap;
use std::fmt;

use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;
use uuid::Uuid;

/// Derived payment state of a bill. Never stored; always recomputed from
/// `paid_amount` versus the bill total.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PaymentStatus {
    Pending,
    Partial,
    Paid,
}

impl PaymentStatus {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::Partial => "partial",
            Self::Paid => "paid",
        }
    }
}

impl fmt::Display for PaymentStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Identity of a bill within a resident's history: one bill per month+year.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct BillKey {
    pub month: String,
    pub year: i32,
}

impl BillKey {
    pub fn new(month: &str, year: i32) -> Self {
        Self {
            month: month.trim().to_string(),
            year,
        }
    }

    /// 1-based calendar position of the month name, used to sort bill
    /// histories chronologically. Unknown names sort before January.
    pub fn month_number(&self) -> u32 {
        match self.month.to_ascii_lowercase().as_str() {
            "january" => 1,
            "february" => 2,
            "march" => 3,
            "april" => 4,
            "may" => 5,
            "june" => 6,
            "july" => 7,
            "august" => 8,
            "september" => 9,
            "october" => 10,
            "november" => 11,
            "december" => 12,
            _ => 0,
        }
    }
}

impl fmt::Display for BillKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.month, self.year)
    }
}

/// A monthly charge record. Charge fields are filled in at deserialization:
/// absent or non-numeric values become 0.0, so arithmetic downstream never
/// sees a hole.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Bill {
    pub month: String,
    pub year: i32,
    #[serde(default, deserialize_with = "amount_or_zero")]
    pub rent: f64,
    #[serde(default, deserialize_with = "amount_or_zero")]
    pub electricity: f64,
    #[serde(default, deserialize_with = "amount_or_zero")]
    pub food: f64,
    #[serde(default, deserialize_with = "amount_or_zero")]
    pub other: f64,
    #[serde(default, deserialize_with = "amount_or_zero")]
    pub paid_amount: f64,
    pub due_date: String,
    #[serde(default)]
    pub paid_date: Option<String>,
}

impl Bill {
    pub fn key(&self) -> BillKey {
        BillKey::new(&self.month, self.year)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Resident {
    pub id: Uuid,
    pub name: String,
    pub room: String,
    pub phone: String,
    #[serde(default)]
    pub email: Option<String>,
    pub join_date: String,
    #[serde(default)]
    pub bills: Vec<Bill>,
}

impl Resident {
    /// Bill lookup by (month, year) identity. The database enforces
    /// uniqueness of the key, so a later entry never shadows an earlier one.
    pub fn bills_by_key(&self) -> HashMap<BillKey, &Bill> {
        self.bills.iter().map(|bill| (bill.key(), bill)).collect()
    }

    /// Newest bill first, ordered by (year, calendar month).
    pub fn sort_bills_newest_first(&mut self) {
        self.bills.sort_by(|a, b| {
            let a_key = a.key();
            let b_key = b.key();
            (b_key.year, b_key.month_number()).cmp(&(a_key.year, a_key.month_number()))
        });
    }
}

pub fn amount_or_zero<'de, D>(deserializer: D) -> Result<f64, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = Option::<Value>::deserialize(deserializer)?;
    Ok(coerce_amount(raw.as_ref()))
}

/// Safe-coercion policy for charge amounts: absent, null, non-numeric and
/// NaN all degrade to zero.
pub fn coerce_amount(value: Option<&Value>) -> f64 {
    match value {
        Some(Value::Number(number)) => number
            .as_f64()
            .filter(|parsed| parsed.is_finite())
            .unwrap_or(0.0),
        Some(Value::String(text)) => text
            .trim()
            .parse::<f64>()
            .ok()
            .filter(|parsed| parsed.is_finite())
            .unwrap_or(0.0),
        _ => 0.0,
    }
}

#[cfg(test)]
mod tests {
    use super::{coerce_amount, Bill, BillKey, PaymentStatus};
    use serde_json::{json, Value};

    #[test]
    fn bill_key_equality_ignores_surrounding_whitespace() {
        assert_eq!(BillKey::new(" November ", 2024), BillKey::new("November", 2024));
        assert_ne!(BillKey::new("November", 2024), BillKey::new("November", 2025));
        assert_ne!(BillKey::new("October", 2024), BillKey::new("November", 2024));
    }

    #[test]
    fn month_numbers_cover_the_calendar() {
        assert_eq!(BillKey::new("January", 2024).month_number(), 1);
        assert_eq!(BillKey::new("december", 2024).month_number(), 12);
        assert_eq!(BillKey::new("Smarch", 2024).month_number(), 0);
    }

    #[test]
    fn missing_and_malformed_amounts_deserialize_to_zero() {
        let bill: Bill = serde_json::from_value(json!({
            "month": "November",
            "year": 2024,
            "rent": 5000,
            "electricity": null,
            "food": "not a number",
            "dueDate": "2024-11-05"
        }))
        .expect("bill should deserialize");

        assert_eq!(bill.rent, 5000.0);
        assert_eq!(bill.electricity, 0.0);
        assert_eq!(bill.food, 0.0);
        assert_eq!(bill.other, 0.0);
        assert_eq!(bill.paid_amount, 0.0);
        assert!(bill.paid_date.is_none());
    }

    #[test]
    fn coercion_handles_numeric_strings_and_nan() {
        assert_eq!(coerce_amount(Some(&json!("1200.50"))), 1200.50);
        assert_eq!(coerce_amount(Some(&json!(true))), 0.0);
        assert_eq!(coerce_amount(Some(&Value::Null)), 0.0);
        assert_eq!(coerce_amount(None), 0.0);
    }

    #[test]
    fn bills_by_key_indexes_each_month_once() {
        use super::Resident;
        use uuid::Uuid;

        let bill = |month: &str| Bill {
            month: month.to_string(),
            year: 2024,
            rent: 5000.0,
            electricity: 0.0,
            food: 0.0,
            other: 0.0,
            paid_amount: 0.0,
            due_date: "2024-11-05".to_string(),
            paid_date: None,
        };
        let resident = Resident {
            id: Uuid::new_v4(),
            name: "Amit Patel".to_string(),
            room: "103".to_string(),
            phone: "9876543212".to_string(),
            email: None,
            join_date: "2024-01-20".to_string(),
            bills: vec![bill("October"), bill("November")],
        };

        let index = resident.bills_by_key();
        assert_eq!(index.len(), 2);
        assert!(index.contains_key(&BillKey::new("November", 2024)));
        assert!(!index.contains_key(&BillKey::new("November", 2025)));

        let mut resident = resident;
        resident.sort_bills_newest_first();
        assert_eq!(resident.bills[0].month, "November");
        assert_eq!(resident.bills[1].month, "October");
    }

    #[test]
    fn payment_status_serializes_lowercase() {
        assert_eq!(
            serde_json::to_value(PaymentStatus::Partial).unwrap(),
            json!("partial")
        );
        assert_eq!(PaymentStatus::Paid.as_str(), "paid");
    }
}
