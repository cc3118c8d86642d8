//! Billing arithmetic for resident bill histories.
//!
//! Everything here is pure and infallible: malformed amounts are coerced to
//! zero when records are deserialized, so these functions only ever see
//! finite numbers and always produce one.

use crate::models::{Bill, PaymentStatus, Resident};

/// Total charge on a bill: rent + electricity + food + other.
pub fn bill_total(bill: &Bill) -> f64 {
    bill.rent + bill.electricity + bill.food + bill.other
}

/// Outstanding amount on a bill, floored at zero. Overpayment never goes
/// negative.
pub fn pending_amount(bill: &Bill) -> f64 {
    (bill_total(bill) - bill.paid_amount).max(0.0)
}

/// Three-way classification of a bill's payment state.
///
/// Paid when the running paid total has reached the bill total (a
/// zero-charge bill with no payment therefore counts as paid), partial when
/// some but not all of it has, pending when nothing has been paid.
pub fn payment_status(bill: &Bill) -> PaymentStatus {
    let total = bill_total(bill);
    if bill.paid_amount >= total {
        PaymentStatus::Paid
    } else if bill.paid_amount > 0.0 {
        PaymentStatus::Partial
    } else {
        PaymentStatus::Pending
    }
}

/// Sum of outstanding amounts across a resident's bill history.
pub fn total_pending(resident: &Resident) -> f64 {
    resident.bills.iter().map(pending_amount).sum()
}

/// Sum of outstanding amounts across every resident. Admin dashboard figure.
pub fn total_pending_across(residents: &[Resident]) -> f64 {
    residents.iter().map(total_pending).sum()
}

/// Sum of amounts actually received from a resident.
pub fn total_collected(resident: &Resident) -> f64 {
    resident.bills.iter().map(|bill| bill.paid_amount).sum()
}

/// Sum of amounts received across every resident.
pub fn total_collected_across(residents: &[Resident]) -> f64 {
    residents.iter().map(total_collected).sum()
}

/// Whether the resident has any bill that is not fully paid.
pub fn has_dues(resident: &Resident) -> bool {
    resident
        .bills
        .iter()
        .any(|bill| payment_status(bill) != PaymentStatus::Paid)
}

#[cfg(test)]
mod tests {
    use super::{
        bill_total, has_dues, payment_status, pending_amount, total_collected,
        total_pending, total_pending_across,
    };
    use crate::models::{Bill, PaymentStatus, Resident};
    use uuid::Uuid;

    fn sample_bill(paid_amount: f64) -> Bill {
        Bill {
            month: "November".to_string(),
            year: 2024,
            rent: 5000.0,
            electricity: 800.0,
            food: 3500.0,
            other: 200.0,
            paid_amount,
            due_date: "2024-11-05".to_string(),
            paid_date: None,
        }
    }

    fn resident_with(bills: Vec<Bill>) -> Resident {
        Resident {
            id: Uuid::new_v4(),
            name: "Rahul Kumar".to_string(),
            room: "101".to_string(),
            phone: "9876543210".to_string(),
            email: None,
            join_date: "2024-01-01".to_string(),
            bills,
        }
    }

    #[test]
    fn totals_sum_all_four_charge_categories() {
        assert_eq!(bill_total(&sample_bill(0.0)), 9500.0);
    }

    #[test]
    fn unpaid_bill_is_pending_with_full_amount_outstanding() {
        let bill = sample_bill(0.0);
        assert_eq!(pending_amount(&bill), 9500.0);
        assert_eq!(payment_status(&bill), PaymentStatus::Pending);
    }

    #[test]
    fn partial_payment_classifies_partial() {
        let bill = sample_bill(4000.0);
        assert_eq!(pending_amount(&bill), 5500.0);
        assert_eq!(payment_status(&bill), PaymentStatus::Partial);
    }

    #[test]
    fn full_payment_classifies_paid() {
        let bill = sample_bill(9500.0);
        assert_eq!(pending_amount(&bill), 0.0);
        assert_eq!(payment_status(&bill), PaymentStatus::Paid);
    }

    #[test]
    fn overpayment_never_goes_negative() {
        let bill = sample_bill(12000.0);
        assert_eq!(pending_amount(&bill), 0.0);
        assert_eq!(payment_status(&bill), PaymentStatus::Paid);
    }

    #[test]
    fn zero_charge_zero_payment_counts_as_paid() {
        let mut bill = sample_bill(0.0);
        bill.rent = 0.0;
        bill.electricity = 0.0;
        bill.food = 0.0;
        bill.other = 0.0;
        assert_eq!(payment_status(&bill), PaymentStatus::Paid);
        assert_eq!(pending_amount(&bill), 0.0);
    }

    #[test]
    fn resident_pending_sums_per_bill_outstanding() {
        let resident = resident_with(vec![sample_bill(4000.0), sample_bill(9500.0)]);
        assert_eq!(total_pending(&resident), 5500.0);
        assert!(has_dues(&resident));
    }

    #[test]
    fn fully_paid_resident_has_no_dues() {
        let resident = resident_with(vec![sample_bill(9500.0)]);
        assert_eq!(total_pending(&resident), 0.0);
        assert!(!has_dues(&resident));
        assert_eq!(total_collected(&resident), 9500.0);
    }

    #[test]
    fn pending_across_residents_aggregates_everyone() {
        let residents = vec![
            resident_with(vec![sample_bill(4000.0)]),
            resident_with(vec![sample_bill(9500.0)]),
            resident_with(Vec::new()),
        ];
        assert_eq!(total_pending_across(&residents), 5500.0);
    }

    #[test]
    fn lowering_payment_raises_pending_monotonically() {
        let mut bill = sample_bill(6000.0);
        let before = pending_amount(&bill);
        bill.paid_amount = 2500.0;
        assert!(pending_amount(&bill) >= before);
        bill.other += 1000.0;
        assert_eq!(pending_amount(&bill), 10500.0 - 2500.0);
    }
}
