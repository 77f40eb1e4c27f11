// 🔁 Transfer Protocol - debit one ledger, then credit another
//
// Order is fixed: the source is debited first and the destination is only
// credited after the debit succeeded. A rejected transfer leaves both
// balances bit-for-bit unchanged.

use serde::{Deserialize, Serialize};

use crate::entities::{check_amount, Ledger, RecordId};
use crate::error::{RegistryError, ValidationError};
use crate::registry::Registry;

/// Balances after a successful transfer
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Transfer {
    pub amount: f64,
    pub source_balance: f64,
    pub destination_balance: f64,
}

/// Move `amount` from `source` to `destination`
pub fn transfer(
    source: &mut dyn Ledger,
    destination: &mut dyn Ledger,
    amount: f64,
) -> Result<Transfer, ValidationError> {
    check_amount(amount)?;

    let before = source.balance();
    source.withdraw(amount)?;

    if let Err(err) = destination.deposit(amount) {
        *source.balance_mut() = before;
        return Err(err);
    }

    tracing::debug!(amount, "transfer applied");

    Ok(Transfer {
        amount,
        source_balance: source.balance(),
        destination_balance: destination.balance(),
    })
}

/// Transfer between records held by two different registries
pub fn between(
    source_registry: &mut Registry,
    from: RecordId,
    destination_registry: &mut Registry,
    to: RecordId,
    amount: f64,
) -> Result<Transfer, RegistryError> {
    let source = source_registry
        .find_by_id_mut(from)
        .ok_or(RegistryError::NotFound { id: from })?
        .as_ledger_mut()
        .ok_or(ValidationError::NoBalance { id: from })?;

    let destination = destination_registry
        .find_by_id_mut(to)
        .ok_or(RegistryError::NotFound { id: to })?
        .as_ledger_mut()
        .ok_or(ValidationError::NoBalance { id: to })?;

    Ok(transfer(source, destination, amount)?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::entities::{AccruingRecord, MeteredRecord, PlainRecord, Record};

    #[test]
    fn test_transfer_moves_amount() {
        let mut a = PlainRecord::new(1, "A", 30, 100.0);
        let mut b = AccruingRecord::savings(2, "B", 20.0, 0.01);

        let receipt = transfer(&mut a, &mut b, 30.0).unwrap();

        assert_eq!(receipt.source_balance, 70.0);
        assert_eq!(receipt.destination_balance, 50.0);
        assert_eq!(a.balance(), 70.0);
        assert_eq!(b.balance(), 50.0);
    }

    #[test]
    fn test_transfer_conserves_sum() {
        let mut a = PlainRecord::new(1, "A", 30, 100.0);
        let mut b = PlainRecord::new(2, "B", 30, 0.25);
        let total = a.balance() + b.balance();

        for amount in [10.0, 0.5, 1000.0, -3.0, 0.0, 89.5] {
            let _ = transfer(&mut a, &mut b, amount);
            assert_eq!(a.balance() + b.balance(), total, "amount {amount}");
        }
    }

    #[test]
    fn test_insufficient_balance_changes_nothing() {
        let mut a = PlainRecord::new(1, "A", 30, 50.0);
        let mut b = PlainRecord::new(2, "B", 30, 255.0);

        let err = transfer(&mut a, &mut b, 1000.0).unwrap_err();

        assert!(matches!(err, ValidationError::InsufficientBalance { .. }));
        assert_eq!(a.balance().to_bits(), 50.0f64.to_bits());
        assert_eq!(b.balance().to_bits(), 255.0f64.to_bits());
    }

    #[test]
    fn test_non_positive_amount_rejected() {
        let mut a = PlainRecord::new(1, "A", 30, 50.0);
        let mut b = PlainRecord::new(2, "B", 30, 50.0);

        assert!(transfer(&mut a, &mut b, 0.0).is_err());
        assert!(transfer(&mut a, &mut b, -10.0).is_err());
        assert!(transfer(&mut a, &mut b, f64::NAN).is_err());
        assert_eq!(a.balance(), 50.0);
        assert_eq!(b.balance(), 50.0);
    }

    #[test]
    fn test_between_registries() {
        let mut left = Registry::new();
        left.add(Box::new(PlainRecord::new(1, "A", 30, 100.0)));
        let mut right = Registry::new();
        right.add(Box::new(PlainRecord::new(9, "Z", 30, 0.0)));

        between(&mut left, 1, &mut right, 9, 40.0).unwrap();

        assert_eq!(left.find_by_id(1).unwrap().value(), 60.0);
        assert_eq!(right.find_by_id(9).unwrap().value(), 40.0);
    }

    #[test]
    fn test_between_rejects_non_ledger_destination() {
        let mut left = Registry::new();
        left.add(Box::new(PlainRecord::new(1, "A", 30, 100.0)));
        let mut right = Registry::new();
        right.add(Box::new(MeteredRecord::new(2, "B", 20, 4)));

        let err = between(&mut left, 1, &mut right, 2, 40.0).unwrap_err();

        assert!(matches!(
            err,
            RegistryError::Validation(ValidationError::NoBalance { id: 2 })
        ));
        assert_eq!(left.find_by_id(1).unwrap().value(), 100.0);
    }

    #[test]
    fn test_between_missing_record() {
        let mut left = Registry::new();
        let mut right = Registry::new();
        let err = between(&mut left, 1, &mut right, 2, 1.0).unwrap_err();
        assert!(matches!(err, RegistryError::NotFound { id: 1 }));
    }
}
