//! Point ledger.

use std::cell::RefCell;
use std::collections::HashMap;
use std::rc::Rc;

use crate::UserId;

/// Atomic read/debit of a per-user point balance.
pub trait CostLedger {
    /// Whether a points system is present at all.
    ///
    /// When it is not, every price is treated as zero.
    fn is_available(&self) -> bool {
        true
    }

    fn balance(&self, user: UserId) -> u64;

    /// Take `amount` from the balance. Returns false, and takes nothing,
    /// when the balance is insufficient.
    fn debit(&mut self, user: UserId, amount: u64) -> bool;

    fn credit(&mut self, user: UserId, amount: u64);
}

/// Stand-in used when no points system is installed.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoLedger;

impl CostLedger for NoLedger {
    fn is_available(&self) -> bool {
        false
    }

    fn balance(&self, _user: UserId) -> u64 {
        0
    }

    fn debit(&mut self, _user: UserId, _amount: u64) -> bool {
        true
    }

    fn credit(&mut self, _user: UserId, _amount: u64) {}
}

#[derive(Debug, Clone, Default)]
pub struct MemoryLedger {
    balances: Rc<RefCell<HashMap<UserId, u64>>>,
}

impl MemoryLedger {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set_balance(&self, user: UserId, amount: u64) {
        self.balances.borrow_mut().insert(user, amount);
    }
}

impl CostLedger for MemoryLedger {
    fn balance(&self, user: UserId) -> u64 {
        self.balances.borrow().get(&user).copied().unwrap_or(0)
    }

    fn debit(&mut self, user: UserId, amount: u64) -> bool {
        let mut balances = self.balances.borrow_mut();
        let balance = balances.entry(user).or_insert(0);
        match balance.checked_sub(amount) {
            Some(rest) => {
                *balance = rest;
                true
            }
            None => false,
        }
    }

    fn credit(&mut self, user: UserId, amount: u64) {
        let mut balances = self.balances.borrow_mut();
        let balance = balances.entry(user).or_insert(0);
        *balance = balance.saturating_add(amount);
    }
}

#[cfg(test)]
mod tests {
    use uuid::Uuid;

    use super::*;

    #[test]
    fn test_debit_is_all_or_nothing() {
        let mut ledger = MemoryLedger::new();
        let user = Uuid::new_v4();
        ledger.set_balance(user, 50);

        assert!(!ledger.debit(user, 51));
        assert_eq!(ledger.balance(user), 50);

        assert!(ledger.debit(user, 50));
        assert_eq!(ledger.balance(user), 0);
    }

    #[test]
    fn test_credit_saturates() {
        let mut ledger = MemoryLedger::new();
        let user = Uuid::new_v4();
        ledger.set_balance(user, u64::MAX - 1);
        ledger.credit(user, 10);
        assert_eq!(ledger.balance(user), u64::MAX);
    }

    #[test]
    fn test_no_ledger_is_free() {
        let mut ledger = NoLedger;
        assert!(!ledger.is_available());
        assert!(ledger.debit(Uuid::new_v4(), u64::MAX));
    }
}
