//! # Token Ledger
//!
//! The account-storage substrate is an external collaborator. Issuance
//! control talks to it through [`TokenLedger`]; [`InMemoryLedger`] is the
//! in-process implementation used by tests and the offline CLI.

use std::collections::HashMap;

use parking_lot::Mutex;
use sss_core::{Address, IssuanceError};

/// Balance and freeze-state primitives of the token-account substrate.
///
/// Every mutating method either applies fully or returns an error and leaves
/// all balances unchanged.
pub trait TokenLedger: Send + Sync {
    /// Balance of `account`; 0 for an account that does not exist.
    fn balance_of(&self, account: &Address) -> u64;

    fn is_frozen(&self, account: &Address) -> bool;

    fn set_frozen(&self, account: &Address, frozen: bool);

    /// Credit newly issued units. Returns the new balance.
    fn mint_to(&self, account: &Address, amount: u64) -> Result<u64, IssuanceError>;

    /// Destroy units held by `account`. Returns the new balance.
    fn burn_from(&self, account: &Address, amount: u64) -> Result<u64, IssuanceError>;

    /// Ordinary transfer; frozen accounts may neither send nor receive.
    fn transfer(&self, from: &Address, to: &Address, amount: u64) -> Result<(), IssuanceError>;

    /// Delegate transfer that ignores the freeze state of `from`.
    fn force_transfer(&self, from: &Address, to: &Address, amount: u64) -> Result<(), IssuanceError>;
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
struct Account {
    balance: u64,
    frozen: bool,
}

/// In-memory ledger. One mutex guards all accounts, so a transfer debits and
/// credits in a single critical section.
#[derive(Debug, Default)]
pub struct InMemoryLedger {
    accounts: Mutex<HashMap<Address, Account>>,
    default_frozen: bool,
}

impl InMemoryLedger {
    pub fn new() -> Self {
        Self::default()
    }

    /// New accounts start frozen when `frozen` is set.
    pub fn with_default_frozen(frozen: bool) -> Self {
        Self {
            accounts: Mutex::new(HashMap::new()),
            default_frozen: frozen,
        }
    }

    fn fresh(&self) -> Account {
        Account {
            balance: 0,
            frozen: self.default_frozen,
        }
    }

    /// Sum of all balances.
    pub fn circulating(&self) -> u64 {
        self.accounts
            .lock()
            .values()
            .fold(0u64, |acc, a| acc.saturating_add(a.balance))
    }
}

fn frozen_error(account: &Address) -> IssuanceError {
    IssuanceError::AccountFrozen(account.to_hex())
}

impl TokenLedger for InMemoryLedger {
    fn balance_of(&self, account: &Address) -> u64 {
        self.accounts.lock().get(account).map_or(0, |a| a.balance)
    }

    fn is_frozen(&self, account: &Address) -> bool {
        self.accounts
            .lock()
            .get(account)
            .map_or(self.default_frozen, |a| a.frozen)
    }

    fn set_frozen(&self, account: &Address, frozen: bool) {
        let fresh = self.fresh();
        self.accounts.lock().entry(*account).or_insert(fresh).frozen = frozen;
    }

    fn mint_to(&self, account: &Address, amount: u64) -> Result<u64, IssuanceError> {
        let fresh = self.fresh();
        let mut accounts = self.accounts.lock();
        let entry = accounts.entry(*account).or_insert(fresh);
        if entry.frozen {
            return Err(frozen_error(account));
        }
        entry.balance = entry
            .balance
            .checked_add(amount)
            .ok_or(IssuanceError::Overflow("account balance"))?;
        Ok(entry.balance)
    }

    fn burn_from(&self, account: &Address, amount: u64) -> Result<u64, IssuanceError> {
        let mut accounts = self.accounts.lock();
        let entry = accounts.get_mut(account).ok_or(IssuanceError::InsufficientBalance {
            balance: 0,
            amount,
        })?;
        if entry.frozen {
            return Err(frozen_error(account));
        }
        if entry.balance < amount {
            return Err(IssuanceError::InsufficientBalance {
                balance: entry.balance,
                amount,
            });
        }
        entry.balance -= amount;
        Ok(entry.balance)
    }

    fn transfer(&self, from: &Address, to: &Address, amount: u64) -> Result<(), IssuanceError> {
        let fresh = self.fresh();
        let mut accounts = self.accounts.lock();
        for account in [from, to] {
            if accounts.get(account).map_or(self.default_frozen, |a| a.frozen) {
                return Err(frozen_error(account));
            }
        }
        move_balance(&mut accounts, fresh, from, to, amount)
    }

    fn force_transfer(&self, from: &Address, to: &Address, amount: u64) -> Result<(), IssuanceError> {
        let fresh = self.fresh();
        let mut accounts = self.accounts.lock();
        move_balance(&mut accounts, fresh, from, to, amount)
    }
}

/// Debit `from` and credit `to` on an already locked account map.
fn move_balance(
    accounts: &mut HashMap<Address, Account>,
    fresh: Account,
    from: &Address,
    to: &Address,
    amount: u64,
) -> Result<(), IssuanceError> {
    let balance = accounts.get(from).map_or(0, |a| a.balance);
    if balance < amount {
        return Err(IssuanceError::InsufficientBalance { balance, amount });
    }
    if from == to {
        return Ok(());
    }
    let to_balance = accounts.get(to).map_or(0, |a| a.balance);
    let credited = to_balance
        .checked_add(amount)
        .ok_or(IssuanceError::Overflow("account balance"))?;
    if let Some(source) = accounts.get_mut(from) {
        source.balance = balance - amount;
    }
    accounts.entry(*to).or_insert(fresh).balance = credited;
    Ok(())
}
