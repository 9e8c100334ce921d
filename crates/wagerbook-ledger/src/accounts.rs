//! Account storage for the ledger host.
//!
//! [`AccountStore`] is the committed state: every address's lamport balance,
//! its rent reserve, and its typed data. [`StagedAccounts`] layers a
//! copy-on-write overlay on top of it for the duration of one transaction;
//! the overlay's writes are applied only if the transaction succeeds.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};
use wagerbook_types::{Address, EscrowRegistry, MatchRecord};

/// What an account holds besides lamports.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum AccountData {
    /// A plain key-owned balance.
    Wallet,
    /// The program's singleton escrow registry.
    Registry(EscrowRegistry),
    /// One match record; its lamports above the rent reserve are escrow.
    Match(MatchRecord),
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Account {
    pub lamports: u64,
    /// Lamports locked as storage allowance while the account exists.
    pub rent_reserve: u64,
    /// Allocated data size in bytes.
    pub space: usize,
    pub data: AccountData,
}

impl Account {
    #[must_use]
    pub fn wallet(lamports: u64) -> Self {
        Self {
            lamports,
            rent_reserve: 0,
            space: 0,
            data: AccountData::Wallet,
        }
    }

    /// Lamports that may leave the account without touching the reserve.
    #[must_use]
    pub fn spendable(&self) -> u64 {
        self.lamports.saturating_sub(self.rent_reserve)
    }

    /// Registry and match accounts belong to the program, not to a key.
    #[must_use]
    pub fn is_program_owned(&self) -> bool {
        !matches!(self.data, AccountData::Wallet)
    }
}

/// Committed account state.
#[derive(Debug, Default)]
pub struct AccountStore {
    accounts: HashMap<Address, Account>,
}

impl AccountStore {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn get(&self, address: &Address) -> Option<&Account> {
        self.accounts.get(address)
    }

    /// Credit lamports from outside the ledger (faucet). Creates a wallet
    /// if the address is new.
    ///
    /// Returns `false` (and changes nothing) if the balance would overflow.
    pub fn deposit(&mut self, address: Address, lamports: u64) -> bool {
        let account = self
            .accounts
            .entry(address)
            .or_insert_with(|| Account::wallet(0));
        match account.lamports.checked_add(lamports) {
            Some(total) => {
                account.lamports = total;
                true
            }
            None => false,
        }
    }

    /// Apply a committed overlay. `None` deletes the account.
    pub fn apply(&mut self, writes: HashMap<Address, Option<Account>>) {
        for (address, write) in writes {
            match write {
                Some(account) => {
                    self.accounts.insert(address, account);
                }
                None => {
                    self.accounts.remove(&address);
                }
            }
        }
    }

    /// Sum of every account's lamports.
    #[must_use]
    pub fn total_lamports(&self) -> u128 {
        self.accounts.values().map(|a| u128::from(a.lamports)).sum()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&Address, &Account)> {
        self.accounts.iter()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.accounts.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.accounts.is_empty()
    }
}

/// Copy-on-write view over an [`AccountStore`] for one transaction.
pub struct StagedAccounts<'a> {
    base: &'a AccountStore,
    /// `Some` = created or modified, `None` = deleted.
    writes: HashMap<Address, Option<Account>>,
}

impl<'a> StagedAccounts<'a> {
    #[must_use]
    pub fn new(base: &'a AccountStore) -> Self {
        Self {
            base,
            writes: HashMap::new(),
        }
    }

    #[must_use]
    pub fn get(&self, address: &Address) -> Option<&Account> {
        match self.writes.get(address) {
            Some(write) => write.as_ref(),
            None => self.base.get(address),
        }
    }

    /// Mutable access; the first call copies the committed account into
    /// the overlay.
    pub fn get_mut(&mut self, address: &Address) -> Option<&mut Account> {
        if !self.writes.contains_key(address) {
            let committed = self.base.get(address)?.clone();
            self.writes.insert(*address, Some(committed));
        }
        self.writes.get_mut(address).and_then(Option::as_mut)
    }

    #[must_use]
    pub fn contains(&self, address: &Address) -> bool {
        self.get(address).is_some()
    }

    pub fn put(&mut self, address: Address, account: Account) {
        self.writes.insert(address, Some(account));
    }

    /// Delete an account, returning what it held.
    pub fn remove(&mut self, address: &Address) -> Option<Account> {
        let existing = self.get(address).cloned()?;
        self.writes.insert(*address, None);
        Some(existing)
    }

    /// Every live account as seen through the overlay.
    pub fn iter(&self) -> impl Iterator<Item = (&Address, &Account)> {
        self.base
            .iter()
            .filter(|(address, _)| !self.writes.contains_key(address))
            .chain(
                self.writes
                    .iter()
                    .filter_map(|(address, write)| write.as_ref().map(|a| (address, a))),
            )
    }

    /// Net lamports created (positive) or destroyed (negative) by the
    /// staged writes. Any non-zero value is a conservation breach.
    #[must_use]
    pub fn lamport_delta(&self) -> i128 {
        self.writes
            .iter()
            .map(|(address, write)| {
                let after = write.as_ref().map_or(0, |a| i128::from(a.lamports));
                let before = self.base.get(address).map_or(0, |a| i128::from(a.lamports));
                after - before
            })
            .sum()
    }

    #[must_use]
    pub fn into_writes(self) -> HashMap<Address, Option<Account>> {
        self.writes
    }
}
