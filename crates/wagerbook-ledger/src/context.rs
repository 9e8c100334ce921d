//! Per-transaction execution context handed to the program.
//!
//! Every read and write goes through the staged overlay, so a handler can
//! bail out with `?` at any point and leave the ledger untouched.

use wagerbook_types::{
    Address, EscrowRegistry, MatchRecord, Result, TxId, WagerError, constants,
};

use crate::accounts::{Account, AccountData, StagedAccounts};

pub struct InvokeContext<'a> {
    tx_id: TxId,
    signers: Vec<Address>,
    accounts: StagedAccounts<'a>,
}

impl<'a> InvokeContext<'a> {
    /// # Errors
    /// Returns `NoSigners` if `signers` is empty.
    pub fn new(tx_id: TxId, signers: Vec<Address>, accounts: StagedAccounts<'a>) -> Result<Self> {
        if signers.is_empty() {
            return Err(WagerError::NoSigners);
        }
        Ok(Self {
            tx_id,
            signers,
            accounts,
        })
    }

    #[must_use]
    pub fn tx_id(&self) -> TxId {
        self.tx_id
    }

    /// The invoking identity (first signer).
    #[must_use]
    pub fn caller(&self) -> Address {
        self.signers[0]
    }

    #[must_use]
    pub fn is_signer(&self, address: &Address) -> bool {
        self.signers.contains(address)
    }

    /// # Errors
    /// Returns `MissingSigner` if `address` did not sign the transaction.
    pub fn require_signer(&self, address: &Address) -> Result<()> {
        if self.is_signer(address) {
            Ok(())
        } else {
            Err(WagerError::MissingSigner(*address))
        }
    }

    #[must_use]
    pub fn lamports(&self, address: &Address) -> u64 {
        self.accounts.get(address).map_or(0, |a| a.lamports)
    }

    #[must_use]
    pub fn account(&self, address: &Address) -> Option<&Account> {
        self.accounts.get(address)
    }

    #[must_use]
    pub fn exists(&self, address: &Address) -> bool {
        self.accounts.contains(address)
    }

    // -----------------------------------------------------------------
    // Lamport movement
    // -----------------------------------------------------------------

    /// Move lamports out of a signer's wallet.
    ///
    /// # Errors
    /// - `MissingSigner` if `from` did not sign
    /// - `InsufficientFunds` if the wallet is missing, not a wallet, or short
    pub fn transfer(&mut self, from: &Address, to: &Address, amount: u64) -> Result<()> {
        self.require_signer(from)?;
        let source = self
            .accounts
            .get_mut(from)
            .filter(|a| !a.is_program_owned())
            .ok_or(WagerError::InsufficientFunds {
                account: *from,
                needed: amount,
                available: 0,
            })?;
        if source.lamports < amount {
            return Err(WagerError::InsufficientFunds {
                account: *from,
                needed: amount,
                available: source.lamports,
            });
        }
        source.lamports -= amount;
        self.credit(to, amount)
    }

    /// Move lamports out of a program-owned account, never below its rent
    /// reserve.
    ///
    /// # Errors
    /// - `UnknownRecord` if `from` is not a program account
    /// - `InsufficientEscrow` if the spendable balance is short
    pub fn release(&mut self, from: &Address, to: &Address, amount: u64) -> Result<()> {
        let source = self
            .accounts
            .get_mut(from)
            .filter(|a| a.is_program_owned())
            .ok_or(WagerError::UnknownRecord(*from))?;
        let available = source.spendable();
        if available < amount {
            return Err(WagerError::InsufficientEscrow {
                account: *from,
                needed: amount,
                available,
            });
        }
        source.lamports -= amount;
        self.credit(to, amount)
    }

    fn credit(&mut self, to: &Address, amount: u64) -> Result<()> {
        if let Some(dest) = self.accounts.get_mut(to) {
            dest.lamports = dest
                .lamports
                .checked_add(amount)
                .ok_or(WagerError::Overflow { context: "credit" })?;
        } else {
            self.accounts.put(*to, Account::wallet(amount));
        }
        Ok(())
    }

    // -----------------------------------------------------------------
    // Account lifecycle
    // -----------------------------------------------------------------

    /// Allocate a program account at `address`, charging `payer` the
    /// rent-exempt minimum for `space` bytes. Returns the reserve charged.
    ///
    /// # Errors
    /// - `RecordExists` if anything already lives at `address`
    /// - `MissingSigner` / `InsufficientFunds` from the payer debit
    pub fn create_account(
        &mut self,
        payer: &Address,
        address: &Address,
        data: AccountData,
        space: usize,
    ) -> Result<u64> {
        if self.exists(address) {
            return Err(WagerError::RecordExists(*address));
        }
        let reserve = constants::rent_exempt_minimum(space);
        self.transfer(payer, address, reserve)?;
        // `transfer` materialized a wallet at `address`; turn it into the record.
        self.accounts.put(
            *address,
            Account {
                lamports: reserve,
                rent_reserve: reserve,
                space,
                data,
            },
        );
        tracing::debug!(%address, space, reserve, "Account created");
        Ok(reserve)
    }

    /// Delete `address` and send every lamport it held to `recipient`.
    /// Returns the amount moved.
    ///
    /// # Errors
    /// Returns `UnknownRecord` if nothing lives at `address`.
    pub fn close_account(&mut self, address: &Address, recipient: &Address) -> Result<u64> {
        let closed = self
            .accounts
            .remove(address)
            .ok_or(WagerError::UnknownRecord(*address))?;
        self.credit(recipient, closed.lamports)?;
        tracing::debug!(%address, %recipient, lamports = closed.lamports, "Account closed");
        Ok(closed.lamports)
    }

    // -----------------------------------------------------------------
    // Typed record access
    // -----------------------------------------------------------------

    /// # Errors
    /// Returns `UnknownRecord` if no registry lives at `address`.
    pub fn registry(&self, address: &Address) -> Result<&EscrowRegistry> {
        match self.accounts.get(address).map(|a| &a.data) {
            Some(AccountData::Registry(registry)) => Ok(registry),
            _ => Err(WagerError::UnknownRecord(*address)),
        }
    }

    /// # Errors
    /// Returns `UnknownRecord` if no registry lives at `address`.
    pub fn store_registry(&mut self, address: &Address, registry: EscrowRegistry) -> Result<()> {
        let account = self
            .accounts
            .get_mut(address)
            .filter(|a| matches!(a.data, AccountData::Registry(_)))
            .ok_or(WagerError::UnknownRecord(*address))?;
        account.data = AccountData::Registry(registry);
        Ok(())
    }

    /// # Errors
    /// Returns `UnknownRecord` if no match record lives at `address`.
    pub fn match_record(&self, address: &Address) -> Result<&MatchRecord> {
        match self.accounts.get(address).map(|a| &a.data) {
            Some(AccountData::Match(record)) => Ok(record),
            _ => Err(WagerError::UnknownRecord(*address)),
        }
    }

    /// # Errors
    /// Returns `UnknownRecord` if no match record lives at `address`.
    pub fn store_match_record(&mut self, address: &Address, record: MatchRecord) -> Result<()> {
        let account = self
            .accounts
            .get_mut(address)
            .filter(|a| matches!(a.data, AccountData::Match(_)))
            .ok_or(WagerError::UnknownRecord(*address))?;
        account.data = AccountData::Match(record);
        Ok(())
    }

    /// Address of the live match record carrying `match_id`, if any.
    #[must_use]
    pub fn find_match_by_id(&self, match_id: &str) -> Option<Address> {
        self.accounts.iter().find_map(|(address, account)| match &account.data {
            AccountData::Match(record) if record.match_id == match_id => Some(*address),
            _ => None,
        })
    }

    #[must_use]
    pub fn into_accounts(self) -> StagedAccounts<'a> {
        self.accounts
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::accounts::AccountStore;

    fn addr(b: u8) -> Address {
        Address([b; 32])
    }

    #[test]
    fn no_signers_rejected() {
        let store = AccountStore::new();
        let result = InvokeContext::new(TxId::new(), vec![], StagedAccounts::new(&store));
        assert!(matches!(result, Err(WagerError::NoSigners)));
    }

    #[test]
    fn transfer_requires_signature_and_funds() {
        let mut store = AccountStore::new();
        store.deposit(addr(1), 100);
        store.deposit(addr(2), 100);
        let mut ctx =
            InvokeContext::new(TxId::new(), vec![addr(1)], StagedAccounts::new(&store)).unwrap();

        assert!(matches!(
            ctx.transfer(&addr(2), &addr(1), 10),
            Err(WagerError::MissingSigner(a)) if a == addr(2)
        ));
        assert!(matches!(
            ctx.transfer(&addr(1), &addr(3), 101),
            Err(WagerError::InsufficientFunds { needed: 101, available: 100, .. })
        ));

        ctx.transfer(&addr(1), &addr(3), 60).unwrap();
        assert_eq!(ctx.lamports(&addr(1)), 40);
        assert_eq!(ctx.lamports(&addr(3)), 60);
        assert_eq!(ctx.into_accounts().lamport_delta(), 0);
    }

    #[test]
    fn create_account_charges_rent() {
        let mut store = AccountStore::new();
        store.deposit(addr(1), 10_000_000);
        let mut ctx =
            InvokeContext::new(TxId::new(), vec![addr(1)], StagedAccounts::new(&store)).unwrap();

        let registry = EscrowRegistry::new(addr(1), 255);
        let reserve = ctx
            .create_account(
                &addr(1),
                &addr(5),
                AccountData::Registry(registry.clone()),
                EscrowRegistry::SPACE,
            )
            .unwrap();
        assert_eq!(reserve, constants::rent_exempt_minimum(EscrowRegistry::SPACE));
        assert_eq!(ctx.lamports(&addr(1)), 10_000_000 - reserve);
        assert_eq!(ctx.registry(&addr(5)).unwrap(), &registry);
        assert_eq!(ctx.account(&addr(5)).unwrap().spendable(), 0);

        let again = ctx.create_account(&addr(1), &addr(5), AccountData::Wallet, 0);
        assert!(matches!(again, Err(WagerError::RecordExists(_))));
    }

    #[test]
    fn release_respects_rent_reserve() {
        let mut store = AccountStore::new();
        store.deposit(addr(1), 10_000_000);
        let mut ctx =
            InvokeContext::new(TxId::new(), vec![addr(1)], StagedAccounts::new(&store)).unwrap();
        ctx.create_account(
            &addr(1),
            &addr(5),
            AccountData::Registry(EscrowRegistry::new(addr(1), 255)),
            EscrowRegistry::SPACE,
        )
        .unwrap();
        ctx.transfer(&addr(1), &addr(5), 1_000).unwrap();

        let err = ctx.release(&addr(5), &addr(2), 1_001).unwrap_err();
        assert!(matches!(
            err,
            WagerError::InsufficientEscrow { needed: 1_001, available: 1_000, .. }
        ));
        ctx.release(&addr(5), &addr(2), 1_000).unwrap();
        assert_eq!(ctx.lamports(&addr(2)), 1_000);

        // Wallets are not program accounts.
        assert!(matches!(
            ctx.release(&addr(1), &addr(2), 1),
            Err(WagerError::UnknownRecord(_))
        ));
    }

    #[test]
    fn close_account_moves_everything() {
        let mut store = AccountStore::new();
        store.deposit(addr(1), 10_000_000);
        let mut ctx =
            InvokeContext::new(TxId::new(), vec![addr(1)], StagedAccounts::new(&store)).unwrap();
        let reserve = ctx
            .create_account(
                &addr(1),
                &addr(5),
                AccountData::Registry(EscrowRegistry::new(addr(1), 255)),
                EscrowRegistry::SPACE,
            )
            .unwrap();

        let moved = ctx.close_account(&addr(5), &addr(1)).unwrap();
        assert_eq!(moved, reserve);
        assert!(!ctx.exists(&addr(5)));
        assert_eq!(ctx.lamports(&addr(1)), 10_000_000);
        assert!(matches!(
            ctx.close_account(&addr(5), &addr(1)),
            Err(WagerError::UnknownRecord(_))
        ));
    }

    #[test]
    fn typed_access_checks_kind() {
        let mut store = AccountStore::new();
        store.deposit(addr(1), 100);
        let ctx =
            InvokeContext::new(TxId::new(), vec![addr(1)], StagedAccounts::new(&store)).unwrap();
        assert!(matches!(ctx.registry(&addr(1)), Err(WagerError::UnknownRecord(_))));
        assert!(matches!(ctx.match_record(&addr(9)), Err(WagerError::UnknownRecord(_))));
        assert!(ctx.find_match_by_id("anything").is_none());
    }
}
