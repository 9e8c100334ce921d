//! The ledger host: runs signed transactions through a [`Processor`]
//! atomically.

use wagerbook_types::{Address, Instruction, Receipt, Result, WagerError};

use crate::accounts::{Account, AccountStore, StagedAccounts};
use crate::context::InvokeContext;
use crate::replay::{DEFAULT_REPLAY_WINDOW, ReplayGuard};
use crate::supply_conservation::SupplyConservation;
use crate::transaction::Transaction;

/// A program the ledger can execute.
///
/// Implementations read and write accounts only through the
/// [`InvokeContext`]; returning `Err` discards every staged write.
pub trait Processor {
    /// Execute one instruction.
    ///
    /// # Errors
    /// Any error aborts the transaction.
    fn process(&self, ctx: &mut InvokeContext<'_>, instruction: &Instruction) -> Result<Receipt>;
}

/// Committed state plus the program that mutates it.
pub struct Ledger<P: Processor> {
    processor: P,
    accounts: AccountStore,
    replay: ReplayGuard,
    supply: SupplyConservation,
    receipts: Vec<Receipt>,
}

impl<P: Processor> Ledger<P> {
    #[must_use]
    pub fn new(processor: P) -> Self {
        Self::with_replay_window(processor, DEFAULT_REPLAY_WINDOW)
    }

    /// Ledger remembering the last `window` committed transaction ids.
    #[must_use]
    pub fn with_replay_window(processor: P, window: usize) -> Self {
        Self {
            processor,
            accounts: AccountStore::new(),
            replay: ReplayGuard::new(window),
            supply: SupplyConservation::new(),
            receipts: Vec::new(),
        }
    }

    /// Mint lamports into `to` from outside the system.
    ///
    /// # Errors
    /// Returns `Overflow` if the balance would exceed `u64::MAX`.
    pub fn airdrop(&mut self, to: Address, lamports: u64) -> Result<()> {
        if !self.accounts.deposit(to, lamports) {
            return Err(WagerError::Overflow { context: "airdrop" });
        }
        self.supply.record_deposit(lamports);
        tracing::debug!(%to, lamports, "Airdrop");
        Ok(())
    }

    /// Verify, execute, and commit one transaction.
    ///
    /// Either every write the instruction stages lands, or none does.
    ///
    /// # Errors
    /// Signature, replay, and supply failures, plus any error the
    /// processor returns.
    pub fn submit(&mut self, tx: &Transaction) -> Result<Receipt> {
        let signers = tx.verify()?;
        self.replay.check(&tx.id)?;

        let kind = tx.instruction.kind();
        let staged = StagedAccounts::new(&self.accounts);
        let mut ctx = InvokeContext::new(tx.id, signers, staged)?;

        let receipt = match self.processor.process(&mut ctx, &tx.instruction) {
            Ok(receipt) => receipt,
            Err(err) => {
                tracing::warn!(
                    tx = %tx.id,
                    op = %kind,
                    match_account = ?tx.instruction.match_account(),
                    error = %err,
                    "Transaction rejected"
                );
                return Err(err);
            }
        };

        let staged = ctx.into_accounts();
        if let Err(err) = SupplyConservation::verify_delta(staged.lamport_delta()) {
            tracing::error!(tx = %tx.id, op = %kind, error = %err, "Supply breach, transaction discarded");
            return Err(err);
        }
        let writes = staged.into_writes();

        self.replay.mark_committed(tx.id)?;
        let touched = writes.len();
        self.accounts.apply(writes);

        tracing::info!(
            tx = %tx.id,
            op = %kind,
            accounts = touched,
            payouts = receipt.payouts.len(),
            "Transaction committed"
        );
        self.receipts.push(receipt.clone());
        Ok(receipt)
    }

    #[must_use]
    pub fn balance(&self, address: &Address) -> u64 {
        self.accounts.get(address).map_or(0, |a| a.lamports)
    }

    #[must_use]
    pub fn account(&self, address: &Address) -> Option<&Account> {
        self.accounts.get(address)
    }

    #[must_use]
    pub fn accounts(&self) -> &AccountStore {
        &self.accounts
    }

    #[must_use]
    pub fn processor(&self) -> &P {
        &self.processor
    }

    /// Receipts of every committed transaction, oldest first.
    #[must_use]
    pub fn receipts(&self) -> &[Receipt] {
        &self.receipts
    }

    #[must_use]
    pub fn total_supply(&self) -> u128 {
        self.accounts.total_lamports()
    }

    /// Check `Σ balances == Σ deposits`.
    ///
    /// # Errors
    /// Returns `SupplyInvariantViolation` if lamports were created or lost.
    pub fn verify_supply(&self) -> Result<()> {
        self.supply.verify(self.accounts.total_lamports())
    }
}
