//! The settlement program: one handler per [`Instruction`].
//!
//! Every handler follows the same order:
//! 1. Load the registry and run the gate (pause, then authority)
//! 2. Load the match record and check the supplied `match_id`
//! 3. Ask the lifecycle controller for the next status
//! 4. Run the settlement engine and release escrow
//! 5. Store the record and return a [`Receipt`]
//!
//! Handlers never commit anything themselves; the ledger applies the staged
//! writes only when the handler returns `Ok`.

use wagerbook_ledger::{AccountData, InvokeContext, Ledger, Processor};
use wagerbook_types::{
    Address, EscrowRegistry, Instruction, MatchRecord, OperationKind, Payout, PayoutKind, Receipt,
    Result, WagerConfig, WagerError, constants, validate_label,
};

use crate::engine::{self, ClaimClass, Resolution};
use crate::gate;
use crate::lifecycle::Transition;

/// The Wagerbook settlement program.
#[derive(Debug, Clone)]
pub struct WagerProgram {
    config: WagerConfig,
    program_id: Address,
    registry_address: Address,
    registry_bump: u8,
    fee_destination: Address,
}

impl WagerProgram {
    /// # Errors
    /// `Configuration` for invalid config, `InvalidDerivation` if the
    /// registry or treasury address cannot be derived.
    pub fn new(config: WagerConfig) -> Result<Self> {
        config.validate()?;
        let program_id = Address::program_id();
        let (registry_address, registry_bump) =
            Address::find_derived(&[constants::REGISTRY_SEED], &program_id)?;
        let fee_destination = config.fee_destination()?;
        tracing::info!(
            program = %program_id,
            registry = %registry_address,
            fee_destination = %fee_destination,
            fee_bps = config.fee_bps,
            version = constants::VERSION,
            "{} program loaded",
            constants::ENGINE_NAME
        );
        Ok(Self {
            config,
            program_id,
            registry_address,
            registry_bump,
            fee_destination,
        })
    }

    #[must_use]
    pub fn config(&self) -> &WagerConfig {
        &self.config
    }

    #[must_use]
    pub fn program_id(&self) -> Address {
        self.program_id
    }

    #[must_use]
    pub fn registry_address(&self) -> Address {
        self.registry_address
    }

    /// Canonical derivation bump `initialize` must be called with.
    #[must_use]
    pub fn registry_bump(&self) -> u8 {
        self.registry_bump
    }

    #[must_use]
    pub fn fee_destination(&self) -> Address {
        self.fee_destination
    }

    // -----------------------------------------------------------------
    // Shared steps
    // -----------------------------------------------------------------

    fn gate(&self, ctx: &InvokeContext<'_>, operation: OperationKind) -> Result<EscrowRegistry> {
        let registry = ctx.registry(&self.registry_address)?.clone();
        gate::enforce(&registry, &ctx.caller(), operation)?;
        Ok(registry)
    }

    fn load_match(ctx: &InvokeContext<'_>, match_account: &Address, match_id: &str) -> Result<MatchRecord> {
        let record = ctx.match_record(match_account)?;
        if record.match_id != match_id {
            return Err(WagerError::IdentifierMismatch {
                expected: record.match_id.clone(),
                supplied: match_id.to_string(),
            });
        }
        Ok(record.clone())
    }

    fn release_all(ctx: &mut InvokeContext<'_>, from: &Address, payouts: &[Payout]) -> Result<()> {
        for payout in payouts.iter().filter(|p| p.amount > 0) {
            ctx.release(from, &payout.recipient, payout.amount)?;
        }
        Ok(())
    }

    // -----------------------------------------------------------------
    // Registry operations
    // -----------------------------------------------------------------

    fn initialize(&self, ctx: &mut InvokeContext<'_>, bump: u8) -> Result<Receipt> {
        if bump != self.registry_bump {
            return Err(WagerError::InvalidDerivation {
                reason: format!("bump {bump} is not canonical ({})", self.registry_bump),
            });
        }
        let authority = ctx.caller();
        let registry = EscrowRegistry::new(authority, bump);
        let reserve = ctx.create_account(
            &authority,
            &self.registry_address,
            AccountData::Registry(registry),
            EscrowRegistry::SPACE,
        )?;
        tracing::info!(%authority, registry = %self.registry_address, reserve, "Escrow registry initialized");
        Ok(Receipt::new(ctx.tx_id(), OperationKind::Initialize))
    }

    fn set_pause(&self, ctx: &mut InvokeContext<'_>, paused: bool) -> Result<Receipt> {
        let mut registry = self.gate(ctx, OperationKind::SetPause)?;
        registry.paused = paused;
        ctx.store_registry(&self.registry_address, registry)?;
        tracing::info!(paused, "Pause flag set");
        Ok(Receipt::new(ctx.tx_id(), OperationKind::SetPause))
    }

    /// Only lamports above the source's rent reserve can leave; the record
    /// itself is untouched.
    fn withdraw_from_escrow(
        &self,
        ctx: &mut InvokeContext<'_>,
        source: &Address,
        recipient: &Address,
        amount: u64,
    ) -> Result<Receipt> {
        self.gate(ctx, OperationKind::WithdrawFromEscrow)?;
        if amount == 0 {
            return Err(WagerError::ZeroAmount);
        }
        ctx.release(source, recipient, amount)?;
        tracing::warn!(
            %source,
            %recipient,
            amount,
            sol = %constants::lamports_to_sol(amount),
            "Escrow withdrawal"
        );
        let mut receipt = Receipt::new(ctx.tx_id(), OperationKind::WithdrawFromEscrow);
        receipt.payouts.push(Payout::new(*recipient, amount, PayoutKind::Withdrawal));
        Ok(receipt)
    }

    fn transfer_authority(&self, ctx: &mut InvokeContext<'_>, new_authority: &Address) -> Result<Receipt> {
        let mut registry = self.gate(ctx, OperationKind::TransferAuthority)?;
        let previous = registry.authority;
        registry.authority = *new_authority;
        ctx.store_registry(&self.registry_address, registry)?;
        tracing::info!(%previous, new = %new_authority, "Authority transferred");
        Ok(Receipt::new(ctx.tx_id(), OperationKind::TransferAuthority))
    }

    // -----------------------------------------------------------------
    // Match lifecycle
    // -----------------------------------------------------------------

    fn create_match(
        &self,
        ctx: &mut InvokeContext<'_>,
        match_account: &Address,
        match_id: &str,
        competitor_a: &str,
        competitor_b: &str,
    ) -> Result<Receipt> {
        self.gate(ctx, OperationKind::CreateMatch)?;
        validate_label("match_id", match_id, self.config.max_match_id_len, false)?;
        validate_label("competitor_a", competitor_a, self.config.max_competitor_len, true)?;
        validate_label("competitor_b", competitor_b, self.config.max_competitor_len, true)?;
        if !competitor_a.is_empty() && competitor_a == competitor_b {
            return Err(WagerError::InvalidLabel {
                field: "competitor_b",
                reason: "must differ from competitor_a".to_string(),
            });
        }
        ctx.require_signer(match_account)?;
        if ctx.exists(match_account) {
            return Err(WagerError::RecordExists(*match_account));
        }
        if ctx.find_match_by_id(match_id).is_some() {
            return Err(WagerError::DuplicateMatchId(match_id.to_string()));
        }

        let creator = ctx.caller();
        let record = MatchRecord::new(match_id, competitor_a, competitor_b, creator);
        let status = record.status;
        let reserve = ctx.create_account(
            &creator,
            match_account,
            AccountData::Match(record),
            MatchRecord::space(&self.config),
        )?;
        tracing::info!(
            match_id,
            competitor_a,
            competitor_b,
            %creator,
            account = %match_account.to_hex(),
            reserve,
            "Match created"
        );
        Ok(Receipt::new(ctx.tx_id(), OperationKind::CreateMatch).for_match(match_id, Some(status)))
    }

    fn place_bet(
        &self,
        ctx: &mut InvokeContext<'_>,
        match_account: &Address,
        match_id: &str,
        competitor: &str,
        amount: u64,
    ) -> Result<Receipt> {
        self.gate(ctx, OperationKind::PlaceBet)?;
        let mut record = Self::load_match(ctx, match_account, match_id)?;
        Transition::AcceptBet.apply(record.status)?;

        let bettor = ctx.caller();
        let side = record.accept_bet(bettor, competitor, amount, &self.config)?;
        ctx.transfer(&bettor, match_account, amount)?;

        tracing::info!(
            match_id,
            %bettor,
            competitor,
            ?side,
            amount,
            sol = %constants::lamports_to_sol(amount),
            pool = record.prize_pool,
            "Bet placed"
        );
        let status = record.status;
        ctx.store_match_record(match_account, record)?;
        Ok(Receipt::new(ctx.tx_id(), OperationKind::PlaceBet).for_match(match_id, Some(status)))
    }

    /// Status-only transitions: lock, cancel, emergency cancel.
    fn transition(
        &self,
        ctx: &mut InvokeContext<'_>,
        match_account: &Address,
        match_id: &str,
        operation: OperationKind,
        transition: Transition,
    ) -> Result<Receipt> {
        self.gate(ctx, operation)?;
        let mut record = Self::load_match(ctx, match_account, match_id)?;
        let from = record.status;
        record.status = transition.apply(from)?;
        let status = record.status;
        ctx.store_match_record(match_account, record)?;
        tracing::info!(match_id, %from, to = %status, op = %operation, "Match status changed");
        Ok(Receipt::new(ctx.tx_id(), operation).for_match(match_id, Some(status)))
    }

    fn end_match(
        &self,
        ctx: &mut InvokeContext<'_>,
        match_account: &Address,
        match_id: &str,
        winner: &str,
    ) -> Result<Receipt> {
        self.gate(ctx, OperationKind::EndMatch)?;
        let mut record = Self::load_match(ctx, match_account, match_id)?;
        let resolution = engine::resolve(&mut record, winner, self.config.fee_bps)?;

        let mut receipt = Receipt::new(ctx.tx_id(), OperationKind::EndMatch);
        match resolution {
            Resolution::Completed { fee } => {
                if fee > 0 {
                    ctx.release(match_account, &self.fee_destination, fee)?;
                    receipt.payouts.push(Payout::new(self.fee_destination, fee, PayoutKind::Fee));
                }
                tracing::info!(
                    match_id,
                    winner,
                    fee,
                    prize_pool = record.prize_pool,
                    sol = %constants::lamports_to_sol(record.prize_pool),
                    "Match resolved"
                );
            }
            Resolution::Voided => {
                tracing::info!(
                    match_id,
                    winner,
                    total_a = record.total_a,
                    total_b = record.total_b,
                    "Match voided: one side has no stake"
                );
            }
        }
        let status = record.status;
        ctx.store_match_record(match_account, record)?;
        Ok(receipt.for_match(match_id, Some(status)))
    }

    // -----------------------------------------------------------------
    // Claims
    // -----------------------------------------------------------------

    #[allow(clippy::too_many_arguments)]
    fn claim(
        &self,
        ctx: &mut InvokeContext<'_>,
        match_account: &Address,
        match_id: &str,
        operation: OperationKind,
        transition: Transition,
        class: ClaimClass,
        batch: &[Address],
    ) -> Result<Receipt> {
        self.gate(ctx, operation)?;
        let mut record = Self::load_match(ctx, match_account, match_id)?;
        transition.apply(record.status)?;

        let payouts = engine::claim(&mut record, class, batch)?;
        Self::release_all(ctx, match_account, &payouts)?;

        let total: u64 = payouts.iter().map(|p| p.amount).sum();
        tracing::info!(
            match_id,
            op = %operation,
            requested = batch.len(),
            paid = payouts.len(),
            total,
            sol = %constants::lamports_to_sol(total),
            "Claims settled"
        );

        let status = record.status;
        ctx.store_match_record(match_account, record)?;
        let mut receipt = Receipt::new(ctx.tx_id(), operation).for_match(match_id, Some(status));
        receipt.payouts = payouts;
        Ok(receipt)
    }

    fn close_match(&self, ctx: &mut InvokeContext<'_>, match_account: &Address, match_id: &str) -> Result<Receipt> {
        self.gate(ctx, OperationKind::CloseMatch)?;
        let record = Self::load_match(ctx, match_account, match_id)?;
        Transition::Close.apply(record.status)?;

        let remaining = engine::unclaimed_count(&record);
        if remaining > 0 {
            return Err(WagerError::UnsettledClaims { remaining });
        }

        let mut receipt = Receipt::new(ctx.tx_id(), OperationKind::CloseMatch).for_match(match_id, None);
        let dust = ctx.account(match_account).map_or(0, |a| a.spendable());
        if dust > 0 {
            ctx.release(match_account, &self.fee_destination, dust)?;
            receipt.payouts.push(Payout::new(self.fee_destination, dust, PayoutKind::Dust));
        }

        let closer = ctx.caller();
        let reclaimed = ctx.close_account(match_account, &closer)?;
        receipt.payouts.push(Payout::new(closer, reclaimed, PayoutKind::StorageReclaim));
        tracing::info!(match_id, %closer, dust, reclaimed, status = %record.status, "Match closed");
        Ok(receipt)
    }
}

impl Processor for WagerProgram {
    fn process(&self, ctx: &mut InvokeContext<'_>, instruction: &Instruction) -> Result<Receipt> {
        match instruction {
            Instruction::Initialize { bump } => self.initialize(ctx, *bump),
            Instruction::CreateMatch {
                match_account,
                match_id,
                competitor_a,
                competitor_b,
            } => self.create_match(ctx, match_account, match_id, competitor_a, competitor_b),
            Instruction::PlaceBet {
                match_account,
                match_id,
                competitor,
                amount,
            } => self.place_bet(ctx, match_account, match_id, competitor, *amount),
            Instruction::AdvanceToBattle {
                match_account,
                match_id,
            } => self.transition(
                ctx,
                match_account,
                match_id,
                OperationKind::AdvanceToBattle,
                Transition::Lock,
            ),
            Instruction::EndMatch {
                match_account,
                match_id,
                winner,
            } => self.end_match(ctx, match_account, match_id, winner),
            Instruction::CancelMatch {
                match_account,
                match_id,
            } => self.transition(
                ctx,
                match_account,
                match_id,
                OperationKind::CancelMatch,
                Transition::Cancel,
            ),
            Instruction::ClaimPrize {
                match_account,
                match_id,
                batch,
            } => self.claim(
                ctx,
                match_account,
                match_id,
                OperationKind::ClaimPrize,
                Transition::ClaimPrize,
                ClaimClass::Prize,
                batch,
            ),
            Instruction::ClaimRefund {
                match_account,
                match_id,
                batch,
            } => self.claim(
                ctx,
                match_account,
                match_id,
                OperationKind::ClaimRefund,
                Transition::ClaimRefund,
                ClaimClass::Refund,
                batch,
            ),
            Instruction::ReclaimPrize {
                match_account,
                match_id,
                bettor,
            } => self.claim(
                ctx,
                match_account,
                match_id,
                OperationKind::ReclaimPrize,
                Transition::ReclaimPrize,
                ClaimClass::Prize,
                std::slice::from_ref(bettor),
            ),
            Instruction::EmergencyCancel {
                match_account,
                match_id,
            } => self.transition(
                ctx,
                match_account,
                match_id,
                OperationKind::EmergencyCancel,
                Transition::EmergencyCancel,
            ),
            Instruction::CloseMatch {
                match_account,
                match_id,
            } => self.close_match(ctx, match_account, match_id),
            Instruction::SetPause { paused } => self.set_pause(ctx, *paused),
            Instruction::WithdrawFromEscrow {
                source,
                recipient,
                amount,
            } => self.withdraw_from_escrow(ctx, source, recipient, *amount),
            Instruction::TransferAuthority { new_authority } => {
                self.transfer_authority(ctx, new_authority)
            }
        }
    }
}

// ---------------------------------------------------------------------------
// Read access
// ---------------------------------------------------------------------------

/// The match record stored at `match_account`.
///
/// # Errors
/// Returns `UnknownRecord` if no match record lives there.
pub fn get_match<'l, P: Processor>(ledger: &'l Ledger<P>, match_account: &Address) -> Result<&'l MatchRecord> {
    match ledger.account(match_account).map(|a| &a.data) {
        Some(AccountData::Match(record)) => Ok(record),
        _ => Err(WagerError::UnknownRecord(*match_account)),
    }
}

/// The match record at `match_account` as pretty-printed JSON.
///
/// # Errors
/// `UnknownRecord`, or `Serialization` if encoding fails.
pub fn get_match_json<P: Processor>(ledger: &Ledger<P>, match_account: &Address) -> Result<String> {
    Ok(serde_json::to_string_pretty(get_match(ledger, match_account)?)?)
}

/// The escrow registry, if initialized.
///
/// # Errors
/// Returns `UnknownRecord` before `initialize`.
pub fn get_registry(ledger: &Ledger<WagerProgram>) -> Result<&EscrowRegistry> {
    let address = ledger.processor().registry_address();
    match ledger.account(&address).map(|a| &a.data) {
        Some(AccountData::Registry(registry)) => Ok(registry),
        _ => Err(WagerError::UnknownRecord(address)),
    }
}
