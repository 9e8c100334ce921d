//! Settlement engine: fee and share arithmetic, batch selection, and claim
//! marking over a match record's bet ledger.
//!
//! The engine mutates only the in-memory [`MatchRecord`] and returns the
//! [`Payout`]s to execute; moving lamports is the program's job, so a
//! failed transfer aborts the transaction together with the claim marks.
//!
//! All arithmetic is floor-rounded in `u128`:
//! ```text
//! fee   = ⌊pool × fee_bps / 10 000⌋
//! share = ⌊amount × prize_pool / winning_total⌋
//! ```
//! The remainder left in escrow after every winner is paid is strictly less
//! than the number of winning bets and is swept on close.

use wagerbook_types::{
    Address, Bet, MatchRecord, MatchStatus, Payout, PayoutKind, Result, WagerError, constants,
};

use crate::lifecycle::Transition;

/// Protocol fee on `pool`.
///
/// # Errors
/// Returns `Overflow` if the result does not fit in `u64`.
pub fn protocol_fee(pool: u64, fee_bps: u64) -> Result<u64> {
    let fee = u128::from(pool) * u128::from(fee_bps) / u128::from(constants::BPS_DENOMINATOR);
    u64::try_from(fee).map_err(|_| WagerError::Overflow { context: "protocol fee" })
}

/// A winning bet's proportional share of the post-fee pool.
///
/// # Errors
/// Returns `Overflow` if `winning_total` is zero or the share exceeds `u64`.
pub fn prize_share(amount: u64, prize_pool: u64, winning_total: u64) -> Result<u64> {
    let share = (u128::from(amount) * u128::from(prize_pool))
        .checked_div(u128::from(winning_total))
        .ok_or(WagerError::Overflow { context: "prize share" })?;
    u64::try_from(share).map_err(|_| WagerError::Overflow { context: "prize share" })
}

/// Outcome of [`resolve`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Resolution {
    /// Winner recorded; `fee` must be released to the fee destination.
    Completed { fee: u64 },
    /// One side had no stake: the match moved to `Refund`, no fee taken.
    Voided,
}

/// Record the outcome of a match in `Battle`.
///
/// # Errors
/// `IllegalTransition` unless `Battle`, `InvalidCompetitor` if `winner`
/// names neither competitor, `Overflow` from the fee.
pub fn resolve(record: &mut MatchRecord, winner: &str, fee_bps: u64) -> Result<Resolution> {
    Transition::Resolve.apply(record.status)?;
    if record.side_of(winner).is_none() {
        return Err(WagerError::InvalidCompetitor(winner.to_string()));
    }

    if record.is_one_sided() {
        record.status = Transition::Void.apply(record.status)?;
        return Ok(Resolution::Voided);
    }

    let fee = protocol_fee(record.prize_pool, fee_bps)?;
    record.prize_pool -= fee;
    record.fee_taken = fee;
    record.winner = Some(winner.to_string());
    record.status = MatchStatus::Completed;
    Ok(Resolution::Completed { fee })
}

/// Which bets a claim pays and how much.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ClaimClass {
    /// Winning bets, proportional share.
    Prize,
    /// Every bet, original stake.
    Refund,
}

impl ClaimClass {
    #[must_use]
    pub fn payout_kind(self) -> PayoutKind {
        match self {
            Self::Prize => PayoutKind::Prize,
            Self::Refund => PayoutKind::Refund,
        }
    }

    fn applies_to(self, record: &MatchRecord, bet: &Bet) -> bool {
        match self {
            Self::Prize => record.winner.as_deref() == Some(bet.competitor.as_str()),
            Self::Refund => true,
        }
    }
}

/// Indices of the bets a batch claim will pay.
///
/// An empty batch selects every unclaimed applicable bet. An explicit batch
/// must name only unclaimed applicable bets; a bettor listed twice counts
/// as already claimed on the second entry.
///
/// # Errors
/// `InvalidBatchEntry` for a bettor with no bet or a non-applicable bet,
/// `AlreadyClaimed` for a paid (or repeated) entry.
pub fn select_claims(record: &MatchRecord, class: ClaimClass, batch: &[Address]) -> Result<Vec<usize>> {
    if batch.is_empty() {
        return Ok(record
            .bets
            .iter()
            .enumerate()
            .filter(|(_, bet)| !bet.claimed && class.applies_to(record, bet))
            .map(|(i, _)| i)
            .collect());
    }

    let mut selected = Vec::with_capacity(batch.len());
    for bettor in batch {
        let index = record.bet_index(bettor).ok_or_else(|| WagerError::InvalidBatchEntry {
            bettor: *bettor,
            reason: "no bet in this match".to_string(),
        })?;
        let bet = &record.bets[index];
        if !class.applies_to(record, bet) {
            return Err(WagerError::InvalidBatchEntry {
                bettor: *bettor,
                reason: format!("bet on {} did not win", bet.competitor),
            });
        }
        if bet.claimed || selected.contains(&index) {
            return Err(WagerError::AlreadyClaimed(*bettor));
        }
        selected.push(index);
    }
    Ok(selected)
}

/// Mark the selected bets claimed and compute their payouts, in ledger
/// order of selection.
///
/// # Errors
/// `NoWinnerSet` for a prize claim on an unresolved record, `Overflow`
/// from the share arithmetic.
pub fn settle_claims(record: &mut MatchRecord, class: ClaimClass, indices: &[usize]) -> Result<Vec<Payout>> {
    let winning_total = match class {
        ClaimClass::Prize => record.winning_side()?.1,
        ClaimClass::Refund => 0,
    };
    let prize_pool = record.prize_pool;

    let mut payouts = Vec::with_capacity(indices.len());
    for &index in indices {
        let bet = &mut record.bets[index];
        let amount = match class {
            ClaimClass::Prize => prize_share(bet.amount, prize_pool, winning_total)?,
            ClaimClass::Refund => bet.amount,
        };
        bet.claimed = true;
        tracing::debug!(bettor = %bet.bettor, stake = bet.amount, amount, kind = %class.payout_kind(), "Bet settled");
        payouts.push(Payout::new(bet.bettor, amount, class.payout_kind()));
    }
    Ok(payouts)
}

/// [`select_claims`] followed by [`settle_claims`].
///
/// # Errors
/// See both.
pub fn claim(record: &mut MatchRecord, class: ClaimClass, batch: &[Address]) -> Result<Vec<Payout>> {
    let indices = select_claims(record, class, batch)?;
    settle_claims(record, class, &indices)
}

/// Bets that still block closing: unclaimed winners on a completed match,
/// unclaimed bets of any kind otherwise.
#[must_use]
pub fn unclaimed_count(record: &MatchRecord) -> usize {
    let class = match record.status {
        MatchStatus::Completed => ClaimClass::Prize,
        _ => ClaimClass::Refund,
    };
    record
        .bets
        .iter()
        .filter(|bet| !bet.claimed && class.applies_to(record, bet))
        .count()
}
