//! Match records and the embedded bet ledger.
//!
//! ## Lifecycle
//!
//! ```text
//!   ┌─────────────┐ advance ┌────────┐ resolve ┌───────────┐
//!   │ PREPARATION ├────────▶│ BATTLE ├────────▶│ COMPLETED ├──┐
//!   └──────┬──────┘         └───┬────┘         └───────────┘  │ close
//!          │ emergency cancel   │ cancel / void               ▼
//!          │                    ▼                          (removed)
//!          │               ┌────────┐                         ▲
//!          └──────────────▶│ REFUND ├─────────────────────────┘
//!                          └────────┘
//! ```
//!
//! The bet ledger only ever grows while the match accepts bets. After that
//! the sole mutation on a bet is the one-way `claimed` flag.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::{Address, Result, WagerConfig, WagerError, constants};

/// Lifecycle status of a match record.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum MatchStatus {
    /// Accepting bets. Older records serialize this as `Initialized`.
    #[serde(alias = "Initialized")]
    Preparation,
    /// Locked: no more bets, awaiting resolution.
    Battle,
    /// Resolved with a winner; prizes claimable.
    Completed,
    /// Cancelled or voided; every bet refundable.
    Refund,
}

impl MatchStatus {
    #[must_use]
    pub fn accepts_bets(self) -> bool {
        self == Self::Preparation
    }

    /// Completed and Refund are the only statuses a record can close from.
    #[must_use]
    pub fn is_settling(self) -> bool {
        matches!(self, Self::Completed | Self::Refund)
    }
}

impl fmt::Display for MatchStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Preparation => write!(f, "PREPARATION"),
            Self::Battle => write!(f, "BATTLE"),
            Self::Completed => write!(f, "COMPLETED"),
            Self::Refund => write!(f, "REFUND"),
        }
    }
}

/// Which competitor slot a bet landed on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum BetSide {
    A,
    B,
}

/// One bettor's wager.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Bet {
    pub bettor: Address,
    /// Lamports escrowed; always positive.
    pub amount: u64,
    /// Competitor label as it stood when the bet was accepted.
    pub competitor: String,
    /// Flips false → true exactly once, when the bet is paid out.
    pub claimed: bool,
}

/// Per-match record: identity, competitors, pooled totals, and the bet ledger.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MatchRecord {
    pub match_id: String,
    pub competitor_a: String,
    /// May be empty until the first bet not on `competitor_a` claims it.
    pub competitor_b: String,
    pub status: MatchStatus,
    pub total_a: u64,
    pub total_b: u64,
    /// Set only on transition to `Completed`.
    pub winner: Option<String>,
    /// `total_a + total_b` until resolution, minus the fee afterwards.
    pub prize_pool: u64,
    /// Fee withdrawn at resolution.
    pub fee_taken: u64,
    /// Identity that paid for the record's storage.
    pub creator: Address,
    pub bets: Vec<Bet>,
}

impl MatchRecord {
    #[must_use]
    pub fn new(
        match_id: impl Into<String>,
        competitor_a: impl Into<String>,
        competitor_b: impl Into<String>,
        creator: Address,
    ) -> Self {
        Self {
            match_id: match_id.into(),
            competitor_a: competitor_a.into(),
            competitor_b: competitor_b.into(),
            status: MatchStatus::Preparation,
            total_a: 0,
            total_b: 0,
            winner: None,
            prize_pool: 0,
            fee_taken: 0,
            creator,
            bets: Vec::new(),
        }
    }

    /// Reserved storage for a record at full bet capacity.
    #[must_use]
    pub fn space(config: &WagerConfig) -> usize {
        let label = |max: usize| 4 + max;
        let bet = 32 + 8 + label(config.max_competitor_len) + 1;
        constants::DISCRIMINATOR_LEN
            + label(config.max_match_id_len)
            + 2 * label(config.max_competitor_len)
            + 1 // status
            + 8 + 8 // totals
            + 1 + label(config.max_competitor_len) // winner
            + 8 + 8 // prize pool, fee taken
            + 32 // creator
            + 4 + config.max_bets_per_match * bet
    }

    /// Map a label onto a competitor slot, if it names one.
    #[must_use]
    pub fn side_of(&self, competitor: &str) -> Option<BetSide> {
        if competitor.is_empty() {
            None
        } else if competitor == self.competitor_a {
            Some(BetSide::A)
        } else if competitor == self.competitor_b {
            Some(BetSide::B)
        } else {
            None
        }
    }

    #[must_use]
    pub fn total_for(&self, side: BetSide) -> u64 {
        match side {
            BetSide::A => self.total_a,
            BetSide::B => self.total_b,
        }
    }

    /// Whether either side has no stake at all.
    #[must_use]
    pub fn is_one_sided(&self) -> bool {
        self.total_a == 0 || self.total_b == 0
    }

    /// Append a bet, adopting an empty competitor slot if needed.
    ///
    /// Status is not checked here; the lifecycle controller owns that.
    ///
    /// # Errors
    /// `ZeroAmount`, `BetTooSmall`, `InvalidLabel`, `DuplicateBettor`,
    /// `BetLedgerFull`, `InvalidCompetitor`, or `Overflow`.
    pub fn accept_bet(
        &mut self,
        bettor: Address,
        competitor: &str,
        amount: u64,
        config: &WagerConfig,
    ) -> Result<BetSide> {
        if amount == 0 {
            return Err(WagerError::ZeroAmount);
        }
        if amount < config.min_bet {
            return Err(WagerError::BetTooSmall {
                minimum: config.min_bet,
                amount,
            });
        }
        validate_label("competitor", competitor, config.max_competitor_len, false)?;
        if self.bet_index(&bettor).is_some() {
            return Err(WagerError::DuplicateBettor(bettor));
        }
        if self.bets.len() >= config.max_bets_per_match {
            return Err(WagerError::BetLedgerFull {
                capacity: config.max_bets_per_match,
            });
        }

        let side = match self.side_of(competitor) {
            Some(side) => side,
            None if self.competitor_a.is_empty() => BetSide::A,
            None if self.competitor_b.is_empty() => BetSide::B,
            None => return Err(WagerError::InvalidCompetitor(competitor.to_string())),
        };

        let overflow = WagerError::Overflow { context: "bet totals" };
        let new_total = self.total_for(side).checked_add(amount).ok_or(overflow)?;
        let new_pool = self
            .prize_pool
            .checked_add(amount)
            .ok_or(WagerError::Overflow { context: "prize pool" })?;

        match side {
            BetSide::A => {
                if self.competitor_a.is_empty() {
                    self.competitor_a = competitor.to_string();
                }
                self.total_a = new_total;
            }
            BetSide::B => {
                if self.competitor_b.is_empty() {
                    self.competitor_b = competitor.to_string();
                }
                self.total_b = new_total;
            }
        }
        self.prize_pool = new_pool;
        self.bets.push(Bet {
            bettor,
            amount,
            competitor: competitor.to_string(),
            claimed: false,
        });
        Ok(side)
    }

    /// Position of the bettor's bet in the ledger.
    #[must_use]
    pub fn bet_index(&self, bettor: &Address) -> Option<usize> {
        self.bets.iter().position(|bet| bet.bettor == *bettor)
    }

    /// The winning label and the stake on it.
    ///
    /// # Errors
    /// `NoWinnerSet` if unresolved, `InvalidCompetitor` if the winner names
    /// neither slot.
    pub fn winning_side(&self) -> Result<(&str, u64)> {
        let winner = self.winner.as_deref().ok_or(WagerError::NoWinnerSet)?;
        let side = self
            .side_of(winner)
            .ok_or_else(|| WagerError::InvalidCompetitor(winner.to_string()))?;
        Ok((winner, self.total_for(side)))
    }

    /// Sum of bet amounts per side, recomputed from the ledger.
    #[must_use]
    pub fn ledger_totals(&self) -> (u64, u64) {
        self.bets.iter().fold((0, 0), |(a, b), bet| {
            match self.side_of(&bet.competitor) {
                Some(BetSide::A) => (a + bet.amount, b),
                Some(BetSide::B) => (a, b + bet.amount),
                None => (a, b),
            }
        })
    }

    /// Whether the running totals agree with the bet ledger.
    #[must_use]
    pub fn totals_consistent(&self) -> bool {
        self.ledger_totals() == (self.total_a, self.total_b)
    }
}

/// Check a label's length (and emptiness unless allowed).
///
/// # Errors
/// Returns `InvalidLabel` describing the violation.
pub fn validate_label(field: &'static str, value: &str, max_len: usize, allow_empty: bool) -> Result<()> {
    if value.is_empty() && !allow_empty {
        return Err(WagerError::InvalidLabel {
            field,
            reason: "must not be empty".to_string(),
        });
    }
    if value.len() > max_len {
        return Err(WagerError::InvalidLabel {
            field,
            reason: format!("{} bytes exceeds maximum {max_len}", value.len()),
        });
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record() -> MatchRecord {
        MatchRecord::new("MATCH_001", "DOGE", "SHIB", Address([0u8; 32]))
    }

    fn bettor(n: u8) -> Address {
        Address([n; 32])
    }

    #[test]
    fn bets_update_partition_totals() {
        let cfg = WagerConfig::default();
        let mut m = record();
        assert_eq!(m.accept_bet(bettor(1), "DOGE", 100, &cfg).unwrap(), BetSide::A);
        assert_eq!(m.accept_bet(bettor(2), "SHIB", 250, &cfg).unwrap(), BetSide::B);
        assert_eq!(m.accept_bet(bettor(3), "DOGE", 50, &cfg).unwrap(), BetSide::A);
        assert_eq!((m.total_a, m.total_b), (150, 250));
        assert_eq!(m.prize_pool, 400);
        assert!(m.totals_consistent());
    }

    #[test]
    fn empty_slot_adopts_second_label() {
        let cfg = WagerConfig::default();
        let mut m = MatchRecord::new("M", "DOGE", "", Address([0u8; 32]));
        m.accept_bet(bettor(1), "DOGE", 10, &cfg).unwrap();
        assert_eq!(m.accept_bet(bettor(2), "PEPE", 10, &cfg).unwrap(), BetSide::B);
        assert_eq!(m.competitor_b, "PEPE");

        let err = m.accept_bet(bettor(3), "BONK", 10, &cfg).unwrap_err();
        assert!(matches!(err, WagerError::InvalidCompetitor(ref c) if c == "BONK"));
        assert_eq!(m.bets.len(), 2);
    }

    #[test]
    fn both_slots_empty_fill_in_order() {
        let cfg = WagerConfig::default();
        let mut m = MatchRecord::new("M", "", "", Address([0u8; 32]));
        assert_eq!(m.accept_bet(bettor(1), "BTC", 10, &cfg).unwrap(), BetSide::A);
        assert_eq!(m.accept_bet(bettor(2), "BTC", 10, &cfg).unwrap(), BetSide::A);
        assert_eq!(m.accept_bet(bettor(3), "ETH", 10, &cfg).unwrap(), BetSide::B);
        assert_eq!((m.competitor_a.as_str(), m.competitor_b.as_str()), ("BTC", "ETH"));
    }

    #[test]
    fn zero_and_small_bets_rejected() {
        let cfg = WagerConfig {
            min_bet: 50,
            ..WagerConfig::default()
        };
        let mut m = record();
        assert!(matches!(
            m.accept_bet(bettor(1), "DOGE", 0, &cfg).unwrap_err(),
            WagerError::ZeroAmount
        ));
        assert!(matches!(
            m.accept_bet(bettor(1), "DOGE", 49, &cfg).unwrap_err(),
            WagerError::BetTooSmall { minimum: 50, amount: 49 }
        ));
        assert!(m.bets.is_empty());
    }

    #[test]
    fn one_bet_per_bettor() {
        let cfg = WagerConfig::default();
        let mut m = record();
        m.accept_bet(bettor(1), "DOGE", 10, &cfg).unwrap();
        let err = m.accept_bet(bettor(1), "SHIB", 10, &cfg).unwrap_err();
        assert!(matches!(err, WagerError::DuplicateBettor(_)));
        assert_eq!(m.total_b, 0);
    }

    #[test]
    fn ledger_capacity_enforced() {
        let cfg = WagerConfig {
            max_bets_per_match: 2,
            ..WagerConfig::default()
        };
        let mut m = record();
        m.accept_bet(bettor(1), "DOGE", 10, &cfg).unwrap();
        m.accept_bet(bettor(2), "SHIB", 10, &cfg).unwrap();
        let err = m.accept_bet(bettor(3), "DOGE", 10, &cfg).unwrap_err();
        assert!(matches!(err, WagerError::BetLedgerFull { capacity: 2 }));
    }

    #[test]
    fn overlong_label_rejected() {
        let cfg = WagerConfig::default();
        let mut m = record();
        let err = m.accept_bet(bettor(1), "ELEVENCHARS", 10, &cfg).unwrap_err();
        assert!(matches!(err, WagerError::InvalidLabel { field: "competitor", .. }));
    }

    #[test]
    fn winning_side_requires_winner() {
        let cfg = WagerConfig::default();
        let mut m = record();
        m.accept_bet(bettor(1), "DOGE", 100, &cfg).unwrap();
        assert!(matches!(m.winning_side().unwrap_err(), WagerError::NoWinnerSet));
        m.winner = Some("DOGE".into());
        assert_eq!(m.winning_side().unwrap(), ("DOGE", 100));
    }

    #[test]
    fn space_scales_with_capacity() {
        let small = WagerConfig {
            max_bets_per_match: 1,
            ..WagerConfig::default()
        };
        let large = WagerConfig::default();
        assert!(MatchRecord::space(&large) > MatchRecord::space(&small));
    }

    #[test]
    fn initialized_alias_deserializes_as_preparation() {
        let status: MatchStatus = serde_json::from_str("\"Initialized\"").unwrap();
        assert_eq!(status, MatchStatus::Preparation);
        assert!(status.accepts_bets());
        assert!(!status.is_settling());
    }
}
