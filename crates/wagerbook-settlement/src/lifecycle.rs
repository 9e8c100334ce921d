//! Match lifecycle controller.
//!
//! | Transition        | From                 | To          |
//! |-------------------|----------------------|-------------|
//! | `AcceptBet`       | Preparation          | Preparation |
//! | `Lock`            | Preparation          | Battle      |
//! | `Resolve`         | Battle               | Completed   |
//! | `Void`, `Cancel`  | Battle               | Refund      |
//! | `EmergencyCancel` | Preparation, Battle  | Refund      |
//! | `ClaimPrize`, `ReclaimPrize` | Completed | Completed   |
//! | `ClaimRefund`     | Refund               | Refund      |
//! | `Close`           | Completed, Refund    | unchanged   |
//!
//! Anything else is `IllegalTransition`.
//!
//! Pure: the controller computes the next status and never touches funds.

use std::fmt;

use wagerbook_types::{MatchStatus, Result, WagerError};

/// A requested move through the lifecycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Transition {
    AcceptBet,
    Lock,
    /// Resolution with stake on both sides.
    Resolve,
    /// Resolution with no stake on one side.
    Void,
    Cancel,
    EmergencyCancel,
    ClaimPrize,
    ReclaimPrize,
    ClaimRefund,
    Close,
}

impl Transition {
    /// Verb used in `IllegalTransition` messages.
    #[must_use]
    pub fn verb(self) -> &'static str {
        match self {
            Self::AcceptBet => "place bet",
            Self::Lock => "advance to battle",
            Self::Resolve | Self::Void => "end match",
            Self::Cancel => "cancel",
            Self::EmergencyCancel => "emergency cancel",
            Self::ClaimPrize => "claim prize",
            Self::ReclaimPrize => "reclaim prize",
            Self::ClaimRefund => "claim refund",
            Self::Close => "close",
        }
    }

    /// Next status from `current`. `Close` leaves the status unchanged;
    /// the caller removes the record.
    ///
    /// # Errors
    /// Returns `IllegalTransition` for any pair outside the table.
    pub fn apply(self, current: MatchStatus) -> Result<MatchStatus> {
        use MatchStatus::{Battle, Completed, Preparation, Refund};

        let next = match (self, current) {
            (Self::AcceptBet, Preparation) => Preparation,
            (Self::Lock, Preparation) => Battle,
            (Self::Resolve, Battle) => Completed,
            (Self::Void | Self::Cancel | Self::EmergencyCancel, Battle)
            | (Self::EmergencyCancel, Preparation)
            | (Self::ClaimRefund | Self::Close, Refund) => Refund,
            (Self::ClaimPrize | Self::ReclaimPrize | Self::Close, Completed) => Completed,
            (transition, status) => {
                return Err(WagerError::IllegalTransition {
                    operation: transition.verb(),
                    status,
                });
            }
        };
        Ok(next)
    }
}

impl fmt::Display for Transition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.verb())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use MatchStatus::{Battle, Completed, Preparation, Refund};

    const ALL: [Transition; 10] = [
        Transition::AcceptBet,
        Transition::Lock,
        Transition::Resolve,
        Transition::Void,
        Transition::Cancel,
        Transition::EmergencyCancel,
        Transition::ClaimPrize,
        Transition::ReclaimPrize,
        Transition::ClaimRefund,
        Transition::Close,
    ];

    #[test]
    fn happy_path() {
        let s = Transition::AcceptBet.apply(Preparation).unwrap();
        let s = Transition::Lock.apply(s).unwrap();
        let s = Transition::Resolve.apply(s).unwrap();
        assert_eq!(s, Completed);
        assert_eq!(Transition::ClaimPrize.apply(s).unwrap(), Completed);
        assert_eq!(Transition::Close.apply(s).unwrap(), Completed);
    }

    #[test]
    fn refund_paths() {
        assert_eq!(Transition::Cancel.apply(Battle).unwrap(), Refund);
        assert_eq!(Transition::Void.apply(Battle).unwrap(), Refund);
        assert_eq!(Transition::EmergencyCancel.apply(Preparation).unwrap(), Refund);
        assert_eq!(Transition::EmergencyCancel.apply(Battle).unwrap(), Refund);
        assert_eq!(Transition::ClaimRefund.apply(Refund).unwrap(), Refund);
    }

    #[test]
    fn legal_transition_count_matches_table() {
        let statuses = [Preparation, Battle, Completed, Refund];
        let legal = ALL
            .iter()
            .flat_map(|t| statuses.iter().map(move |s| (*t, *s)))
            .filter(|(t, s)| t.apply(*s).is_ok())
            .count();
        assert_eq!(legal, 12);
    }

    #[test]
    fn bets_rejected_outside_preparation() {
        for status in [Battle, Completed, Refund] {
            let err = Transition::AcceptBet.apply(status).unwrap_err();
            assert!(matches!(
                err,
                WagerError::IllegalTransition { operation: "place bet", status: s } if s == status
            ));
        }
    }

    #[test]
    fn refund_claim_on_completed_is_illegal() {
        assert!(matches!(
            Transition::ClaimRefund.apply(Completed),
            Err(WagerError::IllegalTransition { .. })
        ));
        assert!(Transition::ClaimPrize.apply(Refund).is_err());
    }

    #[test]
    fn terminal_states_cannot_be_cancelled() {
        for t in [Transition::Cancel, Transition::EmergencyCancel] {
            assert!(t.apply(Completed).is_err());
            assert!(t.apply(Refund).is_err());
        }
        assert!(Transition::Cancel.apply(Preparation).is_err());
    }

    #[test]
    fn close_requires_settling_status() {
        assert!(Transition::Close.apply(Preparation).is_err());
        assert!(Transition::Close.apply(Battle).is_err());
    }

    #[test]
    fn agrees_with_status_predicates() {
        for status in [Preparation, Battle, Completed, Refund] {
            assert_eq!(Transition::AcceptBet.apply(status).is_ok(), status.accepts_bets());
            assert_eq!(Transition::Close.apply(status).is_ok(), status.is_settling());
        }
    }
}
