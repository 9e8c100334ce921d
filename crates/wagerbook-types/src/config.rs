//! Configuration for a Wagerbook settlement program instance.

use serde::{Deserialize, Serialize};

use crate::{Address, Result, WagerError, constants};

/// Tunables for fee policy, bet acceptance, and record sizing.
///
/// Every field has a default, so a JSON document only needs to name the
/// values it overrides.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct WagerConfig {
    /// Protocol fee taken from the prize pool at resolution, in basis points.
    pub fee_bps: u64,
    /// Smallest accepted bet, in lamports.
    pub min_bet: u64,
    /// Bet ledger capacity per match. Sizes the match record's storage.
    pub max_bets_per_match: usize,
    /// Maximum `match_id` length in bytes.
    pub max_match_id_len: usize,
    /// Maximum competitor label length in bytes.
    pub max_competitor_len: usize,
    /// Where resolution fees and rounding dust go. `None` means the
    /// address derived from the treasury seed.
    pub fee_destination: Option<Address>,
}

impl Default for WagerConfig {
    fn default() -> Self {
        Self {
            fee_bps: constants::DEFAULT_FEE_BPS,
            min_bet: constants::DEFAULT_MIN_BET,
            max_bets_per_match: constants::DEFAULT_MAX_BETS_PER_MATCH,
            max_match_id_len: constants::DEFAULT_MAX_MATCH_ID_LEN,
            max_competitor_len: constants::DEFAULT_MAX_COMPETITOR_LEN,
            fee_destination: None,
        }
    }
}

impl WagerConfig {
    /// Parse and validate a JSON configuration document.
    ///
    /// # Errors
    /// Returns `Configuration` on malformed JSON or invalid values.
    pub fn from_json_str(json: &str) -> Result<Self> {
        let config: Self = serde_json::from_str(json)
            .map_err(|e| WagerError::Configuration(format!("invalid config JSON: {e}")))?;
        config.validate()?;
        Ok(config)
    }

    /// Reject values the settlement engine cannot honour.
    ///
    /// # Errors
    /// Returns `Configuration` naming the first offending field.
    pub fn validate(&self) -> Result<()> {
        if self.fee_bps >= constants::BPS_DENOMINATOR {
            return Err(WagerError::Configuration(format!(
                "fee_bps {} must be below {}",
                self.fee_bps,
                constants::BPS_DENOMINATOR
            )));
        }
        if self.min_bet == 0 {
            return Err(WagerError::Configuration("min_bet must be positive".into()));
        }
        if self.max_bets_per_match == 0 {
            return Err(WagerError::Configuration(
                "max_bets_per_match must be positive".into(),
            ));
        }
        if self.max_match_id_len == 0 || self.max_competitor_len == 0 {
            return Err(WagerError::Configuration(
                "label length limits must be positive".into(),
            ));
        }
        Ok(())
    }

    /// Resolve the fee-collection address.
    ///
    /// # Errors
    /// Propagates derivation failure for the default treasury address.
    pub fn fee_destination(&self) -> Result<Address> {
        match self.fee_destination {
            Some(address) => Ok(address),
            None => Address::find_derived(&[constants::TREASURY_SEED], &Address::program_id())
                .map(|(address, _)| address),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_are_valid() {
        let cfg = WagerConfig::default();
        assert_eq!(cfg.fee_bps, 500);
        assert_eq!(cfg.max_bets_per_match, 100);
        assert!(cfg.validate().is_ok());
    }

    #[test]
    fn partial_json_keeps_defaults() {
        let cfg = WagerConfig::from_json_str(r#"{ "fee_bps": 250, "min_bet": 50000000 }"#).unwrap();
        assert_eq!(cfg.fee_bps, 250);
        assert_eq!(cfg.min_bet, 50_000_000);
        assert_eq!(cfg.max_competitor_len, 10);
        assert!(cfg.fee_destination.is_none());
    }

    #[test]
    fn full_fee_rejected() {
        let err = WagerConfig::from_json_str(r#"{ "fee_bps": 10000 }"#).unwrap_err();
        assert!(matches!(err, WagerError::Configuration(_)));
    }

    #[test]
    fn zero_min_bet_rejected() {
        let cfg = WagerConfig {
            min_bet: 0,
            ..WagerConfig::default()
        };
        assert!(cfg.validate().is_err());
    }

    #[test]
    fn malformed_json_is_configuration_error() {
        let err = WagerConfig::from_json_str("{ fee_bps: }").unwrap_err();
        assert!(matches!(err, WagerError::Configuration(_)));
    }

    #[test]
    fn default_fee_destination_is_derived() {
        let cfg = WagerConfig::default();
        let treasury = cfg.fee_destination().unwrap();
        assert!(!treasury.is_on_curve());

        let custom = Address([9u8; 32]);
        let cfg = WagerConfig {
            fee_destination: Some(custom),
            ..WagerConfig::default()
        };
        assert_eq!(cfg.fee_destination().unwrap(), custom);
    }
}
