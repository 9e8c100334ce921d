//! System-wide constants for the Wagerbook settlement state machine.

use rust_decimal::Decimal;

/// Seed for the singleton escrow registry ("house wallet") address.
pub const REGISTRY_SEED: &[u8] = b"house";

/// Seed for the default fee-collection (treasury) address.
pub const TREASURY_SEED: &[u8] = b"treasury";

/// Domain label hashed into the program identity.
pub const PROGRAM_ID_LABEL: &[u8] = b"wagerbook:program:v1";

/// Domain separator appended when deriving program addresses.
pub const DERIVATION_MARKER: &[u8] = b"wagerbook:derived";

/// Maximum number of seeds accepted by address derivation.
pub const MAX_SEEDS: usize = 16;

/// Maximum length of a single derivation seed, in bytes.
pub const MAX_SEED_LEN: usize = 32;

/// Lamports per SOL (smallest currency unit scale).
pub const LAMPORTS_PER_SOL: u64 = 1_000_000_000;

/// Decimal scale of one lamport relative to one SOL.
pub const LAMPORT_SCALE: u32 = 9;

/// Per-account storage overhead counted towards the rent-exempt minimum.
pub const ACCOUNT_STORAGE_OVERHEAD: u64 = 128;

/// Rent-exempt lamports per byte (two years of 3,480 lamports/byte-year).
pub const RENT_LAMPORTS_PER_BYTE: u64 = 6_960;

/// Account discriminator size prefixed to every program record.
pub const DISCRIMINATOR_LEN: usize = 8;

/// Basis-point denominator for fee computation.
pub const BPS_DENOMINATOR: u64 = 10_000;

/// Default protocol fee: 5% of the prize pool.
pub const DEFAULT_FEE_BPS: u64 = 500;

/// Default minimum bet (any positive amount).
pub const DEFAULT_MIN_BET: u64 = 1;

/// Default bet ledger capacity per match.
pub const DEFAULT_MAX_BETS_PER_MATCH: usize = 100;

/// Default maximum `match_id` length in bytes.
pub const DEFAULT_MAX_MATCH_ID_LEN: usize = 32;

/// Default maximum competitor label length in bytes.
pub const DEFAULT_MAX_COMPETITOR_LEN: usize = 10;

/// Version string.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Engine name.
pub const ENGINE_NAME: &str = "Wagerbook";

/// Render a lamport amount as SOL for logs and receipts.
#[must_use]
pub fn lamports_to_sol(lamports: u64) -> Decimal {
    Decimal::from_i128_with_scale(i128::from(lamports), LAMPORT_SCALE)
}

/// Rent-exempt minimum balance for an account holding `space` bytes.
#[must_use]
pub fn rent_exempt_minimum(space: usize) -> u64 {
    (ACCOUNT_STORAGE_OVERHEAD + space as u64) * RENT_LAMPORTS_PER_BYTE
}
