//! # Innate Primitives
//!
//! Fixed constants of the national identity number layout and the console's
//! access defaults. These are compiled in; anything a deployment may need to
//! change lives in [`crate::policy`] instead.

/// Offset added to the day-of-year field to encode female gender.
///
/// A raw field above this value denotes a female holder; the true day of
/// year is `field - FEMALE_DAY_OFFSET`.
pub const FEMALE_DAY_OFFSET: u16 = 500;

/// Largest accepted gender-adjusted day of year.
pub const MAX_DAY_OF_YEAR: u16 = 366;

/// Character width of the legacy shape (`YYDDDSSSSL`).
pub const LEGACY_WIDTH: usize = 10;

/// Character width of the current shape (`YYYYDDDSSSSS`).
pub const CURRENT_WIDTH: usize = 12;

/// Century prefix applied to legacy two-digit years by default.
pub const DEFAULT_LEGACY_CENTURY: u16 = 19;

/// Terminal letter marking a legacy holder registered as a voter.
pub const VOTER_LETTER: u8 = b'V';

/// Terminal letter marking a legacy holder not registered as a voter.
pub const NON_VOTER_LETTER: u8 = b'X';

// =============================================================================
// INPUT VALIDATION LIMITS
// =============================================================================

/// Longest identity string accepted after trimming, before uppercasing.
///
/// Surrounding whitespace is not counted. Longer content cannot match either
/// shape and is rejected without further work.
pub const MAX_RAW_IDENTITY_LENGTH: usize = 64;

/// Maximum number of permission keys accepted for a single session.
pub const MAX_SESSION_PERMISSIONS: usize = 256;

// =============================================================================
// ACCESS DEFAULTS
// =============================================================================

/// Where a denied page sends the user.
pub const DEFAULT_REDIRECT_PATH: &str = "/";
