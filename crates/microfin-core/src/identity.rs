//! # Identity Number Parser
//!
//! Decodes a national identity number (NIC) into birth date, gender and age.
//!
//! ## Shapes
//!
//! | Shape   | Layout          | Example        |
//! |---------|-----------------|----------------|
//! | Legacy  | `YY DDD SSSS L` | `850234567V`   |
//! | Current | `YYYY DDD SSSSS`| `198562345678` |
//!
//! `DDD` is the day of year of birth. Values above 500 denote a female
//! holder, and the real day of year is `DDD - 500`. `L` is `V` (voter) or
//! `X` (non-voter).
//!
//! ## Determinism
//!
//! Parsing is a pure function of the input string and the evaluation date.
//! [`parse_on`] takes the date explicitly; [`parse`] reads the local clock
//! once and delegates.

use crate::primitives::{
    CURRENT_WIDTH, DEFAULT_LEGACY_CENTURY, FEMALE_DAY_OFFSET, LEGACY_WIDTH,
    MAX_DAY_OF_YEAR, MAX_RAW_IDENTITY_LENGTH, NON_VOTER_LETTER, VOTER_LETTER,
};
use crate::types::{BirthRecord, Gender, IdentityFormat, MicrofinError};
use chrono::{Datelike, NaiveDate};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

// =============================================================================
// POLICIES
// =============================================================================

/// How a legacy two-digit year is expanded to a full year.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "mode", rename_all = "snake_case")]
pub enum CenturyPolicy {
    /// Always prefix the same century (`19` gives `1900 + yy`).
    Fixed { century: u16 },
    /// Two-digit years `<= pivot` belong to the 2000s, the rest to the 1900s.
    Window { pivot: u8 },
}

impl Default for CenturyPolicy {
    fn default() -> Self {
        CenturyPolicy::Fixed {
            century: DEFAULT_LEGACY_CENTURY,
        }
    }
}

impl CenturyPolicy {
    /// Expand a two-digit year (0..=99).
    #[must_use]
    pub fn full_year(self, two_digit: u16) -> i32 {
        let yy = i32::from(two_digit);
        match self {
            CenturyPolicy::Fixed { century } => i32::from(century) * 100 + yy,
            CenturyPolicy::Window { pivot } => {
                if yy <= i32::from(pivot) {
                    2000 + yy
                } else {
                    1900 + yy
                }
            }
        }
    }
}

/// Treatment of day 366 in a year that has only 365 days.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LeapDayPolicy {
    /// Reject the number.
    #[default]
    Strict,
    /// Accept it and roll over to 1 January of the following year.
    Lenient,
}

/// Configuration of an [`IdentityParser`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct ParserPolicy {
    pub leap_day: LeapDayPolicy,
    pub century: CenturyPolicy,
}

impl ParserPolicy {
    /// Check that the policy values are usable.
    pub fn validate(&self) -> Result<(), MicrofinError> {
        match self.century {
            CenturyPolicy::Fixed { century } if !(1..=99).contains(&century) => {
                Err(MicrofinError::InvalidPolicy(format!(
                    "century prefix {} outside 1..=99",
                    century
                )))
            }
            CenturyPolicy::Window { pivot } if pivot > 99 => Err(MicrofinError::InvalidPolicy(
                format!("century window pivot {} outside 0..=99", pivot),
            )),
            _ => Ok(()),
        }
    }
}

// =============================================================================
// IDENTITY NUMBER
// =============================================================================

/// A shape-checked, normalised identity number.
///
/// Only the fixed-width layout is verified here; the day-of-year range is
/// checked when the number is decoded by an [`IdentityParser`].
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct IdentityNumber {
    normalized: String,
    format: IdentityFormat,
}

impl IdentityNumber {
    /// The trimmed, uppercased form.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.normalized
    }

    #[must_use]
    pub fn format(&self) -> IdentityFormat {
        self.format
    }

    /// The raw year field: two digits for legacy numbers, four for current ones.
    #[must_use]
    pub fn year_field(&self) -> u16 {
        let bytes = self.normalized.as_bytes();
        match self.format {
            IdentityFormat::Legacy { .. } => digits(&bytes[0..2]),
            IdentityFormat::Current => digits(&bytes[0..4]),
        }
    }

    /// The raw, gender-encoded day-of-year field.
    #[must_use]
    pub fn day_field(&self) -> u16 {
        let bytes = self.normalized.as_bytes();
        match self.format {
            IdentityFormat::Legacy { .. } => digits(&bytes[2..5]),
            IdentityFormat::Current => digits(&bytes[4..7]),
        }
    }
}

impl FromStr for IdentityNumber {
    type Err = MicrofinError;

    fn from_str(raw: &str) -> Result<Self, Self::Err> {
        let trimmed = raw.trim();
        if trimmed.len() > MAX_RAW_IDENTITY_LENGTH {
            return Err(MicrofinError::UnrecognizedFormat);
        }
        let normalized = trimmed.to_uppercase();
        let format = classify(normalized.as_bytes()).ok_or(MicrofinError::UnrecognizedFormat)?;
        Ok(Self { normalized, format })
    }
}

impl fmt::Display for IdentityNumber {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.normalized)
    }
}

/// Fixed-width positional match against both shapes.
fn classify(bytes: &[u8]) -> Option<IdentityFormat> {
    match bytes.len() {
        LEGACY_WIDTH if bytes[..LEGACY_WIDTH - 1].iter().all(u8::is_ascii_digit) => {
            match bytes[LEGACY_WIDTH - 1] {
                VOTER_LETTER => Some(IdentityFormat::Legacy { voter: true }),
                NON_VOTER_LETTER => Some(IdentityFormat::Legacy { voter: false }),
                _ => None,
            }
        }
        CURRENT_WIDTH if bytes.iter().all(u8::is_ascii_digit) => Some(IdentityFormat::Current),
        _ => None,
    }
}

/// Decimal value of an all-digit slice of at most four bytes.
fn digits(bytes: &[u8]) -> u16 {
    bytes
        .iter()
        .fold(0u16, |acc, b| acc * 10 + u16::from(b - b'0'))
}

// =============================================================================
// PARSER
// =============================================================================

/// Decodes identity numbers according to a [`ParserPolicy`].
#[derive(Debug, Clone, Copy, Default)]
pub struct IdentityParser {
    policy: ParserPolicy,
}

impl IdentityParser {
    /// Create a parser with the default policy (fixed `19xx`, strict leap day).
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn with_policy(policy: ParserPolicy) -> Self {
        Self { policy }
    }

    #[must_use]
    pub fn policy(&self) -> &ParserPolicy {
        &self.policy
    }

    /// Parse using today's local date for the age.
    pub fn parse(&self, raw: &str) -> Result<BirthRecord, MicrofinError> {
        self.parse_on(raw, chrono::Local::now().date_naive())
    }

    /// Parse with an explicit evaluation date.
    pub fn parse_on(&self, raw: &str, today: NaiveDate) -> Result<BirthRecord, MicrofinError> {
        let number: IdentityNumber = raw.parse()?;
        self.decode(&number, today)
    }

    /// Decode an already shape-checked number.
    pub fn decode(
        &self,
        number: &IdentityNumber,
        today: NaiveDate,
    ) -> Result<BirthRecord, MicrofinError> {
        let year = match number.format() {
            IdentityFormat::Legacy { .. } => self.policy.century.full_year(number.year_field()),
            IdentityFormat::Current => i32::from(number.year_field()),
        };

        let (gender, day_of_year) = split_gender(number.day_field());
        if !(1..=MAX_DAY_OF_YEAR).contains(&day_of_year) {
            return Err(MicrofinError::UnrecognizedFormat);
        }

        let date_of_birth = self.ordinal_date(year, day_of_year)?;

        Ok(BirthRecord {
            date_of_birth,
            gender,
            age: age_from_year(year, date_of_birth, today),
            day_of_year,
            format: number.format(),
        })
    }

    fn ordinal_date(&self, year: i32, day_of_year: u16) -> Result<NaiveDate, MicrofinError> {
        match NaiveDate::from_yo_opt(year, u32::from(day_of_year)) {
            Some(date) => Ok(date),
            None if day_of_year == MAX_DAY_OF_YEAR
                && self.policy.leap_day == LeapDayPolicy::Lenient =>
            {
                NaiveDate::from_ymd_opt(year + 1, 1, 1).ok_or(MicrofinError::UnrecognizedFormat)
            }
            None => Err(MicrofinError::UnrecognizedFormat),
        }
    }
}

/// Split the raw day field into gender and true day of year.
fn split_gender(field: u16) -> (Gender, u16) {
    if field > FEMALE_DAY_OFFSET {
        (Gender::Female, field - FEMALE_DAY_OFFSET)
    } else {
        (Gender::Male, field)
    }
}

/// Completed years between `birth` and `today`.
///
/// Birth dates after `today` yield 0.
#[must_use]
pub fn age_on(birth: NaiveDate, today: NaiveDate) -> u32 {
    age_from_year(birth.year(), birth, today)
}

/// Age counted from the encoded `birth_year`, decremented when this year's
/// month/day of `birthday` is still ahead.
///
/// Differs from [`age_on`] only for a lenient leap-day rollover, where
/// `birthday` falls in the year after `birth_year`.
fn age_from_year(birth_year: i32, birthday: NaiveDate, today: NaiveDate) -> u32 {
    let mut years = today.year() - birth_year;
    if (today.month(), today.day()) < (birthday.month(), birthday.day()) {
        years -= 1;
    }
    u32::try_from(years).unwrap_or(0)
}

// =============================================================================
// CONVENIENCE
// =============================================================================

/// Parse with the default policy and today's local date.
pub fn parse(raw: &str) -> Result<BirthRecord, MicrofinError> {
    IdentityParser::new().parse(raw)
}

/// Parse with the default policy and an explicit evaluation date.
pub fn parse_on(raw: &str, today: NaiveDate) -> Result<BirthRecord, MicrofinError> {
    IdentityParser::new().parse_on(raw, today)
}

// =============================================================================
// TESTS
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).expect("valid date")
    }

    #[test]
    fn legacy_examples() {
        // Day field 623 is above the offset.
        let record = parse_on("856234567V", date(2026, 10, 16)).expect("parse");
        assert_eq!(record.gender, Gender::Female);
        assert_eq!(record.date_of_birth, date(1985, 5, 3));

        let record = parse_on("850234567V", date(2026, 10, 16)).expect("parse");
        assert_eq!(record.gender, Gender::Male);
        assert_eq!(record.dob_string(), "1985-01-23");
        assert_eq!(record.format, IdentityFormat::Legacy { voter: true });
    }

    #[test]
    fn current_female_example() {
        let record = parse_on("198562345678", date(2026, 10, 16)).expect("parse");
        assert_eq!(record.gender, Gender::Female);
        assert_eq!(record.day_of_year, 123);
        assert_eq!(record.dob_string(), "1985-05-03");
        assert_eq!(record.age, 41);
        assert_eq!(record.format, IdentityFormat::Current);
    }

    #[test]
    fn input_is_trimmed_and_uppercased() {
        let record = parse_on("  850234567x ", date(2026, 1, 1)).expect("parse");
        assert_eq!(record.format, IdentityFormat::Legacy { voter: false });
    }

    #[test]
    fn wrong_shapes_rejected() {
        let today = date(2026, 1, 1);
        for raw in [
            "",
            "85023456V",
            "8502345678V",
            "850234567Z",
            "85023456AV",
            "19856234567",
            "1985623456789",
            "19856234567A",
        ] {
            assert!(
                matches!(parse_on(raw, today), Err(MicrofinError::UnrecognizedFormat)),
                "{raw} should be rejected"
            );
        }
    }

    #[test]
    fn day_zero_and_out_of_range_rejected() {
        let today = date(2026, 1, 1);
        assert!(parse_on("850004567V", today).is_err());
        assert!(parse_on("198550045678", today).is_err());
        assert!(parse_on("198536745678", today).is_err());
        assert!(parse_on("198586745678", today).is_err());
    }

    #[test]
    fn leap_day_strict_and_lenient() {
        let today = date(2026, 1, 1);
        // 1984 is a leap year: day 366 is 31 December.
        let record = parse_on("198436645678", today).expect("leap year");
        assert_eq!(record.date_of_birth, date(1984, 12, 31));

        // 1985 is not.
        assert!(parse_on("198536645678", today).is_err());

        let lenient = IdentityParser::with_policy(ParserPolicy {
            leap_day: LeapDayPolicy::Lenient,
            ..ParserPolicy::default()
        });
        let record = lenient.parse_on("198536645678", today).expect("lenient");
        assert_eq!(record.date_of_birth, date(1986, 1, 1));
    }

    #[test]
    fn lenient_rollover_age_counts_from_encoded_year() {
        let lenient = IdentityParser::with_policy(ParserPolicy {
            leap_day: LeapDayPolicy::Lenient,
            ..ParserPolicy::default()
        });
        let record = lenient
            .parse_on("198536645678", date(2026, 6, 1))
            .expect("lenient");
        assert_eq!(record.date_of_birth, date(1986, 1, 1));
        assert_eq!(record.age, 41);

        let record = lenient
            .parse_on("198536645678", date(1985, 12, 31))
            .expect("lenient");
        assert_eq!(record.age, 0);
    }

    #[test]
    fn century_window_policy() {
        let parser = IdentityParser::with_policy(ParserPolicy {
            century: CenturyPolicy::Window { pivot: 10 },
            ..ParserPolicy::default()
        });
        let today = date(2026, 6, 1);
        assert_eq!(
            parser.parse_on("050234567V", today).expect("2005").date_of_birth,
            date(2005, 1, 23)
        );
        assert_eq!(
            parser.parse_on("850234567V", today).expect("1985").date_of_birth,
            date(1985, 1, 23)
        );
    }

    #[test]
    fn age_decrements_before_birthday() {
        let birth = date(1985, 5, 3);
        assert_eq!(age_on(birth, date(2026, 5, 2)), 40);
        assert_eq!(age_on(birth, date(2026, 5, 3)), 41);
        assert_eq!(age_on(birth, date(2026, 12, 31)), 41);
    }

    #[test]
    fn age_for_leap_day_birth() {
        let birth = date(1984, 2, 29);
        assert_eq!(age_on(birth, date(2025, 2, 28)), 40);
        assert_eq!(age_on(birth, date(2025, 3, 1)), 41);
    }

    #[test]
    fn future_birth_has_zero_age() {
        assert_eq!(age_on(date(2030, 1, 1), date(2026, 1, 1)), 0);
    }

    #[test]
    fn policy_validation() {
        assert!(ParserPolicy::default().validate().is_ok());
        let bad = ParserPolicy {
            century: CenturyPolicy::Fixed { century: 120 },
            ..ParserPolicy::default()
        };
        assert!(matches!(bad.validate(), Err(MicrofinError::InvalidPolicy(_))));
    }

    #[test]
    fn identity_number_fields() {
        let number: IdentityNumber = "198562345678".parse().expect("shape");
        assert_eq!(number.year_field(), 1985);
        assert_eq!(number.day_field(), 623);
        assert_eq!(number.format().width(), 12);
    }
}
