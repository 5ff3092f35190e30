use std::fmt;

use crate::loyalty::LoyaltyErrors;

/// Phone number accepted as an account identity key: an optional leading `+`
/// followed by 4 to 20 ASCII digits, with surrounding whitespace dropped.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PhoneNumber(String);

impl PhoneNumber {
    const MIN_DIGITS: usize = 4;
    const MAX_DIGITS: usize = 20;

    pub fn parse(input: &str) -> Result<Self, LoyaltyErrors> {
        let trimmed = input.trim();
        let digits = trimmed.strip_prefix('+').unwrap_or(trimmed);

        if digits.len() < Self::MIN_DIGITS || digits.len() > Self::MAX_DIGITS {
            return Err(LoyaltyErrors::InvalidValues(format!(
                "Phone number must have between {} and {} digits",
                Self::MIN_DIGITS,
                Self::MAX_DIGITS
            )));
        }

        if !digits.chars().all(|c| c.is_ascii_digit()) {
            return Err(LoyaltyErrors::InvalidValues(
                "Phone number may only contain digits and a leading '+'".to_string(),
            ));
        }

        Ok(Self(trimmed.to_string()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Key used to read an existing account. Stored rows may predate the
    /// `parse` contract, so lookups only trim and reject blank input.
    pub fn lookup_key(input: &str) -> Result<&str, LoyaltyErrors> {
        let trimmed = input.trim();

        if trimmed.is_empty() {
            return Err(LoyaltyErrors::InvalidValues(
                "Phone cannot be empty".to_string(),
            ));
        }

        Ok(trimmed)
    }
}

impl fmt::Display for PhoneNumber {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Spend amount as typed on the keypad, in the smallest currency unit.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SpendAmount(u64);

impl SpendAmount {
    pub fn parse(input: &str) -> Result<Self, LoyaltyErrors> {
        if input.is_empty() {
            return Err(LoyaltyErrors::InvalidValues(
                "Spend amount cannot be empty".to_string(),
            ));
        }

        if !input.chars().all(|c| c.is_ascii_digit()) {
            return Err(LoyaltyErrors::InvalidValues(format!(
                "Spend amount '{}' must contain digits only",
                input
            )));
        }

        input
            .parse::<u64>()
            .map(Self)
            .map_err(|_| LoyaltyErrors::InvalidValues(format!("Spend amount '{}' is too large", input)))
    }

    pub fn value(&self) -> u64 {
        self.0
    }
}
