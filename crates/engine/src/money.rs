use std::{fmt, str::FromStr};

use crate::EngineError;

/// An amount in minor units (paisa, cents), printed and parsed with two
/// decimals.
///
/// Records and balances store plain `i64` minor units. `Money` is how user
/// text becomes one of those and how one is shown back.
///
/// # Examples
///
/// ```rust
/// use engine::Money;
///
/// assert_eq!("10".parse::<Money>().unwrap().minor(), 1000);
/// assert_eq!("10,5".parse::<Money>().unwrap().minor(), 1050);
/// assert_eq!(Money::new(-1234).to_string(), "-12.34");
/// assert!("12.345".parse::<Money>().is_err());
/// ```
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, PartialOrd, Ord)]
pub struct Money(i64);

impl Money {
    #[must_use]
    pub const fn new(minor: i64) -> Self {
        Self(minor)
    }

    #[must_use]
    pub const fn minor(self) -> i64 {
        self.0
    }
}

impl fmt::Display for Money {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let cents = self.0.unsigned_abs();
        if self.0 < 0 {
            f.write_str("-")?;
        }
        write!(f, "{}.{:02}", cents / 100, cents % 100)
    }
}

fn digits(text: &str, input: &str) -> Result<i64, EngineError> {
    if !text.bytes().all(|b| b.is_ascii_digit()) {
        return Err(EngineError::InvalidAmount(format!("invalid amount: {input}")));
    }
    text.parse()
        .map_err(|_| EngineError::InvalidAmount("amount too large".to_string()))
}

impl FromStr for Money {
    type Err = EngineError;

    /// Reads `[+-]units[.cents]`, with `,` accepted in place of `.` and at
    /// most two digits after the separator.
    fn from_str(input: &str) -> Result<Self, Self::Err> {
        let text = input.trim();
        let (sign, text) = match text.as_bytes().first() {
            Some(b'-') => (-1, text[1..].trim_start()),
            Some(b'+') => (1, text[1..].trim_start()),
            _ => (1, text),
        };
        if text.is_empty() {
            return Err(EngineError::InvalidAmount("empty amount".to_string()));
        }

        let (units, cents) = text.split_once(['.', ',']).unwrap_or((text, ""));
        if units.is_empty() {
            return Err(EngineError::InvalidAmount(format!("invalid amount: {input}")));
        }
        let cents = match cents.len() {
            0 => 0,
            1 => digits(cents, input)? * 10,
            2 => digits(cents, input)?,
            _ => return Err(EngineError::InvalidAmount("too many decimals".to_string())),
        };

        digits(units, input)?
            .checked_mul(100)
            .and_then(|minor| minor.checked_add(cents))
            .map(|minor| Money(sign * minor))
            .ok_or_else(|| EngineError::InvalidAmount("amount too large".to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display_formats_two_decimals() {
        assert_eq!(Money::new(0).to_string(), "0.00");
        assert_eq!(Money::new(1).to_string(), "0.01");
        assert_eq!(Money::new(1050).to_string(), "10.50");
        assert_eq!(Money::new(-1050).to_string(), "-10.50");
    }

    #[test]
    fn parse_accepts_dot_or_comma() {
        assert_eq!("10".parse::<Money>().unwrap().minor(), 1000);
        assert_eq!("10.5".parse::<Money>().unwrap().minor(), 1050);
        assert_eq!("10,50".parse::<Money>().unwrap().minor(), 1050);
        assert_eq!("-0.01".parse::<Money>().unwrap().minor(), -1);
        assert_eq!("+1.00".parse::<Money>().unwrap().minor(), 100);
        assert_eq!("  2.30 ".parse::<Money>().unwrap().minor(), 230);
        assert_eq!("7.".parse::<Money>().unwrap().minor(), 700);
    }

    #[test]
    fn parse_rejects_garbage() {
        assert!("12.345".parse::<Money>().is_err());
        assert!("".parse::<Money>().is_err());
        assert!("-".parse::<Money>().is_err());
        assert!("1.2.3".parse::<Money>().is_err());
        assert!("abc".parse::<Money>().is_err());
        assert!(".50".parse::<Money>().is_err());
        assert!("1e3".parse::<Money>().is_err());
        assert!("99999999999999999999".parse::<Money>().is_err());
    }
}
