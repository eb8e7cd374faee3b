use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

/// Currency amount in minor units (paise)
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Amount(pub i64);

#[derive(Debug, Error, PartialEq, Eq)]
pub enum AmountParseError {
    #[error("amount is empty")]
    Empty,
    #[error("invalid amount '{0}': expected digits with at most two decimals")]
    Invalid(String),
    #[error("amount '{0}' is too large")]
    Overflow(String),
}

impl Amount {
    pub fn minor(&self) -> i64 {
        self.0
    }
}

impl FromStr for Amount {
    type Err = AmountParseError;

    /// Accepts `12500`, `12500.5`, `12500.50`, with an optional leading `-`
    /// and `,` digit grouping ("1,25,000.00").
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let cleaned: String = s.trim().chars().filter(|c| *c != ',').collect();
        if cleaned.is_empty() {
            return Err(AmountParseError::Empty);
        }

        let (negative, digits) = match cleaned.strip_prefix('-') {
            Some(rest) => (true, rest),
            None => (false, cleaned.as_str()),
        };

        let (whole, fraction) = digits.split_once('.').unwrap_or((digits, ""));
        let valid = !whole.is_empty()
            && whole.bytes().all(|b| b.is_ascii_digit())
            && fraction.len() <= 2
            && fraction.bytes().all(|b| b.is_ascii_digit());
        if !valid {
            return Err(AmountParseError::Invalid(s.to_string()));
        }

        let overflow = || AmountParseError::Overflow(s.to_string());
        let whole: i64 = whole.parse().map_err(|_| overflow())?;
        let fraction: i64 = match fraction.len() {
            0 => 0,
            1 => fraction.parse::<i64>().map_err(|_| overflow())? * 10,
            _ => fraction.parse().map_err(|_| overflow())?,
        };
        let minor = whole
            .checked_mul(100)
            .and_then(|v| v.checked_add(fraction))
            .ok_or_else(overflow)?;

        Ok(Amount(if negative { -minor } else { minor }))
    }
}

impl fmt::Display for Amount {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let sign = if self.0 < 0 { "-" } else { "" };
        let abs = self.0.unsigned_abs();
        write!(f, "{}{}.{:02}", sign, abs / 100, abs % 100)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_whole_and_fractional_amounts() {
        assert_eq!("12500".parse::<Amount>().unwrap(), Amount(1_250_000));
        assert_eq!("12500.5".parse::<Amount>().unwrap(), Amount(1_250_050));
        assert_eq!("12500.05".parse::<Amount>().unwrap(), Amount(1_250_005));
        assert_eq!("1,25,000.00".parse::<Amount>().unwrap(), Amount(12_500_000));
        assert_eq!("-3.10".parse::<Amount>().unwrap(), Amount(-310));
    }

    #[test]
    fn rejects_malformed_amounts() {
        assert_eq!("".parse::<Amount>(), Err(AmountParseError::Empty));
        assert!(matches!("12.345".parse::<Amount>(), Err(AmountParseError::Invalid(_))));
        assert!(matches!("abc".parse::<Amount>(), Err(AmountParseError::Invalid(_))));
        assert!(matches!(".50".parse::<Amount>(), Err(AmountParseError::Invalid(_))));
        assert!(matches!(
            "99999999999999999999".parse::<Amount>(),
            Err(AmountParseError::Overflow(_))
        ));
    }

    #[test]
    fn displays_two_decimals() {
        assert_eq!(Amount(1_250_050).to_string(), "12500.50");
        assert_eq!(Amount(5).to_string(), "0.05");
        assert_eq!(Amount(-310).to_string(), "-3.10");
    }

    #[test]
    fn serializes_as_minor_units() {
        assert_eq!(serde_json::to_value(Amount(1999)).unwrap(), serde_json::json!(1999));
    }
}
