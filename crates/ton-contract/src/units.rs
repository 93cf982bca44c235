//! Nanoton conversions.

use crate::{ContractError, ContractResult};

/// Nanotons per TON.
pub const NANO_PER_TON: u128 = 1_000_000_000;

const DECIMALS: usize = 9;

/// Parse a decimal TON amount into nanotons.
///
/// ```
/// use ton_contract::to_nano;
///
/// assert_eq!(to_nano("1").unwrap(), 1_000_000_000);
/// assert_eq!(to_nano("0.05").unwrap(), 50_000_000);
/// assert!(to_nano("0.0000000001").is_err());
/// ```
pub fn to_nano(amount: &str) -> ContractResult<u128> {
    let invalid = || ContractError::InvalidAmount(amount.to_string());
    let amount = amount.trim();
    let (whole, fraction) = amount.split_once('.').unwrap_or((amount, ""));
    if whole.is_empty() && fraction.is_empty() {
        return Err(invalid());
    }
    if fraction.len() > DECIMALS || !fraction.bytes().all(|b| b.is_ascii_digit()) {
        return Err(invalid());
    }
    if !whole.bytes().all(|b| b.is_ascii_digit()) {
        return Err(invalid());
    }

    let whole: u128 = if whole.is_empty() {
        0
    } else {
        whole.parse().map_err(|_| invalid())?
    };
    let fraction: u128 = if fraction.is_empty() {
        0
    } else {
        let padded = format!("{:0<width$}", fraction, width = DECIMALS);
        padded.parse().map_err(|_| invalid())?
    };

    whole
        .checked_mul(NANO_PER_TON)
        .and_then(|n| n.checked_add(fraction))
        .ok_or_else(invalid)
}

/// Format nanotons as a decimal TON amount without trailing zeros.
pub fn from_nano(amount: u128) -> String {
    let whole = amount / NANO_PER_TON;
    let fraction = amount % NANO_PER_TON;
    if fraction == 0 {
        return whole.to_string();
    }
    let fraction = format!("{:09}", fraction);
    format!("{}.{}", whole, fraction.trim_end_matches('0'))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_to_nano() {
        assert_eq!(to_nano("2").unwrap(), 2 * NANO_PER_TON);
        assert_eq!(to_nano("2.5").unwrap(), 2_500_000_000);
        assert_eq!(to_nano(".5").unwrap(), 500_000_000);
        assert_eq!(to_nano("100").unwrap(), 100_000_000_000);
        assert_eq!(to_nano("0.000000001").unwrap(), 1);
    }

    #[test]
    fn test_to_nano_rejects_garbage() {
        for bad in ["", ".", "-1", "1.2.3", "abc", "1e9", "1.0000000001"] {
            assert!(to_nano(bad).is_err(), "{bad:?} accepted");
        }
    }

    #[test]
    fn test_from_nano() {
        assert_eq!(from_nano(50_000_000), "0.05");
        assert_eq!(from_nano(3 * NANO_PER_TON), "3");
        assert_eq!(from_nano(1), "0.000000001");
    }
}
