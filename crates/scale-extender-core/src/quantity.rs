//! Kubernetes resource quantity parsing.
//!
//! Quantities follow the API machinery grammar: an optionally signed decimal
//! number followed by a decimal SI suffix (`n`, `u`, `m`, `k`, `M`, `G`, `T`,
//! `P`, `E`), a binary suffix (`Ki` .. `Ei`), or a decimal exponent
//! (`e3`, `E-2`).
//!
//! Conversions to integers round the magnitude up, the same way the API
//! machinery's `Value()` and `MilliValue()` do. CPU is read in millicores so
//! that fractional requests such as `250m` keep their precision; memory is
//! read in whole bytes.

use std::fmt;
use std::str::FromStr;

use k8s_openapi::apimachinery::pkg::api::resource::Quantity;

use crate::error::{CoreError, Result};

/// A parsed Kubernetes resource quantity.
///
/// The value is `sign * digits * 10^exponent * 2^binary_shift`.
#[derive(Clone, PartialEq, Eq)]
pub struct ResourceQuantity {
    negative: bool,
    digits: u128,
    exponent: i32,
    binary_shift: u32,
    raw: String,
}

impl ResourceQuantity {
    /// Parse a quantity string such as `"500m"`, `"1.5Gi"` or `"2"`.
    ///
    /// # Errors
    ///
    /// Returns [`CoreError::InvalidQuantity`] if the string does not follow
    /// the quantity grammar, or [`CoreError::QuantityOutOfRange`] if its
    /// mantissa does not fit in 128 bits.
    pub fn parse(input: &str) -> Result<Self> {
        let raw = input.trim();
        let invalid = || CoreError::InvalidQuantity(input.to_string());

        let (negative, rest) = match raw.as_bytes().first() {
            Some(b'-') => (true, &raw[1..]),
            Some(b'+') => (false, &raw[1..]),
            Some(_) => (false, raw),
            None => return Err(invalid()),
        };

        let number_end = rest
            .find(|c: char| !(c.is_ascii_digit() || c == '.'))
            .unwrap_or(rest.len());
        let (number, suffix) = rest.split_at(number_end);

        let (int_part, frac_part) = number.split_once('.').unwrap_or((number, ""));
        if (int_part.is_empty() && frac_part.is_empty()) || frac_part.contains('.') {
            return Err(invalid());
        }

        let mut digits: u128 = 0;
        for b in int_part.bytes().chain(frac_part.bytes()) {
            digits = digits
                .checked_mul(10)
                .and_then(|d| d.checked_add(u128::from(b - b'0')))
                .ok_or_else(|| CoreError::QuantityOutOfRange(input.to_string()))?;
        }

        let frac_len = i32::try_from(frac_part.len()).map_err(|_| invalid())?;
        let (suffix_exponent, binary_shift) = parse_suffix(suffix).ok_or_else(invalid)?;
        let exponent = suffix_exponent
            .checked_sub(frac_len)
            .ok_or_else(|| CoreError::QuantityOutOfRange(input.to_string()))?;

        Ok(Self {
            negative,
            digits,
            exponent,
            binary_shift,
            raw: raw.to_string(),
        })
    }

    /// Parse a `k8s-openapi` quantity.
    ///
    /// # Errors
    ///
    /// Same as [`ResourceQuantity::parse`].
    pub fn from_k8s(quantity: &Quantity) -> Result<Self> {
        Self::parse(&quantity.0)
    }

    /// The value multiplied by `10^scale`, with the magnitude rounded up.
    ///
    /// # Errors
    ///
    /// Returns [`CoreError::QuantityOutOfRange`] if the result does not fit
    /// in an `i64`.
    pub fn scaled_value(&self, scale: i32) -> Result<i64> {
        let out_of_range = || CoreError::QuantityOutOfRange(self.raw.clone());

        let base = self
            .digits
            .checked_mul(1u128 << self.binary_shift)
            .ok_or_else(out_of_range)?;

        let exponent = self
            .exponent
            .checked_add(scale)
            .ok_or_else(out_of_range)?;
        let magnitude = if exponent >= 0 {
            pow10(exponent.unsigned_abs())
                .and_then(|p| base.checked_mul(p))
                .ok_or_else(out_of_range)?
        } else {
            match pow10(exponent.unsigned_abs()) {
                Some(divisor) => base.div_ceil(divisor),
                // The divisor exceeds any mantissa we can hold.
                None => u128::from(base != 0),
            }
        };

        let magnitude = i64::try_from(magnitude).map_err(|_| out_of_range())?;
        Ok(if self.negative { -magnitude } else { magnitude })
    }

    /// The value in whole units, rounded up (bytes for memory).
    ///
    /// # Errors
    ///
    /// Returns [`CoreError::QuantityOutOfRange`] on overflow.
    pub fn value(&self) -> Result<i64> {
        self.scaled_value(0)
    }

    /// The value in thousandths of a unit, rounded up (millicores for CPU).
    ///
    /// # Errors
    ///
    /// Returns [`CoreError::QuantityOutOfRange`] on overflow.
    pub fn milli_value(&self) -> Result<i64> {
        self.scaled_value(3)
    }

    /// The original string form.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.raw
    }
}

impl FromStr for ResourceQuantity {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self> {
        Self::parse(s)
    }
}

impl fmt::Debug for ResourceQuantity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "ResourceQuantity({})", self.raw)
    }
}

impl fmt::Display for ResourceQuantity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.raw)
    }
}

/// Returns `(decimal exponent, binary shift)` for a suffix.
fn parse_suffix(suffix: &str) -> Option<(i32, u32)> {
    let parsed = match suffix {
        "" => (0, 0),
        "n" => (-9, 0),
        "u" => (-6, 0),
        "m" => (-3, 0),
        "k" => (3, 0),
        "M" => (6, 0),
        "G" => (9, 0),
        "T" => (12, 0),
        "P" => (15, 0),
        "E" => (18, 0),
        "Ki" => (0, 10),
        "Mi" => (0, 20),
        "Gi" => (0, 30),
        "Ti" => (0, 40),
        "Pi" => (0, 50),
        "Ei" => (0, 60),
        other => {
            let exponent = other.strip_prefix(['e', 'E'])?;
            (exponent.parse::<i32>().ok()?, 0)
        }
    };
    Some(parsed)
}

fn pow10(exponent: u32) -> Option<u128> {
    10u128.checked_pow(exponent)
}
