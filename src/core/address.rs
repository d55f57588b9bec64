//! Address type for remote memory spaces.
//!
//! Debug targets may expose address spaces wider than 64 bits, so an
//! [`Address`] is an arbitrary-precision unsigned offset. Arithmetic never
//! wraps: subtraction saturates at zero and callers clamp against block
//! bounds afterwards.

use num_bigint::BigUint;
use num_traits::{ToPrimitive, Zero};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::ops::Add;

/// Hex digit count above which an address is assumed to be 8 bytes wide.
const WIDE_ADDRESS_DIGITS: usize = 8;

/// An offset in a linear addressable space.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize, Default)]
#[serde(transparent)]
pub struct Address(BigUint);

impl Address {
    pub fn new(value: impl Into<BigUint>) -> Self {
        Self(value.into())
    }

    pub fn zero() -> Self {
        Self(BigUint::zero())
    }

    /// Parse a hex string, with or without a `0x` prefix.
    pub fn from_hex(text: &str) -> Result<Self, String> {
        let digits = text
            .strip_prefix("0x")
            .or_else(|| text.strip_prefix("0X"))
            .unwrap_or(text);
        if digits.is_empty() {
            return Err("empty address".to_string());
        }
        BigUint::parse_bytes(digits.as_bytes(), 16)
            .map(Self)
            .ok_or_else(|| format!("invalid hex address: {}", text))
    }

    pub fn value(&self) -> &BigUint {
        &self.0
    }

    pub fn into_inner(self) -> BigUint {
        self.0
    }

    pub fn is_zero(&self) -> bool {
        self.0.is_zero()
    }

    /// The address as u64, if it fits.
    pub fn to_u64(&self) -> Option<u64> {
        self.0.to_u64()
    }

    pub fn add_units(&self, units: u64) -> Self {
        Self(&self.0 + units)
    }

    /// Subtract, stopping at zero.
    pub fn saturating_sub_units(&self, units: u64) -> Self {
        let units = BigUint::from(units);
        if units >= self.0 {
            Self::zero()
        } else {
            Self(&self.0 - units)
        }
    }

    /// Subtract another address, stopping at zero.
    pub fn saturating_sub(&self, other: &Address) -> BigUint {
        if other.0 >= self.0 {
            BigUint::zero()
        } else {
            &self.0 - &other.0
        }
    }

    /// Round down to the nearest multiple of `boundary`.
    pub fn align_down(&self, boundary: u64) -> Self {
        if boundary <= 1 {
            return self.clone();
        }
        let rem = &self.0 % boundary;
        Self(&self.0 - rem)
    }

    /// Whether the address is a multiple of `boundary`.
    pub fn is_aligned(&self, boundary: u64) -> bool {
        boundary <= 1 || (&self.0 % boundary).is_zero()
    }

    /// Number of address bytes to show when the store does not say.
    pub fn inferred_size(&self) -> usize {
        if self.0.to_str_radix(16).len() > WIDE_ADDRESS_DIGITS {
            8
        } else {
            4
        }
    }

    /// Upper-case hex, zero-padded to `2 * address_size` digits.
    pub fn padded_hex(&self, address_size: usize) -> String {
        let digits = self.0.to_str_radix(16).to_uppercase();
        let width = address_size * 2;
        if digits.len() >= width {
            digits
        } else {
            format!("{}{}", "0".repeat(width - digits.len()), digits)
        }
    }
}

impl From<u64> for Address {
    fn from(value: u64) -> Self {
        Self(BigUint::from(value))
    }
}

impl From<BigUint> for Address {
    fn from(value: BigUint) -> Self {
        Self(value)
    }
}

impl Add<u64> for &Address {
    type Output = Address;

    fn add(self, rhs: u64) -> Address {
        self.add_units(rhs)
    }
}

impl Add<&BigUint> for &Address {
    type Output = Address;

    fn add(self, rhs: &BigUint) -> Address {
        Address(&self.0 + rhs)
    }
}

impl fmt::Display for Address {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:#x}", self.0)
    }
}

impl fmt::LowerHex for Address {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::LowerHex::fmt(&self.0, f)
    }
}

impl fmt::UpperHex for Address {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::UpperHex::fmt(&self.0, f)
    }
}
