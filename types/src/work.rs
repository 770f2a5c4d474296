//! Chain work derived from a header's compact difficulty target.

use num_bigint::BigUint;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::ops::Add;

/// Amount of expected hashing work, an arbitrary-precision unsigned integer.
///
/// Only ever compared and summed; harder targets yield larger values.
#[derive(Clone, Debug, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct Work(BigUint);

impl Work {
    pub fn zero() -> Self {
        Self(BigUint::default())
    }

    /// Work implied by a compact (`nBits`) target: `2^256 / (target + 1)`.
    ///
    /// Negative, overflowing or zero targets carry no work.
    pub fn from_compact(bits: u32) -> Self {
        match compact_to_target(bits) {
            Some(target) if target != BigUint::default() => {
                let numerator = BigUint::from(1u8) << 256u32;
                Self(numerator / (target + 1u8))
            }
            _ => Self::zero(),
        }
    }

    pub fn is_zero(&self) -> bool {
        self.0 == BigUint::default()
    }

    pub fn as_biguint(&self) -> &BigUint {
        &self.0
    }
}

/// Decode a compact target. Returns `None` for negative or overflowing encodings.
fn compact_to_target(bits: u32) -> Option<BigUint> {
    let size = bits >> 24;
    let word = bits & 0x007f_ffff;

    if word != 0 && bits & 0x0080_0000 != 0 {
        return None;
    }
    if word != 0 && (size > 34 || (word > 0xff && size > 33) || (word > 0xffff && size > 32)) {
        return None;
    }

    let target = if size <= 3 {
        BigUint::from(word >> (8 * (3 - size)))
    } else {
        BigUint::from(word) << (8 * (size - 3))
    };
    Some(target)
}

impl From<u64> for Work {
    fn from(value: u64) -> Self {
        Self(BigUint::from(value))
    }
}

impl Add for Work {
    type Output = Work;

    fn add(self, rhs: Work) -> Work {
        Work(self.0 + rhs.0)
    }
}

impl<'a> Add<&'a Work> for &'a Work {
    type Output = Work;

    fn add(self, rhs: &'a Work) -> Work {
        Work(&self.0 + &rhs.0)
    }
}

impl fmt::Display for Work {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}
