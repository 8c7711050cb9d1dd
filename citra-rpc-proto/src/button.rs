//! Pad button bitmask.

use std::fmt;
use std::ops::{BitAnd, BitOr, BitOrAssign};
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::ProtoError;

/// A set of pad buttons, one bit per button or direction.
///
/// Bits 12..=27 are unused; [`Button::from_bits`] rejects them.
///
/// ```
/// use citra_rpc_proto::Button;
///
/// let combo = Button::A | Button::D_UP;
/// assert!(combo.contains(Button::A));
/// assert_eq!(combo.bits(), 0x41);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Button(u32);

impl Button {
    /// No buttons.
    pub const NONE: Self = Self(0);
    /// A.
    pub const A: Self = Self(1 << 0);
    /// B.
    pub const B: Self = Self(1 << 1);
    /// Select.
    pub const SELECT: Self = Self(1 << 2);
    /// Start.
    pub const START: Self = Self(1 << 3);
    /// D-Pad right.
    pub const D_RIGHT: Self = Self(1 << 4);
    /// D-Pad left.
    pub const D_LEFT: Self = Self(1 << 5);
    /// D-Pad up.
    pub const D_UP: Self = Self(1 << 6);
    /// D-Pad down.
    pub const D_DOWN: Self = Self(1 << 7);
    /// R.
    pub const R: Self = Self(1 << 8);
    /// L.
    pub const L: Self = Self(1 << 9);
    /// X.
    pub const X: Self = Self(1 << 10);
    /// Y.
    pub const Y: Self = Self(1 << 11);
    /// Circle Pad right.
    pub const CIRCLE_RIGHT: Self = Self(1 << 28);
    /// Circle Pad left.
    pub const CIRCLE_LEFT: Self = Self(1 << 29);
    /// Circle Pad up.
    pub const CIRCLE_UP: Self = Self(1 << 30);
    /// Circle Pad down.
    pub const CIRCLE_DOWN: Self = Self(1 << 31);

    /// Every named button with its lowercase name, in bit order.
    pub const NAMED: [(&'static str, Self); 16] = [
        ("a", Self::A),
        ("b", Self::B),
        ("select", Self::SELECT),
        ("start", Self::START),
        ("dright", Self::D_RIGHT),
        ("dleft", Self::D_LEFT),
        ("dup", Self::D_UP),
        ("ddown", Self::D_DOWN),
        ("r", Self::R),
        ("l", Self::L),
        ("x", Self::X),
        ("y", Self::Y),
        ("circleright", Self::CIRCLE_RIGHT),
        ("circleleft", Self::CIRCLE_LEFT),
        ("circleup", Self::CIRCLE_UP),
        ("circledown", Self::CIRCLE_DOWN),
    ];

    /// Mask of all named bits.
    pub const ALL: Self = Self(0xF000_0FFF);

    /// Returns the raw bitmask.
    pub const fn bits(self) -> u32 {
        self.0
    }

    /// Builds a set from a raw mask, rejecting unused bits.
    pub const fn from_bits(bits: u32) -> Option<Self> {
        if bits & !Self::ALL.0 == 0 {
            Some(Self(bits))
        } else {
            None
        }
    }

    /// Builds a set from a raw mask, keeping unused bits as-is.
    pub const fn from_bits_retain(bits: u32) -> Self {
        Self(bits)
    }

    /// Whether every bit of `other` is set in `self`.
    pub const fn contains(self, other: Self) -> bool {
        self.0 & other.0 == other.0
    }

    /// Whether no bit is set.
    pub const fn is_empty(self) -> bool {
        self.0 == 0
    }
}

impl BitOr for Button {
    type Output = Self;

    fn bitor(self, rhs: Self) -> Self {
        Self(self.0 | rhs.0)
    }
}

impl BitOrAssign for Button {
    fn bitor_assign(&mut self, rhs: Self) {
        self.0 |= rhs.0;
    }
}

impl BitAnd for Button {
    type Output = Self;

    fn bitand(self, rhs: Self) -> Self {
        Self(self.0 & rhs.0)
    }
}

impl FromIterator<Self> for Button {
    fn from_iter<I: IntoIterator<Item = Self>>(iter: I) -> Self {
        iter.into_iter().fold(Self::NONE, |acc, b| acc | b)
    }
}

/// Parses a single button name, case-insensitively. `-` and `_` are
/// ignored, so `circle-up`, `CIRCLE_UP` and `circleup` are equivalent.
impl FromStr for Button {
    type Err = ProtoError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let key: String = s
            .chars()
            .filter(|c| !matches!(c, '-' | '_'))
            .map(|c| c.to_ascii_lowercase())
            .collect();
        Self::NAMED
            .iter()
            .find(|(name, _)| *name == key)
            .map(|(_, b)| *b)
            .ok_or_else(|| ProtoError::UnknownButton(s.to_owned()))
    }
}

impl fmt::Display for Button {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_empty() {
            return f.write_str("none");
        }
        let mut first = true;
        for (name, b) in Self::NAMED {
            if self.contains(b) {
                if !first {
                    f.write_str("|")?;
                }
                f.write_str(name)?;
                first = false;
            }
        }
        let unknown = self.0 & !Self::ALL.0;
        if unknown != 0 {
            if !first {
                f.write_str("|")?;
            }
            write!(f, "{unknown:#010x}")?;
        }
        Ok(())
    }
}
