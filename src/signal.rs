//! The four-valued logic signal carried by every pin and wire.
//!
//! Besides the two definite levels, a [`Signal`] can be [`Signal::Undefined`]
//! (nothing has determined the value yet, e.g. an unconnected input) or
//! [`Signal::Error`] (the value is known to be wrong, e.g. two drivers fight
//! over a pin). The logic operators keep these apart:
//! an `Error` operand always wins, and `Undefined` only survives when no other
//! operand forces a definite result.

use serde::{Deserialize, Serialize};

/// A four-valued logic level.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Signal {
    /// Logic 0.
    Low,
    /// Logic 1.
    High,
    /// Not (yet) determined.
    #[default]
    Undefined,
    /// Known to be erroneous.
    Error,
}
impl Signal {
    /// Whether this is one of the two definite levels.
    pub fn is_definite(self) -> bool {
        matches!(self, Signal::Low | Signal::High)
    }

    /// Collapses [`Signal::Error`] into [`Signal::Undefined`].
    ///
    /// Used when a value is put into long-lived storage:
    /// an error belongs to the evaluation which observed it,
    /// later evaluations only know the stored level is indeterminate.
    ///
    /// ```
    /// use circuitforge_engine::signal::Signal;
    ///
    /// assert_eq!(Signal::Error.settled(), Signal::Undefined);
    /// assert_eq!(Signal::High.settled(), Signal::High);
    /// ```
    pub fn settled(self) -> Self {
        match self {
            Signal::Error => Signal::Undefined,
            s => s,
        }
    }
}
impl std::fmt::Display for Signal {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(match self {
            Signal::Low       => "LOW",
            Signal::High      => "HIGH",
            Signal::Undefined => "UNDEFINED",
            Signal::Error     => "ERROR",
        })
    }
}

/// Error returned when a non-definite [`Signal`] is read as a `bool`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct NotTwoValuedErr(Signal);
impl NotTwoValuedErr {
    /// Whether the offending signal was [`Signal::Error`].
    pub fn is_error(&self) -> bool { self.0 == Signal::Error }
    /// The offending signal.
    pub fn signal(&self) -> Signal { self.0 }
}

impl TryFrom<Signal> for bool {
    type Error = NotTwoValuedErr;

    fn try_from(value: Signal) -> Result<Self, Self::Error> {
        match value {
            Signal::Low  => Ok(false),
            Signal::High => Ok(true),
            s => Err(NotTwoValuedErr(s)),
        }
    }
}
impl From<bool> for Signal {
    fn from(value: bool) -> Self {
        match value {
            true  => Signal::High,
            false => Signal::Low,
        }
    }
}

impl std::ops::BitAnd for Signal {
    type Output = Self;

    fn bitand(self, rhs: Self) -> Self::Output {
        // Identities:
        // E & a = E
        // F & a = F
        // T & a = a
        match (self, rhs) {
            (Signal::Error, _) | (_, Signal::Error) => Signal::Error,
            (Signal::Low, _) | (_, Signal::Low) => Signal::Low,
            (Signal::High, a) | (a, Signal::High) => a,
            _ => Signal::Undefined,
        }
    }
}
impl std::ops::BitOr for Signal {
    type Output = Self;

    fn bitor(self, rhs: Self) -> Self::Output {
        // Identities:
        // E | a = E
        // T | a = T
        // F | a = a
        match (self, rhs) {
            (Signal::Error, _) | (_, Signal::Error) => Signal::Error,
            (Signal::High, _) | (_, Signal::High) => Signal::High,
            (Signal::Low, a) | (a, Signal::Low) => a,
            _ => Signal::Undefined,
        }
    }
}
impl std::ops::BitXor for Signal {
    type Output = Self;

    fn bitxor(self, rhs: Self) -> Self::Output {
        match (self, rhs) {
            (Signal::Error, _) | (_, Signal::Error) => Signal::Error,
            (a, b) => match Option::zip(bool::try_from(a).ok(), bool::try_from(b).ok()) {
                Some((a, b)) => Self::from(a ^ b),
                None => Signal::Undefined,
            },
        }
    }
}
impl std::ops::Not for Signal {
    type Output = Self;

    fn not(self) -> Self::Output {
        match self {
            Signal::High => Signal::Low,
            Signal::Low  => Signal::High,
            s => s,
        }
    }
}

/// Reads a little-endian group of signals (bit 0 first) as an integer.
///
/// If any bit is not definite, this returns the "worst" offending signal:
/// [`Signal::Error`] if any bit is an error, [`Signal::Undefined`] otherwise.
///
/// ```
/// use circuitforge_engine::signal::{pack_bits, Signal};
///
/// assert_eq!(pack_bits(&[Signal::High, Signal::Low, Signal::High]), Ok(0b101));
/// assert_eq!(pack_bits(&[Signal::High, Signal::Undefined]), Err(Signal::Undefined));
/// assert_eq!(pack_bits(&[Signal::Undefined, Signal::Error]), Err(Signal::Error));
/// ```
pub fn pack_bits(bits: &[Signal]) -> Result<u64, Signal> {
    debug_assert!(bits.len() <= 64, "too many bits to pack into a u64");
    let mut result = Ok(0);
    for (i, &bit) in bits.iter().enumerate() {
        result = match (result, bool::try_from(bit)) {
            (Err(Signal::Error), _) => Err(Signal::Error),
            (Err(_), Err(e)) | (Ok(_), Err(e)) => Err(e.signal()),
            (Err(e), Ok(_)) => Err(e),
            (Ok(n), Ok(b)) => Ok(n | (u64::from(b) << i)),
        };
    }
    result
}

/// Splits an integer into `len` little-endian signals (bit 0 first).
///
/// ```
/// use circuitforge_engine::signal::{unpack_bits, Signal};
///
/// let bits: Vec<_> = unpack_bits(0b10, 3).collect();
/// assert_eq!(bits, [Signal::Low, Signal::High, Signal::Low]);
/// ```
pub fn unpack_bits(value: u64, len: usize) -> impl Iterator<Item = Signal> {
    (0..len).map(move |i| Signal::from(i < 64 && (value >> i) & 1 != 0))
}
