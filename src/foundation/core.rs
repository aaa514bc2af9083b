/// Reserved scene key meaning "unspecified", valid as from-scene and to-scene independently.
pub const WILDCARD: &str = "Any";

/// Returns `true` when `name` is the [`WILDCARD`] key.
pub fn is_wildcard(name: &str) -> bool {
    name == WILDCARD
}

/// Non-negative transition duration in milliseconds.
///
/// Every external integer (persisted blobs, remote requests, CLI input) enters through
/// [`DurationMs::from_i64`] or [`DurationMs::from_f64`], which clamp instead of wrapping:
/// negatives become `0`, values above `u32::MAX` saturate. Deserialization accepts any JSON
/// number; fractional values are truncated.
#[derive(
    Clone, Copy, Debug, Default, PartialEq, Eq, PartialOrd, Ord, Hash, serde::Serialize, serde::Deserialize,
)]
#[serde(from = "RawDuration", into = "i64")]
pub struct DurationMs(pub u32);

impl DurationMs {
    /// Zero-length duration.
    pub const ZERO: Self = Self(0);

    /// Clamp an arbitrary signed integer into the valid range.
    pub fn from_i64(v: i64) -> Self {
        Self(v.clamp(0, i64::from(u32::MAX)) as u32)
    }

    /// Clamp a float into the valid range, truncating the fraction. `NaN` becomes `0`.
    pub fn from_f64(v: f64) -> Self {
        // `as` saturates and maps NaN to 0.
        Self::from_i64(v as i64)
    }

    /// Duration as a signed integer, the representation host settings stores use.
    pub fn as_i64(self) -> i64 {
        i64::from(self.0)
    }
}

impl From<i64> for DurationMs {
    fn from(v: i64) -> Self {
        Self::from_i64(v)
    }
}

#[derive(serde::Deserialize)]
#[serde(untagged)]
enum RawDuration {
    Signed(i64),
    Unsigned(u64),
    Float(f64),
}

impl From<RawDuration> for DurationMs {
    fn from(raw: RawDuration) -> Self {
        match raw {
            RawDuration::Signed(v) => Self::from_i64(v),
            RawDuration::Unsigned(v) => Self(u32::try_from(v).unwrap_or(u32::MAX)),
            RawDuration::Float(v) => Self::from_f64(v),
        }
    }
}

impl From<DurationMs> for i64 {
    fn from(v: DurationMs) -> Self {
        v.as_i64()
    }
}

impl std::fmt::Display for DurationMs {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}ms", self.0)
    }
}

/// Size of the table editor dialog, remembered across sessions.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct DialogSize {
    /// Width in logical pixels.
    pub width: u32,
    /// Height in logical pixels.
    pub height: u32,
}

impl DialogSize {
    /// Construct a dialog size.
    pub fn new(width: u32, height: u32) -> Self {
        Self { width, height }
    }

    /// `true` when both dimensions are strictly above `floor`.
    ///
    /// Collapsed or degenerate sizes are not persisted.
    pub fn exceeds(self, floor: DialogSize) -> bool {
        self.width > floor.width && self.height > floor.height
    }
}

#[cfg(test)]
#[path = "../../tests/unit/foundation/core.rs"]
mod tests;
