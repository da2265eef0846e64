//! BLS period codes.
//!
//! The upstream series files encode the observation period as a short string
//! (`Q01`..`Q04` for quarters, `Q05` for the annual average, `M13` for annual
//! averages of monthly series, `A01` for annual series). The ingestion
//! boundary parses those strings into [`Period`] so the aggregation code
//! never matches on string prefixes.

use serde::{Deserialize, Deserializer, Serialize, Serializer};

/// A calendar quarter, guaranteed to be in `1..=4`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Quarter(u8);

impl Quarter {
    /// Build a quarter from its ordinal. Returns `None` outside `1..=4`.
    pub const fn new(n: u8) -> Option<Self> {
        match n {
            1..=4 => Some(Self(n)),
            _ => None,
        }
    }

    /// The quarter ordinal (`1..=4`).
    pub const fn get(self) -> u8 {
        self.0
    }
}

/// Observation period of a series record.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Period {
    /// One quarter within the year (`Q01`..`Q04`).
    Quarter(Quarter),
    /// An annual aggregate. Holds the source code (`Q05`, `M13`, `A01`, ...).
    Annual(String),
    /// Any other period code, kept verbatim.
    Other(String),
}

impl Period {
    /// Parse a period code. Surrounding whitespace is ignored.
    ///
    /// Parsing never fails: unknown codes become [`Period::Other`].
    pub fn parse(code: &str) -> Self {
        let code = code.trim();
        if let Some(rest) = code.strip_prefix('Q') {
            if let Ok(n) = rest.parse::<u8>() {
                if let Some(q) = Quarter::new(n) {
                    return Self::Quarter(q);
                }
                if n == 5 {
                    return Self::Annual(code.to_owned());
                }
            }
            return Self::Other(code.to_owned());
        }
        if code == "M13" || is_annual_code(code) {
            return Self::Annual(code.to_owned());
        }
        Self::Other(code.to_owned())
    }

    /// True for quarterly observations.
    pub const fn is_quarter(&self) -> bool {
        matches!(self, Self::Quarter(_))
    }
}

/// `A` followed by digits only (`A01`).
fn is_annual_code(code: &str) -> bool {
    code.strip_prefix('A')
        .is_some_and(|rest| !rest.is_empty() && rest.bytes().all(|b| b.is_ascii_digit()))
}

impl core::fmt::Display for Period {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            Self::Quarter(q) => write!(f, "Q{:02}", q.get()),
            Self::Annual(code) | Self::Other(code) => f.write_str(code),
        }
    }
}

impl From<&str> for Period {
    fn from(code: &str) -> Self {
        Self::parse(code)
    }
}

// Periods travel as their source code string so JSON output matches the
// upstream files.
impl Serialize for Period {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for Period {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let code = String::deserialize(deserializer)?;
        Ok(Self::parse(&code))
    }
}
