use std::fmt;

use serde::{Deserialize, Serialize};

/// A biometric channel the provider can be queried for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Metric {
    /// Heart rate in beats per minute. The primary metric.
    HeartRate,
    /// Blood oxygen saturation in percent.
    Spo2,
    /// Respiration rate in breaths per minute.
    Respiration,
}

impl Metric {
    /// Every known metric, primary first.
    pub const ALL: [Self; 3] = [Self::HeartRate, Self::Spo2, Self::Respiration];

    /// Short key used in payloads and logs (`hr`, `spo2`, `resp`).
    #[must_use]
    pub const fn key(self) -> &'static str {
        match self {
            Self::HeartRate => "hr",
            Self::Spo2 => "spo2",
            Self::Respiration => "resp",
        }
    }

    /// Name of the sample array inside a serialized series object.
    #[must_use]
    pub const fn values_key(self) -> &'static str {
        match self {
            Self::HeartRate => "heartRateValues",
            Self::Spo2 => "spo2Values",
            Self::Respiration => "respirationValues",
        }
    }
}

impl fmt::Display for Metric {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.key())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display_is_key() {
        for m in Metric::ALL {
            assert_eq!(m.to_string(), m.key());
        }
    }
}
