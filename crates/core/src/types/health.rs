//! Health benefit categories used to classify products.

use core::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// Error returned when parsing one of the text-backed enums fails.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown {kind}: {value}")]
pub struct UnknownVariant {
    /// Name of the enum that failed to parse.
    pub kind: &'static str,
    /// The rejected input.
    pub value: String,
}

impl UnknownVariant {
    pub(crate) fn new(kind: &'static str, value: &str) -> Self {
        Self {
            kind,
            value: value.to_owned(),
        }
    }
}

/// The fixed set of benefit categories a tincture is marketed under.
///
/// Declaration order is significant: it breaks ties when ranking quiz
/// scores.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum HealthBenefit {
    Cognitive,
    Immune,
    Mood,
    Energy,
    Relaxation,
}

impl HealthBenefit {
    /// Every benefit, in declaration order.
    pub const ALL: [Self; 5] = [
        Self::Cognitive,
        Self::Immune,
        Self::Mood,
        Self::Energy,
        Self::Relaxation,
    ];

    /// The wire/database representation.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Cognitive => "cognitive",
            Self::Immune => "immune",
            Self::Mood => "mood",
            Self::Energy => "energy",
            Self::Relaxation => "relaxation",
        }
    }

    /// Human-readable label.
    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::Cognitive => "Cognitive Support",
            Self::Immune => "Immune Support",
            Self::Mood => "Mood Balance",
            Self::Energy => "Energy & Vitality",
            Self::Relaxation => "Relaxation & Sleep",
        }
    }
}

impl fmt::Display for HealthBenefit {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for HealthBenefit {
    type Err = UnknownVariant;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|benefit| benefit.as_str() == s)
            .ok_or_else(|| UnknownVariant::new("health benefit", s))
    }
}
