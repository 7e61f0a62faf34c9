//! Alert classification vocabulary.
//!
//! [`ActionabilityClass::derive`] is the single mapping from
//! `(signal_type, confidence)` to actionability; downstream eligibility
//! checks read the class, never re-derive it.

use std::fmt;

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum SignalType {
    Repricing,
    LiquiditySweep,
    Momentum,
    Noisy,
}

impl SignalType {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Repricing => "REPRICING",
            Self::LiquiditySweep => "LIQUIDITY_SWEEP",
            Self::Momentum => "MOMENTUM",
            Self::Noisy => "NOISY",
        }
    }
}

impl fmt::Display for SignalType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Confidence tier. Ordered so that `High > Medium > Low`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Confidence {
    Low,
    Medium,
    High,
}

impl Confidence {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Low => "LOW",
            Self::Medium => "MEDIUM",
            Self::High => "HIGH",
        }
    }

    #[must_use]
    pub fn parse_token(token: &str) -> Option<Self> {
        match token.trim().to_ascii_uppercase().as_str() {
            "LOW" => Some(Self::Low),
            "MEDIUM" => Some(Self::Medium),
            "HIGH" => Some(Self::High),
            _ => None,
        }
    }
}

impl fmt::Display for Confidence {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum SuggestedAction {
    Follow,
    Wait,
    Ignore,
}

impl SuggestedAction {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Follow => "FOLLOW",
            Self::Wait => "WAIT",
            Self::Ignore => "IGNORE",
        }
    }
}

impl fmt::Display for SuggestedAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ActionabilityClass {
    ActionableFast,
    ActionableStandard,
    InfoOnly,
}

impl ActionabilityClass {
    /// Derive the class from signal type and confidence.
    #[must_use]
    pub const fn derive(signal_type: SignalType, confidence: Confidence) -> Self {
        match (signal_type, confidence) {
            (SignalType::Repricing | SignalType::LiquiditySweep, Confidence::High) => {
                Self::ActionableFast
            }
            (SignalType::Repricing | SignalType::LiquiditySweep, _) => Self::ActionableStandard,
            (SignalType::Momentum, Confidence::High | Confidence::Medium) => {
                Self::ActionableStandard
            }
            _ => Self::InfoOnly,
        }
    }

    #[must_use]
    pub const fn is_actionable(self) -> bool {
        !matches!(self, Self::InfoOnly)
    }

    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::ActionableFast => "ACTIONABLE_FAST",
            Self::ActionableStandard => "ACTIONABLE_STANDARD",
            Self::InfoOnly => "INFO_ONLY",
        }
    }
}

impl fmt::Display for ActionabilityClass {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Derived, never persisted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct AlertClassification {
    pub signal_type: SignalType,
    pub confidence: Confidence,
    pub suggested_action: SuggestedAction,
    pub actionability: ActionabilityClass,
}

impl AlertClassification {
    /// Build a classification, deriving the actionability class.
    #[must_use]
    pub const fn new(
        signal_type: SignalType,
        confidence: Confidence,
        suggested_action: SuggestedAction,
    ) -> Self {
        Self {
            signal_type,
            confidence,
            suggested_action,
            actionability: ActionabilityClass::derive(signal_type, confidence),
        }
    }

    /// The catch-all `NOISY / LOW / IGNORE` result.
    #[must_use]
    pub const fn noisy() -> Self {
        Self::new(SignalType::Noisy, Confidence::Low, SuggestedAction::Ignore)
    }
}
