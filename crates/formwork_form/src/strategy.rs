//! Validation strategies.
//!
//! A [`ValidationStrategy`] decides *when* validation runs. It is a closed
//! set of five states with exactly one automatic transition:
//!
//! | strategy | on field change | on submit | after a failed submit |
//! |---|---|---|---|
//! | `Disabled` | errors cleared | always passes | unchanged |
//! | `OnSubmitOnly` | nothing | validate all | unchanged |
//! | `OnSubmitThenRealTime` | nothing | validate all | becomes `RealTimeOnly` |
//! | `RealTimeOnly` | validate changed fields | validate all | unchanged |
//! | `AllFieldsRealTime` | validate every field | validate all | unchanged |

use core::fmt;

use serde::{Deserialize, Serialize};

/// The policy governing when validation runs.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum ValidationStrategy {
    /// Never validate. Errors are always empty and the form is always valid.
    Disabled,
    /// Validate only on submit.
    OnSubmitOnly,
    /// Validate on submit; after the first failed submit, validate changes as
    /// they happen.
    #[default]
    OnSubmitThenRealTime,
    /// Validate each changed field as it changes.
    RealTimeOnly,
    /// Revalidate every field whenever any field changes.
    AllFieldsRealTime,
}

/// What a field change triggers under a given strategy.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChangeValidation {
    /// Drop every error.
    ClearAll,
    /// Leave the changed fields' errors as they are.
    Skip,
    /// Validate the changed fields (and their dependents).
    ChangedFields,
    /// Validate the whole registry once.
    AllFields,
}

impl ValidationStrategy {
    /// Every strategy, in declaration order.
    pub const ALL: [Self; 5] = [
        Self::Disabled,
        Self::OnSubmitOnly,
        Self::OnSubmitThenRealTime,
        Self::RealTimeOnly,
        Self::AllFieldsRealTime,
    ];

    /// Returns what a field change triggers.
    #[must_use]
    pub fn on_field_change(self) -> ChangeValidation {
        match self {
            Self::Disabled => ChangeValidation::ClearAll,
            Self::OnSubmitOnly | Self::OnSubmitThenRealTime => ChangeValidation::Skip,
            Self::RealTimeOnly => ChangeValidation::ChangedFields,
            Self::AllFieldsRealTime => ChangeValidation::AllFields,
        }
    }

    /// Returns the strategy to adopt after a submit that found errors.
    ///
    /// The only transition is `OnSubmitThenRealTime -> RealTimeOnly`.
    #[must_use]
    pub fn after_failed_submit(self) -> Self {
        match self {
            Self::OnSubmitThenRealTime => Self::RealTimeOnly,
            Self::Disabled | Self::OnSubmitOnly | Self::RealTimeOnly | Self::AllFieldsRealTime => {
                self
            }
        }
    }

    /// Returns whether submitting runs the validators.
    #[must_use]
    pub fn validates_on_submit(self) -> bool {
        !self.is_disabled()
    }

    /// Returns whether validation is switched off entirely.
    #[must_use]
    pub fn is_disabled(self) -> bool {
        matches!(self, Self::Disabled)
    }

    /// Returns the camelCase name used in configuration files.
    #[must_use]
    pub fn name(self) -> &'static str {
        match self {
            Self::Disabled => "disabled",
            Self::OnSubmitOnly => "onSubmitOnly",
            Self::OnSubmitThenRealTime => "onSubmitThenRealTime",
            Self::RealTimeOnly => "realTimeOnly",
            Self::AllFieldsRealTime => "allFieldsRealTime",
        }
    }
}

impl fmt::Display for ValidationStrategy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_is_submit_then_real_time() {
        assert_eq!(
            ValidationStrategy::default(),
            ValidationStrategy::OnSubmitThenRealTime
        );
    }

    #[test]
    fn only_submit_then_real_time_transitions() {
        for strategy in ValidationStrategy::ALL {
            let next = strategy.after_failed_submit();
            if strategy == ValidationStrategy::OnSubmitThenRealTime {
                assert_eq!(next, ValidationStrategy::RealTimeOnly);
            } else {
                assert_eq!(next, strategy, "{strategy} must not transition");
            }
        }
        // The transition is one-way.
        assert_eq!(
            ValidationStrategy::RealTimeOnly.after_failed_submit(),
            ValidationStrategy::RealTimeOnly
        );
    }

    #[test]
    fn change_validation_table() {
        use ChangeValidation::*;
        let table = ValidationStrategy::ALL.map(ValidationStrategy::on_field_change);
        assert_eq!(table, [ClearAll, Skip, Skip, ChangedFields, AllFields]);
    }

    #[test]
    fn serde_uses_camel_case_names() {
        for strategy in ValidationStrategy::ALL {
            let json = serde_json::to_string(&strategy).unwrap();
            assert_eq!(json, format!("\"{}\"", strategy.name()));
        }
        let parsed: ValidationStrategy = serde_json::from_str("\"allFieldsRealTime\"").unwrap();
        assert_eq!(parsed, ValidationStrategy::AllFieldsRealTime);
    }
}
