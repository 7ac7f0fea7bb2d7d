//! Pure computation of the next form snapshot.
//!
//! [`StateCalculator`] borrows the registry, the touched set and the
//! environment, and maps a current [`FormSnapshot`] plus a mutation to a new
//! snapshot. It never modifies its inputs.
//!
//! # Which fields are validated
//!
//! A change to fields `C` validates, depending on
//! [`ValidationStrategy::on_field_change`]:
//!
//! - `ClearAll`: nothing; errors are dropped.
//! - `Skip`: only the fields that depend on `C` *and* currently carry an
//!   error, so a cross-field error never outlives the value it was computed
//!   from.
//! - `ChangedFields`: `C` plus every field that depends on `C`.
//! - `AllFields`: the whole registry, once per mutation.
//!
//! Only the entries of validated fields change; other errors are preserved.
//!
//! # Validity
//!
//! Under `Disabled` the form is always valid and has no errors. Otherwise it
//! is valid exactly when the error map is empty and every field is touched.

use formwork_fields::{
    Environment, ErrorMessage, FieldErrors, FieldRegistry, FieldValue, FieldValues,
};

use crate::coordinator::ValidationCoordinator;
use crate::snapshot::FormSnapshot;
use crate::strategy::{ChangeValidation, ValidationStrategy};
use crate::tracking::FieldTracking;

/// A partial error set: `None` means the field validated cleanly.
pub type PartialErrors = Vec<(String, Option<ErrorMessage>)>;

/// Computes snapshots from the registry, touched set and environment.
#[derive(Debug, Clone, Copy)]
pub struct StateCalculator<'a> {
    registry: &'a FieldRegistry,
    tracking: &'a FieldTracking,
    environment: &'a Environment,
}

impl<'a> StateCalculator<'a> {
    /// Creates a calculator over the given state.
    #[must_use]
    pub fn new(
        registry: &'a FieldRegistry,
        tracking: &'a FieldTracking,
        environment: &'a Environment,
    ) -> Self {
        Self {
            registry,
            tracking,
            environment,
        }
    }

    /// Builds the snapshot of a fresh form: initial values and no errors.
    #[must_use]
    pub fn initial(&self, strategy: ValidationStrategy) -> FormSnapshot {
        self.build(self.registry.initial_values(), FieldErrors::new(), strategy)
    }

    /// Applies a single field update.
    #[must_use]
    pub fn compute_field_update(
        &self,
        current: &FormSnapshot,
        name: &str,
        value: Option<FieldValue>,
    ) -> FormSnapshot {
        let mut values = current.values().clone();
        values.insert(name.to_owned(), value);
        self.reconcile(values, current.errors(), current.strategy(), &[name])
    }

    /// Applies a batch of updates as one mutation.
    ///
    /// Under `AllFieldsRealTime` the registry is validated once for the whole
    /// batch.
    #[must_use]
    pub fn compute_fields_update(
        &self,
        current: &FormSnapshot,
        updates: &[(String, Option<FieldValue>)],
    ) -> FormSnapshot {
        let mut values = current.values().clone();
        for (name, value) in updates {
            values.insert(name.clone(), value.clone());
        }
        let changed: Vec<&str> = updates.iter().map(|(name, _)| name.as_str()).collect();
        self.reconcile(values, current.errors(), current.strategy(), &changed)
    }

    /// Stores a value without running any validator.
    ///
    /// Used for debounced input: the value is visible at once while the
    /// error recomputation happens later through
    /// [`compute_revalidation`](Self::compute_revalidation).
    #[must_use]
    pub fn compute_values_only(
        &self,
        current: &FormSnapshot,
        name: &str,
        value: Option<FieldValue>,
    ) -> FormSnapshot {
        let mut values = current.values().clone();
        values.insert(name.to_owned(), value);
        self.build(values, current.errors().clone(), current.strategy())
    }

    /// Revalidates as if `changed` had just been written with their current
    /// values.
    #[must_use]
    pub fn compute_revalidation(&self, current: &FormSnapshot, changed: &[&str]) -> FormSnapshot {
        self.reconcile(
            current.values().clone(),
            current.errors(),
            current.strategy(),
            changed,
        )
    }

    /// Revalidates after `name`'s validators were replaced.
    ///
    /// Follows the change rule, except that under `Skip` the field itself is
    /// re-checked when it carries an error, so an error raised by a removed
    /// validator does not outlive it.
    #[must_use]
    pub fn compute_validators_replaced(&self, current: &FormSnapshot, name: &str) -> FormSnapshot {
        let strategy = current.strategy();
        if strategy.on_field_change() != ChangeValidation::Skip {
            return self.compute_revalidation(current, &[name]);
        }

        let errors = current.errors();
        let stale: Vec<&str> = core::iter::once(name)
            .chain(self.dependents(&[name]))
            .filter(|field| errors.contains_key(*field))
            .collect();
        let errors =
            ValidationCoordinator::merge_errors(errors, self.field_errors(current.values(), stale));
        self.build(current.values().clone(), errors, strategy)
    }

    /// Validates every field regardless of the change rule, recording
    /// `strategy` in the result.
    #[must_use]
    pub fn compute_full_validation(
        &self,
        current: &FormSnapshot,
        strategy: ValidationStrategy,
    ) -> FormSnapshot {
        let errors = if strategy.is_disabled() {
            FieldErrors::new()
        } else {
            self.all_errors(current.values())
        };
        self.build(current.values().clone(), errors, strategy)
    }

    /// Validates one field, bypassing the change rule. A no-op under
    /// `Disabled`.
    #[must_use]
    pub fn compute_field_validation(&self, current: &FormSnapshot, name: &str) -> FormSnapshot {
        let strategy = current.strategy();
        let errors = if strategy.is_disabled() {
            FieldErrors::new()
        } else {
            ValidationCoordinator::merge_errors(
                current.errors(),
                self.field_errors(current.values(), [name]),
            )
        };
        self.build(current.values().clone(), errors, strategy)
    }

    /// Replaces the error map, keeping values. Ignored under `Disabled`.
    #[must_use]
    pub fn compute_with_errors(&self, current: &FormSnapshot, errors: FieldErrors) -> FormSnapshot {
        self.build(current.values().clone(), errors, current.strategy())
    }

    /// Switches strategy, keeping values and errors.
    #[must_use]
    pub fn compute_with_strategy(
        &self,
        current: &FormSnapshot,
        strategy: ValidationStrategy,
    ) -> FormSnapshot {
        self.build(current.values().clone(), current.errors().clone(), strategy)
    }

    /// Re-derives a snapshot after fields were added or removed.
    ///
    /// Values of remaining fields are kept, new fields get their initial
    /// value and removed fields disappear from values and errors. The
    /// remaining field set is then revalidated as far as the strategy
    /// allows: fully for the real-time strategies, and only the fields
    /// already carrying an error for the submit-gated ones.
    #[must_use]
    pub fn compute_schema_change(&self, current: &FormSnapshot) -> FormSnapshot {
        let strategy = current.strategy();
        let values = current.values().clone();
        let errors = match strategy.on_field_change() {
            ChangeValidation::ClearAll => FieldErrors::new(),
            ChangeValidation::Skip => {
                let errored: Vec<&str> = current
                    .errors()
                    .keys()
                    .map(String::as_str)
                    .filter(|name| self.registry.field_exists(name))
                    .collect();
                let seeded = self.seed(values.clone());
                ValidationCoordinator::merge_errors(
                    current.errors(),
                    self.field_errors(&seeded, errored),
                )
            }
            ChangeValidation::ChangedFields | ChangeValidation::AllFields => {
                self.all_errors(&self.seed(values.clone()))
            }
        };
        self.build(values, errors, strategy)
    }

    /// Restores initial values and drops every error.
    #[must_use]
    pub fn compute_reset(&self, strategy: ValidationStrategy) -> FormSnapshot {
        self.initial(strategy)
    }

    /// Runs the validators of `names` against `values`, returning a partial
    /// error set. Unregistered names are skipped.
    #[must_use]
    pub fn field_errors<'n>(
        &self,
        values: &FieldValues,
        names: impl IntoIterator<Item = &'n str>,
    ) -> PartialErrors {
        names
            .into_iter()
            .filter_map(|name| {
                let chain = self.registry.validator(name)?;
                let value = values.get(name).and_then(Option::as_ref);
                Some((
                    name.to_owned(),
                    chain.run(value, values, self.environment),
                ))
            })
            .collect()
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Internals
    // ─────────────────────────────────────────────────────────────────────────

    fn reconcile(
        &self,
        values: FieldValues,
        errors: &FieldErrors,
        strategy: ValidationStrategy,
        changed: &[&str],
    ) -> FormSnapshot {
        let errors = match strategy.on_field_change() {
            ChangeValidation::ClearAll => FieldErrors::new(),
            ChangeValidation::Skip => {
                let stale: Vec<&str> = self
                    .dependents(changed)
                    .into_iter()
                    .filter(|name| errors.contains_key(*name))
                    .collect();
                ValidationCoordinator::merge_errors(errors, self.field_errors(&values, stale))
            }
            ChangeValidation::ChangedFields => {
                let mut targets: Vec<&str> = Vec::with_capacity(changed.len());
                for name in changed.iter().copied().chain(self.dependents(changed)) {
                    if !targets.contains(&name) {
                        targets.push(name);
                    }
                }
                ValidationCoordinator::merge_errors(errors, self.field_errors(&values, targets))
            }
            ChangeValidation::AllFields => self.all_errors(&values),
        };
        self.build(values, errors, strategy)
    }

    /// Fields whose validators read any of `changed`, in first-seen order.
    fn dependents(&self, changed: &[&str]) -> Vec<&'a str> {
        let mut dependents: Vec<&'a str> = Vec::new();
        for name in changed {
            for dependent in self.registry.dependents_of(name) {
                if !dependents.contains(&dependent.as_str()) {
                    dependents.push(dependent.as_str());
                }
            }
        }
        dependents
    }

    fn all_errors(&self, values: &FieldValues) -> FieldErrors {
        self.field_errors(values, self.registry.field_names())
            .into_iter()
            .filter_map(|(name, error)| error.map(|error| (name, error)))
            .collect()
    }

    /// Gives every registered field an entry, using its initial value when
    /// `values` has none.
    fn seed(&self, mut values: FieldValues) -> FieldValues {
        for definition in self.registry.definitions() {
            if !values.contains_key(definition.name()) {
                values.insert(
                    definition.name().to_owned(),
                    definition.initial_value().cloned(),
                );
            }
        }
        values
    }

    /// Normalizes values and errors to the registered field set, in
    /// registration order, and derives validity.
    fn build(
        &self,
        mut values: FieldValues,
        errors: FieldErrors,
        strategy: ValidationStrategy,
    ) -> FormSnapshot {
        let values: FieldValues = self
            .registry
            .definitions()
            .map(|definition| {
                let name = definition.name();
                let value = values
                    .swap_remove(name)
                    .unwrap_or_else(|| definition.initial_value().cloned());
                (name.to_owned(), value)
            })
            .collect();

        let errors: FieldErrors = if strategy.is_disabled() {
            FieldErrors::new()
        } else {
            self.registry
                .field_names()
                .filter_map(|name| errors.get(name).map(|error| (name.to_owned(), error.clone())))
                .collect()
        };

        let is_valid = strategy.is_disabled() || (errors.is_empty() && self.tracking.all_touched());

        FormSnapshot::new(
            values,
            errors,
            is_valid,
            strategy,
            self.registry.field_types().clone(),
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use formwork_fields::FieldDefinition;
    use formwork_fields::FieldType;
    use formwork_fields::validators::{email, matches, required};

    struct Fixture {
        registry: FieldRegistry,
        tracking: FieldTracking,
        environment: Environment,
    }

    impl Fixture {
        fn new(definitions: Vec<FieldDefinition>) -> Self {
            let registry = FieldRegistry::new(definitions).unwrap();
            let tracking = FieldTracking::new(registry.field_names());
            Self {
                registry,
                tracking,
                environment: Environment::default(),
            }
        }

        fn signup() -> Self {
            Self::new(vec![
                FieldDefinition::new("email", FieldType::Text)
                    .with_initial_value("")
                    .with_validators([required(), email()]),
                FieldDefinition::new("age", FieldType::Integer).with_validator(required()),
            ])
        }

        fn passwords() -> Self {
            Self::new(vec![
                FieldDefinition::new("password", FieldType::Text).with_validator(required()),
                FieldDefinition::new("confirm", FieldType::Text)
                    .with_validator(matches("password")),
            ])
        }

        fn calculator(&self) -> StateCalculator<'_> {
            StateCalculator::new(&self.registry, &self.tracking, &self.environment)
        }
    }

    #[test]
    fn initial_snapshot_has_initial_values_and_no_errors() {
        let fixture = Fixture::signup();
        let snapshot = fixture
            .calculator()
            .initial(ValidationStrategy::RealTimeOnly);

        assert_eq!(snapshot.value("email"), Some(&FieldValue::from("")));
        assert!(snapshot.contains_field("age"));
        assert!(snapshot.errors().is_empty());
        assert!(!snapshot.is_valid(), "untouched fields block validity");
    }

    #[test]
    fn real_time_only_validates_just_the_changed_field() {
        let fixture = Fixture::signup();
        let calculator = fixture.calculator();
        let initial = calculator.initial(ValidationStrategy::RealTimeOnly);

        let next =
            calculator.compute_field_update(&initial, "email", Some(FieldValue::from("nope")));

        assert_eq!(next.error("email").map(String::as_str), Some("Invalid email address"));
        assert!(!next.has_error("age"), "age was not validated");
        assert!(initial.errors().is_empty(), "input snapshot is unchanged");
    }

    #[test]
    fn all_fields_real_time_validates_everything() {
        let fixture = Fixture::signup();
        let calculator = fixture.calculator();
        let initial = calculator.initial(ValidationStrategy::AllFieldsRealTime);

        let next =
            calculator.compute_field_update(&initial, "email", Some(FieldValue::from("a@b.com")));

        assert!(!next.has_error("email"));
        assert_eq!(
            next.error("age").map(String::as_str),
            Some("This field is required")
        );
    }

    #[test]
    fn submit_gated_strategies_skip_change_validation() {
        let fixture = Fixture::signup();
        let calculator = fixture.calculator();
        for strategy in [
            ValidationStrategy::OnSubmitOnly,
            ValidationStrategy::OnSubmitThenRealTime,
        ] {
            let initial = calculator.initial(strategy);
            let next = calculator.compute_field_update(&initial, "email", None);
            assert!(next.errors().is_empty(), "{strategy}");
        }
    }

    #[test]
    fn disabled_is_always_valid() {
        let fixture = Fixture::signup();
        let calculator = fixture.calculator();
        let initial = calculator.initial(ValidationStrategy::Disabled);

        let next = calculator.compute_full_validation(&initial, ValidationStrategy::Disabled);
        assert!(next.errors().is_empty());
        assert!(next.is_valid());

        let mut errors = FieldErrors::new();
        errors.insert("email".into(), "manual".into());
        let next = calculator.compute_with_errors(&next, errors);
        assert!(next.errors().is_empty(), "manual errors are ignored");
    }

    #[test]
    fn validity_requires_every_field_touched() {
        let mut fixture = Fixture::signup();
        let valid_values = |calculator: &StateCalculator<'_>| {
            let initial = calculator.initial(ValidationStrategy::AllFieldsRealTime);
            calculator.compute_fields_update(
                &initial,
                &[
                    ("email".into(), Some(FieldValue::from("a@b.com"))),
                    ("age".into(), Some(FieldValue::from(30))),
                ],
            )
        };

        fixture.tracking.mark_field_as_touched("email");
        let snapshot = valid_values(&fixture.calculator());
        assert!(snapshot.errors().is_empty());
        assert!(!snapshot.is_valid());

        fixture.tracking.mark_field_as_touched("age");
        assert!(valid_values(&fixture.calculator()).is_valid());
    }

    #[test]
    fn dependency_change_revalidates_dependent() {
        let fixture = Fixture::passwords();
        let calculator = fixture.calculator();
        let initial = calculator.initial(ValidationStrategy::RealTimeOnly);

        let both = calculator.compute_fields_update(
            &initial,
            &[
                ("password".into(), Some(FieldValue::from("secret"))),
                ("confirm".into(), Some(FieldValue::from("secret"))),
            ],
        );
        assert!(both.errors().is_empty());

        let next =
            calculator.compute_field_update(&both, "password", Some(FieldValue::from("changed")));
        assert_eq!(
            next.error("confirm").map(String::as_str),
            Some("Must match password")
        );
    }

    #[test]
    fn submit_gated_strategies_clear_stale_cross_field_errors() {
        let fixture = Fixture::passwords();
        let calculator = fixture.calculator();
        let initial = calculator.initial(ValidationStrategy::OnSubmitOnly);

        let typed = calculator.compute_fields_update(
            &initial,
            &[
                ("password".into(), Some(FieldValue::from("secret"))),
                ("confirm".into(), Some(FieldValue::from("secrte"))),
            ],
        );
        let submitted = calculator.compute_full_validation(&typed, ValidationStrategy::OnSubmitOnly);
        assert!(submitted.has_error("confirm"));

        // Fixing the dependency clears the dependent's error...
        let fixed =
            calculator.compute_field_update(&submitted, "password", Some(FieldValue::from("secrte")));
        assert!(!fixed.has_error("confirm"));

        // ...but a change never introduces new errors before submit.
        let broken =
            calculator.compute_field_update(&fixed, "password", Some(FieldValue::from("other")));
        assert!(broken.errors().is_empty());
    }

    #[test]
    fn replaced_validators_recheck_an_errored_field_under_submit_gating() {
        let mut fixture = Fixture::signup();
        let initial = fixture
            .calculator()
            .initial(ValidationStrategy::OnSubmitOnly);
        let submitted = fixture
            .calculator()
            .compute_full_validation(&initial, ValidationStrategy::OnSubmitOnly);
        assert!(submitted.has_error("email"));
        assert!(submitted.has_error("age"));

        fixture
            .registry
            .update_field_validators("email", Vec::new())
            .unwrap();
        let next = fixture
            .calculator()
            .compute_validators_replaced(&submitted, "email");

        assert!(!next.has_error("email"));
        assert!(next.has_error("age"), "other errors are kept");
    }

    #[test]
    fn replaced_validators_do_not_raise_new_errors_before_submit() {
        let mut fixture = Fixture::signup();
        let initial = fixture
            .calculator()
            .initial(ValidationStrategy::OnSubmitThenRealTime);

        fixture
            .registry
            .update_field_validators("email", vec![required()])
            .unwrap();
        let next = fixture
            .calculator()
            .compute_validators_replaced(&initial, "email");

        assert!(next.errors().is_empty());
    }

    #[test]
    fn field_validation_bypasses_change_rule() {
        let fixture = Fixture::signup();
        let calculator = fixture.calculator();
        let initial = calculator.initial(ValidationStrategy::OnSubmitOnly);

        let next = calculator.compute_field_validation(&initial, "email");
        assert!(next.has_error("email"));
        assert!(!next.has_error("age"));
    }

    #[test]
    fn values_only_update_runs_no_validator() {
        let fixture = Fixture::signup();
        let calculator = fixture.calculator();
        let initial = calculator.initial(ValidationStrategy::RealTimeOnly);

        let next = calculator.compute_values_only(&initial, "email", Some(FieldValue::from("x")));
        assert_eq!(next.value("email"), Some(&FieldValue::from("x")));
        assert!(next.errors().is_empty());

        let validated = calculator.compute_revalidation(&next, &["email"]);
        assert!(validated.has_error("email"));
    }

    #[test]
    fn build_orders_values_and_drops_unknown_errors() {
        let fixture = Fixture::signup();
        let calculator = fixture.calculator();
        let initial = calculator.initial(ValidationStrategy::RealTimeOnly);

        let mut errors = FieldErrors::new();
        errors.insert("ghost".into(), "boo".into());
        errors.insert("age".into(), "bad".into());
        let next = calculator.compute_with_errors(&initial, errors);

        assert_eq!(next.errors().keys().collect::<Vec<_>>(), ["age"]);
        assert_eq!(
            next.values().keys().collect::<Vec<_>>(),
            next.field_types().keys().collect::<Vec<_>>()
        );
    }
}
