//! The form controller facade.
//!
//! [`FormController`] glues the registry, touched set, strategy, calculator,
//! debounce scheduler and subscribers into one API. Every mutation:
//!
//! 1. checks its preconditions through [`ValidationCoordinator`],
//! 2. updates touched state,
//! 3. computes a new [`FormSnapshot`] with [`StateCalculator`],
//! 4. swaps it in and updates the watch channel under the state lock,
//! 5. notifies listeners after the lock is released.
//!
//! Precondition violations return a [`FormError`] and leave the form
//! untouched. Validation failures are data in the snapshot's error map.
//!
//! # Example
//!
//! ```
//! use formwork_form::prelude::*;
//!
//! let form = FormController::new(
//!     [
//!         FieldDefinition::new("email", FieldType::Text)
//!             .with_initial_value("")
//!             .with_validators([required(), email()]),
//!         FieldDefinition::new("age", FieldType::Integer).with_validator(required()),
//!     ],
//!     FormConfig::new().with_strategy(ValidationStrategy::AllFieldsRealTime),
//! )
//! .unwrap();
//!
//! let snapshot = form.update_field("email", "not-an-email").unwrap();
//! assert_eq!(
//!     snapshot.error("email").map(String::as_str),
//!     Some("Invalid email address")
//! );
//!
//! form.update_field("email", "a@b.com").unwrap();
//! let snapshot = form.update_field("age", 30).unwrap();
//! assert!(snapshot.errors().is_empty());
//! assert!(snapshot.is_valid());
//! ```

use core::fmt;
use core::time::Duration;
use std::sync::{Arc, Weak};

use formwork_fields::{
    BoxedValidator, Environment, ErrorMessage, FieldDefinition, FieldRegistry, FieldValue,
    FormError, FromFieldValue,
};
use parking_lot::Mutex;
use tokio::sync::watch;

use crate::calculator::StateCalculator;
use crate::config::FormConfig;
use crate::coordinator::ValidationCoordinator;
use crate::debounce::DebouncedValidationScheduler;
use crate::lifecycle::FieldLifecycleManager;
use crate::snapshot::FormSnapshot;
use crate::strategy::ValidationStrategy;
use crate::subscribers::{SnapshotSubscribers, SubscriptionId};
use crate::tracking::FieldTracking;

/// Result of a mutating controller operation: the published snapshot.
pub type FormResult = Result<Arc<FormSnapshot>, FormError>;

// ─────────────────────────────────────────────────────────────────────────────
// Shared state
// ─────────────────────────────────────────────────────────────────────────────

struct FormState {
    registry: FieldRegistry,
    tracking: FieldTracking,
    environment: Environment,
    snapshot: Arc<FormSnapshot>,
}

impl FormState {
    fn calculator(&self) -> StateCalculator<'_> {
        StateCalculator::new(&self.registry, &self.tracking, &self.environment)
    }
}

struct Shared {
    state: Mutex<FormState>,
    scheduler: DebouncedValidationScheduler,
    subscribers: SnapshotSubscribers,
    config: FormConfig,
}

impl Shared {
    /// Runs `mutate` under the state lock and stores the snapshot it
    /// returns. The watch channel is updated under the lock; listeners are
    /// notified once it is released.
    fn commit<F>(&self, mutate: F) -> FormResult
    where
        F: FnOnce(&mut FormState) -> Result<FormSnapshot, FormError>,
    {
        let (snapshot, revision) = {
            let mut state = self.state.lock();
            let next = Arc::new(mutate(&mut state)?);
            state.snapshot = Arc::clone(&next);
            let revision = self.subscribers.store(&next);
            (next, revision)
        };
        self.subscribers.notify(&snapshot, revision);
        Ok(snapshot)
    }

    /// Completion of a debounced validation of `field` holding `value`.
    ///
    /// Suppressed if the field was removed in the meantime, or if its value
    /// is no longer the one the timer was scheduled for.
    fn run_debounced(&self, field: &str, value: Option<&FieldValue>) -> Option<Arc<FormSnapshot>> {
        let (snapshot, revision) = {
            let mut state = self.state.lock();
            if !state.registry.field_exists(field) {
                tracing::trace!(field, "debounced validation suppressed, field removed");
                return None;
            }
            if state.snapshot.value(field) != value {
                tracing::trace!(field, "debounced validation suppressed, value superseded");
                return None;
            }
            let next = Arc::new(
                state
                    .calculator()
                    .compute_revalidation(&state.snapshot, &[field]),
            );
            state.snapshot = Arc::clone(&next);
            let revision = self.subscribers.store(&next);
            (next, revision)
        };
        tracing::debug!(
            field,
            has_error = snapshot.has_error(field),
            "debounced validation completed"
        );
        self.subscribers.notify(&snapshot, revision);
        Some(snapshot)
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// FormController
// ─────────────────────────────────────────────────────────────────────────────

/// The single entry point for reading and mutating a form.
///
/// All methods take `&self`; the controller can be shared between threads
/// behind an [`Arc`]. Dropping it cancels every pending debounced
/// validation.
pub struct FormController {
    shared: Arc<Shared>,
}

impl fmt::Debug for FormController {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let state = self.shared.state.lock();
        f.debug_struct("FormController")
            .field("registry", &state.registry)
            .field("snapshot", &state.snapshot)
            .field("scheduler", &self.shared.scheduler)
            .field("subscribers", &self.shared.subscribers)
            .finish()
    }
}

impl FormController {
    /// Creates a controller over `definitions`.
    ///
    /// # Errors
    ///
    /// [`FormError::FieldAlreadyExists`] on a duplicate name and
    /// [`FormError::TypeMismatch`] on an initial value of the wrong type.
    pub fn new(
        definitions: impl IntoIterator<Item = FieldDefinition>,
        config: FormConfig,
    ) -> Result<Self, FormError> {
        let registry = FieldRegistry::new(definitions)?;
        let tracking = FieldTracking::new(registry.field_names());
        let environment = config.environment();
        let snapshot = Arc::new(
            StateCalculator::new(&registry, &tracking, &environment).initial(config.strategy()),
        );

        tracing::debug!(
            fields = registry.len(),
            strategy = %config.strategy(),
            "form created"
        );

        let shared = Shared {
            state: Mutex::new(FormState {
                registry,
                tracking,
                environment,
                snapshot: Arc::clone(&snapshot),
            }),
            scheduler: DebouncedValidationScheduler::new(),
            subscribers: SnapshotSubscribers::new(snapshot),
            config,
        };
        Ok(Self {
            shared: Arc::new(shared),
        })
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Value updates
    // ─────────────────────────────────────────────────────────────────────────

    /// Writes a field's value and validates per the current strategy.
    ///
    /// The field becomes touched and any pending debounced validation for it
    /// is cancelled.
    ///
    /// # Errors
    ///
    /// [`FormError::FieldNotFound`] or [`FormError::TypeMismatch`].
    pub fn update_field(&self, name: &str, value: impl Into<FieldValue>) -> FormResult {
        self.set_field_value(name, Some(value.into()))
    }

    /// Writes a field's value, `None` meaning absent. See
    /// [`update_field`](Self::update_field).
    ///
    /// # Errors
    ///
    /// [`FormError::FieldNotFound`] or [`FormError::TypeMismatch`].
    pub fn set_field_value(&self, name: &str, value: Option<FieldValue>) -> FormResult {
        let snapshot = self.shared.commit(|state| {
            ValidationCoordinator::ensure_value_type(&state.registry, name, value.as_ref())?;
            state.tracking.mark_field_as_touched(name);
            Ok(state
                .calculator()
                .compute_field_update(&state.snapshot, name, value))
        })?;
        self.shared.scheduler.cancel_field_validation(name);

        tracing::debug!(field = name, strategy = %snapshot.strategy(), "field updated");
        Ok(snapshot)
    }

    /// Clears a field's value.
    ///
    /// # Errors
    ///
    /// [`FormError::FieldNotFound`].
    pub fn clear_field(&self, name: &str) -> FormResult {
        self.set_field_value(name, None)
    }

    /// Writes several fields as one mutation.
    ///
    /// Every name and value is checked before anything is applied. Under
    /// `AllFieldsRealTime` the form is validated once for the whole batch.
    ///
    /// # Errors
    ///
    /// [`FormError::FieldNotFound`] or [`FormError::TypeMismatch`] for the
    /// first offending entry.
    pub fn update_fields<I, S, V>(&self, updates: I) -> FormResult
    where
        I: IntoIterator<Item = (S, V)>,
        S: Into<String>,
        V: Into<Option<FieldValue>>,
    {
        let updates: Vec<(String, Option<FieldValue>)> = updates
            .into_iter()
            .map(|(name, value)| (name.into(), value.into()))
            .collect();

        let snapshot = self.shared.commit(|state| {
            for (name, value) in &updates {
                ValidationCoordinator::ensure_value_type(&state.registry, name, value.as_ref())?;
            }
            state
                .tracking
                .mark_fields_as_touched(updates.iter().map(|(name, _)| name.as_str()));
            Ok(state
                .calculator()
                .compute_fields_update(&state.snapshot, &updates))
        })?;
        for (name, _) in &updates {
            self.shared.scheduler.cancel_field_validation(name);
        }

        tracing::debug!(fields = updates.len(), strategy = %snapshot.strategy(), "fields updated");
        Ok(snapshot)
    }

    /// Writes a field's value now and validates it after `delay` of
    /// inactivity.
    ///
    /// The returned snapshot already carries the new value; its errors are
    /// recomputed when the timer fires, using the field's value at that
    /// time. A further call for the same field restarts the timer.
    ///
    /// # Errors
    ///
    /// [`FormError::FieldNotFound`] or [`FormError::TypeMismatch`].
    pub fn update_field_with_debounce(
        &self,
        name: &str,
        value: impl Into<FieldValue>,
        delay: Duration,
    ) -> FormResult {
        let value = Some(value.into());
        let snapshot = self.shared.commit(|state| {
            ValidationCoordinator::ensure_value_type(&state.registry, name, value.as_ref())?;
            state.tracking.mark_field_as_touched(name);
            Ok(state
                .calculator()
                .compute_values_only(&state.snapshot, name, value.clone()))
        })?;

        let shared: Weak<Shared> = Arc::downgrade(&self.shared);
        let token = self.shared.scheduler.schedule_field_validation(
            name,
            value,
            delay,
            move |field, value| {
                if let Some(shared) = shared.upgrade() {
                    shared.run_debounced(&field, value.as_ref());
                }
            },
        );

        tracing::debug!(field = name, %token, "field updated, validation debounced");
        Ok(snapshot)
    }

    /// [`update_field_with_debounce`](Self::update_field_with_debounce) with
    /// the configured default delay.
    ///
    /// # Errors
    ///
    /// [`FormError::FieldNotFound`] or [`FormError::TypeMismatch`].
    pub fn update_field_debounced(&self, name: &str, value: impl Into<FieldValue>) -> FormResult {
        self.update_field_with_debounce(name, value, self.shared.config.debounce())
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Validation
    // ─────────────────────────────────────────────────────────────────────────

    /// Validates one field now, regardless of strategy (except `Disabled`).
    ///
    /// # Errors
    ///
    /// [`FormError::FieldNotFound`].
    pub fn validate_field(&self, name: &str) -> FormResult {
        let snapshot = self.shared.scheduler.validate_immediately(name, |field| {
            self.shared.commit(|state| {
                ValidationCoordinator::ensure_field_exists(&state.registry, &field)?;
                Ok(state
                    .calculator()
                    .compute_field_validation(&state.snapshot, &field))
            })
        })?;

        tracing::debug!(field = name, has_error = snapshot.has_error(name), "field validated");
        Ok(snapshot)
    }

    /// Marks a field touched (blur) and runs its pending validation now.
    ///
    /// The validation follows the strategy's change rule, as the debounced
    /// validation would have.
    ///
    /// # Errors
    ///
    /// [`FormError::FieldNotFound`].
    pub fn touch_field(&self, name: &str) -> FormResult {
        let snapshot = self.shared.scheduler.validate_immediately(name, |field| {
            self.shared.commit(|state| {
                ValidationCoordinator::ensure_field_exists(&state.registry, &field)?;
                state.tracking.mark_field_as_touched(&field);
                Ok(state
                    .calculator()
                    .compute_revalidation(&state.snapshot, &[field.as_str()]))
            })
        })?;

        tracing::debug!(field = name, "field touched");
        Ok(snapshot)
    }

    /// Submits the form: validates every field and invokes exactly one of
    /// `on_pass` / `on_fail` with the resulting snapshot.
    ///
    /// The submit passes when full validation leaves no errors. Touched
    /// state is neither consulted nor changed, so the snapshot handed to
    /// `on_pass` reports [`is_valid`](FormSnapshot::is_valid) `false` while
    /// some field is still untouched; call
    /// [`touch_all_fields`](Self::touch_all_fields) first when both should
    /// agree.
    ///
    /// A failed submit under `OnSubmitThenRealTime` switches the strategy to
    /// `RealTimeOnly`. Under `Disabled` the submit always passes.
    ///
    /// Returns whether the submit passed.
    pub fn validate_form<P, F>(&self, on_pass: P, on_fail: F) -> bool
    where
        P: FnOnce(&FormSnapshot),
        F: FnOnce(&FormSnapshot),
    {
        let mut passed = true;
        let committed = self.shared.commit(|state| {
            let strategy = state.snapshot.strategy();
            let calculator = state.calculator();
            let validated = calculator.compute_full_validation(&state.snapshot, strategy);
            passed = !strategy.validates_on_submit() || validated.errors().is_empty();
            if passed {
                return Ok(validated);
            }

            let next = strategy.after_failed_submit();
            if next == strategy {
                return Ok(validated);
            }
            tracing::info!(from = %strategy, to = %next, "validation strategy changed after failed submit");
            Ok(calculator.compute_with_strategy(&validated, next))
        });

        let snapshot = match committed {
            Ok(snapshot) => snapshot,
            Err(error) => {
                // The submit closure raises no errors.
                tracing::error!(%error, "form submit failed");
                self.snapshot()
            }
        };

        tracing::debug!(
            passed,
            errors = snapshot.errors().len(),
            strategy = %snapshot.strategy(),
            "form submitted"
        );
        if passed {
            on_pass(&snapshot);
        } else {
            on_fail(&snapshot);
        }
        passed
    }

    /// Marks every field touched and validates the whole form.
    pub fn touch_all_fields(&self) -> Arc<FormSnapshot> {
        self.commit_infallible("touch all fields", |state| {
            state.tracking.mark_all_fields_as_touched();
            let strategy = state.snapshot.strategy();
            state
                .calculator()
                .compute_full_validation(&state.snapshot, strategy)
        })
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Manual errors
    // ─────────────────────────────────────────────────────────────────────────

    /// Sets (`Some`) or clears (`None`) a field's error, bypassing its
    /// validators. Ignored under `Disabled`.
    ///
    /// # Errors
    ///
    /// [`FormError::FieldNotFound`].
    pub fn update_error(&self, name: &str, message: Option<ErrorMessage>) -> FormResult {
        self.update_errors([(name, message)])
    }

    /// Sets or clears several errors at once. See
    /// [`update_error`](Self::update_error).
    ///
    /// # Errors
    ///
    /// [`FormError::FieldNotFound`] for the first unknown name; nothing is
    /// applied in that case.
    pub fn update_errors<I, S>(&self, updates: I) -> FormResult
    where
        I: IntoIterator<Item = (S, Option<ErrorMessage>)>,
        S: Into<String>,
    {
        let updates: Vec<(String, Option<ErrorMessage>)> = updates
            .into_iter()
            .map(|(name, message)| (name.into(), message))
            .collect();

        let snapshot = self.shared.commit(|state| {
            ValidationCoordinator::ensure_fields_exist(
                &state.registry,
                updates.iter().map(|(name, _)| name.as_str()),
            )?;
            let errors = ValidationCoordinator::merge_errors(state.snapshot.errors(), updates);
            Ok(state
                .calculator()
                .compute_with_errors(&state.snapshot, errors))
        })?;

        tracing::debug!(errors = snapshot.errors().len(), "errors updated manually");
        Ok(snapshot)
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Schema changes
    // ─────────────────────────────────────────────────────────────────────────

    /// Adds one field. See [`add_fields`](Self::add_fields).
    ///
    /// # Errors
    ///
    /// [`FormError::FieldAlreadyExists`] or [`FormError::TypeMismatch`].
    pub fn add_field(&self, definition: FieldDefinition) -> FormResult {
        self.add_fields(vec![definition])
    }

    /// Adds fields at runtime, all or nothing.
    ///
    /// New fields start untouched with their initial value; existing values
    /// are preserved.
    ///
    /// # Errors
    ///
    /// [`FormError::FieldAlreadyExists`] naming the first colliding field,
    /// or [`FormError::TypeMismatch`] for a bad initial value.
    pub fn add_fields(&self, definitions: Vec<FieldDefinition>) -> FormResult {
        self.shared.commit(|state| {
            let FormState {
                registry,
                tracking,
                environment,
                snapshot,
            } = state;
            FieldLifecycleManager::new(registry, tracking).add_fields(
                definitions,
                snapshot,
                environment,
            )
        })
    }

    /// Removes one field. See [`remove_fields`](Self::remove_fields).
    ///
    /// # Errors
    ///
    /// [`FormError::FieldNotFound`].
    pub fn remove_field(&self, name: &str) -> FormResult {
        self.remove_fields(&[name])
    }

    /// Removes fields at runtime, all or nothing, cancelling their pending
    /// debounced validations.
    ///
    /// # Errors
    ///
    /// [`FormError::FieldNotFound`] for the first unknown name.
    pub fn remove_fields(&self, names: &[&str]) -> FormResult {
        let snapshot = self.shared.commit(|state| {
            let FormState {
                registry,
                tracking,
                environment,
                snapshot,
            } = state;
            FieldLifecycleManager::new(registry, tracking).remove_fields(
                names,
                snapshot,
                environment,
            )
        })?;
        for name in names {
            self.shared.scheduler.cancel_field_validation(name);
        }
        Ok(snapshot)
    }

    /// Replaces a field's validators and revalidates it per the strategy's
    /// change rule. An existing error on the field is always re-checked
    /// against the new validators.
    ///
    /// # Errors
    ///
    /// [`FormError::FieldNotFound`].
    pub fn update_field_validators(
        &self,
        name: &str,
        validators: Vec<BoxedValidator>,
    ) -> FormResult {
        self.shared.commit(|state| {
            state.registry.update_field_validators(name, validators)?;
            Ok(state
                .calculator()
                .compute_validators_replaced(&state.snapshot, name))
        })
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Strategy, reset, environment
    // ─────────────────────────────────────────────────────────────────────────

    /// Switches the validation strategy. Values and errors are kept, except
    /// that `Disabled` drops every error.
    pub fn set_validation_strategy(&self, strategy: ValidationStrategy) -> Arc<FormSnapshot> {
        tracing::debug!(%strategy, "validation strategy set");
        self.commit_infallible("set validation strategy", |state| {
            state
                .calculator()
                .compute_with_strategy(&state.snapshot, strategy)
        })
    }

    /// Restores initial values, clears errors and touched state and cancels
    /// pending debounced validations. The strategy is kept.
    pub fn reset_form(&self) -> Arc<FormSnapshot> {
        self.shared.scheduler.cancel_all();
        let snapshot = self.commit_infallible("reset form", |state| {
            state.tracking.reset_touched_fields();
            let strategy = state.snapshot.strategy();
            state.calculator().compute_reset(strategy)
        });
        tracing::debug!("form reset");
        snapshot
    }

    /// Returns a copy of the validation environment.
    #[must_use]
    pub fn environment(&self) -> Environment {
        self.shared.state.lock().environment.clone()
    }

    /// Replaces the validation environment used by later validations.
    pub fn set_environment(&self, environment: Environment) {
        tracing::debug!(locale = environment.locale(), "environment replaced");
        self.shared.state.lock().environment = environment;
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Reads
    // ─────────────────────────────────────────────────────────────────────────

    /// Returns the current snapshot.
    #[must_use]
    pub fn snapshot(&self) -> Arc<FormSnapshot> {
        Arc::clone(&self.shared.state.lock().snapshot)
    }

    /// Reads a field's value as `T`.
    ///
    /// # Errors
    ///
    /// [`FormError::FieldNotFound`], or [`FormError::TypeMismatch`] if `T`
    /// does not match the field's type or the stored value (an absent value
    /// only reads as `Option<_>`).
    pub fn get_value<T: FromFieldValue>(&self, name: &str) -> Result<T, FormError> {
        let state = self.shared.state.lock();
        ValidationCoordinator::read_value(&state.registry, name, state.snapshot.value(name))
    }

    /// The current validation strategy.
    #[must_use]
    pub fn validation_strategy(&self) -> ValidationStrategy {
        self.shared.state.lock().snapshot.strategy()
    }

    /// Returns whether a field is touched.
    #[must_use]
    pub fn is_field_touched(&self, name: &str) -> bool {
        self.shared.state.lock().tracking.is_field_touched(name)
    }

    /// Number of touched fields.
    #[must_use]
    pub fn touched_count(&self) -> usize {
        self.shared.state.lock().tracking.touched_count()
    }

    /// Names of all fields, in registration order.
    #[must_use]
    pub fn field_names(&self) -> Vec<String> {
        self.shared
            .state
            .lock()
            .registry
            .field_names()
            .map(ToOwned::to_owned)
            .collect()
    }

    /// The configuration the form was created with.
    #[must_use]
    pub fn config(&self) -> &FormConfig {
        &self.shared.config
    }

    /// Number of debounced validations waiting to fire.
    #[must_use]
    pub fn pending_validations(&self) -> usize {
        self.shared.scheduler.pending_count()
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Subscriptions
    // ─────────────────────────────────────────────────────────────────────────

    /// Registers a listener for published snapshots. The current snapshot is
    /// delivered immediately.
    pub fn subscribe<F>(&self, listener: F) -> SubscriptionId
    where
        F: Fn(&FormSnapshot) + Send + Sync + 'static,
    {
        self.shared.subscribers.subscribe(listener)
    }

    /// Removes a listener, returning whether it was registered.
    pub fn unsubscribe(&self, id: &SubscriptionId) -> bool {
        self.shared.subscribers.unsubscribe(id)
    }

    /// Number of registered listeners.
    #[must_use]
    pub fn subscriber_count(&self) -> usize {
        self.shared.subscribers.subscriber_count()
    }

    /// Returns a receiver always holding the latest published snapshot.
    #[must_use]
    pub fn watch(&self) -> watch::Receiver<Arc<FormSnapshot>> {
        self.shared.subscribers.watch()
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Teardown
    // ─────────────────────────────────────────────────────────────────────────

    /// Cancels every pending debounced validation. Later debounced updates
    /// still apply their values but never validate.
    pub fn dispose(&self) {
        if !self.shared.scheduler.is_disposed() {
            self.shared.scheduler.dispose_all();
            tracing::debug!("form disposed");
        }
    }

    /// Returns whether [`dispose`](Self::dispose) was called.
    #[must_use]
    pub fn is_disposed(&self) -> bool {
        self.shared.scheduler.is_disposed()
    }

    fn commit_infallible<F>(&self, operation: &'static str, mutate: F) -> Arc<FormSnapshot>
    where
        F: FnOnce(&mut FormState) -> FormSnapshot,
    {
        match self.shared.commit(|state| Ok(mutate(state))) {
            Ok(snapshot) => snapshot,
            Err(error) => {
                tracing::error!(operation, %error, "infallible form operation failed");
                self.snapshot()
            }
        }
    }
}

impl Drop for FormController {
    fn drop(&mut self) {
        self.dispose();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use formwork_fields::FieldType;
    use formwork_fields::validators::{email, required};

    fn signup(strategy: ValidationStrategy) -> FormController {
        FormController::new(
            [
                FieldDefinition::new("email", FieldType::Text)
                    .with_initial_value("")
                    .with_validators([required(), email()]),
                FieldDefinition::new("age", FieldType::Integer).with_validator(required()),
            ],
            FormConfig::new().with_strategy(strategy),
        )
        .unwrap()
    }

    #[test]
    fn update_field_rejects_unknown_and_mistyped_fields() {
        let form = signup(ValidationStrategy::RealTimeOnly);
        let before = form.snapshot();

        assert!(matches!(
            form.update_field("name", "x"),
            Err(FormError::FieldNotFound { .. })
        ));
        assert_eq!(
            form.update_field("age", "thirty").unwrap_err(),
            FormError::type_mismatch("age", FieldType::Integer, Some(FieldType::Text))
        );
        assert_eq!(form.snapshot(), before, "failed calls change nothing");
        assert_eq!(form.touched_count(), 0);
    }

    #[test]
    fn update_field_marks_touched() {
        let form = signup(ValidationStrategy::RealTimeOnly);
        form.update_field("email", "a@b.com").unwrap();
        assert!(form.is_field_touched("email"));
        assert!(!form.is_field_touched("age"));
    }

    #[test]
    fn manual_errors_bypass_validators() {
        let form = signup(ValidationStrategy::RealTimeOnly);
        let snapshot = form
            .update_error("age", Some("taken".to_owned()))
            .unwrap();
        assert_eq!(snapshot.error("age").map(String::as_str), Some("taken"));

        let snapshot = form.update_error("age", None).unwrap();
        assert!(!snapshot.has_error("age"));

        assert!(form.update_error("ghost", None).is_err());
    }

    #[test]
    fn disabled_ignores_manual_errors() {
        let form = signup(ValidationStrategy::Disabled);
        let snapshot = form
            .update_error("age", Some("taken".to_owned()))
            .unwrap();
        assert!(snapshot.errors().is_empty());
        assert!(snapshot.is_valid());
    }

    #[test]
    fn touch_all_fields_validates_everything() {
        let form = signup(ValidationStrategy::OnSubmitOnly);
        let snapshot = form.touch_all_fields();
        assert_eq!(form.touched_count(), 2);
        assert!(snapshot.has_error("email"));
        assert!(snapshot.has_error("age"));
    }

    #[test]
    fn reset_restores_initial_state_and_keeps_strategy() {
        let form = signup(ValidationStrategy::RealTimeOnly);
        form.update_field("email", "bad").unwrap();
        form.update_field("age", 3).unwrap();

        let snapshot = form.reset_form();

        assert_eq!(snapshot.value("email"), Some(&FieldValue::from("")));
        assert_eq!(snapshot.value("age"), None);
        assert!(snapshot.errors().is_empty());
        assert_eq!(form.touched_count(), 0);
        assert_eq!(snapshot.strategy(), ValidationStrategy::RealTimeOnly);
    }

    #[test]
    fn validate_field_bypasses_submit_gating() {
        let form = signup(ValidationStrategy::OnSubmitOnly);
        let snapshot = form.validate_field("email").unwrap();
        assert!(snapshot.has_error("email"));
        assert!(!snapshot.has_error("age"));
        assert!(form.validate_field("ghost").is_err());
    }

    #[test]
    fn touch_field_follows_change_rule() {
        let gated = signup(ValidationStrategy::OnSubmitOnly);
        let snapshot = gated.touch_field("email").unwrap();
        assert!(gated.is_field_touched("email"));
        assert!(snapshot.errors().is_empty());

        let live = signup(ValidationStrategy::RealTimeOnly);
        assert!(live.touch_field("email").unwrap().has_error("email"));
    }

    #[test]
    fn environment_is_replaceable() {
        let form = signup(ValidationStrategy::RealTimeOnly);
        assert_eq!(form.environment().locale(), "en");
        form.set_environment(Environment::new("fr"));
        assert_eq!(form.environment().locale(), "fr");
    }

    #[test]
    fn get_value_is_typed() {
        let form = signup(ValidationStrategy::RealTimeOnly);
        form.update_field("age", 30).unwrap();

        assert_eq!(form.get_value::<i64>("age"), Ok(30));
        assert_eq!(form.get_value::<Option<String>>("email"), Ok(Some(String::new())));
        assert!(matches!(
            form.get_value::<String>("age"),
            Err(FormError::TypeMismatch { .. })
        ));
    }

    #[test]
    fn debounced_completion_validates_the_scheduled_value() {
        let form = signup(ValidationStrategy::RealTimeOnly);

        let snapshot = form
            .shared
            .run_debounced("email", Some(&FieldValue::from("")))
            .unwrap();
        assert!(snapshot.has_error("email"));
        assert_eq!(form.snapshot(), snapshot);
    }

    #[test]
    fn debounced_completion_for_a_superseded_value_is_dropped() {
        let form = signup(ValidationStrategy::RealTimeOnly);
        let before = form.snapshot();

        assert!(
            form.shared
                .run_debounced("email", Some(&FieldValue::from("typed earlier")))
                .is_none()
        );
        assert!(form.shared.run_debounced("nickname", None).is_none());
        assert_eq!(form.snapshot(), before);
    }

    #[test]
    fn dispose_is_idempotent() {
        let form = signup(ValidationStrategy::RealTimeOnly);
        assert!(!form.is_disposed());
        form.dispose();
        form.dispose();
        assert!(form.is_disposed());
    }
}
