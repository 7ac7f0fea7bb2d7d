//! Adding and removing fields at runtime.
//!
//! Batches are all-or-nothing: every precondition is checked before the
//! registry is touched, so a failed call leaves the form exactly as it was.

use formwork_fields::{Environment, FieldDefinition, FieldRegistry, FormError};
use hashbrown::HashSet;

use crate::calculator::StateCalculator;
use crate::coordinator::ValidationCoordinator;
use crate::snapshot::FormSnapshot;
use crate::tracking::FieldTracking;

/// Applies schema changes to the registry and touched set together.
#[derive(Debug)]
pub struct FieldLifecycleManager<'a> {
    registry: &'a mut FieldRegistry,
    tracking: &'a mut FieldTracking,
}

impl<'a> FieldLifecycleManager<'a> {
    /// Wraps the registry and touched set of one form.
    pub fn new(registry: &'a mut FieldRegistry, tracking: &'a mut FieldTracking) -> Self {
        Self { registry, tracking }
    }

    /// Registers `definitions` and derives the next snapshot.
    ///
    /// New fields start untouched with their initial value; values of
    /// existing fields are preserved.
    ///
    /// # Errors
    ///
    /// [`FormError::FieldAlreadyExists`] if a name is taken or repeated
    /// within the batch, [`FormError::TypeMismatch`] if an initial value has
    /// the wrong type. Nothing is applied on error.
    pub fn add_fields(
        &mut self,
        definitions: Vec<FieldDefinition>,
        current: &FormSnapshot,
        environment: &Environment,
    ) -> Result<FormSnapshot, FormError> {
        {
            let mut batch: HashSet<&str> = HashSet::with_capacity(definitions.len());
            for definition in &definitions {
                self.registry.check_addable(definition)?;
                if !batch.insert(definition.name()) {
                    return Err(FormError::already_exists(definition.name()));
                }
            }
        }

        for definition in definitions {
            let name = definition.name().to_owned();
            self.registry.add_field(definition)?;
            self.tracking.init_field(&name);
            tracing::debug!(field = %name, "field added");
        }

        Ok(self.recompute(current, environment))
    }

    /// Unregisters the named fields and derives the next snapshot.
    ///
    /// Removed fields disappear from values, errors, types and the touched
    /// set; the remaining values are preserved. Repeated names are removed
    /// once.
    ///
    /// # Errors
    ///
    /// [`FormError::FieldNotFound`] for the first unknown name. Nothing is
    /// applied on error.
    pub fn remove_fields(
        &mut self,
        names: &[&str],
        current: &FormSnapshot,
        environment: &Environment,
    ) -> Result<FormSnapshot, FormError> {
        ValidationCoordinator::ensure_fields_exist(&*self.registry, names.iter().copied())?;

        for name in names {
            if !self.registry.field_exists(name) {
                continue;
            }
            self.registry.remove_field(name)?;
            self.tracking.remove_field(name);
            tracing::debug!(field = %name, "field removed");
        }

        Ok(self.recompute(current, environment))
    }

    fn recompute(&self, current: &FormSnapshot, environment: &Environment) -> FormSnapshot {
        StateCalculator::new(&*self.registry, &*self.tracking, environment)
            .compute_schema_change(current)
    }
}
