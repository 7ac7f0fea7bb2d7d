//! Touched-field tracking.
//!
//! A field is *touched* once the user has interacted with it. Touched state
//! only gates overall validity; it never changes values or errors.

use hashbrown::HashMap;

/// Per-field touched flags.
///
/// Holds exactly one entry per registered field. The lifecycle hooks
/// [`init_field`](Self::init_field) and [`remove_field`](Self::remove_field)
/// keep it in step with the registry.
#[derive(Debug, Clone, Default)]
pub struct FieldTracking {
    touched: HashMap<String, bool>,
}

impl FieldTracking {
    /// Creates a tracker with an untouched entry for each name.
    pub fn new<'a>(names: impl IntoIterator<Item = &'a str>) -> Self {
        let mut tracking = Self::default();
        for name in names {
            tracking.init_field(name);
        }
        tracking
    }

    /// Adds an untouched entry for a newly registered field.
    pub fn init_field(&mut self, name: &str) {
        self.touched.insert(name.to_owned(), false);
    }

    /// Drops the entry of a removed field.
    pub fn remove_field(&mut self, name: &str) {
        self.touched.remove(name);
    }

    /// Marks one field as touched. Unknown names are ignored.
    pub fn mark_field_as_touched(&mut self, name: &str) {
        if let Some(touched) = self.touched.get_mut(name) {
            *touched = true;
        }
    }

    /// Marks several fields as touched.
    pub fn mark_fields_as_touched<'a>(&mut self, names: impl IntoIterator<Item = &'a str>) {
        for name in names {
            self.mark_field_as_touched(name);
        }
    }

    /// Marks every field as touched.
    pub fn mark_all_fields_as_touched(&mut self) {
        self.touched.values_mut().for_each(|touched| *touched = true);
    }

    /// Resets every field to untouched.
    pub fn reset_touched_fields(&mut self) {
        self.touched.values_mut().for_each(|touched| *touched = false);
    }

    /// Returns whether a field is touched. Unknown names are untouched.
    #[must_use]
    pub fn is_field_touched(&self, name: &str) -> bool {
        self.touched.get(name).copied().unwrap_or(false)
    }

    /// Number of touched fields.
    #[must_use]
    pub fn touched_count(&self) -> usize {
        self.touched.values().filter(|touched| **touched).count()
    }

    /// Number of untouched fields.
    #[must_use]
    pub fn untouched_count(&self) -> usize {
        self.touched.len() - self.touched_count()
    }

    /// Returns true if every tracked field is touched (vacuously for none).
    #[must_use]
    pub fn all_touched(&self) -> bool {
        self.touched.values().all(|touched| *touched)
    }

    /// Number of tracked fields.
    #[must_use]
    pub fn len(&self) -> usize {
        self.touched.len()
    }

    /// Returns true if no fields are tracked.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.touched.is_empty()
    }
}
