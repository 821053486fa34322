//! In-memory editing state for one scalar configuration entry.

use crate::schema::{RestartPolicy, Validator};

/// One entry's editing state: the committed value it was built from, the
/// declared default, and the uncommitted current value.
///
/// A handle lives as long as the tree it belongs to. Mutations stay in
/// memory; nothing is durable until the owning store commits the tree.
#[derive(Clone)]
pub struct ValueHandle<T> {
    name: String,
    comment: Option<String>,
    valid_hint: Option<String>,
    restart: RestartPolicy,
    default: T,
    initial: T,
    current: T,
    validator: Option<Validator<T>>,
}

impl<T: Clone + PartialEq> ValueHandle<T> {
    /// New handle seeded entirely from the default value.
    pub fn new(name: impl Into<String>, default: T) -> Self {
        Self {
            name: name.into(),
            comment: None,
            valid_hint: None,
            restart: RestartPolicy::None,
            initial: default.clone(),
            current: default.clone(),
            default,
            validator: None,
        }
    }

    /// Seed the as-loaded value; resets the uncommitted value to match.
    pub fn with_initial(mut self, initial: T) -> Self {
        self.current = initial.clone();
        self.initial = initial;
        self
    }

    pub fn with_validator(
        mut self,
        validator: impl Fn(&T) -> bool + Send + Sync + 'static,
    ) -> Self {
        self.validator = Some(std::sync::Arc::new(validator));
        self
    }

    pub(crate) fn with_validator_arc(mut self, validator: Option<Validator<T>>) -> Self {
        self.validator = validator;
        self
    }

    pub fn with_comment(mut self, comment: impl Into<String>) -> Self {
        self.comment = Some(comment.into());
        self
    }

    pub fn with_valid_hint(mut self, hint: impl Into<String>) -> Self {
        self.valid_hint = Some(hint.into());
        self
    }

    pub fn with_restart(mut self, restart: RestartPolicy) -> Self {
        self.restart = restart;
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn comment(&self) -> Option<&str> {
        self.comment.as_deref()
    }

    /// Human-readable description of what the validator accepts.
    pub fn valid_hint(&self) -> Option<&str> {
        self.valid_hint.as_deref()
    }

    pub fn restart(&self) -> RestartPolicy {
        self.restart
    }

    pub fn get(&self) -> &T {
        &self.current
    }

    pub fn default_value(&self) -> &T {
        &self.default
    }

    /// Apply `value` if the validator accepts it.
    ///
    /// Returns whether the value was applied; a rejected value leaves the
    /// current value untouched and is not an error.
    pub fn set(&mut self, value: T) -> bool {
        if !self.is_valid(&value) {
            return false;
        }
        self.current = value;
        true
    }

    pub fn is_valid(&self, value: &T) -> bool {
        self.validator.as_ref().is_none_or(|accepts| accepts(value))
    }

    /// Reset the current value to the declared default.
    pub fn restore(&mut self) {
        self.current = self.default.clone();
    }

    pub fn is_default(&self) -> bool {
        self.current == self.default
    }

    /// Whether the current value differs from the value the handle was
    /// built with (i.e. there is something to commit).
    pub fn is_changed(&self) -> bool {
        self.current != self.initial
    }

    /// Drop memoized derived state after an external bulk update.
    ///
    /// Plain handles memoize nothing; the hook exists so every entry kind
    /// can be treated uniformly after restore-defaults batches.
    pub fn clear_cache(&mut self) {}
}
