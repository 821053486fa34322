//! List-typed entries: element-erased storage, typed editing.
//!
//! Storage hands lists over as arrays of raw values; the editing surface
//! wants `Vec<T>`. A `ListConverter` supplied when the handle is wrapped
//! translates both ways, which is also where enum-as-string lists get their
//! canonical spelling back.

use {
    crate::{
        RawValue,
        schema::{RestartPolicy, Validator},
    },
    std::sync::Arc,
};

// ── Converter ────────────────────────────────────────────────────────────────

/// Two-way element translation between storage and editing representation.
pub struct ListConverter<T> {
    decode: Arc<dyn Fn(&RawValue) -> Option<T> + Send + Sync>,
    encode: Arc<dyn Fn(&T) -> RawValue + Send + Sync>,
}

impl<T> Clone for ListConverter<T> {
    fn clone(&self) -> Self {
        Self {
            decode: Arc::clone(&self.decode),
            encode: Arc::clone(&self.encode),
        }
    }
}

impl<T> ListConverter<T> {
    pub fn new(
        decode: impl Fn(&RawValue) -> Option<T> + Send + Sync + 'static,
        encode: impl Fn(&T) -> RawValue + Send + Sync + 'static,
    ) -> Self {
        Self {
            decode: Arc::new(decode),
            encode: Arc::new(encode),
        }
    }

    /// Element that failed to decode yields `None`.
    pub fn decode(&self, raw: &RawValue) -> Option<T> {
        (self.decode)(raw)
    }

    pub fn encode(&self, value: &T) -> RawValue {
        (self.encode)(value)
    }
}

impl ListConverter<i64> {
    pub fn integer() -> Self {
        Self::new(RawValue::as_integer, |v| RawValue::from(*v))
    }
}

impl ListConverter<String> {
    pub fn text() -> Self {
        Self::new(
            |raw| raw.as_str().map(str::to_string),
            |v| RawValue::from(v.as_str()),
        )
    }

    /// Text restricted to `options`; decoding matches case-insensitively and
    /// returns the declared spelling.
    pub fn choice(options: Vec<String>) -> Self {
        Self::new(
            move |raw| {
                let text = raw.as_str()?;
                options
                    .iter()
                    .find(|option| option.eq_ignore_ascii_case(text))
                    .cloned()
            },
            |v| RawValue::from(v.as_str()),
        )
    }
}

// ── List handle ──────────────────────────────────────────────────────────────

/// Editing state for one list entry; mirrors `ValueHandle` with per-element
/// validation on top.
#[derive(Clone)]
pub struct ListHandle<T> {
    name: String,
    comment: Option<String>,
    valid_hint: Option<String>,
    restart: RestartPolicy,
    default: Vec<T>,
    initial: Vec<T>,
    current: Vec<T>,
    element_validator: Option<Validator<T>>,
    converter: ListConverter<T>,
}

impl<T: Clone + PartialEq> ListHandle<T> {
    pub fn new(name: impl Into<String>, default: Vec<T>, converter: ListConverter<T>) -> Self {
        Self {
            name: name.into(),
            comment: None,
            valid_hint: None,
            restart: RestartPolicy::None,
            initial: default.clone(),
            current: default.clone(),
            default,
            element_validator: None,
            converter,
        }
    }

    pub fn with_initial(mut self, initial: Vec<T>) -> Self {
        self.current = initial.clone();
        self.initial = initial;
        self
    }

    pub fn with_element_validator(
        mut self,
        validator: impl Fn(&T) -> bool + Send + Sync + 'static,
    ) -> Self {
        self.element_validator = Some(Arc::new(validator));
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

    pub fn valid_hint(&self) -> Option<&str> {
        self.valid_hint.as_deref()
    }

    pub fn restart(&self) -> RestartPolicy {
        self.restart
    }

    pub fn get(&self) -> &[T] {
        &self.current
    }

    pub fn default_value(&self) -> &[T] {
        &self.default
    }

    /// Apply `values` if every element passes the element validator.
    ///
    /// One bad element rejects the whole list; partial application would
    /// leave the entry in a state no one asked for.
    pub fn set(&mut self, values: Vec<T>) -> bool {
        if !self.is_valid(&values) {
            return false;
        }
        self.current = values;
        true
    }

    pub fn is_valid(&self, values: &[T]) -> bool {
        match &self.element_validator {
            Some(accepts) => values.iter().all(|v| accepts(v)),
            None => true,
        }
    }

    pub fn restore(&mut self) {
        self.current = self.default.clone();
    }

    pub fn is_default(&self) -> bool {
        self.current == self.default
    }

    pub fn is_changed(&self) -> bool {
        self.current != self.initial
    }

    /// Uniform no-op hook; see `ValueHandle::clear_cache`.
    pub fn clear_cache(&mut self) {}

    /// Decode a raw storage array, dropping elements that fail to decode.
    ///
    /// Returns `None` when the raw value is not an array at all.
    pub fn decode_raw(&self, raw: &RawValue) -> Option<(Vec<T>, usize)> {
        let array = raw.as_array()?;
        let mut values = Vec::with_capacity(array.len());
        let mut dropped = 0_usize;
        for element in array.iter() {
            match self.converter.decode(element) {
                Some(value) => values.push(value),
                None => dropped += 1,
            }
        }
        Some((values, dropped))
    }

    /// Encode the current list into its storage representation.
    pub fn to_raw(&self) -> RawValue {
        RawValue::Array(
            self.current
                .iter()
                .map(|v| self.converter.encode(v))
                .collect(),
        )
    }
}

#[allow(clippy::unwrap_used, clippy::expect_used)]
#[cfg(test)]
mod tests {
    use super::*;

    fn raw_text_array(items: &[&str]) -> RawValue {
        RawValue::Array(items.iter().copied().collect())
    }

    #[test]
    fn integer_converter_round_trip() {
        let converter = ListConverter::integer();
        let raw = converter.encode(&42);
        assert_eq!(converter.decode(&raw), Some(42));
        assert_eq!(converter.decode(&RawValue::from("nope")), None);
    }

    #[test]
    fn choice_converter_restores_declared_spelling() {
        let converter =
            ListConverter::choice(vec!["Overworld".to_string(), "Nether".to_string()]);
        assert_eq!(
            converter.decode(&RawValue::from("overworld")),
            Some("Overworld".to_string())
        );
        assert_eq!(converter.decode(&RawValue::from("the_end")), None);
    }

    #[test]
    fn set_rejects_list_with_one_bad_element() {
        let mut handle = ListHandle::new(
            "levels",
            vec!["Overworld".to_string()],
            ListConverter::choice(vec!["Overworld".to_string(), "Nether".to_string()]),
        )
        .with_element_validator(|v: &String| v == "Overworld" || v == "Nether");

        let rejected = vec!["Overworld".to_string(), "Moon".to_string()];
        assert!(!handle.set(rejected));
        assert_eq!(handle.get(), ["Overworld".to_string()]);

        let accepted = vec!["Overworld".to_string(), "Nether".to_string()];
        assert!(handle.set(accepted.clone()));
        assert_eq!(handle.get(), accepted);
        assert!(handle.is_changed());
    }

    #[test]
    fn decode_raw_drops_undecodable_elements() {
        let handle = ListHandle::new("levels", Vec::new(), ListConverter::<String>::text());
        let mut raw = raw_text_array(&["a", "b"]);
        if let RawValue::Array(array) = &mut raw {
            array.push(7);
        }
        let (values, dropped) = handle.decode_raw(&raw).unwrap();
        assert_eq!(values, ["a".to_string(), "b".to_string()]);
        assert_eq!(dropped, 1);
        assert!(handle.decode_raw(&RawValue::from("not an array")).is_none());
    }

    #[test]
    fn restore_and_change_tracking() {
        let mut handle = ListHandle::new("ports", vec![1, 2], ListConverter::integer())
            .with_initial(vec![3]);
        assert!(!handle.is_changed());
        assert!(!handle.is_default());
        assert!(handle.set(vec![9]));
        assert!(handle.is_changed());
        handle.restore();
        assert!(handle.is_default());
        assert_eq!(handle.get(), [1, 2]);
    }

    #[test]
    fn to_raw_encodes_current_list() {
        let handle =
            ListHandle::new("ports", vec![10, 20], ListConverter::integer()).with_initial(vec![
                5, 6,
            ]);
        let raw = handle.to_raw();
        let items: Vec<i64> = raw
            .as_array()
            .unwrap()
            .iter()
            .filter_map(|v| v.as_integer())
            .collect();
        assert_eq!(items, [5, 6]);
    }
}
