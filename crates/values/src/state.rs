//! The tagged union over every supported entry kind.
//!
//! Trees, change sets, and stores treat entries uniformly through
//! `ValueState`; editing surfaces reach the typed handle through the
//! `as_*_mut` accessors. One variant per underlying source kind, with the
//! per-kind converter chosen here, at wrap time.

use {
    crate::{
        RawValue,
        handle::ValueHandle,
        list::{ListConverter, ListHandle},
        schema::{RestartPolicy, ValueKind, ValueSpec},
    },
    tracing::warn,
};

#[derive(Clone)]
pub enum ValueState {
    Bool(ValueHandle<bool>),
    Integer(ValueHandle<i64>),
    Float(ValueHandle<f64>),
    Text(ValueHandle<String>),
    Choice(ValueHandle<String>),
    IntegerList(ListHandle<i64>),
    TextList(ListHandle<String>),
    ChoiceList(ListHandle<String>),
}

impl ValueState {
    /// Wrap one schema entry, seeding from the stored raw value when it is
    /// present and well-shaped, otherwise from the declared default.
    ///
    /// Bad stored data is corrected, not propagated: a raw value of the
    /// wrong shape, outside the validator, or (for choices) outside the
    /// declared options falls back to the default with a warning.
    pub fn from_spec(name: &str, spec: &ValueSpec, raw: Option<&RawValue>) -> ValueState {
        match spec.kind() {
            ValueKind::Bool { default } => {
                let handle = decorate(ValueHandle::new(name, *default), spec);
                let handle = match raw {
                    None => handle,
                    Some(raw) => match raw.as_bool() {
                        Some(v) => handle.with_initial(v),
                        None => {
                            warn_shape(name, "bool");
                            handle
                        }
                    },
                };
                ValueState::Bool(handle)
            }
            ValueKind::Integer { default, validator } => {
                let handle = decorate(ValueHandle::new(name, *default), spec)
                    .with_validator_arc(validator.clone());
                let handle = match raw {
                    None => handle,
                    Some(raw) => match raw.as_integer() {
                        Some(v) if handle.is_valid(&v) => handle.with_initial(v),
                        Some(v) => {
                            warn_rejected(name, &v.to_string());
                            handle
                        }
                        None => {
                            warn_shape(name, "integer");
                            handle
                        }
                    },
                };
                ValueState::Integer(handle)
            }
            ValueKind::Float { default, validator } => {
                let handle = decorate(ValueHandle::new(name, *default), spec)
                    .with_validator_arc(validator.clone());
                let handle = match raw {
                    None => handle,
                    Some(raw) => match float_of(raw) {
                        Some(v) if handle.is_valid(&v) => handle.with_initial(v),
                        Some(v) => {
                            warn_rejected(name, &v.to_string());
                            handle
                        }
                        None => {
                            warn_shape(name, "float");
                            handle
                        }
                    },
                };
                ValueState::Float(handle)
            }
            ValueKind::Text { default, validator } => {
                let handle = decorate(ValueHandle::new(name, default.clone()), spec)
                    .with_validator_arc(validator.clone());
                let handle = match raw {
                    None => handle,
                    Some(raw) => match raw.as_str() {
                        Some(v) if handle.is_valid(&v.to_string()) => {
                            handle.with_initial(v.to_string())
                        }
                        Some(v) => {
                            warn_rejected(name, v);
                            handle
                        }
                        None => {
                            warn_shape(name, "text");
                            handle
                        }
                    },
                };
                ValueState::Text(handle)
            }
            ValueKind::Choice { default, options } => {
                let membership = {
                    let options = options.clone();
                    move |v: &String| options.iter().any(|option| option == v)
                };
                let handle = decorate(ValueHandle::new(name, default.clone()), spec)
                    .with_validator(membership);
                let handle = match raw {
                    None => handle,
                    Some(raw) => match raw.as_str() {
                        Some(text) => {
                            match options.iter().find(|o| o.eq_ignore_ascii_case(text)) {
                                Some(canonical) => handle.with_initial(canonical.clone()),
                                None => {
                                    warn!(
                                        value = name,
                                        stored = text,
                                        "stored choice not among declared options, using default"
                                    );
                                    handle
                                }
                            }
                        }
                        None => {
                            warn_shape(name, "text");
                            handle
                        }
                    },
                };
                ValueState::Choice(handle)
            }
            ValueKind::IntegerList { default } => {
                let handle = decorate_list(
                    ListHandle::new(name, default.clone(), ListConverter::integer()),
                    spec,
                );
                ValueState::IntegerList(seed_list(name, handle, raw))
            }
            ValueKind::TextList { default } => {
                let handle = decorate_list(
                    ListHandle::new(name, default.clone(), ListConverter::text()),
                    spec,
                );
                ValueState::TextList(seed_list(name, handle, raw))
            }
            ValueKind::ChoiceList { default, options } => {
                let membership = {
                    let options = options.clone();
                    move |v: &String| options.iter().any(|option| option == v)
                };
                let handle = ListHandle::new(
                    name,
                    default.clone(),
                    ListConverter::choice(options.clone()),
                )
                .with_element_validator(membership);
                ValueState::ChoiceList(seed_list(name, decorate_list(handle, spec), raw))
            }
        }
    }

    pub fn name(&self) -> &str {
        match self {
            ValueState::Bool(h) => h.name(),
            ValueState::Integer(h) => h.name(),
            ValueState::Float(h) => h.name(),
            ValueState::Text(h) | ValueState::Choice(h) => h.name(),
            ValueState::IntegerList(h) => h.name(),
            ValueState::TextList(h) | ValueState::ChoiceList(h) => h.name(),
        }
    }

    pub fn comment(&self) -> Option<&str> {
        match self {
            ValueState::Bool(h) => h.comment(),
            ValueState::Integer(h) => h.comment(),
            ValueState::Float(h) => h.comment(),
            ValueState::Text(h) | ValueState::Choice(h) => h.comment(),
            ValueState::IntegerList(h) => h.comment(),
            ValueState::TextList(h) | ValueState::ChoiceList(h) => h.comment(),
        }
    }

    pub fn valid_hint(&self) -> Option<&str> {
        match self {
            ValueState::Bool(h) => h.valid_hint(),
            ValueState::Integer(h) => h.valid_hint(),
            ValueState::Float(h) => h.valid_hint(),
            ValueState::Text(h) | ValueState::Choice(h) => h.valid_hint(),
            ValueState::IntegerList(h) => h.valid_hint(),
            ValueState::TextList(h) | ValueState::ChoiceList(h) => h.valid_hint(),
        }
    }

    pub fn restart(&self) -> RestartPolicy {
        match self {
            ValueState::Bool(h) => h.restart(),
            ValueState::Integer(h) => h.restart(),
            ValueState::Float(h) => h.restart(),
            ValueState::Text(h) | ValueState::Choice(h) => h.restart(),
            ValueState::IntegerList(h) => h.restart(),
            ValueState::TextList(h) | ValueState::ChoiceList(h) => h.restart(),
        }
    }

    pub fn kind_name(&self) -> &'static str {
        match self {
            ValueState::Bool(_) => "bool",
            ValueState::Integer(_) => "integer",
            ValueState::Float(_) => "float",
            ValueState::Text(_) => "text",
            ValueState::Choice(_) => "choice",
            ValueState::IntegerList(_) => "integer_list",
            ValueState::TextList(_) => "text_list",
            ValueState::ChoiceList(_) => "choice_list",
        }
    }

    /// Whether the current value differs from the value loaded at build.
    pub fn is_changed(&self) -> bool {
        match self {
            ValueState::Bool(h) => h.is_changed(),
            ValueState::Integer(h) => h.is_changed(),
            ValueState::Float(h) => h.is_changed(),
            ValueState::Text(h) | ValueState::Choice(h) => h.is_changed(),
            ValueState::IntegerList(h) => h.is_changed(),
            ValueState::TextList(h) | ValueState::ChoiceList(h) => h.is_changed(),
        }
    }

    /// Whether the current value equals the declared default.
    pub fn is_default(&self) -> bool {
        match self {
            ValueState::Bool(h) => h.is_default(),
            ValueState::Integer(h) => h.is_default(),
            ValueState::Float(h) => h.is_default(),
            ValueState::Text(h) | ValueState::Choice(h) => h.is_default(),
            ValueState::IntegerList(h) => h.is_default(),
            ValueState::TextList(h) | ValueState::ChoiceList(h) => h.is_default(),
        }
    }

    pub fn restore(&mut self) {
        match self {
            ValueState::Bool(h) => h.restore(),
            ValueState::Integer(h) => h.restore(),
            ValueState::Float(h) => h.restore(),
            ValueState::Text(h) | ValueState::Choice(h) => h.restore(),
            ValueState::IntegerList(h) => h.restore(),
            ValueState::TextList(h) | ValueState::ChoiceList(h) => h.restore(),
        }
    }

    pub fn clear_cache(&mut self) {
        match self {
            ValueState::Bool(h) => h.clear_cache(),
            ValueState::Integer(h) => h.clear_cache(),
            ValueState::Float(h) => h.clear_cache(),
            ValueState::Text(h) | ValueState::Choice(h) => h.clear_cache(),
            ValueState::IntegerList(h) => h.clear_cache(),
            ValueState::TextList(h) | ValueState::ChoiceList(h) => h.clear_cache(),
        }
    }

    /// Storage representation of the current value.
    pub fn raw_value(&self) -> RawValue {
        match self {
            ValueState::Bool(h) => RawValue::from(*h.get()),
            ValueState::Integer(h) => RawValue::from(*h.get()),
            ValueState::Float(h) => RawValue::from(*h.get()),
            ValueState::Text(h) | ValueState::Choice(h) => RawValue::from(h.get().as_str()),
            ValueState::IntegerList(h) => h.to_raw(),
            ValueState::TextList(h) | ValueState::ChoiceList(h) => h.to_raw(),
        }
    }

    /// Decode a raw value and apply it through the typed `set`.
    ///
    /// Wrong shape or validator rejection leaves the entry untouched and
    /// returns `false`.
    pub fn set_raw(&mut self, raw: &RawValue) -> bool {
        match self {
            ValueState::Bool(h) => raw.as_bool().is_some_and(|v| h.set(v)),
            ValueState::Integer(h) => raw.as_integer().is_some_and(|v| h.set(v)),
            ValueState::Float(h) => float_of(raw).is_some_and(|v| h.set(v)),
            ValueState::Text(h) | ValueState::Choice(h) => {
                raw.as_str().is_some_and(|v| h.set(v.to_string()))
            }
            ValueState::IntegerList(h) => set_list_raw(h, raw),
            ValueState::TextList(h) | ValueState::ChoiceList(h) => set_list_raw(h, raw),
        }
    }

    pub fn as_bool_mut(&mut self) -> Option<&mut ValueHandle<bool>> {
        match self {
            ValueState::Bool(h) => Some(h),
            _ => None,
        }
    }

    pub fn as_integer_mut(&mut self) -> Option<&mut ValueHandle<i64>> {
        match self {
            ValueState::Integer(h) => Some(h),
            _ => None,
        }
    }

    pub fn as_float_mut(&mut self) -> Option<&mut ValueHandle<f64>> {
        match self {
            ValueState::Float(h) => Some(h),
            _ => None,
        }
    }

    pub fn as_text_mut(&mut self) -> Option<&mut ValueHandle<String>> {
        match self {
            ValueState::Text(h) => Some(h),
            _ => None,
        }
    }

    pub fn as_choice_mut(&mut self) -> Option<&mut ValueHandle<String>> {
        match self {
            ValueState::Choice(h) => Some(h),
            _ => None,
        }
    }

    pub fn as_integer_list_mut(&mut self) -> Option<&mut ListHandle<i64>> {
        match self {
            ValueState::IntegerList(h) => Some(h),
            _ => None,
        }
    }

    pub fn as_text_list_mut(&mut self) -> Option<&mut ListHandle<String>> {
        match self {
            ValueState::TextList(h) => Some(h),
            _ => None,
        }
    }

    pub fn as_choice_list_mut(&mut self) -> Option<&mut ListHandle<String>> {
        match self {
            ValueState::ChoiceList(h) => Some(h),
            _ => None,
        }
    }
}

impl std::fmt::Debug for ValueState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ValueState")
            .field("name", &self.name())
            .field("kind", &self.kind_name())
            .field("changed", &self.is_changed())
            .finish()
    }
}

fn decorate<T: Clone + PartialEq>(handle: ValueHandle<T>, spec: &ValueSpec) -> ValueHandle<T> {
    let mut handle = handle;
    if let Some(comment) = spec.comment() {
        handle = handle.with_comment(comment);
    }
    if let Some(hint) = spec.valid_hint() {
        handle = handle.with_valid_hint(hint);
    }
    handle.with_restart(spec.restart())
}

fn decorate_list<T: Clone + PartialEq>(handle: ListHandle<T>, spec: &ValueSpec) -> ListHandle<T> {
    let mut handle = handle;
    if let Some(comment) = spec.comment() {
        handle = handle.with_comment(comment);
    }
    if let Some(hint) = spec.valid_hint() {
        handle = handle.with_valid_hint(hint);
    }
    handle.with_restart(spec.restart())
}

fn seed_list<T: Clone + PartialEq>(
    name: &str,
    handle: ListHandle<T>,
    raw: Option<&RawValue>,
) -> ListHandle<T> {
    match raw {
        None => handle,
        Some(raw) => match handle.decode_raw(raw) {
            Some((values, dropped)) => {
                if dropped > 0 {
                    warn!(value = name, dropped, "dropped undecodable list elements");
                }
                handle.with_initial(values)
            }
            None => {
                warn_shape(name, "array");
                handle
            }
        },
    }
}

fn set_list_raw<T: Clone + PartialEq>(handle: &mut ListHandle<T>, raw: &RawValue) -> bool {
    // Unlike load-time seeding, an explicit set rejects wholesale when any
    // element fails to decode.
    match handle.decode_raw(raw) {
        Some((values, 0)) => handle.set(values),
        _ => false,
    }
}

/// TOML stores whole floats as integers; accept both shapes for float entries.
fn float_of(raw: &RawValue) -> Option<f64> {
    raw.as_float().or_else(|| raw.as_integer().map(|v| v as f64))
}

fn warn_shape(name: &str, expected: &str) {
    warn!(value = name, expected, "stored value has unexpected shape, using default");
}

fn warn_rejected(name: &str, stored: &str) {
    warn!(value = name, stored, "stored value rejected by validator, using default");
}
