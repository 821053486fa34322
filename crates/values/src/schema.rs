//! Declared shape of one configuration file.
//!
//! A host module describes each entry as a `ValueSpec` (kind, default,
//! optional validator, descriptive text) under a `ValuePath`. The schema is
//! validated once at construction; everything downstream can assume paths
//! are unique and non-overlapping.

use {
    crate::{RawValue, error::SchemaError, path::ValuePath},
    std::{collections::HashSet, fmt, sync::Arc},
};

/// Predicate a candidate value must pass before `set` applies it.
pub type Validator<T> = Arc<dyn Fn(&T) -> bool + Send + Sync>;

/// What a value edit requires before it takes full effect.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum RestartPolicy {
    /// Applies immediately after commit.
    #[default]
    None,
    /// Applies the next time a session is started.
    Session,
    /// Applies the next time the host application starts.
    Host,
}

// ── Value kinds ──────────────────────────────────────────────────────────────

/// Per-kind payload: default value, optional validator, choice options.
#[derive(Clone)]
pub enum ValueKind {
    Bool {
        default: bool,
    },
    Integer {
        default: i64,
        validator: Option<Validator<i64>>,
    },
    Float {
        default: f64,
        validator: Option<Validator<f64>>,
    },
    Text {
        default: String,
        validator: Option<Validator<String>>,
    },
    Choice {
        default: String,
        options: Vec<String>,
    },
    IntegerList {
        default: Vec<i64>,
    },
    TextList {
        default: Vec<String>,
    },
    ChoiceList {
        default: Vec<String>,
        options: Vec<String>,
    },
}

impl ValueKind {
    pub fn name(&self) -> &'static str {
        match self {
            ValueKind::Bool { .. } => "bool",
            ValueKind::Integer { .. } => "integer",
            ValueKind::Float { .. } => "float",
            ValueKind::Text { .. } => "text",
            ValueKind::Choice { .. } => "choice",
            ValueKind::IntegerList { .. } => "integer_list",
            ValueKind::TextList { .. } => "text_list",
            ValueKind::ChoiceList { .. } => "choice_list",
        }
    }
}

impl fmt::Debug for ValueKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

// ── Value spec ───────────────────────────────────────────────────────────────

/// Full declaration of one entry: kind plus descriptive metadata.
#[derive(Debug, Clone)]
pub struct ValueSpec {
    kind: ValueKind,
    comment: Option<String>,
    valid_hint: Option<String>,
    restart: RestartPolicy,
}

impl ValueSpec {
    fn from_kind(kind: ValueKind) -> Self {
        Self {
            kind,
            comment: None,
            valid_hint: None,
            restart: RestartPolicy::None,
        }
    }

    pub fn bool(default: bool) -> Self {
        Self::from_kind(ValueKind::Bool { default })
    }

    pub fn integer(default: i64) -> Self {
        Self::from_kind(ValueKind::Integer {
            default,
            validator: None,
        })
    }

    /// Integer confined to `min..=max`, with a derived validity hint.
    pub fn integer_range(default: i64, min: i64, max: i64) -> Self {
        let mut spec = Self::from_kind(ValueKind::Integer {
            default,
            validator: Some(Arc::new(move |v: &i64| (min..=max).contains(v))),
        });
        spec.valid_hint = Some(format!("between {min} and {max}"));
        spec
    }

    pub fn float(default: f64) -> Self {
        Self::from_kind(ValueKind::Float {
            default,
            validator: None,
        })
    }

    /// Float confined to `min..=max`, with a derived validity hint.
    pub fn float_range(default: f64, min: f64, max: f64) -> Self {
        let mut spec = Self::from_kind(ValueKind::Float {
            default,
            validator: Some(Arc::new(move |v: &f64| (min..=max).contains(v))),
        });
        spec.valid_hint = Some(format!("between {min} and {max}"));
        spec
    }

    pub fn text(default: impl Into<String>) -> Self {
        Self::from_kind(ValueKind::Text {
            default: default.into(),
            validator: None,
        })
    }

    pub fn text_validated(
        default: impl Into<String>,
        validator: impl Fn(&String) -> bool + Send + Sync + 'static,
    ) -> Self {
        Self::from_kind(ValueKind::Text {
            default: default.into(),
            validator: Some(Arc::new(validator)),
        })
    }

    /// Text restricted to a fixed option set (enum-as-string), with a derived
    /// validity hint listing the options.
    pub fn choice<S, I>(default: impl Into<String>, options: I) -> Self
    where
        S: Into<String>,
        I: IntoIterator<Item = S>,
    {
        let options: Vec<String> = options.into_iter().map(Into::into).collect();
        let mut spec = Self::from_kind(ValueKind::Choice {
            default: default.into(),
            options: options.clone(),
        });
        spec.valid_hint = Some(format!("one of: {}", options.join(", ")));
        spec
    }

    pub fn integer_list<I: IntoIterator<Item = i64>>(default: I) -> Self {
        Self::from_kind(ValueKind::IntegerList {
            default: default.into_iter().collect(),
        })
    }

    pub fn text_list<S, I>(default: I) -> Self
    where
        S: Into<String>,
        I: IntoIterator<Item = S>,
    {
        Self::from_kind(ValueKind::TextList {
            default: default.into_iter().map(Into::into).collect(),
        })
    }

    /// List whose every element must come from a fixed option set.
    pub fn choice_list<S, I, T, J>(default: I, options: J) -> Self
    where
        S: Into<String>,
        I: IntoIterator<Item = S>,
        T: Into<String>,
        J: IntoIterator<Item = T>,
    {
        let options: Vec<String> = options.into_iter().map(Into::into).collect();
        let mut spec = Self::from_kind(ValueKind::ChoiceList {
            default: default.into_iter().map(Into::into).collect(),
            options: options.clone(),
        });
        spec.valid_hint = Some(format!("each one of: {}", options.join(", ")));
        spec
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

    pub fn kind(&self) -> &ValueKind {
        &self.kind
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

    /// Storage representation of the declared default.
    pub fn default_raw(&self) -> RawValue {
        match &self.kind {
            ValueKind::Bool { default } => RawValue::from(*default),
            ValueKind::Integer { default, .. } => RawValue::from(*default),
            ValueKind::Float { default, .. } => RawValue::from(*default),
            ValueKind::Text { default, .. } | ValueKind::Choice { default, .. } => {
                RawValue::from(default.as_str())
            }
            ValueKind::IntegerList { default } => {
                RawValue::Array(default.iter().copied().collect())
            }
            ValueKind::TextList { default } | ValueKind::ChoiceList { default, .. } => {
                RawValue::Array(default.iter().map(String::as_str).collect())
            }
        }
    }
}

// ── Schema ───────────────────────────────────────────────────────────────────

/// One declared entry: where it lives and what it is.
#[derive(Debug, Clone)]
pub struct SchemaEntry {
    pub path: ValuePath,
    pub spec: ValueSpec,
}

/// Ordered, validated set of entries describing one configuration file.
#[derive(Debug, Clone, Default)]
pub struct Schema {
    entries: Vec<SchemaEntry>,
}

impl Schema {
    /// Build a schema from dotted paths in declaration order.
    ///
    /// Rejects duplicate paths and paths that collide with another entry's
    /// folder prefix (a name cannot be both a value and a folder).
    pub fn from_entries<I, S>(entries: I) -> Result<Self, SchemaError>
    where
        I: IntoIterator<Item = (S, ValueSpec)>,
        S: AsRef<str>,
    {
        let mut parsed = Vec::new();
        for (path, spec) in entries {
            parsed.push(SchemaEntry {
                path: ValuePath::from_dotted(path.as_ref())?,
                spec,
            });
        }

        let mut seen: HashSet<&ValuePath> = HashSet::new();
        for entry in &parsed {
            if !seen.insert(&entry.path) {
                return Err(SchemaError::DuplicatePath(entry.path.clone()));
            }
        }
        for entry in &parsed {
            if let Some(nested) = parsed.iter().find(|other| other.path.is_inside(&entry.path))
            {
                return Err(SchemaError::PathConflict {
                    value: entry.path.clone(),
                    nested: nested.path.clone(),
                });
            }
        }

        Ok(Self { entries: parsed })
    }

    pub fn iter(&self) -> impl Iterator<Item = &SchemaEntry> {
        self.entries.iter()
    }

    pub fn get(&self, path: &ValuePath) -> Option<&ValueSpec> {
        self.entries
            .iter()
            .find(|entry| entry.path == *path)
            .map(|entry| &entry.spec)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
