//! Dotted value paths addressing one entry inside a configuration file.

use {
    crate::error::SchemaError,
    std::{fmt, str::FromStr},
};

/// Root-to-leaf segment sequence, always non-empty.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ValuePath {
    segments: Vec<String>,
}

impl ValuePath {
    /// Parse a dotted path like `"video.render_distance"`.
    pub fn from_dotted(path: &str) -> Result<Self, SchemaError> {
        if path.is_empty() {
            return Err(SchemaError::EmptyPath);
        }
        let segments: Vec<String> = path.split('.').map(str::to_string).collect();
        if segments.iter().any(String::is_empty) {
            return Err(SchemaError::EmptySegment(path.to_string()));
        }
        Ok(Self { segments })
    }

    pub fn from_segments<I, S>(segments: I) -> Result<Self, SchemaError>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let segments: Vec<String> = segments.into_iter().map(Into::into).collect();
        if segments.is_empty() {
            return Err(SchemaError::EmptyPath);
        }
        if segments.iter().any(String::is_empty) {
            return Err(SchemaError::EmptySegment(segments.join(".")));
        }
        Ok(Self { segments })
    }

    /// Internal constructor for walks that rebuild known-good paths.
    pub(crate) fn new_unchecked(segments: Vec<String>) -> Self {
        Self { segments }
    }

    pub fn segments(&self) -> &[String] {
        &self.segments
    }

    /// Final segment: the value's own name.
    pub fn leaf(&self) -> &str {
        self.segments.last().map(String::as_str).unwrap_or("")
    }

    /// Every segment but the last: the folder chain above the value.
    pub fn parents(&self) -> &[String] {
        let end = self.segments.len().saturating_sub(1);
        &self.segments[..end]
    }

    /// Whether `self` lies strictly inside the folder named by `prefix`.
    pub fn is_inside(&self, prefix: &ValuePath) -> bool {
        self.segments.len() > prefix.segments.len()
            && self.segments[..prefix.segments.len()] == prefix.segments[..]
    }
}

impl fmt::Display for ValuePath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.segments.join("."))
    }
}

impl FromStr for ValuePath {
    type Err = SchemaError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::from_dotted(s)
    }
}
