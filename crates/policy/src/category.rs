//! Configuration categories: where a file applies and how far its edits reach.

use {
    serde::{Deserialize, Serialize},
    std::{fmt, str::FromStr},
    thiserror::Error,
};

/// Applicability scope of one configuration file.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Category {
    /// Presentation-side only; never leaves the local machine.
    Client,
    /// Applies on both sides; each side keeps its own copy.
    Universal,
    /// Bound to one session's data directory; not synchronized.
    World,
    /// Bound to one session's data directory and pushed to the authority
    /// when edited by a remote peer.
    WorldSync,
}

impl Category {
    pub const ALL: [Category; 4] = [
        Category::Client,
        Category::Universal,
        Category::World,
        Category::WorldSync,
    ];

    /// Whether backing data only exists while a session is active.
    pub fn is_world_scoped(self) -> bool {
        matches!(self, Category::World | Category::WorldSync)
    }

    /// Whether edits made by a non-authoritative peer must be pushed to the
    /// session authority instead of applied locally.
    pub fn requires_remote_sync(self) -> bool {
        matches!(self, Category::WorldSync)
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Category::Client => "client",
            Category::Universal => "universal",
            Category::World => "world",
            Category::WorldSync => "world_sync",
        }
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Unrecognized category name.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("unknown config category: {0:?}")]
pub struct CategoryParseError(pub String);

impl FromStr for Category {
    type Err = CategoryParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "client" => Ok(Category::Client),
            "universal" => Ok(Category::Universal),
            "world" => Ok(Category::World),
            "world_sync" => Ok(Category::WorldSync),
            other => Err(CategoryParseError(other.to_string())),
        }
    }
}
