//! The edit-access decision function.
//!
//! Pure: same inputs, same decision, no side effects. Callers log the
//! outcome themselves where it matters.

use crate::{
    category::Category,
    context::{RuntimeContext, SessionState},
};

// ── Deny reasons ─────────────────────────────────────────────────────────────

/// User-facing deny reasons, published so editing surfaces and tests share
/// the exact text.
pub mod reason {
    /// Actor hosts the session but published it to the local network.
    pub const PUBLISHED_SESSION: &str =
        "cannot edit world settings while the session is published to the local network";
    /// Actor joined a session another machine published to the local network.
    pub const REACHABLE_SESSION: &str =
        "cannot edit world settings on an externally reachable session";
    /// Remote edits require operator permission and a trusted peer grant.
    pub const UNTRUSTED_PEER: &str =
        "editing world settings on this authority requires elevated and trusted peer status";
}

// ── Decision ─────────────────────────────────────────────────────────────────

/// Outcome of an edit-permission check.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AccessDecision {
    allowed: bool,
    reason: Option<String>,
}

impl AccessDecision {
    pub fn allow() -> Self {
        Self {
            allowed: true,
            reason: None,
        }
    }

    /// Deny without a user-facing reason (surface simply not applicable).
    pub fn deny() -> Self {
        Self {
            allowed: false,
            reason: None,
        }
    }

    pub fn deny_with(reason: impl Into<String>) -> Self {
        Self {
            allowed: false,
            reason: Some(reason.into()),
        }
    }

    pub fn is_allowed(&self) -> bool {
        self.allowed
    }

    pub fn reason(&self) -> Option<&str> {
        self.reason.as_deref()
    }
}

// ── Decision function ────────────────────────────────────────────────────────

/// Whether the acting peer may edit configuration of `category` under `ctx`.
///
/// Client and universal files are personal on the presentation side and never
/// editable on the authority. World-scoped files follow session ownership:
/// free when the actor owns the session privately, denied on sessions other
/// machines can reach, and open to remote actors only with both elevated and
/// trusted peer status.
pub fn can_edit(category: Category, ctx: &RuntimeContext) -> AccessDecision {
    match ctx {
        RuntimeContext::Presentation {
            session,
            elevated,
            trusted_peer,
        } => match category {
            Category::Client | Category::Universal => AccessDecision::allow(),
            Category::World | Category::WorldSync => match session {
                SessionState::Inactive | SessionState::Singleplayer => AccessDecision::allow(),
                SessionState::PublishedHost => {
                    AccessDecision::deny_with(reason::PUBLISHED_SESSION)
                }
                SessionState::LanGuest => AccessDecision::deny_with(reason::REACHABLE_SESSION),
                SessionState::Remote if *elevated && *trusted_peer => AccessDecision::allow(),
                SessionState::Remote => AccessDecision::deny_with(reason::UNTRUSTED_PEER),
            },
        },
        RuntimeContext::Authority {
            elevated,
            trusted_peer,
        } => match category {
            Category::Client | Category::Universal => AccessDecision::deny(),
            Category::World | Category::WorldSync if *elevated && *trusted_peer => {
                AccessDecision::allow()
            }
            Category::World | Category::WorldSync => AccessDecision::deny(),
        },
    }
}
