//! Explicit runtime facts consulted by the edit policy.
//!
//! Nothing here reads ambient global state. Hosts build a `RuntimeContext`
//! from whatever session machinery they run and pass it down; tests build
//! one per scenario.

/// Which half of the application is executing.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Side {
    /// The interactive side a person edits from.
    Presentation,
    /// The side owning the canonical copy of world-scoped configuration.
    Authority,
}

/// Shape of the session the presentation side currently participates in.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionState {
    /// Pre-session menu; no world data is bound.
    Inactive,
    /// Self-hosted session not reachable from outside this machine.
    Singleplayer,
    /// Self-hosted session published to the local network.
    PublishedHost,
    /// Session hosted by another machine on the local network.
    LanGuest,
    /// Session hosted by a remote authority.
    Remote,
}

/// Facts about the executing side, the session, and the actor's trust.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RuntimeContext {
    Presentation {
        session: SessionState,
        /// Actor holds operator-equivalent permission in the session.
        elevated: bool,
        /// Remote authority confirmed to run compatible sync support and
        /// granted this actor trusted status.
        trusted_peer: bool,
    },
    Authority {
        elevated: bool,
        trusted_peer: bool,
    },
}

impl RuntimeContext {
    /// Presentation side sitting in the pre-session menu.
    pub fn menu() -> Self {
        Self::presentation(SessionState::Inactive)
    }

    /// Presentation side running its own private session.
    pub fn singleplayer() -> Self {
        Self::presentation(SessionState::Singleplayer)
    }

    /// Presentation side hosting a session published to the local network.
    pub fn published_host() -> Self {
        Self::presentation(SessionState::PublishedHost)
    }

    /// Presentation side joined to someone else's local-network session.
    pub fn lan_guest() -> Self {
        Self::presentation(SessionState::LanGuest)
    }

    /// Presentation side connected to a remote authority.
    pub fn remote() -> Self {
        Self::presentation(SessionState::Remote)
    }

    /// Authority side; trust flags describe the acting peer.
    pub fn authority() -> Self {
        RuntimeContext::Authority {
            elevated: false,
            trusted_peer: false,
        }
    }

    fn presentation(session: SessionState) -> Self {
        RuntimeContext::Presentation {
            session,
            elevated: false,
            trusted_peer: false,
        }
    }

    pub fn with_elevated(mut self, value: bool) -> Self {
        match &mut self {
            RuntimeContext::Presentation { elevated, .. }
            | RuntimeContext::Authority { elevated, .. } => *elevated = value,
        }
        self
    }

    pub fn with_trusted_peer(mut self, value: bool) -> Self {
        match &mut self {
            RuntimeContext::Presentation { trusted_peer, .. }
            | RuntimeContext::Authority { trusted_peer, .. } => *trusted_peer = value,
        }
        self
    }

    pub fn side(&self) -> Side {
        match self {
            RuntimeContext::Presentation { .. } => Side::Presentation,
            RuntimeContext::Authority { .. } => Side::Authority,
        }
    }

    pub fn elevated(&self) -> bool {
        match self {
            RuntimeContext::Presentation { elevated, .. }
            | RuntimeContext::Authority { elevated, .. } => *elevated,
        }
    }

    pub fn trusted_peer(&self) -> bool {
        match self {
            RuntimeContext::Presentation { trusted_peer, .. }
            | RuntimeContext::Authority { trusted_peer, .. } => *trusted_peer,
        }
    }

    /// Whether world-scoped backing data can currently be bound.
    ///
    /// The authority only exists while its session runs, so the authority
    /// side always reports an active session.
    pub fn session_active(&self) -> bool {
        match self {
            RuntimeContext::Presentation { session, .. } => {
                *session != SessionState::Inactive
            }
            RuntimeContext::Authority { .. } => true,
        }
    }

    /// Whether the executing side owns the canonical copy of world-scoped
    /// configuration for the current session.
    pub fn is_session_authority(&self) -> bool {
        match self {
            RuntimeContext::Presentation { session, .. } => matches!(
                session,
                SessionState::Singleplayer | SessionState::PublishedHost
            ),
            RuntimeContext::Authority { .. } => true,
        }
    }
}
