//! Edit-permission policy for configuration categories.
//!
//! This crate provides:
//! - `Category`: the applicability scope of one configuration file
//! - `RuntimeContext`: explicit facts about the executing side and session
//! - `can_edit`: the pure decision function gating every edit surface
//!
//! The decision function has no side effects and reads nothing but its
//! arguments, so callers can evaluate it speculatively (e.g. to grey out
//! an editing surface) without touching any store.

pub mod category;
pub mod context;
pub mod edit;

pub use {
    category::{Category, CategoryParseError},
    context::{RuntimeContext, SessionState, Side},
    edit::{AccessDecision, can_edit, reason},
};
