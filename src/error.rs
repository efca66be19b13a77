//! Error types for interplan.
//!
//! Only fatal conditions are errors. An action whose precondition fails,
//! or a method that is not applicable in the current state, returns
//! `None` instead; the planner recovers from those locally by trying the
//! next alternative.

use thiserror::Error;

/// Result type alias for interplan operations
pub type Result<T> = std::result::Result<T, PlanningError>;

/// Fatal error conditions raised by the registry, the planner, and the actor
#[derive(Error, Debug, Clone, PartialEq)]
pub enum PlanningError {
    /// A planner was built without a domain
    #[error("cannot build a planner until a domain has been supplied")]
    MissingDomain,

    /// A name was registered in two incompatible registry tables
    #[error("'{name}' is already registered as {existing}; cannot also register it as {attempted}")]
    ConflictingName {
        name: String,
        existing: &'static str,
        attempted: &'static str,
    },

    /// An attempt to register something under a reserved internal name
    #[error("'{name}' is reserved for the planner's internal verification tasks")]
    ReservedName { name: String },

    /// A todo-list head item could not be dispatched
    #[error("depth {depth}: {item} isn't an action, task, unigoal, or multigoal")]
    MalformedItem { item: String, depth: usize },

    /// A method's refinement did not achieve the goal it was used for
    #[error("depth {depth}: method '{method}' didn't achieve {goal}")]
    MethodVerificationFailed {
        method: String,
        goal: String,
        depth: usize,
    },

    /// The actor's inner call to the planner returned no plan
    #[error("planning failed: {reason}")]
    PlanningFailed { reason: String },

    /// Verbose level outside 0..=3
    #[error("verbose level must be between 0 and 3, got {level}")]
    InvalidVerboseLevel { level: i32 },
}

impl PlanningError {
    /// Create a new ConflictingName error
    pub fn conflicting_name(
        name: impl Into<String>,
        existing: &'static str,
        attempted: &'static str,
    ) -> Self {
        Self::ConflictingName {
            name: name.into(),
            existing,
            attempted,
        }
    }

    /// Create a new ReservedName error
    pub fn reserved_name(name: impl Into<String>) -> Self {
        Self::ReservedName { name: name.into() }
    }

    /// Create a new MalformedItem error
    pub fn malformed_item(item: impl Into<String>, depth: usize) -> Self {
        Self::MalformedItem {
            item: item.into(),
            depth,
        }
    }

    /// Create a new MethodVerificationFailed error
    pub fn verification_failed(
        method: impl Into<String>,
        goal: impl Into<String>,
        depth: usize,
    ) -> Self {
        Self::MethodVerificationFailed {
            method: method.into(),
            goal: goal.into(),
            depth,
        }
    }

    /// Create a new PlanningFailed error
    pub fn planning_failed(reason: impl Into<String>) -> Self {
        Self::PlanningFailed {
            reason: reason.into(),
        }
    }
}
