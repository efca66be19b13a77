//! The planner and its configuration.
//!
//! A [`Planner`] is an immutable bundle of a domain, a search strategy,
//! a verbosity level, and the goal-verification switch. Instances are
//! cheap to clone and safe to share across threads; there is no global
//! planning state.

pub mod acting;
pub mod goals;
pub mod seek;

pub use goals::{split_multigoal, split_multigoal_method};

use crate::core::Domain;
use crate::error::{PlanningError, Result};
use std::sync::Arc;

/// How `seek_plan` traverses the refinement tree
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum PlanningStrategy {
    /// Chronological backtracking on the call stack
    #[default]
    Recursive,
    /// The same search on an explicit frame stack, for problems whose
    /// refinement depth would exhaust the call stack
    Iterative,
}

/// Fluent configuration for [`Planner`] instances
#[derive(Debug, Clone)]
pub struct PlannerBuilder {
    domain: Option<Domain>,
    verbose_level: i32,
    strategy: PlanningStrategy,
    verify_goals: bool,
}

impl Default for PlannerBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl PlannerBuilder {
    /// Start a builder with verbosity 0, the recursive strategy, and
    /// goal verification on
    pub fn new() -> Self {
        Self {
            domain: None,
            verbose_level: 0,
            strategy: PlanningStrategy::Recursive,
            verify_goals: true,
        }
    }

    /// Set the domain to plan in
    pub fn with_domain(mut self, domain: Domain) -> Self {
        self.domain = Some(domain);
        self
    }

    /// Set the verbosity level:
    /// - 0: print nothing
    /// - 1: print the initial parameters and the answer
    /// - 2: also print a message on each refinement step
    /// - 3: also print some info about intermediate computations
    pub fn with_verbose_level(mut self, level: i32) -> Result<Self> {
        if !(0..=3).contains(&level) {
            return Err(PlanningError::InvalidVerboseLevel { level });
        }
        self.verbose_level = level;
        Ok(self)
    }

    /// Set the search strategy
    pub fn with_strategy(mut self, strategy: PlanningStrategy) -> Self {
        self.strategy = strategy;
        self
    }

    /// Enable or disable the automatic `_verify_g` / `_verify_mg`
    /// checks after goal-method refinements
    pub fn with_goal_verification(mut self, verify: bool) -> Self {
        self.verify_goals = verify;
        self
    }

    /// Build the planner
    pub fn build(self) -> Result<Planner> {
        let domain = self.domain.ok_or(PlanningError::MissingDomain)?;
        Ok(Planner {
            domain: Arc::new(domain),
            verbose_level: self.verbose_level,
            strategy: self.strategy,
            verify_goals: self.verify_goals,
        })
    }
}

/// An immutable planner instance
#[derive(Debug, Clone)]
pub struct Planner {
    pub(crate) domain: Arc<Domain>,
    pub(crate) verbose_level: i32,
    pub(crate) strategy: PlanningStrategy,
    pub(crate) verify_goals: bool,
}

impl Planner {
    /// Create a planner for `domain` with default settings
    pub fn new(domain: Domain) -> Self {
        Self {
            domain: Arc::new(domain),
            verbose_level: 0,
            strategy: PlanningStrategy::Recursive,
            verify_goals: true,
        }
    }

    /// The domain this planner searches in
    pub fn domain(&self) -> &Arc<Domain> {
        &self.domain
    }

    /// The configured verbosity level
    pub fn verbose_level(&self) -> i32 {
        self.verbose_level
    }

    /// The configured search strategy
    pub fn strategy(&self) -> PlanningStrategy {
        self.strategy
    }

    /// Whether goal verification is on
    pub fn verify_goals(&self) -> bool {
        self.verify_goals
    }

    /// True if trace output at `level` is enabled
    pub(crate) fn is_verbose(&self, level: i32) -> bool {
        self.verbose_level >= level
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn builder_requires_a_domain() {
        let err = PlannerBuilder::new().build().unwrap_err();
        assert_eq!(err, PlanningError::MissingDomain);
    }

    #[test]
    fn builder_rejects_bad_verbose_levels() {
        assert!(PlannerBuilder::new().with_verbose_level(4).is_err());
        assert!(PlannerBuilder::new().with_verbose_level(-1).is_err());
        assert!(PlannerBuilder::new().with_verbose_level(3).is_ok());
    }

    #[test]
    fn builder_defaults() {
        let planner = PlannerBuilder::new()
            .with_domain(Domain::new("d"))
            .build()
            .unwrap();
        assert_eq!(planner.verbose_level(), 0);
        assert_eq!(planner.strategy(), PlanningStrategy::Recursive);
        assert!(planner.verify_goals());
        assert!(!planner.is_verbose(1));
    }
}
