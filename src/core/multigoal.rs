//! Multigoal representation.
//!
//! A multigoal has the same shape as a [`State`](super::State) but its
//! entries are desired assignments rather than actual ones. A pair that
//! is absent is a don't-care.

use super::{State, StateValue};
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

/// A conjunctive goal: `vars[variable][argument] = desired value`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Multigoal {
    /// Name of the multigoal, used in trace output
    pub name: String,
    vars: IndexMap<String, IndexMap<String, StateValue>>,
    copy_counter: usize,
}

impl Multigoal {
    /// Create an empty multigoal with the given name
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            vars: IndexMap::new(),
            copy_counter: 0,
        }
    }

    /// Record the desired value of `variable[arg]`
    pub fn set_goal(
        &mut self,
        var_name: impl Into<String>,
        arg: impl Into<String>,
        desired: StateValue,
    ) {
        self.vars
            .entry(var_name.into())
            .or_default()
            .insert(arg.into(), desired);
    }

    /// Look up the desired value of `variable[arg]`
    pub fn get_goal(&self, var_name: &str, arg: &str) -> Option<&StateValue> {
        self.vars.get(var_name).and_then(|args| args.get(arg))
    }

    /// True if the multigoal records any goal for this variable
    pub fn has_goal_var(&self, var_name: &str) -> bool {
        self.vars.contains_key(var_name)
    }

    /// All goal variable names, in insertion order
    pub fn goal_var_names(&self) -> impl Iterator<Item = &String> {
        self.vars.keys()
    }

    /// The full argument map of a goal variable
    pub fn goal_map(&self, var_name: &str) -> Option<&IndexMap<String, StateValue>> {
        self.vars.get(var_name)
    }

    /// Number of recorded (variable, argument) goals
    pub fn goal_count(&self) -> usize {
        self.vars.values().map(IndexMap::len).sum()
    }

    /// True if no goals are recorded
    pub fn is_empty(&self) -> bool {
        self.vars.values().all(IndexMap::is_empty)
    }

    /// True iff every recorded goal holds in `state`
    pub fn is_satisfied_by(&self, state: &State) -> bool {
        self.vars.iter().all(|(var_name, args)| {
            args.iter()
                .all(|(arg, desired)| state.satisfies(var_name, arg, desired))
        })
    }

    /// The goals that do not hold in `state`, as `(variable, argument,
    /// desired)` triples in the multigoal's insertion order.
    pub fn unachieved_goals(&self, state: &State) -> Vec<(String, String, StateValue)> {
        let mut unachieved = Vec::new();
        for (var_name, args) in &self.vars {
            for (arg, desired) in args {
                if !state.satisfies(var_name, arg, desired) {
                    unachieved.push((var_name.clone(), arg.clone(), desired.clone()));
                }
            }
        }
        unachieved
    }

    /// Deep copy; same naming scheme as [`State::copy`](super::State::copy)
    pub fn copy(&self, new_name: Option<String>) -> Self {
        let mut copied = self.clone();
        match new_name {
            Some(name) => copied.name = name,
            None => {
                copied.name = format!("{}_copy_{}", self.name, self.copy_counter);
                copied.copy_counter += 1;
            }
        }
        copied
    }

    /// Print the multigoal's variables and desired values
    pub fn display(&self, heading: Option<&str>) {
        let title = format!("{} {}:", heading.unwrap_or("Multigoal"), self.name);
        println!("{title}");
        println!("{}", "-".repeat(title.len()));

        if self.vars.is_empty() {
            println!("  (no goal variables)");
        } else {
            for (var_name, args) in &self.vars {
                println!("  - {var_name} = {{");
                for (arg, desired) in args {
                    println!("      '{arg}': {desired},");
                }
                println!("    }}");
            }
        }
        println!();
    }

    /// Serialize to pretty-printed JSON
    pub fn to_json(&self) -> serde_json::Result<String> {
        serde_json::to_string_pretty(self)
    }

    /// Deserialize from JSON
    pub fn from_json(json: &str) -> serde_json::Result<Self> {
        serde_json::from_str(json)
    }
}

impl std::fmt::Display for Multigoal {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "<Multigoal {}>", self.name)
    }
}
