//! State representation.
//!
//! A state is a named collection of state variables, each mapping an
//! argument to a value. Both levels keep insertion order: the multigoal
//! splitter and the trace output iterate over them, and plans must come
//! out the same on every run.

use super::StateValue;
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

/// A state of the world: `vars[variable][argument] = value`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct State {
    /// Name of the state, used in trace output
    pub name: String,
    vars: IndexMap<String, IndexMap<String, StateValue>>,
    copy_counter: usize,
}

impl State {
    /// Create an empty state with the given name
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            vars: IndexMap::new(),
            copy_counter: 0,
        }
    }

    /// Set `variable[arg] = value`, creating the variable if needed
    pub fn set_var(
        &mut self,
        var_name: impl Into<String>,
        arg: impl Into<String>,
        value: StateValue,
    ) {
        self.vars
            .entry(var_name.into())
            .or_default()
            .insert(arg.into(), value);
    }

    /// Look up `variable[arg]`
    pub fn get_var(&self, var_name: &str, arg: &str) -> Option<&StateValue> {
        self.vars.get(var_name).and_then(|args| args.get(arg))
    }

    /// True if the state has a variable with this name
    pub fn has_var(&self, var_name: &str) -> bool {
        self.vars.contains_key(var_name)
    }

    /// True if `variable[arg]` is recorded
    pub fn has_var_arg(&self, var_name: &str, arg: &str) -> bool {
        self.vars
            .get(var_name)
            .is_some_and(|args| args.contains_key(arg))
    }

    /// All variable names, in insertion order
    pub fn var_names(&self) -> impl Iterator<Item = &String> {
        self.vars.keys()
    }

    /// All arguments of a variable, in insertion order
    pub fn var_args(&self, var_name: &str) -> Option<impl Iterator<Item = &String>> {
        self.vars.get(var_name).map(|args| args.keys())
    }

    /// The full argument map of a variable
    pub fn var_map(&self, var_name: &str) -> Option<&IndexMap<String, StateValue>> {
        self.vars.get(var_name)
    }

    /// True iff `variable[arg]` equals the desired value
    pub fn satisfies(&self, var_name: &str, arg: &str, desired: &StateValue) -> bool {
        self.get_var(var_name, arg) == Some(desired)
    }

    /// Deep copy of the state. With no name given, the copy is named
    /// `<old>_copy_<n>` with a per-state counter.
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

    /// Print the state's variables and their values
    pub fn display(&self, heading: Option<&str>) {
        let title = format!("{} {}:", heading.unwrap_or("State"), self.name);
        println!("{title}");
        println!("{}", "-".repeat(title.len()));

        if self.vars.is_empty() {
            println!("  (no state variables)");
        } else {
            for (var_name, args) in &self.vars {
                println!("  - {var_name} = {{");
                for (arg, value) in args {
                    println!("      '{arg}': {value},");
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

impl std::fmt::Display for State {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "<State {}>", self.name)
    }
}
