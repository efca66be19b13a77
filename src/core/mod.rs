//! Core data model: states, goals, todo items, and the domain registry.

pub mod domain;
pub mod multigoal;
pub mod state;

pub use domain::{ActionFn, Domain, MultigoalMethod, TaskMethod, UnigoalMethod};
pub use multigoal::Multigoal;
pub use state::State;

use serde::{Deserialize, Serialize};

/// Values held by state variables and passed as item arguments.
///
/// Domains choose their own argument and value types; anything JSON can
/// represent is accepted (strings, integers, floats, booleans, arrays).
pub type StateValue = serde_json::Value;

/// One entry of a todo list.
///
/// The planner dispatches on the variant: actions are applied, tasks and
/// goals are refined by the methods registered for them. Plans are todo
/// lists that contain only `Action` items.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum TodoItem {
    /// A primitive action: name plus arguments
    Action(String, Vec<StateValue>),
    /// A compound task: name plus arguments
    Task(String, Vec<StateValue>),
    /// A single desired assignment: (variable, argument, desired value)
    Unigoal(String, String, StateValue),
    /// A conjunction of desired assignments
    Multigoal(Multigoal),
}

impl TodoItem {
    /// Create an action item
    pub fn action(name: impl Into<String>, args: Vec<StateValue>) -> Self {
        Self::Action(name.into(), args)
    }

    /// Create a task item
    pub fn task(name: impl Into<String>, args: Vec<StateValue>) -> Self {
        Self::Task(name.into(), args)
    }

    /// Create a unigoal item
    pub fn unigoal(
        var_name: impl Into<String>,
        arg: impl Into<String>,
        desired: StateValue,
    ) -> Self {
        Self::Unigoal(var_name.into(), arg.into(), desired)
    }

    /// Create a multigoal item
    pub fn multigoal(mgoal: Multigoal) -> Self {
        Self::Multigoal(mgoal)
    }

    /// The dispatch name of this item (the multigoal's own name for multigoals)
    pub fn name(&self) -> &str {
        match self {
            Self::Action(name, _) | Self::Task(name, _) | Self::Unigoal(name, _, _) => name,
            Self::Multigoal(mgoal) => &mgoal.name,
        }
    }

    /// True if this item is an action
    pub fn is_action(&self) -> bool {
        matches!(self, Self::Action(_, _))
    }

    /// True if this item is a task
    pub fn is_task(&self) -> bool {
        matches!(self, Self::Task(_, _))
    }

    /// True if this item is a unigoal
    pub fn is_unigoal(&self) -> bool {
        matches!(self, Self::Unigoal(_, _, _))
    }

    /// True if this item is a multigoal
    pub fn is_multigoal(&self) -> bool {
        matches!(self, Self::Multigoal(_))
    }
}

impl std::fmt::Display for TodoItem {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Action(name, args) | Self::Task(name, args) => {
                write!(f, "({name}")?;
                for arg in args {
                    write!(f, " {}", value_to_string(arg))?;
                }
                write!(f, ")")
            }
            Self::Unigoal(var_name, arg, desired) => {
                write!(f, "({var_name} {arg} {})", value_to_string(desired))
            }
            Self::Multigoal(mgoal) => write!(f, "{mgoal}"),
        }
    }
}

/// An ordered sequence of items for the planner to accomplish
pub type TodoList = Vec<TodoItem>;

/// A totally-ordered sequence of actions produced by the planner
pub type Plan = Vec<TodoItem>;

/// Render a value without quoting strings, for trace output
pub fn value_to_string(value: &StateValue) -> String {
    match value {
        StateValue::String(s) => s.clone(),
        StateValue::Array(items) => {
            let rendered: Vec<String> = items.iter().map(value_to_string).collect();
            format!("[{}]", rendered.join(", "))
        }
        other => other.to_string(),
    }
}

/// Render a todo list in the `[(name arg ...), ...]` trace format
pub fn todo_list_to_string(todo_list: &[TodoItem]) -> String {
    let items: Vec<String> = todo_list.iter().map(|item| item.to_string()).collect();
    format!("[{}]", items.join(", "))
}

/// Shorthand for a string-valued `StateValue`
pub fn string_value(s: impl Into<String>) -> StateValue {
    StateValue::String(s.into())
}

/// Shorthand for an integer-valued `StateValue`
pub fn int_value(i: i64) -> StateValue {
    StateValue::from(i)
}

/// Shorthand for a float-valued `StateValue`
pub fn float_value(f: f64) -> StateValue {
    serde_json::Number::from_f64(f)
        .map(StateValue::Number)
        .unwrap_or(StateValue::Null)
}

/// Shorthand for a boolean-valued `StateValue`
pub fn bool_value(b: bool) -> StateValue {
    StateValue::Bool(b)
}

/// Numeric view of a value, treating integers and floats uniformly
pub fn value_as_f64(value: &StateValue) -> Option<f64> {
    value.as_f64()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn todo_item_constructors_and_kinds() {
        let task = TodoItem::task("travel", vec!["alice".into(), "park".into()]);
        assert!(task.is_task());
        assert_eq!(task.name(), "travel");

        let action = TodoItem::action("walk", vec!["alice".into()]);
        assert!(action.is_action());

        let goal = TodoItem::unigoal("loc", "alice", "park".into());
        assert!(goal.is_unigoal());
        assert_eq!(goal.name(), "loc");

        let mgoal = TodoItem::multigoal(Multigoal::new("goal1"));
        assert!(mgoal.is_multigoal());
        assert_eq!(mgoal.name(), "goal1");
    }

    #[test]
    fn display_uses_tuple_notation() {
        let task = TodoItem::task("travel", vec!["alice".into(), "park".into()]);
        assert_eq!(task.to_string(), "(travel alice park)");

        let goal = TodoItem::unigoal("loc", "alice", "park".into());
        assert_eq!(goal.to_string(), "(loc alice park)");

        let list = vec![task, goal];
        assert_eq!(
            todo_list_to_string(&list),
            "[(travel alice park), (loc alice park)]"
        );
    }

    #[test]
    fn value_helpers() {
        assert_eq!(string_value("x"), StateValue::String("x".into()));
        assert_eq!(int_value(3), StateValue::from(3));
        assert_eq!(bool_value(true), StateValue::Bool(true));
        assert_eq!(value_as_f64(&int_value(3)), Some(3.0));
        assert_eq!(value_as_f64(&float_value(1.5)), Some(1.5));
        assert_eq!(value_as_f64(&string_value("x")), None);
    }
}
