//! The built-in multigoal splitter and the goal-verification machinery.

use crate::core::domain::{VERIFY_GOAL, VERIFY_MULTIGOAL};
use crate::core::{value_to_string, Multigoal, MultigoalMethod, State, StateValue, TodoItem, TodoList};
use crate::error::{PlanningError, Result};

/// Decompose a multigoal into its unachieved unigoals.
///
/// Returns `Some([])` when the multigoal already holds. Otherwise the
/// result lists every unachieved goal in the multigoal's insertion
/// order, followed by the multigoal itself, so the planner rechecks the
/// conjunction after pursuing the parts. Deleted-condition interactions
/// can make that recheck spawn another round of the same method; the
/// loop ends when all goals hold simultaneously.
///
/// The splitter is not registered anywhere by default; declare it with
/// [`split_multigoal_method`] when a domain wants it.
pub fn split_multigoal(state: &State, mgoal: &Multigoal) -> Option<TodoList> {
    let unachieved = mgoal.unachieved_goals(state);
    if unachieved.is_empty() {
        return Some(vec![]);
    }
    let mut todo: TodoList = unachieved
        .into_iter()
        .map(|(var_name, arg, desired)| TodoItem::unigoal(var_name, arg, desired))
        .collect();
    todo.push(TodoItem::multigoal(mgoal.clone()));
    Some(todo)
}

/// [`split_multigoal`] pre-wrapped for `declare_multigoal_methods`
pub fn split_multigoal_method() -> MultigoalMethod {
    MultigoalMethod::new("split_multigoal", split_multigoal)
}

/// The `_verify_g` item inserted after a unigoal method's refinement
pub(crate) fn goal_verification(
    method_name: &str,
    var_name: &str,
    arg: &str,
    desired: &StateValue,
    depth: usize,
) -> TodoItem {
    TodoItem::task(
        VERIFY_GOAL,
        vec![
            method_name.into(),
            var_name.into(),
            arg.into(),
            desired.clone(),
            (depth as i64).into(),
        ],
    )
}

/// The `_verify_mg` item inserted after a multigoal method's refinement
pub(crate) fn multigoal_verification(
    method_name: &str,
    mgoal: &Multigoal,
    depth: usize,
) -> TodoItem {
    let serialized = serde_json::to_value(mgoal).unwrap_or(StateValue::Null);
    TodoItem::task(
        VERIFY_MULTIGOAL,
        vec![method_name.into(), serialized, (depth as i64).into()],
    )
}

/// Evaluate a `_verify_g` item against the current state. A failed
/// check means the method that promised the goal is buggy; that is
/// fatal, not a backtrack point.
pub(crate) fn check_goal_verification(state: &State, args: &[StateValue], depth: usize) -> Result<()> {
    let (method_name, var_name, arg, desired) = match (
        args.first().and_then(StateValue::as_str),
        args.get(1).and_then(StateValue::as_str),
        args.get(2).and_then(StateValue::as_str),
        args.get(3),
    ) {
        (Some(method_name), Some(var_name), Some(arg), Some(desired)) => {
            (method_name, var_name, arg, desired)
        }
        _ => {
            return Err(PlanningError::malformed_item(
                format!("({VERIFY_GOAL} ...)"),
                depth,
            ))
        }
    };

    if state.satisfies(var_name, arg, desired) {
        Ok(())
    } else {
        Err(PlanningError::verification_failed(
            method_name,
            format!("goal {var_name}[{arg}] = {}", value_to_string(desired)),
            depth,
        ))
    }
}

/// Evaluate a `_verify_mg` item against the current state
pub(crate) fn check_multigoal_verification(
    state: &State,
    args: &[StateValue],
    depth: usize,
) -> Result<()> {
    let (method_name, serialized) = match (args.first().and_then(StateValue::as_str), args.get(1)) {
        (Some(method_name), Some(serialized)) => (method_name, serialized),
        _ => {
            return Err(PlanningError::malformed_item(
                format!("({VERIFY_MULTIGOAL} ...)"),
                depth,
            ))
        }
    };
    let mgoal: Multigoal = serde_json::from_value(serialized.clone()).map_err(|_| {
        PlanningError::malformed_item(format!("({VERIFY_MULTIGOAL} ...)"), depth)
    })?;

    if mgoal.is_satisfied_by(state) {
        Ok(())
    } else {
        Err(PlanningError::verification_failed(
            method_name,
            mgoal.to_string(),
            depth,
        ))
    }
}
