//! A micro-domain built to make the planner backtrack through several
//! methods and tasks.
//!
//! The state is a single flag. `putv` writes it, `getv` succeeds only
//! when it reads the expected value, and the task methods disagree
//! about which value to write, so most refinement orders dead-end and
//! force the search back to an earlier choice point.

use crate::core::{Domain, State, StateValue, TaskMethod, TodoItem};
use crate::error::Result;

fn putv(mut state: State, args: &[StateValue]) -> Option<State> {
    state.set_var("flag", "value", args.first()?.clone());
    Some(state)
}

fn getv(state: State, args: &[StateValue]) -> Option<State> {
    state
        .satisfies("flag", "value", args.first()?)
        .then_some(state)
}

fn putv_getv(put: i64, get: i64) -> Vec<TodoItem> {
    vec![
        TodoItem::action("putv", vec![put.into()]),
        TodoItem::action("getv", vec![get.into()]),
    ]
}

/// The backtracking domain: a `put_it` task with three methods (the
/// first of which can never be completed), and four `need*` probe
/// tasks.
pub fn backtracking_domain() -> Result<Domain> {
    let mut domain = Domain::new("backtracking");

    domain.declare_action("putv", putv)?;
    domain.declare_action("getv", getv)?;

    domain.declare_task_methods(
        "put_it",
        [
            TaskMethod::new("m_err", |_: &State, _: &[StateValue]| Some(putv_getv(0, 1))),
            TaskMethod::new("m0", |_: &State, _: &[StateValue]| Some(putv_getv(0, 0))),
            TaskMethod::new("m1", |_: &State, _: &[StateValue]| Some(putv_getv(1, 1))),
        ],
    )?;

    let m_need0 = TaskMethod::new("m_need0", |_: &State, _: &[StateValue]| {
        Some(vec![TodoItem::action("getv", vec![0.into()])])
    });
    let m_need1 = TaskMethod::new("m_need1", |_: &State, _: &[StateValue]| {
        Some(vec![TodoItem::action("getv", vec![1.into()])])
    });

    domain.declare_task_method("need0", m_need0.clone())?;
    domain.declare_task_method("need1", m_need1.clone())?;
    domain.declare_task_methods("need01", [m_need0.clone(), m_need1.clone()])?;
    domain.declare_task_methods("need10", [m_need1, m_need0])?;

    Ok(domain)
}

/// Initial state: the flag holds neither 0 nor 1
pub fn initial_state() -> State {
    let mut state = State::new("state0");
    state.set_var("flag", "value", (-1).into());
    state
}
