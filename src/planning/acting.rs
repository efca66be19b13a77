//! The plan/execute/monitor loop.
//!
//! `run_lazy_lookahead` is an adaptation of the Lazy Lookahead
//! algorithm from Ghallab, Nau and Traverso (2016), *Automated Planning
//! and Acting*. It trusts each plan until reality contradicts it:
//!
//! ```text
//! loop:
//!     plan = find_plan(state, todo_list)
//!     if plan = [] then return state
//!     for each action in plan:
//!         execute the corresponding command
//!         if the command fails, break and replan from the current state
//! ```
//!
//! Commands represent real-world execution and may diverge from the
//! action models used in planning. An action with no registered
//! `c_<name>` command is executed through its action function instead.

use crate::core::{todo_list_to_string, Plan, State, TodoItem};
use crate::error::{PlanningError, Result};
use crate::planning::Planner;

/// Bound on the outer plan/execute loop
pub const DEFAULT_MAX_TRIES: usize = 10;

impl Planner {
    /// Plan for `todo_list` and execute the plan's commands, replanning
    /// on command failure, up to [`DEFAULT_MAX_TRIES`] rounds.
    pub fn run_lazy_lookahead(&self, state: State, todo_list: Vec<TodoItem>) -> Result<State> {
        self.run_lazy_lookahead_bounded(state, todo_list, DEFAULT_MAX_TRIES)
    }

    /// As [`run_lazy_lookahead`](Self::run_lazy_lookahead), with an
    /// explicit bound on the number of planning rounds. When the bound
    /// is exhausted the current state is returned as-is.
    pub fn run_lazy_lookahead_bounded(
        &self,
        mut state: State,
        todo_list: Vec<TodoItem>,
        max_tries: usize,
    ) -> Result<State> {
        if self.is_verbose(1) {
            println!(
                "RLL> run_lazy_lookahead, verbose = {}, max_tries = {}",
                self.verbose_level, max_tries
            );
            println!("RLL> initial state: {}", state.name);
            println!("RLL> To do: {}", todo_list_to_string(&todo_list));
        }

        for tries in 1..=max_tries {
            if self.is_verbose(1) {
                let ordinal = match tries {
                    1 => "st",
                    2 => "nd",
                    3 => "rd",
                    _ => "th",
                };
                println!("RLL> {tries}{ordinal} call to find_plan:\n");
            }

            let plan = self
                .find_plan(state.clone(), todo_list.clone())?
                .ok_or_else(|| {
                    PlanningError::planning_failed("run_lazy_lookahead: find_plan has failed")
                })?;

            if plan.is_empty() {
                if self.is_verbose(1) {
                    println!("RLL> Empty plan => success after {tries} calls to find_plan.");
                }
                if self.is_verbose(2) {
                    state.display(Some("RLL> final state"));
                }
                return Ok(state);
            }

            match self.execute_plan(state, &plan)? {
                (new_state, true) => {
                    state = new_state;
                    if self.is_verbose(1) {
                        println!("RLL> Plan ended; will call find_plan again.");
                    }
                }
                (new_state, false) => {
                    state = new_state;
                }
            }
        }

        if self.is_verbose(1) {
            println!("RLL> Too many tries, giving up.");
        }
        if self.is_verbose(2) {
            state.display(Some("RLL> final state"));
        }
        Ok(state)
    }

    /// Execute the plan's actions through their commands. Returns the
    /// reached state and whether the whole plan was carried out.
    fn execute_plan(&self, mut state: State, plan: &Plan) -> Result<(State, bool)> {
        for item in plan {
            let TodoItem::Action(name, args) = item else {
                continue;
            };
            let command_name = format!("c_{name}");

            let command = match self.domain.get_command(&command_name) {
                Some(command) => command,
                None => {
                    let Some(action) = self.domain.get_action(name) else {
                        if self.is_verbose(1) {
                            println!("RLL> WARNING: no command or action {name}; will call find_plan.");
                        }
                        return Ok((state, false));
                    };
                    if self.is_verbose(1) {
                        println!("RLL> {command_name} not defined, using {name} instead\n");
                    }
                    action
                }
            };

            if self.is_verbose(1) {
                println!(
                    "RLL> Command: {}",
                    TodoItem::action(command_name.clone(), args.clone())
                );
            }

            match command(state.copy(None), args) {
                Some(new_state) => {
                    if self.is_verbose(2) {
                        new_state.display(None);
                    }
                    state = new_state;
                }
                None => {
                    if self.is_verbose(1) {
                        println!("RLL> WARNING: command {command_name} failed; will call find_plan.");
                    }
                    return Ok((state, false));
                }
            }
        }
        Ok((state, true))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::{string_value, Domain, StateValue, TaskMethod};
    use crate::planning::PlannerBuilder;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;

    /// A domain whose single task moves an object, with a command that
    /// can be made to fail a fixed number of times.
    fn transport_domain(command_failures: usize) -> Domain {
        let mut domain = Domain::new("transport");

        domain
            .declare_action("haul", |mut state: State, args: &[StateValue]| {
                let obj = args[0].as_str()?;
                let target = args[1].as_str()?;
                state.set_var("loc", obj, string_value(target));
                Some(state)
            })
            .unwrap();

        let failures = Arc::new(AtomicUsize::new(command_failures));
        domain
            .declare_command("c_haul", move |mut state: State, args: &[StateValue]| {
                if failures
                    .fetch_update(Ordering::SeqCst, Ordering::SeqCst, |n| n.checked_sub(1))
                    .is_ok()
                {
                    return None;
                }
                let obj = args[0].as_str()?;
                let target = args[1].as_str()?;
                state.set_var("loc", obj, string_value(target));
                Some(state)
            })
            .unwrap();

        domain
            .declare_task_method(
                "deliver",
                TaskMethod::new("m_deliver", |state: &State, args: &[StateValue]| {
                    let obj = args[0].as_str()?;
                    let target = args[1].as_str()?;
                    if state.satisfies("loc", obj, &string_value(target)) {
                        Some(vec![])
                    } else {
                        Some(vec![TodoItem::action("haul", vec![args[0].clone(), args[1].clone()])])
                    }
                }),
            )
            .unwrap();

        domain
    }

    fn initial_state() -> State {
        let mut state = State::new("s0");
        state.set_var("loc", "crate1", "dock".into());
        state
    }

    fn deliver_todo() -> Vec<TodoItem> {
        vec![TodoItem::task(
            "deliver",
            vec!["crate1".into(), "depot".into()],
        )]
    }

    #[test]
    fn converges_in_one_replan_cycle_with_reliable_commands() {
        let planner = PlannerBuilder::new()
            .with_domain(transport_domain(0))
            .build()
            .unwrap();

        let final_state = planner
            .run_lazy_lookahead(initial_state(), deliver_todo())
            .unwrap();
        assert_eq!(final_state.get_var("loc", "crate1"), Some(&"depot".into()));

        // a fresh plan for the same todo list is now empty
        let plan = planner.find_plan(final_state, deliver_todo()).unwrap();
        assert_eq!(plan, Some(vec![]));
    }

    #[test]
    fn replans_after_a_transient_command_failure() {
        let planner = PlannerBuilder::new()
            .with_domain(transport_domain(2))
            .build()
            .unwrap();

        let final_state = planner
            .run_lazy_lookahead(initial_state(), deliver_todo())
            .unwrap();
        assert_eq!(final_state.get_var("loc", "crate1"), Some(&"depot".into()));
    }

    #[test]
    fn gives_up_after_max_tries() {
        // the command never succeeds, so the bound is what stops us
        let planner = PlannerBuilder::new()
            .with_domain(transport_domain(usize::MAX))
            .build()
            .unwrap();

        let final_state = planner
            .run_lazy_lookahead_bounded(initial_state(), deliver_todo(), 3)
            .unwrap();
        assert_eq!(final_state.get_var("loc", "crate1"), Some(&"dock".into()));
    }

    #[test]
    fn missing_command_falls_back_to_the_action() {
        // same domain shape, but with no command table entry at all
        let mut domain = Domain::new("transport_no_commands");
        domain
            .declare_action("haul", |mut state: State, args: &[StateValue]| {
                let obj = args[0].as_str()?;
                let target = args[1].as_str()?;
                state.set_var("loc", obj, string_value(target));
                Some(state)
            })
            .unwrap();
        domain
            .declare_task_method(
                "deliver",
                TaskMethod::new("m_deliver", |state: &State, args: &[StateValue]| {
                    let obj = args[0].as_str()?;
                    let target = args[1].as_str()?;
                    if state.satisfies("loc", obj, &string_value(target)) {
                        Some(vec![])
                    } else {
                        Some(vec![TodoItem::action("haul", vec![args[0].clone(), args[1].clone()])])
                    }
                }),
            )
            .unwrap();

        let planner = PlannerBuilder::new().with_domain(domain).build().unwrap();
        let final_state = planner
            .run_lazy_lookahead(initial_state(), deliver_todo())
            .unwrap();
        assert_eq!(final_state.get_var("loc", "crate1"), Some(&"depot".into()));
    }

    #[test]
    fn unplannable_todo_list_is_an_error() {
        let mut domain = Domain::new("stuck");
        domain
            .declare_task_method(
                "impossible",
                TaskMethod::new("m_never", |_: &State, _: &[StateValue]| None),
            )
            .unwrap();

        let planner = PlannerBuilder::new().with_domain(domain).build().unwrap();
        let err = planner
            .run_lazy_lookahead(State::new("s0"), vec![TodoItem::task("impossible", vec![])])
            .unwrap_err();
        assert!(matches!(err, PlanningError::PlanningFailed { .. }));
    }
}
