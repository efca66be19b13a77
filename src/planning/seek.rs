//! `find_plan` and `seek_plan`: depth-first refinement search.
//!
//! The search inspects the head of the todo list and dispatches on its
//! kind. Actions are applied to a fresh copy of the state; tasks and
//! goals are refined by their registered methods, tried strictly in
//! registration order. Backtracking is chronological: states are never
//! mutated in place, so abandoning a branch needs no undo.
//!
//! Goal verification is woven into the search itself. Whenever a
//! unigoal or multigoal method is applied (and `verify_goals` is on), a
//! `_verify_g` / `_verify_mg` task is inserted between the method's
//! refinement and the rest of the todo list. The check therefore runs
//! exactly when the refinement has been fully processed. A failed check
//! is fatal: the method is buggy, not merely inapplicable.

use crate::core::domain::{VERIFY_GOAL, VERIFY_MULTIGOAL};
use crate::core::{
    todo_list_to_string, value_to_string, Multigoal, Plan, State, StateValue, TodoItem, TodoList,
};
use crate::error::{PlanningError, Result};
use crate::planning::{goals, Planner, PlanningStrategy};

impl Planner {
    /// Search for a plan accomplishing every item of `todo_list` from
    /// `state`.
    ///
    /// Returns `Ok(Some(plan))` on success (the plan may be empty),
    /// `Ok(None)` when the search space is exhausted, and an error for
    /// the fatal conditions: an undispatchable item, or a method whose
    /// refinement did not achieve its goal.
    pub fn find_plan(&self, state: State, todo_list: TodoList) -> Result<Option<Plan>> {
        if self.is_verbose(1) {
            println!("FP> find_plan, verbose={}:", self.verbose_level);
            println!("    state = {}", state.name);
            println!("    todo_list = {}", todo_list_to_string(&todo_list));
        }

        let result = match self.strategy {
            PlanningStrategy::Recursive => self.seek_recursive(&state, &todo_list, Vec::new(), 0),
            PlanningStrategy::Iterative => self.seek_iterative(state, todo_list),
        }?;

        if self.is_verbose(1) {
            match &result {
                Some(plan) => println!("FP> result = {}", todo_list_to_string(plan)),
                None => println!("FP> result = None"),
            }
        }
        Ok(result)
    }

    fn seek_recursive(
        &self,
        state: &State,
        todo_list: &[TodoItem],
        plan: Plan,
        depth: usize,
    ) -> Result<Option<Plan>> {
        if self.is_verbose(2) {
            println!("depth {depth} todo_list {}", todo_list_to_string(todo_list));
        }

        let Some((item, rest)) = todo_list.split_first() else {
            if self.is_verbose(3) {
                println!("depth {depth} no more tasks or goals, return plan");
            }
            return Ok(Some(plan));
        };

        match item {
            TodoItem::Multigoal(mgoal) => self.refine_multigoal(state, mgoal, rest, plan, depth),
            TodoItem::Action(name, args) => {
                if self.domain.has_action(name) {
                    self.apply_action(state, name, args, rest, plan, depth)
                } else {
                    Err(PlanningError::malformed_item(item.to_string(), depth))
                }
            }
            TodoItem::Task(name, args) => {
                // actions shadow tasks of the same name, so a tuple written
                // as a task still resolves to the action that defines it
                if self.domain.has_action(name) {
                    self.apply_action(state, name, args, rest, plan, depth)
                } else if name == VERIFY_GOAL {
                    goals::check_goal_verification(state, args, depth)?;
                    if self.is_verbose(3) {
                        println!("depth {depth} verified {}", item);
                    }
                    self.seek_recursive(state, rest, plan, depth + 1)
                } else if name == VERIFY_MULTIGOAL {
                    goals::check_multigoal_verification(state, args, depth)?;
                    if self.is_verbose(3) {
                        println!("depth {depth} verified {}", item);
                    }
                    self.seek_recursive(state, rest, plan, depth + 1)
                } else if self.domain.has_task_methods(name) {
                    self.refine_task(state, name, args, rest, plan, depth)
                } else {
                    Err(PlanningError::malformed_item(item.to_string(), depth))
                }
            }
            TodoItem::Unigoal(var_name, arg, desired) => {
                if self.domain.has_unigoal_methods(var_name) {
                    self.refine_unigoal(state, var_name, arg, desired, rest, plan, depth)
                } else {
                    Err(PlanningError::malformed_item(item.to_string(), depth))
                }
            }
        }
    }

    /// No alternatives for an action: if it is inapplicable, the whole
    /// branch fails.
    fn apply_action(
        &self,
        state: &State,
        name: &str,
        args: &[StateValue],
        rest: &[TodoItem],
        mut plan: Plan,
        depth: usize,
    ) -> Result<Option<Plan>> {
        if self.is_verbose(3) {
            println!("depth {depth} action {}: ", TodoItem::action(name, args.to_vec()));
        }
        let Some(action) = self.domain.get_action(name) else {
            return Ok(None);
        };
        match action(state.copy(None), args) {
            Some(new_state) => {
                if self.is_verbose(3) {
                    println!("applied");
                    new_state.display(None);
                }
                plan.push(TodoItem::action(name, args.to_vec()));
                self.seek_recursive(&new_state, rest, plan, depth + 1)
            }
            None => {
                if self.is_verbose(3) {
                    println!("not applicable");
                }
                Ok(None)
            }
        }
    }

    fn refine_task(
        &self,
        state: &State,
        name: &str,
        args: &[StateValue],
        rest: &[TodoItem],
        plan: Plan,
        depth: usize,
    ) -> Result<Option<Plan>> {
        let methods = self.domain.task_methods(name).unwrap_or(&[]);
        if self.is_verbose(3) {
            let names: Vec<&str> = methods.iter().map(|m| m.name()).collect();
            println!("depth {depth} task {name} methods {names:?}");
        }

        for method in methods {
            if self.is_verbose(3) {
                println!("depth {depth} trying {}: ", method.name());
            }
            let Some(subtasks) = method.refine(state, args) else {
                if self.is_verbose(3) {
                    println!("not applicable");
                }
                continue;
            };
            if self.is_verbose(3) {
                println!("applicable");
                println!("depth {depth} subtasks: {}", todo_list_to_string(&subtasks));
            }

            let mut new_todo = subtasks;
            new_todo.extend_from_slice(rest);
            if let Some(found) = self.seek_recursive(state, &new_todo, plan.clone(), depth + 1)? {
                return Ok(Some(found));
            }
        }

        if self.is_verbose(3) {
            println!("depth {depth} could not accomplish task {name}");
        }
        Ok(None)
    }

    fn refine_unigoal(
        &self,
        state: &State,
        var_name: &str,
        arg: &str,
        desired: &StateValue,
        rest: &[TodoItem],
        plan: Plan,
        depth: usize,
    ) -> Result<Option<Plan>> {
        if self.is_verbose(3) {
            println!(
                "depth {depth} goal ({var_name} {arg} {}): ",
                value_to_string(desired)
            );
        }

        // a goal that already holds needs no refinement; the splitter
        // relies on this when it re-lists goals that a sibling achieved
        if state.satisfies(var_name, arg, desired) {
            if self.is_verbose(3) {
                println!("already achieved");
            }
            return self.seek_recursive(state, rest, plan, depth + 1);
        }

        let methods = self.domain.unigoal_methods(var_name).unwrap_or(&[]);
        if self.is_verbose(3) {
            let names: Vec<&str> = methods.iter().map(|m| m.name()).collect();
            println!("methods {names:?}");
        }

        for method in methods {
            if self.is_verbose(3) {
                println!("depth {depth} trying method {}: ", method.name());
            }
            let Some(subgoals) = method.refine(state, arg, desired) else {
                if self.is_verbose(3) {
                    println!("not applicable");
                }
                continue;
            };
            if self.is_verbose(3) {
                println!("applicable");
                println!("depth {depth} subgoals: {}", todo_list_to_string(&subgoals));
            }

            let mut new_todo = subgoals;
            if self.verify_goals {
                new_todo.push(goals::goal_verification(
                    method.name(),
                    var_name,
                    arg,
                    desired,
                    depth,
                ));
            }
            new_todo.extend_from_slice(rest);
            if let Some(found) = self.seek_recursive(state, &new_todo, plan.clone(), depth + 1)? {
                return Ok(Some(found));
            }
        }

        if self.is_verbose(3) {
            println!(
                "depth {depth} could not achieve goal ({var_name} {arg} {})",
                value_to_string(desired)
            );
        }
        Ok(None)
    }

    fn refine_multigoal(
        &self,
        state: &State,
        mgoal: &Multigoal,
        rest: &[TodoItem],
        plan: Plan,
        depth: usize,
    ) -> Result<Option<Plan>> {
        if self.is_verbose(3) {
            println!("depth {depth} multigoal {mgoal}: ");
        }

        let methods = self.domain.multigoal_methods();
        if self.is_verbose(3) {
            let names: Vec<&str> = methods.iter().map(|m| m.name()).collect();
            println!("methods {names:?}");
        }

        for method in methods {
            if self.is_verbose(3) {
                println!("depth {depth} trying method {}: ", method.name());
            }
            let Some(subgoals) = method.refine(state, mgoal) else {
                if self.is_verbose(3) {
                    println!("not applicable");
                }
                continue;
            };
            if self.is_verbose(3) {
                println!("applicable");
                println!("depth {depth} subgoals: {}", todo_list_to_string(&subgoals));
            }

            let mut new_todo = subgoals;
            if self.verify_goals {
                new_todo.push(goals::multigoal_verification(method.name(), mgoal, depth));
            }
            new_todo.extend_from_slice(rest);
            if let Some(found) = self.seek_recursive(state, &new_todo, plan.clone(), depth + 1)? {
                return Ok(Some(found));
            }
        }

        if self.is_verbose(3) {
            println!("depth {depth} could not achieve multigoal {mgoal}");
        }
        Ok(None)
    }

    /// The same search on an explicit stack of frames. Alternatives for
    /// a choice point are pushed in reverse registration order, so they
    /// pop in the same order the recursive strategy tries them and the
    /// two strategies return identical plans.
    fn seek_iterative(&self, state: State, todo_list: TodoList) -> Result<Option<Plan>> {
        struct Frame {
            state: State,
            todo_list: TodoList,
            plan: Plan,
            depth: usize,
        }

        let mut stack = vec![Frame {
            state,
            todo_list,
            plan: Vec::new(),
            depth: 0,
        }];

        while let Some(frame) = stack.pop() {
            let Frame {
                state,
                todo_list,
                plan,
                depth,
            } = frame;

            if self.is_verbose(2) {
                println!("depth {depth} todo_list {}", todo_list_to_string(&todo_list));
            }

            let Some((item, rest)) = todo_list.split_first() else {
                return Ok(Some(plan));
            };

            match item {
                TodoItem::Multigoal(mgoal) => {
                    let mut alternatives = Vec::new();
                    for method in self.domain.multigoal_methods() {
                        if let Some(subgoals) = method.refine(&state, mgoal) {
                            let mut new_todo = subgoals;
                            if self.verify_goals {
                                new_todo.push(goals::multigoal_verification(
                                    method.name(),
                                    mgoal,
                                    depth,
                                ));
                            }
                            new_todo.extend_from_slice(rest);
                            alternatives.push(new_todo);
                        }
                    }
                    for new_todo in alternatives.into_iter().rev() {
                        stack.push(Frame {
                            state: state.clone(),
                            todo_list: new_todo,
                            plan: plan.clone(),
                            depth: depth + 1,
                        });
                    }
                }
                TodoItem::Action(name, args) => {
                    let Some(action) = self.domain.get_action(name).cloned() else {
                        return Err(PlanningError::malformed_item(item.to_string(), depth));
                    };
                    if let Some(new_state) = action(state.copy(None), args) {
                        let mut new_plan = plan;
                        new_plan.push(TodoItem::action(name.clone(), args.clone()));
                        stack.push(Frame {
                            state: new_state,
                            todo_list: rest.to_vec(),
                            plan: new_plan,
                            depth: depth + 1,
                        });
                    }
                }
                TodoItem::Task(name, args) => {
                    if self.domain.has_action(name) {
                        if let Some(action) = self.domain.get_action(name).cloned() {
                            if let Some(new_state) = action(state.copy(None), args) {
                                let mut new_plan = plan;
                                new_plan.push(TodoItem::action(name.clone(), args.clone()));
                                stack.push(Frame {
                                    state: new_state,
                                    todo_list: rest.to_vec(),
                                    plan: new_plan,
                                    depth: depth + 1,
                                });
                            }
                        }
                    } else if name == VERIFY_GOAL {
                        goals::check_goal_verification(&state, args, depth)?;
                        stack.push(Frame {
                            state,
                            todo_list: rest.to_vec(),
                            plan,
                            depth: depth + 1,
                        });
                    } else if name == VERIFY_MULTIGOAL {
                        goals::check_multigoal_verification(&state, args, depth)?;
                        stack.push(Frame {
                            state,
                            todo_list: rest.to_vec(),
                            plan,
                            depth: depth + 1,
                        });
                    } else if let Some(methods) = self.domain.task_methods(name) {
                        let mut alternatives = Vec::new();
                        for method in methods {
                            if let Some(subtasks) = method.refine(&state, args) {
                                let mut new_todo = subtasks;
                                new_todo.extend_from_slice(rest);
                                alternatives.push(new_todo);
                            }
                        }
                        for new_todo in alternatives.into_iter().rev() {
                            stack.push(Frame {
                                state: state.clone(),
                                todo_list: new_todo,
                                plan: plan.clone(),
                                depth: depth + 1,
                            });
                        }
                    } else {
                        return Err(PlanningError::malformed_item(item.to_string(), depth));
                    }
                }
                TodoItem::Unigoal(var_name, arg, desired) => {
                    if !self.domain.has_unigoal_methods(var_name) {
                        return Err(PlanningError::malformed_item(item.to_string(), depth));
                    }
                    if state.satisfies(var_name, arg, desired) {
                        stack.push(Frame {
                            state,
                            todo_list: rest.to_vec(),
                            plan,
                            depth: depth + 1,
                        });
                        continue;
                    }
                    let methods = self.domain.unigoal_methods(var_name).unwrap_or(&[]);
                    let mut alternatives = Vec::new();
                    for method in methods {
                        if let Some(subgoals) = method.refine(&state, arg, desired) {
                            let mut new_todo = subgoals;
                            if self.verify_goals {
                                new_todo.push(goals::goal_verification(
                                    method.name(),
                                    var_name,
                                    arg,
                                    desired,
                                    depth,
                                ));
                            }
                            new_todo.extend_from_slice(rest);
                            alternatives.push(new_todo);
                        }
                    }
                    for new_todo in alternatives.into_iter().rev() {
                        stack.push(Frame {
                            state: state.clone(),
                            todo_list: new_todo,
                            plan: plan.clone(),
                            depth: depth + 1,
                        });
                    }
                }
            }
        }

        Ok(None)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::{string_value, Domain, TaskMethod, UnigoalMethod};
    use crate::planning::{split_multigoal_method, PlannerBuilder};

    /// One movable object, one `move` action, one `dest` unigoal method.
    fn shuttle_domain() -> Domain {
        let mut domain = Domain::new("shuttle");
        domain
            .declare_action("move", |mut state: State, args: &[StateValue]| {
                let obj = args[0].as_str()?;
                let target = args[1].as_str()?;
                state.set_var("dest", obj, string_value(target));
                Some(state)
            })
            .unwrap();
        domain
            .declare_unigoal_method(
                "dest",
                UnigoalMethod::new("m_move", |_state: &State, arg: &str, desired: &StateValue| {
                    Some(vec![TodoItem::action(
                        "move",
                        vec![arg.into(), desired.clone()],
                    )])
                }),
            )
            .unwrap();
        domain
    }

    fn shuttle_state() -> State {
        let mut state = State::new("s0");
        state.set_var("dest", "probe", "pad".into());
        state
    }

    #[test]
    fn empty_todo_list_returns_empty_plan() {
        let planner = PlannerBuilder::new()
            .with_domain(shuttle_domain())
            .build()
            .unwrap();
        let plan = planner.find_plan(shuttle_state(), vec![]).unwrap();
        assert_eq!(plan, Some(vec![]));
    }

    #[test]
    fn satisfied_goals_produce_an_empty_plan() {
        let planner = PlannerBuilder::new()
            .with_domain(shuttle_domain())
            .build()
            .unwrap();
        let todo = vec![TodoItem::unigoal("dest", "probe", "pad".into())];
        let plan = planner.find_plan(shuttle_state(), todo).unwrap();
        assert_eq!(plan, Some(vec![]));
    }

    #[test]
    fn unigoal_refinement_plans_the_action() {
        let planner = PlannerBuilder::new()
            .with_domain(shuttle_domain())
            .build()
            .unwrap();
        let todo = vec![TodoItem::unigoal("dest", "probe", "orbit".into())];
        let plan = planner.find_plan(shuttle_state(), todo).unwrap().unwrap();
        assert_eq!(
            plan,
            vec![TodoItem::action("move", vec!["probe".into(), "orbit".into()])]
        );
    }

    #[test]
    fn task_items_resolve_to_actions_of_the_same_name() {
        let planner = PlannerBuilder::new()
            .with_domain(shuttle_domain())
            .build()
            .unwrap();
        let todo = vec![TodoItem::task(
            "move",
            vec!["probe".into(), "orbit".into()],
        )];
        let plan = planner.find_plan(shuttle_state(), todo).unwrap().unwrap();
        assert_eq!(plan.len(), 1);
        assert!(plan[0].is_action());
    }

    #[test]
    fn callers_state_is_never_mutated() {
        let planner = PlannerBuilder::new()
            .with_domain(shuttle_domain())
            .build()
            .unwrap();
        let state = shuttle_state();
        let before = state.clone();
        let todo = vec![TodoItem::unigoal("dest", "probe", "orbit".into())];
        planner.find_plan(state.clone(), todo).unwrap();
        assert_eq!(state, before);
    }

    #[test]
    fn malformed_items_are_fatal() {
        let planner = PlannerBuilder::new()
            .with_domain(shuttle_domain())
            .build()
            .unwrap();

        let err = planner
            .find_plan(shuttle_state(), vec![TodoItem::task("juggle", vec![])])
            .unwrap_err();
        assert!(matches!(err, PlanningError::MalformedItem { depth: 0, .. }));

        let err = planner
            .find_plan(
                shuttle_state(),
                vec![TodoItem::unigoal("altitude", "probe", 10.into())],
            )
            .unwrap_err();
        assert!(matches!(err, PlanningError::MalformedItem { .. }));
    }

    #[test]
    fn verification_catches_a_lying_method() {
        let mut domain = Domain::new("liar");
        domain
            .declare_unigoal_method(
                "dest",
                UnigoalMethod::new("m_wishful", |_: &State, _: &str, _: &StateValue| {
                    Some(vec![])
                }),
            )
            .unwrap();

        let todo = vec![TodoItem::unigoal("dest", "probe", "orbit".into())];

        let planner = PlannerBuilder::new()
            .with_domain(domain.clone())
            .build()
            .unwrap();
        let err = planner
            .find_plan(shuttle_state(), todo.clone())
            .unwrap_err();
        assert!(matches!(
            err,
            PlanningError::MethodVerificationFailed { .. }
        ));

        // with verification off, the lie goes unnoticed
        let unchecked = PlannerBuilder::new()
            .with_domain(domain)
            .with_goal_verification(false)
            .build()
            .unwrap();
        assert_eq!(unchecked.find_plan(shuttle_state(), todo).unwrap(), Some(vec![]));
    }

    #[test]
    fn method_alternatives_are_tried_in_registration_order() {
        let mut domain = Domain::new("ordered");
        domain
            .declare_action("noop", |state: State, _: &[StateValue]| Some(state))
            .unwrap();
        domain
            .declare_task_methods(
                "pick",
                [
                    TaskMethod::new("m_reject", |_: &State, _: &[StateValue]| None),
                    TaskMethod::new("m_first", |_: &State, _: &[StateValue]| {
                        Some(vec![TodoItem::action("noop", vec!["first".into()])])
                    }),
                    TaskMethod::new("m_second", |_: &State, _: &[StateValue]| {
                        Some(vec![TodoItem::action("noop", vec!["second".into()])])
                    }),
                ],
            )
            .unwrap();

        let planner = PlannerBuilder::new().with_domain(domain).build().unwrap();
        let plan = planner
            .find_plan(State::new("s0"), vec![TodoItem::task("pick", vec![])])
            .unwrap()
            .unwrap();
        assert_eq!(plan, vec![TodoItem::action("noop", vec!["first".into()])]);
    }

    #[test]
    fn plans_are_identical_across_runs_and_strategies() {
        let mut domain = shuttle_domain();
        domain.declare_multigoal_method(split_multigoal_method()).unwrap();

        let mut mgoal = Multigoal::new("relocate");
        mgoal.set_goal("dest", "probe", "orbit".into());
        mgoal.set_goal("dest", "rover", "crater".into());

        let mut state = shuttle_state();
        state.set_var("dest", "rover", "pad".into());
        let todo = vec![TodoItem::multigoal(mgoal)];

        let recursive = PlannerBuilder::new()
            .with_domain(domain.clone())
            .build()
            .unwrap();
        let first = recursive.find_plan(state.clone(), todo.clone()).unwrap();
        let second = recursive.find_plan(state.clone(), todo.clone()).unwrap();
        assert_eq!(first, second);

        let iterative = PlannerBuilder::new()
            .with_domain(domain)
            .with_strategy(PlanningStrategy::Iterative)
            .build()
            .unwrap();
        let third = iterative.find_plan(state, todo).unwrap();
        assert_eq!(first, third);

        let plan = first.unwrap();
        assert_eq!(
            plan,
            vec![
                TodoItem::action("move", vec!["probe".into(), "orbit".into()]),
                TodoItem::action("move", vec!["rover".into(), "crater".into()]),
            ]
        );
    }

    #[test]
    fn inapplicable_action_fails_the_branch() {
        let mut domain = Domain::new("guarded");
        domain
            .declare_action("launch", |state: State, _: &[StateValue]| {
                state
                    .satisfies("fueled", "rocket", &true.into())
                    .then_some(state)
            })
            .unwrap();

        let planner = PlannerBuilder::new().with_domain(domain).build().unwrap();
        let mut state = State::new("s0");
        state.set_var("fueled", "rocket", false.into());

        let plan = planner
            .find_plan(state, vec![TodoItem::action("launch", vec![])])
            .unwrap();
        assert_eq!(plan, None);
    }
}
