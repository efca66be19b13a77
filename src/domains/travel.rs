//! The simple travel domain: get a person from one location to another,
//! on foot when it's close and by taxi when there's cash for the fare.
//!
//! This is the classic "travel from home to the park" planning problem.
//! The actions model a compliant world; the commands mirror them except
//! for `c_call_taxi`, which succeeds only half the time and so gives
//! the lazy-lookahead loop something to replan about.

use super::{state_f64, state_str};
use crate::core::{string_value, Domain, State, StateValue, TaskMethod, TodoItem};
use crate::error::Result;

const PERSONS: [&str; 2] = ["alice", "bob"];
const LOCATIONS: [&str; 4] = ["home_a", "home_b", "park", "station"];
const TAXIS: [&str; 2] = ["taxi1", "taxi2"];

const DISTANCES: [(&str, &str, f64); 6] = [
    ("home_a", "park", 8.0),
    ("home_b", "park", 2.0),
    ("station", "home_a", 1.0),
    ("station", "home_b", 7.0),
    ("home_a", "home_b", 7.0),
    ("station", "park", 9.0),
];

fn is_person(x: &str) -> bool {
    PERSONS.contains(&x)
}

fn is_location(x: &str) -> bool {
    LOCATIONS.contains(&x)
}

fn is_taxi(x: &str) -> bool {
    TAXIS.contains(&x)
}

/// Distance between two locations, in either direction
fn distance(x: &str, y: &str) -> Option<f64> {
    DISTANCES
        .iter()
        .find(|(a, b, _)| (*a == x && *b == y) || (*a == y && *b == x))
        .map(|(_, _, d)| *d)
}

/// The taxi fares are quite low in this domain
fn taxi_rate(dist: f64) -> f64 {
    1.5 + 0.5 * dist
}

fn walk(mut state: State, args: &[StateValue]) -> Option<State> {
    let (p, x, y) = (args.first()?.as_str()?, args.get(1)?.as_str()?, args.get(2)?.as_str()?);
    if is_person(p) && is_location(x) && is_location(y) && x != y
        && state_str(&state, "loc", p) == Some(x)
    {
        state.set_var("loc", p, string_value(y));
        Some(state)
    } else {
        None
    }
}

fn call_taxi(mut state: State, args: &[StateValue]) -> Option<State> {
    let (p, x) = (args.first()?.as_str()?, args.get(1)?.as_str()?);
    if is_person(p) && is_location(x) {
        state.set_var("loc", "taxi1", string_value(x));
        state.set_var("loc", p, string_value("taxi1"));
        Some(state)
    } else {
        None
    }
}

fn ride_taxi(mut state: State, args: &[StateValue]) -> Option<State> {
    let (p, y) = (args.first()?.as_str()?, args.get(1)?.as_str()?);
    let taxi = state_str(&state, "loc", p)?.to_owned();
    if is_person(p) && is_taxi(&taxi) && is_location(y) {
        let x = state_str(&state, "loc", &taxi)?.to_owned();
        if is_location(&x) && x != y {
            let fare = taxi_rate(distance(&x, y)?);
            state.set_var("loc", taxi.as_str(), string_value(y));
            state.set_var("owe", p, fare.into());
            return Some(state);
        }
    }
    None
}

fn pay_driver(mut state: State, args: &[StateValue]) -> Option<State> {
    let (p, y) = (args.first()?.as_str()?, args.get(1)?.as_str()?);
    if is_person(p) {
        let cash = state_f64(&state, "cash", p)?;
        let owed = state_f64(&state, "owe", p)?;
        if cash >= owed {
            state.set_var("cash", p, (cash - owed).into());
            state.set_var("owe", p, 0.into());
            state.set_var("loc", p, string_value(y));
            return Some(state);
        }
    }
    None
}

/// `c_call_taxi` as the real world has it: the taxi shows up half the
/// time.
fn c_call_taxi(state: State, args: &[StateValue]) -> Option<State> {
    if rand::random::<bool>() {
        println!("Command> c_call_taxi succeeded. This happens with Pr = 1/2.");
        call_taxi(state, args)
    } else {
        println!("Command> c_call_taxi failed. This happens with Pr = 1/2.");
        None
    }
}

fn m_do_nothing(state: &State, args: &[StateValue]) -> Option<Vec<TodoItem>> {
    let (p, y) = (args.first()?.as_str()?, args.get(1)?.as_str()?);
    if is_person(p) && is_location(y) && state_str(state, "loc", p) == Some(y) {
        Some(vec![])
    } else {
        None
    }
}

fn m_travel_by_foot(state: &State, args: &[StateValue]) -> Option<Vec<TodoItem>> {
    let (p, y) = (args.first()?.as_str()?, args.get(1)?.as_str()?);
    if is_person(p) && is_location(y) {
        let x = state_str(state, "loc", p)?;
        if x != y && distance(x, y)? <= 2.0 {
            return Some(vec![TodoItem::action(
                "walk",
                vec![p.into(), x.into(), y.into()],
            )]);
        }
    }
    None
}

fn m_travel_by_taxi(state: &State, args: &[StateValue]) -> Option<Vec<TodoItem>> {
    let (p, y) = (args.first()?.as_str()?, args.get(1)?.as_str()?);
    if is_person(p) && is_location(y) {
        let x = state_str(state, "loc", p)?;
        if x != y && state_f64(state, "cash", p)? >= taxi_rate(distance(x, y)?) {
            return Some(vec![
                TodoItem::action("call_taxi", vec![p.into(), x.into()]),
                TodoItem::action("ride_taxi", vec![p.into(), y.into()]),
                TodoItem::action("pay_driver", vec![p.into(), y.into()]),
            ]);
        }
    }
    None
}

/// The travel domain with reliable commands (each `c_*` mirrors its
/// action model).
pub fn travel_domain() -> Result<Domain> {
    let mut domain = Domain::new("travel");

    domain.declare_action("walk", walk)?;
    domain.declare_action("call_taxi", call_taxi)?;
    domain.declare_action("ride_taxi", ride_taxi)?;
    domain.declare_action("pay_driver", pay_driver)?;

    domain.declare_command("c_walk", walk)?;
    domain.declare_command("c_call_taxi", call_taxi)?;
    domain.declare_command("c_ride_taxi", ride_taxi)?;
    domain.declare_command("c_pay_driver", pay_driver)?;

    domain.declare_task_methods(
        "travel",
        [
            TaskMethod::new("m_do_nothing", m_do_nothing),
            TaskMethod::new("m_travel_by_foot", m_travel_by_foot),
            TaskMethod::new("m_travel_by_taxi", m_travel_by_taxi),
        ],
    )?;

    Ok(domain)
}

/// The travel domain with the unreliable taxi dispatcher, for acting
/// demonstrations.
pub fn travel_domain_with_unreliable_taxi() -> Result<Domain> {
    let mut domain = travel_domain()?;
    domain.declare_command("c_call_taxi", c_call_taxi)?;
    Ok(domain)
}

/// The prototypical initial state: alice and bob at home, taxis parked,
/// some cash, nothing owed.
pub fn initial_state() -> State {
    let mut state = State::new("state0");
    state.set_var("loc", "alice", "home_a".into());
    state.set_var("loc", "bob", "home_b".into());
    state.set_var("loc", "taxi1", "park".into());
    state.set_var("loc", "taxi2", "station".into());
    state.set_var("cash", "alice", 20.into());
    state.set_var("cash", "bob", 15.into());
    state.set_var("owe", "alice", 0.into());
    state.set_var("owe", "bob", 0.into());
    state
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::planning::PlannerBuilder;
    use crate::planning::Planner;

    fn planner() -> Planner {
        PlannerBuilder::new()
            .with_domain(travel_domain().unwrap())
            .build()
            .unwrap()
    }

    fn travel_task(p: &str, destination: &str) -> TodoItem {
        TodoItem::task("travel", vec![p.into(), destination.into()])
    }

    #[test]
    fn alice_travels_by_taxi() {
        let plan = planner()
            .find_plan(initial_state(), vec![travel_task("alice", "park")])
            .unwrap()
            .unwrap();
        assert_eq!(
            plan,
            vec![
                TodoItem::action("call_taxi", vec!["alice".into(), "home_a".into()]),
                TodoItem::action("ride_taxi", vec!["alice".into(), "park".into()]),
                TodoItem::action("pay_driver", vec!["alice".into(), "park".into()]),
            ]
        );
    }

    #[test]
    fn bob_walks_the_short_way() {
        let plan = planner()
            .find_plan(initial_state(), vec![travel_task("bob", "park")])
            .unwrap()
            .unwrap();
        assert_eq!(
            plan,
            vec![TodoItem::action(
                "walk",
                vec!["bob".into(), "home_b".into(), "park".into()]
            )]
        );
    }

    #[test]
    fn travel_to_the_current_location_needs_no_actions() {
        let plan = planner()
            .find_plan(initial_state(), vec![travel_task("alice", "home_a")])
            .unwrap();
        assert_eq!(plan, Some(vec![]));
    }

    #[test]
    fn no_plan_when_too_far_and_too_poor() {
        let mut state = initial_state();
        state.set_var("cash", "alice", 1.into());

        let plan = planner()
            .find_plan(state, vec![travel_task("alice", "park")])
            .unwrap();
        assert_eq!(plan, None);
    }

    #[test]
    fn taxi_ride_settles_the_fare() {
        let plan = planner()
            .find_plan(initial_state(), vec![travel_task("alice", "park")])
            .unwrap()
            .unwrap();

        // replay the plan through the action functions
        let domain = travel_domain().unwrap();
        let mut state = initial_state();
        for item in &plan {
            let TodoItem::Action(name, args) = item else {
                panic!("plan contains a non-action item");
            };
            let action = domain.get_action(name).unwrap();
            state = action(state.copy(None), args).unwrap();
        }

        assert_eq!(state_str(&state, "loc", "alice"), Some("park"));
        assert_eq!(state_f64(&state, "owe", "alice"), Some(0.0));
        // fare for the 8-unit trip is 1.5 + 0.5 * 8 = 5.5
        assert_eq!(state_f64(&state, "cash", "alice"), Some(14.5));
    }

    #[test]
    fn lazy_lookahead_reaches_the_park_and_then_plans_nothing() {
        let planner = planner();
        let final_state = planner
            .run_lazy_lookahead(initial_state(), vec![travel_task("alice", "park")])
            .unwrap();
        assert_eq!(state_str(&final_state, "loc", "alice"), Some("park"));

        let plan = planner
            .find_plan(final_state, vec![travel_task("alice", "park")])
            .unwrap();
        assert_eq!(plan, Some(vec![]));
    }
}
