//! Logistics as a goal network: packages move within a city by truck
//! and between cities by plane.
//!
//! Dynamic state is three variables: `at[package]`, `truck_at[truck]`,
//! and `plane_at[plane]`. The fleet, the map, and which city each
//! location belongs to are rigid and live here as constants.

use super::state_str;
use crate::core::{string_value, Domain, State, StateValue, TodoItem, UnigoalMethod};
use crate::error::Result;

const PACKAGES: [&str; 2] = ["package1", "package2"];
const TRUCKS: [&str; 2] = ["truck1", "truck6"];
const AIRPLANES: [&str; 1] = ["plane2"];
const AIRPORTS: [&str; 2] = ["airport1", "airport2"];
const LOCATIONS: [&str; 6] = [
    "location1",
    "location2",
    "location3",
    "airport1",
    "location10",
    "airport2",
];

const CITY_MAP: [(&str, &str); 6] = [
    ("location1", "city1"),
    ("location2", "city1"),
    ("location3", "city1"),
    ("airport1", "city1"),
    ("location10", "city2"),
    ("airport2", "city2"),
];

fn is_package(x: &str) -> bool {
    PACKAGES.contains(&x)
}

fn is_truck(x: &str) -> bool {
    TRUCKS.contains(&x)
}

fn is_plane(x: &str) -> bool {
    AIRPLANES.contains(&x)
}

fn is_airport(x: &str) -> bool {
    AIRPORTS.contains(&x)
}

fn is_location(x: &str) -> bool {
    LOCATIONS.contains(&x)
}

fn city_of(location: &str) -> Option<&'static str> {
    CITY_MAP
        .iter()
        .find(|(l, _)| *l == location)
        .map(|(_, city)| *city)
}

fn drive_truck(mut state: State, args: &[StateValue]) -> Option<State> {
    let (t, l) = (args.first()?.as_str()?, args.get(1)?.as_str()?);
    state.set_var("truck_at", t, string_value(l));
    Some(state)
}

fn load_truck(mut state: State, args: &[StateValue]) -> Option<State> {
    let (o, t) = (args.first()?.as_str()?, args.get(1)?.as_str()?);
    state.set_var("at", o, string_value(t));
    Some(state)
}

fn unload_truck(mut state: State, args: &[StateValue]) -> Option<State> {
    let (o, l) = (args.first()?.as_str()?, args.get(1)?.as_str()?);
    let t = state_str(&state, "at", o)?.to_owned();
    if state_str(&state, "truck_at", &t) == Some(l) {
        state.set_var("at", o, string_value(l));
        Some(state)
    } else {
        None
    }
}

fn fly_plane(mut state: State, args: &[StateValue]) -> Option<State> {
    let (plane, a) = (args.first()?.as_str()?, args.get(1)?.as_str()?);
    state.set_var("plane_at", plane, string_value(a));
    Some(state)
}

fn load_plane(mut state: State, args: &[StateValue]) -> Option<State> {
    let (o, plane) = (args.first()?.as_str()?, args.get(1)?.as_str()?);
    state.set_var("at", o, string_value(plane));
    Some(state)
}

fn unload_plane(mut state: State, args: &[StateValue]) -> Option<State> {
    let (o, a) = (args.first()?.as_str()?, args.get(1)?.as_str()?);
    let plane = state_str(&state, "at", o)?.to_owned();
    if state_str(&state, "plane_at", &plane) == Some(a) {
        state.set_var("at", o, string_value(a));
        Some(state)
    } else {
        None
    }
}

/// First truck in the package's city, if any
fn find_truck(state: &State, o: &str) -> Option<&'static str> {
    let package_city = city_of(state_str(state, "at", o)?)?;
    TRUCKS.into_iter().find(|t| {
        state_str(state, "truck_at", t).and_then(city_of) == Some(package_city)
    })
}

/// First plane in the package's city, if any
fn find_plane(state: &State, o: &str) -> Option<&'static str> {
    let package_city = city_of(state_str(state, "at", o)?)?;
    AIRPLANES.into_iter().find(|plane| {
        state_str(state, "plane_at", plane).and_then(city_of) == Some(package_city)
    })
}

/// The airport serving a location's city
fn find_airport(location: &str) -> Option<&'static str> {
    let city = city_of(location)?;
    AIRPORTS.into_iter().find(|a| city_of(a) == Some(city))
}

fn m_drive_truck(state: &State, t: &str, desired: &StateValue) -> Option<Vec<TodoItem>> {
    let l = desired.as_str()?;
    if is_truck(t)
        && is_location(l)
        && state_str(state, "truck_at", t).and_then(city_of) == city_of(l)
    {
        Some(vec![TodoItem::action("drive_truck", vec![t.into(), l.into()])])
    } else {
        None
    }
}

fn m_fly_plane(_state: &State, plane: &str, desired: &StateValue) -> Option<Vec<TodoItem>> {
    let a = desired.as_str()?;
    if is_plane(plane) && is_airport(a) {
        Some(vec![TodoItem::action("fly_plane", vec![plane.into(), a.into()])])
    } else {
        None
    }
}

fn m_load_truck(state: &State, o: &str, desired: &StateValue) -> Option<Vec<TodoItem>> {
    let t = desired.as_str()?;
    if is_package(o) && is_truck(t) && state_str(state, "at", o) == state_str(state, "truck_at", t)
    {
        Some(vec![TodoItem::action("load_truck", vec![o.into(), t.into()])])
    } else {
        None
    }
}

fn m_unload_truck(state: &State, o: &str, desired: &StateValue) -> Option<Vec<TodoItem>> {
    let l = desired.as_str()?;
    if is_package(o) && state_str(state, "at", o).is_some_and(is_truck) && is_location(l) {
        Some(vec![TodoItem::action("unload_truck", vec![o.into(), l.into()])])
    } else {
        None
    }
}

fn m_load_plane(state: &State, o: &str, desired: &StateValue) -> Option<Vec<TodoItem>> {
    let plane = desired.as_str()?;
    if is_package(o)
        && is_plane(plane)
        && state_str(state, "at", o) == state_str(state, "plane_at", plane)
    {
        Some(vec![TodoItem::action("load_plane", vec![o.into(), plane.into()])])
    } else {
        None
    }
}

fn m_unload_plane(state: &State, o: &str, desired: &StateValue) -> Option<Vec<TodoItem>> {
    let a = desired.as_str()?;
    if is_package(o) && state_str(state, "at", o).is_some_and(is_plane) && is_airport(a) {
        Some(vec![TodoItem::action("unload_plane", vec![o.into(), a.into()])])
    } else {
        None
    }
}

/// Truck shuttle: bring a truck to the package, load, drive, unload
fn m_move_within_city(state: &State, o: &str, desired: &StateValue) -> Option<Vec<TodoItem>> {
    let l = desired.as_str()?;
    let origin = state_str(state, "at", o)?;
    if is_package(o) && is_location(origin) && city_of(origin) == city_of(l) {
        let t = find_truck(state, o)?;
        return Some(vec![
            TodoItem::unigoal("truck_at", t, origin.into()),
            TodoItem::unigoal("at", o, t.into()),
            TodoItem::unigoal("truck_at", t, l.into()),
            TodoItem::unigoal("at", o, l.into()),
        ]);
    }
    None
}

/// Plane shuttle between airports of different cities
fn m_move_between_airports(state: &State, o: &str, desired: &StateValue) -> Option<Vec<TodoItem>> {
    let a = desired.as_str()?;
    let origin = state_str(state, "at", o)?;
    if is_package(o) && is_airport(origin) && is_airport(a) && city_of(origin) != city_of(a) {
        let plane = find_plane(state, o)?;
        return Some(vec![
            TodoItem::unigoal("plane_at", plane, origin.into()),
            TodoItem::unigoal("at", o, plane.into()),
            TodoItem::unigoal("plane_at", plane, a.into()),
            TodoItem::unigoal("at", o, a.into()),
        ]);
    }
    None
}

/// Cross-city delivery: truck to the origin airport, fly, truck again
fn m_move_between_city(state: &State, o: &str, desired: &StateValue) -> Option<Vec<TodoItem>> {
    let l = desired.as_str()?;
    let origin = state_str(state, "at", o)?;
    if is_package(o) && is_location(origin) && city_of(origin) != city_of(l) {
        let a1 = find_airport(origin)?;
        let a2 = find_airport(l)?;
        return Some(vec![
            TodoItem::unigoal("at", o, a1.into()),
            TodoItem::unigoal("at", o, a2.into()),
            TodoItem::unigoal("at", o, l.into()),
        ]);
    }
    None
}

/// The logistics domain: six actions and the `at` / `truck_at` /
/// `plane_at` goal methods.
pub fn logistics_domain() -> Result<Domain> {
    let mut domain = Domain::new("logistics");

    domain.declare_action("drive_truck", drive_truck)?;
    domain.declare_action("load_truck", load_truck)?;
    domain.declare_action("unload_truck", unload_truck)?;
    domain.declare_action("fly_plane", fly_plane)?;
    domain.declare_action("load_plane", load_plane)?;
    domain.declare_action("unload_plane", unload_plane)?;

    domain.declare_unigoal_methods(
        "at",
        [
            UnigoalMethod::new("m_load_truck", m_load_truck),
            UnigoalMethod::new("m_unload_truck", m_unload_truck),
            UnigoalMethod::new("m_load_plane", m_load_plane),
            UnigoalMethod::new("m_unload_plane", m_unload_plane),
        ],
    )?;
    domain.declare_unigoal_methods(
        "at",
        [
            UnigoalMethod::new("m_move_within_city", m_move_within_city),
            UnigoalMethod::new("m_move_between_airports", m_move_between_airports),
            UnigoalMethod::new("m_move_between_city", m_move_between_city),
        ],
    )?;
    domain.declare_unigoal_method("truck_at", UnigoalMethod::new("m_drive_truck", m_drive_truck))?;
    domain.declare_unigoal_method("plane_at", UnigoalMethod::new("m_fly_plane", m_fly_plane))?;

    Ok(domain)
}

/// Two packages and two trucks in city1, one plane in city2
pub fn initial_state() -> State {
    let mut state = State::new("state1");
    state.set_var("at", "package1", "location1".into());
    state.set_var("at", "package2", "location2".into());
    state.set_var("truck_at", "truck1", "location3".into());
    state.set_var("truck_at", "truck6", "location10".into());
    state.set_var("plane_at", "plane2", "airport2".into());
    state
}
