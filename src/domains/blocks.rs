//! Blocks world as a goal network, using the Gupta–Nau block-stacking
//! algorithm [1] as the multigoal method.
//!
//! Three state variables describe the table:
//! - `pos[b]` is `"table"`, `"hand"`, or the block `b` sits on
//! - `clear[b]` is false while something is on `b` or the hand holds it
//! - `holding["hand"]` is the held block's name, or `false`
//!
//! [1] N. Gupta and D. S. Nau. On the complexity of blocks-world
//!     planning. Artificial Intelligence 56(2-3):223-254, 1992.

use super::{state_bool, state_str};
use crate::core::{
    string_value, Domain, Multigoal, MultigoalMethod, State, StateValue, TodoItem, UnigoalMethod,
};
use crate::error::Result;

fn pickup(mut state: State, args: &[StateValue]) -> Option<State> {
    let x = args.first()?.as_str()?;
    if state_str(&state, "pos", x) == Some("table")
        && state_bool(&state, "clear", x) == Some(true)
        && state.satisfies("holding", "hand", &false.into())
    {
        state.set_var("pos", x, string_value("hand"));
        state.set_var("clear", x, false.into());
        state.set_var("holding", "hand", string_value(x));
        Some(state)
    } else {
        None
    }
}

fn unstack(mut state: State, args: &[StateValue]) -> Option<State> {
    let (b1, b2) = (args.first()?.as_str()?, args.get(1)?.as_str()?);
    if state_str(&state, "pos", b1) == Some(b2)
        && b2 != "table"
        && state_bool(&state, "clear", b1) == Some(true)
        && state.satisfies("holding", "hand", &false.into())
    {
        state.set_var("pos", b1, string_value("hand"));
        state.set_var("clear", b1, false.into());
        state.set_var("holding", "hand", string_value(b1));
        state.set_var("clear", b2, true.into());
        Some(state)
    } else {
        None
    }
}

fn putdown(mut state: State, args: &[StateValue]) -> Option<State> {
    let b1 = args.first()?.as_str()?;
    if state_str(&state, "pos", b1) == Some("hand") {
        state.set_var("pos", b1, string_value("table"));
        state.set_var("clear", b1, true.into());
        state.set_var("holding", "hand", false.into());
        Some(state)
    } else {
        None
    }
}

fn stack(mut state: State, args: &[StateValue]) -> Option<State> {
    let (b1, b2) = (args.first()?.as_str()?, args.get(1)?.as_str()?);
    if state_str(&state, "pos", b1) == Some("hand")
        && state_bool(&state, "clear", b2) == Some(true)
    {
        state.set_var("pos", b1, string_value(b2));
        state.set_var("clear", b1, true.into());
        state.set_var("holding", "hand", false.into());
        state.set_var("clear", b2, false.into());
        Some(state)
    } else {
        None
    }
}

/// True if `b1` and every block below it are already where the goal
/// wants them (blocks the goal says nothing about only need a stable
/// foundation).
fn is_done(b1: &str, state: &State, mgoal: &Multigoal) -> bool {
    if b1 == "table" {
        return true;
    }
    let Some(below) = state_str(state, "pos", b1) else {
        return false;
    };
    if let Some(goal_pos) = mgoal.get_goal("pos", b1).and_then(StateValue::as_str) {
        if goal_pos != below {
            return false;
        }
    }
    if below == "table" {
        return true;
    }
    is_done(below, state, mgoal)
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Status {
    Done,
    Inaccessible,
    MoveToTable,
    MoveToBlock,
    Waiting,
}

/// Classify what, if anything, should happen to `b1` next
fn status(b1: &str, state: &State, mgoal: &Multigoal) -> Status {
    if is_done(b1, state, mgoal) {
        Status::Done
    } else if state_bool(state, "clear", b1) != Some(true) {
        Status::Inaccessible
    } else {
        match mgoal.get_goal("pos", b1).and_then(StateValue::as_str) {
            None | Some("table") => Status::MoveToTable,
            Some(destination) => {
                if is_done(destination, state, mgoal)
                    && state_bool(state, "clear", destination) == Some(true)
                {
                    Status::MoveToBlock
                } else {
                    Status::Waiting
                }
            }
        }
    }
}

fn all_clear_blocks<'a>(state: &'a State) -> Vec<&'a str> {
    state
        .var_map("clear")
        .map(|args| {
            args.iter()
                .filter(|(_, clear)| **clear == StateValue::Bool(true))
                .map(|(block, _)| block.as_str())
                .collect()
        })
        .unwrap_or_default()
}

/// The block-stacking algorithm: move one well-chosen clear block, then
/// re-examine the multigoal. Each move is expressed as a pair of `pos`
/// goals (into the hand, then onto the destination).
fn m_moveblocks(state: &State, mgoal: &Multigoal) -> Option<Vec<TodoItem>> {
    let move_via_hand = |x: &str, destination: &str| {
        Some(vec![
            TodoItem::unigoal("pos", x, string_value("hand")),
            TodoItem::unigoal("pos", x, string_value(destination)),
            TodoItem::multigoal(mgoal.clone()),
        ])
    };

    // a clear block that can go straight to a place it never leaves again
    for x in all_clear_blocks(state) {
        match status(x, state, mgoal) {
            Status::MoveToBlock => {
                let destination = mgoal.get_goal("pos", x)?.as_str()?.to_owned();
                return move_via_hand(x, &destination);
            }
            Status::MoveToTable => return move_via_hand(x, "table"),
            _ => continue,
        }
    }

    // otherwise, clear the way by parking a waiting block on the table
    for x in all_clear_blocks(state) {
        if status(x, state, mgoal) == Status::Waiting && state_str(state, "pos", x) != Some("table")
        {
            return move_via_hand(x, "table");
        }
    }

    // nothing needs moving
    Some(vec![])
}

/// For `(pos, x, "hand")`: pick the block up off whatever it is on
fn m_take(state: &State, x: &str, desired: &StateValue) -> Option<Vec<TodoItem>> {
    if desired.as_str() != Some("hand")
        || state_bool(state, "clear", x) != Some(true)
        || !state.satisfies("holding", "hand", &false.into())
    {
        return None;
    }
    match state_str(state, "pos", x)? {
        "table" => Some(vec![TodoItem::action("pickup", vec![x.into()])]),
        below => Some(vec![TodoItem::action(
            "unstack",
            vec![x.into(), below.into()],
        )]),
    }
}

/// For `(pos, x, y)` while holding `x`: put it down where the goal says
fn m_put(state: &State, x: &str, desired: &StateValue) -> Option<Vec<TodoItem>> {
    let y = desired.as_str()?;
    if y == "hand" || state_str(state, "pos", x) != Some("hand") {
        return None;
    }
    if y == "table" {
        Some(vec![TodoItem::action("putdown", vec![x.into()])])
    } else if state_bool(state, "clear", y) == Some(true) {
        Some(vec![TodoItem::action("stack", vec![x.into(), y.into()])])
    } else {
        None
    }
}

/// The blocks domain: four actions, the `pos` goal methods, and the
/// block-stacking multigoal method.
pub fn blocks_domain() -> Result<Domain> {
    let mut domain = Domain::new("blocks");

    domain.declare_action("pickup", pickup)?;
    domain.declare_action("unstack", unstack)?;
    domain.declare_action("putdown", putdown)?;
    domain.declare_action("stack", stack)?;

    domain.declare_unigoal_methods(
        "pos",
        [
            UnigoalMethod::new("m_take", m_take),
            UnigoalMethod::new("m_put", m_put),
        ],
    )?;

    domain.declare_multigoal_method(MultigoalMethod::new("m_moveblocks", m_moveblocks))?;

    Ok(domain)
}

/// A state with the given `(block, position)` pairs; `clear` and
/// `holding` are derived.
pub fn blocks_state(name: &str, positions: &[(&str, &str)]) -> State {
    let mut state = State::new(name);
    for (block, position) in positions {
        state.set_var("pos", *block, string_value(*position));
    }
    for (block, _) in positions {
        let covered = positions.iter().any(|(_, position)| position == block);
        state.set_var("clear", *block, (!covered).into());
    }
    state.set_var("holding", "hand", false.into());
    state
}
