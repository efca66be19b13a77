//! # interplan
//!
//! interplan is an automated planner that interleaves Hierarchical Task
//! Network (HTN) planning with Hierarchical Goal Network (HGN)
//! planning. Given an initial state and a todo list mixing actions,
//! tasks, unigoals, and multigoals, it searches depth-first through the
//! refinements offered by the domain's methods and returns a totally
//! ordered sequence of primitive actions, or reports that none exists.
//!
//! ## Task planning
//!
//! Tasks are refined by task methods into further todo items, down to
//! primitive actions:
//!
//! ```
//! use interplan::{Domain, PlannerBuilder, State, StateValue, TaskMethod, TodoItem};
//!
//! # fn main() -> interplan::Result<()> {
//! let mut domain = Domain::new("delivery");
//!
//! domain.declare_action("move", |mut state: State, args: &[StateValue]| {
//!     let obj = args[0].as_str()?;
//!     state.set_var("loc", obj, args[1].clone());
//!     Some(state)
//! })?;
//!
//! domain.declare_task_method(
//!     "deliver",
//!     TaskMethod::new("m_deliver", |state: &State, args: &[StateValue]| {
//!         let obj = args[0].as_str()?;
//!         if state.satisfies("loc", obj, &args[1]) {
//!             Some(vec![])
//!         } else {
//!             Some(vec![TodoItem::action("move", args.to_vec())])
//!         }
//!     }),
//! )?;
//!
//! let planner = PlannerBuilder::new().with_domain(domain).build()?;
//!
//! let mut state = State::new("s0");
//! state.set_var("loc", "parcel", "warehouse".into());
//!
//! let todo = vec![TodoItem::task("deliver", vec!["parcel".into(), "office".into()])];
//! let plan = planner.find_plan(state, todo)?.expect("a plan exists");
//! assert_eq!(plan, vec![TodoItem::action("move", vec!["parcel".into(), "office".into()])]);
//! # Ok(())
//! # }
//! ```
//!
//! ## Goal planning
//!
//! Goals state *what* should hold instead of what to do. A unigoal is a
//! single desired assignment; a multigoal is a conjunction of them,
//! refined by multigoal methods such as the built-in
//! [`split_multigoal`]:
//!
//! ```
//! use interplan::{
//!     split_multigoal_method, Domain, Multigoal, PlannerBuilder, State, StateValue,
//!     TodoItem, UnigoalMethod,
//! };
//!
//! # fn main() -> interplan::Result<()> {
//! let mut domain = Domain::new("delivery");
//!
//! domain.declare_action("move", |mut state: State, args: &[StateValue]| {
//!     let obj = args[0].as_str()?;
//!     state.set_var("loc", obj, args[1].clone());
//!     Some(state)
//! })?;
//!
//! domain.declare_unigoal_method(
//!     "loc",
//!     UnigoalMethod::new("m_move", |_: &State, arg: &str, desired: &StateValue| {
//!         Some(vec![TodoItem::action("move", vec![arg.into(), desired.clone()])])
//!     }),
//! )?;
//! domain.declare_multigoal_method(split_multigoal_method())?;
//!
//! let mut state = State::new("s0");
//! state.set_var("loc", "parcel", "warehouse".into());
//! state.set_var("loc", "letter", "warehouse".into());
//!
//! let mut mgoal = Multigoal::new("all_delivered");
//! mgoal.set_goal("loc", "parcel", "office".into());
//! mgoal.set_goal("loc", "letter", "office".into());
//!
//! let planner = PlannerBuilder::new().with_domain(domain).build()?;
//! let plan = planner.find_plan(state, vec![TodoItem::multigoal(mgoal)])?;
//! assert_eq!(plan.map(|p| p.len()), Some(2));
//! # Ok(())
//! # }
//! ```
//!
//! ## Acting
//!
//! [`Planner::run_lazy_lookahead`] executes plans through *commands*
//! (the `c_*` entries of the domain), replanning whenever a command
//! fails, so the planner's models and the world are allowed to
//! disagree.
//!
//! Whenever a unigoal or multigoal method is applied, the planner
//! inserts a verification step that re-checks the promised goal once
//! the refinement has been processed, so a method that claims success
//! without achieving its goal fails loudly instead of corrupting plans.

pub mod core;
pub mod domains;
pub mod error;
pub mod planning;

pub use crate::core::{
    bool_value, float_value, int_value, string_value, ActionFn, Domain, Multigoal,
    MultigoalMethod, Plan, State, StateValue, TaskMethod, TodoItem, TodoList, UnigoalMethod,
};
pub use error::{PlanningError, Result};
pub use planning::acting::DEFAULT_MAX_TRIES;
pub use planning::{
    split_multigoal, split_multigoal_method, Planner, PlannerBuilder, PlanningStrategy,
};

/// Current version of interplan
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
