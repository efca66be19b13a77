//! Domain registry: actions, commands, and the three method tables.
//!
//! Method lists are append-only and keep registration order; that order
//! is the order the planner tries alternatives in, so it is the domain
//! author's main control over search bias.

use super::{Multigoal, State, StateValue, TodoList};
use crate::error::{PlanningError, Result};
use indexmap::IndexMap;
use std::sync::Arc;

/// Internal task names the planner injects to check method refinements.
/// Every domain carries them; they cannot be redeclared.
pub(crate) const VERIFY_GOAL: &str = "_verify_g";
pub(crate) const VERIFY_MULTIGOAL: &str = "_verify_mg";

/// An action or command body. It receives its own deep copy of the
/// state, mutates it locally, and returns it, or returns `None` when a
/// precondition does not hold.
pub type ActionFn = Arc<dyn Fn(State, &[StateValue]) -> Option<State> + Send + Sync>;

type TaskFn = Arc<dyn Fn(&State, &[StateValue]) -> Option<TodoList> + Send + Sync>;
type UnigoalFn = Arc<dyn Fn(&State, &str, &StateValue) -> Option<TodoList> + Send + Sync>;
type MultigoalFn = Arc<dyn Fn(&State, &Multigoal) -> Option<TodoList> + Send + Sync>;

/// A named method that refines a task into a todo list
#[derive(Clone)]
pub struct TaskMethod {
    name: String,
    func: TaskFn,
}

impl TaskMethod {
    /// Wrap a refinement function under a display name
    pub fn new<F>(name: impl Into<String>, func: F) -> Self
    where
        F: Fn(&State, &[StateValue]) -> Option<TodoList> + Send + Sync + 'static,
    {
        Self {
            name: name.into(),
            func: Arc::new(func),
        }
    }

    /// The method's display name
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Try the method; `None` means it is not applicable here
    pub fn refine(&self, state: &State, args: &[StateValue]) -> Option<TodoList> {
        (self.func)(state, args)
    }

    fn same_fn(&self, other: &Self) -> bool {
        Arc::ptr_eq(&self.func, &other.func)
    }
}

/// A named method that refines a `(variable, argument, value)` goal
#[derive(Clone)]
pub struct UnigoalMethod {
    name: String,
    func: UnigoalFn,
}

impl UnigoalMethod {
    /// Wrap a refinement function under a display name
    pub fn new<F>(name: impl Into<String>, func: F) -> Self
    where
        F: Fn(&State, &str, &StateValue) -> Option<TodoList> + Send + Sync + 'static,
    {
        Self {
            name: name.into(),
            func: Arc::new(func),
        }
    }

    /// The method's display name
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Try the method; `None` means it is not applicable here
    pub fn refine(&self, state: &State, arg: &str, desired: &StateValue) -> Option<TodoList> {
        (self.func)(state, arg, desired)
    }

    fn same_fn(&self, other: &Self) -> bool {
        Arc::ptr_eq(&self.func, &other.func)
    }
}

/// A named method that refines a multigoal
#[derive(Clone)]
pub struct MultigoalMethod {
    name: String,
    func: MultigoalFn,
}

impl MultigoalMethod {
    /// Wrap a refinement function under a display name
    pub fn new<F>(name: impl Into<String>, func: F) -> Self
    where
        F: Fn(&State, &Multigoal) -> Option<TodoList> + Send + Sync + 'static,
    {
        Self {
            name: name.into(),
            func: Arc::new(func),
        }
    }

    /// The method's display name
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Try the method; `None` means it is not applicable here
    pub fn refine(&self, state: &State, mgoal: &Multigoal) -> Option<TodoList> {
        (self.func)(state, mgoal)
    }

    fn same_fn(&self, other: &Self) -> bool {
        Arc::ptr_eq(&self.func, &other.func)
    }
}

/// A planning domain: tables of actions, commands, and methods
#[derive(Clone)]
pub struct Domain {
    /// Name of the domain
    pub name: String,
    actions: IndexMap<String, ActionFn>,
    commands: IndexMap<String, ActionFn>,
    task_methods: IndexMap<String, Vec<TaskMethod>>,
    unigoal_methods: IndexMap<String, Vec<UnigoalMethod>>,
    multigoal_methods: Vec<MultigoalMethod>,
}

impl Domain {
    /// Create a domain. The built-in verification tasks are installed
    /// here and stay for the life of the domain.
    pub fn new(name: impl Into<String>) -> Self {
        let mut domain = Self {
            name: name.into(),
            actions: IndexMap::new(),
            commands: IndexMap::new(),
            task_methods: IndexMap::new(),
            unigoal_methods: IndexMap::new(),
            multigoal_methods: Vec::new(),
        };
        domain.install_verification_tasks();
        domain
    }

    /// Table entries for `_verify_g` and `_verify_mg`. The planner
    /// handles these task names itself so that a failed check is fatal
    /// rather than a backtrack point; the entries here keep the tasks
    /// visible to introspection and reserve their names.
    fn install_verification_tasks(&mut self) {
        let verify_g = TaskMethod::new("_m_verify_g", |state: &State, args: &[StateValue]| {
            let var_name = args.get(1)?.as_str()?;
            let arg = args.get(2)?.as_str()?;
            let desired = args.get(3)?;
            state.satisfies(var_name, arg, desired).then(Vec::new)
        });
        let verify_mg = TaskMethod::new("_m_verify_mg", |state: &State, args: &[StateValue]| {
            let mgoal: Multigoal = serde_json::from_value(args.get(1)?.clone()).ok()?;
            mgoal.is_satisfied_by(state).then(Vec::new)
        });
        self.task_methods
            .insert(VERIFY_GOAL.to_string(), vec![verify_g]);
        self.task_methods
            .insert(VERIFY_MULTIGOAL.to_string(), vec![verify_mg]);
    }

    fn check_name_free(&self, name: &str, attempted: &'static str) -> Result<()> {
        if name == VERIFY_GOAL || name == VERIFY_MULTIGOAL {
            return Err(PlanningError::reserved_name(name));
        }
        if attempted != "an action" && self.actions.contains_key(name) {
            return Err(PlanningError::conflicting_name(name, "an action", attempted));
        }
        if attempted != "a task" && self.task_methods.contains_key(name) {
            return Err(PlanningError::conflicting_name(name, "a task", attempted));
        }
        if attempted != "a unigoal variable" && self.unigoal_methods.contains_key(name) {
            return Err(PlanningError::conflicting_name(
                name,
                "a unigoal variable",
                attempted,
            ));
        }
        Ok(())
    }

    /// Register an action under `name`. Re-declaring an existing action
    /// replaces it.
    pub fn declare_action<F>(&mut self, name: impl Into<String>, func: F) -> Result<()>
    where
        F: Fn(State, &[StateValue]) -> Option<State> + Send + Sync + 'static,
    {
        let name = name.into();
        self.check_name_free(&name, "an action")?;
        self.actions.insert(name, Arc::new(func));
        Ok(())
    }

    /// Register several pre-wrapped actions at once
    pub fn declare_actions(
        &mut self,
        actions: impl IntoIterator<Item = (String, ActionFn)>,
    ) -> Result<()> {
        for (name, func) in actions {
            self.check_name_free(&name, "an action")?;
            self.actions.insert(name, func);
        }
        Ok(())
    }

    /// Register a command under `name` (conventionally `c_<action>`).
    /// Re-declaring an existing command replaces it.
    pub fn declare_command<F>(&mut self, name: impl Into<String>, func: F) -> Result<()>
    where
        F: Fn(State, &[StateValue]) -> Option<State> + Send + Sync + 'static,
    {
        self.commands.insert(name.into(), Arc::new(func));
        Ok(())
    }

    /// Register several pre-wrapped commands at once
    pub fn declare_commands(
        &mut self,
        commands: impl IntoIterator<Item = (String, ActionFn)>,
    ) -> Result<()> {
        for (name, func) in commands {
            self.commands.insert(name, func);
        }
        Ok(())
    }

    /// Append methods to the ordered list for `task_name`. A method
    /// already in the list (same function, by identity) is skipped.
    pub fn declare_task_methods(
        &mut self,
        task_name: impl Into<String>,
        methods: impl IntoIterator<Item = TaskMethod>,
    ) -> Result<()> {
        let task_name = task_name.into();
        self.check_name_free(&task_name, "a task")?;
        let entry = self.task_methods.entry(task_name).or_default();
        for method in methods {
            if !entry.iter().any(|existing| existing.same_fn(&method)) {
                entry.push(method);
            }
        }
        Ok(())
    }

    /// Register a single task method
    pub fn declare_task_method(
        &mut self,
        task_name: impl Into<String>,
        method: TaskMethod,
    ) -> Result<()> {
        self.declare_task_methods(task_name, [method])
    }

    /// Append methods to the ordered list for goals on `var_name`
    pub fn declare_unigoal_methods(
        &mut self,
        var_name: impl Into<String>,
        methods: impl IntoIterator<Item = UnigoalMethod>,
    ) -> Result<()> {
        let var_name = var_name.into();
        self.check_name_free(&var_name, "a unigoal variable")?;
        let entry = self.unigoal_methods.entry(var_name).or_default();
        for method in methods {
            if !entry.iter().any(|existing| existing.same_fn(&method)) {
                entry.push(method);
            }
        }
        Ok(())
    }

    /// Register a single unigoal method
    pub fn declare_unigoal_method(
        &mut self,
        var_name: impl Into<String>,
        method: UnigoalMethod,
    ) -> Result<()> {
        self.declare_unigoal_methods(var_name, [method])
    }

    /// Append to the single ordered list of multigoal methods
    pub fn declare_multigoal_methods(
        &mut self,
        methods: impl IntoIterator<Item = MultigoalMethod>,
    ) -> Result<()> {
        for method in methods {
            if !self
                .multigoal_methods
                .iter()
                .any(|existing| existing.same_fn(&method))
            {
                self.multigoal_methods.push(method);
            }
        }
        Ok(())
    }

    /// Register a single multigoal method
    pub fn declare_multigoal_method(&mut self, method: MultigoalMethod) -> Result<()> {
        self.declare_multigoal_methods([method])
    }

    /// Look up an action
    pub fn get_action(&self, name: &str) -> Option<&ActionFn> {
        self.actions.get(name)
    }

    /// Look up a command
    pub fn get_command(&self, name: &str) -> Option<&ActionFn> {
        self.commands.get(name)
    }

    /// The ordered method list for a task name
    pub fn task_methods(&self, task_name: &str) -> Option<&[TaskMethod]> {
        self.task_methods.get(task_name).map(Vec::as_slice)
    }

    /// The ordered method list for a unigoal variable
    pub fn unigoal_methods(&self, var_name: &str) -> Option<&[UnigoalMethod]> {
        self.unigoal_methods.get(var_name).map(Vec::as_slice)
    }

    /// The ordered list of multigoal methods
    pub fn multigoal_methods(&self) -> &[MultigoalMethod] {
        &self.multigoal_methods
    }

    /// True if an action with this name is registered
    pub fn has_action(&self, name: &str) -> bool {
        self.actions.contains_key(name)
    }

    /// True if a command with this name is registered
    pub fn has_command(&self, name: &str) -> bool {
        self.commands.contains_key(name)
    }

    /// True if any task methods are registered under this name
    pub fn has_task_methods(&self, task_name: &str) -> bool {
        self.task_methods.contains_key(task_name)
    }

    /// True if any unigoal methods are registered for this variable
    pub fn has_unigoal_methods(&self, var_name: &str) -> bool {
        self.unigoal_methods.contains_key(var_name)
    }

    /// All action names, in registration order
    pub fn action_names(&self) -> impl Iterator<Item = &String> {
        self.actions.keys()
    }

    /// All command names, in registration order
    pub fn command_names(&self) -> impl Iterator<Item = &String> {
        self.commands.keys()
    }

    /// All task names, in registration order
    pub fn task_names(&self) -> impl Iterator<Item = &String> {
        self.task_methods.keys()
    }

    /// All unigoal variable names, in registration order
    pub fn unigoal_var_names(&self) -> impl Iterator<Item = &String> {
        self.unigoal_methods.keys()
    }

    /// Print the whole registry
    pub fn display(&self) {
        println!("\nDomain name: {}", self.name);
        self.print_actions();
        self.print_commands();
        self.print_methods();
    }

    /// Print the action table
    pub fn print_actions(&self) {
        if self.actions.is_empty() {
            println!("-- There are no actions --");
        } else {
            let names: Vec<&str> = self.actions.keys().map(String::as_str).collect();
            println!("-- Actions: {}", names.join(", "));
        }
    }

    /// Print the command table
    pub fn print_commands(&self) {
        if self.commands.is_empty() {
            println!("-- There are no commands --");
        } else {
            let names: Vec<&str> = self.commands.keys().map(String::as_str).collect();
            println!("-- Commands: {}", names.join(", "));
        }
    }

    /// Print all three method tables
    pub fn print_methods(&self) {
        println!("\nTask name:         Relevant task methods:");
        println!("---------------    ----------------------");
        for (task_name, methods) in &self.task_methods {
            let names: Vec<&str> = methods.iter().map(TaskMethod::name).collect();
            println!("{:<19}{}", task_name, names.join(", "));
        }
        println!();

        if self.unigoal_methods.is_empty() {
            println!("-- There are no unigoal methods --");
        } else {
            println!("State var name:    Relevant unigoal methods:");
            println!("---------------    -------------------------");
            for (var_name, methods) in &self.unigoal_methods {
                let names: Vec<&str> = methods.iter().map(UnigoalMethod::name).collect();
                println!("{:<19}{}", var_name, names.join(", "));
            }
            println!();
        }

        if self.multigoal_methods.is_empty() {
            println!("-- There are no multigoal methods --");
        } else {
            let names: Vec<&str> = self.multigoal_methods.iter().map(MultigoalMethod::name).collect();
            println!("-- Multigoal methods: {}", names.join(", "));
        }
    }
}

impl std::fmt::Display for Domain {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "<Domain {}>", self.name)
    }
}

impl std::fmt::Debug for Domain {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Domain")
            .field("name", &self.name)
            .field("actions", &self.actions.keys().collect::<Vec<_>>())
            .field("commands", &self.commands.keys().collect::<Vec<_>>())
            .field("task_methods", &self.task_methods.keys().collect::<Vec<_>>())
            .field(
                "unigoal_methods",
                &self.unigoal_methods.keys().collect::<Vec<_>>(),
            )
            .field("multigoal_methods", &self.multigoal_methods.len())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::TodoItem;

    fn noop_task(_state: &State, _args: &[StateValue]) -> Option<TodoList> {
        Some(vec![])
    }

    #[test]
    fn verification_tasks_are_built_in() {
        let domain = Domain::new("d");
        assert!(domain.has_task_methods(VERIFY_GOAL));
        assert!(domain.has_task_methods(VERIFY_MULTIGOAL));
    }

    #[test]
    fn reserved_names_are_rejected() {
        let mut domain = Domain::new("d");
        let err = domain
            .declare_task_method(VERIFY_GOAL, TaskMethod::new("m", noop_task))
            .unwrap_err();
        assert!(matches!(err, PlanningError::ReservedName { .. }));

        let err = domain
            .declare_action(VERIFY_MULTIGOAL, |state, _| Some(state))
            .unwrap_err();
        assert!(matches!(err, PlanningError::ReservedName { .. }));
    }

    #[test]
    fn cross_table_collisions_are_rejected() {
        let mut domain = Domain::new("d");
        domain.declare_action("walk", |state, _| Some(state)).unwrap();
        domain
            .declare_task_method("travel", TaskMethod::new("m_travel", noop_task))
            .unwrap();

        let err = domain
            .declare_task_method("walk", TaskMethod::new("m_walk", noop_task))
            .unwrap_err();
        assert!(matches!(err, PlanningError::ConflictingName { .. }));

        let err = domain.declare_action("travel", |state, _| Some(state)).unwrap_err();
        assert!(matches!(err, PlanningError::ConflictingName { .. }));

        let err = domain
            .declare_unigoal_method("walk", UnigoalMethod::new("m_loc", |_, _, _| None))
            .unwrap_err();
        assert!(matches!(err, PlanningError::ConflictingName { .. }));
    }

    #[test]
    fn method_order_is_registration_order() {
        let mut domain = Domain::new("d");
        domain
            .declare_task_methods(
                "put_it",
                [
                    TaskMethod::new("m_err", noop_task),
                    TaskMethod::new("m0", noop_task),
                ],
            )
            .unwrap();
        domain
            .declare_task_method("put_it", TaskMethod::new("m1", noop_task))
            .unwrap();

        let names: Vec<&str> = domain
            .task_methods("put_it")
            .unwrap()
            .iter()
            .map(TaskMethod::name)
            .collect();
        assert_eq!(names, ["m_err", "m0", "m1"]);
    }

    #[test]
    fn duplicate_methods_are_skipped_by_identity() {
        let mut domain = Domain::new("d");
        let method = TaskMethod::new("m0", noop_task);

        domain.declare_task_method("put_it", method.clone()).unwrap();
        domain.declare_task_method("put_it", method).unwrap();
        assert_eq!(domain.task_methods("put_it").unwrap().len(), 1);

        // same source function, separately wrapped: a distinct method
        domain
            .declare_task_method("put_it", TaskMethod::new("m0", noop_task))
            .unwrap();
        assert_eq!(domain.task_methods("put_it").unwrap().len(), 2);
    }

    #[test]
    fn redeclaring_an_action_replaces_it() {
        let mut domain = Domain::new("d");
        domain.declare_action("putv", |_, _| None).unwrap();
        domain
            .declare_action("putv", |mut state: State, args: &[StateValue]| {
                state.set_var("flag", "value", args[0].clone());
                Some(state)
            })
            .unwrap();

        assert_eq!(domain.action_names().count(), 1);
        let action = domain.get_action("putv").unwrap();
        let result = action(State::new("s"), &[1.into()]);
        assert!(result.is_some());
    }

    #[test]
    fn builtin_verify_g_checks_the_state() {
        let domain = Domain::new("d");
        let mut state = State::new("s");
        state.set_var("loc", "alice", "park".into());

        let methods = domain.task_methods(VERIFY_GOAL).unwrap();
        let args: Vec<StateValue> = vec![
            "m_travel".into(),
            "loc".into(),
            "alice".into(),
            "park".into(),
            0.into(),
        ];
        assert_eq!(methods[0].refine(&state, &args), Some(vec![]));

        let args: Vec<StateValue> = vec![
            "m_travel".into(),
            "loc".into(),
            "alice".into(),
            "home_a".into(),
            0.into(),
        ];
        assert_eq!(methods[0].refine(&state, &args), None);
    }

    #[test]
    fn multigoal_methods_keep_order_and_dedup() {
        let mut domain = Domain::new("d");
        let split = MultigoalMethod::new("split", |_: &State, _: &Multigoal| {
            Some(vec![TodoItem::unigoal("loc", "alice", "park".into())])
        });
        domain.declare_multigoal_method(split.clone()).unwrap();
        domain
            .declare_multigoal_methods([split, MultigoalMethod::new("other", |_, _| None)])
            .unwrap();

        let names: Vec<&str> = domain
            .multigoal_methods()
            .iter()
            .map(MultigoalMethod::name)
            .collect();
        assert_eq!(names, ["split", "other"]);
    }
}
