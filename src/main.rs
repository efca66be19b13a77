//! Demo: plan and act in the travel domain, with a taxi dispatcher
//! that only answers half the calls.

use interplan::domains::travel::{initial_state, travel_domain_with_unreliable_taxi};
use interplan::{PlannerBuilder, TodoItem};

fn main() -> Result<(), Box<dyn std::error::Error>> {
    println!("interplan {} - interleaved task and goal planning", interplan::VERSION);
    println!("=======================================================");

    let domain = travel_domain_with_unreliable_taxi()?;
    domain.display();

    let planner = PlannerBuilder::new()
        .with_domain(domain)
        .with_verbose_level(1)?
        .build()?;

    let todo = vec![TodoItem::task("travel", vec!["alice".into(), "park".into()])];

    let plan = planner.find_plan(initial_state(), todo.clone())?;
    match plan {
        Some(plan) => println!("Found a plan with {} actions.", plan.len()),
        None => println!("No plan found."),
    }

    let final_state = planner.run_lazy_lookahead(initial_state(), todo)?;
    final_state.display(Some("Final"));

    Ok(())
}
