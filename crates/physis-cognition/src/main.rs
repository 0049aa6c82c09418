//! Physis Demo Binary
//!
//! Audits task reachability, runs the learning phase on the landing task,
//! then checks planning and transfer to the vaporize task.

use anyhow::Result;
use tracing::{info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use physis_cognition::{
    Agent, PhysisConfig, ReachabilityOutcome, ReachabilityValidator, PHYSIS_VERSION,
};
use physis_common::Simulator;
use physis_world::{PhysicsWorld, LAND_TASK, VAPORIZE_TASK};

fn main() -> Result<()> {
    // Initialize tracing
    tracing_subscriber::registry()
        .with(tracing_subscriber::fmt::layer())
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    info!("Starting Physis demo v{}", PHYSIS_VERSION);

    // Load configuration
    let config = PhysisConfig::load()?;
    info!("Loaded configuration: {:?}", config);

    let world = PhysicsWorld::new();
    let validator = ReachabilityValidator::new(&world);
    let tolerance = config.demo.evaluation_tolerance;

    // Reachability audit
    for tol in [0.50, tolerance] {
        let outcome = validator.check(
            LAND_TASK,
            config.validator.max_steps,
            Some(tol),
            config.validator.max_expansions,
        )?;
        match &outcome {
            ReachabilityOutcome::Reachable { witness, expansions } => {
                let replayed = validator.audit_plan(LAND_TASK, witness, Some(tol))?;
                info!(tol, expansions, witness = ?witness, replayed, "Landing task reachable");
            }
            ReachabilityOutcome::Unreachable { expansions } => {
                info!(tol, expansions, "Landing task unreachable within the step budget");
            }
            ReachabilityOutcome::BudgetExhausted { expansions } => {
                warn!(tol, expansions, "Reachability inconclusive");
            }
        }
    }

    // Learning phase
    let mut agent = Agent::new(&config);
    let mut successes = 0;
    for episode in 0..config.demo.episodes {
        let report = agent.run_episode(&world, LAND_TASK, config.demo.max_steps, Some(tolerance))?;
        if report.success {
            successes += 1;
        }
        if episode % 10 == 0 {
            let stats = agent.stats();
            info!(
                episode,
                rules_learned = stats.rules_learned,
                memory_episodes = stats.memory_episodes,
                "Learning progress"
            );
        }
    }
    info!(successes, episodes = config.demo.episodes, tolerance, "Learning phase complete");

    // Planning test
    let goal = world.goal(LAND_TASK)?;
    let mut state = world.reset(LAND_TASK)?;
    let mut reached = None;
    for step in 1..=config.demo.max_steps {
        let decision = agent.act(&state, &goal);
        state = world.step(&state, decision.action);
        if world.goal_achieved(&state, LAND_TASK, Some(tolerance))? {
            reached = Some(step);
            break;
        }
    }
    match reached {
        Some(steps) => info!(steps, tolerance, "Planning succeeded"),
        None => warn!(steps = config.demo.max_steps, tolerance, "Planning failed"),
    }

    // Planner audit against the validator
    if let Some(skill) = agent.skills().skill(LAND_TASK) {
        let holds = validator.audit_plan(LAND_TASK, &skill, Some(tolerance))?;
        info!(len = skill.len(), holds, "Stored landing skill audited");
    }

    // Transfer test
    let report = agent.transfer_skill(&world, VAPORIZE_TASK)?;
    info!(success = report.success, steps = report.steps, "Transfer test finished");

    let stats = agent.stats();
    println!("{}", serde_json::to_string_pretty(&stats)?);

    Ok(())
}
