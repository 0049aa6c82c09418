//! Agent
//!
//! The learning loop: act on a plan (or a heuristic when planning comes
//! back empty), observe the real transition, then learn from the surprise.
//!
//! ## Learning Step
//!
//! ```text
//! update model → store episode → [hypothesis search] → [failure diagnosis]
//! ```
//!
//! Hypothesis search runs when the surprise is large or the controller is
//! thinking deeply. Diagnosis runs when the error crosses the audit
//! threshold, against a fresh prediction that already includes any rule the
//! hypothesis step just accepted.

use serde::Serialize;
use tracing::{debug, info};

use physis_common::{Action, Goal, ProposedRule, Result, Rule, RuleSource, Simulator, State, TaskId};

use crate::config::{LearningSettings, PhysisConfig};
use crate::domain::controller::{ComputeController, ThinkingLevel};
use crate::domain::diagnosis::{FailureDiagnoser, FailureMode};
use crate::domain::hypothesis::HypothesisEngine;
use crate::domain::model::PredictiveModel;
use crate::domain::planner::Planner;
use crate::infra::episode_store::{EpisodeMemory, SkillLibrary};

/// Chosen action and what the model expects it to do
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Decision {
    pub action: Action,
    /// Present when the action came from a plan
    pub predicted: Option<State>,
}

/// What one learning step changed
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Lesson {
    /// Prediction error of the observed transition
    pub surprise: f64,
    /// Rules newly accepted into the store, in acceptance order
    pub learned: Vec<Rule>,
    /// Set when failure diagnosis ran
    pub diagnosis: Option<FailureMode>,
}

/// Outcome of one episode
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct EpisodeReport {
    pub task_id: TaskId,
    pub success: bool,
    pub steps: usize,
    pub actions: Vec<Action>,
}

/// Serializable snapshot of the agent
#[derive(Debug, Clone, Serialize)]
pub struct AgentStats {
    pub episodes: usize,
    /// Rules accepted from hypothesis search
    pub rules_learned: usize,
    /// Rules accepted from failure diagnosis
    pub rules_from_audit: usize,
    pub rules: Vec<Rule>,
    pub memory_episodes: usize,
    pub skills: usize,
    pub failures_diagnosed: usize,
    pub thinking_level: ThinkingLevel,
    pub confidence: f64,
}

pub struct Agent {
    model: PredictiveModel,
    hypotheses: HypothesisEngine,
    diagnoser: FailureDiagnoser,
    planner: Planner,
    controller: ComputeController,
    memory: EpisodeMemory,
    skills: SkillLibrary,
    learning: LearningSettings,
    max_steps: usize,
    /// Goal of the most recent `act`, recorded with diagnoses
    current_goal: Option<Goal>,
    episode_count: usize,
    rules_learned: usize,
    rules_from_audit: usize,
}

impl Agent {
    pub fn new(config: &PhysisConfig) -> Self {
        Self {
            model: PredictiveModel::new(config.model.clone()),
            hypotheses: HypothesisEngine::new(&config.learning),
            diagnoser: FailureDiagnoser::new(&config.learning),
            planner: Planner::new(config.planner.clone()),
            controller: ComputeController::new(&config.learning),
            memory: EpisodeMemory::new(config.learning.episode_capacity),
            skills: SkillLibrary::new(),
            learning: config.learning.clone(),
            max_steps: config.demo.max_steps,
            current_goal: None,
            episode_count: 0,
            rules_learned: 0,
            rules_from_audit: 0,
        }
    }

    /// Choose the next action toward `goal`
    ///
    /// The thinking level is refreshed from the model's confidence in a
    /// `wait` probe, and sets the planning depth.
    pub fn act(&mut self, state: &State, goal: &Goal) -> Decision {
        self.current_goal = Some(*goal);

        let probe = self.model.predict(state, Action::Wait);
        let level = self.controller.adjust_thinking(probe.confidence);
        let depth = self.controller.planning_depth();

        let plan = self.planner.plan(&mut self.model, &self.skills, state, goal, depth);
        match plan.first() {
            Some(&action) => {
                let predicted = self.model.predict(state, action).state;
                debug!(action = %action, level = ?level, plan_len = plan.len(), "Acting on plan");
                Decision {
                    action,
                    predicted: Some(predicted),
                }
            }
            None => {
                let action = heuristic_action(state, goal);
                debug!(action = %action, level = ?level, "Empty plan, acting on heuristic");
                Decision {
                    action,
                    predicted: None,
                }
            }
        }
    }

    /// Learn from one observed transition
    pub fn learn_from_experience<S: Simulator + ?Sized>(
        &mut self,
        state: &State,
        action: Action,
        next_state: &State,
        world: &S,
    ) -> Lesson {
        let surprise = self.model.update_from_experience(state, action, next_state);
        self.memory
            .store_episode(*state, action, *next_state, surprise < self.learning.success_error);

        let mut lesson = Lesson {
            surprise,
            ..Lesson::default()
        };

        if self.controller.should_generate_hypotheses(surprise) {
            let best = self
                .hypotheses
                .investigate(self.model.rules(), state, action, surprise, world);
            if let Some(best) = best {
                if self.model.learn_rule(ProposedRule::new(best.rule, RuleSource::Hypothesis)) {
                    self.rules_learned += 1;
                    info!(rule = %best.rule, gain = best.gain, "Learned rule");
                    lesson.learned.push(best.rule);
                }
            }
        }

        if self.diagnoser.should_activate(surprise) {
            let predicted = self.model.predict(state, action).state;
            let (mode, rule) = self.diagnoser.analyze_failure(
                state,
                self.current_goal.as_ref(),
                next_state,
                &predicted,
                action,
            );
            lesson.diagnosis = Some(mode);

            if let Some(rule) = rule {
                if self.model.learn_rule(ProposedRule::new(rule, RuleSource::Audit)) {
                    self.rules_from_audit += 1;
                    info!(rule = %rule, diagnosis = %mode, "Self-audit added rule");
                    lesson.learned.push(rule);
                }
            }
        }

        lesson
    }

    /// Run one episode of `task_id` against the real simulator
    ///
    /// Success is judged at `tolerance`, or the goal's own when not given.
    /// On success the executed action sequence becomes the task's skill.
    pub fn run_episode<S: Simulator + ?Sized>(
        &mut self,
        world: &S,
        task_id: TaskId,
        max_steps: usize,
        tolerance: Option<f64>,
    ) -> Result<EpisodeReport> {
        let mut state = world.reset(task_id)?;
        let goal = world.goal(task_id)?;
        let mut actions = Vec::new();
        let mut success = false;

        for _ in 0..max_steps {
            let decision = self.act(&state, &goal);
            let next_state = world.step(&state, decision.action);
            self.learn_from_experience(&state, decision.action, &next_state, world);
            actions.push(decision.action);
            state = next_state;

            if world.goal_achieved(&state, task_id, tolerance)? {
                success = true;
                break;
            }
        }

        self.episode_count += 1;
        if success {
            self.skills.store_skill(task_id, &actions);
        }
        debug!(task = %task_id, success, steps = actions.len(), "Episode finished");

        Ok(EpisodeReport {
            task_id,
            success,
            steps: actions.len(),
            actions,
        })
    }

    /// Attempt a task with everything learned so far
    pub fn transfer_skill<S: Simulator + ?Sized>(&mut self, world: &S, task_id: TaskId) -> Result<EpisodeReport> {
        let report = self.run_episode(world, task_id, self.max_steps, None)?;
        info!(task = %task_id, success = report.success, steps = report.steps, "Transfer attempt");
        Ok(report)
    }

    pub fn stats(&self) -> AgentStats {
        AgentStats {
            episodes: self.episode_count,
            rules_learned: self.rules_learned,
            rules_from_audit: self.rules_from_audit,
            rules: self.model.rules().get_rules(),
            memory_episodes: self.memory.len(),
            skills: self.skills.len(),
            failures_diagnosed: self.diagnoser.failures(),
            thinking_level: self.controller.thinking_level(),
            confidence: self.model.confidence(),
        }
    }

    pub fn model(&self) -> &PredictiveModel {
        &self.model
    }

    pub fn memory(&self) -> &EpisodeMemory {
        &self.memory
    }

    pub fn skills(&self) -> &SkillLibrary {
        &self.skills
    }
}

impl Default for Agent {
    fn default() -> Self {
        Self::new(&PhysisConfig::default())
    }
}

/// Fallback when planning finds nothing
///
/// Steer toward the goal's x when off by more than 0.5, else heat or cool
/// toward the goal phase, else wait.
pub fn heuristic_action(state: &State, goal: &Goal) -> Action {
    if let Some(target) = goal.position {
        if (state.x - target.x).abs() > 0.5 {
            return if target.x > state.x {
                Action::PushRight
            } else {
                Action::PushLeft
            };
        }
    }
    if let Some(phase) = goal.phase {
        if state.phase != phase {
            return if phase.index() > state.phase.index() {
                Action::Heat
            } else {
                Action::Cool
            };
        }
    }
    Action::Wait
}
