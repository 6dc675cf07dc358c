//! Timer-free animation state machine.
//!
//! [`AnimationMachine`] holds the whole `{Idle, Running, Paused, Completed}`
//! logic; the controller only decides when `tick()` is called.

use serde::Serialize;

use super::planner::StepPlan;
use crate::models::enums::{AnimationStep, MachineState};

pub const MIN_SPEED_MS: u64 = 500;
pub const MAX_SPEED_MS: u64 = 3000;
pub const DEFAULT_SPEED_MS: u64 = 1000;

pub fn clamp_speed(speed_ms: u64) -> u64 {
    speed_ms.clamp(MIN_SPEED_MS, MAX_SPEED_MS)
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
pub struct AnimationState {
    pub machine_state: MachineState,
    pub current_step_index: usize,
    pub speed_ms: u64,
}

/// Outcome of a control command.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Transition {
    Applied,
    /// Not valid in the current state; nothing changed.
    Ignored,
    /// The plan is empty. Informational, not an error.
    NothingToAnimate,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum TickOutcome {
    Advanced(usize),
    Completed,
    /// Not running; the tick was dropped.
    Inactive,
}

/// Live step-indicator data for the view layer.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct StepSnapshot {
    pub step_index: usize,
    pub step: Option<AnimationStep>,
    pub total_steps: usize,
    pub machine_state: MachineState,
    pub speed_ms: u64,
    pub status_text: String,
}

#[derive(Clone, Debug)]
pub struct AnimationMachine {
    plan: StepPlan,
    state: AnimationState,
}

impl AnimationMachine {
    pub fn new(plan: StepPlan, speed_ms: u64) -> Self {
        Self {
            plan,
            state: AnimationState {
                machine_state: MachineState::Idle,
                current_step_index: 0,
                speed_ms: clamp_speed(speed_ms),
            },
        }
    }

    pub fn plan(&self) -> &StepPlan {
        &self.plan
    }

    pub fn state(&self) -> AnimationState {
        self.state
    }

    pub fn machine_state(&self) -> MachineState {
        self.state.machine_state
    }

    pub fn current_step(&self) -> Option<AnimationStep> {
        self.plan.get(self.state.current_step_index)
    }

    pub fn start(&mut self) -> Transition {
        if self.plan.is_empty() {
            return Transition::NothingToAnimate;
        }
        match self.state.machine_state {
            MachineState::Idle | MachineState::Completed => {
                self.state.machine_state = MachineState::Running;
                self.state.current_step_index = 0;
                Transition::Applied
            }
            MachineState::Running | MachineState::Paused => Transition::Ignored,
        }
    }

    pub fn tick(&mut self) -> TickOutcome {
        if self.state.machine_state != MachineState::Running {
            return TickOutcome::Inactive;
        }
        let Some(last) = self.plan.last_index() else {
            return TickOutcome::Inactive;
        };
        if self.state.current_step_index >= last {
            self.state.machine_state = MachineState::Completed;
            return TickOutcome::Completed;
        }
        self.state.current_step_index += 1;
        TickOutcome::Advanced(self.state.current_step_index)
    }

    pub fn pause(&mut self) -> Transition {
        if self.state.machine_state != MachineState::Running {
            return Transition::Ignored;
        }
        self.state.machine_state = MachineState::Paused;
        Transition::Applied
    }

    pub fn resume(&mut self) -> Transition {
        if self.state.machine_state != MachineState::Paused {
            return Transition::Ignored;
        }
        self.state.machine_state = MachineState::Running;
        Transition::Applied
    }

    pub fn reset(&mut self) -> Transition {
        self.state.machine_state = MachineState::Idle;
        self.state.current_step_index = 0;
        Transition::Applied
    }

    /// Manual single step from Idle or Paused; always lands in Paused.
    pub fn step_forward(&mut self) -> Transition {
        let Some(last) = self.plan.last_index() else {
            return Transition::NothingToAnimate;
        };
        match self.state.machine_state {
            MachineState::Idle | MachineState::Paused => {
                if self.state.current_step_index >= last {
                    return Transition::Ignored;
                }
                self.state.current_step_index += 1;
                self.state.machine_state = MachineState::Paused;
                Transition::Applied
            }
            MachineState::Running | MachineState::Completed => Transition::Ignored,
        }
    }

    pub fn change_speed(&mut self, multiplier: f64) -> Transition {
        if !multiplier.is_finite() || multiplier <= 0.0 {
            return Transition::Ignored;
        }
        let scaled = (self.state.speed_ms as f64 * multiplier).round();
        self.state.speed_ms = scaled.clamp(MIN_SPEED_MS as f64, MAX_SPEED_MS as f64) as u64;
        Transition::Applied
    }

    pub fn status_text(&self) -> String {
        let total = self.plan.len();
        if total == 0 {
            return "Nothing to animate: no tables found in the query".to_string();
        }
        let index = self.state.current_step_index;
        let describe = |i: usize| self.plan.describe(i).unwrap_or("");
        match self.state.machine_state {
            MachineState::Idle => format!("Ready: {total} steps planned"),
            MachineState::Running => format!("Step {} of {total}: {}", index + 1, describe(index)),
            MachineState::Paused => {
                format!("Paused at step {} of {total}: {}", index + 1, describe(index))
            }
            MachineState::Completed => format!("Completed: {}", describe(total - 1)),
        }
    }

    pub fn snapshot(&self) -> StepSnapshot {
        StepSnapshot {
            step_index: self.state.current_step_index,
            step: self.current_step(),
            total_steps: self.plan.len(),
            machine_state: self.state.machine_state,
            speed_ms: self.state.speed_ms,
            status_text: self.status_text(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::query_ast::analyze;

    fn machine(sql: &str) -> AnimationMachine {
        AnimationMachine::new(StepPlan::for_query(&analyze(sql)), DEFAULT_SPEED_MS)
    }

    #[test]
    fn four_step_plan_completes_on_fourth_tick() {
        let mut m = machine("SELECT id, name FROM users;");
        assert_eq!(m.start(), Transition::Applied);
        assert_eq!(m.state().current_step_index, 0);
        assert_eq!(m.tick(), TickOutcome::Advanced(1));
        assert_eq!(m.tick(), TickOutcome::Advanced(2));
        assert_eq!(m.tick(), TickOutcome::Advanced(3));
        assert_eq!(m.machine_state(), MachineState::Running);
        assert_eq!(m.tick(), TickOutcome::Completed);
        assert_eq!(m.machine_state(), MachineState::Completed);
        assert_eq!(m.state().current_step_index, 3);
        assert_eq!(m.tick(), TickOutcome::Inactive);
    }

    #[test]
    fn empty_plan_reports_nothing_to_animate() {
        let mut m = machine("not sql at all");
        assert_eq!(m.start(), Transition::NothingToAnimate);
        assert_eq!(m.step_forward(), Transition::NothingToAnimate);
        assert_eq!(m.machine_state(), MachineState::Idle);
        assert!(m.status_text().starts_with("Nothing to animate"));
        assert!(!m.status_text().starts_with("Completed"));
    }

    #[test]
    fn restart_from_completed_resets_index() {
        let mut m = machine("SELECT a FROM t");
        m.start();
        while m.tick() != TickOutcome::Completed {}
        assert_eq!(m.start(), Transition::Applied);
        assert_eq!(m.state().current_step_index, 0);
        assert_eq!(m.machine_state(), MachineState::Running);
    }

    #[test]
    fn pause_resume_keep_index() {
        let mut m = machine("SELECT a FROM t WHERE a = 1");
        m.start();
        m.tick();
        assert_eq!(m.pause(), Transition::Applied);
        assert_eq!(m.tick(), TickOutcome::Inactive);
        assert_eq!(m.start(), Transition::Ignored);
        assert_eq!(m.resume(), Transition::Applied);
        assert_eq!(m.state().current_step_index, 1);
        assert_eq!(m.resume(), Transition::Ignored);
    }

    #[test]
    fn step_forward_lands_in_paused_and_clamps() {
        let mut m = machine("SELECT a FROM t");
        assert_eq!(m.step_forward(), Transition::Applied);
        assert_eq!(m.machine_state(), MachineState::Paused);
        assert_eq!(m.state().current_step_index, 1);
        m.step_forward();
        m.step_forward();
        assert_eq!(m.state().current_step_index, 3);
        assert_eq!(m.step_forward(), Transition::Ignored);
        assert_eq!(m.state().current_step_index, 3);
        assert_eq!(m.machine_state(), MachineState::Paused);
    }

    #[test]
    fn step_forward_ignored_while_running() {
        let mut m = machine("SELECT a FROM t");
        m.start();
        assert_eq!(m.step_forward(), Transition::Ignored);
        assert_eq!(m.state().current_step_index, 0);
    }

    #[test]
    fn reset_from_any_state() {
        let mut m = machine("SELECT a FROM t");
        m.start();
        m.tick();
        m.pause();
        assert_eq!(m.reset(), Transition::Applied);
        assert_eq!(m.machine_state(), MachineState::Idle);
        assert_eq!(m.state().current_step_index, 0);
    }

    #[test]
    fn speed_is_clamped() {
        let mut m = machine("SELECT a FROM t");
        m.change_speed(0.5);
        assert_eq!(m.state().speed_ms, 500);
        m.change_speed(0.5);
        assert_eq!(m.state().speed_ms, MIN_SPEED_MS);
        m.change_speed(10.0);
        assert_eq!(m.state().speed_ms, MAX_SPEED_MS);
        assert_eq!(m.change_speed(f64::NAN), Transition::Ignored);
        assert_eq!(m.change_speed(0.0), Transition::Ignored);
        assert_eq!(m.state().speed_ms, MAX_SPEED_MS);
    }

    #[test]
    fn status_text_tracks_state() {
        let mut m = machine("SELECT a FROM t");
        assert_eq!(m.status_text(), "Ready: 4 steps planned");
        m.start();
        assert!(m.status_text().starts_with("Step 1 of 4"));
        m.pause();
        assert!(m.status_text().starts_with("Paused at step 1 of 4"));
        m.resume();
        while m.tick() != TickOutcome::Completed {}
        assert!(m.status_text().starts_with("Completed"));
    }
}
