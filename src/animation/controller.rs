//! Timer-driven wrapper around [`AnimationMachine`].
//!
//! The controller owns at most one tokio task that calls `tick()` every
//! `speed_ms`. Arming always cancels first. A cancelled task is aborted, and
//! every task also carries the generation it was armed under, so a tick that
//! is already past its await point when the controller moves on still finds
//! a newer generation and drops itself.

use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::Duration;

use tokio::runtime::Handle;
use tokio::task::JoinHandle;
use tokio::time::{Instant, MissedTickBehavior};

use super::machine::{AnimationMachine, AnimationState, StepSnapshot, TickOutcome, Transition};
use super::planner::StepPlan;
use crate::errors::AnimationError;
use crate::models::enums::{AnimationStep, MachineState};

struct Shared {
    machine: AnimationMachine,
    generation: u64,
}

pub struct AnimationController {
    shared: Arc<Mutex<Shared>>,
    plan: StepPlan,
    timer: Option<JoinHandle<()>>,
    runtime: Option<Handle>,
}

impl AnimationController {
    /// Uses the ambient tokio runtime, if any, for the timer.
    pub fn new(plan: StepPlan, speed_ms: u64) -> Self {
        Self::build(plan, speed_ms, Handle::try_current().ok())
    }

    pub fn with_runtime(plan: StepPlan, speed_ms: u64, runtime: Handle) -> Self {
        Self::build(plan, speed_ms, Some(runtime))
    }

    fn build(plan: StepPlan, speed_ms: u64, runtime: Option<Handle>) -> Self {
        let machine = AnimationMachine::new(plan.clone(), speed_ms);
        Self {
            shared: Arc::new(Mutex::new(Shared {
                machine,
                generation: 0,
            })),
            plan,
            timer: None,
            runtime,
        }
    }

    fn lock(&self) -> MutexGuard<'_, Shared> {
        lock_shared(&self.shared)
    }

    fn runtime(&self) -> Result<Handle, AnimationError> {
        self.runtime
            .clone()
            .or_else(|| Handle::try_current().ok())
            .ok_or(AnimationError::NoRuntime)
    }

    pub fn plan(&self) -> &StepPlan {
        &self.plan
    }

    pub fn state(&self) -> AnimationState {
        self.lock().machine.state()
    }

    pub fn machine_state(&self) -> MachineState {
        self.lock().machine.machine_state()
    }

    pub fn current_step_index(&self) -> usize {
        self.lock().machine.state().current_step_index
    }

    pub fn current_step(&self) -> Option<AnimationStep> {
        self.lock().machine.current_step()
    }

    pub fn status_text(&self) -> String {
        self.lock().machine.status_text()
    }

    pub fn snapshot(&self) -> StepSnapshot {
        self.lock().machine.snapshot()
    }

    /// True while a timer task is alive.
    pub fn is_timer_armed(&self) -> bool {
        self.timer.as_ref().is_some_and(|t| !t.is_finished())
    }

    /// An empty plan reports [`Transition::NothingToAnimate`] without needing
    /// a runtime.
    pub fn start(&mut self) -> Result<Transition, AnimationError> {
        if self.plan.is_empty() {
            log::info!("start requested but there is nothing to animate");
            return Ok(Transition::NothingToAnimate);
        }
        let runtime = self.runtime()?;
        let outcome = self.lock().machine.start();
        match outcome {
            Transition::Applied => {
                log::debug!("animation started ({} steps)", self.plan.len());
                self.arm(&runtime);
            }
            Transition::Ignored | Transition::NothingToAnimate => {
                log::warn!("start ignored in state {:?}", self.machine_state())
            }
        }
        Ok(outcome)
    }

    pub fn pause(&mut self) -> Transition {
        let outcome = self.lock().machine.pause();
        if outcome == Transition::Applied {
            self.cancel();
            log::debug!("animation paused at step {}", self.current_step_index());
        } else {
            log::warn!("pause ignored in state {:?}", self.machine_state());
        }
        outcome
    }

    pub fn resume(&mut self) -> Result<Transition, AnimationError> {
        let runtime = self.runtime()?;
        let outcome = self.lock().machine.resume();
        if outcome == Transition::Applied {
            log::debug!("animation resumed at step {}", self.current_step_index());
            self.arm(&runtime);
        } else {
            log::warn!("resume ignored in state {:?}", self.machine_state());
        }
        Ok(outcome)
    }

    pub fn reset(&mut self) -> Transition {
        self.cancel();
        log::debug!("animation reset");
        self.lock().machine.reset()
    }

    pub fn step_forward(&mut self) -> Transition {
        let outcome = self.lock().machine.step_forward();
        match outcome {
            Transition::Applied => {
                self.cancel();
                log::debug!("stepped forward to step {}", self.current_step_index());
            }
            Transition::Ignored => log::debug!("step forward ignored"),
            Transition::NothingToAnimate => {
                log::info!("step forward requested but there is nothing to animate")
            }
        }
        outcome
    }

    /// Scales the tick interval; a running timer is re-armed at the new
    /// interval without touching the step index.
    pub fn change_speed(&mut self, multiplier: f64) -> Result<Transition, AnimationError> {
        let running = self.machine_state() == MachineState::Running;
        let runtime = if running { Some(self.runtime()?) } else { None };

        let (outcome, before, after) = {
            let mut guard = self.lock();
            let before = guard.machine.state().speed_ms;
            let outcome = guard.machine.change_speed(multiplier);
            (outcome, before, guard.machine.state().speed_ms)
        };

        if outcome == Transition::Applied {
            log::debug!("speed changed {before}ms -> {after}ms");
            if let Some(runtime) = runtime
                && after != before
            {
                self.arm(&runtime);
            }
        } else {
            log::warn!("speed multiplier {multiplier} ignored");
        }
        Ok(outcome)
    }

    fn cancel(&mut self) {
        {
            let mut guard = self.lock();
            guard.generation = guard.generation.wrapping_add(1);
        }
        if let Some(task) = self.timer.take() {
            task.abort();
        }
    }

    fn arm(&mut self, runtime: &Handle) {
        self.cancel();
        let (generation, speed_ms) = {
            let guard = self.lock();
            (guard.generation, guard.machine.state().speed_ms)
        };
        let period = Duration::from_millis(speed_ms);
        let shared = Arc::clone(&self.shared);

        self.timer = Some(runtime.spawn(async move {
            let mut interval = tokio::time::interval_at(Instant::now() + period, period);
            interval.set_missed_tick_behavior(MissedTickBehavior::Delay);
            loop {
                interval.tick().await;
                if !tick_if_current(&shared, generation) {
                    break;
                }
            }
        }));
        log::trace!("timer armed: generation={generation} period={speed_ms}ms");
    }
}

impl Drop for AnimationController {
    fn drop(&mut self) {
        self.cancel();
    }
}

fn lock_shared(shared: &Mutex<Shared>) -> MutexGuard<'_, Shared> {
    shared.lock().unwrap_or_else(PoisonError::into_inner)
}

/// One timer tick. Returns false when the timer should stop.
fn tick_if_current(shared: &Mutex<Shared>, generation: u64) -> bool {
    let mut guard = lock_shared(shared);
    if guard.generation != generation {
        log::trace!("stale tick dropped (armed {generation}, current {})", guard.generation);
        return false;
    }
    match guard.machine.tick() {
        TickOutcome::Advanced(index) => {
            log::trace!("tick -> step {index}");
            true
        }
        TickOutcome::Completed => {
            log::debug!("animation completed");
            false
        }
        TickOutcome::Inactive => false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::query_ast::analyze;

    #[test]
    fn start_without_runtime_fails_cleanly() {
        let plan = StepPlan::for_query(&analyze("SELECT a FROM t"));
        let mut ctrl = AnimationController::new(plan, 1000);
        assert_eq!(ctrl.start(), Err(AnimationError::NoRuntime));
        assert_eq!(ctrl.machine_state(), MachineState::Idle);
        assert!(!ctrl.is_timer_armed());
    }

    #[test]
    fn empty_plan_start_needs_no_runtime() {
        let plan = StepPlan::for_query(&analyze("SELECT 1"));
        let mut ctrl = AnimationController::new(plan, 1000);
        assert_eq!(ctrl.start(), Ok(Transition::NothingToAnimate));
        assert_eq!(ctrl.machine_state(), MachineState::Idle);
        assert!(!ctrl.is_timer_armed());
        assert!(ctrl.status_text().starts_with("Nothing to animate"));
    }

    #[test]
    fn stale_generation_never_ticks() {
        let plan = StepPlan::for_query(&analyze("SELECT a FROM t"));
        let mut machine = AnimationMachine::new(plan, 1000);
        machine.start();
        let shared = Mutex::new(Shared {
            machine,
            generation: 3,
        });
        assert!(!tick_if_current(&shared, 2));
        assert_eq!(lock_shared(&shared).machine.state().current_step_index, 0);
        assert!(tick_if_current(&shared, 3));
        assert_eq!(lock_shared(&shared).machine.state().current_step_index, 1);
    }
}
