//! Step planning and the animated walk through the planned steps.

pub mod controller;
pub mod machine;
pub mod planner;

pub use controller::AnimationController;
pub use machine::{AnimationMachine, AnimationState, StepSnapshot, TickOutcome, Transition};
pub use planner::StepPlan;
