//! SQL clause analyzer paired with an animated execution-step simulator.
//!
//! Raw text goes through [`query_ast::analyze`] into a
//! [`ParsedQuery`](models::structs::ParsedQuery); [`animation::StepPlan`]
//! derives the steps worth showing, [`animation::AnimationController`]
//! walks them on a timer, and [`highlight::resolve`] plus
//! [`diagram_layout::compute_layout`] turn the current step into render
//! hints. [`session::VisualizerSession`] wires the pieces together.

pub mod animation;
pub mod catalog;
pub mod config;
pub mod diagram_layout;
pub mod errors;
pub mod highlight;
pub mod models;
pub mod query_ast;
pub mod session;

pub use animation::{AnimationController, StepPlan, Transition};
pub use models::{AnimationStep, MachineState, ParsedQuery};
pub use session::VisualizerSession;
