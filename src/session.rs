//! One editor's worth of visualiser state.
//!
//! A session owns the current text, its extraction result, the step plan,
//! the table layout and the animation controller. New text replaces all of
//! them at once; dropping the old controller cancels its timer, so no tick
//! can land on a plan that no longer exists.

use serde::Serialize;
use tokio::runtime::Handle;

use crate::animation::{AnimationController, StepPlan, StepSnapshot, Transition};
use crate::config::VisualizerPreferences;
use crate::diagram_layout::{LayoutDimensions, TableLayout, compute_layout};
use crate::errors::AnimationError;
use crate::highlight::{self, Highlights};
use crate::models::enums::MachineState;
use crate::models::structs::ParsedQuery;
use crate::query_ast;

/// Everything the view layer needs for one redraw.
#[derive(Debug, Serialize)]
pub struct SessionView<'a> {
    pub query: &'a ParsedQuery,
    pub plan: &'a StepPlan,
    pub layout: &'a TableLayout,
    pub snapshot: StepSnapshot,
    pub highlights: Highlights,
}

pub struct VisualizerSession {
    text: String,
    query: ParsedQuery,
    controller: AnimationController,
    layout: TableLayout,
    canvas_width: f32,
    dims: LayoutDimensions,
    runtime: Option<Handle>,
}

impl VisualizerSession {
    pub fn new(prefs: &VisualizerPreferences) -> Self {
        Self::build(prefs, Handle::try_current().ok())
    }

    pub fn with_runtime(prefs: &VisualizerPreferences, runtime: Handle) -> Self {
        Self::build(prefs, Some(runtime))
    }

    fn build(prefs: &VisualizerPreferences, runtime: Option<Handle>) -> Self {
        let query = ParsedQuery::default();
        let controller = new_controller(StepPlan::default(), prefs.speed_ms, runtime.clone());
        Self {
            text: String::new(),
            query,
            controller,
            layout: TableLayout::default(),
            canvas_width: prefs.canvas_width,
            dims: prefs.layout_dimensions(),
            runtime,
        }
    }

    /// Replaces the query text. Identical text is a no-op; anything else
    /// retires the current plan and controller (cancelling its timer) and
    /// starts over in Idle, keeping the chosen speed.
    pub fn set_query(&mut self, text: &str) {
        if text == self.text {
            return;
        }
        let speed_ms = self.controller.state().speed_ms;
        let query = query_ast::analyze(text);
        let plan = StepPlan::for_query(&query);
        log::info!("query replaced: {} tables, {} planned steps", query.tables.len(), plan.len());

        self.controller = new_controller(plan, speed_ms, self.runtime.clone());
        self.layout = compute_layout(&query.tables, self.canvas_width, &self.dims);
        self.query = query;
        self.text = text.to_string();
    }

    pub fn text(&self) -> &str {
        &self.text
    }

    pub fn query(&self) -> &ParsedQuery {
        &self.query
    }

    pub fn plan(&self) -> &StepPlan {
        self.controller.plan()
    }

    pub fn layout(&self) -> &TableLayout {
        &self.layout
    }

    pub fn canvas_width(&self) -> f32 {
        self.canvas_width
    }

    pub fn set_canvas_width(&mut self, width: f32) {
        if width == self.canvas_width {
            return;
        }
        self.canvas_width = width;
        self.layout = compute_layout(&self.query.tables, width, &self.dims);
    }

    pub fn controller(&self) -> &AnimationController {
        &self.controller
    }

    pub fn snapshot(&self) -> StepSnapshot {
        self.controller.snapshot()
    }

    /// Highlights for the step on screen; nothing is active before the
    /// animation has been started or stepped.
    pub fn highlights(&self) -> Highlights {
        match (self.controller.machine_state(), self.controller.current_step()) {
            (MachineState::Idle, _) | (_, None) => Highlights::none(&self.query),
            (_, Some(step)) => highlight::resolve(step, &self.query),
        }
    }

    pub fn view(&self) -> SessionView<'_> {
        SessionView {
            query: &self.query,
            plan: self.controller.plan(),
            layout: &self.layout,
            snapshot: self.snapshot(),
            highlights: self.highlights(),
        }
    }

    pub fn start(&mut self) -> Result<Transition, AnimationError> {
        self.controller.start()
    }

    pub fn pause(&mut self) -> Transition {
        self.controller.pause()
    }

    pub fn resume(&mut self) -> Result<Transition, AnimationError> {
        self.controller.resume()
    }

    pub fn reset(&mut self) -> Transition {
        self.controller.reset()
    }

    pub fn step_forward(&mut self) -> Transition {
        self.controller.step_forward()
    }

    pub fn change_speed(&mut self, multiplier: f64) -> Result<Transition, AnimationError> {
        self.controller.change_speed(multiplier)
    }
}

fn new_controller(plan: StepPlan, speed_ms: u64, runtime: Option<Handle>) -> AnimationController {
    match runtime {
        Some(handle) => AnimationController::with_runtime(plan, speed_ms, handle),
        None => AnimationController::new(plan, speed_ms),
    }
}
