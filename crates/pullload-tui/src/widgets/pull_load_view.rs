use std::cell::RefCell;
use std::fmt;
use std::rc::Rc;

use pullload_core::{Edge, PullLoadable, PullState, SentinelFrame, Size};

const SPINNER: [&str; 10] = ["⠋", "⠙", "⠹", "⠸", "⠼", "⠴", "⠦", "⠧", "⠇", "⠏"];

/// Default sentinel extent in cells
pub const DEFAULT_EXTENT: f64 = 2.0;

/// Called on every transition; a returned message replaces the default one
pub type Delegate = Box<dyn FnMut(&PullState, Edge) -> Option<String>>;

/// What the sentinel is currently showing
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Indicator {
    Idle,
    Pulling { past_threshold: bool },
    Loading,
}

struct Model {
    size: Size,
    indicator: Indicator,
    edge: Edge,
    message: String,
    spinner: usize,
    frame: Option<SentinelFrame>,
    delegate: Option<Delegate>,
}

/// Spinner plus message label
///
/// Cloning yields another handle to the same view: attach one clone to a
/// registry and keep the other for rendering.
#[derive(Clone)]
pub struct PullLoadView {
    model: Rc<RefCell<Model>>,
}

impl Default for PullLoadView {
    fn default() -> Self {
        Self::new()
    }
}

impl PullLoadView {
    pub fn new() -> Self {
        Self::with_size(Size::new(0.0, DEFAULT_EXTENT))
    }

    /// View for horizontal strips, `width` columns wide
    pub fn horizontal(width: f64) -> Self {
        Self::with_size(Size::new(width, 0.0))
    }

    pub fn with_size(size: Size) -> Self {
        Self {
            model: Rc::new(RefCell::new(Model {
                size,
                indicator: Indicator::Idle,
                edge: Edge::Leading,
                message: String::new(),
                spinner: 0,
                frame: None,
                delegate: None,
            })),
        }
    }

    pub fn set_delegate<F>(&self, delegate: F)
    where
        F: FnMut(&PullState, Edge) -> Option<String> + 'static,
    {
        self.model.borrow_mut().delegate = Some(Box::new(delegate));
    }

    /// Change the extent; takes effect on the host's next layout pass
    pub fn set_size(&self, size: Size) {
        self.model.borrow_mut().size = size;
    }

    pub fn set_message(&self, message: impl Into<String>) {
        self.model.borrow_mut().message = message.into();
    }

    pub fn message(&self) -> String {
        self.model.borrow().message.clone()
    }

    pub fn indicator(&self) -> Indicator {
        self.model.borrow().indicator
    }

    pub fn edge(&self) -> Edge {
        self.model.borrow().edge
    }

    /// Frame from the most recent layout pass
    pub fn frame(&self) -> Option<SentinelFrame> {
        self.model.borrow().frame
    }

    /// Current spinner glyph, blank unless loading
    pub fn glyph(&self) -> &'static str {
        let model = self.model.borrow();
        match model.indicator {
            Indicator::Loading => SPINNER[model.spinner % SPINNER.len()],
            Indicator::Pulling { past_threshold } => arrow(model.edge, past_threshold),
            Indicator::Idle => " ",
        }
    }

    /// Advance the spinner; returns whether anything changed
    pub fn tick_spinner(&self) -> bool {
        let mut model = self.model.borrow_mut();
        if model.indicator != Indicator::Loading {
            return false;
        }
        model.spinner = (model.spinner + 1) % SPINNER.len();
        true
    }
}

impl fmt::Debug for PullLoadView {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let model = self.model.borrow();
        f.debug_struct("PullLoadView")
            .field("size", &model.size)
            .field("indicator", &model.indicator)
            .field("edge", &model.edge)
            .field("message", &model.message)
            .finish()
    }
}

impl PullLoadable for PullLoadView {
    fn size(&self) -> Size {
        self.model.borrow().size
    }

    fn did_change_state(&mut self, state: &PullState, edge: Edge) {
        let delegate = {
            let mut model = self.model.borrow_mut();
            model.edge = edge;
            model.indicator = match state {
                PullState::Idle => Indicator::Idle,
                PullState::Pulling { .. } => Indicator::Pulling {
                    past_threshold: state.is_past_threshold(),
                },
                PullState::Loading(_) => Indicator::Loading,
            };
            if matches!(state, PullState::Loading(_)) {
                model.spinner = 0;
            }
            model.message = default_message(state, edge);
            model.delegate.take()
        };

        // The model is released while the delegate runs so it can use the
        // view handle itself.
        if let Some(mut delegate) = delegate {
            let message = delegate(state, edge);
            let mut model = self.model.borrow_mut();
            if let Some(message) = message {
                model.message = message;
            }
            if model.delegate.is_none() {
                model.delegate = Some(delegate);
            }
        }
    }

    fn did_layout(&mut self, frame: &SentinelFrame) {
        self.model.borrow_mut().frame = Some(*frame);
    }
}

fn arrow(edge: Edge, past_threshold: bool) -> &'static str {
    match (edge, past_threshold) {
        (Edge::Leading, false) | (Edge::Trailing, true) => "↓",
        (Edge::Leading, true) | (Edge::Trailing, false) => "↑",
    }
}

/// Message shown when no delegate overrides it
pub fn default_message(state: &PullState, edge: Edge) -> String {
    match (state, edge) {
        (PullState::Idle, _) => String::new(),
        (PullState::Pulling { offset, threshold }, Edge::Leading) => {
            if state.is_past_threshold() {
                format!("Release to refresh. offset: {:.0}, threshold: {:.0}", offset, threshold)
            } else {
                format!("Pull more. offset: {:.0}, threshold: {:.0}", offset, threshold)
            }
        }
        (PullState::Pulling { .. }, Edge::Trailing) => {
            if state.is_past_threshold() {
                "Release to load more".to_string()
            } else {
                "Pull to load more".to_string()
            }
        }
        (PullState::Loading(_), Edge::Leading) => "Updating...".to_string(),
        (PullState::Loading(_), Edge::Trailing) => "Loading more...".to_string(),
    }
}
