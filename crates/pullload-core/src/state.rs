//! Pull/load state and the sentinel capability

use std::cell::{Cell, RefCell};
use std::fmt;
use std::rc::Rc;

use crate::geometry::{Edge, Size};
use crate::layout::SentinelFrame;

/// Single-shot callback ending a loading state
///
/// Clones share one guard: whichever clone is invoked first runs the
/// action, every later call on any clone does nothing.
#[derive(Clone)]
pub struct Completion {
    inner: Rc<CompletionInner>,
}

struct CompletionInner {
    fired: Cell<bool>,
    action: RefCell<Option<Box<dyn FnOnce()>>>,
}

impl Completion {
    pub fn new<F>(action: F) -> Self
    where
        F: FnOnce() + 'static,
    {
        Self {
            inner: Rc::new(CompletionInner {
                fired: Cell::new(false),
                action: RefCell::new(Some(Box::new(action))),
            }),
        }
    }

    /// Completion that does nothing when invoked
    pub fn noop() -> Self {
        Self::new(|| {})
    }

    /// Signal that the caller's work is done
    pub fn complete(&self) {
        if self.inner.fired.replace(true) {
            return;
        }
        let action = self.inner.action.borrow_mut().take();
        if let Some(action) = action {
            action();
        }
    }

    pub fn is_completed(&self) -> bool {
        self.inner.fired.get()
    }
}

impl fmt::Debug for Completion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Completion")
            .field("completed", &self.is_completed())
            .finish()
    }
}

/// State of one sentinel
#[derive(Debug, Clone, Default)]
pub enum PullState {
    /// Nothing to show
    #[default]
    Idle,
    /// Content pulled past the edge
    ///
    /// `offset` is the signed distance (always < 0). `threshold` is the
    /// distance at which the release message should appear.
    Pulling { offset: f64, threshold: f64 },
    /// Caller's work is running; invoke the completion when it is done
    Loading(Completion),
}

impl PullState {
    pub fn is_idle(&self) -> bool {
        matches!(self, PullState::Idle)
    }

    pub fn is_loading(&self) -> bool {
        matches!(self, PullState::Loading(_))
    }

    /// Pulled far enough that releasing would load
    pub fn is_past_threshold(&self) -> bool {
        match self {
            PullState::Pulling { offset, threshold } => offset < threshold,
            _ => false,
        }
    }
}

/// Loading payloads are opaque, so any two loading states are equal
impl PartialEq for PullState {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (PullState::Idle, PullState::Idle) => true,
            (PullState::Loading(_), PullState::Loading(_)) => true,
            (
                PullState::Pulling { offset, threshold },
                PullState::Pulling {
                    offset: other_offset,
                    threshold: other_threshold,
                },
            ) => offset == other_offset && threshold == other_threshold,
            _ => false,
        }
    }
}

/// Visual side of a sentinel
///
/// Implementors render the pull/release/loading affordance. The core only
/// ever talks to a sentinel through this trait.
pub trait PullLoadable {
    /// Intrinsic size; the component along the scroll axis is the extent
    /// used both as trigger threshold and as reserved inset
    fn size(&self) -> Size;

    /// Called on every state transition
    fn did_change_state(&mut self, state: &PullState, edge: Edge);

    /// Called after the sentinel has been positioned
    fn did_layout(&mut self, _frame: &SentinelFrame) {}
}
