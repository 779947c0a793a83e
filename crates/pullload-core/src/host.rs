//! Host scroll container contract
//!
//! The core never owns a host. Hosts are shared as `Rc<RefCell<H>>` and each
//! attachment keeps only a `Weak` handle, upgraded and borrow-checked on every
//! access. Change notifications go through an explicit [`Subscription`]:
//! dropping it is how an attachment unsubscribes.

use std::fmt;

use tokio::sync::mpsc::{self, error::TryRecvError, UnboundedReceiver, UnboundedSender};
use uuid::Uuid;

use crate::geometry::{Axis, Edge, Insets, Point, Size};
use crate::layout::SentinelFrame;

/// Identity of a host container
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct HostId(Uuid);

impl HostId {
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for HostId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for HostId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "host-{}", self.0)
    }
}

/// Identity of one sentinel attachment
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct AttachmentId(Uuid);

impl AttachmentId {
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for AttachmentId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for AttachmentId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "sentinel-{}", self.0)
    }
}

/// Observable host property that changed
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HostChange {
    ContentOffset,
    ContentSize,
}

/// Fan-out of host change notifications
///
/// Hosts embed one of these and call [`ChangeNotifier::notify`] whenever
/// their content offset or content size changes.
#[derive(Debug)]
pub struct ChangeNotifier {
    host_id: HostId,
    subscribers: Vec<UnboundedSender<HostChange>>,
}

impl Default for ChangeNotifier {
    fn default() -> Self {
        Self::new()
    }
}

impl ChangeNotifier {
    pub fn new() -> Self {
        Self {
            host_id: HostId::new(),
            subscribers: Vec::new(),
        }
    }

    /// Identity of the host owning this notifier
    pub fn host_id(&self) -> HostId {
        self.host_id
    }

    /// Register a new listener
    pub fn subscribe(&mut self) -> Subscription {
        let (tx, rx) = mpsc::unbounded_channel();
        self.subscribers.push(tx);
        Subscription { rx }
    }

    /// Deliver a change to every live subscription
    ///
    /// Subscriptions that were dropped are pruned here.
    pub fn notify(&mut self, change: HostChange) {
        self.subscribers.retain(|tx| tx.send(change).is_ok());
    }

    /// Number of live subscriptions
    pub fn subscriber_count(&mut self) -> usize {
        self.subscribers.retain(|tx| !tx.is_closed());
        self.subscribers.len()
    }
}

/// Receiving half of a host subscription
///
/// Dropping it unsubscribes.
#[derive(Debug)]
pub struct Subscription {
    rx: UnboundedReceiver<HostChange>,
}

impl Subscription {
    /// Take every change queued since the last drain, in arrival order
    pub fn drain(&mut self) -> Vec<HostChange> {
        let mut changes = Vec::new();
        loop {
            match self.rx.try_recv() {
                Ok(change) => changes.push(change),
                Err(TryRecvError::Empty) | Err(TryRecvError::Disconnected) => break,
            }
        }
        changes
    }
}

/// Scroll container a sentinel can be attached to
pub trait ScrollHost {
    fn content_offset(&self) -> Point;

    fn set_content_offset(&mut self, offset: Point);

    fn content_size(&self) -> Size;

    /// Visible bounds of the container
    fn viewport_size(&self) -> Size;

    fn content_inset(&self) -> Insets;

    fn set_content_inset(&mut self, inset: Insets);

    /// Finger (or pointer) is actively moving the content
    fn is_dragging(&self) -> bool;

    /// Content is moving on its own after a release
    fn is_decelerating(&self) -> bool;

    /// Current scroll axis; grids may reconfigure it at any time
    fn axis(&self) -> Axis {
        Axis::Vertical
    }

    fn notifier(&mut self) -> &mut ChangeNotifier;

    fn host_id(&self) -> HostId;

    /// Put a sentinel into the render tree beneath the content
    fn insert_sentinel(&mut self, _id: AttachmentId, _edge: Edge) {}

    /// Position a previously inserted sentinel
    fn layout_sentinel(&mut self, _id: AttachmentId, _frame: SentinelFrame) {}

    fn remove_sentinel(&mut self, _id: AttachmentId) {}
}

/// Sentinel as the host's render tree sees it
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PlacedSentinel {
    pub id: AttachmentId,
    pub edge: Edge,
    pub frame: Option<SentinelFrame>,
}

/// In-memory scroll host
///
/// Holds plain geometry and records sentinel placement. Useful for headless
/// containers and as the geometry store of concrete adapters.
#[derive(Debug)]
pub struct MemoryHost {
    pub offset: Point,
    pub content: Size,
    pub viewport: Size,
    pub inset: Insets,
    pub axis: Axis,
    pub dragging: bool,
    pub decelerating: bool,
    /// Render order, index 0 drawn first (beneath everything else)
    pub sentinels: Vec<PlacedSentinel>,
    notifier: ChangeNotifier,
}

impl MemoryHost {
    pub fn new(axis: Axis, viewport: Size, content: Size) -> Self {
        Self {
            offset: Point::default(),
            content,
            viewport,
            inset: Insets::default(),
            axis,
            dragging: false,
            decelerating: false,
            sentinels: Vec::new(),
            notifier: ChangeNotifier::new(),
        }
    }

    pub fn vertical(viewport: Size, content: Size) -> Self {
        Self::new(Axis::Vertical, viewport, content)
    }

    pub fn horizontal(viewport: Size, content: Size) -> Self {
        Self::new(Axis::Horizontal, viewport, content)
    }

    /// Move the content and notify subscribers
    pub fn scroll_to(&mut self, offset: Point) {
        self.set_content_offset(offset);
    }

    /// Scroll along the current axis only
    pub fn scroll_along(&mut self, value: f64) {
        let offset = self.offset.with_along(self.axis, value);
        self.set_content_offset(offset);
    }

    /// Change the content size and notify subscribers
    pub fn resize_content(&mut self, content: Size) {
        self.content = content;
        self.notifier.notify(HostChange::ContentSize);
    }

    /// Frame most recently assigned to a sentinel
    pub fn sentinel_frame(&self, id: AttachmentId) -> Option<SentinelFrame> {
        self.sentinels
            .iter()
            .find(|s| s.id == id)
            .and_then(|s| s.frame)
    }
}

impl ScrollHost for MemoryHost {
    fn content_offset(&self) -> Point {
        self.offset
    }

    fn set_content_offset(&mut self, offset: Point) {
        self.offset = offset;
        self.notifier.notify(HostChange::ContentOffset);
    }

    fn content_size(&self) -> Size {
        self.content
    }

    fn viewport_size(&self) -> Size {
        self.viewport
    }

    fn content_inset(&self) -> Insets {
        self.inset
    }

    fn set_content_inset(&mut self, inset: Insets) {
        self.inset = inset;
    }

    fn is_dragging(&self) -> bool {
        self.dragging
    }

    fn is_decelerating(&self) -> bool {
        self.decelerating
    }

    fn axis(&self) -> Axis {
        self.axis
    }

    fn notifier(&mut self) -> &mut ChangeNotifier {
        &mut self.notifier
    }

    fn host_id(&self) -> HostId {
        self.notifier.host_id()
    }

    fn insert_sentinel(&mut self, id: AttachmentId, edge: Edge) {
        self.sentinels.retain(|s| s.id != id);
        self.sentinels.insert(
            0,
            PlacedSentinel {
                id,
                edge,
                frame: None,
            },
        );
    }

    fn layout_sentinel(&mut self, id: AttachmentId, frame: SentinelFrame) {
        if let Some(placed) = self.sentinels.iter_mut().find(|s| s.id == id) {
            placed.frame = Some(frame);
        }
    }

    fn remove_sentinel(&mut self, id: AttachmentId) {
        self.sentinels.retain(|s| s.id != id);
    }
}
