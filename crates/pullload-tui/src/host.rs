//! Terminal list viewport acting as a scroll host
//!
//! Units are cells: rows for vertical lists, columns for horizontal strips.
//! Dragging may move the content past either end; after a release the
//! content eases back into its resting range one `tick` at a time and the
//! host reports itself as decelerating meanwhile.

use std::ops::Range;

use pullload_core::{
    Axis, AttachmentId, ChangeNotifier, Edge, HostId, Insets, MemoryHost, Point,
    ScrollHost, SentinelFrame, Size,
};

/// Settled once closer than this to the resting position
const SNAP_DISTANCE: f64 = 0.4;

#[derive(Debug)]
pub struct ListHost {
    geometry: MemoryHost,
    /// Fraction of the remaining distance covered per tick
    settle_speed: f64,
}

impl ListHost {
    /// Vertical list of `rows` items, each one cell high
    pub fn new(viewport: Size, rows: usize) -> Self {
        Self::with_axis(Axis::Vertical, viewport, rows)
    }

    pub fn with_axis(axis: Axis, viewport: Size, items: usize) -> Self {
        let content = content_size(axis, viewport, items);
        Self {
            geometry: MemoryHost::new(axis, viewport, content),
            settle_speed: 0.35,
        }
    }

    /// Set how quickly a released list settles (clamped to 0.05..=0.95)
    pub fn set_settle_speed(&mut self, speed: f64) {
        self.settle_speed = speed.clamp(0.05, 0.95);
    }

    pub fn geometry(&self) -> &MemoryHost {
        &self.geometry
    }

    pub fn offset(&self) -> f64 {
        self.geometry.offset.along(self.geometry.axis)
    }

    /// Number of items in the list
    pub fn set_len(&mut self, items: usize) {
        let content = content_size(self.geometry.axis, self.geometry.viewport, items);
        self.geometry.resize_content(content);
    }

    pub fn len(&self) -> usize {
        self.geometry.content.along(self.geometry.axis).max(0.0) as usize
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Terminal area changed
    pub fn set_viewport(&mut self, viewport: Size) {
        let items = self.len();
        self.geometry.viewport = viewport;
        let content = content_size(self.geometry.axis, viewport, items);
        self.geometry.resize_content(content);
    }

    /// Switch between vertical and horizontal scrolling
    pub fn set_axis(&mut self, axis: Axis) {
        if axis == self.geometry.axis {
            return;
        }
        let items = self.len();
        self.geometry.axis = axis;
        self.geometry.offset = Point::default();
        let content = content_size(axis, self.geometry.viewport, items);
        self.geometry.resize_content(content);
    }

    /// Resting range of the offset along the axis
    pub fn rest_range(&self) -> (f64, f64) {
        let axis = self.geometry.axis;
        let inset = self.geometry.inset;
        let min = -inset.side(axis, Edge::Leading);
        let end = self.geometry.content.along(axis) + inset.side(axis, Edge::Trailing)
            - self.geometry.viewport.along(axis);
        (min, end.max(min))
    }

    /// Move the content under an active drag; may leave the resting range
    pub fn drag_by(&mut self, delta: f64) {
        self.geometry.dragging = true;
        self.geometry.decelerating = false;
        let offset = self.offset() + delta;
        self.geometry.scroll_along(offset);
    }

    /// End a drag; content starts settling if it sits outside its range
    pub fn release(&mut self) {
        if !self.geometry.dragging {
            return;
        }
        self.geometry.dragging = false;
        let (min, max) = self.rest_range();
        let offset = self.offset();
        self.geometry.decelerating = offset < min || offset > max;
        // Re-announce the offset so observers see the new flags.
        self.geometry.scroll_along(offset);
    }

    /// Regular scrolling, clamped to the resting range
    pub fn scroll_by(&mut self, delta: f64) {
        let (min, max) = self.rest_range();
        let offset = (self.offset() + delta).clamp(min, max);
        if offset != self.offset() {
            self.geometry.scroll_along(offset);
        }
    }

    pub fn scroll_to_start(&mut self) {
        let (min, _) = self.rest_range();
        self.geometry.scroll_along(min);
    }

    pub fn scroll_to_end(&mut self) {
        let (_, max) = self.rest_range();
        self.geometry.scroll_along(max);
    }

    /// Advance settling by one frame; returns whether it is still moving
    pub fn tick(&mut self) -> bool {
        if self.geometry.dragging || !self.geometry.decelerating {
            return false;
        }
        let (min, max) = self.rest_range();
        let offset = self.offset();
        let target = offset.clamp(min, max);
        let remaining = target - offset;

        if remaining.abs() < SNAP_DISTANCE {
            self.geometry.decelerating = false;
            self.geometry.scroll_along(target);
            return false;
        }
        self.geometry.scroll_along(offset + remaining * self.settle_speed);
        true
    }

    pub fn is_settling(&self) -> bool {
        self.geometry.decelerating
    }

    /// Items at least partly inside the viewport
    pub fn visible_range(&self) -> Range<usize> {
        let axis = self.geometry.axis;
        let start = self.offset().max(0.0).floor() as usize;
        let end = (self.offset() + self.geometry.viewport.along(axis)).ceil().max(0.0) as usize;
        start.min(self.len())..end.min(self.len())
    }

    /// Viewport position of an item, or `None` when it is off screen
    pub fn item_position(&self, index: usize) -> Option<u16> {
        let axis = self.geometry.axis;
        let position = index as f64 - self.offset();
        if position < 0.0 || position >= self.geometry.viewport.along(axis) {
            return None;
        }
        Some(position.floor() as u16)
    }

    /// Frame assigned to a sentinel by the last layout pass
    pub fn sentinel_frame(&self, id: AttachmentId) -> Option<SentinelFrame> {
        self.geometry.sentinel_frame(id)
    }
}

fn content_size(axis: Axis, viewport: Size, items: usize) -> Size {
    match axis {
        Axis::Vertical => Size::new(viewport.width, items as f64),
        Axis::Horizontal => Size::new(items as f64, viewport.height),
    }
}

impl ScrollHost for ListHost {
    fn content_offset(&self) -> Point {
        self.geometry.content_offset()
    }

    fn set_content_offset(&mut self, offset: Point) {
        self.geometry.set_content_offset(offset);
    }

    fn content_size(&self) -> Size {
        self.geometry.content_size()
    }

    fn viewport_size(&self) -> Size {
        self.geometry.viewport_size()
    }

    fn content_inset(&self) -> Insets {
        self.geometry.content_inset()
    }

    fn set_content_inset(&mut self, inset: Insets) {
        self.geometry.set_content_inset(inset);
    }

    fn is_dragging(&self) -> bool {
        self.geometry.is_dragging()
    }

    fn is_decelerating(&self) -> bool {
        self.geometry.is_decelerating()
    }

    fn axis(&self) -> Axis {
        self.geometry.axis()
    }

    fn notifier(&mut self) -> &mut ChangeNotifier {
        self.geometry.notifier()
    }

    fn host_id(&self) -> HostId {
        self.geometry.host_id()
    }

    fn insert_sentinel(&mut self, id: AttachmentId, edge: Edge) {
        self.geometry.insert_sentinel(id, edge);
    }

    fn layout_sentinel(&mut self, id: AttachmentId, frame: SentinelFrame) {
        self.geometry.layout_sentinel(id, frame);
    }

    fn remove_sentinel(&mut self, id: AttachmentId) {
        self.geometry.remove_sentinel(id);
    }
}
