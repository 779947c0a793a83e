//! Sentinel placement and inset reservation
//!
//! A sentinel sits just outside the content on its edge. While loading, the
//! host's inset on that side grows by exactly the sentinel's extent; the
//! matching release restores the value captured before the growth.

use crate::geometry::{Axis, Edge, Insets, Rect};
use crate::host::ScrollHost;

/// Where a sentinel is drawn, in content coordinates
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct SentinelFrame {
    pub rect: Rect,
    pub hidden: bool,
}

/// Frame for a sentinel of `extent` on `edge`
///
/// `reserved` is the inset currently added for this sentinel; it is already
/// part of the host inset and must not push the sentinel further out.
pub fn sentinel_rect<H>(host: &H, edge: Edge, extent: f64, reserved: f64) -> Rect
where
    H: ScrollHost + ?Sized,
{
    let axis = host.axis();
    let inset = host.content_inset().side(axis, edge);
    let cross = host.viewport_size().across(axis);
    let position = match edge {
        Edge::Leading => -(inset + extent - reserved),
        Edge::Trailing => host.content_size().along(axis) + inset - reserved,
    };

    match axis {
        Axis::Vertical => Rect::new(0.0, position, cross, extent),
        Axis::Horizontal => Rect::new(position, 0.0, extent, cross),
    }
}

/// Whether content is too short to need a sentinel on `edge`
///
/// Content that exactly fills the viewport counts as short. Only trailing
/// sentinels are hidden this way.
pub fn is_content_short<H>(host: &H, edge: Edge) -> bool
where
    H: ScrollHost + ?Sized,
{
    if edge == Edge::Leading {
        return false;
    }
    let axis = host.axis();
    host.content_size().along(axis) + host.content_inset().along(axis)
        <= host.viewport_size().along(axis)
}

/// Inset added to a host on behalf of one sentinel
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct InsetReservation {
    reserved: f64,
    snapshot: Option<Insets>,
    axis: Axis,
}

impl InsetReservation {
    /// Amount currently added to the host inset
    #[inline]
    pub fn reserved(&self) -> f64 {
        self.reserved
    }

    #[inline]
    pub fn is_active(&self) -> bool {
        self.snapshot.is_some()
    }

    /// Axis the reservation was taken on
    #[inline]
    pub fn axis(&self) -> Axis {
        self.axis
    }

    /// Record a reservation of `extent` on top of `current`
    ///
    /// Returns the side value to animate to, or `None` if a reservation is
    /// already held.
    pub fn reserve(&mut self, current: Insets, axis: Axis, edge: Edge, extent: f64) -> Option<f64> {
        if self.is_active() {
            return None;
        }
        self.snapshot = Some(current);
        self.axis = axis;
        self.reserved = extent;
        Some(current.side(axis, edge) + extent)
    }

    /// Side value that undoes the reservation, or `None` when nothing is held
    pub fn restore_target(&self, edge: Edge) -> Option<f64> {
        self.snapshot.map(|snapshot| snapshot.side(self.axis, edge))
    }

    /// Change the reserved amount while held, returning the delta to apply
    pub fn resize(&mut self, extent: f64) -> f64 {
        if !self.is_active() {
            return 0.0;
        }
        let delta = extent - self.reserved;
        self.reserved = extent;
        delta
    }

    /// Forget the reservation after the host inset has been restored
    pub fn release(&mut self) {
        self.reserved = 0.0;
        self.snapshot = None;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geometry::Size;
    use crate::host::MemoryHost;

    fn host() -> MemoryHost {
        MemoryHost::vertical(Size::new(320.0, 480.0), Size::new(320.0, 2000.0))
    }

    #[test]
    fn test_leading_rect_sits_above_content() {
        let host = host();
        assert_eq!(
            sentinel_rect(&host, Edge::Leading, 50.0, 0.0),
            Rect::new(0.0, -50.0, 320.0, 50.0)
        );
    }

    #[test]
    fn test_leading_rect_is_stable_while_reserved() {
        let mut host = host();
        host.inset.top = 50.0;
        assert_eq!(
            sentinel_rect(&host, Edge::Leading, 50.0, 50.0),
            Rect::new(0.0, -50.0, 320.0, 50.0)
        );
    }

    #[test]
    fn test_trailing_rect_follows_content() {
        let mut host = host();
        assert_eq!(
            sentinel_rect(&host, Edge::Trailing, 40.0, 0.0).origin.y,
            2000.0
        );
        host.content.height = 2500.0;
        assert_eq!(
            sentinel_rect(&host, Edge::Trailing, 40.0, 0.0).origin.y,
            2500.0
        );
    }

    #[test]
    fn test_horizontal_rect() {
        let mut host = MemoryHost::horizontal(Size::new(300.0, 120.0), Size::new(900.0, 120.0));
        host.inset.left = 8.0;
        assert_eq!(
            sentinel_rect(&host, Edge::Leading, 50.0, 0.0),
            Rect::new(-58.0, 0.0, 50.0, 120.0)
        );
        assert_eq!(
            sentinel_rect(&host, Edge::Trailing, 50.0, 0.0),
            Rect::new(900.0, 0.0, 50.0, 120.0)
        );
    }

    #[test]
    fn test_short_content_hides_trailing_only() {
        let mut host = host();
        host.content.height = 300.0;
        assert!(is_content_short(&host, Edge::Trailing));
        assert!(!is_content_short(&host, Edge::Leading));

        host.inset = Insets::new(100.0, 0.0, 100.0, 0.0);
        assert!(!is_content_short(&host, Edge::Trailing));
    }

    #[test]
    fn test_content_filling_viewport_is_short() {
        let mut host = host();
        host.content.height = 480.0;
        assert!(is_content_short(&host, Edge::Trailing));

        host.content.height = 480.5;
        assert!(!is_content_short(&host, Edge::Trailing));
    }

    #[test]
    fn test_reservation_is_not_stacked() {
        let mut reservation = InsetReservation::default();
        let current = Insets::new(10.0, 0.0, 0.0, 0.0);

        assert_eq!(reservation.reserve(current, Axis::Vertical, Edge::Leading, 50.0), Some(60.0));
        assert_eq!(reservation.reserve(current, Axis::Vertical, Edge::Leading, 50.0), None);
        assert_eq!(reservation.reserved(), 50.0);
        assert_eq!(reservation.restore_target(Edge::Leading), Some(10.0));

        reservation.release();
        assert!(!reservation.is_active());
        assert_eq!(reservation.restore_target(Edge::Leading), None);
    }

    #[test]
    fn test_resize_reports_delta() {
        let mut reservation = InsetReservation::default();
        assert_eq!(reservation.resize(70.0), 0.0);
        reservation.reserve(Insets::default(), Axis::Vertical, Edge::Trailing, 50.0);
        assert_eq!(reservation.resize(70.0), 20.0);
        assert_eq!(reservation.reserved(), 70.0);
    }
}
