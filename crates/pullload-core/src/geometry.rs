//! L4 Atomic Layer: Geometry primitives and edge distances
//!
//! Distances are always computed fresh from the host; insets and content
//! size can change between two polls.

use serde::{Deserialize, Serialize};

use crate::host::ScrollHost;

/// Position of a sentinel relative to the scroll direction
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Edge {
    /// Head of the scroll direction (pull to refresh)
    #[default]
    Leading,
    /// Tail of the scroll direction (load more)
    Trailing,
}

/// Scroll axis of a host container
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Axis {
    #[default]
    Vertical,
    Horizontal,
}

#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Point {
    pub x: f64,
    pub y: f64,
}

impl Point {
    pub const fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    /// Component along the given axis
    #[inline]
    pub fn along(&self, axis: Axis) -> f64 {
        match axis {
            Axis::Vertical => self.y,
            Axis::Horizontal => self.x,
        }
    }

    /// Copy with the component along `axis` replaced
    #[inline]
    pub fn with_along(self, axis: Axis, value: f64) -> Self {
        match axis {
            Axis::Vertical => Self { y: value, ..self },
            Axis::Horizontal => Self { x: value, ..self },
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Size {
    pub width: f64,
    pub height: f64,
}

impl Size {
    pub const fn new(width: f64, height: f64) -> Self {
        Self { width, height }
    }

    #[inline]
    pub fn along(&self, axis: Axis) -> f64 {
        match axis {
            Axis::Vertical => self.height,
            Axis::Horizontal => self.width,
        }
    }

    #[inline]
    pub fn across(&self, axis: Axis) -> f64 {
        match axis {
            Axis::Vertical => self.width,
            Axis::Horizontal => self.height,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Rect {
    pub origin: Point,
    pub size: Size,
}

impl Rect {
    pub const fn new(x: f64, y: f64, width: f64, height: f64) -> Self {
        Self {
            origin: Point::new(x, y),
            size: Size::new(width, height),
        }
    }
}

/// Four-sided content inset
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Insets {
    pub top: f64,
    pub left: f64,
    pub bottom: f64,
    pub right: f64,
}

impl Insets {
    pub const fn new(top: f64, left: f64, bottom: f64, right: f64) -> Self {
        Self {
            top,
            left,
            bottom,
            right,
        }
    }

    /// Inset on the side of `edge` for the given axis
    pub fn side(&self, axis: Axis, edge: Edge) -> f64 {
        match (axis, edge) {
            (Axis::Vertical, Edge::Leading) => self.top,
            (Axis::Vertical, Edge::Trailing) => self.bottom,
            (Axis::Horizontal, Edge::Leading) => self.left,
            (Axis::Horizontal, Edge::Trailing) => self.right,
        }
    }

    pub fn side_mut(&mut self, axis: Axis, edge: Edge) -> &mut f64 {
        match (axis, edge) {
            (Axis::Vertical, Edge::Leading) => &mut self.top,
            (Axis::Vertical, Edge::Trailing) => &mut self.bottom,
            (Axis::Horizontal, Edge::Leading) => &mut self.left,
            (Axis::Horizontal, Edge::Trailing) => &mut self.right,
        }
    }

    /// Sum of both sides along the axis
    pub fn along(&self, axis: Axis) -> f64 {
        self.side(axis, Edge::Leading) + self.side(axis, Edge::Trailing)
    }
}

/// How far the content sits from its leading rest position
///
/// `contentOffset + contentInset.leading`, per component. Negative means
/// the content has been pulled past the leading edge.
pub fn leading_offset<H>(host: &H) -> Point
where
    H: ScrollHost + ?Sized,
{
    let offset = host.content_offset();
    let inset = host.content_inset();
    Point::new(offset.x + inset.left, offset.y + inset.top)
}

/// How far the viewport end sits from the trailing rest position
///
/// `(contentSize + contentInset.trailing) - (contentOffset + viewport)`.
/// Negative means the content has been pulled past the trailing edge.
pub fn trailing_offset<H>(host: &H) -> Point
where
    H: ScrollHost + ?Sized,
{
    let offset = host.content_offset();
    let inset = host.content_inset();
    let content = host.content_size();
    let viewport = host.viewport_size();
    Point::new(
        (content.width + inset.right) - (offset.x + viewport.width),
        (content.height + inset.bottom) - (offset.y + viewport.height),
    )
}

/// Leading distance along the host's current axis
pub fn leading_distance<H>(host: &H) -> f64
where
    H: ScrollHost + ?Sized,
{
    leading_offset(host).along(host.axis())
}

/// Trailing distance along the host's current axis
pub fn trailing_distance<H>(host: &H) -> f64
where
    H: ScrollHost + ?Sized,
{
    trailing_offset(host).along(host.axis())
}

/// Distance for the given edge
pub fn edge_distance<H>(host: &H, edge: Edge) -> f64
where
    H: ScrollHost + ?Sized,
{
    match edge {
        Edge::Leading => leading_distance(host),
        Edge::Trailing => trailing_distance(host),
    }
}

/// Move the content offset so the leading distance becomes `distance`
pub fn set_leading_distance<H>(host: &mut H, distance: f64)
where
    H: ScrollHost + ?Sized,
{
    let axis = host.axis();
    let inset = host.content_inset().side(axis, Edge::Leading);
    let offset = host.content_offset().with_along(axis, distance - inset);
    host.set_content_offset(offset);
}

/// Move the content offset so the trailing distance becomes `distance`
pub fn set_trailing_distance<H>(host: &mut H, distance: f64)
where
    H: ScrollHost + ?Sized,
{
    let axis = host.axis();
    let end = host.content_size().along(axis) + host.content_inset().side(axis, Edge::Trailing);
    let value = end - host.viewport_size().along(axis) - distance;
    let offset = host.content_offset().with_along(axis, value);
    host.set_content_offset(offset);
}

/// Set the distance on `edge`
pub fn set_edge_distance<H>(host: &mut H, edge: Edge, distance: f64)
where
    H: ScrollHost + ?Sized,
{
    match edge {
        Edge::Leading => set_leading_distance(host, distance),
        Edge::Trailing => set_trailing_distance(host, distance),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::host::MemoryHost;

    #[test]
    fn test_leading_distance_at_rest() {
        let host = MemoryHost::vertical(Size::new(100.0, 200.0), Size::new(100.0, 1000.0));
        assert_eq!(leading_distance(&host), 0.0);
    }

    #[test]
    fn test_leading_distance_accounts_for_inset() {
        let mut host = MemoryHost::vertical(Size::new(100.0, 200.0), Size::new(100.0, 1000.0));
        host.inset.top = 20.0;
        host.offset.y = -60.0;
        assert_eq!(leading_distance(&host), -40.0);
    }

    #[test]
    fn test_trailing_distance() {
        let mut host = MemoryHost::vertical(Size::new(100.0, 200.0), Size::new(100.0, 1000.0));
        host.offset.y = 800.0;
        assert_eq!(trailing_distance(&host), 0.0);

        host.offset.y = 830.0;
        assert_eq!(trailing_distance(&host), -30.0);

        host.inset.bottom = 50.0;
        assert_eq!(trailing_distance(&host), 20.0);
    }

    #[test]
    fn test_horizontal_axis_uses_x() {
        let mut host = MemoryHost::vertical(Size::new(300.0, 100.0), Size::new(900.0, 100.0));
        host.axis = Axis::Horizontal;
        host.offset = Point::new(-25.0, -999.0);
        assert_eq!(leading_distance(&host), -25.0);

        host.offset = Point::new(610.0, 0.0);
        assert_eq!(trailing_distance(&host), -10.0);
    }

    #[test]
    fn test_setters_invert_getters() {
        let mut host = MemoryHost::vertical(Size::new(100.0, 200.0), Size::new(100.0, 1000.0));
        host.inset = Insets::new(30.0, 0.0, 40.0, 0.0);

        set_leading_distance(&mut host, -15.0);
        assert_eq!(leading_distance(&host), -15.0);

        set_trailing_distance(&mut host, -5.0);
        assert_eq!(trailing_distance(&host), -5.0);
    }

    #[test]
    fn test_insets_side() {
        let mut insets = Insets::new(1.0, 2.0, 3.0, 4.0);
        assert_eq!(insets.side(Axis::Vertical, Edge::Trailing), 3.0);
        assert_eq!(insets.side(Axis::Horizontal, Edge::Leading), 2.0);
        *insets.side_mut(Axis::Horizontal, Edge::Trailing) += 6.0;
        assert_eq!(insets.right, 10.0);
        assert_eq!(insets.along(Axis::Vertical), 4.0);
    }
}
