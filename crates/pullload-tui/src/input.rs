use crossterm::event::{KeyCode, KeyEvent, KeyModifiers, MouseButton, MouseEvent, MouseEventKind};

use pullload_core::Axis;

use crate::host::ListHost;

/// Cells moved per wheel notch
const WHEEL_STEP: f64 = 3.0;

/// Scroll action decoded from terminal input
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum GestureAction {
    /// Clamped scroll by the given number of cells
    Scroll(f64),
    /// Drag the content; may overscroll either end
    Drag(f64),
    /// End the current drag
    Release,
    JumpToStart,
    JumpToEnd,
    /// Programmatic pull on the leading edge
    Refresh,
    Quit,
    None,
}

/// Turns mouse drags and key presses into host movement
///
/// Content follows the pointer: dragging down (or right) moves the offset
/// toward the leading edge.
#[derive(Debug, Default)]
pub struct PullGesture {
    anchor: Option<(u16, u16)>,
}

impl PullGesture {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_dragging(&self) -> bool {
        self.anchor.is_some()
    }

    /// Decode a mouse event for a list scrolling along `axis`
    pub fn handle_mouse(&mut self, event: MouseEvent, axis: Axis) -> GestureAction {
        let position = (event.column, event.row);
        match event.kind {
            MouseEventKind::Down(MouseButton::Left) => {
                self.anchor = Some(position);
                GestureAction::None
            }
            MouseEventKind::Drag(MouseButton::Left) => {
                let Some(anchor) = self.anchor.replace(position) else {
                    return GestureAction::None;
                };
                let moved = match axis {
                    Axis::Vertical => position.1 as f64 - anchor.1 as f64,
                    Axis::Horizontal => position.0 as f64 - anchor.0 as f64,
                };
                if moved == 0.0 {
                    GestureAction::None
                } else {
                    GestureAction::Drag(-moved)
                }
            }
            MouseEventKind::Up(MouseButton::Left) => {
                if self.anchor.take().is_some() {
                    GestureAction::Release
                } else {
                    GestureAction::None
                }
            }
            MouseEventKind::ScrollUp => GestureAction::Scroll(-WHEEL_STEP),
            MouseEventKind::ScrollDown => GestureAction::Scroll(WHEEL_STEP),
            _ => GestureAction::None,
        }
    }

    /// Decode a key press
    ///
    /// `K`/`J` drag one cell past the ends and space lets go, which is how
    /// a pull is performed without a mouse.
    pub fn handle_key(&mut self, key: KeyEvent) -> GestureAction {
        match (key.code, key.modifiers) {
            (KeyCode::Char('q'), KeyModifiers::NONE) => GestureAction::Quit,
            (KeyCode::Char('c'), KeyModifiers::CONTROL) => GestureAction::Quit,
            (KeyCode::Char('j'), KeyModifiers::NONE) | (KeyCode::Down, _) => GestureAction::Scroll(1.0),
            (KeyCode::Char('k'), KeyModifiers::NONE) | (KeyCode::Up, _) => GestureAction::Scroll(-1.0),
            (KeyCode::Char('J'), _) => GestureAction::Drag(1.0),
            (KeyCode::Char('K'), _) => GestureAction::Drag(-1.0),
            (KeyCode::Char(' '), _) => GestureAction::Release,
            (KeyCode::Char('g'), KeyModifiers::NONE) | (KeyCode::Home, _) => GestureAction::JumpToStart,
            (KeyCode::Char('G'), _) | (KeyCode::End, _) => GestureAction::JumpToEnd,
            (KeyCode::Char('r'), KeyModifiers::NONE) => GestureAction::Refresh,
            _ => GestureAction::None,
        }
    }

    /// Apply a movement action to the host
    ///
    /// Returns whether the host moved or changed drag state. `Refresh` and
    /// `Quit` are left to the caller.
    pub fn apply(&mut self, action: GestureAction, host: &mut ListHost) -> bool {
        match action {
            GestureAction::Scroll(delta) => {
                let before = host.offset();
                host.scroll_by(delta);
                host.offset() != before
            }
            GestureAction::Drag(delta) => {
                host.drag_by(delta);
                true
            }
            GestureAction::Release => {
                self.anchor = None;
                host.release();
                true
            }
            GestureAction::JumpToStart => {
                host.scroll_to_start();
                true
            }
            GestureAction::JumpToEnd => {
                host.scroll_to_end();
                true
            }
            GestureAction::Refresh | GestureAction::Quit | GestureAction::None => false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crossterm::event::KeyEventKind;
    use pullload_core::{ScrollHost, Size};

    fn mouse(kind: MouseEventKind, column: u16, row: u16) -> MouseEvent {
        MouseEvent {
            kind,
            column,
            row,
            modifiers: KeyModifiers::NONE,
        }
    }

    fn key(code: KeyCode, modifiers: KeyModifiers) -> KeyEvent {
        KeyEvent {
            code,
            modifiers,
            kind: KeyEventKind::Press,
            state: crossterm::event::KeyEventState::NONE,
        }
    }

    #[test]
    fn test_mouse_drag_moves_content_with_pointer() {
        let mut gesture = PullGesture::new();
        let left = MouseButton::Left;

        assert_eq!(gesture.handle_mouse(mouse(MouseEventKind::Down(left), 4, 2), Axis::Vertical), GestureAction::None);
        assert!(gesture.is_dragging());
        assert_eq!(
            gesture.handle_mouse(mouse(MouseEventKind::Drag(left), 4, 5), Axis::Vertical),
            GestureAction::Drag(-3.0)
        );
        assert_eq!(
            gesture.handle_mouse(mouse(MouseEventKind::Drag(left), 4, 4), Axis::Vertical),
            GestureAction::Drag(1.0)
        );
        assert_eq!(
            gesture.handle_mouse(mouse(MouseEventKind::Up(left), 4, 4), Axis::Vertical),
            GestureAction::Release
        );
        assert!(!gesture.is_dragging());
    }

    #[test]
    fn test_horizontal_drag_uses_columns() {
        let mut gesture = PullGesture::new();
        let left = MouseButton::Left;
        gesture.handle_mouse(mouse(MouseEventKind::Down(left), 10, 1), Axis::Horizontal);
        assert_eq!(
            gesture.handle_mouse(mouse(MouseEventKind::Drag(left), 14, 3), Axis::Horizontal),
            GestureAction::Drag(-4.0)
        );
    }

    #[test]
    fn test_keys() {
        let mut gesture = PullGesture::new();
        assert_eq!(gesture.handle_key(key(KeyCode::Char('q'), KeyModifiers::NONE)), GestureAction::Quit);
        assert_eq!(gesture.handle_key(key(KeyCode::Char('K'), KeyModifiers::SHIFT)), GestureAction::Drag(-1.0));
        assert_eq!(gesture.handle_key(key(KeyCode::Char(' '), KeyModifiers::NONE)), GestureAction::Release);
        assert_eq!(gesture.handle_key(key(KeyCode::Char('r'), KeyModifiers::NONE)), GestureAction::Refresh);
        assert_eq!(gesture.handle_key(key(KeyCode::Char('x'), KeyModifiers::NONE)), GestureAction::None);
    }

    #[test]
    fn test_apply_drag_and_release() {
        let mut host = ListHost::new(Size::new(20.0, 5.0), 30);
        let mut gesture = PullGesture::new();

        assert!(!gesture.apply(GestureAction::Scroll(-1.0), &mut host));
        assert!(gesture.apply(GestureAction::Drag(-3.0), &mut host));
        assert!(host.is_dragging());
        assert_eq!(host.offset(), -3.0);

        assert!(gesture.apply(GestureAction::Release, &mut host));
        assert!(!host.is_dragging());
        assert!(host.is_decelerating());
        assert!(!gesture.apply(GestureAction::Refresh, &mut host));
    }
}
