use std::cell::RefCell;
use std::rc::Rc;

use crossterm::event::{KeyModifiers, MouseButton, MouseEvent, MouseEventKind};
use pullload_core::{
    Completion, Edge, PullLoadConfig, PullLoaderRegistry, PullState, ScrollHost, Size,
};
use pullload_tui::{
    terminal_config, GestureAction, ListHost, LoadRunner, PullGesture, PullLoadView,
};

fn mouse(kind: MouseEventKind, row: u16) -> MouseEvent {
    MouseEvent {
        kind,
        column: 5,
        row,
        modifiers: KeyModifiers::NONE,
    }
}

fn instant_config() -> PullLoadConfig {
    PullLoadConfig {
        inset_animation_ms: 0,
        ..terminal_config()
    }
}

/// Keeps the completion handed out with the latest loading state
fn capture_completions(view: &PullLoadView) -> Rc<RefCell<Option<Completion>>> {
    let slot = Rc::new(RefCell::new(None));
    let sink = slot.clone();
    view.set_delegate(move |state, _| {
        if let PullState::Loading(completion) = state {
            *sink.borrow_mut() = Some(completion.clone());
        }
        None
    });
    slot
}

#[tokio::test]
async fn mouse_pull_refreshes_through_runner() {
    let host = Rc::new(RefCell::new(ListHost::new(Size::new(40.0, 12.0), 30)));
    let view = PullLoadView::new();
    let completions = capture_completions(&view);

    let mut registry = PullLoaderRegistry::new(instant_config());
    let handle = registry.attach(&host, view.clone(), Edge::Leading);
    let mut gesture = PullGesture::new();
    let left = MouseButton::Left;

    let steps = [
        mouse(MouseEventKind::Down(left), 2),
        mouse(MouseEventKind::Drag(left), 3),
        mouse(MouseEventKind::Drag(left), 6),
    ];
    for event in steps {
        let action = gesture.handle_mouse(event, host.borrow().axis());
        gesture.apply(action, &mut host.borrow_mut());
        registry.dispatch();
    }
    assert_eq!(host.borrow().offset(), -4.0);
    assert!(registry.state(handle).is_past_threshold());
    assert!(view.message().starts_with("Release to refresh"));

    let action = gesture.handle_mouse(mouse(MouseEventKind::Up(left), 6), host.borrow().axis());
    assert_eq!(action, GestureAction::Release);
    gesture.apply(action, &mut host.borrow_mut());
    registry.dispatch();

    assert!(registry.state(handle).is_loading());
    assert_eq!(view.message(), "Updating...");
    assert_eq!(host.borrow().content_inset().top, 2.0);

    // Settling stops at the sentinel, not at the first row.
    while host.borrow_mut().tick() {
        registry.dispatch();
    }
    registry.dispatch();
    assert_eq!(host.borrow().offset(), -2.0);
    assert!(registry.state(handle).is_loading());

    let mut runner = LoadRunner::new();
    let completion = completions.borrow_mut().take().expect("loading completion");
    runner.spawn("refresh", completion, async { Ok(10usize) });

    let list = host.clone();
    assert!(
        runner
            .next(move |outcome| {
                let added = outcome.result.expect("refresh ok");
                let len = list.borrow().len();
                list.borrow_mut().set_len(len + added);
            })
            .await
    );

    assert!(registry.state(handle).is_idle());
    assert_eq!(view.message(), "");
    assert_eq!(host.borrow().content_inset().top, 0.0);
    assert_eq!(host.borrow().len(), 40);
}

#[test]
fn keyboard_load_more_at_the_end() {
    let host = Rc::new(RefCell::new(ListHost::new(Size::new(40.0, 10.0), 20)));
    let view = PullLoadView::new();
    let completions = capture_completions(&view);

    let mut registry = PullLoaderRegistry::new(instant_config());
    let handle = registry.attach(&host, view.clone(), Edge::Trailing);
    let mut gesture = PullGesture::new();

    gesture.apply(GestureAction::JumpToEnd, &mut host.borrow_mut());
    registry.dispatch();
    assert!(registry.state(handle).is_idle());

    for _ in 0..4 {
        gesture.apply(GestureAction::Drag(1.0), &mut host.borrow_mut());
        registry.dispatch();
    }
    assert!(registry.state(handle).is_past_threshold());
    assert_eq!(view.message(), "Release to load more");

    gesture.apply(GestureAction::Release, &mut host.borrow_mut());
    registry.dispatch();
    assert!(registry.state(handle).is_loading());
    assert_eq!(view.message(), "Loading more...");
    assert_eq!(host.borrow().content_inset().bottom, 2.0);

    host.borrow_mut().set_len(30);
    registry.dispatch();
    completions.borrow_mut().take().expect("completion").complete();

    assert!(registry.state(handle).is_idle());
    assert_eq!(host.borrow().content_inset().bottom, 0.0);
    assert_eq!(view.frame().map(|f| f.rect.origin.y), Some(30.0));
}

#[test]
fn short_list_hides_trailing_sentinel() {
    let host = Rc::new(RefCell::new(ListHost::new(Size::new(40.0, 10.0), 4)));
    let view = PullLoadView::new();
    let mut registry = PullLoaderRegistry::new(terminal_config());
    let handle = registry.attach(&host, view.clone(), Edge::Trailing);

    assert!(registry.is_hidden(handle));
    assert_eq!(view.frame().map(|f| f.hidden), Some(true));

    host.borrow_mut().set_len(25);
    registry.dispatch();
    assert!(!registry.is_hidden(handle));
}
