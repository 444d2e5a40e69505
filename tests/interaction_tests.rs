mod common;

use common::Harness;
use std::time::Duration;
use term_decor::decorations::CommandAction;
use term_decor::error::DecorationError;
use term_decor::services::{ContextMenuRequest, ContextMenuService};
use term_decor_terminal::{DecorationElement, Marker, PointerEvent, TerminalCommand};

const HOVER_DELAY: Duration = Duration::from_millis(500);

/// Run a finished command with captured output and return its marker.
fn run_with_output(h: &mut Harness, command: &str, exit_code: i32, output: &str) -> Marker {
    let marker = h.start(command);
    h.pump();
    h.finish(
        TerminalCommand::new(command, Some(marker.clone()))
            .with_exit_code(exit_code)
            .with_output(output),
    );
    h.pump();
    h.render();
    marker
}

fn hover_contents(h: &Harness) -> Vec<String> {
    h.hover.shown().into_iter().map(|r| r.content).collect()
}

#[test]
fn test_click_opens_menu_with_rerun_only() {
    let mut h = Harness::with_command_detection();
    let marker = h.run_command("ls", Some(0));
    let element = h.element(&marker);

    element.dispatch(PointerEvent::Click);
    h.pump();

    let requests = h.menu.requests();
    assert_eq!(requests.len(), 1);
    assert!(requests[0].anchor.same_as(&element));
    assert_eq!(
        requests[0].actions,
        vec![CommandAction::RerunCommand {
            command: "ls".to_string()
        }]
    );
    assert!(h.addon.is_context_menu_visible());
}

#[test]
fn test_copy_output_action() {
    let mut h = Harness::with_command_detection();
    let marker = run_with_output(&mut h, "cat notes", 0, "hello\nworld");
    h.element(&marker).dispatch(PointerEvent::Click);
    h.pump();

    let actions = h.menu.requests()[0].actions.clone();
    let labels: Vec<_> = actions.iter().map(|a| a.label()).collect();
    assert_eq!(labels, vec!["Copy Output", "Re-run Command"]);

    h.addon.run_action(&actions[0]).expect("copied");
    assert_eq!(h.clipboard.writes(), vec!["hello\nworld".to_string()]);
}

#[test]
fn test_copy_output_reports_clipboard_failure() {
    let h = Harness::with_command_detection();
    h.clipboard.set_unavailable(true);

    let err = h
        .addon
        .run_action(&CommandAction::CopyOutput {
            output: "x".to_string(),
        })
        .unwrap_err();
    assert!(matches!(err, DecorationError::Clipboard(_)));
}

#[test]
fn test_rerun_action_fires_request() {
    let mut h = Harness::with_command_detection();
    let marker = h.run_command("cargo test", Some(101));
    let requests = h.addon.on_did_request_run_command();

    h.element(&marker).dispatch(PointerEvent::Click);
    h.pump();
    let actions = h.menu.requests()[0].actions.clone();
    h.addon.run_action(&actions[0]).expect("rerun");

    let fired: Vec<_> = requests.drain().into_iter().map(|r| r.value).collect();
    assert_eq!(fired, vec!["cargo test".to_string()]);
}

#[test]
fn test_hover_shows_after_delay() {
    let mut h = Harness::with_command_detection();
    let marker = h.run_command("true", Some(0));
    let element = h.element(&marker);

    element.dispatch(PointerEvent::MouseEnter);
    h.pump();
    assert!(h.addon.is_hover_pending());

    h.advance(HOVER_DELAY - Duration::from_millis(1));
    assert!(h.hover.shown().is_empty());

    h.advance(Duration::from_millis(1));
    let shown = h.hover.shown();
    assert_eq!(shown.len(), 1);
    assert!(shown[0].target.same_as(&element));
    assert_eq!(
        shown[0].content,
        "Show Command Actions...\n\n---\n\nCommand executed now"
    );
}

#[test]
fn test_hover_text_for_failures() {
    let mut h = Harness::with_command_detection();
    let sentinel = h.run_command("killed", Some(-1));
    let exited = h.run_command("exit 2", Some(2));

    h.element(&sentinel).dispatch(PointerEvent::MouseEnter);
    h.advance(HOVER_DELAY);
    h.element(&exited).dispatch(PointerEvent::MouseEnter);
    h.advance(HOVER_DELAY);

    let contents = hover_contents(&h);
    assert_eq!(contents.len(), 2);
    assert!(contents[0].ends_with("Command executed now and failed"));
    assert!(!contents[0].contains("Exit Code"));
    assert!(contents[1].ends_with("Command executed now and failed (Exit Code 2)"));
}

#[test]
fn test_mouse_leave_within_delay_never_shows_hover() {
    let mut h = Harness::with_command_detection();
    let marker = h.run_command("ls", Some(0));
    let element = h.element(&marker);

    element.dispatch(PointerEvent::MouseEnter);
    h.advance(Duration::from_millis(200));
    element.dispatch(PointerEvent::MouseLeave);
    h.advance(HOVER_DELAY * 4);

    assert!(h.hover.shown().is_empty());
    assert!(!h.addon.is_hover_pending());
}

#[test]
fn test_enter_and_leave_in_one_pump_never_shows_hover() {
    let mut h = Harness::with_command_detection();
    let marker = h.run_command("ls", Some(0));
    let element = h.element(&marker);

    element.dispatch(PointerEvent::MouseEnter);
    element.dispatch(PointerEvent::MouseOut);
    h.advance(HOVER_DELAY * 2);

    assert!(h.hover.shown().is_empty());
}

#[test]
fn test_new_enter_supersedes_pending_hover() {
    let mut h = Harness::with_command_detection();
    let marker = h.run_command("ls", Some(0));
    let element = h.element(&marker);

    element.dispatch(PointerEvent::MouseEnter);
    h.advance(Duration::from_millis(300));
    element.dispatch(PointerEvent::MouseEnter);
    h.advance(Duration::from_millis(300));
    assert!(h.hover.shown().is_empty());

    h.advance(Duration::from_millis(200));
    assert_eq!(h.hover.shown().len(), 1);
}

#[test]
fn test_mouse_leave_hides_shown_hover() {
    let mut h = Harness::with_command_detection();
    let marker = h.run_command("ls", Some(0));
    let element = h.element(&marker);

    element.dispatch(PointerEvent::MouseEnter);
    h.advance(HOVER_DELAY);
    assert!(h.hover.is_visible());

    element.dispatch(PointerEvent::MouseLeave);
    h.pump();
    assert!(!h.hover.is_visible());
    assert_eq!(h.hover.hide_count(), 1);
}

#[test]
fn test_click_hides_hover_and_cancels_pending() {
    let mut h = Harness::with_command_detection();
    let marker = h.run_command("ls", Some(0));
    let element = h.element(&marker);

    element.dispatch(PointerEvent::MouseEnter);
    h.advance(HOVER_DELAY);
    assert!(h.hover.is_visible());

    element.dispatch(PointerEvent::Click);
    h.pump();
    assert!(!h.hover.is_visible());
    assert_eq!(h.menu.requests().len(), 1);
}

#[test]
fn test_hover_suppressed_while_menu_open() {
    let mut h = Harness::with_command_detection();
    let marker = h.run_command("ls", Some(0));
    let element = h.element(&marker);

    element.dispatch(PointerEvent::Click);
    h.pump();
    element.dispatch(PointerEvent::MouseEnter);
    h.advance(HOVER_DELAY * 2);
    assert!(h.hover.shown().is_empty());

    h.menu.close();
    h.pump();
    assert!(!h.addon.is_context_menu_visible());

    element.dispatch(PointerEvent::MouseEnter);
    h.advance(HOVER_DELAY);
    assert_eq!(h.hover.shown().len(), 1);
}

#[test]
fn test_menu_opening_cancels_pending_hover() {
    let mut h = Harness::with_command_detection();
    let marker = h.run_command("ls", Some(0));
    let element = h.element(&marker);

    element.dispatch(PointerEvent::MouseEnter);
    h.pump();
    // A menu opened by some other part of the UI.
    h.menu.show_context_menu(ContextMenuRequest {
        anchor: DecorationElement::new(false),
        actions: Vec::new(),
    });
    h.advance(HOVER_DELAY);

    assert!(h.hover.shown().is_empty());
    assert!(!h.addon.is_hover_pending());
}

#[test]
fn test_command_without_exit_code_has_no_interactions() {
    let mut h = Harness::with_command_detection();
    let marker = h.run_command("interrupted", None);
    let element = h.element(&marker);

    assert!(element.has_class("default"));
    assert_eq!(element.listener_count(), 0);

    element.dispatch(PointerEvent::Click);
    element.dispatch(PointerEvent::MouseEnter);
    h.advance(HOVER_DELAY);
    assert!(h.menu.requests().is_empty());
    assert!(h.hover.shown().is_empty());
}

#[test]
fn test_interactions_stop_after_scroll_out() {
    let mut h = Harness::with_command_detection();
    let marker = h.run_command("ls", Some(0));
    let element = h.element(&marker);

    h.buffer.push_lines(common::SCROLLBACK * 2);
    h.pump();

    element.dispatch(PointerEvent::Click);
    h.pump();
    assert!(h.menu.requests().is_empty());
    assert_eq!(element.listener_count(), 0);
}
