use mindcanvas::CanvasIntent;
use uuid::Uuid;

use crate::harness::TestHarness;

#[test]
fn test_click_then_shift_click_builds_multi_selection() {
    let mut harness = TestHarness::new();
    let a = harness.add_card("a", 0.0, 0.0);
    let b = harness.add_card("b", 100.0, 0.0);
    let c = harness.add_card("c", 200.0, 0.0);

    // Plain click: single selection
    harness.app.toggle_selection(a, false);
    assert_eq!(harness.app.selection().len(), 1);
    assert_eq!(harness.app.selection().primary(), Some(a));

    // Shift-clicks grow it
    harness.app.toggle_selection(b, true);
    harness.app.toggle_selection(c, true);
    assert_eq!(harness.app.selection().len(), 3);
    assert_eq!(harness.app.selection().primary(), Some(c));

    // Shift-click on a member removes only that member
    harness.app.toggle_selection(b, true);
    assert_eq!(harness.app.selection().len(), 2);
    assert!(harness.app.selection().contains(&a));
    assert!(!harness.app.selection().contains(&b));
}

#[test]
fn test_plain_click_collapses_multi_selection() {
    let mut harness = TestHarness::new();
    let a = harness.add_card("a", 0.0, 0.0);
    let b = harness.add_card("b", 100.0, 0.0);
    harness.app.toggle_selection(a, false);
    harness.app.toggle_selection(b, true);

    harness.app.toggle_selection(a, false);
    assert_eq!(harness.app.selection().len(), 1);
    assert!(harness.app.selection().contains(&a));
}

#[test]
fn test_selected_flag_tracks_set_through_lifecycle() {
    let mut harness = TestHarness::new();
    let a = harness.add_card("a", 0.0, 0.0);
    let b = harness.add_card("b", 100.0, 0.0);

    harness.app.select_all();
    assert!(harness.app.node(a).unwrap().selected);
    assert!(harness.app.node(b).unwrap().selected);

    harness.app.clear_selection();
    assert!(!harness.app.node(a).unwrap().selected);
    assert!(!harness.app.node(b).unwrap().selected);
    assert!(harness.app.selection().is_empty());
}

#[test]
fn test_selection_revision_is_monotonic() {
    let mut harness = TestHarness::new();
    let a = harness.add_card("a", 0.0, 0.0);

    let before = harness.app.selection().revision();
    harness.app.toggle_selection(a, false);
    let after_select = harness.app.selection().revision();
    assert!(after_select > before);

    // No-op operations leave the revision alone
    harness.app.toggle_selection(Uuid::new_v4(), false);
    harness.app.select_nodes(&[Uuid::new_v4()]);
    assert_eq!(harness.app.selection().revision(), after_select);
}

#[test]
fn test_selection_intents_match_direct_calls() {
    let mut harness = TestHarness::new();
    let a = harness.add_card("a", 0.0, 0.0);
    let b = harness.add_card("b", 100.0, 0.0);

    harness.app.apply_intents([
        CanvasIntent::SelectNode {
            id: a,
            multi_select: false,
        },
        CanvasIntent::SelectNodes { ids: vec![b] },
    ]);
    assert_eq!(harness.app.selection().len(), 2);

    harness.app.apply_intents([CanvasIntent::ClearSelection]);
    assert!(harness.app.selection().is_empty());
}

#[test]
fn test_removing_selected_cards_clears_selection() {
    let mut harness = TestHarness::new();
    let a = harness.add_card("a", 0.0, 0.0);
    let b = harness.add_card("b", 100.0, 0.0);
    harness.link(a, b);

    harness.app.toggle_selection(a, false);
    harness.app.remove_selected_cards();

    assert!(harness.app.node(a).is_none());
    assert!(harness.app.node(b).is_some());
    assert!(harness.app.selection().is_empty());
    assert_eq!(harness.app.graph().synapse_count(), 0);
}
