use euclid::default::Vector2D;

use crate::harness::TestHarness;

#[test]
fn test_checkpoint_pushes_and_clears_redo() {
    let mut harness = TestHarness::new();
    let _a = harness.add_card("a", 0.0, 0.0);
    assert_eq!(harness.app.undo_depth(), 1);
    assert_eq!(harness.app.redo_depth(), 0);

    let _b = harness.add_card("b", 100.0, 0.0);
    assert_eq!(harness.app.undo_depth(), 2);

    // Undo to create a redo entry
    harness.app.undo();
    assert_eq!(harness.app.undo_depth(), 1);
    assert_eq!(harness.app.redo_depth(), 1);

    // A fresh mutation invalidates the redo branch
    let _c = harness.add_card("c", 200.0, 0.0);
    assert_eq!(
        harness.app.redo_depth(),
        0,
        "redo stack should be cleared by a new checkpoint"
    );
}

#[test]
fn test_undo_restores_pre_mutation_graph_exactly() {
    let mut harness = TestHarness::new();
    let a = harness.add_card("a", 10.0, 20.0);
    harness.app.toggle_selection(a, false);
    harness.app.add_tag_to_selected("draft");
    harness.app.pin_selected();

    harness.app.undo();
    let node = harness.app.node(a).unwrap();
    assert_eq!(node.tags, vec!["draft"]);
    assert!(!node.pinned);

    harness.app.undo();
    let node = harness.app.node(a).unwrap();
    assert!(node.tags.is_empty());
    assert!(!node.pinned);
}

#[test]
fn test_redo_restores_post_mutation_graph() {
    let mut harness = TestHarness::new();
    let a = harness.add_card("a", 0.0, 0.0);
    harness.app.toggle_selection(a, false);
    harness.app.add_tag_to_selected("kept");

    harness.app.undo();
    assert!(harness.app.node(a).unwrap().tags.is_empty());

    harness.app.redo();
    assert_eq!(harness.app.node(a).unwrap().tags, vec!["kept"]);
}

#[test]
fn test_undo_restores_selection_alongside_graph() {
    let mut harness = TestHarness::new();
    let a = harness.add_card("a", 0.0, 0.0);
    let b = harness.add_card("b", 100.0, 0.0);
    harness.app.toggle_selection(a, false);
    harness.app.toggle_selection(b, true);

    harness.app.duplicate_selected_nodes();
    assert!(!harness.app.selection().contains(&a));

    harness.app.undo();
    assert_eq!(harness.app.selection().len(), 2);
    assert!(harness.app.selection().contains(&a));
    assert!(harness.app.selection().contains(&b));
    assert_eq!(harness.app.graph().node_count(), 2);
}

#[test]
fn test_sixty_checkpoints_leave_exactly_fifty() {
    let mut harness = TestHarness::new();
    for i in 0..60 {
        harness.add_card(&format!("card {i}"), i as f32, 0.0);
    }
    assert_eq!(harness.app.undo_depth(), 50);

    // Unwinding everything lands on the oldest surviving checkpoint, which
    // already contains the ten cards whose checkpoints were evicted.
    while harness.app.undo() {}
    assert_eq!(harness.app.graph().node_count(), 10);
}

#[test]
fn test_redo_stack_is_bounded_too() {
    let mut harness = TestHarness::new();
    for i in 0..60 {
        harness.add_card(&format!("card {i}"), i as f32, 0.0);
    }
    while harness.app.undo() {}
    assert_eq!(harness.app.redo_depth(), 50);
}

#[test]
fn test_empty_stack_undo_redo_are_silent() {
    let mut harness = TestHarness::new();
    assert!(!harness.app.undo());
    assert!(!harness.app.redo());

    let _a = harness.add_card("a", 0.0, 0.0);
    harness.app.undo();
    assert!(!harness.app.undo());
    assert_eq!(harness.app.graph().node_count(), 0);
}

#[test]
fn test_undo_covers_synapse_mutations() {
    let mut harness = TestHarness::new();
    let a = harness.add_card("a", 0.0, 0.0);
    let b = harness.add_card("b", 100.0, 0.0);
    harness.link(a, b);
    assert_eq!(harness.app.graph().synapse_count(), 1);

    harness.app.remove_synapses_between(a, b);
    assert_eq!(harness.app.graph().synapse_count(), 0);

    harness.app.undo();
    assert_eq!(harness.app.graph().synapse_count(), 1);

    harness.app.undo();
    assert_eq!(harness.app.graph().synapse_count(), 0);
}

#[test]
fn test_interleaved_moves_and_history() {
    let mut harness = TestHarness::new();
    let a = harness.add_card("a", 0.0, 0.0);
    harness.app.toggle_selection(a, false);

    harness.app.begin_drag();
    harness.app.update_drag(Vector2D::new(30.0, 0.0));
    harness.app.end_drag();
    assert_eq!(harness.position(a), (30.0, 0.0));

    harness.app.begin_drag();
    harness.app.update_drag(Vector2D::new(0.0, 40.0));
    harness.app.end_drag();
    assert_eq!(harness.position(a), (30.0, 40.0));

    harness.app.undo();
    assert_eq!(harness.position(a), (30.0, 0.0));
    harness.app.undo();
    assert_eq!(harness.position(a), (0.0, 0.0));
    harness.app.redo();
    assert_eq!(harness.position(a), (30.0, 0.0));
}
