use crate::harness::TestHarness;

#[test]
fn test_batch_tagging_hits_every_selected_card() {
    let mut harness = TestHarness::new();
    let a = harness.add_card("a", 0.0, 0.0);
    let b = harness.add_card("b", 100.0, 0.0);
    let c = harness.add_card("c", 200.0, 0.0);
    harness.app.select_nodes(&[a, b]);

    harness.app.add_tag_to_selected("reading-list");

    assert_eq!(harness.app.node(a).unwrap().tags, vec!["reading-list"]);
    assert_eq!(harness.app.node(b).unwrap().tags, vec!["reading-list"]);
    assert!(harness.app.node(c).unwrap().tags.is_empty());
}

#[test]
fn test_tagging_is_idempotent_per_card() {
    let mut harness = TestHarness::new();
    let a = harness.add_card("a", 0.0, 0.0);
    harness.app.toggle_selection(a, false);

    harness.app.add_tag_to_selected("once");
    harness.app.add_tag_to_selected("once");
    harness.app.add_tag_to_selected(" once ");

    assert_eq!(harness.app.node(a).unwrap().tags, vec!["once"]);
}

#[test]
fn test_tag_order_is_insertion_order() {
    let mut harness = TestHarness::new();
    let a = harness.add_card("a", 0.0, 0.0);
    harness.app.toggle_selection(a, false);

    harness.app.add_tag_to_selected("zulu");
    harness.app.add_tag_to_selected("alpha");
    harness.app.add_tag_to_selected("mike");

    assert_eq!(harness.app.node(a).unwrap().tags, vec!["zulu", "alpha", "mike"]);
}

#[test]
fn test_remove_tag_only_touches_carriers() {
    let mut harness = TestHarness::new();
    let a = harness.add_card("a", 0.0, 0.0);
    let b = harness.add_card("b", 100.0, 0.0);
    harness.app.toggle_selection(a, false);
    harness.app.add_tag_to_selected("shared");
    harness.app.add_tag_to_selected("only-a");

    harness.app.select_nodes(&[b]);
    harness.app.remove_tag_from_selected("shared");

    assert_eq!(harness.app.node(a).unwrap().tags, vec!["only-a"]);
    assert!(harness.app.node(b).unwrap().tags.is_empty());
}

#[test]
fn test_empty_tag_is_rejected_without_history_entry() {
    let mut harness = TestHarness::new();
    let a = harness.add_card("a", 0.0, 0.0);
    harness.app.toggle_selection(a, false);
    let depth = harness.app.undo_depth();

    harness.app.add_tag_to_selected("   ");
    harness.app.add_tag_to_selected("");

    assert!(harness.app.node(a).unwrap().tags.is_empty());
    assert_eq!(harness.app.undo_depth(), depth);
}

#[test]
fn test_duplicate_stamps_a_copy_tag() {
    let mut harness = TestHarness::new();
    let a = harness.add_card("a", 0.0, 0.0);
    harness.app.toggle_selection(a, false);
    harness.app.add_tag_to_selected("kept-through-copy");

    harness.app.duplicate_selected_nodes();
    let copy_id = harness.app.selection().ordered()[0];
    let copy = harness.app.node(copy_id).unwrap();

    assert!(copy.tags.iter().any(|tag| tag == "kept-through-copy"));
    let stamp_tag = copy
        .tags
        .iter()
        .find(|tag| tag.starts_with("card_copy_"))
        .expect("copy should carry a dated copy tag");
    // card_copy_ + YYMMDD
    assert_eq!(stamp_tag.len(), "card_copy_".len() + 6);
}

#[test]
fn test_tagging_with_empty_selection_is_noop() {
    let mut harness = TestHarness::new();
    let a = harness.add_card("a", 0.0, 0.0);
    let depth = harness.app.undo_depth();

    harness.app.add_tag_to_selected("nobody-selected");
    harness.app.remove_tag_from_selected("nobody-selected");

    assert!(harness.app.node(a).unwrap().tags.is_empty());
    assert_eq!(harness.app.undo_depth(), depth);
}
