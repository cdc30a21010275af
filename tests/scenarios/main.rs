
mod selection;
mod tags;
mod undo_redo;

use mindcanvas::VERSION;

#[test]
fn scenarios_binary_smoke_runs() {
    assert!(!VERSION.is_empty());
}
