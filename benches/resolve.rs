//! Benchmarks for the keypress hot path
//!
//! Run with: cargo bench resolve

use shellflow_keys::keymap::{
    build_table, compute_active_contexts, default_groups, parse_chord, ContextExpr, KeyChord,
    MappingTable, StateSnapshot,
};

fn main() {
    divan::main();
}

fn table() -> MappingTable {
    build_table(&default_groups().unwrap(), &[]).unwrap()
}

fn drawer_state() -> StateSnapshot {
    serde_json::from_str(
        r#"{"focusedEntity": "worktree", "focusedView": "drawer", "drawerOpen": true, "entityCount": 3}"#,
    )
    .unwrap()
}

// ============================================================================
// Resolution
// ============================================================================

#[divan::bench(args = ["cmd-w", "cmd-q", "escape", "ctrl-shift-f12"])]
fn resolve_default_table(bencher: divan::Bencher, chord: &str) {
    let table = table();
    let chord: KeyChord = parse_chord(chord).unwrap();
    let active = compute_active_contexts(&drawer_state());

    bencher.bench_local(|| divan::black_box(table.resolve(divan::black_box(&chord), &active)));
}

#[divan::bench]
fn compute_contexts(bencher: divan::Bencher) {
    let state = drawer_state();
    bencher.bench_local(|| compute_active_contexts(divan::black_box(&state)));
}

// ============================================================================
// Loading
// ============================================================================

#[divan::bench]
fn build_default_table() -> MappingTable {
    table()
}

#[divan::bench]
fn parse_expression() -> ContextExpr {
    ContextExpr::parse(divan::black_box(
        "(mainFocused || drawerFocused) && !(pickerOpen || modalOpen || paletteOpen)",
    ))
    .unwrap()
}
