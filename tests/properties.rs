/// Behavioural checks for the level gate, flow tree renderer and recorder,
/// driven through the public API with a manual frame source.

use callflow::domain::callgraph::CallGraph;
use callflow::domain::flowgraph::render;
use callflow::infrastructure::{ColorMode, FixedClock, ManualFrameSource, MemorySink};
use callflow::{Diagnostics, LevelGate, LogCategory, SamplingMode, TracedFailure};
use std::sync::Arc;

fn diagnostics(frames: &ManualFrameSource) -> (Diagnostics, Arc<MemorySink>) {
    let sink = Arc::new(MemorySink::new());
    let diag = Diagnostics::builder()
        .sink(sink.clone())
        .clock(Arc::new(FixedClock::new("10:20:30")))
        .frames(Arc::new(frames.clone()))
        .color(ColorMode::Never)
        .build();
    (diag, sink)
}

#[test]
fn empty_configure_never_changes_state() {
    let gate = LevelGate::new();
    let initial = gate.snapshot();
    gate.configure(Vec::<&str>::new());
    assert_eq!(gate.snapshot(), initial);

    gate.configure(["info"]);
    let configured = gate.snapshot();
    gate.configure(Vec::<&str>::new());
    assert_eq!(gate.snapshot(), configured);
}

#[test]
fn explicit_categories_override_all_enabled() {
    let gate = LevelGate::new();
    gate.configure(["INFO", "ERROR"]);
    assert!(gate.is_enabled(LogCategory::Info));
    assert!(gate.is_enabled(LogCategory::Error));
    assert!(!gate.is_enabled(LogCategory::Warn));
    assert!(!gate.is_enabled(LogCategory::Res));
    assert!(!gate.is_enabled(LogCategory::FlowChecker));
    assert!(!gate.is_enabled(LogCategory::All));
}

#[test]
fn all_token_restores_startup_state() {
    let gate = LevelGate::new();
    gate.configure(["INFO", "ALL"]);
    assert_eq!(gate.snapshot(), LevelGate::new().snapshot());
    assert!(gate.is_enabled(LogCategory::All));
}

#[test]
fn render_is_deterministic_preorder() {
    let cg = CallGraph::from_adjacency([
        ("A", &["B", "C"][..]),
        ("B", &["D"][..]),
        ("C", &[][..]),
        ("D", &[][..]),
    ]);
    let expected = "- A\n  - B\n    - D\n  - C\n";
    assert_eq!(render(&cg, "A"), expected);
    assert_eq!(render(&cg, "A"), expected);
}

#[test]
fn render_survives_cycles() {
    let cg = CallGraph::from_adjacency([("A", &["B"][..]), ("B", &["A"][..])]);
    let text = render(&cg, "A");
    assert_eq!(text.lines().collect::<Vec<_>>(), vec!["- A", "  - B"]);
}

#[test]
fn sequential_sessions_do_not_leak_edges() {
    let frames = ManualFrameSource::new();
    let (diag, _sink) = diagnostics(&frames);
    let _root = frames.enter("app::driver");

    let first = diag.run_traced(|| {
        let _f = frames.enter("app::ingest");
        diag.observe();
    });
    let second = diag.run_traced(|| {
        let _f = frames.enter("app::export");
        diag.observe();
    });

    assert_eq!(first, "- app::driver\n  - app::ingest\n");
    assert_eq!(second, "- app::driver\n  - app::export\n");
    assert!(!second.contains("ingest"));
}

#[test]
fn panicking_invocation_still_yields_tree() {
    let frames = ManualFrameSource::new();
    let (diag, _sink) = diagnostics(&frames);
    let _root = frames.enter("app::driver");

    let tree = diag.run_traced(|| {
        let _f = frames.enter("app::explode");
        diag.observe();
        panic!("traced code failed");
    });
    assert_eq!(tree, "- app::driver\n  - app::explode\n");

    let report = diag.run_traced_report(|| panic!("again"));
    assert_eq!(report.tree, "- app::driver\n");
    assert_eq!(
        report.failure,
        Some(TracedFailure::Panicked {
            message: "again".to_string()
        })
    );
}

#[test]
fn sibling_calls_are_all_recorded_with_entry_sampling() {
    let frames = ManualFrameSource::new();
    let (diag, sink) = diagnostics(&frames);
    diag.configure(["flow_checker"]);
    let _root = frames.enter("app::main");

    let step = |name: &str| {
        let _f = frames.enter(name);
        let _flow = diag.trace(name, &[]);
    };
    let tree = diag.run_traced(|| {
        let _f = frames.enter("app::main::{{closure}}");
        step("app::fetch");
        step("app::decode");
        step("app::fetch");
    });

    assert_eq!(
        tree,
        "- app::main\n  - app::main::{{closure}}\n    - app::fetch\n    - app::decode\n"
    );
    let graph = diag.recorder().graph_snapshot();
    assert_eq!(
        graph.callees("app::main::{{closure}}"),
        ["app::fetch", "app::decode", "app::fetch"]
    );
    assert_eq!(sink.lines().len(), 6);
}

#[test]
fn unwind_only_sampling_misses_returned_calls() {
    let frames = ManualFrameSource::new();
    let sink = Arc::new(MemorySink::new());
    let diag = Diagnostics::builder()
        .sink(sink)
        .frames(Arc::new(frames.clone()))
        .sampling(SamplingMode::UnwindOnly)
        .build();
    let _root = frames.enter("app::main");

    let tree = diag.run_traced(|| {
        let _f = frames.enter("app::fetch");
        let _flow = diag.trace("app::fetch", &[]);
    });
    assert_eq!(tree, "- app::main\n");
}

#[test]
fn separate_contexts_are_isolated() {
    let frames_a = ManualFrameSource::new();
    let frames_b = ManualFrameSource::new();
    let (a, _) = diagnostics(&frames_a);
    let (b, _) = diagnostics(&frames_b);
    a.configure(["error"]);
    assert!(b.is_enabled(LogCategory::Info));

    let _ra = frames_a.enter("a::root");
    let _rb = frames_b.enter("b::root");
    let mut tree_b = String::new();
    let tree_a = a.run_traced(|| {
        let _x = frames_a.enter("a::x");
        a.observe();
        tree_b = b.run_traced(|| {
            let _y = frames_b.enter("b::y");
            b.observe();
        });
    });
    assert_eq!(tree_a, "- a::root\n  - a::x\n");
    assert_eq!(tree_b, "- b::root\n  - b::y\n");
}
