//! Drives complete craft sessions through the workbench with pointer input
//! projected through the scene camera.

use craftbench_core::{FrameTick, ItemRef};
use craftbench_testkit::{bare_item, cube_item, sample_items, EventRecord, JsonlSink};
use craftbench_workbench::{CraftScene, PointerInput, Workbench, WorkbenchConfig, UNNAMED_CREATION};
use craftbench_world::{Containers, SlotRef, StartOutcome, TraceEvent, TraceState};
use glam::{Vec2, Vec3};
use std::cell::Cell;
use std::path::Path;
use std::rc::Rc;

const DT: f64 = 1.0 / 60.0;

fn config(dir: &Path) -> WorkbenchConfig {
    WorkbenchConfig {
        save_dir: dir.to_path_buf(),
        icon_size: 32,
        ..WorkbenchConfig::default()
    }
}

fn bench_with_items(config: &WorkbenchConfig, items: &[ItemRef]) -> CraftScene {
    let mut scene = CraftScene::with_bench(&config.surface_tag, Vec2::new(640.0, 480.0));
    let spots = [
        Vec3::new(-0.4, 0.1, 0.0),
        Vec3::new(0.4, 0.1, 0.0),
        Vec3::new(0.0, 0.1, 0.4),
        Vec3::new(0.0, 0.1, -0.4),
    ];
    for (item, spot) in items.iter().zip(spots) {
        scene.place_item(item, spot);
    }
    scene
}

/// Screen position over the bench directly below the current head waypoint.
fn head_on_screen(bench: &Workbench, scene: &CraftScene) -> Vec2 {
    let head = bench.guide().unwrap().points[0];
    scene.screen_point(Vec3::new(head.x, 0.0, head.z)).unwrap()
}

fn trace_to_success(bench: &mut Workbench, scene: &CraftScene) {
    let start = head_on_screen(bench, scene);
    let first = bench.frame(DT, PointerInput::down(start), scene);
    assert!(matches!(first, Some(TraceEvent::Reached { .. })));
    loop {
        let at = head_on_screen(bench, scene);
        match bench.frame(DT, PointerInput::hold(at), scene) {
            Some(TraceEvent::Reached { .. }) => continue,
            Some(TraceEvent::Succeeded) => break,
            other => panic!("unexpected trace event {other:?}"),
        }
    }
    assert_eq!(bench.state(), TraceState::Success);
}

#[test]
fn full_craft_stores_item_and_persists_it() {
    let dir = tempfile::tempdir().expect("temp dir");
    let config = config(dir.path());
    let mut bench = Workbench::new(config.clone());

    let refreshes = Rc::new(Cell::new(0));
    let counter = refreshes.clone();
    bench.add_observer(Box::new(move |_: &Containers| counter.set(counter.get() + 1)));
    bench.initialize(Vec::new(), Vec::new());
    assert_eq!(refreshes.get(), 1);

    let mut scene = bench_with_items(&config, &sample_items()[..3]);
    assert!(bench.can_craft(&scene));
    assert_eq!(bench.start_craft(&scene), StartOutcome::Started);
    assert_eq!(bench.start_craft(&scene), StartOutcome::SessionActive);
    assert_eq!(bench.guide().unwrap().points.len(), 6);

    trace_to_success(&mut bench, &scene);

    let crafted = bench.confirm_craft("  Contraption ", &mut scene).unwrap();
    assert_eq!(crafted.item.name, "Contraption");
    assert_eq!(crafted.item.description, "Player-crafted fusion of 3 items");
    assert_eq!(crafted.consumed, 3);
    assert!(scene.items.is_empty());
    assert_eq!(bench.state(), TraceState::Idle);
    assert_eq!(refreshes.get(), 2);

    let icon = crafted.item.icon.as_ref().unwrap();
    assert_eq!(icon.width(), 32);
    assert!(icon.opaque_pixel_count() > 0);
    assert!(crafted.item.mesh.as_ref().unwrap().bounds().center().length() < 1e-4);

    assert_eq!(bench.containers().storage.count_item("Contraption"), 1);
    assert_eq!(bench.store().record().items.len(), 1);
    assert_eq!(bench.store().record().items[0].id, crafted.id);

    bench.close();

    let mut reopened = Workbench::new(config);
    reopened.initialize(Vec::new(), Vec::new());
    assert!(reopened.catalog().contains("Contraption"));
    assert_eq!(reopened.containers().storage.count_item("Contraption"), 1);
}

#[test]
fn blank_name_becomes_unnamed_creation() {
    let dir = tempfile::tempdir().expect("temp dir");
    let config = config(dir.path());
    let mut bench = Workbench::new(config.clone());
    bench.initialize(Vec::new(), Vec::new());

    let mut scene = bench_with_items(&config, &sample_items()[..2]);
    bench.start_craft(&scene);
    trace_to_success(&mut bench, &scene);
    let crafted = bench.confirm_craft("   ", &mut scene).unwrap();
    assert_eq!(crafted.item.name, UNNAMED_CREATION);
}

#[test]
fn too_few_items_is_a_no_op() {
    let dir = tempfile::tempdir().expect("temp dir");
    let config = config(dir.path());
    let mut bench = Workbench::new(config.clone());
    bench.initialize(Vec::new(), Vec::new());

    let mut scene = bench_with_items(&config, &sample_items()[..2]);
    scene.items[1].active = false;
    assert!(!bench.can_craft(&scene));
    assert_eq!(bench.start_craft(&scene), StartOutcome::TooFewItems);
    assert_eq!(bench.state(), TraceState::Idle);
    assert!(bench.confirm_craft("Nope", &mut scene).is_none());
}

#[test]
fn early_release_fails_then_resets_after_delay() {
    let dir = tempfile::tempdir().expect("temp dir");
    let config = config(dir.path());
    let mut bench = Workbench::new(config.clone());
    bench.initialize(Vec::new(), Vec::new());
    let scene = bench_with_items(&config, &sample_items()[..3]);

    bench.start_craft(&scene);
    let at = head_on_screen(&bench, &scene);
    bench.frame(DT, PointerInput::down(at), &scene);
    assert_eq!(
        bench.frame(DT, PointerInput::up(at), &scene),
        Some(TraceEvent::Failed)
    );
    assert_eq!(bench.state(), TraceState::Failed);
    assert!(bench.reset_pending());
    assert_eq!(bench.start_craft(&scene), StartOutcome::SessionActive);

    bench.frame(1.0, PointerInput::idle(at), &scene);
    assert_eq!(bench.state(), TraceState::Failed);
    bench.frame(0.6, PointerInput::idle(at), &scene);
    assert_eq!(bench.state(), TraceState::Idle);
    assert!(!bench.reset_pending());
    assert_eq!(bench.start_craft(&scene), StartOutcome::Started);
}

#[test]
fn pointer_off_the_bench_never_advances() {
    let dir = tempfile::tempdir().expect("temp dir");
    let config = WorkbenchConfig {
        surface_tag: "SomewhereElse".to_string(),
        ..config(dir.path())
    };
    let mut bench = Workbench::new(config.clone());
    bench.initialize(Vec::new(), Vec::new());
    let mut scene = bench_with_items(&config, &sample_items()[..2]);
    scene.surfaces[0].tag = "WorkbenchArea".to_string();

    bench.start_craft(&scene);
    let at = head_on_screen(&bench, &scene);
    assert_eq!(bench.frame(DT, PointerInput::down(at), &scene), Some(TraceEvent::Began));
    for _ in 0..10 {
        assert_eq!(bench.frame(DT, PointerInput::hold(at), &scene), None);
    }
    assert_eq!(bench.guide().unwrap().points.len(), 5);
}

#[test]
fn close_cancels_drag_and_pending_reset_and_saves() {
    let dir = tempfile::tempdir().expect("temp dir");
    let config = config(dir.path());
    let mut bench = Workbench::new(config.clone());
    bench.initialize(
        vec![cube_item("Gear", 0.2, 0, [200, 40, 40, 255])],
        vec![bare_item("Bolt")],
    );
    let scene = bench_with_items(&config, &sample_items()[..2]);

    bench.start_craft(&scene);
    let at = head_on_screen(&bench, &scene);
    bench.frame(DT, PointerInput::down(at), &scene);
    bench.frame(DT, PointerInput::up(at), &scene);
    assert!(bench.reset_pending());
    assert!(bench.begin_drag(SlotRef::player(0)));

    bench.close();
    assert!(!bench.reset_pending());
    assert_eq!(bench.containers().dragging(), None);
    assert_eq!(bench.state(), TraceState::Idle);

    let mut reopened = Workbench::new(config);
    reopened.initialize(Vec::new(), Vec::new());
    assert_eq!(reopened.containers().storage.count_item("Gear"), 1);
    assert_eq!(reopened.containers().player.count_item("Bolt"), 1);
}

#[test]
fn drag_between_containers_refreshes_observers() {
    let dir = tempfile::tempdir().expect("temp dir");
    let mut bench = Workbench::new(config(dir.path()));
    let refreshes = Rc::new(Cell::new(0));
    let counter = refreshes.clone();
    bench.add_observer(Box::new(move |_: &Containers| counter.set(counter.get() + 1)));
    bench.initialize(
        vec![bare_item("Gear")],
        vec![bare_item("Gear"), bare_item("Bolt")],
    );
    assert_eq!(refreshes.get(), 1);

    assert!(bench.begin_drag(SlotRef::player(0)));
    bench.drop_on(SlotRef::storage(0));
    assert_eq!(refreshes.get(), 2);
    assert_eq!(bench.containers().storage.count_item("Gear"), 2);
    assert!(bench.containers().slot(SlotRef::player(0)).unwrap().is_empty());

    assert!(!bench.begin_drag(SlotRef::player(0)));
    assert!(bench.begin_drag(SlotRef::player(1)));
    assert!(bench.cancel_drag());
    assert_eq!(refreshes.get(), 2);
}

#[test]
fn confirm_with_no_session_items_left_returns_to_idle() {
    let dir = tempfile::tempdir().expect("temp dir");
    let config = config(dir.path());
    let mut bench = Workbench::new(config.clone());
    bench.initialize(Vec::new(), Vec::new());
    let mut scene = bench_with_items(&config, &sample_items()[..2]);

    bench.start_craft(&scene);
    trace_to_success(&mut bench, &scene);
    for item in &mut scene.items {
        item.active = false;
    }

    assert!(bench.confirm_craft("Ghost", &mut scene).is_none());
    assert_eq!(bench.state(), TraceState::Idle);
    assert!(bench.session_items().is_empty());
    assert_eq!(scene.items.len(), 2);
    assert!(bench.store().record().items.is_empty());

    for item in &mut scene.items {
        item.active = true;
    }
    assert_eq!(bench.start_craft(&scene), StartOutcome::Started);
}

#[test]
fn item_placed_during_trace_is_not_fused() {
    let dir = tempfile::tempdir().expect("temp dir");
    let config = config(dir.path());
    let mut bench = Workbench::new(config.clone());
    bench.initialize(Vec::new(), Vec::new());
    let items = sample_items();
    let mut scene = bench_with_items(&config, &items[..2]);

    bench.start_craft(&scene);
    assert_eq!(bench.session_items().len(), 2);
    trace_to_success(&mut bench, &scene);
    let late = scene.place_item(&items[2], Vec3::new(0.0, 0.1, 0.4));
    let late_id = scene.items[late].id;

    let crafted = bench.confirm_craft("Pair", &mut scene).unwrap();
    assert_eq!(crafted.consumed, 2);
    assert_eq!(crafted.item.description, "Player-crafted fusion of 2 items");
    assert_eq!(scene.items.len(), 1);
    assert_eq!(scene.items[0].id, late_id);
    assert!(scene.items[0].active);
    assert!(bench.session_items().is_empty());
}

#[test]
fn craft_session_event_log() {
    let dir = tempfile::tempdir().expect("temp dir");
    let config = config(dir.path());
    let log_path = dir.path().join("craft_session_worldtest.jsonl");
    let mut event_log = JsonlSink::create(&log_path).expect("create event log");

    let mut bench = Workbench::new(config.clone());
    bench.initialize(Vec::new(), Vec::new());
    let mut scene = bench_with_items(&config, &sample_items()[..3]);
    assert_eq!(bench.start_craft(&scene), StartOutcome::Started);

    let mut tick = FrameTick::ZERO;
    let mut logged = 0;
    let mut pointer = PointerInput::down(head_on_screen(&bench, &scene));
    loop {
        tick = tick.advance(1);
        let event = bench.frame(DT, pointer, &scene);
        if let Some(event) = event {
            event_log
                .write(&EventRecord {
                    tick,
                    kind: "TraceEvent",
                    payload: &format!("{event:?}"),
                })
                .expect("write event");
            logged += 1;
        }
        if event == Some(TraceEvent::Succeeded) {
            break;
        }
        assert!(tick.0 < 100, "trace did not finish");
        pointer = PointerInput::hold(head_on_screen(&bench, &scene));
    }

    let crafted = bench.confirm_craft("Logged", &mut scene).unwrap();
    event_log
        .write(&EventRecord {
            tick,
            kind: "Crafted",
            payload: &format!("{} ({} parts)", crafted.item.name, crafted.consumed),
        })
        .expect("write event");
    drop(event_log);

    let contents = std::fs::read_to_string(&log_path).expect("read event log");
    let lines: Vec<&str> = contents.lines().collect();
    // 3 items: 6 waypoints, 5 pops, the last one reported as success.
    assert_eq!(logged, 5);
    assert_eq!(lines.len(), logged + 1);
    assert!(lines[logged - 1].contains("Succeeded"));
    assert!(lines[logged].contains("\"kind\":\"Crafted\""));
    assert!(lines[logged].contains("Logged (3 parts)"));
}
