//! craftbench - headless driver for the crafting workbench
//!
//! Builds a demo bench, traces the craft path (from a pointer script or by
//! following the guide) and confirms the craft under the given name.

mod demo;
mod scripted_input;

use anyhow::Result;
use craftbench_workbench::{CraftScene, PointerInput, Workbench, WorkbenchConfig};
use craftbench_world::{Containers, StartOutcome, TraceEvent, TraceState};
use glam::Vec3;
use scripted_input::PointerScript;
use std::{env, path::PathBuf};
use tracing::{debug, info, warn};

const FRAME_DT: f64 = 1.0 / 60.0;
const MAX_AUTO_FRAMES: usize = 600;

fn main() -> Result<()> {
    // Initialize tracing with WARN level by default (can be overridden via RUST_LOG env var)
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("warn")),
        )
        .init();

    info!("Starting craftbench v{}", env!("CARGO_PKG_VERSION"));

    let cli = CliOptions::parse(env::args().skip(1));
    let mut config = match &cli.config {
        Some(path) => WorkbenchConfig::load_from_path(path),
        None => WorkbenchConfig::load(),
    };
    if let Some(dir) = cli.save_dir.clone() {
        config.save_dir = dir;
    }
    let script = cli.script.as_deref().map(PointerScript::from_path).transpose()?;

    let mut bench = Workbench::new(config.clone());
    bench.add_observer(Box::new(|containers: &Containers| {
        debug!(
            player = containers.player.occupied().count(),
            storage = containers.storage.occupied().count(),
            "inventory refreshed"
        );
    }));
    bench.initialize(demo::storage_defaults(), demo::inventory_defaults());

    let mut scene = demo::scene(&config, &demo::storage_defaults());
    match bench.start_craft(&scene) {
        StartOutcome::Started => {}
        outcome => {
            println!("craft not started: {outcome:?}");
            bench.close();
            return Ok(());
        }
    }

    match script {
        Some(script) => play_script(&mut bench, &scene, script),
        None => follow_guide(&mut bench, &scene),
    }

    match bench.state() {
        TraceState::Success => match bench.confirm_craft(&cli.name, &mut scene) {
            Some(crafted) => println!(
                "crafted \"{}\" ({}) from {} items, stored {}",
                crafted.item.name,
                crafted.id,
                crafted.consumed,
                bench.containers().storage.count_item(&crafted.item.name)
            ),
            None => println!("craft could not be confirmed"),
        },
        TraceState::Failed => println!("trace failed"),
        state => println!("trace incomplete ({state:?})"),
    }

    bench.close();
    println!("saved to {}", config.save_path().display());
    Ok(())
}

fn log_event(frame: usize, event: Option<TraceEvent>) {
    if let Some(event) = event {
        info!(frame, ?event, "trace event");
    }
}

fn play_script(bench: &mut Workbench, scene: &CraftScene, mut script: PointerScript) {
    let mut frame = 0;
    while let Some(pointer) = script.advance(FRAME_DT) {
        log_event(frame, bench.frame(FRAME_DT, pointer, scene));
        frame += 1;
    }
}

/// Press at the guide head and keep the pointer on it until the trace ends.
fn follow_guide(bench: &mut Workbench, scene: &CraftScene) {
    for frame in 0..MAX_AUTO_FRAMES {
        let Some(head) = bench.guide().and_then(|guide| guide.points.first().copied()) else {
            break;
        };
        let Some(at) = scene.screen_point(Vec3::new(head.x, 0.0, head.z)) else {
            warn!("guide head is not visible from the active camera");
            break;
        };
        let pointer = if frame == 0 {
            PointerInput::down(at)
        } else {
            PointerInput::hold(at)
        };
        let event = bench.frame(FRAME_DT, pointer, scene);
        log_event(frame, event);
        if matches!(event, Some(TraceEvent::Succeeded | TraceEvent::Failed)) {
            break;
        }
    }
}

#[derive(Debug)]
struct CliOptions {
    config: Option<PathBuf>,
    save_dir: Option<PathBuf>,
    script: Option<PathBuf>,
    name: String,
}

impl CliOptions {
    fn parse<I: Iterator<Item = String>>(mut args: I) -> Self {
        let mut opts = CliOptions {
            config: None,
            save_dir: None,
            script: None,
            name: String::new(),
        };

        while let Some(arg) = args.next() {
            match arg.as_str() {
                "--config" => {
                    if let Some(path) = args.next() {
                        opts.config = Some(PathBuf::from(path));
                    } else {
                        tracing::error!("--config requires a file path");
                    }
                }
                "--save-dir" => {
                    if let Some(path) = args.next() {
                        opts.save_dir = Some(PathBuf::from(path));
                    } else {
                        tracing::error!("--save-dir requires a directory path");
                    }
                }
                "--script" => {
                    if let Some(path) = args.next() {
                        opts.script = Some(PathBuf::from(path));
                    } else {
                        tracing::error!("--script requires a file path");
                    }
                }
                "--name" => {
                    if let Some(name) = args.next() {
                        opts.name = name;
                    } else {
                        tracing::error!("--name requires a value");
                    }
                }
                other => tracing::warn!(arg = other, "ignoring unknown argument"),
            }
        }

        opts
    }
}
