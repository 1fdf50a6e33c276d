use std::error::Error;
use std::path::{Path, PathBuf};
use std::process::ExitCode;

use clap::{Parser, Subcommand};
use latecall_core::scene::stock::{Light, Timer, Transform};
use latecall_core::{
    CallKind, CallSheet, CallStatus, CallVariant, Combine, Condition, EntityRef, Scene,
    TypeRegistry, Value, candidates, supported_for,
};
use tracing_subscriber::EnvFilter;

type AppResult<T> = Result<T, Box<dyn Error>>;

#[derive(Parser)]
#[command(name = "latecall", version, about = "Drive persisted deferred calls against a demo scene")]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Load a call sheet and run it for a number of ticks.
    Run {
        sheet: PathBuf,
        #[arg(long, default_value_t = 10)]
        ticks: u32,
        /// Seconds per tick.
        #[arg(long, default_value_t = 0.25)]
        dt: f64,
    },
    /// List the methods calls on the demo entities could be assigned.
    Candidates {
        /// Only bool-returning methods usable as conditions.
        #[arg(long)]
        predicates: bool,
    },
    /// Print a sample sheet for the demo scene.
    Template,
}

fn main() -> ExitCode {
    let filter = EnvFilter::try_from_env("LATECALL_LOG").unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(true)
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let result = match cli.command {
        Command::Run { sheet, ticks, dt } => run(&sheet, ticks, dt),
        Command::Candidates { predicates } => list_candidates(predicates),
        Command::Template => print_template(),
    };
    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            tracing::error!("{e}");
            ExitCode::FAILURE
        }
    }
}

// ─── Demo scene ───────────────────────────────────────────────────────────────

/// Built the same way every time, so refs stored in a sheet line up.
struct Demo {
    scene: Scene,
    lamp:  EntityRef,
    clock: EntityRef,
}

fn demo() -> AppResult<Demo> {
    let mut scene = Scene::new();
    let lamp = scene.spawn("lamp");
    scene.attach(lamp, Transform::default()).ok_or("cannot attach transform")?;
    scene.attach(lamp, Light::default()).ok_or("cannot attach light")?;
    let clock = scene.spawn("clock");
    scene.attach(clock, Timer { remaining: 1.0, running: true }).ok_or("cannot attach timer")?;
    Ok(Demo { scene, lamp, clock })
}

/// A call assigned to the candidate listed as `menu_path` on `root`, with
/// every parameter slot filled with its default.
fn pick(
    registry:  &TypeRegistry,
    scene:     &Scene,
    root:      EntityRef,
    kind:      CallKind,
    menu_path: &str,
) -> AppResult<CallVariant> {
    let found = candidates(registry, scene, root, &supported_for(kind))
        .into_iter()
        .find(|c| c.menu_path == menu_path)
        .ok_or_else(|| format!("no candidate `{menu_path}`"))?;
    let mut call = CallVariant::new(kind);
    call.select(&found, scene)?;
    call.arguments.populate_defaults(&found.method.params);
    Ok(call)
}

// ─── Commands ─────────────────────────────────────────────────────────────────

fn run(path: &Path, ticks: u32, dt: f64) -> AppResult<()> {
    let text = std::fs::read_to_string(path)
        .map_err(|e| format!("cannot read {}: {e}", path.display()))?;
    let mut sheet = CallSheet::from_json(&text)
        .map_err(|e| format!("{}: [{}] {e}", path.display(), e.code()))?;
    let registry = TypeRegistry::standard();
    let Demo { mut scene, clock, .. } = demo()?;

    for (i, call) in sheet.actions.iter().enumerate() {
        if let CallStatus::Stale(e) = call.status(&registry, &scene) {
            tracing::warn!(action = i, call = %call.descriptor.label(), code = %e.code(), "stale before run: {e}");
        }
    }

    // The host advances the clock through the same call machinery.
    let mut tick = pick(&registry, &scene, clock, CallKind::Action, "Timer/Tick (dt: float)")?;
    tick.arguments.set("dt", dt);

    let mut held = false;
    for n in 0..ticks {
        tick.invoke(&registry, &mut scene);
        let holds = sheet.conditions_hold(&registry, &mut scene);
        if holds && !held {
            let summary = sheet.actions.invoke_all(&registry, &mut scene);
            tracing::info!(
                tick = n,
                completed = summary.completed,
                skipped = summary.skipped,
                failed = summary.failed,
                "actions fired",
            );
        }
        held = holds;
    }

    for (i, call) in sheet.actions.iter().enumerate() {
        if call.has_error() {
            println!("action {i}: {}", call.last_error());
        } else {
            println!("action {i}: ok");
        }
    }
    Ok(())
}

fn list_candidates(predicates: bool) -> AppResult<()> {
    let kind = if predicates { CallKind::Predicate } else { CallKind::Action };
    let registry = TypeRegistry::standard();
    let demo = demo()?;
    let filter = supported_for(kind);
    for (name, root) in [("lamp", demo.lamp), ("clock", demo.clock)] {
        for c in candidates(&registry, &demo.scene, root, &filter) {
            println!("{name}: {}", c.menu_path);
        }
    }
    Ok(())
}

fn print_template() -> AppResult<()> {
    let registry = TypeRegistry::standard();
    let Demo { scene, lamp, clock } = demo()?;

    let mut sheet = CallSheet::new();
    sheet.conditions.push(
        Condition::new(Combine::All).with(pick(&registry, &scene, clock, CallKind::Predicate, "Timer/IsReady ()")?),
    );

    let mut mode = pick(&registry, &scene, lamp, CallKind::Action, "Light/SetMode (mode: LightMode)")?;
    mode.arguments.set("mode", Value::Enum { ty: "scene::LightMode".into(), index: 2 });
    sheet.actions.push(mode);

    let mut intensity = pick(&registry, &scene, lamp, CallKind::Action, "Light/SetIntensity (intensity: float)")?;
    intensity.arguments.set("intensity", 2.5);
    sheet.actions.push(intensity);

    let mut lift = pick(&registry, &scene, lamp, CallKind::Action, "Transform/Translate (delta: vec3)")?;
    lift.arguments.set("delta", (0.0, 1.0, 0.0));
    sheet.actions.push(lift);

    println!("{}", sheet.to_json()?);
    Ok(())
}
