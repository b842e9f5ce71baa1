/*!
Headless demo host for the watcher stack.

Wires:
* Config loading (layered RON) using pw_config::WatchConfig.
* Validation warnings logging.
* A small demo scene (clock + banners) with registered properties.
* Auto-exit timer driven by run.autoExit.
*/

use std::time::Duration;

use bevy::app::ScheduleRunnerPlugin;
use bevy::log::LogPlugin;
use bevy::prelude::*;

use pw_core::{Active, CorePlugin, PropertyRegistry, PropertyValue, WatchConfigRes};
use pw_watch::WatchPlugin;

// ---------------- Config Loading ----------------

fn load_config() -> pw_config::WatchConfig {
    let (cfg, used, errors) = pw_config::WatchConfig::load_layered([
        std::path::Path::new("assets/config/watch.ron"),
        std::path::Path::new("assets/config/watch.local.ron"),
    ]);
    for e in errors {
        warn!("CONFIG LOAD ISSUE: {e}");
    }
    if used.is_empty() {
        info!("No config layers found; using defaults");
    } else {
        info!(?used, "Config layers loaded");
    }
    cfg
}

// ---------------- Demo scene ----------------

/// Frames elapsed since startup.
#[derive(Component, Debug, Default)]
struct FrameCount {
    frames: i32,
}

/// Seconds elapsed since startup.
#[derive(Component, Debug, Default)]
struct Stopwatch {
    seconds: f32,
}

fn register_demo_properties(mut registry: ResMut<PropertyRegistry>) {
    registry.register::<FrameCount>("frames", |c| PropertyValue::Int(c.frames));
    registry.register::<Stopwatch>("seconds", |s| PropertyValue::Float(s.seconds));
    // Bool-kind property: enumerable, but no trigger ever fires on it.
    registry.register::<Active>("flag", |a| PropertyValue::Bool(a.0));
    info!(properties = ?registry.names().collect::<Vec<_>>(), "Property registry populated");
}

fn spawn_demo_scene(mut commands: Commands) {
    commands.spawn((Name::new("clock"), FrameCount::default(), Stopwatch::default()));
    commands.spawn((Name::new("banner"), Active(false)));
    commands.spawn((Name::new("late-banner"), Active(false)));
}

fn advance_clock(time: Res<Time>, mut q: Query<(&mut FrameCount, &mut Stopwatch)>) {
    for (mut count, mut watch) in &mut q {
        count.frames += 1;
        watch.seconds += time.delta_secs();
    }
}

/// Log Active transitions so a demo run shows when a watcher fired.
fn report_activations(q: Query<(Entity, &Name, &Active), Changed<Active>>) {
    for (entity, name, active) in &q {
        info!(?entity, name = name.as_str(), active = active.0, "active flag changed");
    }
}

// ---------------- Auto exit ----------------

#[derive(Resource, Deref, DerefMut)]
struct AutoExitTimer(Timer);

fn setup_auto_exit(mut commands: Commands, cfg: Res<WatchConfigRes>) {
    let secs = cfg.0.run.auto_exit;
    if secs > 0.0 {
        info!(seconds = secs, "AutoExit: will exit after {secs} seconds");
        commands.insert_resource(AutoExitTimer(Timer::from_seconds(secs, TimerMode::Once)));
    }
}

fn check_auto_exit(
    time: Res<Time>,
    mut timer: Option<ResMut<AutoExitTimer>>,
    mut ev_exit: EventWriter<AppExit>,
) {
    if let Some(t) = timer.as_mut() {
        t.tick(time.delta());
        if t.finished() {
            info!("AutoExit: timer finished, requesting app exit");
            ev_exit.write(AppExit::Success);
        }
    }
}

// ---------------- Main ----------------

fn main() {
    let mut app = App::new();
    // Log plugin first so config diagnostics are visible.
    app.add_plugins(LogPlugin::default());

    let cfg = load_config();
    for w in cfg.validate() {
        warn!("CONFIG WARNING: {w}");
    }
    let tick_hz = if cfg.run.tick_hz > 0.0 { cfg.run.tick_hz } else { 60.0 };
    info!(
        watchers = cfg.watchers.len(),
        tick_hz,
        auto_exit = cfg.run.auto_exit,
        "Runtime summary"
    );

    app.add_plugins(MinimalPlugins.set(ScheduleRunnerPlugin::run_loop(
        Duration::from_secs_f64(1.0 / tick_hz as f64),
    )));
    app.insert_resource(WatchConfigRes(cfg));
    app.add_plugins(CorePlugin);
    app.add_plugins(WatchPlugin);
    app.add_systems(Startup, (register_demo_properties, spawn_demo_scene, setup_auto_exit));
    app.add_systems(Update, (advance_clock, report_activations, check_auto_exit));
    app.run();
}
