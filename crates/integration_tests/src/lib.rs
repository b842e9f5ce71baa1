// Black-box integration tests across the published plugin APIs.
// Builds headless Apps (MinimalPlugins) wired the way the binary wires them,
// then drives frames and observes Active flags.

use bevy::prelude::*;
use pw_core::{CorePlugin, PropertyRegistry, PropertyValue};
use pw_watch::WatchPlugin;

/// Demo-grade source component used across scenarios.
#[derive(Component, Debug, Default)]
pub struct Gauge {
    pub level: i32,
    pub ratio: f32,
    pub lit: bool,
}

/// Headless app with the full watcher stack and Gauge's properties published.
pub fn build_watch_app() -> App {
    let mut app = App::new();
    app.add_plugins(MinimalPlugins);
    app.add_plugins(CorePlugin);
    app.add_plugins(WatchPlugin);
    {
        let mut registry = app.world_mut().resource_mut::<PropertyRegistry>();
        registry.register::<Gauge>("level", |g| PropertyValue::Int(g.level));
        registry.register::<Gauge>("ratio", |g| PropertyValue::Float(g.ratio));
        registry.register::<Gauge>("lit", |g| PropertyValue::Bool(g.lit));
    }
    app
}
