// Watch crate: the runtime systems around PropertyWatcher.
// Arming (one-shot accessor resolution), the per-frame poll/compare/act tick,
// and config-driven watcher spawning.

use bevy::prelude::*;
use pw_core::{WatchArmSet, WatchTickSet};

mod binding;
mod systems;

pub use binding::spawn_watchers_from_config;

pub struct WatchPlugin;

impl Plugin for WatchPlugin {
    fn build(&self, app: &mut App) {
        // Binding runs after the host's Startup scene spawning so entity
        // names are resolvable.
        app.add_systems(PostStartup, binding::spawn_watchers_from_config);
        app.add_systems(
            Update,
            (
                systems::arm_watchers.in_set(WatchArmSet),
                systems::tick_watchers.in_set(WatchTickSet),
            ),
        );
        // TODO: allow ticking on the fixed-timestep schedule as an alternative
        // to Update.
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn plugin_adds() {
        let mut app = App::new();
        app.add_plugins(MinimalPlugins);
        app.add_plugins(pw_core::CorePlugin);
        app.add_plugins(WatchPlugin);
        app.update();
    }
}
