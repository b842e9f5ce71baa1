//! Config-driven watcher spawning: turns loaded watcher definitions into live
//! watcher entities by resolving entity names.

use bevy::prelude::*;

use pw_core::{PropertyWatcher, WatchConfigRes};

/// System (PostStartup): spawn one watcher entity per configured definition.
///
/// A name that matches no live entity leaves the corresponding handle unset,
/// which makes the watcher inert -- the same outcome as an unassigned
/// inspector field. That is reported once, not treated as an error.
pub fn spawn_watchers_from_config(
    mut commands: Commands,
    cfg: Option<Res<WatchConfigRes>>,
    named: Query<(Entity, &Name)>,
) {
    let Some(cfg) = cfg else { return };
    for (index, def) in cfg.0.watchers.iter().enumerate() {
        let source = find_named(&named, &def.source);
        let target = find_named(&named, &def.target);
        if source.is_none() {
            warn!(
                index,
                source = def.source.as_str(),
                "watcher source entity not found; watcher will be inert"
            );
        }
        if target.is_none() {
            warn!(
                index,
                target = def.target.as_str(),
                "watcher target entity not found; trigger will have no effect"
            );
        }
        commands.spawn(PropertyWatcher {
            source,
            target,
            source_property: def.source_property.clone(),
            target_property: def.target_property.clone().unwrap_or_default(),
            trigger: def.trigger,
            condition_value: def.condition_value,
            action: def.action,
        });
    }
    info!(watchers = cfg.0.watchers.len(), "Watchers spawned from config");
}

fn find_named(named: &Query<(Entity, &Name)>, wanted: &str) -> Option<Entity> {
    if wanted.is_empty() {
        return None;
    }
    named
        .iter()
        .find(|(_, name)| name.as_str() == wanted)
        .map(|(entity, _)| entity)
}

#[cfg(test)]
mod tests {
    use super::*;
    use pw_config::{Trigger, WatchConfig, WatcherDef};

    fn test_app(cfg: WatchConfig) -> App {
        let mut app = App::new();
        app.add_plugins(MinimalPlugins);
        app.add_plugins(pw_core::CorePlugin);
        app.add_plugins(crate::WatchPlugin);
        app.insert_resource(WatchConfigRes(cfg));
        app
    }

    fn one_watcher_config(source: &str, target: &str) -> WatchConfig {
        WatchConfig {
            watchers: vec![WatcherDef {
                source: source.into(),
                source_property: "Gauge.level".into(),
                trigger: Trigger::MoreThan,
                condition_value: 3.0,
                target: target.into(),
                ..Default::default()
            }],
            ..Default::default()
        }
    }

    #[test]
    fn binds_named_entities() {
        let mut app = test_app(one_watcher_config("clock", "banner"));
        let clock = app.world_mut().spawn(Name::new("clock")).id();
        let banner = app.world_mut().spawn(Name::new("banner")).id();
        app.update();

        let world = app.world_mut();
        let mut q = world.query::<&PropertyWatcher>();
        let watchers: Vec<_> = q.iter(world).collect();
        assert_eq!(watchers.len(), 1);
        assert_eq!(watchers[0].source, Some(clock));
        assert_eq!(watchers[0].target, Some(banner));
        assert_eq!(watchers[0].source_property, "Gauge.level");
        assert_eq!(watchers[0].trigger, Trigger::MoreThan);
        assert_eq!(watchers[0].condition_value, 3.0);
    }

    #[test]
    fn unknown_names_bind_unset_handles() {
        let mut app = test_app(one_watcher_config("nope", "missing"));
        app.update();

        let world = app.world_mut();
        let mut q = world.query::<&PropertyWatcher>();
        let watchers: Vec<_> = q.iter(world).collect();
        assert_eq!(watchers.len(), 1, "watcher spawns even when names miss");
        assert_eq!(watchers[0].source, None);
        assert_eq!(watchers[0].target, None);
    }

    #[test]
    fn no_config_resource_spawns_nothing() {
        let mut app = App::new();
        app.add_plugins(MinimalPlugins);
        app.add_plugins(pw_core::CorePlugin);
        app.add_plugins(crate::WatchPlugin);
        app.update();

        let world = app.world_mut();
        let mut q = world.query::<&PropertyWatcher>();
        assert_eq!(q.iter(world).count(), 0);
    }

    #[test]
    fn empty_name_is_unset_without_lookup() {
        let mut app = test_app(one_watcher_config("", "banner"));
        // An entity whose Name is the empty string must not be picked up.
        app.world_mut().spawn(Name::new(""));
        app.world_mut().spawn(Name::new("banner"));
        app.update();

        let world = app.world_mut();
        let mut q = world.query::<&PropertyWatcher>();
        let watchers: Vec<_> = q.iter(world).collect();
        assert_eq!(watchers[0].source, None);
        assert!(watchers[0].target.is_some());
    }
}
