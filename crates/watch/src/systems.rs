//! Arming and the per-frame tick.
//!
//! Failure policy: every runtime failure mode (unset source, unknown property
//! name, despawned source, non-numeric value, unset or flagless target)
//! degrades to "no observable effect". The tick never logs, never panics.

use bevy::ecs::world::EntityRef;
use bevy::prelude::*;

use pw_core::{condition_met, Active, ArmedWatch, PropertyRegistry, PropertyWatcher, WatchAction};

/// System: resolve and cache property accessors for watchers that just
/// appeared. Resolution happens exactly once per watcher; a watcher whose
/// source is unset or whose property name is unknown stays inert for its
/// lifetime.
pub(crate) fn arm_watchers(
    mut commands: Commands,
    registry: Res<PropertyRegistry>,
    fresh: Query<(Entity, &PropertyWatcher), Added<PropertyWatcher>>,
) {
    for (entity, watcher) in &fresh {
        if watcher.source.is_none() {
            continue;
        }
        match registry.resolve(&watcher.source_property) {
            Some(accessor) => {
                commands.entity(entity).insert(ArmedWatch { accessor });
            }
            None => {
                // One-time diagnostic; the watcher itself stays silent forever.
                warn!(
                    ?entity,
                    property = watcher.source_property.as_str(),
                    "source property not registered; watcher stays inert"
                );
            }
        }
    }
}

/// System: poll each armed watcher once and apply its action when the trigger
/// condition holds.
///
/// Reads happen through `EntityRef` before any write so a watcher may point
/// at itself or at another watcher's target without conflict.
pub(crate) fn tick_watchers(
    watchers: Query<(&PropertyWatcher, &ArmedWatch)>,
    mut access: ParamSet<(Query<EntityRef>, Query<&mut Active>)>,
) {
    let mut fired: Vec<Entity> = Vec::new();
    {
        let sources = access.p0();
        for (watcher, armed) in &watchers {
            let Some(source) = watcher.source else { continue };
            let Ok(source_ref) = sources.get(source) else { continue };
            let Some(value) = (armed.accessor)(source_ref) else { continue };
            if !condition_met(watcher.trigger, value, watcher.condition_value) {
                continue;
            }
            let Some(target) = watcher.target else { continue };
            // Disable and Set are selectable but currently share the enable
            // effect; their distinct semantics are undecided.
            // TODO: give Disable and Set their own effects once the intended
            // behavior is settled.
            match watcher.action {
                WatchAction::Enable | WatchAction::Disable | WatchAction::Set => {
                    fired.push(target);
                }
            }
        }
    }
    let mut targets = access.p1();
    for entity in fired {
        if let Ok(mut active) = targets.get_mut(entity) {
            // Re-asserting an already-active target is a no-op (and keeps
            // change detection quiet).
            if !active.0 {
                active.0 = true;
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pw_core::{CorePlugin, PropertyValue, Trigger};

    #[derive(Component)]
    struct Score {
        points: i32,
    }

    fn test_app() -> App {
        let mut app = App::new();
        app.add_plugins(MinimalPlugins);
        app.add_plugins(CorePlugin);
        app.add_plugins(crate::WatchPlugin);
        app.world_mut()
            .resource_mut::<PropertyRegistry>()
            .register::<Score>("points", |s| PropertyValue::Int(s.points));
        app
    }

    fn spawn_watcher(app: &mut App, watcher: PropertyWatcher) -> Entity {
        app.world_mut().spawn(watcher).id()
    }

    #[test]
    fn arms_watcher_with_resolvable_property() {
        let mut app = test_app();
        let source = app.world_mut().spawn(Score { points: 0 }).id();
        let watcher = spawn_watcher(
            &mut app,
            PropertyWatcher {
                source: Some(source),
                source_property: "Score.points".into(),
                ..Default::default()
            },
        );
        app.update();
        assert!(app.world().get::<ArmedWatch>(watcher).is_some());
    }

    #[test]
    fn unset_source_never_arms() {
        let mut app = test_app();
        let watcher = spawn_watcher(
            &mut app,
            PropertyWatcher {
                source: None,
                source_property: "Score.points".into(),
                ..Default::default()
            },
        );
        app.update();
        app.update();
        assert!(app.world().get::<ArmedWatch>(watcher).is_none());
    }

    #[test]
    fn unknown_property_never_arms() {
        let mut app = test_app();
        let source = app.world_mut().spawn(Score { points: 0 }).id();
        let watcher = spawn_watcher(
            &mut app,
            PropertyWatcher {
                source: Some(source),
                source_property: "Score.streak".into(),
                ..Default::default()
            },
        );
        app.update();
        assert!(app.world().get::<ArmedWatch>(watcher).is_none());
    }

    #[test]
    fn arming_is_one_shot() {
        // A property registered after the watcher's first frame is never
        // picked up; resolution only happens while the watcher is new.
        let mut app = test_app();
        let source = app.world_mut().spawn(Score { points: 0 }).id();
        let watcher = spawn_watcher(
            &mut app,
            PropertyWatcher {
                source: Some(source),
                source_property: "Score.streak".into(),
                ..Default::default()
            },
        );
        app.update();
        app.world_mut()
            .resource_mut::<PropertyRegistry>()
            .register::<Score>("streak", |_| PropertyValue::Int(0));
        app.update();
        assert!(app.world().get::<ArmedWatch>(watcher).is_none());
    }

    #[test]
    fn cached_accessor_survives_property_rename() {
        let mut app = test_app();
        let source = app.world_mut().spawn(Score { points: 9 }).id();
        let target = app.world_mut().spawn(Active(false)).id();
        let watcher = spawn_watcher(
            &mut app,
            PropertyWatcher {
                source: Some(source),
                target: Some(target),
                source_property: "Score.points".into(),
                trigger: Trigger::MoreThan,
                condition_value: 5.0,
                ..Default::default()
            },
        );
        app.update();
        assert!(app.world().get::<Active>(target).unwrap().0, "sanity: fired");

        // Point the watcher at a bogus name; the cached accessor keeps
        // working because arming never re-resolves.
        app.world_mut().get_mut::<Active>(target).unwrap().0 = false;
        app.world_mut()
            .get_mut::<PropertyWatcher>(watcher)
            .unwrap()
            .source_property = "Score.bogus".into();
        app.update();
        assert!(app.world().get::<Active>(target).unwrap().0);
    }

    #[test]
    fn despawned_source_is_silent() {
        let mut app = test_app();
        let source = app.world_mut().spawn(Score { points: 9 }).id();
        let target = app.world_mut().spawn(Active(false)).id();
        spawn_watcher(
            &mut app,
            PropertyWatcher {
                source: Some(source),
                target: Some(target),
                source_property: "Score.points".into(),
                trigger: Trigger::MoreThan,
                condition_value: 5.0,
                ..Default::default()
            },
        );
        app.update();
        app.world_mut().get_mut::<Active>(target).unwrap().0 = false;
        app.world_mut().despawn(source);
        app.update();
        app.update();
        assert!(!app.world().get::<Active>(target).unwrap().0);
    }

    #[test]
    fn target_without_active_flag_is_silent() {
        let mut app = test_app();
        let source = app.world_mut().spawn(Score { points: 9 }).id();
        let target = app.world_mut().spawn_empty().id();
        spawn_watcher(
            &mut app,
            PropertyWatcher {
                source: Some(source),
                target: Some(target),
                source_property: "Score.points".into(),
                trigger: Trigger::MoreThan,
                condition_value: 5.0,
                ..Default::default()
            },
        );
        // Must not panic; the effect just does not happen.
        app.update();
        app.update();
        assert!(app.world().get::<Active>(target).is_none());
    }
}
