// Core crate: foundational ECS vocabulary for the watcher stack.
// Components, the value-kind tag, trigger evaluation, system set labels, and
// the property registry shared by arming and host code.

use bevy::prelude::*;

mod registry;

pub use pw_config::{Trigger, WatchAction};
pub use registry::{PropertyAccessor, PropertyRegistry};

/// Host-side enable/disable flag. Entities that can be switched on by a
/// watcher carry this; entities without it are simply never affected.
#[derive(Component, Debug, Clone, Copy, PartialEq, Eq)]
pub struct Active(pub bool);

impl Default for Active {
    fn default() -> Self {
        Self(true)
    }
}

/// Value read out of a registered property, tagged with its kind.
/// Only `Int` and `Float` participate in trigger comparisons.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum PropertyValue {
    Int(i32),
    Float(f32),
    Bool(bool),
}

/// Per-frame watcher: polls one property on `source` and, when the configured
/// relation against `condition_value` holds, switches `target` active.
///
/// `source` and `target` are non-owning handles into the host scene; either
/// may be unset, in which case the watcher does nothing.
#[derive(Component, Debug, Clone, Default)]
pub struct PropertyWatcher {
    pub source: Option<Entity>,
    pub target: Option<Entity>,
    /// Qualified `Component.field` name resolved against the registry.
    pub source_property: String,
    /// Property written on the target; only meaningful for `WatchAction::Set`.
    pub target_property: String,
    pub trigger: Trigger,
    pub condition_value: f32,
    pub action: WatchAction,
}

/// Accessor cache attached once arming succeeds. The accessor is resolved a
/// single time and deliberately never refreshed, even if `source_property`
/// changes afterwards.
#[derive(Component, Clone)]
pub struct ArmedWatch {
    pub accessor: PropertyAccessor,
}

impl std::fmt::Debug for ArmedWatch {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ArmedWatch").finish_non_exhaustive()
    }
}

// Wrapper Bevy resource for the pure-data WatchConfig (keeps pw_config free of bevy dependency).
#[derive(Resource, Debug, Clone, Default)]
pub struct WatchConfigRes(pub pw_config::WatchConfig);

// System set labels: arming resolves accessors before the tick polls them.
#[derive(SystemSet, Debug, Hash, Eq, PartialEq, Clone)]
pub struct WatchArmSet;
#[derive(SystemSet, Debug, Hash, Eq, PartialEq, Clone)]
pub struct WatchTickSet;

/// Evaluate the configured relation for one polled value.
///
/// Integer values compare against the condition truncated toward zero (an
/// integer cast of the stored float); float values compare in `f32`, with
/// `Equal` meaning exact equality. Non-numeric kinds never satisfy any
/// trigger.
pub fn condition_met(trigger: Trigger, value: PropertyValue, condition: f32) -> bool {
    match value {
        PropertyValue::Int(v) => {
            let c = condition as i32;
            match trigger {
                Trigger::Equal => v == c,
                Trigger::EqualOrLess => v <= c,
                Trigger::LessThan => v < c,
                Trigger::MoreThan => v > c,
            }
        }
        PropertyValue::Float(v) => match trigger {
            Trigger::Equal => v == condition,
            Trigger::EqualOrLess => v <= condition,
            Trigger::LessThan => v < condition,
            Trigger::MoreThan => v > condition,
        },
        PropertyValue::Bool(_) => false,
    }
}

// Core plugin: registry resource + ordering contract between arming and tick.
pub struct CorePlugin;

impl Plugin for CorePlugin {
    fn build(&self, app: &mut App) {
        app.init_resource::<PropertyRegistry>();
        app.configure_sets(Update, (WatchArmSet.before(WatchTickSet),));
    }
}
