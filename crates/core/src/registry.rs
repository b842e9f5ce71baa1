//! Property registry: the compile-time replacement for reflection-style
//! property lookup. Host code publishes selected component fields under a
//! qualified `Component.field` name; watchers resolve names to accessors once
//! when they arm.

use std::fmt;
use std::sync::Arc;

use bevy::ecs::world::EntityRef;
use bevy::prelude::*;

use crate::PropertyValue;

/// Reads one published property off an entity. `None` when the entity does
/// not carry the registered component.
pub type PropertyAccessor = Arc<dyn Fn(EntityRef) -> Option<PropertyValue> + Send + Sync>;

struct PropertyEntry {
    name: String,
    accessor: PropertyAccessor,
}

/// Registry of published component properties, keyed by qualified name.
/// Registration order is preserved so pick-lists stay stable.
#[derive(Resource, Default)]
pub struct PropertyRegistry {
    entries: Vec<PropertyEntry>,
}

impl PropertyRegistry {
    /// Publish `C`'s `field` under `C.field` (short type name).
    /// Re-registering an existing name replaces the previous accessor.
    pub fn register<C: Component>(&mut self, field: &str, getter: fn(&C) -> PropertyValue) {
        let name = format!("{}.{field}", short_type_name::<C>());
        let accessor: PropertyAccessor =
            Arc::new(move |entity: EntityRef| entity.get::<C>().map(getter));
        if let Some(entry) = self.entries.iter_mut().find(|e| e.name == name) {
            entry.accessor = accessor;
        } else {
            self.entries.push(PropertyEntry { name, accessor });
        }
    }

    /// All registered names, in registration order. This is the list a
    /// configuration surface can present as a property pick-list.
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.entries.iter().map(|e| e.name.as_str())
    }

    /// Look up an accessor by its qualified name.
    pub fn resolve(&self, name: &str) -> Option<PropertyAccessor> {
        self.entries
            .iter()
            .find(|e| e.name == name)
            .map(|e| e.accessor.clone())
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl fmt::Debug for PropertyRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_list()
            .entries(self.entries.iter().map(|e| &e.name))
            .finish()
    }
}

fn short_type_name<T>() -> &'static str {
    let full = std::any::type_name::<T>();
    full.rsplit("::").next().unwrap_or(full)
}
