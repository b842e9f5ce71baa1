// Watcher configuration (pure data crate; no Bevy dependency).
// Provides: data structures, layered loading, validation producing warnings (non-fatal), and tests.

use serde::{Deserialize, Serialize};
use std::{fs, path::Path};

/// Relation applied between the polled source value and the condition value.
///
/// Serialized as the variant name string so configs stay readable and merge
/// cleanly through the layered loader.
#[derive(Debug, Deserialize, Serialize, Clone, Copy, PartialEq, Eq, Default)]
#[serde(try_from = "String", into = "String")]
pub enum Trigger {
    #[default]
    Equal,
    EqualOrLess,
    LessThan,
    MoreThan,
}

impl Trigger {
    /// All trigger kinds, in the order a pick-list should present them.
    pub const ALL: [Trigger; 4] = [
        Trigger::Equal,
        Trigger::EqualOrLess,
        Trigger::LessThan,
        Trigger::MoreThan,
    ];

    pub fn name(self) -> &'static str {
        match self {
            Trigger::Equal => "Equal",
            Trigger::EqualOrLess => "EqualOrLess",
            Trigger::LessThan => "LessThan",
            Trigger::MoreThan => "MoreThan",
        }
    }
}

impl From<Trigger> for String {
    fn from(t: Trigger) -> Self {
        t.name().to_string()
    }
}

impl TryFrom<String> for Trigger {
    type Error = String;
    fn try_from(s: String) -> Result<Self, Self::Error> {
        Trigger::ALL
            .into_iter()
            .find(|t| t.name() == s)
            .ok_or_else(|| format!("unknown trigger {s:?} (expected Equal, EqualOrLess, LessThan or MoreThan)"))
    }
}

/// Effect applied to the target entity when the trigger condition holds.
#[derive(Debug, Deserialize, Serialize, Clone, Copy, PartialEq, Eq, Default)]
#[serde(try_from = "String", into = "String")]
pub enum WatchAction {
    #[default]
    Enable,
    Disable,
    Set,
}

impl WatchAction {
    /// All action kinds, in the order a pick-list should present them.
    pub const ALL: [WatchAction; 3] = [WatchAction::Enable, WatchAction::Disable, WatchAction::Set];

    pub fn name(self) -> &'static str {
        match self {
            WatchAction::Enable => "Enable",
            WatchAction::Disable => "Disable",
            WatchAction::Set => "Set",
        }
    }
}

impl From<WatchAction> for String {
    fn from(a: WatchAction) -> Self {
        a.name().to_string()
    }
}

impl TryFrom<String> for WatchAction {
    type Error = String;
    fn try_from(s: String) -> Result<Self, Self::Error> {
        WatchAction::ALL
            .into_iter()
            .find(|a| a.name() == s)
            .ok_or_else(|| format!("unknown action {s:?} (expected Enable, Disable or Set)"))
    }
}

#[derive(Debug, Deserialize, Serialize, Clone, PartialEq)]
#[serde(default)]
pub struct RunConfig {
    /// Automatically exit the app after this many seconds. 0.0 (or omitted) = run indefinitely.
    #[serde(rename = "autoExit")]
    pub auto_exit: f32,
    /// Headless schedule rate in frames per second.
    #[serde(rename = "tickHz")]
    pub tick_hz: f32,
}
impl Default for RunConfig {
    fn default() -> Self {
        Self {
            auto_exit: 0.0,
            tick_hz: 60.0,
        }
    }
}

/// One watcher definition: which named entity to poll, how to compare the
/// polled value, and what to do to which target when the comparison holds.
#[derive(Debug, Deserialize, Serialize, Clone, PartialEq, Default)]
#[serde(default)]
pub struct WatcherDef {
    /// Free-form designer note; never interpreted.
    pub comment: String,
    /// Name of the entity whose property is polled every frame.
    pub source: String,
    /// Qualified property name in `Component.field` form.
    #[serde(rename = "sourceProperty")]
    pub source_property: String,
    pub trigger: Trigger,
    /// Value the polled property is compared against.
    #[serde(rename = "conditionValue")]
    pub condition_value: f32,
    pub action: WatchAction,
    /// Name of the entity acted upon when the trigger condition holds.
    pub target: String,
    /// Property written on the target; only meaningful for the `Set` action.
    #[serde(rename = "targetProperty")]
    pub target_property: Option<String>,
}

#[derive(Debug, Deserialize, Serialize, Clone, Default, PartialEq)]
#[serde(default)]
pub struct WatchConfig {
    pub run: RunConfig,
    /// Watcher list. Layered loading replaces this list wholesale; it is not
    /// merged per element.
    pub watchers: Vec<WatcherDef>,
}

impl WatchConfig {
    /// Load from a single RON file (errors contain human-readable context).
    pub fn load_from_file(path: impl AsRef<Path>) -> Result<Self, String> {
        let data = fs::read_to_string(&path).map_err(|e| format!("read config: {e}"))?;
        ron::from_str(&data).map_err(|e| format!("parse RON: {e}"))
    }

    /// Load file; on failure returns default config plus error string.
    pub fn load_or_default(path: impl AsRef<Path>) -> (Self, Option<String>) {
        match Self::load_from_file(&path) {
            Ok(cfg) => (cfg, None),
            Err(e) => (Self::default(), Some(e)),
        }
    }

    /// Load multiple layers; later overrides earlier (deep merge).
    /// Skips missing files; returns (config, used_paths, errors).
    pub fn load_layered<P, I>(paths: I) -> (Self, Vec<String>, Vec<String>)
    where
        P: AsRef<Path>,
        I: IntoIterator<Item = P>,
    {
        use ron::value::Value;
        let mut merged: Option<Value> = None;
        let mut used = Vec::new();
        let mut errors = Vec::new();

        fn merge_value(base: &mut ron::value::Value, overlay: ron::value::Value) {
            use ron::value::Value;
            match (base, overlay) {
                (Value::Map(bm), Value::Map(om)) => {
                    for (k, v) in om.into_iter() {
                        let mut incoming = Some(v);
                        let mut replaced = false;
                        for (ek, ev) in bm.iter_mut() {
                            if *ek == k {
                                let val = incoming.take().unwrap();
                                merge_value(ev, val);
                                replaced = true;
                                break;
                            }
                        }
                        if !replaced {
                            bm.insert(k, incoming.unwrap());
                        }
                    }
                }
                (b, o) => *b = o,
            }
        }

        for p in paths {
            let path_ref = p.as_ref();
            match fs::read_to_string(path_ref) {
                Ok(txt) => match ron::from_str::<Value>(&txt) {
                    Ok(val) => {
                        if let Some(cur) = &mut merged {
                            merge_value(cur, val);
                        } else {
                            merged = Some(val);
                        }
                        used.push(path_ref.as_os_str().to_string_lossy().to_string());
                    }
                    Err(e) => errors.push(format!("{}: parse error: {e}", path_ref.display())),
                },
                Err(e) => errors.push(format!("{}: read error: {e}", path_ref.display())),
            }
        }

        if let Some(val) = merged {
            match val.clone().into_rust::<WatchConfig>() {
                Ok(cfg) => (cfg, used, errors),
                Err(e) => {
                    let mut evec = errors;
                    evec.push(format!(
                        "failed to deserialize merged config; using defaults: {e}"
                    ));
                    (WatchConfig::default(), used, evec)
                }
            }
        } else {
            (WatchConfig::default(), used, errors)
        }
    }

    /// Produce validation warnings (non-fatal) for suspicious values.
    pub fn validate(&self) -> Vec<String> {
        let mut w = Vec::new();
        if self.run.auto_exit < 0.0 {
            w.push(format!(
                "run.autoExit {} negative -> treated as disabled (should be >= 0)",
                self.run.auto_exit
            ));
        } else if self.run.auto_exit > 0.0 && self.run.auto_exit < 0.01 {
            w.push(format!(
                "run.autoExit {} very small; exits almost immediately",
                self.run.auto_exit
            ));
        }
        if self.run.tick_hz <= 0.0 {
            w.push(format!("run.tickHz {} must be > 0", self.run.tick_hz));
        } else if self.run.tick_hz > 1000.0 {
            w.push(format!(
                "run.tickHz {} extremely high; the schedule loop will spin",
                self.run.tick_hz
            ));
        }
        if self.watchers.is_empty() {
            w.push("watchers list is empty; nothing will be watched".into());
        }
        for (i, def) in self.watchers.iter().enumerate() {
            let label = if def.comment.is_empty() {
                format!("watchers[{i}]")
            } else {
                format!("watchers[{i}] ({})", def.comment)
            };
            if def.source.is_empty() {
                w.push(format!("{label}: source entity name is empty"));
            }
            if def.source_property.is_empty() {
                w.push(format!("{label}: sourceProperty is empty"));
            } else if !def.source_property.contains('.') {
                w.push(format!(
                    "{label}: sourceProperty {:?} is not in Component.field form",
                    def.source_property
                ));
            }
            if def.target.is_empty() {
                w.push(format!("{label}: target entity name is empty"));
            }
            if def.condition_value.is_nan() {
                w.push(format!("{label}: conditionValue is NaN; trigger can never fire"));
            }
            match def.action {
                WatchAction::Set => {
                    if def.target_property.as_deref().map_or(true, str::is_empty) {
                        w.push(format!("{label}: action Set requires a targetProperty"));
                    }
                }
                WatchAction::Enable | WatchAction::Disable => {
                    if def.target_property.is_some() {
                        w.push(format!("{label}: targetProperty is ignored unless action is Set"));
                    }
                }
            }
        }
        w
    }
}
