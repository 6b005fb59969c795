//! User settings: keys, defaults, the config resource and its persistence.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::time::Duration;

use bevy::prelude::*;
use serde::{Deserialize, Serialize};

use crate::error::{Result, TrajectoryError};
use crate::types::WeaponKind;

/// Stable identifier under which settings are persisted.
pub const MODULE_ID: &str = "com.willis.sotf.bowtrajectory";

/// A persisted setting.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug, Reflect)]
pub enum ConfigKey {
    CraftedBowEnabled,
    TacticalBowEnabled,
    CrossbowEnabled,
    TrajectoryLineStartWidth,
    TrajectoryLineEndWidth,
}

impl ConfigKey {
    pub const ALL: [ConfigKey; 5] = [
        ConfigKey::CraftedBowEnabled,
        ConfigKey::TacticalBowEnabled,
        ConfigKey::CrossbowEnabled,
        ConfigKey::TrajectoryLineStartWidth,
        ConfigKey::TrajectoryLineEndWidth,
    ];

    /// Key name used in the settings file.
    pub fn name(&self) -> &'static str {
        match self {
            ConfigKey::CraftedBowEnabled => "CraftedBowEnabled",
            ConfigKey::TacticalBowEnabled => "TacticalBowEnabled",
            ConfigKey::CrossbowEnabled => "CrossbowEnabled",
            ConfigKey::TrajectoryLineStartWidth => "TrajectoryLineStartWidth",
            ConfigKey::TrajectoryLineEndWidth => "TrajectoryLineEndWidth",
        }
    }

    pub fn from_name(name: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|key| key.name() == name)
    }

    pub fn description(&self) -> &'static str {
        match self {
            ConfigKey::CraftedBowEnabled => "Trajectory enabled for Crafted Bow?",
            ConfigKey::TacticalBowEnabled => "Trajectory enabled for Tactical Bow?",
            ConfigKey::CrossbowEnabled => "Trajectory enabled for Crossbow?",
            ConfigKey::TrajectoryLineStartWidth => "Trajectory line starting width",
            ConfigKey::TrajectoryLineEndWidth => "Trajectory line ending width",
        }
    }

    /// Declared default, used for first start and "Reset Defaults".
    pub fn default_value(&self) -> ConfigValue {
        match self {
            ConfigKey::CraftedBowEnabled
            | ConfigKey::TacticalBowEnabled
            | ConfigKey::CrossbowEnabled => ConfigValue::Bool(true),
            ConfigKey::TrajectoryLineStartWidth | ConfigKey::TrajectoryLineEndWidth => {
                ConfigValue::Float(0.1)
            }
        }
    }

    /// Inclusive range for float keys.
    pub fn range(&self) -> Option<(f32, f32)> {
        match self {
            ConfigKey::TrajectoryLineStartWidth => Some((0.0, 1.0)),
            ConfigKey::TrajectoryLineEndWidth => Some((0.1, 1.0)),
            _ => None,
        }
    }

    /// Enable flag gating a weapon kind.
    pub fn for_weapon(kind: WeaponKind) -> Self {
        match kind {
            WeaponKind::CraftedBow => ConfigKey::CraftedBowEnabled,
            WeaponKind::TacticalBow => ConfigKey::TacticalBowEnabled,
            WeaponKind::Crossbow => ConfigKey::CrossbowEnabled,
        }
    }

    pub fn is_width(&self) -> bool {
        matches!(
            self,
            ConfigKey::TrajectoryLineStartWidth | ConfigKey::TrajectoryLineEndWidth
        )
    }
}

/// A setting value as stored on disk.
#[derive(Clone, Copy, PartialEq, Debug, Reflect, Serialize, Deserialize)]
pub enum ConfigValue {
    Bool(bool),
    Float(f32),
}

/// User-adjustable overlay settings.
///
/// Read every frame by the orchestrator. Written only through [`TrajectoryConfig::set`]
/// and [`TrajectoryConfig::reset_defaults`], which keep floats inside their
/// declared ranges.
///
/// # Example
/// ```
/// use bevy_bow_trajectory::config::{ConfigKey, ConfigValue, TrajectoryConfig};
///
/// let mut config = TrajectoryConfig::default();
/// config.set(ConfigKey::TrajectoryLineEndWidth, ConfigValue::Float(0.0)).unwrap();
/// assert_eq!(config.line_end_width, 0.1); // clamped to the slider minimum
/// ```
#[derive(Resource, Reflect, Clone, PartialEq, Debug)]
#[reflect(Resource)]
pub struct TrajectoryConfig {
    pub crafted_bow_enabled: bool,
    pub tactical_bow_enabled: bool,
    pub crossbow_enabled: bool,
    /// Width at the launch end, in [0, 1]
    pub line_start_width: f32,
    /// Width at the far end, in [0.1, 1]
    pub line_end_width: f32,
}

impl Default for TrajectoryConfig {
    fn default() -> Self {
        let mut config = Self {
            crafted_bow_enabled: false,
            tactical_bow_enabled: false,
            crossbow_enabled: false,
            line_start_width: 0.0,
            line_end_width: 0.0,
        };
        config.reset_defaults();
        config
    }
}

impl TrajectoryConfig {
    pub fn get(&self, key: ConfigKey) -> ConfigValue {
        match key {
            ConfigKey::CraftedBowEnabled => ConfigValue::Bool(self.crafted_bow_enabled),
            ConfigKey::TacticalBowEnabled => ConfigValue::Bool(self.tactical_bow_enabled),
            ConfigKey::CrossbowEnabled => ConfigValue::Bool(self.crossbow_enabled),
            ConfigKey::TrajectoryLineStartWidth => ConfigValue::Float(self.line_start_width),
            ConfigKey::TrajectoryLineEndWidth => ConfigValue::Float(self.line_end_width),
        }
    }

    /// Writes a value, clamping floats to the key's range.
    ///
    /// # Returns
    /// The value actually stored, or `ValueType` if the value kind does not
    /// match the key.
    pub fn set(&mut self, key: ConfigKey, value: ConfigValue) -> Result<ConfigValue> {
        match (key, value) {
            (ConfigKey::CraftedBowEnabled, ConfigValue::Bool(v)) => self.crafted_bow_enabled = v,
            (ConfigKey::TacticalBowEnabled, ConfigValue::Bool(v)) => self.tactical_bow_enabled = v,
            (ConfigKey::CrossbowEnabled, ConfigValue::Bool(v)) => self.crossbow_enabled = v,
            (ConfigKey::TrajectoryLineStartWidth, ConfigValue::Float(v)) => {
                self.line_start_width = clamp_to_range(key, v)
            }
            (ConfigKey::TrajectoryLineEndWidth, ConfigValue::Float(v)) => {
                self.line_end_width = clamp_to_range(key, v)
            }
            (key, _) => {
                let expected = match key.default_value() {
                    ConfigValue::Bool(_) => "bool",
                    ConfigValue::Float(_) => "float",
                };
                return Err(TrajectoryError::ValueType { key, expected });
            }
        }
        Ok(self.get(key))
    }

    /// Restores every key to its declared default.
    pub fn reset_defaults(&mut self) {
        for key in ConfigKey::ALL {
            // Defaults always match their key's type.
            let _ = self.set(key, key.default_value());
        }
    }

    /// Whether the trajectory line is enabled for a weapon kind.
    pub fn enabled_for(&self, kind: WeaponKind) -> bool {
        match kind {
            WeaponKind::CraftedBow => self.crafted_bow_enabled,
            WeaponKind::TacticalBow => self.tactical_bow_enabled,
            WeaponKind::Crossbow => self.crossbow_enabled,
        }
    }
}

fn clamp_to_range(key: ConfigKey, value: f32) -> f32 {
    let value = if value.is_finite() {
        value
    } else {
        match key.default_value() {
            ConfigValue::Float(default) => default,
            ConfigValue::Bool(_) => 0.0,
        }
    };
    match key.range() {
        Some((min, max)) => value.clamp(min, max),
        None => value,
    }
}

/// On-disk layout of the settings file.
#[derive(Serialize, Deserialize, Debug, Default)]
pub struct SettingsFile {
    pub module: String,
    pub entries: BTreeMap<String, ConfigValue>,
}

/// Key-value settings storage, one RON file per module id.
///
/// A store without a path keeps nothing; use it when the host owns persistence.
#[derive(Resource, Clone, Debug)]
pub struct ConfigStore {
    path: Option<PathBuf>,
}

impl Default for ConfigStore {
    fn default() -> Self {
        Self::in_dir("config")
    }
}

impl ConfigStore {
    /// Store at `<dir>/<MODULE_ID>.ron`.
    pub fn in_dir(dir: impl AsRef<Path>) -> Self {
        Self {
            path: Some(dir.as_ref().join(format!("{MODULE_ID}.ron"))),
        }
    }

    /// Store that never touches the filesystem.
    pub fn memory() -> Self {
        Self { path: None }
    }

    pub fn path(&self) -> Option<&Path> {
        self.path.as_deref()
    }

    /// Loads the persisted config.
    ///
    /// A missing file yields defaults. Unknown keys are ignored, missing keys
    /// keep their defaults, and out-of-range floats are clamped.
    pub fn load(&self) -> Result<TrajectoryConfig> {
        let mut config = TrajectoryConfig::default();
        let Some(path) = &self.path else {
            return Ok(config);
        };
        if !path.exists() {
            return Ok(config);
        }

        let contents = std::fs::read_to_string(path)?;
        let file: SettingsFile =
            ron::from_str(&contents).map_err(|e| TrajectoryError::ConfigParse(e.to_string()))?;

        for (name, value) in file.entries {
            let Some(key) = ConfigKey::from_name(&name) else {
                debug!("ignoring unknown setting {name}");
                continue;
            };
            match config.set(key, value) {
                Ok(stored) if stored != value => {
                    warn!("setting {name} = {value:?} out of range, using {stored:?}");
                }
                Ok(_) => {}
                Err(err) => warn!("ignoring setting {name}: {err}"),
            }
        }
        Ok(config)
    }

    /// Writes every key of `config` to disk.
    pub fn save(&self, config: &TrajectoryConfig) -> Result<()> {
        let Some(path) = &self.path else {
            return Ok(());
        };
        let file = SettingsFile {
            module: MODULE_ID.to_string(),
            entries: ConfigKey::ALL
                .into_iter()
                .map(|key| (key.name().to_string(), config.get(key)))
                .collect(),
        };
        let contents = ron::ser::to_string_pretty(&file, Default::default())
            .map_err(|e| TrajectoryError::ConfigSerialize(e.to_string()))?;

        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        std::fs::write(path, contents)?;
        Ok(())
    }
}

/// Delays config saves until the settings have been quiet for a while.
///
/// Dragging a slider changes the config every frame; the file is written once
/// the value stops moving for `delay`.
#[derive(Resource, Clone, Debug)]
pub struct SettingsAutosave {
    delay: Duration,
    quiet: Duration,
    dirty: bool,
}

impl Default for SettingsAutosave {
    fn default() -> Self {
        Self::new(Duration::from_millis(500))
    }
}

impl SettingsAutosave {
    pub fn new(delay: Duration) -> Self {
        Self {
            delay,
            quiet: Duration::ZERO,
            dirty: false,
        }
    }

    /// Records a change and restarts the quiet period.
    pub fn mark_dirty(&mut self) {
        self.dirty = true;
        self.quiet = Duration::ZERO;
    }

    pub fn is_dirty(&self) -> bool {
        self.dirty
    }

    /// Advances the quiet period.
    ///
    /// # Returns
    /// `true` exactly once per burst of changes, when the config should be saved
    pub fn tick(&mut self, delta: Duration) -> bool {
        if !self.dirty {
            return false;
        }
        self.quiet += delta;
        if self.quiet >= self.delay {
            self.dirty = false;
            return true;
        }
        false
    }

    /// Takes a pending save regardless of the quiet period.
    pub fn take_pending(&mut self) -> bool {
        std::mem::take(&mut self.dirty)
    }
}
