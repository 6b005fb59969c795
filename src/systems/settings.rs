//! Settings menu model, config binding and change handling.

use bevy::ecs::message::{MessageReader, MessageWriter};
use bevy::prelude::*;

use crate::config::{
    ConfigKey, ConfigStore, ConfigValue, SettingsAutosave, TrajectoryConfig, MODULE_ID,
};
use crate::events::{ConfigChanged, SettingsEvent};
use crate::line::LinePresenter;

/// Action triggered by a menu button.
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum MenuAction {
    ResetDefaults,
}

/// A single control in the settings menu.
#[derive(Clone, PartialEq, Debug)]
pub enum MenuControl {
    Slider {
        key: ConfigKey,
        label: String,
        min: f32,
        max: f32,
        value: f32,
    },
    Toggle {
        key: ConfigKey,
        title: String,
        value: bool,
    },
    Button {
        text: String,
        action: MenuAction,
    },
}

impl MenuControl {
    pub fn key(&self) -> Option<ConfigKey> {
        match self {
            MenuControl::Slider { key, .. } | MenuControl::Toggle { key, .. } => Some(*key),
            MenuControl::Button { .. } => None,
        }
    }

    fn sync(&mut self, config: &TrajectoryConfig) {
        match self {
            MenuControl::Slider { key, value, .. } => {
                if let ConfigValue::Float(stored) = config.get(*key) {
                    *value = stored;
                }
            }
            MenuControl::Toggle { key, value, .. } => {
                if let ConfigValue::Bool(stored) = config.get(*key) {
                    *value = stored;
                }
            }
            MenuControl::Button { .. } => {}
        }
    }
}

/// Declarative settings menu registered with the host UI.
///
/// The host draws the controls and sends [`SettingsEvent`]s back. Control
/// values always mirror the stored config.
#[derive(Resource, Clone, Debug)]
pub struct SettingsMenu {
    pub module_id: String,
    pub title: String,
    pub description: String,
    pub controls: Vec<MenuControl>,
}

impl SettingsMenu {
    pub fn builder() -> SettingsMenuBuilder {
        SettingsMenuBuilder::default()
    }

    /// The standard overlay menu: two width sliders, three weapon toggles and
    /// a reset button.
    pub fn standard(config: &TrajectoryConfig) -> Self {
        Self::builder()
            .title("Bow Trajectory")
            .description(
                "Renders a line when drawing your bow indicating the expected trajectory of your arrows.",
            )
            .slider(ConfigKey::TrajectoryLineStartWidth, "Line Starting Width")
            .slider(ConfigKey::TrajectoryLineEndWidth, "Line Ending Width")
            .toggle(ConfigKey::CraftedBowEnabled, "Crafted Bow Trajectory Enabled?")
            .toggle(ConfigKey::TacticalBowEnabled, "Tactical Bow Trajectory Enabled?")
            .toggle(ConfigKey::CrossbowEnabled, "Crossbow Trajectory Enabled?")
            .button("Reset Defaults", MenuAction::ResetDefaults)
            .build(config)
    }

    pub fn control(&self, key: ConfigKey) -> Option<&MenuControl> {
        self.controls.iter().find(|control| control.key() == Some(key))
    }

    /// Refreshes every control from the stored config.
    pub fn sync_from(&mut self, config: &TrajectoryConfig) {
        for control in &mut self.controls {
            control.sync(config);
        }
    }
}

/// Builder for [`SettingsMenu`].
#[derive(Default)]
pub struct SettingsMenuBuilder {
    title: String,
    description: String,
    controls: Vec<MenuControl>,
}

impl SettingsMenuBuilder {
    pub fn title(mut self, title: impl Into<String>) -> Self {
        self.title = title.into();
        self
    }

    pub fn description(mut self, description: impl Into<String>) -> Self {
        self.description = description.into();
        self
    }

    /// Adds a slider over the key's declared range.
    pub fn slider(mut self, key: ConfigKey, label: impl Into<String>) -> Self {
        let (min, max) = key.range().unwrap_or((0.0, 1.0));
        self.controls.push(MenuControl::Slider {
            key,
            label: label.into(),
            min,
            max,
            value: min,
        });
        self
    }

    pub fn toggle(mut self, key: ConfigKey, title: impl Into<String>) -> Self {
        self.controls.push(MenuControl::Toggle {
            key,
            title: title.into(),
            value: false,
        });
        self
    }

    pub fn button(mut self, text: impl Into<String>, action: MenuAction) -> Self {
        self.controls.push(MenuControl::Button {
            text: text.into(),
            action,
        });
        self
    }

    /// Builds the menu with control values taken from `config`.
    pub fn build(self, config: &TrajectoryConfig) -> SettingsMenu {
        let mut menu = SettingsMenu {
            module_id: MODULE_ID.to_string(),
            title: self.title,
            description: self.description,
            controls: self.controls,
        };
        menu.sync_from(config);
        menu
    }
}

/// Binds the persisted configuration at startup.
pub fn load_persisted_config(store: Res<ConfigStore>, mut config: ResMut<TrajectoryConfig>) {
    match store.load() {
        Ok(loaded) => {
            *config = loaded;
            if let Some(path) = store.path() {
                info!("trajectory settings bound to {}", path.display());
            }
        }
        Err(err) => warn!("using default trajectory settings: {err}"),
    }
}

/// Registers the settings menu once the app is ready.
pub fn register_settings_menu(mut commands: Commands, config: Res<TrajectoryConfig>) {
    commands.insert_resource(SettingsMenu::standard(&config));
    info!("trajectory settings menu registered");
}

/// Applies settings changes from the menu.
///
/// Clamps and stores each value, refreshes the presenter widths when a width
/// changed and mirrors the stored values back into the menu controls. Saving
/// is left to [`flush_settings_autosave`].
pub fn apply_settings_events(
    mut events: MessageReader<SettingsEvent>,
    mut changed: MessageWriter<ConfigChanged>,
    mut config: ResMut<TrajectoryConfig>,
    mut presenter: ResMut<LinePresenter>,
    menu: Option<ResMut<SettingsMenu>>,
    mut autosave: ResMut<SettingsAutosave>,
) {
    let mut keys: Vec<ConfigKey> = Vec::new();

    for event in events.read() {
        match event {
            SettingsEvent::ValueChanged { key, value } => match config.set(*key, *value) {
                Ok(_) => {
                    if !keys.contains(key) {
                        keys.push(*key);
                    }
                }
                Err(err) => warn!("rejected settings change: {err}"),
            },
            SettingsEvent::ResetDefaults => {
                config.reset_defaults();
                for key in ConfigKey::ALL {
                    if !keys.contains(&key) {
                        keys.push(key);
                    }
                }
            }
        }
    }

    if keys.is_empty() {
        return;
    }

    if keys.iter().any(ConfigKey::is_width) {
        if let Err(err) = presenter.set_widths(config.line_start_width, config.line_end_width) {
            debug!("line widths not refreshed: {err}");
        }
    }

    if let Some(mut menu) = menu {
        menu.sync_from(&config);
    }

    autosave.mark_dirty();
    changed.write(ConfigChanged { keys });
}

/// Saves the config once changes have settled, or right away on exit.
pub fn flush_settings_autosave(
    time: Res<Time>,
    mut exit: MessageReader<AppExit>,
    mut autosave: ResMut<SettingsAutosave>,
    config: Res<TrajectoryConfig>,
    store: Res<ConfigStore>,
) {
    let exiting = exit.read().count() > 0;
    let due = if exiting {
        autosave.take_pending()
    } else {
        autosave.tick(time.delta())
    };
    if !due {
        return;
    }

    if let Err(err) = store.save(&config) {
        warn!("failed to save trajectory settings: {err}");
    }
}
