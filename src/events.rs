//! Messages for the trajectory overlay.
//!
//! Note: In Bevy 0.18, buffered events use the `Message` trait instead of `Event`.

use bevy::ecs::message::Message;
use bevy::prelude::*;

use crate::config::{ConfigKey, ConfigValue};

/// Change emitted by the settings menu.
///
/// Widgets send one of these when the user moves a slider, flips a toggle or
/// presses "Reset Defaults". `apply_settings_events` validates and stores it.
///
/// # Example
/// ```
/// use bevy_bow_trajectory::config::{ConfigKey, ConfigValue};
/// use bevy_bow_trajectory::events::SettingsEvent;
///
/// let slider_moved = SettingsEvent::ValueChanged {
///     key: ConfigKey::TrajectoryLineStartWidth,
///     value: ConfigValue::Float(0.25),
/// };
/// ```
#[derive(Message, Clone, Debug, PartialEq)]
pub enum SettingsEvent {
    /// A slider or toggle changed
    ValueChanged { key: ConfigKey, value: ConfigValue },
    /// The "Reset Defaults" button was pressed
    ResetDefaults,
}

/// Sent after the stored config changed, with the keys that changed.
#[derive(Message, Clone, Debug, PartialEq)]
pub struct ConfigChanged {
    pub keys: Vec<ConfigKey>,
}
