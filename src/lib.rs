//! # Bevy Bow Trajectory
//!
//! Trajectory overlay plugin for Bevy 0.18.
//!
//! While the local player holds a drawn bow or crossbow, the predicted flight
//! path of the loaded arrow or bolt is drawn into the world as a tapered line.
//!
//! ## Features
//! - RK4 or Euler trajectory sampling with gravity scale, wind and drag
//! - Optional host-provided trajectory routine
//! - Surface hits through avian3d spatial queries (`dim3` feature)
//! - One persistent line, updated in place every frame
//! - Per-weapon enable flags and line widths, persisted as RON
//!
//! ## Quick Start
//! ```rust,no_run
//! use bevy::prelude::*;
//! use bevy_bow_trajectory::prelude::*;
//!
//! fn main() {
//!     App::new()
//!         .add_plugins(DefaultPlugins)
//!         .add_plugins(TrajectoryPluginGroup)
//!         .run();
//! }
//! ```

pub mod components;
pub mod config;
pub mod error;
pub mod events;
pub mod line;
pub mod resources;
pub mod systems;
pub mod types;

#[cfg(test)]
mod scenario_tests;

pub mod prelude {
    pub use crate::components::*;
    pub use crate::config::*;
    pub use crate::error::TrajectoryError;
    pub use crate::events::*;
    pub use crate::line::*;
    pub use crate::resources::*;
    pub use crate::systems::orchestrator::enabled_for_item;
    pub use crate::systems::sampler::{sample, sample_into, sample_with_host, GroundPlane, TerminalCondition, Unbounded};
    pub use crate::systems::settings::{MenuAction, MenuControl, SettingsMenu};
    pub use crate::types::*;
    pub use crate::TrajectoryPluginGroup;
    pub use crate::TrajectorySet;
    pub use crate::{TrajectoryCorePlugin, TrajectoryDebugPlugin, TrajectoryRenderPlugin, TrajectorySettingsPlugin};
}

use bevy::prelude::*;

/// Ordering of the overlay's per-frame work.
#[derive(SystemSet, Debug, Clone, PartialEq, Eq, Hash)]
pub enum TrajectorySet {
    /// Settings changes and trajectory prediction
    Predict,
    /// Mirroring the line into render entities
    Present,
}

/// Main plugin group that includes all trajectory subsystems.
///
/// # Example
/// ```no_run
/// use bevy::prelude::*;
/// use bevy_bow_trajectory::prelude::*;
///
/// fn main() {
///     App::new()
///         .add_plugins(DefaultPlugins)
///         .add_plugins(TrajectoryPluginGroup)
///         .run();
/// }
/// ```
#[derive(Default)]
pub struct TrajectoryPluginGroup;

impl PluginGroup for TrajectoryPluginGroup {
    fn build(self) -> bevy::app::PluginGroupBuilder {
        bevy::app::PluginGroupBuilder::start::<Self>()
            .add(TrajectoryCorePlugin)
            .add(TrajectorySettingsPlugin)
            .add(TrajectoryRenderPlugin)
            .add(TrajectoryDebugPlugin)
    }
}

/// Core prediction plugin (config, presenter, per-frame orchestrator).
///
/// Runs headless: it needs no rendering or asset plugins.
///
/// # Systems
/// - `update_trajectory` - Hides the line or samples and shows the path
pub struct TrajectoryCorePlugin;

impl Plugin for TrajectoryCorePlugin {
    fn build(&self, app: &mut App) {
        if !app.world().contains_resource::<line::LinePresenter>() {
            let source = app
                .world()
                .get_resource::<line::LineAssetSource>()
                .cloned()
                .unwrap_or_default();
            app.insert_resource(line::LinePresenter::new(source));
        }

        app.register_type::<components::LocalPlayer>()
            .register_type::<components::InventoryItem>()
            .register_type::<components::RangedWeapon>()
            .register_type::<components::BowController>()
            .register_type::<config::TrajectoryConfig>()
            .register_type::<resources::TrajectoryEnvironment>()
            .register_type::<resources::SamplerSettings>()
            .register_type::<resources::ItemCatalog>()
            .init_resource::<config::TrajectoryConfig>()
            .init_resource::<resources::TrajectoryEnvironment>()
            .init_resource::<resources::SamplerSettings>()
            .init_resource::<resources::ItemCatalog>()
            .configure_sets(Update, (TrajectorySet::Predict, TrajectorySet::Present).chain())
            .add_systems(
                Update,
                systems::orchestrator::update_trajectory.in_set(TrajectorySet::Predict),
            );
    }
}

/// Settings plugin (persisted config, menu registration, change handling).
///
/// # Systems
/// - `load_persisted_config` - Binds the stored config (PreStartup)
/// - `register_settings_menu` - Publishes the settings menu (PostStartup)
/// - `apply_settings_events` - Applies menu changes before prediction
/// - `flush_settings_autosave` - Saves the config once changes settle
pub struct TrajectorySettingsPlugin;

impl Plugin for TrajectorySettingsPlugin {
    fn build(&self, app: &mut App) {
        app.init_resource::<config::ConfigStore>()
            .init_resource::<config::SettingsAutosave>()
            .add_message::<events::SettingsEvent>()
            .add_message::<events::ConfigChanged>()
            .add_systems(PreStartup, systems::settings::load_persisted_config)
            .add_systems(PostStartup, systems::settings::register_settings_menu)
            .add_systems(
                Update,
                (
                    systems::settings::apply_settings_events
                        .before(systems::orchestrator::update_trajectory),
                    systems::settings::flush_settings_autosave
                        .after(systems::settings::apply_settings_events),
                )
                    .in_set(TrajectorySet::Predict),
            );
    }
}

/// Render plugin (persistent ribbon mesh for the line).
///
/// # Systems
/// - `setup_line_mesh` - Spawns the hidden line entity
/// - `sync_line_mesh` - Rewrites the mesh from the presenter each frame
pub struct TrajectoryRenderPlugin;

impl Plugin for TrajectoryRenderPlugin {
    fn build(&self, app: &mut App) {
        app.register_type::<components::TrajectoryLineMesh>()
            .add_systems(Startup, systems::render::setup_line_mesh)
            .add_systems(
                Update,
                systems::render::sync_line_mesh.in_set(TrajectorySet::Present),
            );
    }
}

/// Debug plugin for trajectory visualization.
pub struct TrajectoryDebugPlugin;

impl Plugin for TrajectoryDebugPlugin {
    fn build(&self, app: &mut App) {
        app.add_systems(
            Update,
            systems::debug::draw_trajectory_debug.in_set(TrajectorySet::Present),
        );
    }
}
