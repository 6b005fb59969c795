//! Per-frame orchestration: decide between hiding the line and predicting a path.

use bevy::prelude::*;

#[cfg(feature = "dim3")]
use avian3d::prelude::{SpatialQueryFilter, SpatialQueryPipeline};

use crate::components::{BowController, InventoryItem, LocalPlayer, RangedWeapon};
use crate::config::TrajectoryConfig;
use crate::line::LinePresenter;
use crate::resources::{HostTrajectorySimulator, ItemCatalog, SamplerSettings, TrajectoryEnvironment};
use crate::systems::sampler::{sample_into, sample_with_host, GroundPlane};
use crate::types::{AttackState, ItemId, LaunchParameters, TrajectorySample};

/// Whether the trajectory line is enabled for an item.
///
/// Exact match against the three catalog ids, each gated by its own flag.
/// Unknown ids are always disabled.
pub fn enabled_for_item(config: &TrajectoryConfig, catalog: &ItemCatalog, item_id: ItemId) -> bool {
    catalog
        .kind_of(item_id)
        .is_some_and(|kind| config.enabled_for(kind))
}

/// Per-frame trajectory update.
///
/// Hides the line unless the local player is in the world holding an enabled
/// bow or crossbow that is drawn (`AttackState::MidAttack`). When drawn,
/// refreshes the line widths, samples the flight path from the weapon's spawn
/// point and shows it.
///
/// Sampling uses the host's simulation routine when one is installed, and the
/// built-in integrator otherwise.
#[allow(clippy::too_many_arguments)]
pub fn update_trajectory(
    config: Res<TrajectoryConfig>,
    catalog: Res<ItemCatalog>,
    settings: Res<SamplerSettings>,
    env: Res<TrajectoryEnvironment>,
    host: Option<Res<HostTrajectorySimulator>>,
    #[cfg(feature = "dim3")] pipeline: Option<Res<SpatialQueryPipeline>>,
    mut presenter: ResMut<LinePresenter>,
    mut scratch: Local<TrajectorySample>,
    players: Query<(Entity, &LocalPlayer)>,
    items: Query<(&InventoryItem, Option<&RangedWeapon>, Option<&BowController>)>,
    spawn_points: Query<&GlobalTransform>,
    #[cfg(feature = "dim3")] children: Query<&Children>,
) {
    let Ok((player_entity, player)) = players.single() else {
        presenter.hide();
        return;
    };
    let Some(item_entity) = player.right_hand_item.filter(|_| player.in_world) else {
        presenter.hide();
        return;
    };

    let Ok((item, Some(weapon), Some(controller))) = items.get(item_entity) else {
        presenter.hide();
        return;
    };
    if !enabled_for_item(&config, &catalog, item.item_id) {
        presenter.hide();
        return;
    }

    if controller.attack_state != AttackState::MidAttack {
        presenter.hide();
        return;
    }

    let Ok(spawn) = spawn_points.get(weapon.spawn_point) else {
        debug!("spawn point {:?} of item {:?} has no transform", weapon.spawn_point, item.item_id);
        presenter.hide();
        return;
    };

    if let Err(err) = presenter.set_widths(config.line_start_width, config.line_end_width) {
        debug!("skipping trajectory update: {err}");
        return;
    }

    let launch = LaunchParameters::new(spawn.translation(), *spawn.forward(), &weapon.ammo);

    if let Some(host) = &host {
        sample_with_host(&*host.0, &launch, settings.max_points, &mut scratch);
    } else {
        let ground = settings.ground_height.map(|height| GroundPlane { height });

        #[cfg(feature = "dim3")]
        {
            use crate::systems::sampler::GeometryTerminator;

            // The archer, the weapon and anything attached to them never end the flight.
            let own_colliders = [player_entity, item_entity, weapon.spawn_point]
                .into_iter()
                .flat_map(|root| std::iter::once(root).chain(children.iter_descendants(root)));
            let geometry = pipeline.as_deref().map(|pipeline| GeometryTerminator {
                pipeline,
                filter: SpatialQueryFilter::default().with_excluded_entities(own_colliders),
            });
            sample_into(&launch, &settings, &env, &(ground, geometry), &mut scratch);
        }

        #[cfg(not(feature = "dim3"))]
        {
            let _ = player_entity;
            sample_into(&launch, &settings, &env, &ground, &mut scratch);
        }
    }

    if let Err(err) = presenter.show(&scratch) {
        debug!("trajectory line not shown: {err}");
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::WeaponKind;

    #[test]
    fn test_enabled_for_item_truth_table() {
        let catalog = ItemCatalog::default();
        let mut config = TrajectoryConfig::default();

        for kind in WeaponKind::ALL {
            assert!(enabled_for_item(&config, &catalog, catalog.id_of(kind)));
        }

        config.crafted_bow_enabled = false;
        assert!(!enabled_for_item(&config, &catalog, catalog.crafted_bow));
        assert!(enabled_for_item(&config, &catalog, catalog.tactical_bow));
        assert!(enabled_for_item(&config, &catalog, catalog.crossbow));

        config.crafted_bow_enabled = true;
        config.crossbow_enabled = false;
        assert!(enabled_for_item(&config, &catalog, catalog.crafted_bow));
        assert!(!enabled_for_item(&config, &catalog, catalog.crossbow));
    }

    #[test]
    fn test_unknown_item_never_enabled() {
        let catalog = ItemCatalog::default();
        let mut config = TrajectoryConfig::default();
        for flags in 0..8u8 {
            config.crafted_bow_enabled = flags & 1 != 0;
            config.tactical_bow_enabled = flags & 2 != 0;
            config.crossbow_enabled = flags & 4 != 0;
            assert!(!enabled_for_item(&config, &catalog, ItemId(9999)));
            assert!(!enabled_for_item(&config, &catalog, ItemId(0)));
        }
    }
}
