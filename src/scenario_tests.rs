#[cfg(test)]
mod scenario_tests {
    use std::path::PathBuf;
    use std::time::Duration;

    use bevy::prelude::*;

    use crate::prelude::*;
    use crate::systems::settings::SettingsMenu;

    const SPAWN: Vec3 = Vec3::new(2.0, 1.6, -3.0);

    struct Loadout {
        player: Entity,
        item: Entity,
    }

    fn test_app() -> App {
        let mut app = App::new();
        app.add_plugins(MinimalPlugins);
        app.insert_resource(ConfigStore::memory());
        app.add_plugins((TrajectoryCorePlugin, TrajectorySettingsPlugin));
        app
    }

    fn equip(app: &mut App, kind: WeaponKind) -> Loadout {
        let item_id = app.world().resource::<ItemCatalog>().id_of(kind);
        equip_id(app, item_id)
    }

    fn equip_id(app: &mut App, item_id: ItemId) -> Loadout {
        let spawn_point = app
            .world_mut()
            .spawn(GlobalTransform::from(
                Transform::from_translation(SPAWN).looking_to(Vec3::NEG_Z, Vec3::Y),
            ))
            .id();
        let item = app
            .world_mut()
            .spawn((
                InventoryItem { item_id },
                RangedWeapon::new(spawn_point),
                BowController::default(),
            ))
            .id();
        let player = app
            .world_mut()
            .spawn(LocalPlayer::in_world().holding(item))
            .id();
        Loadout { player, item }
    }

    fn set_attack(app: &mut App, item: Entity, state: AttackState) {
        app.world_mut()
            .get_mut::<BowController>(item)
            .unwrap()
            .attack_state = state;
    }

    fn presenter_state(app: &App) -> PresenterState {
        app.world().resource::<LinePresenter>().state()
    }

    #[test]
    fn test_crafted_bow_draw_and_release() {
        let mut app = test_app();
        let loadout = equip(&mut app, WeaponKind::CraftedBow);

        app.update();
        assert_eq!(presenter_state(&app), PresenterState::Uninitialized);

        set_attack(&mut app, loadout.item, AttackState::MidAttack);
        app.update();
        assert_eq!(presenter_state(&app), PresenterState::Visible);
        {
            let line = app.world().resource::<LinePresenter>().line().unwrap();
            assert!(line.vertex_count() > 1);
            assert_eq!(line.vertices()[0], SPAWN);
            // Launched along -Z
            assert!(line.vertices()[1].z < SPAWN.z);
        }

        set_attack(&mut app, loadout.item, AttackState::Idle);
        app.update();
        assert_eq!(presenter_state(&app), PresenterState::Hidden);
    }

    #[test]
    fn test_disabled_crossbow_never_shows() {
        let mut app = test_app();
        let loadout = equip(&mut app, WeaponKind::Crossbow);
        app.update();

        app.world_mut()
            .resource_mut::<TrajectoryConfig>()
            .crossbow_enabled = false;

        for state in [
            AttackState::MidAttack,
            AttackState::Idle,
            AttackState::MidAttack,
            AttackState::Recovering,
        ] {
            set_attack(&mut app, loadout.item, state);
            app.update();
            assert_ne!(presenter_state(&app), PresenterState::Visible);
        }
        assert!(app.world().resource::<LinePresenter>().line().is_none());
    }

    #[test]
    fn test_leaving_world_hides_line() {
        let mut app = test_app();
        let loadout = equip(&mut app, WeaponKind::TacticalBow);
        set_attack(&mut app, loadout.item, AttackState::MidAttack);
        app.update();
        assert_eq!(presenter_state(&app), PresenterState::Visible);

        app.world_mut()
            .get_mut::<LocalPlayer>(loadout.player)
            .unwrap()
            .in_world = false;
        app.update();
        assert_eq!(presenter_state(&app), PresenterState::Hidden);
    }

    #[test]
    fn test_unequipping_hides_line() {
        let mut app = test_app();
        let loadout = equip(&mut app, WeaponKind::TacticalBow);
        set_attack(&mut app, loadout.item, AttackState::MidAttack);
        app.update();

        app.world_mut()
            .get_mut::<LocalPlayer>(loadout.player)
            .unwrap()
            .right_hand_item = None;
        app.update();
        assert_eq!(presenter_state(&app), PresenterState::Hidden);
    }

    #[test]
    fn test_unknown_item_is_ignored() {
        let mut app = test_app();
        let loadout = equip_id(&mut app, ItemId(12));
        set_attack(&mut app, loadout.item, AttackState::MidAttack);
        app.update();
        assert_eq!(presenter_state(&app), PresenterState::Uninitialized);
    }

    #[test]
    fn test_item_without_bow_controller_is_ignored() {
        let mut app = test_app();
        let loadout = equip(&mut app, WeaponKind::CraftedBow);
        app.world_mut()
            .entity_mut(loadout.item)
            .remove::<BowController>();
        app.update();
        assert_eq!(presenter_state(&app), PresenterState::Uninitialized);
    }

    #[test]
    fn test_widths_follow_config() {
        let mut app = test_app();
        let loadout = equip(&mut app, WeaponKind::CraftedBow);
        set_attack(&mut app, loadout.item, AttackState::MidAttack);
        app.update();

        {
            let mut config = app.world_mut().resource_mut::<TrajectoryConfig>();
            config.line_start_width = 0.05;
            config.line_end_width = 0.8;
        }
        app.update();

        let line = app.world().resource::<LinePresenter>().line().unwrap();
        assert_eq!((line.start_width(), line.end_width()), (0.05, 0.8));
    }

    #[test]
    fn test_ground_plane_ends_path() {
        let mut app = test_app();
        app.world_mut().resource_mut::<SamplerSettings>().ground_height = Some(0.0);
        let loadout = equip(&mut app, WeaponKind::CraftedBow);
        set_attack(&mut app, loadout.item, AttackState::MidAttack);
        app.update();

        let line = app.world().resource::<LinePresenter>().line().unwrap();
        let last = line.vertices()[line.vertex_count() - 1];
        assert!(last.y.abs() < 1e-4);
        assert!(line.vertex_count() < app.world().resource::<SamplerSettings>().max_points);
    }

    #[test]
    fn test_host_simulator_takes_over() {
        let mut app = test_app();
        app.insert_resource(HostTrajectorySimulator::new(
            |launch: &LaunchParameters, out: &mut Vec<Vec3>| {
                out.extend((1..=4).map(|i| launch.origin + launch.direction * i as f32));
            },
        ));
        let loadout = equip(&mut app, WeaponKind::CraftedBow);
        set_attack(&mut app, loadout.item, AttackState::MidAttack);
        app.update();

        let line = app.world().resource::<LinePresenter>().line().unwrap();
        assert_eq!(line.vertex_count(), 5);
        assert_eq!(line.vertices()[0], SPAWN);
        assert!(line.vertices()[4].distance(SPAWN + Vec3::NEG_Z * 4.0) < 1e-4);
    }

    #[test]
    fn test_missing_line_asset_disables_overlay() {
        let mut app = App::new();
        app.add_plugins(MinimalPlugins);
        app.insert_resource(ConfigStore::memory());
        app.insert_resource(LineAssetSource::File(PathBuf::from("missing/trajectory_line.ron")));
        app.add_plugins((TrajectoryCorePlugin, TrajectorySettingsPlugin));

        let loadout = equip(&mut app, WeaponKind::CraftedBow);
        set_attack(&mut app, loadout.item, AttackState::MidAttack);
        for _ in 0..3 {
            app.update();
            assert_eq!(presenter_state(&app), PresenterState::Disabled);
        }
    }

    #[test]
    fn test_reset_defaults_restores_config_and_menu() {
        let mut app = test_app();
        app.update();
        assert!(app.world().contains_resource::<SettingsMenu>());

        for (key, value) in [
            (ConfigKey::CraftedBowEnabled, ConfigValue::Bool(false)),
            (ConfigKey::TacticalBowEnabled, ConfigValue::Bool(false)),
            (ConfigKey::CrossbowEnabled, ConfigValue::Bool(false)),
            (ConfigKey::TrajectoryLineStartWidth, ConfigValue::Float(0.7)),
            (ConfigKey::TrajectoryLineEndWidth, ConfigValue::Float(3.0)),
        ] {
            app.world_mut()
                .write_message(SettingsEvent::ValueChanged { key, value });
        }
        app.update();

        {
            let config = app.world().resource::<TrajectoryConfig>();
            assert!(!config.crafted_bow_enabled);
            assert!(!config.tactical_bow_enabled);
            assert!(!config.crossbow_enabled);
            assert_eq!(config.line_start_width, 0.7);
            assert_eq!(config.line_end_width, 1.0);

            let menu = app.world().resource::<SettingsMenu>();
            match menu.control(ConfigKey::TrajectoryLineEndWidth) {
                Some(MenuControl::Slider { value, .. }) => assert_eq!(*value, 1.0),
                other => panic!("expected slider, got {other:?}"),
            }

            // Width sliders refresh the line live.
            let line = app.world().resource::<LinePresenter>().line().unwrap();
            assert_eq!((line.start_width(), line.end_width()), (0.7, 1.0));
        }

        app.world_mut().write_message(SettingsEvent::ResetDefaults);
        app.update();

        let config = app.world().resource::<TrajectoryConfig>();
        assert_eq!(*config, TrajectoryConfig::default());

        let menu = app.world().resource::<SettingsMenu>();
        for key in ConfigKey::ALL {
            let shown = match menu.control(key) {
                Some(MenuControl::Slider { value, .. }) => ConfigValue::Float(*value),
                Some(MenuControl::Toggle { value, .. }) => ConfigValue::Bool(*value),
                other => panic!("no control for {key:?}: {other:?}"),
            };
            assert_eq!(shown, key.default_value());
        }

        let line = app.world().resource::<LinePresenter>().line().unwrap();
        assert_eq!((line.start_width(), line.end_width()), (0.1, 0.1));
    }

    #[test]
    fn test_settings_persist_between_sessions() {
        let dir = tempfile::tempdir().unwrap();

        let mut first = App::new();
        first.add_plugins(MinimalPlugins);
        first.insert_resource(ConfigStore::in_dir(dir.path()));
        first.insert_resource(SettingsAutosave::new(Duration::ZERO));
        first.add_plugins((TrajectoryCorePlugin, TrajectorySettingsPlugin));
        first.update();
        first.world_mut().write_message(SettingsEvent::ValueChanged {
            key: ConfigKey::CrossbowEnabled,
            value: ConfigValue::Bool(false),
        });
        first.update();

        let mut second = App::new();
        second.add_plugins(MinimalPlugins);
        second.insert_resource(ConfigStore::in_dir(dir.path()));
        second.add_plugins((TrajectoryCorePlugin, TrajectorySettingsPlugin));
        second.update();

        let config = second.world().resource::<TrajectoryConfig>();
        assert!(!config.crossbow_enabled);
        assert!(config.crafted_bow_enabled);

        let menu = second.world().resource::<SettingsMenu>();
        match menu.control(ConfigKey::CrossbowEnabled) {
            Some(MenuControl::Toggle { value, .. }) => assert!(!*value),
            other => panic!("expected toggle, got {other:?}"),
        }
    }

    #[test]
    fn test_slider_drag_saves_once_settled_or_on_exit() {
        let dir = tempfile::tempdir().unwrap();
        let store = ConfigStore::in_dir(dir.path());
        let path = store.path().unwrap().to_path_buf();

        let mut app = App::new();
        app.add_plugins(MinimalPlugins);
        app.insert_resource(store);
        app.insert_resource(SettingsAutosave::new(Duration::from_secs(3600)));
        app.add_plugins((TrajectoryCorePlugin, TrajectorySettingsPlugin));
        app.update();

        for width in [0.2, 0.3, 0.4, 0.5] {
            app.world_mut().write_message(SettingsEvent::ValueChanged {
                key: ConfigKey::TrajectoryLineStartWidth,
                value: ConfigValue::Float(width),
            });
            app.update();
        }
        assert!(!path.exists(), "saved while the slider was still moving");
        assert!(app.world().resource::<SettingsAutosave>().is_dirty());

        app.world_mut().write_message(AppExit::Success);
        app.update();
        assert!(path.exists());

        let saved = ConfigStore::in_dir(dir.path()).load().unwrap();
        assert_eq!(saved.line_start_width, 0.5);
    }

    #[test]
    fn test_rejected_value_leaves_config_untouched() {
        let mut app = test_app();
        app.update();
        app.world_mut().write_message(SettingsEvent::ValueChanged {
            key: ConfigKey::CraftedBowEnabled,
            value: ConfigValue::Float(0.0),
        });
        app.update();
        assert!(app.world().resource::<TrajectoryConfig>().crafted_bow_enabled);
    }

    #[cfg(feature = "dim3")]
    mod geometry {
        use avian3d::prelude::*;
        use bevy::time::TimeUpdateStrategy;
        use bevy::transform::TransformPlugin;

        use super::*;

        const REST: Vec3 = Vec3::new(0.0, 1.6, 0.0);
        const WALL_FACE_Z: f32 = -9.9;

        fn physics_app() -> App {
            let mut app = App::new();
            app.add_plugins((
                MinimalPlugins,
                TransformPlugin,
                AssetPlugin::default(),
                bevy::scene::ScenePlugin,
            ))
            .init_asset::<Mesh>()
            .insert_resource(TimeUpdateStrategy::ManualDuration(Duration::from_secs_f32(
                1.0 / 60.0,
            )))
            .add_plugins(PhysicsPlugins::default())
            .insert_resource(ConfigStore::memory())
            .add_plugins((TrajectoryCorePlugin, TrajectorySettingsPlugin));
            app
        }

        /// Archer standing inside a capsule collider, with a collider hanging
        /// off the bow right at the arrow rest, aiming at a wall 10m away.
        fn spawn_range(app: &mut App) -> Entity {
            let item_id = app
                .world()
                .resource::<ItemCatalog>()
                .id_of(WeaponKind::CraftedBow);

            app.world_mut().spawn((
                Transform::from_xyz(0.0, 1.6, -10.0),
                RigidBody::Static,
                Collider::cuboid(4.0, 4.0, 0.2),
            ));

            let spawn_point = app
                .world_mut()
                .spawn(Transform::from_translation(REST).looking_to(Vec3::NEG_Z, Vec3::Y))
                .id();
            let item = app
                .world_mut()
                .spawn((
                    Transform::default(),
                    InventoryItem { item_id },
                    RangedWeapon::new(spawn_point),
                    BowController {
                        attack_state: AttackState::MidAttack,
                    },
                ))
                .with_child((Transform::from_translation(REST), Collider::cuboid(0.1, 1.2, 0.1)))
                .id();
            app.world_mut().spawn((
                Transform::from_xyz(0.0, 1.0, 0.0),
                RigidBody::Kinematic,
                Collider::capsule(0.4, 1.2),
                LocalPlayer::in_world().holding(item),
            ));
            item
        }

        #[test]
        fn test_wall_ends_path_and_own_colliders_are_ignored() {
            let mut app = physics_app();
            spawn_range(&mut app);

            // Let the fixed loop populate the query pipeline.
            for _ in 0..10 {
                app.update();
            }

            assert_eq!(presenter_state(&app), PresenterState::Visible);
            let line = app.world().resource::<LinePresenter>().line().unwrap();
            let vertices = line.vertices();
            assert!(vertices.len() > 2, "line collapsed to {vertices:?}");
            assert_eq!(vertices[0], REST);
            assert!(vertices[1].z < REST.z - 0.5);

            let last = vertices[vertices.len() - 1];
            assert!((last.z - WALL_FACE_Z).abs() < 0.01, "ended at {last:?}");
            assert!(last.y > 0.0 && last.y < REST.y);
        }

        #[test]
        fn test_releasing_after_wall_hit_hides_line() {
            let mut app = physics_app();
            let item = spawn_range(&mut app);
            for _ in 0..10 {
                app.update();
            }
            assert_eq!(presenter_state(&app), PresenterState::Visible);

            set_attack(&mut app, item, AttackState::Recovering);
            app.update();
            assert_eq!(presenter_state(&app), PresenterState::Hidden);
        }
    }
}
