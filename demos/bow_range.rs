//! Archery range demonstrating the trajectory overlay.

use avian3d::prelude::*;
use bevy::prelude::*;
use bevy_bow_trajectory::prelude::*;

fn main() {
    App::new()
        .add_plugins(DefaultPlugins)
        .add_plugins(PhysicsPlugins::default())
        .add_plugins(TrajectoryPluginGroup)
        .add_systems(Startup, setup)
        .add_systems(Update, (handle_input, update_ui).before(TrajectorySet::Predict))
        .run();
}

#[derive(Component)]
struct ArcherCamera;

#[derive(Component)]
struct HelpText;

#[derive(Resource)]
struct Armory {
    bows: [(WeaponKind, Entity); 3],
}

fn setup(
    mut commands: Commands,
    mut meshes: ResMut<Assets<Mesh>>,
    mut materials: ResMut<Assets<StandardMaterial>>,
    catalog: Res<ItemCatalog>,
) {
    // Camera doubles as the player's eyes; the arrow rest hangs off it.
    let camera = commands
        .spawn((
            Camera3d::default(),
            Transform::from_xyz(0.0, 1.7, 10.0),
            ArcherCamera,
        ))
        .id();
    let spawn_point = commands
        .spawn((Transform::from_xyz(0.25, -0.2, -0.5), ChildOf(camera)))
        .id();

    // Light
    commands.spawn((
        DirectionalLight {
            illuminance: 10000.0,
            shadows_enabled: true,
            ..default()
        },
        Transform::from_rotation(Quat::from_euler(EulerRot::XYZ, -0.5, 0.5, 0.0)),
    ));

    // Ground
    commands.spawn((
        Mesh3d(meshes.add(Plane3d::default().mesh().size(120.0, 120.0))),
        MeshMaterial3d(materials.add(StandardMaterial {
            base_color: Color::srgb(0.3, 0.5, 0.3),
            ..default()
        })),
        RigidBody::Static,
        Collider::cuboid(120.0, 0.01, 120.0),
    ));

    // Targets at increasing range
    let target_mesh = meshes.add(Cuboid::new(2.0, 2.0, 0.3));
    let target_material = materials.add(StandardMaterial {
        base_color: Color::srgb(0.8, 0.2, 0.2),
        ..default()
    });
    for i in 0..4 {
        commands.spawn((
            Mesh3d(target_mesh.clone()),
            MeshMaterial3d(target_material.clone()),
            Transform::from_xyz(-6.0 + i as f32 * 4.0, 1.0, -10.0 - i as f32 * 12.0),
            RigidBody::Static,
            Collider::cuboid(2.0, 2.0, 0.3),
        ));
    }

    // One item per weapon kind, each with its own ammunition.
    let mut spawn_bow = |kind: WeaponKind, ammo: BallisticProperties| {
        commands
            .spawn((
                InventoryItem {
                    item_id: catalog.id_of(kind),
                },
                RangedWeapon::new(spawn_point).with_ammo(ammo),
                BowController::default(),
                Name::new(format!("{kind:?}")),
            ))
            .id()
    };
    let bows = [
        (
            WeaponKind::CraftedBow,
            spawn_bow(
                WeaponKind::CraftedBow,
                BallisticProperties {
                    speed: 30.0,
                    gravity_scale: 1.0,
                    drag: DragModel::Quadratic { coefficient: 0.002 },
                },
            ),
        ),
        (
            WeaponKind::TacticalBow,
            spawn_bow(WeaponKind::TacticalBow, BallisticProperties::default()),
        ),
        (
            WeaponKind::Crossbow,
            spawn_bow(
                WeaponKind::Crossbow,
                BallisticProperties {
                    speed: 70.0,
                    gravity_scale: 0.8,
                    drag: DragModel::Linear { coefficient: 0.02 },
                },
            ),
        ),
    ];
    commands.spawn(LocalPlayer::in_world().holding(bows[0].1));
    commands.insert_resource(Armory { bows });

    commands.spawn((
        Text::new(""),
        TextFont {
            font_size: 20.0,
            ..default()
        },
        Node {
            position_type: PositionType::Absolute,
            top: Val::Px(12.0),
            left: Val::Px(12.0),
            ..default()
        },
        HelpText,
    ));
}

#[allow(clippy::too_many_arguments)]
fn handle_input(
    keyboard: Res<ButtonInput<KeyCode>>,
    mouse: Res<ButtonInput<MouseButton>>,
    time: Res<Time>,
    armory: Res<Armory>,
    config: Res<TrajectoryConfig>,
    mut sampler: ResMut<SamplerSettings>,
    mut settings: MessageWriter<SettingsEvent>,
    mut players: Query<&mut LocalPlayer>,
    mut controllers: Query<&mut BowController>,
    mut camera: Query<&mut Transform, With<ArcherCamera>>,
) {
    let Ok(mut player) = players.single_mut() else {
        return;
    };

    for (key, slot) in [(KeyCode::Digit1, 0), (KeyCode::Digit2, 1), (KeyCode::Digit3, 2)] {
        if keyboard.just_pressed(key) {
            player.right_hand_item = Some(armory.bows[slot].1);
        }
    }
    if keyboard.just_pressed(KeyCode::Digit0) {
        player.right_hand_item = None;
    }

    // Aim with the arrow keys
    if let Ok(mut transform) = camera.single_mut() {
        let dt = time.delta_secs();
        let mut yaw = 0.0;
        let mut pitch = 0.0;
        if keyboard.pressed(KeyCode::ArrowLeft) {
            yaw += dt;
        }
        if keyboard.pressed(KeyCode::ArrowRight) {
            yaw -= dt;
        }
        if keyboard.pressed(KeyCode::ArrowUp) {
            pitch += dt * 0.5;
        }
        if keyboard.pressed(KeyCode::ArrowDown) {
            pitch -= dt * 0.5;
        }
        transform.rotate_y(yaw);
        transform.rotate_local_x(pitch);
    }

    // Hold the right mouse button to draw
    if let Some(item) = player.right_hand_item {
        if let Ok(mut controller) = controllers.get_mut(item) {
            controller.attack_state = if mouse.pressed(MouseButton::Right) {
                AttackState::MidAttack
            } else if mouse.just_released(MouseButton::Right) {
                AttackState::Recovering
            } else {
                AttackState::Idle
            };
        }
    }

    // Settings shortcuts, routed through the same messages as the menu
    let nudge = |key: ConfigKey, delta: f32| match config.get(key) {
        ConfigValue::Float(current) => Some(SettingsEvent::ValueChanged {
            key,
            value: ConfigValue::Float(current + delta),
        }),
        ConfigValue::Bool(_) => None,
    };
    let width_keys = [
        (KeyCode::KeyQ, ConfigKey::TrajectoryLineStartWidth, -0.05),
        (KeyCode::KeyW, ConfigKey::TrajectoryLineStartWidth, 0.05),
        (KeyCode::KeyA, ConfigKey::TrajectoryLineEndWidth, -0.05),
        (KeyCode::KeyS, ConfigKey::TrajectoryLineEndWidth, 0.05),
    ];
    for (code, key, delta) in width_keys {
        if keyboard.just_pressed(code) {
            if let Some(event) = nudge(key, delta) {
                settings.write(event);
            }
        }
    }
    if keyboard.just_pressed(KeyCode::KeyC) {
        settings.write(SettingsEvent::ValueChanged {
            key: ConfigKey::CrossbowEnabled,
            value: ConfigValue::Bool(!config.crossbow_enabled),
        });
    }
    if keyboard.just_pressed(KeyCode::KeyR) {
        settings.write(SettingsEvent::ResetDefaults);
    }
    if keyboard.just_pressed(KeyCode::KeyT) {
        sampler.debug_draw = !sampler.debug_draw;
    }
}

fn update_ui(
    config: Res<TrajectoryConfig>,
    players: Query<&LocalPlayer>,
    items: Query<&Name, With<InventoryItem>>,
    mut text: Query<&mut Text, With<HelpText>>,
) {
    let Ok(mut text) = text.single_mut() else {
        return;
    };
    let holding = players
        .single()
        .ok()
        .and_then(|player| player.right_hand_item)
        .and_then(|item| items.get(item).ok())
        .map_or("nothing".to_string(), |name| name.to_string());

    text.0 = format!(
        "Hold RMB to draw, arrows to aim\n1-3 switch weapon, 0 unequip (holding: {holding})\n\
         Q/W start width {:.2}, A/S end width {:.2}\nC crossbow line {}, R reset, T debug",
        config.line_start_width,
        config.line_end_width,
        if config.crossbow_enabled { "on" } else { "off" },
    );
}
