use bevy::app::ScheduleRunnerPlugin;
use bevy::prelude::*;
use bevy_bow_trajectory::prelude::*;
use std::time::Duration;

fn main() {
    println!("Starting Headless Trajectory Preview...");
    println!("A crafted bow is drawn and released every second for 5 seconds...");

    App::new()
        .add_plugins(MinimalPlugins.set(ScheduleRunnerPlugin::run_loop(Duration::from_secs_f64(1.0 / 60.0))))
        .insert_resource(ConfigStore::memory())
        .insert_resource(SamplerSettings {
            ground_height: Some(0.0),
            ..Default::default()
        })
        .add_plugins((TrajectoryCorePlugin, TrajectorySettingsPlugin))
        // Skip Render and Debug plugins (headless)
        .add_systems(Startup, setup_player)
        .add_systems(Update, (cycle_draw, report_line).chain().after(TrajectorySet::Predict))
        .run();
}

#[derive(Component)]
struct DemoBow;

fn setup_player(mut commands: Commands, catalog: Res<ItemCatalog>) {
    println!("\n[SETUP] Spawning player with a crafted bow...");

    let spawn_point = commands
        .spawn((
            // No transform propagation without DefaultPlugins, so set the global directly
            GlobalTransform::from(
                Transform::from_xyz(0.0, 1.6, 0.0).looking_to(Vec3::new(0.0, 0.15, -1.0), Vec3::Y),
            ),
            Name::new("Arrow Rest"),
        ))
        .id();

    let bow = commands
        .spawn((
            DemoBow,
            InventoryItem {
                item_id: catalog.crafted_bow,
            },
            RangedWeapon::new(spawn_point).with_ammo(BallisticProperties {
                speed: 45.0,
                gravity_scale: 1.0,
                drag: DragModel::Quadratic { coefficient: 0.0015 },
            }),
            BowController::default(),
            Name::new("Crafted Bow"),
        ))
        .id();

    commands.spawn((LocalPlayer::in_world().holding(bow), Name::new("Player")));
}

fn cycle_draw(time: Res<Time>, mut bows: Query<&mut BowController, With<DemoBow>>) {
    let drawn = time.elapsed_secs() as u32 % 2 == 0;
    for mut controller in bows.iter_mut() {
        controller.attack_state = if drawn {
            AttackState::MidAttack
        } else {
            AttackState::Idle
        };
    }

    // Auto-quit after 5 seconds
    if time.elapsed_secs() > 5.0 {
        println!("[FINISHED] Preview complete.");
        std::process::exit(0);
    }
}

fn report_line(presenter: Res<LinePresenter>, mut last: Local<Option<PresenterState>>) {
    let state = presenter.state();
    if *last == Some(state) {
        return;
    }
    *last = Some(state);

    match presenter.line() {
        Some(line) if line.is_visible() => {
            let end = line.vertices()[line.vertex_count() - 1];
            println!(
                "[DRAWN] {} points, lands at {:.1}m (widths {:.2} -> {:.2})",
                line.vertex_count(),
                end.distance(line.vertices()[0]),
                line.start_width(),
                line.end_width()
            );
        }
        _ => println!("[STATE] {state:?}"),
    }
}
