//! Host-facing components read by the trajectory overlay.
//!
//! The host game writes these; the overlay only reads them.

use bevy::prelude::*;

use crate::types::{AttackState, BallisticProperties, ItemId};

/// The local player's inventory and world state.
///
/// # Fields
/// * `in_world` - False while in menus or loading screens
/// * `right_hand_item` - Item entity equipped in the right hand
///
/// # Example
/// ```
/// use bevy::prelude::*;
/// use bevy_bow_trajectory::components::LocalPlayer;
///
/// let player = LocalPlayer::in_world().holding(Entity::PLACEHOLDER);
/// assert!(player.right_hand_item.is_some());
/// ```
#[derive(Component, Reflect, Default, Clone)]
#[reflect(Component)]
pub struct LocalPlayer {
    pub in_world: bool,
    pub right_hand_item: Option<Entity>,
}

impl LocalPlayer {
    /// A player in the world with empty hands.
    pub fn in_world() -> Self {
        Self {
            in_world: true,
            right_hand_item: None,
        }
    }

    /// Builder pattern: equip an item in the right hand
    pub fn holding(mut self, item: Entity) -> Self {
        self.right_hand_item = Some(item);
        self
    }
}

/// Identity of an inventory item.
#[derive(Component, Reflect, Default, Clone)]
#[reflect(Component)]
pub struct InventoryItem {
    pub item_id: ItemId,
}

/// Ranged weapon capability of an item.
///
/// # Fields
/// * `spawn_point` - Entity whose `GlobalTransform` marks where projectiles leave
///   the weapon; its forward axis is the launch direction
/// * `ammo` - Ballistic properties of the currently loaded ammunition
#[derive(Component, Reflect, Clone)]
#[reflect(Component)]
pub struct RangedWeapon {
    pub spawn_point: Entity,
    pub ammo: BallisticProperties,
}

impl RangedWeapon {
    pub fn new(spawn_point: Entity) -> Self {
        Self {
            spawn_point,
            ammo: BallisticProperties::default(),
        }
    }

    /// Builder pattern: set loaded ammunition
    pub fn with_ammo(mut self, ammo: BallisticProperties) -> Self {
        self.ammo = ammo;
        self
    }
}

/// Draw/release controller of a bow or crossbow.
#[derive(Component, Reflect, Default, Clone)]
#[reflect(Component)]
pub struct BowController {
    pub attack_state: AttackState,
}

/// Marker for the entity rendering the trajectory line.
#[derive(Component, Reflect, Default)]
#[reflect(Component)]
pub struct TrajectoryLineMesh;
