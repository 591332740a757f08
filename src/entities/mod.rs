//! Entity lifecycle for Tidefall.
//!
//! Responsible for:
//! - Outfitting the castaway and placing them at the spawn tile
//! - Spawning the survivor NPCs near camp and wildlife further out
//! - Sweeping dead wildlife off the map (their loot falls where they stood)

use bevy::prelude::*;
use rand::Rng;

use crate::economy::Inventory;
use crate::shared::*;
use crate::world::{generation::generate_world, WorldMap};

pub mod templates;

pub use templates::{
    roll_quest, Enemy, EnemyRegistry, EnemyTemplate, Npc, NpcGoal, QuestDef, SURVIVOR_NAMES,
};

/// Wildlife keeps at least this walking distance from the spawn tile.
const ENEMY_MIN_SPAWN_DISTANCE: u32 = 5;
/// Survivors wash up within this box around the spawn tile.
const NPC_SPAWN_RADIUS: i32 = 2;
const NPC_QUEST_CHANCE: f64 = 0.6;

// ═══════════════════════════════════════════════════════════════════════
// PLUGIN
// ═══════════════════════════════════════════════════════════════════════

pub struct EntityPlugin;

impl Plugin for EntityPlugin {
    fn build(&self, app: &mut App) {
        app.init_resource::<EnemyRegistry>()
            // Population follows the island: the map must exist first.
            .add_systems(
                OnEnter(GameState::Running),
                spawn_population.after(generate_world),
            )
            // Runs before combat so a kill claimed there is flushed away
            // before this sweep could see it and drop the loot twice.
            .add_systems(
                Update,
                despawn_dead_enemies
                    .before(crate::combat::handle_combat_commands)
                    .run_if(in_state(GameState::Running)),
            );
    }
}

// ═══════════════════════════════════════════════════════════════════════
// SYSTEMS
// ═══════════════════════════════════════════════════════════════════════

/// Place the player, hand out the starting kit, and spawn everyone else.
pub fn spawn_population(
    mut commands: Commands,
    config: Res<SimConfig>,
    map: Res<WorldMap>,
    enemy_registry: Res<EnemyRegistry>,
    item_registry: Res<ItemRegistry>,
    mut player: ResMut<PlayerState>,
    mut inventory: ResMut<Inventory>,
) {
    let mut rng = rand::thread_rng();

    player.pos = map.spawn;
    match item_registry.get("axe") {
        Some(def) => {
            player.equipment.set(EquipSlot::Tool, Some(ItemInstance::from_def(def)));
        }
        None => warn!("[Entities] No axe definition; the castaway starts bare-handed"),
    }
    inventory.add("berries", 3);
    inventory.add("water", 2);

    for i in 0..config.npc_count {
        let name = SURVIVOR_NAMES[i % SURVIVOR_NAMES.len()];
        let mut npc = Npc::new(name);
        if rng.gen::<f64>() < NPC_QUEST_CHANCE {
            npc.available_quest = Some(roll_quest(&mut rng));
        }
        let pos = place_near(&map, &mut rng, map.spawn, NPC_SPAWN_RADIUS);
        commands.spawn((npc, pos));
        info!("[Entities] Survivor {name} joins the camp at {pos:?}");
    }

    let template_ids: Vec<&String> = enemy_registry.templates.keys().collect();
    if template_ids.is_empty() {
        warn!("[Entities] No enemy templates registered; the island is strangely calm");
        return;
    }
    for _ in 0..config.enemy_count {
        let id = template_ids[rng.gen_range(0..template_ids.len())];
        let Some(template) = enemy_registry.get(id) else {
            continue;
        };
        let Some(pos) = place_far(&map, &mut rng, map.spawn, ENEMY_MIN_SPAWN_DISTANCE) else {
            warn!("[Entities] Nowhere distant enough to spawn wildlife");
            break;
        };
        commands.spawn((Enemy::from_template(template, false), pos));
        info!("[Entities] A {} prowls at {pos:?}", template.name);
    }
}

/// Remove wildlife whose health ran out away from an active fight; whatever
/// it carried drops on its tile. Kills inside combat are settled by the
/// combat domain, which also claims the loot.
pub fn despawn_dead_enemies(
    mut commands: Commands,
    combat: Res<ActiveCombat>,
    mut map: ResMut<WorldMap>,
    enemies: Query<(Entity, &Enemy, &GridPos)>,
) {
    for (entity, enemy, pos) in &enemies {
        if enemy.health > 0.0 {
            continue;
        }
        if combat.0.as_ref().is_some_and(|c| c.enemy == entity) {
            continue;
        }
        if let Some(tile) = map.get_mut(*pos) {
            for (item, amount) in &enemy.loot {
                tile.ground_items.add(item, *amount);
            }
        }
        info!("[Entities] The {} is dead; its remains lie at {pos:?}", enemy.name);
        commands.entity(entity).despawn();
    }
}

// ═══════════════════════════════════════════════════════════════════════
// PLACEMENT
// ═══════════════════════════════════════════════════════════════════════

/// Random accessible tile within a box around `origin`; falls back to the
/// origin itself when the dice keep landing in the water.
fn place_near(map: &WorldMap, rng: &mut impl Rng, origin: GridPos, radius: i32) -> GridPos {
    for _ in 0..MAX_PLACEMENT_ATTEMPTS {
        let pos = origin.offset(rng.gen_range(-radius..=radius), rng.gen_range(-radius..=radius));
        if map.is_accessible(pos) {
            return pos;
        }
    }
    origin
}

/// Random accessible tile at least `min_distance` walking steps from
/// `origin`; scan order decides when the dice give up. A cramped island
/// relaxes the distance floor to any accessible tile but `origin`, so
/// `None` means the map has no other walkable ground at all.
fn place_far(
    map: &WorldMap,
    rng: &mut impl Rng,
    origin: GridPos,
    min_distance: u32,
) -> Option<GridPos> {
    for _ in 0..MAX_PLACEMENT_ATTEMPTS {
        let pos = GridPos::new(
            rng.gen_range(0..map.width as i32),
            rng.gen_range(0..map.height as i32),
        );
        if map.is_accessible(pos) && pos.manhattan(origin) >= min_distance {
            return Some(pos);
        }
    }
    map.positions()
        .find(|&p| map.is_accessible(p) && p.manhattan(origin) >= min_distance)
        .or_else(|| map.positions().find(|&p| map.is_accessible(p) && p != origin))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::world::generation::generate_island;

    #[test]
    fn far_placement_respects_the_distance_floor() {
        let map = generate_island(18, 12);
        let mut rng = rand::thread_rng();
        for _ in 0..50 {
            if let Some(pos) = place_far(&map, &mut rng, map.spawn, ENEMY_MIN_SPAWN_DISTANCE) {
                assert!(map.is_accessible(pos));
                assert!(pos.manhattan(map.spawn) >= ENEMY_MIN_SPAWN_DISTANCE);
            }
        }
    }

    #[test]
    fn far_placement_settles_for_close_ground_on_a_cramped_island() {
        // A three-by-three islet has no tile far enough out, so the
        // distance floor gives way.
        let mut islet = WorldMap::new(3, 3);
        for pos in islet.positions().collect::<Vec<_>>() {
            islet.update_tile_kind(pos, TerrainKind::Plains);
        }
        let origin = GridPos::new(1, 1);
        let mut rng = rand::thread_rng();
        let pos = place_far(&islet, &mut rng, origin, ENEMY_MIN_SPAWN_DISTANCE)
            .expect("a walkable islet still offers ground");
        assert!(islet.is_accessible(pos));
        assert_ne!(pos, origin);

        let drowned = WorldMap::new(3, 3);
        assert!(place_far(&drowned, &mut rng, origin, ENEMY_MIN_SPAWN_DISTANCE).is_none());
    }

    #[test]
    fn near_placement_lands_on_walkable_ground() {
        let map = generate_island(18, 12);
        let mut rng = rand::thread_rng();
        for _ in 0..50 {
            let pos = place_near(&map, &mut rng, map.spawn, NPC_SPAWN_RADIUS);
            assert!(map.is_accessible(pos));
        }
    }
}
