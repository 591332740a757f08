//! Survivor behavior for Tidefall.
//!
//! Responsible for:
//! - Re-deriving each survivor's goal on a fixed cadence
//! - Walking them one tile at a time toward whatever the goal points at
//! - Letting them fight nearby wildlife, forage, and stock the camp shelter
//! - The talk interaction: quests offered and turned in (see `quests`)
//!
//! Survivors act on the same world the player does: they draw from the same
//! harvest pools and deposit into the same designated shelter. Wildlife
//! never strikes back at a survivor; only the player fights for their life.

use bevy::prelude::*;
use rand::Rng;

use crate::entities::{Enemy, Npc, NpcGoal};
use crate::shared::*;
use crate::world::{ShelterRegistry, WorldMap};

pub mod quests;

// ═══════════════════════════════════════════════════════════════════════
// PLUGIN
// ═══════════════════════════════════════════════════════════════════════

/// Cadence of survivor decision-making, armed from `SimConfig` when the
/// run starts.
#[derive(Resource, Debug)]
pub struct NpcTickTimer(pub Timer);

pub struct NpcPlugin;

impl Plugin for NpcPlugin {
    fn build(&self, app: &mut App) {
        app.add_systems(OnEnter(GameState::Running), arm_tick_timer)
            .add_systems(
                Update,
                (run_survivor_tick, quests::handle_talk_requests)
                    .in_set(SimSet::Resolve)
                    .run_if(in_state(GameState::Running)),
            );
    }
}

fn arm_tick_timer(mut commands: Commands, config: Res<SimConfig>) {
    commands.insert_resource(NpcTickTimer(Timer::from_seconds(
        config.npc_tick_secs,
        TimerMode::Repeating,
    )));
}

// ═══════════════════════════════════════════════════════════════════════
// SURVIVOR TICK
// ═══════════════════════════════════════════════════════════════════════

/// One decision round for every survivor. Goals are re-derived from scratch
/// each round in strict priority order: fight a close threat, unload a full
/// pack, gather what the camp is short of, otherwise forage freely.
pub fn run_survivor_tick(
    time: Res<Time>,
    mut timer: ResMut<NpcTickTimer>,
    mut commands: Commands,
    mut map: ResMut<WorldMap>,
    shelters: Res<ShelterRegistry>,
    mut npcs: Query<(Entity, &mut Npc, &mut GridPos), Without<Enemy>>,
    mut enemies: Query<(Entity, &mut Enemy, &GridPos), Without<Npc>>,
) {
    if !timer.0.tick(time.delta()).just_finished() {
        return;
    }

    // Fallen survivors leave the camp before anyone else acts.
    for (entity, npc, pos) in npcs.iter() {
        if npc.health <= 0.0 {
            info!("[Npc] {} succumbs at {pos:?}", npc.name);
            commands.entity(entity).despawn();
        }
    }

    let threats: Vec<(Entity, GridPos)> = enemies
        .iter()
        .filter(|(_, enemy, _)| enemy.health > 0.0)
        .map(|(entity, _, pos)| (entity, *pos))
        .collect();

    let mut rng = rand::thread_rng();
    for (_, mut npc, mut pos) in npcs.iter_mut() {
        if npc.health <= 0.0 {
            continue;
        }

        let threat = threats
            .iter()
            .map(|&(entity, enemy_pos)| (entity, enemy_pos, pos.manhattan(enemy_pos)))
            .filter(|&(_, _, dist)| dist <= NPC_AGGRO_RADIUS)
            .min_by_key(|&(_, _, dist)| dist);

        npc.target_enemy = threat.map(|(entity, _, _)| entity);
        npc.target_resource = None;
        npc.goal = if npc.target_enemy.is_some() {
            NpcGoal::Fighting
        } else if shelters.designated.is_some() && npc.inventory.total() >= npc.capacity {
            NpcGoal::Depositing
        } else if let Some(wanted) = camp_shortfall(&shelters, &map) {
            npc.target_resource = Some(wanted);
            NpcGoal::GatheringMaterials
        } else {
            NpcGoal::Harvesting
        };

        match npc.goal {
            NpcGoal::Fighting => {
                let Some((target, enemy_pos, _)) = threat else {
                    continue;
                };
                if *pos == enemy_pos {
                    if let Ok((_, mut enemy, _)) = enemies.get_mut(target) {
                        enemy.health = (enemy.health - NPC_ATTACK_DAMAGE).max(0.0);
                        if enemy.health <= 0.0 {
                            info!("[Npc] {} has slain the {}", npc.name, enemy.name);
                        } else {
                            info!("[Npc] {} strikes the {}", npc.name, enemy.name);
                        }
                    }
                } else {
                    *pos = step_toward(&map, &mut rng, *pos, enemy_pos);
                }
            }
            NpcGoal::Depositing => {
                let Some(camp) = shelters.designated else {
                    continue;
                };
                if *pos == camp {
                    let goods = npc.inventory.total();
                    let Some(stores) = map
                        .get_mut(camp)
                        .and_then(|tile| tile.building_mut(BuildingKind::CollectiveShelter))
                        .and_then(|shelter| shelter.inventory.as_mut())
                    else {
                        warn!("[Npc] Designated shelter at {camp:?} has no stores");
                        continue;
                    };
                    // Survivor deposits ignore the shelter capacity.
                    npc.inventory.drain_into(stores);
                    info!("[Npc] {} stocks the camp shelter with {goods} goods", npc.name);
                } else {
                    *pos = step_toward(&map, &mut rng, *pos, camp);
                }
            }
            NpcGoal::GatheringMaterials | NpcGoal::Harvesting => {
                let wanted = npc.target_resource.clone();
                let Some(target) = nearest_harvest_tile(&map, *pos, wanted.as_deref()) else {
                    continue;
                };
                if *pos == target {
                    let Some(resource) = map.get(target).and_then(|t| t.resource.clone()) else {
                        continue;
                    };
                    let drawn = map.draw_harvest(target, 1);
                    if drawn > 0 {
                        npc.inventory.add(&resource.item, drawn);
                    }
                } else {
                    *pos = step_toward(&map, &mut rng, *pos, target);
                }
            }
        }
    }
}

// ═══════════════════════════════════════════════════════════════════════
// GOAL HELPERS
// ═══════════════════════════════════════════════════════════════════════

/// Which stockpile material the designated shelter is short of, wood before
/// stone when both run low.
fn camp_shortfall(shelters: &ShelterRegistry, map: &WorldMap) -> Option<ItemId> {
    let camp = shelters.designated?;
    let stores = map
        .get(camp)?
        .building(BuildingKind::CollectiveShelter)?
        .inventory
        .as_ref()?;
    ["wood", "stone"]
        .into_iter()
        .find(|material| stores.count(material) < SHELTER_MATERIAL_TARGET)
        .map(str::to_string)
}

/// Nearest accessible tile with harvest left, by walking distance; scan
/// order breaks ties. `wanted` narrows the search to one resource.
fn nearest_harvest_tile(map: &WorldMap, from: GridPos, wanted: Option<&str>) -> Option<GridPos> {
    let mut best: Option<(GridPos, u32)> = None;
    for pos in map.positions() {
        let Some(tile) = map.get(pos) else {
            continue;
        };
        if !tile.terrain.is_accessible() || tile.harvests_left == Some(0) {
            continue;
        }
        let Some(resource) = tile.resource.as_ref() else {
            continue;
        };
        if wanted.is_some_and(|w| w != resource.item) {
            continue;
        }
        let dist = from.manhattan(pos);
        if !best.is_some_and(|(_, d)| d <= dist) {
            best = Some((pos, dist));
        }
    }
    best.map(|(pos, _)| pos)
}

/// One greedy step along a single axis toward `to`; a random axis when both
/// are still apart. An inaccessible step means standing still this round.
fn step_toward(map: &WorldMap, rng: &mut impl Rng, from: GridPos, to: GridPos) -> GridPos {
    let dx = (to.x - from.x).signum();
    let dy = (to.y - from.y).signum();
    let step = match (dx, dy) {
        (0, 0) => return from,
        (_, 0) => from.offset(dx, 0),
        (0, _) => from.offset(0, dy),
        _ => {
            if rng.gen_bool(0.5) {
                from.offset(dx, 0)
            } else {
                from.offset(0, dy)
            }
        }
    };
    if map.is_accessible(step) {
        step
    } else {
        from
    }
}
