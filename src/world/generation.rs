//! Procedural island generation.
//!
//! The island is carved out of open water in passes: coastline, a
//! connectivity fix, beaches, inland cover, then the special placements
//! (treasure mound, buried key, stone deposits). Random placement is
//! bounded; when the dice keep missing, the first qualifying tile in scan
//! order is taken so generation never fails.

use bevy::prelude::*;
use rand::seq::SliceRandom;
use rand::Rng;
use std::collections::VecDeque;

use crate::shared::*;
use crate::world::{ShelterRegistry, WorldMap};

/// Chance for each second-ring tile to be water, roughening the coast.
const RING2_WATER_CHANCE: f64 = 0.35;
/// Inland split between forest and plains.
const FOREST_CHANCE: f64 = 0.55;
const STONE_DEPOSIT_COUNT: usize = 5;

pub fn generate_world(
    config: Res<SimConfig>,
    mut map: ResMut<WorldMap>,
    mut shelters: ResMut<ShelterRegistry>,
) {
    *map = generate_island(config.map_width, config.map_height);
    *shelters = ShelterRegistry::default();
    info!(
        "[World] Generated a {}x{} island, spawn at {:?}",
        map.width, map.height, map.spawn
    );
}

/// Build a complete island. Pure so tests can generate directly.
pub fn generate_island(width: usize, height: usize) -> WorldMap {
    let mut rng = rand::thread_rng();
    let mut map = WorldMap::new(width, height);

    carve_landmass(&mut map, &mut rng);
    remove_unreachable_land(&mut map);
    lay_coastline_and_cover(&mut map, &mut rng);
    map.spawn = pick_spawn(&map);
    place_treasure(&mut map, &mut rng);
    place_stone_deposits(&mut map, &mut rng);
    bury_key(&mut map, &mut rng);
    assign_background_keys(&mut map, &mut rng);

    map
}

// ─── Passes ─────────────────────────────────────────────────────────────

/// Outer ring stays water; the second ring is water by coin flip; the
/// interior is provisional land.
fn carve_landmass(map: &mut WorldMap, rng: &mut impl Rng) {
    let positions: Vec<GridPos> = map.positions().collect();
    for pos in positions {
        let edge_distance = (pos.x)
            .min(pos.y)
            .min(map.width as i32 - 1 - pos.x)
            .min(map.height as i32 - 1 - pos.y);
        let is_land = match edge_distance {
            0 => false,
            1 => rng.gen::<f64>() >= RING2_WATER_CHANCE,
            _ => true,
        };
        if is_land {
            map.update_tile_kind(pos, TerrainKind::Plains);
        }
    }
}

/// Flood-fill the landmass from its most central tile; land the fill never
/// reaches is cut off by water and sinks. This is what guarantees every
/// accessible tile can be walked to from the spawn.
fn remove_unreachable_land(map: &mut WorldMap) {
    let center = GridPos::new(map.width as i32 / 2, map.height as i32 / 2);
    let Some(source) = map
        .positions()
        .filter(|&p| map.terrain(p) != TerrainKind::DeepWater)
        .min_by_key(|&p| p.manhattan(center))
    else {
        warn!("[World] Generation produced no land at all");
        return;
    };

    let mut reached = vec![false; map.width * map.height];
    let mut queue = VecDeque::from([source]);
    reached[source.y as usize * map.width + source.x as usize] = true;
    while let Some(pos) = queue.pop_front() {
        for next in WorldMap::neighbors4(pos) {
            if !map.in_bounds(next) || map.terrain(next) == TerrainKind::DeepWater {
                continue;
            }
            let idx = next.y as usize * map.width + next.x as usize;
            if !reached[idx] {
                reached[idx] = true;
                queue.push_back(next);
            }
        }
    }

    let stranded: Vec<GridPos> = map
        .positions()
        .filter(|&p| {
            map.terrain(p) != TerrainKind::DeepWater
                && !reached[p.y as usize * map.width + p.x as usize]
        })
        .collect();
    for pos in stranded {
        map.update_tile_kind(pos, TerrainKind::DeepWater);
    }
}

/// Land touching water becomes beach; the rest splits into forest and
/// plains.
fn lay_coastline_and_cover(map: &mut WorldMap, rng: &mut impl Rng) {
    let land: Vec<GridPos> = map
        .positions()
        .filter(|&p| map.terrain(p) != TerrainKind::DeepWater)
        .collect();
    for pos in land {
        let coastal = WorldMap::neighbors4(pos)
            .iter()
            .any(|&n| map.terrain(n) == TerrainKind::DeepWater);
        let terrain = if coastal {
            TerrainKind::Beach
        } else if rng.gen::<f64>() < FOREST_CHANCE {
            TerrainKind::Forest
        } else {
            TerrainKind::Plains
        };
        map.update_tile_kind(pos, terrain);
    }
}

fn pick_spawn(map: &WorldMap) -> GridPos {
    let center = GridPos::new(map.width as i32 / 2, map.height as i32 / 2);
    match map
        .positions()
        .filter(|&p| map.is_accessible(p))
        .min_by_key(|&p| p.manhattan(center))
    {
        Some(pos) => pos,
        None => {
            warn!("[World] No accessible spawn tile; defaulting to the center");
            center
        }
    }
}

/// Exactly one treasure mound, somewhere inland.
fn place_treasure(map: &mut WorldMap, rng: &mut impl Rng) {
    let inland = |map: &WorldMap, pos: GridPos| {
        matches!(
            map.terrain(pos),
            TerrainKind::Forest | TerrainKind::Plains
        ) && pos != map.spawn
    };
    match place_randomly(map, rng, &inland) {
        Some(pos) => map.update_tile_kind(pos, TerrainKind::Treasure),
        None => warn!("[World] No inland tile for the treasure mound"),
    }
}

/// Up to a handful of stone deposits, never crowding one another.
fn place_stone_deposits(map: &mut WorldMap, rng: &mut impl Rng) {
    let mut candidates: Vec<GridPos> = map
        .positions()
        .filter(|&p| {
            matches!(map.terrain(p), TerrainKind::Forest | TerrainKind::Plains) && p != map.spawn
        })
        .collect();
    candidates.shuffle(rng);

    let mut placed: Vec<GridPos> = Vec::new();
    for pos in candidates {
        if placed.len() >= STONE_DEPOSIT_COUNT {
            break;
        }
        if placed.iter().any(|&p| p.chebyshev(pos) <= 1) {
            continue;
        }
        map.update_tile_kind(pos, TerrainKind::StoneDeposit);
        placed.push(pos);
    }
}

/// One key buried in the sand, if the island grew any beach to bury it in.
fn bury_key(map: &mut WorldMap, rng: &mut impl Rng) {
    let sandy = |map: &WorldMap, pos: GridPos| map.terrain(pos) == TerrainKind::Beach;
    match place_randomly(map, rng, &sandy) {
        Some(pos) => {
            if let Some(tile) = map.get_mut(pos) {
                tile.hidden_item = Some(TREASURE_KEY_ITEM.to_string());
            }
        }
        None => warn!("[World] No beach to bury the key under"),
    }
}

/// Pick visual variants that differ from the left and up neighbors of the
/// same terrain where the variant count allows it.
fn assign_background_keys(map: &mut WorldMap, rng: &mut impl Rng) {
    let positions: Vec<GridPos> = map.positions().collect();
    for pos in positions {
        let terrain = map.terrain(pos);
        let variants = terrain.def().background_variants;
        if variants <= 1 {
            continue;
        }
        let taken = |neighbor: GridPos| -> Option<u8> {
            let tile = map.get(neighbor)?;
            (tile.terrain == terrain).then_some(tile.background_key)
        };
        let left = taken(pos.offset(-1, 0));
        let up = taken(pos.offset(0, -1));

        let free: Vec<u8> = (0..variants)
            .filter(|k| Some(*k) != left && Some(*k) != up)
            .collect();
        let key = match free.as_slice() {
            [] => rng.gen_range(0..variants),
            options => options[rng.gen_range(0..options.len())],
        };
        if let Some(tile) = map.get_mut(pos) {
            tile.background_key = key;
        }
    }
}

/// Bounded rejection sampling with a deterministic fallback: after
/// `MAX_PLACEMENT_ATTEMPTS` misses, the first qualifying tile in scan
/// order is used. `None` only when no tile qualifies at all.
fn place_randomly(
    map: &WorldMap,
    rng: &mut impl Rng,
    accept: &dyn Fn(&WorldMap, GridPos) -> bool,
) -> Option<GridPos> {
    for _ in 0..MAX_PLACEMENT_ATTEMPTS {
        let pos = GridPos::new(
            rng.gen_range(0..map.width as i32),
            rng.gen_range(0..map.height as i32),
        );
        if accept(map, pos) {
            return Some(pos);
        }
    }
    map.positions().find(|&p| accept(map, p))
}
