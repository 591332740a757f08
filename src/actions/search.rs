//! Zone searches: one roll, three mutually exclusive outcomes.
//!
//! Each searchable terrain carries cumulative probability bands and a
//! weighted find table. A hostile roll conjures a search-encounter enemy
//! on the spot and opens combat; a missing encounter template degrades to
//! the quiet outcome instead of failing.

use bevy::prelude::*;
use rand::Rng;

use crate::combat::begin_combat;
use crate::economy::Inventory;
use crate::entities::{Enemy, EnemyRegistry};
use crate::shared::*;
use crate::world::WorldMap;

/// Cumulative bands for one roll in `[0, 1)`: `[0, encounter)` is a
/// hostile encounter, `[encounter, find)` an item find, the rest nothing.
struct SearchBands {
    encounter: f64,
    find: f64,
}

/// Weighted find table: (item, amount, weight).
type FindTable = &'static [(&'static str, u32, u32)];

static FOREST_BANDS: SearchBands = SearchBands { encounter: 0.20, find: 0.65 };
static PLAINS_BANDS: SearchBands = SearchBands { encounter: 0.12, find: 0.52 };
static BEACH_BANDS: SearchBands = SearchBands { encounter: 0.10, find: 0.60 };

static FOREST_FINDS: FindTable = &[
    ("sapling", 1, 3),
    ("berries", 2, 3),
    ("medicinal_herb", 1, 2),
    ("strange_mushroom", 1, 2),
];
static PLAINS_FINDS: FindTable = &[
    ("berries", 2, 4),
    ("sapling", 1, 2),
    ("stone", 1, 2),
    ("flint", 1, 1),
];
static BEACH_FINDS: FindTable = &[
    ("wood", 2, 3),
    ("raw_fish", 1, 2),
    ("flint", 1, 2),
    ("old_coin", 1, 1),
];

fn search_profile(terrain: TerrainKind) -> Option<(&'static SearchBands, FindTable)> {
    match terrain {
        TerrainKind::Forest => Some((&FOREST_BANDS, FOREST_FINDS)),
        TerrainKind::Plains => Some((&PLAINS_BANDS, PLAINS_FINDS)),
        TerrainKind::Beach => Some((&BEACH_BANDS, BEACH_FINDS)),
        _ => None,
    }
}

pub fn check_search(pos: GridPos, map: &WorldMap) -> Result<String, String> {
    match search_profile(map.terrain(pos)) {
        Some(_) => Ok("You comb the area.".to_string()),
        None => Err("There is nothing to find here.".to_string()),
    }
}

enum SearchResult {
    Encounter,
    Find { item: &'static str, amount: u32 },
    Nothing,
}

/// Resolve one roll against a profile. Split from the payoff so the band
/// arithmetic is testable without randomness.
fn resolve_roll(bands: &SearchBands, finds: FindTable, roll: f64, pick: u32) -> SearchResult {
    if roll < bands.encounter {
        return SearchResult::Encounter;
    }
    if roll < bands.find {
        let total: u32 = finds.iter().map(|&(_, _, weight)| weight).sum();
        let mut cursor = pick % total;
        for &(item, amount, weight) in finds {
            if cursor < weight {
                return SearchResult::Find { item, amount };
            }
            cursor -= weight;
        }
    }
    SearchResult::Nothing
}

#[allow(clippy::too_many_arguments)]
pub fn finish_search(
    pos: GridPos,
    commands: &mut Commands,
    player: &mut PlayerState,
    inventory: &mut Inventory,
    map: &WorldMap,
    items: &ItemRegistry,
    enemies: &EnemyRegistry,
    combat: &mut ActiveCombat,
    combat_log: &mut EventWriter<CombatEvent>,
    config: &SimConfig,
) -> ActionOutcome {
    let terrain = map.terrain(pos);
    let Some((bands, finds)) = search_profile(terrain) else {
        warn!("[Actions] Search payoff on a {} tile", terrain.def().name);
        return ActionOutcome::failure("There is nothing to find here.");
    };

    let mut rng = rand::thread_rng();
    let roll = rng.gen::<f64>();
    let total: u32 = finds.iter().map(|&(_, _, weight)| weight).sum();
    let pick = rng.gen_range(0..total);

    match resolve_roll(bands, finds, roll, pick) {
        SearchResult::Encounter => {
            let Some(template) = enemies.encounter_for(terrain) else {
                warn!(
                    "[Actions] No encounter template for {} terrain; the search turns up nothing",
                    terrain.def().name
                );
                return ActionOutcome::success("You find nothing of note.");
            };
            let entity = commands
                .spawn((Enemy::from_template(template, true), pos))
                .id();
            begin_combat(combat, player, entity, &template.name, combat_log);
            ActionOutcome::success(format!("A {} bursts from cover!", template.name))
        }
        SearchResult::Find { item, amount } => {
            let room = config.player_capacity.saturating_sub(inventory.total());
            let credited = amount.min(room);
            let name = items.display_name(item);
            if credited == 0 {
                return ActionOutcome::success(format!(
                    "You spot {name}, but your pack is full."
                ));
            }
            inventory.add(item, credited);
            ActionOutcome::success(format!("You find {credited} {name}.")).with_float(
                format!("+{credited} {name}"),
                FloatKind::Gain,
                pos.anchor(config.tile_size),
            )
        }
        SearchResult::Nothing => ActionOutcome::success("You find nothing of note."),
    }
}
