//! Construction and demolition.
//!
//! The lean-to is a terrain transform; the camp shelter and campfire are
//! building instances on the tile. Material bills are charged when the
//! work starts, not when it lands.

use bevy::prelude::*;

use crate::economy::Inventory;
use crate::shared::*;
use crate::world::{ShelterRegistry, WorldMap};

/// Tearing down takes this fraction of the original build time.
pub const DISMANTLE_TIME_FRACTION: f32 = 0.5;

pub fn check_build(
    kind: BuildingKind,
    pos: GridPos,
    map: &WorldMap,
    inventory: &Inventory,
) -> Result<String, String> {
    let def = kind.def();
    let Some(tile) = map.get(pos) else {
        return Err(format!("You can't raise a {} here.", def.name));
    };
    if !def.allowed_on.contains(&tile.terrain) {
        return Err(format!("You can't raise a {} here.", def.name));
    }
    if def.transforms_to.is_some() && !tile.buildings.is_empty() {
        return Err("This spot is already cluttered.".to_string());
    }
    if def.transforms_to.is_none() {
        if tile.has_building(kind) {
            return Err(format!("A {} already stands here.", def.name));
        }
        if tile.buildings.len() >= tile.terrain.def().building_capacity {
            return Err("There is no room left on this tile.".to_string());
        }
    }
    if let Some(missing) = inventory.has_resources(def.cost).missing {
        return Err(format!("You are short of {missing}."));
    }
    Ok(format!("You start building a {}.", def.name))
}

pub fn finish_build(
    kind: BuildingKind,
    pos: GridPos,
    map: &mut WorldMap,
    shelters: &mut ShelterRegistry,
) -> ActionOutcome {
    let def = kind.def();
    if let Some(target) = def.transforms_to {
        map.update_tile_kind(pos, target);
        return ActionOutcome::success(format!("Your {} is ready.", def.name));
    }
    if !map.add_building(pos, kind) {
        // Validated at start; the tile changed while the work ran.
        return ActionOutcome::failure(format!(
            "The half-built {} has nowhere left to stand.",
            def.name
        ));
    }
    if kind == BuildingKind::CollectiveShelter {
        shelters.on_shelter_built(pos);
    }
    ActionOutcome::success(format!("The {} stands.", def.name))
}

// ─── Replanting ─────────────────────────────────────────────────────────

pub fn check_replant(
    pos: GridPos,
    map: &WorldMap,
    inventory: &Inventory,
) -> Result<(String, (&'static str, u32)), String> {
    let terrain = map.terrain(pos);
    let Some(bill) = terrain.def().regrow_cost else {
        return Err("Nothing can be replanted here.".to_string());
    };
    if !inventory.has_resources(&[bill]).success {
        return Err(format!("You need a {} to replant.", bill.0));
    }
    Ok(("You start planting.".to_string(), bill))
}

pub fn finish_replant(pos: GridPos, map: &mut WorldMap) -> ActionOutcome {
    if map.terrain(pos) != TerrainKind::ForestCleared {
        warn!("[Actions] Replant payoff on a non-clearing tile at {pos:?}");
        return ActionOutcome::failure("The ground here won't take a sapling.");
    }
    map.update_tile_kind(pos, TerrainKind::Forest);
    ActionOutcome::success("Green returns to the grove.")
}

// ─── Dismantling ────────────────────────────────────────────────────────

/// The newest building on the tile is the one that comes down.
pub fn check_dismantle(pos: GridPos, map: &WorldMap) -> Result<(String, BuildingKind), String> {
    let target = map
        .get(pos)
        .and_then(|tile| tile.buildings.last())
        .ok_or_else(|| "There is nothing to tear down here.".to_string())?;
    Ok((
        format!("You start tearing down the {}.", target.kind.def().name),
        target.kind,
    ))
}

pub fn finish_dismantle(
    pos: GridPos,
    map: &mut WorldMap,
    shelters: &mut ShelterRegistry,
) -> ActionOutcome {
    let Some(index) = map
        .get(pos)
        .map(|tile| tile.buildings.len())
        .filter(|&count| count > 0)
        .map(|count| count - 1)
    else {
        warn!("[Actions] Dismantle payoff with no building left at {pos:?}");
        return ActionOutcome::failure("There is nothing left to tear down.");
    };
    let Some(kind) = map.remove_building(pos, index) else {
        return ActionOutcome::failure("There is nothing left to tear down.");
    };
    if kind == BuildingKind::CollectiveShelter {
        shelters.on_shelter_lost(pos, map);
    }

    let def = kind.def();
    let mut outcome = ActionOutcome::success(format!("You tear down the {}.", def.name));
    if def.has_inventory && map.get(pos).is_some_and(|t| !t.ground_items.is_empty()) {
        outcome.message.push_str(" Its stores lie scattered on the ground.");
    }
    outcome
}
