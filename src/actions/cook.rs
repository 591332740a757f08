//! Cooking raw food over a campfire. The raw item is charged when the
//! cook starts; the payoff adds the cooked form and wears the fire down.

use bevy::prelude::*;

use crate::economy::Inventory;
use crate::shared::*;
use crate::world::WorldMap;

/// Durability the campfire loses per finished cook.
const CAMPFIRE_WEAR_PER_COOK: u32 = 1;

pub fn check_cook(
    item: &str,
    pos: GridPos,
    map: &WorldMap,
    inventory: &Inventory,
    items: &ItemRegistry,
) -> Result<String, String> {
    if !map
        .get(pos)
        .is_some_and(|tile| tile.has_building(BuildingKind::Campfire))
    {
        return Err("You need a campfire for that.".to_string());
    }
    let name = items.display_name(item);
    if !items.get(item).is_some_and(|def| def.cooks_into.is_some()) {
        return Err(format!("You can't cook {name}."));
    }
    if !inventory.has(item, 1) {
        return Err(format!("You have no {name} to cook."));
    }
    Ok(format!("You set the {name} over the fire."))
}

pub fn finish_cook(
    item: &str,
    pos: GridPos,
    inventory: &mut Inventory,
    map: &mut WorldMap,
    items: &ItemRegistry,
    config: &SimConfig,
) -> ActionOutcome {
    let Some(cooked) = items.get(item).and_then(|def| def.cooks_into.clone()) else {
        warn!("[Actions] Cook payoff for '{item}', which has no cooked form");
        return ActionOutcome::failure("The food burned away to nothing.");
    };
    inventory.add(&cooked, 1);

    let raw_name = items.display_name(item);
    let cooked_name = items.display_name(&cooked);
    let anchor = pos.anchor(config.tile_size);
    let mut outcome =
        ActionOutcome::success(format!("You cook the {raw_name} into {cooked_name}."))
            .with_float(format!("+1 {cooked_name}"), FloatKind::Gain, anchor);

    // The fire pays for every meal.
    let campfire_index = map
        .get(pos)
        .and_then(|tile| tile.buildings.iter().position(|b| b.kind == BuildingKind::Campfire));
    if let Some(index) = campfire_index {
        if map.damage_building(pos, index, CAMPFIRE_WEAR_PER_COOK).is_some() {
            outcome.message.push_str(" The campfire crumbles to embers.");
        }
    }
    outcome
}
