//! Gear handling: readying tools and weapons, putting them away, and
//! scooping up whatever lies on the ground.
//!
//! Worn gear keeps its wear while stowed. Re-equipping an item recalls the
//! stowed instance instead of minting a fresh one, so durability survives
//! the round trip through the pack.

use crate::economy::Inventory;
use crate::shared::*;
use crate::world::WorldMap;

pub fn equip(
    item: &str,
    player: &mut PlayerState,
    inventory: &mut Inventory,
    items: &ItemRegistry,
) -> ActionOutcome {
    let name = items.display_name(item);
    let Some(def) = items.get(item) else {
        return ActionOutcome::failure(format!("You don't recognize the {name}."));
    };
    let Some(slot) = def.equip_slot else {
        return ActionOutcome::failure(format!("You can't equip the {name}."));
    };
    if !inventory.has(item, 1) {
        return ActionOutcome::failure(format!("You have no {name} to equip."));
    }
    inventory.apply_deduction(&[(item, 1)]);

    let instance = player
        .equipment
        .recall_stowed(item)
        .unwrap_or_else(|| ItemInstance::from_def(def));
    if let Some(displaced) = player.equipment.set(slot, Some(instance)) {
        inventory.add(&displaced.item, 1);
        player.equipment.stow(displaced);
    }
    ActionOutcome::success(format!("You ready the {name}."))
}

pub fn unequip(
    slot: EquipSlot,
    player: &mut PlayerState,
    inventory: &mut Inventory,
    items: &ItemRegistry,
) -> ActionOutcome {
    let Some(instance) = player.equipment.set(slot, None) else {
        return ActionOutcome::failure("Nothing is equipped there.");
    };
    let name = items.display_name(&instance.item);
    inventory.add(&instance.item, 1);
    player.equipment.stow(instance);
    ActionOutcome::success(format!("You put away the {name}."))
}

pub fn pick_up(
    player: &mut PlayerState,
    inventory: &mut Inventory,
    map: &mut WorldMap,
    items: &ItemRegistry,
    config: &SimConfig,
) -> ActionOutcome {
    let pos = player.pos;
    let Some(tile) = map.get_mut(pos) else {
        return ActionOutcome::failure("There is nothing here to pick up.");
    };
    if tile.ground_items.is_empty() {
        return ActionOutcome::failure("There is nothing here to pick up.");
    }

    let anchor = pos.anchor(config.tile_size);
    let mut outcome = ActionOutcome::success("You gather what's lying about.");
    let mut left_behind = false;
    let mut ids: Vec<String> = tile.ground_items.items.keys().cloned().collect();
    ids.sort();
    for id in ids {
        let have = tile.ground_items.count(&id);
        let room = config.player_capacity.saturating_sub(inventory.total());
        let take = have.min(room);
        if take == 0 {
            left_behind = true;
            continue;
        }
        tile.ground_items.apply_deduction(&[(id.as_str(), take)]);
        inventory.add(&id, take);
        outcome = outcome.with_float(
            format!("+{take} {}", items.display_name(&id)),
            FloatKind::Gain,
            anchor,
        );
        if take < have {
            left_behind = true;
        }
    }
    if left_behind {
        outcome.message.push_str(" Your pack can't hold all of it.");
    }
    outcome
}
