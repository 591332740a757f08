//! Digging: beach sand hides the odd buried thing, and the treasure mound
//! hides the chest the rusty key opens.

use bevy::prelude::*;

use crate::economy::Inventory;
use crate::shared::*;
use crate::world::WorldMap;

/// What the treasure chest holds. Added without a capacity check; the find
/// of the run does not get left behind for want of pack space.
pub const TREASURE_LOOT: &[(&str, u32)] =
    &[("old_coin", 10), ("flint_knife", 1), ("hide_armor", 1)];

pub fn check_dig(pos: GridPos, map: &WorldMap) -> Result<String, String> {
    let Some(tile) = map.get(pos) else {
        return Err("The ground here is too hard to dig.".to_string());
    };
    if tile.terrain == TerrainKind::Treasure {
        if tile.is_opened {
            return Err("Only an empty hole remains.".to_string());
        }
        return Ok("You dig at the strange mound.".to_string());
    }
    match tile.digs_left {
        None => Err("The ground here is too hard to dig.".to_string()),
        Some(0) => Err("This spot is dug out.".to_string()),
        Some(_) => Ok("You start digging.".to_string()),
    }
}

pub fn finish_dig(
    pos: GridPos,
    inventory: &mut Inventory,
    map: &mut WorldMap,
    items: &ItemRegistry,
    config: &SimConfig,
) -> ActionOutcome {
    let anchor = pos.anchor(config.tile_size);
    let Some(tile) = map.get_mut(pos) else {
        warn!("[Actions] Dig payoff at out-of-bounds {pos:?}");
        return ActionOutcome::failure("There is nothing to dig here.");
    };

    if tile.terrain == TerrainKind::Treasure {
        if tile.is_opened {
            return ActionOutcome::success("Only an empty hole remains.");
        }
        if !inventory.has(TREASURE_KEY_ITEM, 1) {
            return ActionOutcome::success("A heavy chest! It's locked tight.");
        }
        inventory.apply_deduction(&[(TREASURE_KEY_ITEM, 1)]);
        tile.is_opened = true;
        let mut outcome = ActionOutcome::success("The rusty key turns. The chest creaks open!");
        for &(item, amount) in TREASURE_LOOT {
            inventory.add(item, amount);
            outcome = outcome.with_float(
                format!("+{amount} {}", items.display_name(item)),
                FloatKind::Gain,
                anchor,
            );
        }
        return outcome;
    }

    match tile.digs_left {
        Some(left) if left > 0 => {
            tile.digs_left = Some(left - 1);
            if let Some(found) = tile.hidden_item.take() {
                let name = items.display_name(&found);
                inventory.add(&found, 1);
                ActionOutcome::success(format!("Your digging turns up a {name}!")).with_float(
                    format!("+1 {name}"),
                    FloatKind::Gain,
                    anchor,
                )
            } else {
                ActionOutcome::success("Nothing but sand.")
            }
        }
        _ => ActionOutcome::failure("This spot is dug out."),
    }
}
