//! Eating and drinking, with everything that can follow: raw food turning
//! the stomach, strange mushrooms clouding the head, herbs clearing it.

use rand::Rng;

use crate::economy::Inventory;
use crate::shared::*;

/// Thirst restored by one unit of carried water.
pub const WATER_THIRST_RESTORE: f32 = 15.0;

fn gain_or_loss(delta: f32) -> FloatKind {
    if delta >= 0.0 {
        FloatKind::Gain
    } else {
        FloatKind::Loss
    }
}

pub fn eat(
    item: &str,
    player: &mut PlayerState,
    inventory: &mut Inventory,
    items: &ItemRegistry,
    config: &SimConfig,
) -> ActionOutcome {
    let name = items.display_name(item);
    let Some(def) = items.get(item) else {
        return ActionOutcome::failure(format!("You don't recognize the {name}."));
    };
    let Some(edible) = def.edible.clone() else {
        return ActionOutcome::failure(format!("You can't eat the {name}."));
    };
    if !inventory.has(item, 1) {
        return ActionOutcome::failure(format!("You have no {name} left."));
    }
    inventory.apply_deduction(&[(item, 1)]);

    let anchor = player.pos.anchor(config.tile_size);
    let mut outcome = ActionOutcome::success(format!("You eat the {name}."));
    if edible.hunger != 0.0 {
        player.change_hunger(edible.hunger);
        outcome = outcome.with_float(
            format!("{:+.0} hunger", edible.hunger),
            gain_or_loss(edible.hunger),
            anchor,
        );
    }
    if edible.thirst != 0.0 {
        player.change_thirst(edible.thirst);
        outcome = outcome.with_float(
            format!("{:+.0} thirst", edible.thirst),
            gain_or_loss(edible.thirst),
            anchor,
        );
    }
    if edible.health != 0.0 {
        player.change_health(edible.health);
        outcome = outcome.with_float(
            format!("{:+.0} health", edible.health),
            gain_or_loss(edible.health),
            anchor,
        );
    }

    if let Some(cured) = edible.cures {
        if player.afflictions.remove(&cured) {
            outcome
                .message
                .push_str(&format!(" You no longer feel {}.", cured.label()));
        }
    }
    if let Some(inflicted) = edible.inflicts {
        if player.afflictions.insert(inflicted) {
            outcome
                .message
                .push_str(&format!(" You start to feel {}.", inflicted.label()));
        }
    }
    if edible.sick_chance > 0.0
        && rand::thread_rng().gen::<f64>() < edible.sick_chance
        && player.afflictions.insert(Affliction::Sick)
    {
        outcome.message.push_str(" Your stomach turns.");
    }
    outcome
}

pub fn drink_water(
    player: &mut PlayerState,
    inventory: &mut Inventory,
    config: &SimConfig,
) -> ActionOutcome {
    if !inventory.has("water", 1) {
        return ActionOutcome::failure("You have no water left.");
    }
    inventory.apply_deduction(&[("water", 1)]);

    let before = player.thirst;
    player.change_thirst(WATER_THIRST_RESTORE);
    let gained = player.thirst - before;
    ActionOutcome::success("You drink deep.").with_float(
        format!("+{gained:.0} thirst"),
        FloatKind::Gain,
        player.pos.anchor(config.tile_size),
    )
}
