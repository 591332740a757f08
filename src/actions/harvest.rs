//! Gathering: wood, water, stone, and food, each keyed to its terrain.
//!
//! Pool-backed harvests (forest wood, beach water, plains berries, deposit
//! stone) draw through `WorldMap::draw_harvest` so quota and exhaustion
//! transforms stay in one place. Beach fishing and forest undergrowth
//! foraging are bottomless and never touch a pool.

use bevy::prelude::*;

use crate::economy::Inventory;
use crate::shared::*;
use crate::world::WorldMap;

/// Fish landed per catch with a spear in hand.
const FISH_PER_CATCH: u32 = 2;
/// Berries scrounged per pass through the forest undergrowth.
const UNDERGROWTH_FORAGE: u32 = 1;

struct YieldPlan {
    item: &'static str,
    per_action: u32,
    pooled: bool,
}

/// What one harvest of `kind` on `terrain` can produce. `None` when the
/// terrain does not support it; that can arise mid-action when a survivor
/// exhausts the same tile first.
fn yield_plan(kind: HarvestKind, terrain: TerrainKind) -> Option<YieldPlan> {
    let from_pool = || {
        terrain.def().harvest.as_ref().map(|h| YieldPlan {
            item: h.item,
            per_action: h.per_action,
            pooled: true,
        })
    };
    match (kind, terrain) {
        (HarvestKind::Wood, TerrainKind::Forest) => from_pool(),
        (HarvestKind::Water, TerrainKind::Beach) => from_pool(),
        (HarvestKind::Stone, TerrainKind::StoneDeposit) => from_pool(),
        (HarvestKind::Food, TerrainKind::Plains) => from_pool(),
        (HarvestKind::Food, TerrainKind::Beach) => Some(YieldPlan {
            item: "raw_fish",
            per_action: FISH_PER_CATCH,
            pooled: false,
        }),
        (HarvestKind::Food, TerrainKind::Forest) => Some(YieldPlan {
            item: "berries",
            per_action: UNDERGROWTH_FORAGE,
            pooled: false,
        }),
        _ => None,
    }
}

/// Which tool unlocks the full draw. Bare hands still work, at
/// `BARE_HANDS_YIELD`.
fn required_tool(kind: HarvestKind, terrain: TerrainKind) -> Option<ToolKind> {
    if kind == HarvestKind::Food {
        return (terrain == TerrainKind::Beach).then_some(ToolKind::Spear);
    }
    terrain.def().harvest.as_ref().and_then(|h| h.tool)
}

/// The `ToolKind` of whatever sits in the tool slot, if it has one.
fn equipped_tool(player: &PlayerState, items: &ItemRegistry) -> Option<ToolKind> {
    let instance = player.equipment.equipped(EquipSlot::Tool)?;
    items.get(&instance.item).and_then(|def| def.tool)
}

/// One point of wear on the equipped tool. Returns the display name if it
/// broke and left the slot.
fn wear_tool(player: &mut PlayerState, items: &ItemRegistry) -> Option<String> {
    let instance = player.equipment.equipped_mut(EquipSlot::Tool)?;
    if !instance.state.wear() {
        return None;
    }
    let name = items.display_name(&instance.item);
    player.equipment.set(EquipSlot::Tool, None);
    Some(name)
}

pub fn check_harvest(
    kind: HarvestKind,
    pos: GridPos,
    map: &WorldMap,
    inventory: &Inventory,
    config: &SimConfig,
) -> Result<String, String> {
    let terrain = map.terrain(pos);
    let Some(plan) = yield_plan(kind, terrain) else {
        return Err(match kind {
            HarvestKind::Wood => "There are no trees to fell here.".into(),
            HarvestKind::Water => "There is no water to draw here.".into(),
            HarvestKind::Stone => "There is no stone worth working here.".into(),
            HarvestKind::Food => "Nothing edible grows here.".into(),
        });
    };
    if plan.pooled && map.get(pos).is_some_and(|t| t.harvests_left == Some(0)) {
        return Err("This spot is picked clean.".into());
    }
    if inventory.total() >= config.player_capacity {
        return Err("Your pack is full.".into());
    }
    Ok(match (kind, terrain) {
        (HarvestKind::Wood, _) => "You set to chopping.".into(),
        (HarvestKind::Water, _) => "You start collecting water.".into(),
        (HarvestKind::Stone, _) => "You start chipping at the rock.".into(),
        (HarvestKind::Food, TerrainKind::Beach) => "You wade out to fish.".into(),
        (HarvestKind::Food, _) => "You start foraging.".into(),
    })
}

#[allow(clippy::too_many_arguments)]
pub fn finish_harvest(
    kind: HarvestKind,
    pos: GridPos,
    player: &mut PlayerState,
    inventory: &mut Inventory,
    map: &mut WorldMap,
    items: &ItemRegistry,
    event: &ActiveEvent,
    config: &SimConfig,
) -> ActionOutcome {
    let terrain = map.terrain(pos);
    let anchor = pos.anchor(config.tile_size);

    let Some(plan) = yield_plan(kind, terrain) else {
        warn!(
            "[Actions] Harvest payoff on a {} tile that no longer supports it",
            terrain.def().name
        );
        return ActionOutcome::failure("There is nothing left to gather here.");
    };

    // Tool gate: the full draw with the right tool, a token amount without.
    let required = required_tool(kind, terrain);
    let tool_in_hand = required.is_some_and(|needed| equipped_tool(player, items) == Some(needed));
    let want = if required.is_none() || tool_in_hand {
        plan.per_action
    } else {
        BARE_HANDS_YIELD.min(plan.per_action)
    };

    // A storm cancels the payoff outright and leaves the pool untouched.
    let multiplier = event.yield_multiplier(plan.item);
    if multiplier == 0 {
        return ActionOutcome::success("The storm drives you back empty-handed.");
    }

    let drawn = if plan.pooled {
        map.draw_harvest(pos, want)
    } else {
        want
    };
    if drawn == 0 {
        return ActionOutcome::failure("This spot is picked clean.");
    }

    let gross = drawn * multiplier;
    let room = config.player_capacity.saturating_sub(inventory.total());
    let credited = gross.min(room);
    if credited > 0 {
        inventory.add(plan.item, credited);
    }

    let name = items.display_name(plan.item);
    let mut outcome = if credited == 0 {
        ActionOutcome::failure(format!("Your pack has no room for the {name}."))
    } else if credited < gross {
        ActionOutcome::success(format!("You take {credited} {name}; the rest won't fit."))
    } else if plan.pooled && drawn < want {
        ActionOutcome::success(format!("You take the last {credited} {name}."))
    } else if multiplier > 1 {
        ActionOutcome::success(format!("A bumper haul: {credited} {name}!"))
    } else {
        ActionOutcome::success(format!("You gather {credited} {name}."))
    };
    if credited > 0 {
        outcome = outcome.with_float(format!("+{credited} {name}"), FloatKind::Gain, anchor);
    }

    if tool_in_hand {
        if let Some(broken) = wear_tool(player, items) {
            outcome.message.push_str(&format!(" Your {broken} gives out."));
            outcome = outcome.with_float(format!("{broken} broke"), FloatKind::Info, anchor);
        }
    }
    outcome
}

#[cfg(test)]
mod tests {
    use super::*;

    fn forest_map(pos: GridPos) -> WorldMap {
        let mut map = WorldMap::new(4, 4);
        map.update_tile_kind(pos, TerrainKind::Forest);
        map
    }

    fn registry_with_axe() -> ItemRegistry {
        let mut registry = ItemRegistry::default();
        let mut axe = ItemDef::new("axe", "Axe", ItemCategory::Tool);
        axe.equip_slot = Some(EquipSlot::Tool);
        axe.tool = Some(ToolKind::Axe);
        axe.consumable = ConsumableState::Durability(2);
        registry.register(axe.clone());
        registry
    }

    fn player_with_axe(items: &ItemRegistry) -> PlayerState {
        let mut player = PlayerState::default();
        let def = items.get("axe").unwrap();
        player.equipment.set(EquipSlot::Tool, Some(ItemInstance::from_def(def)));
        player
    }

    #[test]
    fn food_yield_follows_terrain() {
        assert_eq!(
            yield_plan(HarvestKind::Food, TerrainKind::Beach).map(|p| p.item),
            Some("raw_fish")
        );
        assert_eq!(
            yield_plan(HarvestKind::Food, TerrainKind::Plains).map(|p| (p.item, p.pooled)),
            Some(("berries", true))
        );
        assert_eq!(
            yield_plan(HarvestKind::Food, TerrainKind::Forest).map(|p| (p.item, p.pooled)),
            Some(("berries", false))
        );
        assert!(yield_plan(HarvestKind::Wood, TerrainKind::Plains).is_none());
    }

    #[test]
    fn tool_gate_reduces_bare_handed_draw() {
        let pos = GridPos::new(1, 1);
        let items = registry_with_axe();
        let config = SimConfig::default();
        let event = ActiveEvent::default();

        let mut map = forest_map(pos);
        let mut bare = PlayerState::default();
        let mut inventory = Inventory::default();
        finish_harvest(
            HarvestKind::Wood, pos, &mut bare, &mut inventory, &mut map, &items, &event, &config,
        );
        assert_eq!(inventory.count("wood"), BARE_HANDS_YIELD);

        let mut map = forest_map(pos);
        let mut tooled = player_with_axe(&items);
        let mut inventory = Inventory::default();
        finish_harvest(
            HarvestKind::Wood, pos, &mut tooled, &mut inventory, &mut map, &items, &event, &config,
        );
        assert_eq!(inventory.count("wood"), 3);
    }

    #[test]
    fn tool_breaks_and_leaves_the_slot() {
        let pos = GridPos::new(1, 1);
        let items = registry_with_axe();
        let config = SimConfig::default();
        let event = ActiveEvent::default();
        let mut map = forest_map(pos);
        let mut player = player_with_axe(&items);
        let mut inventory = Inventory::default();

        // Durability 2: survives the first swing, breaks on the second.
        finish_harvest(
            HarvestKind::Wood, pos, &mut player, &mut inventory, &mut map, &items, &event, &config,
        );
        assert!(player.equipment.equipped(EquipSlot::Tool).is_some());

        let outcome = finish_harvest(
            HarvestKind::Wood, pos, &mut player, &mut inventory, &mut map, &items, &event, &config,
        );
        assert!(player.equipment.equipped(EquipSlot::Tool).is_none());
        assert!(outcome.message.contains("gives out"));
    }

    #[test]
    fn storm_cancels_payoff_and_preserves_pool() {
        let pos = GridPos::new(1, 1);
        let items = registry_with_axe();
        let config = SimConfig::default();
        let storm = ActiveEvent { kind: WorldEventKind::Storm, days_left: 1 };
        let mut map = forest_map(pos);
        let mut player = player_with_axe(&items);
        let mut inventory = Inventory::default();

        let outcome = finish_harvest(
            HarvestKind::Wood, pos, &mut player, &mut inventory, &mut map, &items, &storm, &config,
        );
        assert!(inventory.is_empty());
        assert!(outcome.floating_texts.is_empty());
        assert_eq!(map.get(pos).unwrap().harvests_left, Some(15));
    }

    #[test]
    fn abundance_doubles_the_credited_yield() {
        let pos = GridPos::new(1, 1);
        let items = registry_with_axe();
        let config = SimConfig::default();
        let boom = ActiveEvent {
            kind: WorldEventKind::Abundance { resource: "wood".to_string() },
            days_left: 2,
        };
        let mut map = forest_map(pos);
        let mut player = player_with_axe(&items);
        let mut inventory = Inventory::default();

        finish_harvest(
            HarvestKind::Wood, pos, &mut player, &mut inventory, &mut map, &items, &boom, &config,
        );
        // Double the tooled draw of 3, while the pool only gave up 3.
        assert_eq!(inventory.count("wood"), 6);
        assert_eq!(map.get(pos).unwrap().harvests_left, Some(12));
    }

    #[test]
    fn full_pack_takes_a_partial_haul() {
        let pos = GridPos::new(1, 1);
        let items = registry_with_axe();
        let config = SimConfig { player_capacity: 5, ..SimConfig::default() };
        let event = ActiveEvent::default();
        let mut map = forest_map(pos);
        let mut player = player_with_axe(&items);
        let mut inventory = Inventory::default();
        inventory.add("stone", 4);

        let outcome = finish_harvest(
            HarvestKind::Wood, pos, &mut player, &mut inventory, &mut map, &items, &event, &config,
        );
        assert!(outcome.success);
        assert_eq!(inventory.count("wood"), 1);
        assert!(outcome.message.contains("won't fit"));
    }

    #[test]
    fn depleted_pool_refuses_at_request_time() {
        let pos = GridPos::new(1, 1);
        let mut map = WorldMap::new(4, 4);
        map.update_tile_kind(pos, TerrainKind::Beach);
        if let Some(tile) = map.get_mut(pos) {
            tile.harvests_left = Some(0);
        }

        let refusal = check_harvest(
            HarvestKind::Water,
            pos,
            &map,
            &Inventory::default(),
            &SimConfig::default(),
        );
        assert_eq!(refusal, Err("This spot is picked clean.".to_string()));
    }
}
