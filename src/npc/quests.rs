//! Survivor favors. Talking to a co-located survivor either turns in the
//! quest already underway or takes on the one being offered.

use bevy::prelude::*;

use crate::economy::Inventory;
use crate::entities::Npc;
use crate::shared::*;

pub fn handle_talk_requests(
    mut requests: EventReader<ActionRequest>,
    player: Res<PlayerState>,
    combat: Res<ActiveCombat>,
    config: Res<SimConfig>,
    items: Res<ItemRegistry>,
    mut inventory: ResMut<Inventory>,
    mut npcs: Query<(&mut Npc, &GridPos)>,
    mut outcomes: EventWriter<ActionOutcome>,
) {
    for request in requests.read() {
        if request.0 != ActionKind::Talk {
            continue;
        }
        if !player.can_act() || combat.engaged() {
            info!("[Npc] Talk request dropped while the player is occupied");
            continue;
        }
        let Some((mut npc, _)) = npcs.iter_mut().find(|(_, pos)| **pos == player.pos) else {
            outcomes.send(ActionOutcome::failure("There is no one here to talk to."));
            continue;
        };
        let anchor = player.pos.anchor(config.tile_size);
        outcomes.send(converse(&mut npc, &mut inventory, &items, anchor));
    }
}

/// One exchange. An active quest takes precedence: a finished favor is
/// turned in before any new one is offered.
fn converse(
    npc: &mut Npc,
    inventory: &mut Inventory,
    items: &ItemRegistry,
    anchor: Vec2,
) -> ActionOutcome {
    if let Some(quest) = npc.active_quest.clone() {
        let (wanted, need) = &quest.wanted;
        if !inventory.has(wanted, *need) {
            return ActionOutcome::success(format!(
                "{}: \"{}\" ({need} {} still needed)",
                npc.name,
                quest.description,
                items.display_name(wanted),
            ));
        }
        inventory.apply_deduction(&[(wanted.as_str(), *need)]);
        let (reward, bounty) = &quest.reward;
        inventory.add(reward, *bounty);
        npc.active_quest = None;
        return ActionOutcome::success(format!(
            "{} beams. \"Just what I needed!\" You receive {bounty} {}.",
            npc.name,
            items.display_name(reward),
        ))
        .with_float(
            format!("+{bounty} {}", items.display_name(reward)),
            FloatKind::Gain,
            anchor,
        );
    }

    if let Some(quest) = npc.available_quest.take() {
        let (wanted, need) = &quest.wanted;
        let message = format!(
            "{}: \"{}\" ({need} {} wanted)",
            npc.name,
            quest.description,
            items.display_name(wanted),
        );
        npc.active_quest = Some(quest);
        return ActionOutcome::success(message);
    }

    ActionOutcome::success(format!("{} has nothing to ask of you right now.", npc.name))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::entities::QuestDef;

    fn firewood_quest() -> QuestDef {
        QuestDef {
            description: "Bring me wood to reinforce my bedding".into(),
            wanted: ("wood".into(), 8),
            reward: ("grilled_fish".into(), 2),
        }
    }

    fn trade_goods() -> ItemRegistry {
        let mut registry = ItemRegistry::default();
        registry.register(ItemDef::new("wood", "wood", ItemCategory::Material));
        registry.register(ItemDef::new("grilled_fish", "grilled fish", ItemCategory::Food));
        registry
    }

    #[test]
    fn an_offered_quest_becomes_active() {
        let items = trade_goods();
        let mut npc = Npc::new("Maren");
        npc.available_quest = Some(firewood_quest());
        let mut inventory = Inventory::default();

        let outcome = converse(&mut npc, &mut inventory, &items, Vec2::ZERO);
        assert!(outcome.success);
        assert!(npc.available_quest.is_none());
        assert_eq!(npc.active_quest, Some(firewood_quest()));
    }

    #[test]
    fn turning_in_a_quest_pays_the_reward() {
        let items = trade_goods();
        let mut npc = Npc::new("Odile");
        npc.active_quest = Some(firewood_quest());
        let mut inventory = Inventory::default();
        inventory.add("wood", 10);

        let outcome = converse(&mut npc, &mut inventory, &items, Vec2::ZERO);
        assert!(outcome.success);
        assert_eq!(inventory.count("wood"), 2);
        assert_eq!(inventory.count("grilled_fish"), 2);
        assert!(npc.active_quest.is_none());
        assert_eq!(outcome.floating_texts.len(), 1);
    }

    #[test]
    fn a_short_delivery_keeps_the_quest_open() {
        let items = trade_goods();
        let mut npc = Npc::new("Bastien");
        npc.active_quest = Some(firewood_quest());
        let mut inventory = Inventory::default();
        inventory.add("wood", 3);

        let outcome = converse(&mut npc, &mut inventory, &items, Vec2::ZERO);
        assert!(outcome.message.contains("still needed"));
        assert_eq!(inventory.count("wood"), 3);
        assert!(npc.active_quest.is_some());
    }

    #[test]
    fn idle_survivors_still_answer() {
        let items = trade_goods();
        let mut npc = Npc::new("Ronan");
        let mut inventory = Inventory::default();

        let outcome = converse(&mut npc, &mut inventory, &items, Vec2::ZERO);
        assert!(outcome.success);
        assert!(outcome.message.contains("nothing to ask"));
    }
}
