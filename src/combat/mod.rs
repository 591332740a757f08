//! Turn-based combat between the castaway and island wildlife.
//!
//! One fight at a time, held in the `ActiveCombat` resource; its existence
//! is part of the player's busy lock. The player acts, then two scheduled
//! delays pace the enemy's answer: first the windup, then the strike.
//! There is no cancellation; a fight ends in victory, escape, or the
//! pending-defeat handoff to the end-condition check.

use bevy::prelude::*;
use rand::Rng;

use crate::economy::Inventory;
use crate::entities::Enemy;
use crate::shared::*;

pub struct CombatPlugin;

impl Plugin for CombatPlugin {
    fn build(&self, app: &mut App) {
        app.init_resource::<ActiveCombat>().add_systems(
            Update,
            (handle_combat_commands, handle_combat_tasks)
                .in_set(SimSet::Resolve)
                .run_if(in_state(GameState::Running)),
        );
    }
}

// ═══════════════════════════════════════════════════════════════════════
// DAMAGE MATH
// ═══════════════════════════════════════════════════════════════════════

/// Damage one player attack deals: the equipped weapon's, or bare fists.
pub fn player_attack_damage(equipment: &EquipmentSlots, items: &ItemRegistry) -> f32 {
    let Some(weapon) = equipment.equipped(EquipSlot::Weapon) else {
        return UNARMED_DAMAGE;
    };
    match items.get(&weapon.item) {
        Some(def) => def.damage,
        None => {
            warn!("[Combat] Equipped weapon '{}' has no definition", weapon.item);
            UNARMED_DAMAGE
        }
    }
}

pub fn player_armor_defense(equipment: &EquipmentSlots, items: &ItemRegistry) -> f32 {
    let Some(armor) = equipment.equipped(EquipSlot::Armor) else {
        return 0.0;
    };
    match items.get(&armor.item) {
        Some(def) => def.defense,
        None => {
            warn!("[Combat] Equipped armor '{}' has no definition", armor.item);
            0.0
        }
    }
}

/// Incoming damage after armor, never below zero.
pub fn strike_damage(raw: f32, defense: f32) -> f32 {
    (raw - defense).max(0.0)
}

// ═══════════════════════════════════════════════════════════════════════
// ENTRY
// ═══════════════════════════════════════════════════════════════════════

/// Open a fight against `enemy`. A no-op while any fight is live, so
/// double triggers (search plus collision on the same tick) stay harmless.
pub fn begin_combat(
    active: &mut ActiveCombat,
    player: &mut PlayerState,
    enemy: Entity,
    enemy_name: &str,
    combat_log: &mut EventWriter<CombatEvent>,
) {
    if active.0.is_some() {
        info!("[Combat] Already fighting; ignored a second engagement");
        return;
    }
    player.is_busy = true;
    let opening = format!("A {enemy_name} blocks your path!");
    active.0 = Some(CombatState {
        enemy,
        is_player_turn: true,
        log: vec![opening.clone()],
        pending_defeat: false,
    });
    combat_log.send(CombatEvent { entry: opening });
}

// ═══════════════════════════════════════════════════════════════════════
// PLAYER TURN
// ═══════════════════════════════════════════════════════════════════════

#[allow(clippy::too_many_arguments)]
pub fn handle_combat_commands(
    mut commands: Commands,
    mut events: EventReader<CombatCommand>,
    mut active: ResMut<ActiveCombat>,
    mut player: ResMut<PlayerState>,
    mut inventory: ResMut<Inventory>,
    mut schedule: ResMut<ActionSchedule>,
    mut enemies: Query<&mut Enemy>,
    items: Res<ItemRegistry>,
    config: Res<SimConfig>,
    mut outcomes: EventWriter<ActionOutcome>,
    mut combat_log: EventWriter<CombatEvent>,
) {
    for command in events.read() {
        let Some(state) = active.0.as_mut() else {
            info!("[Combat] Command outside combat ignored");
            continue;
        };
        if !state.is_player_turn {
            info!("[Combat] Command out of turn ignored");
            continue;
        }

        let Ok(mut enemy) = enemies.get_mut(state.enemy) else {
            warn!("[Combat] Opponent vanished mid-fight; standing down");
            active.0 = None;
            player.is_busy = false;
            continue;
        };

        match command.0 {
            CombatMove::Attack => {
                let damage = player_attack_damage(&player.equipment, &items);
                enemy.health = (enemy.health - damage).max(0.0);
                let entry = format!("You strike the {} for {damage:.0}", enemy.name);
                state.log.push(entry.clone());
                combat_log.send(CombatEvent { entry });

                wear_equipped(&mut player, EquipSlot::Weapon, &items, &mut combat_log);

                if enemy.health <= 0.0 {
                    let mut outcome =
                        ActionOutcome::success(format!("You defeated the {}!", enemy.name));
                    let anchor = player.pos.anchor(config.tile_size);
                    for (item, amount) in &enemy.loot {
                        inventory.add(item, *amount);
                        outcome = outcome.with_float(
                            format!("+{amount} {}", items.display_name(item)),
                            FloatKind::Gain,
                            anchor,
                        );
                    }
                    outcomes.send(outcome);
                    combat_log.send(CombatEvent {
                        entry: format!("The {} collapses", enemy.name),
                    });
                    commands.entity(state.enemy).despawn();
                    active.0 = None;
                    player.is_busy = false;
                } else {
                    state.is_player_turn = false;
                    schedule.after(config.combat_resolve_secs, TaskPayload::CombatTurnResolve);
                }
            }
            CombatMove::Flee => {
                if rand::thread_rng().gen::<f64>() < FLEE_SUCCESS_CHANCE {
                    combat_log.send(CombatEvent {
                        entry: format!("You slip away from the {}", enemy.name),
                    });
                    outcomes.send(ActionOutcome::success("You got away."));
                    // A conjured encounter has no den to return to.
                    if enemy.is_search_encounter {
                        commands.entity(state.enemy).despawn();
                    }
                    active.0 = None;
                    player.is_busy = false;
                } else {
                    let entry = format!("The {} cuts off your escape!", enemy.name);
                    state.log.push(entry.clone());
                    combat_log.send(CombatEvent { entry });
                    state.is_player_turn = false;
                    schedule.after(config.combat_resolve_secs, TaskPayload::CombatTurnResolve);
                }
            }
        }
    }
}

/// Chance-gated wear on an equipped slot; a broken piece is lost outright.
fn wear_equipped(
    player: &mut PlayerState,
    slot: EquipSlot,
    items: &ItemRegistry,
    combat_log: &mut EventWriter<CombatEvent>,
) {
    if rand::thread_rng().gen::<f64>() >= WEAPON_WEAR_CHANCE {
        return;
    }
    let Some(instance) = player.equipment.equipped_mut(slot) else {
        return;
    };
    if instance.state.wear() {
        let name = items.display_name(&instance.item);
        player.equipment.set(slot, None);
        combat_log.send(CombatEvent {
            entry: format!("Your {name} breaks!"),
        });
    }
}

// ═══════════════════════════════════════════════════════════════════════
// ENEMY TURN — two chained delays
// ═══════════════════════════════════════════════════════════════════════

pub fn handle_combat_tasks(
    mut tasks: EventReader<TaskDue>,
    mut active: ResMut<ActiveCombat>,
    mut player: ResMut<PlayerState>,
    mut schedule: ResMut<ActionSchedule>,
    enemies: Query<&Enemy>,
    items: Res<ItemRegistry>,
    config: Res<SimConfig>,
    mut combat_log: EventWriter<CombatEvent>,
) {
    for task in tasks.read() {
        let phase = match task.0 {
            TaskPayload::CombatTurnResolve => CombatPhase::Windup,
            TaskPayload::CombatEnemyStrike => CombatPhase::Strike,
            _ => continue,
        };
        let Some(state) = active.0.as_mut() else {
            // The fight ended while the task was in flight; nothing to do.
            continue;
        };
        let Ok(enemy) = enemies.get(state.enemy) else {
            warn!("[Combat] Opponent vanished before its turn; standing down");
            active.0 = None;
            player.is_busy = false;
            continue;
        };
        // A survivor can fell the opponent while its turn is in flight;
        // a dead enemy gets no windup and no strike. The entity sweep
        // claims the carcass once the fight lets go of it.
        if enemy.health <= 0.0 {
            let entry = format!("The {} collapses before it can strike", enemy.name);
            info!("[Combat] {entry}");
            combat_log.send(CombatEvent { entry });
            active.0 = None;
            player.is_busy = false;
            continue;
        }

        match phase {
            CombatPhase::Windup => {
                let entry = format!("The {} readies itself...", enemy.name);
                state.log.push(entry.clone());
                combat_log.send(CombatEvent { entry });
                schedule.after(config.combat_strike_secs, TaskPayload::CombatEnemyStrike);
            }
            CombatPhase::Strike => {
                let defense = player_armor_defense(&player.equipment, &items);
                let damage = strike_damage(enemy.damage, defense);
                let name = enemy.name.clone();
                player.change_health(-damage);
                let entry = format!("The {name} hits you for {damage:.0}");
                state.log.push(entry.clone());
                combat_log.send(CombatEvent { entry });

                wear_equipped(&mut player, EquipSlot::Armor, &items, &mut combat_log);

                if player.health <= 0.0 {
                    state.pending_defeat = true;
                    combat_log.send(CombatEvent {
                        entry: "You collapse...".to_string(),
                    });
                } else {
                    state.is_player_turn = true;
                    combat_log.send(CombatEvent {
                        entry: "Your move.".to_string(),
                    });
                }
            }
        }
    }
}

enum CombatPhase {
    Windup,
    Strike,
}
