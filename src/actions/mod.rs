//! Action engine — the gate through which player intents become world
//! mutations.
//!
//! Responsibilities:
//! - The busy lock: one action at a time, nothing new while a fight is on
//! - The timed-action contract: validate first, charge vital and material
//!   costs up front, schedule the payoff, apply it when the timer lands
//! - Immediate actions that settle in the same frame (movement, eating,
//!   equipment, storage transfers)
//! - Ticking the `ActionSchedule` and re-publishing due tasks as `TaskDue`
//!   events for whichever domain owns the payload
//!
//! Refused intents mutate nothing; every refusal carries a message.

use bevy::prelude::*;

use crate::combat::begin_combat;
use crate::economy::{self, Inventory};
use crate::entities::{Enemy, EnemyRegistry};
use crate::shared::*;
use crate::world::{ShelterRegistry, WorldMap};

mod build;
mod consume;
mod cook;
mod dig;
mod equip;
mod harvest;
mod search;
mod sleep;

pub struct ActionsPlugin;

impl Plugin for ActionsPlugin {
    fn build(&self, app: &mut App) {
        app.init_resource::<ActionSchedule>()
            .configure_sets(Update, SimSet::Resolve.after(SimSet::Tick))
            .add_systems(
                Update,
                (
                    tick_schedule.in_set(SimSet::Tick),
                    (
                        dispatch_timed_actions,
                        dispatch_immediate_actions,
                        apply_finished_actions,
                    )
                        .in_set(SimSet::Resolve),
                )
                    .run_if(in_state(GameState::Running)),
            );
    }
}

// ═══════════════════════════════════════════════════════════════════════
// VITAL COSTS — charged when a timed action starts
// ═══════════════════════════════════════════════════════════════════════

/// Up-front vital charge for one timed action. Hunger is never charged
/// directly; it only falls through the decay clock.
#[derive(Debug, Clone, Copy)]
pub struct ActionCost {
    pub thirst: f32,
    pub sleep: f32,
}

pub const HARVEST_COST: ActionCost = ActionCost { thirst: 3.0, sleep: 2.0 };
pub const BUILD_COST: ActionCost = ActionCost { thirst: 4.0, sleep: 4.0 };
pub const REPLANT_COST: ActionCost = ActionCost { thirst: 2.0, sleep: 1.0 };
pub const COOK_COST: ActionCost = ActionCost { thirst: 1.0, sleep: 0.0 };
pub const SEARCH_COST: ActionCost = ActionCost { thirst: 2.0, sleep: 1.0 };
pub const DIG_COST: ActionCost = ActionCost { thirst: 4.0, sleep: 2.0 };
pub const DISMANTLE_COST: ActionCost = ActionCost { thirst: 2.0, sleep: 1.0 };
pub const SLEEP_COST: ActionCost = ActionCost { thirst: 0.0, sleep: 0.0 };

fn is_timed(kind: &ActionKind) -> bool {
    matches!(
        kind,
        ActionKind::Harvest(_)
            | ActionKind::Build { .. }
            | ActionKind::Replant
            | ActionKind::Cook { .. }
            | ActionKind::Sleep
            | ActionKind::Dig
            | ActionKind::Search
            | ActionKind::Dismantle
    )
}

fn is_immediate(kind: &ActionKind) -> bool {
    matches!(
        kind,
        ActionKind::Eat { .. }
            | ActionKind::DrinkWater
            | ActionKind::Equip { .. }
            | ActionKind::Unequip { .. }
            | ActionKind::PickUp
            | ActionKind::Deposit { .. }
            | ActionKind::Withdraw { .. }
            | ActionKind::Move { .. }
    )
}

// ═══════════════════════════════════════════════════════════════════════
// SCHEDULE TICKER
// ═══════════════════════════════════════════════════════════════════════

/// Advance the deferred-work queue and re-publish whatever came due, so
/// each domain consumes its own payloads.
pub fn tick_schedule(
    time: Res<Time>,
    mut schedule: ResMut<ActionSchedule>,
    mut due: EventWriter<TaskDue>,
) {
    for payload in schedule.tick(time.delta()) {
        due.send(TaskDue(payload));
    }
}

// ═══════════════════════════════════════════════════════════════════════
// TIMED ACTIONS — validate, charge, schedule
// ═══════════════════════════════════════════════════════════════════════

/// Charge the vital bill, lock the player, and schedule the payoff. The
/// returned outcome's `success` flag tells the caller whether the action
/// actually started.
fn begin_timed(
    player: &mut PlayerState,
    schedule: &mut ActionSchedule,
    cost: ActionCost,
    secs: f32,
    pending: PendingAction,
    start_message: &str,
    tile_size: f32,
) -> ActionOutcome {
    if player.thirst < cost.thirst {
        return ActionOutcome::failure("You are too parched for that.");
    }
    if player.sleep < cost.sleep {
        return ActionOutcome::failure("You are too worn out for that.");
    }

    let anchor = player.pos.anchor(tile_size);
    player.change_thirst(-cost.thirst);
    player.change_sleep(-cost.sleep);
    player.is_busy = true;
    schedule.after(secs, TaskPayload::FinishAction(pending));

    let mut outcome = ActionOutcome::success(start_message);
    if cost.thirst > 0.0 {
        outcome = outcome.with_float(format!("-{:.0} thirst", cost.thirst), FloatKind::Loss, anchor);
    }
    if cost.sleep > 0.0 {
        outcome = outcome.with_float(format!("-{:.0} sleep", cost.sleep), FloatKind::Loss, anchor);
    }
    outcome
}

/// Deduct a material bill and stamp the losses onto the start outcome.
/// The bill was validated by the action's check, so deduction cannot fail.
fn charge_materials(
    mut outcome: ActionOutcome,
    bill: &[(&str, u32)],
    inventory: &mut Inventory,
    items: &ItemRegistry,
    anchor: Vec2,
) -> ActionOutcome {
    inventory.apply_deduction(bill);
    for (item, amount) in bill {
        outcome = outcome.with_float(
            format!("-{amount} {}", items.display_name(item)),
            FloatKind::Loss,
            anchor,
        );
    }
    outcome
}

/// Route timed-action intents. Nothing is mutated on a refusal; an intent
/// that arrives while the player is occupied is dropped with a trace.
#[allow(clippy::too_many_arguments)]
pub fn dispatch_timed_actions(
    mut requests: EventReader<ActionRequest>,
    combat: Res<ActiveCombat>,
    config: Res<SimConfig>,
    items: Res<ItemRegistry>,
    map: Res<WorldMap>,
    mut player: ResMut<PlayerState>,
    mut inventory: ResMut<Inventory>,
    mut schedule: ResMut<ActionSchedule>,
    mut outcomes: EventWriter<ActionOutcome>,
) {
    for ActionRequest(kind) in requests.read() {
        if !is_timed(kind) {
            continue;
        }
        if !player.can_act() || combat.engaged() {
            info!("[Actions] Dropped {kind:?}; the castaway is occupied");
            continue;
        }

        let pos = player.pos;
        let anchor = pos.anchor(config.tile_size);
        let outcome = match kind {
            ActionKind::Harvest(harvest_kind) => {
                match harvest::check_harvest(*harvest_kind, pos, &map, &inventory, &config) {
                    Err(msg) => ActionOutcome::failure(msg),
                    Ok(start) => begin_timed(
                        &mut player,
                        &mut schedule,
                        HARVEST_COST,
                        config.harvest_secs,
                        PendingAction::Harvest { kind: *harvest_kind, pos },
                        &start,
                        config.tile_size,
                    ),
                }
            }

            ActionKind::Build { kind } => match build::check_build(*kind, pos, &map, &inventory) {
                Err(msg) => ActionOutcome::failure(msg),
                Ok(start) => {
                    let def = kind.def();
                    let mut outcome = begin_timed(
                        &mut player,
                        &mut schedule,
                        BUILD_COST,
                        def.build_secs * config.build_secs_scale,
                        PendingAction::Build { kind: *kind, pos },
                        &start,
                        config.tile_size,
                    );
                    if outcome.success {
                        outcome =
                            charge_materials(outcome, def.cost, &mut inventory, &items, anchor);
                    }
                    outcome
                }
            },

            ActionKind::Replant => match build::check_replant(pos, &map, &inventory) {
                Err(msg) => ActionOutcome::failure(msg),
                Ok((start, bill)) => {
                    let mut outcome = begin_timed(
                        &mut player,
                        &mut schedule,
                        REPLANT_COST,
                        config.harvest_secs,
                        PendingAction::Replant { pos },
                        &start,
                        config.tile_size,
                    );
                    if outcome.success {
                        outcome =
                            charge_materials(outcome, &[bill], &mut inventory, &items, anchor);
                    }
                    outcome
                }
            },

            ActionKind::Cook { item } => {
                match cook::check_cook(item, pos, &map, &inventory, &items) {
                    Err(msg) => ActionOutcome::failure(msg),
                    Ok(start) => {
                        let mut outcome = begin_timed(
                            &mut player,
                            &mut schedule,
                            COOK_COST,
                            config.cook_secs,
                            PendingAction::Cook { item: item.clone(), pos },
                            &start,
                            config.tile_size,
                        );
                        if outcome.success {
                            let bill = [(item.as_str(), 1)];
                            outcome =
                                charge_materials(outcome, &bill, &mut inventory, &items, anchor);
                        }
                        outcome
                    }
                }
            }

            ActionKind::Sleep => {
                let outcome = begin_timed(
                    &mut player,
                    &mut schedule,
                    SLEEP_COST,
                    config.sleep_secs,
                    PendingAction::Sleep { pos },
                    "You settle down to sleep.",
                    config.tile_size,
                );
                if outcome.success {
                    player.transition = Some(TransitionKind::Sleeping);
                }
                outcome
            }

            ActionKind::Dig => match dig::check_dig(pos, &map) {
                Err(msg) => ActionOutcome::failure(msg),
                Ok(start) => begin_timed(
                    &mut player,
                    &mut schedule,
                    DIG_COST,
                    config.dig_secs,
                    PendingAction::Dig { pos },
                    &start,
                    config.tile_size,
                ),
            },

            ActionKind::Search => match search::check_search(pos, &map) {
                Err(msg) => ActionOutcome::failure(msg),
                Ok(start) => begin_timed(
                    &mut player,
                    &mut schedule,
                    SEARCH_COST,
                    config.search_secs,
                    PendingAction::Search { pos },
                    &start,
                    config.tile_size,
                ),
            },

            ActionKind::Dismantle => match build::check_dismantle(pos, &map) {
                Err(msg) => ActionOutcome::failure(msg),
                Ok((start, target)) => begin_timed(
                    &mut player,
                    &mut schedule,
                    DISMANTLE_COST,
                    target.def().build_secs * build::DISMANTLE_TIME_FRACTION
                        * config.build_secs_scale,
                    PendingAction::Dismantle { pos },
                    &start,
                    config.tile_size,
                ),
            },

            _ => continue,
        };
        outcomes.send(outcome);
    }
}

// ═══════════════════════════════════════════════════════════════════════
// PAYOFFS
// ═══════════════════════════════════════════════════════════════════════

/// Apply the payoff of every timed action whose timer came due. The busy
/// lock opens before the payoff runs, so a payoff that starts a fight (a
/// hostile search) can immediately take it again.
#[allow(clippy::too_many_arguments)]
pub fn apply_finished_actions(
    mut commands: Commands,
    mut tasks: EventReader<TaskDue>,
    config: Res<SimConfig>,
    items: Res<ItemRegistry>,
    enemy_registry: Res<EnemyRegistry>,
    active_event: Res<ActiveEvent>,
    mut player: ResMut<PlayerState>,
    mut inventory: ResMut<Inventory>,
    mut map: ResMut<WorldMap>,
    mut shelters: ResMut<ShelterRegistry>,
    mut active_combat: ResMut<ActiveCombat>,
    mut outcomes: EventWriter<ActionOutcome>,
    mut completed: EventWriter<ActionCompleted>,
    mut combat_log: EventWriter<CombatEvent>,
) {
    for task in tasks.read() {
        let TaskPayload::FinishAction(pending) = &task.0 else {
            continue;
        };
        player.is_busy = false;
        player.transition = None;

        let outcome = match pending {
            PendingAction::Harvest { kind, pos } => harvest::finish_harvest(
                *kind,
                *pos,
                &mut player,
                &mut inventory,
                &mut map,
                &items,
                &active_event,
                &config,
            ),
            PendingAction::Build { kind, pos } => {
                build::finish_build(*kind, *pos, &mut map, &mut shelters)
            }
            PendingAction::Replant { pos } => build::finish_replant(*pos, &mut map),
            PendingAction::Cook { item, pos } => {
                cook::finish_cook(item, *pos, &mut inventory, &mut map, &items, &config)
            }
            PendingAction::Sleep { pos } => sleep::finish_sleep(*pos, &mut player, &map, &config),
            PendingAction::Dig { pos } => {
                dig::finish_dig(*pos, &mut inventory, &mut map, &items, &config)
            }
            PendingAction::Search { pos } => search::finish_search(
                *pos,
                &mut commands,
                &mut player,
                &mut inventory,
                &map,
                &items,
                &enemy_registry,
                &mut active_combat,
                &mut combat_log,
                &config,
            ),
            PendingAction::Dismantle { pos } => {
                build::finish_dismantle(*pos, &mut map, &mut shelters)
            }
        };
        outcomes.send(outcome);
        completed.send(ActionCompleted);
    }
}

// ═══════════════════════════════════════════════════════════════════════
// IMMEDIATE ACTIONS
// ═══════════════════════════════════════════════════════════════════════

/// Route the actions that settle in the frame they were asked for. Respect
/// the same busy lock as the timed ones.
#[allow(clippy::too_many_arguments)]
pub fn dispatch_immediate_actions(
    mut requests: EventReader<ActionRequest>,
    config: Res<SimConfig>,
    items: Res<ItemRegistry>,
    mut combat: ResMut<ActiveCombat>,
    mut player: ResMut<PlayerState>,
    mut inventory: ResMut<Inventory>,
    mut map: ResMut<WorldMap>,
    enemies: Query<(Entity, &Enemy, &GridPos)>,
    mut outcomes: EventWriter<ActionOutcome>,
    mut combat_log: EventWriter<CombatEvent>,
) {
    for ActionRequest(kind) in requests.read() {
        if !is_immediate(kind) {
            continue;
        }
        if !player.can_act() || combat.engaged() {
            info!("[Actions] Dropped {kind:?}; the castaway is occupied");
            continue;
        }

        let outcome = match kind {
            ActionKind::Eat { item } => {
                consume::eat(item, &mut player, &mut inventory, &items, &config)
            }
            ActionKind::DrinkWater => {
                consume::drink_water(&mut player, &mut inventory, &config)
            }
            ActionKind::Equip { item } => equip::equip(item, &mut player, &mut inventory, &items),
            ActionKind::Unequip { slot } => {
                equip::unequip(*slot, &mut player, &mut inventory, &items)
            }
            ActionKind::PickUp => {
                equip::pick_up(&mut player, &mut inventory, &mut map, &items, &config)
            }
            ActionKind::Deposit { item, amount } => storage_transfer(
                StorageDir::Deposit,
                item,
                *amount,
                player.pos,
                &mut inventory,
                &mut map,
                &items,
                &config,
            ),
            ActionKind::Withdraw { item, amount } => storage_transfer(
                StorageDir::Withdraw,
                item,
                *amount,
                player.pos,
                &mut inventory,
                &mut map,
                &items,
                &config,
            ),
            ActionKind::Move { dx, dy } => {
                match try_move(*dx, *dy, &mut player, &map, &enemies, &mut combat, &mut combat_log)
                {
                    Some(outcome) => outcome,
                    // A plain successful step is silent.
                    None => continue,
                }
            }
            _ => continue,
        };
        outcomes.send(outcome);
    }
}

/// A single-tile step. Walking into a live enemy's tile starts a fight.
fn try_move(
    dx: i32,
    dy: i32,
    player: &mut PlayerState,
    map: &WorldMap,
    enemies: &Query<(Entity, &Enemy, &GridPos)>,
    combat: &mut ActiveCombat,
    combat_log: &mut EventWriter<CombatEvent>,
) -> Option<ActionOutcome> {
    if dx.unsigned_abs() + dy.unsigned_abs() != 1 {
        warn!("[Actions] Rejected a non-adjacent step of ({dx}, {dy})");
        return Some(ActionOutcome::failure("You can only step to an adjacent tile."));
    }
    let dest = player.pos.offset(dx, dy);
    if !map.is_accessible(dest) {
        return Some(ActionOutcome::failure("You can't go that way."));
    }
    player.pos = dest;

    let blocking = enemies
        .iter()
        .find(|(_, enemy, pos)| **pos == dest && enemy.health > 0.0);
    if let Some((entity, enemy, _)) = blocking {
        begin_combat(combat, player, entity, &enemy.name, combat_log);
    }
    None
}

// ─── Storage transfers ──────────────────────────────────────────────────

enum StorageDir {
    Deposit,
    Withdraw,
}

/// Atomic transfer against the camp shelter on the player's tile. Either
/// the whole amount moves or nothing does.
#[allow(clippy::too_many_arguments)]
fn storage_transfer(
    dir: StorageDir,
    item: &str,
    amount: u32,
    pos: GridPos,
    inventory: &mut Inventory,
    map: &mut WorldMap,
    items: &ItemRegistry,
    config: &SimConfig,
) -> ActionOutcome {
    let Some(building) = map
        .get_mut(pos)
        .and_then(|tile| tile.building_mut(BuildingKind::CollectiveShelter))
    else {
        return ActionOutcome::failure("There is no storage here.");
    };
    if building.is_locked {
        return ActionOutcome::failure("The stores are locked up.");
    }
    let capacity = building.kind.def().inventory_capacity;
    let Some(stored) = building.inventory.as_mut() else {
        warn!("[Actions] Camp shelter without a storage inventory; refusing transfer");
        return ActionOutcome::failure("There is no storage here.");
    };

    let name = items.display_name(item);
    let moved = match dir {
        StorageDir::Deposit => economy::transfer(inventory, stored, item, amount, capacity),
        StorageDir::Withdraw => {
            economy::transfer(stored, inventory, item, amount, config.player_capacity)
        }
    };
    if moved {
        return match dir {
            StorageDir::Deposit => {
                ActionOutcome::success(format!("You store {amount} {name} in the shelter."))
            }
            StorageDir::Withdraw => {
                ActionOutcome::success(format!("You take {amount} {name} from the stores."))
            }
        };
    }
    match dir {
        StorageDir::Deposit if !inventory.has(item, amount) => {
            ActionOutcome::failure(format!("You don't have {amount} {name} to store."))
        }
        StorageDir::Deposit => ActionOutcome::failure("The stores are crammed full."),
        StorageDir::Withdraw if !stored.has(item, amount) => {
            ActionOutcome::failure(format!("There aren't {amount} {name} in the stores."))
        }
        StorageDir::Withdraw => ActionOutcome::failure("Your pack is full."),
    }
}
