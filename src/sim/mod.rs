//! Simulation heartbeat for Tidefall.
//!
//! Responsible for:
//! - The day cycle: counting days, rolling island-wide events, storm damage
//! - Vital decay on a fixed cadence, with health drain once a vital bottoms out
//! - Keeping afflictions in sync with the vitals they mirror
//! - Watching for the end of the run, rescue or otherwise

use bevy::prelude::*;
use rand::Rng;

use crate::shared::*;
use crate::world::{ShelterRegistry, WorldMap};

/// Resources an abundance event can single out.
const PRIMARY_RESOURCES: &[&str] = &["wood", "berries", "stone", "water"];

// ═══════════════════════════════════════════════════════════════════════
// PLUGIN
// ═══════════════════════════════════════════════════════════════════════

/// Day counter and the two autonomous timers, armed from `SimConfig` when
/// the run starts.
#[derive(Resource, Debug)]
pub struct GameClock {
    pub day: u32,
    pub day_timer: Timer,
    pub decay_timer: Timer,
}

pub struct SimPlugin;

impl Plugin for SimPlugin {
    fn build(&self, app: &mut App) {
        app.add_systems(OnEnter(GameState::Running), arm_clock).add_systems(
            Update,
            (
                advance_day_cycle,
                apply_stat_decay,
                sync_afflictions.after(apply_stat_decay),
                check_end_conditions.after(sync_afflictions),
            )
                .in_set(SimSet::Resolve)
                .run_if(in_state(GameState::Running)),
        );
    }
}

fn arm_clock(mut commands: Commands, config: Res<SimConfig>) {
    commands.insert_resource(GameClock {
        day: 1,
        day_timer: Timer::from_seconds(config.day_secs, TimerMode::Repeating),
        decay_timer: Timer::from_seconds(config.decay_secs, TimerMode::Repeating),
    });
}

// ═══════════════════════════════════════════════════════════════════════
// DAY CYCLE
// ═══════════════════════════════════════════════════════════════════════

/// Runs the day boundary: the counter, the overnight recovery, the
/// island-wide event roll, and storm damage to everything standing.
pub fn advance_day_cycle(
    time: Res<Time>,
    mut clock: ResMut<GameClock>,
    mut player: ResMut<PlayerState>,
    mut event: ResMut<ActiveEvent>,
    mut map: ResMut<WorldMap>,
    mut shelters: ResMut<ShelterRegistry>,
    mut day_end: EventWriter<DayEndEvent>,
) {
    if !clock.day_timer.tick(time.delta()).just_finished() {
        return;
    }

    let ended = clock.day;
    clock.day += 1;
    info!("[Sim] Day {ended} ends; day {} breaks over the island", clock.day);
    day_end.send(DayEndEvent { day: ended });

    // Whatever was in the mushrooms wears off overnight.
    if player.afflictions.remove(&Affliction::Drugged) {
        info!("[Sim] The haze clears with the dawn");
    }

    let mut rng = rand::thread_rng();
    advance_event_day(&mut event, &mut rng);
    match &event.kind {
        WorldEventKind::Storm => {
            info!("[Sim] A storm rages over the island ({} day(s) left)", event.days_left);
        }
        WorldEventKind::Abundance { resource } => {
            info!("[Sim] The island teems with {resource} ({} day(s) left)", event.days_left);
        }
        WorldEventKind::None => {}
    }

    if event.kind == WorldEventKind::Storm {
        batter_buildings(&mut map, &mut shelters);
    }
}

/// One day of event bookkeeping: a running event burns a day (and may blow
/// out), an empty sky may roll a fresh one.
fn advance_event_day(event: &mut ActiveEvent, rng: &mut impl Rng) {
    if event.is_active() {
        event.days_left = event.days_left.saturating_sub(1);
        if event.days_left == 0 {
            info!("[Sim] The island returns to calm");
            event.kind = WorldEventKind::None;
        }
        return;
    }
    if rng.gen::<f64>() < DAILY_EVENT_CHANCE {
        event.kind = if rng.gen_bool(0.5) {
            WorldEventKind::Storm
        } else {
            let resource = PRIMARY_RESOURCES[rng.gen_range(0..PRIMARY_RESOURCES.len())];
            WorldEventKind::Abundance { resource: resource.to_string() }
        };
        event.days_left = rng.gen_range(EVENT_MIN_DAYS..=EVENT_MAX_DAYS);
    }
}

/// Storm wear on every standing building. Collapsed camp shelters hand the
/// designation on afterwards, once the map has settled.
fn batter_buildings(map: &mut WorldMap, shelters: &mut ShelterRegistry) {
    let targets: Vec<GridPos> = map
        .positions()
        .filter(|&pos| map.get(pos).is_some_and(|t| !t.buildings.is_empty()))
        .collect();

    let mut lost_shelters = Vec::new();
    for pos in targets {
        let count = map.get(pos).map_or(0, |t| t.buildings.len());
        // Highest index first, so a collapse does not shift the rest.
        for index in (0..count).rev() {
            if let Some(kind) = map.damage_building(pos, index, STORM_BUILDING_WEAR) {
                info!("[Sim] The storm tears down the {} at {pos:?}", kind.def().name);
                if kind == BuildingKind::CollectiveShelter {
                    lost_shelters.push(pos);
                }
            }
        }
    }
    for pos in lost_shelters {
        shelters.on_shelter_lost(pos, map);
    }
}

// ═══════════════════════════════════════════════════════════════════════
// VITAL DECAY
// ═══════════════════════════════════════════════════════════════════════

/// Fixed-cadence thirst/hunger/sleep loss. A storm makes every decay
/// harsher by the same multiplier. Vitals sitting at zero drain health.
pub fn apply_stat_decay(
    time: Res<Time>,
    config: Res<SimConfig>,
    event: Res<ActiveEvent>,
    mut clock: ResMut<GameClock>,
    mut player: ResMut<PlayerState>,
) {
    if !clock.decay_timer.tick(time.delta()).just_finished() {
        return;
    }

    let mult = event.decay_multiplier();
    player.change_thirst(-(config.thirst_decay * mult));
    player.change_hunger(-(config.hunger_decay * mult));
    player.change_sleep(-(config.sleep_decay * mult));

    let mut drain = 0.0;
    for vital in [player.thirst, player.hunger, player.sleep] {
        if vital <= 0.0 {
            drain += STARVATION_HEALTH_DRAIN;
        }
    }
    if drain > 0.0 {
        player.change_health(-drain);
        info!("[Sim] The island takes its toll: -{drain:.0} health");
    }
}

// ═══════════════════════════════════════════════════════════════════════
// AFFLICTIONS
// ═══════════════════════════════════════════════════════════════════════

/// The vital-mirroring afflictions, re-derived from the current numbers.
/// `Sick` and `Drugged` are managed by what the player eats, not here.
pub fn refresh_afflictions(player: &mut PlayerState) {
    let injured = player.health < INJURED_HEALTH_FRACTION * player.max_health;
    let flags = [
        (Affliction::Dehydrated, player.thirst <= 0.0),
        (Affliction::Starving, player.hunger <= 0.0),
        (Affliction::Exhausted, player.sleep <= 0.0),
        (Affliction::Injured, injured),
    ];
    for (affliction, holds) in flags {
        if holds {
            if player.afflictions.insert(affliction) {
                info!("[Sim] The castaway is {}", affliction.label());
            }
        } else if player.afflictions.remove(&affliction) {
            info!("[Sim] No longer {}", affliction.label());
        }
    }
}

pub fn sync_afflictions(mut player: ResMut<PlayerState>) {
    refresh_afflictions(&mut player);
}

// ═══════════════════════════════════════════════════════════════════════
// END OF THE RUN
// ═══════════════════════════════════════════════════════════════════════

/// Defeat before victory when both would land on the same frame.
pub fn decide_outcome(
    day: u32,
    victory_day: u32,
    player: &PlayerState,
    combat: &ActiveCombat,
) -> Option<OutcomeKind> {
    if player.health <= 0.0 {
        return Some(OutcomeKind::Perished { cause: "succumbed to the island".into() });
    }
    if combat.0.as_ref().is_some_and(|c| c.pending_defeat) {
        return Some(OutcomeKind::Perished { cause: "slain in combat".into() });
    }
    if player.afflictions.len() >= AFFLICTIONS_FATAL_COUNT {
        return Some(OutcomeKind::Perished { cause: "overwhelmed by afflictions".into() });
    }
    if day >= victory_day {
        return Some(OutcomeKind::Rescued);
    }
    None
}

pub fn check_end_conditions(
    clock: Res<GameClock>,
    config: Res<SimConfig>,
    player: Res<PlayerState>,
    combat: Res<ActiveCombat>,
    mut outcome: ResMut<GameOutcome>,
    mut game_over: EventWriter<GameOverEvent>,
    mut next_state: ResMut<NextState<GameState>>,
) {
    if outcome.outcome.is_some() {
        return;
    }
    let Some(kind) = decide_outcome(clock.day, config.victory_day, &player, &combat) else {
        return;
    };
    match &kind {
        OutcomeKind::Rescued => {
            info!("[Sim] A sail on the horizon! Rescued on day {}", clock.day);
        }
        OutcomeKind::Perished { cause } => {
            info!("[Sim] The run ends on day {}: {cause}", clock.day);
        }
    }
    outcome.outcome = Some(kind.clone());
    outcome.final_day = clock.day;
    game_over.send(GameOverEvent(kind));
    next_state.set(GameState::Ended);
}
