//! Shared components, resources, events, and states for Tidefall.
//!
//! This is the type contract. Every domain plugin imports from here.
//! No domain imports from any other domain directly, with two exceptions:
//! the `economy::Inventory` leaf type and the `world` tile structures,
//! which are owned by their domains and re-used everywhere.

use bevy::prelude::*;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::time::Duration;

// ═══════════════════════════════════════════════════════════════════════
// GAME STATE — top-level state machine
// ═══════════════════════════════════════════════════════════════════════

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, States, Default)]
pub enum GameState {
    #[default]
    Loading,
    Running,
    Ended,
}

/// How a run finished. Filled in exactly once, when `GameState::Ended` is
/// entered; external consumers read it for the end screen.
#[derive(Resource, Debug, Clone, Default, Serialize, Deserialize)]
pub struct GameOutcome {
    pub outcome: Option<OutcomeKind>,
    pub final_day: u32,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum OutcomeKind {
    Rescued,
    Perished { cause: String },
}

// ═══════════════════════════════════════════════════════════════════════
// SIMULATION CONFIG
// ═══════════════════════════════════════════════════════════════════════

/// Every tunable interval and count. Inserted once before startup; mutating
/// it after initialization is not supported (timers are built from it at
/// schedule time and do not watch for changes).
#[derive(Resource, Debug, Clone, Serialize, Deserialize)]
pub struct SimConfig {
    pub map_width: usize,
    pub map_height: usize,
    pub tile_size: f32,

    pub day_secs: f32,
    pub decay_secs: f32,
    pub npc_tick_secs: f32,

    pub harvest_secs: f32,
    pub build_secs_scale: f32,
    pub cook_secs: f32,
    pub search_secs: f32,
    pub sleep_secs: f32,
    pub dig_secs: f32,
    pub combat_resolve_secs: f32,
    pub combat_strike_secs: f32,

    pub thirst_decay: f32,
    pub hunger_decay: f32,
    pub sleep_decay: f32,

    pub npc_count: usize,
    pub enemy_count: usize,
    pub player_capacity: u32,
    pub victory_day: u32,
}

impl Default for SimConfig {
    fn default() -> Self {
        Self {
            map_width: 18,
            map_height: 12,
            tile_size: 16.0,

            day_secs: 180.0,
            decay_secs: 20.0,
            npc_tick_secs: 2.5,

            harvest_secs: 2.0,
            build_secs_scale: 1.0,
            cook_secs: 1.5,
            search_secs: 2.5,
            sleep_secs: 4.0,
            dig_secs: 2.0,
            combat_resolve_secs: 0.8,
            combat_strike_secs: 0.7,

            thirst_decay: 4.0,
            hunger_decay: 3.0,
            sleep_decay: 2.0,

            npc_count: 3,
            enemy_count: 4,
            player_capacity: 100,
            victory_day: 10,
        }
    }
}

impl SimConfig {
    /// Config for deterministic tests: action and combat timers fire on the
    /// first tick, while the autonomous interval timers never fire.
    pub fn instant() -> Self {
        Self {
            harvest_secs: 0.0,
            build_secs_scale: 0.0,
            cook_secs: 0.0,
            search_secs: 0.0,
            sleep_secs: 0.0,
            dig_secs: 0.0,
            combat_resolve_secs: 0.0,
            combat_strike_secs: 0.0,
            day_secs: 1.0e6,
            decay_secs: 1.0e6,
            npc_tick_secs: 1.0e6,
            ..Self::default()
        }
    }
}

// ═══════════════════════════════════════════════════════════════════════
// GRID
// ═══════════════════════════════════════════════════════════════════════

#[derive(Component, Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub struct GridPos {
    pub x: i32,
    pub y: i32,
}

impl GridPos {
    pub fn new(x: i32, y: i32) -> Self {
        Self { x, y }
    }

    pub fn offset(self, dx: i32, dy: i32) -> Self {
        Self {
            x: self.x + dx,
            y: self.y + dy,
        }
    }

    pub fn manhattan(self, other: GridPos) -> u32 {
        self.x.abs_diff(other.x) + self.y.abs_diff(other.y)
    }

    pub fn chebyshev(self, other: GridPos) -> u32 {
        self.x.abs_diff(other.x).max(self.y.abs_diff(other.y))
    }

    /// World-space anchor for floating text, in the renderer's units.
    pub fn anchor(self, tile_size: f32) -> Vec2 {
        Vec2::new(self.x as f32 * tile_size, self.y as f32 * tile_size)
    }
}

// ═══════════════════════════════════════════════════════════════════════
// ITEMS
// ═══════════════════════════════════════════════════════════════════════

/// Unique identifier for every item type in the game.
pub type ItemId = String;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ItemCategory {
    Material,
    Food,
    Remedy,
    Tool,
    Weapon,
    Armor,
    Special,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ToolKind {
    Axe,
    Pickaxe,
    Spear,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum EquipSlot {
    Weapon,
    Armor,
    Tool,
}

/// Wear model of an item instance. `Durability` items degrade while worn
/// or wielded; `Uses` items are spent per application. Plain stackables
/// carry `None` and never track instance state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
pub enum ConsumableState {
    #[default]
    None,
    Durability(u32),
    Uses(u32),
}

impl ConsumableState {
    /// Apply one point of wear. Returns true when the item breaks.
    pub fn wear(&mut self) -> bool {
        match self {
            ConsumableState::None => false,
            ConsumableState::Durability(n) | ConsumableState::Uses(n) => {
                *n = n.saturating_sub(1);
                *n == 0
            }
        }
    }

    pub fn remaining(&self) -> Option<u32> {
        match self {
            ConsumableState::None => None,
            ConsumableState::Durability(n) | ConsumableState::Uses(n) => Some(*n),
        }
    }
}

/// Effects of eating or drinking an item.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct EdibleDef {
    pub hunger: f32,
    pub thirst: f32,
    pub health: f32,
    pub sick_chance: f64,
    pub inflicts: Option<Affliction>,
    pub cures: Option<Affliction>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ItemDef {
    pub id: ItemId,
    pub name: String,
    pub category: ItemCategory,
    /// Initial wear state stamped onto new instances of this item.
    pub consumable: ConsumableState,
    pub equip_slot: Option<EquipSlot>,
    pub tool: Option<ToolKind>,
    pub damage: f32,
    pub defense: f32,
    pub edible: Option<EdibleDef>,
    pub cooks_into: Option<ItemId>,
}

impl ItemDef {
    pub fn new(id: &str, name: &str, category: ItemCategory) -> Self {
        Self {
            id: id.to_string(),
            name: name.to_string(),
            category,
            consumable: ConsumableState::None,
            equip_slot: None,
            tool: None,
            damage: 0.0,
            defense: 0.0,
            edible: None,
            cooks_into: None,
        }
    }
}

/// A concrete item with instance state, as held in an equipment slot.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ItemInstance {
    pub item: ItemId,
    pub state: ConsumableState,
}

impl ItemInstance {
    pub fn from_def(def: &ItemDef) -> Self {
        Self {
            item: def.id.clone(),
            state: def.consumable,
        }
    }
}

#[derive(Resource, Debug, Clone, Default)]
pub struct ItemRegistry {
    pub items: std::collections::HashMap<ItemId, ItemDef>,
}

impl ItemRegistry {
    pub fn register(&mut self, def: ItemDef) {
        if self.items.insert(def.id.clone(), def).is_some() {
            warn!("[Data] Duplicate item registration overwrote an entry");
        }
    }

    pub fn get(&self, id: &str) -> Option<&ItemDef> {
        self.items.get(id)
    }

    /// Display name with an id fallback, so messages never dead-end on a
    /// missing registry entry.
    pub fn display_name(&self, id: &str) -> String {
        self.items
            .get(id)
            .map(|d| d.name.clone())
            .unwrap_or_else(|| id.to_string())
    }
}

// ═══════════════════════════════════════════════════════════════════════
// TERRAIN & BUILDING KINDS — definition tables live in `crate::world`
// ═══════════════════════════════════════════════════════════════════════

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum TerrainKind {
    DeepWater,
    Beach,
    Forest,
    ForestCleared,
    Plains,
    StoneDeposit,
    Shelter,
    Treasure,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum BuildingKind {
    IndividualShelter,
    CollectiveShelter,
    Campfire,
}

// ═══════════════════════════════════════════════════════════════════════
// PLAYER
// ═══════════════════════════════════════════════════════════════════════

/// Afflictions. Four or more at once is fatal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Affliction {
    Sick,
    Drugged,
    Injured,
    Exhausted,
    Starving,
    Dehydrated,
}

impl Affliction {
    pub fn label(&self) -> &'static str {
        match self {
            Affliction::Sick => "sick",
            Affliction::Drugged => "drugged",
            Affliction::Injured => "injured",
            Affliction::Exhausted => "exhausted",
            Affliction::Starving => "starving",
            Affliction::Dehydrated => "dehydrated",
        }
    }
}

/// Blocking visual transition the outer layer plays (e.g. the sleep fade).
/// While one is set, no new action may begin.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum TransitionKind {
    Sleeping,
}

/// Equipment slots plus the stowed pile. Unequipping moves the instance to
/// `stowed` so a later re-equip restores its exact wear state.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct EquipmentSlots {
    pub weapon: Option<ItemInstance>,
    pub armor: Option<ItemInstance>,
    pub tool: Option<ItemInstance>,
    pub stowed: Vec<ItemInstance>,
}

impl EquipmentSlots {
    pub fn equipped(&self, slot: EquipSlot) -> Option<&ItemInstance> {
        match slot {
            EquipSlot::Weapon => self.weapon.as_ref(),
            EquipSlot::Armor => self.armor.as_ref(),
            EquipSlot::Tool => self.tool.as_ref(),
        }
    }

    pub fn equipped_mut(&mut self, slot: EquipSlot) -> Option<&mut ItemInstance> {
        match slot {
            EquipSlot::Weapon => self.weapon.as_mut(),
            EquipSlot::Armor => self.armor.as_mut(),
            EquipSlot::Tool => self.tool.as_mut(),
        }
    }

    /// Put `instance` into `slot`, returning whatever was displaced.
    pub fn set(&mut self, slot: EquipSlot, instance: Option<ItemInstance>) -> Option<ItemInstance> {
        let target = match slot {
            EquipSlot::Weapon => &mut self.weapon,
            EquipSlot::Armor => &mut self.armor,
            EquipSlot::Tool => &mut self.tool,
        };
        std::mem::replace(target, instance)
    }

    pub fn stow(&mut self, instance: ItemInstance) {
        self.stowed.push(instance);
    }

    /// Take the first stowed instance of `item`, if any survived a previous
    /// unequip.
    pub fn recall_stowed(&mut self, item: &str) -> Option<ItemInstance> {
        let idx = self.stowed.iter().position(|i| i.item == item)?;
        Some(self.stowed.remove(idx))
    }
}

#[derive(Resource, Debug, Clone, Serialize, Deserialize)]
pub struct PlayerState {
    pub pos: GridPos,
    pub health: f32,
    pub max_health: f32,
    pub thirst: f32,
    pub max_thirst: f32,
    pub hunger: f32,
    pub max_hunger: f32,
    pub sleep: f32,
    pub max_sleep: f32,
    pub afflictions: HashSet<Affliction>,
    pub equipment: EquipmentSlots,
    pub is_busy: bool,
    pub transition: Option<TransitionKind>,
}

impl Default for PlayerState {
    fn default() -> Self {
        Self {
            pos: GridPos::default(),
            health: MAX_VITAL,
            max_health: MAX_VITAL,
            thirst: MAX_VITAL,
            max_thirst: MAX_VITAL,
            hunger: MAX_VITAL,
            max_hunger: MAX_VITAL,
            sleep: MAX_VITAL,
            max_sleep: MAX_VITAL,
            afflictions: HashSet::new(),
            equipment: EquipmentSlots::default(),
            is_busy: false,
            transition: None,
        }
    }
}

impl PlayerState {
    pub fn change_health(&mut self, delta: f32) {
        self.health = (self.health + delta).clamp(0.0, self.max_health);
    }

    pub fn change_thirst(&mut self, delta: f32) {
        self.thirst = (self.thirst + delta).clamp(0.0, self.max_thirst);
    }

    pub fn change_hunger(&mut self, delta: f32) {
        self.hunger = (self.hunger + delta).clamp(0.0, self.max_hunger);
    }

    pub fn change_sleep(&mut self, delta: f32) {
        self.sleep = (self.sleep + delta).clamp(0.0, self.max_sleep);
    }

    /// Free to start a new action? Combat lockout is checked separately
    /// against `ActiveCombat` by the dispatcher.
    pub fn can_act(&self) -> bool {
        !self.is_busy && self.transition.is_none()
    }
}

// ═══════════════════════════════════════════════════════════════════════
// WORLD EVENTS — island-wide modifiers
// ═══════════════════════════════════════════════════════════════════════

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum WorldEventKind {
    #[default]
    None,
    Storm,
    Abundance {
        resource: ItemId,
    },
}

#[derive(Resource, Debug, Clone, Default, Serialize, Deserialize)]
pub struct ActiveEvent {
    pub kind: WorldEventKind,
    pub days_left: u32,
}

impl ActiveEvent {
    pub fn is_active(&self) -> bool {
        self.kind != WorldEventKind::None
    }

    /// Multiplier applied uniformly to every vital's decay.
    pub fn decay_multiplier(&self) -> f32 {
        match self.kind {
            WorldEventKind::Storm => STORM_DECAY_MULT,
            _ => 1.0,
        }
    }

    /// Multiplier applied to a harvest of `item`. Abundance only boosts its
    /// own resource; a storm shuts all harvesting down.
    pub fn yield_multiplier(&self, item: &str) -> u32 {
        match &self.kind {
            WorldEventKind::Storm => 0,
            WorldEventKind::Abundance { resource } if resource == item => 2,
            _ => 1,
        }
    }
}

// ═══════════════════════════════════════════════════════════════════════
// COMBAT
// ═══════════════════════════════════════════════════════════════════════

/// The one combat that may be live at a time. Its presence is part of the
/// player's busy lock.
#[derive(Resource, Debug, Default)]
pub struct ActiveCombat(pub Option<CombatState>);

#[derive(Debug, Clone)]
pub struct CombatState {
    pub enemy: Entity,
    pub is_player_turn: bool,
    pub log: Vec<String>,
    /// Set when the player's health hit zero mid-combat; the end-condition
    /// check converts it into the game over.
    pub pending_defeat: bool,
}

impl ActiveCombat {
    pub fn engaged(&self) -> bool {
        self.0.is_some()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CombatMove {
    Attack,
    Flee,
}

// ═══════════════════════════════════════════════════════════════════════
// SCHEDULED TASKS — everything deferred goes through here
// ═══════════════════════════════════════════════════════════════════════

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum HarvestKind {
    Wood,
    Water,
    Food,
    Stone,
}

/// A timed action's payoff, captured at the moment it was started. The
/// player cannot move while busy, but the tile is recorded anyway so the
/// payoff never depends on later state.
#[derive(Debug, Clone, PartialEq)]
pub enum PendingAction {
    Harvest { kind: HarvestKind, pos: GridPos },
    Build { kind: BuildingKind, pos: GridPos },
    Replant { pos: GridPos },
    Cook { item: ItemId, pos: GridPos },
    Sleep { pos: GridPos },
    Dig { pos: GridPos },
    Search { pos: GridPos },
    Dismantle { pos: GridPos },
}

#[derive(Debug, Clone, PartialEq)]
pub enum TaskPayload {
    FinishAction(PendingAction),
    /// Combat delay 1: the enemy readies its answer.
    CombatTurnResolve,
    /// Combat delay 2: the enemy's strike lands.
    CombatEnemyStrike,
}

#[derive(Debug)]
pub struct ScheduledTask {
    pub timer: Timer,
    pub payload: TaskPayload,
}

/// Ordered queue of deferred work. Ticked once per frame by the action
/// engine; tasks are never cancelled, the `Ended` state simply stops the
/// systems that would consume them.
#[derive(Resource, Debug, Default)]
pub struct ActionSchedule {
    pub tasks: Vec<ScheduledTask>,
}

impl ActionSchedule {
    pub fn after(&mut self, secs: f32, payload: TaskPayload) {
        self.tasks.push(ScheduledTask {
            timer: Timer::from_seconds(secs.max(0.0), TimerMode::Once),
            payload,
        });
    }

    /// Advance every timer and pull out the payloads that came due.
    pub fn tick(&mut self, delta: Duration) -> Vec<TaskPayload> {
        let mut due = Vec::new();
        self.tasks.retain_mut(|task| {
            task.timer.tick(delta);
            if task.timer.just_finished() {
                due.push(task.payload.clone());
                false
            } else {
                true
            }
        });
        due
    }

    pub fn is_idle(&self) -> bool {
        self.tasks.is_empty()
    }
}

/// Coarse ordering for `Update` systems: the schedule ticker publishes due
/// tasks before the resolvers run, so zero-duration timers settle within a
/// single frame.
#[derive(SystemSet, Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SimSet {
    Tick,
    Resolve,
}

// ═══════════════════════════════════════════════════════════════════════
// EVENTS — cross-domain communication
// ═══════════════════════════════════════════════════════════════════════

/// A player intent from the outer layer. One event per intent; the
/// dispatcher decides whether the busy lock lets it through.
#[derive(Event, Debug, Clone, PartialEq)]
pub struct ActionRequest(pub ActionKind);

#[derive(Debug, Clone, PartialEq)]
pub enum ActionKind {
    Harvest(HarvestKind),
    Build { kind: BuildingKind },
    Replant,
    Cook { item: ItemId },
    Sleep,
    Dig,
    Search,
    Dismantle,
    Eat { item: ItemId },
    DrinkWater,
    Equip { item: ItemId },
    Unequip { slot: EquipSlot },
    PickUp,
    Deposit { item: ItemId, amount: u32 },
    Withdraw { item: ItemId, amount: u32 },
    Move { dx: i32, dy: i32 },
    Talk,
}

#[derive(Event, Debug, Clone)]
pub struct CombatCommand(pub CombatMove);

/// Result record for one handled intent. `floating_texts` carry the
/// gain/loss callouts the renderer floats over the scene.
#[derive(Event, Debug, Clone)]
pub struct ActionOutcome {
    pub success: bool,
    pub message: String,
    pub floating_texts: Vec<FloatingText>,
}

impl ActionOutcome {
    pub fn failure(message: impl Into<String>) -> Self {
        Self {
            success: false,
            message: message.into(),
            floating_texts: Vec::new(),
        }
    }

    pub fn success(message: impl Into<String>) -> Self {
        Self {
            success: true,
            message: message.into(),
            floating_texts: Vec::new(),
        }
    }

    pub fn with_float(mut self, text: impl Into<String>, kind: FloatKind, anchor: Vec2) -> Self {
        self.floating_texts.push(FloatingText {
            text: text.into(),
            kind,
            anchor,
        });
        self
    }
}

#[derive(Debug, Clone)]
pub struct FloatingText {
    pub text: String,
    pub kind: FloatKind,
    pub anchor: Vec2,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FloatKind {
    Gain,
    Loss,
    Info,
}

/// A scheduled task that came due this frame, re-published by the schedule
/// ticker so the owning domain can act on it.
#[derive(Event, Debug, Clone)]
pub struct TaskDue(pub TaskPayload);

/// Fired when a timed action's payoff has been applied, so the outer layer
/// refreshes whatever it displays.
#[derive(Event, Debug, Clone)]
pub struct ActionCompleted;

#[derive(Event, Debug, Clone)]
pub struct DayEndEvent {
    pub day: u32,
}

/// One line of the combat log, streamed as it happens.
#[derive(Event, Debug, Clone)]
pub struct CombatEvent {
    pub entry: String,
}

#[derive(Event, Debug, Clone)]
pub struct GameOverEvent(pub OutcomeKind);

// ═══════════════════════════════════════════════════════════════════════
// CONSTANTS
// ═══════════════════════════════════════════════════════════════════════

pub const MAX_VITAL: f32 = 100.0;

/// Harvest yield per action without the matching tool equipped.
pub const BARE_HANDS_YIELD: u32 = 1;
pub const UNARMED_DAMAGE: f32 = 2.0;
pub const WEAPON_WEAR_CHANCE: f64 = 0.25;
pub const FLEE_SUCCESS_CHANCE: f64 = 0.5;

pub const TREASURE_KEY_ITEM: &str = "rusty_key";

pub const AFFLICTIONS_FATAL_COUNT: usize = 4;
/// Below this fraction of max health the player counts as injured.
pub const INJURED_HEALTH_FRACTION: f32 = 0.25;
/// Health lost per decay tick while a vital sits at zero.
pub const STARVATION_HEALTH_DRAIN: f32 = 2.0;

pub const SLEEP_RESTORE: f32 = 45.0;
pub const SLEEP_SHELTER_MULT: f32 = 1.6;

pub const DAILY_EVENT_CHANCE: f64 = 0.3;
pub const EVENT_MIN_DAYS: u32 = 1;
pub const EVENT_MAX_DAYS: u32 = 3;
pub const STORM_DECAY_MULT: f32 = 1.5;
pub const STORM_BUILDING_WEAR: u32 = 10;

pub const NPC_AGGRO_RADIUS: u32 = 3;
pub const NPC_ATTACK_DAMAGE: f32 = 3.0;
pub const NPC_BASE_HEALTH: f32 = 30.0;
pub const NPC_CARRY_CAPACITY: u32 = 20;
/// Wood and stone the survivors try to keep stocked in the camp shelter.
pub const SHELTER_MATERIAL_TARGET: u32 = 30;

/// Bound on random placement retries before falling back to the first
/// accessible tile in scan order.
pub const MAX_PLACEMENT_ATTEMPTS: u32 = 150;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn vitals_clamp_at_bounds() {
        let mut player = PlayerState::default();
        player.change_thirst(50.0);
        assert_eq!(player.thirst, MAX_VITAL);
        player.change_thirst(-500.0);
        assert_eq!(player.thirst, 0.0);
        player.change_health(-30.0);
        player.change_health(-100.0);
        assert_eq!(player.health, 0.0);
    }

    #[test]
    fn consumable_wear_reports_breakage() {
        let mut state = ConsumableState::Durability(2);
        assert!(!state.wear());
        assert!(state.wear());
        assert_eq!(state.remaining(), Some(0));

        let mut none = ConsumableState::None;
        assert!(!none.wear());
        assert_eq!(none.remaining(), None);
    }

    #[test]
    fn equipment_set_returns_displaced_instance() {
        let mut slots = EquipmentSlots::default();
        let first = ItemInstance {
            item: "axe".into(),
            state: ConsumableState::Durability(10),
        };
        let second = ItemInstance {
            item: "pickaxe".into(),
            state: ConsumableState::Durability(25),
        };

        assert!(slots.set(EquipSlot::Tool, Some(first.clone())).is_none());
        let displaced = slots.set(EquipSlot::Tool, Some(second));
        assert_eq!(displaced, Some(first));
    }

    #[test]
    fn stowed_instances_are_recalled_by_id() {
        let mut slots = EquipmentSlots::default();
        slots.stow(ItemInstance {
            item: "axe".into(),
            state: ConsumableState::Durability(7),
        });

        assert!(slots.recall_stowed("pickaxe").is_none());
        let axe = slots.recall_stowed("axe").unwrap();
        assert_eq!(axe.state, ConsumableState::Durability(7));
        assert!(slots.stowed.is_empty());
    }

    #[test]
    fn schedule_tick_releases_due_payloads_once() {
        let mut schedule = ActionSchedule::default();
        schedule.after(0.0, TaskPayload::CombatTurnResolve);
        schedule.after(10.0, TaskPayload::CombatEnemyStrike);

        let due = schedule.tick(Duration::ZERO);
        assert_eq!(due, vec![TaskPayload::CombatTurnResolve]);
        assert_eq!(schedule.tasks.len(), 1);

        let due = schedule.tick(Duration::from_secs(11));
        assert_eq!(due, vec![TaskPayload::CombatEnemyStrike]);
        assert!(schedule.is_idle());
    }

    #[test]
    fn abundance_boosts_only_its_resource() {
        let event = ActiveEvent {
            kind: WorldEventKind::Abundance {
                resource: "wood".into(),
            },
            days_left: 2,
        };
        assert_eq!(event.yield_multiplier("wood"), 2);
        assert_eq!(event.yield_multiplier("stone"), 1);

        let storm = ActiveEvent {
            kind: WorldEventKind::Storm,
            days_left: 1,
        };
        assert_eq!(storm.yield_multiplier("wood"), 0);
        assert!(storm.decay_multiplier() > 1.0);
    }
}
