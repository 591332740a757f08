//! Components and templates for the island's population: the survivors who
//! share the camp, and the wildlife that wants everyone gone.

use bevy::prelude::*;
use rand::Rng;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

use crate::economy::Inventory;
use crate::shared::*;

// ─── Survivors ──────────────────────────────────────────────────────────

/// What a survivor is trying to do this tick, re-derived every tick in
/// strict priority order (fight > deposit > gather for camp > forage).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum NpcGoal {
    #[default]
    Harvesting,
    GatheringMaterials,
    Depositing,
    Fighting,
}

#[derive(Component, Debug, Clone)]
pub struct Npc {
    pub name: String,
    pub health: f32,
    pub inventory: Inventory,
    pub capacity: u32,
    pub goal: NpcGoal,
    /// Resource the camp currently needs, when gathering for it.
    pub target_resource: Option<ItemId>,
    pub target_enemy: Option<Entity>,
    pub available_quest: Option<QuestDef>,
    pub active_quest: Option<QuestDef>,
}

impl Npc {
    pub fn new(name: &str) -> Self {
        Self {
            name: name.to_string(),
            health: NPC_BASE_HEALTH,
            inventory: Inventory::default(),
            capacity: NPC_CARRY_CAPACITY,
            goal: NpcGoal::default(),
            target_resource: None,
            target_enemy: None,
            available_quest: None,
            active_quest: None,
        }
    }
}

// ─── Wildlife ───────────────────────────────────────────────────────────

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EnemyTemplate {
    pub id: String,
    pub name: String,
    pub health: f32,
    pub damage: f32,
    pub loot: Vec<(ItemId, u32)>,
}

#[derive(Component, Debug, Clone)]
pub struct Enemy {
    pub name: String,
    pub health: f32,
    pub max_health: f32,
    pub damage: f32,
    pub loot: Vec<(ItemId, u32)>,
    /// Conjured by a zone search rather than roaming the map; it vanishes
    /// again if the player escapes the fight.
    pub is_search_encounter: bool,
}

impl Enemy {
    pub fn from_template(template: &EnemyTemplate, is_search_encounter: bool) -> Self {
        Self {
            name: template.name.clone(),
            health: template.health,
            max_health: template.health,
            damage: template.damage,
            loot: template.loot.clone(),
            is_search_encounter,
        }
    }
}

#[derive(Resource, Debug, Clone, Default)]
pub struct EnemyRegistry {
    pub templates: HashMap<String, EnemyTemplate>,
    /// Which template a hostile search encounter spawns, per terrain.
    pub encounters: HashMap<TerrainKind, String>,
}

impl EnemyRegistry {
    pub fn register(&mut self, template: EnemyTemplate) {
        if self
            .templates
            .insert(template.id.clone(), template)
            .is_some()
        {
            warn!("[Data] Duplicate enemy template overwrote an entry");
        }
    }

    pub fn get(&self, id: &str) -> Option<&EnemyTemplate> {
        self.templates.get(id)
    }

    pub fn encounter_for(&self, terrain: TerrainKind) -> Option<&EnemyTemplate> {
        self.encounters.get(&terrain).and_then(|id| self.get(id))
    }
}

// ─── Quests ─────────────────────────────────────────────────────────────

/// A favor a survivor asks of the player: bring `wanted`, get `reward`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct QuestDef {
    pub description: String,
    pub wanted: (ItemId, u32),
    pub reward: (ItemId, u32),
}

/// Quest pool: (description, wanted item, amount, reward item, amount).
const QUEST_POOL: &[(&str, &str, u32, &str, u32)] = &[
    ("Bring me wood to reinforce my bedding", "wood", 8, "grilled_fish", 2),
    ("I need berries for a tonic", "berries", 5, "medicinal_herb", 1),
    ("Stone for a proper fire pit, please", "stone", 6, "flint_knife", 1),
    ("Fetch water for the little ones", "water", 4, "old_coin", 2),
];

pub fn roll_quest(rng: &mut impl Rng) -> QuestDef {
    let (description, wanted, wanted_n, reward, reward_n) =
        QUEST_POOL[rng.gen_range(0..QUEST_POOL.len())];
    QuestDef {
        description: description.to_string(),
        wanted: (wanted.to_string(), wanted_n),
        reward: (reward.to_string(), reward_n),
    }
}

pub const SURVIVOR_NAMES: &[&str] = &["Maren", "Odile", "Bastien", "Ronan", "Ilsa", "Sel"];
