//! World domain for Tidefall.
//!
//! Responsible for:
//! - The terrain and building definition tables
//! - The `WorldMap` resource: the tile grid and every mutation on it
//!   (terrain swaps, harvest pools, buildings, ground items)
//! - The designated camp shelter the survivors stock and defend
//! - Procedural island generation (see `generation`)
//!
//! Tiles are mutated only through `WorldMap` methods so the pool and
//! transform invariants hold no matter which domain is acting.

use bevy::prelude::*;
use serde::{Deserialize, Serialize};

use crate::economy::Inventory;
use crate::shared::*;

pub mod generation;

// ═══════════════════════════════════════════════════════════════════════
// TERRAIN DEFINITIONS
// ═══════════════════════════════════════════════════════════════════════

#[derive(Debug, Clone)]
pub struct TerrainHarvest {
    pub item: &'static str,
    /// Units one tool-equipped harvest action draws.
    pub per_action: u32,
    /// Initial harvest pool. `None` means the pool never runs dry.
    pub pool: Option<u32>,
    pub tool: Option<ToolKind>,
}

#[derive(Debug, Clone)]
pub struct TerrainDef {
    pub name: &'static str,
    pub accessible: bool,
    /// How many building instances fit on one tile. Zero means nothing may
    /// ever stand here; the per-building allow-lists narrow it further.
    pub building_capacity: usize,
    pub harvest: Option<TerrainHarvest>,
    /// Terrain this tile turns into when its pool is emptied.
    pub exhausted: Option<TerrainKind>,
    pub digs: Option<u32>,
    pub regrow_cost: Option<(&'static str, u32)>,
    pub background_variants: u8,
}

static DEEP_WATER: TerrainDef = TerrainDef {
    name: "open water",
    accessible: false,
    building_capacity: 0,
    harvest: None,
    exhausted: None,
    digs: None,
    regrow_cost: None,
    background_variants: 3,
};

static BEACH: TerrainDef = TerrainDef {
    name: "beach",
    accessible: true,
    building_capacity: 1,
    harvest: Some(TerrainHarvest {
        item: "water",
        per_action: 2,
        pool: Some(12),
        tool: None,
    }),
    exhausted: None,
    digs: Some(3),
    regrow_cost: None,
    background_variants: 3,
};

static FOREST: TerrainDef = TerrainDef {
    name: "forest",
    accessible: true,
    building_capacity: 0,
    harvest: Some(TerrainHarvest {
        item: "wood",
        per_action: 3,
        pool: Some(15),
        tool: Some(ToolKind::Axe),
    }),
    exhausted: Some(TerrainKind::ForestCleared),
    digs: None,
    regrow_cost: None,
    background_variants: 3,
};

static FOREST_CLEARED: TerrainDef = TerrainDef {
    name: "cleared forest",
    accessible: true,
    building_capacity: 2,
    harvest: None,
    exhausted: None,
    digs: None,
    regrow_cost: Some(("sapling", 1)),
    background_variants: 2,
};

static PLAINS: TerrainDef = TerrainDef {
    name: "plains",
    accessible: true,
    building_capacity: 2,
    harvest: Some(TerrainHarvest {
        item: "berries",
        per_action: 2,
        pool: Some(8),
        tool: None,
    }),
    exhausted: None,
    digs: None,
    regrow_cost: None,
    background_variants: 3,
};

static STONE_DEPOSIT: TerrainDef = TerrainDef {
    name: "stone deposit",
    accessible: true,
    building_capacity: 0,
    harvest: Some(TerrainHarvest {
        item: "stone",
        per_action: 2,
        pool: Some(10),
        tool: Some(ToolKind::Pickaxe),
    }),
    exhausted: Some(TerrainKind::Plains),
    digs: None,
    regrow_cost: None,
    background_variants: 2,
};

static SHELTER: TerrainDef = TerrainDef {
    name: "shelter",
    accessible: true,
    building_capacity: 0,
    harvest: None,
    exhausted: None,
    digs: None,
    regrow_cost: None,
    background_variants: 1,
};

static TREASURE: TerrainDef = TerrainDef {
    name: "treasure mound",
    accessible: true,
    building_capacity: 0,
    harvest: None,
    exhausted: None,
    digs: None,
    regrow_cost: None,
    background_variants: 1,
};

impl TerrainKind {
    pub fn def(self) -> &'static TerrainDef {
        match self {
            TerrainKind::DeepWater => &DEEP_WATER,
            TerrainKind::Beach => &BEACH,
            TerrainKind::Forest => &FOREST,
            TerrainKind::ForestCleared => &FOREST_CLEARED,
            TerrainKind::Plains => &PLAINS,
            TerrainKind::StoneDeposit => &STONE_DEPOSIT,
            TerrainKind::Shelter => &SHELTER,
            TerrainKind::Treasure => &TREASURE,
        }
    }

    pub fn is_accessible(self) -> bool {
        self.def().accessible
    }
}

// ═══════════════════════════════════════════════════════════════════════
// BUILDING DEFINITIONS
// ═══════════════════════════════════════════════════════════════════════

#[derive(Debug, Clone)]
pub struct BuildingDef {
    pub name: &'static str,
    pub cost: &'static [(&'static str, u32)],
    pub build_secs: f32,
    pub durability: u32,
    pub has_inventory: bool,
    pub inventory_capacity: u32,
    pub allowed_on: &'static [TerrainKind],
    /// Set for constructions that become terrain instead of an instance.
    pub transforms_to: Option<TerrainKind>,
}

static INDIVIDUAL_SHELTER: BuildingDef = BuildingDef {
    name: "lean-to",
    cost: &[("wood", 20)],
    build_secs: 6.0,
    durability: 0,
    has_inventory: false,
    inventory_capacity: 0,
    allowed_on: &[TerrainKind::Plains, TerrainKind::ForestCleared, TerrainKind::Beach],
    transforms_to: Some(TerrainKind::Shelter),
};

static COLLECTIVE_SHELTER: BuildingDef = BuildingDef {
    name: "camp shelter",
    cost: &[("wood", 35), ("stone", 10)],
    build_secs: 10.0,
    durability: 100,
    has_inventory: true,
    inventory_capacity: 200,
    allowed_on: &[TerrainKind::Plains, TerrainKind::ForestCleared],
    transforms_to: None,
};

static CAMPFIRE: BuildingDef = BuildingDef {
    name: "campfire",
    cost: &[("wood", 5), ("stone", 5)],
    build_secs: 3.0,
    durability: 20,
    has_inventory: false,
    inventory_capacity: 0,
    allowed_on: &[TerrainKind::Plains, TerrainKind::ForestCleared, TerrainKind::Beach],
    transforms_to: None,
};

impl BuildingKind {
    pub fn def(self) -> &'static BuildingDef {
        match self {
            BuildingKind::IndividualShelter => &INDIVIDUAL_SHELTER,
            BuildingKind::CollectiveShelter => &COLLECTIVE_SHELTER,
            BuildingKind::Campfire => &CAMPFIRE,
        }
    }
}

// ═══════════════════════════════════════════════════════════════════════
// TILES
// ═══════════════════════════════════════════════════════════════════════

/// What a tile currently yields per harvest action.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TileResource {
    pub item: ItemId,
    pub per_action: u32,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Building {
    pub kind: BuildingKind,
    pub durability: u32,
    pub max_durability: u32,
    pub inventory: Option<Inventory>,
    pub is_locked: bool,
}

impl Building {
    pub fn from_def(kind: BuildingKind) -> Self {
        let def = kind.def();
        Self {
            kind,
            durability: def.durability,
            max_durability: def.durability,
            inventory: def.has_inventory.then(Inventory::default),
            is_locked: false,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Tile {
    pub terrain: TerrainKind,
    /// Remaining harvest units. `None` = bottomless.
    pub harvests_left: Option<u32>,
    pub resource: Option<TileResource>,
    pub digs_left: Option<u32>,
    pub buildings: Vec<Building>,
    pub ground_items: Inventory,
    pub hidden_item: Option<ItemId>,
    /// Whether a treasure cache here has already been opened.
    pub is_opened: bool,
    pub background_key: u8,
}

impl Tile {
    pub fn from_terrain(terrain: TerrainKind) -> Self {
        let def = terrain.def();
        Self {
            terrain,
            harvests_left: def.harvest.as_ref().and_then(|h| h.pool),
            resource: def.harvest.as_ref().map(|h| TileResource {
                item: h.item.to_string(),
                per_action: h.per_action,
            }),
            digs_left: def.digs,
            buildings: Vec::new(),
            ground_items: Inventory::default(),
            hidden_item: None,
            is_opened: false,
            background_key: 0,
        }
    }

    pub fn building(&self, kind: BuildingKind) -> Option<&Building> {
        self.buildings.iter().find(|b| b.kind == kind)
    }

    pub fn building_mut(&mut self, kind: BuildingKind) -> Option<&mut Building> {
        self.buildings.iter_mut().find(|b| b.kind == kind)
    }

    pub fn has_building(&self, kind: BuildingKind) -> bool {
        self.building(kind).is_some()
    }
}

// ═══════════════════════════════════════════════════════════════════════
// WORLD MAP RESOURCE
// ═══════════════════════════════════════════════════════════════════════

/// The island grid, row-major. `spawn` is where the castaway washed up.
#[derive(Resource, Debug, Clone, Default, Serialize, Deserialize)]
pub struct WorldMap {
    pub width: usize,
    pub height: usize,
    pub tiles: Vec<Tile>,
    pub spawn: GridPos,
}

impl WorldMap {
    /// A fresh all-water grid for generation to carve land out of.
    pub fn new(width: usize, height: usize) -> Self {
        Self {
            width,
            height,
            tiles: (0..width * height)
                .map(|_| Tile::from_terrain(TerrainKind::DeepWater))
                .collect(),
            spawn: GridPos::default(),
        }
    }

    fn index(&self, pos: GridPos) -> Option<usize> {
        if pos.x < 0 || pos.y < 0 {
            return None;
        }
        let (x, y) = (pos.x as usize, pos.y as usize);
        if x >= self.width || y >= self.height {
            return None;
        }
        Some(y * self.width + x)
    }

    pub fn in_bounds(&self, pos: GridPos) -> bool {
        self.index(pos).is_some()
    }

    pub fn get(&self, pos: GridPos) -> Option<&Tile> {
        self.index(pos).map(|i| &self.tiles[i])
    }

    pub fn get_mut(&mut self, pos: GridPos) -> Option<&mut Tile> {
        self.index(pos).map(|i| &mut self.tiles[i])
    }

    /// Terrain with an out-of-bounds sentinel: everything beyond the grid
    /// is open water.
    pub fn terrain(&self, pos: GridPos) -> TerrainKind {
        self.get(pos).map_or(TerrainKind::DeepWater, |t| t.terrain)
    }

    pub fn is_accessible(&self, pos: GridPos) -> bool {
        self.get(pos).is_some_and(|t| t.terrain.is_accessible())
    }

    pub fn neighbors4(pos: GridPos) -> [GridPos; 4] {
        [
            pos.offset(0, -1),
            pos.offset(0, 1),
            pos.offset(-1, 0),
            pos.offset(1, 0),
        ]
    }

    /// Every position in scan order (row by row, left to right). Scan order
    /// is the universal tie-breaker for "first" and "nearest" rules.
    pub fn positions(&self) -> impl Iterator<Item = GridPos> + '_ {
        let width = self.width;
        (0..self.height).flat_map(move |y| (0..width).map(move |x| GridPos::new(x as i32, y as i32)))
    }

    // ─── Mutations ──────────────────────────────────────────────────────

    /// Swap a tile's terrain, reseeding harvest pool, resource, and dig
    /// quota from the new definition. Buildings and ground items survive.
    pub fn update_tile_kind(&mut self, pos: GridPos, kind: TerrainKind) {
        let Some(tile) = self.get_mut(pos) else {
            warn!("[World] Terrain swap at out-of-bounds {pos:?} ignored");
            return;
        };
        let def = kind.def();
        tile.terrain = kind;
        tile.harvests_left = def.harvest.as_ref().and_then(|h| h.pool);
        tile.resource = def.harvest.as_ref().map(|h| TileResource {
            item: h.item.to_string(),
            per_action: h.per_action,
        });
        tile.digs_left = def.digs;
    }

    /// Draw up to `want` units from the tile's harvest pool, returning what
    /// actually came out. Crossing to an empty pool applies the terrain's
    /// exhaustion transform, exactly once.
    pub fn draw_harvest(&mut self, pos: GridPos, want: u32) -> u32 {
        let Some(tile) = self.get_mut(pos) else {
            warn!("[World] Harvest draw at out-of-bounds {pos:?}");
            return 0;
        };
        if tile.resource.is_none() {
            warn!("[World] Harvest draw on a {} tile with no resource", tile.terrain.def().name);
            return 0;
        }
        let mut exhausted_to = None;
        let taken = match tile.harvests_left {
            None => want,
            Some(left) => {
                let taken = want.min(left);
                let rest = left - taken;
                tile.harvests_left = Some(rest);
                if taken > 0 && rest == 0 {
                    exhausted_to = tile.terrain.def().exhausted;
                }
                taken
            }
        };
        if let Some(next) = exhausted_to {
            info!("[World] Tile at {pos:?} is spent and becomes {}", next.def().name);
            self.update_tile_kind(pos, next);
        }
        taken
    }

    /// Attach a building instance. Placement is validated by the action
    /// layer; violations here are logged and refused.
    pub fn add_building(&mut self, pos: GridPos, kind: BuildingKind) -> bool {
        let Some(tile) = self.get_mut(pos) else {
            warn!("[World] Building placement at out-of-bounds {pos:?}");
            return false;
        };
        let terrain_def = tile.terrain.def();
        let allowed = kind.def().allowed_on.contains(&tile.terrain);
        if !allowed || tile.buildings.len() >= terrain_def.building_capacity {
            warn!(
                "[World] Refused {} on a {} tile ({} of {} slots used)",
                kind.def().name,
                terrain_def.name,
                tile.buildings.len(),
                terrain_def.building_capacity,
            );
            return false;
        }
        tile.buildings.push(Building::from_def(kind));
        true
    }

    /// Wear one building down by `amount`. On destruction the building is
    /// removed and its stored items spill onto the tile. Returns the kind
    /// if it was destroyed.
    pub fn damage_building(
        &mut self,
        pos: GridPos,
        index: usize,
        amount: u32,
    ) -> Option<BuildingKind> {
        let Some(tile) = self.get_mut(pos) else {
            return None;
        };
        let Some(building) = tile.buildings.get_mut(index) else {
            warn!("[World] Damage to missing building {index} at {pos:?}");
            return None;
        };
        building.durability = building.durability.saturating_sub(amount);
        if building.durability > 0 {
            return None;
        }
        self.spill_and_remove(pos, index)
    }

    /// Tear a building down deliberately, spilling its contents.
    pub fn remove_building(&mut self, pos: GridPos, index: usize) -> Option<BuildingKind> {
        let removed = self.spill_and_remove(pos, index);
        if removed.is_none() {
            warn!("[World] Removal of missing building {index} at {pos:?}");
        }
        removed
    }

    fn spill_and_remove(&mut self, pos: GridPos, index: usize) -> Option<BuildingKind> {
        let tile = self.get_mut(pos)?;
        if index >= tile.buildings.len() {
            return None;
        }
        let mut building = tile.buildings.remove(index);
        if let Some(stored) = building.inventory.as_mut() {
            stored.drain_into(&mut tile.ground_items);
        }
        Some(building.kind)
    }

    /// First standing camp shelter in scan order, for designation handoff.
    pub fn find_collective_shelter(&self) -> Option<GridPos> {
        self.positions()
            .find(|&p| self.get(p).is_some_and(|t| t.has_building(BuildingKind::CollectiveShelter)))
    }
}

// ═══════════════════════════════════════════════════════════════════════
// SHELTER REGISTRY
// ═══════════════════════════════════════════════════════════════════════

/// Where the survivors' designated camp shelter stands, if anywhere. The
/// first camp shelter built claims the designation; when it falls, the
/// next one in scan order inherits it.
#[derive(Resource, Debug, Clone, Default, Serialize, Deserialize)]
pub struct ShelterRegistry {
    pub designated: Option<GridPos>,
}

impl ShelterRegistry {
    /// Re-derive the designation after a shelter was lost at `fallen`.
    pub fn on_shelter_lost(&mut self, fallen: GridPos, map: &WorldMap) {
        if self.designated == Some(fallen) {
            self.designated = map.find_collective_shelter();
            match self.designated {
                Some(next) => info!("[World] Camp shelter designation moved to {next:?}"),
                None => info!("[World] The survivors have no camp shelter left"),
            }
        }
    }

    pub fn on_shelter_built(&mut self, pos: GridPos) {
        if self.designated.is_none() {
            self.designated = Some(pos);
        }
    }
}

// ═══════════════════════════════════════════════════════════════════════
// PLUGIN
// ═══════════════════════════════════════════════════════════════════════

pub struct WorldPlugin;

impl Plugin for WorldPlugin {
    fn build(&self, app: &mut App) {
        app.init_resource::<WorldMap>()
            .init_resource::<ShelterRegistry>()
            // The island is carved the moment the run starts.
            .add_systems(OnEnter(GameState::Running), generation::generate_world);
    }
}
