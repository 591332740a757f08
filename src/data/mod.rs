//! Data layer — populates the item and enemy catalogs at startup.
//!
//! Runs in OnEnter(GameState::Loading), fills ItemRegistry and
//! EnemyRegistry from the hard-coded tables in the submodules, then
//! advances to GameState::Running, where the island is generated and
//! populated on top of them.
//!
//! No other domain seeds these resources; everything downstream reads
//! them once GameState has advanced past Loading.

mod enemies;
mod items;

use bevy::prelude::*;

use crate::entities::EnemyRegistry;
use crate::shared::*;

pub struct DataPlugin;

impl Plugin for DataPlugin {
    fn build(&self, app: &mut App) {
        app.add_systems(OnEnter(GameState::Loading), load_all_data);
    }
}

/// Single system that populates every catalog and then leaves Loading.
fn load_all_data(
    mut item_registry: ResMut<ItemRegistry>,
    mut enemy_registry: ResMut<EnemyRegistry>,
    mut next_state: ResMut<NextState<GameState>>,
) {
    info!("[Data] Populating registries");

    items::populate_items(&mut item_registry);
    info!("  Items loaded: {}", item_registry.items.len());

    enemies::populate_enemies(&mut enemy_registry);
    info!(
        "  Enemy templates loaded: {} ({} terrain encounters)",
        enemy_registry.templates.len(),
        enemy_registry.encounters.len()
    );

    next_state.set(GameState::Running);
}
