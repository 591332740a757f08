//! The wildlife catalog, and which kind a zone search can stir up on each
//! terrain.

use crate::entities::{EnemyRegistry, EnemyTemplate};
use crate::shared::*;

pub fn populate_enemies(registry: &mut EnemyRegistry) {
    registry.register(EnemyTemplate {
        id: "wild_boar".into(),
        name: "wild boar".into(),
        health: 18.0,
        damage: 4.0,
        loot: vec![("raw_meat".into(), 2)],
    });
    registry.register(EnemyTemplate {
        id: "reef_crab".into(),
        name: "reef crab".into(),
        health: 10.0,
        damage: 2.0,
        loot: vec![("raw_meat".into(), 1)],
    });
    registry.register(EnemyTemplate {
        id: "pit_viper".into(),
        name: "pit viper".into(),
        health: 8.0,
        damage: 5.0,
        loot: vec![("medicinal_herb".into(), 1), ("raw_meat".into(), 1)],
    });

    registry.encounters.insert(TerrainKind::Plains, "wild_boar".into());
    registry.encounters.insert(TerrainKind::Beach, "reef_crab".into());
    registry.encounters.insert(TerrainKind::Forest, "pit_viper".into());
}
