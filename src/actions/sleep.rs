//! Sleeping off the day. Cover matters: a roof scales the restore up.

use crate::shared::*;
use crate::world::WorldMap;

pub fn finish_sleep(
    pos: GridPos,
    player: &mut PlayerState,
    map: &WorldMap,
    config: &SimConfig,
) -> ActionOutcome {
    let sheltered = map.terrain(pos) == TerrainKind::Shelter
        || map
            .get(pos)
            .is_some_and(|tile| tile.has_building(BuildingKind::CollectiveShelter));
    let restore = if sheltered {
        SLEEP_RESTORE * SLEEP_SHELTER_MULT
    } else {
        SLEEP_RESTORE
    };

    let before = player.sleep;
    player.change_sleep(restore);
    let gained = player.sleep - before;

    let message = if sheltered {
        "You sleep soundly under cover."
    } else {
        "You sleep fitfully in the open."
    };
    ActionOutcome::success(message).with_float(
        format!("+{gained:.0} sleep"),
        FloatKind::Gain,
        pos.anchor(config.tile_size),
    )
}
