//! Headless integration tests for Tidefall.
//!
//! These tests drive the full simulation app: every plugin from `main.rs`,
//! ticked with Bevy's `MinimalPlugins`. The config comes from
//! `SimConfig::instant()`, so timed actions land on the very next frame
//! while the autonomous clocks (day, decay, survivor tick) stay quiet
//! unless a test arms them explicitly.
//!
//! Run with: `cargo test --test headless`

use bevy::prelude::*;
use bevy::state::app::StatesPlugin;

use tidefall::actions::{ActionsPlugin, HARVEST_COST};
use tidefall::combat::CombatPlugin;
use tidefall::data::DataPlugin;
use tidefall::economy::Inventory;
use tidefall::entities::{Enemy, EnemyRegistry, EntityPlugin, Npc, NpcGoal, QuestDef};
use tidefall::npc::NpcPlugin;
use tidefall::shared::*;
use tidefall::sim::{GameClock, SimPlugin};
use tidefall::world::{ShelterRegistry, WorldMap, WorldPlugin};

// ─────────────────────────────────────────────────────────────────────────────
// Test App Builder
// ─────────────────────────────────────────────────────────────────────────────

/// Builds the whole simulation app, mirroring `main.rs` minus the schedule
/// runner and log output. The caller picks the config so individual tests
/// can arm the clocks they care about.
fn build_test_app(config: SimConfig) -> App {
    let mut app = App::new();
    app.add_plugins(MinimalPlugins);
    app.add_plugins(StatesPlugin);

    // ── Game State ───────────────────────────────────────────────────────
    app.init_state::<GameState>();

    // ── Shared Resources (mirrors main.rs) ───────────────────────────────
    app.insert_resource(config);
    app.init_resource::<PlayerState>()
        .init_resource::<Inventory>()
        .init_resource::<ItemRegistry>()
        .init_resource::<ActiveEvent>()
        .init_resource::<GameOutcome>();

    // ── Shared Events (mirrors main.rs) ──────────────────────────────────
    app.add_event::<ActionRequest>()
        .add_event::<ActionOutcome>()
        .add_event::<ActionCompleted>()
        .add_event::<CombatCommand>()
        .add_event::<CombatEvent>()
        .add_event::<TaskDue>()
        .add_event::<DayEndEvent>()
        .add_event::<GameOverEvent>();

    // ── Domain Plugins ───────────────────────────────────────────────────
    app.add_plugins(WorldPlugin)
        .add_plugins(EntityPlugin)
        .add_plugins(ActionsPlugin)
        .add_plugins(CombatPlugin)
        .add_plugins(NpcPlugin)
        .add_plugins(SimPlugin)
        .add_plugins(DataPlugin);

    app
}

/// First update loads the catalogs inside `Loading`; the second applies the
/// transition to `Running`, carving the island and spawning the population.
fn boot(app: &mut App) {
    app.update();
    app.update();
}

/// Remove every spawned survivor and wild animal so a test can stage its
/// own population on a controlled map.
fn clear_population(app: &mut App) {
    let mut roster = app
        .world_mut()
        .query_filtered::<Entity, Or<(With<Npc>, With<Enemy>)>>();
    let found: Vec<Entity> = roster.iter(app.world()).collect();
    for entity in found {
        app.world_mut().despawn(entity);
    }
}

fn send_action(app: &mut App, kind: ActionKind) {
    app.world_mut().send_event(ActionRequest(kind));
}

// ─────────────────────────────────────────────────────────────────────────────
// Boot
// ─────────────────────────────────────────────────────────────────────────────

#[test]
fn test_boot_reaches_running_with_catalogs_island_and_population() {
    let mut app = build_test_app(SimConfig::instant());
    boot(&mut app);

    let state = app.world().resource::<State<GameState>>();
    assert_eq!(
        state.get(),
        &GameState::Running,
        "Expected to reach Running after loading data"
    );

    let items = app.world().resource::<ItemRegistry>().items.len();
    assert!(items > 0, "Item catalog should be populated during boot");
    let enemies = app.world().resource::<EnemyRegistry>().templates.len();
    assert!(enemies > 0, "Enemy catalog should be populated during boot");

    let config = app.world().resource::<SimConfig>().clone();
    let map = app.world().resource::<WorldMap>();
    assert_eq!(map.width, config.map_width);
    assert_eq!(map.height, config.map_height);
    assert!(map.is_accessible(map.spawn), "Spawn tile must be walkable");

    let player = app.world().resource::<PlayerState>();
    assert_eq!(player.pos, map.spawn, "The castaway starts at the spawn tile");
    assert!(
        player.equipment.equipped(EquipSlot::Tool).is_some(),
        "The castaway starts with an axe in hand"
    );
    let inventory = app.world().resource::<Inventory>();
    assert_eq!(inventory.count("berries"), 3);
    assert_eq!(inventory.count("water"), 2);

    let mut survivors = app.world_mut().query_filtered::<Entity, With<Npc>>();
    assert_eq!(survivors.iter(app.world()).count(), config.npc_count);
    let mut wildlife = app.world_mut().query_filtered::<Entity, With<Enemy>>();
    assert_eq!(wildlife.iter(app.world()).count(), config.enemy_count);

    let clock = app.world().resource::<GameClock>();
    assert_eq!(clock.day, 1, "The run opens on day 1");

    // Smoke: a frame budget in Running without panic.
    for _ in 0..60 {
        app.update();
    }
    let state = app.world().resource::<State<GameState>>();
    assert_eq!(state.get(), &GameState::Running);
}

// ─────────────────────────────────────────────────────────────────────────────
// Harvesting
// ─────────────────────────────────────────────────────────────────────────────

#[test]
fn test_harvest_drains_the_pool_and_clears_the_forest() {
    let mut app = build_test_app(SimConfig::instant());
    boot(&mut app);

    let spawn = app.world().resource::<WorldMap>().spawn;
    app.world_mut()
        .resource_mut::<WorldMap>()
        .update_tile_kind(spawn, TerrainKind::Forest);

    // Five axe harvests of 3 wood each empty the 15-unit pool.
    for _ in 0..5 {
        send_action(&mut app, ActionKind::Harvest(HarvestKind::Wood));
        app.update(); // dispatch: charge vitals, lock, schedule
        app.update(); // timer lands: payoff applied, lock released
    }

    let inventory = app.world().resource::<Inventory>();
    assert_eq!(inventory.count("wood"), 15);

    let map = app.world().resource::<WorldMap>();
    assert_eq!(
        map.terrain(spawn),
        TerrainKind::ForestCleared,
        "An emptied forest becomes a clearing"
    );

    let player = app.world().resource::<PlayerState>();
    assert!(!player.is_busy);
    assert_eq!(player.thirst, MAX_VITAL - 5.0 * HARVEST_COST.thirst);
    assert_eq!(player.sleep, MAX_VITAL - 5.0 * HARVEST_COST.sleep);
    assert_eq!(
        player.equipment.equipped(EquipSlot::Tool).map(|i| i.state),
        Some(ConsumableState::Durability(20)),
        "Each tooled harvest wears the axe by one"
    );

    // The clearing has no trees left; the refusal charges nothing.
    let thirst_before = player.thirst;
    send_action(&mut app, ActionKind::Harvest(HarvestKind::Wood));
    app.update();
    let player = app.world().resource::<PlayerState>();
    assert!(!player.is_busy);
    assert_eq!(player.thirst, thirst_before);
}

#[test]
fn test_parched_castaway_cannot_start_a_harvest() {
    let mut app = build_test_app(SimConfig::instant());
    boot(&mut app);

    let spawn = app.world().resource::<WorldMap>().spawn;
    app.world_mut()
        .resource_mut::<WorldMap>()
        .update_tile_kind(spawn, TerrainKind::Forest);
    {
        let mut player = app.world_mut().resource_mut::<PlayerState>();
        player.thirst = HARVEST_COST.thirst - 1.0;
    }

    send_action(&mut app, ActionKind::Harvest(HarvestKind::Wood));
    app.update();
    app.update();

    let player = app.world().resource::<PlayerState>();
    assert!(!player.is_busy, "A refused action must not lock the player");
    assert_eq!(player.thirst, HARVEST_COST.thirst - 1.0);
    assert_eq!(app.world().resource::<Inventory>().count("wood"), 0);
    let map = app.world().resource::<WorldMap>();
    assert_eq!(
        map.get(spawn).unwrap().harvests_left,
        Some(15),
        "A refused action must leave the pool untouched"
    );
}

// ─────────────────────────────────────────────────────────────────────────────
// Equipment
// ─────────────────────────────────────────────────────────────────────────────

#[test]
fn test_equipment_round_trip_preserves_wear() {
    let mut app = build_test_app(SimConfig::instant());
    boot(&mut app);

    {
        let mut inventory = app.world_mut().resource_mut::<Inventory>();
        inventory.add("wooden_club", 1);
    }

    send_action(&mut app, ActionKind::Equip { item: "wooden_club".into() });
    app.update();
    {
        let player = app.world().resource::<PlayerState>();
        let weapon = player.equipment.equipped(EquipSlot::Weapon);
        assert_eq!(weapon.map(|i| i.item.as_str()), Some("wooden_club"));
        assert_eq!(app.world().resource::<Inventory>().count("wooden_club"), 0);
    }

    // Batter the club, then put it away and take it back out.
    {
        let mut player = app.world_mut().resource_mut::<PlayerState>();
        player
            .equipment
            .equipped_mut(EquipSlot::Weapon)
            .unwrap()
            .state = ConsumableState::Durability(9);
    }
    send_action(&mut app, ActionKind::Unequip { slot: EquipSlot::Weapon });
    app.update();
    {
        let player = app.world().resource::<PlayerState>();
        assert!(player.equipment.equipped(EquipSlot::Weapon).is_none());
        assert_eq!(app.world().resource::<Inventory>().count("wooden_club"), 1);
    }

    send_action(&mut app, ActionKind::Equip { item: "wooden_club".into() });
    app.update();
    let player = app.world().resource::<PlayerState>();
    assert_eq!(
        player.equipment.equipped(EquipSlot::Weapon).map(|i| i.state),
        Some(ConsumableState::Durability(9)),
        "Re-equipping must recall the worn instance, not mint a fresh one"
    );
}

// ─────────────────────────────────────────────────────────────────────────────
// Building and storage
// ─────────────────────────────────────────────────────────────────────────────

#[test]
fn test_building_the_camp_shelter_claims_designation_and_opens_storage() {
    let mut app = build_test_app(SimConfig::instant());
    boot(&mut app);

    let spawn = app.world().resource::<WorldMap>().spawn;
    app.world_mut()
        .resource_mut::<WorldMap>()
        .update_tile_kind(spawn, TerrainKind::Plains);
    {
        let mut inventory = app.world_mut().resource_mut::<Inventory>();
        inventory.add("wood", 40);
        inventory.add("stone", 10);
    }

    send_action(&mut app, ActionKind::Build { kind: BuildingKind::CollectiveShelter });
    app.update(); // materials are charged when the work starts
    {
        let inventory = app.world().resource::<Inventory>();
        assert_eq!(inventory.count("wood"), 5);
        assert_eq!(inventory.count("stone"), 0);
        assert!(app.world().resource::<PlayerState>().is_busy);
    }
    app.update(); // the build lands

    let map = app.world().resource::<WorldMap>();
    assert!(map.get(spawn).unwrap().has_building(BuildingKind::CollectiveShelter));
    assert_eq!(
        app.world().resource::<ShelterRegistry>().designated,
        Some(spawn),
        "The first camp shelter claims the designation"
    );
    assert!(!app.world().resource::<PlayerState>().is_busy);

    // The stores open for business on the same tile.
    send_action(&mut app, ActionKind::Deposit { item: "wood".into(), amount: 5 });
    app.update();
    send_action(&mut app, ActionKind::Withdraw { item: "wood".into(), amount: 2 });
    app.update();

    let inventory = app.world().resource::<Inventory>();
    assert_eq!(inventory.count("wood"), 2);
    let map = app.world().resource::<WorldMap>();
    let stored = map
        .get(spawn)
        .and_then(|t| t.building(BuildingKind::CollectiveShelter))
        .and_then(|b| b.inventory.as_ref())
        .map(|inv| inv.count("wood"));
    assert_eq!(stored, Some(3));
}

// ─────────────────────────────────────────────────────────────────────────────
// Sleep
// ─────────────────────────────────────────────────────────────────────────────

#[test]
fn test_sleeping_rough_restores_some_rest() {
    let mut app = build_test_app(SimConfig::instant());
    boot(&mut app);

    {
        let mut player = app.world_mut().resource_mut::<PlayerState>();
        player.sleep = 40.0;
    }

    send_action(&mut app, ActionKind::Sleep);
    app.update();
    assert!(app.world().resource::<PlayerState>().is_busy);
    app.update();

    let player = app.world().resource::<PlayerState>();
    assert!(!player.is_busy);
    assert_eq!(player.transition, None);
    assert_eq!(
        player.sleep,
        40.0 + SLEEP_RESTORE,
        "Sleeping in the open restores the flat amount"
    );
}

// ─────────────────────────────────────────────────────────────────────────────
// Combat
// ─────────────────────────────────────────────────────────────────────────────

/// Clear the map, stage a lone opponent one step east of spawn, and walk
/// the castaway into it. Returns the den tile and the opponent's entity.
fn stage_fight(app: &mut App, enemy: Enemy) -> (GridPos, Entity) {
    clear_population(app);
    let spawn = app.world().resource::<WorldMap>().spawn;
    let den = spawn.offset(1, 0);
    app.world_mut()
        .resource_mut::<WorldMap>()
        .update_tile_kind(den, TerrainKind::Plains);
    let beast = app.world_mut().spawn((enemy, den)).id();
    send_action(app, ActionKind::Move { dx: 1, dy: 0 });
    app.update();
    (den, beast)
}

/// Call for an escape until one lands. A failed attempt hands the opponent
/// its turn, so the loop rides out the answering strike before trying again.
fn flee_until_escaped(app: &mut App) {
    for _ in 0..64 {
        app.world_mut().send_event(CombatCommand(CombatMove::Flee));
        app.update(); // the coin is tossed
        let combat = app.world().resource::<ActiveCombat>();
        let Some(state) = combat.0.as_ref() else {
            return;
        };
        assert!(
            !state.is_player_turn,
            "A failed escape must hand the opponent its turn"
        );
        app.update(); // the opponent winds up
        app.update(); // the strike lands, the turn comes back
    }
    panic!("sixty-four escape attempts all failed; the coin is broken");
}

#[test]
fn test_walking_into_wildlife_locks_the_player_into_combat() {
    let mut app = build_test_app(SimConfig::instant());
    boot(&mut app);

    let (den, _crab) = stage_fight(
        &mut app,
        Enemy {
            name: "reef crab".into(),
            health: 10.0,
            max_health: 10.0,
            damage: 2.0,
            loot: vec![("raw_meat".into(), 1)],
            is_search_encounter: false,
        },
    );

    assert!(app.world().resource::<ActiveCombat>().engaged());
    let player = app.world().resource::<PlayerState>();
    assert_eq!(player.pos, den);
    assert!(player.is_busy, "Combat is part of the busy lock");

    // The lock holds: a step asked for mid-fight is dropped.
    send_action(&mut app, ActionKind::Move { dx: -1, dy: 0 });
    app.update();
    assert_eq!(app.world().resource::<PlayerState>().pos, den);

    // Unarmed the castaway hits for 2; five blows fell a 10-health crab,
    // and it answers after every one it survives.
    for _ in 0..5 {
        app.world_mut().send_event(CombatCommand(CombatMove::Attack));
        app.update(); // the blow lands
        app.update(); // the crab winds up
        app.update(); // the crab answers
    }

    assert!(!app.world().resource::<ActiveCombat>().engaged());
    let player = app.world().resource::<PlayerState>();
    assert!(!player.is_busy);
    assert_eq!(
        player.health,
        MAX_VITAL - 4.0 * 2.0,
        "The crab strikes back exactly four times before it falls"
    );
    assert_eq!(app.world().resource::<Inventory>().count("raw_meat"), 1);

    let mut wildlife = app.world_mut().query_filtered::<Entity, With<Enemy>>();
    assert_eq!(wildlife.iter(app.world()).count(), 0, "The slain crab despawns");

    // With the fight over, the castaway can walk again.
    send_action(&mut app, ActionKind::Move { dx: -1, dy: 0 });
    app.update();
    let spawn = app.world().resource::<WorldMap>().spawn;
    assert_eq!(app.world().resource::<PlayerState>().pos, spawn);
}

#[test]
fn test_fleeing_a_roaming_animal_leaves_it_on_the_map() {
    let mut app = build_test_app(SimConfig::instant());
    boot(&mut app);

    let (den, _boar) = stage_fight(
        &mut app,
        Enemy {
            name: "ridge boar".into(),
            health: 14.0,
            max_health: 14.0,
            damage: 1.0,
            loot: vec![("raw_meat".into(), 2)],
            is_search_encounter: false,
        },
    );
    assert!(app.world().resource::<ActiveCombat>().engaged());

    flee_until_escaped(&mut app);

    let player = app.world().resource::<PlayerState>();
    assert!(!player.is_busy, "Escape must release the busy lock");
    assert_eq!(player.pos, den, "Fleeing does not move the castaway");

    let mut wildlife = app.world_mut().query::<&Enemy>();
    let boar = wildlife.single(app.world());
    assert_eq!(boar.health, 14.0, "Fleeing leaves the animal unhurt");

    // Free again: the castaway backs out of the den.
    send_action(&mut app, ActionKind::Move { dx: -1, dy: 0 });
    app.update();
    let spawn = app.world().resource::<WorldMap>().spawn;
    assert_eq!(app.world().resource::<PlayerState>().pos, spawn);
}

#[test]
fn test_fleeing_a_conjured_encounter_dismisses_it() {
    let mut app = build_test_app(SimConfig::instant());
    boot(&mut app);

    let (den, _adder) = stage_fight(
        &mut app,
        Enemy {
            name: "marsh adder".into(),
            health: 12.0,
            max_health: 12.0,
            damage: 1.0,
            loot: vec![("raw_meat".into(), 1)],
            is_search_encounter: true,
        },
    );
    assert!(app.world().resource::<ActiveCombat>().engaged());

    flee_until_escaped(&mut app);

    assert!(!app.world().resource::<PlayerState>().is_busy);
    let mut wildlife = app.world_mut().query_filtered::<Entity, With<Enemy>>();
    assert_eq!(
        wildlife.iter(app.world()).count(),
        0,
        "An encounter conjured by a search vanishes once escaped"
    );
    let map = app.world().resource::<WorldMap>();
    assert!(
        map.get(den).unwrap().ground_items.is_empty(),
        "An escaped encounter leaves no spoils behind"
    );
}

#[test]
fn test_an_opponent_felled_mid_windup_never_lands_its_strike() {
    let mut app = build_test_app(SimConfig::instant());
    boot(&mut app);

    let (den, beast) = stage_fight(
        &mut app,
        Enemy {
            name: "dune wolf".into(),
            health: 9.0,
            max_health: 9.0,
            damage: 5.0,
            loot: vec![("raw_meat".into(), 1)],
            is_search_encounter: false,
        },
    );

    app.world_mut().send_event(CombatCommand(CombatMove::Attack));
    app.update(); // the blow lands; the wolf's answer is scheduled
    app.update(); // the wolf winds up

    // A survivor's blow lands while the wolf is mid-windup.
    app.world_mut().get_mut::<Enemy>(beast).unwrap().health = 0.0;

    app.update(); // the strike comes due against a carcass
    app.update(); // the sweep claims it

    let player = app.world().resource::<PlayerState>();
    assert_eq!(player.health, MAX_VITAL, "A felled opponent lands no strike");
    assert!(!player.is_busy);
    assert!(!app.world().resource::<ActiveCombat>().engaged());

    let mut wildlife = app.world_mut().query_filtered::<Entity, With<Enemy>>();
    assert_eq!(wildlife.iter(app.world()).count(), 0);
    assert_eq!(
        app.world().resource::<Inventory>().count("raw_meat"),
        0,
        "Spoils from an unfinished fight are not claimed in hand"
    );
    let map = app.world().resource::<WorldMap>();
    assert_eq!(map.get(den).unwrap().ground_items.count("raw_meat"), 1);
}

// ─────────────────────────────────────────────────────────────────────────────
// Survivors
// ─────────────────────────────────────────────────────────────────────────────

#[test]
fn test_survivor_hauls_a_full_pack_to_the_camp_stores() {
    let config = SimConfig { npc_tick_secs: 0.0, ..SimConfig::instant() };
    let mut app = build_test_app(config);
    boot(&mut app);
    clear_population(&mut app);

    // A controlled island: open plains with the camp shelter at its middle.
    let camp = GridPos::new(2, 2);
    let mut map = WorldMap::new(5, 5);
    for pos in map.positions().collect::<Vec<_>>() {
        map.update_tile_kind(pos, TerrainKind::Plains);
    }
    assert!(map.add_building(camp, BuildingKind::CollectiveShelter));
    app.insert_resource(map);
    app.world_mut().resource_mut::<ShelterRegistry>().designated = Some(camp);

    let mut hauler = Npc::new("Maren");
    hauler.inventory.add("wood", NPC_CARRY_CAPACITY);
    app.world_mut().spawn((hauler, GridPos::new(1, 2)));

    app.update(); // full pack: walk one tile toward the camp
    app.update(); // arrived: dump everything into the stores

    let map = app.world().resource::<WorldMap>();
    let stored = map
        .get(camp)
        .and_then(|t| t.building(BuildingKind::CollectiveShelter))
        .and_then(|b| b.inventory.as_ref())
        .map(|inv| inv.count("wood"));
    assert_eq!(stored, Some(NPC_CARRY_CAPACITY));

    let mut survivors = app.world_mut().query::<(&Npc, &GridPos)>();
    let (npc, pos) = survivors.single(app.world());
    assert_eq!(*pos, camp);
    assert!(npc.inventory.is_empty(), "The whole pack goes into the stores");
}

#[test]
fn test_survivor_fights_off_a_threat_before_hauling_to_camp() {
    let config = SimConfig { npc_tick_secs: 0.0, ..SimConfig::instant() };
    let mut app = build_test_app(config);
    boot(&mut app);
    clear_population(&mut app);

    let camp = GridPos::new(2, 2);
    let mut map = WorldMap::new(5, 5);
    for pos in map.positions().collect::<Vec<_>>() {
        map.update_tile_kind(pos, TerrainKind::Plains);
    }
    assert!(map.add_building(camp, BuildingKind::CollectiveShelter));
    app.insert_resource(map);
    app.world_mut().resource_mut::<ShelterRegistry>().designated = Some(camp);

    // A full pack would normally send the survivor straight to the stores,
    // but a boar on their tile comes first.
    let post = GridPos::new(1, 2);
    let mut defender = Npc::new("Bastien");
    defender.inventory.add("wood", NPC_CARRY_CAPACITY);
    app.world_mut().spawn((defender, post));
    app.world_mut().spawn((
        Enemy {
            name: "wild boar".into(),
            health: 18.0,
            max_health: 18.0,
            damage: 4.0,
            loot: vec![("raw_meat".into(), 1)],
            is_search_encounter: false,
        },
        post,
    ));

    app.update();
    {
        let mut wildlife = app.world_mut().query::<&Enemy>();
        let boar = wildlife.single(app.world());
        assert_eq!(
            boar.health,
            18.0 - NPC_ATTACK_DAMAGE,
            "The first tick goes to the fight, not the haul"
        );
        let mut survivors = app.world_mut().query::<(&Npc, &GridPos)>();
        let (npc, pos) = survivors.single(app.world());
        assert_eq!(npc.goal, NpcGoal::Fighting);
        assert_eq!(*pos, post, "The survivor holds ground while fighting");
        assert_eq!(npc.inventory.count("wood"), NPC_CARRY_CAPACITY);
        assert_eq!(npc.health, NPC_BASE_HEALTH, "Wildlife cannot hurt a survivor");
    }

    // Five more blows fell the boar; the haul resumes once it is down.
    for _ in 0..12 {
        app.update();
    }

    let mut wildlife = app.world_mut().query_filtered::<Entity, With<Enemy>>();
    assert_eq!(wildlife.iter(app.world()).count(), 0, "The slain boar despawns");
    let map = app.world().resource::<WorldMap>();
    assert_eq!(
        map.get(post).unwrap().ground_items.count("raw_meat"),
        1,
        "The boar's spoils fall where it stood"
    );
    let stored = map
        .get(camp)
        .and_then(|t| t.building(BuildingKind::CollectiveShelter))
        .and_then(|b| b.inventory.as_ref())
        .map(|inv| inv.count("wood"));
    assert_eq!(stored, Some(NPC_CARRY_CAPACITY));

    let mut survivors = app.world_mut().query::<(&Npc, &GridPos)>();
    let (npc, pos) = survivors.single(app.world());
    assert_eq!(*pos, camp);
    assert!(npc.inventory.is_empty());
    assert_eq!(npc.health, NPC_BASE_HEALTH);
}

#[test]
fn test_quest_offer_and_turn_in_through_talk() {
    let mut app = build_test_app(SimConfig::instant());
    boot(&mut app);
    clear_population(&mut app);

    let spawn = app.world().resource::<WorldMap>().spawn;
    let quest = QuestDef {
        description: "Bring me wood to reinforce my bedding".into(),
        wanted: ("wood".into(), 8),
        reward: ("grilled_fish".into(), 2),
    };
    let mut survivor = Npc::new("Odile");
    survivor.available_quest = Some(quest.clone());
    app.world_mut().spawn((survivor, spawn));

    // First talk hands the favor out.
    send_action(&mut app, ActionKind::Talk);
    app.update();
    {
        let mut survivors = app.world_mut().query::<&Npc>();
        let npc = survivors.single(app.world());
        assert_eq!(npc.active_quest.as_ref(), Some(&quest));
        assert!(npc.available_quest.is_none());
    }

    // With the goods in the pack, the next talk settles it.
    {
        let mut inventory = app.world_mut().resource_mut::<Inventory>();
        inventory.add("wood", 8);
    }
    send_action(&mut app, ActionKind::Talk);
    app.update();

    let inventory = app.world().resource::<Inventory>();
    assert_eq!(inventory.count("wood"), 0);
    assert_eq!(inventory.count("grilled_fish"), 2);
    let mut survivors = app.world_mut().query::<&Npc>();
    assert!(survivors.single(app.world()).active_quest.is_none());
}

// ─────────────────────────────────────────────────────────────────────────────
// The long game
// ─────────────────────────────────────────────────────────────────────────────

#[test]
fn test_reaching_the_victory_day_ends_the_run_with_a_rescue() {
    let config = SimConfig { day_secs: 0.0, victory_day: 3, ..SimConfig::instant() };
    let mut app = build_test_app(config);
    boot(&mut app);

    // One day rolls over per frame; a few frames reach the rescue.
    for _ in 0..8 {
        app.update();
    }

    let state = app.world().resource::<State<GameState>>();
    assert_eq!(state.get(), &GameState::Ended);
    let outcome = app.world().resource::<GameOutcome>();
    assert_eq!(outcome.outcome, Some(OutcomeKind::Rescued));
    assert_eq!(outcome.final_day, 3, "The rescue lands on the victory day itself");
}
