mod shared;
mod economy;
mod world;
mod entities;
mod actions;
mod combat;
mod npc;
mod sim;
mod data;

use std::time::Duration;

use bevy::app::ScheduleRunnerPlugin;
use bevy::log::LogPlugin;
use bevy::prelude::*;
use bevy::state::app::StatesPlugin;

use economy::Inventory;
use shared::*;

/// Headless frame cadence. The sim is timer-driven, so this only bounds how
/// often the clocks are sampled.
const FRAME_INTERVAL: f64 = 1.0 / 60.0;

fn main() {
    App::new()
        .add_plugins(
            MinimalPlugins
                .set(ScheduleRunnerPlugin::run_loop(Duration::from_secs_f64(FRAME_INTERVAL))),
        )
        .add_plugins(LogPlugin::default())
        .add_plugins(StatesPlugin)
        // Game state
        .init_state::<GameState>()
        // Shared resources
        .insert_resource(SimConfig::default())
        .init_resource::<PlayerState>()
        .init_resource::<Inventory>()
        .init_resource::<ItemRegistry>()
        .init_resource::<ActiveEvent>()
        .init_resource::<GameOutcome>()
        // Events
        .add_event::<ActionRequest>()
        .add_event::<ActionOutcome>()
        .add_event::<ActionCompleted>()
        .add_event::<CombatCommand>()
        .add_event::<CombatEvent>()
        .add_event::<TaskDue>()
        .add_event::<DayEndEvent>()
        .add_event::<GameOverEvent>()
        // Domain plugins
        .add_plugins(world::WorldPlugin)
        .add_plugins(entities::EntityPlugin)
        .add_plugins(actions::ActionsPlugin)
        .add_plugins(combat::CombatPlugin)
        .add_plugins(npc::NpcPlugin)
        .add_plugins(sim::SimPlugin)
        // Data loading
        .add_plugins(data::DataPlugin)
        // Shutdown
        .add_systems(OnEnter(GameState::Ended), report_and_exit)
        .run();
}

/// Print the run's verdict and stop the schedule runner.
fn report_and_exit(outcome: Res<GameOutcome>, mut exit: EventWriter<AppExit>) {
    match &outcome.outcome {
        Some(OutcomeKind::Rescued) => {
            info!("[Tidefall] Rescued on day {}", outcome.final_day);
        }
        Some(OutcomeKind::Perished { cause }) => {
            info!("[Tidefall] Perished on day {}: {cause}", outcome.final_day);
        }
        None => warn!("[Tidefall] Run ended without a recorded outcome"),
    }
    exit.send(AppExit::Success);
}
