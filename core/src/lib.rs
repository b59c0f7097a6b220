use {
    bevy::prelude::*,
    gate_events::GateEventsPlugin,
    loading::LoadingPlugin,
    pool::PoolPlugin,
    progress::ProgressPlugin,
    reveal::RevealPlugin,
    shared_components::SharedComponentsPlugin,
    states::GameState,
    stations::StationsPlugin,
    system_schedule::GameSchedule,
};

pub mod systems;


pub use systems::StatusLogTimer;

pub struct CorePlugin;

impl Plugin for CorePlugin {
    fn build(&self, app: &mut App) {
        app.init_state::<GameState>()
            .configure_sets(
                Update,
                (
                    GameSchedule::Intake,
                    GameSchedule::Timers,
                    GameSchedule::Reveal,
                    GameSchedule::Animation,
                    GameSchedule::Diagnostics,
                )
                    .chain()
                    .run_if(in_state(GameState::Running)),
            )
            .add_plugins((
                SharedComponentsPlugin,
                GateEventsPlugin,
                PoolPlugin,
                StationsPlugin,
                ProgressPlugin,
                RevealPlugin,
                LoadingPlugin,
            ))
            .init_resource::<StatusLogTimer>()
            .add_systems(Startup, setup_camera)
            .add_systems(
                Update,
                (
                    systems::interact_with_nearby_station
                        .in_set(GameSchedule::Intake)
                        .before(stations::systems::process_interactions),
                    systems::debug_hotkeys.in_set(GameSchedule::Intake),
                )
                    .run_if(resource_exists::<ButtonInput<KeyCode>>),
            )
            .add_systems(
                Update,
                systems::log_gate_status.in_set(GameSchedule::Diagnostics),
            );
    }
}

fn setup_camera(mut commands: Commands) {
    commands.spawn(Camera2d);
}
