use {
    bevy::prelude::*,
    gate_events::{FillPool, ForceComplete, PlayerInteraction, ResetAllStations, ResetReveal},
    pool_resources::ResourcePool,
    progress_resources::ProgressAggregator,
    reveal_components::RevealSequencer,
    shared_components::DisplayName,
    station_components::RechargeStation,
    stations::NearbyStation,
};

pub const INTERACT_KEY: KeyCode = KeyCode::KeyE;
const STATUS_LOG_INTERVAL_SECS: f32 = 5.0;

#[derive(Resource, Debug)]
pub struct StatusLogTimer(pub Timer);

impl Default for StatusLogTimer {
    fn default() -> Self {
        Self(Timer::from_seconds(
            STATUS_LOG_INTERVAL_SECS,
            TimerMode::Repeating,
        ))
    }
}

/// Turns the interact key into a request for the station in range.
pub fn interact_with_nearby_station(
    keyboard: Res<ButtonInput<KeyCode>>,
    nearby: Res<NearbyStation>,
    mut interactions: MessageWriter<PlayerInteraction>,
) {
    if !keyboard.just_pressed(INTERACT_KEY) {
        return;
    }
    match &nearby.0 {
        Some(station_id) => {
            interactions.write(PlayerInteraction {
                station_id: station_id.clone(),
            });
        }
        None => trace!("Interact pressed with no station in range"),
    }
}

/// F1 fills the pool, F2 forces the gate open, F3 resets stations and reveals.
pub fn debug_hotkeys(
    keyboard: Res<ButtonInput<KeyCode>>,
    sequencers: Query<Entity, With<RevealSequencer>>,
    mut commands: Commands,
) {
    if keyboard.just_pressed(KeyCode::F1) {
        commands.trigger(FillPool);
    }
    if keyboard.just_pressed(KeyCode::F2) {
        commands.trigger(ForceComplete);
    }
    if keyboard.just_pressed(KeyCode::F3) {
        commands.trigger(ResetAllStations);
        for entity in sequencers.iter() {
            commands.trigger(ResetReveal { entity });
        }
    }
}

/// Periodic one-line summary of the whole gate.
pub fn log_gate_status(
    time: Res<Time>,
    mut timer: ResMut<StatusLogTimer>,
    pool: Res<ResourcePool>,
    aggregator: Res<ProgressAggregator>,
    stations: Query<(&RechargeStation, Option<&DisplayName>)>,
    sequencers: Query<&RevealSequencer>,
) {
    if !timer.0.tick(time.delta()).just_finished() {
        return;
    }

    let mut lines: Vec<String> = stations
        .iter()
        .map(|(station, name)| stations::describe(station, name))
        .collect();
    lines.sort();
    let reveal: Vec<String> = sequencers
        .iter()
        .map(|s| format!("{}/{}", s.current_index(), s.total_segments()))
        .collect();

    debug!(
        "pool {}/{} ({:.0}%) | gate {}/{}{} | stations: {} | reveal: {}",
        pool.current(),
        pool.max(),
        pool.percentage() * 100.0,
        aggregator.satisfied_count(),
        aggregator.total(),
        if aggregator.is_completed() { " open" } else { "" },
        lines.join(", "),
        reveal.join(", ")
    );
}
