use {
    bevy::prelude::*,
    gate_events::{AllStationsSatisfied, ForceComplete, ResetAllStations, StationFulfilled},
    progress_resources::{Fulfilment, ProgressAggregator},
    shared_components::GateError,
    station_components::{RechargeStation, StationId, StationState},
    stations::reset_and_notify,
};

/// Adds a station to the registry, logging why it was refused if it was.
pub fn register_station(
    aggregator: &mut ProgressAggregator,
    id: StationId,
    entity: Entity,
) -> Result<(), GateError> {
    aggregator.register(id.clone(), entity).inspect_err(|e| {
        error!("Station '{}' not registered: {}", id, e);
    })
}

/// Locks the registry at the end of setup.
///
/// An empty registry is reported here, once; afterwards the gate can only
/// be opened with `ForceComplete`.
pub fn finish_registration(aggregator: &mut ProgressAggregator) -> Result<usize, GateError> {
    let was_locked = aggregator.is_locked();
    let result = aggregator.lock_in();
    if !was_locked {
        match &result {
            Ok(total) => info!("Progress gate tracking {} stations", total),
            Err(e) => error!("Progress gate misconfigured: {}", e),
        }
    }
    result
}

/// Counts a fulfilled station and opens the gate on the last one.
///
/// The notice must still describe the station as it is now: same charge
/// cycle, still `Charged`. Anything else belongs to a cycle that was reset.
pub fn on_station_fulfilled(
    trigger: On<StationFulfilled>,
    stations: Query<&RechargeStation>,
    mut aggregator: ResMut<ProgressAggregator>,
    mut commands: Commands,
) {
    let event = trigger.event();
    let Ok(station) = stations.get(event.station) else {
        warn!(
            "Fulfilment from '{}' refers to a missing station entity",
            event.station_id
        );
        return;
    };
    if station.cycle() != event.cycle || station.state() != StationState::Charged {
        debug!(
            "Stale fulfilment from '{}' (cycle {}, now {} in cycle {}) ignored",
            event.station_id,
            event.cycle,
            station.state(),
            station.cycle()
        );
        return;
    }

    match aggregator.on_station_fulfilled(&event.station_id) {
        Fulfilment::Counted { satisfied, total } => {
            info!(
                "Station '{}' satisfied ({}/{})",
                event.station_id, satisfied, total
            );
        }
        Fulfilment::AllSatisfied => {
            info!(
                "All {} stations satisfied, opening the gate",
                aggregator.total()
            );
            commands.trigger(AllStationsSatisfied);
        }
        Fulfilment::Ignored(reason) => {
            debug!(
                "Fulfilment from '{}' ignored: {:?}",
                event.station_id, reason
            );
        }
    }
}

/// Opens the gate regardless of station state.
///
/// Triggers `AllStationsSatisfied` on every call, even when the gate is
/// already open or the registry is empty.
pub fn on_force_complete(
    _trigger: On<ForceComplete>,
    mut aggregator: ResMut<ProgressAggregator>,
    mut commands: Commands,
) {
    aggregator.force_complete();
    if aggregator.is_misconfigured() {
        warn!("Forcing the gate open with no registered stations");
    } else {
        info!("Gate forced open");
    }
    commands.trigger(AllStationsSatisfied);
}

pub fn on_reset_all(
    _trigger: On<ResetAllStations>,
    mut aggregator: ResMut<ProgressAggregator>,
    mut stations: Query<&mut RechargeStation>,
    mut commands: Commands,
) {
    aggregator.reset_counts();

    let mut reset = 0;
    for (id, entity) in aggregator.stations() {
        let Ok(mut station) = stations.get_mut(entity) else {
            warn!("Registered station '{}' has no entity to reset", id);
            continue;
        };
        if reset_and_notify(entity, &mut station, &mut commands) {
            reset += 1;
        }
    }
    info!(
        "Progress cleared, {} of {} stations reset",
        reset,
        aggregator.registered_count()
    );
}
