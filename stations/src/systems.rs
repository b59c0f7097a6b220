use {
    crate::{NearbyStation, StationMap},
    bevy::prelude::*,
    gate_events::{
        InteractionRejected, PlayerInteraction, ResetStation, StationFulfilled,
        StationRangeEntered, StationRangeExited, StationStateChanged,
    },
    pool::notify_spend,
    pool_resources::ResourcePool,
    station_components::{ChargeTick, RechargeStation, StationState},
};

pub fn on_station_added(
    trigger: On<Add, RechargeStation>,
    stations: Query<&RechargeStation>,
    mut station_map: ResMut<StationMap>,
) {
    let entity = trigger.event().entity;
    let Ok(station) = stations.get(entity) else {
        return;
    };

    let previous = station_map.entities.insert(station.id().clone(), entity);
    if previous.is_some_and(|previous| previous != entity) {
        warn!(
            "Station '{}' spawned twice, {:?} now owns the id",
            station.id(),
            entity
        );
    }
}

pub fn on_station_removed(
    trigger: On<Remove, RechargeStation>,
    stations: Query<&RechargeStation>,
    mut station_map: ResMut<StationMap>,
) {
    let entity = trigger.event().entity;
    let Ok(station) = stations.get(entity) else {
        return;
    };
    if station_map.get(station.id()) == Some(entity) {
        station_map.entities.remove(station.id());
    }
}

pub fn on_range_entered(
    trigger: On<StationRangeEntered>,
    station_map: Res<StationMap>,
    mut nearby: ResMut<NearbyStation>,
) {
    let id = &trigger.event().station_id;
    if station_map.get(id).is_none() {
        warn!("Entered range of unknown station '{}'", id);
        return;
    }
    nearby.0 = Some(id.clone());
    debug!("Player near station '{}'", id);
}

pub fn on_range_exited(trigger: On<StationRangeExited>, mut nearby: ResMut<NearbyStation>) {
    let id = &trigger.event().station_id;
    // Overlapping ranges: only clear if we're leaving the one we hold
    if nearby.0.as_ref() == Some(id) {
        nearby.0 = None;
        debug!("Player left station '{}'", id);
    }
}

/// Handles all interaction requests of this tick, in arrival order.
///
/// Each request is resolved against the pool before the next one is read,
/// so two stations competing for the last of the resource are settled by
/// who asked first.
pub fn process_interactions(
    mut interactions: MessageReader<PlayerInteraction>,
    station_map: Res<StationMap>,
    mut stations: Query<&mut RechargeStation>,
    mut pool: ResMut<ResourcePool>,
    mut commands: Commands,
) {
    for interaction in interactions.read() {
        let id = &interaction.station_id;
        let Some(entity) = station_map.get(id) else {
            warn!("Interaction with unknown station '{}' ignored", id);
            continue;
        };
        let Ok(mut station) = stations.get_mut(entity) else {
            warn!("Station '{}' maps to {:?}, which has no RechargeStation", id, entity);
            continue;
        };

        match station.begin_recharge(&mut pool) {
            Ok(receipt) => {
                notify_spend(&receipt, pool.max(), &mut commands);
                commands.trigger(StationStateChanged {
                    station: entity,
                    station_id: id.clone(),
                    state: station.state(),
                    progress: station.progress(),
                });
                info!(
                    "Station '{}' charging for {:.1}s (spent {}, pool {}/{})",
                    id,
                    station.duration().as_secs_f32(),
                    receipt.spent,
                    receipt.current,
                    pool.max()
                );
            }
            Err(reason) => {
                if reason.is_rejection() {
                    debug!("Station '{}' refused interaction: {}", id, reason);
                } else {
                    warn!("Interaction with station '{}' failed: {}", id, reason);
                }
                commands.trigger(InteractionRejected {
                    station_id: id.clone(),
                    reason,
                });
            }
        }
    }
}

/// Ticks charge timers of charging stations.
pub fn advance_charging(
    time: Res<Time>,
    mut stations: Query<(Entity, &mut RechargeStation)>,
    mut commands: Commands,
) {
    let delta = time.delta();
    if delta.is_zero() {
        return;
    }

    for (entity, mut station) in stations.iter_mut() {
        if station.state() != StationState::Charging {
            continue;
        }

        match station.advance(delta) {
            ChargeTick::Idle => {}
            ChargeTick::Progressed(progress) => {
                commands.trigger(StationStateChanged {
                    station: entity,
                    station_id: station.id().clone(),
                    state: StationState::Charging,
                    progress,
                });
            }
            ChargeTick::Completed { cycle } => {
                commands.trigger(StationStateChanged {
                    station: entity,
                    station_id: station.id().clone(),
                    state: StationState::Charged,
                    progress: 1.0,
                });
                commands.trigger(StationFulfilled {
                    station: entity,
                    station_id: station.id().clone(),
                    cycle,
                });
                info!("Station '{}' charged", station.id());
            }
        }
    }
}

/// Puts one station back to `Unfulfilled`. Spent resource is not refunded.
pub fn on_reset_station(
    trigger: On<ResetStation>,
    mut stations: Query<&mut RechargeStation>,
    mut commands: Commands,
) {
    let entity = trigger.event().entity;
    let Ok(mut station) = stations.get_mut(entity) else {
        warn!("ResetStation targeted {:?}, which is not a station", entity);
        return;
    };

    if reset_and_notify(entity, &mut station, &mut commands) {
        info!("Station '{}' reset", station.id());
    }
}

/// Resets a station and announces it if its state actually changed.
pub fn reset_and_notify(
    entity: Entity,
    station: &mut RechargeStation,
    commands: &mut Commands,
) -> bool {
    if !station.reset() {
        return false;
    }
    commands.trigger(StationStateChanged {
        station: entity,
        station_id: station.id().clone(),
        state: StationState::Unfulfilled,
        progress: 0.0,
    });
    true
}
