use {
    bevy::prelude::*,
    shared_components::GateError,
    station_components::{StationId, StationState},
};

pub struct GateEventsPlugin;

impl Plugin for GateEventsPlugin {
    fn build(&self, app: &mut App) {
        app.add_message::<PlayerInteraction>();
    }
}

// --- Inbound ---

/// A player asked to recharge a station.
///
/// Delivered by the input/trigger layer as a **Message** so that all
/// requests of one tick are processed in arrival order by
/// `stations::systems::process_interactions`.
#[derive(Message, Debug, Clone, PartialEq, Eq)]
pub struct PlayerInteraction {
    pub station_id: StationId,
}

/// Adds resource to the pool (pickups, debug tools, scripted rewards).
#[derive(Event, Debug, Clone, Copy)]
pub struct AddResource {
    pub amount: u32,
}

/// Debug request: set the pool to its capacity.
#[derive(Event, Debug, Clone, Copy)]
pub struct FillPool;

/// The player touched a pickup entity.
#[derive(EntityEvent, Debug, Clone, Copy)]
pub struct CollectPickup {
    #[event_target]
    pub entity: Entity,
}

/// The proximity layer reports the player entering a station's range.
#[derive(Event, Debug, Clone)]
pub struct StationRangeEntered {
    pub station_id: StationId,
}

/// The proximity layer reports the player leaving a station's range.
#[derive(Event, Debug, Clone)]
pub struct StationRangeExited {
    pub station_id: StationId,
}

/// Resets one station to `Unfulfilled`.
#[derive(EntityEvent, Debug, Clone, Copy)]
pub struct ResetStation {
    #[event_target]
    pub entity: Entity,
}

/// Clears aggregator progress and resets every registered station.
#[derive(Event, Debug, Clone, Copy)]
pub struct ResetAllStations;

/// Administrative override: mark every station satisfied and open the gate.
///
/// Re-triggers `AllStationsSatisfied` every time it is sent. Callers must
/// not send it redundantly; the sequencer refusing to start while running
/// is the only guard against a duplicate reveal.
#[derive(Event, Debug, Clone, Copy)]
pub struct ForceComplete;

/// Manually starts the reveal on a sequencer entity.
#[derive(EntityEvent, Debug, Clone, Copy)]
pub struct StartReveal {
    #[event_target]
    pub entity: Entity,
}

/// Cancels a sequencer run and hides all of its segments.
#[derive(EntityEvent, Debug, Clone, Copy)]
pub struct ResetReveal {
    #[event_target]
    pub entity: Entity,
}

// --- Outbound ---

/// Pool value changed. Fired only when the stored value actually moved.
#[derive(Event, Debug, Clone, Copy, PartialEq, Eq)]
pub struct ResourceChanged {
    pub current: u32,
    pub max: u32,
}

/// A spend brought the pool down to zero.
#[derive(Event, Debug, Clone, Copy, PartialEq, Eq)]
pub struct ResourceDepleted;

/// A pickup was collected and its amount offered to the pool.
#[derive(Event, Debug, Clone, Copy, PartialEq, Eq)]
pub struct PickupCollected {
    pub pickup: Entity,
    pub amount: u32,
}

/// A station changed state or made charging progress.
///
/// # Observers
/// - UI/audio/material hooks outside the core.
#[derive(Event, Debug, Clone, PartialEq)]
pub struct StationStateChanged {
    pub station: Entity,
    pub station_id: StationId,
    pub state: StationState,
    pub progress: f32,
}

/// A station finished charging.
///
/// Fired once per charge cycle. `cycle` lets the aggregator drop notices
/// that belong to a cycle the station has since been reset out of.
///
/// # Observers
/// - `progress::systems::on_station_fulfilled`: counts the station toward the gate.
#[derive(Event, Debug, Clone, PartialEq, Eq)]
pub struct StationFulfilled {
    pub station: Entity,
    pub station_id: StationId,
    pub cycle: u32,
}

/// An interaction request was refused. The UI decides how to show it.
#[derive(Event, Debug, Clone, PartialEq, Eq)]
pub struct InteractionRejected {
    pub station_id: StationId,
    pub reason: GateError,
}

/// Every registered station is satisfied (or the gate was forced open).
///
/// # Observers
/// - `reveal::systems::on_all_stations_satisfied`: starts the reveal sequencers.
#[derive(Event, Debug, Clone, Copy, PartialEq, Eq)]
pub struct AllStationsSatisfied;

/// A reveal segment was switched on.
#[derive(Event, Debug, Clone, Copy, PartialEq, Eq)]
pub struct SegmentActivated {
    pub sequencer: Entity,
    pub segment: Entity,
    pub index: usize,
}

/// A reveal run activated its last segment.
#[derive(Event, Debug, Clone, Copy, PartialEq, Eq)]
pub struct SequenceCompleted {
    pub sequencer: Entity,
}
