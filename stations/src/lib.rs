use {
    bevy::{platform::collections::HashMap, prelude::*},
    gate_events::PlayerInteraction,
    shared_components::DisplayName,
    station_components::{RechargeStation, StationComponentsPlugin, StationId},
    system_schedule::GameSchedule,
};

pub mod systems;

pub use systems::reset_and_notify;

#[cfg(test)]
mod tests;

// --- Resources ---

/// O(1) lookup of station entities by ID.
///
/// Maintained by observers on `RechargeStation` insertion and removal.
#[derive(Resource, Default, Debug)]
pub struct StationMap {
    pub entities: HashMap<StationId, Entity>,
}

impl StationMap {
    pub fn get(&self, id: &StationId) -> Option<Entity> {
        self.entities.get(id).copied()
    }
}

/// The station the player currently stands next to, if any.
#[derive(Resource, Default, Debug, Clone, PartialEq, Eq)]
pub struct NearbyStation(pub Option<StationId>);

// --- Plugin ---

pub struct StationsPlugin;

impl Plugin for StationsPlugin {
    fn build(&self, app: &mut App) {
        if !app.is_plugin_added::<StationComponentsPlugin>() {
            app.add_plugins(StationComponentsPlugin);
        }

        app.init_resource::<StationMap>()
            .init_resource::<NearbyStation>()
            .add_message::<PlayerInteraction>()
            .add_systems(
                Update,
                systems::process_interactions.in_set(GameSchedule::Intake),
            )
            .add_systems(Update, systems::advance_charging.in_set(GameSchedule::Timers))
            .add_observer(systems::on_station_added)
            .add_observer(systems::on_station_removed)
            .add_observer(systems::on_range_entered)
            .add_observer(systems::on_range_exited)
            .add_observer(systems::on_reset_station);
    }
}

/// Snapshot of one station for status lines and UI. Uses the display name
/// when the station has one, the id otherwise.
pub fn describe(station: &RechargeStation, name: Option<&DisplayName>) -> String {
    let label = name.map_or_else(|| station.id().to_string(), |name| name.0.clone());
    format!(
        "{} [{} {:.0}%]",
        label,
        station.state(),
        station.progress() * 100.0
    )
}
