use {bevy::prelude::*, progress_resources::ProgressAggregator};

pub mod systems;


pub use systems::{finish_registration, register_station};

pub struct ProgressPlugin;

impl Plugin for ProgressPlugin {
    fn build(&self, app: &mut App) {
        app.init_resource::<ProgressAggregator>()
            .add_observer(systems::on_station_fulfilled)
            .add_observer(systems::on_force_complete)
            .add_observer(systems::on_reset_all);
    }
}
