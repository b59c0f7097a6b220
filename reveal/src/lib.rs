use {
    bevy::{platform::collections::HashSet, prelude::*},
    reveal_components::RevealComponentsPlugin,
    system_schedule::GameSchedule,
};

pub mod systems;


/// Sequencers whose configuration error has already been logged.
#[derive(Resource, Default, Debug)]
pub struct MisconfiguredSequencers {
    pub reported: HashSet<Entity>,
}

/// Marks a sequencer whose run started during the current tick. That tick's
/// delta does not count toward the first inter-segment delay.
#[derive(Component, Debug, Default)]
pub struct StartedThisTick;

pub struct RevealPlugin;

impl Plugin for RevealPlugin {
    fn build(&self, app: &mut App) {
        if !app.is_plugin_added::<RevealComponentsPlugin>() {
            app.add_plugins(RevealComponentsPlugin);
        }

        app.init_resource::<MisconfiguredSequencers>()
            .add_systems(Update, systems::advance_reveal.in_set(GameSchedule::Reveal))
            .add_systems(Update, systems::animate_pops.in_set(GameSchedule::Animation))
            .add_observer(systems::on_all_stations_satisfied)
            .add_observer(systems::on_start_reveal)
            .add_observer(systems::on_reset_reveal);
    }
}
