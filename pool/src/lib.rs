pub mod systems;


use {bevy::prelude::*, pool_resources::ResourcePool};

pub use systems::{add_and_notify, notify_spend};

pub struct PoolPlugin;

impl Plugin for PoolPlugin {
    fn build(&self, app: &mut App) {
        app.register_type::<ResourcePool>()
            .init_resource::<ResourcePool>()
            .add_observer(systems::on_add_resource)
            .add_observer(systems::on_fill_pool)
            .add_observer(systems::on_collect_pickup);
    }
}
