use {
    bevy::prelude::*,
    gate_events::{
        AddResource, CollectPickup, FillPool, PickupCollected, ResourceChanged, ResourceDepleted,
    },
    pool_resources::{ResourcePool, SpendReceipt},
    station_components::ResourcePickup,
};

/// Adds to the pool and announces the new value if it moved.
pub fn add_and_notify(pool: &mut ResourcePool, amount: u32, commands: &mut Commands) -> bool {
    let changed = pool.add(amount);
    if changed {
        commands.trigger(ResourceChanged {
            current: pool.current(),
            max: pool.max(),
        });
        debug!("Resource added: +{} -> {}/{}", amount, pool.current(), pool.max());
    }
    changed
}

/// Announces a completed spend: always a change, plus depletion at zero.
///
/// Callers spend first (directly or through `RechargeStation::begin_recharge`)
/// and pass the receipt here.
pub fn notify_spend(receipt: &SpendReceipt, max: u32, commands: &mut Commands) {
    commands.trigger(ResourceChanged {
        current: receipt.current,
        max,
    });
    if receipt.depleted {
        commands.trigger(ResourceDepleted);
        debug!("Resource pool depleted");
    }
}

pub fn on_add_resource(
    trigger: On<AddResource>,
    mut pool: ResMut<ResourcePool>,
    mut commands: Commands,
) {
    add_and_notify(&mut pool, trigger.event().amount, &mut commands);
}

pub fn on_fill_pool(_trigger: On<FillPool>, mut pool: ResMut<ResourcePool>, mut commands: Commands) {
    if pool.fill() {
        commands.trigger(ResourceChanged {
            current: pool.current(),
            max: pool.max(),
        });
        info!("Resource pool filled to {}", pool.max());
    }
}

/// Collects a pickup once; later touches of the same pickup do nothing.
pub fn on_collect_pickup(
    trigger: On<CollectPickup>,
    mut pickups: Query<&mut ResourcePickup>,
    mut pool: ResMut<ResourcePool>,
    mut commands: Commands,
) {
    let entity = trigger.event().entity;
    let Ok(mut pickup) = pickups.get_mut(entity) else {
        warn!("CollectPickup targeted {:?}, which is not a pickup", entity);
        return;
    };
    if pickup.collected {
        return;
    }

    pickup.collected = true;
    add_and_notify(&mut pool, pickup.amount, &mut commands);
    commands.trigger(PickupCollected {
        pickup: entity,
        amount: pickup.amount,
    });
    commands.entity(entity).despawn();
    info!(
        "Collected {} resource, pool now {}/{}",
        pickup.amount,
        pool.current(),
        pool.max()
    );
}
