use {
    crate::*,
    bevy::prelude::*,
    gate_events::*,
    pool_resources::ResourcePool,
    shared_components::{DisplayName, GateError},
    station_components::{RechargeStation, StationId, StationState},
    std::time::Duration,
    system_schedule::GameSchedule,
};

#[derive(Resource, Default)]
struct Tracker {
    changes: Vec<(StationId, StationState, f32)>,
    fulfilled: Vec<(StationId, u32)>,
    rejected: Vec<(StationId, GateError)>,
    pool_changes: Vec<u32>,
}

fn setup(pool: u32) -> App {
    let mut app = App::new();
    app.add_plugins(StationsPlugin)
        .init_resource::<Time>()
        .insert_resource(ResourcePool::with_current(pool, 100).unwrap())
        .init_resource::<Tracker>()
        .configure_sets(Update, (GameSchedule::Intake, GameSchedule::Timers).chain())
        .add_observer(|trigger: On<StationStateChanged>, mut tracker: ResMut<Tracker>| {
            let event = trigger.event();
            tracker
                .changes
                .push((event.station_id.clone(), event.state, event.progress));
        })
        .add_observer(|trigger: On<StationFulfilled>, mut tracker: ResMut<Tracker>| {
            let event = trigger.event();
            tracker.fulfilled.push((event.station_id.clone(), event.cycle));
        })
        .add_observer(|trigger: On<InteractionRejected>, mut tracker: ResMut<Tracker>| {
            let event = trigger.event();
            tracker
                .rejected
                .push((event.station_id.clone(), event.reason.clone()));
        })
        .add_observer(|trigger: On<ResourceChanged>, mut tracker: ResMut<Tracker>| {
            tracker.pool_changes.push(trigger.event().current);
        });
    app
}

fn spawn_station(app: &mut App, id: &str, cost: u32, secs: f32) -> Entity {
    app.world_mut()
        .spawn(RechargeStation::new(id, cost, secs).unwrap())
        .id()
}

fn interact(app: &mut App, id: &str) {
    app.world_mut().write_message(PlayerInteraction {
        station_id: id.into(),
    });
}

/// Advances the clock by `secs` for exactly one update.
fn advance(app: &mut App, secs: f32) {
    let mut time = app.world().resource::<Time>().clone();
    time.advance_by(Duration::from_secs_f32(secs));
    app.insert_resource(time);
    app.update();

    // delta persists until the next advance; zero it so plain updates don't tick
    let mut time = app.world().resource::<Time>().clone();
    time.advance_by(Duration::ZERO);
    app.insert_resource(time);
}

fn station(app: &App, entity: Entity) -> &RechargeStation {
    app.world().get::<RechargeStation>(entity).unwrap()
}

fn pool(app: &App) -> u32 {
    app.world().resource::<ResourcePool>().current()
}

#[test]
fn test_station_map_tracks_spawned_stations() {
    let mut app = setup(0);
    let north = spawn_station(&mut app, "north", 10, 2.0);
    let east = spawn_station(&mut app, "east", 10, 2.0);

    let map = app.world().resource::<StationMap>();
    assert_eq!(map.get(&"north".into()), Some(north));
    assert_eq!(map.get(&"east".into()), Some(east));

    app.world_mut().entity_mut(east).remove::<RechargeStation>();
    assert_eq!(app.world().resource::<StationMap>().get(&"east".into()), None);
}

#[test]
fn test_single_station_charges_and_fulfils_once() {
    let mut app = setup(100);
    let north = spawn_station(&mut app, "north", 10, 2.0);

    interact(&mut app, "north");
    app.update();

    assert_eq!(pool(&app), 90);
    assert_eq!(station(&app, north).state(), StationState::Charging);
    assert_eq!(app.world().resource::<Tracker>().pool_changes, vec![90]);

    advance(&mut app, 1.0);
    assert_eq!(station(&app, north).progress(), 0.5);
    assert!(app.world().resource::<Tracker>().fulfilled.is_empty());

    advance(&mut app, 1.0);
    assert_eq!(station(&app, north).state(), StationState::Charged);
    assert_eq!(station(&app, north).progress(), 1.0);

    // Charged is terminal; more time changes nothing
    advance(&mut app, 5.0);

    let tracker = app.world().resource::<Tracker>();
    assert_eq!(tracker.fulfilled, vec![(StationId::from("north"), 1)]);
    assert_eq!(
        tracker.changes,
        vec![
            (StationId::from("north"), StationState::Charging, 0.0),
            (StationId::from("north"), StationState::Charging, 0.5),
            (StationId::from("north"), StationState::Charged, 1.0),
        ]
    );
}

#[test]
fn test_progress_is_monotonic_across_ticks() {
    let mut app = setup(100);
    let north = spawn_station(&mut app, "north", 10, 2.0);
    interact(&mut app, "north");
    app.update();

    let mut last = 0.0;
    for _ in 0..3 {
        advance(&mut app, 0.5);
        let progress = station(&app, north).progress();
        assert!(progress > last, "{progress} should exceed {last}");
        last = progress;
    }
    assert_eq!(last, 0.75);
}

#[test]
fn test_insufficient_resource_rejects_without_side_effects() {
    let mut app = setup(5);
    let north = spawn_station(&mut app, "north", 10, 2.0);

    interact(&mut app, "north");
    app.update();

    assert_eq!(pool(&app), 5);
    assert_eq!(station(&app, north).state(), StationState::Unfulfilled);

    let tracker = app.world().resource::<Tracker>();
    assert!(tracker.changes.is_empty());
    assert!(tracker.pool_changes.is_empty());
    assert_eq!(
        tracker.rejected,
        vec![(
            StationId::from("north"),
            GateError::ResourceInsufficient {
                requested: 10,
                available: 5
            }
        )]
    );
}

#[test]
fn test_double_begin_in_same_tick_spends_once() {
    let mut app = setup(100);
    let north = spawn_station(&mut app, "north", 10, 2.0);

    interact(&mut app, "north");
    interact(&mut app, "north");
    app.update();

    assert_eq!(pool(&app), 90);
    assert_eq!(station(&app, north).cycle(), 1);

    let tracker = app.world().resource::<Tracker>();
    assert_eq!(tracker.rejected.len(), 1);
    assert!(matches!(
        tracker.rejected[0].1,
        GateError::InvalidTransition { .. }
    ));
}

#[test]
fn test_begin_while_charged_is_rejected() {
    let mut app = setup(100);
    let north = spawn_station(&mut app, "north", 10, 1.0);
    interact(&mut app, "north");
    app.update();
    advance(&mut app, 1.0);
    assert_eq!(station(&app, north).state(), StationState::Charged);

    interact(&mut app, "north");
    app.update();

    assert_eq!(pool(&app), 90);
    assert_eq!(station(&app, north).state(), StationState::Charged);
    assert_eq!(app.world().resource::<Tracker>().rejected.len(), 1);
}

#[test]
fn test_contention_is_settled_in_arrival_order() {
    let mut app = setup(15);
    let north = spawn_station(&mut app, "north", 10, 2.0);
    let east = spawn_station(&mut app, "east", 10, 2.0);

    interact(&mut app, "east");
    interact(&mut app, "north");
    app.update();

    assert_eq!(pool(&app), 5);
    assert_eq!(station(&app, east).state(), StationState::Charging);
    assert_eq!(station(&app, north).state(), StationState::Unfulfilled);

    let tracker = app.world().resource::<Tracker>();
    assert_eq!(tracker.rejected.len(), 1);
    assert_eq!(tracker.rejected[0].0, StationId::from("north"));
}

#[test]
fn test_unknown_station_is_ignored() {
    let mut app = setup(100);
    spawn_station(&mut app, "north", 10, 2.0);

    interact(&mut app, "nowhere");
    app.update();

    assert_eq!(pool(&app), 100);
    let tracker = app.world().resource::<Tracker>();
    assert!(tracker.changes.is_empty());
    assert!(tracker.rejected.is_empty());
}

#[test]
fn test_reset_mid_charge_drops_the_cycle() {
    let mut app = setup(100);
    let north = spawn_station(&mut app, "north", 10, 2.0);
    interact(&mut app, "north");
    app.update();
    advance(&mut app, 1.0);

    app.world_mut().trigger(ResetStation { entity: north });
    app.update();

    assert_eq!(station(&app, north).state(), StationState::Unfulfilled);
    assert_eq!(station(&app, north).progress(), 0.0);
    assert_eq!(pool(&app), 90, "spent resource is not refunded");

    // The abandoned cycle never completes
    advance(&mut app, 5.0);
    assert!(app.world().resource::<Tracker>().fulfilled.is_empty());

    // A new begin starts a fresh cycle from zero
    interact(&mut app, "north");
    app.update();
    advance(&mut app, 2.0);

    assert_eq!(pool(&app), 80);
    assert_eq!(
        app.world().resource::<Tracker>().fulfilled,
        vec![(StationId::from("north"), 2)]
    );
}

#[test]
fn test_reset_is_idempotent() {
    let mut app = setup(100);
    let north = spawn_station(&mut app, "north", 10, 2.0);

    app.world_mut().trigger(ResetStation { entity: north });
    app.update();
    app.world_mut().trigger(ResetStation { entity: north });
    app.update();

    assert_eq!(station(&app, north).state(), StationState::Unfulfilled);
    assert!(
        app.world().resource::<Tracker>().changes.is_empty(),
        "resetting an unfulfilled station announces nothing"
    );
}

#[test]
fn test_range_tracking() {
    let mut app = setup(0);
    spawn_station(&mut app, "north", 10, 2.0);
    spawn_station(&mut app, "east", 10, 2.0);

    app.world_mut().trigger(StationRangeEntered {
        station_id: "north".into(),
    });
    app.world_mut().trigger(StationRangeEntered {
        station_id: "east".into(),
    });
    app.update();
    assert_eq!(
        app.world().resource::<NearbyStation>().0,
        Some(StationId::from("east"))
    );

    // Leaving a range we no longer hold keeps the current one
    app.world_mut().trigger(StationRangeExited {
        station_id: "north".into(),
    });
    app.update();
    assert_eq!(
        app.world().resource::<NearbyStation>().0,
        Some(StationId::from("east"))
    );

    app.world_mut().trigger(StationRangeExited {
        station_id: "east".into(),
    });
    app.update();
    assert_eq!(app.world().resource::<NearbyStation>().0, None);

    app.world_mut().trigger(StationRangeEntered {
        station_id: "ghost".into(),
    });
    app.update();
    assert_eq!(app.world().resource::<NearbyStation>().0, None);
}

#[test]
fn test_describe_prefers_display_name() {
    let mut app = setup(100);
    let north = spawn_station(&mut app, "north", 10, 2.0);
    interact(&mut app, "north");
    app.update();
    advance(&mut app, 1.0);

    let station = station(&app, north);
    assert_eq!(describe(station, None), "north [charging 50%]");
    assert_eq!(
        describe(station, Some(&DisplayName::from("North Shrine"))),
        "North Shrine [charging 50%]"
    );
}
