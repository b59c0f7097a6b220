mod resources;


use {
    crate::resources::GateDefinitionHandle,
    bevy::{asset::LoadState, prelude::*},
    gate_assets::{GateAssetsPlugin, GateDefinition},
    pool_resources::ResourcePool,
    progress::{finish_registration, register_station},
    progress_resources::ProgressAggregator,
    reveal_components::{PopSettings, RevealSegment, RevealSequencer},
    shared_components::{DisplayName, GateError},
    states::{GameState, LoadingPhase},
    station_components::{RechargeStation, ResourcePickup, StationId},
};

pub const GATE_DEFINITION_PATH: &str = "gate.ron";

pub struct LoadingPlugin;

impl Plugin for LoadingPlugin {
    fn build(&self, app: &mut App) {
        if !app.is_plugin_added::<GateAssetsPlugin>() {
            app.add_plugins(GateAssetsPlugin);
        }

        app.init_state::<LoadingPhase>()
            // Phase: Assets - load the gate definition
            .add_systems(Startup, start_loading)
            .add_systems(
                Update,
                check_assets_loaded
                    .run_if(in_state(GameState::Loading).and(in_state(LoadingPhase::Assets))),
            )
            // Phase: SpawnGate - pool, stations, pickups and reveal
            .add_systems(OnEnter(LoadingPhase::SpawnGate), spawn_gate)
            // Phase: Ready - transition to Running
            .add_systems(OnEnter(LoadingPhase::Ready), finish_loading);
    }
}

/// What the loader built, for the setup check.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct GateSummary {
    pub stations: usize,
    pub total_cost: u32,
    pub pickups: usize,
    pub pickup_total: u32,
    pub segments: usize,
    pub pool_initial: u32,
    pub pool_max: u32,
}

impl GateSummary {
    /// Logs the setup check: what exists, and whether the gate can be
    /// opened with the resource placed in the world.
    pub fn log_setup_check(&self) {
        info!(
            "Gate setup: {} stations (total cost {}), {} pickups worth {}, {} reveal segments, pool {}/{}",
            self.stations,
            self.total_cost,
            self.pickups,
            self.pickup_total,
            self.segments,
            self.pool_initial,
            self.pool_max
        );

        if self.segments == 0 {
            warn!("Gate has nothing to reveal");
        }
        if !self.is_affordable() {
            warn!(
                "Only {} resource is available for a total station cost of {}; the gate cannot open without more",
                self.pool_initial.saturating_add(self.pickup_total),
                self.total_cost
            );
        }
    }

    /// Whether the resource placed in the world covers every station.
    pub fn is_affordable(&self) -> bool {
        self.pool_initial.saturating_add(self.pickup_total) >= self.total_cost
    }
}

// --- Phase: Assets ---

fn start_loading(mut commands: Commands, asset_server: Res<AssetServer>) {
    info!("started loading gate definition");
    let handle = asset_server.load(GATE_DEFINITION_PATH);
    commands.insert_resource(GateDefinitionHandle(handle));
}

fn check_assets_loaded(
    mut next_phase: ResMut<NextState<LoadingPhase>>,
    asset_server: Res<AssetServer>,
    handle: Res<GateDefinitionHandle>,
) {
    match asset_server.load_state(&handle.0) {
        LoadState::Loaded => {
            info!("gate definition loaded");
            next_phase.set(LoadingPhase::SpawnGate);
        }
        LoadState::Failed(err) => {
            // Keep going with an empty gate so the rest of the session runs
            error!("Failed to load '{}': {}", GATE_DEFINITION_PATH, err);
            next_phase.set(LoadingPhase::SpawnGate);
        }
        _ => {}
    }
}

// --- Phase: SpawnGate ---

fn spawn_gate(
    mut commands: Commands,
    handle: Res<GateDefinitionHandle>,
    definitions: Res<Assets<GateDefinition>>,
    mut aggregator: ResMut<ProgressAggregator>,
    mut next_phase: ResMut<NextState<LoadingPhase>>,
) {
    match definitions.get(&handle.0) {
        Some(definition) => match build_gate(&mut commands, definition, &mut aggregator) {
            Ok(summary) => summary.log_setup_check(),
            Err(e) => {
                error!("Gate definition rejected: {}", e);
                let _ = finish_registration(&mut aggregator);
            }
        },
        None => {
            let _ = finish_registration(&mut aggregator);
        }
    }

    next_phase.set(LoadingPhase::Ready);
}

/// Spawns everything a definition describes and locks in the station
/// registry.
///
/// Stations with bad parameters are skipped with an error; the rest of the
/// gate is still built. A definition that fails validation builds nothing.
pub fn build_gate(
    commands: &mut Commands,
    definition: &GateDefinition,
    aggregator: &mut ProgressAggregator,
) -> Result<GateSummary, GateError> {
    definition.validate()?;
    let pop = PopSettings::from_secs(definition.reveal.pop_secs, definition.reveal.pop_scale)?;

    let pool = ResourcePool::with_current(definition.pool.initial, definition.pool.max)?;
    let mut summary = GateSummary {
        pool_initial: pool.current(),
        pool_max: pool.max(),
        ..default()
    };
    commands.insert_resource(pool);

    for def in &definition.stations {
        let station = match RechargeStation::new(def.id.as_str(), def.cost, def.recharge_secs) {
            Ok(station) => station,
            Err(e) => {
                error!("Skipping station '{}': {}", def.id, e);
                continue;
            }
        };
        let display = def.name.clone().unwrap_or_else(|| def.id.clone());
        let entity = commands
            .spawn((
                station,
                Name::new(def.id.clone()),
                DisplayName(display),
                Transform::from_xyz(def.position[0], def.position[1], 0.0),
            ))
            .id();

        if register_station(aggregator, StationId::from(def.id.as_str()), entity).is_ok() {
            summary.stations += 1;
            summary.total_cost = summary.total_cost.saturating_add(def.cost);
        }
        debug!("Spawned station: {} -> {:?}", def.id, entity);
    }
    // An empty registry is logged inside; the gate stays closed for the session
    let _ = finish_registration(aggregator);

    for (i, def) in definition.pickups.iter().enumerate() {
        commands.spawn((
            ResourcePickup::new(def.amount),
            Name::new(format!("pickup_{i}")),
            Transform::from_xyz(def.position[0], def.position[1], 0.0),
        ));
        summary.pickups += 1;
        summary.pickup_total = summary.pickup_total.saturating_add(def.amount);
    }

    let reveal = &definition.reveal;
    let segments: Vec<Entity> = (0..reveal.segments)
        .map(|index| {
            commands
                .spawn((
                    RevealSegment::new(index),
                    Name::new(format!("reveal_segment_{index}")),
                    Transform::from_xyz(index as f32 * reveal.segment_spacing, 0.0, 0.0),
                    Visibility::Hidden,
                ))
                .id()
        })
        .collect();
    summary.segments = segments.len();

    commands.spawn((
        RevealSequencer::new(segments, reveal.delay_secs)?.with_pop(pop),
        Name::new("reveal_sequencer"),
    ));

    Ok(summary)
}

// --- Phase: Ready ---

fn finish_loading(mut next_state: ResMut<NextState<GameState>>) {
    info!("Loading complete, transitioning to Running");
    next_state.set(GameState::Running);
}
