use bevy::prelude::*;

/// Top-level lifecycle of the gate session.
///
/// Interaction traffic is only processed while `Running`; everything the
/// setup layer does (spawning stations, registering them, locking in the
/// aggregator) happens during `Loading`.
#[derive(States, Default, Debug, Clone, PartialEq, Eq, Hash)]
pub enum GameState {
    #[default]
    Loading,
    Running,
}

#[derive(States, Default, Debug, Clone, PartialEq, Eq, Hash)]
pub enum LoadingPhase {
    #[default]
    Assets,
    SpawnGate, // Spawn pool, stations, pickups and reveal segments from the definition
    Ready,
}
