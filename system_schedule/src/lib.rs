use bevy::prelude::*;

/// Tick ordering for the gate simulation inside `Update`.
///
/// Sets are chained by `CorePlugin`: intake of interaction messages first,
/// then station timers, then the reveal loop, then transient animation.
#[derive(SystemSet, Debug, Hash, PartialEq, Eq, Clone)]
pub enum GameSchedule {
    Intake,
    Timers,
    Reveal,
    Animation,
    Diagnostics,
}
