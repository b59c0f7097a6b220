use {
    bevy::prelude::*,
    pool_resources::{ResourcePool, SpendReceipt},
    shared_components::{GateError, duration_from_secs},
    std::{fmt, time::Duration},
};

pub struct StationComponentsPlugin;

impl Plugin for StationComponentsPlugin {
    fn build(&self, app: &mut App) {
        app.register_type::<StationId>()
            .register_type::<StationState>()
            .register_type::<RechargeStation>()
            .register_type::<ResourcePickup>();
    }
}

/// Stable identifier of a station, as written in the gate definition.
#[derive(Reflect, Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct StationId(pub String);

impl fmt::Display for StationId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for StationId {
    fn from(s: &str) -> Self {
        Self(s.to_string())
    }
}

impl From<String> for StationId {
    fn from(s: String) -> Self {
        Self(s)
    }
}

#[derive(Reflect, Default, Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum StationState {
    #[default]
    Unfulfilled,
    Charging,
    Charged,
}

impl StationState {
    pub fn as_str(&self) -> &'static str {
        match self {
            StationState::Unfulfilled => "unfulfilled",
            StationState::Charging => "charging",
            StationState::Charged => "charged",
        }
    }
}

impl fmt::Display for StationState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Outcome of advancing a station by one tick.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ChargeTick {
    /// Not charging; nothing happened.
    Idle,
    /// Still charging, with the new progress.
    Progressed(f32),
    /// Crossed the duration on this tick. Reported once per cycle.
    Completed { cycle: u32 },
}

/// A recharge station: pays `cost` from the pool, then charges for
/// `duration` before it counts as fulfilled.
///
/// `Unfulfilled -> Charging -> Charged`, and back to `Unfulfilled` only
/// through [`RechargeStation::reset`]. `cycle` is bumped by every successful
/// begin so that completion notices from a reset cycle can be told apart.
#[derive(Component, Reflect, Debug, Clone)]
#[reflect(Component)]
pub struct RechargeStation {
    id: StationId,
    cost: u32,
    duration: Duration,
    state: StationState,
    charge: Timer,
    cycle: u32,
}

impl RechargeStation {
    pub fn new(id: impl Into<StationId>, cost: u32, duration_secs: f32) -> Result<Self, GateError> {
        let id = id.into();
        if cost == 0 {
            return Err(GateError::InvalidDefinition(format!(
                "station '{id}' must cost more than zero"
            )));
        }
        if !duration_secs.is_finite() || duration_secs <= 0.0 {
            return Err(GateError::InvalidDefinition(format!(
                "station '{id}' needs a positive recharge duration, got {duration_secs}"
            )));
        }

        let duration =
            duration_from_secs(&format!("station '{id}' recharge duration"), duration_secs)?;
        Ok(Self {
            id,
            cost,
            duration,
            state: StationState::Unfulfilled,
            charge: Timer::new(duration, TimerMode::Once),
            cycle: 0,
        })
    }

    pub fn id(&self) -> &StationId {
        &self.id
    }

    pub fn cost(&self) -> u32 {
        self.cost
    }

    pub fn duration(&self) -> Duration {
        self.duration
    }

    pub fn state(&self) -> StationState {
        self.state
    }

    pub fn cycle(&self) -> u32 {
        self.cycle
    }

    /// Charge progress in `0.0..=1.0`. Only moves while charging.
    pub fn progress(&self) -> f32 {
        match self.state {
            StationState::Unfulfilled => 0.0,
            StationState::Charging => self.charge.fraction(),
            StationState::Charged => 1.0,
        }
    }

    pub fn can_recharge(&self, pool: &ResourcePool) -> bool {
        self.state == StationState::Unfulfilled && pool.has_at_least(self.cost)
    }

    /// Pays the cost and starts charging.
    ///
    /// Rejected without touching the pool unless the station is
    /// `Unfulfilled`; a failed spend leaves both station and pool as they
    /// were.
    pub fn begin_recharge(&mut self, pool: &mut ResourcePool) -> Result<SpendReceipt, GateError> {
        if self.state != StationState::Unfulfilled {
            return Err(GateError::InvalidTransition {
                operation: "begin recharge",
                state: self.state.as_str(),
            });
        }

        let receipt = pool.try_spend(self.cost)?;

        self.state = StationState::Charging;
        self.charge = Timer::new(self.duration, TimerMode::Once);
        self.cycle = self.cycle.wrapping_add(1);
        Ok(receipt)
    }

    /// Accumulates `delta` into the charge timer.
    pub fn advance(&mut self, delta: Duration) -> ChargeTick {
        if self.state != StationState::Charging {
            return ChargeTick::Idle;
        }

        self.charge.tick(delta);
        if self.charge.is_finished() {
            self.state = StationState::Charged;
            ChargeTick::Completed { cycle: self.cycle }
        } else {
            ChargeTick::Progressed(self.charge.fraction())
        }
    }

    /// Back to `Unfulfilled`, dropping any charge in flight. Spent resource
    /// stays spent. Returns whether anything changed.
    pub fn reset(&mut self) -> bool {
        let changed = self.state != StationState::Unfulfilled;
        self.state = StationState::Unfulfilled;
        self.charge = Timer::new(self.duration, TimerMode::Once);
        changed
    }
}

/// A one-shot resource pickup lying in the world.
#[derive(Component, Reflect, Debug, Clone, PartialEq, Eq)]
#[reflect(Component)]
pub struct ResourcePickup {
    pub amount: u32,
    pub collected: bool,
}

impl ResourcePickup {
    pub fn new(amount: u32) -> Self {
        Self {
            amount,
            collected: false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn pool(current: u32) -> ResourcePool {
        ResourcePool::with_current(current, 100).unwrap()
    }

    #[test]
    fn test_rejects_bad_parameters() {
        assert!(RechargeStation::new("a", 0, 1.0).is_err());
        assert!(RechargeStation::new("a", 10, 0.0).is_err());
        assert!(RechargeStation::new("a", 10, -1.0).is_err());
        assert!(RechargeStation::new("a", 10, f32::NAN).is_err());
        // finite and positive, but beyond what a Duration can hold
        assert!(matches!(
            RechargeStation::new("a", 10, 1e20),
            Err(GateError::InvalidDefinition(_))
        ));
    }

    #[test]
    fn test_begin_spends_and_charges() {
        let mut pool = pool(50);
        let mut station = RechargeStation::new("north", 10, 2.0).unwrap();

        let receipt = station.begin_recharge(&mut pool).unwrap();
        assert_eq!(receipt.current, 40);
        assert_eq!(pool.current(), 40);
        assert_eq!(station.state(), StationState::Charging);
        assert_eq!(station.cycle(), 1);
        assert_eq!(station.progress(), 0.0);
    }

    #[test]
    fn test_insufficient_resource_changes_nothing() {
        let mut pool = pool(5);
        let mut station = RechargeStation::new("north", 10, 2.0).unwrap();

        let err = station.begin_recharge(&mut pool).unwrap_err();
        assert!(matches!(err, GateError::ResourceInsufficient { .. }));
        assert_eq!(pool.current(), 5);
        assert_eq!(station.state(), StationState::Unfulfilled);
        assert_eq!(station.cycle(), 0);
    }

    #[test]
    fn test_second_begin_is_rejected_without_spending() {
        let mut pool = pool(50);
        let mut station = RechargeStation::new("north", 10, 2.0).unwrap();
        station.begin_recharge(&mut pool).unwrap();

        let err = station.begin_recharge(&mut pool).unwrap_err();
        assert!(matches!(err, GateError::InvalidTransition { .. }));
        assert_eq!(pool.current(), 40);
        assert_eq!(station.cycle(), 1);
    }

    #[test]
    fn test_advance_completes_exactly_once() {
        let mut pool = pool(50);
        let mut station = RechargeStation::new("north", 10, 1.0).unwrap();
        station.begin_recharge(&mut pool).unwrap();

        let mut last = 0.0;
        for _ in 0..4 {
            match station.advance(Duration::from_millis(200)) {
                ChargeTick::Progressed(p) => {
                    assert!(p > last, "progress must rise");
                    last = p;
                }
                other => panic!("unexpected tick {other:?}"),
            }
        }

        assert_eq!(
            station.advance(Duration::from_millis(300)),
            ChargeTick::Completed { cycle: 1 }
        );
        assert_eq!(station.state(), StationState::Charged);
        assert_eq!(station.progress(), 1.0);

        // Charged is terminal for the timer
        assert_eq!(station.advance(Duration::from_secs(5)), ChargeTick::Idle);
    }

    #[test]
    fn test_charged_rejects_begin() {
        let mut pool = pool(50);
        let mut station = RechargeStation::new("north", 10, 1.0).unwrap();
        station.begin_recharge(&mut pool).unwrap();
        station.advance(Duration::from_secs(2));

        assert!(station.begin_recharge(&mut pool).is_err());
        assert_eq!(pool.current(), 40);
    }

    #[test]
    fn test_reset_does_not_refund_and_is_idempotent() {
        let mut pool = pool(50);
        let mut station = RechargeStation::new("north", 10, 1.0).unwrap();
        station.begin_recharge(&mut pool).unwrap();
        station.advance(Duration::from_millis(500));

        assert!(station.reset());
        assert_eq!(station.state(), StationState::Unfulfilled);
        assert_eq!(station.progress(), 0.0);
        assert_eq!(pool.current(), 40);

        let first = (station.state(), station.progress(), station.cycle());
        assert!(!station.reset());
        let second = (station.state(), station.progress(), station.cycle());
        assert_eq!(first, second);

        // A reset station never completes on its own
        assert_eq!(station.advance(Duration::from_secs(5)), ChargeTick::Idle);
    }

    #[test]
    fn test_can_recharge() {
        let mut pool = pool(10);
        let mut station = RechargeStation::new("north", 10, 1.0).unwrap();
        assert!(station.can_recharge(&pool));

        station.begin_recharge(&mut pool).unwrap();
        pool.add(50);
        assert!(!station.can_recharge(&pool), "charging stations cannot recharge");

        station.reset();
        assert!(station.can_recharge(&pool));
        assert!(!station.can_recharge(&ResourcePool::with_current(9, 100).unwrap()));
    }
}
