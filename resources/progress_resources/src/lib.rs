use {
    bevy::{
        platform::collections::{HashMap, HashSet},
        prelude::*,
    },
    shared_components::GateError,
    station_components::StationId,
};

/// Why a fulfilment notice did not count.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IgnoredBecause {
    AlreadyCompleted,
    Misconfigured,
    Unregistered,
    AlreadyCounted,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Fulfilment {
    Counted { satisfied: usize, total: usize },
    /// This notice satisfied the last station. Reported once per cycle.
    AllSatisfied,
    Ignored(IgnoredBecause),
}

/// Tracks the registered stations and detects the all-satisfied condition.
///
/// Holds station identity and entity handles only; it never owns or
/// despawns stations. `total` is fixed when the registry is locked in at the
/// end of setup. With nothing registered the aggregator is misconfigured and
/// completion detection stays off for the session.
#[derive(Resource, Default, Debug)]
pub struct ProgressAggregator {
    registered: HashMap<StationId, Entity>,
    satisfied: HashSet<StationId>,
    total: usize,
    satisfied_count: usize,
    completed: bool,
    locked: bool,
    misconfigured: bool,
}

impl ProgressAggregator {
    pub fn register(&mut self, id: StationId, entity: Entity) -> Result<(), GateError> {
        if self.locked {
            return Err(GateError::RegistryLocked);
        }
        if self.registered.contains_key(&id) {
            return Err(GateError::DuplicateStation(id.0));
        }
        self.registered.insert(id, entity);
        Ok(())
    }

    /// Fixes `total` to the registered count. Repeated calls are no-ops.
    pub fn lock_in(&mut self) -> Result<usize, GateError> {
        if self.locked {
            return if self.misconfigured {
                Err(Self::no_stations())
            } else {
                Ok(self.total)
            };
        }

        self.locked = true;
        self.total = self.registered.len();
        if self.total == 0 {
            self.misconfigured = true;
            return Err(Self::no_stations());
        }
        Ok(self.total)
    }

    fn no_stations() -> GateError {
        GateError::Configuration("progress aggregator has no registered stations".into())
    }

    /// Counts a station that finished charging.
    ///
    /// Duplicate or late notices are ignored: once completed, nothing more is
    /// counted until [`ProgressAggregator::reset_counts`], and each station
    /// counts at most once per cycle.
    pub fn on_station_fulfilled(&mut self, id: &StationId) -> Fulfilment {
        if self.completed {
            return Fulfilment::Ignored(IgnoredBecause::AlreadyCompleted);
        }
        if !self.locked {
            let _ = self.lock_in();
        }
        if self.misconfigured {
            return Fulfilment::Ignored(IgnoredBecause::Misconfigured);
        }
        if !self.registered.contains_key(id) {
            return Fulfilment::Ignored(IgnoredBecause::Unregistered);
        }
        if !self.satisfied.insert(id.clone()) {
            return Fulfilment::Ignored(IgnoredBecause::AlreadyCounted);
        }

        self.satisfied_count += 1;
        if self.satisfied_count >= self.total {
            self.completed = true;
            Fulfilment::AllSatisfied
        } else {
            Fulfilment::Counted {
                satisfied: self.satisfied_count,
                total: self.total,
            }
        }
    }

    /// Override: marks the gate complete regardless of station state.
    pub fn force_complete(&mut self) {
        if !self.locked {
            let _ = self.lock_in();
        }
        self.completed = true;
        self.satisfied_count = self.total;
    }

    /// Clears progress. Stations themselves are reset by the caller.
    pub fn reset_counts(&mut self) {
        self.completed = false;
        self.satisfied_count = 0;
        self.satisfied.clear();
    }

    pub fn stations(&self) -> impl Iterator<Item = (&StationId, Entity)> + '_ {
        self.registered.iter().map(|(id, entity)| (id, *entity))
    }

    pub fn entity_of(&self, id: &StationId) -> Option<Entity> {
        self.registered.get(id).copied()
    }

    pub fn registered_count(&self) -> usize {
        self.registered.len()
    }

    pub fn total(&self) -> usize {
        self.total
    }

    pub fn satisfied_count(&self) -> usize {
        self.satisfied_count
    }

    pub fn is_completed(&self) -> bool {
        self.completed
    }

    pub fn is_locked(&self) -> bool {
        self.locked
    }

    pub fn is_misconfigured(&self) -> bool {
        self.misconfigured
    }

    /// Satisfied fraction in `0.0..=1.0`; zero when nothing is registered.
    pub fn progress(&self) -> f32 {
        if self.total == 0 {
            return 0.0;
        }
        self.satisfied_count as f32 / self.total as f32
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn aggregator(ids: &[&str]) -> ProgressAggregator {
        let mut world = World::new();
        let mut aggregator = ProgressAggregator::default();
        for id in ids {
            let entity = world.spawn_empty().id();
            aggregator.register(StationId::from(*id), entity).unwrap();
        }
        aggregator
    }

    #[test]
    fn test_duplicate_registration_is_rejected() {
        let mut world = World::new();
        let mut aggregator = ProgressAggregator::default();
        let entity = world.spawn_empty().id();
        aggregator.register("a".into(), entity).unwrap();

        assert_eq!(
            aggregator.register("a".into(), entity),
            Err(GateError::DuplicateStation("a".into()))
        );
        assert_eq!(aggregator.registered_count(), 1);
    }

    #[test]
    fn test_registration_after_lock_in_is_rejected() {
        let mut aggregator = aggregator(&["a"]);
        assert_eq!(aggregator.lock_in(), Ok(1));

        let mut world = World::new();
        let late = world.spawn_empty().id();
        assert_eq!(
            aggregator.register("b".into(), late),
            Err(GateError::RegistryLocked)
        );
        assert_eq!(aggregator.total(), 1);
    }

    #[test]
    fn test_completes_once_after_all_stations() {
        let mut aggregator = aggregator(&["a", "b", "c"]);
        aggregator.lock_in().unwrap();

        assert_eq!(
            aggregator.on_station_fulfilled(&"a".into()),
            Fulfilment::Counted {
                satisfied: 1,
                total: 3
            }
        );
        aggregator.on_station_fulfilled(&"b".into());
        assert_eq!(aggregator.satisfied_count(), 2);
        assert!(!aggregator.is_completed());

        assert_eq!(
            aggregator.on_station_fulfilled(&"c".into()),
            Fulfilment::AllSatisfied
        );
        assert!(aggregator.is_completed());

        assert_eq!(
            aggregator.on_station_fulfilled(&"c".into()),
            Fulfilment::Ignored(IgnoredBecause::AlreadyCompleted)
        );
        assert_eq!(aggregator.satisfied_count(), 3);
    }

    #[test]
    fn test_same_station_counts_once() {
        let mut aggregator = aggregator(&["a", "b"]);
        aggregator.lock_in().unwrap();

        aggregator.on_station_fulfilled(&"a".into());
        assert_eq!(
            aggregator.on_station_fulfilled(&"a".into()),
            Fulfilment::Ignored(IgnoredBecause::AlreadyCounted)
        );
        assert_eq!(aggregator.satisfied_count(), 1);
        assert!(!aggregator.is_completed());
    }

    #[test]
    fn test_unregistered_station_is_ignored() {
        let mut aggregator = aggregator(&["a"]);
        aggregator.lock_in().unwrap();
        assert_eq!(
            aggregator.on_station_fulfilled(&"ghost".into()),
            Fulfilment::Ignored(IgnoredBecause::Unregistered)
        );
    }

    #[test]
    fn test_empty_registry_is_misconfigured() {
        let mut aggregator = ProgressAggregator::default();
        assert!(matches!(
            aggregator.lock_in(),
            Err(GateError::Configuration(_))
        ));
        assert!(aggregator.is_misconfigured());
        assert_eq!(
            aggregator.on_station_fulfilled(&"a".into()),
            Fulfilment::Ignored(IgnoredBecause::Misconfigured)
        );
        assert!(!aggregator.is_completed());
        assert_eq!(aggregator.progress(), 0.0);
    }

    #[test]
    fn test_lazy_lock_in_on_first_notice() {
        let mut aggregator = aggregator(&["a", "b"]);
        aggregator.on_station_fulfilled(&"a".into());
        assert!(aggregator.is_locked());
        assert_eq!(aggregator.total(), 2);
    }

    #[test]
    fn test_force_complete_overrides_counts() {
        let mut aggregator = aggregator(&["a", "b", "c"]);
        aggregator.lock_in().unwrap();
        aggregator.on_station_fulfilled(&"a".into());

        aggregator.force_complete();
        assert!(aggregator.is_completed());
        assert_eq!(aggregator.satisfied_count(), 3);
        assert_eq!(aggregator.progress(), 1.0);
    }

    #[test]
    fn test_reset_counts_starts_a_new_cycle() {
        let mut aggregator = aggregator(&["a"]);
        aggregator.lock_in().unwrap();
        assert_eq!(
            aggregator.on_station_fulfilled(&"a".into()),
            Fulfilment::AllSatisfied
        );

        aggregator.reset_counts();
        assert!(!aggregator.is_completed());
        assert_eq!(aggregator.satisfied_count(), 0);
        assert_eq!(
            aggregator.on_station_fulfilled(&"a".into()),
            Fulfilment::AllSatisfied
        );
    }
}
