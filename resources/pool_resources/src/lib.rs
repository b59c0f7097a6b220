use {bevy::prelude::*, shared_components::GateError};

/// The single bounded counter every station spends from.
///
/// `current` never leaves `0..=max`; the fields are private so every
/// mutation goes through the methods below. Notifications are not sent from
/// here: `pool::add_and_notify` and `pool::notify_spend` follow these calls
/// and trigger `ResourceChanged` / `ResourceDepleted`.
#[derive(Resource, Reflect, Debug, Clone, PartialEq, Eq)]
#[reflect(Resource)]
pub struct ResourcePool {
    current: u32,
    max: u32,
}

/// Result of a successful spend.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SpendReceipt {
    pub spent: u32,
    pub current: u32,
    /// The pool hit zero with this spend.
    pub depleted: bool,
}

pub const DEFAULT_POOL_MAX: u32 = 100;

impl Default for ResourcePool {
    fn default() -> Self {
        Self {
            current: 0,
            max: DEFAULT_POOL_MAX,
        }
    }
}

impl ResourcePool {
    /// Empty pool with capacity `max`. Zero capacity is rejected so that
    /// `percentage` is always defined.
    pub fn new(max: u32) -> Result<Self, GateError> {
        Self::with_current(0, max)
    }

    /// Pool starting at `current`, clamped to `max`.
    pub fn with_current(current: u32, max: u32) -> Result<Self, GateError> {
        if max == 0 {
            return Err(GateError::Configuration(
                "resource pool max must be greater than zero".into(),
            ));
        }
        Ok(Self {
            current: current.min(max),
            max,
        })
    }

    pub fn current(&self) -> u32 {
        self.current
    }

    pub fn max(&self) -> u32 {
        self.max
    }

    /// Adds up to the cap. Returns whether the stored value changed, which is
    /// false for a zero amount or an already full pool.
    pub fn add(&mut self, amount: u32) -> bool {
        let before = self.current;
        self.current = self.current.saturating_add(amount).min(self.max);
        self.current != before
    }

    /// Spends `amount` if the pool can cover it. A failed spend leaves the
    /// pool untouched.
    pub fn try_spend(&mut self, amount: u32) -> Result<SpendReceipt, GateError> {
        if amount == 0 {
            return Err(GateError::InvalidAmount);
        }
        if self.current < amount {
            return Err(GateError::ResourceInsufficient {
                requested: amount,
                available: self.current,
            });
        }

        self.current -= amount;
        Ok(SpendReceipt {
            spent: amount,
            current: self.current,
            depleted: self.current == 0,
        })
    }

    pub fn has_at_least(&self, amount: u32) -> bool {
        self.current >= amount
    }

    /// Fill level in `0.0..=1.0`.
    pub fn percentage(&self) -> f32 {
        self.current as f32 / self.max as f32
    }

    /// Sets the pool to capacity. Returns whether the value changed.
    pub fn fill(&mut self) -> bool {
        let before = self.current;
        self.current = self.max;
        self.current != before
    }
}
