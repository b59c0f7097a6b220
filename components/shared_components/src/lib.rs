use {bevy::prelude::*, std::time::Duration, thiserror::Error};

pub struct SharedComponentsPlugin;

impl Plugin for SharedComponentsPlugin {
    fn build(&self, app: &mut App) {
        app.register_type::<DisplayName>();
    }
}

/// Failure taxonomy shared by every gate crate.
///
/// None of these are fatal. Callers get them back as `Err` and decide how to
/// surface them; configuration defects are additionally logged at setup.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum GateError {
    /// A required collaborator is missing (no stations, no segments).
    #[error("configuration error: {0}")]
    Configuration(String),

    /// The state machine is not in the state the operation requires.
    #[error("invalid transition: cannot {operation} while {state}")]
    InvalidTransition {
        operation: &'static str,
        state: &'static str,
    },

    /// The pool cannot cover the requested spend.
    #[error("insufficient resource: requested {requested}, available {available}")]
    ResourceInsufficient { requested: u32, available: u32 },

    /// Spends and construction parameters must be strictly positive.
    #[error("amount must be greater than zero")]
    InvalidAmount,

    #[error("station '{0}' is already registered")]
    DuplicateStation(String),

    #[error("station registry is locked; register stations before the gate starts")]
    RegistryLocked,

    #[error("invalid gate definition: {0}")]
    InvalidDefinition(String),
}

impl GateError {
    /// True for failures a player can cause (as opposed to wiring defects).
    pub fn is_rejection(&self) -> bool {
        matches!(
            self,
            GateError::InvalidTransition { .. } | GateError::ResourceInsufficient { .. }
        )
    }
}

/// Converts a configured number of seconds into a `Duration`.
///
/// Negative, NaN and values too large for a `Duration` are rejected; `what`
/// names the setting in the error.
pub fn duration_from_secs(what: &str, secs: f32) -> Result<Duration, GateError> {
    if secs < 0.0 {
        return Err(GateError::InvalidDefinition(format!(
            "{what} must be non-negative, got {secs}"
        )));
    }
    Duration::try_from_secs_f32(secs).map_err(|e| {
        GateError::InvalidDefinition(format!("{what} of {secs}s is not a usable duration: {e}"))
    })
}

#[derive(Component, Reflect, Default, Debug, Clone, PartialEq, Deref, DerefMut)]
#[reflect(Component, Default)]
pub struct DisplayName(pub String);

impl From<&str> for DisplayName {
    fn from(s: &str) -> Self {
        Self(s.to_string())
    }
}

impl From<String> for DisplayName {
    fn from(s: String) -> Self {
        Self(s)
    }
}
