use {
    bevy::{platform::collections::HashSet, prelude::*},
    bevy_common_assets::ron::RonAssetPlugin,
    serde::{Deserialize, Serialize},
    shared_components::{GateError, duration_from_secs},
};

pub struct GateAssetsPlugin;

impl Plugin for GateAssetsPlugin {
    fn build(&self, app: &mut App) {
        app.add_plugins(RonAssetPlugin::<GateDefinition>::new(&["gate.ron"]));
    }
}

// --- Asset Definition ---

/// Data-driven description of one gate: the pool, the stations, the
/// pickups scattered around them and the structure that is revealed.
#[derive(Asset, TypePath, Debug, Clone, Deserialize, Serialize)]
pub struct GateDefinition {
    pub pool: PoolDefinition,
    pub stations: Vec<StationDefinition>,
    #[serde(default)]
    pub pickups: Vec<PickupDefinition>,
    pub reveal: RevealDefinition,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct PoolDefinition {
    pub max: u32,
    #[serde(default)]
    pub initial: u32,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct StationDefinition {
    pub id: String,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default = "default_station_cost")]
    pub cost: u32,
    #[serde(default = "default_recharge_secs")]
    pub recharge_secs: f32,
    #[serde(default)]
    pub position: [f32; 2],
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct PickupDefinition {
    pub amount: u32,
    #[serde(default)]
    pub position: [f32; 2],
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct RevealDefinition {
    pub segments: usize,
    #[serde(default = "default_segment_delay")]
    pub delay_secs: f32,
    #[serde(default = "default_pop_secs")]
    pub pop_secs: f32,
    #[serde(default = "default_pop_scale")]
    pub pop_scale: f32,
    /// Distance between consecutive segments along the x axis.
    #[serde(default = "default_segment_spacing")]
    pub segment_spacing: f32,
}

fn default_station_cost() -> u32 {
    10
}

fn default_recharge_secs() -> f32 {
    2.0
}

fn default_segment_delay() -> f32 {
    0.5
}

fn default_pop_secs() -> f32 {
    0.3
}

fn default_pop_scale() -> f32 {
    1.2
}

fn default_segment_spacing() -> f32 {
    32.0
}

impl GateDefinition {
    /// Rejects definitions that cannot be built at all. Empty station or
    /// segment lists are not rejected here; the loader reports them as
    /// configuration errors and keeps the rest of the gate usable.
    pub fn validate(&self) -> Result<(), GateError> {
        if self.pool.max == 0 {
            return Err(GateError::InvalidDefinition(
                "pool max must be greater than zero".into(),
            ));
        }

        let mut seen = HashSet::new();
        for station in &self.stations {
            if station.id.is_empty() {
                return Err(GateError::InvalidDefinition(
                    "station id must not be empty".into(),
                ));
            }
            if !seen.insert(station.id.as_str()) {
                return Err(GateError::DuplicateStation(station.id.clone()));
            }
        }

        duration_from_secs("segment delay", self.reveal.delay_secs)?;
        duration_from_secs("pop duration", self.reveal.pop_secs)?;
        Ok(())
    }
}
