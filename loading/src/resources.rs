//! Resources used while the gate definition is loading

use {bevy::prelude::*, gate_assets::GateDefinition};

#[derive(Debug, Resource)]
pub(super) struct GateDefinitionHandle(pub Handle<GateDefinition>);
