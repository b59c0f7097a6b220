use {
    crate::{MisconfiguredSequencers, StartedThisTick},
    bevy::prelude::*,
    gate_events::{
        AllStationsSatisfied, ResetReveal, SegmentActivated, SequenceCompleted, StartReveal,
    },
    reveal_components::{Activation, PopSettings, RevealSegment, RevealSequencer, SegmentPop},
    shared_components::GateError,
};

type SegmentQuery<'w, 's> =
    Query<'w, 's, (&'static mut RevealSegment, Option<&'static mut Visibility>)>;

/// Switches one segment on and announces it.
fn apply_activation(
    sequencer: Entity,
    activation: Activation,
    pop: PopSettings,
    segments: &mut SegmentQuery,
    commands: &mut Commands,
) {
    match segments.get_mut(activation.segment) {
        Ok((mut segment, visibility)) => {
            segment.active = true;
            if let Some(mut visibility) = visibility {
                *visibility = Visibility::Visible;
            }
            commands
                .entity(activation.segment)
                .insert(SegmentPop::new(pop, segment.base_scale));
        }
        Err(_) => warn!(
            "Reveal segment {:?} of {:?} is not a segment; announcing it anyway",
            activation.segment, sequencer
        ),
    }

    commands.trigger(SegmentActivated {
        sequencer,
        segment: activation.segment,
        index: activation.index,
    });
    debug!("Reveal {:?}: segment {} active", sequencer, activation.index);

    if activation.finished {
        commands.trigger(SequenceCompleted { sequencer });
        info!("Reveal {:?} complete", sequencer);
    }
}

/// Starts a sequencer and activates its first segment in the same call.
fn start_sequencer(
    entity: Entity,
    sequencer: &mut RevealSequencer,
    segments: &mut SegmentQuery,
    misconfigured: &mut MisconfiguredSequencers,
    commands: &mut Commands,
) {
    match sequencer.start() {
        Ok(()) => {
            info!(
                "Reveal {:?} started over {} segments",
                entity,
                sequencer.total_segments()
            );
            commands.entity(entity).insert(StartedThisTick);
            if let Some(activation) = sequencer.activate_next() {
                apply_activation(entity, activation, sequencer.pop(), segments, commands);
            }
        }
        Err(GateError::Configuration(reason)) => {
            if misconfigured.reported.insert(entity) {
                error!("Reveal {:?} cannot start: {}", entity, reason);
            }
        }
        Err(e) => warn!("Reveal {:?} not started: {}", entity, e),
    }
}

pub fn on_all_stations_satisfied(
    _trigger: On<AllStationsSatisfied>,
    mut sequencers: Query<(Entity, &mut RevealSequencer)>,
    mut segments: SegmentQuery,
    mut misconfigured: ResMut<MisconfiguredSequencers>,
    mut commands: Commands,
) {
    for (entity, mut sequencer) in sequencers.iter_mut() {
        start_sequencer(
            entity,
            &mut sequencer,
            &mut segments,
            &mut misconfigured,
            &mut commands,
        );
    }
}

pub fn on_start_reveal(
    trigger: On<StartReveal>,
    mut sequencers: Query<&mut RevealSequencer>,
    mut segments: SegmentQuery,
    mut misconfigured: ResMut<MisconfiguredSequencers>,
    mut commands: Commands,
) {
    let entity = trigger.event().entity;
    let Ok(mut sequencer) = sequencers.get_mut(entity) else {
        warn!("StartReveal targeted {:?}, which has no sequencer", entity);
        return;
    };
    start_sequencer(
        entity,
        &mut sequencer,
        &mut segments,
        &mut misconfigured,
        &mut commands,
    );
}

/// Activates the next segment of each running sequencer once its delay
/// has accumulated.
pub fn advance_reveal(
    time: Res<Time>,
    mut sequencers: Query<(Entity, &mut RevealSequencer, Has<StartedThisTick>)>,
    mut segments: SegmentQuery,
    mut commands: Commands,
) {
    let delta = time.delta();
    for (entity, mut sequencer, just_started) in sequencers.iter_mut() {
        if just_started {
            commands.entity(entity).remove::<StartedThisTick>();
            continue;
        }
        if !sequencer.is_running() {
            continue;
        }
        if let Some(activation) = sequencer.advance(delta) {
            apply_activation(
                entity,
                activation,
                sequencer.pop(),
                &mut segments,
                &mut commands,
            );
        }
    }
}

/// Plays segment pops. Finished pops snap back to base scale and are removed.
pub fn animate_pops(
    time: Res<Time>,
    mut pops: Query<(Entity, &mut SegmentPop, Option<&mut Transform>)>,
    mut commands: Commands,
) {
    for (entity, mut pop, transform) in pops.iter_mut() {
        pop.timer.tick(time.delta());
        let finished = pop.timer.is_finished();

        if let Some(mut transform) = transform {
            transform.scale = if finished {
                pop.base_scale
            } else {
                pop.current_scale()
            };
        }
        if finished {
            commands.entity(entity).remove::<SegmentPop>();
        }
    }
}

/// Cancels a run and hides every segment. Safe in any state.
pub fn on_reset_reveal(
    trigger: On<ResetReveal>,
    mut sequencers: Query<&mut RevealSequencer>,
    mut segments: Query<(
        &mut RevealSegment,
        Option<&mut Visibility>,
        Option<&mut Transform>,
    )>,
    mut commands: Commands,
) {
    let entity = trigger.event().entity;
    let Ok(mut sequencer) = sequencers.get_mut(entity) else {
        warn!("ResetReveal targeted {:?}, which has no sequencer", entity);
        return;
    };

    let was_active = sequencer.reset();
    for &segment_entity in sequencer.segments() {
        let Ok((mut segment, visibility, transform)) = segments.get_mut(segment_entity) else {
            continue;
        };
        segment.active = false;
        if let Some(mut visibility) = visibility {
            *visibility = Visibility::Hidden;
        }
        if let Some(mut transform) = transform {
            transform.scale = segment.base_scale;
        }
        commands.entity(segment_entity).remove::<SegmentPop>();
    }

    if was_active {
        info!("Reveal {:?} reset", entity);
    }
}
