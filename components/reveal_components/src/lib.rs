use {
    bevy::{
        math::curve::{
            Curve,
            easing::{EaseFunction, EasingCurve},
        },
        prelude::*,
    },
    shared_components::{GateError, duration_from_secs},
    std::time::Duration,
};

pub struct RevealComponentsPlugin;

impl Plugin for RevealComponentsPlugin {
    fn build(&self, app: &mut App) {
        app.register_type::<RevealSequencer>()
            .register_type::<RevealSegment>()
            .register_type::<SegmentPop>()
            .register_type::<PopSettings>();
    }
}

pub const DEFAULT_SEGMENT_DELAY_SECS: f32 = 0.5;

/// Shape of the transient "pop" played on each activated segment.
#[derive(Reflect, Debug, Clone, Copy, PartialEq)]
pub struct PopSettings {
    /// Total time for the scale-up and scale-down halves.
    pub duration: Duration,
    /// Peak scale as a multiple of the segment's base scale.
    pub peak_scale: f32,
}

impl PopSettings {
    pub fn from_secs(duration_secs: f32, peak_scale: f32) -> Result<Self, GateError> {
        Ok(Self {
            duration: duration_from_secs("pop duration", duration_secs)?,
            peak_scale,
        })
    }
}

impl Default for PopSettings {
    fn default() -> Self {
        Self {
            duration: Duration::from_millis(300),
            peak_scale: 1.2,
        }
    }
}

/// A segment the sequencer just switched on.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Activation {
    pub index: usize,
    pub segment: Entity,
    /// This was the last segment; the run is over.
    pub finished: bool,
}

/// Ordered, timed reveal over a fixed list of segment entities.
///
/// Idle -> Running -> Idle. While running, the first segment is activated
/// on start and each following one after `delay` has accumulated; no delay
/// follows the last. `current_index` counts activations, not finished pops.
#[derive(Component, Reflect, Debug, Clone)]
#[reflect(Component)]
pub struct RevealSequencer {
    segments: Vec<Entity>,
    delay: Duration,
    pop: PopSettings,
    current_index: usize,
    running: bool,
    revealed: bool,
    delay_timer: Timer,
}

impl RevealSequencer {
    pub fn new(segments: Vec<Entity>, delay_secs: f32) -> Result<Self, GateError> {
        let delay = duration_from_secs("segment delay", delay_secs)?;
        Ok(Self {
            segments,
            delay,
            pop: PopSettings::default(),
            current_index: 0,
            running: false,
            revealed: false,
            delay_timer: Timer::new(delay, TimerMode::Once),
        })
    }

    pub fn with_pop(mut self, pop: PopSettings) -> Self {
        self.pop = pop;
        self
    }

    pub fn segments(&self) -> &[Entity] {
        &self.segments
    }

    pub fn delay(&self) -> Duration {
        self.delay
    }

    pub fn pop(&self) -> PopSettings {
        self.pop
    }

    pub fn is_running(&self) -> bool {
        self.running
    }

    pub fn current_index(&self) -> usize {
        self.current_index
    }

    pub fn total_segments(&self) -> usize {
        self.segments.len()
    }

    /// A run has reached the last segment since the last reset.
    pub fn is_revealed(&self) -> bool {
        self.revealed
    }

    /// Enters `Running` at index 0. The caller activates the first segment
    /// right away with [`RevealSequencer::activate_next`].
    pub fn start(&mut self) -> Result<(), GateError> {
        if self.running {
            return Err(GateError::InvalidTransition {
                operation: "start reveal",
                state: "running",
            });
        }
        if self.segments.is_empty() {
            return Err(GateError::Configuration(
                "reveal sequencer has no segments".into(),
            ));
        }

        self.running = true;
        self.revealed = false;
        self.current_index = 0;
        self.delay_timer = Timer::new(self.delay, TimerMode::Once);
        Ok(())
    }

    /// Activates the segment at `current_index` and advances the index.
    pub fn activate_next(&mut self) -> Option<Activation> {
        if !self.running {
            return None;
        }
        let index = self.current_index;
        let segment = *self.segments.get(index)?;

        self.current_index += 1;
        let finished = self.current_index == self.segments.len();
        if finished {
            self.running = false;
            self.revealed = true;
        }
        self.delay_timer.reset();

        Some(Activation {
            index,
            segment,
            finished,
        })
    }

    /// Accumulates `delta` toward the inter-segment delay and activates the
    /// next segment once it has elapsed. At most one activation per call.
    pub fn advance(&mut self, delta: Duration) -> Option<Activation> {
        if !self.running {
            return None;
        }
        self.delay_timer.tick(delta);
        if self.delay_timer.is_finished() {
            self.activate_next()
        } else {
            None
        }
    }

    /// Back to idle at index 0. Safe in any state; returns whether anything
    /// was reset.
    pub fn reset(&mut self) -> bool {
        let changed = self.running || self.current_index != 0 || self.revealed;
        self.running = false;
        self.revealed = false;
        self.current_index = 0;
        self.delay_timer = Timer::new(self.delay, TimerMode::Once);
        changed
    }
}

/// One piece of the revealed structure.
#[derive(Component, Reflect, Debug, Clone, PartialEq)]
#[reflect(Component)]
pub struct RevealSegment {
    pub index: usize,
    pub active: bool,
    /// Scale the pop animation starts from and returns to.
    pub base_scale: Vec3,
}

impl RevealSegment {
    pub fn new(index: usize) -> Self {
        Self {
            index,
            active: false,
            base_scale: Vec3::ONE,
        }
    }
}

/// Transient scale-up-then-back effect on a freshly activated segment.
#[derive(Component, Reflect, Debug, Clone)]
#[reflect(Component)]
pub struct SegmentPop {
    pub timer: Timer,
    pub base_scale: Vec3,
    pub peak_scale: f32,
}

impl SegmentPop {
    pub fn new(settings: PopSettings, base_scale: Vec3) -> Self {
        Self {
            timer: Timer::new(settings.duration, TimerMode::Once),
            base_scale,
            peak_scale: settings.peak_scale,
        }
    }

    /// Scale at the timer's current position: eased up to the peak over the
    /// first half, eased back to base over the second.
    pub fn current_scale(&self) -> Vec3 {
        let t = self.timer.fraction();
        let curve = EasingCurve::new(0.0_f32, 1.0, EaseFunction::SmoothStep);
        let peak = self.base_scale * self.peak_scale;

        if t < 0.5 {
            self.base_scale.lerp(peak, curve.sample_clamped(t * 2.0))
        } else {
            peak.lerp(self.base_scale, curve.sample_clamped((t - 0.5) * 2.0))
        }
    }
}
