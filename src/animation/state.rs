use std::time::Duration;

use serde::{Deserialize, Serialize};

/// Animation phase. The cycle order is fixed: `Filling -> Holding -> Blinking -> Resetting -> Filling`.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Phase {
    #[default]
    Filling,
    Holding,
    Blinking,
    Resetting,
}

impl Phase {
    pub fn next(self) -> Self {
        match self {
            Self::Filling => Self::Holding,
            Self::Holding => Self::Blinking,
            Self::Blinking => Self::Resetting,
            Self::Resetting => Self::Filling,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Filling => "filling",
            Self::Holding => "holding",
            Self::Blinking => "blinking",
            Self::Resetting => "resetting",
        }
    }
}

impl std::fmt::Display for Phase {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Everything the scheduler remembers between ticks. Timestamps are engine-clock offsets.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct AnimationState {
    pub phase: Phase,
    pub visible_count: u64,
    pub last_rendered_count: u64,
    pub hold_start: Option<Duration>,
    pub blink_start: Option<Duration>,
}

impl AnimationState {
    /// `{filling, 0, 0, -, -}`.
    pub fn initial() -> Self {
        Self::default()
    }

    /// Time spent in `blinking` so far, if blinking.
    pub fn blink_elapsed(&self, now: Duration) -> Option<Duration> {
        match (self.phase, self.blink_start) {
            (Phase::Blinking, Some(start)) => Some(now.saturating_sub(start)),
            _ => None,
        }
    }
}

/// Per-configuration constants of the state machine.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct StepParams {
    pub target: u64,
    pub fill_speed: u64,
    pub hold: Duration,
    pub blink: Duration,
}

/// Raster side effect requested by a step; applied to the mask by the caller before composing.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum MaskAction {
    Keep,
    RevealUpTo(u64),
    Clear,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Step {
    pub state: AnimationState,
    pub mask: MaskAction,
}

/// Advance the scheduler by one display frame.
///
/// Pure: the caller owns the clock and applies [`Step::mask`] to its mask.
pub fn step(state: &AnimationState, params: &StepParams, now: Duration) -> Step {
    let mut next = *state;
    let mut mask = MaskAction::Keep;

    match state.phase {
        Phase::Filling => {
            next.visible_count = state.visible_count.saturating_add(params.fill_speed);
            if next.visible_count >= params.target {
                next.visible_count = params.target;
                next.phase = Phase::Holding;
                next.hold_start = Some(now);
            }
            if next.visible_count > state.last_rendered_count {
                next.last_rendered_count = next.visible_count;
                mask = MaskAction::RevealUpTo(next.visible_count);
            }
        }
        Phase::Holding => {
            let start = state.hold_start.unwrap_or(now);
            if now.saturating_sub(start) > params.hold {
                next.phase = Phase::Blinking;
                next.blink_start = Some(now);
            }
        }
        Phase::Blinking => {
            let start = state.blink_start.unwrap_or(now);
            if now.saturating_sub(start) > params.blink {
                next.phase = Phase::Resetting;
            }
        }
        Phase::Resetting => {
            next = AnimationState::initial();
            mask = MaskAction::Clear;
        }
    }

    Step { state: next, mask }
}

#[cfg(test)]
#[path = "../../tests/unit/animation/state.rs"]
mod tests;
