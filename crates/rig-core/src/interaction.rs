//! Per-item pointer interaction.
//!
//! Pointer handlers only record what happened; [`InteractionState::tick`] runs
//! once per frame and is the only place values advance. The state is a plain
//! record owned by its scene item, addressed through the item key, so no
//! closure ever captures it.

use glam::Vec2;

use crate::config::ScaleTuning;
use crate::constants::{EFFECT_DECAY_TICKS, ENTER_DIRECTION, LEAVE_DIRECTION};
use crate::easing::ease_in_out;

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum Phase {
    #[default]
    Idle,
    HoverEntering,
    HoverActive,
    HoverLeaving,
}

/// Where the pointer crossed the element edge, how much of the ripple is left
/// and which way it pushes. Written verbatim to the `effectState` uniform.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct EffectVector {
    pub x: f32,
    pub y: f32,
    pub decay: f32,
    pub direction: f32,
}

impl EffectVector {
    #[inline]
    pub fn to_array(self) -> [f32; 4] {
        [self.x, self.y, self.decay, self.direction]
    }
}

#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct InteractionState {
    pub phase: Phase,
    /// Eased hover parameter, always within [0, 1].
    pub cur_scale: f32,
    pub effect: EffectVector,
    /// Latest pointer position in element-local pixels.
    pub pointer: Vec2,
    /// Frames since the last enter/leave (the `time` uniform).
    pub time: f32,
}

impl InteractionState {
    pub fn on_enter(&mut self, local: Vec2) {
        self.start_effect(local, ENTER_DIRECTION);
        self.phase = Phase::HoverEntering;
    }

    pub fn on_leave(&mut self, local: Vec2) {
        self.start_effect(local, LEAVE_DIRECTION);
        self.phase = Phase::HoverLeaving;
    }

    #[inline]
    pub fn on_move(&mut self, local: Vec2) {
        self.pointer = local;
    }

    fn start_effect(&mut self, local: Vec2, direction: f32) {
        self.effect = EffectVector {
            x: local.x,
            y: local.y,
            decay: EFFECT_DECAY_TICKS,
            direction,
        };
        self.pointer = local;
        self.time = 0.0;
    }

    /// Advance one frame.
    pub fn tick(&mut self, tuning: &ScaleTuning) {
        self.time += 1.0;
        self.effect.decay = (self.effect.decay - 1.0).max(0.0);

        let step = tuning.speed.max(0.0);
        match self.phase {
            Phase::HoverEntering => {
                self.cur_scale = (self.cur_scale + step).min(1.0);
                if self.cur_scale >= 1.0 {
                    self.phase = Phase::HoverActive;
                }
            }
            Phase::HoverLeaving => {
                self.cur_scale = (self.cur_scale - step).max(0.0);
                if self.cur_scale <= 0.0 {
                    self.phase = Phase::Idle;
                }
            }
            Phase::Idle | Phase::HoverActive => {}
        }
        self.cur_scale = self.cur_scale.clamp(0.0, 1.0);
    }

    /// The `hoverScale` uniform: 1 at rest, `1 + amount` at full hover.
    #[inline]
    pub fn hover_scale(&self, tuning: &ScaleTuning) -> f32 {
        1.0 + ease_in_out(self.cur_scale) * tuning.amount
    }

    #[inline]
    pub fn is_hovering(&self) -> bool {
        matches!(self.phase, Phase::HoverEntering | Phase::HoverActive)
    }
}
