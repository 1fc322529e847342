#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use super::rate::StepRate;
use super::transport::TransportSnapshot;
use crate::NUM_STEPS;

/*
Step Sequencer
==============

A 16-step on/off gate clocked by the host's musical position. There is no
internal clock: the current step is recomputed from the absolute position on
every call, so it can never drift from the host and a seek lands on the right
step immediately.

    step = floor(position / beats_per_step) mod 16

At 1/16 (0.25 beats per step) one lap of 16 steps is exactly one 4/4 bar:

    position  0.00  0.25  0.50  0.75  1.00 ...  3.75  4.00
    step      0     1     2     3     4    ...  15    0

Negative (pre-roll) positions use a Euclidean modulo, so -0.25 is step 15.

A trigger fires when the step changes and the new step is active, or on the
first call after a stop if the step we land on is active. Holding the
transport still never re-triggers.
*/

/// One lane's step pattern and playhead.
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[derive(Debug, Clone, PartialEq)]
pub struct StepSequencer {
    steps: [bool; NUM_STEPS],
    rate: StepRate,
    current_step: usize,
    #[cfg_attr(feature = "serde", serde(skip))]
    last_position: Option<f64>,
}

impl StepSequencer {
    pub fn new() -> Self {
        Self {
            steps: [false; NUM_STEPS],
            rate: StepRate::default(),
            current_step: 0,
            last_position: None,
        }
    }

    pub fn with_steps(mut self, steps: [bool; NUM_STEPS]) -> Self {
        self.steps = steps;
        self
    }

    pub fn with_rate(mut self, rate: StepRate) -> Self {
        self.rate = rate;
        self
    }

    /// Step index for a musical position, always in `0..NUM_STEPS`.
    pub fn step_at(position: f64, rate: StepRate) -> usize {
        let step = (position / rate.beats_per_step()).floor() as i64;
        step.rem_euclid(NUM_STEPS as i64) as usize
    }

    /// Advance to the snapshot's position. Returns true when the envelope
    /// should fire.
    pub fn process(&mut self, snapshot: &TransportSnapshot) -> bool {
        let snapshot = snapshot.normalized();
        if !snapshot.is_playing {
            self.last_position = None;
            return false;
        }

        let step = Self::step_at(snapshot.position, self.rate);
        let first_call = self.last_position.is_none();
        let changed = step != self.current_step;

        self.current_step = step;
        self.last_position = Some(snapshot.position);

        (first_call || changed) && self.steps[step]
    }

    /// Forget the last position. The next playing call may trigger.
    pub fn reset(&mut self) {
        self.last_position = None;
    }

    /// Set one step. Out-of-range indices are ignored.
    pub fn set_step(&mut self, index: usize, active: bool) {
        if let Some(step) = self.steps.get_mut(index) {
            *step = active;
        }
    }

    pub fn step(&self, index: usize) -> bool {
        self.steps.get(index).copied().unwrap_or(false)
    }

    pub fn set_steps(&mut self, steps: [bool; NUM_STEPS]) {
        self.steps = steps;
    }

    pub fn steps(&self) -> &[bool; NUM_STEPS] {
        &self.steps
    }

    pub fn set_rate(&mut self, rate: StepRate) {
        self.rate = rate;
    }

    pub fn rate(&self) -> StepRate {
        self.rate
    }

    pub fn current_step(&self) -> usize {
        self.current_step
    }
}

impl Default for StepSequencer {
    fn default() -> Self {
        Self::new()
    }
}
