use crate::MIN_TIME;

/*
AHD Envelope Implementation
===========================

This module implements a linear Attack-Hold-Decay envelope generator. Unlike
an ADSR there is no gate and no sustain: once triggered, the envelope runs
its whole contour on its own and falls back to silence. That makes it a good
fit for step sequencers, where a step is an instant rather than a held key.

Vocabulary
----------

  level       The phase machine's output (0.0 to 1.0).

  stage       Which phase we're in: Idle, Attack, Hold or Decay.

  trigger     Start (or restart) the Attack phase. There is no "note off".

  smoothing   An optional one-pole lowpass applied after the phase machine.
              It rounds off the corners at phase boundaries, which otherwise
              click when the envelope drives volume.

  sample_rate Samples per second. Converts phase times into sample counts.


The Shape
---------

  Level
    1.0 ┐     ┌──────┐
        │    ╱        ╲
        │   ╱          ╲
        │  ╱            ╲
    0.0 └─╱──────────────╲──→ Time
        Attack  Hold   Decay
         (A)    (H)     (D)


Times to Sample Counts
----------------------

Phase times are converted once, when a time or the sample rate changes:

    attack_samples = max(1, round(attack * sample_rate))
    hold_samples   =        round(hold   * sample_rate)     (may be 0)
    decay_samples  = max(1, round(decay  * sample_rate))

    attack_increment = 1 / attack_samples
    decay_decrement  = 1 / decay_samples

Example: 10 ms attack at 48 kHz → 480 samples, increment ≈ 0.0020833.
After exactly 480 samples the envelope sits at 1.0 and moves to Hold.


The State Machine
-----------------

    ┌──────┐ trigger ┌────────┐ level=1 ┌──────┐ hold done ┌───────┐
    │ Idle │ ──────→ │ Attack │ ──────→ │ Hold │ ────────→ │ Decay │
    └──────┘         └────────┘         └──────┘           └───────┘
        ↑                ↑                                     │
        │                └────────── trigger ──────────────────┤
        └──────────────────────── level=0 ─────────────────────┘

Retriggering keeps the current level. A step that fires while the previous
hit is still decaying ramps up from where it is instead of snapping to zero,
so back-to-back steps never click.

Each ramp is evaluated as `start_level ± elapsed * increment` rather than by
repeated addition. Multi-second phases would otherwise drift far enough to
end a sample early.
*/

/// Default smoothing time constant in seconds.
pub const DEFAULT_SMOOTHING_TIME: f32 = 0.01;

/// Lower bound on the smoothing coefficient.
const MIN_SMOOTH_COEFF: f32 = 0.0001;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EnvelopeState {
    Idle,   // Not triggered, level = 0
    Attack, // Ramping up to 1.0
    Hold,   // Holding at 1.0
    Decay,  // Ramping down to 0.0
}

#[derive(Debug, Clone)]
pub struct Envelope {
    // AHD parameters in seconds
    attack_time: f32,
    hold_time: f32,
    decay_time: f32,
    sample_rate: f32,

    // Derived from the parameters above
    attack_samples: u32,
    hold_samples: u32,
    decay_samples: u32,
    attack_increment: f32,
    decay_decrement: f32,

    // Runtime state
    stage: EnvelopeState,
    level: f32,
    phase_start_level: f32,
    elapsed_samples: u32,

    // Output smoothing (None = raw phase machine output)
    smoothing_time: Option<f32>,
    smooth_coeff: f32,
    smoothed: f32,
}

impl Envelope {
    pub fn new(sample_rate: f32) -> Self {
        Self::ahd(sample_rate, 0.01, 0.1, 0.5)
    }

    pub fn ahd(sample_rate: f32, attack: f32, hold: f32, decay: f32) -> Self {
        let mut env = Self {
            attack_time: attack.max(MIN_TIME),
            hold_time: hold.max(0.0),
            decay_time: decay.max(MIN_TIME),
            sample_rate,

            attack_samples: 1,
            hold_samples: 0,
            decay_samples: 1,
            attack_increment: 1.0,
            decay_decrement: 1.0,

            stage: EnvelopeState::Idle,
            level: 0.0,
            phase_start_level: 0.0,
            elapsed_samples: 0,

            smoothing_time: Some(DEFAULT_SMOOTHING_TIME),
            smooth_coeff: 1.0,
            smoothed: 0.0,
        };
        env.calculate_coefficients();
        env
    }

    /// Set the output smoothing time constant, or disable smoothing with `None`.
    pub fn with_smoothing(mut self, time_constant: Option<f32>) -> Self {
        self.smoothing_time = time_constant;
        self.calculate_coefficients();
        self
    }

    /// Adopt a new sample rate and return to idle.
    pub fn prepare(&mut self, sample_rate: f32) {
        self.sample_rate = sample_rate;
        self.calculate_coefficients();
        self.reset();
    }

    pub fn set_attack(&mut self, seconds: f32) {
        let seconds = seconds.max(MIN_TIME);
        if seconds != self.attack_time {
            self.attack_time = seconds;
            self.calculate_coefficients();
        }
    }

    pub fn set_hold(&mut self, seconds: f32) {
        let seconds = seconds.max(0.0);
        if seconds != self.hold_time {
            self.hold_time = seconds;
            self.calculate_coefficients();
        }
    }

    pub fn set_decay(&mut self, seconds: f32) {
        let seconds = seconds.max(MIN_TIME);
        if seconds != self.decay_time {
            self.decay_time = seconds;
            self.calculate_coefficients();
        }
    }

    /// Start the attack phase from the current level.
    pub fn trigger(&mut self) {
        self.stage = EnvelopeState::Attack;
        self.phase_start_level = self.level;
        self.elapsed_samples = 0;
    }

    /// Advance the envelope by one sample and return the output value.
    pub fn next_sample(&mut self) -> f32 {
        match self.stage {
            EnvelopeState::Idle => {
                self.level = 0.0;
            }

            EnvelopeState::Attack => {
                self.elapsed_samples = self.elapsed_samples.saturating_add(1);
                self.level =
                    self.phase_start_level + self.elapsed_samples as f32 * self.attack_increment;

                if self.level >= 1.0 || self.elapsed_samples >= self.attack_samples {
                    self.level = 1.0;
                    self.enter_hold();
                }
            }

            EnvelopeState::Hold => {
                self.level = 1.0;
                self.elapsed_samples = self.elapsed_samples.saturating_add(1);

                if self.elapsed_samples >= self.hold_samples {
                    self.enter_decay();
                }
            }

            EnvelopeState::Decay => {
                self.elapsed_samples = self.elapsed_samples.saturating_add(1);
                self.level =
                    self.phase_start_level - self.elapsed_samples as f32 * self.decay_decrement;

                if self.level <= 0.0 || self.elapsed_samples >= self.decay_samples {
                    self.level = 0.0;
                    self.stage = EnvelopeState::Idle;
                    self.elapsed_samples = 0;
                }
            }
        }

        debug_assert!((0.0..=1.0).contains(&self.level));

        self.smoothed = match self.smoothing_time {
            Some(_) => {
                let next = self.smoothed + self.smooth_coeff * (self.level - self.smoothed);
                // Flush the exponential tail before it turns denormal
                if self.level == 0.0 && next < 1.0e-6 {
                    0.0
                } else {
                    next.clamp(0.0, 1.0)
                }
            }
            None => self.level,
        };

        self.smoothed
    }

    /// Render a block of envelope values into the buffer.
    pub fn render(&mut self, buffer: &mut [f32]) {
        for sample in buffer.iter_mut() {
            *sample = self.next_sample();
        }
    }

    /// Return to idle with a silent output.
    pub fn reset(&mut self) {
        self.stage = EnvelopeState::Idle;
        self.level = 0.0;
        self.phase_start_level = 0.0;
        self.elapsed_samples = 0;
        self.smoothed = 0.0;
    }

    /// The value the last `next_sample` call produced. This is the value
    /// modulation and visualization both use.
    pub fn current_value(&self) -> f32 {
        self.smoothed
    }

    /// Raw phase machine level, before smoothing.
    pub fn level(&self) -> f32 {
        self.level
    }

    pub fn state(&self) -> EnvelopeState {
        self.stage
    }

    /// True while the phase machine runs or the smoothed tail is still audible.
    pub fn is_active(&self) -> bool {
        !matches!(self.stage, EnvelopeState::Idle) || self.smoothed > 0.0
    }

    pub fn attack_samples(&self) -> u32 {
        self.attack_samples
    }

    pub fn hold_samples(&self) -> u32 {
        self.hold_samples
    }

    pub fn decay_samples(&self) -> u32 {
        self.decay_samples
    }

    pub fn attack_increment(&self) -> f32 {
        self.attack_increment
    }

    /// Hold always runs for at least one sample, even with a zero hold time.
    fn enter_hold(&mut self) {
        self.stage = EnvelopeState::Hold;
        self.elapsed_samples = 0;
    }

    fn enter_decay(&mut self) {
        self.stage = EnvelopeState::Decay;
        self.phase_start_level = 1.0;
        self.elapsed_samples = 0;
    }

    fn calculate_coefficients(&mut self) {
        let sr = self.sample_rate.max(1.0);

        self.attack_samples = (self.attack_time * sr).round().max(1.0) as u32;
        self.hold_samples = (self.hold_time * sr).round().max(0.0) as u32;
        self.decay_samples = (self.decay_time * sr).round().max(1.0) as u32;

        self.attack_increment = 1.0 / self.attack_samples as f32;
        self.decay_decrement = 1.0 / self.decay_samples as f32;

        self.smooth_coeff = match self.smoothing_time {
            Some(tau) if tau > 0.0 => {
                (1.0 - (-1.0 / (tau * sr)).exp()).clamp(MIN_SMOOTH_COEFF, 1.0)
            }
            _ => 1.0,
        };
    }
}
