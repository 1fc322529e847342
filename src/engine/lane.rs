use crate::dsp::envelope::Envelope;
use crate::dsp::modulate::Destination;
use crate::params::LaneConfig;
use crate::sequencing::{StepSequencer, TransportSnapshot};

/// One step sequencer driving one envelope, plus where the envelope goes.
#[derive(Debug, Clone)]
pub struct Lane {
    sequencer: StepSequencer,
    envelope: Envelope,
    destination: Destination,
    amount: f32,
}

impl Lane {
    pub fn new(sample_rate: f32, smoothing: Option<f32>) -> Self {
        let mut lane = Self {
            sequencer: StepSequencer::new(),
            envelope: Envelope::new(sample_rate).with_smoothing(smoothing),
            destination: Destination::None,
            amount: 0.0,
        };
        lane.apply(&LaneConfig::default());
        lane
    }

    /// Take on a lane configuration. Envelope coefficients are only
    /// recomputed for times that changed.
    pub fn apply(&mut self, config: &LaneConfig) {
        let config = config.sanitized();
        self.sequencer.set_steps(config.steps);
        self.sequencer.set_rate(config.rate);
        self.envelope.set_attack(config.attack);
        self.envelope.set_hold(config.hold);
        self.envelope.set_decay(config.decay);
        self.destination = config.destination;
        self.amount = config.amount;
    }

    pub fn prepare(&mut self, sample_rate: f32) {
        self.envelope.prepare(sample_rate);
        self.sequencer.reset();
    }

    pub fn reset(&mut self) {
        self.envelope.reset();
        self.sequencer.reset();
    }

    /// Consult the sequencer and fire the envelope on a trigger.
    #[inline]
    pub fn advance_transport(&mut self, snapshot: &TransportSnapshot) -> bool {
        let triggered = self.sequencer.process(snapshot);
        if triggered {
            self.envelope.trigger();
        }
        triggered
    }

    #[inline]
    pub fn next_sample(&mut self) -> f32 {
        self.envelope.next_sample()
    }

    pub fn destination(&self) -> Destination {
        self.destination
    }

    pub fn amount(&self) -> f32 {
        self.amount
    }

    pub fn current_step(&self) -> usize {
        self.sequencer.current_step()
    }

    pub fn envelope(&self) -> &Envelope {
        &self.envelope
    }

    pub fn sequencer(&self) -> &StepSequencer {
        &self.sequencer
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dsp::envelope::EnvelopeState;

    #[test]
    fn trigger_starts_attack() {
        let mut lane = Lane::new(48_000.0, None);
        lane.apply(&LaneConfig::default().with_steps(&[0]));

        assert!(lane.advance_transport(&TransportSnapshot::playing(0.0, 120.0)));
        assert_eq!(lane.envelope().state(), EnvelopeState::Attack);
        assert!(lane.next_sample() > 0.0);
    }

    #[test]
    fn apply_sanitizes() {
        let mut lane = Lane::new(48_000.0, None);
        lane.apply(&LaneConfig {
            attack: -1.0,
            amount: 5.0,
            ..LaneConfig::default()
        });
        assert_eq!(lane.envelope().attack_samples(), 48);
        assert_eq!(lane.amount(), 1.0);
    }

    #[test]
    fn reset_silences_and_rearms() {
        let mut lane = Lane::new(48_000.0, Some(0.01));
        lane.apply(&LaneConfig::default().with_steps(&[0]));
        let snapshot = TransportSnapshot::playing(0.0, 120.0);

        assert!(lane.advance_transport(&snapshot));
        lane.next_sample();
        assert!(!lane.advance_transport(&snapshot));

        lane.reset();
        assert_eq!(lane.envelope().current_value(), 0.0);
        assert!(lane.advance_transport(&snapshot));
    }
}
