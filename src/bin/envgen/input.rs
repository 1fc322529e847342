//! Synthetic input signal - a detuned saw chord

/// Chord of naive saw oscillators, written identically to every channel.
pub struct SawChord {
    phases: [f32; 3],
    increments: [f32; 3],
}

impl SawChord {
    pub fn new(root_hz: f32, sample_rate: f32) -> Self {
        // Root, fifth, slightly sharp octave
        let freqs = [root_hz, root_hz * 1.5, root_hz * 2.01];
        Self {
            phases: [0.0, 0.33, 0.66],
            increments: freqs.map(|f| f / sample_rate),
        }
    }

    pub fn render(&mut self, channels: &mut [&mut [f32]], frames: usize) {
        for i in 0..frames {
            let mut sample = 0.0;
            for (phase, inc) in self.phases.iter_mut().zip(self.increments.iter()) {
                sample += 2.0 * *phase - 1.0;
                *phase += inc;
                if *phase >= 1.0 {
                    *phase -= 1.0;
                }
            }
            let sample = sample * 0.2;
            for channel in channels.iter_mut() {
                channel[i] = sample;
            }
        }
    }
}
