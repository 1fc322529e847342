/// Decibels to linear gain.
#[inline]
pub fn db_to_gain(db: f32) -> f32 {
    10.0_f32.powf(db / 20.0)
}

/// Linear gain to decibels. Silence maps to negative infinity.
#[inline]
pub fn gain_to_db(gain: f32) -> f32 {
    20.0 * gain.log10()
}

/// Average of the channels over frames `start..start + out.len()`, clamped
/// to [-1, 1]. Frames past the end of a channel read as silence.
pub fn mono_mix(channels: &[&mut [f32]], start: usize, out: &mut [f32]) {
    if channels.is_empty() {
        out.fill(0.0);
        return;
    }

    let scale = 1.0 / channels.len() as f32;
    for (i, sample) in out.iter_mut().enumerate() {
        let sum: f32 = channels
            .iter()
            .map(|channel| channel.get(start + i).copied().unwrap_or(0.0))
            .sum();
        *sample = (sum * scale).clamp(-1.0, 1.0);
    }
}

/// Planar to interleaved. Frames beyond the shortest channel are skipped.
pub fn interleave(channels: &[&[f32]], out: &mut [f32]) {
    let num_channels = channels.len();
    if num_channels == 0 {
        return;
    }
    for (frame_index, frame) in out.chunks_exact_mut(num_channels).enumerate() {
        for (sample, channel) in frame.iter_mut().zip(channels) {
            if let Some(&value) = channel.get(frame_index) {
                *sample = value;
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_db_to_gain() {
        assert_eq!(db_to_gain(0.0), 1.0);
        assert!((db_to_gain(6.0) - 1.9953).abs() < 1e-3);
        assert!((db_to_gain(-24.0) - 0.0631).abs() < 1e-3);
        assert!((gain_to_db(db_to_gain(-12.0)) + 12.0).abs() < 1e-4);
    }

    #[test]
    fn test_mono_mix_averages_and_clamps() {
        let mut left = [1.0, 0.5, 1.0];
        let mut right = [0.0, 0.5, 3.0];
        let channels = [left.as_mut_slice(), right.as_mut_slice()];
        let mut mono = [0.0; 3];
        mono_mix(&channels, 0, &mut mono);
        assert_eq!(mono, [0.5, 0.5, 1.0]);

        let mut tail = [0.0; 2];
        mono_mix(&channels, 2, &mut tail);
        assert_eq!(tail, [1.0, 0.0]);
    }

    #[test]
    fn test_interleave() {
        let left = [1.0, 2.0, 3.0];
        let right = [-1.0, -2.0, -3.0];
        let mut interleaved = [0.0; 6];
        interleave(&[&left, &right], &mut interleaved);
        assert_eq!(interleaved, [1.0, -1.0, 2.0, -2.0, 3.0, -3.0]);
    }
}
