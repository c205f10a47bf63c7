/// Sound engine: procedural trooper effects via rodio.
///
/// All sounds are generated as in-memory WAV buffers at init time.
/// Playback is fire-and-forget through a `SpatialSink`, so an effect is
/// panned by where it happens relative to the listener.
///
/// Compile without the "sound" feature to disable audio entirely
/// (the stub SoundEngine does nothing).

use glam::Vec3;

use crate::domain::part::{Audio, Sound};

#[cfg_attr(not(feature = "sound"), allow(dead_code))]
/// Half the distance between the listener's ears, in trooper units.
const EAR_SPAN: f32 = 0.5;

#[cfg_attr(not(feature = "sound"), allow(dead_code))]
fn ears(listener: Vec3) -> ([f32; 3], [f32; 3]) {
    let off = Vec3::new(EAR_SPAN, 0.0, 0.0);
    ((listener - off).to_array(), (listener + off).to_array())
}

#[cfg(feature = "sound")]
mod inner {
    use std::io::Cursor;
    use std::sync::Arc;

    use glam::Vec3;
    use rodio::{OutputStream, OutputStreamHandle, SpatialSink};
    use tracing::debug;

    use super::{ears, Audio, Sound};

    const SAMPLE_RATE: u32 = 22050;
    const TAU: f32 = std::f32::consts::TAU;

    /// Pre-generated WAV buffers for each sound effect.
    pub struct SoundEngine {
        _stream: OutputStream,
        handle: OutputStreamHandle,
        listener: Vec3,
        sfx_cloak: Arc<Vec<u8>>,
        sfx_decloak: Arc<Vec<u8>>,
        sfx_teleport: Arc<Vec<u8>>,
    }

    impl SoundEngine {
        pub fn new() -> Option<Self> {
            let (stream, handle) = OutputStream::try_default().ok()?;
            debug!("audio output opened");

            Some(SoundEngine {
                _stream: stream,
                handle,
                listener: Vec3::ZERO,
                sfx_cloak: Arc::new(make_wav(&gen_sweep(220.0, 880.0, 0.35))),
                sfx_decloak: Arc::new(make_wav(&gen_sweep(880.0, 220.0, 0.35))),
                sfx_teleport: Arc::new(make_wav(&gen_teleport())),
            })
        }

        fn buffer(&self, sound: Sound) -> &Arc<Vec<u8>> {
            match sound {
                Sound::Cloak => &self.sfx_cloak,
                Sound::Decloak => &self.sfx_decloak,
                Sound::Teleport => &self.sfx_teleport,
            }
        }
    }

    impl Audio for SoundEngine {
        fn set_listener(&mut self, at: Vec3) {
            self.listener = at;
        }

        fn play_at(&mut self, sound: Sound, at: Vec3) {
            let (left, right) = ears(self.listener);
            if let Ok(sink) = SpatialSink::try_new(&self.handle, at.to_array(), left, right) {
                let cursor = Cursor::new(self.buffer(sound).as_ref().clone());
                if let Ok(src) = rodio::Decoder::new(cursor) {
                    sink.append(src);
                    sink.detach(); // fire-and-forget
                }
            }
        }
    }

    // ════════════════════════════════════════════════════════════
    //  Waveform generators: all produce Vec<f32> mono samples
    // ════════════════════════════════════════════════════════════

    /// Cloak on/off: a shimmering pitch sweep.
    pub(super) fn gen_sweep(from: f32, to: f32, duration: f32) -> Vec<f32> {
        let n = (SAMPLE_RATE as f32 * duration) as usize;
        let mut phase = 0.0f32;
        (0..n)
            .map(|i| {
                let t = i as f32 / n as f32;
                let freq = from + (to - from) * t;
                phase += freq / SAMPLE_RATE as f32;
                let shimmer = 1.0 + 0.3 * (t * 40.0 * TAU).sin();
                let env = (t * 8.0).min(1.0) * (1.0 - t);
                (phase * TAU).sin() * shimmer * env * 0.25
            })
            .collect()
    }

    /// Teleport: a noisy warble that rises and cuts off.
    pub(super) fn gen_teleport() -> Vec<f32> {
        let duration = 0.4;
        let n = (SAMPLE_RATE as f32 * duration) as usize;
        let mut rng: u32 = 4242;
        let mut phase = 0.0f32;
        (0..n)
            .map(|i| {
                let t = i as f32 / n as f32;
                let freq = 300.0 + t * t * 1500.0 + 80.0 * (t * 30.0 * TAU).sin();
                phase += freq / SAMPLE_RATE as f32;
                rng = rng.wrapping_mul(1103515245).wrapping_add(12345);
                let noise = (rng as f32 / u32::MAX as f32) * 2.0 - 1.0;
                let env = 1.0 - t.powf(3.0);
                ((phase * TAU).sin() * 0.7 + noise * 0.3) * env * 0.3
            })
            .collect()
    }

    // ════════════════════════════════════════════════════════════
    //  WAV encoder: wraps f32 samples into a valid WAV buffer
    // ════════════════════════════════════════════════════════════

    pub(super) fn make_wav(samples: &[f32]) -> Vec<u8> {
        let num_channels: u16 = 1;
        let bits_per_sample: u16 = 16;
        let byte_rate = SAMPLE_RATE * (num_channels as u32) * (bits_per_sample as u32) / 8;
        let block_align = num_channels * bits_per_sample / 8;
        let data_size = samples.len() as u32 * 2;
        let file_size = 36 + data_size;

        let mut buf = Vec::with_capacity(44 + data_size as usize);

        buf.extend_from_slice(b"RIFF");
        buf.extend_from_slice(&file_size.to_le_bytes());
        buf.extend_from_slice(b"WAVE");

        buf.extend_from_slice(b"fmt ");
        buf.extend_from_slice(&16u32.to_le_bytes());
        buf.extend_from_slice(&1u16.to_le_bytes()); // PCM
        buf.extend_from_slice(&num_channels.to_le_bytes());
        buf.extend_from_slice(&SAMPLE_RATE.to_le_bytes());
        buf.extend_from_slice(&byte_rate.to_le_bytes());
        buf.extend_from_slice(&block_align.to_le_bytes());
        buf.extend_from_slice(&bits_per_sample.to_le_bytes());

        buf.extend_from_slice(b"data");
        buf.extend_from_slice(&data_size.to_le_bytes());

        for &s in samples {
            let val = (s.clamp(-1.0, 1.0) * 32767.0) as i16;
            buf.extend_from_slice(&val.to_le_bytes());
        }

        buf
    }
}

// ════════════════════════════════════════════════════════════
//  Public API: compiles to no-ops when sound feature is off
// ════════════════════════════════════════════════════════════

#[cfg(feature = "sound")]
pub use inner::SoundEngine;

#[cfg(not(feature = "sound"))]
pub struct SoundEngine;

#[cfg(not(feature = "sound"))]
impl SoundEngine {
    pub fn new() -> Option<Self> { Some(SoundEngine) }
}

#[cfg(not(feature = "sound"))]
impl Audio for SoundEngine {
    fn set_listener(&mut self, _at: Vec3) {}
    fn play_at(&mut self, _sound: Sound, _at: Vec3) {}
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ears_straddle_the_listener() {
        let (l, r) = ears(Vec3::new(1.0, 2.0, 3.0));
        assert_eq!(l, [0.5, 2.0, 3.0]);
        assert_eq!(r, [1.5, 2.0, 3.0]);
    }

    #[cfg(feature = "sound")]
    #[test]
    fn wav_header_matches_samples() {
        let samples = inner::gen_teleport();
        let wav = inner::make_wav(&samples);
        assert_eq!(&wav[..4], b"RIFF");
        assert_eq!(&wav[8..12], b"WAVE");
        assert_eq!(wav.len(), 44 + samples.len() * 2);
        assert!(samples.iter().all(|s| s.abs() <= 1.0));
    }

    #[cfg(feature = "sound")]
    #[test]
    fn cloak_sweeps_are_silent_at_the_ends() {
        let up = inner::gen_sweep(220.0, 880.0, 0.35);
        assert_eq!(up[0], 0.0);
        assert!(up.last().map_or(false, |s| s.abs() < 0.01));
    }
}
