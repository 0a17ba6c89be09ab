/// Sound engine: procedural background music and a "caught" sting via rodio.
///
/// The music loop is generated once at init as an in-memory WAV buffer and
/// played through a dedicated Sink on repeat. Everything here is best-effort:
/// a missing audio device means `SoundEngine::new()` returns `None` and the
/// game runs silent.
///
/// Compile without the "sound" feature to disable audio entirely (the stub
/// SoundEngine does nothing).

/// Sink volume for the background loop.
#[cfg_attr(not(feature = "sound"), allow(dead_code))]
pub const MUSIC_VOLUME: f32 = 0.15;

/// Linear fade: volume after `remaining` of `total` seconds are left.
#[cfg_attr(not(feature = "sound"), allow(dead_code))]
fn fade_volume(base: f32, remaining: f32, total: f32) -> f32 {
    if total <= 0.0 {
        return 0.0;
    }
    base * (remaining / total).clamp(0.0, 1.0)
}

#[cfg(feature = "sound")]
mod inner {
    use std::io::Cursor;
    use std::sync::Arc;

    use rodio::{OutputStream, OutputStreamHandle, Sink, Source};
    use tracing::{debug, info};

    use super::{fade_volume, MUSIC_VOLUME};

    const SAMPLE_RATE: u32 = 22050;
    const TAU: f32 = std::f32::consts::PI * 2.0;

    struct Fade {
        remaining: f32,
        total: f32,
    }

    pub struct SoundEngine {
        _stream: OutputStream,
        handle: OutputStreamHandle,
        music: Arc<Vec<u8>>,
        sfx_caught: Arc<Vec<u8>>,
        music_sink: Option<Sink>,
        fade: Option<Fade>,
    }

    impl SoundEngine {
        pub fn new() -> Option<Self> {
            let (stream, handle) = match OutputStream::try_default() {
                Ok(pair) => pair,
                Err(e) => {
                    info!(error = %e, "audio unavailable, running silent");
                    return None;
                }
            };

            Some(SoundEngine {
                _stream: stream,
                handle,
                music: Arc::new(make_wav(&gen_music_loop())),
                sfx_caught: Arc::new(make_wav(&gen_caught())),
                music_sink: None,
                fade: None,
            })
        }

        /// Start the background loop unless it is already playing.
        /// A loop that is fading out is replaced by a fresh one.
        pub fn start_music(&mut self) {
            if self.music_sink.is_some() && self.fade.is_none() {
                return;
            }
            self.stop_music();

            let sink = match Sink::try_new(&self.handle) {
                Ok(s) => s,
                Err(e) => {
                    debug!(error = %e, "music sink unavailable");
                    return;
                }
            };
            let cursor = Cursor::new(self.music.as_ref().clone());
            match rodio::Decoder::new(cursor) {
                Ok(src) => {
                    sink.set_volume(MUSIC_VOLUME);
                    sink.append(src.repeat_infinite());
                    self.music_sink = Some(sink);
                }
                Err(e) => debug!(error = %e, "music decode failed"),
            }
        }

        pub fn stop_music(&mut self) {
            self.fade = None;
            if let Some(sink) = self.music_sink.take() {
                sink.stop();
            }
        }

        pub fn fade_out_music(&mut self, secs: f32) {
            if self.music_sink.is_none() {
                return;
            }
            if secs <= 0.0 {
                self.stop_music();
                return;
            }
            self.fade = Some(Fade { remaining: secs, total: secs });
        }

        /// Advance an active fade. Call once per frame.
        pub fn update(&mut self, dt: f32) {
            let Some(fade) = self.fade.as_mut() else { return };
            fade.remaining -= dt;
            if fade.remaining <= 0.0 {
                self.stop_music();
                return;
            }
            if let Some(sink) = &self.music_sink {
                sink.set_volume(fade_volume(MUSIC_VOLUME, fade.remaining, fade.total));
            }
        }

        pub fn play_caught(&self) {
            if let Ok(sink) = Sink::try_new(&self.handle) {
                let cursor = Cursor::new(self.sfx_caught.as_ref().clone());
                if let Ok(src) = rodio::Decoder::new(cursor) {
                    sink.append(src);
                    sink.detach(); // fire-and-forget
                }
            }
        }
    }

    // ════════════════════════════════════════════════════════════
    //  Waveform generators — all produce Vec<f32> mono samples
    // ════════════════════════════════════════════════════════════

    fn square(t: f32, freq: f32) -> f32 {
        if (t * freq).fract() < 0.5 { 1.0 } else { -1.0 }
    }

    fn note_hz(midi: u8) -> f32 {
        440.0 * 2f32.powf((midi as f32 - 69.0) / 12.0)
    }

    /// Four-bar minor loop: Am F C G, eighth-note arpeggio over a bass line.
    fn gen_music_loop() -> Vec<f32> {
        const EIGHTH: f32 = 0.25; // 120 bpm
        // (bass root, arpeggio) per bar, MIDI note numbers
        let bars: [(u8, [u8; 4]); 4] = [
            (45, [69, 72, 76, 72]), // Am
            (41, [65, 69, 72, 69]), // F
            (48, [67, 72, 76, 72]), // C
            (43, [67, 71, 74, 71]), // G
        ];

        let step_len = (SAMPLE_RATE as f32 * EIGHTH) as usize;
        let mut samples = Vec::with_capacity(step_len * 8 * bars.len());
        for (bass, arp) in bars {
            let bass_hz = note_hz(bass);
            for step in 0..8 {
                let lead_hz = note_hz(arp[step % arp.len()]);
                for i in 0..step_len {
                    let t = i as f32 / SAMPLE_RATE as f32;
                    let env = 1.0 - (i as f32 / step_len as f32) * 0.7;
                    let lead = square(t, lead_hz) * 0.25 * env;
                    let low = (t * bass_hz * TAU).sin() * 0.45;
                    samples.push(lead + low);
                }
            }
        }
        samples
    }

    /// Caught: short descending tone.
    fn gen_caught() -> Vec<f32> {
        let notes = [440.0_f32, 370.0, 311.0, 261.0];
        let note_dur = 0.12;
        let mut samples = Vec::new();
        for &freq in &notes {
            let n = (SAMPLE_RATE as f32 * note_dur) as usize;
            for i in 0..n {
                let t = i as f32 / SAMPLE_RATE as f32;
                let env = 1.0 - (i as f32 / n as f32) * 0.3;
                samples.push((t * freq * TAU).sin() * env * 0.3);
            }
        }
        let fade_len = samples.len() / 4;
        let total = samples.len();
        for (k, s) in samples[total - fade_len..].iter_mut().enumerate() {
            *s *= (fade_len - k) as f32 / fade_len as f32;
        }
        samples
    }

    // ════════════════════════════════════════════════════════════
    //  WAV encoder — wraps f32 samples into a 16-bit PCM WAV buffer
    // ════════════════════════════════════════════════════════════

    fn make_wav(samples: &[f32]) -> Vec<u8> {
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
//  Public API — compiles to no-ops when sound feature is off
// ════════════════════════════════════════════════════════════

#[cfg(feature = "sound")]
pub use inner::SoundEngine;

#[cfg(not(feature = "sound"))]
pub struct SoundEngine;

#[cfg(not(feature = "sound"))]
impl SoundEngine {
    pub fn new() -> Option<Self> { Some(SoundEngine) }
    pub fn start_music(&mut self) {}
    pub fn stop_music(&mut self) {}
    pub fn fade_out_music(&mut self, _secs: f32) {}
    pub fn update(&mut self, _dt: f32) {}
    pub fn play_caught(&self) {}
}
