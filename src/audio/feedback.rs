//! Audio feedback module
//!
//! Plays typewriter sounds through rodio. Built-in themes are synthesized
//! at startup; a custom theme is a directory of WAV files.

use super::{SoundEvent, SoundPlayer};
use crate::config::AudioFeedbackConfig;
use crate::error::AudioError;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use rodio::{Decoder, OutputStream, OutputStreamHandle, Sink, Source};
use std::f32::consts::PI;
use std::io::Cursor;
use std::path::PathBuf;

const SAMPLE_RATE: u32 = 44100;

/// Audio feedback player
pub struct AudioFeedback {
    _stream: OutputStream,
    stream_handle: OutputStreamHandle,
    volume: f32,
    theme: SoundTheme,
}

/// A sound theme containing WAV data for each event
struct SoundTheme {
    key: Vec<u8>,
    space: Vec<u8>,
    carriage_return: Vec<u8>,
    bell: Vec<u8>,
}

impl SoundTheme {
    fn sound(&self, event: SoundEvent) -> &[u8] {
        match event {
            SoundEvent::KeyPress => &self.key,
            SoundEvent::Space => &self.space,
            SoundEvent::Return => &self.carriage_return,
            SoundEvent::Bell => &self.bell,
        }
    }
}

impl AudioFeedback {
    /// Create a new audio feedback player
    pub fn new(config: &AudioFeedbackConfig) -> Result<Self, AudioError> {
        if !config.enabled {
            return Err(AudioError::Disabled);
        }

        let theme = load_theme(&config.theme)?;

        let (stream, stream_handle) =
            OutputStream::try_default().map_err(|e| AudioError::Output(e.to_string()))?;

        Ok(Self {
            _stream: stream,
            stream_handle,
            volume: config.volume,
            theme,
        })
    }

    fn play_wav(&self, data: &[u8]) -> Result<(), String> {
        let cursor = Cursor::new(data.to_vec());
        let source = Decoder::new(cursor).map_err(|e| format!("Failed to decode audio: {}", e))?;

        let source = source.amplify(self.volume);

        let sink = Sink::try_new(&self.stream_handle)
            .map_err(|e| format!("Failed to create audio sink: {}", e))?;

        sink.append(source);
        sink.detach(); // Let it play in the background

        Ok(())
    }
}

impl SoundPlayer for AudioFeedback {
    fn play(&self, event: SoundEvent) {
        let sound_data = self.theme.sound(event);
        if sound_data.is_empty() {
            return;
        }

        if let Err(e) = self.play_wav(sound_data) {
            tracing::warn!("Failed to play {:?} sound: {}", event, e);
        }
    }

    fn name(&self) -> &'static str {
        "rodio"
    }
}

/// Load a sound theme by name or path
fn load_theme(theme_name: &str) -> Result<SoundTheme, AudioError> {
    match theme_name {
        "typewriter" => typewriter_theme(),
        "soft" => soft_theme(),
        path => load_custom_theme(path),
    }
}

/// Load a custom theme from a directory
///
/// Missing files are silent rather than errors.
fn load_custom_theme(path: &str) -> Result<SoundTheme, AudioError> {
    let dir = PathBuf::from(path);
    if !dir.is_dir() {
        return Err(AudioError::ThemeNotFound(path.to_string()));
    }

    let load_file = |name: &str| -> Vec<u8> {
        let file_path = dir.join(name);
        std::fs::read(&file_path).unwrap_or_default()
    };

    Ok(SoundTheme {
        key: load_file("key.wav"),
        space: load_file("space.wav"),
        carriage_return: load_file("return.wav"),
        bell: load_file("bell.wav"),
    })
}

// === Sound Generation ===

fn sample_count(duration_ms: u32) -> usize {
    (SAMPLE_RATE * duration_ms / 1000) as usize
}

/// Type bar strike: a square wave sweeping down from 200Hz to 50Hz plus a
/// short 2kHz triangle "clack", both scaled by `pitch`
fn strike(pitch: f32, delay_ms: u32) -> Vec<f32> {
    let delay = sample_count(delay_ms);
    let body = sample_count(50);
    let clack = sample_count(30);
    let mut samples = vec![0.0; delay + body];

    let mut phase = 0.0f32;
    for i in 0..body {
        let progress = i as f32 / body as f32;
        // Exponential ramp 200Hz -> 50Hz
        let freq = 200.0 * pitch * (0.25f32).powf(progress);
        phase += freq / SAMPLE_RATE as f32;
        let square = if phase.fract() < 0.5 { 1.0 } else { -1.0 };
        let envelope = 0.5 * (0.02f32).powf(progress);
        samples[delay + i] += square * envelope;
    }

    for i in 0..clack {
        let t = i as f32 / SAMPLE_RATE as f32;
        let cycle = (2000.0 * pitch * t).fract();
        let triangle = 4.0 * (cycle - 0.5).abs() - 1.0;
        let envelope = 0.1 * (0.1f32).powf(i as f32 / clack as f32);
        samples[delay + i] += triangle * envelope;
    }

    samples
}

/// Sine bell with a long exponential decay
fn bell(freq: f32, duration_ms: u32, level: f32) -> Vec<f32> {
    let n = sample_count(duration_ms);
    (0..n)
        .map(|i| {
            let t = i as f32 / SAMPLE_RATE as f32;
            let envelope = level * (0.003f32).powf(i as f32 / n as f32);
            (2.0 * PI * freq * t).sin() * envelope
        })
        .collect()
}

/// Carriage zip: band-passed noise around 1kHz fading out linearly
fn zip(duration_ms: u32) -> Vec<f32> {
    let n = sample_count(duration_ms);
    let mut rng = StdRng::seed_from_u64(0x7e1e_7a9e);
    let mut filter = BandPass::new(1000.0, 1.0);

    (0..n)
        .map(|i| {
            let noise: f32 = rng.gen_range(-1.0..1.0);
            let envelope = 0.2 * (1.0 - i as f32 / n as f32);
            filter.process(noise) * envelope * 4.0
        })
        .collect()
}

/// Plain sine tone with fade in/out, used by the soft theme
fn tone(freq: f32, duration_ms: u32, fade_ms: u32) -> Vec<f32> {
    let n = sample_count(duration_ms);
    let fade = sample_count(fade_ms).max(1);
    (0..n)
        .map(|i| {
            let t = i as f32 / SAMPLE_RATE as f32;
            let mut amplitude = 0.4 * (2.0 * PI * freq * t).sin();
            if i < fade {
                amplitude *= i as f32 / fade as f32;
            } else if i >= n.saturating_sub(fade) {
                amplitude *= (n - i) as f32 / fade as f32;
            }
            amplitude
        })
        .collect()
}

/// Sum two sounds sample by sample
fn mix(a: Vec<f32>, b: &[f32]) -> Vec<f32> {
    let mut out = a;
    if out.len() < b.len() {
        out.resize(b.len(), 0.0);
    }
    for (o, s) in out.iter_mut().zip(b) {
        *o += s;
    }
    out
}

/// RBJ cookbook band-pass biquad (constant 0 dB peak gain)
struct BandPass {
    b0: f32,
    b2: f32,
    a1: f32,
    a2: f32,
    x1: f32,
    x2: f32,
    y1: f32,
    y2: f32,
}

impl BandPass {
    fn new(center: f32, q: f32) -> Self {
        let w0 = 2.0 * PI * center / SAMPLE_RATE as f32;
        let alpha = w0.sin() / (2.0 * q);
        let a0 = 1.0 + alpha;
        Self {
            b0: alpha / a0,
            b2: -alpha / a0,
            a1: -2.0 * w0.cos() / a0,
            a2: (1.0 - alpha) / a0,
            x1: 0.0,
            x2: 0.0,
            y1: 0.0,
            y2: 0.0,
        }
    }

    fn process(&mut self, x: f32) -> f32 {
        let y = self.b0 * x + self.b2 * self.x2 - self.a1 * self.y1 - self.a2 * self.y2;
        self.x2 = self.x1;
        self.x1 = x;
        self.y2 = self.y1;
        self.y1 = y;
        y
    }
}

/// Encode f32 samples as 16-bit mono WAV
fn encode_wav(samples: &[f32]) -> Result<Vec<u8>, AudioError> {
    let spec = hound::WavSpec {
        channels: 1,
        sample_rate: SAMPLE_RATE,
        bits_per_sample: 16,
        sample_format: hound::SampleFormat::Int,
    };

    let mut buffer = Cursor::new(Vec::new());
    let mut writer = hound::WavWriter::new(&mut buffer, spec)
        .map_err(|e| AudioError::Encode(format!("Failed to create WAV writer: {}", e)))?;

    for &sample in samples {
        let scaled = (sample.clamp(-1.0, 1.0) * i16::MAX as f32) as i16;
        writer
            .write_sample(scaled)
            .map_err(|e| AudioError::Encode(format!("Failed to write sample: {}", e)))?;
    }

    writer
        .finalize()
        .map_err(|e| AudioError::Encode(format!("Failed to finalize WAV: {}", e)))?;

    Ok(buffer.into_inner())
}

// === Built-in Themes ===

/// Typewriter theme: mechanical strikes, carriage zip and a bright bell
fn typewriter_theme() -> Result<SoundTheme, AudioError> {
    Ok(SoundTheme {
        key: encode_wav(&strike(1.0, 0))?,
        // Lower pitch, slightly late
        space: encode_wav(&strike(0.8, 5))?,
        carriage_return: encode_wav(&mix(zip(300), &bell(1200.0, 1500, 0.3)))?,
        bell: encode_wav(&bell(1200.0, 1500, 0.3))?,
    })
}

/// Soft theme: quiet sine blips for late-night typing
fn soft_theme() -> Result<SoundTheme, AudioError> {
    Ok(SoundTheme {
        key: encode_wav(&tone(900.0, 25, 5))?,
        space: encode_wav(&tone(600.0, 30, 5))?,
        carriage_return: encode_wav(&tone(440.0, 120, 20))?,
        bell: encode_wav(&bell(1200.0, 600, 0.15))?,
    })
}
