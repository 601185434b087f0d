//! Audio system using Web Audio API
//!
//! 8-bit style sound effects synthesized from oscillators - no audio files.
//! Each effect is planned as a list of notes first, so the envelope math
//! is testable without a browser; only scheduling touches Web Audio.

use std::fmt;

use crate::consts::DEFAULT_VOLUME;

/// Gain multiplier applied to every preset effect
const EFFECT_GAIN: f32 = 0.3;
/// Envelope floor (exponential ramps cannot reach zero)
const RAMP_FLOOR: f32 = 0.01;

/// Oscillator waveform
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Waveform {
    #[default]
    Sine,
    Square,
    Sawtooth,
    Triangle,
}

/// Built-in sound effects
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SoundEffect {
    /// Button click - short beep
    Click,
    /// Points scored
    Score,
    /// Jump - rising chirp
    Jump,
    /// Wall/obstacle hit
    Hit,
    /// Game over - falling buzz
    GameOver,
    /// Level cleared
    Victory,
    /// Line/row cleared
    Clear,
    /// Time running out
    Warning,
}

/// Synthesis parameters for an effect
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SoundSpec {
    /// Base frequency (Hz)
    pub frequency: f32,
    /// Note length (seconds)
    pub duration: f64,
    pub waveform: Waveform,
    /// Note start offsets in milliseconds; empty means a single note
    pub pattern: &'static [u32],
    /// Linear pitch slide (from Hz, to Hz) over the note
    pub slide: Option<(f32, f32)>,
}

impl SoundEffect {
    pub const ALL: [SoundEffect; 8] = [
        SoundEffect::Click,
        SoundEffect::Score,
        SoundEffect::Jump,
        SoundEffect::Hit,
        SoundEffect::GameOver,
        SoundEffect::Victory,
        SoundEffect::Clear,
        SoundEffect::Warning,
    ];

    /// Name used by game pages
    pub fn name(&self) -> &'static str {
        match self {
            SoundEffect::Click => "click",
            SoundEffect::Score => "score",
            SoundEffect::Jump => "jump",
            SoundEffect::Hit => "hit",
            SoundEffect::GameOver => "gameover",
            SoundEffect::Victory => "victory",
            SoundEffect::Clear => "clear",
            SoundEffect::Warning => "warning",
        }
    }

    pub fn from_name(name: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|e| e.name() == name)
    }

    pub fn spec(&self) -> SoundSpec {
        match self {
            SoundEffect::Click => SoundSpec::note(800.0, 0.1, Waveform::Square),
            SoundEffect::Score => {
                SoundSpec::note(600.0, 0.15, Waveform::Square).with_pattern(&[0, 100, 200])
            }
            SoundEffect::Jump => {
                SoundSpec::note(400.0, 0.1, Waveform::Square).with_slide(400.0, 600.0)
            }
            SoundEffect::Hit => SoundSpec::note(200.0, 0.1, Waveform::Sawtooth),
            SoundEffect::GameOver => {
                SoundSpec::note(150.0, 0.5, Waveform::Sawtooth).with_slide(150.0, 50.0)
            }
            SoundEffect::Victory => SoundSpec::note(523.0, 0.2, Waveform::Square)
                .with_pattern(&[0, 100, 200, 300, 400, 500]),
            SoundEffect::Clear => {
                SoundSpec::note(800.0, 0.1, Waveform::Sine).with_pattern(&[0, 50, 100])
            }
            SoundEffect::Warning => {
                SoundSpec::note(440.0, 0.3, Waveform::Square).with_pattern(&[0, 150])
            }
        }
    }
}

impl SoundSpec {
    const fn note(frequency: f32, duration: f64, waveform: Waveform) -> Self {
        Self {
            frequency,
            duration,
            waveform,
            pattern: &[],
            slide: None,
        }
    }

    const fn with_pattern(mut self, pattern: &'static [u32]) -> Self {
        self.pattern = pattern;
        self
    }

    const fn with_slide(mut self, from: f32, to: f32) -> Self {
        self.slide = Some((from, to));
        self
    }
}

/// A single oscillator note, relative to "now"
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Note {
    /// Start delay (seconds)
    pub offset: f64,
    pub duration: f64,
    pub waveform: Waveform,
    pub frequency: f32,
    /// Frequency to ramp to by the end of the note
    pub slide_to: Option<f32>,
    /// Initial gain; decays exponentially to the envelope floor
    pub gain: f32,
}

/// Outcome of a play request
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Playback {
    /// Notes were scheduled
    Played { notes: usize },
    /// Muted, zero volume, or audio not initialized
    Silent,
}

/// Audio failures
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AudioError {
    /// No Web Audio support on this platform
    Unavailable,
    /// No effect with this name
    UnknownSound(String),
    /// Web Audio rejected a call
    Backend(String),
}

impl fmt::Display for AudioError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AudioError::Unavailable => write!(f, "Web Audio API unavailable"),
            AudioError::UnknownSound(name) => write!(f, "unknown sound effect: {name}"),
            AudioError::Backend(msg) => write!(f, "audio backend error: {msg}"),
        }
    }
}

impl std::error::Error for AudioError {}

/// Plan the notes for a preset effect at `volume`
pub fn plan_effect(effect: SoundEffect, volume: f32) -> Vec<Note> {
    let spec = effect.spec();
    let (frequency, slide_to) = match spec.slide {
        Some((from, to)) => (from, Some(to)),
        None => (spec.frequency, None),
    };
    let note = |offset_ms: u32| Note {
        offset: offset_ms as f64 / 1000.0,
        duration: spec.duration,
        waveform: spec.waveform,
        frequency,
        slide_to,
        gain: volume * EFFECT_GAIN,
    };

    if spec.pattern.is_empty() {
        vec![note(0)]
    } else {
        spec.pattern.iter().map(|&ms| note(ms)).collect()
    }
}

/// Sound effect player
pub struct AudioSystem {
    #[cfg(target_arch = "wasm32")]
    ctx: Option<web_sys::AudioContext>,
    muted: bool,
    volume: f32,
    initialized: bool,
}

impl Default for AudioSystem {
    fn default() -> Self {
        Self::new()
    }
}

impl AudioSystem {
    /// Create an uninitialized system; call [`AudioSystem::init`] after a
    /// user gesture
    pub fn new() -> Self {
        Self {
            #[cfg(target_arch = "wasm32")]
            ctx: None,
            muted: false,
            volume: DEFAULT_VOLUME,
            initialized: false,
        }
    }

    pub fn is_initialized(&self) -> bool {
        self.initialized
    }

    pub fn is_muted(&self) -> bool {
        self.muted
    }

    pub fn volume(&self) -> f32 {
        self.volume
    }

    /// Create the audio context. Safe to call repeatedly.
    pub fn init(&mut self) -> Result<(), AudioError> {
        if self.initialized {
            return Ok(());
        }
        self.init_backend()?;
        self.initialized = true;
        log::info!("Audio initialized");
        Ok(())
    }

    #[cfg(target_arch = "wasm32")]
    fn init_backend(&mut self) -> Result<(), AudioError> {
        let ctx = web_sys::AudioContext::new().map_err(|e| {
            log::warn!("Failed to create AudioContext - audio disabled");
            AudioError::Backend(format!("{e:?}"))
        })?;
        self.ctx = Some(ctx);
        Ok(())
    }

    #[cfg(not(target_arch = "wasm32"))]
    fn init_backend(&mut self) -> Result<(), AudioError> {
        Err(AudioError::Unavailable)
    }

    /// Toggle mute, returning the new muted flag
    pub fn toggle_mute(&mut self) -> bool {
        self.muted = !self.muted;
        self.muted
    }

    pub fn set_muted(&mut self, muted: bool) {
        self.muted = muted;
    }

    /// Set master volume (clamped to 0.0 - 1.0)
    pub fn set_volume(&mut self, volume: f32) {
        self.volume = volume.clamp(0.0, 1.0);
    }

    fn audible(&self) -> bool {
        self.initialized && !self.muted && self.volume > 0.0
    }

    /// Play a preset effect
    pub fn play(&self, effect: SoundEffect) -> Result<Playback, AudioError> {
        if !self.audible() {
            return Ok(Playback::Silent);
        }
        let notes = plan_effect(effect, self.volume);
        self.schedule(&notes)?;
        Ok(Playback::Played { notes: notes.len() })
    }

    /// Play an effect by its page-facing name (e.g. `"gameover"`)
    pub fn play_named(&self, name: &str) -> Result<Playback, AudioError> {
        let effect =
            SoundEffect::from_name(name).ok_or_else(|| AudioError::UnknownSound(name.to_string()))?;
        self.play(effect)
    }

    /// Play a one-off tone; `tone_volume` scales the master volume
    pub fn play_tone(
        &self,
        frequency: f32,
        duration: f64,
        waveform: Waveform,
        tone_volume: f32,
    ) -> Result<Playback, AudioError> {
        let gain = tone_volume * self.volume;
        if !self.audible() || gain <= 0.0 {
            return Ok(Playback::Silent);
        }
        self.schedule(&[Note {
            offset: 0.0,
            duration,
            waveform,
            frequency,
            slide_to: None,
            gain,
        }])?;
        Ok(Playback::Played { notes: 1 })
    }

    #[cfg(not(target_arch = "wasm32"))]
    fn schedule(&self, _notes: &[Note]) -> Result<(), AudioError> {
        Err(AudioError::Unavailable)
    }

    #[cfg(target_arch = "wasm32")]
    fn schedule(&self, notes: &[Note]) -> Result<(), AudioError> {
        let ctx = self.ctx.as_ref().ok_or(AudioError::Unavailable)?;

        // Resume context if suspended (browsers require user gesture)
        if ctx.state() == web_sys::AudioContextState::Suspended {
            if let Err(e) = ctx.resume() {
                log::warn!("AudioContext resume failed: {:?}", e);
            }
        }

        for note in notes {
            web::schedule_note(ctx, note)?;
        }
        Ok(())
    }
}

#[cfg(target_arch = "wasm32")]
mod web {
    use web_sys::{AudioContext, OscillatorType};

    use super::{AudioError, Note, RAMP_FLOOR, Waveform};

    fn backend(e: wasm_bindgen::JsValue) -> AudioError {
        AudioError::Backend(format!("{e:?}"))
    }

    fn oscillator_type(waveform: Waveform) -> OscillatorType {
        match waveform {
            Waveform::Sine => OscillatorType::Sine,
            Waveform::Square => OscillatorType::Square,
            Waveform::Sawtooth => OscillatorType::Sawtooth,
            Waveform::Triangle => OscillatorType::Triangle,
        }
    }

    /// Oscillator -> gain -> destination, with a decaying envelope
    pub(super) fn schedule_note(ctx: &AudioContext, note: &Note) -> Result<(), AudioError> {
        let osc = ctx.create_oscillator().map_err(backend)?;
        let gain = ctx.create_gain().map_err(backend)?;
        let t = ctx.current_time() + note.offset;
        let end = t + note.duration;

        osc.set_type(oscillator_type(note.waveform));
        osc.frequency()
            .set_value_at_time(note.frequency, t)
            .map_err(backend)?;
        if let Some(to) = note.slide_to {
            osc.frequency()
                .linear_ramp_to_value_at_time(to, end)
                .map_err(backend)?;
        }

        gain.gain().set_value_at_time(note.gain, t).map_err(backend)?;
        gain.gain()
            .exponential_ramp_to_value_at_time(RAMP_FLOOR, end)
            .map_err(backend)?;

        osc.connect_with_audio_node(&gain).map_err(backend)?;
        gain.connect_with_audio_node(&ctx.destination())
            .map_err(backend)?;

        osc.start_with_when(t).map_err(backend)?;
        osc.stop_with_when(end).map_err(backend)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_names_roundtrip() {
        for effect in SoundEffect::ALL {
            assert_eq!(SoundEffect::from_name(effect.name()), Some(effect));
        }
        assert_eq!(SoundEffect::from_name("explode"), None);
    }

    #[test]
    fn test_pattern_expands_to_notes() {
        let notes = plan_effect(SoundEffect::Victory, 1.0);
        assert_eq!(notes.len(), 6);
        assert!((notes[5].offset - 0.5).abs() < 1e-9);
        assert!(notes.iter().all(|n| n.frequency == 523.0));
        assert!(notes.iter().all(|n| (n.gain - 0.3).abs() < 1e-6));
    }

    #[test]
    fn test_slide_sets_start_and_end_pitch() {
        let notes = plan_effect(SoundEffect::GameOver, 0.5);
        assert_eq!(notes.len(), 1);
        assert_eq!(notes[0].frequency, 150.0);
        assert_eq!(notes[0].slide_to, Some(50.0));
        assert_eq!(notes[0].waveform, Waveform::Sawtooth);
        assert!((notes[0].gain - 0.15).abs() < 1e-6);
    }

    #[test]
    fn test_uninitialized_is_silent() {
        let audio = AudioSystem::new();
        assert_eq!(audio.play(SoundEffect::Click), Ok(Playback::Silent));
        assert_eq!(
            audio.play_tone(440.0, 0.2, Waveform::Sine, 0.3),
            Ok(Playback::Silent)
        );
    }

    #[test]
    fn test_unknown_name_is_an_error() {
        let audio = AudioSystem::new();
        assert_eq!(
            audio.play_named("kaboom"),
            Err(AudioError::UnknownSound("kaboom".to_string()))
        );
        assert_eq!(audio.play_named("score"), Ok(Playback::Silent));
    }

    #[test]
    fn test_mute_and_volume() {
        let mut audio = AudioSystem::new();
        assert_eq!(audio.volume(), 0.7);
        assert!(audio.toggle_mute());
        assert!(!audio.toggle_mute());
        audio.set_volume(1.7);
        assert_eq!(audio.volume(), 1.0);
        audio.set_volume(-0.2);
        assert_eq!(audio.volume(), 0.0);
    }

    #[cfg(not(target_arch = "wasm32"))]
    #[test]
    fn test_native_init_reports_unavailable() {
        let mut audio = AudioSystem::new();
        assert_eq!(audio.init(), Err(AudioError::Unavailable));
        assert!(!audio.is_initialized());
    }
}
