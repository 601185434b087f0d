//! Engine settings and preferences
//!
//! Persisted as JSON in the key-value store, separate from scores and
//! achievements.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::consts::{DEFAULT_HEIGHT, DEFAULT_VOLUME, DEFAULT_WIDTH};
use crate::persistence::{KeyValueStore, StorageError};

/// How much decoration a game draws
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum EffectsQuality {
    /// No starfield, small particle budget
    Lite,
    #[default]
    Standard,
    Full,
}

impl EffectsQuality {
    pub const ALL: [EffectsQuality; 3] = [Self::Lite, Self::Standard, Self::Full];

    pub fn name(self) -> &'static str {
        match self {
            Self::Lite => "lite",
            Self::Standard => "standard",
            Self::Full => "full",
        }
    }

    /// Live particles allowed at once; each level holds a full victory burst
    pub fn particle_budget(self) -> usize {
        match self {
            Self::Lite => 60,
            Self::Standard => 240,
            Self::Full => 960,
        }
    }

    pub fn draws_starfield(self) -> bool {
        self != Self::Lite
    }
}

impl fmt::Display for EffectsQuality {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Unrecognised quality name
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParseQualityError(pub String);

impl fmt::Display for ParseQualityError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "unknown effects quality {:?}", self.0)
    }
}

impl std::error::Error for ParseQualityError {}

impl FromStr for EffectsQuality {
    type Err = ParseQualityError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = s.trim();
        Self::ALL
            .into_iter()
            .find(|q| q.name().eq_ignore_ascii_case(wanted))
            .ok_or_else(|| ParseQualityError(wanted.to_string()))
    }
}

/// Engine settings/preferences
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineSettings {
    /// Canvas width in pixels
    pub width: u32,
    /// Canvas height in pixels
    pub height: u32,
    /// Decoration level
    pub quality: EffectsQuality,

    // === Visual Effects ===
    /// Particle effects (bursts on score, hit, victory)
    pub particles: bool,
    /// Background starfield
    pub starfield: bool,

    // === Audio ===
    /// Sound effects muted
    pub muted: bool,
    /// Master volume (0.0 - 1.0)
    pub volume: f32,
}

impl Default for EngineSettings {
    fn default() -> Self {
        Self {
            width: DEFAULT_WIDTH,
            height: DEFAULT_HEIGHT,
            quality: EffectsQuality::Standard,

            particles: true,
            starfield: true,

            muted: false,
            volume: DEFAULT_VOLUME,
        }
    }
}

impl EngineSettings {
    /// Defaults at the given quality
    pub fn from_quality(quality: EffectsQuality) -> Self {
        let mut settings = Self::default();
        settings.apply_quality(quality);
        settings
    }

    /// Switch quality; the starfield toggle follows it
    pub fn apply_quality(&mut self, quality: EffectsQuality) {
        self.quality = quality;
        self.starfield = quality.draws_starfield();
    }

    /// Effective particle cap
    pub fn max_particles(&self) -> usize {
        if !self.particles {
            0
        } else {
            self.quality.particle_budget()
        }
    }

    /// Effective starfield toggle
    pub fn effective_starfield(&self) -> bool {
        self.starfield && self.quality.draws_starfield()
    }

    /// Storage key
    pub const STORAGE_KEY: &'static str = "arcade_kit_settings";

    /// Load settings, falling back to defaults on missing or corrupt data
    pub fn load<S: KeyValueStore + ?Sized>(store: &S) -> Self {
        match store.get_item(Self::STORAGE_KEY) {
            Ok(Some(json)) => match serde_json::from_str::<EngineSettings>(&json) {
                Ok(mut settings) => {
                    settings.volume = settings.volume.clamp(0.0, 1.0);
                    log::info!("Loaded settings");
                    return settings;
                }
                Err(e) => log::warn!("Ignoring corrupt settings: {}", e),
            },
            Ok(None) => {}
            Err(e) => log::warn!("Could not read settings: {}", e),
        }

        log::info!("Using default settings");
        Self::default()
    }

    /// Save settings
    pub fn save<S: KeyValueStore + ?Sized>(&self, store: &mut S) -> Result<(), StorageError> {
        let json = serde_json::to_string(self)?;
        store.set_item(Self::STORAGE_KEY, &json)?;
        log::info!("Settings saved");
        Ok(())
    }
}
