// src/timing.rs
// Timing model: dit unit, Farnsworth gaps and samples per unit

use crate::encoder::Token;
use crate::error::{Error, Result};

pub const DEFAULT_WPM: f64 = 20.0;
pub const DEFAULT_SAMPLE_RATE: u32 = 44100;
pub const DEFAULT_TONE_HZ: f64 = 1000.0;

// Standard spacing and the amount added per Farnsworth level.
const LETTER_GAP_UNITS: u32 = 3;
const WORD_GAP_UNITS: u32 = 7;

pub const DOT_UNITS: u32 = 1;
pub const DASH_UNITS: u32 = 3;
pub const INTRA_CHAR_GAP_UNITS: u32 = 1;

/// How the base unit is specified. Exactly one of these resolves the dit length.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Speed {
    /// A unit lasts `1 / wpm` seconds (50 ms at 20 wpm).
    Wpm(f64),
    DitSeconds(f64),
}

impl Default for Speed {
    fn default() -> Self {
        Speed::Wpm(DEFAULT_WPM)
    }
}

impl Speed {
    fn dit_seconds(self) -> Result<f64> {
        match self {
            Speed::Wpm(wpm) if wpm.is_finite() && wpm > 0.0 => Ok(1.0 / wpm),
            Speed::Wpm(wpm) => Err(Error::config(format!(
                "words per minute must be a positive number, got {wpm}"
            ))),
            Speed::DitSeconds(s) if s.is_finite() && s > 0.0 => Ok(s),
            Speed::DitSeconds(s) => Err(Error::config(format!(
                "dit length must be a positive number of seconds, got {s}"
            ))),
        }
    }
}

/// Immutable, validated timing for one conversion job.
#[derive(Debug, Clone, PartialEq)]
pub struct TimingConfig {
    dit_seconds: f64,
    farnsworth_level: u8,
    inter_letter_units: u32,
    inter_word_units: u32,
    sample_rate_hz: u32,
    tone_frequency_hz: f64,
    samples_per_unit: usize,
    half_period_samples: usize,
}

impl TimingConfig {
    pub fn new(
        speed: Speed,
        farnsworth_level: u8,
        sample_rate_hz: u32,
        tone_frequency_hz: f64,
    ) -> Result<Self> {
        let dit_seconds = speed.dit_seconds()?;
        if sample_rate_hz == 0 {
            return Err(Error::config("sample rate must be greater than zero"));
        }
        if !tone_frequency_hz.is_finite() || tone_frequency_hz <= 0.0 {
            return Err(Error::config(format!(
                "tone frequency must be a positive number of hertz, got {tone_frequency_hz}"
            )));
        }

        // Rounded once here; every duration afterwards is a whole multiple.
        let samples_per_unit = (dit_seconds * sample_rate_hz as f64).round();
        if samples_per_unit < 1.0 {
            return Err(Error::config(format!(
                "a {dit_seconds}s unit is shorter than one sample at {sample_rate_hz} Hz"
            )));
        }
        if samples_per_unit > u32::MAX as f64 {
            return Err(Error::config(format!("a {dit_seconds}s unit is too long")));
        }

        let half_period_samples = (sample_rate_hz as f64 / tone_frequency_hz).round();
        if half_period_samples < 1.0 {
            return Err(Error::config(format!(
                "tone of {tone_frequency_hz} Hz cannot be represented at {sample_rate_hz} Hz"
            )));
        }

        let level = farnsworth_level as u32;
        Ok(Self {
            dit_seconds,
            farnsworth_level,
            inter_letter_units: LETTER_GAP_UNITS + LETTER_GAP_UNITS * level,
            inter_word_units: WORD_GAP_UNITS + WORD_GAP_UNITS * level,
            sample_rate_hz,
            tone_frequency_hz,
            samples_per_unit: samples_per_unit as usize,
            half_period_samples: half_period_samples as usize,
        })
    }

    pub fn dit_seconds(&self) -> f64 {
        self.dit_seconds
    }

    /// Nominal speed, `1 / dit_seconds`.
    pub fn wpm(&self) -> f64 {
        1.0 / self.dit_seconds
    }

    pub fn farnsworth_level(&self) -> u8 {
        self.farnsworth_level
    }

    pub fn inter_letter_units(&self) -> u32 {
        self.inter_letter_units
    }

    pub fn inter_word_units(&self) -> u32 {
        self.inter_word_units
    }

    pub fn sample_rate_hz(&self) -> u32 {
        self.sample_rate_hz
    }

    pub fn tone_frequency_hz(&self) -> f64 {
        self.tone_frequency_hz
    }

    pub fn samples_per_unit(&self) -> usize {
        self.samples_per_unit
    }

    /// Samples between level changes of the square wave.
    pub fn half_period_samples(&self) -> usize {
        self.half_period_samples
    }

    /// Units a token occupies. Inferred intra-character gaps are not tokens.
    pub fn units(&self, token: Token) -> u32 {
        match token {
            Token::Dot => DOT_UNITS,
            Token::Dash => DASH_UNITS,
            Token::LetterGap => self.inter_letter_units,
            Token::WordGap => self.inter_word_units,
        }
    }

    pub fn samples_for_units(&self, units: u64) -> u64 {
        units * self.samples_per_unit as u64
    }
}

impl Default for TimingConfig {
    fn default() -> Self {
        Self::new(Speed::default(), 0, DEFAULT_SAMPLE_RATE, DEFAULT_TONE_HZ)
            .expect("default timing should be valid")
    }
}
