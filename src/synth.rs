// src/synth.rs
// Square-wave synthesizer turning Morse tokens into mono PCM

use crate::encoder::Token;
use crate::error::Result;
use crate::timing::{INTRA_CHAR_GAP_UNITS, TimingConfig};

/// Square wave levels: the classic 8-bit +64/-63 swing scaled to 16 bits.
pub const TONE_HIGH: i16 = 64 << 8;
pub const TONE_LOW: i16 = -63 << 8;

const CHUNK_SIZE: usize = 4096;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SegmentKind {
    Tone,
    Silence,
}

/// A token resolved against the timing model.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AudioSegment {
    pub kind: SegmentKind,
    pub units: u32,
    pub samples: u64,
}

/// Destination for synthesized samples, consumed strictly in order.
pub trait SampleSink {
    fn write_samples(&mut self, samples: &[i16]) -> Result<()>;
}

impl SampleSink for Vec<i16> {
    fn write_samples(&mut self, samples: &[i16]) -> Result<()> {
        self.extend_from_slice(samples);
        Ok(())
    }
}

/// Finished PCM for a whole message.
#[derive(Debug, Clone, PartialEq)]
pub struct Rendering {
    pub samples: Vec<i16>,
    pub units: u64,
}

/// Two-level square wave whose phase restarts with every tone.
#[derive(Debug, Clone)]
struct SquareWave {
    half_period: usize,
    position: usize,
}

impl SquareWave {
    fn new(half_period: usize) -> Self {
        Self {
            half_period,
            position: 0,
        }
    }

    fn fill(&mut self, out: &mut [i16]) {
        let mut filled = 0;
        while filled < out.len() {
            let into_half = self.position % self.half_period;
            let run = (self.half_period - into_half).min(out.len() - filled);
            let level = if (self.position / self.half_period) % 2 == 1 {
                TONE_HIGH
            } else {
                TONE_LOW
            };
            out[filled..filled + run].fill(level);
            filled += run;
            self.position += run;
        }
    }
}

pub struct Synthesizer<'a> {
    timing: &'a TimingConfig,
}

impl<'a> Synthesizer<'a> {
    pub fn new(timing: &'a TimingConfig) -> Self {
        Self { timing }
    }

    /// Resolves tokens into segments, inserting the one-unit gap between
    /// adjacent marks of the same letter.
    pub fn segments<'t>(&self, tokens: &'t [Token]) -> Segments<'a, 't> {
        Segments {
            timing: self.timing,
            tokens: tokens.iter(),
            previous_was_mark: false,
            pending: None,
        }
    }

    /// Units the token sequence occupies, inferred gaps included.
    pub fn total_units(&self, tokens: &[Token]) -> u64 {
        self.segments(tokens).map(|s| s.units as u64).sum()
    }

    pub fn total_samples(&self, tokens: &[Token]) -> u64 {
        self.timing.samples_for_units(self.total_units(tokens))
    }

    /// Renders the whole message into a buffer sized up front.
    pub fn render(&self, tokens: &[Token]) -> Result<Rendering> {
        let total = self.total_samples(tokens) as usize;
        let mut samples = Vec::with_capacity(total);
        let units = self.stream(tokens, &mut samples)?;
        debug_assert_eq!(samples.len(), total);
        Ok(Rendering { samples, units })
    }

    /// Writes the message segment by segment and returns the units rendered.
    pub fn stream<S: SampleSink + ?Sized>(&self, tokens: &[Token], sink: &mut S) -> Result<u64> {
        let mut chunk = vec![0i16; CHUNK_SIZE];
        let mut units = 0u64;
        for segment in self.segments(tokens) {
            let mut wave = SquareWave::new(self.timing.half_period_samples());
            let mut remaining = segment.samples as usize;
            while remaining > 0 {
                let n = remaining.min(CHUNK_SIZE);
                match segment.kind {
                    SegmentKind::Tone => wave.fill(&mut chunk[..n]),
                    SegmentKind::Silence => chunk[..n].fill(0),
                }
                sink.write_samples(&chunk[..n])?;
                remaining -= n;
            }
            units += segment.units as u64;
        }
        log::debug!(
            "Rendered {} units ({} samples per unit)",
            units,
            self.timing.samples_per_unit()
        );
        Ok(units)
    }
}

pub struct Segments<'a, 't> {
    timing: &'a TimingConfig,
    tokens: std::slice::Iter<'t, Token>,
    previous_was_mark: bool,
    pending: Option<AudioSegment>,
}

impl Segments<'_, '_> {
    fn segment(&self, kind: SegmentKind, units: u32) -> AudioSegment {
        AudioSegment {
            kind,
            units,
            samples: self.timing.samples_for_units(units as u64),
        }
    }
}

impl Iterator for Segments<'_, '_> {
    type Item = AudioSegment;

    fn next(&mut self) -> Option<AudioSegment> {
        if let Some(pending) = self.pending.take() {
            return Some(pending);
        }
        let token = *self.tokens.next()?;
        let units = self.timing.units(token);
        if !token.is_mark() {
            self.previous_was_mark = false;
            return Some(self.segment(SegmentKind::Silence, units));
        }

        let tone = self.segment(SegmentKind::Tone, units);
        if std::mem::replace(&mut self.previous_was_mark, true) {
            self.pending = Some(tone);
            Some(self.segment(SegmentKind::Silence, INTRA_CHAR_GAP_UNITS))
        } else {
            Some(tone)
        }
    }
}
