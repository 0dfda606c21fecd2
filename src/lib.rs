// src/lib.rs
// Library interface for ditsynth

pub mod encoder;
pub mod error;
pub mod job;
pub mod mp3;
pub mod symbols;
pub mod synth;
pub mod timing;
pub mod wav;

pub use encoder::{Encoder, Token, encode};
pub use error::{Error, Result};
pub use job::{JobConfig, JobReport, OutputFormat, convert, convert_to_writer};
pub use synth::{AudioSegment, Rendering, SampleSink, SegmentKind, Synthesizer};
pub use timing::{Speed, TimingConfig};
pub use wav::{SampleWidth, WavFormat};
