// src/job.rs
// One conversion job: read text, encode, synthesize, write

use crate::encoder::{self, Token};
use crate::error::{Error, Result};
use crate::mp3::{self, Id3Tags, LameEncoder, Mp3Settings};
use crate::synth::{SampleSink, Synthesizer};
use crate::timing::{DEFAULT_SAMPLE_RATE, DEFAULT_TONE_HZ, Speed, TimingConfig};
use crate::wav::{SampleWidth, SeekableWavWriter, StreamingWavWriter, WavFormat};
use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputFormat {
    Wav(SampleWidth),
    Mp3(Mp3Settings),
}

impl OutputFormat {
    pub fn extension(&self) -> &'static str {
        match self {
            OutputFormat::Wav(_) => "wav",
            OutputFormat::Mp3(_) => "mp3",
        }
    }
}

impl Default for OutputFormat {
    fn default() -> Self {
        OutputFormat::Wav(SampleWidth::default())
    }
}

/// Everything a job needs, resolved by the caller before it starts.
#[derive(Debug, Clone, PartialEq)]
pub struct JobConfig {
    pub speed: Speed,
    pub farnsworth_level: u8,
    pub tone_frequency_hz: f64,
    pub sample_rate_hz: u32,
    pub output: OutputFormat,
    /// MP3 encoder executable; `LAME_PATH` or `PATH` when unset.
    pub lame_path: Option<PathBuf>,
}

impl Default for JobConfig {
    fn default() -> Self {
        Self {
            speed: Speed::default(),
            farnsworth_level: 0,
            tone_frequency_hz: DEFAULT_TONE_HZ,
            sample_rate_hz: DEFAULT_SAMPLE_RATE,
            output: OutputFormat::default(),
            lame_path: None,
        }
    }
}

impl JobConfig {
    /// Validates the whole configuration and derives the timing model.
    pub fn timing(&self) -> Result<TimingConfig> {
        if let OutputFormat::Mp3(settings) = &self.output {
            settings.validate()?;
        }
        TimingConfig::new(
            self.speed,
            self.farnsworth_level,
            self.sample_rate_hz,
            self.tone_frequency_hz,
        )
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct JobReport {
    pub tokens: Vec<Token>,
    pub units: u64,
    pub samples: u64,
    pub duration_secs: f64,
}

impl JobReport {
    fn new(tokens: Vec<Token>, units: u64, timing: &TimingConfig) -> Self {
        let samples = timing.samples_for_units(units);
        Self {
            tokens,
            units,
            samples,
            duration_secs: samples as f64 / timing.sample_rate_hz() as f64,
        }
    }
}

/// Converts the text file at `input` into an audio file at `output`.
///
/// Configuration and input are checked before the output file is created. A
/// failure after that removes the partial output.
pub fn convert(config: &JobConfig, input: &Path, output: &Path) -> Result<JobReport> {
    let timing = config.timing()?;
    let file = File::open(input).map_err(|source| Error::Input {
        path: input.to_path_buf(),
        source,
    })?;
    let tokens = encoder::encode_reader(file).map_err(|source| Error::Input {
        path: input.to_path_buf(),
        source,
    })?;
    log::info!("Encoded {} into {} tokens", input.display(), tokens.len());

    // Nothing below may delete the output until this job has opened it.
    let mut sink = open_sink(config, &timing, &tokens, input, output)?;
    let result = Synthesizer::new(&timing)
        .stream(&tokens, &mut sink)
        .and_then(|units| sink.finish().map(|()| units));

    match result {
        Ok(units) => {
            log::info!("Wrote {}", output.display());
            Ok(JobReport::new(tokens, units, &timing))
        }
        Err(e) => {
            log::warn!("Removing incomplete output {}", output.display());
            std::fs::remove_file(output).ok();
            Err(e)
        }
    }
}

/// Streams `text` as a WAV file into a writer that need not be seekable.
pub fn convert_to_writer<W: Write>(config: &JobConfig, text: &str, writer: W) -> Result<JobReport> {
    let timing = config.timing()?;
    let OutputFormat::Wav(width) = config.output else {
        return Err(Error::config("MP3 output needs a file destination"));
    };
    let tokens = encoder::encode(text);
    let synth = Synthesizer::new(&timing);
    let format = WavFormat::new(timing.sample_rate_hz(), width);
    let mut sink = StreamingWavWriter::new(writer, format, synth.total_samples(&tokens))?;
    let units = synth.stream(&tokens, &mut sink)?;
    sink.finish()?;
    Ok(JobReport::new(tokens, units, &timing))
}

fn create(output: &Path) -> Result<BufWriter<File>> {
    File::create(output)
        .map(BufWriter::new)
        .map_err(|source| Error::Output {
            path: output.to_path_buf(),
            source,
        })
}

/// An opened destination for one job's samples.
enum OutputSink {
    Wav(SeekableWavWriter<BufWriter<File>>),
    Mp3(LameEncoder),
}

impl OutputSink {
    fn finish(self) -> Result<()> {
        match self {
            OutputSink::Wav(w) => w.finish(),
            OutputSink::Mp3(e) => e.finish(),
        }
    }
}

impl SampleSink for OutputSink {
    fn write_samples(&mut self, samples: &[i16]) -> Result<()> {
        match self {
            OutputSink::Wav(w) => w.write_samples(samples),
            OutputSink::Mp3(e) => e.write_samples(samples),
        }
    }
}

fn open_sink(
    config: &JobConfig,
    timing: &TimingConfig,
    tokens: &[Token],
    input: &Path,
    output: &Path,
) -> Result<OutputSink> {
    match config.output {
        OutputFormat::Wav(width) => {
            let format = WavFormat::new(timing.sample_rate_hz(), width);
            // Fail before touching the disk if the result cannot fit the container.
            format.data_len(Synthesizer::new(timing).total_samples(tokens))?;
            let writer = SeekableWavWriter::new(create(output)?, format)?;
            log::debug!("Writing {} bit WAV", width.bits());
            Ok(OutputSink::Wav(writer))
        }
        OutputFormat::Mp3(settings) => {
            let program = mp3::locate_lame(config.lame_path.as_deref())?;
            let source = input
                .file_name()
                .map(|n| n.to_string_lossy().into_owned())
                .unwrap_or_default();
            let tags = Id3Tags::for_message(&source, timing.wpm());
            let args = mp3::lame_args(&settings, &tags, timing.sample_rate_hz(), output);
            log::debug!(
                "Encoding MP3 at {} kbps, quality {}",
                settings.bitrate_kbps,
                settings.quality
            );
            Ok(OutputSink::Mp3(LameEncoder::spawn(&program, &args)?))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config_is_valid() {
        let timing = JobConfig::default().timing().unwrap();
        assert_eq!(timing, TimingConfig::default());
    }

    #[test]
    fn mp3_settings_are_validated_with_timing() {
        let config = JobConfig {
            output: OutputFormat::Mp3(Mp3Settings {
                bitrate_kbps: 16,
                quality: 12,
            }),
            ..Default::default()
        };
        assert!(config.timing().unwrap_err().is_config());
    }

    #[test]
    fn writer_output_is_header_plus_samples() {
        let config = JobConfig {
            sample_rate_hz: 8000,
            ..Default::default()
        };
        let mut out = Vec::new();
        let report = convert_to_writer(&config, "e", &mut out).unwrap();
        // e, word gap, closing signal with four inferred gaps
        assert_eq!(report.units, 1 + 7 + 15);
        assert_eq!(report.samples, report.units * 400);
        assert_eq!(out.len() as u64, 44 + report.samples);
    }

    #[test]
    fn writer_refuses_mp3() {
        let config = JobConfig {
            output: OutputFormat::Mp3(Mp3Settings::default()),
            ..Default::default()
        };
        assert!(convert_to_writer(&config, "e", Vec::new()).is_err());
    }
}
