use anyhow::{Context, Result, bail};
use clap::{Parser, ValueEnum};
use ditsynth::job::{self, JobConfig, JobReport, OutputFormat};
use ditsynth::mp3::{DEFAULT_BITRATE_KBPS, DEFAULT_QUALITY, Mp3Settings};
use ditsynth::timing::{DEFAULT_SAMPLE_RATE, DEFAULT_TONE_HZ, DEFAULT_WPM, Speed};
use ditsynth::{SampleWidth, encoder};
use std::io::BufWriter;
use std::path::{Path, PathBuf};

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum Format {
    Wav,
    Mp3,
}

#[derive(Parser)]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Text file to key as Morse code
    #[arg(value_name = "TEXT_FILE")]
    input: PathBuf,

    /// Output file; defaults to the input name with a .wav/.mp3 extension. `-` writes WAV to stdout
    #[arg(short, long, value_name = "FILE")]
    output: Option<PathBuf>,

    /// Speed in words per minute
    #[arg(short, long)]
    wpm: Option<f64>,

    /// Length of one dit in seconds (overrides --wpm)
    #[arg(short, long, value_name = "SECONDS")]
    dit_seconds: Option<f64>,

    /// Farnsworth spacing; repeat for double or triple spacing (-ff)
    #[arg(short, long, action = clap::ArgAction::Count)]
    farnsworth: u8,

    /// Tone setting in Hz. The square wave flips level every sample_rate/tone
    /// samples, so the audible pitch is about half this value (1000 sounds near 500 Hz)
    #[arg(short, long, default_value_t = DEFAULT_TONE_HZ)]
    tone: f64,

    /// Output sample rate in Hz
    #[arg(short, long, default_value_t = DEFAULT_SAMPLE_RATE)]
    sample_rate: u32,

    /// Output format
    #[arg(short = 'F', long, value_enum, default_value_t = Format::Wav)]
    format: Format,

    /// WAV bits per sample (8 or 16)
    #[arg(short, long, default_value_t = 8)]
    bits: u16,

    /// MP3 bitrate in kbps
    #[arg(short = 'r', long, default_value_t = DEFAULT_BITRATE_KBPS)]
    bitrate: u32,

    /// MP3 algorithm quality: 0 = best/slow, 9 = worst/fast
    #[arg(short, long, default_value_t = DEFAULT_QUALITY)]
    quality: u8,

    /// MP3 encoder executable (defaults to LAME_PATH, then `lame` on PATH)
    #[arg(long, value_name = "PATH")]
    lame_path: Option<PathBuf>,

    /// Print the dot/dash rendering and progress
    #[arg(short, long)]
    verbose: bool,
}

impl Cli {
    fn job_config(&self) -> Result<JobConfig> {
        let speed = match (self.dit_seconds, self.wpm) {
            (Some(seconds), _) => Speed::DitSeconds(seconds),
            (None, Some(wpm)) => Speed::Wpm(wpm),
            (None, None) => Speed::Wpm(DEFAULT_WPM),
        };
        let output = match self.format {
            Format::Wav => OutputFormat::Wav(match self.bits {
                8 => SampleWidth::U8,
                16 => SampleWidth::I16,
                other => bail!("Unsupported sample width: {} bits. Use 8 or 16.", other),
            }),
            Format::Mp3 => OutputFormat::Mp3(Mp3Settings {
                bitrate_kbps: self.bitrate,
                quality: self.quality,
            }),
        };
        Ok(JobConfig {
            speed,
            farnsworth_level: self.farnsworth,
            tone_frequency_hz: self.tone,
            sample_rate_hz: self.sample_rate,
            output,
            lame_path: self.lame_path.clone(),
        })
    }

    fn output_path(&self, format: &OutputFormat) -> PathBuf {
        self.output
            .clone()
            .unwrap_or_else(|| self.input.with_extension(format.extension()))
    }
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    // `RUST_LOG` takes precedence; -v only raises the default.
    let default_level = if cli.verbose { "info" } else { "warn" };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(default_level))
        .init();

    let config = cli.job_config()?;
    let output = cli.output_path(&config.output);
    if output == cli.input {
        bail!(
            "Refusing to overwrite the input file {:?}; pass --output",
            cli.input
        );
    }

    let report = if output == Path::new("-") {
        let bytes = std::fs::read(&cli.input)
            .with_context(|| format!("Failed to read {:?}", cli.input))?;
        let text = String::from_utf8_lossy(&bytes);
        let stdout = BufWriter::new(std::io::stdout().lock());
        job::convert_to_writer(&config, &text, stdout).context("Conversion failed")?
    } else {
        log::info!("Converting {:?} -> {:?}", cli.input, output);
        job::convert(&config, &cli.input, &output).context("Conversion failed")?
    };

    if cli.verbose {
        print_summary(&report);
    }
    Ok(())
}

fn print_summary(report: &JobReport) {
    // stderr, so a WAV streamed to stdout stays intact
    eprintln!("{}", encoder::preview(&report.tokens));
    eprintln!(
        "{} units, {} samples, {:.2}s",
        report.units, report.samples, report.duration_secs
    );
}
