// src/mp3.rs
// MP3 output by piping raw PCM into an external LAME process

use crate::error::{Error, Result};
use crate::synth::SampleSink;
use chrono::Datelike;
use std::ffi::OsString;
use std::io::{Read, Write};
use std::path::{Path, PathBuf};
use std::process::{Child, ChildStdin, Command, Stdio};

pub const DEFAULT_BITRATE_KBPS: u32 = 16;
pub const DEFAULT_QUALITY: u8 = 7;

// Bitrates LAME accepts for CBR MPEG-1/2/2.5 layer III.
const BITRATES_KBPS: &[u32] = &[
    8, 16, 24, 32, 40, 48, 56, 64, 80, 96, 112, 128, 144, 160, 192, 224, 256, 320,
];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Mp3Settings {
    pub bitrate_kbps: u32,
    /// 0 is best and slowest, 9 worst and fastest.
    pub quality: u8,
}

impl Default for Mp3Settings {
    fn default() -> Self {
        Self {
            bitrate_kbps: DEFAULT_BITRATE_KBPS,
            quality: DEFAULT_QUALITY,
        }
    }
}

impl Mp3Settings {
    pub fn validate(&self) -> Result<()> {
        if !BITRATES_KBPS.contains(&self.bitrate_kbps) {
            return Err(Error::config(format!(
                "unsupported MP3 bitrate {} kbps (expected one of {:?})",
                self.bitrate_kbps, BITRATES_KBPS
            )));
        }
        if self.quality > 9 {
            return Err(Error::config(format!(
                "MP3 quality must be between 0 and 9, got {}",
                self.quality
            )));
        }
        Ok(())
    }
}

/// Metadata written into the ID3v2 tag.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Id3Tags {
    pub title: String,
    pub artist: String,
    pub album: String,
    pub year: String,
    pub comment: String,
    pub genre: String,
}

impl Id3Tags {
    /// Tags describing `source` keyed at `wpm`, dated with the current year.
    pub fn for_message(source: &str, wpm: f64) -> Self {
        Self {
            title: format!("Morse code at {wpm:.0} wpm of {source}"),
            artist: env!("CARGO_PKG_NAME").to_string(),
            album: "CW".to_string(),
            year: chrono::Local::now().year().to_string(),
            comment: format!(
                "Generated by {} {}",
                env!("CARGO_PKG_NAME"),
                env!("CARGO_PKG_VERSION")
            ),
            genre: "CW".to_string(),
        }
    }
}

/// Finds the LAME executable: an explicit path, then `LAME_PATH`, then `lame` on `PATH`.
pub fn locate_lame(explicit: Option<&Path>) -> Result<PathBuf> {
    if let Some(path) = explicit {
        return Ok(path.to_path_buf());
    }
    if let Some(path) = std::env::var_os("LAME_PATH") {
        return Ok(PathBuf::from(path));
    }
    which::which("lame").map_err(|_| Error::EncoderNotFound)
}

/// Command line for encoding raw 16-bit little-endian mono PCM from stdin.
pub fn lame_args(
    settings: &Mp3Settings,
    tags: &Id3Tags,
    sample_rate_hz: u32,
    output: &Path,
) -> Vec<OsString> {
    let mut args: Vec<OsString> = [
        "--silent",
        "-r",
        "--signed",
        "--little-endian",
        "--bitwidth",
        "16",
        "-m",
        "m",
        "--add-id3v2",
    ]
    .iter()
    .map(|s| OsString::from(*s))
    .collect();

    let mut push = |flag: &str, value: String| {
        args.push(flag.into());
        args.push(value.into());
    };
    push("-s", format!("{}", sample_rate_hz as f64 / 1000.0));
    push("-b", settings.bitrate_kbps.to_string());
    push("-q", settings.quality.to_string());
    push("--tt", tags.title.clone());
    push("--ta", tags.artist.clone());
    push("--tl", tags.album.clone());
    push("--ty", tags.year.clone());
    push("--tc", tags.comment.clone());
    push("--tg", tags.genre.clone());

    args.push("-".into());
    args.push(output.as_os_str().to_owned());
    args
}

/// A running encoder process fed through [`SampleSink`].
pub struct LameEncoder {
    child: Child,
    stdin: Option<ChildStdin>,
    scratch: Vec<u8>,
    reaped: bool,
}

impl LameEncoder {
    pub fn spawn(program: &Path, args: &[OsString]) -> Result<Self> {
        log::info!("Spawning MP3 encoder: {}", program.display());
        log::debug!("Encoder arguments: {:?}", args);
        let mut child = Command::new(program)
            .args(args)
            .stdin(Stdio::piped())
            .stdout(Stdio::null())
            .stderr(Stdio::piped())
            .spawn()
            .map_err(|e| match e.kind() {
                std::io::ErrorKind::NotFound => Error::EncoderNotFound,
                _ => Error::Io(e),
            })?;
        let stdin = child.stdin.take();
        Ok(Self {
            child,
            stdin,
            scratch: Vec::new(),
            reaped: false,
        })
    }

    /// Closes the PCM stream and waits for the encoder to flush its output.
    pub fn finish(mut self) -> Result<()> {
        self.wait()
    }

    fn wait(&mut self) -> Result<()> {
        drop(self.stdin.take());
        let status = self.child.wait()?;
        self.reaped = true;
        if status.success() {
            return Ok(());
        }
        let mut stderr = String::new();
        if let Some(mut pipe) = self.child.stderr.take() {
            pipe.read_to_string(&mut stderr).ok();
        }
        Err(Error::EncoderFailed {
            status: status.to_string(),
            stderr: stderr.trim().to_string(),
        })
    }
}

impl SampleSink for LameEncoder {
    fn write_samples(&mut self, samples: &[i16]) -> Result<()> {
        let Some(stdin) = self.stdin.as_mut() else {
            return Err(Error::Io(std::io::ErrorKind::BrokenPipe.into()));
        };
        self.scratch.clear();
        for &s in samples {
            self.scratch.extend_from_slice(&s.to_le_bytes());
        }
        if let Err(e) = stdin.write_all(&self.scratch) {
            log::debug!("MP3 encoder stopped reading: {}", e);
            // The encoder's own exit status and message explain the broken pipe.
            return Err(match self.wait() {
                Err(failed @ Error::EncoderFailed { .. }) => failed,
                _ => Error::Io(e),
            });
        }
        Ok(())
    }
}

impl Drop for LameEncoder {
    fn drop(&mut self) {
        if !self.reaped {
            drop(self.stdin.take());
            self.child.kill().ok();
            self.child.wait().ok();
        }
    }
}
