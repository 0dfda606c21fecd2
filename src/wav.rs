// src/wav.rs
// Minimal mono linear-PCM WAV container

use crate::error::{Error, Result};
use crate::synth::SampleSink;
use hound::{SampleFormat, WavSpec, WavWriter};
use std::io::{Seek, Write};

pub const HEADER_LEN: usize = 44;

/// Bytes between the RIFF size field and the first sample, minus the data itself.
const RIFF_OVERHEAD: u64 = 36;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SampleWidth {
    /// 8-bit, unsigned with a 128 offset.
    #[default]
    U8,
    I16,
}

impl SampleWidth {
    pub fn bytes(self) -> u16 {
        match self {
            SampleWidth::U8 => 1,
            SampleWidth::I16 => 2,
        }
    }

    pub fn bits(self) -> u16 {
        self.bytes() * 8
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WavFormat {
    pub sample_rate: u32,
    pub width: SampleWidth,
}

impl WavFormat {
    pub const CHANNELS: u16 = 1;

    pub fn new(sample_rate: u32, width: SampleWidth) -> Self {
        Self { sample_rate, width }
    }

    pub fn block_align(&self) -> u16 {
        Self::CHANNELS * self.width.bytes()
    }

    pub fn byte_rate(&self) -> u32 {
        self.sample_rate * self.block_align() as u32
    }

    pub fn spec(&self) -> WavSpec {
        WavSpec {
            channels: Self::CHANNELS,
            sample_rate: self.sample_rate,
            bits_per_sample: self.width.bits(),
            sample_format: SampleFormat::Int,
        }
    }

    pub fn data_len(&self, sample_count: u64) -> Result<u32> {
        let bytes = sample_count * self.width.bytes() as u64;
        if bytes + RIFF_OVERHEAD > u32::MAX as u64 {
            return Err(Error::TooLong { bytes });
        }
        Ok(bytes as u32)
    }
}

/// 16-bit synthesizer output narrowed to the top byte for 8-bit files.
fn to_i8(sample: i16) -> i8 {
    (sample >> 8) as i8
}

/// Complete 44-byte header for a file holding `sample_count` samples.
pub fn header(format: &WavFormat, sample_count: u64) -> Result<[u8; HEADER_LEN]> {
    let data_len = format.data_len(sample_count)?;
    let mut out = [0u8; HEADER_LEN];
    let mut cursor = &mut out[..];
    cursor.write_all(b"RIFF")?;
    cursor.write_all(&(data_len + RIFF_OVERHEAD as u32).to_le_bytes())?;
    cursor.write_all(b"WAVE")?;

    cursor.write_all(b"fmt ")?;
    cursor.write_all(&16u32.to_le_bytes())?;
    cursor.write_all(&1u16.to_le_bytes())?; // PCM
    cursor.write_all(&WavFormat::CHANNELS.to_le_bytes())?;
    cursor.write_all(&format.sample_rate.to_le_bytes())?;
    cursor.write_all(&format.byte_rate().to_le_bytes())?;
    cursor.write_all(&format.block_align().to_le_bytes())?;
    cursor.write_all(&format.width.bits().to_le_bytes())?;

    cursor.write_all(b"data")?;
    cursor.write_all(&data_len.to_le_bytes())?;
    Ok(out)
}

/// Writer for seekable outputs: the header goes out with placeholder
/// lengths, which are patched once every sample has been written.
pub struct SeekableWavWriter<W: Write + Seek> {
    inner: WavWriter<W>,
    width: SampleWidth,
}

impl<W: Write + Seek> SeekableWavWriter<W> {
    pub fn new(writer: W, format: WavFormat) -> Result<Self> {
        Ok(Self {
            inner: WavWriter::new(writer, format.spec())?,
            width: format.width,
        })
    }

    pub fn finish(self) -> Result<()> {
        log::debug!("Patching WAV header after {} samples", self.inner.len());
        self.inner.finalize()?;
        Ok(())
    }
}

impl<W: Write + Seek> SampleSink for SeekableWavWriter<W> {
    fn write_samples(&mut self, samples: &[i16]) -> Result<()> {
        match self.width {
            SampleWidth::U8 => {
                for &s in samples {
                    self.inner.write_sample(to_i8(s))?;
                }
            }
            SampleWidth::I16 => {
                for &s in samples {
                    self.inner.write_sample(s)?;
                }
            }
        }
        Ok(())
    }
}

/// Writer for non-seekable outputs such as stdout. The sample count must be
/// known up front so the header can be complete before the first sample.
pub struct StreamingWavWriter<W: Write> {
    inner: W,
    width: SampleWidth,
    expected: u64,
    written: u64,
    scratch: Vec<u8>,
}

impl<W: Write> StreamingWavWriter<W> {
    pub fn new(mut writer: W, format: WavFormat, sample_count: u64) -> Result<Self> {
        writer.write_all(&header(&format, sample_count)?)?;
        Ok(Self {
            inner: writer,
            width: format.width,
            expected: sample_count,
            written: 0,
            scratch: Vec::new(),
        })
    }

    pub fn finish(mut self) -> Result<W> {
        if self.written != self.expected {
            return Err(Error::SampleCount {
                expected: self.expected,
                actual: self.written,
            });
        }
        self.inner.flush()?;
        Ok(self.inner)
    }
}

impl<W: Write> SampleSink for StreamingWavWriter<W> {
    fn write_samples(&mut self, samples: &[i16]) -> Result<()> {
        self.scratch.clear();
        match self.width {
            SampleWidth::U8 => self
                .scratch
                .extend(samples.iter().map(|&s| (to_i8(s) as u8).wrapping_add(128))),
            SampleWidth::I16 => {
                for &s in samples {
                    self.scratch.extend_from_slice(&s.to_le_bytes());
                }
            }
        }
        self.inner.write_all(&self.scratch)?;
        self.written += samples.len() as u64;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::synth::{TONE_HIGH, TONE_LOW};
    use std::io::Cursor;

    fn u32_at(bytes: &[u8], at: usize) -> u32 {
        u32::from_le_bytes(bytes[at..at + 4].try_into().unwrap())
    }

    #[test]
    fn header_layout() {
        let h = header(&WavFormat::new(11025, SampleWidth::U8), 1000).unwrap();
        assert_eq!(&h[0..4], b"RIFF");
        assert_eq!(u32_at(&h, 4), 1036);
        assert_eq!(&h[8..16], b"WAVEfmt ");
        assert_eq!(u32_at(&h, 16), 16);
        assert_eq!(&h[20..24], &[1, 0, 1, 0]);
        assert_eq!(u32_at(&h, 24), 11025);
        assert_eq!(u32_at(&h, 28), 11025);
        assert_eq!(&h[32..36], &[1, 0, 8, 0]);
        assert_eq!(&h[36..40], b"data");
        assert_eq!(u32_at(&h, 40), 1000);
    }

    #[test]
    fn sixteen_bit_header_fields() {
        let h = header(&WavFormat::new(44100, SampleWidth::I16), 10).unwrap();
        assert_eq!(u32_at(&h, 28), 88200);
        assert_eq!(&h[32..36], &[2, 0, 16, 0]);
        assert_eq!(u32_at(&h, 40), 20);
        assert_eq!(u32_at(&h, 4), 56);
    }

    #[test]
    fn oversized_data_is_rejected() {
        let format = WavFormat::new(44100, SampleWidth::I16);
        assert!(matches!(
            header(&format, u32::MAX as u64),
            Err(Error::TooLong { .. })
        ));
    }

    #[test]
    fn eight_bit_samples_are_offset() {
        let format = WavFormat::new(8000, SampleWidth::U8);
        let mut w = StreamingWavWriter::new(Vec::new(), format, 3).unwrap();
        w.write_samples(&[TONE_LOW, 0, TONE_HIGH]).unwrap();
        let bytes = w.finish().unwrap();
        assert_eq!(&bytes[HEADER_LEN..], &[65, 128, 192]);
    }

    #[test]
    fn streaming_writer_checks_sample_count() {
        let format = WavFormat::new(8000, SampleWidth::I16);
        let mut w = StreamingWavWriter::new(Vec::new(), format, 4).unwrap();
        w.write_samples(&[1, 2, 3]).unwrap();
        assert!(matches!(
            w.finish(),
            Err(Error::SampleCount {
                expected: 4,
                actual: 3
            })
        ));
    }

    #[test]
    fn seekable_and_streaming_writers_agree() {
        for width in [SampleWidth::U8, SampleWidth::I16] {
            let format = WavFormat::new(11025, width);
            let samples = [TONE_LOW, TONE_LOW, TONE_HIGH, TONE_HIGH, 0, 0];

            let mut cursor = Cursor::new(Vec::new());
            let mut seekable = SeekableWavWriter::new(&mut cursor, format).unwrap();
            seekable.write_samples(&samples).unwrap();
            seekable.finish().unwrap();

            let mut streaming = StreamingWavWriter::new(Vec::new(), format, 6).unwrap();
            streaming.write_samples(&samples).unwrap();

            assert_eq!(cursor.into_inner(), streaming.finish().unwrap());
        }
    }
}
