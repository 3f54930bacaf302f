//! PCM16 WAV encoder
//!
//! Writes the canonical 44-byte RIFF/WAVE header followed by little-endian
//! signed 16-bit samples in the input's interleaved order.

use std::fs;
use std::io::{BufWriter, Cursor, Seek, SeekFrom, Write};
use std::path::Path;
use serde::{Deserialize, Serialize};
use crate::audio::buffer::{validate_format, SampleBuffer};
use crate::error::{AudioTrimError, Result};

/// Header length of a canonical PCM WAV file.
pub const HEADER_SIZE: usize = 44;

const RESCALE_FACTOR: f32 = 32767.0;
const BYTES_PER_SAMPLE: u16 = 2;

/// How samples outside `[-1.0, 1.0]` are handled when quantizing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum QuantizePolicy {
    /// Clip to the valid range; NaN becomes silence.
    #[default]
    Clamp,
    /// Reject non-finite or out-of-range samples with `EncodingOverflow`.
    Strict,
}

impl QuantizePolicy {
    pub fn name(&self) -> &'static str {
        match self {
            QuantizePolicy::Clamp => "clamp",
            QuantizePolicy::Strict => "strict",
        }
    }
}

/// Scale by 32767 and truncate toward zero after clamping.
///
/// `-1.0` maps to `-32767`, not `-32768`.
pub fn quantize(sample: f32) -> i16 {
    (sample.clamp(-1.0, 1.0) * RESCALE_FACTOR) as i16
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WavHeader {
    pub channels: u16,
    pub sample_rate: u32,
    /// Payload length in bytes.
    pub data_size: u32,
}

impl WavHeader {
    pub fn new(channels: u16, sample_rate: u32, data_size: u32) -> Result<Self> {
        validate_format(channels, sample_rate)?;
        sample_rate
            .checked_mul(channels as u32 * BYTES_PER_SAMPLE as u32)
            .ok_or_else(|| AudioTrimError::invalid_parameter(format!(
                "Byte rate overflows: {} Hz x {} channels", sample_rate, channels
            )))?;
        data_size
            .checked_add(HEADER_SIZE as u32 - 8)
            .ok_or_else(|| AudioTrimError::invalid_parameter(format!(
                "Payload too large for a WAV file: {} bytes", data_size
            )))?;
        Ok(Self { channels, sample_rate, data_size })
    }

    pub fn for_buffer(buffer: &SampleBuffer) -> Result<Self> {
        let data_size = payload_size(buffer.len())?;
        Self::new(buffer.channels(), buffer.sample_rate(), data_size)
    }

    /// Total file size minus the 8-byte RIFF preamble.
    pub fn chunk_size(&self) -> u32 {
        HEADER_SIZE as u32 - 8 + self.data_size
    }

    pub fn byte_rate(&self) -> u32 {
        self.sample_rate * self.channels as u32 * BYTES_PER_SAMPLE as u32
    }

    pub fn block_align(&self) -> u16 {
        self.channels * BYTES_PER_SAMPLE
    }

    pub fn bits_per_sample(&self) -> u16 {
        BYTES_PER_SAMPLE * 8
    }

    /// Interleaved sample count in the payload.
    pub fn sample_count(&self) -> usize {
        self.data_size as usize / BYTES_PER_SAMPLE as usize
    }

    pub fn frame_count(&self) -> usize {
        self.sample_count() / self.channels as usize
    }

    pub fn duration_secs(&self) -> f64 {
        self.frame_count() as f64 / self.sample_rate as f64
    }

    pub fn to_bytes(&self) -> [u8; HEADER_SIZE] {
        let mut bytes = [0u8; HEADER_SIZE];
        bytes[0..4].copy_from_slice(b"RIFF");
        bytes[4..8].copy_from_slice(&self.chunk_size().to_le_bytes());
        bytes[8..12].copy_from_slice(b"WAVE");
        bytes[12..16].copy_from_slice(b"fmt ");
        bytes[16..20].copy_from_slice(&16u32.to_le_bytes());
        bytes[20..22].copy_from_slice(&1u16.to_le_bytes());
        bytes[22..24].copy_from_slice(&self.channels.to_le_bytes());
        bytes[24..28].copy_from_slice(&self.sample_rate.to_le_bytes());
        bytes[28..32].copy_from_slice(&self.byte_rate().to_le_bytes());
        bytes[32..34].copy_from_slice(&self.block_align().to_le_bytes());
        bytes[34..36].copy_from_slice(&self.bits_per_sample().to_le_bytes());
        bytes[36..40].copy_from_slice(b"data");
        bytes[40..44].copy_from_slice(&self.data_size.to_le_bytes());
        bytes
    }

    /// Parse a canonical 44-byte PCM16 header.
    ///
    /// Every derived field (chunk size, byte rate, block align) must agree
    /// with the declared format; anything else is rejected.
    pub fn parse(bytes: &[u8]) -> Result<Self> {
        if bytes.len() < HEADER_SIZE {
            return Err(AudioTrimError::decode(format!(
                "Header too short: {} bytes", bytes.len()
            )));
        }

        let u16_at = |at: usize| u16::from_le_bytes([bytes[at], bytes[at + 1]]);
        let u32_at = |at: usize| {
            u32::from_le_bytes([bytes[at], bytes[at + 1], bytes[at + 2], bytes[at + 3]])
        };

        if &bytes[0..4] != b"RIFF" || &bytes[8..12] != b"WAVE" {
            return Err(AudioTrimError::decode("Not a RIFF/WAVE file"));
        }
        if &bytes[12..16] != b"fmt " || u32_at(16) != 16 {
            return Err(AudioTrimError::decode("Missing canonical fmt chunk"));
        }
        if u16_at(20) != 1 {
            return Err(AudioTrimError::decode(format!("Unsupported audio format: {}", u16_at(20))));
        }
        if u16_at(34) != 16 {
            return Err(AudioTrimError::decode(format!("Unsupported bit depth: {}", u16_at(34))));
        }
        if &bytes[36..40] != b"data" {
            return Err(AudioTrimError::decode("Missing data chunk"));
        }

        let header = Self::new(u16_at(22), u32_at(24), u32_at(40))
            .map_err(|e| AudioTrimError::decode(e.to_string()))?;

        if u32_at(4) != header.chunk_size()
            || u32_at(28) != header.byte_rate()
            || u16_at(32) != header.block_align()
        {
            return Err(AudioTrimError::decode("Header sizes disagree with format"));
        }

        Ok(header)
    }
}

fn payload_size(sample_count: usize) -> Result<u32> {
    sample_count
        .checked_mul(BYTES_PER_SAMPLE as usize)
        .and_then(|n| u32::try_from(n).ok())
        .ok_or_else(|| AudioTrimError::invalid_parameter(format!(
            "Too many samples for a WAV file: {}", sample_count
        )))
}

#[derive(Debug, Clone, Default)]
pub struct Pcm16Encoder {
    policy: QuantizePolicy,
}

impl Pcm16Encoder {
    pub fn new(policy: QuantizePolicy) -> Self {
        Self { policy }
    }

    pub fn policy(&self) -> QuantizePolicy {
        self.policy
    }

    /// Quantize the whole buffer according to the policy.
    pub fn quantize_all(&self, buffer: &SampleBuffer) -> Result<Vec<i16>> {
        let samples = buffer.samples();
        match self.policy {
            QuantizePolicy::Strict => {
                if let Some((index, &value)) = samples.iter()
                    .enumerate()
                    .find(|(_, s)| !s.is_finite() || s.abs() > 1.0)
                {
                    return Err(AudioTrimError::EncodingOverflow { index, value });
                }
            }
            QuantizePolicy::Clamp => {
                let clipped = samples.iter().filter(|s| !(s.abs() <= 1.0)).count();
                if clipped > 0 {
                    log::warn!("Clipped {} of {} samples outside [-1.0, 1.0]", clipped, samples.len());
                }
            }
        }
        Ok(samples.iter().map(|&s| quantize(s)).collect())
    }

    /// Encode into `sink` starting at its current position.
    ///
    /// A zero header is written first, then the payload; the real header
    /// is written once the payload length is known. The sink is left
    /// positioned at the end of the file.
    pub fn encode<W: Write + Seek>(&self, buffer: &SampleBuffer, sink: &mut W) -> Result<WavHeader> {
        let expected = WavHeader::for_buffer(buffer)?;
        let pcm = self.quantize_all(buffer)?;

        let start = sink.stream_position()?;
        sink.write_all(&[0u8; HEADER_SIZE])?;

        let mut payload = Vec::with_capacity(pcm.len() * BYTES_PER_SAMPLE as usize);
        for s in &pcm {
            payload.extend_from_slice(&s.to_le_bytes());
        }
        sink.write_all(&payload)?;

        let end = sink.stream_position()?;
        let written = end - start - HEADER_SIZE as u64;
        let data_size = u32::try_from(written)
            .map_err(|_| AudioTrimError::invalid_parameter("Payload exceeds 4 GiB"))?;
        let header = WavHeader::new(buffer.channels(), buffer.sample_rate(), data_size)?;
        debug_assert_eq!(header, expected);

        sink.seek(SeekFrom::Start(start))?;
        sink.write_all(&header.to_bytes())?;
        sink.seek(SeekFrom::Start(end))?;
        sink.flush()?;

        log::debug!(
            "Encoded {} samples: {} Hz, {} ch, {} data bytes",
            pcm.len(), header.sample_rate, header.channels, header.data_size
        );

        Ok(header)
    }

    pub fn encode_to_vec(&self, buffer: &SampleBuffer) -> Result<Vec<u8>> {
        let mut cursor = Cursor::new(Vec::with_capacity(HEADER_SIZE + buffer.len() * 2));
        self.encode(buffer, &mut cursor)?;
        Ok(cursor.into_inner())
    }

    /// Encode to `path`, replacing it only once the file is complete.
    ///
    /// Data goes to a temporary file next to `path` which is renamed over
    /// the destination on success and removed on any failure.
    pub fn write_file<P: AsRef<Path>>(&self, buffer: &SampleBuffer, path: P) -> Result<WavHeader> {
        self.write_via_temp(buffer, path.as_ref(), true)
    }

    /// Like [`write_file`](Self::write_file) but fails with an `Io` error of
    /// kind `AlreadyExists` instead of replacing an existing `path`.
    pub fn write_new_file<P: AsRef<Path>>(&self, buffer: &SampleBuffer, path: P) -> Result<WavHeader> {
        self.write_via_temp(buffer, path.as_ref(), false)
    }

    fn write_via_temp(&self, buffer: &SampleBuffer, path: &Path, replace: bool) -> Result<WavHeader> {
        let dir = match path.parent() {
            Some(parent) if !parent.as_os_str().is_empty() => parent,
            _ => Path::new("."),
        };
        fs::create_dir_all(dir)?;

        let temp = tempfile::Builder::new()
            .prefix(".audiotrim-")
            .suffix(".wav.part")
            .tempfile_in(dir)?;

        let mut writer = BufWriter::new(temp);
        let header = self.encode(buffer, &mut writer)?;
        let temp = writer.into_inner().map_err(|e| e.into_error())?;
        temp.as_file().sync_all()?;

        let persisted = if replace {
            temp.persist(path)
        } else {
            temp.persist_noclobber(path)
        };
        persisted.map_err(|e| AudioTrimError::Io(e.error))?;

        log::info!("Wrote {} ({:.3}s)", path.display(), header.duration_secs());
        Ok(header)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_quantize_boundaries() {
        assert_eq!(quantize(1.0), 32767);
        assert_eq!(quantize(-1.0), -32767);
        assert_eq!(quantize(0.0), 0);
        assert_eq!(quantize(0.5), 16383);
        assert_eq!(quantize(-0.5), -16383);
    }

    #[test]
    fn test_quantize_clamps_out_of_range() {
        assert_eq!(quantize(1.5), 32767);
        assert_eq!(quantize(-3.0), -32767);
        assert_eq!(quantize(f32::INFINITY), 32767);
        assert_eq!(quantize(f32::NAN), 0);
    }

    #[test]
    fn test_known_header_bytes() {
        let buffer = SampleBuffer::mono(vec![0.5, -0.5], 44100).unwrap();
        let bytes = Pcm16Encoder::default().encode_to_vec(&buffer).unwrap();

        let mut expected = Vec::new();
        expected.extend_from_slice(b"RIFF");
        expected.extend_from_slice(&40u32.to_le_bytes());
        expected.extend_from_slice(b"WAVE");
        expected.extend_from_slice(b"fmt ");
        expected.extend_from_slice(&16u32.to_le_bytes());
        expected.extend_from_slice(&1u16.to_le_bytes());
        expected.extend_from_slice(&1u16.to_le_bytes());
        expected.extend_from_slice(&44100u32.to_le_bytes());
        expected.extend_from_slice(&88200u32.to_le_bytes());
        expected.extend_from_slice(&2u16.to_le_bytes());
        expected.extend_from_slice(&16u16.to_le_bytes());
        expected.extend_from_slice(b"data");
        expected.extend_from_slice(&4u32.to_le_bytes());
        expected.extend_from_slice(&[0xFF, 0x3F, 0x01, 0xC0]);

        assert_eq!(bytes, expected);
    }

    #[test]
    fn test_empty_buffer_is_header_only() {
        let buffer = SampleBuffer::empty(2, 48000).unwrap();
        let bytes = Pcm16Encoder::default().encode_to_vec(&buffer).unwrap();
        assert_eq!(bytes.len(), HEADER_SIZE);

        let header = WavHeader::parse(&bytes).unwrap();
        assert_eq!(header.data_size, 0);
        assert_eq!(header.chunk_size(), 36);
        assert_eq!(header.channels, 2);
    }

    #[test]
    fn test_header_parse_roundtrip() {
        let buffer = SampleBuffer::from_vec(vec![0.1; 12], 3, 22050).unwrap();
        let bytes = Pcm16Encoder::default().encode_to_vec(&buffer).unwrap();
        let header = WavHeader::parse(&bytes).unwrap();

        assert_eq!(header.sample_count(), 12);
        assert_eq!(header.frame_count(), 4);
        assert_eq!(header.sample_rate, 22050);
        assert_eq!(header.channels, 3);
        assert_eq!(header.byte_rate(), 22050 * 3 * 2);
        assert_eq!(header.block_align(), 6);
        assert_eq!(bytes.len() - HEADER_SIZE, 24);
    }

    #[test]
    fn test_parse_rejects_inconsistent_sizes() {
        let buffer = SampleBuffer::mono(vec![0.1, 0.2], 8000).unwrap();
        let mut bytes = Pcm16Encoder::default().encode_to_vec(&buffer).unwrap();
        bytes[4] = bytes[4].wrapping_add(1);
        assert!(matches!(WavHeader::parse(&bytes), Err(AudioTrimError::Decode(_))));

        assert!(WavHeader::parse(&bytes[..20]).is_err());
    }

    #[test]
    fn test_interleaved_order_preserved() {
        let buffer = SampleBuffer::from_vec(vec![1.0, -1.0, 0.0, 0.5], 2, 8000).unwrap();
        let bytes = Pcm16Encoder::default().encode_to_vec(&buffer).unwrap();
        let pcm: Vec<i16> = bytes[HEADER_SIZE..]
            .chunks_exact(2)
            .map(|b| i16::from_le_bytes([b[0], b[1]]))
            .collect();
        assert_eq!(pcm, vec![32767, -32767, 0, 16383]);
    }

    #[test]
    fn test_strict_policy_reports_overflow() {
        let buffer = SampleBuffer::mono(vec![0.2, 1.25, -0.3], 8000).unwrap();
        let encoder = Pcm16Encoder::new(QuantizePolicy::Strict);
        match encoder.encode_to_vec(&buffer) {
            Err(AudioTrimError::EncodingOverflow { index, value }) => {
                assert_eq!(index, 1);
                assert_eq!(value, 1.25);
            }
            other => panic!("Expected overflow, got {:?}", other),
        }

        let nan = SampleBuffer::mono(vec![f32::NAN], 8000).unwrap();
        assert!(encoder.encode_to_vec(&nan).is_err());

        let edge = SampleBuffer::mono(vec![1.0, -1.0], 8000).unwrap();
        assert!(encoder.encode_to_vec(&edge).is_ok());
    }

    #[test]
    fn test_encode_at_nonzero_offset() {
        let buffer = SampleBuffer::mono(vec![0.25, 0.5], 16000).unwrap();
        let mut cursor = Cursor::new(Vec::new());
        cursor.write_all(b"prefix").unwrap();

        let header = Pcm16Encoder::default().encode(&buffer, &mut cursor).unwrap();
        let bytes = cursor.into_inner();

        assert_eq!(&bytes[..6], b"prefix");
        assert_eq!(WavHeader::parse(&bytes[6..]).unwrap(), header);
        assert_eq!(bytes.len(), 6 + HEADER_SIZE + 4);
    }

    #[test]
    fn test_header_rejects_invalid_format() {
        assert!(matches!(WavHeader::new(0, 44100, 0), Err(AudioTrimError::InvalidParameter(_))));
        assert!(matches!(WavHeader::new(1, 0, 0), Err(AudioTrimError::InvalidParameter(_))));
        assert!(WavHeader::new(u16::MAX, u32::MAX, 0).is_err());
        assert!(WavHeader::new(1, 8000, u32::MAX).is_err());
    }

    #[test]
    fn test_write_file_leaves_no_temp_files() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("out.wav");
        let buffer = SampleBuffer::mono(vec![0.1, 0.2, 0.3], 8000).unwrap();

        let header = Pcm16Encoder::default().write_file(&buffer, &path).unwrap();
        assert_eq!(header.data_size, 6);
        assert_eq!(std::fs::metadata(&path).unwrap().len(), 50);

        let entries: Vec<_> = std::fs::read_dir(temp_dir.path()).unwrap().collect();
        assert_eq!(entries.len(), 1);
    }

    #[test]
    fn test_failed_write_produces_no_file() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("bad.wav");
        let buffer = SampleBuffer::mono(vec![2.0], 8000).unwrap();

        let result = Pcm16Encoder::new(QuantizePolicy::Strict).write_file(&buffer, &path);
        assert!(result.is_err());
        assert!(!path.exists());
        assert_eq!(std::fs::read_dir(temp_dir.path()).unwrap().count(), 0);
    }

    /// Accepts `limit` bytes, then fails every write.
    struct ShortSink {
        inner: Cursor<Vec<u8>>,
        limit: u64,
    }

    impl Write for ShortSink {
        fn write(&mut self, buf: &[u8]) -> std::io::Result<usize> {
            let room = self.limit.saturating_sub(self.inner.position()) as usize;
            if room == 0 {
                return Err(std::io::Error::new(std::io::ErrorKind::WriteZero, "sink full"));
            }
            let n = buf.len().min(room);
            self.inner.write(&buf[..n])
        }

        fn flush(&mut self) -> std::io::Result<()> {
            Ok(())
        }
    }

    impl Seek for ShortSink {
        fn seek(&mut self, pos: SeekFrom) -> std::io::Result<u64> {
            self.inner.seek(pos)
        }
    }

    fn part_files(dir: &Path) -> usize {
        std::fs::read_dir(dir).unwrap()
            .filter_map(|e| e.ok())
            .filter(|e| e.file_name().to_string_lossy().ends_with(".wav.part"))
            .count()
    }

    #[test]
    fn test_sink_write_error_is_io() {
        let buffer = SampleBuffer::mono(vec![0.1; 64], 8000).unwrap();
        let encoder = Pcm16Encoder::default();

        // Fails inside the payload.
        let mut sink = ShortSink { inner: Cursor::new(Vec::new()), limit: 60 };
        assert!(matches!(encoder.encode(&buffer, &mut sink), Err(AudioTrimError::Io(_))));

        // Fails inside the header placeholder.
        let mut sink = ShortSink { inner: Cursor::new(Vec::new()), limit: 10 };
        assert!(matches!(encoder.encode(&buffer, &mut sink), Err(AudioTrimError::Io(_))));
    }

    #[test]
    fn test_unreplaceable_destination_cleans_up() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("taken.wav");
        std::fs::create_dir(&path).unwrap();
        let buffer = SampleBuffer::mono(vec![0.1, 0.2], 8000).unwrap();

        let result = Pcm16Encoder::default().write_file(&buffer, &path);
        assert!(matches!(result, Err(AudioTrimError::Io(_))));
        assert!(path.is_dir());
        assert_eq!(part_files(temp_dir.path()), 0);
    }

    #[test]
    fn test_write_new_file_does_not_clobber() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("existing.wav");
        std::fs::write(&path, b"keep").unwrap();
        let buffer = SampleBuffer::mono(vec![0.5], 8000).unwrap();

        match Pcm16Encoder::default().write_new_file(&buffer, &path) {
            Err(AudioTrimError::Io(e)) => assert_eq!(e.kind(), std::io::ErrorKind::AlreadyExists),
            other => panic!("Expected AlreadyExists, got {:?}", other),
        }
        assert_eq!(std::fs::read(&path).unwrap(), b"keep");
        assert_eq!(part_files(temp_dir.path()), 0);

        let fresh = temp_dir.path().join("fresh.wav");
        Pcm16Encoder::default().write_new_file(&buffer, &fresh).unwrap();
        assert_eq!(std::fs::metadata(&fresh).unwrap().len(), (HEADER_SIZE + 2) as u64);
    }
}
