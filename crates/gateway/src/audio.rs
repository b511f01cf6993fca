//! Audio container encoding for synthesized speech.
//!
//! The speech service returns headerless PCM; browsers need a container.
//! [`WavStreamWriter`] accepts the PCM in arrival order and produces a
//! complete WAV file on [`WavStreamWriter::finalize`].

use std::io::Cursor;

use base64::Engine;
use hound::{SampleFormat, WavSpec, WavWriter};

use agri_assist_core::{Error, Result};

/// Mono.
pub const CHANNELS: u16 = 1;
/// Output rate of the speech service.
pub const SAMPLE_RATE: u32 = 24_000;
pub const BITS_PER_SAMPLE: u16 = 16;

/// Size of a canonical PCM WAV header.
pub const WAV_HEADER_LEN: usize = 44;

/// Prefix of a playable WAV data URI.
pub const WAV_DATA_URI_PREFIX: &str = "data:audio/wav;base64,";

/// Supported audio formats.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AudioFormat {
    Mp3,
    Mp4,
    Wav,
    Webm,
    Ogg,
}

impl AudioFormat {
    /// Get the MIME type for this format.
    pub fn mime_type(&self) -> &'static str {
        match self {
            AudioFormat::Mp3 => "audio/mpeg",
            AudioFormat::Mp4 => "audio/mp4",
            AudioFormat::Wav => "audio/wav",
            AudioFormat::Webm => "audio/webm",
            AudioFormat::Ogg => "audio/ogg",
        }
    }

    /// Map a declared MIME type to a container. PCM types yield `None`.
    pub fn from_mime_type(mime_type: &str) -> Option<Self> {
        let essence = mime_type
            .split(';')
            .next()
            .unwrap_or(mime_type)
            .trim()
            .to_ascii_lowercase();

        match essence.as_str() {
            "audio/mpeg" | "audio/mp3" => Some(AudioFormat::Mp3),
            "audio/mp4" | "audio/m4a" => Some(AudioFormat::Mp4),
            "audio/wav" | "audio/wave" | "audio/x-wav" => Some(AudioFormat::Wav),
            "audio/webm" => Some(AudioFormat::Webm),
            "audio/ogg" => Some(AudioFormat::Ogg),
            _ => None,
        }
    }

    /// Detect a container from its magic bytes. Raw PCM yields `None`.
    ///
    /// Only signatures of four bytes or more count. Two-byte MP3 frame syncs
    /// are also valid 16-bit samples, so MP3 is recognized by MIME type only.
    pub fn detect(data: &[u8]) -> Option<Self> {
        if data.len() < 4 {
            return None;
        }

        if data.starts_with(b"RIFF") && data.len() >= 12 && &data[8..12] == b"WAVE" {
            return Some(AudioFormat::Wav);
        }
        if data.starts_with(b"OggS") {
            return Some(AudioFormat::Ogg);
        }
        if data.starts_with(&[0x1A, 0x45, 0xDF, 0xA3]) {
            return Some(AudioFormat::Webm);
        }
        if data.len() >= 8 && &data[4..8] == b"ftyp" {
            return Some(AudioFormat::Mp4);
        }

        None
    }
}

fn wav_spec() -> WavSpec {
    WavSpec {
        channels: CHANNELS,
        sample_rate: SAMPLE_RATE,
        bits_per_sample: BITS_PER_SAMPLE,
        sample_format: SampleFormat::Int,
    }
}

/// Incremental PCM to WAV writer.
///
/// Chunks are appended in the order written. A sample split across two
/// chunks is carried over; a byte still pending at finalize is an error.
#[derive(Debug, Default)]
pub struct WavStreamWriter {
    samples: Vec<i16>,
    carry: Option<u8>,
}

impl WavStreamWriter {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a chunk of signed 16-bit little-endian PCM.
    pub fn write_chunk(&mut self, chunk: &[u8]) {
        let mut bytes = chunk;

        if let Some(low) = self.carry.take() {
            match bytes.split_first() {
                Some((&high, rest)) => {
                    self.samples.push(i16::from_le_bytes([low, high]));
                    bytes = rest;
                }
                None => {
                    self.carry = Some(low);
                    return;
                }
            }
        }

        let mut pairs = bytes.chunks_exact(2);
        self.samples
            .extend(pairs.by_ref().map(|pair| i16::from_le_bytes([pair[0], pair[1]])));
        self.carry = pairs.remainder().first().copied();
    }

    /// Samples written so far.
    pub fn sample_count(&self) -> usize {
        self.samples.len()
    }

    /// Produce the complete container.
    pub fn finalize(self) -> Result<Vec<u8>> {
        if self.carry.is_some() {
            return Err(Error::encoding(format!(
                "PCM stream ended mid-sample after {} samples",
                self.samples.len()
            )));
        }

        let mut cursor = Cursor::new(Vec::with_capacity(
            WAV_HEADER_LEN + self.samples.len() * 2,
        ));
        let mut writer = WavWriter::new(&mut cursor, wav_spec())
            .map_err(|e| Error::encoding(format!("Failed to create WAV writer: {}", e)))?;

        for sample in &self.samples {
            writer
                .write_sample(*sample)
                .map_err(|e| Error::encoding(format!("Failed to write sample: {}", e)))?;
        }

        writer
            .finalize()
            .map_err(|e| Error::encoding(format!("Failed to finalize WAV: {}", e)))?;

        Ok(cursor.into_inner())
    }
}

/// Encode a complete PCM buffer as WAV.
pub fn encode_wav(pcm: &[u8]) -> Result<Vec<u8>> {
    encode_wav_chunks([pcm])
}

/// Encode PCM delivered in several chunks, in order.
pub fn encode_wav_chunks<I, C>(chunks: I) -> Result<Vec<u8>>
where
    I: IntoIterator<Item = C>,
    C: AsRef<[u8]>,
{
    let mut writer = WavStreamWriter::new();
    for chunk in chunks {
        writer.write_chunk(chunk.as_ref());
    }
    writer.finalize()
}

/// Base64 of the WAV container for `pcm`.
pub fn encode_wav_base64(pcm: &[u8]) -> Result<String> {
    let wav = encode_wav(pcm)?;
    Ok(base64::engine::general_purpose::STANDARD.encode(wav))
}

/// `data:audio/wav;base64,...` for an already encoded container.
pub fn wav_data_uri(wav: &[u8]) -> String {
    format!(
        "{}{}",
        WAV_DATA_URI_PREFIX,
        base64::engine::general_purpose::STANDARD.encode(wav)
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    fn pcm(samples: &[i16]) -> Vec<u8> {
        samples.iter().flat_map(|s| s.to_le_bytes()).collect()
    }

    fn read_back(wav: &[u8]) -> (WavSpec, Vec<i16>) {
        let mut reader = hound::WavReader::new(Cursor::new(wav.to_vec())).unwrap();
        let spec = reader.spec();
        let samples = reader.samples::<i16>().map(|s| s.unwrap()).collect();
        (spec, samples)
    }

    #[test]
    fn test_empty_input_is_header_only() {
        let wav = encode_wav(&[]).unwrap();
        assert_eq!(wav.len(), WAV_HEADER_LEN);
        assert_eq!(&wav[0..4], b"RIFF");
        assert_eq!(&wav[8..12], b"WAVE");
        assert_eq!(&wav[40..44], &0u32.to_le_bytes());

        let (spec, samples) = read_back(&wav);
        assert_eq!(spec, wav_spec());
        assert!(samples.is_empty());
    }

    #[test]
    fn test_header_fields() {
        let wav = encode_wav(&pcm(&[1, -1, 300])).unwrap();
        assert_eq!(wav.len(), WAV_HEADER_LEN + 6);
        // RIFF chunk size = file length - 8.
        assert_eq!(&wav[4..8], &((wav.len() - 8) as u32).to_le_bytes());
        assert_eq!(&wav[22..24], &CHANNELS.to_le_bytes());
        assert_eq!(&wav[24..28], &SAMPLE_RATE.to_le_bytes());
        // Byte rate = rate * channels * 2.
        assert_eq!(&wav[28..32], &48_000u32.to_le_bytes());
        assert_eq!(&wav[34..36], &BITS_PER_SAMPLE.to_le_bytes());
        assert_eq!(&wav[40..44], &6u32.to_le_bytes());
    }

    #[test]
    fn test_samples_preserved() {
        let input = [0i16, 1, -1, i16::MAX, i16::MIN, 1234];
        let (_, samples) = read_back(&encode_wav(&pcm(&input)).unwrap());
        assert_eq!(samples, input);
    }

    #[test]
    fn test_deterministic() {
        let input = pcm(&[5, 6, 7, 8]);
        assert_eq!(encode_wav(&input).unwrap(), encode_wav(&input).unwrap());
        assert_eq!(
            encode_wav_base64(&input).unwrap(),
            encode_wav_base64(&input).unwrap()
        );
    }

    #[test]
    fn test_chunks_follow_arrival_order() {
        let a = pcm(&[1, 2]);
        let b = pcm(&[3]);
        let c = pcm(&[4, 5, 6]);
        let joined = [a.clone(), b.clone(), c.clone()].concat();

        let streamed = encode_wav_chunks([&a, &b, &c]).unwrap();
        assert_eq!(streamed, encode_wav(&joined).unwrap());

        let permuted = encode_wav_chunks([&c, &a, &b]).unwrap();
        assert_ne!(streamed, permuted);
    }

    #[test]
    fn test_sample_split_across_chunks() {
        let whole = pcm(&[0x1234, -2, 77]);
        let parts: Vec<&[u8]> = vec![&whole[..1], &[], &whole[1..3], &whole[3..]];

        let mut writer = WavStreamWriter::new();
        for part in parts {
            writer.write_chunk(part);
        }
        assert_eq!(writer.sample_count(), 3);
        assert_eq!(writer.finalize().unwrap(), encode_wav(&whole).unwrap());
    }

    #[test]
    fn test_dangling_byte_is_error() {
        let err = encode_wav(&[1, 2, 3]).unwrap_err();
        assert!(matches!(err, Error::Encoding(_)));
    }

    #[test]
    fn test_data_uri() {
        let wav = encode_wav(&[]).unwrap();
        let uri = wav_data_uri(&wav);
        assert!(uri.starts_with(WAV_DATA_URI_PREFIX));
        assert_eq!(&uri[WAV_DATA_URI_PREFIX.len()..], encode_wav_base64(&[]).unwrap());
    }

    #[test]
    fn test_audio_format_detection() {
        let wav = encode_wav(&pcm(&[1])).unwrap();
        assert_eq!(AudioFormat::detect(&wav), Some(AudioFormat::Wav));
        assert_eq!(AudioFormat::detect(b"OggS\x00\x02"), Some(AudioFormat::Ogg));
        assert_eq!(AudioFormat::detect(&pcm(&[-1025, 0])), None);
        assert_eq!(AudioFormat::detect(&pcm(&[-1281, 0])), None);
        assert_eq!(AudioFormat::detect(b"\x00\x00\x00\x18ftypmp42"), Some(AudioFormat::Mp4));
        assert_eq!(AudioFormat::detect(&pcm(&[0, 0, 0, 0])), None);
        assert_eq!(AudioFormat::Wav.mime_type(), "audio/wav");
    }

    #[test]
    fn test_audio_format_from_mime_type() {
        assert_eq!(AudioFormat::from_mime_type("audio/mpeg"), Some(AudioFormat::Mp3));
        assert_eq!(AudioFormat::from_mime_type("Audio/WAV; rate=24000"), Some(AudioFormat::Wav));
        assert_eq!(AudioFormat::from_mime_type("audio/L16;codec=pcm;rate=24000"), None);
        assert_eq!(AudioFormat::from_mime_type("audio/pcm"), None);
    }
}
