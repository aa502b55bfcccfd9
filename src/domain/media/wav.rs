//! Minimal WAV container writer for raw PCM speech output.

use thiserror::Error;

const HEADER_LEN: u32 = 44;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum WavError {
    #[error("PCM payload of {0} bytes does not fit in a WAV container")]
    TooLarge(usize),

    #[error("invalid WAV format: {0}")]
    InvalidFormat(&'static str),
}

/// Sample layout of an uncompressed PCM stream.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WavFormat {
    pub channels: u16,
    pub sample_rate: u32,
    pub bits_per_sample: u16,
}

impl WavFormat {
    /// Layout of the speech model output: mono, 24 kHz, 16-bit.
    pub fn speech() -> Self {
        Self {
            channels: 1,
            sample_rate: 24_000,
            bits_per_sample: 16,
        }
    }

    fn block_align(&self) -> Option<u16> {
        self.channels.checked_mul(self.bits_per_sample / 8)
    }

    fn byte_rate(&self) -> Option<u32> {
        self.sample_rate.checked_mul(u32::from(self.block_align()?))
    }
}

impl Default for WavFormat {
    fn default() -> Self {
        Self::speech()
    }
}

/// Wraps little-endian PCM samples in a RIFF/WAVE container.
pub fn encode_wav(pcm: &[u8], format: WavFormat) -> Result<Vec<u8>, WavError> {
    if format.channels == 0 || format.sample_rate == 0 {
        return Err(WavError::InvalidFormat("channels and sample rate must be non-zero"));
    }
    if format.bits_per_sample == 0 || format.bits_per_sample % 8 != 0 {
        return Err(WavError::InvalidFormat("bits per sample must be a multiple of 8"));
    }

    let block_align = format
        .block_align()
        .ok_or(WavError::InvalidFormat("block align overflows u16"))?;
    let byte_rate = format
        .byte_rate()
        .ok_or(WavError::InvalidFormat("byte rate overflows u32"))?;

    let data_len = u32::try_from(pcm.len())
        .ok()
        .filter(|len| len.checked_add(HEADER_LEN).is_some())
        .ok_or(WavError::TooLarge(pcm.len()))?;

    let mut out = Vec::with_capacity(HEADER_LEN as usize + pcm.len());
    out.extend_from_slice(b"RIFF");
    out.extend_from_slice(&(data_len + HEADER_LEN - 8).to_le_bytes());
    out.extend_from_slice(b"WAVE");

    out.extend_from_slice(b"fmt ");
    out.extend_from_slice(&16u32.to_le_bytes());
    out.extend_from_slice(&1u16.to_le_bytes()); // PCM
    out.extend_from_slice(&format.channels.to_le_bytes());
    out.extend_from_slice(&format.sample_rate.to_le_bytes());
    out.extend_from_slice(&byte_rate.to_le_bytes());
    out.extend_from_slice(&block_align.to_le_bytes());
    out.extend_from_slice(&format.bits_per_sample.to_le_bytes());

    out.extend_from_slice(b"data");
    out.extend_from_slice(&data_len.to_le_bytes());
    out.extend_from_slice(pcm);

    Ok(out)
}
