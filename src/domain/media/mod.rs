//! Media helpers for inline image and audio payloads.

mod data_uri;
mod wav;

pub use data_uri::{DataUri, DataUriError};
pub use wav::{encode_wav, WavError, WavFormat};
