//! Text decoding with encoding detection fallback.

use chardetng::EncodingDetector;
use encoding_rs::Encoding;
use tracing::debug;

use crate::error::DecodeError;

/// How diff payloads are turned into text.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, clap::ValueEnum)]
pub enum EncodingStrategy {
    /// UTF-8 only.
    Fixed,
    /// UTF-8, then a heuristic guess when UTF-8 fails.
    #[default]
    Detect,
}

/// Decode `bytes` as text.
///
/// UTF-8 is always tried first. With [`EncodingStrategy::Detect`] a failed
/// UTF-8 decode falls back to a byte-order mark or a confident `chardetng`
/// guess. Decoding never substitutes replacement characters: malformed input
/// is an error.
pub fn decode_text(bytes: &[u8], strategy: EncodingStrategy) -> Result<String, DecodeError> {
    match std::str::from_utf8(bytes) {
        Ok(text) => return Ok(text.to_string()),
        Err(_) if strategy == EncodingStrategy::Fixed => return Err(DecodeError::InvalidUtf8),
        Err(_) => {}
    }

    let (encoding, body) = detect_encoding(bytes).ok_or(DecodeError::UnknownEncoding)?;
    debug!("Decoding payload as {}", encoding.name());

    encoding
        .decode_without_bom_handling_and_without_replacement(body)
        .map(|text| text.into_owned())
        .ok_or(DecodeError::Malformed(encoding.name()))
}

/// Guess the encoding of `bytes`, returning it with the bytes to decode.
fn detect_encoding(bytes: &[u8]) -> Option<(&'static Encoding, &[u8])> {
    if let Some((encoding, bom_len)) = Encoding::for_bom(bytes) {
        return Some((encoding, &bytes[bom_len..]));
    }

    let mut detector = EncodingDetector::new();
    detector.feed(bytes, true);
    let (encoding, confident) = detector.guess_assess(None, true);

    confident.then_some((encoding, bytes))
}
