use crate::error::{DecodeError, EncodeError};
use crate::peer::types::{SdpType, SessionDescription};
use base64::{engine::general_purpose, Engine as _};
use flate2::{read::GzDecoder, write::GzEncoder, Compression};
use std::io::{Read, Write};

/// Ограничение на распакованный размер, чтобы не словить zip-bomb
pub const MAX_DECOMPRESSED_SIZE: u64 = 256 * 1024; // 256 KiB

const GZIP_MAGIC: [u8; 2] = [0x1f, 0x8b];

/// Как упаковывать JSON перед base64
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, clap::ValueEnum)]
pub enum TokenFormat {
    /// base64(JSON), как это делает браузерная обвязка
    #[default]
    Plain,
    /// base64(gzip(JSON)), короче для больших SDP с кандидатами
    Compressed,
}

pub fn encode(sd: &SessionDescription, format: TokenFormat) -> Result<String, EncodeError> {
    // 1. JSON -> bytes
    let json = serde_json::to_vec(sd)?;

    let raw = match format {
        TokenFormat::Plain => json,
        TokenFormat::Compressed => {
            // 2. GZIP compress
            let mut gz = GzEncoder::new(Vec::new(), Compression::fast());
            gz.write_all(&json)?;
            gz.finish()?
        }
    };

    // 3. base64
    Ok(general_purpose::STANDARD.encode(raw))
}

pub fn decode(token: &str) -> Result<SessionDescription, DecodeError> {
    // при копировании из терминала токен часто рвётся на строки
    let cleaned: String = token.chars().filter(|c| !c.is_ascii_whitespace()).collect();
    if cleaned.is_empty() {
        return Err(DecodeError::Empty);
    }

    // 1. base64 -> bytes
    let raw = general_purpose::STANDARD.decode(cleaned.as_bytes())?;

    // 2. gunzip, если это сжатый токен
    let json = if raw.starts_with(&GZIP_MAGIC) {
        inflate(&raw)?
    } else {
        raw
    };

    // 3. JSON -> struct
    let sd: SessionDescription = serde_json::from_slice(&json)?;
    if sd.sdp.trim().is_empty() {
        return Err(DecodeError::EmptySdp);
    }
    Ok(sd)
}

/// Декодирует токен и проверяет, что он той фазы, которую ждём
pub fn decode_expecting(token: &str, expected: SdpType) -> Result<SessionDescription, DecodeError> {
    let sd = decode(token)?;
    if sd.sdp_type != expected {
        return Err(DecodeError::UnexpectedType {
            expected,
            found: sd.sdp_type,
        });
    }
    Ok(sd)
}

fn inflate(compressed: &[u8]) -> Result<Vec<u8>, DecodeError> {
    let gz = GzDecoder::new(compressed);
    let mut json = Vec::new();
    // читаем на байт больше лимита, чтобы отличить "ровно лимит" от "больше"
    let mut limited_reader = gz.take(MAX_DECOMPRESSED_SIZE + 1);
    limited_reader
        .read_to_end(&mut json)
        .map_err(DecodeError::Inflate)?;
    if json.len() as u64 > MAX_DECOMPRESSED_SIZE {
        return Err(DecodeError::TooLarge {
            limit: MAX_DECOMPRESSED_SIZE,
        });
    }
    Ok(json)
}

#[cfg(test)]
mod tests {
    use super::*;

    const SDP: &str = "v=0\r\no=- 4215775240449105457 2 IN IP4 127.0.0.1\r\ns=-\r\nt=0 0\r\n";

    #[test]
    fn plain_token_round_trips() {
        let sd = SessionDescription::offer(SDP);
        let token = encode(&sd, TokenFormat::Plain).unwrap();
        assert_eq!(decode(&token).unwrap(), sd);
    }

    #[test]
    fn compressed_token_round_trips() {
        let sd = SessionDescription::answer(SDP);
        let token = encode(&sd, TokenFormat::Compressed).unwrap();
        assert_eq!(decode(&token).unwrap(), sd);
    }

    #[test]
    fn plain_token_is_base64_of_json() {
        let sd = SessionDescription::offer("v=0");
        let token = encode(&sd, TokenFormat::Plain).unwrap();
        let json = general_purpose::STANDARD.decode(token).unwrap();
        assert_eq!(json, br#"{"sdp":"v=0","type":"offer"}"#);
    }

    #[test]
    fn decodes_browser_token() {
        // то, что печатает btoa(JSON.stringify({sdp, type})) в браузере
        let token = general_purpose::STANDARD.encode(r#"{"sdp":"v=0\r\n","type":"Offer"}"#);
        let sd = decode(&token).unwrap();
        assert_eq!(sd, SessionDescription::offer("v=0\r\n"));
    }

    #[test]
    fn tolerates_wrapped_lines() {
        let sd = SessionDescription::offer(SDP);
        let token = encode(&sd, TokenFormat::Plain).unwrap();
        let wrapped = token
            .as_bytes()
            .chunks(20)
            .map(|c| std::str::from_utf8(c).unwrap())
            .collect::<Vec<_>>()
            .join("\n  ");
        assert_eq!(decode(&format!("  {wrapped}\n")).unwrap(), sd);
    }

    #[test]
    fn empty_token() {
        assert!(matches!(decode(" \n"), Err(DecodeError::Empty)));
    }

    #[test]
    fn bad_base64() {
        assert!(matches!(decode("not base64!"), Err(DecodeError::Base64(_))));
    }

    #[test]
    fn missing_sdp_field() {
        let token = general_purpose::STANDARD.encode(r#"{"type":"answer"}"#);
        assert!(matches!(decode(&token), Err(DecodeError::Json(_))));
    }

    #[test]
    fn blank_sdp_field() {
        let token = general_purpose::STANDARD.encode(r#"{"sdp":"  ","type":"answer"}"#);
        assert!(matches!(decode(&token), Err(DecodeError::EmptySdp)));
    }

    #[test]
    fn wrong_phase() {
        let token = encode(&SessionDescription::offer(SDP), TokenFormat::Plain).unwrap();
        let err = decode_expecting(&token, SdpType::Answer).unwrap_err();
        assert!(matches!(
            err,
            DecodeError::UnexpectedType {
                expected: SdpType::Answer,
                found: SdpType::Offer
            }
        ));
    }

    #[test]
    fn oversized_gzip_is_rejected() {
        let padding = "a".repeat(MAX_DECOMPRESSED_SIZE as usize + 1);
        let json = format!(r#"{{"sdp":"{padding}","type":"offer"}}"#);
        let mut gz = GzEncoder::new(Vec::new(), Compression::fast());
        gz.write_all(json.as_bytes()).unwrap();
        let token = general_purpose::STANDARD.encode(gz.finish().unwrap());

        assert!(matches!(
            decode(&token),
            Err(DecodeError::TooLarge { limit: MAX_DECOMPRESSED_SIZE })
        ));
    }

    #[test]
    fn truncated_gzip() {
        let token = encode(&SessionDescription::offer(SDP), TokenFormat::Compressed).unwrap();
        let mut raw = general_purpose::STANDARD.decode(token).unwrap();
        raw.truncate(raw.len() / 2);
        let token = general_purpose::STANDARD.encode(raw);
        assert!(matches!(
            decode(&token),
            Err(DecodeError::Inflate(_)) | Err(DecodeError::Json(_))
        ));
    }
}
