//! Byte decoding.
//!
//! UTF-8 is the expected encoding; a leading UTF-8 BOM is dropped. Bytes that
//! are not valid UTF-8 are read as Windows-1252, which covers the spreadsheet
//! exports we see in practice. UTF-16 files are rejected.

use std::borrow::Cow;

use encoding_rs::WINDOWS_1252;

use crate::error::{IngestError, Result};

pub const UTF8: &str = "UTF-8";
pub const WINDOWS_1252_LABEL: &str = "windows-1252";

const UTF8_BOM: &[u8] = &[0xEF, 0xBB, 0xBF];

/// Decoded file contents with `\r\n` line endings normalized to `\n`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Decoded {
    pub text: String,
    pub encoding: &'static str,
}

/// Rejects byte-order marks of encodings we do not read.
pub fn validate_encoding(bytes: &[u8]) -> Result<()> {
    if bytes.starts_with(&[0xFF, 0xFE]) {
        return Err(IngestError::UnsupportedEncoding {
            encoding: "UTF-16 LE",
        });
    }
    if bytes.starts_with(&[0xFE, 0xFF]) {
        return Err(IngestError::UnsupportedEncoding {
            encoding: "UTF-16 BE",
        });
    }
    Ok(())
}

pub fn decode(bytes: &[u8]) -> Result<Decoded> {
    validate_encoding(bytes)?;
    let bytes = bytes.strip_prefix(UTF8_BOM).unwrap_or(bytes);

    let (text, encoding): (Cow<'_, str>, _) = match std::str::from_utf8(bytes) {
        Ok(text) => (Cow::Borrowed(text), UTF8),
        Err(_) => {
            let (text, _) = WINDOWS_1252.decode_without_bom_handling(bytes);
            tracing::debug!("input is not valid UTF-8, decoded as windows-1252");
            (text, WINDOWS_1252_LABEL)
        }
    };

    if text.trim().is_empty() {
        return Err(IngestError::EmptyInput);
    }

    Ok(Decoded {
        text: text.replace("\r\n", "\n"),
        encoding,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn strips_utf8_bom() {
        let decoded = decode(b"\xEF\xBB\xBFtype,lieu\r\nVol,Dakar\r\n").unwrap();
        assert_eq!(decoded.text, "type,lieu\nVol,Dakar\n");
        assert_eq!(decoded.encoding, UTF8);
    }

    #[test]
    fn falls_back_to_windows_1252() {
        let decoded = decode(b"lieu\nGravit\xE9\n").unwrap();
        assert_eq!(decoded.text, "lieu\nGravité\n");
        assert_eq!(decoded.encoding, WINDOWS_1252_LABEL);
    }

    #[test]
    fn rejects_utf16_and_empty_input() {
        assert!(matches!(
            decode(&[0xFF, 0xFE, b'a', 0]),
            Err(IngestError::UnsupportedEncoding { encoding: "UTF-16 LE" })
        ));
        assert!(matches!(decode(b" \n\n"), Err(IngestError::EmptyInput)));
    }
}
