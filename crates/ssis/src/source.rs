//! File loading: CP-1252 decode with an ISO-8859-1 fallback, BOM stripped.

use crate::error::SsisParseError;
use std::path::Path;

pub fn read_xml_file(path: &Path) -> Result<String, SsisParseError> {
    let bytes = std::fs::read(path).map_err(|e| SsisParseError::ParseError {
        file: path.to_path_buf(),
        cause: e.to_string(),
    })?;
    Ok(decode_xml_bytes(&bytes))
}

pub fn decode_xml_bytes(bytes: &[u8]) -> String {
    let bytes = strip_bom(bytes);
    let (text, _, had_errors) = encoding_rs::WINDOWS_1252.decode(bytes);
    if had_errors {
        // encoding_rs has no distinct ISO-8859-1 codec (the Encoding
        // Standard aliases that label to windows-1252); Latin-1's code
        // points equal byte values 1:1, so decode it directly.
        bytes.iter().map(|&b| b as char).collect()
    } else {
        text.into_owned()
    }
}

fn strip_bom(bytes: &[u8]) -> &[u8] {
    const UTF8_BOM: [u8; 3] = [0xEF, 0xBB, 0xBF];
    if bytes.starts_with(&UTF8_BOM) {
        &bytes[3..]
    } else {
        bytes
    }
}
