//! Hex dump of received data

use std::fmt::Write;

/// Bytes shown per line
const LINE_LEN: usize = 16;

/// Render `buf` as hex, 16 bytes per line with a 4 digit offset
///
/// ```text
/// 0000: 00 00 00 00 00 00 00 00 00 00 00 00 00 00 00 00
/// 0010: FF 80
/// ```
///
/// Every line, including a partial last one, ends with a newline. An empty
/// buffer renders as an empty string.
pub fn hex_dump(buf: &[u8]) -> String {
    let mut out = String::with_capacity(buf.len() * 3 + buf.len().div_ceil(LINE_LEN) * 6);
    for (line, chunk) in buf.chunks(LINE_LEN).enumerate() {
        let _ = write!(out, "{:04X}:", line * LINE_LEN);
        for byte in chunk {
            let _ = write!(out, " {:02X}", byte);
        }
        out.push('\n');
    }
    out
}
