//! Input normalization for signature matching.
//!
//! # Responsibilities
//! - Decode percent-encoding, double percent-encoding, and `\xNN` hex escapes
//! - Bound decoding to a fixed number of passes
//! - Preserve the original input alongside the canonical form
//!
//! # Design Decisions
//! - At most 3 decode passes: defeats double/triple-encoding bypasses while
//!   staying O(n * passes) on adversarial input
//! - Decoding stops early once a pass is a fixed point
//! - Invalid escape sequences pass through untouched; the raw form is
//!   still scanned by the injection engine

/// Maximum number of decode passes applied to any input.
pub const MAX_DECODE_PASSES: usize = 3;

/// Decode `input` up to [`MAX_DECODE_PASSES`] times, returning the canonical
/// form. The caller keeps the original; both forms are scanned downstream.
pub fn normalize(input: &str) -> String {
    let mut current = input.to_string();
    for _ in 0..MAX_DECODE_PASSES {
        let decoded = decode_once(&current);
        if decoded == current {
            break;
        }
        current = decoded;
    }
    current
}

/// A single decode pass over percent and hex escapes.
fn decode_once(input: &str) -> String {
    let bytes = input.as_bytes();
    let mut out = Vec::with_capacity(bytes.len());
    let mut i = 0;
    while i < bytes.len() {
        match bytes[i] {
            b'%' => {
                match hex_pair(bytes.get(i + 1).copied(), bytes.get(i + 2).copied()) {
                    Some(b) => {
                        out.push(b);
                        i += 3;
                    }
                    None => {
                        out.push(b'%');
                        i += 1;
                    }
                }
            }
            b'\\' if bytes.get(i + 1) == Some(&b'x') => {
                match hex_pair(bytes.get(i + 2).copied(), bytes.get(i + 3).copied()) {
                    Some(b) => {
                        out.push(b);
                        i += 4;
                    }
                    None => {
                        out.push(b'\\');
                        i += 1;
                    }
                }
            }
            b => {
                out.push(b);
                i += 1;
            }
        }
    }
    // Decoded bytes may not be valid UTF-8; lossy conversion keeps the
    // scanners working on whatever survived.
    String::from_utf8_lossy(&out).into_owned()
}

fn hex_pair(hi: Option<u8>, lo: Option<u8>) -> Option<u8> {
    let hi = hex_val(hi?)?;
    let lo = hex_val(lo?)?;
    Some(hi << 4 | lo)
}

fn hex_val(b: u8) -> Option<u8> {
    match b {
        b'0'..=b'9' => Some(b - b'0'),
        b'a'..=b'f' => Some(b - b'a' + 10),
        b'A'..=b'F' => Some(b - b'A' + 10),
        _ => None,
    }
}
