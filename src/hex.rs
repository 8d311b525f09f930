use std::fmt;

/// Displays a byte slice as lowercase hex, for log output.
pub(crate) struct Hex<'a>(pub &'a [u8]);

impl<'a> fmt::Display for Hex<'a> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for byte in self.0 {
            write!(f, "{:02x}", byte)?;
        }
        Ok(())
    }
}

/// Parses a string of hex digit pairs into bytes, panicking on malformed input.
#[cfg(test)]
pub(crate) fn parse(s: &str) -> Vec<u8> {
    assert!(s.is_ascii() && s.len() % 2 == 0, "malformed hex string");

    s.as_bytes()
        .chunks(2)
        .map(|pair| u8::from_str_radix(std::str::from_utf8(pair).unwrap(), 16).unwrap())
        .collect()
}
