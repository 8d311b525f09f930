//! Wire-format name decoding and encoding.

pub mod compress;
mod error;
pub mod expand;

pub use self::error::Error;

/// Decoded form of a label length octet.
///
/// The two most significant bits of the octet select one of four classes; only two of them are
/// assigned. Keeping this as a closed set of variants gives the decoders a single `match` surface
/// instead of scattered bit tests.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LabelKind {
    /// The empty root label terminating a name.
    Root,
    /// An inline label of 1 to 63 bytes following the length octet.
    Label(u8),
    /// A compression pointer holding a 14-bit offset from the start of the message.
    Pointer(u16),
    /// One of the reserved patterns `01xxxxxx` or `10xxxxxx`.
    Reserved(u8),
}
