//! DNS domain name compression and expansion.
//!
//! Domain names inside DNS messages are stored as length-prefixed labels and may be *compressed*:
//! instead of repeating a common suffix, a name can end in a 2-byte pointer that redirects decoding
//! to an earlier offset in the same message (RFC 1035 §4.1.4). This crate decodes such names into
//! their dot-separated presentation form and encodes names back into wire format, with or without
//! compression.
//!
//! Decoding is hardened against hostile input: pointers may only lead backwards (so pointer cycles
//! are rejected instead of looping forever), all reads are bounded by the message buffer, and the
//! presentation output is bounded by the caller's buffer and [`MAXDNAME`].

pub mod name;
pub mod wire;

mod hex;
mod num;

pub use wire::Error;

/// Mask identifying a compression pointer in a label length octet.
///
/// If the two most significant bits of the octet are both set, the octet and its successor form a
/// 14-bit offset from the start of the message. The patterns `01xxxxxx` and `10xxxxxx` are
/// reserved.
pub const INDIR_MASK: u8 = 0b1100_0000;

/// Maximum size of a domain name in presentation format, including the terminating NUL.
///
/// Presentation format can be considerably larger than the wire form, since every label byte may
/// expand to a 4-byte `\DDD` escape (think `\002.\003\004.example.com`).
pub const MAXDNAME: usize = 1010;
