//! Expansion of compressed wire-format names.
//!
//! Compression pointers hold offsets that are absolute from the start of the message, so names are
//! always decoded against the whole message buffer, not just the bytes of the name itself.

use std::{cmp, mem::size_of};

use bytemuck::AnyBitPattern;

use crate::hex::Hex;
use crate::name::{DomainName, Label};
use crate::num::U16;
use crate::{INDIR_MASK, MAXDNAME};

use super::{Error, LabelKind};

/// Cursor over a DNS message, used to decode domain names embedded in it.
///
/// The cursor borrows the full message so that compression pointers can be resolved; the end of
/// the slice is the end-of-message bound that no read may cross.
#[derive(Debug, Clone)]
pub struct Reader<'a> {
    /// The buffer containing the whole DNS message.
    full_buf: &'a [u8],
    /// The current reader position in the buffer.
    pos: usize,
}

impl<'a> Reader<'a> {
    /// Creates a reader positioned at the start of `msg`.
    pub fn new(msg: &'a [u8]) -> Self {
        Self {
            full_buf: msg,
            pos: 0,
        }
    }

    /// Creates a reader over `msg` positioned at `pos`, where a name is expected to begin.
    pub fn at(msg: &'a [u8], pos: usize) -> Self {
        Self { full_buf: msg, pos }
    }

    /// Returns the current position in the message.
    #[inline]
    pub fn pos(&self) -> usize {
        self.pos
    }

    fn read_obj<T: AnyBitPattern>(&mut self) -> Result<T, Error> {
        let bytes = self
            .full_buf
            .get(self.pos..)
            .and_then(|b| b.get(..size_of::<T>()))
            .ok_or(Error::Eof)?;
        self.pos += size_of::<T>();
        Ok(bytemuck::pod_read_unaligned(bytes))
    }

    fn peek_u8(&self) -> Result<u8, Error> {
        self.full_buf.get(self.pos).copied().ok_or(Error::Eof)
    }

    /// Reads a single byte, for fields following a name.
    pub fn read_u8(&mut self) -> Result<u8, Error> {
        self.read_obj::<u8>()
    }

    /// Reads a big-endian 16-bit value, for fields following a name.
    pub fn read_u16(&mut self) -> Result<u16, Error> {
        Ok(self.read_obj::<U16>()?.get())
    }

    pub(crate) fn read_slice(&mut self, len: usize) -> Result<&'a [u8], Error> {
        match self.full_buf.get(self.pos..self.pos + len) {
            Some(slice) => {
                self.pos += len;
                Ok(slice)
            }
            None => Err(Error::Eof),
        }
    }

    /// Reads and classifies the next label length octet, consuming a pointer's second octet along
    /// with it.
    fn read_label_kind(&mut self) -> Result<LabelKind, Error> {
        let octet = self.peek_u8()?;
        match octet & INDIR_MASK {
            0b1100_0000 => {
                // 14-bit pointer to somewhere else in the message.
                let ptr = self.read_u16()? & 0b0011_1111_1111_1111;
                Ok(LabelKind::Pointer(ptr))
            }
            0b0000_0000 => {
                self.pos += 1;
                if octet == 0 {
                    Ok(LabelKind::Root)
                } else {
                    Ok(LabelKind::Label(octet))
                }
            }
            _ => Ok(LabelKind::Reserved(octet)),
        }
    }

    /// Walks one name, invoking `visit` with the raw bytes of every label, and returns the number
    /// of bytes the name occupies at the *original* position.
    ///
    /// When the name ends in a compression pointer, only the bytes up to and including the first
    /// pointer count towards the returned length, so the caller can continue parsing whatever
    /// follows the name in the message.
    fn walk_name(
        &mut self,
        mut visit: impl FnMut(&'a [u8]) -> Result<(), Error>,
    ) -> Result<usize, Error> {
        let start = self.pos;
        let mut min_pos = self.pos;
        let mut consumed = None;
        let mut copy = self.clone();
        loop {
            match copy.read_label_kind()? {
                LabelKind::Root => break,
                LabelKind::Label(len) => {
                    visit(copy.read_slice(usize::from(len))?)?;
                }
                LabelKind::Pointer(ptr) => {
                    let ptr = usize::from(ptr);
                    if ptr >= min_pos {
                        // We require pointers to point to an earlier part of the message, to
                        // prevent loops. RFC 1035 is unclear about what exactly is allowed.
                        return Err(Error::PointerLoop);
                    }
                    log::trace!("following compression pointer to offset {}", ptr);
                    // Only the first pointer is part of the name at `start`.
                    consumed.get_or_insert_with(|| copy.pos - start);
                    min_pos = ptr;
                    copy.pos = ptr;
                }
                LabelKind::Reserved(_) => return Err(Error::ReservedLabelType),
            }
        }

        let consumed = consumed.unwrap_or_else(|| copy.pos - start);
        self.pos = start + consumed;
        Ok(consumed)
    }

    /// Reads a (possibly compressed) domain name, advancing the cursor past it.
    ///
    /// The cursor ends up right behind the name's terminating zero octet, or behind the first
    /// compression pointer if the name ends in one, so that subsequent fields can be read
    /// directly.
    pub fn read_domain_name(&mut self) -> Result<DomainName, Error> {
        let mut name = DomainName::ROOT;
        self.walk_name(|label| {
            name.push_label(Label::try_new(label)?);
            Ok(())
        })?;
        Ok(name)
    }

    /// Validates and skips over a (possibly compressed) domain name without decoding it, returning
    /// the number of bytes skipped.
    pub fn skip_name(&mut self) -> Result<usize, Error> {
        self.walk_name(|_| Ok(()))
    }
}

/// Expands the compressed name starting at `pos` within `msg` into `out`.
///
/// On success, `out` holds the NUL-terminated presentation form of the name: labels joined by `.`,
/// with unprintable bytes escaped as `\DDD` and literal dots and backslashes as `\.` and `\\`. The
/// root name expands to the empty string. The usable capacity of `out` is capped at [`MAXDNAME`].
///
/// The returned value is the number of bytes the name occupies in `msg` starting at `pos` — up to
/// and including the terminating zero octet, or the first compression pointer's two bytes if the
/// name ends in one. It is *not* the length of the expanded text; advance a message cursor by it
/// to reach whatever follows the name.
///
/// On error the contents of `out` are unspecified.
pub fn expand(msg: &[u8], pos: usize, out: &mut [u8]) -> Result<usize, Error> {
    log::trace!("expanding name at offset {} of message {}", pos, Hex(msg));

    let cap = cmp::min(out.len(), MAXDNAME);
    let mut written = 0;
    let mut push = |out: &mut [u8], byte| {
        if written >= cap {
            return Err(Error::NameTooLong);
        }
        out[written] = byte;
        written += 1;
        Ok(())
    };

    let mut first = true;
    let consumed = Reader::at(msg, pos).walk_name(|label| {
        if !first {
            push(out, b'.')?;
        }
        first = false;

        for &byte in label {
            match byte {
                b'.' | b'\\' => {
                    push(out, b'\\')?;
                    push(out, byte)?;
                }
                0x20..=0x7e => push(out, byte)?,
                _ => {
                    push(out, b'\\')?;
                    for digit in [byte / 100, byte / 10 % 10, byte % 10] {
                        push(out, b'0' + digit)?;
                    }
                }
            }
        }
        Ok(())
    })?;
    push(out, 0)?;

    Ok(consumed)
}

#[cfg(test)]
mod tests {
    use expect_test::expect;

    use crate::hex;

    use super::*;

    /// Expands the name at `pos` and returns the presentation string along with the consumed byte
    /// count.
    fn expand_str(msg: &[u8], pos: usize) -> Result<(String, usize), Error> {
        let mut out = [0xaa; MAXDNAME];
        let consumed = expand(msg, pos, &mut out)?;
        let nul = out.iter().position(|&b| b == 0).unwrap();
        Ok((String::from_utf8(out[..nul].to_vec()).unwrap(), consumed))
    }

    #[test]
    fn decode_domain_name() {
        let mut r = Reader::new(&[
            7, b'e', b'x', b'a', b'm', b'p', b'l', b'e', 3, b'c', b'o', b'm', 0,
        ]);
        let name = r.read_domain_name().unwrap();
        assert_eq!(name.to_string(), "example.com.");
        assert_eq!(r.pos(), 13);

        let mut r = Reader::new(&[0]);
        let name = r.read_domain_name().unwrap();
        assert_eq!(name.to_string(), ".");
        assert_eq!(r.pos(), 1);
    }

    #[test]
    fn decode_domain_name_pointer() {
        let mut r = Reader::at(
            &[
                b'_', // never read
                3,
                b'c',
                b'o',
                b'm',
                0, // "com."
                7,
                b'e',
                b'x',
                b'a',
                b'm',
                b'p',
                b'l',
                b'e',
                // ptr to 1:
                0b1100_0000,
                1,
            ],
            1,
        );
        let name = r.read_domain_name().unwrap();
        assert_eq!(name.to_string(), "com.");
        let name = r.read_domain_name().unwrap();
        assert_eq!(name.to_string(), "example.com.");
        assert_eq!(r.read_u8(), Err(Error::Eof), "should be at EOF");
    }

    #[test]
    fn decode_domain_name_pointer_oob() {
        let mut r = Reader::new(&[0xff, 0xff]);
        assert_eq!(r.read_domain_name(), Err(Error::PointerLoop));
    }

    #[test]
    fn decode_domain_name_dos() {
        let mut r = Reader::new(&[
            // pointer to self:
            0b1100_0000,
            0,
        ]);
        assert_eq!(r.read_domain_name(), Err(Error::PointerLoop));

        let mut r = Reader::at(
            &[
                // fallthrough:
                1,
                b'a',
                // pointer to 0:
                0b1100_0000,
                0,
            ],
            2,
        );
        assert_eq!(r.read_domain_name(), Err(Error::PointerLoop));
    }

    #[test]
    fn decode_domain_name_pointer_cycle() {
        // Offset 0 points at offset 2, offset 2 points back at offset 0.
        let mut r = Reader::new(&[0xc0, 2, 0xc0, 0]);
        assert_eq!(r.read_domain_name(), Err(Error::PointerLoop));

        let mut r = Reader::at(&[0xc0, 2, 0xc0, 0], 2);
        assert_eq!(r.read_domain_name(), Err(Error::PointerLoop));
    }

    #[test]
    fn decode_domain_name_reserved_label_types() {
        let mut r = Reader::new(&[0b0100_0001, b'a', 0]);
        assert_eq!(r.read_domain_name(), Err(Error::ReservedLabelType));

        let mut r = Reader::new(&[0b1000_0001, b'a', 0]);
        assert_eq!(r.read_domain_name(), Err(Error::ReservedLabelType));
    }

    #[test]
    fn decode_domain_name_truncated() {
        let mut r = Reader::new(&[]);
        assert_eq!(r.read_domain_name(), Err(Error::Eof));

        // Length octet announces more data than the message holds.
        let mut r = Reader::new(&[3, b'w', b'w']);
        assert_eq!(r.read_domain_name(), Err(Error::Eof));

        // Missing terminating zero octet.
        let mut r = Reader::new(&[3, b'w', b'w', b'w']);
        assert_eq!(r.read_domain_name(), Err(Error::Eof));

        // Pointer missing its second octet.
        let mut r = Reader::new(&[0xc0]);
        assert_eq!(r.read_domain_name(), Err(Error::Eof));
    }

    #[test]
    fn skip_name() {
        let msg = [
            3, b'w', b'w', b'w', 7, b'e', b'x', b'a', b'm', b'p', b'l', b'e', 3, b'c', b'o', b'm',
            0, 0xc0, 4,
        ];

        let mut r = Reader::new(&msg);
        assert_eq!(r.skip_name(), Ok(17));
        assert_eq!(r.pos(), 17);
        assert_eq!(r.skip_name(), Ok(2));
        assert_eq!(r.pos(), 19);

        let mut r = Reader::new(&[0xc0, 0]);
        assert_eq!(r.skip_name(), Err(Error::PointerLoop));
    }

    #[test]
    fn expand_uncompressed() {
        let msg = [
            3, b'w', b'w', b'w', 7, b'e', b'x', b'a', b'm', b'p', b'l', b'e', 3, b'c', b'o', b'm',
            0,
        ];
        assert_eq!(
            expand_str(&msg, 0),
            Ok(("www.example.com".to_string(), 17))
        );
        assert_eq!(expand_str(&msg, 4), Ok(("example.com".to_string(), 13)));
    }

    #[test]
    fn expand_root() {
        // The root name has no labels and expands to the empty string.
        assert_eq!(expand_str(&[0], 0), Ok((String::new(), 1)));
    }

    #[test]
    fn expand_trailing_pointer() {
        let msg = [
            3, b'w', b'w', b'w', 7, b'e', b'x', b'a', b'm', b'p', b'l', b'e', 3, b'c', b'o', b'm',
            0, // name at 17 points back into the one above:
            0xc0, 4,
        ];
        assert_eq!(expand_str(&msg, 17), Ok(("example.com".to_string(), 2)));

        // A pointer after inline labels counts towards the consumed length too.
        let msg = [
            3, b'c', b'o', b'm', 0, // name at 5:
            3, b'f', b'o', b'o', 0xc0, 0,
        ];
        assert_eq!(expand_str(&msg, 5), Ok(("foo.com".to_string(), 6)));
    }

    #[test]
    fn expand_chained_pointers() {
        let msg = [
            3, b'c', b'o', b'm', 0, // "example" + ptr to 0:
            7, b'e', b'x', b'a', b'm', b'p', b'l', b'e', 0xc0, 0,
            // "www" + ptr to 5:
            3, b'w', b'w', b'w', 0xc0, 5,
        ];
        assert_eq!(
            expand_str(&msg, 15),
            Ok(("www.example.com".to_string(), 6))
        );
    }

    #[test]
    fn expand_escapes() {
        // label 1: [0x02, 0x03], label 2: [b'e', 0x00, b'.', b'\\'], label 3: "mp", label 4: "org"
        let msg = hex::parse("0202030465002e5c026d70036f726700");
        let (text, consumed) = expand_str(&msg, 0).unwrap();
        assert_eq!(consumed, msg.len());
        expect![[r#"\002\003.e\000\.\\.mp.org"#]].assert_eq(&text);
    }

    #[test]
    fn expand_output_capacity() {
        let msg = [3, b'w', b'w', b'w', 3, b'c', b'o', b'm', 0];

        // "www.com" plus the NUL needs 8 bytes.
        let mut out = [0; 8];
        assert_eq!(expand(&msg, 0, &mut out), Ok(9));
        assert_eq!(&out[..8], b"www.com\0");

        // Room for the text but not the NUL.
        let mut out = [0; 7];
        assert_eq!(expand(&msg, 0, &mut out), Err(Error::NameTooLong));

        let mut out = [0; 3];
        assert_eq!(expand(&msg, 0, &mut out), Err(Error::NameTooLong));

        let mut out = [0; 0];
        assert_eq!(expand(&[0], 0, &mut out), Err(Error::NameTooLong));
    }

    #[test]
    fn expand_enforces_maxdname() {
        // 16 labels of 63 * 0x00 expand to 16 * (63 * 4) + 15 separator bytes = 4047 characters,
        // far beyond MAXDNAME even though the output buffer could hold them.
        let mut msg = Vec::new();
        for _ in 0..16 {
            msg.push(63);
            msg.extend_from_slice(&[0u8; 63]);
        }
        msg.push(0);

        let mut out = vec![0; 8192];
        assert_eq!(expand(&msg, 0, &mut out), Err(Error::NameTooLong));
    }

    #[test]
    fn expand_start_out_of_bounds() {
        let msg = [3, b'w', b'w', b'w', 0];
        let mut out = [0; 64];
        assert_eq!(expand(&msg, 5, &mut out), Err(Error::Eof));
        assert_eq!(expand(&msg, 500, &mut out), Err(Error::Eof));
    }
}
