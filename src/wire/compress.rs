//! Encoding of names into wire format, with optional compression.

use std::collections::HashMap;

use crate::name::{DomainName, Label};
use crate::INDIR_MASK;

use super::Error;

/// Compression pointers can only address the first 16 KiB of a message, since only 14 bits of the
/// pointer are offset.
const MAX_PTR_TARGET: usize = 0b0011_1111_1111_1111;

/// Writer for wire-format names, backed by a caller-supplied buffer.
///
/// Writes past the end of the buffer are not an immediate error; they set a truncation flag that
/// [`Writer::finish`] reports, so a caller can decide whether a truncated message is still worth
/// sending.
pub struct Writer<'a> {
    buf: &'a mut [u8],
    pos: usize,
    trunc: bool,
}

impl<'a> Writer<'a> {
    /// Creates a new writer that will encode into `buf`.
    pub fn new(buf: &'a mut [u8]) -> Self {
        Self {
            buf,
            pos: 0,
            trunc: false,
        }
    }

    /// Returns the current write position.
    #[inline]
    pub fn pos(&self) -> usize {
        self.pos
    }

    pub(crate) fn write_slice(&mut self, data: &[u8]) {
        let buf = &mut self.buf[self.pos..];
        if data.len() > buf.len() {
            self.trunc = true;
            buf.copy_from_slice(&data[..buf.len()]);
            self.pos += buf.len();
        } else {
            buf[..data.len()].copy_from_slice(data);
            self.pos += data.len();
        }
    }

    pub(crate) fn write_u8(&mut self, b: u8) {
        self.write_slice(&[b]);
    }

    pub(crate) fn write_u16(&mut self, v: u16) {
        self.write_slice(&v.to_be_bytes());
    }

    /// Writes `name` in uncompressed wire format.
    pub fn write_domain_name(&mut self, name: &DomainName) {
        for label in name.labels() {
            self.write_label(label);
        }
        // Implicit root label at the end.
        self.write_u8(0);
    }

    /// Writes `name`, compressing against (and recording into) previously written names tracked by
    /// `map`.
    ///
    /// If a suffix of `name` has been written before, the labels in front of it are emitted inline
    /// and the suffix is replaced by a 2-byte pointer to its earlier occurrence. The map only
    /// tracks suffixes that start within pointer range of the buffer start.
    pub fn write_domain_name_compressed(&mut self, name: &DomainName, map: &mut CompressMap) {
        let labels = name.labels();
        for i in 0..labels.len() {
            let suffix = &labels[i..];
            if let Some(offset) = map.lookup(suffix) {
                log::trace!("compressing suffix at {} via pointer to {}", self.pos, offset);
                self.write_u16((u16::from(INDIR_MASK) << 8) | offset);
                return;
            }

            map.record(suffix, self.pos);
            self.write_label(&labels[i]);
        }
        self.write_u8(0);
    }

    fn write_label(&mut self, label: &Label) {
        self.write_u8(label.as_bytes().len() as u8);
        self.write_slice(label.as_bytes());
    }

    /// Finishes encoding and returns the number of bytes written.
    ///
    /// Returns [`Error::Truncated`] if the buffer was too small for everything that was written.
    pub fn finish(self) -> Result<usize, Error> {
        if self.trunc {
            Err(Error::Truncated)
        } else {
            Ok(self.pos)
        }
    }
}

/// Table of name suffixes already emitted into a message, keyed to their offsets.
///
/// A single map must only ever be used with a single [`Writer`], since the recorded offsets are
/// relative to that writer's buffer.
#[derive(Default)]
pub struct CompressMap {
    offsets: HashMap<Vec<Label>, u16>,
}

impl CompressMap {
    /// Creates an empty map.
    pub fn new() -> Self {
        Self::default()
    }

    fn lookup(&self, suffix: &[Label]) -> Option<u16> {
        self.offsets.get(suffix).copied()
    }

    fn record(&mut self, suffix: &[Label], offset: usize) {
        if offset <= MAX_PTR_TARGET {
            self.offsets.insert(suffix.to_vec(), offset as u16);
        }
    }
}
