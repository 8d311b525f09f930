//! Domain names and labels in presentation format.
//!
//! The presentation form of a name is the familiar dot-separated string. Labels may contain
//! arbitrary bytes, so the textual form escapes anything that would be ambiguous or unprintable:
//! a literal `.` or `\` inside a label becomes `\.` or `\\`, and bytes below `0x20` or at or above
//! `0x7F` become `\DDD` with three decimal digits. [`fmt::Display`] applies the escaping and the
//! [`FromStr`] implementations reverse it.

use std::{
    fmt::{self, Write},
    slice,
    str::FromStr,
    vec,
};

use crate::Error;

/// A `.`-separated component of a [`DomainName`].
///
/// Labels consist of arbitrary bytes and have a maximum length of 63 bytes. This type can only
/// represent non-empty labels, so the minimum length is 1 byte.
#[derive(Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Label {
    // Guaranteed to contain >0 and at most `Label::MAX_LEN` bytes.
    bytes: Box<[u8]>,
}

impl Label {
    /// The maximum length of a domain label.
    ///
    /// Label lengths share their octet with the compression pointer tag bits, leaving 6 bits for
    /// the length itself.
    pub const MAX_LEN: usize = 0b0011_1111;

    /// Creates a [`Label`] from raw bytes or a string slice, panicking if the bytes are an invalid
    /// label.
    ///
    /// # Panics
    ///
    /// This function will panic if `bytes` is empty or contains more than [`Self::MAX_LEN`] bytes.
    pub fn new(label: impl AsRef<[u8]>) -> Self {
        Self::new_impl(label.as_ref())
    }

    fn new_impl(label: &[u8]) -> Self {
        Self::try_new(label)
            .unwrap_or_else(|_| panic!("`Label::new` called with invalid data: {:?}", label))
    }

    /// Creates a [`Label`] from raw bytes or a string slice, returning an error if the bytes are
    /// an invalid label.
    pub fn try_new(label: impl AsRef<[u8]>) -> Result<Self, Error> {
        Self::try_new_impl(label.as_ref())
    }

    fn try_new_impl(label: &[u8]) -> Result<Self, Error> {
        if label.is_empty() {
            return Err(Error::InvalidEmptyLabel);
        }

        if label.len() > Self::MAX_LEN {
            return Err(Error::LabelTooLong);
        }

        Ok(Self {
            bytes: label.into(),
        })
    }

    /// Returns the raw, unescaped bytes of this label.
    #[inline]
    pub fn as_bytes(&self) -> &[u8] {
        &self.bytes
    }

    /// Writes the escaped presentation form of one label byte.
    pub(crate) fn escape_byte(byte: u8, f: &mut impl fmt::Write) -> fmt::Result {
        match byte {
            b'.' | b'\\' => write!(f, "\\{}", byte as char),
            0x20..=0x7e => f.write_char(byte as char),
            _ => write!(f, "\\{:03}", byte),
        }
    }
}

impl fmt::Debug for Label {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, r#""{}""#, self)
    }
}

impl fmt::Display for Label {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for &byte in self.as_bytes() {
            Self::escape_byte(byte, f)?;
        }
        Ok(())
    }
}

impl FromStr for Label {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::try_new(unescape(s)?)
    }
}

/// A domain name, represented as a list of [`Label`]s.
///
/// In DNS messages, domain names are terminated by an empty label, but this type omits that label.
/// This allows downstream code to use [`DomainName::push_label`] to incrementally build a domain
/// name.
#[derive(PartialEq, Eq, Hash, Clone)]
pub struct DomainName {
    // Does not include the trailing empty label.
    labels: Vec<Label>,
}

impl DomainName {
    /// The empty root domain `.`.
    pub const ROOT: Self = Self { labels: Vec::new() };

    /// Parses a domain name as a string of `.`-separated labels.
    ///
    /// A trailing `.` is allowed but not required. Escape sequences (`\.`, `\\`, `\DDD`) are
    /// decoded into the raw label bytes they denote.
    ///
    /// The [`FromStr`] implementation performs the same operation. This method is just a
    /// convenience function so that you don't have to import that trait.
    pub fn from_str(s: &str) -> Result<Self, Error> {
        s.parse()
    }

    /// Returns the `.`-separated labels making up this domain name.
    ///
    /// The trailing empty label is not included.
    #[inline]
    pub fn labels(&self) -> &[Label] {
        &self.labels
    }

    /// Appends a [`Label`] to the end of this domain name.
    #[inline]
    pub fn push_label(&mut self, label: Label) {
        self.labels.push(label);
    }
}

impl Extend<Label> for DomainName {
    fn extend<T: IntoIterator<Item = Label>>(&mut self, iter: T) {
        self.labels.extend(iter)
    }
}

impl FromIterator<Label> for DomainName {
    fn from_iter<T: IntoIterator<Item = Label>>(iter: T) -> Self {
        Self {
            labels: Vec::from_iter(iter),
        }
    }
}

impl IntoIterator for DomainName {
    type Item = Label;
    type IntoIter = IntoIter;

    #[inline]
    fn into_iter(self) -> Self::IntoIter {
        IntoIter {
            inner: self.labels.into_iter(),
        }
    }
}

impl<'a> IntoIterator for &'a DomainName {
    type Item = &'a Label;
    type IntoIter = Iter<'a>;

    fn into_iter(self) -> Self::IntoIter {
        Iter {
            inner: self.labels.iter(),
        }
    }
}

impl fmt::Debug for DomainName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(self, f)
    }
}

impl fmt::Display for DomainName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.labels.is_empty() {
            return f.write_char('.');
        }
        for label in &self.labels {
            label.fmt(f)?;
            f.write_char('.')?;
        }
        Ok(())
    }
}

impl FromStr for DomainName {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if s == "." {
            return Ok(Self::ROOT);
        }

        let mut name = DomainName { labels: Vec::new() };
        let mut label = Vec::new();
        let mut bytes = s.bytes();
        loop {
            match bytes.next() {
                // Only an *unescaped* dot separates labels.
                Some(b'.') => {
                    name.labels.push(Label::try_new(&label)?);
                    label.clear();
                }
                Some(b'\\') => label.push(unescape_one(&mut bytes)?),
                Some(byte) => label.push(byte),
                None => break,
            }
        }
        if !label.is_empty() {
            // No trailing dot; the last label is still pending.
            name.labels.push(Label::try_new(&label)?);
        }
        Ok(name)
    }
}

/// Decodes the remainder of an escape sequence, after the `\` has been consumed.
fn unescape_one(bytes: &mut impl Iterator<Item = u8>) -> Result<u8, Error> {
    let first = bytes.next().ok_or(Error::BadEscape)?;
    if !first.is_ascii_digit() {
        // `\X` stands for the literal byte `X`.
        return Ok(first);
    }

    // `\DDD` with exactly three decimal digits.
    let mut value = u32::from(first - b'0');
    for _ in 0..2 {
        let digit = bytes.next().ok_or(Error::BadEscape)?;
        if !digit.is_ascii_digit() {
            return Err(Error::BadEscape);
        }
        value = value * 10 + u32::from(digit - b'0');
    }
    u8::try_from(value).map_err(|_| Error::BadEscape)
}

/// Decodes all escape sequences in a single label, rejecting unescaped dots.
fn unescape(s: &str) -> Result<Vec<u8>, Error> {
    let mut out = Vec::with_capacity(s.len());
    let mut bytes = s.bytes();
    loop {
        match bytes.next() {
            Some(b'.') => return Err(Error::BadEscape),
            Some(b'\\') => out.push(unescape_one(&mut bytes)?),
            Some(byte) => out.push(byte),
            None => return Ok(out),
        }
    }
}

/// A by-value iterator over the [`Label`]s of a [`DomainName`].
pub struct IntoIter {
    inner: vec::IntoIter<Label>,
}

impl Iterator for IntoIter {
    type Item = Label;

    #[inline]
    fn next(&mut self) -> Option<Self::Item> {
        self.inner.next()
    }
}

/// A by-reference iterator over the [`Label`]s of a [`DomainName`].
pub struct Iter<'a> {
    inner: slice::Iter<'a, Label>,
}

impl<'a> Iterator for Iter<'a> {
    type Item = &'a Label;

    #[inline]
    fn next(&mut self) -> Option<Self::Item> {
        self.inner.next()
    }
}
