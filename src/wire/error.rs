use std::{fmt, io};

/// Errors that may occur while decoding or encoding a domain name.
#[derive(Debug, PartialEq, Eq, Clone, Copy)]
#[non_exhaustive]
pub enum Error {
    /// The end of the message was reached while more data was expected.
    Eof,
    /// A compression pointer pointed at itself or further into the message.
    PointerLoop,
    /// A label length octet used one of the reserved patterns `01xxxxxx` or `10xxxxxx`.
    ReservedLabelType,
    /// The presentation form of the name does not fit the output buffer.
    NameTooLong,
    /// Returned from [`Writer::finish`], indicates that there was not enough space in the provided
    /// buffer to fit the encoded name.
    ///
    /// [`Writer::finish`]: super::compress::Writer::finish
    Truncated,
    /// An empty label was encountered where it is not allowed.
    InvalidEmptyLabel,
    /// A label exceeded the maximum allowable length of a label.
    LabelTooLong,
    /// A presentation-format string contained a malformed `\` escape.
    BadEscape,
}

impl Error {
    fn description(&self) -> &str {
        match self {
            Error::Eof => "unexpected end of data",
            Error::PointerLoop => "encountered domain name pointer loop",
            Error::ReservedLabelType => "reserved label type",
            Error::NameTooLong => "expanded name too long",
            Error::Truncated => "name truncated",
            Error::InvalidEmptyLabel => "invalid empty label",
            Error::LabelTooLong => "label too long",
            Error::BadEscape => "malformed escape sequence",
        }
    }
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.description())
    }
}

impl std::error::Error for Error {}

impl From<Error> for io::Error {
    fn from(e: Error) -> io::Error {
        match e {
            Error::Eof => io::ErrorKind::UnexpectedEof.into(),
            Error::PointerLoop => io::Error::new(
                io::ErrorKind::InvalidData,
                "a domain name pointer loop was encountered; this may indicate a malicious message",
            ),
            Error::ReservedLabelType => io::Error::new(
                io::ErrorKind::InvalidData,
                "a domain name label used a reserved label type",
            ),
            Error::NameTooLong => io::Error::new(
                io::ErrorKind::InvalidData,
                "domain name exceeds the output buffer in presentation format",
            ),
            Error::InvalidEmptyLabel => io::Error::new(
                io::ErrorKind::InvalidInput,
                "invalid empty label in domain name",
            ),
            Error::LabelTooLong => io::Error::new(
                io::ErrorKind::InvalidInput,
                "domain name label exceeds maximum label length",
            ),
            Error::BadEscape => io::Error::new(
                io::ErrorKind::InvalidInput,
                "malformed escape sequence in domain name",
            ),
            Error::Truncated => io::ErrorKind::OutOfMemory.into(),
        }
    }
}
