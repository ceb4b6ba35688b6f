use std::error::Error;
use std::fmt;
use std::io;

/// Enumeration of all possible errors that can occur in the inspector
#[derive(Debug)]
pub enum InspectError {
    /// Container parse rejected the file
    Parse(ParseError),
    /// Requested track/sample/frame index out of bounds
    InvalidIndex(InvalidIndexError),
    /// Track has no configured decoder (unsupported codec or not video)
    NoDecoder(NoDecoderError),
    /// Decoder feed/receive failure other than the expected control signals
    Decode(DecodeError),
    /// Hardware transfer or scale/format conversion failed
    Conversion(ConversionError),
    /// File open/read/write failure
    Io(io::Error),
}

/// Container parsing specific errors
#[derive(Debug)]
pub struct ParseError {
    pub message: String,
}

impl ParseError {
    /// Create a new error with the given message.
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

/// Out-of-range track, sample or presentation index
#[derive(Debug)]
pub struct InvalidIndexError {
    pub message: String,
}

impl InvalidIndexError {
    /// Create a new error with the given message.
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

/// Missing decoder for a track
#[derive(Debug)]
pub struct NoDecoderError {
    pub track_index: usize,
}

impl NoDecoderError {
    /// Create a new error for the given track.
    pub fn new(track_index: usize) -> Self {
        Self { track_index }
    }
}

/// Decoder feed/receive specific errors
#[derive(Debug)]
pub struct DecodeError {
    pub message: String,
}

impl DecodeError {
    /// Create a new error with the given message.
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

/// Pixel format conversion specific errors
#[derive(Debug)]
pub struct ConversionError {
    pub message: String,
}

impl ConversionError {
    /// Create a new error with the given message.
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

impl fmt::Display for InspectError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            InspectError::Parse(err) => write!(f, "Parse error: {}", err),
            InspectError::InvalidIndex(err) => write!(f, "Invalid index: {}", err),
            InspectError::NoDecoder(err) => write!(f, "No decoder: {}", err),
            InspectError::Decode(err) => write!(f, "Decode error: {}", err),
            InspectError::Conversion(err) => write!(f, "Conversion error: {}", err),
            InspectError::Io(err) => write!(f, "I/O error: {}", err),
        }
    }
}

impl fmt::Display for ParseError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.message)
    }
}

impl fmt::Display for InvalidIndexError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.message)
    }
}

impl fmt::Display for NoDecoderError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "no decoder configured for track {}", self.track_index)
    }
}

impl fmt::Display for DecodeError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.message)
    }
}

impl fmt::Display for ConversionError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.message)
    }
}

impl Error for InspectError {}
impl Error for ParseError {}
impl Error for InvalidIndexError {}
impl Error for NoDecoderError {}
impl Error for DecodeError {}
impl Error for ConversionError {}

// Conversion implementations
impl From<io::Error> for InspectError {
    fn from(err: io::Error) -> Self {
        InspectError::Io(err)
    }
}

impl From<ParseError> for InspectError {
    fn from(err: ParseError) -> Self {
        InspectError::Parse(err)
    }
}

impl From<InvalidIndexError> for InspectError {
    fn from(err: InvalidIndexError) -> Self {
        InspectError::InvalidIndex(err)
    }
}

impl From<NoDecoderError> for InspectError {
    fn from(err: NoDecoderError) -> Self {
        InspectError::NoDecoder(err)
    }
}

impl From<DecodeError> for InspectError {
    fn from(err: DecodeError) -> Self {
        InspectError::Decode(err)
    }
}

impl From<ConversionError> for InspectError {
    fn from(err: ConversionError) -> Self {
        InspectError::Conversion(err)
    }
}

// Conversion to io::Error for callers that funnel everything through io
impl From<InspectError> for io::Error {
    fn from(err: InspectError) -> Self {
        io::Error::other(err)
    }
}

impl InspectError {
    /// Shorthand for a parse error with a formatted message.
    pub fn parse(message: impl Into<String>) -> Self {
        InspectError::Parse(ParseError::new(message))
    }

    /// Shorthand for an invalid index error.
    pub fn invalid_index(message: impl Into<String>) -> Self {
        InspectError::InvalidIndex(InvalidIndexError::new(message))
    }

    /// Shorthand for a decode error.
    pub fn decode(message: impl Into<String>) -> Self {
        InspectError::Decode(DecodeError::new(message))
    }

    /// Shorthand for a conversion error.
    pub fn conversion(message: impl Into<String>) -> Self {
        InspectError::Conversion(ConversionError::new(message))
    }
}

// Type alias for Result with InspectError
pub type InspectResult<T> = Result<T, InspectError>;
