
use std::io;

pub type Result<T> = std::result::Result<T, ScopeError>;

#[derive(Debug, thiserror::Error)]
pub enum ScopeError {
    #[error("Unable to decode {0:?} as a SCPI numeric value")]
    MalformedNumericToken(String),

    #[error("Expected an ASCII decimal digit in block header but got 0x{0:02x}")]
    InvalidHeaderLengthDigit(u8),

    #[error("Invalid sample format {0:?}, expected BYTE or WORD")]
    InvalidSampleFormat(String),

    #[error("Transport write failed: {0}")]
    TransportWriteFailure(#[source] io::Error),

    #[error("Transport read failed: {0}")]
    TransportReadFailure(#[source] io::Error),

    #[error("MSO5000 only has four analog channels, got {0}")]
    InvalidChannel(u8),

    #[error("Invalid memory depth {0:?}, expected one of AUTO|1k|10k|100k|1M|10M|25M|50M|100M|200M")]
    InvalidMemoryDepth(String),

    #[error("Grid brightness must be within 1..=100, got {0}")]
    InvalidBrightness(u8),

    #[error("Invalid session config: {0}")]
    InvalidConfig(String),

    #[error("Unexpected response from instrument: {0}")]
    UnexpectedResponse(String),
}
