
#[macro_use]
extern crate lazy_static;

// Error taxonomy shared by every layer of the crate
pub mod error;

// The narrow interface to whatever carries SCPI text and bytes to the instrument
pub mod session;

// Decoding of SCPI scientific-notation replies like "3E-3"
pub mod numeric;

// Length-prefixed binary blocks as returned by :WAVeform:DATA? and :DISPlay:DATA?
pub mod block;

// Module for the instruments built on top of the pieces above
pub mod devices;

pub use error::{Result, ScopeError};
pub use block::SampleFormat;
pub use session::{ByteSource, Session, SessionConfig, StreamSession};
