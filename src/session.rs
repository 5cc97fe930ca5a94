
use std::io::{self, BufRead, BufReader, ErrorKind, Read, Write};
use std::str;
use std::thread;
use std::time::Duration;

use serde::{Serialize, Deserialize};

use crate::error::{Result, ScopeError};

pub const DEFAULT_TX_THROTTLE_DURATION_SEC: f32 = 0.0;
pub const DEFAULT_TERMINATOR: u8 = b'\n';

/// A blocking source that hands out exactly the number of bytes asked for, or fails.
pub trait ByteSource {
    fn read_bytes(&mut self, count: usize) -> Result<Vec<u8>>;
}

/// Everything the instrument drivers need from a connection.
///
/// One session talks to one instrument. A binary block read must not be interleaved with another command, so
/// callers sharing a session across threads have to hold a lock around each full command/response exchange.
pub trait Session: ByteSource {
    fn write_command(&mut self, cmd: &str) -> Result<()>;
    fn query_text(&mut self, cmd: &str) -> Result<String>;

    /// Consume whatever terminates a message after a binary block.
    fn discard_terminator(&mut self) -> Result<()> { Ok(()) }
}

impl ByteSource for &[u8] {
    fn read_bytes(&mut self, count: usize) -> Result<Vec<u8>> {
        if self.len() < count {
            return Err(ScopeError::TransportReadFailure(io::Error::new(ErrorKind::UnexpectedEof,
                format!("Asked for {} bytes but only {} remain", count, self.len()))));
        }
        let (head, tail) = self.split_at(count);
        *self = tail;
        Ok(head.to_vec())
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SessionConfig {
    pub tx_throttle_sec: f32,
    pub terminator: u8,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self { tx_throttle_sec: DEFAULT_TX_THROTTLE_DURATION_SEC, terminator: DEFAULT_TERMINATOR }
    }
}

/// SCPI over any byte stream: a socket on the raw SCPI port, a serial port, a USBTMC device file.
///
/// The stream has to be connected already; timeouts belong to the stream as well.
pub struct StreamSession<S: Read + Write> {
    stream: BufReader<S>,
    tx_throttle_duration: Duration,
    terminator: u8,
}

impl<S: Read + Write> StreamSession<S> {

    pub fn new(stream: S) -> Self {
        Self { stream: BufReader::new(stream), tx_throttle_duration: Duration::ZERO, terminator: DEFAULT_TERMINATOR }
    }

    /// Fails with `InvalidConfig` when the throttle is negative, NaN or too large for a `Duration`.
    pub fn with_config(stream: S, config: &SessionConfig) -> Result<Self> {
        let tx_throttle_duration = Duration::try_from_secs_f32(config.tx_throttle_sec)
            .map_err(|e| ScopeError::InvalidConfig(format!("tx_throttle_sec {}: {}", config.tx_throttle_sec, e)))?;

        Ok(Self { stream: BufReader::new(stream), tx_throttle_duration, terminator: config.terminator })
    }

    pub fn into_inner(self) -> S { self.stream.into_inner() }

    fn read_line(&mut self) -> Result<Vec<u8>> {
        let mut line: Vec<u8> = vec![];
        let n = self.stream.read_until(self.terminator, &mut line).map_err(ScopeError::TransportReadFailure)?;
        if n == 0 {
            return Err(ScopeError::TransportReadFailure(io::Error::new(ErrorKind::UnexpectedEof, "Stream closed while waiting for a reply")));
        }
        Ok(line)
    }
}

impl<S: Read + Write> ByteSource for StreamSession<S> {
    fn read_bytes(&mut self, count: usize) -> Result<Vec<u8>> {
        let mut buf = vec![0u8; count];
        self.stream.read_exact(&mut buf).map_err(ScopeError::TransportReadFailure)?;
        Ok(buf)
    }
}

impl<S: Read + Write> Session for StreamSession<S> {

    fn write_command(&mut self, cmd: &str) -> Result<()> {
        if !self.tx_throttle_duration.is_zero() {
            thread::sleep(self.tx_throttle_duration);
        }
        log::debug!("-> {}", cmd);

        let mut msg: Vec<u8> = Vec::with_capacity(cmd.len() + 1);
        msg.extend_from_slice(cmd.as_bytes());
        msg.push(b'\n');

        let stream = self.stream.get_mut();
        stream.write_all(&msg).map_err(ScopeError::TransportWriteFailure)?;
        stream.flush().map_err(ScopeError::TransportWriteFailure)
    }

    fn query_text(&mut self, cmd: &str) -> Result<String> {
        self.write_command(cmd)?;
        let line = self.read_line()?;
        let reply = str::from_utf8(&line)
            .map_err(|_| ScopeError::UnexpectedResponse(format!("Reply to {} is not valid UTF-8", cmd)))?
            .trim()
            .to_owned();
        log::debug!("<- {}", reply);
        Ok(reply)
    }

    fn discard_terminator(&mut self) -> Result<()> { self.read_line().map(|_| ()) }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;

    struct Loopback {
        input: Cursor<Vec<u8>>,
        output: Vec<u8>,
    }

    impl Loopback {
        fn new(input: &[u8]) -> Self { Self { input: Cursor::new(input.to_vec()), output: vec![] } }
    }

    impl Read for Loopback {
        fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> { self.input.read(buf) }
    }

    impl Write for Loopback {
        fn write(&mut self, buf: &[u8]) -> io::Result<usize> { self.output.write(buf) }
        fn flush(&mut self) -> io::Result<()> { Ok(()) }
    }

    #[test]
    fn test_slice_source() {
        let data: &[u8] = b"#41000";
        let mut src = data;
        assert_eq!(src.read_bytes(1).unwrap(), b"#".to_vec());
        assert_eq!(src.read_bytes(0).unwrap(), Vec::<u8>::new());
        assert_eq!(src.read_bytes(5).unwrap(), b"41000".to_vec());
        assert!(matches!(src.read_bytes(1), Err(ScopeError::TransportReadFailure(_))));
    }

    #[test]
    fn test_query_and_block_share_the_stream() {
        let mut session = StreamSession::new(Loopback::new(b"1.0E-3\n#13abc\n5E2\n"));

        assert_eq!(session.query_text(":TIMebase:MAIN:SCALe?").unwrap(), "1.0E-3");
        assert_eq!(session.read_bytes(3).unwrap(), b"#13".to_vec());
        assert_eq!(session.read_bytes(3).unwrap(), b"abc".to_vec());
        session.discard_terminator().unwrap();
        assert_eq!(session.query_text(":ACQuire:SRATe?").unwrap(), "5E2");

        let written = session.into_inner().output;
        assert_eq!(written, b":TIMebase:MAIN:SCALe?\n:ACQuire:SRATe?\n".to_vec());
    }

    #[test]
    fn test_closed_stream_is_a_read_failure() {
        let mut session = StreamSession::new(Loopback::new(b""));
        assert!(matches!(session.query_text("*IDN?"), Err(ScopeError::TransportReadFailure(_))));
        assert!(matches!(session.read_bytes(1), Err(ScopeError::TransportReadFailure(_))));
    }

    #[test]
    fn test_config_throttle_bounds() {
        for bad in &[f32::INFINITY, f32::NAN, -1.0] {
            let config = SessionConfig { tx_throttle_sec: *bad, ..SessionConfig::default() };
            assert!(matches!(StreamSession::with_config(Loopback::new(b""), &config), Err(ScopeError::InvalidConfig(_))));
        }

        let config = SessionConfig { tx_throttle_sec: 0.001, terminator: b'\r' };
        let mut session = StreamSession::with_config(Loopback::new(b"5E2\r"), &config).unwrap();
        assert_eq!(session.query_text(":ACQuire:SRATe?").unwrap(), "5E2");
    }

    #[test]
    fn test_config_defaults() {
        let config = SessionConfig::default();
        assert_eq!(config.terminator, b'\n');
        assert_eq!(config.tx_throttle_sec, 0.0);
    }
}
