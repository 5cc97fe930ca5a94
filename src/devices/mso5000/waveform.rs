
use serde::{Serialize, Deserialize};

use crate::block::{self, SampleFormat};
use crate::error::Result;
use crate::session::Session;

/// Points returned by a normalized (screen) read.
pub const NORMALIZED_POINTS: usize = 1000;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum WaveformMode { Normal, Raw }

impl WaveformMode {
	pub fn as_str(&self) -> &'static str {
		match self {
			WaveformMode::Normal => "NORM",
			WaveformMode::Raw    => "RAW",
		}
	}
}

/// What was asked of :WAVeform:DATA?.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WaveformRequest {
	pub channel: u8,
	pub mode: WaveformMode,
	pub format: SampleFormat,
	/// Only sent in raw mode
	pub start: Option<usize>,
	pub points: usize,
}

impl WaveformRequest {

	pub fn normalized(channel: u8, format: SampleFormat) -> Self {
		Self { channel, mode: WaveformMode::Normal, format, start: None, points: NORMALIZED_POINTS }
	}

	pub fn raw(channel: u8, start: usize, points: usize, format: SampleFormat) -> Self {
		Self { channel, mode: WaveformMode::Raw, format, start: Some(start), points }
	}

	pub fn commands(&self) -> Vec<String> {
		let mut ans: Vec<String> = vec![
			format!(":WAVeform:SOURce CHAN{}", self.channel),
			format!(":WAV:MODE {}", self.mode.as_str()),
			format!(":WAVeform:FORMat {}", self.format.as_str()),
		];
		if let Some(start) = self.start {
			ans.push(format!(":WAVeform:STARt {}", start));
		}
		ans.push(format!(":WAVeform:POINts {}", self.points));
		ans
	}
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PointCountMismatch {
	pub requested: usize,
	pub received: usize,
}

/// Decoded samples in acquisition order, with the number received and the number asked for.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Waveform {
	pub samples: Vec<u16>,
	pub points: usize,
	pub requested: usize,
	pub format: SampleFormat,
}

impl Waveform {
	/// The instrument may return fewer or more points than requested, e.g. near the ends of memory.
	pub fn mismatch(&self) -> Option<PointCountMismatch> {
		if self.points == self.requested { None }
		else { Some(PointCountMismatch{ requested: self.requested, received: self.points }) }
	}
}

/// Send the setup for `req`, trigger :WAVeform:DATA? and decode the block that comes back.
pub fn acquire<S: Session + ?Sized>(session: &mut S, req: &WaveformRequest) -> Result<Waveform> {
	for cmd in req.commands() {
		session.write_command(&cmd)?;
	}
	session.write_command(":WAVeform:DATA?")?;

	let (samples, points) = block::read_waveform_block(session, req.format)?;
	session.discard_terminator()?;

	let wf = Waveform { samples, points, requested: req.points, format: req.format };
	if let Some(m) = wf.mismatch() {
		log::warn!("Expected {} points from CHAN{}, given {}", m.requested, req.channel, m.received);
	}

	Ok(wf)
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn test_normalized_commands() {
		let cmds = WaveformRequest::normalized(1, SampleFormat::Byte).commands();
		assert_eq!(cmds, vec![
			":WAVeform:SOURce CHAN1",
			":WAV:MODE NORM",
			":WAVeform:FORMat BYTE",
			":WAVeform:POINts 1000",
		]);
	}

	#[test]
	fn test_raw_commands() {
		let cmds = WaveformRequest::raw(3, 250, 5_000_000, SampleFormat::Word).commands();
		assert_eq!(cmds, vec![
			":WAVeform:SOURce CHAN3",
			":WAV:MODE RAW",
			":WAVeform:FORMat WORD",
			":WAVeform:STARt 250",
			":WAVeform:POINts 5000000",
		]);
	}

	#[test]
	fn test_mismatch() {
		let mut wf = Waveform { samples: vec![0; 998], points: 998, requested: 1000, format: SampleFormat::Byte };
		assert_eq!(wf.mismatch(), Some(PointCountMismatch{ requested: 1000, received: 998 }));

		wf.requested = 998;
		assert_eq!(wf.mismatch(), None);
	}
}
