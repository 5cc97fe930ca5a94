
use std::fmt;
use std::str::FromStr;

use serde::{Serialize, Deserialize};

use crate::error::{Result, ScopeError};
use crate::numeric;
use crate::session::Session;

pub const SCALE_QUERY: &str        = ":TIMebase:MAIN:SCALe?";
pub const SAMPLE_RATE_QUERY: &str  = ":ACQuire:SRATe?";
pub const MEMORY_DEPTH_QUERY: &str = ":ACQuire:MDEPth?";
pub const OFFSET_QUERY: &str       = ":TIMebase:MAIN:OFFSet?";

/// Horizontal settings as last read from the instrument, plus the sample positions derived from them.
///
/// A snapshot: nothing updates it once built. Changes made on the front panel or by another client are only seen
/// by building a new one.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct AcquisitionState {
	/// Seconds per division
	pub scale: f64,
	/// Samples per second
	pub sample_rate: f64,
	/// Samples in acquisition memory
	pub memory_depth: f64,
	/// Seconds
	pub offset_time: f64,
	pub offset_samples: f64,
	/// Samples from the start of memory to the center of the screen
	pub center_position_samples: f64,
	pub samples_per_division: f64,
	/// Samples from the start of memory to the trigger
	pub trigger_position_samples: f64,
}

impl AcquisitionState {

	pub fn derive(scale: f64, sample_rate: f64, memory_depth: f64, offset_time: f64) -> Self {
		let offset_samples = sample_rate * offset_time;
		let center_position_samples = memory_depth / 2.0 + offset_samples;
		let samples_per_division = scale * sample_rate;
		// The offset term cancels, so this is always memory_depth / 2
		let trigger_position_samples = center_position_samples - offset_samples;

		Self {
			scale, sample_rate, memory_depth, offset_time,
			offset_samples, center_position_samples, samples_per_division, trigger_position_samples,
		}
	}

	pub fn from_replies(scale: &str, sample_rate: &str, memory_depth: &str, offset_time: &str) -> Result<Self> {
		Ok(Self::derive(
			numeric::decode(scale)?,
			numeric::decode(sample_rate)?,
			numeric::decode(memory_depth)?,
			numeric::decode(offset_time)?,
		))
	}
}

impl fmt::Display for AcquisitionState {
	fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
		writeln!(f, "main_scale {}", self.scale)?;
		writeln!(f, "sample_rate {}", self.sample_rate)?;
		writeln!(f, "memdepth {}", self.memory_depth)?;
		writeln!(f, "main_offset_time {}", self.offset_time)?;
		writeln!(f, "main_offset_point {}", self.offset_samples)?;
		writeln!(f, "main_position_point {}", self.center_position_samples)?;
		writeln!(f, "points_in_cell {}", self.samples_per_division)?;
		write!(f, "trig_position_point {}", self.trigger_position_samples)
	}
}

/// Query the four horizontal settings and build a fresh snapshot from them.
pub fn refresh<S: Session + ?Sized>(session: &mut S) -> Result<AcquisitionState> {
	let scale        = session.query_text(SCALE_QUERY)?;
	let sample_rate  = session.query_text(SAMPLE_RATE_QUERY)?;
	let memory_depth = session.query_text(MEMORY_DEPTH_QUERY)?;
	let offset_time  = session.query_text(OFFSET_QUERY)?;

	AcquisitionState::from_replies(&scale, &sample_rate, &memory_depth, &offset_time)
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum MemoryDepth { Auto, K1, K10, K100, M1, M10, M25, M50, M100, M200 }

impl MemoryDepth {
	pub fn as_str(&self) -> &'static str {
		match self {
			MemoryDepth::Auto => "AUTO",
			MemoryDepth::K1   => "1k",
			MemoryDepth::K10  => "10k",
			MemoryDepth::K100 => "100k",
			MemoryDepth::M1   => "1M",
			MemoryDepth::M10  => "10M",
			MemoryDepth::M25  => "25M",
			MemoryDepth::M50  => "50M",
			MemoryDepth::M100 => "100M",
			MemoryDepth::M200 => "200M",
		}
	}
}

impl FromStr for MemoryDepth {
	type Err = ScopeError;

	fn from_str(s: &str) -> Result<Self> {
		match s {
			"AUTO" => Ok(MemoryDepth::Auto),
			"1k"   => Ok(MemoryDepth::K1),
			"10k"  => Ok(MemoryDepth::K10),
			"100k" => Ok(MemoryDepth::K100),
			"1M"   => Ok(MemoryDepth::M1),
			"10M"  => Ok(MemoryDepth::M10),
			"25M"  => Ok(MemoryDepth::M25),
			"50M"  => Ok(MemoryDepth::M50),
			"100M" => Ok(MemoryDepth::M100),
			"200M" => Ok(MemoryDepth::M200),
			_      => Err(ScopeError::InvalidMemoryDepth(s.to_owned())),
		}
	}
}

impl fmt::Display for MemoryDepth {
	fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result { f.write_str(self.as_str()) }
}
