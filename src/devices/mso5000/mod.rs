
use regex::Regex;
use serde::{Serialize, Deserialize};

use crate::block::{self, SampleFormat};
use crate::error::{Result, ScopeError};
use crate::session::Session;

lazy_static! {
	static ref IDN_RE: Regex = Regex::new("([^,]+),([^,]+),([^,]+),([^,\\s]+)").unwrap();
}

pub mod acquisition;
pub mod waveform;

pub use acquisition::{AcquisitionState, MemoryDepth};
pub use waveform::{Waveform, WaveformRequest, PointCountMismatch, NORMALIZED_POINTS};

pub const CHANNEL_COUNT: u8 = 4;

pub struct MSO5000<S: Session> {
	session: S,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Identity {
	pub manufacturer: String,
	pub model: String,
	pub serial_num: String,
	pub fw_version: String,
}

impl Identity {
	pub fn parse(idn: &str) -> Result<Self> {
		let caps = IDN_RE.captures(idn.trim())
			.ok_or_else(|| ScopeError::UnexpectedResponse(format!("Unable to parse *IDN? reply {:?}", idn)))?;
		let field = |i: usize| caps.get(i).map(|m| m.as_str().trim().to_owned()).unwrap_or_default();

		Ok(Self{ manufacturer: field(1), model: field(2), serial_num: field(3), fw_version: field(4) })
	}
}

fn chan_ok(n: u8) -> Result<()> {
	if n < 1 || n > CHANNEL_COUNT { Err(ScopeError::InvalidChannel(n)) }
	else { Ok(()) }
}

fn drive_path(drive: &str, name: &str, ext: &str) -> String { format!("{}:\\{}.{}", drive, name, ext) }

impl<S: Session> MSO5000<S> {

	pub fn new(session: S) -> Result<Self> {
		let mut dev = Self{ session };

		let idn = dev.identity()?;
		if !idn.manufacturer.to_uppercase().contains("RIGOL") {
			return Err(ScopeError::UnexpectedResponse(
				format!("Successfully connected to a {} {} but it doesn't appear to be a Rigol scope", idn.manufacturer, idn.model)));
		}
		log::info!("Connected to {} {} (serial {}, firmware {})", idn.manufacturer, idn.model, idn.serial_num, idn.fw_version);

		Ok(dev)
	}

	pub fn into_inner(self) -> S { self.session }

	pub fn identity(&mut self) -> Result<Identity> {
		let idn = self.session.query_text("*IDN?")?;
		Identity::parse(&idn)
	}

	pub fn acquisition_state(&mut self) -> Result<AcquisitionState> { acquisition::refresh(&mut self.session) }

	// Each of these reads the full state again
	pub fn main_scale(&mut self)           -> Result<f64> { Ok(self.acquisition_state()?.scale) }
	pub fn sample_rate(&mut self)          -> Result<f64> { Ok(self.acquisition_state()?.sample_rate) }
	pub fn memory_depth(&mut self)         -> Result<f64> { Ok(self.acquisition_state()?.memory_depth) }
	pub fn main_offset(&mut self)          -> Result<f64> { Ok(self.acquisition_state()?.offset_samples) }
	pub fn main_position(&mut self)        -> Result<f64> { Ok(self.acquisition_state()?.center_position_samples) }
	pub fn samples_per_division(&mut self) -> Result<f64> { Ok(self.acquisition_state()?.samples_per_division) }
	pub fn trigger_position(&mut self)     -> Result<f64> { Ok(self.acquisition_state()?.trigger_position_samples) }

	/// Set the horizontal scale in seconds per division, e.g. 0.003 for 3 ms.
	pub fn set_main_scale(&mut self, time_s: f64) -> Result<AcquisitionState> {
		self.session.write_command(&format!(":TIMebase:MAIN:SCALe {}", time_s))?;
		self.acquisition_state()
	}

	/// Set the horizontal offset in seconds.
	pub fn set_main_offset(&mut self, time_s: f64) -> Result<AcquisitionState> {
		self.session.write_command(&format!(":TIMebase:MAIN:OFFSet {}", time_s))?;
		self.acquisition_state()
	}

	pub fn set_memory_depth(&mut self, depth: MemoryDepth) -> Result<AcquisitionState> {
		self.session.write_command(&format!(":ACQuire:MDEPth {}", depth.as_str()))?;
		self.acquisition_state()
	}

	/// Read the 1000 points currently on screen.
	pub fn waveform_normalized(&mut self, chan_num: u8, format: SampleFormat) -> Result<Waveform> {
		chan_ok(chan_num)?;
		waveform::acquire(&mut self.session, &WaveformRequest::normalized(chan_num, format))
	}

	/// Read `points` samples from acquisition memory starting at `start`. Neither is checked against the current
	/// memory depth; the instrument clips the window and the mismatch shows up on the returned waveform.
	pub fn waveform_raw(&mut self, chan_num: u8, start: usize, points: usize, format: SampleFormat) -> Result<Waveform> {
		chan_ok(chan_num)?;
		waveform::acquire(&mut self.session, &WaveformRequest::raw(chan_num, start, points, format))
	}

	/// Save a screenshot to the instrument's drive and return the save status.
	pub fn save_screen(&mut self, drive: &str, name: &str) -> Result<String> {
		self.session.write_command(&format!(":SAVE:IMAGe {}", drive_path(drive, name, "png")))?;
		self.session.query_text(":SAVE:STATus?")
	}

	/// Download the screen image. The bytes are handed back as sent, without decoding.
	pub fn download_screen(&mut self) -> Result<Vec<u8>> {
		self.session.write_command(":DISPlay:DATA?")?;
		let image = block::read_block(&mut self.session)?;
		self.session.discard_terminator()?;
		Ok(image)
	}

	pub fn save_setup(&mut self, drive: &str, name: &str) -> Result<String> {
		self.session.write_command(&format!(":SAVE:SETup {}", drive_path(drive, name, "stp")))?;
		self.session.query_text(":SAVE:STATus?")
	}

	pub fn load_setup(&mut self, drive: &str, name: &str) -> Result<()> {
		self.session.write_command(&format!(":LOAD:SETup {}", drive_path(drive, name, "stp")))
	}

	pub fn set_grid_brightness(&mut self, level: u8) -> Result<()> {
		if level < 1 || level > 100 {
			return Err(ScopeError::InvalidBrightness(level));
		}
		self.session.write_command(&format!(":DISPlay:GBRightness {}", level))
	}

	// One-liners
	pub fn single(&mut self) -> Result<()> { self.session.write_command(":SINGle") }
}
