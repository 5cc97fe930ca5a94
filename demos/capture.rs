use std::net::TcpStream;
use std::path::PathBuf;
use std::time::Duration;

use clap::Parser;

use rigol_scpi::devices::mso5000::MSO5000;
use rigol_scpi::{SampleFormat, SessionConfig, StreamSession};

/// Raw SCPI socket port on Rigol LAN interfaces
const SCPI_PORT: u16 = 5555;

#[derive(Parser)]
struct Args {
    /// Instrument address
    host: String,

    #[arg(short, long, default_value_t = 1)]
    channel: u8,

    /// BYTE for 8-bit scopes, WORD for higher resolution
    #[arg(short, long, default_value = "BYTE")]
    format: String,

    /// JSON file with a SessionConfig
    #[arg(long)]
    config: Option<PathBuf>,

    #[arg(short, long, default_value = "./capture.json")]
    output: PathBuf,
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    env_logger::init();
    let args = Args::parse();

    let config: SessionConfig = match &args.config {
        Some(path) => serde_json::from_slice(&std::fs::read(path)?)?,
        None       => SessionConfig::default(),
    };
    let format: SampleFormat = args.format.parse()?;

    let stream = TcpStream::connect((args.host.as_str(), SCPI_PORT))?;
    stream.set_read_timeout(Some(Duration::from_secs(5)))?;

    let mut dev = MSO5000::new(StreamSession::with_config(stream, &config)?)?;

    let state = dev.acquisition_state()?;
    println!("{}", state);

    let wf = dev.waveform_normalized(args.channel, format)?;
    if let Some(m) = wf.mismatch() {
        eprintln!("Asked for {} points, got {}", m.requested, m.received);
    }

    let wf_json = serde_json::to_string_pretty(&wf)?;
    std::fs::write(&args.output, wf_json.as_bytes())?;

    Ok(())
}
