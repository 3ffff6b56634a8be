//! Minimal serial terminal over a `SerialSession`.
//!
//! Lists detected ports with `--list`; otherwise opens the named (or first)
//! port, prints whatever arrives, and sends each stdin line followed by CRLF.

use clap::Parser;
use serial_session::{BaudRate, SerialSession, SessionConfig};
use std::io::{BufRead, Write};
use tracing_subscriber::EnvFilter;

#[derive(Parser, Debug)]
#[command(
    name = "serial-monitor",
    about = "Open a serial port, echo received bytes, and send stdin lines."
)]
struct Args {
    /// Port to open; defaults to the first detected port.
    port: Option<String>,

    /// Baud rate, one of the allowed set.
    #[arg(short, long, default_value_t = 115_200)]
    baud: u32,

    /// List detected ports and exit.
    #[arg(short, long)]
    list: bool,
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let args = Args::parse();
    let mut session = SerialSession::new();

    if args.list {
        let ports = session.refresh_ports();
        if ports.is_empty() {
            println!("no serial ports detected");
        } else {
            for port in ports {
                println!("{port}");
            }
        }
        return Ok(());
    }

    let config = SessionConfig {
        baud_rate: BaudRate::try_from(args.baud)?,
        ..Default::default()
    };

    session.subscribe(|bytes| {
        let mut stdout = std::io::stdout().lock();
        let _ = write!(stdout, "{}", String::from_utf8_lossy(bytes));
        let _ = stdout.flush();
    })?;

    session.open(args.port.as_deref(), config)?;
    println!(
        "opened {} at {} baud (ctrl-d to exit)",
        session.port_name().unwrap_or("<unknown>"),
        config.baud_rate.value()
    );

    let stdin = std::io::stdin();
    for line in stdin.lock().lines() {
        let mut data = line?.into_bytes();
        data.extend_from_slice(b"\r\n");
        session.send(&data)?;
    }

    session.close()?;
    Ok(())
}
