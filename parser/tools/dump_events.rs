use std::{env, fs, process::ExitCode};

use gamble_parser::{EventKind, Parser, ScanError};
use tracing_subscriber::EnvFilter;

/// Print every event of `yaml`, stopping at the end of the stream.
fn dump_events(yaml: &[u8]) -> Result<usize, ScanError> {
    let mut parser = Parser::new(yaml);
    let mut count = 0;
    loop {
        let event = parser.next_event()?;
        let kind = event.event_kind();
        let span = event.span();
        match (event.scalar_style(), event.scalar_text()) {
            (Ok(style), Ok(text)) => println!(
                "{:>4}:{:<3} {kind} {style:?} {:?}",
                span.start.line(),
                span.start.col(),
                String::from_utf8_lossy(text)
            ),
            _ => println!("{:>4}:{:<3} {kind}", span.start.line(), span.start.col()),
        }
        count += 1;
        if matches!(kind, EventKind::StreamEnd | EventKind::Nothing) {
            return Ok(count);
        }
    }
}

fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let Some(path) = env::args().nth(1) else {
        eprintln!("usage: dump_events <file>");
        return ExitCode::FAILURE;
    };
    let yaml = match fs::read(&path) {
        Ok(yaml) => yaml,
        Err(error) => {
            tracing::error!(%path, %error, "cannot read input");
            return ExitCode::FAILURE;
        }
    };

    match dump_events(&yaml) {
        Ok(count) => {
            tracing::info!(%path, count, "done");
            ExitCode::SUCCESS
        }
        Err(error) => {
            tracing::error!(%path, %error, "invalid YAML");
            ExitCode::FAILURE
        }
    }
}
