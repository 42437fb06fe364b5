use std::process::ExitCode;

use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::EnvFilter;

fn main() -> ExitCode {
    let args = cvt_conformance::cli::parse_args();

    let filter = EnvFilter::try_new(args.log_level()).unwrap_or_else(|_| EnvFilter::new("warn"));
    // Logs go to stderr so JSON on stdout stays parseable. The `tracing-log` bridge picks up
    // the `log` records emitted by the library crates.
    tracing_subscriber::registry()
        .with(filter)
        .with(
            tracing_subscriber::fmt::layer()
                .with_target(false)
                .with_writer(std::io::stderr),
        )
        .init();

    match cvt_conformance::cli::run_with_args(args) {
        Ok(true) => ExitCode::SUCCESS,
        Ok(false) => ExitCode::from(1),
        Err(err) => {
            eprintln!("error: {err:#}");
            ExitCode::from(2)
        }
    }
}
