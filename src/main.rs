use clap::Parser;
use log::debug;

use h2probe::cli::{normalize_args, Args};
use h2probe::types::{write_envelope, BodyReader, ProbeError, ResponseEnvelope};
use h2probe::{execute, logger, Transport};

async fn run(args: Args) -> Result<(), ProbeError> {
    let config = args.into_config()?;
    let transport = Transport::new(&config.url, config.skip_verify, config.protocol);

    let body: Option<BodyReader> = if config.post {
        Some(Box::new(tokio::io::stdin()))
    } else {
        None
    };

    let response = execute(&config, &transport, body).await?;
    let envelope = ResponseEnvelope::from_response(&response);
    write_envelope(&mut std::io::stdout().lock(), &envelope)
}

fn main() {
    let args = Args::parse_from(normalize_args(std::env::args()));
    logger::init_logger(args.verbose);

    let runtime = match tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()
    {
        Ok(runtime) => runtime,
        Err(err) => {
            eprintln!("error: failed to start runtime: {}", err);
            std::process::exit(1);
        }
    };

    let result = runtime.block_on(run(args));
    // A streamed stdin read may still be parked on the blocking pool when the
    // peer answered early; do not wait for it.
    runtime.shutdown_background();

    if let Err(err) = result {
        debug!("request failed: {:?}", err);
        eprintln!("error: {}", err);
        std::process::exit(1);
    }
    std::process::exit(0);
}
