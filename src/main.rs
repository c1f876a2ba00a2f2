// src/main.rs

use streamexec::pipeline::RunSummary;
use streamexec::{cli, logging, run};

#[tokio::main]
async fn main() {
    let code = match run_main().await {
        Ok(summary) => summary.exit_code(),
        Err(err) => {
            eprintln!("streamexec error: {err:?}");
            1
        }
    };
    // Exit directly: a stdin read may still be parked on a blocking thread.
    std::process::exit(code);
}

async fn run_main() -> anyhow::Result<RunSummary> {
    let args = cli::parse();
    logging::init_logging(args.log_level, args.debug)?;
    run(args).await
}
