//! idbench - AUTO_INCREMENT vs UUID primary-key benchmark.

use clap::Parser;

use idbench::{format_results, format_summary, run_session, summarize, Args};

#[tokio::main(flavor = "current_thread")]
async fn main() {
    // Logs go to stderr; stdout carries only the results.
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "idbench=info".into()),
        )
        .init();

    let config = Args::parse().into_config();

    match run_session(&config).await {
        Ok(results) => {
            println!("{}", format_results(&results));
            if config.summary {
                println!("{}", format_summary(&summarize(&results)));
            }
        }
        Err(e) => {
            eprintln!("Error: {}", e);
            std::process::exit(1);
        }
    }
}
