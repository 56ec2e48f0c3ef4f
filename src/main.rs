use anyhow::Result;
use clap::Parser;
use proxy_validator::{Pipeline, ValidationError, ValidatorConfig};
use std::path::PathBuf;

/// Check a list of HTTP proxies and keep the anonymous ones
#[derive(Parser)]
#[command(name = "proxy-validator", version)]
struct Cli {
    /// File with one host:port proxy per line
    input: PathBuf,
}

fn report(candidate: &str, outcome: &Result<(), ValidationError>) {
    match outcome {
        Ok(()) => println!("Proxy {} passed", candidate),
        Err(e) => eprintln!("{}: {}", candidate, e),
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    env_logger::Builder::from_env(
        env_logger::Env::default().default_filter_or("proxy_validator=info"),
    )
    .init();

    let cli = Cli::parse();
    let pipeline = Pipeline::new(ValidatorConfig::default());
    let summary = pipeline.run(&cli.input, report).await?;

    println!(
        "{} proxies written to {}",
        summary.written,
        summary.output.display()
    );
    Ok(())
}
