//! YP Bank MT940 SEK→EUR - CLI tool for converting statement currency.

use clap::Parser;
use std::fs;
use std::path::PathBuf;
use std::time::Duration;
use ypbank_mt940_sek2eur::{
    rates::DEFAULT_TIMEOUT_SECS,
    rewriter::{convert, count_transactions, default_output_path},
    ApiConfig, Error, ExchangeRateApi, Result,
};

#[derive(Parser)]
#[command(name = "ypbank_mt940_sek2eur")]
#[command(version, about = "Convert an MT940 statement from SEK to EUR using historical rates", long_about = None)]
struct Cli {
    /// Path to the MT940 statement
    path: PathBuf,

    /// Only print the number of transactions in the statement
    #[arg(long)]
    count: bool,

    /// Output file path (default: converted_<name> next to the input)
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Exchange-rate API key
    #[arg(long, env = "EXCHANGE_API_KEY", hide_env_values = true)]
    api_key: Option<String>,

    /// Exchange-rate API base URL
    #[arg(long, env = "EXCHANGE_API_URL")]
    api_url: Option<String>,

    /// HTTP timeout for each rate lookup, in seconds
    #[arg(long, default_value_t = DEFAULT_TIMEOUT_SECS)]
    timeout_secs: u64,

    /// Don't print the original and converted contents
    #[arg(short, long)]
    quiet: bool,
}

fn main() {
    // Must run before clap reads EXCHANGE_API_KEY from the environment
    dotenvy::dotenv().ok();
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn")).init();

    if let Err(e) = run() {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
}

fn run() -> Result<()> {
    let cli = Cli::parse();

    if cli.count {
        let count = count_transactions(&cli.path)?;
        println!("The number of transactions in the statement: {}", count);
        return Ok(());
    }

    let api_key = cli
        .api_key
        .ok_or_else(|| Error::Config("EXCHANGE_API_KEY is not set".to_string()))?;
    let mut config = ApiConfig::new(api_key).with_timeout(Duration::from_secs(cli.timeout_secs));
    if let Some(url) = cli.api_url {
        config = config.with_base_url(url);
    }
    let api = ExchangeRateApi::new(config)?;

    let output = match cli.output {
        Some(path) => path,
        None => default_output_path(&cli.path)?,
    };

    convert(&cli.path, &output, &api)?;
    println!("Converted file saved to {}", output.display());

    if !cli.quiet {
        println!("\nOriginal File Content:");
        println!("{}", fs::read_to_string(&cli.path)?);

        println!("\nConverted File Content:");
        println!("{}", fs::read_to_string(&output)?);
    }

    Ok(())
}
