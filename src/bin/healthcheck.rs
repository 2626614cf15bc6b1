use clap::Parser;
use std::error::Error as _;
use std::time::Duration;

use bot_host::http::check::{check_status, exit_code};

#[derive(Parser)]
#[command(name = "healthcheck")]
#[command(about = "Check a running bot-host status endpoint", long_about = None)]
struct Cli {
    #[arg(short, long, default_value = "http://127.0.0.1:8080/")]
    url: String,

    /// Give up after this many seconds.
    #[arg(short, long, default_value_t = 5)]
    timeout_secs: u64,
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    let result = check_status(&cli.url, Duration::from_secs(cli.timeout_secs)).await;
    match &result {
        Ok(status) => println!("{}", status.status),
        Err(e) => match e.source() {
            Some(cause) => eprintln!("Error: {}: {}", e, cause),
            None => eprintln!("Error: {}", e),
        },
    }

    std::process::exit(exit_code(&result));
}
