use clap::Parser;

use hostsmith::runtime::{boot, cli};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    boot::init_logging();
    let args = cli::Cli::parse();
    let config = boot::boot(&args)?;
    cli::run(&args, config).await
}
