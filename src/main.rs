use clap::Parser;
use stability_studio::{cli::Cli, logger};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();
    logger::init_with_config(cli.logger_config())?;

    match cli.run().await {
        Ok(output) => println!("{}", output),
        Err(e) => {
            log::error!("❌ {}", e);
            std::process::exit(1);
        }
    }

    Ok(())
}
