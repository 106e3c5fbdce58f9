use anyhow::Result;
use clap::Parser;
use hotel_scraper::cli::{is_missing_location, Cli, USAGE};
use hotel_scraper::{get_real_images, BookingScraper};
use std::io;

fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let cli = match Cli::try_parse() {
        Ok(cli) => cli,
        Err(err) if is_missing_location(&err) => {
            println!("{}", USAGE);
            std::process::exit(1);
        }
        Err(err) => err.exit(),
    };

    let scraper = BookingScraper::new()?;
    get_real_images(
        &scraper,
        &cli.location,
        cli.max_results,
        cli.interactive(),
        &cli.output_dir,
        &mut io::stdout(),
    )?;

    Ok(())
}
