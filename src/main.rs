use clap::Parser;
use dltins_etl::{Config, Pipeline, RunOutcome};
use std::path::PathBuf;

#[derive(Parser)]
#[command(
    name = "dltins-etl",
    version,
    about = "Fetch the latest FIRDS delta archive and flatten it to CSV"
)]
struct Cli {
    /// JSON config file; missing fields take their defaults
    #[arg(short, long)]
    config: Option<PathBuf>,
    /// Listing query URL
    #[arg(long)]
    listing_url: Option<String>,
    /// Directory for downloads and the CSV output
    #[arg(short, long)]
    work_dir: Option<PathBuf>,
    /// Destination URI for the CSV (file://, http:// or https://)
    #[arg(short, long)]
    destination: Option<String>,
    /// Listing file type to look for (e.g. "DLTINS")
    #[arg(long)]
    classification: Option<String>,
    /// Keep the downloaded listing and archive
    #[arg(long)]
    keep_intermediate: bool,
}

impl Cli {
    fn into_config(self) -> dltins_etl::Result<Config> {
        let mut config = match &self.config {
            Some(path) => Config::from_file(path)?,
            None => Config::default(),
        };
        if let Some(url) = self.listing_url {
            config.listing_url = url;
        }
        if let Some(dir) = self.work_dir {
            config.work_dir = dir;
        }
        if let Some(uri) = self.destination {
            config.destination_uri = Some(uri);
        }
        if let Some(classification) = self.classification {
            config.classification = classification;
        }
        config.keep_intermediate |= self.keep_intermediate;
        Ok(config)
    }
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info".into()),
        )
        .init();

    let config = Cli::parse().into_config()?;
    let pipeline = Pipeline::new(config)?;

    match pipeline.run().await? {
        RunOutcome::Completed(report) => {
            println!(
                "{} rows written to {} and uploaded to {}",
                report.rows,
                report.output_path.display(),
                report.destination_uri
            );
        }
        RunOutcome::NoLinkFound { classification } => {
            println!("no {} download link in the listing", classification);
        }
        RunOutcome::NoMatchingEntry { archive } => {
            println!("no matching document in {}", archive.display());
        }
        RunOutcome::NoRecords { document } => {
            println!("no terminated records in {}", document.display());
        }
    }

    Ok(())
}
