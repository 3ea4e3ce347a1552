use std::{path::PathBuf, time::Duration};

use clap::Parser;

use spotai::{
    Res, config, error,
    genres::GENRE_SEEDS,
    info,
    llm::OpenAiClient,
    management::{DEFAULT_GENRE_METADATA_FILE, GenerationReport, GenreMetadataManager},
    success, warning,
};

/// Generate metadata for every Spotify genre seed with the language model.
#[derive(Parser, Debug)]
#[clap(version = env!("CARGO_PKG_VERSION"), name = "spotai-genre-metadata")]
struct Cli {
    /// File to read cached entries from and write the result to
    #[clap(long, default_value = DEFAULT_GENRE_METADATA_FILE)]
    output: PathBuf,

    /// Pause between two generated entries, in milliseconds
    #[clap(long, default_value_t = 1000)]
    delay_ms: u64,

    /// Print verbose diagnostics
    #[clap(long)]
    verbose: bool,
}

async fn run(cli: &Cli) -> Res<GenerationReport> {
    let llm = OpenAiClient::new(config::Config::from_env().llm_settings()?);
    info!("Generating genre metadata with {}...", llm.model());

    let mut manager = GenreMetadataManager::load_or_default(&cli.output).await;
    let report = manager
        .refresh(&llm, GENRE_SEEDS, Duration::from_millis(cli.delay_ms))
        .await;

    manager.persist().await.map_err(|e| {
        format!(
            "Error writing genre metadata to {}: {}",
            manager.path().display(),
            e
        )
    })?;
    success!(
        "Genre metadata written to {} ({} reused, {} generated)",
        manager.path().display(),
        report.reused,
        report.generated
    );

    Ok(report)
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();
    spotai::set_verbose(cli.verbose);

    if let Err(e) = config::load_env().await {
        warning!("Cannot load environment. Err: {}", e);
    }

    match run(&cli).await {
        Ok(report) if !report.failed.is_empty() => warning!(
            "Metadata generation failed for {} genres: {}",
            report.failed.len(),
            report.failed.join(", ")
        ),
        Ok(_) => {}
        Err(e) => error!("{}", e),
    }
}
