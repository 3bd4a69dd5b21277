mod ai;
mod config;
mod dashboard;
mod error;
mod models;
mod pipeline;
mod services;

use config::Config;
use error::Result;
use pipeline::Pipeline;

const USAGE: &str = "Usage: content-pipeline <scrape|generate|audio|dashboard|run>

  scrape     collect trending videos into the trending file
  generate   generate new resources and their PDFs
  audio      narrate the generated resources
  dashboard  add the generated resources to the dashboard page
  run        all of the above, in order";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Stage {
    Scrape,
    Generate,
    Audio,
    Dashboard,
    Run,
}

impl Stage {
    fn parse(arg: &str) -> Option<Self> {
        match arg {
            "scrape" => Some(Stage::Scrape),
            "generate" => Some(Stage::Generate),
            "audio" => Some(Stage::Audio),
            "dashboard" => Some(Stage::Dashboard),
            "run" => Some(Stage::Run),
            _ => None,
        }
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive(tracing::Level::INFO.into()),
        )
        .with_writer(std::io::stderr)
        .init();

    let args: Vec<String> = std::env::args().collect();
    let Some(stage) = args.get(1).and_then(|arg| Stage::parse(arg)) else {
        eprintln!("{}", USAGE);
        std::process::exit(2);
    };

    let config = Config::load()?;
    let pipeline = Pipeline::new(config)?;

    match stage {
        Stage::Scrape => scrape(&pipeline).await?,
        Stage::Generate => generate(&pipeline).await?,
        Stage::Audio => audio(&pipeline).await?,
        Stage::Dashboard => dashboard(&pipeline).await?,
        Stage::Run => {
            scrape(&pipeline).await?;
            generate(&pipeline).await?;
            audio(&pipeline).await?;
            dashboard(&pipeline).await?;
        }
    }

    Ok(())
}

async fn scrape(pipeline: &Pipeline) -> Result<()> {
    println!("=== Collecting trends ===");
    let trends = pipeline.collect_trends().await?;
    if trends.is_empty() {
        println!("No trending videos collected");
        return Ok(());
    }

    println!("Saved {} trending videos", trends.len());
    println!("Top 5 by engagement:");
    for (i, trend) in trends.iter().take(5).enumerate() {
        let preview: String = trend.text.chars().take(80).collect();
        println!(
            "  {}. [{:.0}] @{}: {}",
            i + 1,
            trend.engagement_score(),
            trend.author_username,
            preview
        );
    }
    Ok(())
}

async fn generate(pipeline: &Pipeline) -> Result<()> {
    println!("=== Generating resources ===");
    let resources = pipeline.generate_resources().await?;
    if resources.is_empty() {
        println!("No resources generated");
        return Ok(());
    }

    println!("Generated {} resources:", resources.len());
    for resource in &resources {
        println!("  Day {}: {} (password: {})", resource.day, resource.title, resource.password);
    }
    Ok(())
}

async fn audio(pipeline: &Pipeline) -> Result<()> {
    println!("=== Synthesizing audio ===");
    let files = pipeline.synthesize_audio().await?;
    println!("Created {} audio files", files.len());
    for file in &files {
        println!("  Day {}: {}", file.day, file.filename);
    }
    Ok(())
}

async fn dashboard(pipeline: &Pipeline) -> Result<()> {
    println!("=== Updating dashboard ===");
    let report = pipeline.update_dashboard().await?;
    let path = pipeline.config().paths.dashboard.display();

    if report.added.is_empty() && report.skipped.is_empty() {
        println!("{} unchanged", path);
        return Ok(());
    }

    println!("Added days {:?} to {}", report.added, path);
    if !report.skipped.is_empty() {
        println!("Skipped days already present: {:?}", report.skipped);
    }
    for table in &report.missing_tables {
        println!("Warning: no `{}` table found; update it by hand", table);
    }
    Ok(())
}
