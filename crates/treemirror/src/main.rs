use anyhow::{Context, bail};
use clap::Parser;
use treemirror::cli::{App, Commands};
use treemirror::{Config, logging};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let app = App::parse();
    let config = Config::load(app.config.as_deref(), &app.overrides())
        .context("failed to load configuration")?;
    logging::init(&config.log).context("failed to initialize logging")?;

    match app.command {
        None | Some(Commands::Mirror(_)) => mirror(&config).await,
        Some(Commands::Verify(_)) => verify(&config).await,
        Some(Commands::Config(_)) => {
            print!("{}", toml::to_string_pretty(&config).context("failed to render configuration")?);
            Ok(())
        }
    }
}

async fn mirror(config: &Config) -> anyhow::Result<()> {
    let summary = treemirror::run(config).await.context("mirror failed")?;

    println!(
        "mirrored {} files ({} bytes) from {} directories into {}",
        summary.crawl.files,
        summary.crawl.bytes,
        summary.crawl.directories,
        summary.root.display()
    );
    for skipped in &summary.crawl.skipped {
        println!("  skipped {}: {}", skipped.target, skipped.error);
    }
    println!("manifest: {} ({} files)", summary.manifest.display(), summary.records);
    Ok(())
}

async fn verify(config: &Config) -> anyhow::Result<()> {
    let path = config.manifest_path();
    let check_path = path.clone();
    let report = tokio::task::spawn_blocking(move || treemirror::verify(&check_path))
        .await
        .context("verification task failed")?
        .with_context(|| format!("failed to verify '{}'", path.display()))?;

    for mismatch in &report.mismatched {
        println!(
            "MISMATCH {}: expected {}, got {}",
            mismatch.path.display(),
            mismatch.expected,
            mismatch.actual
        );
    }
    for missing in &report.missing {
        println!("MISSING  {}", missing.display());
    }

    if !report.is_clean() {
        bail!(
            "{} of {} listed files failed verification",
            report.mismatched.len() + report.missing.len(),
            report.checked + report.missing.len()
        );
    }
    println!("OK {} files", report.checked);
    Ok(())
}
