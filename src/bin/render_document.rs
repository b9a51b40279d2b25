use std::{path::PathBuf, sync::Arc};

use anyhow::{Context, Result};
use clap::Parser;
use tracing::info;
use uuid::Uuid;

use tradedocs_api::{
    config, db,
    services::{documents::DocumentSettings, rendering::RenderingService},
    workflow::DocumentKind,
};

/// Renders a stored document to a PDF file, the same bytes the API serves.
#[derive(Parser)]
#[command(name = "render-document")]
struct Cli {
    /// enquiry, quote, proforma_invoice, export_order, purchase_order or shipping_bill
    #[arg(value_parser = parse_kind)]
    kind: DocumentKind,

    #[arg(value_parser = clap::value_parser!(Uuid))]
    id: Uuid,

    /// Output file; defaults to `<number>.pdf` in the current directory
    #[arg(short, long)]
    out: Option<PathBuf>,
}

fn parse_kind(raw: &str) -> Result<DocumentKind, String> {
    raw.replace('-', "_")
        .parse()
        .map_err(|_| format!("unknown document kind '{}'", raw))
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    let cfg = config::load_config().context("failed to load configuration")?;
    config::init_tracing(cfg.log_level(), cfg.log_json);

    let pool = db::establish_connection_from_app_config(&cfg)
        .await
        .context("failed to connect to the database")?;
    let service = RenderingService::new(
        Arc::new(pool),
        cfg.company.clone(),
        DocumentSettings::from_config(&cfg),
    );

    let rendered = service
        .render(cli.kind, cli.id)
        .await
        .with_context(|| format!("failed to render {} {}", cli.kind, cli.id))?;

    let path = cli.out.unwrap_or_else(|| PathBuf::from(&rendered.file_name));
    tokio::fs::write(&path, &rendered.bytes)
        .await
        .with_context(|| format!("failed to write {}", path.display()))?;
    info!(path = %path.display(), size = rendered.bytes.len(), "Document written");
    println!("{}", path.display());
    Ok(())
}
