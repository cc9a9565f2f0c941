use slotpack::cli::Cli;
use slotpack::layout::PersistedLayout;
use slotpack::output;
use slotpack::schema::SchemaDocument;

use clap::Parser;
use eyre::WrapErr;
use tracing::info;

fn main() -> eyre::Result<()> {
    let cli = Cli::parse();

    tracing_subscriber::fmt()
        .with_max_level(cli.log_level())
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();

    // Load the schema document; CLI features add to the document's own
    let raw = std::fs::read_to_string(&cli.schema)
        .wrap_err_with(|| format!("failed to read schema {}", cli.schema.display()))?;
    let mut document = SchemaDocument::from_json(&raw)
        .wrap_err_with(|| format!("invalid schema document {}", cli.schema.display()))?;
    document.features.extend(cli.features.iter().copied());

    info!(
        fields = document.fields.len(),
        features = document.features.len(),
        "Computing storage layout"
    );
    let layout = document.layout().wrap_err("layout rejected")?;

    if let Some(path) = &cli.verify {
        let stored = std::fs::read_to_string(path)
            .wrap_err_with(|| format!("failed to read persisted layout {}", path.display()))?;
        PersistedLayout::from_json(&stored)
            .and_then(|persisted| persisted.verify(&layout))
            .wrap_err_with(|| format!("persisted layout {} does not match", path.display()))?;
        if !cli.json {
            output::print_verified(path);
        }
    }

    if cli.json {
        println!("{}", layout.to_persisted().to_json()?);
        return Ok(());
    }

    output::print_banner(document.name.as_deref(), &cli.schema, layout.features());
    output::print_layout(&layout);
    output::print_summary(&layout);

    Ok(())
}
