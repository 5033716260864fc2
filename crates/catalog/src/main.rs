//! `errdoc` — emit the full error-code directory as JSON.
//!
//! Used to publish the enumerated list of every structured code a client may
//! receive, e.g. as part of the API documentation build.

fn main() -> anyhow::Result<()> {
    paydesk_observability::init();

    let registry = paydesk_catalog::build_registry()?;
    let directory: Vec<_> = registry.directory().collect();
    tracing::info!(flows = directory.len(), "error directory built");

    println!("{}", serde_json::to_string_pretty(&directory)?);
    Ok(())
}
