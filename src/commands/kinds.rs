use anyhow::Result;

use super::Session;
use crate::ui;

/// List every registered kind
pub fn list(session: &Session) -> Result<()> {
    ui::header("Resources");
    for name in session.registry.resource_names() {
        println!("  {name}");
    }

    ui::header("Data sources");
    for name in session.registry.data_source_names() {
        println!("  {name}");
    }
    Ok(())
}

/// Print the schema of a resource kind or data source
pub fn schema(session: &Session, kind: &str) -> Result<()> {
    if let Ok(resource) = session.registry.resource_kind(kind) {
        ui::schema(resource.schema());
        return Ok(());
    }

    let lookup = session.registry.lookup_kind(kind)?;
    ui::schema(lookup.schema());
    let filters: Vec<_> = lookup.filters().iter().map(|f| f.key).collect();
    ui::kv("filters", &filters.join(", "));
    Ok(())
}
