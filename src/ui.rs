use colored::Colorize;
use reconcile::{DeclaredState, FieldDescriptor, Presence, Schema};

/// Print an info message
pub fn info(msg: &str) {
    println!("{} {}", "ℹ".blue(), msg);
}

/// Print a success message
pub fn success(msg: &str) {
    println!("{} {}", "✓".green(), msg);
}

/// Print a warning message
pub fn warn(msg: &str) {
    println!("{} {}", "⚠".yellow(), msg);
}

/// Print a dim/muted message
pub fn dim(msg: &str) {
    println!("  {}", msg.dimmed());
}

/// Print a header/title
pub fn header(title: &str) {
    println!();
    println!("{}", title.bold());
    println!("{}", "─".repeat(title.chars().count()).dimmed());
}

/// Print a section header
pub fn section(title: &str) {
    println!();
    println!("{}", title.cyan().bold());
}

/// Print a key-value pair
pub fn kv(key: &str, value: &str) {
    println!("  {}: {}", key.dimmed(), value);
}

// ============================================================================
// Resource rendering
// ============================================================================

fn presence_label(field: &FieldDescriptor) -> &'static str {
    match (field.presence, field.force_replace) {
        (Presence::Required, true) => "required, forces replacement",
        (Presence::Required, false) => "required",
        (Presence::Optional, true) => "optional, forces replacement",
        (Presence::Optional, false) => "optional",
        (Presence::Computed, _) => "computed",
    }
}

/// One line per field: `name  type  presence  description`
pub fn schema_lines(schema: &Schema) -> Vec<String> {
    let width = schema
        .fields()
        .iter()
        .map(|f| f.name.len())
        .max()
        .unwrap_or(0);

    schema
        .fields()
        .iter()
        .map(|field| {
            let mut line = format!(
                "{:<width$}  {:<12}  {}",
                field.name,
                field.semantic_type.to_string(),
                presence_label(field)
            );
            if !field.description.is_empty() {
                line.push_str(&format!(" - {}", field.description));
            }
            line
        })
        .collect()
}

/// Print a schema as an aligned field table
pub fn schema(schema: &Schema) {
    header(schema.kind());
    let import = if schema.supports_import() {
        "supported"
    } else {
        "not supported"
    };
    kv("import", import);
    println!();
    for line in schema_lines(schema) {
        println!("  {line}");
    }
}

/// Print a declared state, fields in schema order
pub fn state(name: &str, kind: &str, state: &DeclaredState, schema: Option<&Schema>) {
    section(&format!("{name} ({kind})"));
    let id = if state.exists() { state.id() } else { "(not created)" };
    kv("id", id);

    match schema {
        Some(schema) => {
            for field in schema.fields() {
                if let Some(value) = state.get(field.name) {
                    kv(field.name, &value.to_string());
                }
            }
        }
        None => {
            for (field, value) in state.fields() {
                kv(field, &value.to_string());
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use reconcile::SemanticType;

    #[test]
    fn test_schema_lines() {
        let schema = Schema::new("test_kind")
            .field(
                FieldDescriptor::required("project", SemanticType::String)
                    .force_replace()
                    .describe("The project"),
            )
            .field(FieldDescriptor::optional("ssh_keys", SemanticType::StringList))
            .field(FieldDescriptor::computed("vid", SemanticType::Integer));

        let lines = schema_lines(&schema);
        assert_eq!(lines.len(), 3);
        assert_eq!(
            lines[0],
            "project   string        required, forces replacement - The project"
        );
        assert_eq!(lines[1], "ssh_keys  list<string>  optional");
        assert_eq!(lines[2], "vid       integer       computed");
    }
}
