//! Change log extraction.

use comfy_table::{presets::UTF8_FULL, Table};
use model_core::{ChangeKind, EffectiveSchema, FieldDescriptor, SchemaVersion};
use serde::Serialize;

/// One change annotation, attributed to its field.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ChangeEntry {
    pub version: SchemaVersion,
    /// Field name; sub-record fields use a dotted path
    pub field: String,
    pub kind: ChangeKind,
    pub note: Option<String>,
}

/// Collect every change annotation of `schema`, including those of its
/// sub-records, ordered by version, then field name, then declaration order.
pub fn extract_change_log(schema: &EffectiveSchema) -> Vec<ChangeEntry> {
    let mut entries = Vec::new();
    for (name, descriptor) in &schema.fields {
        push_changes(&mut entries, name.clone(), descriptor);
    }
    for (field, nested) in &schema.nested {
        for (name, descriptor) in &nested.schema.fields {
            push_changes(&mut entries, format!("{field}.{name}"), descriptor);
        }
    }

    // Stable: keeps declaration order within one field and version
    entries.sort_by(|a, b| a.version.cmp(&b.version).then_with(|| a.field.cmp(&b.field)));
    entries
}

fn push_changes(entries: &mut Vec<ChangeEntry>, field: String, descriptor: &FieldDescriptor) {
    entries.extend(descriptor.changes.iter().map(|change| ChangeEntry {
        version: change.version,
        field: field.clone(),
        kind: change.kind,
        note: change.note.clone(),
    }));
}

/// Render entries as a text table for terminal output.
pub fn render_change_log(entries: &[ChangeEntry]) -> String {
    let mut table = Table::new();
    table.load_preset(UTF8_FULL);
    table.set_header(vec!["Version", "Field", "Change", "Note"]);
    for entry in entries {
        table.add_row(vec![
            entry.version.to_string(),
            entry.field.clone(),
            entry.kind.to_string(),
            entry.note.clone().unwrap_or_default(),
        ]);
    }
    table.to_string()
}
