//! Contract table of an effective schema.
//!
//! Pure extraction: the table is computed from the schema alone, without
//! generating or reading any record.

use comfy_table::{presets::UTF8_FULL, Cell, Color, Table};
use model_core::{Context, EffectiveSchema, FieldContract, Requirement, ValueKind};
use serde::Serialize;

/// One row of a [`ContractTable`].
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ContractRow {
    /// Field name; sub-record fields use a dotted path
    pub field: String,
    pub ingestion: Requirement,
    pub storage: Requirement,
    pub client: Requirement,
    pub kind: ValueKind,
    /// Numerical type and unit, e.g. `float units/hour`
    pub numeric: Option<String>,
    /// Lower bound; symbolic bounds render as the field name
    pub min: Option<String>,
    pub max: Option<String>,
    pub allowed: Option<Vec<String>>,
    /// Whether generated records of this variant can carry the field
    pub emitted: bool,
    pub description: Option<String>,
}

impl ContractRow {
    pub fn requirement(&self, context: Context) -> Requirement {
        match context {
            Context::Ingestion => self.ingestion,
            Context::Storage => self.storage,
            Context::Client => self.client,
        }
    }

    fn range(&self) -> String {
        match (&self.min, &self.max) {
            (None, None) => String::new(),
            (min, max) => format!(
                "[{}, {}]",
                min.as_deref().unwrap_or("-inf"),
                max.as_deref().unwrap_or("inf")
            ),
        }
    }
}

/// Per-field contract summary of one record variant.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ContractTable {
    pub record_type: String,
    pub variant: String,
    pub rows: Vec<ContractRow>,
}

impl ContractTable {
    pub fn get(&self, field: &str) -> Option<&ContractRow> {
        self.rows.iter().find(|r| r.field == field)
    }

    /// Render as a text table for terminal output.
    pub fn render(&self) -> String {
        let mut table = Table::new();
        table.load_preset(UTF8_FULL);
        table.set_header(vec![
            "Field",
            "Ingestion",
            "Storage",
            "Client",
            "Type",
            "Range",
            "Allowed",
            "Description",
        ]);

        for row in &self.rows {
            let field = if row.emitted {
                Cell::new(&row.field)
            } else {
                Cell::new(&row.field).fg(Color::DarkGrey)
            };
            let kind = match &row.numeric {
                Some(numeric) => numeric.clone(),
                None => row.kind.to_string(),
            };
            table.add_row(vec![
                field,
                requirement_cell(row.ingestion),
                requirement_cell(row.storage),
                requirement_cell(row.client),
                Cell::new(kind),
                Cell::new(row.range()),
                Cell::new(row.allowed.as_ref().map(|a| a.join(", ")).unwrap_or_default()),
                Cell::new(row.description.as_deref().unwrap_or_default()),
            ]);
        }

        format!("{} / {}\n{table}", self.record_type, self.variant)
    }
}

fn requirement_cell(requirement: Requirement) -> Cell {
    let cell = Cell::new(requirement);
    match requirement {
        Requirement::Required => cell.fg(Color::Green),
        Requirement::Optional => cell,
        Requirement::NotApplicable => cell.fg(Color::DarkGrey),
    }
}

/// Extract one row per field (sub-record fields follow their container).
pub fn extract_summary(schema: &EffectiveSchema) -> ContractTable {
    let mut rows = Vec::new();
    for (name, descriptor) in &schema.fields {
        let emitted = !schema.is_removed(name)
            && (!descriptor.example.is_derived() || is_produced(schema, name));
        rows.push(row(name.clone(), &descriptor.contract, emitted));

        if let Some(nested) = &descriptor.contract.nested {
            for (inner, contract) in &nested.fields {
                rows.push(row(format!("{name}.{inner}"), contract, emitted));
            }
        }
    }

    ContractTable {
        record_type: schema.record_type.clone(),
        variant: schema.variant.clone(),
        rows,
    }
}

/// Whether post-processing fills a field the schema walk skips.
fn is_produced(schema: &EffectiveSchema, name: &str) -> bool {
    let post = &schema.post;
    post.nested.as_ref().is_some_and(|n| n.field == name)
        || post.products.iter().any(|p| p.target == name)
        || post.multiples.iter().any(|m| m.target == name)
}

fn row(field: String, contract: &FieldContract, emitted: bool) -> ContractRow {
    let numeric = contract.numeric.as_ref();
    ContractRow {
        field,
        ingestion: contract.requirement(Context::Ingestion),
        storage: contract.requirement(Context::Storage),
        client: contract.requirement(Context::Client),
        kind: contract.kind,
        numeric: numeric.map(|n| format!("{} {}", n.numerical_type, n.unit)),
        min: numeric.and_then(|n| n.min.as_ref()).map(ToString::to_string),
        max: numeric.and_then(|n| n.max.as_ref()).map(ToString::to_string),
        allowed: contract
            .allowed
            .as_ref()
            .map(|values| values.iter().map(ToString::to_string).collect()),
        emitted,
        description: contract.description.clone(),
    }
}
