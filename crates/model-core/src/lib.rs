//! Core contract model and schema composition engine for the device data model.
//!
//! This crate provides the foundational types the generator, the validator
//! and the record-type catalog are built on:
//!
//! - [`Context`] / [`Requirement`] - Where a field must, may or cannot appear
//! - [`FieldDescriptor`] - Example value generator plus field contract
//! - [`SchemaFragment`] - Reusable, composable piece of a record
//! - [`compose`] - Ordered, right-biased merge of fragments
//! - [`RecordType`] - Base fragments plus discriminated variants
//! - [`EffectiveSchema`] - Merged schema of one concrete variant
//! - [`Record`] / [`FieldValue`] - Record instances
//!
//! # Architecture
//!
//! ```text
//! model-core (this crate)
//!    │
//!    ├─── record-types      (catalog: envelope library + basal, bolus, ...)
//!    ├─── record-generator  (walks an EffectiveSchema, produces Records)
//!    └─── record-verify     (contract tables, change logs, validation)
//! ```
//!
//! # Example
//!
//! ```rust
//! use model_core::{
//!     ExampleValue, FieldDescriptor, FragmentLibrary, RecordType, SchemaFragment,
//!     VariantDefinition, ValueKind,
//! };
//!
//! let library = FragmentLibrary::new(SchemaFragment::new("envelope"));
//! let basal = RecordType::new("basal", "deliveryType")
//!     .base(SchemaFragment::new("basal").field(
//!         "type",
//!         FieldDescriptor::new(ValueKind::String, ExampleValue::literal("basal")),
//!     ))
//!     .variant("scheduled", VariantDefinition::new(SchemaFragment::new("scheduled")));
//!
//! let schema = basal.effective_schema(&library, "scheduled").unwrap();
//! assert_eq!(schema.field_names(), vec!["deliveryType", "type"]);
//! assert!(basal.effective_schema(&library, "square").is_err());
//! ```

pub mod compose;
pub mod record_type;
pub mod schema;
pub mod types;
pub mod values;

// Re-exports for convenience
pub use compose::{compose, EffectiveSchema, NestedSchema};
pub use record_type::{
    Catalog, FragmentLibrary, MultipleDerivation, NestedSpec, PostProcessing, ProductDerivation,
    RecordType, TimeTransform, VariantDefinition,
};
pub use schema::{
    ExampleValue, FieldContract, FieldDescriptor, NestedContract, SchemaError, SchemaFragment,
    TimeField,
};
pub use types::{
    Bound, ChangeAnnotation, ChangeKind, Context, ContextRequirements, NumericContract,
    NumericalType, Requirement, SchemaVersion, Unit, ValueKind,
};
pub use values::{FieldValue, Record, RecordBuilder};
