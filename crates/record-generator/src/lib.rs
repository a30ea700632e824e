//! Example-record generator for the device data model.
//!
//! This crate provides the [`RecordGenerator`] which walks an
//! [`EffectiveSchema`](model_core::EffectiveSchema) and produces one
//! [`Record`](model_core::Record) per call. The generator draws from an
//! injectable RNG; the default is a seeded `StdRng`, so runs with the same
//! seed are reproducible.
//!
//! # Architecture
//!
//! ```text
//! EffectiveSchema (model-core)
//!        │
//!        ▼
//! ┌──────────────────────┐
//! │   RecordGenerator    │
//! │                      │
//! │  1. time transform   │
//! │  2. schema walk      │
//! │  3. post-processing  │
//! │     remove / nested  │
//! │     products / mult. │
//! └──────────┬───────────┘
//!            │
//!            ▼
//!    Record { record_type, variant, context, fields }
//! ```
//!
//! # Example
//!
//! ```rust
//! use chrono::Utc;
//! use model_core::{
//!     Context, ExampleValue, FieldDescriptor, FragmentLibrary, RecordType, SchemaFragment,
//!     ValueKind,
//! };
//! use record_generator::RecordGenerator;
//!
//! let cbg = RecordType::single(
//!     "cbg",
//!     SchemaFragment::new("cbg").field(
//!         "value",
//!         FieldDescriptor::new(ValueKind::Float, ExampleValue::float_range(2.0, 20.0, 1)),
//!     ),
//! );
//! let schema = cbg.effective_schema(&FragmentLibrary::default(), "cbg").unwrap();
//!
//! let mut generator = RecordGenerator::new(42);
//! let record = generator.generate(&schema, Utc::now(), Context::Ingestion);
//! assert!(record.contains("value"));
//! ```

pub mod generator;
pub mod generators;
pub mod post;

// Re-exports for convenience
pub use generator::{
    GenerateOptions, GenerationContext, GeneratorError, OptionalFieldPolicy, RecordGenerator,
    RecordIterator,
};
pub use generators::timestamp::{format_utc, parse_timestamp};
