//! Main record generator.

use crate::generators::generate_value;
use crate::post;
use chrono::{DateTime, TimeDelta, Utc};
use model_core::{
    Context, EffectiveSchema, FragmentLibrary, Record, RecordType, Requirement, SchemaError,
    SchemaFragment,
};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use std::collections::BTreeMap;
use tracing::debug;

/// Timezone offsets (minutes) records are stamped with by default.
pub const DEFAULT_TIMEZONE_OFFSETS: &[i32] = &[-480, -420, -360, -300, -240, 0, 60, 120, 330, 600];

/// Error type for generator operations.
#[derive(Debug, thiserror::Error)]
pub enum GeneratorError {
    /// Composition failed (unknown variant, missing fragment, ...)
    #[error("Schema error: {0}")]
    SchemaError(#[from] SchemaError),
}

/// Which optional fields a generated record carries.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum OptionalFieldPolicy {
    /// Every optional field
    Always,
    /// Required fields only
    Never,
    /// Each optional field independently with the given probability
    Sometimes(f64),
}

impl Default for OptionalFieldPolicy {
    fn default() -> Self {
        Self::Always
    }
}

/// Inputs shared by every value of one record and its sub-record.
#[derive(Debug, Clone, PartialEq)]
pub struct GenerationContext {
    /// Timestamp after the record type's time transform
    pub timestamp: DateTime<Utc>,

    /// Context the record is generated for
    pub context: Context,

    /// Timezone offset in minutes
    pub timezone_offset: i32,
}

/// Per-call options for [`RecordGenerator::generate_variant`].
#[derive(Debug, Clone)]
pub struct GenerateOptions {
    /// Discriminant value; defaults to the record type name for
    /// single-variant record types
    pub sub_type: Option<String>,

    pub timestamp: DateTime<Utc>,

    pub context: Context,

    /// Fragments composed after the variant fragment
    pub overrides: Vec<SchemaFragment>,
}

impl GenerateOptions {
    pub fn new(timestamp: DateTime<Utc>, context: Context) -> Self {
        Self {
            sub_type: None,
            timestamp,
            context,
            overrides: Vec::new(),
        }
    }

    pub fn sub_type(mut self, sub_type: impl Into<String>) -> Self {
        self.sub_type = Some(sub_type.into());
        self
    }

    pub fn overrides(mut self, overrides: Vec<SchemaFragment>) -> Self {
        self.overrides = overrides;
        self
    }
}

/// Record generator that produces example records from effective schemas.
///
/// The random source is injectable; [`RecordGenerator::new`] seeds a
/// `StdRng` so the same seed and schema yield the same records.
pub struct RecordGenerator<R: Rng = StdRng> {
    /// Random source for every drawn value
    rng: R,
    optional_fields: OptionalFieldPolicy,
    timezone_offsets: Vec<i32>,
}

impl RecordGenerator<StdRng> {
    /// Create a generator with a seeded RNG.
    pub fn new(seed: u64) -> Self {
        Self::from_rng(StdRng::seed_from_u64(seed))
    }
}

impl<R: Rng> RecordGenerator<R> {
    /// Create a generator drawing from `rng`.
    pub fn from_rng(rng: R) -> Self {
        Self {
            rng,
            optional_fields: OptionalFieldPolicy::default(),
            timezone_offsets: DEFAULT_TIMEZONE_OFFSETS.to_vec(),
        }
    }

    pub fn with_optional_fields(mut self, policy: OptionalFieldPolicy) -> Self {
        self.optional_fields = policy;
        self
    }

    /// Restrict the pool of timezone offsets; an empty pool means UTC.
    pub fn with_timezone_offsets(mut self, offsets: Vec<i32>) -> Self {
        self.timezone_offsets = offsets;
        self
    }

    /// Generate one record of `schema` at `timestamp` for `context`.
    pub fn generate(
        &mut self,
        schema: &EffectiveSchema,
        timestamp: DateTime<Utc>,
        context: Context,
    ) -> Record {
        // Bucket once, before any value is drawn
        let timestamp = schema
            .time_transform
            .map_or(timestamp, |transform| transform.apply(timestamp));
        let ctx = GenerationContext {
            timestamp,
            context,
            timezone_offset: self.pick_timezone_offset(),
        };
        let record = self.generate_with(schema, &ctx);
        debug!(
            "Generated {}/{} for {} with {} fields",
            record.record_type,
            record.variant,
            context,
            record.field_count()
        );
        record
    }

    /// Resolve the requested variant of `record_type` and generate a record.
    pub fn generate_variant(
        &mut self,
        record_type: &RecordType,
        library: &FragmentLibrary,
        options: &GenerateOptions,
    ) -> Result<Record, GeneratorError> {
        let variant = options.sub_type.as_deref().unwrap_or(&record_type.name);
        let schema =
            record_type.effective_schema_with_overrides(library, variant, &options.overrides)?;
        Ok(self.generate(&schema, options.timestamp, options.context))
    }

    /// Generate `count` records, the i-th at `start + i * interval`.
    ///
    /// Returns an iterator that lazily generates records.
    pub fn generate_many<'a>(
        &'a mut self,
        schema: &'a EffectiveSchema,
        start: DateTime<Utc>,
        interval: TimeDelta,
        context: Context,
        count: u64,
    ) -> RecordIterator<'a, R> {
        RecordIterator {
            generator: self,
            schema,
            next_timestamp: start,
            interval,
            context,
            remaining: count,
        }
    }

    fn generate_with(&mut self, schema: &EffectiveSchema, ctx: &GenerationContext) -> Record {
        let mut fields = BTreeMap::new();

        for (name, descriptor) in &schema.fields {
            if descriptor.example.is_derived()
                || !self.includes(descriptor.contract.requirement(ctx.context))
            {
                continue;
            }
            let value = generate_value(&descriptor.example, &mut self.rng, ctx);
            fields.insert(name.clone(), value);
        }

        // (a) fields the variant never serializes
        post::remove_fields(&mut fields, &schema.post.remove);

        // (b) sub-record, sharing this record's context and timestamp
        if let Some(spec) = &schema.post.nested {
            let requirement = schema
                .get_field(&spec.field)
                .map_or(Requirement::NotApplicable, |d| d.contract.requirement(ctx.context));
            if let Some(nested) = schema.nested_schema(&spec.field) {
                if self.includes(requirement) {
                    let sub_record = self.generate_with(&nested.schema, ctx);
                    fields.insert(spec.field.clone(), sub_record.into_object());
                }
            }
        }

        // (c) derived from generated siblings or the sub-record
        post::apply_products(schema, &mut fields, &schema.post.products);

        // (d) multiples of already generated fields, gated like any other field
        let mut multiples = Vec::with_capacity(schema.post.multiples.len());
        for multiple in &schema.post.multiples {
            let requirement = schema
                .get_field(&multiple.target)
                .map_or(Requirement::NotApplicable, |d| d.contract.requirement(ctx.context));
            if self.includes(requirement) {
                multiples.push(multiple.clone());
            } else {
                fields.remove(&multiple.target);
            }
        }
        post::apply_multiples(schema, &mut fields, &multiples);

        Record::new(
            schema.record_type.clone(),
            schema.variant.clone(),
            Some(ctx.context),
            fields,
        )
    }

    /// Whether a field with `requirement` is generated.
    fn includes(&mut self, requirement: Requirement) -> bool {
        match requirement {
            Requirement::Required => true,
            Requirement::NotApplicable => false,
            Requirement::Optional => match self.optional_fields {
                OptionalFieldPolicy::Always => true,
                OptionalFieldPolicy::Never => false,
                OptionalFieldPolicy::Sometimes(p) => self.rng.random_bool(p.clamp(0.0, 1.0)),
            },
        }
    }

    fn pick_timezone_offset(&mut self) -> i32 {
        if self.timezone_offsets.is_empty() {
            return 0;
        }
        let idx = self.rng.random_range(0..self.timezone_offsets.len());
        self.timezone_offsets[idx]
    }
}

/// Iterator that lazily generates records at evenly spaced timestamps.
pub struct RecordIterator<'a, R: Rng> {
    generator: &'a mut RecordGenerator<R>,
    schema: &'a EffectiveSchema,
    next_timestamp: DateTime<Utc>,
    interval: TimeDelta,
    context: Context,
    remaining: u64,
}

impl<R: Rng> Iterator for RecordIterator<'_, R> {
    type Item = Record;

    fn next(&mut self) -> Option<Self::Item> {
        if self.remaining == 0 {
            return None;
        }

        self.remaining -= 1;
        let timestamp = self.next_timestamp;
        self.next_timestamp = timestamp + self.interval;

        Some(self.generator.generate(self.schema, timestamp, self.context))
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        let remaining = self.remaining as usize;
        (remaining, Some(remaining))
    }
}

impl<R: Rng> ExactSizeIterator for RecordIterator<'_, R> {}
