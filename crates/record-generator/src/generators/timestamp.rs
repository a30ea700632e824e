//! Timestamp-derived value generators.
//!
//! Every time-derived field of a record (and of its sub-record) is computed
//! from the same [`GenerationContext`], so they all agree on one instant.

use crate::generator::GenerationContext;
use chrono::{DateTime, SecondsFormat, TimeDelta, Utc};
use model_core::{FieldValue, TimeField};
use rand::Rng;

/// Resolve a [`TimeField`] against the generation context.
pub fn generate_time_field<R: Rng>(
    field: TimeField,
    rng: &mut R,
    ctx: &GenerationContext,
) -> FieldValue {
    match field {
        TimeField::Utc => FieldValue::String(format_utc(ctx.timestamp)),
        TimeField::DeviceLocal => {
            FieldValue::String(format_device_time(ctx.timestamp, ctx.timezone_offset))
        }
        TimeField::TimezoneOffset => FieldValue::Int(i64::from(ctx.timezone_offset)),
        TimeField::ConversionOffset => FieldValue::Int(0),
        TimeField::CreatedTime => {
            let lag = TimeDelta::seconds(rng.random_range(1..=60));
            FieldValue::String(format_utc(ctx.timestamp + lag))
        }
    }
}

/// RFC 3339 with millisecond precision and a `Z` suffix.
pub fn format_utc(timestamp: DateTime<Utc>) -> String {
    timestamp.to_rfc3339_opts(SecondsFormat::Millis, true)
}

/// Device wall-clock time: the timestamp shifted by `offset_minutes`,
/// without a zone designator.
pub fn format_device_time(timestamp: DateTime<Utc>, offset_minutes: i32) -> String {
    (timestamp + TimeDelta::minutes(i64::from(offset_minutes)))
        .naive_utc()
        .format("%Y-%m-%dT%H:%M:%S")
        .to_string()
}

/// Parse a timestamp string in various formats.
pub fn parse_timestamp(s: &str) -> Option<DateTime<Utc>> {
    // Try RFC 3339 / ISO 8601
    if let Ok(dt) = DateTime::parse_from_rfc3339(s) {
        return Some(dt.with_timezone(&Utc));
    }

    // Try common date-only format
    if let Ok(date) = chrono::NaiveDate::parse_from_str(s, "%Y-%m-%d") {
        return Some(date.and_hms_opt(0, 0, 0)?.and_utc());
    }

    None
}

#[cfg(test)]
mod tests {
    use super::*;
    use model_core::Context;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    fn ctx() -> GenerationContext {
        GenerationContext {
            timestamp: parse_timestamp("2016-05-04T08:18:06.425Z").unwrap(),
            context: Context::Ingestion,
            timezone_offset: -420,
        }
    }

    #[test]
    fn test_utc_and_device_time() {
        let mut rng = StdRng::seed_from_u64(42);
        let ctx = ctx();

        assert_eq!(
            generate_time_field(TimeField::Utc, &mut rng, &ctx),
            FieldValue::from("2016-05-04T08:18:06.425Z")
        );
        assert_eq!(
            generate_time_field(TimeField::DeviceLocal, &mut rng, &ctx),
            FieldValue::from("2016-05-04T01:18:06")
        );
        assert_eq!(
            generate_time_field(TimeField::TimezoneOffset, &mut rng, &ctx),
            FieldValue::Int(-420)
        );
    }

    #[test]
    fn test_created_time_after_time() {
        let mut rng = StdRng::seed_from_u64(42);
        let ctx = ctx();

        let created = generate_time_field(TimeField::CreatedTime, &mut rng, &ctx);
        let created = parse_timestamp(created.as_str().unwrap()).unwrap();
        let lag = created - ctx.timestamp;
        assert!(lag >= TimeDelta::seconds(1) && lag <= TimeDelta::seconds(60));
    }

    #[test]
    fn test_parse_timestamp_formats() {
        assert!(parse_timestamp("2016-05-04T08:18:06+02:00").is_some());
        assert_eq!(
            parse_timestamp("2016-05-04").map(format_utc).as_deref(),
            Some("2016-05-04T00:00:00.000Z")
        );
        assert!(parse_timestamp("May 4th").is_none());
    }
}
