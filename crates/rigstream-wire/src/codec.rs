//! Record serialization driven by field tables
//!
//! Text form: `{"field":value,...}` in declaration order. This is not a
//! general JSON parser: no escape sequences, and at every step the
//! destination field's declared kind decides how a span is read.

use std::collections::HashMap;

use rigstream_core::{RigError, RigResult};

use crate::scan::{split_pair, split_top_level, strip_insignificant, unwrap_delimited};
use crate::schema::Record;

/// Serialize a record to its text form
pub fn serialize<R: Record>(record: &R) -> String {
    let mut out = String::new();
    encode_record(record, &mut out);
    out
}

/// Deserialize text into a record of type `R`.
///
/// Any failure aborts the whole decode; partial records are never returned.
pub fn deserialize<R: Record>(text: &str) -> RigResult<R> {
    let cleaned = strip_insignificant(text);
    decode_record(&cleaned)
}

/// Append `{"field":value,...}` for every non-ignored field
pub fn encode_record<R: Record>(record: &R, out: &mut String) {
    out.push('{');
    let mut first = true;
    for field in R::fields().iter().filter(|f| !f.ignore) {
        if !first {
            out.push(',');
        }
        first = false;
        out.push('"');
        out.push_str(field.name);
        out.push_str("\":");
        (field.encode)(record, out);
    }
    out.push('}');
}

/// Decode an already-stripped `{...}` span into a record.
///
/// Unknown keys are skipped; fields absent from the text keep their
/// default value. Duplicate keys are rejected.
pub fn decode_record<R: Record>(raw: &str) -> RigResult<R> {
    let body = unwrap_delimited(raw, '{', '}')?;

    let mut entries: HashMap<&str, &str> = HashMap::new();
    for entry in split_top_level(body, ',')? {
        let (key, value) = split_pair(entry)?;
        if entries.insert(key, value).is_some() {
            return Err(RigError::MalformedRecord(format!(
                "duplicate field {:?} in {}",
                key,
                R::NAME
            )));
        }
    }

    let mut record = R::default();
    for field in R::fields().iter().filter(|f| !f.ignore) {
        if let Some(value) = entries.get(field.name) {
            (field.decode)(&mut record, value).map_err(|e| match e {
                RigError::MalformedRecord(msg) => {
                    RigError::MalformedRecord(format!("{}.{}: {}", R::NAME, field.name, msg))
                }
                other => other,
            })?;
        }
    }

    Ok(record)
}
