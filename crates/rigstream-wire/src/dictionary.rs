//! Tab-separated control dictionary
//!
//! A flat alternative to the record form used when control values are
//! pushed to a rig from another process:
//! `key\tx[,y,z[,w]]\tkey\t...`

use std::fmt::Write;

use rigstream_core::{ControlId, ControlValues, RigError, RigResult, RigValue};

/// Separator between keys and values
pub const DICTIONARY_SEPARATOR: char = '\t';

/// Encode control values; each value is written at its arity
pub fn encode_control_values(values: &ControlValues) -> String {
    let mut out = String::new();
    for (control, value) in values {
        if !out.is_empty() {
            out.push(DICTIONARY_SEPARATOR);
        }
        out.push_str(control.as_str());
        out.push(DICTIONARY_SEPARATOR);
        for (i, v) in value.components().iter().enumerate() {
            if i > 0 {
                out.push(',');
            }
            let _ = write!(out, "{}", v);
        }
    }
    out
}

/// Decode the tab-separated form
pub fn decode_control_values(text: &str) -> RigResult<ControlValues> {
    let mut values = ControlValues::new();
    if text.is_empty() {
        return Ok(values);
    }

    let parts: Vec<&str> = text.split(DICTIONARY_SEPARATOR).collect();
    if parts.len() % 2 != 0 {
        return Err(RigError::MalformedRecord(format!(
            "control dictionary has {} fields, expected key/value pairs",
            parts.len()
        )));
    }

    for pair in parts.chunks(2) {
        let components = pair[1]
            .split(',')
            .map(|c| {
                c.trim()
                    .parse::<f32>()
                    .map_err(|_| RigError::InvalidNumber(c.to_string()))
            })
            .collect::<RigResult<Vec<f32>>>()?;
        values.insert(
            ControlId::new(pair[0]),
            RigValue::from_components(&components)?,
        );
    }

    Ok(values)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_dictionary_format() {
        let mut values = ControlValues::new();
        values.insert(ControlId::new("Face:blink"), RigValue::scalar(0.5));
        values.insert(ControlId::new("Jaw:pos"), RigValue::offset(0.0, -1.0, 0.0));
        values.insert(ControlId::new("Jaw:rot"), RigValue::IDENTITY_ROTATION);

        let text = encode_control_values(&values);
        assert_eq!(text, "Face:blink\t0.5\tJaw:pos\t0,-1,0\tJaw:rot\t0,0,0,1");

        assert_eq!(decode_control_values(&text).unwrap(), values);
    }

    #[test]
    fn test_dictionary_errors() {
        assert!(decode_control_values("").unwrap().is_empty());
        assert!(decode_control_values("Jaw:rot").is_err());
        assert!(decode_control_values("Jaw:rot\t1,2").is_err());
        assert!(decode_control_values("Jaw:rot\tx").is_err());
    }
}
