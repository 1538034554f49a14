//! Field descriptors for schema-directed records
//!
//! Every record type publishes a static table of [`Field`]s built once per
//! type. The table, not the text, decides how a span is read: the same
//! bracketed text is a list, a value tuple or a nested record depending on
//! the declared kind of the field it belongs to.

use std::collections::BTreeMap;
use std::fmt::Write;

use rigstream_core::{ControlId, RigError, RigResult, RigValue};

use crate::scan::{split_pair, split_top_level, unquote, unwrap_delimited};

/// Declared kind of a record field
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum FieldKind {
    Text,
    Bool,
    Number,
    /// Arity-tagged 4-slot rig value
    Value,
    /// Nested record with its own field table
    Record,
    List,
    Map,
}

/// One entry in a record's field table
pub struct Field<R> {
    /// Key used in the text form
    pub name: &'static str,
    pub kind: FieldKind,
    /// Ignored fields are never written or read
    pub ignore: bool,
    pub encode: fn(&R, &mut String),
    pub decode: fn(&mut R, &str) -> RigResult<()>,
}

/// A record with a static field table
pub trait Record: Default + 'static {
    /// Record name used in error messages
    const NAME: &'static str;

    fn fields() -> &'static [Field<Self>];
}

/// A type that can appear as a field value
pub trait TextValue: Sized {
    const KIND: FieldKind;

    fn encode_text(&self, out: &mut String);

    fn decode_text(raw: &str) -> RigResult<Self>;
}

/// Build a [`Field`] for a struct member.
///
/// ```ignore
/// field!(Meta, "Application" => application: String)
/// field!(Meta, "cache" => cache: String; ignore)
/// ```
#[macro_export]
macro_rules! field {
    ($record:ty, $name:literal => $member:ident : $ty:ty) => {
        $crate::field!(@build $record, $name, $member, $ty, false)
    };
    ($record:ty, $name:literal => $member:ident : $ty:ty; ignore) => {
        $crate::field!(@build $record, $name, $member, $ty, true)
    };
    (@build $record:ty, $name:literal, $member:ident, $ty:ty, $ignore:expr) => {
        $crate::Field::<$record> {
            name: $name,
            kind: <$ty as $crate::TextValue>::KIND,
            ignore: $ignore,
            encode: |record: &$record, out: &mut String| {
                $crate::TextValue::encode_text(&record.$member, out)
            },
            decode: |record: &mut $record, raw: &str| {
                record.$member = <$ty as $crate::TextValue>::decode_text(raw)?;
                Ok(())
            },
        }
    };
}

/// Implement [`TextValue`] for a [`Record`] so it can nest inside others
#[macro_export]
macro_rules! record_text_value {
    ($record:ty) => {
        impl $crate::TextValue for $record {
            const KIND: $crate::FieldKind = $crate::FieldKind::Record;

            fn encode_text(&self, out: &mut String) {
                $crate::encode_record(self, out)
            }

            fn decode_text(raw: &str) -> $crate::RigResult<Self> {
                $crate::decode_record(raw)
            }
        }
    };
}

// ============================================================================
// PRIMITIVES
// ============================================================================

impl TextValue for String {
    const KIND: FieldKind = FieldKind::Text;

    fn encode_text(&self, out: &mut String) {
        out.push('"');
        out.push_str(self);
        out.push('"');
    }

    fn decode_text(raw: &str) -> RigResult<Self> {
        Ok(unquote(raw).to_string())
    }
}

impl TextValue for ControlId {
    const KIND: FieldKind = FieldKind::Text;

    fn encode_text(&self, out: &mut String) {
        out.push('"');
        out.push_str(self.as_str());
        out.push('"');
    }

    fn decode_text(raw: &str) -> RigResult<Self> {
        Ok(ControlId::new(unquote(raw)))
    }
}

impl TextValue for bool {
    const KIND: FieldKind = FieldKind::Bool;

    fn encode_text(&self, out: &mut String) {
        out.push_str(if *self { "true" } else { "false" });
    }

    fn decode_text(raw: &str) -> RigResult<Self> {
        if raw.eq_ignore_ascii_case("true") {
            Ok(true)
        } else if raw.eq_ignore_ascii_case("false") {
            Ok(false)
        } else {
            Err(RigError::InvalidBool(raw.to_string()))
        }
    }
}

impl TextValue for f32 {
    const KIND: FieldKind = FieldKind::Number;

    fn encode_text(&self, out: &mut String) {
        let _ = write!(out, "{}", self);
    }

    fn decode_text(raw: &str) -> RigResult<Self> {
        raw.parse::<f32>()
            .map_err(|_| RigError::InvalidNumber(raw.to_string()))
    }
}

/// `[a]`, `[a,b,c]` or `[a,b,c,d]`, truncated at the first sentinel
impl TextValue for RigValue {
    const KIND: FieldKind = FieldKind::Value;

    fn encode_text(&self, out: &mut String) {
        out.push('[');
        for (i, v) in self.components().iter().enumerate() {
            if i > 0 {
                out.push(',');
            }
            v.encode_text(out);
        }
        out.push(']');
    }

    fn decode_text(raw: &str) -> RigResult<Self> {
        let body = unwrap_delimited(raw, '[', ']')?;
        let components = body
            .split(',')
            .map(f32::decode_text)
            .collect::<RigResult<Vec<f32>>>()?;
        RigValue::from_components(&components)
    }
}

// ============================================================================
// CONTAINERS
// ============================================================================

impl<T: TextValue> TextValue for Vec<T> {
    const KIND: FieldKind = FieldKind::List;

    fn encode_text(&self, out: &mut String) {
        out.push('[');
        for (i, item) in self.iter().enumerate() {
            if i > 0 {
                out.push(',');
            }
            item.encode_text(out);
        }
        out.push(']');
    }

    fn decode_text(raw: &str) -> RigResult<Self> {
        if matches!(T::KIND, FieldKind::List | FieldKind::Map) {
            return Err(RigError::MalformedRecord(
                "lists of lists or maps are not supported".into(),
            ));
        }
        let body = unwrap_delimited(raw, '[', ']')?;
        split_top_level(body, ',')?
            .into_iter()
            .map(T::decode_text)
            .collect()
    }
}

impl<V: TextValue> TextValue for BTreeMap<String, V> {
    const KIND: FieldKind = FieldKind::Map;

    fn encode_text(&self, out: &mut String) {
        out.push('{');
        for (i, (key, value)) in self.iter().enumerate() {
            if i > 0 {
                out.push(',');
            }
            key.encode_text(out);
            out.push(':');
            value.encode_text(out);
        }
        out.push('}');
    }

    fn decode_text(raw: &str) -> RigResult<Self> {
        let body = unwrap_delimited(raw, '{', '}')?;
        let mut map = BTreeMap::new();
        for entry in split_top_level(body, ',')? {
            let (key, value) = split_pair(entry)?;
            if map.insert(key.to_string(), V::decode_text(value)?).is_some() {
                return Err(RigError::MalformedRecord(format!("duplicate key {:?}", key)));
            }
        }
        Ok(map)
    }
}
