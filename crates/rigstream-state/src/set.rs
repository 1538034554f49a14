//! Expression set records
//!
//! ```text
//! {"Meta":{"Application":"Live","version":"1.0"},
//!  "Controls":["Jaw:rot",...],
//!  "Expressions":[{"Name":..,"Desc":..,"Attr":..,"InUse":..,"Values":[[..],..]}]}
//! ```

use rigstream_core::{ControlId, RigValue};
use rigstream_wire::{field, record_text_value, Field, Record};

/// Application tag every setup file must carry
pub const APPLICATION_ID: &str = "Live";

/// Current setup format version
pub const CURRENT_VERSION: &str = "1.0";

/// File header
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Meta {
    pub application: String,
    pub version: String,
}

impl Meta {
    /// Header written by this version
    pub fn current() -> Self {
        Meta {
            application: APPLICATION_ID.to_string(),
            version: CURRENT_VERSION.to_string(),
        }
    }
}

impl Record for Meta {
    const NAME: &'static str = "Meta";

    fn fields() -> &'static [Field<Self>] {
        static FIELDS: [Field<Meta>; 2] = [
            field!(Meta, "Application" => application: String),
            field!(Meta, "version" => version: String),
        ];
        &FIELDS
    }
}

record_text_value!(Meta);

/// A named facial pose: one value per control of the owning set
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Expression {
    /// Display name
    pub name: String,
    pub desc: String,
    /// Key matched against tracker weights
    pub attr: String,
    /// Excluded from blending when false
    pub in_use: bool,
    /// Aligned with [`ExpressionSet::controls`]
    pub values: Vec<RigValue>,
}

impl Expression {
    pub fn new(name: impl Into<String>, attr: impl Into<String>) -> Self {
        Expression {
            name: name.into(),
            attr: attr.into(),
            ..Default::default()
        }
    }

    pub fn with_desc(mut self, desc: impl Into<String>) -> Self {
        self.desc = desc.into();
        self
    }
}

impl Record for Expression {
    const NAME: &'static str = "Expression";

    fn fields() -> &'static [Field<Self>] {
        static FIELDS: [Field<Expression>; 5] = [
            field!(Expression, "Name" => name: String),
            field!(Expression, "Desc" => desc: String),
            field!(Expression, "Attr" => attr: String),
            field!(Expression, "InUse" => in_use: bool),
            field!(Expression, "Values" => values: Vec<RigValue>),
        ];
        &FIELDS
    }
}

record_text_value!(Expression);

/// Root record of a character setup
#[derive(Clone, Debug, Default, PartialEq)]
pub struct ExpressionSet {
    pub meta: Meta,
    pub controls: Vec<ControlId>,
    pub expressions: Vec<Expression>,
}

impl ExpressionSet {
    /// Find an expression by attribute
    pub fn expression(&self, attr: &str) -> Option<&Expression> {
        self.expressions.iter().find(|e| e.attr == attr)
    }

    pub fn expression_mut(&mut self, attr: &str) -> Option<&mut Expression> {
        self.expressions.iter_mut().find(|e| e.attr == attr)
    }

    /// Index of a control in the value slots
    pub fn control_index(&self, control: &str) -> Option<usize> {
        self.controls.iter().position(|c| c.as_str() == control)
    }
}

impl Record for ExpressionSet {
    const NAME: &'static str = "ExpressionSet";

    fn fields() -> &'static [Field<Self>] {
        static FIELDS: [Field<ExpressionSet>; 3] = [
            field!(ExpressionSet, "Meta" => meta: Meta),
            field!(ExpressionSet, "Controls" => controls: Vec<ControlId>),
            field!(ExpressionSet, "Expressions" => expressions: Vec<Expression>),
        ];
        &FIELDS
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rigstream_wire::{deserialize, serialize};

    #[test]
    fn test_file_shape() {
        let set = ExpressionSet {
            meta: Meta::current(),
            controls: vec![ControlId::new("Jaw:rot"), ControlId::new("Face:blink")],
            expressions: vec![Expression {
                name: "Mouth Open".into(),
                desc: "Open the jaw".into(),
                attr: "mouth_open".into(),
                in_use: true,
                values: vec![RigValue::rotation(0.1, 0.0, 0.0, 0.99), RigValue::scalar(0.0)],
            }],
        };

        assert_eq!(
            serialize(&set),
            concat!(
                r#"{"Meta":{"Application":"Live","version":"1.0"},"#,
                r#""Controls":["Jaw:rot","Face:blink"],"#,
                r#""Expressions":[{"Name":"Mouth Open","Desc":"Open the jaw","Attr":"mouth_open","InUse":true,"Values":[[0.1,0,0,0.99],[0]]}]}"#
            )
        );

        let back: ExpressionSet = deserialize(&serialize(&set)).unwrap();
        assert_eq!(back, set);
    }

    #[test]
    fn test_lookup() {
        let set = ExpressionSet {
            controls: vec![ControlId::new("A:pos"), ControlId::new("B:rot")],
            expressions: vec![Expression::new("Smile", "smile"), Expression::new("Blink", "blink")],
            ..Default::default()
        };

        assert_eq!(set.expression("blink").map(|e| e.name.as_str()), Some("Blink"));
        assert!(set.expression("frown").is_none());
        assert_eq!(set.control_index("B:rot"), Some(1));
        assert_eq!(set.control_index("C:rot"), None);
    }

    #[test]
    fn test_missing_meta_is_blank() {
        let set: ExpressionSet = deserialize(r#"{"Controls":[],"Expressions":[]}"#).unwrap();
        assert!(set.meta.application.is_empty());
    }
}
