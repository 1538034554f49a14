//! Control identifiers
//!
//! A control is one addressable channel on the rig, named
//! `"<object-name>:<attribute>"`. The attribute is the translation marker,
//! the rotation marker, or the name of a blend shape on that object.

use std::borrow::Borrow;
use std::fmt;

use crate::{RigError, RigResult};

/// Attribute marker for translation controls
pub const TRANSLATION_SUFFIX: &str = "pos";

/// Attribute marker for rotation controls
pub const ROTATION_SUFFIX: &str = "rot";

/// Separator between object name and attribute
pub const OBJECT_ATTR_SEPARATOR: char = ':';

/// What a control drives on the scene object
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum ControlKind {
    Translation,
    Rotation,
    BlendShape,
}

/// Full control key, unique per object and attribute
#[derive(Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
pub struct ControlId(String);

impl ControlId {
    /// Wrap a raw key without validation
    pub fn new(key: impl Into<String>) -> Self {
        ControlId(key.into())
    }

    /// Join an object name and attribute
    pub fn join(object: &str, attribute: &str) -> Self {
        ControlId(format!("{}{}{}", object, OBJECT_ATTR_SEPARATOR, attribute))
    }

    /// Parse a key, rejecting identifiers without an object/attribute split
    pub fn parse(key: &str) -> RigResult<Self> {
        match key.rfind(OBJECT_ATTR_SEPARATOR) {
            Some(pos) if pos > 0 && pos + 1 < key.len() => Ok(ControlId(key.to_string())),
            _ => Err(RigError::InvalidControl(key.to_string())),
        }
    }

    /// Split at the last separator; object names may themselves contain `:`
    pub fn split(&self) -> (&str, &str) {
        match self.0.rfind(OBJECT_ATTR_SEPARATOR) {
            Some(pos) => (&self.0[..pos], &self.0[pos + 1..]),
            None => ("", self.0.as_str()),
        }
    }

    pub fn object(&self) -> &str {
        self.split().0
    }

    pub fn attribute(&self) -> &str {
        self.split().1
    }

    /// Classify by suffix, matching how expression defaults are chosen
    pub fn kind(&self) -> ControlKind {
        if self.0.ends_with(ROTATION_SUFFIX) {
            ControlKind::Rotation
        } else if self.0.ends_with(TRANSLATION_SUFFIX) {
            ControlKind::Translation
        } else {
            ControlKind::BlendShape
        }
    }

    pub fn is_rotation(&self) -> bool {
        self.kind() == ControlKind::Rotation
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn into_string(self) -> String {
        self.0
    }
}

impl fmt::Debug for ControlId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Control({})", self.0)
    }
}

impl fmt::Display for ControlId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl AsRef<str> for ControlId {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl Borrow<str> for ControlId {
    fn borrow(&self) -> &str {
        &self.0
    }
}

impl From<&str> for ControlId {
    fn from(key: &str) -> Self {
        ControlId::new(key)
    }
}

impl From<String> for ControlId {
    fn from(key: String) -> Self {
        ControlId(key)
    }
}
