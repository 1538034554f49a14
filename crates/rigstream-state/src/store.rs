//! Expression store
//!
//! Owns one [`ExpressionSet`] and keeps every expression's value slots
//! aligned with the control list. Every mutation either applies fully or
//! leaves the set as it was.

use std::fs;
use std::path::Path;

use tracing::{debug, info};

use rigstream_core::{ControlId, ControlValues, RigError, RigResult, RigValue, NEUTRAL_ATTR};
use rigstream_wire::{deserialize, serialize};

use crate::migrate::{apply_renames, upgrade};
use crate::set::{Expression, ExpressionSet, Meta, APPLICATION_ID};

/// Blank expression set shipped with the crate: the neutral pose plus one
/// expression per current tracker attribute, with no controls yet.
pub const DEFAULT_TEMPLATE: &str = include_str!("../templates/expression_set.json");

/// Character setup store
#[derive(Clone, Debug, PartialEq)]
pub struct ExpressionStore {
    set: ExpressionSet,
}

impl ExpressionStore {
    /// Empty store with a current header and nothing else
    pub fn new() -> Self {
        ExpressionStore {
            set: ExpressionSet {
                meta: Meta::current(),
                ..Default::default()
            },
        }
    }

    /// Store loaded from [`DEFAULT_TEMPLATE`]
    pub fn from_template() -> RigResult<Self> {
        let mut store = ExpressionStore::new();
        store.load(DEFAULT_TEMPLATE)?;
        Ok(store)
    }

    /// Wrap an already-built set after checking the alignment invariant
    pub fn from_set(mut set: ExpressionSet) -> RigResult<Self> {
        align(&mut set)?;
        Ok(ExpressionStore { set })
    }

    // ========================================================================
    // PERSISTENCE
    // ========================================================================

    /// Replace the store contents with a decoded setup.
    ///
    /// On any failure the previous contents are kept.
    pub fn load(&mut self, text: &str) -> RigResult<()> {
        let mut set: ExpressionSet =
            deserialize(text).map_err(|e| RigError::BadSetupContent(e.to_string()))?;

        if set.meta.application != APPLICATION_ID {
            return Err(RigError::ApplicationMismatch {
                expected: APPLICATION_ID.to_string(),
                found: set.meta.application,
            });
        }

        for (i, control) in set.controls.iter().enumerate() {
            if set.controls[..i].contains(control) {
                return Err(RigError::BadSetupContent(format!(
                    "duplicate control {}",
                    control
                )));
            }
        }

        align(&mut set)?;

        let renamed = apply_renames(&mut set);
        if renamed > 0 {
            debug!(renamed, "Applied legacy attribute renames");
        }
        upgrade(&mut set);

        info!(
            controls = set.controls.len(),
            expressions = set.expressions.len(),
            "Loaded expression set"
        );
        self.set = set;
        Ok(())
    }

    pub fn load_file(&mut self, path: impl AsRef<Path>) -> RigResult<()> {
        let path = path.as_ref();
        let text = fs::read_to_string(path)
            .map_err(|e| RigError::SetupIo(format!("{}: {}", path.display(), e)))?;
        self.load(&text)
    }

    /// Serialize the current set
    pub fn save(&self) -> String {
        serialize(&self.set)
    }

    pub fn save_file(&self, path: impl AsRef<Path>) -> RigResult<()> {
        let path = path.as_ref();
        fs::write(path, self.save())
            .map_err(|e| RigError::SetupIo(format!("{}: {}", path.display(), e)))
    }

    // ========================================================================
    // CONTROLS
    // ========================================================================

    pub fn controls(&self) -> &[ControlId] {
        &self.set.controls
    }

    /// Append controls not already present, giving every expression a
    /// neutral slot for each. All names are checked before any is added.
    /// Returns the number of controls added.
    pub fn add_controls<I, S>(&mut self, names: I) -> RigResult<usize>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let controls = names
            .into_iter()
            .map(|name| ControlId::parse(name.as_ref()))
            .collect::<RigResult<Vec<_>>>()?;

        let mut added = 0;
        for control in controls {
            if self.set.controls.contains(&control) {
                continue;
            }
            let slot = RigValue::neutral_for(&control);
            for expression in &mut self.set.expressions {
                expression.values.push(slot);
            }
            self.set.controls.push(control);
            added += 1;
        }
        Ok(added)
    }

    /// Remove controls and their slots. Unknown names are skipped.
    /// Returns the number of controls removed.
    pub fn remove_controls<I, S>(&mut self, names: I) -> usize
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut removed = 0;
        for name in names {
            if let Some(index) = self.set.control_index(name.as_ref()) {
                self.set.controls.remove(index);
                for expression in &mut self.set.expressions {
                    expression.values.remove(index);
                }
                removed += 1;
            }
        }
        removed
    }

    // ========================================================================
    // EXPRESSIONS
    // ========================================================================

    pub fn expression_set(&self) -> &ExpressionSet {
        &self.set
    }

    pub fn expressions(&self) -> &[Expression] {
        &self.set.expressions
    }

    pub fn expression(&self, attr: &str) -> Option<&Expression> {
        self.set.expression(attr)
    }

    /// `(display name, attr)` for every expression, in declaration order
    pub fn expression_names(&self) -> Vec<(&str, &str)> {
        self.set
            .expressions
            .iter()
            .map(|e| (e.name.as_str(), e.attr.as_str()))
            .collect()
    }

    /// Control -> value for one expression
    pub fn control_values(&self, attr: &str) -> RigResult<ControlValues> {
        let expression = self
            .set
            .expression(attr)
            .ok_or_else(|| RigError::ExpressionNotFound(attr.to_string()))?;

        Ok(self
            .set
            .controls
            .iter()
            .cloned()
            .zip(expression.values.iter().copied())
            .collect())
    }

    /// Overwrite the slots of the controls named in `values`; other slots
    /// and the in-use flag are untouched. Controls the set does not have
    /// are skipped. Returns the number of slots written.
    pub fn set_control_values(&mut self, attr: &str, values: &ControlValues) -> RigResult<usize> {
        let ExpressionSet {
            controls,
            expressions,
            ..
        } = &mut self.set;

        let expression = expressions
            .iter_mut()
            .find(|e| e.attr == attr)
            .ok_or_else(|| RigError::ExpressionNotFound(attr.to_string()))?;

        let mut written = 0;
        for (control, value) in values {
            if let Some(index) = controls.iter().position(|c| c == control) {
                expression.values[index] = *value;
                written += 1;
            }
        }
        Ok(written)
    }

    /// False for unknown expressions
    pub fn in_use(&self, attr: &str) -> bool {
        self.set.expression(attr).map_or(false, |e| e.in_use)
    }

    pub fn set_in_use(&mut self, attr: &str, in_use: bool) -> RigResult<()> {
        let expression = self
            .set
            .expression_mut(attr)
            .ok_or_else(|| RigError::ExpressionNotFound(attr.to_string()))?;
        expression.in_use = in_use;
        Ok(())
    }

    /// Values of the neutral expression, or synthesized rest values when
    /// it is missing or does not cover every control
    pub fn neutral_offsets(&self) -> ControlValues {
        match self.control_values(NEUTRAL_ATTR) {
            Ok(offsets) if offsets.len() == self.set.controls.len() => offsets,
            _ => self
                .set
                .controls
                .iter()
                .map(|c| (c.clone(), RigValue::neutral_for(c)))
                .collect(),
        }
    }
}

impl Default for ExpressionStore {
    fn default() -> Self {
        Self::new()
    }
}

/// Give empty value lists a neutral slot per control and reject any other
/// count mismatch
fn align(set: &mut ExpressionSet) -> RigResult<()> {
    let controls = &set.controls;
    for expression in &mut set.expressions {
        if expression.values.len() == controls.len() {
            continue;
        }
        if expression.values.is_empty() {
            expression.values = controls.iter().map(RigValue::neutral_for).collect();
            continue;
        }
        return Err(RigError::ControlCountMismatch {
            expression: expression.attr.clone(),
            controls: controls.len(),
            values: expression.values.len(),
        });
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    const SMALL_SET: &str = r#"{
        "Meta": { "Application": "Live", "version": "1.0" },
        "Controls": [ "Jaw:rot", "Jaw:pos", "Face:blink" ],
        "Expressions": [
            { "Name": "Neutral", "Desc": "", "Attr": "neutral", "InUse": true,
              "Values": [ [0,0,0,1], [0,1,0], [0] ] },
            { "Name": "Frown L", "Desc": "Left corner down", "Attr": "left_frown", "InUse": true,
              "Values": [ [0.1,0,0,0.995], [0,0.5,0], [1] ] }
        ]
    }"#;

    fn small_store() -> ExpressionStore {
        let mut store = ExpressionStore::new();
        store.load(SMALL_SET).unwrap();
        store
    }

    #[test]
    fn test_load_renames_legacy_attrs() {
        let store = small_store();
        assert_eq!(
            store.expression_names(),
            vec![("Neutral", "neutral"), ("Frown L", "mouth_left_frown")]
        );
        assert!(store.expression("left_frown").is_none());
    }

    #[test]
    fn test_load_rejects_wrong_application() {
        let mut store = small_store();
        let before = store.clone();

        let text = SMALL_SET.replace("\"Live\"", "\"Studio\"");
        let err = store.load(&text).unwrap_err();
        assert!(matches!(err, RigError::ApplicationMismatch { .. }));
        assert_eq!(store, before);
    }

    #[test]
    fn test_load_failures_leave_store_unchanged() {
        let mut store = small_store();
        let before = store.clone();

        assert!(store.load("{\"Meta\":").is_err());
        assert!(store.load(&SMALL_SET.replace("[0.1,0,0,0.995],", "")).is_err());
        assert!(store
            .load(&SMALL_SET.replace("\"Face:blink\"", "\"Jaw:rot\""))
            .is_err());
        assert_eq!(store, before);
    }

    #[test]
    fn test_load_fills_empty_values() {
        let mut store = ExpressionStore::new();
        store
            .load(
                r#"{"Meta":{"Application":"Live","version":"1.0"},"Controls":["Head:rot","Head:pos"],
                "Expressions":[{"Name":"Smile","Desc":"","Attr":"smile","InUse":false,"Values":[]}]}"#,
            )
            .unwrap();

        let values = store.control_values("smile").unwrap();
        assert_eq!(values[&ControlId::new("Head:rot")], RigValue::IDENTITY_ROTATION);
        assert_eq!(values[&ControlId::new("Head:pos")], RigValue::offset(0.0, 0.0, 0.0));
    }

    #[test]
    fn test_template() {
        let store = ExpressionStore::from_template().unwrap();
        assert!(store.controls().is_empty());
        assert!(store.expression(NEUTRAL_ATTR).is_some());
        assert!(store.expression("mouth_left_frown").is_some());
        assert!(store.expressions().iter().all(|e| !e.in_use));
        assert_eq!(
            store.expression("mouth_open").map(|e| e.desc.as_str()),
            Some("Jaw dropped, lips relaxed")
        );
    }

    #[test]
    fn test_save_load_roundtrip() {
        let store = small_store();
        let mut reloaded = ExpressionStore::new();
        reloaded.load(&store.save()).unwrap();
        assert_eq!(reloaded, store);
    }

    #[test]
    fn test_save_file_roundtrip() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("character.json");

        let store = small_store();
        store.save_file(&path).unwrap();

        let mut reloaded = ExpressionStore::new();
        reloaded.load_file(&path).unwrap();
        assert_eq!(reloaded, store);

        let err = reloaded.load_file(dir.path().join("missing.json")).unwrap_err();
        assert!(matches!(err, RigError::SetupIo(_)));
    }

    #[test]
    fn test_add_controls_defaults() {
        let mut store = small_store();
        let added = store
            .add_controls(["Brow:rot", "Brow:pos", "Face:smile", "Jaw:rot"])
            .unwrap();
        assert_eq!(added, 3);
        assert_eq!(store.controls().len(), 6);

        let values = store.control_values("mouth_left_frown").unwrap();
        assert_eq!(values[&ControlId::new("Brow:rot")], RigValue::IDENTITY_ROTATION);
        assert_eq!(values[&ControlId::new("Brow:pos")], RigValue::offset(0.0, 0.0, 0.0));
        assert_eq!(values[&ControlId::new("Face:smile")], RigValue::scalar(0.0));
        assert!(store.expressions().iter().all(|e| e.values.len() == 6));
    }

    #[test]
    fn test_add_controls_is_atomic() {
        let mut store = small_store();
        let err = store.add_controls(["Brow:rot", "nocolon"]).unwrap_err();
        assert!(matches!(err, RigError::InvalidControl(_)));
        assert_eq!(store.controls().len(), 3);
    }

    #[test]
    fn test_remove_controls() {
        let mut store = small_store();
        assert_eq!(store.remove_controls(["Jaw:pos", "Nope:pos"]), 1);
        assert_eq!(
            store.controls(),
            &[ControlId::new("Jaw:rot"), ControlId::new("Face:blink")]
        );

        let values = store.control_values("mouth_left_frown").unwrap();
        assert_eq!(values[&ControlId::new("Face:blink")], RigValue::scalar(1.0));
        assert_eq!(
            values[&ControlId::new("Jaw:rot")],
            RigValue::rotation(0.1, 0.0, 0.0, 0.995)
        );
    }

    #[test]
    fn test_set_control_values_partial() {
        let mut store = small_store();
        store.set_in_use("mouth_left_frown", false).unwrap();

        let mut update = ControlValues::new();
        update.insert(ControlId::new("Face:blink"), RigValue::scalar(0.25));
        update.insert(ControlId::new("Other:blink"), RigValue::scalar(0.75));
        assert_eq!(store.set_control_values("mouth_left_frown", &update).unwrap(), 1);

        let values = store.control_values("mouth_left_frown").unwrap();
        assert_eq!(values[&ControlId::new("Face:blink")], RigValue::scalar(0.25));
        assert_eq!(values[&ControlId::new("Jaw:pos")], RigValue::offset(0.0, 0.5, 0.0));
        assert!(!store.in_use("mouth_left_frown"));
    }

    #[test]
    fn test_unknown_expression() {
        let mut store = small_store();
        assert!(matches!(
            store.control_values("nope"),
            Err(RigError::ExpressionNotFound(_))
        ));
        assert!(store.set_in_use("nope", true).is_err());
        assert!(store
            .set_control_values("nope", &ControlValues::new())
            .is_err());
        assert!(!store.in_use("nope"));
    }

    #[test]
    fn test_neutral_offsets() {
        let store = small_store();
        let offsets = store.neutral_offsets();
        assert_eq!(offsets[&ControlId::new("Jaw:pos")], RigValue::offset(0.0, 1.0, 0.0));

        let mut bare = ExpressionStore::new();
        bare.add_controls(["Jaw:rot", "Jaw:pos"]).unwrap();
        let offsets = bare.neutral_offsets();
        assert_eq!(offsets[&ControlId::new("Jaw:rot")], RigValue::IDENTITY_ROTATION);
        assert_eq!(offsets[&ControlId::new("Jaw:pos")], RigValue::offset(0.0, 0.0, 0.0));
    }

    #[test]
    fn test_from_set_checks_alignment() {
        let set = ExpressionSet {
            meta: Meta::current(),
            controls: vec![ControlId::new("A:pos")],
            expressions: vec![Expression {
                values: vec![RigValue::ZERO, RigValue::ZERO],
                ..Expression::new("X", "x")
            }],
        };
        assert!(matches!(
            ExpressionStore::from_set(set),
            Err(RigError::ControlCountMismatch { .. })
        ));
    }

    mod props {
        use super::*;
        use proptest::prelude::*;

        #[derive(Clone, Debug)]
        enum Op {
            Add(Vec<String>),
            Remove(Vec<String>),
        }

        fn control_name() -> impl Strategy<Value = String> {
            ("[A-C]", prop::sample::select(vec!["pos", "rot", "blink", "smile"]))
                .prop_map(|(object, attr)| format!("{}:{}", object, attr))
        }

        fn op() -> impl Strategy<Value = Op> {
            prop_oneof![
                prop::collection::vec(control_name(), 0..4).prop_map(Op::Add),
                prop::collection::vec(control_name(), 0..4).prop_map(Op::Remove),
            ]
        }

        proptest! {
            #[test]
            fn prop_slots_stay_aligned(ops in prop::collection::vec(op(), 0..24)) {
                let mut store = ExpressionStore::from_template().unwrap();
                for op in ops {
                    match op {
                        Op::Add(names) => { store.add_controls(names).unwrap(); }
                        Op::Remove(names) => { store.remove_controls(names); }
                    }
                    let count = store.controls().len();
                    prop_assert!(store.expressions().iter().all(|e| e.values.len() == count));
                }
            }

            #[test]
            fn prop_store_roundtrip(
                names in prop::collection::vec(control_name(), 0..8),
                weight in -1.0f32..1.0,
            ) {
                let mut store = ExpressionStore::from_template().unwrap();
                store.add_controls(&names).unwrap();

                let update: ControlValues = store
                    .controls()
                    .iter()
                    .filter(|c| !c.is_rotation())
                    .map(|c| (c.clone(), RigValue::scalar(weight)))
                    .collect();
                store.set_control_values("mouth_open", &update).unwrap();
                store.set_in_use("mouth_open", true).unwrap();

                let mut reloaded = ExpressionStore::new();
                reloaded.load(&store.save()).unwrap();
                prop_assert_eq!(reloaded, store);
            }
        }
    }
}
