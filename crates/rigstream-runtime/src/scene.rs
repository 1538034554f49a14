//! Scene capability
//!
//! The host exposes its rig through [`SceneRig`]. A control maps onto a
//! scene object by name: `obj:pos` is its local position, `obj:rot` its
//! local rotation, and any other attribute names a blend shape on it.

use std::collections::BTreeMap;

use rigstream_core::{ControlId, RigValue, ROTATION_SUFFIX, TRANSLATION_SUFFIX};
use rigstream_pose::Rotation;

/// Read and write access to a host rig
pub trait SceneRig {
    /// Current value of a control, or `None` if the scene does not have it
    fn read_control(&self, control: &ControlId) -> Option<RigValue>;

    /// Write a control. Returns false if the scene does not have it.
    fn write_control(&mut self, control: &ControlId, value: RigValue) -> bool;

    /// Every control of an object: position, rotation, then blend shapes
    /// in mesh order. `None` if there is no such object.
    fn controls_for_object(&self, object: &str) -> Option<Vec<ControlId>>;

    fn has_control(&self, control: &ControlId) -> bool {
        self.read_control(control).is_some()
    }
}

/// One object of an [`InMemoryRig`]
#[derive(Clone, Debug, Default, PartialEq)]
pub struct SceneObject {
    pub position: [f32; 3],
    pub rotation: Rotation,
    /// Blend shape name and weight, in mesh order
    pub blend_shapes: Vec<(String, f32)>,
}

impl SceneObject {
    pub fn new() -> Self {
        Self::default()
    }

    /// Object with the given blend shapes, all at weight zero
    pub fn with_blend_shapes<I, S>(names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        SceneObject {
            blend_shapes: names.into_iter().map(|n| (n.into(), 0.0)).collect(),
            ..Default::default()
        }
    }

    pub fn blend_shape(&self, name: &str) -> Option<f32> {
        self.blend_shapes
            .iter()
            .find(|(shape, _)| shape == name)
            .map(|(_, weight)| *weight)
    }

    fn blend_shape_mut(&mut self, name: &str) -> Option<&mut f32> {
        self.blend_shapes
            .iter_mut()
            .find(|(shape, _)| shape == name)
            .map(|(_, weight)| weight)
    }
}

/// A [`SceneRig`] over plain data
#[derive(Clone, Debug, Default, PartialEq)]
pub struct InMemoryRig {
    objects: BTreeMap<String, SceneObject>,
}

impl InMemoryRig {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_object(mut self, name: impl Into<String>, object: SceneObject) -> Self {
        self.add_object(name, object);
        self
    }

    pub fn add_object(&mut self, name: impl Into<String>, object: SceneObject) {
        self.objects.insert(name.into(), object);
    }

    pub fn object(&self, name: &str) -> Option<&SceneObject> {
        self.objects.get(name)
    }

    pub fn object_mut(&mut self, name: &str) -> Option<&mut SceneObject> {
        self.objects.get_mut(name)
    }

    pub fn object_names(&self) -> impl Iterator<Item = &str> {
        self.objects.keys().map(String::as_str)
    }
}

impl SceneRig for InMemoryRig {
    fn read_control(&self, control: &ControlId) -> Option<RigValue> {
        let (name, attr) = control.split();
        let object = self.objects.get(name)?;
        match attr {
            TRANSLATION_SUFFIX => {
                let [x, y, z] = object.position;
                Some(RigValue::offset(x, y, z))
            }
            ROTATION_SUFFIX => Some(object.rotation.into()),
            shape => object.blend_shape(shape).map(RigValue::scalar),
        }
    }

    fn write_control(&mut self, control: &ControlId, value: RigValue) -> bool {
        let (name, attr) = control.split();
        let Some(object) = self.objects.get_mut(name) else {
            return false;
        };
        match attr {
            TRANSLATION_SUFFIX => {
                object.position = [value.x(), value.y(), value.z()];
                true
            }
            ROTATION_SUFFIX => {
                object.rotation = Rotation::from(value);
                true
            }
            shape => match object.blend_shape_mut(shape) {
                Some(weight) => {
                    *weight = value.x();
                    true
                }
                None => false,
            },
        }
    }

    fn controls_for_object(&self, name: &str) -> Option<Vec<ControlId>> {
        let object = self.objects.get(name)?;
        let mut controls = vec![
            ControlId::join(name, TRANSLATION_SUFFIX),
            ControlId::join(name, ROTATION_SUFFIX),
        ];
        controls.extend(
            object
                .blend_shapes
                .iter()
                .map(|(shape, _)| ControlId::join(name, shape)),
        );
        Some(controls)
    }
}
