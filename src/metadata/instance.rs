//! Live-object handles.
//!
//! An [`Instance`] stands in for a reference to a live, fully constructed object on the
//! modeled heap. It is either a scalar instance of a registered class or an array with a
//! component storage kind and a length. A handle keeps its class alive (a live object always
//! does), which is also what makes weak cache entries for that class resolvable while any
//! instance is still measurable.

use std::fmt;

use crate::metadata::{
    class::ClassRc,
    primitives::{PrimitiveKind, StorageKind},
};

/// Shape of a live object: scalar instance or array
pub(crate) enum InstanceShape {
    /// Instance of a class; layout is derived from the class metadata alone
    Scalar(ClassRc),
    /// Array of a component kind with a length read from the instance
    Array {
        /// Component storage classification
        component: StorageKind,
        /// Element count
        length: usize,
    },
}

/// A handle to a live object on the modeled heap.
///
/// # Examples
///
/// ```rust
/// use heapscope::prelude::*;
///
/// let registry = ClassRegistry::new();
/// let point = ClassBuilder::new("geom", "Point")
///     .field("x", StorageKind::Primitive(PrimitiveKind::Int))
///     .register(&registry);
///
/// let object = Instance::of(&point);
/// assert!(!object.is_array());
///
/// let buffer = Instance::primitive_array(PrimitiveKind::Byte, 4096);
/// assert!(buffer.is_array());
/// assert_eq!(buffer.array_length(), Some(4096));
/// ```
pub struct Instance {
    shape: InstanceShape,
}

impl Instance {
    /// Creates a handle to a scalar instance of the given class
    #[must_use]
    pub fn of(class: &ClassRc) -> Self {
        Instance {
            shape: InstanceShape::Scalar(class.clone()),
        }
    }

    /// Creates a handle to an array of the given component kind and length
    #[must_use]
    pub fn array(component: StorageKind, length: usize) -> Self {
        Instance {
            shape: InstanceShape::Array { component, length },
        }
    }

    /// Creates a handle to a primitive array
    #[must_use]
    pub fn primitive_array(kind: PrimitiveKind, length: usize) -> Self {
        Instance::array(StorageKind::Primitive(kind), length)
    }

    /// Creates a handle to a reference array
    #[must_use]
    pub fn reference_array(length: usize) -> Self {
        Instance::array(StorageKind::Reference, length)
    }

    /// Returns true if the handle refers to an array
    #[must_use]
    pub fn is_array(&self) -> bool {
        matches!(self.shape, InstanceShape::Array { .. })
    }

    /// The class of a scalar instance; None for arrays
    #[must_use]
    pub fn class(&self) -> Option<&ClassRc> {
        match &self.shape {
            InstanceShape::Scalar(class) => Some(class),
            InstanceShape::Array { .. } => None,
        }
    }

    /// The element count of an array; None for scalar instances
    #[must_use]
    pub fn array_length(&self) -> Option<usize> {
        match &self.shape {
            InstanceShape::Scalar(_) => None,
            InstanceShape::Array { length, .. } => Some(*length),
        }
    }

    pub(crate) fn shape(&self) -> &InstanceShape {
        &self.shape
    }
}

impl fmt::Debug for Instance {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.shape {
            InstanceShape::Scalar(class) => write!(f, "Instance({})", class.fullname()),
            InstanceShape::Array { component, length } => {
                write!(f, "Instance({component:?}[{length}])")
            }
        }
    }
}
