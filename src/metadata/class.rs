//! Class descriptors and inheritance links.
//!
//! A [`ClassDescriptor`] is the unit of metadata the layout core consumes: name, base-class
//! link, declared fields, annotations, and whether the class is open to introspection at all.
//! Descriptors are owned by the [`ClassRegistry`](crate::metadata::ClassRegistry) behind an
//! `Arc`; the base-class link is a weak [`ClassRef`] so that an inheritance chain never keeps
//! an unloaded class alive. Base links are resolved in a second phase after registration,
//! which is why the link sits behind a `OnceLock`.

use std::sync::{Arc, OnceLock, Weak};

use crate::metadata::{annotations::Annotation, token::Token, FieldList, FieldRc};

/// Reference counted [`ClassDescriptor`]
pub type ClassRc = Arc<ClassDescriptor>;

/// A smart reference to a [`ClassDescriptor`] that holds a weak link to prevent inheritance
/// chains from keeping unloaded classes alive
#[derive(Clone, Debug)]
pub struct ClassRef {
    weak_ref: Weak<ClassDescriptor>,
}

impl ClassRef {
    /// Create a new `ClassRef` from a strong reference
    #[must_use]
    pub fn new(strong_ref: &ClassRc) -> Self {
        Self {
            weak_ref: Arc::downgrade(strong_ref),
        }
    }

    /// Get a strong reference to the class, returning None if the class has been dropped
    #[must_use]
    pub fn upgrade(&self) -> Option<ClassRc> {
        self.weak_ref.upgrade()
    }

    /// Check if the referenced class is still alive
    #[must_use]
    pub fn is_valid(&self) -> bool {
        self.weak_ref.strong_count() > 0
    }

    /// Get the token of the referenced class (if still alive)
    #[must_use]
    pub fn token(&self) -> Option<Token> {
        self.upgrade().map(|c| c.token)
    }
}

impl From<ClassRc> for ClassRef {
    fn from(strong_ref: ClassRc) -> Self {
        Self::new(&strong_ref)
    }
}

/// Static metadata of one class: identity, inheritance, declared fields, annotations.
///
/// # Examples
///
/// ```rust
/// use heapscope::prelude::*;
///
/// let registry = ClassRegistry::new();
/// let node = ClassBuilder::new("collections", "Node")
///     .field("item", StorageKind::Reference)
///     .field("next", StorageKind::Reference)
///     .register(&registry);
///
/// assert_eq!(node.fullname(), "collections.Node");
/// assert_eq!(node.fields.count(), 2);
/// assert!(node.base().is_none());
/// ```
pub struct ClassDescriptor {
    /// Registry-assigned identity
    pub token: Token,
    /// Namespace (can be empty for unnamespaced classes)
    pub namespace: String,
    /// Simple class name
    pub name: String,
    /// Base class link, resolved after registration
    base: OnceLock<ClassRef>,
    /// Declared fields, instance and static alike, in declaration order
    pub fields: FieldList,
    /// Annotations attached to the class itself
    pub annotations: Vec<Annotation>,
    /// Whether the class metadata may be inspected; when false, every measurement of an
    /// instance of this class (or of a subclass) fails with `ReflectionUnavailable`
    pub introspectable: bool,
}

impl ClassDescriptor {
    /// Creates a new descriptor.
    ///
    /// # Arguments
    /// * `token` - Registry-assigned identity
    /// * `namespace` - Namespace, may be empty
    /// * `name` - Simple class name
    /// * `base` - Base class, if already known; may also be linked later via [`Self::set_base`]
    /// * `fields` - Declared fields in declaration order
    /// * `annotations` - Class-level annotations
    /// * `introspectable` - Whether metadata may be inspected
    #[must_use]
    pub fn new(
        token: Token,
        namespace: String,
        name: String,
        base: Option<ClassRc>,
        fields: FieldList,
        annotations: Vec<Annotation>,
        introspectable: bool,
    ) -> Self {
        let base_lock = OnceLock::new();
        if let Some(base_value) = base {
            base_lock.set(base_value.into()).ok();
        }

        ClassDescriptor {
            token,
            namespace,
            name,
            base: base_lock,
            fields,
            annotations,
            introspectable,
        }
    }

    /// Access the base class of this class, if it exists and is still alive
    #[must_use]
    pub fn base(&self) -> Option<ClassRc> {
        self.base.get().and_then(ClassRef::upgrade)
    }

    /// Access the raw base link without upgrading it.
    ///
    /// `None` means the class genuinely has no base class; a link that fails to upgrade means
    /// the base class has been unloaded.
    #[must_use]
    pub fn base_ref(&self) -> Option<&ClassRef> {
        self.base.get()
    }

    /// Links the base class; returns false if a base was already set
    pub fn set_base(&self, base: ClassRef) -> bool {
        self.base.set(base).is_ok()
    }

    /// Returns the full name (Namespace.Name) of the class
    #[must_use]
    pub fn fullname(&self) -> String {
        if self.namespace.is_empty() {
            self.name.clone()
        } else {
            format!("{0}.{1}", self.namespace, self.name)
        }
    }

    /// Appends a declared field
    pub fn add_field(&self, field: FieldRc) {
        self.fields.push(field);
    }

    /// Looks up a class-level annotation by the class identity of its annotation type
    #[must_use]
    pub fn annotation(&self, class: Token) -> Option<&Annotation> {
        self.annotations.iter().find(|a| a.class() == class)
    }

    /// Returns true if the class carries an annotation of the given type
    #[must_use]
    pub fn has_annotation(&self, class: Token) -> bool {
        self.annotation(class).is_some()
    }
}
