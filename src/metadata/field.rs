//! Instance field descriptors.
//!
//! A [`FieldDescriptor`] records everything the layout core needs to know about one declared
//! field: its storage classification, its modifier flags, and any annotations. The declaring
//! class is implied by ownership - fields live in their class's field list and are never
//! shared between classes.

use bitflags::bitflags;

use crate::metadata::{annotations::Annotation, primitives::StorageKind, token::Token};

bitflags! {
    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    /// Modifier flags of a declared field
    pub struct FieldModifiers : u32 {
        /// The field belongs to the class, not to instances; it occupies no instance storage
        const STATIC = 0x0001;
        /// The field was inserted by the host runtime (enclosing-instance back-reference,
        /// captured local); it occupies real storage like any declared field
        const SYNTHETIC = 0x0002;
        /// The field carries the ignore marker and contributes zero bytes
        const IGNORED = 0x0004;
    }
}

/// A declared instance or static field of a class.
#[derive(Debug, Clone)]
pub struct FieldDescriptor {
    /// Field name, unique within the declaring class
    pub name: String,
    /// Storage classification, resolved to a width against a runtime layout
    pub storage: StorageKind,
    /// Modifier flags
    pub modifiers: FieldModifiers,
    /// Annotations attached to the field
    pub annotations: Vec<Annotation>,
}

impl FieldDescriptor {
    /// Creates a plain instance field with no modifiers and no annotations
    #[must_use]
    pub fn new(name: impl Into<String>, storage: StorageKind) -> Self {
        FieldDescriptor {
            name: name.into(),
            storage,
            modifiers: FieldModifiers::empty(),
            annotations: Vec::new(),
        }
    }

    /// Replaces the modifier flags
    #[must_use]
    pub fn with_modifiers(mut self, modifiers: FieldModifiers) -> Self {
        self.modifiers = modifiers;
        self
    }

    /// Attaches an annotation
    #[must_use]
    pub fn with_annotation(mut self, annotation: Annotation) -> Self {
        self.annotations.push(annotation);
        self
    }

    /// Returns true if the field is static
    #[must_use]
    pub fn is_static(&self) -> bool {
        self.modifiers.contains(FieldModifiers::STATIC)
    }

    /// Returns true if the field was inserted by the host runtime
    #[must_use]
    pub fn is_synthetic(&self) -> bool {
        self.modifiers.contains(FieldModifiers::SYNTHETIC)
    }

    /// Returns true if the field contributes no instance storage.
    ///
    /// A field is ignored exactly when it carries the ignore marker or is static.
    #[must_use]
    pub fn is_ignored(&self) -> bool {
        self.is_static() || self.modifiers.contains(FieldModifiers::IGNORED)
    }

    /// Looks up an annotation by the class identity of its annotation type
    #[must_use]
    pub fn annotation(&self, class: Token) -> Option<&Annotation> {
        self.annotations.iter().find(|a| a.class() == class)
    }

    /// Returns true if the field carries an annotation of the given type
    #[must_use]
    pub fn has_annotation(&self, class: Token) -> bool {
        self.annotation(class).is_some()
    }
}
