//! Builder for registering classes.
//!
//! Collects everything a [`ClassDescriptor`](crate::metadata::ClassDescriptor) needs, then
//! hands the assembled parts to a [`ClassRegistry`](crate::metadata::ClassRegistry), which
//! assigns the token. Base links may be supplied here or resolved later through
//! [`ClassDescriptor::set_base`](crate::metadata::ClassDescriptor::set_base) when a hierarchy
//! is registered before its leaves are known.

use std::sync::Arc;

use crate::metadata::{
    annotations::Annotation,
    class::ClassRc,
    field::{FieldDescriptor, FieldModifiers},
    primitives::StorageKind,
    registry::ClassRegistry,
};

/// Builder pattern for class registration.
///
/// # Examples
///
/// ```rust
/// use heapscope::prelude::*;
///
/// let registry = ClassRegistry::new();
/// let shape = ClassBuilder::new("geom", "Shape")
///     .field("id", StorageKind::Primitive(PrimitiveKind::Int))
///     .register(&registry);
/// let circle = ClassBuilder::new("geom", "Circle")
///     .base(&shape)
///     .field("radius", StorageKind::Primitive(PrimitiveKind::Double))
///     .register(&registry);
///
/// assert_eq!(circle.base().map(|b| b.token), Some(shape.token));
/// ```
#[derive(Default)]
pub struct ClassBuilder {
    namespace: String,
    name: String,
    base: Option<ClassRc>,
    fields: Vec<FieldDescriptor>,
    annotations: Vec<Annotation>,
    opaque: bool,
}

impl ClassBuilder {
    /// Starts a builder for the given namespace and class name
    #[must_use]
    pub fn new(namespace: impl Into<String>, name: impl Into<String>) -> Self {
        ClassBuilder {
            namespace: namespace.into(),
            name: name.into(),
            ..ClassBuilder::default()
        }
    }

    /// Sets the base class
    #[must_use]
    pub fn base(mut self, base: &ClassRc) -> Self {
        self.base = Some(base.clone());
        self
    }

    /// Declares a plain instance field
    #[must_use]
    pub fn field(mut self, name: impl Into<String>, storage: StorageKind) -> Self {
        self.fields.push(FieldDescriptor::new(name, storage));
        self
    }

    /// Declares a field with explicit modifier flags
    #[must_use]
    pub fn field_with(
        mut self,
        name: impl Into<String>,
        storage: StorageKind,
        modifiers: FieldModifiers,
    ) -> Self {
        self.fields
            .push(FieldDescriptor::new(name, storage).with_modifiers(modifiers));
        self
    }

    /// Declares a fully assembled field
    #[must_use]
    pub fn push_field(mut self, field: FieldDescriptor) -> Self {
        self.fields.push(field);
        self
    }

    /// Attaches a class-level annotation
    #[must_use]
    pub fn annotation(mut self, annotation: Annotation) -> Self {
        self.annotations.push(annotation);
        self
    }

    /// Marks the class as closed to introspection; measuring instances of it (or of any
    /// subclass) fails with `ReflectionUnavailable`
    #[must_use]
    pub fn opaque(mut self) -> Self {
        self.opaque = true;
        self
    }

    /// Registers the class, consuming the builder; the registry assigns the token
    pub fn register(self, registry: &ClassRegistry) -> ClassRc {
        let fields = Arc::new(boxcar::Vec::new());
        for field in self.fields {
            fields.push(Arc::new(field));
        }

        registry.insert(
            self.namespace,
            self.name,
            self.base,
            fields,
            self.annotations,
            !self.opaque,
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::metadata::primitives::PrimitiveKind;

    #[test]
    fn test_builder_preserves_declaration_order() {
        let registry = ClassRegistry::new();
        let class = ClassBuilder::new("fixtures", "Mixed")
            .field("flag", StorageKind::Primitive(PrimitiveKind::Boolean))
            .field("weight", StorageKind::Primitive(PrimitiveKind::Double))
            .field("label", StorageKind::Reference)
            .register(&registry);

        let names: Vec<&str> = class.fields.iter().map(|(_, f)| f.name.as_str()).collect();
        assert_eq!(names, ["flag", "weight", "label"]);
    }

    #[test]
    fn test_builder_marks_opaque_classes() {
        let registry = ClassRegistry::new();
        let class = ClassBuilder::new("fixtures", "Hidden")
            .opaque()
            .register(&registry);
        assert!(!class.introspectable);
    }

    #[test]
    fn test_builder_links_base() {
        let registry = ClassRegistry::new();
        let base = ClassBuilder::new("fixtures", "Base").register(&registry);
        let derived = ClassBuilder::new("fixtures", "Derived")
            .base(&base)
            .register(&registry);
        assert_eq!(derived.base().map(|b| b.token), Some(base.token));
    }
}
