//! Shared fixtures for unit tests.
//!
//! Storage shorthands and small class-shape builders used across the unit-test modules, so
//! individual tests stay focused on the layout arithmetic they pin down.

use crate::metadata::{ClassBuilder, ClassRc, ClassRegistry, PrimitiveKind, StorageKind};

/// 1-byte boolean storage
pub(crate) fn boolean() -> StorageKind {
    StorageKind::Primitive(PrimitiveKind::Boolean)
}

/// 1-byte integer storage
pub(crate) fn byte() -> StorageKind {
    StorageKind::Primitive(PrimitiveKind::Byte)
}

/// 2-byte integer storage
pub(crate) fn short() -> StorageKind {
    StorageKind::Primitive(PrimitiveKind::Short)
}

/// 4-byte integer storage
pub(crate) fn int() -> StorageKind {
    StorageKind::Primitive(PrimitiveKind::Int)
}

/// 8-byte integer storage
pub(crate) fn long() -> StorageKind {
    StorageKind::Primitive(PrimitiveKind::Long)
}

/// 8-byte floating point storage
pub(crate) fn double() -> StorageKind {
    StorageKind::Primitive(PrimitiveKind::Double)
}

/// Reference storage
pub(crate) fn reference() -> StorageKind {
    StorageKind::Reference
}

/// Registers a single class with the given instance fields
pub(crate) fn class_with_fields(
    registry: &ClassRegistry,
    name: &str,
    fields: &[(&str, StorageKind)],
) -> ClassRc {
    let mut builder = ClassBuilder::new("fixtures", name);
    for (field_name, storage) in fields {
        builder = builder.field(*field_name, *storage);
    }
    builder.register(registry)
}

/// Registers a linear hierarchy, one `value` field of the given storage per level, and
/// returns the leaf
pub(crate) fn linear_hierarchy(
    registry: &ClassRegistry,
    name: &str,
    levels: &[StorageKind],
) -> ClassRc {
    let mut previous: Option<ClassRc> = None;
    for (depth, storage) in levels.iter().enumerate() {
        let mut builder = ClassBuilder::new("fixtures", format!("{name}{depth}"))
            .field(format!("value{depth}"), *storage);
        if let Some(base) = &previous {
            builder = builder.base(base);
        }
        previous = Some(builder.register(registry));
    }
    previous.expect("at least one level")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_linear_hierarchy_links_bases() {
        let registry = ClassRegistry::new();
        let leaf = linear_hierarchy(&registry, "Level", &[int(), long(), reference()]);
        assert_eq!(leaf.fullname(), "fixtures.Level2");

        let middle = leaf.base().expect("middle");
        let root = middle.base().expect("root");
        assert_eq!(root.fullname(), "fixtures.Level0");
        assert!(root.base().is_none());
    }

    #[test]
    fn test_class_with_fields_orders_declarations() {
        let registry = ClassRegistry::new();
        let class = class_with_fields(&registry, "Pair", &[("first", byte()), ("second", double())]);
        let names: Vec<&str> = class.fields.iter().map(|(_, f)| f.name.as_str()).collect();
        assert_eq!(names, ["first", "second"]);
    }
}
