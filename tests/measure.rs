//! End-to-end measurement tests over the public API.
//!
//! Covers the universal properties every configuration must satisfy: layout depends on the
//! class rather than the instance, results are positive multiples of the object alignment,
//! ignored fields contribute nothing, and the meter stays correct under parallel use.

use heapscope::prelude::*;
use rayon::prelude::*;

const ALL_GENERATIONS: [RuntimeGeneration; 3] = [
    RuntimeGeneration::Pre15,
    RuntimeGeneration::Post15Default,
    RuntimeGeneration::Post15NoEmptySlotReuse,
];

fn sample_registry() -> (ClassRegistry, Vec<ClassRc>) {
    let registry = ClassRegistry::new();
    let mut classes = Vec::new();

    classes.push(ClassBuilder::new("fixtures", "Empty").register(&registry));
    classes.push(
        ClassBuilder::new("fixtures", "OneInt")
            .field("value", StorageKind::Primitive(PrimitiveKind::Int))
            .register(&registry),
    );
    classes.push(
        ClassBuilder::new("fixtures", "OneRef")
            .field("target", StorageKind::Reference)
            .register(&registry),
    );
    classes.push(
        ClassBuilder::new("fixtures", "Mixed")
            .field("flag", StorageKind::Primitive(PrimitiveKind::Boolean))
            .field("count", StorageKind::Primitive(PrimitiveKind::Short))
            .field("weight", StorageKind::Primitive(PrimitiveKind::Double))
            .field("label", StorageKind::Reference)
            .register(&registry),
    );

    let base = ClassBuilder::new("fixtures", "Shape")
        .field("id", StorageKind::Primitive(PrimitiveKind::Int))
        .register(&registry);
    classes.push(base.clone());
    classes.push(
        ClassBuilder::new("fixtures", "Circle")
            .base(&base)
            .field("radius", StorageKind::Primitive(PrimitiveKind::Double))
            .field("filled", StorageKind::Primitive(PrimitiveKind::Boolean))
            .register(&registry),
    );

    (registry, classes)
}

#[test]
fn measurement_depends_on_class_not_instance() {
    let (_registry, classes) = sample_registry();
    let meter = MemoryMeter::builder(RuntimeLayout::modern()).build().unwrap();

    for class in &classes {
        let first = meter.measure(&Instance::of(class)).unwrap();
        let second = meter.measure(&Instance::of(class)).unwrap();
        assert_eq!(first, second, "{}", class.fullname());
    }
}

#[test]
fn sizes_are_positive_multiples_of_the_alignment() {
    let (_registry, classes) = sample_registry();

    for layout in [
        RuntimeLayout::modern(),
        RuntimeLayout::compressed(),
        RuntimeLayout::legacy(),
    ] {
        for generation in ALL_GENERATIONS {
            let meter = MemoryMeter::builder(layout)
                .generation(generation)
                .build()
                .unwrap();
            for class in &classes {
                let size = meter.measure(&Instance::of(class)).unwrap();
                assert!(size >= u64::from(layout.object_header_size()));
                assert_eq!(
                    size % u64::from(layout.object_alignment()),
                    0,
                    "{} under {generation}",
                    class.fullname()
                );
            }
        }
    }
}

#[test]
fn subclass_is_never_smaller_than_its_base() {
    let (registry, _classes) = sample_registry();
    let base = registry.get_by_fullname("fixtures.Shape").unwrap();
    let leaf = registry.get_by_fullname("fixtures.Circle").unwrap();

    for generation in ALL_GENERATIONS {
        let meter = MemoryMeter::builder(RuntimeLayout::compressed())
            .generation(generation)
            .build()
            .unwrap();
        let base_size = meter.measure_class(&base).unwrap();
        let leaf_size = meter.measure_class(&leaf).unwrap();
        assert!(leaf_size >= base_size, "under {generation}");
    }
}

#[test]
fn ignored_and_static_fields_contribute_nothing() {
    let registry = ClassRegistry::new();
    let plain = ClassBuilder::new("fixtures", "Plain")
        .field("kept", StorageKind::Primitive(PrimitiveKind::Long))
        .register(&registry);
    let cluttered = ClassBuilder::new("fixtures", "Cluttered")
        .field("kept", StorageKind::Primitive(PrimitiveKind::Long))
        .field_with(
            "CACHE",
            StorageKind::Reference,
            FieldModifiers::STATIC,
        )
        .field_with(
            "scratch",
            StorageKind::Primitive(PrimitiveKind::Double),
            FieldModifiers::IGNORED,
        )
        .register(&registry);

    for generation in ALL_GENERATIONS {
        let meter = MemoryMeter::builder(RuntimeLayout::modern())
            .generation(generation)
            .build()
            .unwrap();
        assert_eq!(
            meter.measure_class(&plain).unwrap(),
            meter.measure_class(&cluttered).unwrap(),
            "under {generation}"
        );
    }
}

#[test]
fn synthetic_fields_occupy_storage() {
    let registry = ClassRegistry::new();
    let standalone = ClassBuilder::new("fixtures", "Standalone")
        .field("value", StorageKind::Primitive(PrimitiveKind::Int))
        .register(&registry);
    let inner = ClassBuilder::new("fixtures", "Inner")
        .field("value", StorageKind::Primitive(PrimitiveKind::Int))
        .field_with("this$0", StorageKind::Reference, FieldModifiers::SYNTHETIC)
        .register(&registry);

    let meter = MemoryMeter::builder(RuntimeLayout::modern()).build().unwrap();
    let plain = meter.measure_class(&standalone).unwrap();
    let captured = meter.measure_class(&inner).unwrap();
    assert!(captured > plain);
    assert_eq!(captured, 32);
}

#[test]
fn array_sizes_follow_the_formula() {
    let layout = RuntimeLayout::modern();
    let meter = MemoryMeter::builder(layout).build().unwrap();

    let mut previous = 0;
    for length in 0..256 {
        let size = meter
            .measure(&Instance::primitive_array(PrimitiveKind::Int, length))
            .unwrap();
        let expected = {
            let raw = u64::from(layout.array_header_size()) + 4 * length as u64;
            raw.div_ceil(u64::from(layout.object_alignment()))
                * u64::from(layout.object_alignment())
        };
        assert_eq!(size, expected);
        assert!(size >= previous);
        previous = size;
    }
}

#[test]
fn array_components_use_reference_width() {
    let meter = MemoryMeter::builder(RuntimeLayout::compressed()).build().unwrap();
    // 16-byte header + 4-byte compressed references.
    assert_eq!(meter.measure(&Instance::reference_array(6)).unwrap(), 40);
}

#[test]
fn opaque_classes_fail_with_reflection_unavailable() {
    let registry = ClassRegistry::new();
    let hidden = ClassBuilder::new("fixtures", "Hidden")
        .opaque()
        .register(&registry);
    let derived = ClassBuilder::new("fixtures", "Derived")
        .base(&hidden)
        .field("value", StorageKind::Primitive(PrimitiveKind::Int))
        .register(&registry);

    let meter = MemoryMeter::builder(RuntimeLayout::modern()).build().unwrap();
    for class in [&hidden, &derived] {
        let result = meter.measure(&Instance::of(class));
        assert!(matches!(result, Err(Error::ReflectionUnavailable { .. })));
    }
}

#[test]
fn unloading_a_class_invalidates_the_cache() {
    let registry = ClassRegistry::new();
    let class = ClassBuilder::new("fixtures", "Transient")
        .field("value", StorageKind::Primitive(PrimitiveKind::Long))
        .register(&registry);
    let meter = MemoryMeter::builder(RuntimeLayout::modern()).build().unwrap();

    assert_eq!(meter.measure_class(&class).unwrap(), 24);
    assert_eq!(meter.cached_inventories(), 1);

    registry.remove(&class.token);
    drop(class);
    assert_eq!(meter.purge_cache(), 1);
    assert_eq!(meter.cached_inventories(), 0);
}

#[test]
fn parallel_measurement_is_consistent() {
    let (_registry, classes) = sample_registry();
    let meter = MemoryMeter::builder(RuntimeLayout::modern()).build().unwrap();

    let expected: Vec<u64> = classes
        .iter()
        .map(|class| meter.measure_class(class).unwrap())
        .collect();

    let results: Vec<Vec<u64>> = (0..64)
        .into_par_iter()
        .map(|_| {
            classes
                .iter()
                .map(|class| meter.measure_class(class).unwrap())
                .collect()
        })
        .collect();

    for run in results {
        assert_eq!(run, expected);
    }
}
