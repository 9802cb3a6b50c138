//! False-sharing contention padding policy.
//!
//! Hosts that support contention annotations isolate annotated fields (or whole objects) from
//! false sharing by surrounding them with cache-line-scale padding. The policy recognizes the
//! annotation by the class identity of a configured annotation type and extracts the group
//! name through a configured accessor, both frozen at construction. Without an accessor the
//! host cannot resolve groups and the policy degrades to [`ContentionPolicy::Disabled`].
//!
//! Padding arithmetic:
//! - A class whose type carries the annotation adds one leading and one trailing contention
//!   line for the whole object.
//! - A field carrying the annotation with an absent or empty group is padded on both sides
//!   by itself.
//! - Fields sharing the same non-empty group share a single pad pair; groups are scoped per
//!   declaring class.

use std::collections::HashSet;
use std::fmt;
use std::sync::Arc;

use crate::{
    layout::inventory::ClassInventory,
    metadata::{Annotation, ClassDescriptor, FieldDescriptor, Token},
};

/// Bytes in one contention line unless configured otherwise
pub const DEFAULT_CONTENTION_LINE_SIZE: u32 = 128;

/// Extracts the contention group name from an annotation instance
pub type ContentionGroupAccessor = Arc<dyn Fn(&Annotation) -> Option<String> + Send + Sync>;

/// The contention group a field was resolved into
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum ContentionGroup {
    /// Absent or empty group tag: the field is padded by itself
    Isolated,
    /// Non-empty group tag: fields with the same tag in the same class share one pad pair
    Named(Arc<str>),
}

/// Whether and how false-sharing padding is applied.
///
/// # Examples
///
/// ```rust
/// use heapscope::prelude::*;
///
/// let registry = ClassRegistry::new();
/// let contended = ClassBuilder::new("runtime", "Contended").register(&registry);
///
/// let policy = ContentionPolicy::enabled(contended.token);
/// assert!(policy.is_active());
/// assert_eq!(policy.line_size(), 128);
/// ```
#[derive(Clone)]
pub enum ContentionPolicy {
    /// Contention annotations contribute nothing
    Disabled,
    /// Contention annotations pad fields and objects
    Enabled {
        /// Class identity of the contention annotation type
        annotation: Token,
        /// Group accessor; `None` makes the policy behave as [`ContentionPolicy::Disabled`]
        group_accessor: Option<ContentionGroupAccessor>,
        /// Bytes in one contention line
        line_size: u32,
    },
}

impl ContentionPolicy {
    /// Enables padding for the given annotation type with the default group accessor, which
    /// reads the annotation's element value, and the default line size
    #[must_use]
    pub fn enabled(annotation: Token) -> Self {
        ContentionPolicy::Enabled {
            annotation,
            group_accessor: Some(ContentionPolicy::default_group_accessor()),
            line_size: DEFAULT_CONTENTION_LINE_SIZE,
        }
    }

    /// Enables padding with a custom group accessor
    #[must_use]
    pub fn enabled_with(annotation: Token, group_accessor: ContentionGroupAccessor) -> Self {
        ContentionPolicy::Enabled {
            annotation,
            group_accessor: Some(group_accessor),
            line_size: DEFAULT_CONTENTION_LINE_SIZE,
        }
    }

    /// Enables padding for a host whose group accessor could not be resolved; behaves as
    /// [`ContentionPolicy::Disabled`]
    #[must_use]
    pub fn enabled_without_accessor(annotation: Token) -> Self {
        ContentionPolicy::Enabled {
            annotation,
            group_accessor: None,
            line_size: DEFAULT_CONTENTION_LINE_SIZE,
        }
    }

    /// Overrides the contention line size
    #[must_use]
    pub fn with_line_size(self, bytes: u32) -> Self {
        match self {
            ContentionPolicy::Disabled => ContentionPolicy::Disabled,
            ContentionPolicy::Enabled {
                annotation,
                group_accessor,
                ..
            } => ContentionPolicy::Enabled {
                annotation,
                group_accessor,
                line_size: bytes,
            },
        }
    }

    /// The default accessor: the annotation's single element value is the group name
    #[must_use]
    pub fn default_group_accessor() -> ContentionGroupAccessor {
        Arc::new(|annotation| annotation.value().map(str::to_owned))
    }

    /// Returns true if the policy pads at all: enabled and an accessor is present
    #[must_use]
    pub fn is_active(&self) -> bool {
        matches!(
            self,
            ContentionPolicy::Enabled {
                group_accessor: Some(_),
                ..
            }
        )
    }

    /// Bytes in one contention line, 0 when the policy is inactive
    #[must_use]
    pub fn line_size(&self) -> u64 {
        match self {
            ContentionPolicy::Enabled {
                group_accessor: Some(_),
                line_size,
                ..
            } => u64::from(*line_size),
            _ => 0,
        }
    }

    /// Returns true if the class type itself requests whole-object padding
    pub(crate) fn class_contended(&self, class: &ClassDescriptor) -> bool {
        match self {
            ContentionPolicy::Enabled {
                annotation,
                group_accessor: Some(_),
                ..
            } => class.has_annotation(*annotation),
            _ => false,
        }
    }

    /// Resolves the contention group of a field, `None` when the field is not padded
    pub(crate) fn field_group(&self, field: &FieldDescriptor) -> Option<ContentionGroup> {
        let ContentionPolicy::Enabled {
            annotation,
            group_accessor: Some(accessor),
            ..
        } = self
        else {
            return None;
        };

        let instance = field.annotation(*annotation)?;
        match accessor(instance) {
            Some(group) if !group.is_empty() => Some(ContentionGroup::Named(group.into())),
            _ => Some(ContentionGroup::Isolated),
        }
    }

    /// Total padding the inventory requests: one pad pair per contended class, per isolated
    /// contended field, and per distinct non-empty group within a class
    pub(crate) fn contention_padding(&self, inventory: &ClassInventory) -> u64 {
        let line = self.line_size();
        if line == 0 {
            return 0;
        }

        let mut pad_pairs: u64 = 0;
        for class in inventory.chain() {
            if class.contended() {
                pad_pairs += 1;
            }

            let mut groups: HashSet<&str> = HashSet::new();
            for field in class.fields() {
                match field.contention() {
                    Some(ContentionGroup::Isolated) => pad_pairs += 1,
                    Some(ContentionGroup::Named(group)) => {
                        groups.insert(group.as_ref());
                    }
                    None => {}
                }
            }
            pad_pairs += groups.len() as u64;
        }

        pad_pairs * 2 * line
    }
}

impl fmt::Debug for ContentionPolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ContentionPolicy::Disabled => f.write_str("ContentionPolicy::Disabled"),
            ContentionPolicy::Enabled {
                annotation,
                group_accessor,
                line_size,
            } => f
                .debug_struct("ContentionPolicy::Enabled")
                .field("annotation", annotation)
                .field("group_accessor", &group_accessor.is_some())
                .field("line_size", line_size)
                .finish(),
        }
    }
}
