//! # Type Registry
//!
//! Maps discriminator values to [`VariantDescriptor`]s.
//!
//! ## Publish Barrier
//!
//! Registration happens on a [`RegistryBuilder`]. [`RegistryBuilder::publish`]
//! consumes the builder and returns an immutable [`TypeRegistry`], which has
//! no way to register further variants. A published registry is
//! `Arc`-backed, so clones are cheap and every thread reads the same
//! tables without locks.
//!
//! Adding a polymorphic variant means registering one more descriptor. The
//! deserializer and validator never change.
//!
//! ## Registration Checks
//!
//! - Discriminators are unique across the registry.
//! - A variant's parent must be the very descriptor registered under the
//!   parent's discriminator, so every chain in the registry is closed.
//! - Own field names are unique and never shadow inherited fields.
//! - No field's wire path is a prefix of (or equal to) another's in the
//!   same chain, and no wire path starts at the family's discriminator
//!   property.

use std::collections::{HashMap, HashSet};
use std::sync::{Arc, OnceLock};

use crate::descriptor::{VariantDescriptor, WirePath};
use crate::error::RegistryError;

/// Mutable registration phase of a [`TypeRegistry`].
#[derive(Debug, Default)]
pub struct RegistryBuilder {
    variants: HashMap<String, Arc<VariantDescriptor>>,
    order: Vec<String>,
}

impl RegistryBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register one variant.
    ///
    /// # Errors
    ///
    /// - `DuplicateDiscriminator` if the discriminator is already bound.
    /// - `UnregisteredParent` if the parent has not been registered first.
    /// - `DuplicateField`, `ShadowedField` or `WireNameCollision` if the
    ///   variant's fields clash with each other or with its ancestors.
    pub fn register(&mut self, variant: Arc<VariantDescriptor>) -> Result<(), RegistryError> {
        let discriminator = variant.discriminator().to_string();
        if self.variants.contains_key(&discriminator) {
            return Err(RegistryError::DuplicateDiscriminator { discriminator });
        }

        if let Some(parent) = variant.parent() {
            let registered = self
                .variants
                .get(parent.discriminator())
                .is_some_and(|known| Arc::ptr_eq(known, parent));
            if !registered {
                return Err(RegistryError::UnregisteredParent {
                    discriminator,
                    parent: parent.discriminator().to_string(),
                });
            }
        }

        check_fields(&variant)?;

        tracing::debug!(
            discriminator = %discriminator,
            parent = variant.parent().map(|p| p.discriminator()),
            fields = variant.own_fields().len(),
            "registered variant"
        );
        self.order.push(discriminator.clone());
        self.variants.insert(discriminator, variant);
        Ok(())
    }

    /// Register several variants, parents first.
    pub fn register_all(
        &mut self,
        variants: impl IntoIterator<Item = Arc<VariantDescriptor>>,
    ) -> Result<(), RegistryError> {
        variants.into_iter().try_for_each(|v| self.register(v))
    }

    /// Number of variants registered so far.
    pub fn len(&self) -> usize {
        self.order.len()
    }

    pub fn is_empty(&self) -> bool {
        self.order.is_empty()
    }

    /// Freeze the registry.
    pub fn publish(self) -> TypeRegistry {
        let mut properties: Vec<String> = Vec::new();
        for discriminator in &self.order {
            if let Some(variant) = self.variants.get(discriminator) {
                let property = variant.discriminator_property();
                if !properties.iter().any(|p| p == property) {
                    properties.push(property.to_string());
                }
            }
        }

        tracing::debug!(
            variants = self.order.len(),
            discriminator_properties = ?properties,
            "published type registry"
        );

        TypeRegistry {
            inner: Arc::new(RegistryInner {
                variants: self.variants,
                order: self.order,
                discriminator_properties: properties,
            }),
        }
    }
}

fn check_fields(variant: &VariantDescriptor) -> Result<(), RegistryError> {
    let discriminator = variant.discriminator();

    let mut own = HashSet::new();
    for field in variant.own_fields() {
        if !own.insert(field.name()) {
            return Err(RegistryError::DuplicateField {
                discriminator: discriminator.to_string(),
                field: field.name().to_string(),
            });
        }
    }

    if let Some(parent) = variant.parent() {
        for (level, inherited) in parent.fields() {
            if own.contains(inherited.name()) {
                return Err(RegistryError::ShadowedField {
                    discriminator: discriminator.to_string(),
                    field: inherited.name().to_string(),
                    ancestor: level.discriminator().to_string(),
                });
            }
        }
    }

    // Wire paths must be disjoint from each other and from the
    // discriminator property.
    let paths: Vec<&WirePath> = variant.fields().map(|(_, f)| f.wire_path()).collect();
    for (i, path) in paths.iter().enumerate() {
        let head_clash = path.head() == variant.discriminator_property();
        let overlaps = paths[..i].iter().any(|earlier| {
            let (a, b) = (earlier.segments(), path.segments());
            let shared = a.len().min(b.len());
            a[..shared] == b[..shared]
        });
        if head_clash || overlaps {
            return Err(RegistryError::WireNameCollision {
                discriminator: discriminator.to_string(),
                wire_name: path.to_string(),
            });
        }
    }
    Ok(())
}

#[derive(Debug)]
struct RegistryInner {
    variants: HashMap<String, Arc<VariantDescriptor>>,
    order: Vec<String>,
    discriminator_properties: Vec<String>,
}

/// A published, immutable discriminator → variant table.
#[derive(Debug, Clone)]
pub struct TypeRegistry {
    inner: Arc<RegistryInner>,
}

impl TypeRegistry {
    /// Start a new registration phase.
    pub fn builder() -> RegistryBuilder {
        RegistryBuilder::new()
    }

    /// Look up the variant bound to `discriminator`.
    ///
    /// # Errors
    ///
    /// Returns `UnknownDiscriminator` if nothing is registered under it.
    pub fn resolve(&self, discriminator: &str) -> Result<Arc<VariantDescriptor>, RegistryError> {
        self.inner
            .variants
            .get(discriminator)
            .cloned()
            .ok_or_else(|| RegistryError::UnknownDiscriminator {
                discriminator: discriminator.to_string(),
            })
    }

    /// The ancestor chain of `discriminator`, root first.
    pub fn chain(&self, discriminator: &str) -> Result<Vec<Arc<VariantDescriptor>>, RegistryError> {
        let leaf = self.resolve(discriminator)?;
        let mut chain = vec![Arc::clone(&leaf)];
        let mut cursor = leaf.parent().cloned();
        while let Some(level) = cursor {
            cursor = level.parent().cloned();
            chain.push(level);
        }
        chain.reverse();
        Ok(chain)
    }

    /// True when `discriminator` is `ancestor` or descends from it.
    pub fn is_descendant(&self, discriminator: &str, ancestor: &str) -> bool {
        self.inner
            .variants
            .get(discriminator)
            .is_some_and(|v| v.is_a(ancestor))
    }

    /// Every registered variant, in registration order.
    pub fn variants(&self) -> impl Iterator<Item = &Arc<VariantDescriptor>> {
        self.inner
            .order
            .iter()
            .filter_map(|d| self.inner.variants.get(d))
    }

    /// Direct children of `discriminator`, in registration order.
    pub fn children(&self, discriminator: &str) -> Vec<&Arc<VariantDescriptor>> {
        self.variants()
            .filter(|v| v.parent().is_some_and(|p| p.discriminator() == discriminator))
            .collect()
    }

    /// Distinct discriminator property names across all families, in the
    /// order their roots were registered.
    pub fn discriminator_properties(&self) -> &[String] {
        &self.inner.discriminator_properties
    }

    pub fn len(&self) -> usize {
        self.inner.order.len()
    }

    pub fn is_empty(&self) -> bool {
        self.inner.order.is_empty()
    }
}

static GLOBAL: OnceLock<TypeRegistry> = OnceLock::new();

/// Install the process-wide registry.
///
/// # Errors
///
/// Returns `AlreadyPublished` if a registry was installed before; the
/// installed registry is left untouched.
pub fn publish_global(registry: TypeRegistry) -> Result<&'static TypeRegistry, RegistryError> {
    let mut installed = false;
    let current = GLOBAL.get_or_init(|| {
        installed = true;
        registry
    });
    if installed {
        tracing::debug!(variants = current.len(), "installed process-wide type registry");
        Ok(current)
    } else {
        Err(RegistryError::AlreadyPublished)
    }
}

/// The process-wide registry, if one has been published.
pub fn global() -> Option<&'static TypeRegistry> {
    GLOBAL.get()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::descriptor::{FieldDescriptor, ScalarKind};

    fn fish() -> Arc<VariantDescriptor> {
        VariantDescriptor::root("fish", "fishtype")
            .field(FieldDescriptor::new("species", ScalarKind::String))
            .field(FieldDescriptor::new("length", ScalarKind::Number).required())
            .build()
    }

    #[test]
    fn resolve_registered_variant() {
        let fish = fish();
        let shark = VariantDescriptor::extends("shark", &fish).build();
        let mut builder = TypeRegistry::builder();
        builder.register_all([Arc::clone(&fish), shark]).unwrap();
        let registry = builder.publish();

        assert_eq!(registry.resolve("shark").unwrap().discriminator(), "shark");
        assert!(registry.is_descendant("shark", "fish"));
        assert!(!registry.is_descendant("fish", "shark"));
        assert_eq!(registry.discriminator_properties(), &["fishtype".to_string()]);
        assert_eq!(registry.children("fish").len(), 1);
    }

    #[test]
    fn unknown_discriminator_is_an_error() {
        let registry = TypeRegistry::builder().publish();
        assert_eq!(
            registry.resolve("dolphin").unwrap_err(),
            RegistryError::UnknownDiscriminator {
                discriminator: "dolphin".into()
            }
        );
    }

    #[test]
    fn duplicate_discriminator_is_rejected() {
        let mut builder = TypeRegistry::builder();
        builder.register(fish()).unwrap();
        let err = builder.register(fish()).unwrap_err();
        assert!(matches!(err, RegistryError::DuplicateDiscriminator { .. }));
        assert_eq!(builder.len(), 1);
    }

    #[test]
    fn parent_must_be_registered_first() {
        let fish = fish();
        let shark = VariantDescriptor::extends("shark", &fish).build();
        let mut builder = TypeRegistry::builder();
        let err = builder.register(shark).unwrap_err();
        assert_eq!(
            err,
            RegistryError::UnregisteredParent {
                discriminator: "shark".into(),
                parent: "fish".into()
            }
        );
    }

    #[test]
    fn parent_must_be_the_registered_descriptor() {
        let mut builder = TypeRegistry::builder();
        builder.register(fish()).unwrap();
        // Same discriminator, different descriptor.
        let impostor = fish();
        let shark = VariantDescriptor::extends("shark", &impostor).build();
        assert!(matches!(
            builder.register(shark),
            Err(RegistryError::UnregisteredParent { .. })
        ));
    }

    #[test]
    fn field_clashes_are_rejected() {
        let fish = fish();
        let mut builder = TypeRegistry::builder();
        builder.register(Arc::clone(&fish)).unwrap();

        let twice = VariantDescriptor::extends("salmon", &fish)
            .field(FieldDescriptor::new("location", ScalarKind::String))
            .field(FieldDescriptor::new("location", ScalarKind::String))
            .build();
        assert!(matches!(
            builder.register(twice),
            Err(RegistryError::DuplicateField { .. })
        ));

        let shadow = VariantDescriptor::extends("salmon", &fish)
            .field(FieldDescriptor::new("length", ScalarKind::Integer))
            .build();
        assert_eq!(
            builder.register(shadow).unwrap_err(),
            RegistryError::ShadowedField {
                discriminator: "salmon".into(),
                field: "length".into(),
                ancestor: "fish".into()
            }
        );

        let wire = VariantDescriptor::extends("salmon", &fish)
            .field(FieldDescriptor::new("kind", ScalarKind::String).wire_name("species"))
            .build();
        assert!(matches!(
            builder.register(wire),
            Err(RegistryError::WireNameCollision { .. })
        ));

        let tag = VariantDescriptor::extends("salmon", &fish)
            .field(FieldDescriptor::new("tag", ScalarKind::String).wire_name("fishtype"))
            .build();
        assert!(matches!(
            builder.register(tag),
            Err(RegistryError::WireNameCollision { .. })
        ));
    }

    #[test]
    fn flattened_path_under_discriminator_is_rejected() {
        let fish = VariantDescriptor::root("fish", "fishtype")
            .field(
                FieldDescriptor::new("meta", ScalarKind::String)
                    .wire_name("fishtype.meta")
                    .flattened(),
            )
            .build();
        assert_eq!(
            TypeRegistry::builder().register(fish).unwrap_err(),
            RegistryError::WireNameCollision {
                discriminator: "fish".into(),
                wire_name: "fishtype.meta".into()
            }
        );
    }

    #[test]
    fn wire_path_prefixes_collide() {
        let fish = fish();
        let mut builder = TypeRegistry::builder();
        builder.register(Arc::clone(&fish)).unwrap();

        let destination = VariantDescriptor::extends("destination", &fish)
            .field(FieldDescriptor::new("props", ScalarKind::String).wire_name("properties"))
            .field(
                FieldDescriptor::new("rid", ScalarKind::String)
                    .wire_name("properties.resourceId")
                    .flattened(),
            )
            .build();
        assert_eq!(
            builder.register(destination).unwrap_err(),
            RegistryError::WireNameCollision {
                discriminator: "destination".into(),
                wire_name: "properties.resourceId".into()
            }
        );

        // Siblings under a shared intermediate object are fine.
        let function = VariantDescriptor::extends("function", &fish)
            .field(
                FieldDescriptor::new("rid", ScalarKind::String)
                    .wire_name("properties.resourceId")
                    .flattened(),
            )
            .field(
                FieldDescriptor::new("batch", ScalarKind::Integer)
                    .wire_name("properties.maxEventsPerBatch")
                    .flattened(),
            )
            .build();
        assert!(builder.register(function).is_ok());
    }

    #[test]
    fn chain_is_root_first() {
        let fish = fish();
        let shark = VariantDescriptor::extends("shark", &fish).build();
        let saw = VariantDescriptor::extends("sawshark", &shark).build();
        let mut builder = TypeRegistry::builder();
        builder.register_all([fish, shark, saw]).unwrap();
        let registry = builder.publish();

        let chain: Vec<String> = registry
            .chain("sawshark")
            .unwrap()
            .iter()
            .map(|v| v.discriminator().to_string())
            .collect();
        assert_eq!(chain, vec!["fish", "shark", "sawshark"]);
        let order: Vec<&str> = registry.variants().map(|v| v.discriminator()).collect();
        assert_eq!(order, vec!["fish", "shark", "sawshark"]);
    }

    #[test]
    fn published_registry_is_shareable_across_threads() {
        let mut builder = TypeRegistry::builder();
        builder.register(fish()).unwrap();
        let registry = builder.publish();

        let handles: Vec<_> = (0..4)
            .map(|_| {
                let registry = registry.clone();
                std::thread::spawn(move || registry.resolve("fish").is_ok())
            })
            .collect();
        for handle in handles {
            assert!(handle.join().unwrap());
        }
    }
}
