//! # Loading and Compiling Definition Sets
//!
//! [`DefinitionSet::load`] reads a YAML or JSON file (chosen by extension).
//! [`DefinitionSet::build_registry`] turns the entries into descriptors,
//! parents before children, registers them and publishes the registry.
//!
//! Entry order in the file does not matter. Variants are built in file
//! order except that a parent is always built before its children.

use std::collections::HashMap;
use std::path::Path;
use std::sync::Arc;

use polymodel_core::{TypeRegistry, VariantDescriptor};

use crate::definition::{DefinitionSet, VariantDef};
use crate::error::DefinitionError;
use crate::hooks::HookTable;

const INLINE: &str = "<inline>";

impl DefinitionSet {
    /// Parse a YAML definition document.
    pub fn from_yaml_str(text: &str) -> Result<Self, DefinitionError> {
        parse_yaml(text, INLINE)
    }

    /// Parse a JSON definition document.
    pub fn from_json_str(text: &str) -> Result<Self, DefinitionError> {
        parse_json(text, INLINE)
    }

    /// Load a definition file. `.yaml`/`.yml` files are read as YAML,
    /// everything else as JSON.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, DefinitionError> {
        let path = path.as_ref();
        let display = path.display().to_string();
        let text = std::fs::read_to_string(path).map_err(|source| DefinitionError::Io {
            path: display.clone(),
            source,
        })?;

        let ext = path.extension().and_then(|e| e.to_str()).unwrap_or("");
        let set = match ext {
            "yaml" | "yml" => parse_yaml(&text, &display)?,
            _ => parse_json(&text, &display)?,
        };
        let path_display = &display;
        tracing::debug!(path = %path_display, variants = set.variants.len(), "loaded definition set");
        Ok(set)
    }

    /// Look up an entry by discriminator.
    pub fn get(&self, discriminator: &str) -> Option<&VariantDef> {
        self.variants.iter().find(|v| v.discriminator == discriminator)
    }

    /// Build descriptors, bind hooks from `hooks`, and publish a registry.
    ///
    /// # Errors
    ///
    /// `Duplicate`, `UnknownParent`, `CyclicInheritance`,
    /// `UnknownNestedVariant`, `UnknownHook`, `InvalidPattern` or `Invalid`
    /// for a malformed set; `Registry` if the registry rejects a variant
    /// (e.g. a field shadowing an inherited one).
    pub fn build_registry(&self, hooks: &HookTable) -> Result<TypeRegistry, DefinitionError> {
        let index = self.index()?;
        self.check_references(&index)?;
        let order = self.build_order(&index)?;

        let mut built: HashMap<&str, Arc<VariantDescriptor>> = HashMap::new();
        let mut builder = TypeRegistry::builder();
        for position in order {
            let def = &self.variants[position];
            let variant = build_variant(def, &built, hooks)?;
            builder.register(Arc::clone(&variant))?;
            built.insert(def.discriminator.as_str(), variant);
        }
        Ok(builder.publish())
    }

    fn index(&self) -> Result<HashMap<&str, usize>, DefinitionError> {
        let mut index = HashMap::new();
        for (position, def) in self.variants.iter().enumerate() {
            if index.insert(def.discriminator.as_str(), position).is_some() {
                return Err(DefinitionError::Duplicate {
                    discriminator: def.discriminator.clone(),
                });
            }
        }
        Ok(index)
    }

    fn check_references(&self, index: &HashMap<&str, usize>) -> Result<(), DefinitionError> {
        for def in &self.variants {
            match (&def.parent, &def.discriminator_property) {
                (Some(parent), _) if !index.contains_key(parent.as_str()) => {
                    return Err(DefinitionError::UnknownParent {
                        discriminator: def.discriminator.clone(),
                        parent: parent.clone(),
                    });
                }
                (Some(_), Some(_)) => {
                    return Err(DefinitionError::Invalid {
                        discriminator: def.discriminator.clone(),
                        reason: "only family roots declare a discriminator_property".into(),
                    });
                }
                (None, None) => {
                    return Err(DefinitionError::Invalid {
                        discriminator: def.discriminator.clone(),
                        reason: "family roots must declare a discriminator_property".into(),
                    });
                }
                _ => {}
            }

            for field in &def.fields {
                for nested in field.kind.nested_variants() {
                    if !index.contains_key(nested) {
                        return Err(DefinitionError::UnknownNestedVariant {
                            discriminator: def.discriminator.clone(),
                            field: field.name.clone(),
                            nested: nested.to_string(),
                        });
                    }
                }
            }
        }
        Ok(())
    }

    /// Positions of the entries, parents first, otherwise in file order.
    fn build_order(&self, index: &HashMap<&str, usize>) -> Result<Vec<usize>, DefinitionError> {
        #[derive(Clone, Copy, PartialEq)]
        enum Mark {
            Unvisited,
            InProgress,
            Done,
        }

        let mut marks = vec![Mark::Unvisited; self.variants.len()];
        let mut order = Vec::with_capacity(self.variants.len());

        for start in 0..self.variants.len() {
            // Walk up the parent chain, then emit it top-down.
            let mut pending: Vec<usize> = Vec::new();
            let mut cursor = Some(start);
            while let Some(position) = cursor {
                match marks[position] {
                    Mark::Done => break,
                    Mark::InProgress => {
                        let mut cycle: Vec<String> = pending
                            .iter()
                            .skip_while(|&&p| p != position)
                            .map(|&p| self.variants[p].discriminator.clone())
                            .collect();
                        cycle.push(self.variants[position].discriminator.clone());
                        return Err(DefinitionError::CyclicInheritance { cycle });
                    }
                    Mark::Unvisited => {
                        marks[position] = Mark::InProgress;
                        pending.push(position);
                        cursor = self.variants[position]
                            .parent
                            .as_deref()
                            .and_then(|parent| index.get(parent).copied());
                    }
                }
            }
            for &position in pending.iter().rev() {
                marks[position] = Mark::Done;
                order.push(position);
            }
        }
        Ok(order)
    }
}

fn build_variant(
    def: &VariantDef,
    built: &HashMap<&str, Arc<VariantDescriptor>>,
    hooks: &HookTable,
) -> Result<Arc<VariantDescriptor>, DefinitionError> {
    let mut builder = match (&def.parent, &def.discriminator_property) {
        (Some(parent), _) => {
            let parent = built.get(parent.as_str()).ok_or_else(|| DefinitionError::UnknownParent {
                discriminator: def.discriminator.clone(),
                parent: parent.clone(),
            })?;
            VariantDescriptor::extends(def.discriminator.clone(), parent)
        }
        (None, Some(property)) => VariantDescriptor::root(def.discriminator.clone(), property.clone()),
        (None, None) => {
            return Err(DefinitionError::Invalid {
                discriminator: def.discriminator.clone(),
                reason: "family roots must declare a discriminator_property".into(),
            })
        }
    };

    for field in &def.fields {
        builder = builder.field(field.to_descriptor(&def.discriminator)?);
    }

    if let Some(name) = &def.hook {
        let hook = hooks.get(name).ok_or_else(|| DefinitionError::UnknownHook {
            discriminator: def.discriminator.clone(),
            hook: name.clone(),
        })?;
        builder = builder.shared_hook(Arc::clone(hook));
    }
    Ok(builder.build())
}

fn parse_yaml(text: &str, path: &str) -> Result<DefinitionSet, DefinitionError> {
    serde_yaml::from_str(text).map_err(|e| DefinitionError::Parse {
        path: path.to_string(),
        reason: format!("invalid YAML: {e}"),
    })
}

fn parse_json(text: &str, path: &str) -> Result<DefinitionSet, DefinitionError> {
    serde_json::from_str(text).map_err(|e| DefinitionError::Parse {
        path: path.to_string(),
        reason: format!("invalid JSON: {e}"),
    })
}
