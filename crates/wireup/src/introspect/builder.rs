//! Init-time declaration registry
//!
//! [`DeclarationRegistry`] is the built-in [`Introspector`]: a registry of
//! type declarations populated once through [`RegistryBuilder`] before any
//! resolution pass runs. Member queries walk types in registration order and
//! members in declaration order, so encounter order is deterministic.

use super::decl::{ConstructorDecl, FieldDecl, MethodDecl, TypeDecl, TypeKey, TypeKind};
use super::{Introspector, Scope};
use crate::marker::MarkerInstance;
use std::any::TypeId;
use std::collections::{HashMap, HashSet};
use std::sync::Arc;

/// Registry of type declarations, queried by the core during resolution
#[derive(Debug, Default)]
pub struct DeclarationRegistry {
    types: HashMap<TypeId, Arc<TypeDecl>>,
    /// Registration order, for deterministic encounter-order queries
    order: Vec<TypeId>,
    /// Reverse index: abstract type → registered implementations
    subtypes: HashMap<TypeId, Vec<TypeId>>,
}

impl DeclarationRegistry {
    /// Start building a registry
    pub fn builder() -> RegistryBuilder {
        RegistryBuilder::default()
    }

    fn types_in_order(&self) -> impl Iterator<Item = &Arc<TypeDecl>> {
        self.order.iter().filter_map(|id| self.types.get(id))
    }

    fn marked(markers: &[MarkerInstance], any_of: &HashSet<String>) -> bool {
        markers.iter().any(|m| any_of.contains(m.marker()))
    }
}

impl Introspector for DeclarationRegistry {
    fn type_decl(&self, id: TypeId) -> Option<Arc<TypeDecl>> {
        self.types.get(&id).cloned()
    }

    fn types_with_any(&self, scope: &Scope, markers: &HashSet<String>) -> Vec<Arc<TypeDecl>> {
        self.types_in_order()
            .filter(|t| scope.contains(&t.module) && Self::marked(&t.markers, markers))
            .cloned()
            .collect()
    }

    fn constructors_with_any(
        &self,
        scope: &Scope,
        markers: &HashSet<String>,
    ) -> Vec<Arc<ConstructorDecl>> {
        self.types_in_order()
            .filter(|t| scope.contains(&t.module))
            .flat_map(|t| t.constructors.iter())
            .filter(|c| Self::marked(&c.markers, markers))
            .cloned()
            .collect()
    }

    fn fields_with_any(&self, scope: &Scope, markers: &HashSet<String>) -> Vec<Arc<FieldDecl>> {
        self.types_in_order()
            .filter(|t| scope.contains(&t.module))
            .flat_map(|t| t.fields.iter())
            .filter(|f| Self::marked(&f.markers, markers))
            .cloned()
            .collect()
    }

    fn methods_with_any(&self, scope: &Scope, markers: &HashSet<String>) -> Vec<Arc<MethodDecl>> {
        self.types_in_order()
            .filter(|t| scope.contains(&t.module))
            .flat_map(|t| t.methods.iter())
            .filter(|m| Self::marked(&m.markers, markers))
            .cloned()
            .collect()
    }

    fn concrete_subtypes_of(&self, id: TypeId) -> Vec<Arc<TypeDecl>> {
        self.subtypes
            .get(&id)
            .into_iter()
            .flatten()
            .filter_map(|sub| self.types.get(sub))
            .filter(|t| t.is_concrete())
            .cloned()
            .collect()
    }
}

/// Builder for a [`DeclarationRegistry`]
#[derive(Debug, Default)]
pub struct RegistryBuilder {
    types: Vec<TypeDecl>,
}

impl RegistryBuilder {
    /// Begin declaring a concrete type registered under the given module path
    pub fn concrete_type<T: 'static>(self, module: &str) -> TypeBuilder {
        self.type_decl::<T>(module, TypeKind::Concrete { sealed: false })
    }

    /// Begin declaring an abstract type (trait object or otherwise
    /// uninstantiable) registered under the given module path
    pub fn abstract_type<T: ?Sized + 'static>(self, module: &str) -> TypeBuilder {
        self.type_decl::<T>(module, TypeKind::Abstract)
    }

    fn type_decl<T: ?Sized + 'static>(self, module: &str, kind: TypeKind) -> TypeBuilder {
        TypeBuilder {
            registry: self,
            decl: TypeDecl {
                key: TypeKey::of::<T>(),
                module: module.to_string(),
                kind,
                markers: Vec::new(),
                constructors: Vec::new(),
                fields: Vec::new(),
                methods: Vec::new(),
                supertypes: Vec::new(),
            },
        }
    }

    /// Finish building. A later declaration of the same type replaces the
    /// earlier one.
    pub fn build(self) -> DeclarationRegistry {
        let mut registry = DeclarationRegistry::default();
        for decl in self.types {
            let id = decl.key.id();
            if registry.types.insert(id, Arc::new(decl)).is_none() {
                registry.order.push(id);
            }
        }
        // Supertype links are indexed from the surviving declarations only,
        // so a redeclared type contributes one entry per supertype.
        for id in &registry.order {
            if let Some(decl) = registry.types.get(id) {
                for supertype in &decl.supertypes {
                    registry.subtypes.entry(*supertype).or_default().push(*id);
                }
            }
        }
        registry
    }
}

/// Builder for one type declaration
#[derive(Debug)]
pub struct TypeBuilder {
    registry: RegistryBuilder,
    decl: TypeDecl,
}

impl TypeBuilder {
    /// Attach a marker to the type
    pub fn marker(mut self, marker: MarkerInstance) -> Self {
        self.decl.markers.push(marker);
        self
    }

    /// Mark the type final-equivalent: lazy creation will not wrap it in a
    /// producer proxy
    pub fn sealed(mut self) -> Self {
        if let TypeKind::Concrete { ref mut sealed } = self.decl.kind {
            *sealed = true;
        }
        self
    }

    /// Record that this type implements the abstract type `S`
    pub fn implements<S: ?Sized + 'static>(mut self) -> Self {
        self.decl.supertypes.push(TypeId::of::<S>());
        self
    }

    /// Attach a constructor; declaration order is the ambiguity tie-break
    pub fn constructor(mut self, mut ctor: ConstructorDecl) -> Self {
        ctor.owner = self.decl.key;
        self.decl.constructors.push(Arc::new(ctor));
        self
    }

    /// Attach a field
    pub fn field(mut self, mut field: FieldDecl) -> Self {
        field.owner = self.decl.key;
        self.decl.fields.push(Arc::new(field));
        self
    }

    /// Attach a method
    pub fn method(mut self, mut method: MethodDecl) -> Self {
        method.owner = self.decl.key;
        self.decl.methods.push(Arc::new(method));
        self
    }

    /// Finish the type and return to the registry builder
    pub fn register(mut self) -> RegistryBuilder {
        self.registry.types.push(self.decl);
        self.registry
    }
}
