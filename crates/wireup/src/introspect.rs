//! Declaration introspection
//!
//! The engine never inspects live program structure. Instead, each component
//! or configuration type registers its constructor signatures, injectable
//! fields, producer methods and markers here at init time, as plain data plus
//! closures. The [`Introspector`] trait is the query surface the core drives;
//! [`DeclarationRegistry`] is its built-in implementation.
//!
//! ```text
//! RegistryBuilder → TypeDecl graph → DeclarationRegistry (Introspector)
//!                                          ↑
//!                                  classifier / handler / processor
//! ```

pub mod builder;
pub mod decl;

pub use builder::{DeclarationRegistry, RegistryBuilder, TypeBuilder};
pub use decl::{
    downcast, ConstructorDecl, Factory, FieldDecl, Instance, MethodBody, MethodDecl, ParamDecl,
    Setter, TypeDecl, TypeKey, TypeKind,
};

use std::any::TypeId;
use std::collections::HashSet;
use std::sync::Arc;

/// A search scope limiting which declarations a resolution pass sees.
/// Scopes filter on the module path a type was registered under.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Scope {
    prefix: Option<String>,
}

impl Scope {
    /// A scope spanning every registered declaration
    pub fn everything() -> Self {
        Self { prefix: None }
    }

    /// A scope limited to one module path and its submodules
    pub fn module<S: Into<String>>(prefix: S) -> Self {
        Self {
            prefix: Some(prefix.into()),
        }
    }

    /// Whether a declaration registered under `path` falls inside this scope
    pub fn contains(&self, path: &str) -> bool {
        match &self.prefix {
            None => true,
            Some(prefix) => {
                path == prefix
                    || (path.starts_with(prefix.as_str())
                        && path[prefix.len()..].starts_with("::"))
            }
        }
    }
}

impl Default for Scope {
    fn default() -> Self {
        Self::everything()
    }
}

/// Query surface over registered declarations.
///
/// `markers` arguments are role closures produced by the classifier; a
/// declaration matches when it carries at least one marker in the set.
pub trait Introspector: Send + Sync {
    /// The declaration of a type, if registered
    fn type_decl(&self, id: TypeId) -> Option<Arc<TypeDecl>>;

    /// Types inside `scope` carrying any of the given markers
    fn types_with_any(&self, scope: &Scope, markers: &HashSet<String>) -> Vec<Arc<TypeDecl>>;

    /// Constructors inside `scope` carrying any of the given markers
    fn constructors_with_any(
        &self,
        scope: &Scope,
        markers: &HashSet<String>,
    ) -> Vec<Arc<ConstructorDecl>>;

    /// Fields inside `scope` carrying any of the given markers
    fn fields_with_any(&self, scope: &Scope, markers: &HashSet<String>) -> Vec<Arc<FieldDecl>>;

    /// Methods inside `scope` carrying any of the given markers
    fn methods_with_any(&self, scope: &Scope, markers: &HashSet<String>) -> Vec<Arc<MethodDecl>>;

    /// Concrete types registered as implementations of the given type
    fn concrete_subtypes_of(&self, id: TypeId) -> Vec<Arc<TypeDecl>>;
}
