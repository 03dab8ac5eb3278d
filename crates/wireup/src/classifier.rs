//! Role classification
//!
//! Decides which markers act as which roles. A role's closure starts with its
//! canonical marker and grows by fixpoint over the vocabulary: a custom
//! marker joins the closure when its definition directly carries a marker
//! already in it. Closures are computed once per role and memoized; within a
//! resolution pass a classification never changes.

use crate::introspect::{MethodDecl, TypeDecl};
use crate::marker::{MarkerInstance, MarkerVocabulary, Role};
use dashmap::DashMap;
use std::collections::HashSet;
use std::sync::Arc;

/// Classifies markers into roles and applies the eligibility rules for
/// producers and injection points
pub struct RoleClassifier {
    vocabulary: Arc<MarkerVocabulary>,
    closures: DashMap<Role, Arc<HashSet<String>>>,
}

impl RoleClassifier {
    pub fn new(vocabulary: Arc<MarkerVocabulary>) -> Self {
        Self {
            vocabulary,
            closures: DashMap::new(),
        }
    }

    /// The vocabulary this classifier reads
    pub fn vocabulary(&self) -> &Arc<MarkerVocabulary> {
        &self.vocabulary
    }

    /// The set of marker names classified under the given role
    pub fn markers_of(&self, role: Role) -> Arc<HashSet<String>> {
        if let Some(cached) = self.closures.get(&role) {
            return Arc::clone(&cached);
        }
        let closure = Arc::new(self.compute_closure(role));
        self.closures.insert(role, Arc::clone(&closure));
        closure
    }

    fn compute_closure(&self, role: Role) -> HashSet<String> {
        let mut closure: HashSet<String> = HashSet::new();
        closure.insert(role.canonical_name().to_string());

        // Fixpoint: each step admits markers whose definition directly
        // carries a marker already classified.
        loop {
            let mut grew = false;
            for def in self.vocabulary.definitions() {
                if closure.contains(def.name()) {
                    continue;
                }
                if def
                    .meta_markers()
                    .iter()
                    .any(|meta| closure.contains(meta.marker()))
                {
                    closure.insert(def.name().to_string());
                    grew = true;
                }
            }
            if !grew {
                break;
            }
        }
        closure
    }

    /// Whether the named marker is classified under the given role
    pub fn is_role_marker(&self, marker: &str, role: Role) -> bool {
        self.markers_of(role).contains(marker)
    }

    /// Whether any of the given markers is classified under the role
    pub fn has_role(&self, markers: &[MarkerInstance], role: Role) -> bool {
        let closure = self.markers_of(role);
        markers.iter().any(|m| closure.contains(m.marker()))
    }

    /// The first marker (in encounter order) classified under the role
    pub fn role_marker<'a>(
        &self,
        markers: &'a [MarkerInstance],
        role: Role,
    ) -> Option<&'a MarkerInstance> {
        let closure = self.markers_of(role);
        markers.iter().find(|m| closure.contains(m.marker()))
    }

    /// The configured value-bearing attribute name for a custom marker under
    /// the given role, taken from the `attribute` value on the meta marker
    /// that put it in the role's closure. `None` means the role default.
    pub fn configured_attribute(&self, marker: &str, role: Role) -> Option<String> {
        let def = self.vocabulary.definition(marker)?;
        let closure = self.markers_of(role);
        let meta = def
            .meta_markers()
            .iter()
            .find(|m| closure.contains(m.marker()))?;
        meta.attribute("attribute")
            .and_then(|v| v.as_str())
            .map(ToString::to_string)
    }

    /// Whether the type is classified as a component
    pub fn is_component_type(&self, decl: &TypeDecl) -> bool {
        self.has_role(&decl.markers, Role::Component)
    }

    /// Whether the type is classified as a configuration
    pub fn is_configuration_type(&self, decl: &TypeDecl) -> bool {
        self.has_role(&decl.markers, Role::Configuration)
    }

    /// A producer must return a value and belong to a configuration type
    pub fn is_eligible_producer(&self, method: &MethodDecl, owner: &TypeDecl) -> bool {
        method.return_type.is_some() && self.is_configuration_type(owner)
    }

    /// An injection point must belong to a component type
    pub fn is_eligible_injection_point(&self, owner: &TypeDecl) -> bool {
        self.is_component_type(owner)
    }
}
