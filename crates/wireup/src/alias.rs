//! Dependency alias resolution
//!
//! Extracts the alias string(s) a role marker associates with a declaration.
//! The value-bearing attribute name is configurable per marker type through
//! the vocabulary; a marker whose definition configures a custom attribute
//! name must carry that attribute, while a canonical marker without the
//! default attribute simply means the default alias.

use crate::classifier::RoleClassifier;
use crate::error::{Error, Result};
use crate::introspect::MethodDecl;
use crate::marker::{AttrValue, MarkerInstance, Role};
use std::sync::Arc;

/// The alias instances are registered under when none is declared
pub const DEFAULT_ALIAS: &str = "";

/// Resolves alias strings from Alias-role and Injectable-role markers
#[derive(Clone)]
pub struct AliasResolver {
    classifier: Arc<RoleClassifier>,
}

impl AliasResolver {
    pub fn new(classifier: Arc<RoleClassifier>) -> Self {
        Self { classifier }
    }

    /// The alias of a field or parameter: the first Alias-role marker in
    /// encounter order wins; no marker means the default alias
    pub fn alias_of(&self, markers: &[MarkerInstance]) -> Result<String> {
        let Some(marker) = self.classifier.role_marker(markers, Role::Alias) else {
            return Ok(DEFAULT_ALIAS.to_string());
        };

        let configured = self
            .classifier
            .configured_attribute(marker.marker(), Role::Alias);
        let default = Role::Alias.default_attribute().unwrap_or("value");
        let attribute = configured.clone().unwrap_or_else(|| default.to_string());

        match marker.attribute(&attribute) {
            Some(AttrValue::Str(alias)) => Ok(alias.clone()),
            Some(AttrValue::List(_)) => Err(Error::alias_extraction(marker.marker(), attribute)),
            None if configured.is_some() => {
                Err(Error::alias_extraction(marker.marker(), attribute))
            }
            None => Ok(DEFAULT_ALIAS.to_string()),
        }
    }

    /// The ordered alias list a producer method declares: the first
    /// Injectable-role marker's scalar or list attribute. An empty list
    /// means "register under the default alias only".
    pub fn aliases_of(&self, method: &MethodDecl) -> Result<Vec<String>> {
        let Some(marker) = self
            .classifier
            .role_marker(&method.markers, Role::Injectable)
        else {
            return Ok(Vec::new());
        };

        let configured = self
            .classifier
            .configured_attribute(marker.marker(), Role::Injectable);
        let default = Role::Injectable.default_attribute().unwrap_or("alias");
        let attribute = configured.clone().unwrap_or_else(|| default.to_string());

        match marker.attribute(&attribute) {
            Some(AttrValue::Str(alias)) => Ok(vec![alias.clone()]),
            Some(AttrValue::List(aliases)) => Ok(aliases.clone()),
            None if configured.is_some() => {
                Err(Error::alias_extraction(marker.marker(), attribute))
            }
            None => Ok(Vec::new()),
        }
    }
}
