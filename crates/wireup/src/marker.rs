//! Role markers and the marker vocabulary
//!
//! Markers are named, attributed tags attached to declarations. Six canonical
//! markers exist, one per [`Role`]. A host may define custom markers that
//! carry a canonical marker on their own definition; the classifier then
//! treats them as specializations of that role. This one-level meta table is
//! the only extension mechanism the engine exposes.

use std::collections::{BTreeMap, HashMap};
use std::fmt;

/// The six canonical responsibilities a marker can express
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Role {
    /// Type whose members receive injected values
    Component,
    /// Type whose producer methods register values
    Configuration,
    /// Producer method whose return value becomes a registry entry
    Injectable,
    /// Constructor, field or method that receives values from the registry
    Inject,
    /// Named registry key for a dependency
    Alias,
    /// Literal value assignment for a field or parameter
    Value,
}

impl Role {
    /// All roles, in classification order
    pub const ALL: [Role; 6] = [
        Role::Component,
        Role::Configuration,
        Role::Injectable,
        Role::Inject,
        Role::Alias,
        Role::Value,
    ];

    /// Name of the role's canonical marker
    pub fn canonical_name(self) -> &'static str {
        match self {
            Role::Component => "Component",
            Role::Configuration => "Configuration",
            Role::Injectable => "Injectable",
            Role::Inject => "Inject",
            Role::Alias => "Alias",
            Role::Value => "Value",
        }
    }

    /// Default name of the role's value-bearing attribute, if it has one
    pub fn default_attribute(self) -> Option<&'static str> {
        match self {
            Role::Alias | Role::Value => Some("value"),
            Role::Injectable => Some("alias"),
            Role::Component | Role::Configuration | Role::Inject => None,
        }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.canonical_name())
    }
}

/// An attribute value carried by a marker instance
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AttrValue {
    /// Single string payload
    Str(String),
    /// Ordered list payload
    List(Vec<String>),
}

impl AttrValue {
    /// Build a list payload from anything yielding strings
    pub fn list<I, S>(items: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        AttrValue::List(items.into_iter().map(Into::into).collect())
    }

    /// The single string payload, if this is one
    pub fn as_str(&self) -> Option<&str> {
        match self {
            AttrValue::Str(s) => Some(s),
            AttrValue::List(_) => None,
        }
    }
}

impl From<&str> for AttrValue {
    fn from(s: &str) -> Self {
        AttrValue::Str(s.to_string())
    }
}

impl From<String> for AttrValue {
    fn from(s: String) -> Self {
        AttrValue::Str(s)
    }
}

impl From<Vec<String>> for AttrValue {
    fn from(items: Vec<String>) -> Self {
        AttrValue::List(items)
    }
}

/// A marker applied to a declaration: the marker type name plus its
/// attribute values
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MarkerInstance {
    marker: String,
    attributes: BTreeMap<String, AttrValue>,
}

impl MarkerInstance {
    /// Create an instance of the named marker with no attributes
    pub fn new<S: Into<String>>(marker: S) -> Self {
        Self {
            marker: marker.into(),
            attributes: BTreeMap::new(),
        }
    }

    /// Create an instance of a role's canonical marker
    pub fn of_role(role: Role) -> Self {
        Self::new(role.canonical_name())
    }

    /// Attach an attribute value
    pub fn attr<N: Into<String>, V: Into<AttrValue>>(mut self, name: N, value: V) -> Self {
        self.attributes.insert(name.into(), value.into());
        self
    }

    /// The marker type name
    pub fn marker(&self) -> &str {
        &self.marker
    }

    /// Look up an attribute value by name
    pub fn attribute(&self, name: &str) -> Option<&AttrValue> {
        self.attributes.get(name)
    }
}

/// Registration-time definition of a custom marker: its name plus the meta
/// markers applied to the marker declaration itself
#[derive(Debug, Clone)]
pub struct MarkerDef {
    name: String,
    meta: Vec<MarkerInstance>,
}

impl MarkerDef {
    /// Define a custom marker with the given name
    pub fn new<S: Into<String>>(name: S) -> Self {
        Self {
            name: name.into(),
            meta: Vec::new(),
        }
    }

    /// Attach a meta marker to the definition. A meta instance may carry an
    /// `attribute` value to rename the role's value-bearing attribute for
    /// this marker.
    pub fn meta(mut self, marker: MarkerInstance) -> Self {
        self.meta.push(marker);
        self
    }

    /// The marker's name
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Meta markers carried by the definition, in encounter order
    pub fn meta_markers(&self) -> &[MarkerInstance] {
        &self.meta
    }
}

/// The set of marker definitions a resolution pass classifies against.
/// Canonical markers are implicit and need not be defined.
#[derive(Debug, Clone, Default)]
pub struct MarkerVocabulary {
    defs: HashMap<String, MarkerDef>,
}

impl MarkerVocabulary {
    /// Create an empty vocabulary (canonical markers only)
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a custom marker definition; a later definition under the
    /// same name replaces the earlier one
    pub fn define(mut self, def: MarkerDef) -> Self {
        self.defs.insert(def.name().to_string(), def);
        self
    }

    /// Look up a custom marker definition by name
    pub fn definition(&self, name: &str) -> Option<&MarkerDef> {
        self.defs.get(name)
    }

    /// All custom marker definitions, in no particular order
    pub fn definitions(&self) -> impl Iterator<Item = &MarkerDef> {
        self.defs.values()
    }
}
