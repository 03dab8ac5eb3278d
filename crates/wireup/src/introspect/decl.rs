//! Declaration data model
//!
//! Types, constructors, fields, methods and parameters are described by plain
//! structs holding their markers, their declared value types and the closures
//! that stand in for reflective invocation.

use crate::error::{Error, Result};
use crate::marker::MarkerInstance;
use crate::value::ValueKind;
use std::any::{Any, TypeId};
use std::fmt;
use std::sync::Arc;

/// A fully-constructed, registry-owned instance
pub type Instance = Arc<dyn Any + Send + Sync>;

/// Constructor body: turns resolved parameter instances into a new instance
pub type Factory = Arc<dyn Fn(&[Instance]) -> Result<Instance> + Send + Sync>;

/// Field assignment body. The receiver is `None` for static fields.
pub type Setter = Arc<dyn Fn(Option<&Instance>, Instance) -> Result<()> + Send + Sync>;

/// Method body. The receiver is `None` for static methods; the return value
/// is `None` for unit-returning methods.
pub type MethodBody =
    Arc<dyn Fn(Option<&Instance>, &[Instance]) -> Result<Option<Instance>> + Send + Sync>;

/// Downcast a registry instance to its concrete type
pub fn downcast<T: Send + Sync + 'static>(instance: Instance) -> Result<Arc<T>> {
    instance
        .downcast::<T>()
        .map_err(|_| Error::downcast(std::any::type_name::<T>()))
}

/// Runtime identity of a declared type: its `TypeId` plus a readable name
/// for diagnostics
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct TypeKey {
    id: TypeId,
    name: &'static str,
}

impl TypeKey {
    /// The key of a type, including trait objects
    pub fn of<T: ?Sized + 'static>() -> Self {
        Self {
            id: TypeId::of::<T>(),
            name: std::any::type_name::<T>(),
        }
    }

    /// The underlying `TypeId`
    pub fn id(&self) -> TypeId {
        self.id
    }

    /// The type's name as written in source
    pub fn name(&self) -> &'static str {
        self.name
    }
}

impl fmt::Display for TypeKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name)
    }
}

/// Whether a type can be instantiated directly
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TypeKind {
    /// Instantiable type; `sealed` suppresses the producer proxy
    Concrete {
        /// Final-equivalent: no proxy wrapping on lazy creation
        sealed: bool,
    },
    /// Trait or otherwise uninstantiable type, resolved through its
    /// registered implementations
    Abstract,
}

/// A declared parameter of a constructor or method
#[derive(Clone)]
pub struct ParamDecl {
    /// Parameter name, for diagnostics
    pub name: String,
    /// The declared parameter type
    pub value_type: TypeKey,
    /// Scalar or array kind, set when the parameter can be a Value point
    pub value_kind: Option<ValueKind>,
    /// Markers on the parameter, in encounter order
    pub markers: Vec<MarkerInstance>,
}

impl ParamDecl {
    /// A parameter resolved from the registry
    pub fn dependency<S: Into<String>>(name: S, value_type: TypeKey) -> Self {
        Self {
            name: name.into(),
            value_type,
            value_kind: None,
            markers: Vec::new(),
        }
    }

    /// A parameter holding a literal scalar or array value
    pub fn literal<S: Into<String>>(name: S, value_type: TypeKey, kind: ValueKind) -> Self {
        Self {
            name: name.into(),
            value_type,
            value_kind: Some(kind),
            markers: Vec::new(),
        }
    }

    /// Attach a marker
    pub fn marker(mut self, marker: MarkerInstance) -> Self {
        self.markers.push(marker);
        self
    }
}

impl fmt::Debug for ParamDecl {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ParamDecl")
            .field("name", &self.name)
            .field("value_type", &self.value_type)
            .finish_non_exhaustive()
    }
}

/// A declared constructor of a concrete type
#[derive(Clone)]
pub struct ConstructorDecl {
    /// The declaring type; assigned when the constructor is attached
    pub owner: TypeKey,
    /// Parameters in declaration order
    pub params: Vec<ParamDecl>,
    /// Markers on the constructor, in encounter order
    pub markers: Vec<MarkerInstance>,
    /// The constructor body
    pub factory: Factory,
}

impl ConstructorDecl {
    /// Declare a constructor with the given body
    pub fn new<F>(factory: F) -> Self
    where
        F: Fn(&[Instance]) -> Result<Instance> + Send + Sync + 'static,
    {
        Self {
            owner: TypeKey::of::<()>(),
            params: Vec::new(),
            markers: Vec::new(),
            factory: Arc::new(factory),
        }
    }

    /// Append a parameter
    pub fn param(mut self, param: ParamDecl) -> Self {
        self.params.push(param);
        self
    }

    /// Attach a marker
    pub fn marker(mut self, marker: MarkerInstance) -> Self {
        self.markers.push(marker);
        self
    }

    /// Readable identification for error messages
    pub fn describe(&self) -> String {
        format!("{}::new/{}", self.owner, self.params.len())
    }
}

impl fmt::Debug for ConstructorDecl {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ConstructorDecl")
            .field("owner", &self.owner)
            .field("params", &self.params)
            .finish_non_exhaustive()
    }
}

/// A declared field of a type
#[derive(Clone)]
pub struct FieldDecl {
    /// The declaring type; assigned when the field is attached
    pub owner: TypeKey,
    /// Field name
    pub name: String,
    /// The declared field type
    pub value_type: TypeKey,
    /// Scalar or array kind, set when the field can be a Value point
    pub value_kind: Option<ValueKind>,
    /// Markers on the field, in encounter order
    pub markers: Vec<MarkerInstance>,
    /// Static fields are assigned without a receiver instance
    pub is_static: bool,
    /// Assignment body; fields declared only for dependency-ordering
    /// metadata carry none
    pub setter: Option<Setter>,
}

impl FieldDecl {
    /// Declare a field of the given type
    pub fn new<S: Into<String>>(name: S, value_type: TypeKey) -> Self {
        Self {
            owner: TypeKey::of::<()>(),
            name: name.into(),
            value_type,
            value_kind: None,
            markers: Vec::new(),
            is_static: false,
            setter: None,
        }
    }

    /// Set the scalar or array kind for Value resolution
    pub fn kind(mut self, kind: ValueKind) -> Self {
        self.value_kind = Some(kind);
        self
    }

    /// Attach a marker
    pub fn marker(mut self, marker: MarkerInstance) -> Self {
        self.markers.push(marker);
        self
    }

    /// Mark the field static
    pub fn static_member(mut self) -> Self {
        self.is_static = true;
        self
    }

    /// Attach the assignment body
    pub fn setter<F>(mut self, setter: F) -> Self
    where
        F: Fn(Option<&Instance>, Instance) -> Result<()> + Send + Sync + 'static,
    {
        self.setter = Some(Arc::new(setter));
        self
    }

    /// Readable identification for error messages
    pub fn describe(&self) -> String {
        format!("{}::{}", self.owner, self.name)
    }
}

impl fmt::Debug for FieldDecl {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FieldDecl")
            .field("owner", &self.owner)
            .field("name", &self.name)
            .field("value_type", &self.value_type)
            .finish_non_exhaustive()
    }
}

/// A declared method of a type
#[derive(Clone)]
pub struct MethodDecl {
    /// The declaring type; assigned when the method is attached
    pub owner: TypeKey,
    /// Method name
    pub name: String,
    /// Declared return type; `None` for unit-returning methods
    pub return_type: Option<TypeKey>,
    /// Parameters in declaration order
    pub params: Vec<ParamDecl>,
    /// Markers on the method, in encounter order
    pub markers: Vec<MarkerInstance>,
    /// Static methods are invoked without a receiver instance
    pub is_static: bool,
    /// The method body
    pub body: MethodBody,
}

impl MethodDecl {
    /// Declare a method with the given body
    pub fn new<S, F>(name: S, body: F) -> Self
    where
        S: Into<String>,
        F: Fn(Option<&Instance>, &[Instance]) -> Result<Option<Instance>> + Send + Sync + 'static,
    {
        Self {
            owner: TypeKey::of::<()>(),
            name: name.into(),
            return_type: None,
            params: Vec::new(),
            markers: Vec::new(),
            is_static: false,
            body: Arc::new(body),
        }
    }

    /// Set the declared return type
    pub fn returns(mut self, return_type: TypeKey) -> Self {
        self.return_type = Some(return_type);
        self
    }

    /// Append a parameter
    pub fn param(mut self, param: ParamDecl) -> Self {
        self.params.push(param);
        self
    }

    /// Attach a marker
    pub fn marker(mut self, marker: MarkerInstance) -> Self {
        self.markers.push(marker);
        self
    }

    /// Mark the method static
    pub fn static_member(mut self) -> Self {
        self.is_static = true;
        self
    }

    /// Readable identification for error messages
    pub fn describe(&self) -> String {
        format!("{}::{}", self.owner, self.name)
    }
}

impl fmt::Debug for MethodDecl {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("MethodDecl")
            .field("owner", &self.owner)
            .field("name", &self.name)
            .field("return_type", &self.return_type)
            .finish_non_exhaustive()
    }
}

/// A registered type declaration
#[derive(Debug, Clone)]
pub struct TypeDecl {
    /// The type's identity
    pub key: TypeKey,
    /// Module path the type was registered under, for scope filtering
    pub module: String,
    /// Concrete or abstract
    pub kind: TypeKind,
    /// Markers on the type, in encounter order
    pub markers: Vec<MarkerInstance>,
    /// Constructors in declaration order
    pub constructors: Vec<Arc<ConstructorDecl>>,
    /// Fields in declaration order
    pub fields: Vec<Arc<FieldDecl>>,
    /// Methods in declaration order
    pub methods: Vec<Arc<MethodDecl>>,
    /// Abstract types this type implements
    pub supertypes: Vec<TypeId>,
}

impl TypeDecl {
    /// Whether the type can be instantiated directly
    pub fn is_concrete(&self) -> bool {
        matches!(self.kind, TypeKind::Concrete { .. })
    }

    /// Whether the type is final-equivalent
    pub fn is_sealed(&self) -> bool {
        matches!(self.kind, TypeKind::Concrete { sealed: true })
    }

    /// Look up a declared method by name
    pub fn method(&self, name: &str) -> Option<&Arc<MethodDecl>> {
        self.methods.iter().find(|m| m.name == name)
    }

    /// Look up a declared field by name
    pub fn field(&self, name: &str) -> Option<&Arc<FieldDecl>> {
        self.fields.iter().find(|f| f.name == name)
    }

    /// Whether the type declares a field of the given type
    pub fn declares_field_of(&self, id: TypeId) -> bool {
        self.fields.iter().any(|f| f.value_type.id() == id)
    }
}
