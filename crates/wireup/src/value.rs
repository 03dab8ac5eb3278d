//! Literal value resolution
//!
//! Value points carry literal strings (or string lists for arrays) that are
//! parsed into the target's declared scalar or array kind. The supported kind
//! table is closed: the numeric and boolean scalars, `char`, `String`, and
//! arrays of each.

use crate::classifier::RoleClassifier;
use crate::error::{Error, Result};
use crate::introspect::{FieldDecl, Instance, ParamDecl};
use crate::marker::{AttrValue, MarkerInstance, Role};
use std::sync::Arc;

/// Scalar kinds a Value point can declare
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ScalarKind {
    Bool,
    I8,
    I16,
    I32,
    I64,
    F32,
    F64,
    Char,
    Str,
}

impl ScalarKind {
    /// The kind's name, for diagnostics
    pub fn name(self) -> &'static str {
        match self {
            ScalarKind::Bool => "bool",
            ScalarKind::I8 => "i8",
            ScalarKind::I16 => "i16",
            ScalarKind::I32 => "i32",
            ScalarKind::I64 => "i64",
            ScalarKind::F32 => "f32",
            ScalarKind::F64 => "f64",
            ScalarKind::Char => "char",
            ScalarKind::Str => "str",
        }
    }

    /// Parse a literal into this kind. Floating literals accept a trailing
    /// `f`/`F`/`d`/`D` suffix; `char` takes the first character of the
    /// string; `str` passes through unchanged.
    pub fn parse(self, literal: &str) -> Result<Literal> {
        let fail = || Error::conversion(literal, self.name());
        match self {
            ScalarKind::Bool => literal.parse().map(Literal::Bool).map_err(|_| fail()),
            ScalarKind::I8 => literal.parse().map(Literal::I8).map_err(|_| fail()),
            ScalarKind::I16 => literal.parse().map(Literal::I16).map_err(|_| fail()),
            ScalarKind::I32 => literal.parse().map(Literal::I32).map_err(|_| fail()),
            ScalarKind::I64 => literal.parse().map(Literal::I64).map_err(|_| fail()),
            ScalarKind::F32 => strip_float_suffix(literal)
                .parse()
                .map(Literal::F32)
                .map_err(|_| fail()),
            ScalarKind::F64 => strip_float_suffix(literal)
                .parse()
                .map(Literal::F64)
                .map_err(|_| fail()),
            ScalarKind::Char => literal.chars().next().map(Literal::Char).ok_or_else(fail),
            ScalarKind::Str => Ok(Literal::Str(literal.to_string())),
        }
    }

    /// The kind's zero value
    pub fn zero(self) -> Literal {
        match self {
            ScalarKind::Bool => Literal::Bool(false),
            ScalarKind::I8 => Literal::I8(0),
            ScalarKind::I16 => Literal::I16(0),
            ScalarKind::I32 => Literal::I32(0),
            ScalarKind::I64 => Literal::I64(0),
            ScalarKind::F32 => Literal::F32(0.0),
            ScalarKind::F64 => Literal::F64(0.0),
            ScalarKind::Char => Literal::Char('\0'),
            ScalarKind::Str => Literal::Str(String::new()),
        }
    }
}

fn strip_float_suffix(literal: &str) -> &str {
    literal
        .strip_suffix(['f', 'F', 'd', 'D'])
        .unwrap_or(literal)
}

/// The declared kind of a Value point
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ValueKind {
    /// A single scalar
    Scalar(ScalarKind),
    /// An array of one scalar kind
    Array(ScalarKind),
}

impl ValueKind {
    /// The kind's zero value; arrays default to empty
    pub fn zero(self) -> Literal {
        match self {
            ValueKind::Scalar(kind) => kind.zero(),
            ValueKind::Array(kind) => Literal::empty_array(kind),
        }
    }
}

/// A parsed literal value
#[derive(Debug, Clone, PartialEq)]
pub enum Literal {
    Bool(bool),
    I8(i8),
    I16(i16),
    I32(i32),
    I64(i64),
    F32(f32),
    F64(f64),
    Char(char),
    Str(String),
    BoolArray(Vec<bool>),
    I8Array(Vec<i8>),
    I16Array(Vec<i16>),
    I32Array(Vec<i32>),
    I64Array(Vec<i64>),
    F32Array(Vec<f32>),
    F64Array(Vec<f64>),
    CharArray(Vec<char>),
    StrArray(Vec<String>),
}

impl Literal {
    fn empty_array(kind: ScalarKind) -> Self {
        Self::array_of(kind, Vec::new()).unwrap_or(Literal::StrArray(Vec::new()))
    }

    /// Collect parsed scalars of one kind into the matching array literal.
    /// Every element must already be of `kind`.
    fn array_of(kind: ScalarKind, elements: Vec<Literal>) -> Result<Self> {
        macro_rules! collect {
            ($variant:ident, $array:ident) => {
                elements
                    .into_iter()
                    .map(|e| match e {
                        Literal::$variant(v) => Ok(v),
                        other => Err(Error::internal(format!(
                            "mixed literal kinds in array: {other:?}"
                        ))),
                    })
                    .collect::<Result<Vec<_>>>()
                    .map(Literal::$array)
            };
        }
        match kind {
            ScalarKind::Bool => collect!(Bool, BoolArray),
            ScalarKind::I8 => collect!(I8, I8Array),
            ScalarKind::I16 => collect!(I16, I16Array),
            ScalarKind::I32 => collect!(I32, I32Array),
            ScalarKind::I64 => collect!(I64, I64Array),
            ScalarKind::F32 => collect!(F32, F32Array),
            ScalarKind::F64 => collect!(F64, F64Array),
            ScalarKind::Char => collect!(Char, CharArray),
            ScalarKind::Str => collect!(Str, StrArray),
        }
    }

    /// Box the literal as a registry instance of its native type
    pub fn into_instance(self) -> Instance {
        match self {
            Literal::Bool(v) => Arc::new(v),
            Literal::I8(v) => Arc::new(v),
            Literal::I16(v) => Arc::new(v),
            Literal::I32(v) => Arc::new(v),
            Literal::I64(v) => Arc::new(v),
            Literal::F32(v) => Arc::new(v),
            Literal::F64(v) => Arc::new(v),
            Literal::Char(v) => Arc::new(v),
            Literal::Str(v) => Arc::new(v),
            Literal::BoolArray(v) => Arc::new(v),
            Literal::I8Array(v) => Arc::new(v),
            Literal::I16Array(v) => Arc::new(v),
            Literal::I32Array(v) => Arc::new(v),
            Literal::I64Array(v) => Arc::new(v),
            Literal::F32Array(v) => Arc::new(v),
            Literal::F64Array(v) => Arc::new(v),
            Literal::CharArray(v) => Arc::new(v),
            Literal::StrArray(v) => Arc::new(v),
        }
    }
}

/// Resolves literal values for fields and parameters carrying a Value-role
/// marker
#[derive(Clone)]
pub struct ValueResolver {
    classifier: Arc<RoleClassifier>,
}

impl ValueResolver {
    pub fn new(classifier: Arc<RoleClassifier>) -> Self {
        Self { classifier }
    }

    /// The literal value of a field: the parsed marker payload, or the
    /// declared kind's zero value when no Value-role marker is present
    pub fn value_of_field(&self, field: &FieldDecl) -> Result<Literal> {
        self.value_of(field.value_kind, &field.markers, &field.describe())
    }

    /// The literal value of a parameter
    pub fn value_of_param(&self, param: &ParamDecl) -> Result<Literal> {
        self.value_of(param.value_kind, &param.markers, &param.name)
    }

    fn value_of(
        &self,
        kind: Option<ValueKind>,
        markers: &[MarkerInstance],
        declaration: &str,
    ) -> Result<Literal> {
        let Some(kind) = kind else {
            return Err(Error::unsupported_value_type(declaration));
        };
        let Some(marker) = self.classifier.role_marker(markers, Role::Value) else {
            return Ok(kind.zero());
        };

        let default = Role::Value.default_attribute().unwrap_or("value");
        let attribute = self
            .classifier
            .configured_attribute(marker.marker(), Role::Value)
            .unwrap_or_else(|| default.to_string());
        let payload = marker
            .attribute(&attribute)
            .ok_or_else(|| Error::value_extraction(marker.marker(), attribute.clone()))?;

        match (kind, payload) {
            (ValueKind::Scalar(scalar), AttrValue::Str(literal)) => scalar.parse(literal),
            // The payload attribute is list-shaped; a scalar target takes
            // the first element.
            (ValueKind::Scalar(scalar), AttrValue::List(literals)) => literals
                .first()
                .ok_or_else(|| Error::value_extraction(marker.marker(), attribute))
                .and_then(|literal| scalar.parse(literal)),
            (ValueKind::Array(scalar), AttrValue::Str(literal)) => {
                Literal::array_of(scalar, vec![scalar.parse(literal)?])
            }
            (ValueKind::Array(scalar), AttrValue::List(literals)) => {
                let elements = literals
                    .iter()
                    .map(|l| scalar.parse(l))
                    .collect::<Result<Vec<_>>>()?;
                Literal::array_of(scalar, elements)
            }
        }
    }
}
