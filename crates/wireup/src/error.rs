//! Error handling types

use thiserror::Error;

/// Result type alias for operations that can fail
pub type Result<T> = std::result::Result<T, Error>;

/// Main error type for the dependency-resolution engine
#[derive(Error, Debug)]
pub enum Error {
    /// A resolution phase failed for one declaration; always fatal to the pass
    #[error("cannot process {phase} declaration {declaration}: {source}")]
    Processing {
        /// Name of the phase that was running
        phase: String,
        /// The declaration that failed
        declaration: String,
        /// The underlying failure
        #[source]
        source: Box<Error>,
    },

    /// An abstract type has no concrete implementation registered
    #[error("cannot find suitable implementation for {type_name}")]
    NoSuitableImplementation {
        /// The abstract type that was requested
        type_name: String,
    },

    /// An abstract type has more than one concrete implementation registered
    #[error("found {count} suitable implementations for {type_name}, expected exactly one")]
    AmbiguousImplementation {
        /// The abstract type that was requested
        type_name: String,
        /// How many concrete implementations matched
        count: usize,
    },

    /// A constructor invocation itself failed
    #[error("cannot instantiate {type_name}: {source}")]
    Instantiation {
        /// The type whose constructor failed
        type_name: String,
        /// The underlying failure
        #[source]
        source: Box<Error>,
    },

    /// A marker classified into the Alias or Injectable role lacks its
    /// value-bearing attribute
    #[error("marker {marker} must carry attribute '{attribute}' to be used as alias")]
    AliasExtraction {
        /// The marker type missing the attribute
        marker: String,
        /// The attribute name that was expected
        attribute: String,
    },

    /// A marker classified into the Value role lacks its value-bearing attribute
    #[error("marker {marker} must carry attribute '{attribute}' to be used as value")]
    ValueExtraction {
        /// The marker type missing the attribute
        marker: String,
        /// The attribute name that was expected
        attribute: String,
    },

    /// A Value point targets a declared type outside the supported scalar and
    /// array kinds
    #[error("unsupported value type for {declaration}")]
    UnsupportedValueType {
        /// The declaration carrying the Value marker
        declaration: String,
    },

    /// A literal string could not be parsed into the declared scalar kind
    #[error("cannot convert '{value}' to {kind}")]
    Conversion {
        /// The literal that failed to parse
        value: String,
        /// The target scalar kind
        kind: String,
    },

    /// A type or member was requested that the introspector has no
    /// declaration for
    #[error("unknown declaration: {declaration}")]
    UnknownDeclaration {
        /// The missing declaration
        declaration: String,
    },

    /// A registered instance could not be downcast to the requested type
    #[error("registered instance is not of type {type_name}")]
    Downcast {
        /// The requested type
        type_name: String,
    },

    /// Internal invariant violation
    #[error("internal error: {message}")]
    Internal {
        /// Description of the violated invariant
        message: String,
    },
}

impl Error {
    /// Wrap a per-declaration failure into a phase-specific processing error
    pub fn processing<P: Into<String>, D: Into<String>>(
        phase: P,
        declaration: D,
        source: Error,
    ) -> Self {
        Self::Processing {
            phase: phase.into(),
            declaration: declaration.into(),
            source: Box::new(source),
        }
    }

    /// Create a no-suitable-implementation error
    pub fn no_suitable_implementation<S: Into<String>>(type_name: S) -> Self {
        Self::NoSuitableImplementation {
            type_name: type_name.into(),
        }
    }

    /// Create an ambiguous-implementation error
    pub fn ambiguous_implementation<S: Into<String>>(type_name: S, count: usize) -> Self {
        Self::AmbiguousImplementation {
            type_name: type_name.into(),
            count,
        }
    }

    /// Create an instantiation error wrapping the underlying cause
    pub fn instantiation<S: Into<String>>(type_name: S, source: Error) -> Self {
        Self::Instantiation {
            type_name: type_name.into(),
            source: Box::new(source),
        }
    }

    /// Create an alias-extraction error
    pub fn alias_extraction<M: Into<String>, A: Into<String>>(marker: M, attribute: A) -> Self {
        Self::AliasExtraction {
            marker: marker.into(),
            attribute: attribute.into(),
        }
    }

    /// Create a value-extraction error
    pub fn value_extraction<M: Into<String>, A: Into<String>>(marker: M, attribute: A) -> Self {
        Self::ValueExtraction {
            marker: marker.into(),
            attribute: attribute.into(),
        }
    }

    /// Create an unsupported-value-type error
    pub fn unsupported_value_type<S: Into<String>>(declaration: S) -> Self {
        Self::UnsupportedValueType {
            declaration: declaration.into(),
        }
    }

    /// Create a conversion error
    pub fn conversion<V: Into<String>, K: Into<String>>(value: V, kind: K) -> Self {
        Self::Conversion {
            value: value.into(),
            kind: kind.into(),
        }
    }

    /// Create an unknown-declaration error
    pub fn unknown_declaration<S: Into<String>>(declaration: S) -> Self {
        Self::UnknownDeclaration {
            declaration: declaration.into(),
        }
    }

    /// Create a downcast error
    pub fn downcast<S: Into<String>>(type_name: S) -> Self {
        Self::Downcast {
            type_name: type_name.into(),
        }
    }

    /// Create an internal error
    pub fn internal<S: Into<String>>(message: S) -> Self {
        Self::Internal {
            message: message.into(),
        }
    }
}
