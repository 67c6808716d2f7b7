//! Error taxonomy of the compiler.
//!
//! Every error is a generation-time failure caused by the schema or the
//! options handed to [`compile`](crate::compile). None of them are transient:
//! compiling the same input again reproduces the same error.

use thiserror::Error;

/// A malformed or inconsistent schema.
///
/// Raised while the [`Schema`](crate::schema::Schema) is assembled and
/// validated. Only the first violation is reported, in declaration order.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SchemaError {
    #[error("malformed schema: {0}")]
    MalformedInput(String),

    #[error("schema does not define a query root type")]
    MissingQueryRoot,

    #[error("type `{0}` is defined more than once")]
    DuplicateTypeName(String),

    #[error("`{type_name}` declares `{member}` more than once")]
    DuplicateMemberName { type_name: String, member: String },

    #[error("`{from}` references undefined type `{to}`")]
    DanglingTypeReference { from: String, to: String },

    #[error("`{from}` cannot reference `{to}` in this position")]
    IncompatibleTypeReference { from: String, to: String },

    #[error("{operation} root type `{type_name}` is not an object type")]
    InvalidRootType {
        operation: String,
        type_name: String,
    },

    #[error("union `{union}` lists `{member}`, which is not an object type")]
    InvalidUnionMember { union: String, member: String },

    #[error("`{object}` implements `{interface}` but field `{field}` does not match")]
    InterfaceFieldMismatch {
        interface: String,
        object: String,
        field: String,
    },
}

/// A scalar that is neither built in nor mapped by the caller.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("scalar `{0}` has no type mapping, add it to the scalar overrides")]
pub struct UnknownScalarError(pub String);

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CompileError {
    #[error(transparent)]
    Schema(#[from] SchemaError),

    #[error(transparent)]
    UnknownScalar(#[from] UnknownScalarError),

    #[error("input types can never be constructed: {}", .cycle.join(" -> "))]
    CyclicInputType { cycle: Vec<String> },

    #[error("{scope}: `{first}` and `{second}` both normalize to `{normalized}`")]
    NamingCollision {
        scope: String,
        first: String,
        second: String,
        normalized: String,
    },

    #[error("{scope}: `{identifier}` does not contain any usable identifier characters")]
    EmptyIdentifier { scope: String, identifier: String },

    #[error("invalid options: {0}")]
    InvalidOptions(String),
}

pub type Result<T, E = CompileError> = std::result::Result<T, E>;
