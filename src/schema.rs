//! Immutable in-memory model of a GraphQL schema.
//!
//! A [`Schema`] is only obtainable through [`SchemaBuilder::build`], which
//! runs the validation pass, so every downstream stage can rely on all
//! references resolving to a type of a compatible kind.

use std::collections::{HashMap, HashSet};
use std::fmt;
use tracing::{debug, trace};
use crate::error::SchemaError;

pub const BUILT_IN_SCALARS: &[&str] = &["ID", "String", "Int", "Float", "Boolean"];

const DEFAULT_QUERY_ROOT: &str = "Query";
const DEFAULT_MUTATION_ROOT: &str = "Mutation";
const DEFAULT_SUBSCRIPTION_ROOT: &str = "Subscription";

/// Nullability and list wrappers around a named type.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum TypeRef {
    Named(String),
    NonNull(Box<TypeRef>),
    List(Box<TypeRef>),
}

impl TypeRef {
    pub fn named(name: impl Into<String>) -> TypeRef {
        TypeRef::Named(name.into())
    }

    pub fn non_null(inner: TypeRef) -> TypeRef {
        TypeRef::NonNull(Box::new(inner))
    }

    pub fn list(inner: TypeRef) -> TypeRef {
        TypeRef::List(Box::new(inner))
    }

    /// Name of the innermost named type.
    pub fn base_name(&self) -> &str {
        match self {
            TypeRef::Named(name) => name,
            TypeRef::NonNull(inner) | TypeRef::List(inner) => inner.base_name(),
        }
    }

    pub fn is_nullable(&self) -> bool {
        !matches!(self, TypeRef::NonNull(_))
    }

    fn has_double_non_null(&self) -> bool {
        match self {
            TypeRef::Named(_) => false,
            TypeRef::NonNull(inner) => {
                matches!(**inner, TypeRef::NonNull(_)) || inner.has_double_non_null()
            }
            TypeRef::List(inner) => inner.has_double_non_null(),
        }
    }
}

impl fmt::Display for TypeRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TypeRef::Named(name) => write!(f, "{}", name),
            TypeRef::NonNull(inner) => write!(f, "{}!", inner),
            TypeRef::List(inner) => write!(f, "[{}]", inner),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Deprecation {
    pub reason: Option<String>,
}

/// A field argument or an input-object field.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InputValue {
    pub name: String,
    pub description: Option<String>,
    pub value_type: TypeRef,
    /// Default value as GraphQL literal text.
    pub default_value: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Field {
    pub name: String,
    pub description: Option<String>,
    pub arguments: Vec<InputValue>,
    pub field_type: TypeRef,
    pub deprecation: Option<Deprecation>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ObjectType {
    pub name: String,
    pub description: Option<String>,
    pub fields: Vec<Field>,
    pub interfaces: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InterfaceType {
    pub name: String,
    pub description: Option<String>,
    pub fields: Vec<Field>,
    pub interfaces: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UnionType {
    pub name: String,
    pub description: Option<String>,
    pub members: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EnumValue {
    pub name: String,
    pub description: Option<String>,
    pub deprecation: Option<Deprecation>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EnumType {
    pub name: String,
    pub description: Option<String>,
    pub values: Vec<EnumValue>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InputObjectType {
    pub name: String,
    pub description: Option<String>,
    pub fields: Vec<InputValue>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScalarType {
    pub name: String,
    pub description: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TypeKind {
    Scalar,
    Object,
    Interface,
    Union,
    Enum,
    InputObject,
}

impl TypeKind {
    pub fn is_input(self) -> bool {
        matches!(self, TypeKind::Scalar | TypeKind::Enum | TypeKind::InputObject)
    }

    pub fn is_output(self) -> bool {
        !matches!(self, TypeKind::InputObject)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TypeDefinition {
    Scalar(ScalarType),
    Object(ObjectType),
    Interface(InterfaceType),
    Union(UnionType),
    Enum(EnumType),
    InputObject(InputObjectType),
}

impl TypeDefinition {
    pub fn name(&self) -> &str {
        match self {
            TypeDefinition::Scalar(definition) => &definition.name,
            TypeDefinition::Object(definition) => &definition.name,
            TypeDefinition::Interface(definition) => &definition.name,
            TypeDefinition::Union(definition) => &definition.name,
            TypeDefinition::Enum(definition) => &definition.name,
            TypeDefinition::InputObject(definition) => &definition.name,
        }
    }

    pub fn kind(&self) -> TypeKind {
        match self {
            TypeDefinition::Scalar(_) => TypeKind::Scalar,
            TypeDefinition::Object(_) => TypeKind::Object,
            TypeDefinition::Interface(_) => TypeKind::Interface,
            TypeDefinition::Union(_) => TypeKind::Union,
            TypeDefinition::Enum(_) => TypeKind::Enum,
            TypeDefinition::InputObject(_) => TypeKind::InputObject,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum OperationKind {
    Query,
    Mutation,
    Subscription,
}

impl OperationKind {
    /// The GraphQL keyword, which is also the name of the generated entry point.
    pub fn keyword(self) -> &'static str {
        match self {
            OperationKind::Query => "query",
            OperationKind::Mutation => "mutation",
            OperationKind::Subscription => "subscription",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Schema {
    types: Vec<TypeDefinition>,
    index: HashMap<String, usize>,
    query_type: String,
    mutation_type: Option<String>,
    subscription_type: Option<String>,
}

impl Schema {
    pub fn builder() -> SchemaBuilder {
        SchemaBuilder::new()
    }

    /// All types, built-in scalars first, then in declaration order.
    pub fn types(&self) -> impl Iterator<Item = &TypeDefinition> {
        self.types.iter()
    }

    pub fn get(&self, name: &str) -> Option<&TypeDefinition> {
        self.index.get(name).map(|position| &self.types[*position])
    }

    pub fn kind_of(&self, name: &str) -> Option<TypeKind> {
        self.get(name).map(TypeDefinition::kind)
    }

    pub fn object(&self, name: &str) -> Option<&ObjectType> {
        match self.get(name) {
            Some(TypeDefinition::Object(object)) => Some(object),
            _ => None,
        }
    }

    pub fn query_type(&self) -> &str {
        &self.query_type
    }

    pub fn mutation_type(&self) -> Option<&str> {
        self.mutation_type.as_deref()
    }

    pub fn subscription_type(&self) -> Option<&str> {
        self.subscription_type.as_deref()
    }

    /// Root operation types in query, mutation, subscription order.
    pub fn root_types(&self) -> Vec<(OperationKind, &str)> {
        let mut roots = vec![(OperationKind::Query, self.query_type.as_str())];
        if let Some(name) = &self.mutation_type {
            roots.push((OperationKind::Mutation, name.as_str()));
        }
        if let Some(name) = &self.subscription_type {
            roots.push((OperationKind::Subscription, name.as_str()));
        }
        roots
    }

    pub fn is_root_type(&self, name: &str) -> bool {
        self.root_types().iter().any(|(_, root)| *root == name)
    }
}

/// Assembles a [`Schema`] from parsed definitions.
pub struct SchemaBuilder {
    types: Vec<TypeDefinition>,
    index: HashMap<String, usize>,
    query_type: Option<String>,
    mutation_type: Option<String>,
    subscription_type: Option<String>,
}

impl SchemaBuilder {
    pub fn new() -> SchemaBuilder {
        let mut builder = SchemaBuilder {
            types: Vec::new(),
            index: HashMap::new(),
            query_type: None,
            mutation_type: None,
            subscription_type: None,
        };
        for scalar in BUILT_IN_SCALARS {
            builder.insert(TypeDefinition::Scalar(ScalarType {
                name: scalar.to_string(),
                description: None,
            }));
        }
        builder
    }

    /// Adds a type definition. Redeclaring a built-in scalar is a no-op.
    pub fn add_type(&mut self, definition: TypeDefinition) -> Result<(), SchemaError> {
        let name = definition.name();
        if let Some(existing) = self.index.get(name) {
            let is_built_in = BUILT_IN_SCALARS.contains(&name);
            let both_scalars = matches!(
                (&self.types[*existing], &definition),
                (TypeDefinition::Scalar(_), TypeDefinition::Scalar(_))
            );
            if is_built_in && both_scalars {
                trace!(name, "built-in scalar redeclared");
                return Ok(());
            }
            return Err(SchemaError::DuplicateTypeName(name.to_string()));
        }
        self.insert(definition);
        Ok(())
    }

    pub fn query_type(&mut self, name: impl Into<String>) -> &mut Self {
        self.query_type = Some(name.into());
        self
    }

    pub fn mutation_type(&mut self, name: impl Into<String>) -> &mut Self {
        self.mutation_type = Some(name.into());
        self
    }

    pub fn subscription_type(&mut self, name: impl Into<String>) -> &mut Self {
        self.subscription_type = Some(name.into());
        self
    }

    pub fn build(self) -> Result<Schema, SchemaError> {
        let default_root = |explicit: Option<String>, fallback: &str| {
            explicit.or_else(|| {
                self.index
                    .contains_key(fallback)
                    .then(|| fallback.to_string())
            })
        };
        let query_type = default_root(self.query_type.clone(), DEFAULT_QUERY_ROOT)
            .ok_or(SchemaError::MissingQueryRoot)?;
        let mutation_type = default_root(self.mutation_type.clone(), DEFAULT_MUTATION_ROOT);
        let subscription_type =
            default_root(self.subscription_type.clone(), DEFAULT_SUBSCRIPTION_ROOT);

        let schema = Schema {
            types: self.types,
            index: self.index,
            query_type,
            mutation_type,
            subscription_type,
        };
        validate(&schema)?;
        debug!(types = schema.types.len(), "schema validated");
        Ok(schema)
    }

    fn insert(&mut self, definition: TypeDefinition) {
        self.index.insert(definition.name().to_string(), self.types.len());
        self.types.push(definition);
    }
}

impl Default for SchemaBuilder {
    fn default() -> Self {
        SchemaBuilder::new()
    }
}

fn validate(schema: &Schema) -> Result<(), SchemaError> {
    validate_roots(schema)?;
    for definition in schema.types() {
        match definition {
            TypeDefinition::Scalar(_) => (),
            TypeDefinition::Object(object) => {
                validate_fields(schema, &object.name, &object.fields)?;
                validate_implements(schema, &object.name, &object.interfaces)?;
                check_interface_contract(schema, &object.name, &object.fields, &object.interfaces)?;
            }
            TypeDefinition::Interface(interface) => {
                validate_fields(schema, &interface.name, &interface.fields)?;
                validate_implements(schema, &interface.name, &interface.interfaces)?;
                check_interface_contract(schema, &interface.name, &interface.fields, &interface.interfaces)?;
            }
            TypeDefinition::Union(union) => check_union_members(schema, union)?,
            TypeDefinition::Enum(enum_def) => {
                check_unique(&enum_def.name, enum_def.values.iter().map(|value| value.name.as_str()))?;
            }
            TypeDefinition::InputObject(input) => {
                check_unique(&input.name, input.fields.iter().map(|field| field.name.as_str()))?;
                for field in &input.fields {
                    let from = format!("{}.{}", input.name, field.name);
                    validate_reference(schema, &from, &field.value_type, TypeKind::is_input)?;
                }
            }
        }
    }
    Ok(())
}

fn check_union_members(schema: &Schema, union: &UnionType) -> Result<(), SchemaError> {
    let mut seen = HashSet::new();
    for member in &union.members {
        if !seen.insert(member.as_str()) {
            return Err(SchemaError::DuplicateMemberName {
                type_name: union.name.clone(),
                member: member.clone(),
            });
        }
        match schema.kind_of(member) {
            Some(TypeKind::Object) => (),
            Some(_) => {
                return Err(SchemaError::InvalidUnionMember {
                    union: union.name.clone(),
                    member: member.clone(),
                })
            }
            None => {
                return Err(SchemaError::DanglingTypeReference {
                    from: union.name.clone(),
                    to: member.clone(),
                })
            }
        }
    }
    Ok(())
}

/// Every field of every implemented interface must be present on the
/// implementor with the same type and the same arguments. Extra arguments on
/// the implementor must be nullable.
fn check_interface_contract(
    schema: &Schema,
    implementor: &str,
    fields: &[Field],
    interfaces: &[String],
) -> Result<(), SchemaError> {
    for interface_name in interfaces {
        let Some(TypeDefinition::Interface(interface)) = schema.get(interface_name) else {
            continue;
        };
        for expected in &interface.fields {
            let mismatch = || SchemaError::InterfaceFieldMismatch {
                interface: interface.name.clone(),
                object: implementor.to_string(),
                field: expected.name.clone(),
            };
            let actual = fields
                .iter()
                .find(|field| field.name == expected.name)
                .ok_or_else(mismatch)?;
            if actual.field_type != expected.field_type {
                return Err(mismatch());
            }
            for argument in &expected.arguments {
                let matches = actual
                    .arguments
                    .iter()
                    .any(|candidate| candidate.name == argument.name && candidate.value_type == argument.value_type);
                if !matches {
                    return Err(mismatch());
                }
            }
            let extra_required = actual.arguments.iter().any(|argument| {
                !argument.value_type.is_nullable()
                    && !expected.arguments.iter().any(|other| other.name == argument.name)
            });
            if extra_required {
                return Err(mismatch());
            }
        }
    }
    Ok(())
}

fn validate_roots(schema: &Schema) -> Result<(), SchemaError> {
    for (operation, name) in schema.root_types() {
        match schema.kind_of(name) {
            Some(TypeKind::Object) => (),
            Some(_) => {
                return Err(SchemaError::InvalidRootType {
                    operation: operation.keyword().to_string(),
                    type_name: name.to_string(),
                })
            }
            None if operation == OperationKind::Query => return Err(SchemaError::MissingQueryRoot),
            None => {
                return Err(SchemaError::DanglingTypeReference {
                    from: "schema".to_string(),
                    to: name.to_string(),
                })
            }
        }
    }
    Ok(())
}

fn validate_fields(schema: &Schema, type_name: &str, fields: &[Field]) -> Result<(), SchemaError> {
    check_unique(type_name, fields.iter().map(|field| field.name.as_str()))?;
    for field in fields {
        let from = format!("{}.{}", type_name, field.name);
        validate_reference(schema, &from, &field.field_type, TypeKind::is_output)?;
        check_unique(&from, field.arguments.iter().map(|argument| argument.name.as_str()))?;
        for argument in &field.arguments {
            let from = format!("{}.{}({})", type_name, field.name, argument.name);
            validate_reference(schema, &from, &argument.value_type, TypeKind::is_input)?;
        }
    }
    Ok(())
}

fn validate_implements(schema: &Schema, type_name: &str, interfaces: &[String]) -> Result<(), SchemaError> {
    check_unique(type_name, interfaces.iter().map(String::as_str))?;
    for interface in interfaces {
        match schema.kind_of(interface) {
            Some(TypeKind::Interface) if interface != type_name => (),
            Some(_) => {
                return Err(SchemaError::IncompatibleTypeReference {
                    from: type_name.to_string(),
                    to: interface.clone(),
                })
            }
            None => {
                return Err(SchemaError::DanglingTypeReference {
                    from: type_name.to_string(),
                    to: interface.clone(),
                })
            }
        }
    }
    Ok(())
}

fn validate_reference(
    schema: &Schema,
    from: &str,
    type_ref: &TypeRef,
    allowed: fn(TypeKind) -> bool,
) -> Result<(), SchemaError> {
    if type_ref.has_double_non_null() {
        return Err(SchemaError::MalformedInput(format!(
            "`{}` wraps a non-null type in another non-null",
            from
        )));
    }
    let to = type_ref.base_name();
    match schema.kind_of(to) {
        Some(kind) if allowed(kind) => Ok(()),
        Some(_) => Err(SchemaError::IncompatibleTypeReference {
            from: from.to_string(),
            to: to.to_string(),
        }),
        None => Err(SchemaError::DanglingTypeReference {
            from: from.to_string(),
            to: to.to_string(),
        }),
    }
}

fn check_unique<'a>(type_name: &str, names: impl Iterator<Item = &'a str>) -> Result<(), SchemaError> {
    let mut seen = HashSet::new();
    for name in names {
        if !seen.insert(name) {
            return Err(SchemaError::DuplicateMemberName {
                type_name: type_name.to_string(),
                member: name.to_string(),
            });
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn field(name: &str, field_type: TypeRef) -> Field {
        Field {
            name: name.to_string(),
            description: None,
            arguments: Vec::new(),
            field_type,
            deprecation: None,
        }
    }

    fn object(name: &str, fields: Vec<Field>) -> TypeDefinition {
        TypeDefinition::Object(ObjectType {
            name: name.to_string(),
            description: None,
            fields,
            interfaces: Vec::new(),
        })
    }

    #[test]
    fn type_ref_display_uses_graphql_syntax() {
        let type_ref = TypeRef::non_null(TypeRef::list(TypeRef::non_null(TypeRef::named("String"))));
        assert_eq!(type_ref.to_string(), "[String!]!");
        assert_eq!(type_ref.base_name(), "String");
        assert!(!type_ref.is_nullable());
    }

    #[test]
    fn built_in_scalars_are_always_present() {
        let mut builder = Schema::builder();
        builder.add_type(object("Query", vec![field("id", TypeRef::named("ID"))])).unwrap();
        let schema = builder.build().unwrap();
        for scalar in BUILT_IN_SCALARS {
            assert_eq!(schema.kind_of(scalar), Some(TypeKind::Scalar));
        }
        assert_eq!(schema.query_type(), "Query");
        assert_eq!(schema.mutation_type(), None);
    }

    #[test]
    fn redeclaring_built_in_scalar_is_ignored() {
        let mut builder = Schema::builder();
        let string = TypeDefinition::Scalar(ScalarType { name: "String".to_string(), description: None });
        assert_eq!(builder.add_type(string), Ok(()));
    }

    #[test]
    fn duplicate_type_is_rejected() {
        let mut builder = Schema::builder();
        builder.add_type(object("Query", vec![field("a", TypeRef::named("Int"))])).unwrap();
        let error = builder.add_type(object("Query", vec![])).unwrap_err();
        assert_eq!(error, SchemaError::DuplicateTypeName("Query".to_string()));
    }

    #[test]
    fn missing_query_root_is_rejected() {
        let mut builder = Schema::builder();
        builder.add_type(object("Thing", vec![field("a", TypeRef::named("Int"))])).unwrap();
        assert_eq!(builder.build().unwrap_err(), SchemaError::MissingQueryRoot);
    }

    #[test]
    fn explicit_query_root_must_exist() {
        let mut builder = Schema::builder();
        builder.add_type(object("Thing", vec![field("a", TypeRef::named("Int"))])).unwrap();
        builder.query_type("Root");
        assert_eq!(builder.build().unwrap_err(), SchemaError::MissingQueryRoot);
    }

    #[test]
    fn double_non_null_is_malformed() {
        let mut builder = Schema::builder();
        let doubled = TypeRef::non_null(TypeRef::non_null(TypeRef::named("Int")));
        builder.add_type(object("Query", vec![field("a", doubled)])).unwrap();
        assert!(matches!(builder.build(), Err(SchemaError::MalformedInput(_))));
    }

    #[test]
    fn dangling_reference_reports_path() {
        let mut builder = Schema::builder();
        builder.add_type(object("Query", vec![field("a", TypeRef::named("Missing"))])).unwrap();
        assert_eq!(
            builder.build().unwrap_err(),
            SchemaError::DanglingTypeReference { from: "Query.a".to_string(), to: "Missing".to_string() }
        );
    }
}
