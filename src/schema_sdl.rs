use graphql_parser::schema::{
    parse_schema, Definition, Directive, Document, Field as SdlField, InputValue as SdlInputValue,
    Type, TypeDefinition as SdlTypeDefinition, Value,
};
use tracing::{debug, warn};
use crate::error::SchemaError;
use crate::schema::{
    Deprecation, EnumType, EnumValue, Field, InputObjectType, InputValue, InterfaceType, ObjectType,
    ScalarType, Schema, SchemaBuilder, TypeDefinition, TypeRef, UnionType,
};

const DEPRECATED_DIRECTIVE: &str = "deprecated";
const DEFAULT_DEPRECATION_REASON: &str = "No longer supported";

/// Parses schema definition language text into a validated [`Schema`].
pub fn from_sdl_string(sdl: &str) -> Result<Schema, SchemaError> {
    let document: Document<'_, String> =
        parse_schema(sdl).map_err(|error| SchemaError::MalformedInput(error.to_string()))?;
    from_parser_document(document)
}

fn from_parser_document(document: Document<'_, String>) -> Result<Schema, SchemaError> {
    let mut builder = Schema::builder();
    for definition in document.definitions {
        match definition {
            Definition::TypeDefinition(definition) => {
                builder.add_type(to_type_definition(definition))?;
            }
            Definition::SchemaDefinition(definition) => {
                set_roots(&mut builder, definition.query, definition.mutation, definition.subscription);
            }
            Definition::TypeExtension(_) => {
                warn!("type extensions are not supported and were ignored");
            }
            Definition::DirectiveDefinition(definition) => {
                debug!(directive = %definition.name, "directive definition ignored");
            }
        }
    }
    builder.build()
}

fn set_roots(
    builder: &mut SchemaBuilder,
    query: Option<String>,
    mutation: Option<String>,
    subscription: Option<String>,
) {
    if let Some(query) = query {
        builder.query_type(query);
    }
    if let Some(mutation) = mutation {
        builder.mutation_type(mutation);
    }
    if let Some(subscription) = subscription {
        builder.subscription_type(subscription);
    }
}

fn to_type_definition(definition: SdlTypeDefinition<'_, String>) -> TypeDefinition {
    match definition {
        SdlTypeDefinition::Scalar(scalar) => TypeDefinition::Scalar(ScalarType {
            name: scalar.name,
            description: scalar.description,
        }),
        SdlTypeDefinition::Object(object) => TypeDefinition::Object(ObjectType {
            name: object.name,
            description: object.description,
            fields: object.fields.iter().map(to_field).collect(),
            interfaces: object.implements_interfaces,
        }),
        SdlTypeDefinition::Interface(interface) => TypeDefinition::Interface(InterfaceType {
            name: interface.name,
            description: interface.description,
            fields: interface.fields.iter().map(to_field).collect(),
            interfaces: interface.implements_interfaces,
        }),
        SdlTypeDefinition::Union(union) => TypeDefinition::Union(UnionType {
            name: union.name,
            description: union.description,
            members: union.types,
        }),
        SdlTypeDefinition::Enum(enum_def) => TypeDefinition::Enum(EnumType {
            name: enum_def.name,
            description: enum_def.description,
            values: enum_def
                .values
                .iter()
                .map(|value| EnumValue {
                    name: value.name.clone(),
                    description: value.description.clone(),
                    deprecation: to_deprecation(&value.directives),
                })
                .collect(),
        }),
        SdlTypeDefinition::InputObject(input) => TypeDefinition::InputObject(InputObjectType {
            name: input.name,
            description: input.description,
            fields: input.fields.iter().map(to_input_value).collect(),
        }),
    }
}

fn to_field(field: &SdlField<'_, String>) -> Field {
    Field {
        name: field.name.clone(),
        description: field.description.clone(),
        arguments: field.arguments.iter().map(to_input_value).collect(),
        field_type: to_type_ref(&field.field_type),
        deprecation: to_deprecation(&field.directives),
    }
}

fn to_input_value(value: &SdlInputValue<'_, String>) -> InputValue {
    InputValue {
        name: value.name.clone(),
        description: value.description.clone(),
        value_type: to_type_ref(&value.value_type),
        default_value: value.default_value.as_ref().map(|default| default.to_string()),
    }
}

fn to_type_ref(field_type: &Type<'_, String>) -> TypeRef {
    match field_type {
        Type::NamedType(name) => TypeRef::named(name.clone()),
        Type::ListType(inner) => TypeRef::list(to_type_ref(inner)),
        Type::NonNullType(inner) => TypeRef::non_null(to_type_ref(inner)),
    }
}

fn to_deprecation(directives: &[Directive<'_, String>]) -> Option<Deprecation> {
    let directive = directives
        .iter()
        .find(|directive| directive.name == DEPRECATED_DIRECTIVE)?;
    let reason = directive
        .arguments
        .iter()
        .find_map(|(name, value)| match value {
            Value::String(reason) if name == "reason" => Some(reason.clone()),
            _ => None,
        })
        .unwrap_or_else(|| DEFAULT_DEPRECATION_REASON.to_string());
    Some(Deprecation { reason: Some(reason) })
}
