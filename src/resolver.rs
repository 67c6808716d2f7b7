use std::collections::{BTreeMap, HashMap, HashSet};
use tracing::{debug, trace};
use crate::error::{CompileError, SchemaError};
use crate::naming::{to_lower_camel, to_upper_camel};
use crate::scalars::{self, ScalarCodec, ScalarOverrides, TargetType};
use crate::schema::{
    EnumType, EnumValue, Field, InputObjectType, InputValue, OperationKind, ScalarType, Schema,
    TypeDefinition, TypeKind, TypeRef,
};

/// Names the emitted module imports from the runtime package.
pub const RUNTIME_IMPORTS: &[&str] = &[
    "AbstractSelection",
    "ObjectSelection",
    "Operation",
    "Scalar",
    "Selection",
    "SelectionEntry",
    "argument",
    "decodeBuiltin",
    "decodeEnum",
    "decodeList",
    "decodeNull",
    "encodeInput",
    "encodeList",
    "encodeNull",
    "field",
    "fragment",
    "operation",
];

pub const SCALARS_INTERFACE: &str = "Scalars";

/// A [`TypeRef`] flattened for rendering.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TypeSignature {
    pub base_name: String,
    pub nullable: bool,
    pub list_depth: usize,
    /// Nullability of the items of each list level, outermost first.
    pub item_nullable: Vec<bool>,
}

impl TypeSignature {
    pub fn flatten(type_ref: &TypeRef) -> TypeSignature {
        fn strip(type_ref: &TypeRef) -> (bool, &TypeRef) {
            match type_ref {
                TypeRef::NonNull(inner) => (false, inner.as_ref()),
                other => (true, other),
            }
        }

        let (nullable, mut current) = strip(type_ref);
        let mut item_nullable = Vec::new();
        while let TypeRef::List(inner) = current {
            let (item, next) = strip(inner);
            item_nullable.push(item);
            current = next;
        }
        TypeSignature {
            base_name: current.base_name().to_string(),
            nullable,
            list_depth: item_nullable.len(),
            item_nullable,
        }
    }
}

/// What a signature's base name resolved to. Names are normalized target names.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BaseType {
    Scalar(TargetType),
    Enum(String),
    InputObject(String),
    Composite(String),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CompositeKind {
    Object,
    Interface,
    Union,
}

#[derive(Debug)]
pub struct ResolvedScalar<'a> {
    pub definition: &'a ScalarType,
    pub target: TargetType,
}

#[derive(Debug)]
pub struct ResolvedEnumValue<'a> {
    pub value: &'a EnumValue,
    pub target_name: String,
}

#[derive(Debug)]
pub struct ResolvedEnum<'a> {
    pub definition: &'a EnumType,
    pub target_name: String,
    pub values: Vec<ResolvedEnumValue<'a>>,
}

#[derive(Debug)]
pub struct ResolvedInputValue<'a> {
    pub value: &'a InputValue,
    pub key: String,
    pub signature: TypeSignature,
    pub base: BaseType,
}

impl ResolvedInputValue<'_> {
    pub fn is_optional(&self) -> bool {
        self.signature.nullable || self.value.default_value.is_some()
    }
}

#[derive(Debug)]
pub struct ResolvedInputObject<'a> {
    pub definition: &'a InputObjectType,
    pub target_name: String,
    pub fields: Vec<ResolvedInputValue<'a>>,
}

#[derive(Debug)]
pub struct ResolvedField<'a> {
    pub field: &'a Field,
    pub key: String,
    pub signature: TypeSignature,
    pub base: BaseType,
    pub arguments: Vec<ResolvedInputValue<'a>>,
}

#[derive(Debug)]
pub struct PossibleType<'a> {
    pub name: &'a str,
    pub target_name: String,
    pub key: String,
}

#[derive(Debug)]
pub struct ResolvedComposite<'a> {
    pub name: &'a str,
    pub kind: CompositeKind,
    pub description: Option<&'a str>,
    pub target_name: String,
    pub fields: Vec<ResolvedField<'a>>,
    pub possible_types: Vec<PossibleType<'a>>,
}

#[derive(Debug)]
pub struct ResolvedOperation<'a> {
    pub kind: OperationKind,
    pub root: ResolvedComposite<'a>,
}

#[derive(Debug)]
pub enum PlanItem<'a> {
    Scalar(ResolvedScalar<'a>),
    Enum(ResolvedEnum<'a>),
    InputObject(ResolvedInputObject<'a>),
    Composite(ResolvedComposite<'a>),
    Operation(ResolvedOperation<'a>),
}

impl<'a> PlanItem<'a> {
    pub fn type_name(&self) -> &'a str {
        match self {
            PlanItem::Scalar(scalar) => &scalar.definition.name,
            PlanItem::Enum(enum_def) => &enum_def.definition.name,
            PlanItem::InputObject(input) => &input.definition.name,
            PlanItem::Composite(composite) => composite.name,
            PlanItem::Operation(operation) => operation.root.name,
        }
    }
}

/// Declarations in emission order: custom scalars, enums, input objects in
/// dependency order, objects/interfaces/unions, root operation types.
#[derive(Debug)]
pub struct EmissionPlan<'a> {
    pub items: Vec<PlanItem<'a>>,
}

impl<'a> EmissionPlan<'a> {
    pub fn type_names(&self) -> Vec<&'a str> {
        self.items.iter().map(PlanItem::type_name).collect()
    }
}

pub fn resolve<'a>(schema: &'a Schema, overrides: &ScalarOverrides) -> Result<EmissionPlan<'a>, CompileError> {
    let custom_scalars = resolve_scalars(schema, overrides)?;
    let implementations = implementation_graph(schema);
    check_naming(schema, &implementations)?;
    let inputs = order_input_objects(schema)?;

    let resolver = Resolver { schema, overrides, implementations };
    let mut items = Vec::new();

    for definition in schema.types() {
        if let TypeDefinition::Scalar(scalar) = definition {
            if custom_scalars.contains(scalar.name.as_str()) {
                let target = scalars::resolve(&scalar.name, overrides)?;
                items.push(PlanItem::Scalar(ResolvedScalar { definition: scalar, target }));
            }
        }
    }
    for definition in schema.types() {
        if let TypeDefinition::Enum(enum_def) = definition {
            items.push(PlanItem::Enum(resolver.resolve_enum(enum_def)));
        }
    }
    for input in inputs {
        items.push(PlanItem::InputObject(resolver.resolve_input_object(input)?));
    }
    for definition in schema.types() {
        if schema.is_root_type(definition.name()) {
            continue;
        }
        if let Some(composite) = resolver.resolve_composite(definition)? {
            items.push(PlanItem::Composite(composite));
        }
    }
    for (kind, name) in schema.root_types() {
        let root = schema
            .get(name)
            .map(|definition| resolver.resolve_composite(definition))
            .transpose()?
            .flatten()
            .ok_or(SchemaError::MissingQueryRoot)?;
        items.push(PlanItem::Operation(ResolvedOperation { kind, root }));
    }

    debug!(items = items.len(), "emission plan resolved");
    Ok(EmissionPlan { items })
}

/// Interface name to the object types implementing it, in declaration order.
pub fn implementation_graph(schema: &Schema) -> BTreeMap<&str, Vec<&str>> {
    let mut graph: BTreeMap<&str, Vec<&str>> = BTreeMap::new();
    for definition in schema.types() {
        if let TypeDefinition::Object(object) = definition {
            for interface in &object.interfaces {
                graph.entry(interface.as_str()).or_default().push(&object.name);
            }
        }
    }
    graph
}

fn resolve_scalars<'a>(schema: &'a Schema, overrides: &ScalarOverrides) -> Result<HashSet<&'a str>, CompileError> {
    let mut custom = HashSet::new();
    for type_ref in referenced_types(schema) {
        let name = type_ref.base_name();
        if schema.kind_of(name) != Some(TypeKind::Scalar) {
            continue;
        }
        let target = scalars::resolve(name, overrides)?;
        if let ScalarCodec::Custom(_) = target.codec {
            if custom.insert(name) {
                trace!(scalar = name, target = %target.type_name, "custom scalar mapped");
            }
        }
    }
    Ok(custom)
}


fn referenced_types(schema: &Schema) -> Vec<&TypeRef> {
    fn push_fields<'a>(fields: &'a [Field], references: &mut Vec<&'a TypeRef>) {
        for field in fields {
            references.push(&field.field_type);
            references.extend(field.arguments.iter().map(|argument| &argument.value_type));
        }
    }

    let mut references = Vec::new();
    for definition in schema.types() {
        match definition {
            TypeDefinition::Object(object) => push_fields(&object.fields, &mut references),
            TypeDefinition::Interface(interface) => push_fields(&interface.fields, &mut references),
            TypeDefinition::InputObject(input) => {
                references.extend(input.fields.iter().map(|field| &field.value_type));
            }
            TypeDefinition::Scalar(_) | TypeDefinition::Union(_) | TypeDefinition::Enum(_) => (),
        }
    }
    references
}

fn fragment_key(member: &str) -> String {
    format!("on{}", to_upper_camel(member))
}

fn possible_type_names<'a>(
    definition: &'a TypeDefinition,
    implementations: &BTreeMap<&str, Vec<&'a str>>,
) -> Vec<&'a str> {
    match definition {
        TypeDefinition::Interface(interface) => implementations
            .get(interface.name.as_str())
            .cloned()
            .unwrap_or_default(),
        TypeDefinition::Union(union) => union.members.iter().map(String::as_str).collect(),
        _ => Vec::new(),
    }
}

fn check_naming(schema: &Schema, implementations: &BTreeMap<&str, Vec<&str>>) -> Result<(), CompileError> {
    let type_names = schema
        .types()
        .filter(|definition| definition.kind() != TypeKind::Scalar)
        .map(|definition| (definition.name().to_string(), to_upper_camel(definition.name())));
    check_scope("type names", type_names)?;

    let reserved = RUNTIME_IMPORTS
        .iter()
        .map(|name| (format!("runtime `{}`", name), name.to_string()))
        .chain(std::iter::once((
            format!("generated `{}`", SCALARS_INTERFACE),
            SCALARS_INTERFACE.to_string(),
        )));
    let declared = schema.types().flat_map(module_declarations);
    check_scope("module declarations", reserved.chain(declared))?;

    for definition in schema.types() {
        let name = definition.name();
        match definition {
            TypeDefinition::Scalar(_) => (),
            TypeDefinition::Object(_) | TypeDefinition::Interface(_) | TypeDefinition::Union(_) => {
                let fields: &[Field] = match definition {
                    TypeDefinition::Object(object) => &object.fields,
                    TypeDefinition::Interface(interface) => &interface.fields,
                    _ => &[],
                };
                let members = fields
                    .iter()
                    .map(|field| (field.name.clone(), to_lower_camel(&field.name)))
                    .chain(
                        possible_type_names(definition, implementations)
                            .into_iter()
                            .map(|member| (format!("... on {}", member), fragment_key(member))),
                    );
                check_scope(&format!("fields of `{}`", name), members)?;
                for field in fields {
                    let arguments = field
                        .arguments
                        .iter()
                        .map(|argument| (argument.name.clone(), to_lower_camel(&argument.name)));
                    check_scope(&format!("arguments of `{}.{}`", name, field.name), arguments)?;
                }
            }
            TypeDefinition::Enum(enum_def) => {
                let values = enum_def
                    .values
                    .iter()
                    .map(|value| (value.name.clone(), to_upper_camel(&value.name)));
                check_scope(&format!("values of `{}`", name), values)?;
            }
            TypeDefinition::InputObject(input) => {
                let fields = input
                    .fields
                    .iter()
                    .map(|field| (field.name.clone(), to_lower_camel(&field.name)));
                check_scope(&format!("fields of `{}`", name), fields)?;
            }
        }
    }
    Ok(())
}

// Top-level identifiers the emitted module declares for one type.
fn module_declarations(definition: &TypeDefinition) -> Vec<(String, String)> {
    let name = definition.name();
    let target = to_upper_camel(name);
    let declared = match definition {
        TypeDefinition::Scalar(_) => Vec::new(),
        TypeDefinition::Enum(_) => vec![format!("decode{}", target), target],
        TypeDefinition::InputObject(_) => vec![format!("encode{}", target), target],
        TypeDefinition::Object(_) | TypeDefinition::Interface(_) | TypeDefinition::Union(_) => {
            vec![format!("{}Selection", target)]
        }
    };
    declared
        .into_iter()
        .map(|identifier| (name.to_string(), identifier))
        .collect()
}

// Entries are (wire identifier, normalized identifier).
fn check_scope(scope: &str, entries: impl IntoIterator<Item = (String, String)>) -> Result<(), CompileError> {
    let mut seen: HashMap<String, String> = HashMap::new();
    let mut empty: Option<String> = None;
    for (identifier, normalized) in entries {
        if let Some(first) = seen.get(&normalized) {
            return Err(CompileError::NamingCollision {
                scope: scope.to_string(),
                first: first.clone(),
                second: identifier,
                normalized,
            });
        }
        if normalized.is_empty() && empty.is_none() {
            empty = Some(identifier.clone());
        }
        seen.insert(normalized, identifier);
    }
    match empty {
        Some(identifier) => Err(CompileError::EmptyIdentifier {
            scope: scope.to_string(),
            identifier,
        }),
        None => Ok(()),
    }
}

#[derive(Clone, Copy, PartialEq, Eq)]
enum Mark {
    Visiting,
    Done,
}

fn order_input_objects(schema: &Schema) -> Result<Vec<&InputObjectType>, CompileError> {
    let inputs: Vec<&InputObjectType> = schema
        .types()
        .filter_map(|definition| match definition {
            TypeDefinition::InputObject(input) => Some(input),
            _ => None,
        })
        .collect();

    let mut marks = HashMap::new();
    let mut path = Vec::new();
    for input in &inputs {
        if let Some(cycle) = find_required_cycle(schema, input, &mut marks, &mut path) {
            return Err(CompileError::CyclicInputType { cycle });
        }
    }

    let mut visited = HashSet::new();
    let mut ordered = Vec::with_capacity(inputs.len());
    for input in inputs {
        visit_dependencies(schema, input, &mut visited, &mut ordered);
    }
    Ok(ordered)
}

fn required_input_dependency<'a>(schema: &'a Schema, field: &InputValue) -> Option<&'a InputObjectType> {
    let TypeRef::NonNull(inner) = &field.value_type else {
        return None;
    };
    let TypeRef::Named(name) = inner.as_ref() else {
        return None;
    };
    match schema.get(name) {
        Some(TypeDefinition::InputObject(input)) => Some(input),
        _ => None,
    }
}

fn find_required_cycle<'a>(
    schema: &'a Schema,
    input: &'a InputObjectType,
    marks: &mut HashMap<&'a str, Mark>,
    path: &mut Vec<&'a str>,
) -> Option<Vec<String>> {
    match marks.get(input.name.as_str()) {
        Some(Mark::Done) => return None,
        Some(Mark::Visiting) => {
            let start = path.iter().position(|name| *name == input.name)?;
            let mut cycle: Vec<String> = path[start..].iter().map(|name| name.to_string()).collect();
            cycle.push(input.name.clone());
            return Some(cycle);
        }
        None => (),
    }

    marks.insert(&input.name, Mark::Visiting);
    path.push(&input.name);
    for field in &input.fields {
        if let Some(dependency) = required_input_dependency(schema, field) {
            if let Some(cycle) = find_required_cycle(schema, dependency, marks, path) {
                return Some(cycle);
            }
        }
    }
    path.pop();
    marks.insert(&input.name, Mark::Done);
    None
}

fn visit_dependencies<'a>(
    schema: &'a Schema,
    input: &'a InputObjectType,
    visited: &mut HashSet<&'a str>,
    ordered: &mut Vec<&'a InputObjectType>,
) {
    if !visited.insert(&input.name) {
        return;
    }
    for field in &input.fields {
        if let Some(TypeDefinition::InputObject(dependency)) = schema.get(field.value_type.base_name()) {
            visit_dependencies(schema, dependency, visited, ordered);
        }
    }
    ordered.push(input);
}

struct Resolver<'a, 'o> {
    schema: &'a Schema,
    overrides: &'o ScalarOverrides,
    implementations: BTreeMap<&'a str, Vec<&'a str>>,
}

impl<'a> Resolver<'a, '_> {
    fn base_type(&self, from: &str, type_ref: &TypeRef) -> Result<BaseType, CompileError> {
        let name = type_ref.base_name();
        let base = match self.schema.kind_of(name) {
            Some(TypeKind::Scalar) => BaseType::Scalar(scalars::resolve(name, self.overrides)?),
            Some(TypeKind::Enum) => BaseType::Enum(to_upper_camel(name)),
            Some(TypeKind::InputObject) => BaseType::InputObject(to_upper_camel(name)),
            Some(TypeKind::Object | TypeKind::Interface | TypeKind::Union) => {
                BaseType::Composite(to_upper_camel(name))
            }
            None => {
                return Err(SchemaError::DanglingTypeReference {
                    from: from.to_string(),
                    to: name.to_string(),
                }
                .into())
            }
        };
        Ok(base)
    }

    fn resolve_input_value(&self, from: &str, value: &'a InputValue) -> Result<ResolvedInputValue<'a>, CompileError> {
        Ok(ResolvedInputValue {
            value,
            key: to_lower_camel(&value.name),
            signature: TypeSignature::flatten(&value.value_type),
            base: self.base_type(from, &value.value_type)?,
        })
    }

    fn resolve_enum(&self, definition: &'a EnumType) -> ResolvedEnum<'a> {
        ResolvedEnum {
            definition,
            target_name: to_upper_camel(&definition.name),
            values: definition
                .values
                .iter()
                .map(|value| ResolvedEnumValue {
                    value,
                    target_name: to_upper_camel(&value.name),
                })
                .collect(),
        }
    }

    fn resolve_input_object(&self, definition: &'a InputObjectType) -> Result<ResolvedInputObject<'a>, CompileError> {
        let fields = definition
            .fields
            .iter()
            .map(|field| self.resolve_input_value(&definition.name, field))
            .collect::<Result<Vec<_>, _>>()?;
        trace!(input = %definition.name, fields = fields.len(), "input object resolved");
        Ok(ResolvedInputObject {
            definition,
            target_name: to_upper_camel(&definition.name),
            fields,
        })
    }

    fn resolve_field(&self, type_name: &str, field: &'a Field) -> Result<ResolvedField<'a>, CompileError> {
        let from = format!("{}.{}", type_name, field.name);
        let arguments = field
            .arguments
            .iter()
            .map(|argument| self.resolve_input_value(&from, argument))
            .collect::<Result<Vec<_>, _>>()?;
        Ok(ResolvedField {
            field,
            key: to_lower_camel(&field.name),
            signature: TypeSignature::flatten(&field.field_type),
            base: self.base_type(&from, &field.field_type)?,
            arguments,
        })
    }

    fn resolve_composite(&self, definition: &'a TypeDefinition) -> Result<Option<ResolvedComposite<'a>>, CompileError> {
        let (kind, fields, description): (CompositeKind, &'a [Field], &'a Option<String>) = match definition {
            TypeDefinition::Object(object) => (CompositeKind::Object, &object.fields, &object.description),
            TypeDefinition::Interface(interface) => {
                (CompositeKind::Interface, &interface.fields, &interface.description)
            }
            TypeDefinition::Union(union) => (CompositeKind::Union, &[], &union.description),
            TypeDefinition::Scalar(_) | TypeDefinition::Enum(_) | TypeDefinition::InputObject(_) => {
                return Ok(None)
            }
        };
        let name = definition.name();
        let fields = fields
            .iter()
            .map(|field| self.resolve_field(name, field))
            .collect::<Result<Vec<_>, _>>()?;
        let possible_types = possible_type_names(definition, &self.implementations)
            .into_iter()
            .map(|member| PossibleType {
                name: member,
                target_name: to_upper_camel(member),
                key: fragment_key(member),
            })
            .collect();
        trace!(composite = name, fields = fields.len(), "composite resolved");
        Ok(Some(ResolvedComposite {
            name,
            kind,
            description: description.as_deref(),
            target_name: to_upper_camel(name),
            fields,
            possible_types,
        }))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema_sdl::from_sdl_string;

    fn plan_names(sdl: &str) -> Vec<String> {
        let schema = from_sdl_string(sdl).unwrap();
        let plan = resolve(&schema, &ScalarOverrides::new()).unwrap();
        plan.type_names().into_iter().map(str::to_string).collect()
    }

    fn resolve_error(sdl: &str) -> CompileError {
        let schema = from_sdl_string(sdl).unwrap();
        resolve(&schema, &ScalarOverrides::new()).unwrap_err()
    }

    #[test]
    fn flatten_nested_lists() {
        let type_ref = TypeRef::list(TypeRef::non_null(TypeRef::list(TypeRef::named("Int"))));
        let signature = TypeSignature::flatten(&type_ref);
        assert_eq!(signature.base_name, "Int");
        assert!(signature.nullable);
        assert_eq!(signature.list_depth, 2);
        assert_eq!(signature.item_nullable, vec![false, true]);
    }

    #[test]
    fn flatten_non_null_named() {
        let signature = TypeSignature::flatten(&TypeRef::non_null(TypeRef::named("ID")));
        assert!(!signature.nullable);
        assert_eq!(signature.list_depth, 0);
        assert!(signature.item_nullable.is_empty());
    }

    #[test]
    fn input_dependencies_come_first() {
        let names = plan_names(
            "type Query { a(input: A): Int }
             input A { b: B! }
             input B { value: Int }",
        );
        assert_eq!(names, vec!["B", "A", "Query"]);
    }

    #[test]
    fn plan_groups_kinds_in_order() {
        let names = plan_names(
            "type Query { hero(episode: Episode, filter: Filter): Character }
             interface Character { id: ID! }
             type Human implements Character { id: ID! }
             input Filter { episode: Episode }
             enum Episode { NEWHOPE EMPIRE }",
        );
        assert_eq!(names, vec!["Episode", "Filter", "Character", "Human", "Query"]);
    }

    #[test]
    fn required_self_reference_is_a_cycle() {
        let error = resolve_error(
            "type Query { a(input: Node): Int }
             input Node { next: Node! }",
        );
        assert_eq!(error, CompileError::CyclicInputType { cycle: vec!["Node".to_string(), "Node".to_string()] });
    }

    #[test]
    fn nullable_or_list_self_reference_is_allowed() {
        let names = plan_names(
            "type Query { a(input: Node): Int }
             input Node { next: Node, children: [Node!]! }",
        );
        assert_eq!(names, vec!["Node", "Query"]);
    }

    #[test]
    fn indirect_required_cycle_reports_path() {
        let error = resolve_error(
            "type Query { a(input: A): Int }
             input A { b: B! }
             input B { a: A! }",
        );
        assert_eq!(
            error,
            CompileError::CyclicInputType { cycle: vec!["A".to_string(), "B".to_string(), "A".to_string()] }
        );
    }

    #[test]
    fn separator_only_field_name_is_empty() {
        let error = resolve_error("type Query { __: Int }");
        assert_eq!(
            error,
            CompileError::EmptyIdentifier {
                scope: "fields of `Query`".to_string(),
                identifier: "__".to_string(),
            }
        );
    }

    #[test]
    fn type_named_like_runtime_import_is_reported() {
        let error = resolve_error(
            "type Query { last: Operation }
             enum Operation { ADD REMOVE }",
        );
        assert_eq!(
            error,
            CompileError::NamingCollision {
                scope: "module declarations".to_string(),
                first: "runtime `Operation`".to_string(),
                second: "Operation".to_string(),
                normalized: "Operation".to_string(),
            }
        );
    }

    #[test]
    fn input_named_scalars_is_reported() {
        let error = resolve_error(
            "type Query { a(filter: Scalars): Int }
             input Scalars { any: Boolean }",
        );
        assert!(matches!(
            error,
            CompileError::NamingCollision { first, second, .. }
                if first == "generated `Scalars`" && second == "Scalars"
        ));
    }

    #[test]
    fn codec_function_names_are_checked() {
        let error = resolve_error(
            "type Query { a(list: List): Int }
             input List { size: Int }",
        );
        assert!(matches!(
            error,
            CompileError::NamingCollision { first, normalized, .. }
                if first == "runtime `encodeList`" && normalized == "encodeList"
        ));
    }

    #[test]
    fn selection_class_name_is_checked() {
        let error = resolve_error(
            "type Query { user: User kind: UserSelection }
             type User { id: ID }
             enum UserSelection { ADMIN GUEST }",
        );
        assert_eq!(
            error,
            CompileError::NamingCollision {
                scope: "module declarations".to_string(),
                first: "User".to_string(),
                second: "UserSelection".to_string(),
                normalized: "UserSelection".to_string(),
            }
        );
    }

    #[test]
    fn colliding_field_names_are_reported() {
        let error = resolve_error("type Query { infoURL: String info_url: String }");
        assert_eq!(
            error,
            CompileError::NamingCollision {
                scope: "fields of `Query`".to_string(),
                first: "infoURL".to_string(),
                second: "info_url".to_string(),
                normalized: "infoUrl".to_string(),
            }
        );
    }

    #[test]
    fn colliding_enum_values_are_reported() {
        let error = resolve_error(
            "type Query { e: Kind }
             enum Kind { NEW_HOPE newHope }",
        );
        assert!(matches!(error, CompileError::NamingCollision { normalized, .. } if normalized == "NewHope"));
    }

    #[test]
    fn colliding_type_names_are_reported() {
        let error = resolve_error(
            "type Query { a: user_profile b: UserProfile }
             type user_profile { id: ID }
             type UserProfile { id: ID }",
        );
        assert!(matches!(error, CompileError::NamingCollision { scope, .. } if scope == "type names"));
    }

    #[test]
    fn unknown_scalar_is_reported_up_front() {
        let error = resolve_error(
            "scalar DateTime
             type Query { now: DateTime }",
        );
        assert_eq!(error, CompileError::UnknownScalar(crate::error::UnknownScalarError("DateTime".to_string())));
    }

    #[test]
    fn unreferenced_custom_scalar_needs_no_mapping() {
        let names = plan_names(
            "scalar Unused
             type Query { a: Int }",
        );
        assert_eq!(names, vec!["Query"]);
    }

    #[test]
    fn interface_possible_types_follow_declaration_order() {
        let schema = from_sdl_string(
            "type Query { node: Node }
             interface Node { id: ID! }
             type B implements Node { id: ID! }
             type A implements Node { id: ID! }",
        )
        .unwrap();
        let plan = resolve(&schema, &ScalarOverrides::new()).unwrap();
        let node = plan
            .items
            .iter()
            .find_map(|item| match item {
                PlanItem::Composite(composite) if composite.name == "Node" => Some(composite),
                _ => None,
            })
            .unwrap();
        let keys: Vec<&str> = node.possible_types.iter().map(|possible| possible.key.as_str()).collect();
        assert_eq!(keys, vec!["onB", "onA"]);
    }
}
