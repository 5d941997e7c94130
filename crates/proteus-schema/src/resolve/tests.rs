use super::*;
use crate::{
    decl::EnumGroup,
    registry::TypeSetBuilder,
};

const PEOPLE: &str = "example.com/people";
const SHOP: &str = "example.com/shop";

fn registry() -> TypeRegistry {
    let mut builder = TypeSetBuilder::new();
    builder.add(PEOPLE, "Person", TypeKind::Record);
    builder.add(PEOPLE, "Status", TypeKind::Enum);
    builder.add(SHOP, "Order", TypeKind::Record);

    builder.freeze()
}

fn basic(name: &str) -> TypeDescriptor {
    TypeDescriptor::basic(name)
}

fn person() -> TypeDescriptor {
    TypeDescriptor::named(PEOPLE, "Person")
}

fn status() -> TypeDescriptor {
    TypeDescriptor::named(PEOPLE, "Status")
}

fn reason(ty: &TypeRef) -> Option<UnresolvedReason> {
    ty.first_unresolved().map(|u| u.reason)
}

#[test]
fn basic_scalars_resolve_to_primitives() {
    let registry = registry();
    let r = Resolver::new(&registry);

    assert_eq!(r.resolve(&basic("string")), TypeRef::Primitive(Primitive::String));
    assert_eq!(r.resolve(&basic("int32")), TypeRef::Primitive(Primitive::Int32));
    assert_eq!(r.resolve(&basic("bool")), TypeRef::Primitive(Primitive::Bool));
}

#[test]
fn unknown_basic_is_unresolved() {
    let registry = registry();
    let ty = Resolver::new(&registry).resolve(&basic("complex128"));

    assert_eq!(reason(&ty), Some(UnresolvedReason::UnknownBuiltin));
}

#[test]
fn byte_sequences_become_bytes() {
    let registry = registry();
    let r = Resolver::new(&registry);

    assert_eq!(
        r.resolve(&TypeDescriptor::sequence(basic("byte"))),
        TypeRef::Primitive(Primitive::Bytes)
    );
    assert_eq!(
        r.resolve(&TypeDescriptor::sequence(basic("uint8"))),
        TypeRef::Primitive(Primitive::Bytes)
    );
    assert_eq!(
        r.resolve(&TypeDescriptor::sequence(basic("int8"))),
        TypeRef::sequence(TypeRef::Primitive(Primitive::Int32))
    );
}

#[test]
fn named_types_resolve_across_packages() {
    let registry = registry();
    let r = Resolver::new(&registry);

    assert_eq!(
        r.resolve(&person()),
        TypeRef::Named(NamedRef::new(PEOPLE, "Person", TypeKind::Record))
    );
    assert_eq!(
        r.resolve(&status()),
        TypeRef::Named(NamedRef::new(PEOPLE, "Status", TypeKind::Enum))
    );
}

#[test]
fn same_name_in_wrong_package_is_unresolved() {
    let registry = registry();
    let ty = Resolver::new(&registry).resolve(&TypeDescriptor::named(SHOP, "Person"));

    assert_eq!(reason(&ty), Some(UnresolvedReason::UnknownType));
}

#[test]
fn external_mappings_apply_when_not_registered() {
    let registry = registry();
    let r = Resolver::new(&registry);

    assert_eq!(
        r.resolve(&TypeDescriptor::named("time", "Time")),
        TypeRef::Primitive(Primitive::Timestamp)
    );
    assert_eq!(
        r.resolve(&TypeDescriptor::named("time", "Duration")),
        TypeRef::Primitive(Primitive::Int64)
    );
}

#[test]
fn registry_takes_precedence_over_external_table() {
    let mut builder = TypeSetBuilder::new();
    builder.add("time", "Time", TypeKind::Record);
    let registry = builder.freeze();

    assert_eq!(
        Resolver::new(&registry).resolve(&TypeDescriptor::named("time", "Time")),
        TypeRef::Named(NamedRef::new("time", "Time", TypeKind::Record))
    );
}

#[test]
fn custom_builtins_replace_the_standard_tables() {
    let registry = registry();
    let mut builtins = Builtins::empty();
    builtins.insert_scalar("text", Primitive::String);
    builtins.insert_external("chrono", "DateTime", Primitive::Timestamp);
    let r = Resolver::with_builtins(&registry, &builtins);

    assert_eq!(r.resolve(&basic("text")), TypeRef::Primitive(Primitive::String));
    assert_eq!(
        r.resolve(&TypeDescriptor::named("chrono", "DateTime")),
        TypeRef::Primitive(Primitive::Timestamp)
    );
    assert!(!r.resolve(&basic("string")).is_resolved());
}

#[test]
fn pointers_become_nullable() {
    let registry = registry();
    let ty = Resolver::new(&registry).resolve(&TypeDescriptor::pointer(person()));

    assert_eq!(
        ty,
        TypeRef::nullable(TypeRef::Named(NamedRef::new(
            PEOPLE,
            "Person",
            TypeKind::Record
        )))
    );
}

#[test]
fn map_with_primitive_or_enum_key_resolves() {
    let registry = registry();
    let r = Resolver::new(&registry);

    let by_name = r.resolve(&TypeDescriptor::map(basic("string"), person()));
    assert!(matches!(
        &by_name,
        TypeRef::Associative { key, value }
            if **key == TypeRef::Primitive(Primitive::String)
                && value.as_record().is_some()
    ));

    let by_status = r.resolve(&TypeDescriptor::map(status(), basic("int64")));
    assert!(by_status.is_resolved());
}

#[test]
fn map_with_message_key_is_rejected() {
    let registry = registry();
    let descriptor = TypeDescriptor::map(person(), basic("string"));

    let ty = Resolver::new(&registry).resolve(&descriptor);

    let unresolved = ty.first_unresolved().unwrap();
    assert_eq!(unresolved.reason, UnresolvedReason::InvalidMapKey);
    assert_eq!(unresolved.descriptor, descriptor);
}

#[test]
fn map_with_pointer_key_is_rejected() {
    let registry = registry();
    let ty = Resolver::new(&registry).resolve(&TypeDescriptor::map(
        TypeDescriptor::pointer(basic("string")),
        basic("string"),
    ));

    assert_eq!(reason(&ty), Some(UnresolvedReason::InvalidMapKey));
}

#[test]
fn map_with_timestamp_key_is_rejected() {
    let registry = registry();
    let descriptor = TypeDescriptor::map(TypeDescriptor::named("time", "Time"), basic("string"));

    let ty = Resolver::new(&registry).resolve(&descriptor);

    let unresolved = ty.first_unresolved().unwrap();
    assert_eq!(unresolved.reason, UnresolvedReason::InvalidMapKey);
    assert_eq!(unresolved.descriptor, descriptor);
}

#[test]
fn map_with_duration_key_resolves() {
    let registry = registry();
    let ty = Resolver::new(&registry).resolve(&TypeDescriptor::map(
        TypeDescriptor::named("time", "Duration"),
        basic("string"),
    ));

    assert!(ty.is_resolved());
}

#[test]
fn map_with_unknown_key_keeps_key_reason() {
    let registry = registry();
    let ty = Resolver::new(&registry).resolve(&TypeDescriptor::map(
        TypeDescriptor::named(SHOP, "Missing"),
        basic("string"),
    ));

    assert_eq!(reason(&ty), Some(UnresolvedReason::UnknownType));
}

#[test]
fn cyclic_references_resolve_without_expansion() {
    let mut builder = TypeSetBuilder::new();
    builder.add("example.com/tree", "Node", TypeKind::Record);
    let registry = builder.freeze();

    let ty = Resolver::new(&registry).resolve(&TypeDescriptor::sequence(
        TypeDescriptor::pointer(TypeDescriptor::named("example.com/tree", "Node")),
    ));

    assert!(ty.is_resolved());
}

#[test]
fn resolve_package_reports_each_unresolved_field_once() {
    let registry = registry();
    let package = Package::new(SHOP, "shop")
        .with_record(Record::new(
            "Order",
            [
                Field::new("id", basic("int64")),
                Field::new("ghost", TypeDescriptor::named(SHOP, "Ghost")),
                Field::new(
                    "by_person",
                    TypeDescriptor::map(person(), basic("string")),
                ),
                Field::tagged("buyer", person(), 9),
            ],
        ))
        .with_enum(EnumGroup::new("Kind", [("NONE", 0)]))
        .with_function(Function::new("Place", [person()], [basic("bool")]));

    let resolved = Resolver::new(&registry).resolve_package(&package);

    let members: Vec<_> = resolved
        .diagnostics
        .iter()
        .map(|d| d.member.as_deref().unwrap())
        .collect();
    assert_eq!(members, ["ghost", "by_person"]);

    let order = resolved.package.record("Order").unwrap();
    assert_eq!(order.fields.len(), 4);
    assert_eq!(order.fields[3].tag, Some(9));
    assert!(order.fields[3].ty.as_record().is_some());

    assert_eq!(resolved.package.enums, package.enums);
    assert_eq!(
        resolved.package.functions[0].results,
        [TypeRef::Primitive(Primitive::Bool)]
    );
}

#[test]
fn resolution_is_deterministic() {
    let registry = registry();
    let r = Resolver::new(&registry);
    let descriptor = TypeDescriptor::map(
        basic("string"),
        TypeDescriptor::sequence(TypeDescriptor::pointer(person())),
    );

    assert_eq!(r.resolve(&descriptor), r.resolve(&descriptor));
}
