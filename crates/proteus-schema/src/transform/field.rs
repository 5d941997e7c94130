use crate::{
    model::{FieldKind, FieldType, TypeName},
    types::{Primitive, TypeKind, TypeRef},
};

///
/// Shape
///
/// Field kind derived from a resolved type. `nullable_primitive` is set when
/// an optional primitive, in any value position, was flattened into a plain
/// primitive.
///

#[derive(Debug, Eq, PartialEq)]
pub(crate) struct Shape {
    pub kind: FieldKind,
    pub nullable_primitive: Option<Primitive>,
}

/// Map a fully resolved type onto a field kind.
///
/// Returns the rendered type when the shape has no field representation
/// (nested repetition, collections inside maps, unresolved nodes).
pub(crate) fn classify(ty: &TypeRef) -> Result<Shape, String> {
    let (kind, value) = match ty {
        TypeRef::Primitive(_) | TypeRef::Named(_) => (
            FieldKind::Singular(element(ty).ok_or_else(|| ty.to_string())?),
            ty,
        ),
        TypeRef::Sequence(elem) => (
            FieldKind::Repeated(element(elem).ok_or_else(|| ty.to_string())?),
            elem.as_ref(),
        ),
        TypeRef::Associative { key, value } => (
            FieldKind::Map {
                key: element(key).ok_or_else(|| ty.to_string())?,
                value: element(value).ok_or_else(|| ty.to_string())?,
            },
            value.as_ref(),
        ),
        TypeRef::Nullable(inner) => {
            let shape = classify(inner)?;

            return Ok(Shape {
                kind: shape.kind,
                nullable_primitive: nullable_primitive(ty).or(shape.nullable_primitive),
            });
        }
        TypeRef::Unresolved(_) => return Err(ty.to_string()),
    };

    Ok(Shape {
        kind,
        nullable_primitive: nullable_primitive(value),
    })
}

// Optional primitive: at least one nullable layer over a primitive.
fn nullable_primitive(ty: &TypeRef) -> Option<Primitive> {
    match (ty, ty.strip_nullable()) {
        (TypeRef::Nullable(_), TypeRef::Primitive(primitive)) => Some(*primitive),
        _ => None,
    }
}

// Single value position: a primitive or a named type, nullable or not.
fn element(ty: &TypeRef) -> Option<FieldType> {
    match ty.strip_nullable() {
        TypeRef::Primitive(primitive) => Some(FieldType::Primitive(*primitive)),
        TypeRef::Named(named) => Some(match named.kind {
            TypeKind::Record => FieldType::Message(TypeName::from(named)),
            TypeKind::Enum => FieldType::Enum(TypeName::from(named)),
        }),
        _ => None,
    }
}
