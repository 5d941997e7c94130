use crate::diag::{DiagnosticKind, TagProblem};
use std::{collections::BTreeMap, ops::RangeInclusive};

/// Largest field number the target schema accepts.
pub const MAX_FIELD_NUMBER: u32 = 536_870_911;

/// Numbers reserved by the target schema implementation.
pub const RESERVED_NUMBERS: RangeInclusive<u32> = 19_000..=19_999;

///
/// NumberingError
///
/// Fatal for the message being numbered; `field` is the offending field.
///

#[derive(Debug, Eq, PartialEq)]
pub(crate) struct NumberingError {
    pub field: String,
    pub kind: DiagnosticKind,
}

/// Validate one explicit tag.
pub(crate) fn check_tag(tag: i64) -> Result<u32, TagProblem> {
    if tag < 1 {
        return Err(TagProblem::NotPositive);
    }

    let number = u32::try_from(tag).map_err(|_| TagProblem::TooLarge)?;
    if number > MAX_FIELD_NUMBER {
        return Err(TagProblem::TooLarge);
    }
    if RESERVED_NUMBERS.contains(&number) {
        return Err(TagProblem::Reserved);
    }

    Ok(number)
}

/// Assign a number to every declared field, in declaration order.
///
/// Explicit tags are used as given. Remaining fields count up from 1,
/// skipping numbers claimed by explicit tags and the reserved range.
pub(crate) fn assign<'a, I>(fields: I) -> Result<Vec<u32>, NumberingError>
where
    I: IntoIterator<Item = (&'a str, Option<i64>)>,
{
    let fields: Vec<_> = fields.into_iter().collect();

    // explicit tags first, so sequential numbers can route around them
    let mut claimed: BTreeMap<u32, &str> = BTreeMap::new();
    for &(name, tag) in &fields {
        let Some(tag) = tag else {
            continue;
        };

        let number = check_tag(tag).map_err(|problem| NumberingError {
            field: name.to_string(),
            kind: DiagnosticKind::InvalidTag { tag, problem },
        })?;

        if let Some(first) = claimed.insert(number, name) {
            return Err(NumberingError {
                field: name.to_string(),
                kind: DiagnosticKind::TagCollision {
                    tag: number,
                    first: first.to_string(),
                    second: name.to_string(),
                },
            });
        }
    }

    let mut next = 1;
    let numbers = fields
        .iter()
        .map(|&(_, tag)| match tag {
            Some(tag) => u32::try_from(tag).unwrap_or_default(),
            None => {
                while claimed.contains_key(&next) || RESERVED_NUMBERS.contains(&next) {
                    next += 1;
                }
                let number = next;
                next += 1;

                number
            }
        })
        .collect();

    Ok(numbers)
}
