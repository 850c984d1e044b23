//! Condition evaluation against stored items.

use std::cmp::Ordering;
use widerepo_codec::{AttributeValue, ComparisonOperator, Condition, Item};

/// Orders two scalar attribute values.
///
/// Numbers compare numerically and strings bytewise. Values of different
/// types, and string sets, have no order.
pub fn compare_attributes(a: &AttributeValue, b: &AttributeValue) -> Option<Ordering> {
    match (a, b) {
        (AttributeValue::S(a), AttributeValue::S(b)) => Some(a.as_bytes().cmp(b.as_bytes())),
        (AttributeValue::N(a), AttributeValue::N(b)) => {
            let a: f64 = a.parse().ok()?;
            let b: f64 = b.parse().ok()?;
            a.partial_cmp(&b)
        }
        _ => None,
    }
}

fn attributes_equal(a: &AttributeValue, b: &AttributeValue) -> bool {
    match (a, b) {
        (AttributeValue::Ss(a), AttributeValue::Ss(b)) => {
            let mut a = a.clone();
            let mut b = b.clone();
            a.sort();
            b.sort();
            a == b
        }
        _ => compare_attributes(a, b) == Some(Ordering::Equal),
    }
}

fn contains(haystack: &AttributeValue, needle: &AttributeValue) -> bool {
    match (haystack, needle) {
        (AttributeValue::S(h), AttributeValue::S(n)) => h.contains(n.as_str()),
        (AttributeValue::Ss(items), AttributeValue::S(n)) => items.iter().any(|i| i == n),
        (AttributeValue::Ss(items), AttributeValue::Ss(needles)) => {
            needles.iter().all(|n| items.contains(n))
        }
        _ => false,
    }
}

/// Whether `item` satisfies `condition`.
///
/// A missing attribute satisfies only `NULL` and `NE`.
pub fn matches(item: &Item, condition: &Condition) -> bool {
    let attribute = item.get(&condition.attribute_name);
    let values = &condition.values;

    match condition.operator {
        ComparisonOperator::Null => attribute.is_none(),
        ComparisonOperator::NotNull => attribute.is_some(),
        ComparisonOperator::Ne => match (attribute, values.first()) {
            (Some(a), Some(v)) => !attributes_equal(a, v),
            (None, _) => true,
            (Some(_), None) => false,
        },
        op => {
            let Some(a) = attribute else {
                return false;
            };
            match (op, values.as_slice()) {
                (ComparisonOperator::Eq, [v]) => attributes_equal(a, v),
                (ComparisonOperator::Lt, [v]) => compare_attributes(a, v) == Some(Ordering::Less),
                (ComparisonOperator::Le, [v]) => matches!(
                    compare_attributes(a, v),
                    Some(Ordering::Less | Ordering::Equal)
                ),
                (ComparisonOperator::Gt, [v]) => {
                    compare_attributes(a, v) == Some(Ordering::Greater)
                }
                (ComparisonOperator::Ge, [v]) => matches!(
                    compare_attributes(a, v),
                    Some(Ordering::Greater | Ordering::Equal)
                ),
                (ComparisonOperator::BeginsWith, [v]) => match (a, v) {
                    (AttributeValue::S(a), AttributeValue::S(prefix)) => a.starts_with(prefix.as_str()),
                    _ => false,
                },
                (ComparisonOperator::Between, [low, high]) => {
                    matches!(
                        compare_attributes(a, low),
                        Some(Ordering::Greater | Ordering::Equal)
                    ) && matches!(
                        compare_attributes(a, high),
                        Some(Ordering::Less | Ordering::Equal)
                    )
                }
                (ComparisonOperator::In, candidates) => {
                    candidates.iter().any(|v| attributes_equal(a, v))
                }
                (ComparisonOperator::Contains, [v]) => contains(a, v),
                (ComparisonOperator::NotContains, [v]) => !contains(a, v),
                _ => false,
            }
        }
    }
}

/// Whether `item` satisfies every condition.
pub fn matches_all(item: &Item, conditions: &[Condition]) -> bool {
    conditions.iter().all(|c| matches(item, c))
}
