//! Property-based test generators using proptest.
//!
//! Provides strategies for fixture entities, instants in arbitrary
//! offsets, and random criteria against the [`crate::Playlist`] schema.

use crate::fixtures::{Playlist, User};
use proptest::prelude::*;
use std::collections::BTreeMap;
use time::{OffsetDateTime, UtcOffset};
use widerepo_codec::{Arity, ComparisonOperator, Value};
use widerepo_core::{CoreResult, Criteria, Direction, Sort};

/// Every wire operator.
pub const OPERATORS: [ComparisonOperator; 13] = [
    ComparisonOperator::Eq,
    ComparisonOperator::Ne,
    ComparisonOperator::Le,
    ComparisonOperator::Lt,
    ComparisonOperator::Ge,
    ComparisonOperator::Gt,
    ComparisonOperator::BeginsWith,
    ComparisonOperator::Between,
    ComparisonOperator::In,
    ComparisonOperator::Null,
    ComparisonOperator::NotNull,
    ComparisonOperator::Contains,
    ComparisonOperator::NotContains,
];

/// Properties of [`Playlist`] that criteria strategies draw from.
pub const PLAYLIST_PROPERTIES: [&str; 6] = ["user", "name", "created", "plays", "public", "tags"];

/// Strategy for UTC offsets between -12:00 and +14:00, in quarter hours.
pub fn utc_offset_strategy() -> impl Strategy<Value = UtcOffset> {
    (-48i32..=56).prop_map(|quarters| {
        UtcOffset::from_whole_seconds(quarters * 900).expect("Offset within range")
    })
}

/// Strategy for millisecond-precision instants between 1970 and 2100, in
/// UTC.
pub fn instant_strategy() -> impl Strategy<Value = OffsetDateTime> {
    (0i64..4_102_444_800_000).prop_map(|millis| {
        OffsetDateTime::from_unix_timestamp_nanos(i128::from(millis) * 1_000_000)
            .expect("Instant within range")
    })
}

/// Strategy for the same kind of instants, expressed in a random offset.
pub fn zoned_instant_strategy() -> impl Strategy<Value = OffsetDateTime> {
    (instant_strategy(), utc_offset_strategy()).prop_map(|(instant, offset)| instant.to_offset(offset))
}

/// Strategy for user identifiers.
pub fn user_id_strategy() -> impl Strategy<Value = String> {
    prop::string::string_regex("u[0-9]{1,4}").expect("Invalid regex")
}

/// Strategy for users.
pub fn user_strategy() -> impl Strategy<Value = User> {
    (
        user_id_strategy(),
        prop::string::string_regex("[A-Z][a-z]{1,8}").expect("Invalid regex"),
        0i64..120,
    )
        .prop_map(|(id, name, age)| User::new(id, name, age))
}

/// Strategy for playlists owned by one of three users.
pub fn playlist_strategy() -> impl Strategy<Value = Playlist> {
    (
        prop::sample::select(vec!["alice", "bob", "carol"]),
        prop::string::string_regex("[a-z]{1,6}").expect("Invalid regex"),
        0i64..1000,
        instant_strategy(),
        any::<bool>(),
        prop::collection::btree_set(prop::sample::select(vec!["rock", "jazz", "indie"]), 0..3),
    )
        .prop_map(|(user, name, plays, created, public, tags)| {
            let mut playlist = Playlist::new(user, name).plays(plays).created(created).tags(tags);
            playlist.public = public;
            playlist
        })
}

/// Strategy for playlists with distinct primary keys.
pub fn playlists_strategy(max: usize) -> impl Strategy<Value = Vec<Playlist>> {
    prop::collection::vec(playlist_strategy(), 0..max).prop_map(|playlists| {
        let unique: BTreeMap<(String, String), Playlist> = playlists
            .into_iter()
            .map(|p| ((p.user.clone(), p.name.clone()), p))
            .collect();
        unique.into_values().collect()
    })
}

/// One step of building criteria.
#[derive(Debug, Clone, PartialEq)]
pub enum CriteriaStep {
    /// `with_equals(property, value)`.
    Equals {
        /// Property compared.
        property: &'static str,
        /// Compared value.
        value: Value,
    },
    /// `with_condition(property, operator, values)`.
    Condition {
        /// Property compared.
        property: &'static str,
        /// Operator.
        operator: ComparisonOperator,
        /// Operand values.
        values: Vec<Value>,
    },
    /// `with_sort(sort)`.
    Sort(Sort),
}

impl CriteriaStep {
    /// Applies the step.
    pub fn apply(&self, criteria: &mut Criteria<'_>) -> CoreResult<()> {
        match self {
            CriteriaStep::Equals { property, value } => {
                criteria.with_equals(property, value.clone())?;
            }
            CriteriaStep::Condition {
                property,
                operator,
                values,
            } => {
                criteria.with_condition(property, *operator, values.clone())?;
            }
            CriteriaStep::Sort(sort) => {
                criteria.with_sort(sort.clone());
            }
        }
        Ok(())
    }
}

/// Applies every step, stopping at the first error.
pub fn apply_steps(criteria: &mut Criteria<'_>, steps: &[CriteriaStep]) -> CoreResult<()> {
    steps.iter().try_for_each(|step| step.apply(criteria))
}

/// Strategy for a value of a [`Playlist`] property.
pub fn playlist_value_strategy(property: &'static str) -> BoxedStrategy<Value> {
    match property {
        "user" => prop::sample::select(vec!["alice", "bob", "carol"])
            .prop_map(Value::from)
            .boxed(),
        "name" => prop::sample::select(vec!["mix1", "mix2", "jazz", "study"])
            .prop_map(Value::from)
            .boxed(),
        "created" => instant_strategy().prop_map(Value::Date).boxed(),
        "public" => any::<bool>().prop_map(Value::Bool).boxed(),
        "tags" => prop::sample::select(vec!["rock", "jazz"])
            .prop_map(Value::from)
            .boxed(),
        _ => (0i64..100).prop_map(Value::Integer).boxed(),
    }
}

fn operand_strategy(
    property: &'static str,
    operator: ComparisonOperator,
) -> BoxedStrategy<Vec<Value>> {
    let value = playlist_value_strategy(property);
    match operator.arity() {
        Arity::None => Just(Vec::new()).boxed(),
        Arity::One => value.prop_map(|v| vec![v]).boxed(),
        Arity::Two => prop::collection::vec(value, 2).boxed(),
        Arity::Many => prop::collection::vec(value, 1..4)
            .prop_map(|items| vec![Value::List(items)])
            .boxed(),
    }
}

/// Strategy for one criteria step against the [`Playlist`] schema.
pub fn criteria_step_strategy() -> impl Strategy<Value = CriteriaStep> {
    let equals = prop::sample::select(PLAYLIST_PROPERTIES.to_vec()).prop_flat_map(|property| {
        playlist_value_strategy(property).prop_map(move |value| CriteriaStep::Equals { property, value })
    });
    let condition = (
        prop::sample::select(PLAYLIST_PROPERTIES.to_vec()),
        prop::sample::select(OPERATORS.to_vec()),
    )
        .prop_flat_map(|(property, operator)| {
            operand_strategy(property, operator).prop_map(move |values| CriteriaStep::Condition {
                property,
                operator,
                values,
            })
        });
    let sort = (
        prop::sample::select(vec!["name", "created", "plays", "user"]),
        any::<bool>(),
    )
        .prop_map(|(property, ascending)| {
            CriteriaStep::Sort(Sort::new(
                property,
                if ascending {
                    Direction::Ascending
                } else {
                    Direction::Descending
                },
            ))
        });
    prop_oneof![3 => equals, 3 => condition, 1 => sort]
}

/// Strategy for a short sequence of criteria steps.
pub fn criteria_steps_strategy() -> impl Strategy<Value = Vec<CriteriaStep>> {
    prop::collection::vec(criteria_step_strategy(), 0..6)
}
