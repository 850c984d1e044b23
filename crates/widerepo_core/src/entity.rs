//! Entity mapping trait.

use crate::error::{CoreError, CoreResult};
use widerepo_codec::{AttributeValue, Item};

/// Trait for types that can be stored as items by a [`crate::Repository`].
///
/// Implementors must provide:
/// - `to_item()`: Converts the entity to a stored item, keyed by attribute
///   name (after name overrides)
/// - `from_item()`: Rebuilds the entity from a stored item
///
/// The item must carry the key attributes declared by the entity's
/// [`crate::EntityMetadata`]; deletes derive the primary key from it.
///
/// # Example
///
/// ```rust
/// use widerepo_codec::{AttributeValue, Item};
/// use widerepo_core::{entity, CoreResult, Entity};
///
/// struct User {
///     id: String,
///     age: i64,
/// }
///
/// impl Entity for User {
///     fn to_item(&self) -> CoreResult<Item> {
///         let mut item = Item::new();
///         item.insert("id".into(), AttributeValue::from(self.id.as_str()));
///         item.insert("age".into(), AttributeValue::number(self.age));
///         Ok(item)
///     }
///
///     fn from_item(item: &Item) -> CoreResult<Self> {
///         Ok(User {
///             id: entity::required(item, "id")?.to_text()?,
///             age: entity::required(item, "age")?.to_i64()?,
///         })
///     }
/// }
/// ```
pub trait Entity: Sized {
    /// Converts the entity to a stored item.
    fn to_item(&self) -> CoreResult<Item>;

    /// Rebuilds an entity from a stored item.
    fn from_item(item: &Item) -> CoreResult<Self>;
}

/// Raw items are entities of themselves. Used by tooling that works
/// without a typed model.
impl Entity for Item {
    fn to_item(&self) -> CoreResult<Item> {
        Ok(self.clone())
    }

    fn from_item(item: &Item) -> CoreResult<Self> {
        Ok(item.clone())
    }
}

/// Returns the attribute `name`, or an [`CoreError::InvalidMapping`] if the
/// item lacks it.
pub fn required<'a>(item: &'a Item, name: &str) -> CoreResult<&'a AttributeValue> {
    item.get(name)
        .ok_or_else(|| CoreError::invalid_mapping(format!("missing attribute {name}")))
}

/// Returns the attribute `name` if present.
pub fn optional<'a>(item: &'a Item, name: &str) -> Option<&'a AttributeValue> {
    item.get(name)
}
