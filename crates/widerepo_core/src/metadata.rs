//! Entity key metadata.
//!
//! The planner never inspects entity types directly. Everything it needs to
//! know about keys comes through [`EntityMetadata`]: which property is the
//! partition key, which is the sort key, which properties are sort keys of
//! secondary indexes, how properties map to stored attribute names, and
//! which properties carry custom marshallers.
//!
//! [`StaticEntityMetadata`] is a builder-configured implementation; code
//! generation or runtime inspection can provide others.

use crate::error::{CoreError, CoreResult};
use std::collections::{BTreeMap, BTreeSet, HashMap};
use std::sync::Arc;
use widerepo_codec::{Marshaller, Value};
use widerepo_store::TableDefinition;

/// Key facts about one entity type.
pub trait EntityMetadata: Send + Sync {
    /// Logical table name.
    fn table_name(&self) -> &str;

    /// Property holding the partition key.
    fn partition_key_property(&self) -> &str;

    /// Property holding the sort key, for range-aware entities.
    fn sort_key_property(&self) -> Option<&str>;

    /// Properties that are sort keys of secondary indexes.
    fn secondary_index_sort_key_properties(&self) -> BTreeSet<&str>;

    /// Index names whose sort key is `property`, in registration order.
    fn index_names_for(&self, property: &str) -> Vec<&str>;

    /// Stored attribute name for `property`, when it differs from the
    /// property name.
    fn attribute_name_override(&self, property: &str) -> Option<&str>;

    /// Marshaller registered for `property`.
    fn marshaller_for(&self, property: &str) -> Option<&dyn Marshaller>;

    /// Whether `property` holds the composite (partition + sort) identifier.
    fn is_composite_identifier_property(&self, property: &str) -> bool;

    /// Splits a composite identifier into its partition and sort values.
    ///
    /// Either component may be [`Value::Null`].
    fn decompose_composite_id(&self, value: &Value) -> CoreResult<(Value, Value)>;

    /// Stored attribute name for `property`.
    fn attribute_name(&self, property: &str) -> String {
        self.attribute_name_override(property)
            .unwrap_or(property)
            .to_string()
    }

    /// Whether the entity has a sort key.
    fn has_sort_key(&self) -> bool {
        self.sort_key_property().is_some()
    }

    /// Whether `property` is the partition key.
    fn is_partition_key(&self, property: &str) -> bool {
        self.partition_key_property() == property
    }

    /// Whether `property` is the sort key.
    fn is_sort_key(&self, property: &str) -> bool {
        self.sort_key_property() == Some(property)
    }

    /// Whether `property` is a secondary-index sort key.
    fn is_index_sort_key(&self, property: &str) -> bool {
        self.secondary_index_sort_key_properties().contains(property)
    }
}

/// [`EntityMetadata`] configured explicitly.
///
/// # Example
///
/// ```rust
/// use widerepo_core::{EntityMetadata, StaticEntityMetadata};
///
/// let playlists = StaticEntityMetadata::new("playlists", "user")
///     .with_sort_key("name")
///     .with_index("by_created", "created")
///     .with_attribute_name("user", "user_id");
///
/// assert!(playlists.has_sort_key());
/// assert_eq!(playlists.attribute_name("user"), "user_id");
/// assert!(playlists.is_index_sort_key("created"));
/// ```
#[derive(Debug, Clone)]
pub struct StaticEntityMetadata {
    table_name: String,
    partition_key: String,
    sort_key: Option<String>,
    index_sort_keys: BTreeMap<String, Vec<String>>,
    attribute_names: HashMap<String, String>,
    marshallers: HashMap<String, Arc<dyn Marshaller>>,
    composite_id: Option<String>,
}

impl StaticEntityMetadata {
    /// Creates metadata for a hash-only entity.
    pub fn new(table_name: impl Into<String>, partition_key: impl Into<String>) -> Self {
        Self {
            table_name: table_name.into(),
            partition_key: partition_key.into(),
            sort_key: None,
            index_sort_keys: BTreeMap::new(),
            attribute_names: HashMap::new(),
            marshallers: HashMap::new(),
            composite_id: None,
        }
    }

    /// Declares the sort key property.
    #[must_use]
    pub fn with_sort_key(mut self, property: impl Into<String>) -> Self {
        self.sort_key = Some(property.into());
        self
    }

    /// Declares a secondary index sorted by `sort_property`.
    #[must_use]
    pub fn with_index(mut self, index_name: impl Into<String>, sort_property: impl Into<String>) -> Self {
        self.index_sort_keys
            .entry(sort_property.into())
            .or_default()
            .push(index_name.into());
        self
    }

    /// Stores `property` under a different attribute name.
    #[must_use]
    pub fn with_attribute_name(
        mut self,
        property: impl Into<String>,
        attribute: impl Into<String>,
    ) -> Self {
        self.attribute_names.insert(property.into(), attribute.into());
        self
    }

    /// Registers a marshaller for `property`.
    #[must_use]
    pub fn with_marshaller(
        mut self,
        property: impl Into<String>,
        marshaller: impl Marshaller + 'static,
    ) -> Self {
        self.marshallers.insert(property.into(), Arc::new(marshaller));
        self
    }

    /// Declares `property` as the composite identifier.
    ///
    /// Composite identifier values are maps carrying the partition and sort
    /// key properties as fields.
    #[must_use]
    pub fn with_composite_id(mut self, property: impl Into<String>) -> Self {
        self.composite_id = Some(property.into());
        self
    }
}

impl EntityMetadata for StaticEntityMetadata {
    fn table_name(&self) -> &str {
        &self.table_name
    }

    fn partition_key_property(&self) -> &str {
        &self.partition_key
    }

    fn sort_key_property(&self) -> Option<&str> {
        self.sort_key.as_deref()
    }

    fn secondary_index_sort_key_properties(&self) -> BTreeSet<&str> {
        self.index_sort_keys.keys().map(String::as_str).collect()
    }

    fn index_names_for(&self, property: &str) -> Vec<&str> {
        self.index_sort_keys
            .get(property)
            .map(|names| names.iter().map(String::as_str).collect())
            .unwrap_or_default()
    }

    fn attribute_name_override(&self, property: &str) -> Option<&str> {
        self.attribute_names.get(property).map(String::as_str)
    }

    fn marshaller_for(&self, property: &str) -> Option<&dyn Marshaller> {
        self.marshallers.get(property).map(|m| m.as_ref())
    }

    fn is_composite_identifier_property(&self, property: &str) -> bool {
        self.composite_id.as_deref() == Some(property)
    }

    fn decompose_composite_id(&self, value: &Value) -> CoreResult<(Value, Value)> {
        let sort_key = self.sort_key.as_deref().ok_or_else(|| {
            CoreError::unsupported_operation(format!(
                "{} has no sort key to decompose an identifier into",
                self.table_name
            ))
        })?;
        match value {
            Value::Map(_) => Ok((
                value.get(&self.partition_key).cloned().unwrap_or(Value::Null),
                value.get(sort_key).cloned().unwrap_or(Value::Null),
            )),
            Value::Null => Ok((Value::Null, Value::Null)),
            other => Err(CoreError::invalid_argument(format!(
                "composite identifier must be a map, got {}",
                other.type_name()
            ))),
        }
    }
}

/// Key schema of the table backing an entity, for creating tables in the
/// in-memory store.
pub fn table_definition(metadata: &dyn EntityMetadata, table_name: &str) -> TableDefinition {
    let mut definition =
        TableDefinition::new(table_name, metadata.attribute_name(metadata.partition_key_property()));
    if let Some(sort) = metadata.sort_key_property() {
        definition = definition.with_sort_key(metadata.attribute_name(sort));
    }
    for property in metadata.secondary_index_sort_key_properties() {
        for index in metadata.index_names_for(property) {
            definition = definition.with_index(index, metadata.attribute_name(property));
        }
    }
    definition
}
