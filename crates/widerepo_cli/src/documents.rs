//! JSON input documents: entity schemas, seed items and query descriptions.

use serde::Deserialize;
use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;
use time::format_description::well_known::Rfc3339;
use time::OffsetDateTime;
use widerepo_codec::{EpochMillisMarshaller, IsoDateMarshaller, Item, Value};
use widerepo_core::{
    Arguments, CoreError, PageRequest, Part, PredicateTree, QueryMethod, RepositoryConfig,
    ResultMode, ScanPolicy, Sort, StaticEntityMetadata,
};
use widerepo_store::StoreError;

/// Result type for CLI operations.
pub type CliResult<T> = Result<T, CliError>;

/// Errors raised by CLI commands.
#[derive(Debug, Error)]
pub enum CliError {
    /// A file could not be read.
    #[error("failed to read {path}: {source}")]
    Io {
        /// File being read.
        path: PathBuf,
        /// Underlying error.
        source: std::io::Error,
    },

    /// A file is not valid JSON for its document type.
    #[error("failed to parse {path}: {source}")]
    Json {
        /// File being parsed.
        path: PathBuf,
        /// Underlying error.
        source: serde_json::Error,
    },

    /// A document is well-formed JSON but describes something invalid.
    #[error("invalid document: {message}")]
    InvalidDocument {
        /// Description of the problem.
        message: String,
    },

    /// Planning or execution failed.
    #[error(transparent)]
    Core(#[from] CoreError),

    /// The in-memory store rejected a request.
    #[error(transparent)]
    Store(#[from] StoreError),

    /// Output could not be rendered.
    #[error("failed to render output: {0}")]
    Render(#[from] serde_json::Error),
}

impl CliError {
    fn invalid(message: impl Into<String>) -> Self {
        Self::InvalidDocument {
            message: message.into(),
        }
    }
}

/// Reads and parses a JSON document.
pub fn load<T: for<'de> Deserialize<'de>>(path: &Path) -> CliResult<T> {
    let raw = fs::read_to_string(path).map_err(|source| CliError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    serde_json::from_str(&raw).map_err(|source| CliError::Json {
        path: path.to_path_buf(),
        source,
    })
}

/// Stored form of a date-valued property.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MarshallerKind {
    /// `yyyy-MM-ddTHH:mm:ss.SSSZ` in UTC.
    IsoDate,
    /// Milliseconds since the Unix epoch.
    EpochMillis,
}

/// A local secondary index.
#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct IndexDocument {
    /// Index name.
    pub name: String,
    /// Property the index sorts by.
    pub sort_key: String,
}

/// Repository options carried by a schema.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct RepositoryDocument {
    /// Prefix prepended to the table name.
    pub table_prefix: Option<String>,
    /// Items per store round-trip.
    pub fetch_size: Option<usize>,
    /// Repository-wide scan opt-in.
    pub scan_enabled: bool,
    /// Repository-wide scan count opt-in.
    pub scan_count_enabled: bool,
}

/// Key metadata of one entity.
///
/// ```json
/// {
///   "table": "playlists",
///   "partition_key": "user",
///   "sort_key": "name",
///   "attribute_names": { "user": "user_id" },
///   "indexes": [{ "name": "by_created", "sort_key": "created" }],
///   "marshallers": { "created": "iso_date" },
///   "composite_id": "id"
/// }
/// ```
#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct SchemaDocument {
    /// Logical table name.
    pub table: String,
    /// Partition key property.
    pub partition_key: String,
    /// Sort key property.
    #[serde(default)]
    pub sort_key: Option<String>,
    /// Attribute name overrides by property.
    #[serde(default)]
    pub attribute_names: BTreeMap<String, String>,
    /// Local secondary indexes.
    #[serde(default)]
    pub indexes: Vec<IndexDocument>,
    /// Marshallers by property.
    #[serde(default)]
    pub marshallers: BTreeMap<String, MarshallerKind>,
    /// Composite identifier property.
    #[serde(default)]
    pub composite_id: Option<String>,
    /// Repository options.
    #[serde(default)]
    pub repository: RepositoryDocument,
}

impl SchemaDocument {
    /// Builds the entity metadata.
    pub fn metadata(&self) -> CliResult<StaticEntityMetadata> {
        let mut metadata = StaticEntityMetadata::new(&self.table, &self.partition_key);
        if let Some(sort_key) = &self.sort_key {
            metadata = metadata.with_sort_key(sort_key);
        }
        for (property, attribute) in &self.attribute_names {
            metadata = metadata.with_attribute_name(property, attribute);
        }
        for index in &self.indexes {
            metadata = metadata.with_index(&index.name, &index.sort_key);
        }
        for (property, kind) in &self.marshallers {
            metadata = match kind {
                MarshallerKind::IsoDate => metadata.with_marshaller(property, IsoDateMarshaller),
                MarshallerKind::EpochMillis => {
                    metadata.with_marshaller(property, EpochMillisMarshaller)
                }
            };
        }
        if let Some(property) = &self.composite_id {
            if self.sort_key.is_none() {
                return Err(CliError::invalid("composite_id requires a sort_key"));
            }
            metadata = metadata.with_composite_id(property);
        }
        Ok(metadata)
    }

    /// Builds the repository configuration.
    pub fn config(&self) -> RepositoryConfig {
        let options = &self.repository;
        let mut config = RepositoryConfig::new().scan(
            ScanPolicy::disabled()
                .scan_enabled(options.scan_enabled)
                .scan_count_enabled(options.scan_count_enabled),
        );
        if let Some(prefix) = &options.table_prefix {
            config = config.table_name_prefix(prefix);
        }
        if let Some(size) = options.fetch_size {
            config = config.fetch_size(size);
        }
        config
    }
}

/// A query method plus the arguments to call it with.
///
/// Arguments are plain JSON values; `{"$date": "<RFC 3339>"}` is a date and
/// `{"$set": [...]}` a string set.
#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct QueryDocument {
    /// Method name.
    pub name: String,
    /// Parts of the first conjunction.
    #[serde(default)]
    pub parts: Vec<Part>,
    /// Further OR branches.
    #[serde(default)]
    pub or: Vec<Vec<Part>>,
    /// Sort orders.
    #[serde(default)]
    pub sort: Vec<Sort>,
    /// Result cap.
    #[serde(default)]
    pub limit: Option<usize>,
    /// Result shape.
    #[serde(default)]
    pub mode: ResultMode,
    /// Method-level scan opt-in.
    #[serde(default)]
    pub enable_scan: bool,
    /// Method-level scan count opt-in.
    #[serde(default)]
    pub enable_scan_count: bool,
    /// Call arguments.
    #[serde(default)]
    pub args: Vec<serde_json::Value>,
    /// Page to read for paged and sliced modes.
    #[serde(default)]
    pub page: Option<PageRequest>,
}

impl QueryDocument {
    /// Builds the query method.
    pub fn method(&self) -> QueryMethod {
        let tree = self
            .or
            .iter()
            .fold(PredicateTree::and(self.parts.iter().cloned()), |tree, branch| {
                tree.or(branch.iter().cloned())
            });
        let mut method = QueryMethod::new(&self.name, tree).returning(self.mode);
        for sort in &self.sort {
            method = method.order_by(sort.clone());
        }
        if let Some(limit) = self.limit {
            method = method.limit(limit);
        }
        if self.enable_scan {
            method = method.enable_scan();
        }
        if self.enable_scan_count {
            method = method.enable_scan_count();
        }
        method
    }

    /// Converts the arguments.
    pub fn arguments(&self) -> CliResult<Arguments> {
        let values = self.args.iter().map(to_value).collect::<CliResult<Vec<_>>>()?;
        let arguments = Arguments::new(values);
        Ok(match self.page {
            Some(page) => arguments.with_page(page),
            None => arguments,
        })
    }
}

/// Converts a JSON argument into a property value.
pub fn to_value(json: &serde_json::Value) -> CliResult<Value> {
    use serde_json::Value as Json;

    Ok(match json {
        Json::Null => Value::Null,
        Json::Bool(b) => Value::Bool(*b),
        Json::Number(n) => match (n.as_i64(), n.as_f64()) {
            (Some(i), _) => Value::Integer(i),
            (None, Some(f)) => Value::Float(f),
            (None, None) => return Err(CliError::invalid(format!("number out of range: {n}"))),
        },
        Json::String(s) => Value::Text(s.clone()),
        Json::Array(items) => Value::List(items.iter().map(to_value).collect::<CliResult<_>>()?),
        Json::Object(fields) => {
            if let Some(raw) = fields.get("$date") {
                let raw = raw
                    .as_str()
                    .ok_or_else(|| CliError::invalid("$date must be a string"))?;
                let date = OffsetDateTime::parse(raw, &Rfc3339)
                    .map_err(|e| CliError::invalid(format!("invalid $date {raw:?}: {e}")))?;
                return Ok(Value::Date(date));
            }
            if let Some(items) = fields.get("$set") {
                let items = items
                    .as_array()
                    .ok_or_else(|| CliError::invalid("$set must be an array"))?;
                let strings = items
                    .iter()
                    .map(|item| {
                        item.as_str()
                            .ok_or_else(|| CliError::invalid("$set may only hold strings"))
                    })
                    .collect::<CliResult<Vec<_>>>()?;
                return Ok(Value::string_set(strings));
            }
            Value::Map(
                fields
                    .iter()
                    .map(|(key, value)| Ok((key.clone(), to_value(value)?)))
                    .collect::<CliResult<_>>()?,
            )
        }
    })
}

/// Loads seed items in the store's wire shape, e.g.
/// `[{"user_id": {"S": "alice"}, "plays": {"N": "10"}}]`.
pub fn load_items(path: &Path) -> CliResult<Vec<Item>> {
    load(path)
}
