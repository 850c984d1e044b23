//! Test fixtures and repository helpers.
//!
//! Two fixture entities cover both key shapes:
//! - [`User`]: hash-only, keyed by `id`
//! - [`Playlist`]: partition key `user` (stored as `user_id`), sort key
//!   `name`, index sort keys `created` and `plays`, composite identifier
//!   `id`

use std::collections::BTreeSet;
use time::macros::datetime;
use time::OffsetDateTime;
use widerepo_codec::{format_iso_utc, parse_iso_utc, AttributeValue, IsoDateMarshaller, Item, Value};
use widerepo_core::{
    entity, table_definition, CoreError, CoreResult, Entity, EntityMetadata, Repository,
    RepositoryConfig, StaticEntityMetadata,
};
use widerepo_store::{InMemoryStore, MemoryStoreConfig};

/// A hash-only fixture entity.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct User {
    /// Partition key.
    pub id: String,
    /// Display name.
    pub name: String,
    /// Age in years.
    pub age: i64,
}

impl User {
    /// Creates a user.
    pub fn new(id: impl Into<String>, name: impl Into<String>, age: i64) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            age,
        }
    }
}

impl Entity for User {
    fn to_item(&self) -> CoreResult<Item> {
        let mut item = Item::new();
        item.insert("id".into(), AttributeValue::from(self.id.as_str()));
        item.insert("name".into(), AttributeValue::from(self.name.as_str()));
        item.insert("age".into(), AttributeValue::number(self.age));
        Ok(item)
    }

    fn from_item(item: &Item) -> CoreResult<Self> {
        Ok(Self {
            id: entity::required(item, "id")?.to_text()?,
            name: entity::required(item, "name")?.to_text()?,
            age: entity::required(item, "age")?.to_i64()?,
        })
    }
}

/// A range-aware fixture entity.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Playlist {
    /// Partition key.
    pub user: String,
    /// Sort key.
    pub name: String,
    /// Play count; sort key of the `by_plays` index.
    pub plays: i64,
    /// Creation time; sort key of the `by_created` index.
    pub created: OffsetDateTime,
    /// Whether the playlist is public.
    pub public: bool,
    /// Free-form tags.
    pub tags: BTreeSet<String>,
}

impl Playlist {
    /// Creates a private playlist with no plays and no tags.
    pub fn new(user: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            user: user.into(),
            name: name.into(),
            plays: 0,
            created: datetime!(2024-01-01 00:00 UTC),
            public: false,
            tags: BTreeSet::new(),
        }
    }

    /// Sets the play count.
    #[must_use]
    pub fn plays(mut self, plays: i64) -> Self {
        self.plays = plays;
        self
    }

    /// Sets the creation time.
    #[must_use]
    pub fn created(mut self, created: OffsetDateTime) -> Self {
        self.created = created;
        self
    }

    /// Marks the playlist public.
    #[must_use]
    pub fn public(mut self) -> Self {
        self.public = true;
        self
    }

    /// Sets the tags.
    #[must_use]
    pub fn tags<S: Into<String>>(mut self, tags: impl IntoIterator<Item = S>) -> Self {
        self.tags = tags.into_iter().map(Into::into).collect();
        self
    }

    /// The composite identifier of this playlist.
    pub fn id(&self) -> Value {
        playlist_id(&self.user, &self.name)
    }
}

impl Entity for Playlist {
    fn to_item(&self) -> CoreResult<Item> {
        let mut item = Item::new();
        item.insert("user_id".into(), AttributeValue::from(self.user.as_str()));
        item.insert("name".into(), AttributeValue::from(self.name.as_str()));
        item.insert("plays".into(), AttributeValue::number(self.plays));
        item.insert("created".into(), AttributeValue::S(format_iso_utc(self.created)?));
        item.insert(
            "public".into(),
            AttributeValue::N(if self.public { "1" } else { "0" }.into()),
        );
        if !self.tags.is_empty() {
            item.insert(
                "tags".into(),
                AttributeValue::Ss(self.tags.iter().cloned().collect()),
            );
        }
        Ok(item)
    }

    fn from_item(item: &Item) -> CoreResult<Self> {
        let tags = match entity::optional(item, "tags") {
            Some(value) => value
                .as_ss()
                .ok_or_else(|| CoreError::invalid_mapping("tags must be a string set"))?
                .iter()
                .cloned()
                .collect(),
            None => BTreeSet::new(),
        };
        Ok(Self {
            user: entity::required(item, "user_id")?.to_text()?,
            name: entity::required(item, "name")?.to_text()?,
            plays: entity::required(item, "plays")?.to_i64()?,
            created: parse_iso_utc(&entity::required(item, "created")?.to_text()?)?,
            public: entity::required(item, "public")?.to_bool()?,
            tags,
        })
    }
}

/// Key metadata of [`User`].
pub fn user_metadata() -> StaticEntityMetadata {
    StaticEntityMetadata::new("users", "id")
}

/// Key metadata of [`Playlist`].
pub fn playlist_metadata() -> StaticEntityMetadata {
    StaticEntityMetadata::new("playlists", "user")
        .with_sort_key("name")
        .with_attribute_name("user", "user_id")
        .with_index("by_created", "created")
        .with_index("by_plays", "plays")
        .with_marshaller("created", IsoDateMarshaller)
        .with_composite_id("id")
}

/// The composite identifier of a playlist.
pub fn playlist_id(user: &str, name: &str) -> Value {
    Value::map([("user", Value::from(user)), ("name", Value::from(name))])
}

/// Six playlists across two users.
pub fn sample_playlists() -> Vec<Playlist> {
    vec![
        Playlist::new("alice", "mix1")
            .plays(10)
            .created(datetime!(2024-01-05 09:00 UTC))
            .tags(["rock", "indie"]),
        Playlist::new("alice", "mix2")
            .plays(25)
            .created(datetime!(2024-02-10 18:30 UTC))
            .public(),
        Playlist::new("alice", "road trip")
            .plays(5)
            .created(datetime!(2023-12-24 12:00 UTC))
            .tags(["rock"]),
        Playlist::new("alice", "study")
            .plays(40)
            .created(datetime!(2024-03-01 07:15 UTC))
            .public(),
        Playlist::new("bob", "mix1")
            .plays(3)
            .created(datetime!(2024-01-20 22:00 UTC)),
        Playlist::new("bob", "jazz")
            .plays(12)
            .created(datetime!(2024-02-02 15:45 UTC))
            .tags(["jazz"]),
    ]
}

/// Three users.
pub fn sample_users() -> Vec<User> {
    vec![
        User::new("u1", "Ada", 36),
        User::new("u2", "Grace", 45),
        User::new("u3", "Linus", 28),
    ]
}

/// Creates an in-memory store holding the table of `metadata`.
pub fn store_for(
    metadata: &dyn EntityMetadata,
    config: &RepositoryConfig,
    store_config: MemoryStoreConfig,
) -> InMemoryStore {
    let store = InMemoryStore::with_config(store_config);
    store
        .create_table(table_definition(
            metadata,
            &config.resolve_table_name(metadata.table_name()),
        ))
        .expect("Failed to create fixture table");
    store
}

/// A [`User`] repository seeded with `users`, with an empty call log.
pub fn user_repository(config: RepositoryConfig, users: &[User]) -> Repository<User, InMemoryStore> {
    let metadata = user_metadata();
    let store = store_for(&metadata, &config, MemoryStoreConfig::default());
    let repo = Repository::with_config(store, metadata, config);
    repo.save_all(users).expect("Failed to seed users");
    repo.store().clear_calls();
    repo
}

/// A [`Playlist`] repository seeded with `playlists`, with an empty call
/// log.
pub fn playlist_repository(
    config: RepositoryConfig,
    playlists: &[Playlist],
) -> Repository<Playlist, InMemoryStore> {
    playlist_repository_with_store(config, MemoryStoreConfig::default(), playlists)
}

/// Like [`playlist_repository`], with custom store paging.
pub fn playlist_repository_with_store(
    config: RepositoryConfig,
    store_config: MemoryStoreConfig,
    playlists: &[Playlist],
) -> Repository<Playlist, InMemoryStore> {
    let metadata = playlist_metadata();
    let store = store_for(&metadata, &config, store_config);
    let repo = Repository::with_config(store, metadata, config);
    repo.save_all(playlists).expect("Failed to seed playlists");
    repo.store().clear_calls();
    repo
}

/// `count` playlists for one user, named `p000`, `p001`, ...
pub fn numbered_playlists(user: &str, count: usize) -> Vec<Playlist> {
    (0..count)
        .map(|i| Playlist::new(user, format!("p{i:03}")).plays(i as i64))
        .collect()
}
