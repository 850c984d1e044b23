//! Repository facade.

use crate::config::RepositoryConfig;
use crate::count::{count_all, count_plan};
use crate::criteria::Criteria;
use crate::entity::Entity;
use crate::error::{CoreError, CoreResult};
use crate::execution::{self, Page, PageRequest, QueryOutput, Slice};
use crate::metadata::EntityMetadata;
use crate::method::{Arguments, QueryMethod, ResultMode};
use crate::planner::{Plan, Planner, SCAN_COUNT_REMEDY, SCAN_REMEDY};
use std::fmt;
use std::marker::PhantomData;
use tracing::debug;
use widerepo_codec::{Item, Value};
use widerepo_store::{CountRequest, ItemKey, PaginatedItems, ScanRequest, StoreClient};

/// Lazy sequence of mapped results.
type Results<'a, T> = Box<dyn Iterator<Item = CoreResult<T>> + 'a>;

/// Typed access to one entity's table.
///
/// Every read goes through the planner: a request is served by a lookup or
/// a range query when its conditions allow, and by a scan only when scans
/// were opted into at the repository or method level.
///
/// # Example
///
/// ```rust
/// use widerepo_codec::{Item, Value};
/// use widerepo_core::{
///     table_definition, Arguments, Part, PredicateTree, QueryMethod, Repository, ResultMode,
///     StaticEntityMetadata,
/// };
/// use widerepo_store::InMemoryStore;
///
/// let metadata = StaticEntityMetadata::new("users", "id");
/// let store = InMemoryStore::new();
/// store.create_table(table_definition(&metadata, "users")).unwrap();
///
/// let users: Repository<Item, _> = Repository::new(store, metadata);
/// let mut alice = Item::new();
/// alice.insert("id".into(), "u1".into());
/// users.save(&alice).unwrap();
///
/// let method = QueryMethod::new("find_by_id", PredicateTree::and([Part::eq("id")]))
///     .returning(ResultMode::Single);
/// let found = users
///     .execute(&method, &Arguments::new(vec![Value::from("u1")]))
///     .unwrap();
/// assert_eq!(found.into_entities(), vec![alice]);
/// ```
pub struct Repository<T, S> {
    store: S,
    metadata: Box<dyn EntityMetadata>,
    config: RepositoryConfig,
    table_name: String,
    _entity: PhantomData<fn() -> T>,
}

impl<T: Entity, S: StoreClient> Repository<T, S> {
    /// Creates a repository with the default configuration.
    pub fn new(store: S, metadata: impl EntityMetadata + 'static) -> Self {
        Self::with_config(store, metadata, RepositoryConfig::default())
    }

    /// Creates a repository with the given configuration.
    pub fn with_config(
        store: S,
        metadata: impl EntityMetadata + 'static,
        config: RepositoryConfig,
    ) -> Self {
        let table_name = config.resolve_table_name(metadata.table_name());
        Self {
            store,
            metadata: Box::new(metadata),
            config,
            table_name,
            _entity: PhantomData,
        }
    }

    /// The underlying store client.
    pub fn store(&self) -> &S {
        &self.store
    }

    /// Key metadata of the entity.
    pub fn metadata(&self) -> &dyn EntityMetadata {
        self.metadata.as_ref()
    }

    /// Repository configuration.
    pub fn config(&self) -> &RepositoryConfig {
        &self.config
    }

    /// Physical table name, after the configured prefix.
    pub fn table_name(&self) -> &str {
        &self.table_name
    }

    fn planner(&self) -> Planner<'_> {
        Planner::new(self.metadata.as_ref(), self.table_name.clone())
            .with_page_size(self.config.fetch_size)
    }

    // =========================================================================
    // CRUD
    // =========================================================================

    /// Finds an entity by its identifier.
    ///
    /// Range-aware entities take a composite identifier naming both key
    /// components.
    pub fn find_by_id(&self, id: impl Into<Value>) -> CoreResult<Option<T>> {
        let plan = self.lookup_plan(id.into())?;
        execution::single_or_none(self.results(plan)?)
    }

    /// Whether an entity with the identifier exists.
    pub fn exists_by_id(&self, id: impl Into<Value>) -> CoreResult<bool> {
        let plan = self.lookup_plan(id.into())?;
        Ok(count_plan(&self.store, &plan)? > 0)
    }

    /// Reads every entity in the table. Requires repository-level scans.
    pub fn find_all(&self) -> CoreResult<Vec<T>> {
        if !self.config.scan.scan_enabled {
            return Err(CoreError::permission_denied("find_all", SCAN_REMEDY));
        }
        execution::collection(self.results(Plan::Scan(self.full_scan()))?, None)
    }

    /// Counts every entity in the table. Requires repository-level scan
    /// counts.
    pub fn count(&self) -> CoreResult<u64> {
        if !self.config.scan.scan_count_enabled {
            return Err(CoreError::permission_denied("count", SCAN_COUNT_REMEDY));
        }
        count_all(&self.store, &CountRequest::Scan(self.full_scan()))
    }

    /// Inserts or replaces an entity.
    pub fn save(&self, entity: &T) -> CoreResult<()> {
        self.store.put_item(&self.table_name, entity.to_item()?)?;
        Ok(())
    }

    /// Inserts or replaces several entities in one batch.
    pub fn save_all(&self, entities: &[T]) -> CoreResult<()> {
        if entities.is_empty() {
            return Ok(());
        }
        let items = entities
            .iter()
            .map(Entity::to_item)
            .collect::<CoreResult<Vec<_>>>()?;
        self.store.batch_put(&self.table_name, items)?;
        Ok(())
    }

    /// Deletes an entity by the key attributes it carries.
    pub fn delete(&self, entity: &T) -> CoreResult<()> {
        let key = self.key_of(&entity.to_item()?)?;
        self.store.delete_item(&self.table_name, &key)?;
        Ok(())
    }

    /// Deletes the entity with the identifier and returns it.
    ///
    /// # Errors
    ///
    /// `NotFound` when no such entity exists.
    pub fn delete_by_id(&self, id: impl Into<Value>) -> CoreResult<T> {
        let plan = self.lookup_plan(id.into())?;
        let Plan::Lookup { key, .. } = &plan else {
            return Err(CoreError::invalid_argument("identifier does not name a key"));
        };
        let key = key.clone();
        let entity = execution::single("delete_by_id", self.results(plan)?)?;
        self.store.delete_item(&self.table_name, &key)?;
        Ok(entity)
    }

    /// Deletes several entities in one batch.
    pub fn delete_all(&self, entities: &[T]) -> CoreResult<()> {
        if entities.is_empty() {
            return Ok(());
        }
        let keys = entities
            .iter()
            .map(|entity| self.key_of(&entity.to_item()?))
            .collect::<CoreResult<Vec<_>>>()?;
        self.store.batch_delete(&self.table_name, keys)?;
        Ok(())
    }

    // =========================================================================
    // Query methods
    // =========================================================================

    /// Runs a query method and shapes its results by its result mode.
    pub fn execute(&self, method: &QueryMethod, args: &Arguments) -> CoreResult<QueryOutput<T>> {
        let values = args.values();
        let page = || {
            args.page().ok_or_else(|| {
                CoreError::invalid_argument(format!("{} needs a page request", method.name()))
            })
        };
        Ok(match method.mode() {
            ResultMode::Single => QueryOutput::Single(self.find_one(method, values)?),
            ResultMode::SingleOrNone => QueryOutput::Optional(self.find_optional(method, values)?),
            ResultMode::Collection => QueryOutput::List(self.find_list(method, values)?),
            ResultMode::Paged => QueryOutput::Page(self.find_page(method, values, page()?)?),
            ResultMode::Sliced => QueryOutput::Slice(self.find_slice(method, values, page()?)?),
            ResultMode::Delete => QueryOutput::Deleted(self.delete_by(method, values)?),
            ResultMode::Count => QueryOutput::Count(self.count_by(method, values)?),
        })
    }

    /// Resolves the plan a query method would run, without any store call.
    pub fn explain(&self, method: &QueryMethod, args: &[Value]) -> CoreResult<Plan> {
        if method.mode() == ResultMode::Count {
            return self.resolve_count(method, args);
        }
        self.resolve(method, args)
    }

    /// Exactly one matching entity.
    pub fn find_one(&self, method: &QueryMethod, args: &[Value]) -> CoreResult<T> {
        let plan = self.resolve(method, args)?;
        execution::single(method.name(), self.results(plan)?)
    }

    /// The first matching entity, if any.
    pub fn find_optional(&self, method: &QueryMethod, args: &[Value]) -> CoreResult<Option<T>> {
        let plan = self.resolve(method, args)?;
        execution::single_or_none(self.results(plan)?)
    }

    /// Every matching entity, up to the method's limit.
    pub fn find_list(&self, method: &QueryMethod, args: &[Value]) -> CoreResult<Vec<T>> {
        let plan = self.resolve(method, args)?;
        execution::collection(self.results(plan)?, method.max_results())
    }

    /// One page of matching entities plus the total count.
    ///
    /// The page is read first, then the total is counted. Counting a scan
    /// requires scan counts to be enabled.
    pub fn find_page(
        &self,
        method: &QueryMethod,
        args: &[Value],
        page: PageRequest,
    ) -> CoreResult<Page<T>> {
        let plan = self.resolve(method, args)?;
        if plan.is_scan() && !self.scan_policy(method).scan_count_enabled {
            return Err(CoreError::permission_denied(method.name(), SCAN_COUNT_REMEDY));
        }
        let count_target = plan.clone();
        execution::paged(self.results(plan)?, page, method.max_results(), || {
            count_plan(&self.store, &count_target)
        })
    }

    /// One page of matching entities plus whether more follow.
    pub fn find_slice(
        &self,
        method: &QueryMethod,
        args: &[Value],
        page: PageRequest,
    ) -> CoreResult<Slice<T>> {
        let plan = self.resolve(method, args)?;
        execution::sliced(self.results(plan)?, page, method.max_results())
    }

    /// Number of matching entities.
    pub fn count_by(&self, method: &QueryMethod, args: &[Value]) -> CoreResult<u64> {
        let plan = self.resolve_count(method, args)?;
        count_plan(&self.store, &plan)
    }

    /// Deletes the single matching entity and returns it.
    pub fn delete_by(&self, method: &QueryMethod, args: &[Value]) -> CoreResult<T> {
        let plan = self.resolve(method, args)?;
        let entity = execution::single(method.name(), self.results(plan)?)?;
        self.delete(&entity)?;
        Ok(entity)
    }

    // =========================================================================
    // Planning and reading
    // =========================================================================

    fn scan_policy(&self, method: &QueryMethod) -> crate::config::ScanPolicy {
        self.config.scan.union(method.scan_policy())
    }

    fn resolve(&self, method: &QueryMethod, args: &[Value]) -> CoreResult<Plan> {
        let criteria = method.criteria(self.metadata.as_ref(), args)?;
        let plan = self.planner().resolve(
            &criteria,
            method.name(),
            self.scan_policy(method).scan_enabled,
        )?;
        debug!(method = method.name(), plan = plan.kind(), "resolved query method");
        Ok(plan)
    }

    fn resolve_count(&self, method: &QueryMethod, args: &[Value]) -> CoreResult<Plan> {
        let criteria = method.criteria(self.metadata.as_ref(), args)?;
        let plan = self.planner().resolve_count(
            &criteria,
            method.name(),
            self.scan_policy(method).scan_count_enabled,
        )?;
        debug!(method = method.name(), plan = plan.kind(), "resolved count method");
        Ok(plan)
    }

    fn lookup_plan(&self, id: Value) -> CoreResult<Plan> {
        let metadata = self.metadata.as_ref();
        let mut criteria = Criteria::new(metadata);
        match metadata.sort_key_property() {
            Some(sort_property) => {
                let (partition, sort) = metadata.decompose_composite_id(&id)?;
                if partition.is_null() || sort.is_null() {
                    return Err(CoreError::invalid_argument(
                        "identifier must name both the partition and the sort key",
                    ));
                }
                criteria
                    .with_equals(metadata.partition_key_property(), partition)?
                    .with_equals(sort_property, sort)?;
            }
            None if id.is_null() => {
                return Err(CoreError::invalid_argument("identifier must not be null"));
            }
            None => {
                criteria.with_equals(metadata.partition_key_property(), id)?;
            }
        }
        match self.planner().plan(&criteria)? {
            plan @ Plan::Lookup { .. } => Ok(plan),
            _ => Err(CoreError::invalid_argument("identifier does not name a key")),
        }
    }

    fn full_scan(&self) -> ScanRequest {
        ScanRequest {
            table_name: self.table_name.clone(),
            filter_conditions: Vec::new(),
            page_size: self.config.fetch_size,
        }
    }

    fn key_of(&self, item: &Item) -> CoreResult<ItemKey> {
        let metadata = self.metadata.as_ref();
        let partition = metadata.attribute_name(metadata.partition_key_property());
        let sort = metadata.sort_key_property().map(|p| metadata.attribute_name(p));
        ItemKey::from_item(item, &partition, sort.as_deref())
            .ok_or_else(|| CoreError::invalid_mapping("entity item lacks its key attributes"))
    }

    fn results(&self, plan: Plan) -> CoreResult<Results<'_, T>> {
        let store: &dyn StoreClient = &self.store;
        let items: Box<dyn Iterator<Item = CoreResult<Item>> + '_> = match plan {
            Plan::Lookup { table_name, key } => Box::new(
                std::iter::once_with(move || store.get_item(&table_name, &key))
                    .filter_map(Result::transpose)
                    .map(|item| item.map_err(CoreError::from)),
            ),
            Plan::RangeQuery(request) => {
                Box::new(PaginatedItems::query(store, request).map(|item| item.map_err(CoreError::from)))
            }
            Plan::Scan(request) => {
                Box::new(PaginatedItems::scan(store, request).map(|item| item.map_err(CoreError::from)))
            }
            Plan::Unplannable => {
                return Err(CoreError::unsupported_operation(
                    "cannot read an unplannable request",
                ))
            }
        };
        Ok(Box::new(items.map(|item| T::from_item(&item?))))
    }
}

impl<T, S: fmt::Debug> fmt::Debug for Repository<T, S> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Repository")
            .field("table_name", &self.table_name)
            .field("config", &self.config)
            .field("store", &self.store)
            .finish()
    }
}
