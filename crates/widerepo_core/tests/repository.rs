//! End-to-end repository behavior against the in-memory store.

use time::macros::datetime;
use widerepo_codec::Value;
use widerepo_core::{
    Arguments, CoreError, PageRequest, Part, PartKind, Plan, PredicateTree, QueryMethod,
    QueryOutput, RepositoryConfig, ResultMode, ScanPolicy, Sort, SCAN_COUNT_REMEDY,
};
use widerepo_store::{MemoryStoreConfig, StoreCall, StoreError};
use widerepo_testkit::prelude::*;

fn by_user() -> QueryMethod {
    QueryMethod::new("find_by_user", PredicateTree::and([Part::eq("user")]))
}

fn by_user_and_name_not() -> QueryMethod {
    QueryMethod::new(
        "find_by_user_and_name_not",
        PredicateTree::and([
            Part::eq("user"),
            Part::new("name", PartKind::NegatingSimpleProperty),
        ]),
    )
}

fn names(playlists: &[Playlist]) -> Vec<&str> {
    playlists.iter().map(|p| p.name.as_str()).collect()
}

fn query_pages(calls: &[StoreCall]) -> usize {
    calls
        .iter()
        .filter(|call| matches!(call, StoreCall::QueryPage { .. }))
        .count()
}

fn alice() -> Vec<Value> {
    vec![Value::from("alice")]
}

// =============================================================================
// Identifier access
// =============================================================================

#[test]
fn find_user_by_id_is_one_get_item() {
    let repo = user_repository(RepositoryConfig::default(), &sample_users());

    let user = repo.find_by_id("u1").unwrap().unwrap();
    assert_eq!(user.name, "Ada");
    assert_eq!(
        repo.store().calls(),
        vec![StoreCall::GetItem {
            table: "users".into()
        }]
    );
}

#[test]
fn find_playlist_by_composite_id() {
    let repo = playlist_repository(RepositoryConfig::default(), &sample_playlists());

    let found = repo.find_by_id(playlist_id("bob", "jazz")).unwrap().unwrap();
    assert_eq!(found.plays, 12);
    assert!(!repo.exists_by_id(playlist_id("bob", "road trip")).unwrap());
    assert_eq!(repo.store().stats().get_items, 2);
}

#[test]
fn partial_composite_id_is_rejected() {
    let repo = playlist_repository(RepositoryConfig::default(), &sample_playlists());
    let partial = Value::map([("user", Value::from("alice"))]);

    assert!(matches!(
        repo.find_by_id(partial),
        Err(CoreError::InvalidArgument { .. })
    ));
    assert!(repo.store().calls().is_empty());
}

#[test]
fn delete_by_id_returns_the_removed_entity() {
    let repo = playlist_repository(RepositoryConfig::default(), &sample_playlists());

    let removed = repo.delete_by_id(playlist_id("alice", "study")).unwrap();
    assert_eq!(removed.plays, 40);
    assert_eq!(repo.store().item_count("playlists").unwrap(), 5);

    assert!(matches!(
        repo.delete_by_id(playlist_id("alice", "study")),
        Err(CoreError::NotFound { .. })
    ));
}

#[test]
fn table_prefix_reaches_the_store() {
    let config = RepositoryConfig::new().table_name_prefix("dev_");
    let repo = playlist_repository(config, &sample_playlists());

    assert_eq!(repo.table_name(), "dev_playlists");
    repo.find_by_id(playlist_id("alice", "mix1")).unwrap();
    assert_eq!(
        repo.store().calls(),
        vec![StoreCall::GetItem {
            table: "dev_playlists".into()
        }]
    );
}

// =============================================================================
// Range queries
// =============================================================================

#[test]
fn partition_query_returns_sort_key_order() {
    let repo = playlist_repository(RepositoryConfig::default(), &sample_playlists());

    let found = repo.find_list(&by_user(), &alice()).unwrap();
    assert_eq!(names(&found), vec!["mix1", "mix2", "road trip", "study"]);

    let descending = by_user().order_by(Sort::desc("name"));
    let found = repo.find_list(&descending, &alice()).unwrap();
    assert_eq!(names(&found), vec!["study", "road trip", "mix2", "mix1"]);

    assert!(repo
        .store()
        .calls()
        .iter()
        .all(|call| matches!(call, StoreCall::QueryPage { index: None, .. })));
}

#[test]
fn created_after_uses_the_index_in_any_zone() {
    let repo = playlist_repository(RepositoryConfig::default(), &sample_playlists());
    let method = QueryMethod::new(
        "find_by_user_and_created_after",
        PredicateTree::and([Part::eq("user"), Part::new("created", PartKind::After)]),
    );

    let tokyo = Value::Date(datetime!(2024-02-01 09:00 +09:00));
    let new_york = Value::Date(datetime!(2024-01-31 19:00 -05:00));
    let from_tokyo = repo.find_list(&method, &[Value::from("alice"), tokyo]).unwrap();
    let from_new_york = repo.find_list(&method, &[Value::from("alice"), new_york]).unwrap();

    assert_eq!(names(&from_tokyo), vec!["mix2", "study"]);
    assert_eq!(from_tokyo, from_new_york);
    assert!(repo.store().calls().iter().all(|call| matches!(
        call,
        StoreCall::QueryPage { index: Some(index), .. } if index == "by_created"
    )));
}

#[test]
fn plays_range_descending_on_the_index() {
    let repo = playlist_repository(RepositoryConfig::default(), &sample_playlists());
    let method = QueryMethod::new(
        "find_by_user_and_plays_greater_than",
        PredicateTree::and([Part::eq("user"), Part::new("plays", PartKind::GreaterThan)]),
    )
    .order_by(Sort::desc("plays"));

    let found = repo
        .find_list(&method, &[Value::from("alice"), Value::Integer(9)])
        .unwrap();
    assert_eq!(names(&found), vec!["study", "mix2", "mix1"]);
}

#[test]
fn plays_between_is_inclusive() {
    let repo = playlist_repository(RepositoryConfig::default(), &sample_playlists());
    let method = QueryMethod::new(
        "find_by_user_and_plays_between",
        PredicateTree::and([Part::eq("user"), Part::new("plays", PartKind::Between)]),
    );

    let found = repo
        .find_list(
            &method,
            &[Value::from("alice"), Value::Integer(5), Value::Integer(25)],
        )
        .unwrap();
    assert_eq!(names(&found), vec!["road trip", "mix1", "mix2"]);
}

#[test]
fn single_result_modes() {
    let repo = playlist_repository(RepositoryConfig::default(), &sample_playlists());

    assert!(matches!(
        repo.find_one(&by_user(), &alice()),
        Err(CoreError::NonUniqueResult { count: 4, .. })
    ));
    assert!(matches!(
        repo.find_one(&by_user(), &[Value::from("carol")]),
        Err(CoreError::NotFound { .. })
    ));

    let first = repo.find_optional(&by_user(), &alice()).unwrap().unwrap();
    assert_eq!(first.name, "mix1");
    assert_eq!(query_pages(&repo.store().calls()), 3);
}

#[test]
fn delete_by_removes_the_single_match() {
    let repo = playlist_repository(RepositoryConfig::default(), &sample_playlists());
    let method = QueryMethod::new("delete_by_id", PredicateTree::and([Part::eq("id")]))
        .returning(ResultMode::Delete);

    let output = repo
        .execute(&method, &Arguments::new(vec![playlist_id("bob", "jazz")]))
        .unwrap();
    let QueryOutput::Deleted(removed) = output else {
        panic!("expected a deleted entity");
    };
    assert_eq!(removed.name, "jazz");
    assert_eq!(repo.store().item_count("playlists").unwrap(), 5);
}

// =============================================================================
// Scans
// =============================================================================

#[test]
fn not_equal_on_sort_key_is_denied_without_opt_in() {
    let repo = playlist_repository(RepositoryConfig::default(), &sample_playlists());
    let args = [Value::from("alice"), Value::from("mix1")];

    let err = repo.find_list(&by_user_and_name_not(), &args).unwrap_err();
    assert!(matches!(err, CoreError::PermissionDenied { .. }));
    assert!(err.to_string().contains("find_by_user_and_name_not"));
    assert!(repo.store().calls().is_empty());
}

#[test]
fn not_equal_on_sort_key_scans_with_opt_in() {
    let repo = playlist_repository(RepositoryConfig::default(), &sample_playlists());
    let args = [Value::from("alice"), Value::from("mix1")];

    let method = by_user_and_name_not().enable_scan();
    assert!(repo.explain(&method, &args).unwrap().is_scan());

    let found = repo.find_list(&method, &args).unwrap();
    assert_eq!(names(&found), vec!["mix2", "road trip", "study"]);
    assert!(repo
        .store()
        .calls()
        .iter()
        .all(|call| matches!(call, StoreCall::ScanPage { .. })));

    let config = RepositoryConfig::new().scan(ScanPolicy::disabled().scan_enabled(true));
    let repo = playlist_repository(config, &sample_playlists());
    assert_eq!(repo.find_list(&by_user_and_name_not(), &args).unwrap().len(), 3);
}

#[test]
fn contains_on_tags_scans() {
    let config = RepositoryConfig::new().scan(ScanPolicy::enabled());
    let repo = playlist_repository(config, &sample_playlists());
    let method = QueryMethod::new(
        "find_by_tags_containing",
        PredicateTree::and([Part::new("tags", PartKind::Containing)]),
    );

    let found = repo.find_list(&method, &[Value::from("rock")]).unwrap();
    assert_eq!(names(&found), vec!["mix1", "road trip"]);
}

#[test]
fn find_all_and_count_need_repository_opt_in() {
    let repo = playlist_repository(RepositoryConfig::default(), &sample_playlists());
    assert!(matches!(repo.find_all(), Err(CoreError::PermissionDenied { .. })));
    assert!(matches!(repo.count(), Err(CoreError::PermissionDenied { .. })));

    let config = RepositoryConfig::new().scan(ScanPolicy::enabled());
    let repo = playlist_repository(config, &sample_playlists());
    assert_eq!(repo.find_all().unwrap().len(), 6);
    assert_eq!(repo.count().unwrap(), 6);
}

#[test]
fn paged_scan_needs_scan_count() {
    let repo = playlist_repository(RepositoryConfig::default(), &sample_playlists());
    let args = [Value::from("alice"), Value::from("mix1")];
    let method = by_user_and_name_not().enable_scan();

    let err = repo
        .find_page(&method, &args, PageRequest::of(0, 2))
        .unwrap_err();
    match err {
        CoreError::PermissionDenied { remedy, .. } => assert_eq!(remedy, SCAN_COUNT_REMEDY),
        other => panic!("unexpected error {other}"),
    }
    assert!(repo.store().calls().is_empty());

    let page = repo
        .find_page(&method.enable_scan_count(), &args, PageRequest::of(0, 2))
        .unwrap();
    assert_eq!(names(&page.content), vec!["mix2", "road trip"]);
    assert_eq!(page.total, 3);
}

// =============================================================================
// Counting
// =============================================================================

#[test]
fn count_follows_continuations() {
    let repo = playlist_repository_with_store(
        RepositoryConfig::default(),
        MemoryStoreConfig::new().count_page_size(40),
        &numbered_playlists("alice", 57),
    );
    let method = by_user().returning(ResultMode::Count);

    assert!(matches!(
        repo.explain(&method, &alice()).unwrap(),
        Plan::RangeQuery(_)
    ));
    assert_eq!(repo.count_by(&method, &alice()).unwrap(), 57);

    let counts = repo
        .store()
        .calls()
        .into_iter()
        .filter(|call| matches!(call, StoreCall::CountPage { .. }))
        .count();
    assert_eq!(counts, 2);
}

#[test]
fn count_of_unplannable_needs_scan_count() {
    let repo = playlist_repository(RepositoryConfig::default(), &sample_playlists());
    let args = [Value::from("alice"), Value::from("mix1")];

    let scan_only = by_user_and_name_not()
        .enable_scan()
        .returning(ResultMode::Count);
    assert!(matches!(
        repo.count_by(&scan_only, &args),
        Err(CoreError::PermissionDenied { .. })
    ));

    let counted = by_user_and_name_not()
        .enable_scan_count()
        .returning(ResultMode::Count);
    let output = repo.execute(&counted, &Arguments::new(args.to_vec())).unwrap();
    assert!(matches!(output, QueryOutput::Count(3)));
}

// =============================================================================
// Pages and slices
// =============================================================================

#[test]
fn page_reads_before_counting() {
    let repo = playlist_repository(RepositoryConfig::new().fetch_size(2), &sample_playlists());

    let page = repo
        .find_page(&by_user(), &alice(), PageRequest::of(1, 2))
        .unwrap();
    assert_eq!(names(&page.content), vec!["road trip", "study"]);
    assert_eq!(page.total, 4);
    assert!(!page.has_next());

    let calls = repo.store().calls();
    assert_eq!(query_pages(&calls), 2);
    assert!(matches!(calls.last(), Some(StoreCall::CountPage { .. })));
}

#[test]
fn page_past_the_end_skips_the_count() {
    let repo = playlist_repository(RepositoryConfig::default(), &sample_playlists());

    let at_end = repo
        .find_page(&by_user(), &alice(), PageRequest::new(4, 2))
        .unwrap();
    assert!(at_end.content.is_empty());
    assert_eq!(at_end.total, 4);

    repo.store().clear_calls();
    let beyond = repo
        .find_page(&by_user(), &alice(), PageRequest::new(5, 2))
        .unwrap();
    assert!(beyond.content.is_empty());
    assert_eq!(beyond.total, 0);
    assert!(!repo
        .store()
        .calls()
        .iter()
        .any(|call| matches!(call, StoreCall::CountPage { .. })));
}

#[test]
fn page_respects_the_method_limit() {
    let repo = playlist_repository(RepositoryConfig::default(), &sample_playlists());
    let method = by_user().limit(3);

    let page = repo
        .find_page(&method, &alice(), PageRequest::of(1, 2))
        .unwrap();
    assert_eq!(names(&page.content), vec!["road trip"]);
    assert_eq!(page.total, 3);
}

#[test]
fn slice_looks_ahead_one_result() {
    let repo = playlist_repository(RepositoryConfig::new().fetch_size(2), &sample_playlists());

    let first = repo
        .find_slice(&by_user(), &alice(), PageRequest::of(0, 3))
        .unwrap();
    assert_eq!(names(&first.content), vec!["mix1", "mix2", "road trip"]);
    assert!(first.has_more);

    let last = repo
        .find_slice(&by_user(), &alice(), PageRequest::of(1, 2))
        .unwrap();
    assert_eq!(names(&last.content), vec!["road trip", "study"]);
    assert!(!last.has_more);

    let final_one = repo
        .find_slice(&by_user(), &alice(), PageRequest::new(3, 1))
        .unwrap();
    assert_eq!(names(&final_one.content), vec!["study"]);
    assert!(!final_one.has_more);

    for offset in [4, 9] {
        let beyond = repo
            .find_slice(&by_user(), &alice(), PageRequest::new(offset, 2))
            .unwrap();
        assert!(beyond.content.is_empty());
        assert!(!beyond.has_more);
    }
}

#[test]
fn paged_modes_need_a_page_request() {
    let repo = playlist_repository(RepositoryConfig::default(), &sample_playlists());
    let method = by_user().returning(ResultMode::Sliced);

    assert!(matches!(
        repo.execute(&method, &Arguments::new(alice())),
        Err(CoreError::InvalidArgument { .. })
    ));

    let output = repo
        .execute(&method, &Arguments::new(alice()).with_page(PageRequest::of(0, 10)))
        .unwrap();
    assert_eq!(output.into_entities().len(), 4);
}

// =============================================================================
// Failures
// =============================================================================

#[test]
fn store_failures_pass_through() {
    let repo = playlist_repository(RepositoryConfig::default(), &sample_playlists());
    repo.store().fail_next_call("throttled");

    assert!(matches!(
        repo.find_list(&by_user(), &alice()),
        Err(CoreError::Store(StoreError::Unavailable { .. }))
    ));
    assert_eq!(repo.find_list(&by_user(), &alice()).unwrap().len(), 4);
}

#[test]
fn unsupported_predicates_fail_before_the_store() {
    let repo = playlist_repository(RepositoryConfig::new().scan(ScanPolicy::enabled()), &sample_playlists());
    let method = QueryMethod::new(
        "find_by_name_like",
        PredicateTree::and([Part::new("name", PartKind::Like)]),
    );

    let err = repo.find_list(&method, &[Value::from("mi%")]).unwrap_err();
    assert!(err.is_planning_error());
    assert!(repo.store().calls().is_empty());
}
