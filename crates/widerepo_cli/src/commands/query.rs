//! `query`: run a query against a seeded in-memory store.

use super::OutputFormat;
use crate::documents::{load, load_items, CliResult, QueryDocument, SchemaDocument};
use std::path::Path;
use tracing::{debug, info};
use widerepo_codec::Item;
use widerepo_core::{table_definition, EntityMetadata, QueryOutput, Repository};
use widerepo_store::InMemoryStore;

/// The output of one query plus the store round-trips it cost.
#[derive(Debug)]
pub struct Execution {
    /// Shaped results.
    pub output: QueryOutput<Item>,
    /// Store calls made by the query, excluding seeding.
    pub round_trips: usize,
}

/// Seeds a store with `items` and runs `query` against it.
pub fn execute(
    schema: &SchemaDocument,
    query: &QueryDocument,
    items: &[Item],
) -> CliResult<Execution> {
    let metadata = schema.metadata()?;
    let config = schema.config();
    let store = InMemoryStore::new();
    store.create_table(table_definition(
        &metadata,
        &config.resolve_table_name(metadata.table_name()),
    ))?;

    let repo: Repository<Item, _> = Repository::with_config(store, metadata, config);
    repo.save_all(items)?;
    repo.store().clear_calls();
    info!(table = repo.table_name(), items = items.len(), "seeded store");

    let method = query.method();
    let output = repo.execute(&method, &query.arguments()?)?;
    let round_trips = repo.store().calls().len();
    debug!(method = method.name(), round_trips, "query finished");
    Ok(Execution {
        output,
        round_trips,
    })
}

/// Renders a query result.
pub fn render(execution: &Execution, format: OutputFormat) -> CliResult<String> {
    if format == OutputFormat::Json {
        return Ok(serde_json::to_string_pretty(&execution.output)?);
    }

    let (items, summary): (&[Item], Option<String>) = match &execution.output {
        QueryOutput::Single(item) | QueryOutput::Deleted(item) => (std::slice::from_ref(item), None),
        QueryOutput::Optional(item) => (
            item.as_slice(),
            item.is_none().then(|| "(none)".to_string()),
        ),
        QueryOutput::List(list) => (list, None),
        QueryOutput::Page(page) => (
            &page.content,
            Some(format!(
                "page: offset {}, size {}, total {}",
                page.request.offset, page.request.page_size, page.total
            )),
        ),
        QueryOutput::Slice(slice) => (
            &slice.content,
            Some(format!(
                "slice: offset {}, size {}, more: {}",
                slice.request.offset, slice.request.page_size, slice.has_more
            )),
        ),
        QueryOutput::Count(count) => (&[], Some(count.to_string())),
    };

    let mut lines = items
        .iter()
        .map(serde_json::to_string)
        .collect::<Result<Vec<_>, _>>()?;
    lines.extend(summary);
    lines.push(format!("round trips: {}", execution.round_trips));
    Ok(lines.join("\n"))
}

/// Runs the query command.
pub fn run(schema: &Path, data: &Path, query: &Path, format: OutputFormat) -> CliResult<()> {
    let schema: SchemaDocument = load(schema)?;
    let query: QueryDocument = load(query)?;
    let items = load_items(data)?;
    println!("{}", render(&execute(&schema, &query, &items)?, format)?);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::documents::load;
    use std::fs;

    const SCHEMA: &str = r#"{
        "table": "playlists",
        "partition_key": "user",
        "sort_key": "name",
        "attribute_names": { "user": "user_id" },
        "indexes": [{ "name": "by_plays", "sort_key": "plays" }],
        "composite_id": "id"
    }"#;

    const ITEMS: &str = r#"[
        { "user_id": { "S": "alice" }, "name": { "S": "mix1" }, "plays": { "N": "10" } },
        { "user_id": { "S": "alice" }, "name": { "S": "mix2" }, "plays": { "N": "25" } },
        { "user_id": { "S": "alice" }, "name": { "S": "study" }, "plays": { "N": "40" } },
        { "user_id": { "S": "bob" }, "name": { "S": "jazz" }, "plays": { "N": "12" } }
    ]"#;

    fn run_query(query: &str) -> CliResult<Execution> {
        let dir = tempfile::tempdir().unwrap();
        let paths = [("schema.json", SCHEMA), ("items.json", ITEMS), ("query.json", query)]
            .map(|(name, contents)| {
                let path = dir.path().join(name);
                fs::write(&path, contents).unwrap();
                path
            });
        let schema: SchemaDocument = load(&paths[0])?;
        let items = load_items(&paths[1])?;
        let query: QueryDocument = load(&paths[2])?;
        execute(&schema, &query, &items)
    }

    #[test]
    fn range_query_over_an_index() {
        let execution = run_query(
            r#"{
                "name": "find_by_user_and_plays_greater_than",
                "parts": [
                    { "property": "user", "kind": "simple_property" },
                    { "property": "plays", "kind": "greater_than" }
                ],
                "sort": [{ "property": "plays", "direction": "descending" }],
                "args": ["alice", 10]
            }"#,
        )
        .unwrap();

        let names: Vec<_> = execution
            .output
            .clone()
            .into_entities()
            .iter()
            .map(|item| item["name"].as_s().unwrap().to_string())
            .collect();
        assert_eq!(names, vec!["study", "mix2"]);
        assert_eq!(execution.round_trips, 1);

        let text = render(&execution, OutputFormat::Text).unwrap();
        assert!(text.starts_with(r#"{"name":{"S":"study"}"#));
        assert!(text.ends_with("round trips: 1"));
    }

    #[test]
    fn paged_count_renders_totals() {
        let execution = run_query(
            r#"{
                "name": "find_by_user",
                "parts": [{ "property": "user", "kind": "simple_property" }],
                "mode": "paged",
                "args": ["alice"],
                "page": { "offset": 2, "page_size": 2 }
            }"#,
        )
        .unwrap();

        let text = render(&execution, OutputFormat::Text).unwrap();
        assert!(text.contains("page: offset 2, size 2, total 3"));

        let json: serde_json::Value =
            serde_json::from_str(&render(&execution, OutputFormat::Json).unwrap()).unwrap();
        assert_eq!(json["mode"], "page");
        assert_eq!(json["result"]["total"], 3);
    }

    #[test]
    fn scans_are_denied_without_opt_in() {
        let query = r#"{
            "name": "find_by_plays",
            "parts": [{ "property": "plays", "kind": "simple_property" }],
            "args": [12]
        }"#;
        assert!(matches!(
            run_query(query),
            Err(crate::documents::CliError::Core(
                widerepo_core::CoreError::PermissionDenied { .. }
            ))
        ));
    }

    #[test]
    fn count_mode_prints_a_number() {
        let execution = run_query(
            r#"{
                "name": "count_by_user",
                "parts": [{ "property": "user", "kind": "simple_property" }],
                "mode": "count",
                "args": ["bob"]
            }"#,
        )
        .unwrap();
        assert_eq!(
            render(&execution, OutputFormat::Text).unwrap(),
            "1\nround trips: 1"
        );
    }
}
