//! `explain`: resolve the plan a query would run.

use super::OutputFormat;
use crate::documents::{load, CliResult, QueryDocument, SchemaDocument};
use std::path::Path;
use widerepo_codec::Item;
use widerepo_core::{Plan, Repository};
use widerepo_store::InMemoryStore;

/// Resolves the plan for `query` against `schema`.
///
/// No store is populated; planning never touches one.
pub fn plan(schema: &SchemaDocument, query: &QueryDocument) -> CliResult<Plan> {
    let repo: Repository<Item, _> =
        Repository::with_config(InMemoryStore::new(), schema.metadata()?, schema.config());
    Ok(repo.explain(&query.method(), query.arguments()?.values())?)
}

/// Renders a plan.
pub fn render(plan: &Plan, format: OutputFormat) -> CliResult<String> {
    Ok(match format {
        OutputFormat::Text => plan.to_string(),
        OutputFormat::Json => serde_json::to_string_pretty(plan)?,
    })
}

/// Runs the explain command.
pub fn run(schema: &Path, query: &Path, format: OutputFormat) -> CliResult<()> {
    let schema: SchemaDocument = load(schema)?;
    let query: QueryDocument = load(query)?;
    println!("{}", render(&plan(&schema, &query)?, format)?);
    Ok(())
}
