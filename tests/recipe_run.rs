use std::sync::Arc;

use quickcheck::{Arbitrary, Gen};
use serde_json::json;

use rewrite_engine::config::RunConfig;
use rewrite_engine::error::RunError;
use rewrite_engine::ir::visitor::SourceFile;
use rewrite_engine::maven::{ChangePropertyValue, MavenDocument, OfflineDownloader};
use rewrite_engine::recipe::{DeleteMethodArgument, Recipe, RecipePipeline, RecipeRun, from_options};
use test_utils::ir::builders::pom_document;
use test_utils::ir::generator::CallSite;

fn sources(count: usize) -> (Vec<CallSite>, Vec<SourceFile>) {
    let mut g = Gen::new(8);
    let sites: Vec<CallSite> = (0..count).map(|_| CallSite::arbitrary(&mut g)).collect();
    let sources = sites.iter().map(|site| SourceFile::Java(site.to_compilation_unit())).collect();
    (sites, sources)
}

#[test]
fn test_parallel_and_sequential_runs_agree() {
    let _ = rewrite_engine::logging::init_logger(false, Some("warn"), false);
    let (_, sources) = sources(64);
    let recipe: Arc<dyn Recipe> = Arc::new(DeleteMethodArgument::new("com.acme.Foo bar(..)", 0));

    let sequential = RecipeRun::new(Arc::clone(&recipe), RunConfig::sequential()).run(&sources).unwrap();
    let parallel_config = RunConfig { max_threads: Some(4), ..RunConfig::default() };
    let parallel = RecipeRun::new(recipe, parallel_config).run(&sources).unwrap();

    assert_eq!(sequential.results.len(), sources.len());
    for (s, p) in sequential.results.iter().zip(&parallel.results) {
        assert!(s.before.is_same_tree(&p.before));
        assert_eq!(s.is_changed(), p.is_changed());
        assert_eq!(s.after.as_ref().map(SourceFile::print), p.after.as_ref().map(SourceFile::print));
        assert_eq!(s.import_requests, p.import_requests);
    }
}

#[test]
fn test_precondition_answers_end_with_their_trees() {
    let (_, sources) = sources(8);
    let run = RecipeRun::new(Arc::new(DeleteMethodArgument::new("com.acme.Foo bar(..)", 0)), RunConfig::sequential());

    let result = run.run(&sources).unwrap();
    assert_eq!(run.context().memoized_precondition_count(), sources.len());

    drop(result);
    drop(sources);
    run.run(&[]).unwrap();
    assert_eq!(run.context().memoized_precondition_count(), 0);
}

#[test]
fn test_pipeline_applies_steps_in_dependency_order() {
    let _ = rewrite_engine::logging::init_logger(false, Some("warn"), false);
    let (sites, sources) = sources(16);

    // Second step only matches what the first step left behind
    let mut pipeline = RecipePipeline::new("Trim bar calls");
    pipeline.add_recipe("second", Arc::new(DeleteMethodArgument::new("*..* bar(..)", 0)), &["first"]);
    pipeline.add_recipe("first", Arc::new(DeleteMethodArgument::new("*..* bar(..)", 1)), &[]);

    let result = RecipeRun::new(Arc::new(pipeline), RunConfig::sequential()).run(&sources).unwrap();
    for (site, after) in sites.iter().zip(&result.results) {
        let expected = match site.name {
            Some(_) => site.without_argument(1).without_argument(0),
            None => site.clone(),
        };
        assert_eq!(after.after.as_ref().unwrap().print(), expected.compilation_unit_source());
    }
}

#[test]
fn test_pipeline_runs_across_languages() {
    let maven = SourceFile::Maven(MavenDocument::resolve(
        pom_document(&[("junit.version", "4.12")]),
        Arc::new(OfflineDownloader),
    ));
    let (_, mut sources) = sources(2);
    sources.push(maven);

    let mut pipeline = RecipePipeline::new("Upgrade");
    pipeline.add_recipe("junit", Arc::new(ChangePropertyValue::new("junit.version", "4.13")), &[]);
    pipeline.add_recipe("calls", Arc::new(DeleteMethodArgument::new("com.nowhere.Nope bar(..)", 0)), &["junit"]);

    let result = RecipeRun::new(Arc::new(pipeline), RunConfig::sequential()).run(&sources).unwrap();
    let changed: Vec<&str> = result.changed().map(|r| r.before.language()).collect();
    assert_eq!(changed, vec!["maven"]);
}

#[test]
fn test_validation_reports_every_problem() {
    let mut pipeline = RecipePipeline::new("Broken");
    pipeline.add_recipe("empty", Arc::new(DeleteMethodArgument::new("", 0)), &[]);
    pipeline.add_recipe("malformed", Arc::new(DeleteMethodArgument::new("com.acme.Foo bar(", 0)), &[]);

    let (_, sources) = sources(1);
    match RecipeRun::new(Arc::new(pipeline), RunConfig::sequential()).run(&sources) {
        Err(RunError::Validation(errors)) => {
            let options: Vec<&str> = errors.iter().map(|e| e.option.as_str()).collect();
            assert_eq!(options, vec!["methodPattern", "methodPattern", "methodPattern"]);
        }
        other => panic!("expected validation errors, got {:?}", other.map(|r| r.results.len())),
    }
}

#[test]
fn test_pipeline_cycle_is_a_validation_error() {
    let mut pipeline = RecipePipeline::new("Cyclic");
    pipeline.add_recipe("a", Arc::new(ChangePropertyValue::new("a", "1")), &["b"]);
    pipeline.add_recipe("b", Arc::new(ChangePropertyValue::new("b", "1")), &["a"]);

    assert!(matches!(pipeline.ordered(), Err(RunError::Cycle(_))));
    let result = RecipeRun::new(Arc::new(pipeline), RunConfig::sequential()).run(&[]);
    assert!(matches!(result, Err(RunError::Validation(_))));
}

#[test]
fn test_recipe_from_json_options() {
    let recipe: DeleteMethodArgument =
        from_options(json!({"methodPattern": "com.acme.Foo bar(int)", "argumentIndex": 0, "fallback": "name_only"}))
            .unwrap();
    assert_eq!(recipe.fallback, rewrite_engine::search::FallbackPolicy::NameOnly);

    let missing: Result<DeleteMethodArgument, _> = from_options(json!({"methodPattern": "com.acme.Foo bar(int)"}));
    assert!(matches!(missing, Err(RunError::Options(_))));
}
