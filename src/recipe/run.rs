use std::sync::Arc;

use rayon::prelude::*;
use tracing::{debug, info, trace, warn};
use validated::Validated;

use super::Recipe;
use super::execution::ExecutionContext;
use crate::config::RunConfig;
use crate::error::RunError;
use crate::ir::visitor::{SourceFile, Visited, accept};

/// What one recipe run did to one source file.
#[derive(Debug, Clone)]
pub struct SourceResult {
    pub before: SourceFile,
    /// `None` when the recipe deleted the file.
    pub after: Option<SourceFile>,
    /// Imports the recipe asked to drop, already handed to the import remover.
    pub import_requests: Vec<String>,
}

impl SourceResult {
    pub fn is_changed(&self) -> bool {
        match &self.after {
            Some(after) => !after.is_same_tree(&self.before),
            None => true,
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct RunResult {
    /// One entry per input source, in input order.
    pub results: Vec<SourceResult>,
    /// Set when the run stopped early and `fail_on_cancel` was off.
    pub cancelled: bool,
}

impl RunResult {
    pub fn changed(&self) -> impl Iterator<Item = &SourceResult> {
        self.results.iter().filter(|r| r.is_changed())
    }
}

/// Applies a recipe, and then its recipe list, to a batch of source files.
pub struct RecipeRun {
    recipe: Arc<dyn Recipe>,
    config: RunConfig,
    ctx: ExecutionContext,
}

impl RecipeRun {
    pub fn new(recipe: Arc<dyn Recipe>, config: RunConfig) -> Self {
        RecipeRun { recipe, config, ctx: ExecutionContext::default() }
    }

    /// Uses `ctx` as the root every per-source context is forked from.
    pub fn with_context(self, ctx: ExecutionContext) -> Self {
        RecipeRun { ctx, ..self }
    }

    /// The root context; cancelling it stops every worker.
    pub fn context(&self) -> &ExecutionContext {
        &self.ctx
    }

    /// Validates the recipe, then visits every source.
    ///
    /// Nothing is visited when validation fails.
    pub fn run(&self, sources: &[SourceFile]) -> Result<RunResult, RunError> {
        if let Validated::Fail(errors) = self.recipe.validate_all() {
            let errors: Vec<_> = errors.into_iter().collect();
            for error in &errors {
                warn!("{}", error);
            }
            return Err(RunError::Validation(errors));
        }

        info!("Running {} on {} source file(s)", self.recipe.instance_name(), sources.len());
        let results: Vec<SourceResult> = if self.config.parallel {
            let pool = rayon::ThreadPoolBuilder::new().num_threads(self.config.max_threads.unwrap_or(0)).build()?;
            pool.install(|| sources.par_iter().map(|source| self.run_source(source)).collect())
        } else {
            sources.iter().map(|source| self.run_source(source)).collect()
        };

        self.ctx.prune_precondition_memo();

        let cancelled = self.ctx.is_cancelled();
        if cancelled {
            if self.config.fail_on_cancel {
                return Err(RunError::Cancelled);
            }
            warn!("Run of {} was cancelled; returning partial results", self.recipe.instance_name());
        }
        let result = RunResult { results, cancelled };
        info!("{} changed {} of {} source file(s)", self.recipe.instance_name(), result.changed().count(), sources.len());
        Ok(result)
    }

    fn run_source(&self, source: &SourceFile) -> SourceResult {
        let mut ctx = self.ctx.fork();
        let mut after = apply(self.recipe.as_ref(), Some(source.clone()), &mut ctx);

        let import_requests = ctx.take_import_requests();
        if let Some(SourceFile::Java(cu)) = &after {
            if !import_requests.is_empty() {
                let cleaned = ctx.import_remover().remove_unused(cu, &import_requests);
                after = Some(SourceFile::Java(cleaned));
            }
        }
        SourceResult { before: source.clone(), after, import_requests }
    }
}

fn apply(recipe: &dyn Recipe, source: Option<SourceFile>, ctx: &mut ExecutionContext) -> Option<SourceFile> {
    let source = source?;
    if ctx.is_cancelled() {
        trace!("Skipping {} on {}: cancelled", recipe.name(), source.source_path().display());
        return Some(source);
    }
    let mut visitor = recipe.visitor();
    let mut after = match accept(&source, visitor.as_mut(), ctx) {
        Visited::Tree(tree) => Some(tree),
        Visited::Deleted => {
            debug!("{} deleted {}", recipe.name(), source.source_path().display());
            None
        }
        Visited::Unsupported => Some(source),
    };
    for child in recipe.recipe_list() {
        after = apply(child.as_ref(), after, ctx);
    }
    after
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ValidationError;
    use crate::recipe::OptionDescriptor;

    struct Invalid;

    impl Recipe for Invalid {
        fn name(&self) -> &'static str {
            "test.Invalid"
        }

        fn display_name(&self) -> String {
            "Invalid".to_string()
        }

        fn description(&self) -> String {
            String::new()
        }

        fn options(&self) -> Vec<OptionDescriptor> {
            vec![OptionDescriptor::new("pattern", "Pattern", "", &Option::<String>::None)]
        }
    }

    #[test]
    fn test_validation_failure_visits_nothing() {
        let run = RecipeRun::new(Arc::new(Invalid), RunConfig::sequential());
        match run.run(&[]) {
            Err(RunError::Validation(errors)) => {
                assert_eq!(errors, vec![ValidationError::required("test.Invalid", "pattern")]);
            }
            other => panic!("expected validation failure, got {:?}", other.map(|r| r.results.len())),
        }
    }

    #[test]
    fn test_cancelled_run() {
        let run = RecipeRun::new(Arc::new(super::super::RecipePipeline::new("empty")), RunConfig::sequential());
        run.context().cancel();
        assert!(matches!(run.run(&[]), Err(RunError::Cancelled)));

        let lenient = RunConfig { fail_on_cancel: false, ..RunConfig::sequential() };
        let run = RecipeRun::new(Arc::new(super::super::RecipePipeline::new("empty")), lenient);
        run.context().cancel();
        assert!(run.run(&[]).unwrap().cancelled);
    }
}
