//! Recipes: named, configured transformations.
//!
//! A recipe is an immutable value. It validates its own options, describes them
//! for external runners and hands out a fresh [`TreeVisitor`] for every source
//! file it runs on, so no traversal state outlives one file.
//!
//! - `execution`: [`ExecutionContext`], the per-source state visitors share
//! - `pipeline`: [`RecipePipeline`], dependency-ordered composition
//! - `run`: [`RecipeRun`], validating and applying a recipe to a batch of sources
//! - `delete_method_argument`: the [`DeleteMethodArgument`] recipe

use std::sync::Arc;

use serde::de::DeserializeOwned;
use serde::Serialize;
use validated::Validated;

use crate::error::{RunError, ValidationError};
use crate::ir::visitor::{Noop, TreeVisitor};
use crate::search::method_matcher::MethodMatcher;

pub mod delete_method_argument;
pub mod execution;
pub mod pipeline;
pub mod run;

pub use delete_method_argument::DeleteMethodArgument;
pub use execution::{ExecutionContext, ImportRemover, KeepImports};
pub use pipeline::RecipePipeline;
pub use run::{RecipeRun, RunResult, SourceResult};

/// Schema and current value of one recipe option.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct OptionDescriptor {
    pub name: String,
    pub display_name: String,
    pub description: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub example: Option<String>,
    pub value: serde_json::Value,
    pub required: bool,
}

impl OptionDescriptor {
    /// A required option holding `value`.
    pub fn new(
        name: impl Into<String>,
        display_name: impl Into<String>,
        description: impl Into<String>,
        value: &impl Serialize,
    ) -> Self {
        OptionDescriptor {
            name: name.into(),
            display_name: display_name.into(),
            description: description.into(),
            example: None,
            value: serde_json::to_value(value).unwrap_or(serde_json::Value::Null),
            required: true,
        }
    }

    pub fn with_example(mut self, example: impl Into<String>) -> Self {
        self.example = Some(example.into());
        self
    }

    pub fn optional(mut self) -> Self {
        self.required = false;
        self
    }

    /// Null values and empty strings count as unset.
    pub fn is_set(&self) -> bool {
        match &self.value {
            serde_json::Value::Null => false,
            serde_json::Value::String(s) => !s.trim().is_empty(),
            _ => true,
        }
    }
}

/// Identity of a configured recipe: its name, options and sub-recipes.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RecipeDescriptor {
    pub name: String,
    pub display_name: String,
    pub description: String,
    pub options: Vec<OptionDescriptor>,
    pub recipe_list: Vec<RecipeDescriptor>,
}

pub trait Recipe: Send + Sync {
    /// Stable identifier, `language.RecipeName`.
    fn name(&self) -> &'static str;

    fn display_name(&self) -> String;

    fn description(&self) -> String;

    /// Display name qualified by the configured options.
    fn instance_name(&self) -> String {
        self.display_name()
    }

    fn options(&self) -> Vec<OptionDescriptor> {
        Vec::new()
    }

    /// Checks this recipe's own options; the default requires every required option to be set.
    fn validate(&self) -> Validated<(), ValidationError> {
        validate_required(self)
    }

    /// A fresh visitor for one source file.
    fn visitor(&self) -> Box<dyn TreeVisitor<ExecutionContext>> {
        Box::new(Noop)
    }

    /// Recipes run after this one, in order, on each source.
    fn recipe_list(&self) -> Vec<Arc<dyn Recipe>> {
        Vec::new()
    }

    /// Validation of this recipe and, recursively, of its whole recipe list.
    fn validate_all(&self) -> Validated<(), ValidationError> {
        std::iter::once(self.validate())
            .chain(self.recipe_list().iter().map(|recipe| recipe.validate_all()))
            .collect::<Validated<Vec<()>, ValidationError>>()
            .map(|_| ())
    }

    fn descriptor(&self) -> RecipeDescriptor {
        RecipeDescriptor {
            name: self.name().to_string(),
            display_name: self.display_name(),
            description: self.description(),
            options: self.options(),
            recipe_list: self.recipe_list().iter().map(|recipe| recipe.descriptor()).collect(),
        }
    }
}

/// One failure per required option that is not set.
pub fn validate_required<R: Recipe + ?Sized>(recipe: &R) -> Validated<(), ValidationError> {
    recipe
        .options()
        .into_iter()
        .map(|option| {
            if option.required && !option.is_set() {
                Validated::fail(ValidationError::required(recipe.name(), option.name))
            } else {
                Validated::Good(())
            }
        })
        .collect::<Validated<Vec<()>, ValidationError>>()
        .map(|_| ())
}

/// One failure per problem in a method pattern option.
pub fn validate_method_pattern(recipe: &str, option: &str, pattern: &str) -> Validated<(), ValidationError> {
    match MethodMatcher::validate(pattern) {
        Validated::Good(_) => Validated::Good(()),
        Validated::Fail(errors) => errors
            .into_iter()
            .map(|error| Validated::<(), ValidationError>::fail(ValidationError::pattern(recipe, option, &error)))
            .collect::<Validated<Vec<()>, ValidationError>>()
            .map(|_| ()),
    }
}

/// Reads a recipe's options from JSON, as external runners supply them.
pub fn from_options<R: Recipe + DeserializeOwned>(options: serde_json::Value) -> Result<R, RunError> {
    Ok(serde_json::from_value(options)?)
}

#[cfg(test)]
mod tests {
    use super::*;

    struct Named {
        label: String,
    }

    impl Recipe for Named {
        fn name(&self) -> &'static str {
            "test.Named"
        }

        fn display_name(&self) -> String {
            "Named".to_string()
        }

        fn description(&self) -> String {
            "Does nothing.".to_string()
        }

        fn options(&self) -> Vec<OptionDescriptor> {
            vec![OptionDescriptor::new("label", "Label", "Any label.", &self.label)]
        }
    }

    struct Composite(Vec<Arc<dyn Recipe>>);

    impl Recipe for Composite {
        fn name(&self) -> &'static str {
            "test.Composite"
        }

        fn display_name(&self) -> String {
            "Composite".to_string()
        }

        fn description(&self) -> String {
            "Runs its children.".to_string()
        }

        fn recipe_list(&self) -> Vec<Arc<dyn Recipe>> {
            self.0.clone()
        }
    }

    #[test]
    fn test_required_option_must_be_set() {
        assert!(matches!(Named { label: "x".to_string() }.validate(), Validated::Good(())));
        let Validated::Fail(errors) = Named { label: " ".to_string() }.validate() else {
            panic!("blank label should fail");
        };
        let errors: Vec<_> = errors.into_iter().collect();
        assert_eq!(errors, vec![ValidationError::required("test.Named", "label")]);
        assert_eq!(errors[0].to_string(), "test.Named: option `label` is required");
    }

    #[test]
    fn test_validation_aggregates_over_recipe_list() {
        let composite = Composite(vec![
            Arc::new(Named { label: String::new() }),
            Arc::new(Named { label: "ok".to_string() }),
            Arc::new(Named { label: String::new() }),
        ]);
        let Validated::Fail(errors) = composite.validate_all() else {
            panic!("two children are invalid");
        };
        assert_eq!(errors.into_iter().count(), 2);
    }

    #[test]
    fn test_pattern_validation_reports_each_problem() {
        let Validated::Fail(errors) = validate_method_pattern("test.Named", "methodPattern", "a.B c-d(.., int)") else {
            panic!("pattern should be invalid");
        };
        assert_eq!(errors.into_iter().count(), 2);
    }

    #[test]
    fn test_descriptor_serializes_for_runners() {
        let descriptor = Composite(vec![Arc::new(Named { label: "x".to_string() })]).descriptor();
        let json = serde_json::to_value(&descriptor).unwrap();
        assert_eq!(json["recipeList"][0]["options"][0]["value"], "x");
        assert_eq!(json["recipeList"][0]["options"][0]["displayName"], "Label");
        assert!(json["recipeList"][0]["options"][0].get("example").is_none());
    }
}
