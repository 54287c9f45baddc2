use std::sync::Arc;

use serde::{Deserialize, Serialize};
use tracing::{trace, warn};
use validated::Validated;

use super::method_matcher::{FallbackPolicy, MethodMatcher};
use super::preconditions::Preconditions;
use super::uses_method::UsesMethod;
use crate::error::ValidationError;
use crate::ir::cursor::Cursor;
use crate::ir::java_node::{J, MethodInvocation, NewClass};
use crate::ir::markers::SearchResult;
use crate::ir::visitor::{JavaSource, JavaVisitor, Noop, TreeVisitor, walk_method_invocation, walk_new_class};
use crate::recipe::{ExecutionContext, OptionDescriptor, Recipe, validate_method_pattern, validate_required};

/// Marks every call matching `method_pattern` with a [`SearchResult`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FindMethods {
    pub method_pattern: String,
    #[serde(default)]
    pub fallback: FallbackPolicy,
}

impl FindMethods {
    pub fn new(method_pattern: impl Into<String>) -> Self {
        FindMethods { method_pattern: method_pattern.into(), fallback: FallbackPolicy::default() }
    }
}

impl Recipe for FindMethods {
    fn name(&self) -> &'static str {
        "search.FindMethods"
    }

    fn display_name(&self) -> String {
        "Find method usages".to_string()
    }

    fn description(&self) -> String {
        "Find method calls by pattern.".to_string()
    }

    fn instance_name(&self) -> String {
        format!("Find method usages `{}`", self.method_pattern)
    }

    fn options(&self) -> Vec<OptionDescriptor> {
        vec![
            OptionDescriptor::new(
                "methodPattern",
                "Method pattern",
                "A method pattern that is used to find matching method invocations.",
                &self.method_pattern,
            )
            .with_example("java.util.List add(..)"),
            OptionDescriptor::new(
                "fallback",
                "Unattributed calls",
                "How calls without type attribution are matched.",
                &self.fallback,
            )
            .optional(),
        ]
    }

    fn validate(&self) -> Validated<(), ValidationError> {
        [validate_required(self), validate_method_pattern(self.name(), "methodPattern", &self.method_pattern)]
            .into_iter()
            .collect::<Validated<Vec<()>, ValidationError>>()
            .map(|_| ())
    }

    fn visitor(&self) -> Box<dyn TreeVisitor<ExecutionContext>> {
        let matcher = match MethodMatcher::new(&self.method_pattern) {
            Ok(matcher) => Arc::new(matcher.with_fallback(self.fallback)),
            Err(e) => {
                warn!("{}: {}", self.instance_name(), e);
                return Box::new(Noop);
            }
        };
        Preconditions::check(
            Arc::new(UsesMethod::new(Arc::clone(&matcher))),
            Box::new(JavaSource(MarkCalls { matcher })),
        )
    }
}

struct MarkCalls {
    matcher: Arc<MethodMatcher>,
}

impl MarkCalls {
    fn mark(&self, tree: J) -> J {
        if !self.matcher.matches(&tree) || tree.markers().contains::<SearchResult>() {
            return tree;
        }
        trace!("Found call matching {}", self.matcher.pattern());
        let markers = tree.markers().add(SearchResult::found(None));
        tree.with_markers(markers)
    }
}

impl JavaVisitor<ExecutionContext> for MarkCalls {
    fn visit_method_invocation(
        &mut self,
        node: &Arc<MethodInvocation>,
        ctx: &mut ExecutionContext,
        cursor: &mut Cursor<J>,
    ) -> Option<J> {
        let visited = walk_method_invocation(node, ctx, cursor, &mut |tree: &J, p: &mut ExecutionContext, c: &mut Cursor<J>| {
            self.visit(tree, p, c)
        });
        Some(self.mark(J::MethodInvocation(visited)))
    }

    fn visit_new_class(&mut self, node: &Arc<NewClass>, ctx: &mut ExecutionContext, cursor: &mut Cursor<J>) -> Option<J> {
        let visited = walk_new_class(node, ctx, cursor, &mut |tree: &J, p: &mut ExecutionContext, c: &mut Cursor<J>| {
            self.visit(tree, p, c)
        });
        Some(self.mark(J::NewClass(visited)))
    }
}
