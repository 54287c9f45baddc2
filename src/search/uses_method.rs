use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use tracing::debug;

use super::method_matcher::MethodMatcher;
use super::preconditions::Precondition;
use crate::ir::java_node::{CompilationUnit, J};
use crate::ir::visitor::{JavaVisitor, SourceFile, reduce};
use crate::recipe::execution::ExecutionContext;

/// Applies to Java sources containing a call that matches a signature pattern.
#[derive(Debug, Clone)]
pub struct UsesMethod {
    matcher: Arc<MethodMatcher>,
}

impl UsesMethod {
    pub fn new(matcher: Arc<MethodMatcher>) -> Self {
        UsesMethod { matcher }
    }

    pub fn matcher(&self) -> &Arc<MethodMatcher> {
        &self.matcher
    }

    /// Whether `cu` calls a matching method, stopping at the first hit or on cancellation.
    pub fn scan(&self, cu: &Arc<CompilationUnit>, cancelled: &AtomicBool) -> bool {
        let mut scanner = CallScanner { matcher: &self.matcher, cancelled, found: false };
        reduce(&mut scanner, &J::CompilationUnit(Arc::clone(cu)), ());
        scanner.found
    }
}

impl Precondition for UsesMethod {
    fn key(&self) -> String {
        format!(
            "uses-method({}, overrides={}, fallback={:?})",
            self.matcher.pattern(),
            self.matcher.match_overrides(),
            self.matcher.fallback()
        )
    }

    fn applies(&self, source: &SourceFile, ctx: &mut ExecutionContext) -> bool {
        let Some(cu) = source.as_java() else {
            return false;
        };
        let cancelled = ctx.cancellation_flag();
        let found = self.scan(cu, &cancelled);
        debug!("{} uses {}: {}", cu.source_path.display(), self.matcher.pattern(), found);
        found && !cancelled.load(Ordering::Relaxed)
    }
}

struct CallScanner<'a> {
    matcher: &'a MethodMatcher,
    cancelled: &'a AtomicBool,
    found: bool,
}

impl JavaVisitor<()> for CallScanner<'_> {
    fn pre_visit(&mut self, tree: &J, _p: &mut ()) -> bool {
        if self.found || self.cancelled.load(Ordering::Relaxed) {
            return false;
        }
        if matches!(tree, J::MethodInvocation(_) | J::NewClass(_)) && self.matcher.matches(tree) {
            self.found = true;
        }
        !self.found
    }
}
