use std::sync::Arc;

use tracing::{debug, trace};

use crate::ir::visitor::{SourceFile, TreeVisitor, Visited};
use crate::recipe::execution::ExecutionContext;

/// A read-only test of whether a recipe has anything to do in a source file.
pub trait Precondition: Send + Sync {
    /// Identity of this test for memoisation; equal keys must give equal answers.
    fn key(&self) -> String;

    fn applies(&self, source: &SourceFile, ctx: &mut ExecutionContext) -> bool;
}

/// Combinators gating a visitor on a [`Precondition`].
pub struct Preconditions;

impl Preconditions {
    /// Runs `action` only on sources where `scan` applies.
    ///
    /// Elsewhere the source comes back untouched, so callers can detect the
    /// short-circuit with [`SourceFile::is_same_tree`].
    pub fn check(
        scan: Arc<dyn Precondition>,
        action: Box<dyn TreeVisitor<ExecutionContext>>,
    ) -> Box<dyn TreeVisitor<ExecutionContext>> {
        Box::new(Check { scan, action })
    }

    pub fn or(left: Arc<dyn Precondition>, right: Arc<dyn Precondition>) -> Arc<dyn Precondition> {
        Arc::new(Or(left, right))
    }

    pub fn and(left: Arc<dyn Precondition>, right: Arc<dyn Precondition>) -> Arc<dyn Precondition> {
        Arc::new(And(left, right))
    }

    pub fn not(inner: Arc<dyn Precondition>) -> Arc<dyn Precondition> {
        Arc::new(Not(inner))
    }

    /// Evaluates `scan`, reusing an earlier answer for this exact tree.
    ///
    /// Answers given after cancellation are not remembered.
    pub fn applies(scan: &dyn Precondition, source: &SourceFile, ctx: &mut ExecutionContext) -> bool {
        let key = scan.key();
        if let Some(applies) = ctx.memoized_precondition(&key, source) {
            trace!("Precondition {} memoized for {}", key, source.source_path().display());
            return applies;
        }
        let applies = scan.applies(source, ctx);
        if ctx.is_cancelled() {
            debug!("Precondition {} cancelled on {}", key, source.source_path().display());
            return false;
        }
        ctx.memoize_precondition(&key, source, applies);
        applies
    }
}

struct Check {
    scan: Arc<dyn Precondition>,
    action: Box<dyn TreeVisitor<ExecutionContext>>,
}

impl TreeVisitor<ExecutionContext> for Check {
    fn visit_source(&mut self, source: &SourceFile, ctx: &mut ExecutionContext) -> Visited {
        if Preconditions::applies(self.scan.as_ref(), source, ctx) {
            self.action.visit_source(source, ctx)
        } else {
            Visited::Tree(source.clone())
        }
    }
}

struct Or(Arc<dyn Precondition>, Arc<dyn Precondition>);

impl Precondition for Or {
    fn key(&self) -> String {
        format!("or({}, {})", self.0.key(), self.1.key())
    }

    fn applies(&self, source: &SourceFile, ctx: &mut ExecutionContext) -> bool {
        Preconditions::applies(self.0.as_ref(), source, ctx) || Preconditions::applies(self.1.as_ref(), source, ctx)
    }
}

struct And(Arc<dyn Precondition>, Arc<dyn Precondition>);

impl Precondition for And {
    fn key(&self) -> String {
        format!("and({}, {})", self.0.key(), self.1.key())
    }

    fn applies(&self, source: &SourceFile, ctx: &mut ExecutionContext) -> bool {
        Preconditions::applies(self.0.as_ref(), source, ctx) && Preconditions::applies(self.1.as_ref(), source, ctx)
    }
}

struct Not(Arc<dyn Precondition>);

impl Precondition for Not {
    fn key(&self) -> String {
        format!("not({})", self.0.key())
    }

    fn applies(&self, source: &SourceFile, ctx: &mut ExecutionContext) -> bool {
        // A cancelled inner scan answers false, which must not flip to a match
        let inner = Preconditions::applies(self.0.as_ref(), source, ctx);
        !inner && !ctx.is_cancelled()
    }
}
