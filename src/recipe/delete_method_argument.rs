use std::sync::Arc;

use serde::{Deserialize, Serialize};
use tracing::{debug, trace, warn};
use validated::Validated;

use super::execution::ExecutionContext;
use super::{OptionDescriptor, Recipe, validate_method_pattern, validate_required};
use crate::error::ValidationError;
use crate::ir::cursor::Cursor;
use crate::ir::java_node::*;
use crate::ir::visitor::{
    JavaSource, JavaVisitor, Noop, TreeVisitor, reduce, walk_method_invocation, walk_new_class,
};
use crate::search::method_matcher::{FallbackPolicy, MethodMatcher};
use crate::search::preconditions::Preconditions;
use crate::search::uses_method::UsesMethod;

/// Deletes the argument at `argument_index` from every call matching `method_pattern`.
///
/// Calls with fewer arguments are left alone. Types referenced only by the
/// deleted argument are reported through [`ExecutionContext::maybe_remove_import`],
/// and the call's method type loses the matching parameter, so a second run no
/// longer matches a pattern written for the old arity.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DeleteMethodArgument {
    pub method_pattern: String,
    /// Zero-based.
    pub argument_index: usize,
    #[serde(default)]
    pub fallback: FallbackPolicy,
}

impl DeleteMethodArgument {
    pub fn new(method_pattern: impl Into<String>, argument_index: usize) -> Self {
        DeleteMethodArgument { method_pattern: method_pattern.into(), argument_index, fallback: FallbackPolicy::default() }
    }

    pub fn with_fallback(self, fallback: FallbackPolicy) -> Self {
        DeleteMethodArgument { fallback, ..self }
    }
}

impl Recipe for DeleteMethodArgument {
    fn name(&self) -> &'static str {
        "java.DeleteMethodArgument"
    }

    fn display_name(&self) -> String {
        "Delete method argument".to_string()
    }

    fn description(&self) -> String {
        "Delete an argument from method invocations.".to_string()
    }

    fn instance_name(&self) -> String {
        format!("{} {} in methods `{}`", self.display_name(), self.argument_index, self.method_pattern)
    }

    fn options(&self) -> Vec<OptionDescriptor> {
        vec![
            OptionDescriptor::new(
                "methodPattern",
                "Method pattern",
                "A method pattern that is used to find matching method invocations.",
                &self.method_pattern,
            )
            .with_example("com.yourorg.A foo(int, int)"),
            OptionDescriptor::new(
                "argumentIndex",
                "Argument index",
                "A zero-based index that indicates which argument will be removed from the method invocation.",
                &self.argument_index,
            )
            .with_example("0"),
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
            Box::new(JavaSource(DeleteArgument { matcher, index: self.argument_index })),
        )
    }
}

struct DeleteArgument {
    matcher: Arc<MethodMatcher>,
    index: usize,
}

impl DeleteArgument {
    fn delete_from<C: MethodCall>(&self, call: Arc<C>, ctx: &mut ExecutionContext) -> Arc<C> {
        if !self.matcher.matches_call(call.as_ref()) {
            return call;
        }
        let count = call.real_arguments().len();
        if count < self.index + 1 {
            trace!("{} has {} argument(s); no argument {} to delete", call.call_name(), count, self.index);
            return call;
        }

        let mut arguments: Vec<RightPadded<J>> = call.arguments().padding().cloned().collect();
        let removed = arguments.remove(self.index).element;
        if arguments.is_empty() {
            arguments.push(RightPadded::build(J::Empty(Empty::build(Space::EMPTY))));
        } else if self.index == 0 {
            let first = arguments[0].element.with_prefix(removed.prefix().clone());
            arguments[0] = arguments[0].clone().with_element(first);
        }
        let arguments = call.arguments().with_padded(arguments.into_iter().collect());
        let mut updated = call.with_call_arguments(arguments);
        debug!("Deleted argument {} of {}", self.index, call.call_name());

        for name in reduce(&mut ImportCandidates, &removed, Vec::new()) {
            ctx.maybe_remove_import(name);
        }

        if let Some(method_type) = updated.method_type().cloned() {
            let method_type = Arc::new(without_parameter(&method_type, self.index));
            updated = updated.with_call_method_type(Some(method_type));
        }
        updated
    }
}

impl JavaVisitor<ExecutionContext> for DeleteArgument {
    fn visit_method_invocation(
        &mut self,
        node: &Arc<MethodInvocation>,
        ctx: &mut ExecutionContext,
        cursor: &mut Cursor<J>,
    ) -> Option<J> {
        let visited = walk_method_invocation(node, ctx, cursor, &mut |tree: &J, p: &mut ExecutionContext, c: &mut Cursor<J>| {
            self.visit(tree, p, c)
        });
        let updated = self.delete_from(Arc::clone(&visited), ctx);
        if Arc::ptr_eq(&updated, &visited) {
            return Some(J::MethodInvocation(updated));
        }
        // The name carries the method type too when it is attributed
        let updated = match (&updated.method_type, &updated.name.ty) {
            (Some(method_type), Some(_)) => {
                let name = updated.name.with_type(Some(JavaType::Method(Arc::clone(method_type))));
                updated.with_name(name)
            }
            _ => updated,
        };
        Some(J::MethodInvocation(updated))
    }

    fn visit_new_class(&mut self, node: &Arc<NewClass>, ctx: &mut ExecutionContext, cursor: &mut Cursor<J>) -> Option<J> {
        let visited = walk_new_class(node, ctx, cursor, &mut |tree: &J, p: &mut ExecutionContext, c: &mut Cursor<J>| {
            self.visit(tree, p, c)
        });
        Some(J::NewClass(self.delete_from(visited, ctx)))
    }
}

fn without_parameter(method_type: &MethodType, index: usize) -> MethodType {
    let mut names = method_type.parameter_names.clone();
    if index < names.len() {
        names.remove(index);
    }
    let mut types = method_type.parameter_types.clone();
    if index < types.len() {
        types.remove(index);
    }
    method_type.with_parameter_names(names).with_parameter_types(types)
}

/// Collects fully-qualified names a subtree may be importing: classes outside
/// `java.lang`, static fields and static methods called without a receiver.
struct ImportCandidates;

fn add_candidate(names: &mut Vec<String>, name: String) {
    if !names.contains(&name) {
        names.push(name);
    }
}

impl JavaVisitor<Vec<String>> for ImportCandidates {
    fn visit_type(&mut self, ty: &JavaType, names: &mut Vec<String>) {
        match ty {
            JavaType::Class(class) if class.package_name() != "java.lang" => {
                add_candidate(names, class.fully_qualified_name.clone());
            }
            JavaType::Variable(variable) if variable.has_flags(Flags::STATIC) => {
                if let Some(JavaType::Class(owner)) = &variable.owner {
                    add_candidate(names, format!("{}.{}", owner.fully_qualified_name, variable.name));
                }
            }
            _ => {}
        }
    }

    fn visit_method_invocation(
        &mut self,
        node: &Arc<MethodInvocation>,
        names: &mut Vec<String>,
        cursor: &mut Cursor<J>,
    ) -> Option<J> {
        if let Some(method_type) = &node.method_type {
            if method_type.has_flags(Flags::STATIC) && node.select.is_none() {
                add_candidate(names, format!("{}.{}", method_type.declaring_type.fully_qualified_name, node.simple_name()));
            }
        }
        Some(J::MethodInvocation(walk_method_invocation(
            node,
            names,
            cursor,
            &mut |tree: &J, p: &mut Vec<String>, c: &mut Cursor<J>| self.visit(tree, p, c),
        )))
    }
}
