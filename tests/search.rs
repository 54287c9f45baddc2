use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

use rewrite_engine::config::RunConfig;
use rewrite_engine::ir::java_node::*;
use rewrite_engine::ir::markers::SearchResult;
use rewrite_engine::ir::visitor::{SourceFile, Visited, accept};
use rewrite_engine::maven::{MavenDocument, OfflineDownloader};
use rewrite_engine::recipe::{ExecutionContext, RecipeRun};
use rewrite_engine::search::{FallbackPolicy, FindMethods, MethodMatcher, Precondition, Preconditions, UsesMethod};
use test_utils::ir::builders::*;

fn int() -> JavaType {
    JavaType::Primitive(Primitive::Int)
}

fn foo() -> Arc<ClassType> {
    class_type("com.acme.Foo")
}

fn sub_foo() -> Arc<ClassType> {
    Arc::new(ClassType::new("com.acme.SubFoo").with_supertype(foo()))
}

/// `receiver.bar(1, "x")` declared on `declaring`.
fn bar_call(receiver: &Arc<ClassType>, declaring: &Arc<ClassType>, second: J, second_type: JavaType) -> J {
    let select = typed_identifier("it", JavaType::Class(Arc::clone(receiver)));
    let method = method_type(declaring, "bar", &[int(), second_type]);
    invocation(Some(select), "bar", vec![int_literal("1"), with_prefix(second, " ")], Some(method))
}

#[test]
fn test_matches_declared_and_inherited_calls() {
    let matcher = MethodMatcher::new("com.acme.Foo bar(int, String)").unwrap();
    let string = JavaType::class("java.lang.String");

    assert!(matcher.matches(&bar_call(&foo(), &foo(), string_literal("x"), string.clone())));
    // Called through a subclass but declared on Foo
    assert!(matcher.matches(&bar_call(&sub_foo(), &foo(), string_literal("x"), string.clone())));
    assert!(!matcher.matches(&bar_call(&foo(), &foo(), int_literal("2"), int())));

    // An override declared on the subclass matches through the supertype walk
    let overridden = bar_call(&sub_foo(), &sub_foo(), string_literal("x"), string);
    assert!(matcher.matches(&overridden));
    assert!(!matcher.with_match_overrides(false).matches(&overridden));
}

#[test]
fn test_uses_method_scan_stops_on_cancellation() {
    let call = bar_call(&foo(), &foo(), int_literal("2"), int());
    let cu = compilation_unit(&[], vec![call]);
    let uses = UsesMethod::new(Arc::new(MethodMatcher::new("com.acme.Foo bar(int, int)").unwrap()));

    let running = std::sync::atomic::AtomicBool::new(false);
    assert!(uses.scan(&cu, &running));
    let cancelled = std::sync::atomic::AtomicBool::new(true);
    assert!(!uses.scan(&cu, &cancelled));
}

#[test]
fn test_uses_method_ignores_non_java_sources() {
    let maven = MavenDocument::resolve(pom_document(&[]), Arc::new(OfflineDownloader));
    let uses = UsesMethod::new(Arc::new(MethodMatcher::new("*..* *(..)").unwrap()));
    let mut ctx = ExecutionContext::default();
    assert!(!uses.applies(&SourceFile::Maven(maven), &mut ctx));
}

#[test]
fn test_find_methods_marks_only_matches() {
    let _ = rewrite_engine::logging::init_logger(false, Some("warn"), false);
    let calls = vec![
        bar_call(&foo(), &foo(), int_literal("2"), int()),
        invocation(None, "other", vec![], Some(method_type(&foo(), "other", &[]))),
    ];
    let source = SourceFile::Java(compilation_unit(&[], calls));

    let run = RecipeRun::new(Arc::new(FindMethods::new("com.acme.Foo bar(..)")), RunConfig::sequential());
    let result = run.run(std::slice::from_ref(&source)).unwrap();
    let after = result.results[0].after.as_ref().unwrap();

    // Markers do not print
    assert_eq!(after.print(), source.print());
    let marked: Vec<bool> = statements(after.as_java().unwrap())
        .iter()
        .map(|s| s.markers().contains::<SearchResult>())
        .collect();
    assert_eq!(marked, vec![true, false]);
}

struct CountingScan {
    scans: Arc<AtomicUsize>,
}

impl Precondition for CountingScan {
    fn key(&self) -> String {
        "counting".to_string()
    }

    fn applies(&self, _source: &SourceFile, _ctx: &mut ExecutionContext) -> bool {
        self.scans.fetch_add(1, Ordering::SeqCst);
        false
    }
}

#[test]
fn test_precondition_short_circuit_is_pointer_equal_and_memoized() {
    let scans = Arc::new(AtomicUsize::new(0));
    let scan: Arc<dyn Precondition> = Arc::new(CountingScan { scans: Arc::clone(&scans) });
    let source = SourceFile::Java(compilation_unit(&[], vec![int_literal("1")]));
    let mut ctx = ExecutionContext::default();

    for _ in 0..3 {
        let mut visitor = Preconditions::check(Arc::clone(&scan), Box::new(rewrite_engine::ir::visitor::Noop));
        let Visited::Tree(after) = accept(&source, visitor.as_mut(), &mut ctx.fork()) else {
            panic!("a failed precondition keeps the source");
        };
        assert!(after.is_same_tree(&source));
    }
    assert_eq!(scans.load(Ordering::SeqCst), 1);

    // A different allocation of the same file is scanned again
    let copy = SourceFile::Java(Arc::new((**source.as_java().unwrap()).clone()));
    assert!(!Preconditions::applies(scan.as_ref(), &copy, &mut ctx));
    assert_eq!(scans.load(Ordering::SeqCst), 2);
}

#[test]
fn test_unattributed_declaration_without_parameters_matches_by_name() {
    let cu = compilation_unit(&[], vec![int_literal("1")]);
    let declaration = cu.classes[0].body.statements[0].element.clone();
    let J::MethodDeclaration(method) = &declaration else {
        panic!("class body should hold the method");
    };
    // Empty parameter lists hold the same placeholder as empty argument lists
    assert!(method.parameters.elements()[0].is_empty_placeholder());
    assert!(method.real_parameters().is_empty());

    let matcher = MethodMatcher::new("*..* m()").unwrap().with_fallback(FallbackPolicy::NameOnly);
    assert!(matcher.matches(&declaration));
    assert!(!matcher.with_fallback(FallbackPolicy::FailClosed).matches(&declaration));
}
