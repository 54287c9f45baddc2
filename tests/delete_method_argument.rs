use std::sync::Arc;

use indoc::indoc;

use rewrite_engine::config::RunConfig;
use rewrite_engine::ir::java_node::*;
use rewrite_engine::ir::visitor::SourceFile;
use rewrite_engine::recipe::{DeleteMethodArgument, Recipe, RecipeRun, RunResult};
use rewrite_engine::search::FallbackPolicy;
use test_utils::ir::builders::*;

fn int() -> JavaType {
    JavaType::Primitive(Primitive::Int)
}

fn string() -> JavaType {
    JavaType::class("java.lang.String")
}

fn run(recipe: DeleteMethodArgument, sources: &[SourceFile]) -> RunResult {
    let _ = rewrite_engine::logging::init_logger(false, Some("warn"), false);
    RecipeRun::new(Arc::new(recipe), RunConfig::sequential()).run(sources).unwrap()
}

/// `foo(<args>)` on `com.acme.A`, attributed with the given parameter types.
fn foo_call(args: Vec<J>, parameters: &[JavaType]) -> J {
    let declaring = class_type("com.acme.A");
    invocation(None, "foo", args, Some(method_type(&declaring, "foo", parameters)))
}

#[test]
fn test_delete_first_argument_keeps_its_comment() {
    let call = foo_call(vec![with_prefix(int_literal("1"), "/*a*/ "), with_prefix(int_literal("2"), " ")], &[int(), int()]);
    let source = SourceFile::Java(compilation_unit(&[], vec![call]));

    let result = run(DeleteMethodArgument::new("com.acme.A foo(int, int)", 0), &[source]);
    let after = result.results[0].after.as_ref().unwrap();
    assert_eq!(
        after.print(),
        indoc! {"
            class A {
                void m() {
                    foo(/*a*/ 2);
                }
            }
        "}
    );

    let J::MethodInvocation(updated) = &statements(after.as_java().unwrap())[0] else {
        panic!("statement is no longer an invocation");
    };
    let method_type = updated.method_type.as_ref().unwrap();
    assert_eq!(method_type.parameter_types, vec![int()]);
    assert_eq!(method_type.parameter_names, vec!["arg1"]);
    assert_eq!(updated.name.ty.as_ref().and_then(JavaType::as_method), Some(method_type));
}

#[test]
fn test_delete_last_argument() {
    let call = foo_call(vec![int_literal("1"), with_prefix(string_literal("x"), " ")], &[int(), string()]);
    let source = SourceFile::Java(compilation_unit(&[], vec![call]));

    let result = run(DeleteMethodArgument::new("com.acme.A foo(int, String)", 1), &[source]);
    assert!(result.results[0].after.as_ref().unwrap().print().contains("foo(1);"));
}

#[test]
fn test_deleting_only_argument_leaves_placeholder() {
    let call = foo_call(vec![int_literal("1")], &[int()]);
    let source = SourceFile::Java(compilation_unit(&[], vec![call]));

    let result = run(DeleteMethodArgument::new("com.acme.A foo(int)", 0), &[source]);
    let after = result.results[0].after.as_ref().unwrap();
    assert!(after.print().contains("foo();"));

    let J::MethodInvocation(updated) = &statements(after.as_java().unwrap())[0] else {
        panic!("statement is no longer an invocation");
    };
    assert_eq!(updated.arguments.len(), 1);
    assert!(updated.arguments.elements()[0].is_empty_placeholder());
    assert_eq!(updated.method_type.as_ref().unwrap().arity(), 0);
}

#[test]
fn test_index_out_of_range_is_untouched() {
    let call = foo_call(vec![int_literal("1")], &[int()]);
    let source = SourceFile::Java(compilation_unit(&[], vec![call]));

    let result = run(DeleteMethodArgument::new("com.acme.A foo(..)", 3), std::slice::from_ref(&source));
    assert!(!result.results[0].is_changed());
    assert!(result.results[0].after.as_ref().unwrap().is_same_tree(&source));
}

#[test]
fn test_other_methods_are_untouched() {
    let calls = vec![
        foo_call(vec![int_literal("1"), with_prefix(int_literal("2"), " ")], &[int(), int()]),
        invocation(
            None,
            "bar",
            vec![int_literal("1"), with_prefix(int_literal("2"), " ")],
            Some(method_type(&class_type("com.acme.A"), "bar", &[int(), int()])),
        ),
    ];
    let source = SourceFile::Java(compilation_unit(&[], calls));

    let result = run(DeleteMethodArgument::new("com.acme.A foo(int, int)", 1), &[source]);
    assert_eq!(
        result.results[0].after.as_ref().unwrap().print(),
        indoc! {"
            class A {
                void m() {
                    foo(1);
                    bar(1, 2);
                }
            }
        "}
    );
}

#[test]
fn test_no_match_returns_input_allocation() {
    let call = foo_call(vec![int_literal("1")], &[int()]);
    let source = SourceFile::Java(compilation_unit(&["java.util.List"], vec![call]));

    let result = run(DeleteMethodArgument::new("com.acme.B foo(int)", 0), std::slice::from_ref(&source));
    let after = result.results[0].after.as_ref().unwrap();
    assert!(after.is_same_tree(&source));
    assert_eq!(
        after.print(),
        indoc! {"
            import java.util.List;

            class A {
                void m() {
                    foo(1);
                }
            }
        "}
    );
}

#[test]
fn test_constructor_argument_deleted() {
    let widget = class_type("com.acme.Widget");
    let call = new_class(
        &widget,
        vec![string_literal("name"), with_prefix(int_literal("3"), " ")],
        Some(constructor_type(&widget, &[string(), int()])),
    );
    let source = SourceFile::Java(compilation_unit(&[], vec![call]));

    let result = run(DeleteMethodArgument::new("com.acme.Widget <constructor>(String, int)", 0), &[source]);
    let after = result.results[0].after.as_ref().unwrap();
    assert!(after.print().contains("new Widget(3);"));

    let J::NewClass(updated) = &statements(after.as_java().unwrap())[0] else {
        panic!("statement is no longer a constructor call");
    };
    assert_eq!(updated.constructor_type.as_ref().unwrap().parameter_types, vec![int()]);
}

#[test]
fn test_nested_matching_calls_are_both_rewritten() {
    let inner = foo_call(vec![int_literal("1"), with_prefix(int_literal("2"), " ")], &[int(), int()]);
    let outer = foo_call(vec![inner, with_prefix(int_literal("3"), " ")], &[int(), int()]);
    let source = SourceFile::Java(compilation_unit(&[], vec![outer]));

    let result = run(DeleteMethodArgument::new("com.acme.A foo(int, int)", 1), &[source]);
    assert!(result.results[0].after.as_ref().unwrap().print().contains("foo(foo(1));"));
}

#[test]
fn test_deleted_argument_types_become_import_requests() {
    let list = typed_identifier("items", JavaType::class("java.util.List"));
    let limit = static_field(&class_type("com.acme.Limits"), "MAX", int());
    let call = foo_call(
        vec![list, with_prefix(limit, " "), with_prefix(string_literal("x"), " ")],
        &[JavaType::class("java.util.List"), int(), string()],
    );
    let source = SourceFile::Java(compilation_unit(&["java.util.List", "static com.acme.Limits.MAX"], vec![call]));

    let first = run(DeleteMethodArgument::new("com.acme.A foo(java.util.List, int, String)", 0), std::slice::from_ref(&source));
    assert_eq!(first.results[0].import_requests, vec!["java.util.List"]);

    let second = run(DeleteMethodArgument::new("com.acme.A foo(..)", 1), std::slice::from_ref(&source));
    assert_eq!(second.results[0].import_requests, vec!["com.acme.Limits.MAX"]);

    // String lives in java.lang and is never imported
    let third = run(DeleteMethodArgument::new("com.acme.A foo(..)", 2), &[source]);
    assert!(third.results[0].import_requests.is_empty());
}

#[test]
fn test_unattributed_calls_follow_fallback_policy() {
    let unattributed = invocation(None, "foo", vec![int_literal("1"), with_prefix(int_literal("2"), " ")], None);
    let source = SourceFile::Java(compilation_unit(&[], vec![unattributed]));

    let closed = run(DeleteMethodArgument::new("com.acme.A foo(int, int)", 0), std::slice::from_ref(&source));
    assert!(!closed.results[0].is_changed());

    let by_name = DeleteMethodArgument::new("com.acme.A foo(int, int)", 0).with_fallback(FallbackPolicy::NameOnly);
    let open = run(by_name, &[source]);
    assert!(open.results[0].after.as_ref().unwrap().print().contains("foo(2);"));
}

#[test]
fn test_descriptor_lists_options() {
    let recipe = DeleteMethodArgument::new("com.acme.A foo(int)", 0);
    let descriptor = recipe.descriptor();
    assert_eq!(descriptor.name, "java.DeleteMethodArgument");
    let names: Vec<&str> = descriptor.options.iter().map(|o| o.name.as_str()).collect();
    assert_eq!(names, vec!["methodPattern", "argumentIndex", "fallback"]);
    assert!(descriptor.options[2].example.is_none());
}
