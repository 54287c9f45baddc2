use std::collections::BTreeMap;
use std::sync::Arc;

use indoc::indoc;

use rewrite_engine::config::RunConfig;
use rewrite_engine::ir::markers::SearchResult;
use rewrite_engine::ir::node::{Space, TreeId};
use rewrite_engine::ir::visitor::{JavaSource, JavaVisitor, MavenSource, SourceFile, Visited, XmlVisitor, accept};
use rewrite_engine::ir::xml_node::{Markers, Prolog, Xml, XmlVector};
use rewrite_engine::maven::{
    ChangePropertyValue, Gav, InMemoryDownloader, MavenDocument, MavenDownloader, MavenVisitor, Modules,
    OfflineDownloader, Pom,
};
use rewrite_engine::recipe::{DeleteMethodArgument, ExecutionContext, RecipeRun};
use test_utils::ir::builders::*;

fn offline() -> Arc<dyn MavenDownloader> {
    Arc::new(OfflineDownloader)
}

#[test]
fn test_resolve_reads_coordinates_and_properties() {
    let maven = MavenDocument::resolve(pom_document(&[("junit.version", "4.12")]), offline());
    assert_eq!(maven.model().gav, Gav::new("com.acme", "app", Some("1.0")));
    assert_eq!(maven.model().property("junit.version"), Some("4.12"));
    assert_eq!(maven.model().packaging, "jar");
    assert!(MavenDocument::is_maven(maven.document()));
}

#[test]
fn test_edits_keep_the_maven_wrapper() {
    let downloader = offline();
    let maven = MavenDocument::resolve(pom_document(&[("junit.version", "4.12")]), Arc::clone(&downloader));

    let moved = maven.with_prefix(Space::format("\n"));
    assert!(Arc::ptr_eq(moved.downloader(), &downloader));
    assert_eq!(moved.model(), maven.model());
    assert!(moved.document().id.is_same(&maven.document().id));

    let same = maven.with_prefix(Space::EMPTY);
    assert!(Arc::ptr_eq(same.document(), maven.document()));

    let updated = moved.with_model(moved.model().with_property("junit.version", "4.13"));
    assert_eq!(updated.model().property("junit.version"), Some("4.13"));
    assert!(Arc::ptr_eq(updated.downloader(), &downloader));
}

#[test]
fn test_parent_properties_are_inherited() {
    let downloader = Arc::new(InMemoryDownloader::new());
    downloader.register(Pom {
        gav: Gav::new("com.acme", "parent", Some("7")),
        parent: None,
        packaging: "pom".to_string(),
        properties: BTreeMap::from([("java.version".to_string(), "17".to_string())]),
        dependencies: Vec::new(),
    });

    let document = pom_document(&[]);
    let parent = tag(
        "parent",
        "\n    ",
        vec![
            Xml::Tag(text_tag("groupId", "\n        ", "com.acme")),
            Xml::Tag(text_tag("artifactId", "\n        ", "parent")),
            Xml::Tag(text_tag("version", "\n        ", "7")),
        ],
        "\n    ",
    );
    let content = document.root.content.clone().unwrap().push_back(Xml::Tag(parent));
    let root = Arc::new(rewrite_engine::ir::xml_node::Tag { content: Some(content), ..(*document.root).clone() });

    let maven = MavenDocument::resolve(document.with_root(root), downloader);
    assert_eq!(maven.model().property("java.version"), Some("17"));
    assert_eq!(maven.model().parent, Some(Gav::new("com.acme", "parent", Some("7"))));
}

fn module(artifact_id: &str) -> Arc<Pom> {
    Arc::new(Pom {
        gav: Gav::new("com.acme", artifact_id, Some("1.0")),
        parent: Some(Gav::new("com.acme", "app", Some("1.0"))),
        packaging: "jar".to_string(),
        properties: BTreeMap::new(),
        dependencies: Vec::new(),
    })
}

#[test]
fn test_base_mutators_keep_modules_and_downloader() {
    let downloader = offline();
    let resolved = MavenDocument::resolve(pom_document(&[("junit.version", "4.12")]), Arc::clone(&downloader));
    let document = resolved.document();
    let markers = document.markers.set_by_type(Modules { modules: vec![module("core"), module("web")] });
    let maven = MavenDocument::new(document.with_markers(markers), Arc::clone(&downloader));
    assert_eq!(maven.modules().len(), 2);

    let prolog = Arc::new(Prolog {
        id: TreeId::random(),
        prefix: Space::EMPTY,
        markers: Markers::empty(),
        xml_decl: None,
        misc: XmlVector::new_with_ptr_kind(),
    });
    let edits = [
        maven.with_root(maven.root().with_content(
            maven.root().content.clone().map(|c| c.push_back(Xml::Tag(text_tag("name", "\n    ", "App")))),
        )),
        maven.with_prolog(Some(prolog)),
        maven.with_markers(maven.markers().add(SearchResult::found(None))),
    ];
    for edited in &edits {
        assert!(!Arc::ptr_eq(edited.document(), maven.document()));
        assert!(Arc::ptr_eq(edited.downloader(), &downloader));
        assert_eq!(edited.modules(), maven.modules());
        assert_eq!(edited.model(), maven.model());
    }
    assert!(edits[2].markers().contains::<SearchResult>());
}

struct Untouched;

impl JavaVisitor<ExecutionContext> for Untouched {}

impl XmlVisitor<ExecutionContext> for Untouched {}

impl MavenVisitor<ExecutionContext> for Untouched {}

#[test]
fn test_accept_reports_unsupported_languages() {
    let maven = SourceFile::Maven(MavenDocument::resolve(pom_document(&[]), offline()));
    let xml = SourceFile::Xml(pom_document(&[]));
    let java = SourceFile::Java(compilation_unit(&[], vec![int_literal("1")]));
    let mut ctx = ExecutionContext::default();

    // No XML capability to fall back on for the Maven document
    assert!(matches!(accept(&maven, &mut JavaSource(Untouched), &mut ctx), Visited::Unsupported));
    // Plain XML is not a Maven document
    assert!(matches!(accept(&xml, &mut MavenSource(Untouched), &mut ctx), Visited::Unsupported));
    assert!(matches!(accept(&java, &mut MavenSource(Untouched), &mut ctx), Visited::Unsupported));

    let Visited::Tree(visited) = accept(&maven, &mut MavenSource(Untouched), &mut ctx) else {
        panic!("a Maven visitor accepts Maven documents");
    };
    assert!(visited.is_same_tree(&maven));
}

#[test]
#[should_panic(expected = "has no Pom marker")]
fn test_wrapping_unresolved_document_panics() {
    MavenDocument::new(pom_document(&[]), offline());
}

#[test]
fn test_change_property_value() {
    let _ = rewrite_engine::logging::init_logger(false, Some("warn"), false);
    let maven = MavenDocument::resolve(
        pom_document(&[("junit.version", "4.12"), ("version", "2.0")]),
        offline(),
    );
    let source = SourceFile::Maven(maven);

    let run = RecipeRun::new(Arc::new(ChangePropertyValue::new("version", "3.0")), RunConfig::sequential());
    let result = run.run(std::slice::from_ref(&source)).unwrap();
    let Some(SourceFile::Maven(after)) = &result.results[0].after else {
        panic!("the recipe must keep a Maven document");
    };

    // The project version shares the name but is not a property
    assert_eq!(
        SourceFile::Maven(after.clone()).print(),
        indoc! {"
            <project>
                <groupId>com.acme</groupId>
                <artifactId>app</artifactId>
                <version>1.0</version>
                <properties>
                    <junit.version>4.12</junit.version>
                    <version>3.0</version>
                </properties>
            </project>
        "}
    );
    assert_eq!(after.model().property("version"), Some("3.0"));
    assert_eq!(after.model().property("junit.version"), Some("4.12"));
}

#[test]
fn test_change_property_value_without_match_is_untouched() {
    let source = SourceFile::Maven(MavenDocument::resolve(pom_document(&[("junit.version", "4.12")]), offline()));

    let same_value = RecipeRun::new(Arc::new(ChangePropertyValue::new("junit.version", "4.12")), RunConfig::sequential());
    assert!(!same_value.run(std::slice::from_ref(&source)).unwrap().results[0].is_changed());

    let missing = RecipeRun::new(Arc::new(ChangePropertyValue::new("guava.version", "33.0")), RunConfig::sequential());
    assert!(!missing.run(std::slice::from_ref(&source)).unwrap().results[0].is_changed());
}

#[test]
fn test_java_recipe_leaves_maven_documents_alone() {
    let source = SourceFile::Maven(MavenDocument::resolve(pom_document(&[]), offline()));
    let run = RecipeRun::new(Arc::new(DeleteMethodArgument::new("*..* *(..)", 0)), RunConfig::sequential());
    let result = run.run(std::slice::from_ref(&source)).unwrap();
    assert!(result.results[0].after.as_ref().unwrap().is_same_tree(&source));
}
