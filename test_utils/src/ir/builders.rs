use std::path::PathBuf;
use std::sync::Arc;

use archery::ArcK;
use rpds::Vector;

use rewrite_engine::ir::java_node::*;
use rewrite_engine::ir::xml_node::{AttributeVector, CharData, Closing, Tag, Xml, XmlDocument, XmlVector};

pub fn space(text: &str) -> Space {
    Space::format(text)
}

pub fn identifier(name: &str) -> J {
    J::Identifier(Identifier::build(name, None))
}

pub fn typed_identifier(name: &str, ty: JavaType) -> J {
    J::Identifier(Identifier::build(name, Some(ty)))
}

/// A reference to a static field, attributed with its owner so import bookkeeping can see it.
pub fn static_field(owner: &Arc<ClassType>, name: &str, ty: JavaType) -> J {
    let field_type = Arc::new(VariableType {
        name: name.to_string(),
        owner: Some(JavaType::Class(Arc::clone(owner))),
        variable_type: ty.clone(),
        flags: Flags::PUBLIC | Flags::STATIC,
    });
    J::Identifier(Arc::new(Identifier {
        field_type: Some(field_type),
        ..(*Identifier::build(name, Some(ty))).clone()
    }))
}

pub fn int_literal(source: &str) -> J {
    literal(source, Primitive::Int)
}

/// `text` is the unquoted value.
pub fn string_literal(text: &str) -> J {
    literal(&format!("\"{}\"", text), Primitive::String)
}

pub fn literal(value_source: &str, ty: Primitive) -> J {
    J::Literal(Arc::new(Literal {
        id: TreeId::random(),
        prefix: Space::EMPTY,
        markers: Markers::empty(),
        value_source: value_source.to_string(),
        ty,
    }))
}

pub fn with_prefix(tree: J, prefix: &str) -> J {
    tree.with_prefix(space(prefix))
}

pub fn class_type(fully_qualified_name: &str) -> Arc<ClassType> {
    Arc::new(ClassType::new(fully_qualified_name))
}

/// A method type whose parameters are named `arg0`, `arg1`, ...
pub fn method_type(declaring_type: &Arc<ClassType>, name: &str, parameters: &[JavaType]) -> Arc<MethodType> {
    let method = MethodType::new(Arc::clone(declaring_type), name);
    Arc::new(
        parameters
            .iter()
            .enumerate()
            .fold(method, |method, (i, ty)| method.with_parameter(format!("arg{}", i), ty.clone())),
    )
}

pub fn constructor_type(declaring_type: &Arc<ClassType>, parameters: &[JavaType]) -> Arc<MethodType> {
    let constructor = MethodType::constructor(Arc::clone(declaring_type));
    Arc::new(
        parameters
            .iter()
            .enumerate()
            .fold(constructor, |method, (i, ty)| method.with_parameter(format!("arg{}", i), ty.clone())),
    )
}

/// An argument list; no arguments yields the single `Empty` placeholder of `foo()`.
pub fn arguments(args: Vec<J>) -> Container<J> {
    if args.is_empty() {
        return Container::from_padded(Space::EMPTY, vec![RightPadded::build(J::Empty(Empty::build(Space::EMPTY)))]);
    }
    Container::from_padded(Space::EMPTY, args.into_iter().map(RightPadded::build))
}

pub fn invocation(select: Option<J>, name: &str, args: Vec<J>, method_type: Option<Arc<MethodType>>) -> J {
    J::MethodInvocation(Arc::new(MethodInvocation {
        id: TreeId::random(),
        prefix: Space::EMPTY,
        markers: Markers::empty(),
        select: select.map(RightPadded::build),
        name: Identifier::build(name, method_type.clone().map(JavaType::Method)),
        arguments: arguments(args),
        method_type,
    }))
}

/// `new Simple(args)`
pub fn new_class(class: &Arc<ClassType>, args: Vec<J>, constructor_type: Option<Arc<MethodType>>) -> J {
    let clazz = typed_identifier(class.simple_name(), JavaType::Class(Arc::clone(class)));
    J::NewClass(Arc::new(NewClass {
        id: TreeId::random(),
        prefix: Space::EMPTY,
        markers: Markers::empty(),
        clazz: with_prefix(clazz, " "),
        arguments: arguments(args),
        constructor_type,
    }))
}

fn qualified_name(name: &str) -> Arc<FieldAccess> {
    let mut parts = name.split('.');
    let mut target = identifier(parts.next().unwrap_or_default());
    let mut access = None;
    for part in parts {
        let field = Arc::new(FieldAccess {
            id: TreeId::random(),
            prefix: Space::EMPTY,
            markers: Markers::empty(),
            target,
            name: LeftPadded::build(Identifier::build(part, None)),
            ty: None,
        });
        target = J::FieldAccess(Arc::clone(&field));
        access = Some(field);
    }
    match access {
        Some(access) => access,
        None => panic!("import {} is not a qualified name", name),
    }
}

/// `import a.b.C`; a leading `static ` makes it a static import.
pub fn import(name: &str) -> Arc<Import> {
    let (statik, name) = match name.strip_prefix("static ") {
        Some(rest) => (Some(Space::single()), rest),
        None => (None, name),
    };
    Arc::new(Import {
        id: TreeId::random(),
        prefix: Space::EMPTY,
        markers: Markers::empty(),
        statik,
        qualid: qualified_name(name).with_prefix(Space::single()),
    })
}

fn statement_block(prefix: &str, statements: Vec<J>, indent: &str, end: &str) -> Arc<Block> {
    Arc::new(Block {
        id: TreeId::random(),
        prefix: space(prefix),
        markers: Markers::empty(),
        statements: statements
            .into_iter()
            .map(|statement| RightPadded::build(statement.with_prefix(space(indent))))
            .collect(),
        end: space(end),
    })
}

/// Wraps `statements` in `class A { void m() { ... } }`, one statement per line.
///
/// ```text
/// import java.util.List;
///
/// class A {
///     void m() {
///         foo(1, 2);
///     }
/// }
/// ```
pub fn compilation_unit(imports: &[&str], statements: Vec<J>) -> Arc<CompilationUnit> {
    let method = Arc::new(MethodDeclaration {
        id: TreeId::random(),
        prefix: space("\n    "),
        markers: Markers::empty(),
        modifiers: Vector::new_with_ptr_kind(),
        return_type: Some(identifier("void")),
        name: Identifier::build("m", None).with_prefix(Space::single()),
        parameters: arguments(Vec::new()),
        body: Some(statement_block(" ", statements, "\n        ", "\n    ")),
        method_type: None,
    });
    let class = Arc::new(ClassDeclaration {
        id: TreeId::random(),
        prefix: if imports.is_empty() { Space::EMPTY } else { space("\n\n") },
        markers: Markers::empty(),
        modifiers: Vector::new_with_ptr_kind(),
        kind_prefix: Space::EMPTY,
        kind: ClassKind::Class,
        name: Identifier::build("A", None).with_prefix(Space::single()),
        extends: None,
        body: Arc::new(Block {
            id: TreeId::random(),
            prefix: Space::single(),
            markers: Markers::empty(),
            statements: std::iter::once(RightPadded::build(J::MethodDeclaration(method))).collect(),
            end: space("\n"),
        }),
        class_type: Some(class_type("A")),
    });
    let imports: PaddedVector<Arc<Import>> = imports
        .iter()
        .enumerate()
        .map(|(i, name)| {
            let import = import(name);
            let import = if i == 0 { import } else { import.with_prefix(space("\n")) };
            RightPadded::build(import)
        })
        .collect();
    let classes: Vector<Arc<ClassDeclaration>, ArcK> = std::iter::once(class).collect();
    Arc::new(CompilationUnit {
        id: TreeId::random(),
        prefix: Space::EMPTY,
        markers: Markers::empty(),
        source_path: PathBuf::from("A.java"),
        package: None,
        imports,
        classes,
        eof: space("\n"),
    })
}

/// The statements of the single method body built by [`compilation_unit`].
pub fn statements(cu: &CompilationUnit) -> Vec<J> {
    cu.classes
        .iter()
        .flat_map(|class| class.body.statements.iter().map(|s| s.element.clone()).collect::<Vec<_>>())
        .filter_map(|member| match member {
            J::MethodDeclaration(method) => method.body.clone(),
            _ => None,
        })
        .flat_map(|body| body.statements.iter().map(|s| s.element.clone()).collect::<Vec<_>>())
        .collect()
}

pub fn tag(name: &str, prefix: &str, children: Vec<Xml>, closing_prefix: &str) -> Arc<Tag> {
    Arc::new(Tag {
        id: TreeId::random(),
        prefix: space(prefix),
        markers: Markers::empty(),
        name: name.to_string(),
        attributes: AttributeVector::new_with_ptr_kind(),
        content: Some(children.into_iter().collect::<XmlVector>()),
        before_close: Space::EMPTY,
        closing: Some(Closing { prefix: space(closing_prefix), name: name.to_string(), before_close: Space::EMPTY }),
    })
}

/// `<name>value</name>`
pub fn text_tag(name: &str, prefix: &str, value: &str) -> Arc<Tag> {
    let text = Xml::CharData(Arc::new(CharData {
        id: TreeId::random(),
        prefix: Space::EMPTY,
        markers: Markers::empty(),
        cdata: false,
        text: value.to_string(),
        after_text: Space::EMPTY,
    }));
    tag(name, prefix, vec![text], "")
}

/// A small `pom.xml` for `com.acme:app:1.0`, declaring `properties` in order.
///
/// ```text
/// <project>
///     <groupId>com.acme</groupId>
///     <artifactId>app</artifactId>
///     <version>1.0</version>
///     <properties>
///         <junit.version>4.12</junit.version>
///     </properties>
/// </project>
/// ```
pub fn pom_document(properties: &[(&str, &str)]) -> Arc<XmlDocument> {
    let properties: Vec<Xml> = properties
        .iter()
        .map(|(key, value)| Xml::Tag(text_tag(key, "\n        ", value)))
        .collect();
    let project = tag(
        "project",
        "",
        vec![
            Xml::Tag(text_tag("groupId", "\n    ", "com.acme")),
            Xml::Tag(text_tag("artifactId", "\n    ", "app")),
            Xml::Tag(text_tag("version", "\n    ", "1.0")),
            Xml::Tag(tag("properties", "\n    ", properties, "\n    ")),
        ],
        "\n",
    );
    Arc::new(XmlDocument {
        id: TreeId::random(),
        prefix: Space::EMPTY,
        markers: Markers::empty(),
        source_path: PathBuf::from("pom.xml"),
        prolog: None,
        root: project,
        eof: space("\n"),
    })
}
