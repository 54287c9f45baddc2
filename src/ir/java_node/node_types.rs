use std::path::PathBuf;
use std::sync::Arc;

use archery::ArcK;
use rpds::Vector;

pub use super::super::java_type::{ClassKind, ClassType, Flags, JavaType, MethodType, Primitive, VariableType};
pub use super::super::markers::Markers;
pub use super::super::node::{Container, LeftPadded, PaddedVector, RightPadded, Space, TreeId};

/// Represents every construct of the Java-like lossless tree.
///
/// Each variant wraps the concrete node in an `Arc` so that a visitor can hand
/// back the exact same allocation when nothing below it changed.
///
/// # Examples
/// - `MethodInvocation`: `list.add(1, "x")`
/// - `NewClass`: `new Foo(a)`
/// - `Empty`: the placeholder inside `foo()`
#[derive(Debug, Clone, PartialEq)]
pub enum J {
    CompilationUnit(Arc<CompilationUnit>),
    Package(Arc<Package>),
    Import(Arc<Import>),
    ClassDeclaration(Arc<ClassDeclaration>),
    MethodDeclaration(Arc<MethodDeclaration>),
    Block(Arc<Block>),
    VariableDeclarations(Arc<VariableDeclarations>),
    Return(Arc<Return>),
    MethodInvocation(Arc<MethodInvocation>),
    NewClass(Arc<NewClass>),
    Identifier(Arc<Identifier>),
    FieldAccess(Arc<FieldAccess>),
    Literal(Arc<Literal>),
    Binary(Arc<Binary>),
    Empty(Arc<Empty>),
}

/// Discriminator for the concrete kind of a [`J`] value.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum JKind {
    CompilationUnit,
    Package,
    Import,
    ClassDeclaration,
    MethodDeclaration,
    Block,
    VariableDeclarations,
    Return,
    MethodInvocation,
    NewClass,
    Identifier,
    FieldAccess,
    Literal,
    Binary,
    Empty,
}

/// A whole source file; the root of a Java-like tree.
#[derive(Debug, Clone, PartialEq)]
pub struct CompilationUnit {
    pub id: TreeId,
    pub prefix: Space,
    pub markers: Markers,
    pub source_path: PathBuf,
    /// `after` is the space before the terminating `;`.
    pub package: Option<RightPadded<Arc<Package>>>,
    /// `after` is the space before each terminating `;`.
    pub imports: PaddedVector<Arc<Import>>,
    pub classes: Vector<Arc<ClassDeclaration>, ArcK>,
    pub eof: Space,
}

/// `package com.acme`
#[derive(Debug, Clone, PartialEq)]
pub struct Package {
    pub id: TreeId,
    pub prefix: Space,
    pub markers: Markers,
    pub expression: J,
}

/// `import com.acme.Foo` or `import static com.acme.Foo.bar`
#[derive(Debug, Clone, PartialEq)]
pub struct Import {
    pub id: TreeId,
    pub prefix: Space,
    pub markers: Markers,
    /// Space before the `static` keyword when this is a static import.
    pub statik: Option<Space>,
    pub qualid: Arc<FieldAccess>,
}

/// A keyword modifier such as `public` or `static`.
#[derive(Debug, Clone, PartialEq)]
pub struct Modifier {
    pub id: TreeId,
    pub prefix: Space,
    pub markers: Markers,
    pub keyword: String,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ClassDeclaration {
    pub id: TreeId,
    pub prefix: Space,
    pub markers: Markers,
    pub modifiers: Vector<Modifier, ArcK>,
    /// Space before the `class`/`interface`/... keyword.
    pub kind_prefix: Space,
    pub kind: ClassKind,
    pub name: Arc<Identifier>,
    /// `before` is the space ahead of `extends`.
    pub extends: Option<LeftPadded<J>>,
    pub body: Arc<Block>,
    pub class_type: Option<Arc<ClassType>>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct MethodDeclaration {
    pub id: TreeId,
    pub prefix: Space,
    pub markers: Markers,
    pub modifiers: Vector<Modifier, ArcK>,
    /// Absent for constructors.
    pub return_type: Option<J>,
    pub name: Arc<Identifier>,
    pub parameters: Container<J>,
    /// Absent for abstract and interface methods.
    pub body: Option<Arc<Block>>,
    pub method_type: Option<Arc<MethodType>>,
}

/// `{ statements }`
#[derive(Debug, Clone, PartialEq)]
pub struct Block {
    pub id: TreeId,
    pub prefix: Space,
    pub markers: Markers,
    /// `after` is the space before a statement's `;`, when it has one.
    pub statements: PaddedVector<J>,
    /// Space before the closing brace.
    pub end: Space,
}

/// A single-variable declaration, `String s = "x"`, also used for parameters.
#[derive(Debug, Clone, PartialEq)]
pub struct VariableDeclarations {
    pub id: TreeId,
    pub prefix: Space,
    pub markers: Markers,
    pub modifiers: Vector<Modifier, ArcK>,
    pub type_expression: Option<J>,
    pub name: Arc<Identifier>,
    /// `before` is the space ahead of `=`.
    pub initializer: Option<LeftPadded<J>>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Return {
    pub id: TreeId,
    pub prefix: Space,
    pub markers: Markers,
    pub expression: Option<J>,
}

/// `select.name(arguments)` or `name(arguments)`
#[derive(Debug, Clone, PartialEq)]
pub struct MethodInvocation {
    pub id: TreeId,
    pub prefix: Space,
    pub markers: Markers,
    /// `after` is the space before the `.`.
    pub select: Option<RightPadded<J>>,
    pub name: Arc<Identifier>,
    pub arguments: Container<J>,
    pub method_type: Option<Arc<MethodType>>,
}

/// `new Clazz(arguments)`
#[derive(Debug, Clone, PartialEq)]
pub struct NewClass {
    pub id: TreeId,
    pub prefix: Space,
    pub markers: Markers,
    pub clazz: J,
    pub arguments: Container<J>,
    pub constructor_type: Option<Arc<MethodType>>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Identifier {
    pub id: TreeId,
    pub prefix: Space,
    pub markers: Markers,
    pub simple_name: String,
    pub ty: Option<JavaType>,
    pub field_type: Option<Arc<VariableType>>,
}

/// `target.name`
#[derive(Debug, Clone, PartialEq)]
pub struct FieldAccess {
    pub id: TreeId,
    pub prefix: Space,
    pub markers: Markers,
    pub target: J,
    /// `before` is the space ahead of the `.`.
    pub name: LeftPadded<Arc<Identifier>>,
    pub ty: Option<JavaType>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Literal {
    pub id: TreeId,
    pub prefix: Space,
    pub markers: Markers,
    /// Source text of the literal exactly as written, quotes included.
    pub value_source: String,
    pub ty: Primitive,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BinaryOperator {
    Addition,
    Subtraction,
    Multiplication,
    Division,
    Equal,
    NotEqual,
    LessThan,
    GreaterThan,
    And,
    Or,
}

impl BinaryOperator {
    pub fn symbol(&self) -> &'static str {
        match self {
            BinaryOperator::Addition => "+",
            BinaryOperator::Subtraction => "-",
            BinaryOperator::Multiplication => "*",
            BinaryOperator::Division => "/",
            BinaryOperator::Equal => "==",
            BinaryOperator::NotEqual => "!=",
            BinaryOperator::LessThan => "<",
            BinaryOperator::GreaterThan => ">",
            BinaryOperator::And => "&&",
            BinaryOperator::Or => "||",
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Binary {
    pub id: TreeId,
    pub prefix: Space,
    pub markers: Markers,
    pub left: J,
    /// `before` is the space ahead of the operator symbol.
    pub operator: LeftPadded<BinaryOperator>,
    pub right: J,
    pub ty: Option<JavaType>,
}

/// Placeholder where the grammar needs an element but none is written, as in `foo()`.
#[derive(Debug, Clone, PartialEq)]
pub struct Empty {
    pub id: TreeId,
    pub prefix: Space,
    pub markers: Markers,
}
