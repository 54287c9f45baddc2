use std::sync::Arc;

use super::node_types::*;

/// Dispatches `$body` over every variant of [`J`], binding the inner `Arc` to `$node`.
macro_rules! for_each_kind {
    ($value:expr, $node:ident => $body:expr) => {
        match $value {
            J::CompilationUnit($node) => $body,
            J::Package($node) => $body,
            J::Import($node) => $body,
            J::ClassDeclaration($node) => $body,
            J::MethodDeclaration($node) => $body,
            J::Block($node) => $body,
            J::VariableDeclarations($node) => $body,
            J::Return($node) => $body,
            J::MethodInvocation($node) => $body,
            J::NewClass($node) => $body,
            J::Identifier($node) => $body,
            J::FieldAccess($node) => $body,
            J::Literal($node) => $body,
            J::Binary($node) => $body,
            J::Empty($node) => $body,
        }
    };
}

/// Same as [`for_each_kind`] but rewraps the returned `Arc` into the same variant.
macro_rules! map_each_kind {
    ($value:expr, $node:ident => $body:expr) => {
        match $value {
            J::CompilationUnit($node) => J::CompilationUnit($body),
            J::Package($node) => J::Package($body),
            J::Import($node) => J::Import($body),
            J::ClassDeclaration($node) => J::ClassDeclaration($body),
            J::MethodDeclaration($node) => J::MethodDeclaration($body),
            J::Block($node) => J::Block($body),
            J::VariableDeclarations($node) => J::VariableDeclarations($body),
            J::Return($node) => J::Return($body),
            J::MethodInvocation($node) => J::MethodInvocation($body),
            J::NewClass($node) => J::NewClass($body),
            J::Identifier($node) => J::Identifier($body),
            J::FieldAccess($node) => J::FieldAccess($body),
            J::Literal($node) => J::Literal($body),
            J::Binary($node) => J::Binary($body),
            J::Empty($node) => J::Empty($body),
        }
    };
}

/// Generates persistent `with_*` setters.
///
/// Each setter returns the receiver itself when the new value is equal to the
/// current one, otherwise a copy of the same concrete kind sharing every other field.
macro_rules! with_fields {
    ($kind:ident { $($setter:ident => $field:ident : $ty:ty),* $(,)? }) => {
        impl $kind {
            $(
                pub fn $setter(self: &Arc<Self>, $field: $ty) -> Arc<Self> {
                    if self.$field == $field {
                        return Arc::clone(self);
                    }
                    Arc::new($kind { $field, ..(**self).clone() })
                }
            )*
        }
    };
}

/// Links a concrete node struct with its [`J`] variant.
pub trait JNode: Sized {
    const KIND: JKind;

    fn from_j(tree: &J) -> Option<Arc<Self>>;

    fn into_j(node: Arc<Self>) -> J;
}

macro_rules! j_node {
    ($($kind:ident),* $(,)?) => {
        $(
            impl JNode for $kind {
                const KIND: JKind = JKind::$kind;

                fn from_j(tree: &J) -> Option<Arc<Self>> {
                    match tree {
                        J::$kind(node) => Some(Arc::clone(node)),
                        _ => None,
                    }
                }

                fn into_j(node: Arc<Self>) -> J {
                    J::$kind(node)
                }
            }

            impl From<Arc<$kind>> for J {
                fn from(node: Arc<$kind>) -> J {
                    J::$kind(node)
                }
            }

            with_fields!($kind {
                with_prefix => prefix: Space,
                with_markers => markers: Markers,
            });
        )*
    };
}

j_node!(
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
);

with_fields!(CompilationUnit {
    with_package => package: Option<RightPadded<Arc<Package>>>,
    with_imports => imports: PaddedVector<Arc<Import>>,
    with_classes => classes: rpds::Vector<Arc<ClassDeclaration>, archery::ArcK>,
    with_eof => eof: Space,
});

with_fields!(ClassDeclaration {
    with_name => name: Arc<Identifier>,
    with_body => body: Arc<Block>,
    with_extends => extends: Option<LeftPadded<J>>,
    with_class_type => class_type: Option<Arc<ClassType>>,
});

with_fields!(MethodDeclaration {
    with_name => name: Arc<Identifier>,
    with_parameters => parameters: Container<J>,
    with_body => body: Option<Arc<Block>>,
    with_method_type => method_type: Option<Arc<MethodType>>,
});

with_fields!(Block {
    with_statements => statements: PaddedVector<J>,
    with_end => end: Space,
});

with_fields!(VariableDeclarations {
    with_name => name: Arc<Identifier>,
    with_initializer => initializer: Option<LeftPadded<J>>,
});

with_fields!(Return {
    with_expression => expression: Option<J>,
});

with_fields!(MethodInvocation {
    with_select => select: Option<RightPadded<J>>,
    with_name => name: Arc<Identifier>,
    with_arguments => arguments: Container<J>,
    with_method_type => method_type: Option<Arc<MethodType>>,
});

with_fields!(NewClass {
    with_clazz => clazz: J,
    with_arguments => arguments: Container<J>,
    with_constructor_type => constructor_type: Option<Arc<MethodType>>,
});

with_fields!(Identifier {
    with_simple_name => simple_name: String,
    with_type => ty: Option<JavaType>,
    with_field_type => field_type: Option<Arc<VariableType>>,
});

with_fields!(FieldAccess {
    with_target => target: J,
    with_name => name: LeftPadded<Arc<Identifier>>,
    with_type => ty: Option<JavaType>,
});

with_fields!(Literal {
    with_value_source => value_source: String,
});

with_fields!(Binary {
    with_left => left: J,
    with_right => right: J,
});

impl J {
    pub fn id(&self) -> TreeId {
        for_each_kind!(self, node => node.id)
    }

    pub fn prefix(&self) -> &Space {
        for_each_kind!(self, node => &node.prefix)
    }

    pub fn markers(&self) -> &Markers {
        for_each_kind!(self, node => &node.markers)
    }

    pub fn with_prefix(&self, prefix: Space) -> J {
        map_each_kind!(self, node => node.with_prefix(prefix))
    }

    pub fn with_markers(&self, markers: Markers) -> J {
        map_each_kind!(self, node => node.with_markers(markers))
    }

    pub fn kind(&self) -> JKind {
        match self {
            J::CompilationUnit(_) => JKind::CompilationUnit,
            J::Package(_) => JKind::Package,
            J::Import(_) => JKind::Import,
            J::ClassDeclaration(_) => JKind::ClassDeclaration,
            J::MethodDeclaration(_) => JKind::MethodDeclaration,
            J::Block(_) => JKind::Block,
            J::VariableDeclarations(_) => JKind::VariableDeclarations,
            J::Return(_) => JKind::Return,
            J::MethodInvocation(_) => JKind::MethodInvocation,
            J::NewClass(_) => JKind::NewClass,
            J::Identifier(_) => JKind::Identifier,
            J::FieldAccess(_) => JKind::FieldAccess,
            J::Literal(_) => JKind::Literal,
            J::Binary(_) => JKind::Binary,
            J::Empty(_) => JKind::Empty,
        }
    }

    /// Whether both values point at the very same allocation.
    pub fn is_same_tree(&self, other: &J) -> bool {
        match (self, other) {
            (J::CompilationUnit(a), J::CompilationUnit(b)) => Arc::ptr_eq(a, b),
            (J::Package(a), J::Package(b)) => Arc::ptr_eq(a, b),
            (J::Import(a), J::Import(b)) => Arc::ptr_eq(a, b),
            (J::ClassDeclaration(a), J::ClassDeclaration(b)) => Arc::ptr_eq(a, b),
            (J::MethodDeclaration(a), J::MethodDeclaration(b)) => Arc::ptr_eq(a, b),
            (J::Block(a), J::Block(b)) => Arc::ptr_eq(a, b),
            (J::VariableDeclarations(a), J::VariableDeclarations(b)) => Arc::ptr_eq(a, b),
            (J::Return(a), J::Return(b)) => Arc::ptr_eq(a, b),
            (J::MethodInvocation(a), J::MethodInvocation(b)) => Arc::ptr_eq(a, b),
            (J::NewClass(a), J::NewClass(b)) => Arc::ptr_eq(a, b),
            (J::Identifier(a), J::Identifier(b)) => Arc::ptr_eq(a, b),
            (J::FieldAccess(a), J::FieldAccess(b)) => Arc::ptr_eq(a, b),
            (J::Literal(a), J::Literal(b)) => Arc::ptr_eq(a, b),
            (J::Binary(a), J::Binary(b)) => Arc::ptr_eq(a, b),
            (J::Empty(a), J::Empty(b)) => Arc::ptr_eq(a, b),
            _ => false,
        }
    }

    /// The attributed type of an expression, if the parser supplied one.
    pub fn expression_type(&self) -> Option<JavaType> {
        match self {
            J::Identifier(ident) => ident.ty.clone(),
            J::FieldAccess(field) => field.ty.clone(),
            J::Literal(literal) => Some(JavaType::Primitive(literal.ty)),
            J::Binary(binary) => binary.ty.clone(),
            J::MethodInvocation(m) => m.method_type.as_ref().map(|t| t.return_type.clone()),
            J::NewClass(n) => n.constructor_type.as_ref().map(|t| JavaType::Class(Arc::clone(&t.declaring_type))),
            _ => None,
        }
    }

    pub fn cast<T: JNode>(&self) -> Option<Arc<T>> {
        T::from_j(self)
    }

    pub fn is_empty_placeholder(&self) -> bool {
        matches!(self, J::Empty(_))
    }

    /// Whether this node ends with `;` when it stands as a statement.
    pub fn needs_statement_terminator(&self) -> bool {
        match self {
            J::Block(_) | J::ClassDeclaration(_) => false,
            J::MethodDeclaration(method) => method.body.is_none(),
            _ => true,
        }
    }
}

impl Empty {
    pub fn build(prefix: Space) -> Arc<Empty> {
        Arc::new(Empty { id: TreeId::random(), prefix, markers: Markers::empty() })
    }
}

impl Identifier {
    pub fn build(simple_name: impl Into<String>, ty: Option<JavaType>) -> Arc<Identifier> {
        Arc::new(Identifier {
            id: TreeId::random(),
            prefix: Space::EMPTY,
            markers: Markers::empty(),
            simple_name: simple_name.into(),
            ty,
            field_type: None,
        })
    }
}

impl FieldAccess {
    /// Dotted source text of a qualified name such as `java.util.List`.
    pub fn qualified_name(&self) -> String {
        let target = match &self.target {
            J::Identifier(ident) => ident.simple_name.clone(),
            J::FieldAccess(field) => field.qualified_name(),
            _ => String::new(),
        };
        format!("{}.{}", target, self.name.element.simple_name)
    }
}

impl Import {
    pub fn is_static(&self) -> bool {
        self.statik.is_some()
    }

    /// The imported name as written, `com.acme.Foo` or `com.acme.Foo.*`.
    pub fn type_name(&self) -> String {
        self.qualid.qualified_name()
    }
}

impl CompilationUnit {
    pub fn imports(&self) -> Vec<Arc<Import>> {
        self.imports.iter().map(|rp| Arc::clone(&rp.element)).collect()
    }
}

impl MethodDeclaration {
    /// Parameter declarations, skipping the `Empty` placeholder of `m()`.
    pub fn real_parameters(&self) -> Vec<J> {
        self.parameters.elements().into_iter().filter(|p| !p.is_empty_placeholder()).collect()
    }
}

impl MethodInvocation {
    pub fn simple_name(&self) -> &str {
        &self.name.simple_name
    }

    pub fn select(&self) -> Option<&J> {
        self.select.as_ref().map(|rp| &rp.element)
    }
}

/// Shared view over the two call-site kinds: method invocations and constructor calls.
pub trait MethodCall: JNode {
    fn arguments(&self) -> &Container<J>;

    fn method_type(&self) -> Option<&Arc<MethodType>>;

    /// Name used for name-only matching; constructors report `<constructor>`.
    fn call_name(&self) -> &str;

    /// Attributed type of the explicit receiver, when one is written.
    fn receiver_type(&self) -> Option<JavaType>;

    fn with_call_arguments(self: &Arc<Self>, arguments: Container<J>) -> Arc<Self>;

    fn with_call_method_type(self: &Arc<Self>, method_type: Option<Arc<MethodType>>) -> Arc<Self>;

    /// Argument expressions, skipping `Empty` placeholders.
    fn real_arguments(&self) -> Vec<J> {
        self.arguments().elements().into_iter().filter(|a| !a.is_empty_placeholder()).collect()
    }
}

impl MethodCall for MethodInvocation {
    fn arguments(&self) -> &Container<J> {
        &self.arguments
    }

    fn method_type(&self) -> Option<&Arc<MethodType>> {
        self.method_type.as_ref()
    }

    fn call_name(&self) -> &str {
        self.simple_name()
    }

    fn receiver_type(&self) -> Option<JavaType> {
        self.select().and_then(J::expression_type)
    }

    fn with_call_arguments(self: &Arc<Self>, arguments: Container<J>) -> Arc<Self> {
        self.with_arguments(arguments)
    }

    fn with_call_method_type(self: &Arc<Self>, method_type: Option<Arc<MethodType>>) -> Arc<Self> {
        self.with_method_type(method_type)
    }
}

impl MethodCall for NewClass {
    fn arguments(&self) -> &Container<J> {
        &self.arguments
    }

    fn method_type(&self) -> Option<&Arc<MethodType>> {
        self.constructor_type.as_ref()
    }

    fn call_name(&self) -> &str {
        MethodType::CONSTRUCTOR_NAME
    }

    fn receiver_type(&self) -> Option<JavaType> {
        self.clazz.expression_type()
    }

    fn with_call_arguments(self: &Arc<Self>, arguments: Container<J>) -> Arc<Self> {
        self.with_arguments(arguments)
    }

    fn with_call_method_type(self: &Arc<Self>, method_type: Option<Arc<MethodType>>) -> Arc<Self> {
        self.with_constructor_type(method_type)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn literal(source: &str, prefix: &str) -> J {
        J::Literal(Arc::new(Literal {
            id: TreeId::random(),
            prefix: Space::format(prefix),
            markers: Markers::empty(),
            value_source: source.to_string(),
            ty: Primitive::Int,
        }))
    }

    fn invocation(args: Vec<J>) -> Arc<MethodInvocation> {
        Arc::new(MethodInvocation {
            id: TreeId::random(),
            prefix: Space::EMPTY,
            markers: Markers::empty(),
            select: None,
            name: Identifier::build("foo", None),
            arguments: Container::from_padded(Space::EMPTY, args.into_iter().map(RightPadded::build)),
            method_type: None,
        })
    }

    #[test]
    fn test_with_unchanged_value_returns_same_allocation() {
        let m = invocation(vec![literal("1", "")]);
        let same = m.with_prefix(Space::EMPTY);
        assert!(Arc::ptr_eq(&m, &same));

        let same_args = m.with_arguments(m.arguments.clone());
        assert!(Arc::ptr_eq(&m, &same_args));
    }

    #[test]
    fn test_with_changed_value_keeps_identity_and_kind() {
        let m = invocation(vec![literal("1", "")]);
        let changed = m.with_prefix(Space::format("\n"));

        assert!(!Arc::ptr_eq(&m, &changed));
        assert!(changed.id.is_same(&m.id));
        assert_eq!(changed.prefix.as_str(), "\n");
        assert!(Arc::ptr_eq(&changed.name, &m.name));
        // Original untouched
        assert_eq!(m.prefix.as_str(), "");
    }

    #[test]
    fn test_equality_ignores_identity() {
        assert_eq!(literal("1", " "), literal("1", " "));
        assert_ne!(literal("1", " "), literal("2", " "));
    }

    #[test]
    fn test_cast_and_kind() {
        let m = J::MethodInvocation(invocation(vec![]));
        assert_eq!(m.kind(), JKind::MethodInvocation);
        assert!(m.cast::<MethodInvocation>().is_some());
        assert!(m.cast::<NewClass>().is_none());
        assert!(m.needs_statement_terminator());
    }

    #[test]
    fn test_real_arguments_skip_placeholder() {
        let m = invocation(vec![J::Empty(Empty::build(Space::EMPTY))]);
        assert!(m.real_arguments().is_empty());
        assert_eq!(m.arguments().len(), 1);
    }
}
