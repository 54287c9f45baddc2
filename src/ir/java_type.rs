//! Pre-computed type attribution attached to Java-like trees by the parser.
//!
//! These are immutable value objects. The engine never derives types itself: a
//! rewrite that changes a signature (for instance deleting an argument) must build
//! the updated attribution explicitly through the `with_*` copies here.

use std::fmt;
use std::sync::Arc;

/// Modifier and attribute flags of a type, method or variable.
#[derive(Clone, Copy, Default, PartialEq, Eq, Hash)]
pub struct Flags(u32);

impl Flags {
    pub const NONE: Flags = Flags(0);
    pub const PUBLIC: Flags = Flags(1);
    pub const PRIVATE: Flags = Flags(1 << 1);
    pub const PROTECTED: Flags = Flags(1 << 2);
    pub const STATIC: Flags = Flags(1 << 3);
    pub const FINAL: Flags = Flags(1 << 4);
    pub const ABSTRACT: Flags = Flags(1 << 5);
    pub const VARARGS: Flags = Flags(1 << 6);

    pub fn contains(self, other: Flags) -> bool {
        self.0 & other.0 == other.0
    }

    pub fn union(self, other: Flags) -> Flags {
        Flags(self.0 | other.0)
    }
}

impl std::ops::BitOr for Flags {
    type Output = Flags;

    fn bitor(self, rhs: Flags) -> Flags {
        self.union(rhs)
    }
}

impl fmt::Debug for Flags {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        const NAMES: [(Flags, &str); 7] = [
            (Flags::PUBLIC, "public"),
            (Flags::PRIVATE, "private"),
            (Flags::PROTECTED, "protected"),
            (Flags::STATIC, "static"),
            (Flags::FINAL, "final"),
            (Flags::ABSTRACT, "abstract"),
            (Flags::VARARGS, "varargs"),
        ];
        let set: Vec<&str> = NAMES
            .iter()
            .filter(|(flag, _)| self.contains(*flag))
            .map(|(_, name)| *name)
            .collect();
        write!(f, "Flags({})", set.join(" "))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Primitive {
    Boolean,
    Byte,
    Char,
    Double,
    Float,
    Int,
    Long,
    Short,
    Void,
    String,
    Null,
}

impl Primitive {
    pub fn keyword(&self) -> &'static str {
        match self {
            Primitive::Boolean => "boolean",
            Primitive::Byte => "byte",
            Primitive::Char => "char",
            Primitive::Double => "double",
            Primitive::Float => "float",
            Primitive::Int => "int",
            Primitive::Long => "long",
            Primitive::Short => "short",
            Primitive::Void => "void",
            // String literals are attributed as a primitive but match as the class
            Primitive::String => "java.lang.String",
            Primitive::Null => "null",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ClassKind {
    Class,
    Interface,
    Enum,
    Record,
    Annotation,
}

/// A named, fully-qualified class or interface type.
#[derive(Debug, Clone, PartialEq)]
pub struct ClassType {
    pub fully_qualified_name: String,
    pub kind: ClassKind,
    pub flags: Flags,
    pub supertype: Option<Arc<ClassType>>,
    pub interfaces: Vec<Arc<ClassType>>,
}

impl ClassType {
    pub fn new(fully_qualified_name: impl Into<String>) -> Self {
        ClassType {
            fully_qualified_name: fully_qualified_name.into(),
            kind: ClassKind::Class,
            flags: Flags::PUBLIC,
            supertype: None,
            interfaces: Vec::new(),
        }
    }

    pub fn with_supertype(self, supertype: Arc<ClassType>) -> Self {
        ClassType { supertype: Some(supertype), ..self }
    }

    pub fn with_interfaces(self, interfaces: Vec<Arc<ClassType>>) -> Self {
        ClassType { interfaces, ..self }
    }

    pub fn with_kind(self, kind: ClassKind) -> Self {
        ClassType { kind, ..self }
    }

    /// Package portion of the name, empty for the default package.
    ///
    /// Nested types (`a.b.Outer$Inner`) report the package of the outer type.
    /// Attribution must spell nesting with `$`: the dotted form `a.b.Outer.Inner`
    /// is indistinguishable from a top-level `Inner` in package `a.b.Outer`.
    pub fn package_name(&self) -> &str {
        let outer = self.fully_qualified_name.split('$').next().unwrap_or_default();
        match outer.rfind('.') {
            Some(dot) => &outer[..dot],
            None => "",
        }
    }

    pub fn class_name(&self) -> &str {
        let fqn = &self.fully_qualified_name;
        let package_len = self.package_name().len();
        if package_len == 0 { fqn } else { &fqn[package_len + 1..] }
    }

    pub fn simple_name(&self) -> &str {
        let class_name = self.class_name();
        class_name.rsplit(['$', '.']).next().unwrap_or(class_name)
    }

    /// This type followed by every supertype and interface, depth first, without repeats.
    pub fn ancestry(self: &Arc<Self>) -> Vec<Arc<ClassType>> {
        let mut seen = Vec::new();
        let mut stack = vec![Arc::clone(self)];
        while let Some(current) = stack.pop() {
            if seen.iter().any(|s: &Arc<ClassType>| s.fully_qualified_name == current.fully_qualified_name) {
                continue;
            }
            for interface in current.interfaces.iter().rev() {
                stack.push(Arc::clone(interface));
            }
            if let Some(supertype) = &current.supertype {
                stack.push(Arc::clone(supertype));
            }
            seen.push(current);
        }
        seen
    }

    pub fn is_assignable_to(self: &Arc<Self>, fully_qualified_name: &str) -> bool {
        self.ancestry().iter().any(|t| t.fully_qualified_name == fully_qualified_name)
    }
}

/// The resolved signature of a method or constructor.
#[derive(Debug, Clone, PartialEq)]
pub struct MethodType {
    pub declaring_type: Arc<ClassType>,
    pub name: String,
    pub flags: Flags,
    pub return_type: JavaType,
    pub parameter_names: Vec<String>,
    pub parameter_types: Vec<JavaType>,
}

impl MethodType {
    pub const CONSTRUCTOR_NAME: &'static str = "<constructor>";

    pub fn new(declaring_type: Arc<ClassType>, name: impl Into<String>) -> Self {
        MethodType {
            declaring_type,
            name: name.into(),
            flags: Flags::PUBLIC,
            return_type: JavaType::Primitive(Primitive::Void),
            parameter_names: Vec::new(),
            parameter_types: Vec::new(),
        }
    }

    pub fn constructor(declaring_type: Arc<ClassType>) -> Self {
        let return_type = JavaType::Class(Arc::clone(&declaring_type));
        MethodType { return_type, ..MethodType::new(declaring_type, Self::CONSTRUCTOR_NAME) }
    }

    pub fn is_constructor(&self) -> bool {
        self.name == Self::CONSTRUCTOR_NAME
    }

    pub fn has_flags(&self, flags: Flags) -> bool {
        self.flags.contains(flags)
    }

    pub fn with_flags(self, flags: Flags) -> Self {
        MethodType { flags, ..self }
    }

    pub fn with_return_type(self, return_type: JavaType) -> Self {
        MethodType { return_type, ..self }
    }

    /// Adds a named parameter; used when building attribution by hand.
    pub fn with_parameter(mut self, name: impl Into<String>, parameter_type: JavaType) -> Self {
        self.parameter_names.push(name.into());
        self.parameter_types.push(parameter_type);
        self
    }

    pub fn with_parameter_names(&self, parameter_names: Vec<String>) -> Self {
        MethodType { parameter_names, ..self.clone() }
    }

    pub fn with_parameter_types(&self, parameter_types: Vec<JavaType>) -> Self {
        MethodType { parameter_types, ..self.clone() }
    }

    pub fn arity(&self) -> usize {
        self.parameter_types.len()
    }
}

/// A field or local variable.
#[derive(Debug, Clone, PartialEq)]
pub struct VariableType {
    pub name: String,
    pub owner: Option<JavaType>,
    pub variable_type: JavaType,
    pub flags: Flags,
}

impl VariableType {
    pub fn has_flags(&self, flags: Flags) -> bool {
        self.flags.contains(flags)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum JavaType {
    Class(Arc<ClassType>),
    Method(Arc<MethodType>),
    Variable(Arc<VariableType>),
    Primitive(Primitive),
    Array(Arc<JavaType>),
    Unknown,
}

impl JavaType {
    pub fn class(fully_qualified_name: &str) -> JavaType {
        JavaType::Class(Arc::new(ClassType::new(fully_qualified_name)))
    }

    pub fn as_class(&self) -> Option<&Arc<ClassType>> {
        match self {
            JavaType::Class(class) => Some(class),
            _ => None,
        }
    }

    pub fn as_method(&self) -> Option<&Arc<MethodType>> {
        match self {
            JavaType::Method(method) => Some(method),
            _ => None,
        }
    }

    /// Fully-qualified rendering used by the signature matcher (`int`, `java.lang.String`, `a.B[]`).
    pub fn signature(&self) -> String {
        match self {
            JavaType::Class(class) => class.fully_qualified_name.replace('$', "."),
            JavaType::Primitive(primitive) => primitive.keyword().to_string(),
            JavaType::Array(element) => format!("{}[]", element.signature()),
            JavaType::Method(method) => method.return_type.signature(),
            JavaType::Variable(variable) => variable.variable_type.signature(),
            JavaType::Unknown => "*unknown*".to_string(),
        }
    }

    pub fn is_unknown(&self) -> bool {
        matches!(self, JavaType::Unknown)
    }
}

impl From<Primitive> for JavaType {
    fn from(primitive: Primitive) -> Self {
        JavaType::Primitive(primitive)
    }
}
