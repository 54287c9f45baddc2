//! Random call sites for property-based testing of call rewrites.
//!
//! A `CallSite` is a method invocation or constructor call with a random mix of
//! arguments (literals, typed locals, static constants and nested calls) and random
//! formatting before each argument, including comments and line breaks. Besides
//! building the attributed tree, a site renders its own expected source text so
//! tests can compare printer output without going through the printer twice.
//!
//! Nested calls are always `baz(..)` invocations, so a pattern written for the
//! outer `bar` call never matches inside its arguments.

use std::sync::Arc;

use quickcheck::{Arbitrary, Gen};

use rewrite_engine::ir::java_node::{ClassType, CompilationUnit, J, JavaType, MethodType, Primitive};

use super::builders;

/// Maximum nesting of calls inside arguments.
const MAX_DEPTH: usize = 2;

const MAX_ARGUMENTS: u32 = 4;

/// Formatting that may precede an argument.
const PREFIXES: &[&str] = &["", "", " ", " ", "  ", "/*a*/ ", " /* note */ ", "\n            "];

/// Typed locals: variable name and the class it holds.
const LOCALS: &[(&str, &str)] = &[
    ("widget", "com.acme.model.Widget"),
    ("gadget", "com.acme.model.Gadget"),
    ("items", "java.util.List"),
];

const CONSTANTS_OWNER: &str = "com.acme.Limits";
const CONSTANTS: &[&str] = &["MAX", "MIN"];

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Receiver {
    Foo,
    SubFoo,
    Other,
}

impl Receiver {
    pub fn fully_qualified_name(&self) -> &'static str {
        match self {
            Receiver::Foo => "com.acme.Foo",
            Receiver::SubFoo => "com.acme.SubFoo",
            Receiver::Other => "com.other.Other",
        }
    }

    pub fn variable(&self) -> &'static str {
        match self {
            Receiver::Foo => "foo",
            Receiver::SubFoo => "sub",
            Receiver::Other => "other",
        }
    }

    /// `SubFoo` extends `Foo`.
    pub fn class_type(&self) -> Arc<ClassType> {
        let class = ClassType::new(self.fully_qualified_name());
        match self {
            Receiver::SubFoo => Arc::new(class.with_supertype(Receiver::Foo.class_type())),
            _ => Arc::new(class),
        }
    }
}

#[derive(Clone, Debug)]
pub enum Argument {
    Int(u16),
    Str(String),
    Local { name: &'static str, class: &'static str },
    Constant(&'static str),
    Call(Box<CallSite>),
}

impl Argument {
    fn parameter_type(&self) -> JavaType {
        match self {
            Argument::Int(_) | Argument::Constant(_) | Argument::Call(_) => JavaType::Primitive(Primitive::Int),
            Argument::Str(_) => JavaType::class("java.lang.String"),
            Argument::Local { class, .. } => JavaType::class(class),
        }
    }

    /// How the parameter is written in a signature pattern.
    fn pattern_type(&self) -> String {
        match self {
            Argument::Str(_) => "String".to_string(),
            Argument::Local { class, .. } => class.to_string(),
            _ => "int".to_string(),
        }
    }

    fn source(&self) -> String {
        match self {
            Argument::Int(value) => value.to_string(),
            Argument::Str(text) => format!("\"{}\"", text),
            Argument::Local { name, .. } => name.to_string(),
            Argument::Constant(name) => name.to_string(),
            Argument::Call(call) => call.source(),
        }
    }

    fn to_tree(&self) -> J {
        match self {
            Argument::Int(value) => builders::int_literal(&value.to_string()),
            Argument::Str(text) => builders::string_literal(text),
            Argument::Local { name, class } => builders::typed_identifier(name, JavaType::class(class)),
            Argument::Constant(name) => builders::static_field(
                &builders::class_type(CONSTANTS_OWNER),
                name,
                JavaType::Primitive(Primitive::Int),
            ),
            Argument::Call(call) => call.to_tree(),
        }
    }

    /// Fully-qualified names this argument references, outside `java.lang`.
    pub fn references(&self) -> Vec<String> {
        match self {
            Argument::Local { class, .. } => vec![class.to_string()],
            Argument::Constant(name) => vec![format!("{}.{}", CONSTANTS_OWNER, name)],
            Argument::Call(call) => call.references(),
            _ => Vec::new(),
        }
    }
}

/// A call with its arguments, each paired with the formatting written before it.
#[derive(Clone, Debug)]
pub struct CallSite {
    pub receiver: Receiver,
    /// `None` for a constructor call.
    pub name: Option<String>,
    pub arguments: Vec<(String, Argument)>,
}

impl CallSite {
    pub fn is_constructor(&self) -> bool {
        self.name.is_none()
    }

    pub fn method_type(&self) -> Arc<MethodType> {
        let parameters: Vec<JavaType> = self.arguments.iter().map(|(_, a)| a.parameter_type()).collect();
        let declaring = self.receiver.class_type();
        match &self.name {
            Some(name) => {
                let method = builders::method_type(&declaring, name, &parameters);
                Arc::new((*method).clone().with_return_type(JavaType::Primitive(Primitive::Int)))
            }
            None => builders::constructor_type(&declaring, &parameters),
        }
    }

    /// An exact signature pattern for this site, such as `com.acme.Foo bar(int, String)`.
    pub fn pattern(&self) -> String {
        let parameters: Vec<String> = self.arguments.iter().map(|(_, a)| a.pattern_type()).collect();
        let name = self.name.as_deref().unwrap_or("<constructor>");
        format!("{} {}({})", self.receiver.fully_qualified_name(), name, parameters.join(", "))
    }

    pub fn source(&self) -> String {
        let arguments: Vec<String> =
            self.arguments.iter().map(|(prefix, a)| format!("{}{}", prefix, a.source())).collect();
        let arguments = arguments.join(",");
        match &self.name {
            Some(name) => format!("{}.{}({})", self.receiver.variable(), name, arguments),
            None => {
                let class = self.receiver.class_type();
                format!("new {}({})", class.simple_name(), arguments)
            }
        }
    }

    pub fn to_tree(&self) -> J {
        let arguments: Vec<J> =
            self.arguments.iter().map(|(prefix, a)| builders::with_prefix(a.to_tree(), prefix)).collect();
        let method_type = self.method_type();
        match &self.name {
            Some(name) => {
                let select = builders::typed_identifier(
                    self.receiver.variable(),
                    JavaType::Class(self.receiver.class_type()),
                );
                builders::invocation(Some(select), name, arguments, Some(method_type))
            }
            None => builders::new_class(&self.receiver.class_type(), arguments, Some(method_type)),
        }
    }

    /// The site as the only statement of `class A { void m() { .. } }`.
    pub fn to_compilation_unit(&self) -> Arc<CompilationUnit> {
        builders::compilation_unit(&[], vec![self.to_tree()])
    }

    /// The text of the compilation unit built by [`CallSite::to_compilation_unit`].
    pub fn compilation_unit_source(&self) -> String {
        format!("class A {{\n    void m() {{\n        {};\n    }}\n}}\n", self.source())
    }

    /// Names the whole call references: its receiver class and whatever its arguments use.
    pub fn references(&self) -> Vec<String> {
        let mut names = vec![self.receiver.fully_qualified_name().to_string()];
        names.extend(self.arguments.iter().flat_map(|(_, a)| a.references()));
        names
    }

    /// The site with argument `index` removed, as deleting it should leave it.
    ///
    /// Removing the first argument hands its formatting to the next one.
    pub fn without_argument(&self, index: usize) -> CallSite {
        let mut arguments = self.arguments.clone();
        if index < arguments.len() {
            let (prefix, _) = arguments.remove(index);
            if index == 0 {
                if let Some(first) = arguments.first_mut() {
                    first.0 = prefix;
                }
            }
        }
        CallSite { arguments, ..self.clone() }
    }
}

/// Generates a random integer in the range [min, max].
fn gen_range(g: &mut Gen, min: u32, max: u32) -> u32 {
    min + (u32::arbitrary(g) % (max - min + 1))
}

fn gen_prefix(g: &mut Gen) -> String {
    g.choose(PREFIXES).unwrap().to_string()
}

fn gen_string_content(g: &mut Gen) -> String {
    const WORDS: &[&str] = &["x", "hello", "a b", "", "1.0"];
    g.choose(WORDS).unwrap().to_string()
}

fn gen_argument(g: &mut Gen, depth: usize) -> Argument {
    const CHOICES: &[&str] = &["int", "string", "local", "constant", "call"];
    let choices = if depth == 0 { &CHOICES[..4] } else { CHOICES };
    match *g.choose(choices).unwrap() {
        "int" => Argument::Int(u16::arbitrary(g) % 1000),
        "string" => Argument::Str(gen_string_content(g)),
        "local" => {
            let (name, class) = *g.choose(LOCALS).unwrap();
            Argument::Local { name, class }
        }
        "constant" => Argument::Constant(*g.choose(CONSTANTS).unwrap()),
        "call" => Argument::Call(Box::new(gen_call(g, depth - 1, Some("baz".to_string())))),
        _ => unreachable!(),
    }
}

fn gen_call(g: &mut Gen, depth: usize, name: Option<String>) -> CallSite {
    let depth = depth.min(MAX_DEPTH);
    let receiver = *g.choose(&[Receiver::Foo, Receiver::SubFoo, Receiver::Other]).unwrap();
    let count = gen_range(g, 0, MAX_ARGUMENTS);
    let arguments = (0..count).map(|_| (gen_prefix(g), gen_argument(g, depth))).collect();
    CallSite { receiver, name, arguments }
}

impl Arbitrary for CallSite {
    fn arbitrary(g: &mut Gen) -> Self {
        let name = if gen_range(g, 0, 3) == 0 { None } else { Some("bar".to_string()) };
        gen_call(g, MAX_DEPTH, name)
    }

    fn shrink(&self) -> Box<dyn Iterator<Item = Self>> {
        let shrunk: Vec<CallSite> = (0..self.arguments.len()).map(|i| self.without_argument(i)).collect();
        Box::new(shrunk.into_iter())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_pattern_and_source() {
        let site = CallSite {
            receiver: Receiver::Foo,
            name: Some("bar".to_string()),
            arguments: vec![
                ("".to_string(), Argument::Int(1)),
                (" ".to_string(), Argument::Str("x".to_string())),
            ],
        };
        assert_eq!(site.pattern(), "com.acme.Foo bar(int, String)");
        assert_eq!(site.source(), "foo.bar(1, \"x\")");
        assert_eq!(site.without_argument(0).source(), "foo.bar(\"x\")");
    }

    #[test]
    fn test_constructor_source() {
        let site = CallSite {
            receiver: Receiver::SubFoo,
            name: None,
            arguments: vec![("/*a*/ ".to_string(), Argument::Constant("MAX"))],
        };
        assert_eq!(site.pattern(), "com.acme.SubFoo <constructor>(int)");
        assert_eq!(site.source(), "new SubFoo(/*a*/ MAX)");
        assert_eq!(site.references(), vec!["com.acme.SubFoo", "com.acme.Limits.MAX"]);
    }
}
