use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};
use tracing::trace;
use validated::Validated;

use crate::error::PatternError;
use crate::ir::java_node::{J, JavaType, MethodCall, MethodType};

static TYPE_PATTERN_CHARS: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[\w.*]+$").expect("Type pattern character class must compile"));

static NAME_PATTERN_CHARS: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[\w$*]+$").expect("Name pattern character class must compile"));

const PRIMITIVES: [&str; 9] = ["boolean", "byte", "char", "double", "float", "int", "long", "short", "void"];

/// What to do with a call site whose type attribution is missing or incomplete.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FallbackPolicy {
    /// Unattributed calls never match.
    #[default]
    FailClosed,
    /// Compare the simple name and whether the argument count fits the parameters.
    NameOnly,
}

/// The pieces of a signature pattern as written.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct PatternComponents {
    pub type_pattern: String,
    pub method_name: String,
    pub parameters: Vec<String>,
}

#[derive(Debug, Clone)]
enum ParameterPattern {
    /// `*`
    Any,
    /// `..`
    AnyTrailing,
    /// `Type..`
    Trailing(Regex),
    /// `Type...`
    Varargs(Regex),
    Exact(Regex),
}

impl ParameterPattern {
    fn parse(raw: &str) -> Result<ParameterPattern, PatternError> {
        let invalid = || PatternError::InvalidParameter(raw.to_string());
        let pattern = match raw {
            "*" => ParameterPattern::Any,
            ".." => ParameterPattern::AnyTrailing,
            _ => {
                if let Some(element) = raw.strip_suffix("...") {
                    ParameterPattern::Varargs(compile_type(element).ok_or_else(invalid)?)
                } else if let Some(element) = raw.strip_suffix("..") {
                    ParameterPattern::Trailing(compile_type(element).ok_or_else(invalid)?)
                } else {
                    ParameterPattern::Exact(compile_type(raw).ok_or_else(invalid)?)
                }
            }
        };
        Ok(pattern)
    }

    fn is_trailing(&self) -> bool {
        matches!(self, ParameterPattern::AnyTrailing | ParameterPattern::Trailing(_))
    }
}

/// Matches method and constructor calls against a signature pattern such as
/// `com.acme.Foo bar(int, String)`.
///
/// Grammar: `<type> <name>(<params>)`. In the type, `*` stands for part of one
/// name segment and `..` for any number of package segments (`com..Foo`). The
/// name may use `*`, and `<constructor>` selects constructor calls. Parameters
/// are positional: `*` is one parameter of any type, `..` any number of trailing
/// parameters, `Type..` any number of trailing parameters of that type and
/// `Type...` a varargs array. Unqualified types also match `java.lang`.
#[derive(Debug, Clone)]
pub struct MethodMatcher {
    pattern: String,
    components: PatternComponents,
    type_regex: Regex,
    name_regex: Regex,
    parameters: Vec<ParameterPattern>,
    match_overrides: bool,
    fallback: FallbackPolicy,
}

impl MethodMatcher {
    /// Compiles `pattern`, reporting the first problem found.
    pub fn new(pattern: &str) -> Result<Self, PatternError> {
        compile(pattern).map_err(|errors| {
            errors.into_iter().next().unwrap_or_else(|| PatternError::Malformed(pattern.to_string()))
        })
    }

    /// Checks `pattern` and reports every problem at once.
    pub fn validate(pattern: &str) -> Validated<PatternComponents, PatternError> {
        match compile(pattern) {
            Ok(matcher) => Validated::Good(matcher.components),
            Err(errors) => errors
                .into_iter()
                .map(Validated::<(), PatternError>::fail)
                .collect::<Validated<Vec<()>, PatternError>>()
                .map(|_| PatternComponents::default()),
        }
    }

    /// Whether calls declared on a supertype of the pattern type also match. On by default.
    pub fn with_match_overrides(mut self, match_overrides: bool) -> Self {
        self.match_overrides = match_overrides;
        self
    }

    pub fn with_fallback(mut self, fallback: FallbackPolicy) -> Self {
        self.fallback = fallback;
        self
    }

    pub fn pattern(&self) -> &str {
        &self.pattern
    }

    pub fn components(&self) -> &PatternComponents {
        &self.components
    }

    pub fn fallback(&self) -> FallbackPolicy {
        self.fallback
    }

    pub fn match_overrides(&self) -> bool {
        self.match_overrides
    }

    /// Matches call sites and method declarations; any other node never matches.
    pub fn matches(&self, tree: &J) -> bool {
        match tree {
            J::MethodInvocation(invocation) => self.matches_call(invocation.as_ref()),
            J::NewClass(new_class) => self.matches_call(new_class.as_ref()),
            J::MethodDeclaration(declaration) => match &declaration.method_type {
                Some(method_type) => self.matches_attributed(method_type, &declaration.name.simple_name, None),
                None => self.fallback_match(&declaration.name.simple_name, declaration.real_parameters().len()),
            },
            _ => false,
        }
    }

    pub fn matches_call<C: MethodCall>(&self, call: &C) -> bool {
        let argument_count = call.real_arguments().len();
        match call.method_type() {
            Some(method_type) => self.matches_attributed(method_type, call.call_name(), Some(argument_count)),
            None => self.fallback_match(call.call_name(), argument_count),
        }
    }

    /// Matches a resolved signature, ignoring the fallback policy.
    pub fn matches_method_type(&self, method_type: &MethodType) -> bool {
        if !self.name_regex.is_match(&method_type.name) {
            return false;
        }
        let parameter_types: Vec<String> = method_type.parameter_types.iter().map(JavaType::signature).collect();
        if !self.parameters_match(&parameter_types) {
            return false;
        }
        if self.match_overrides {
            method_type
                .declaring_type
                .ancestry()
                .iter()
                .any(|ancestor| self.type_regex.is_match(&ancestor.fully_qualified_name.replace('$', ".")))
        } else {
            self.type_regex.is_match(&method_type.declaring_type.fully_qualified_name.replace('$', "."))
        }
    }

    fn matches_attributed(&self, method_type: &MethodType, name: &str, argument_count: Option<usize>) -> bool {
        let partial = method_type.parameter_types.iter().any(JavaType::is_unknown);
        if partial && self.fallback == FallbackPolicy::NameOnly {
            trace!("Partial attribution for {}; matching by name only", name);
            return self.fallback_match(name, argument_count.unwrap_or(method_type.arity()));
        }
        self.matches_method_type(method_type)
    }

    fn fallback_match(&self, name: &str, argument_count: usize) -> bool {
        match self.fallback {
            FallbackPolicy::FailClosed => false,
            FallbackPolicy::NameOnly => self.name_regex.is_match(name) && self.arity_fits(argument_count),
        }
    }

    fn parameters_match(&self, types: &[String]) -> bool {
        for (i, parameter) in self.parameters.iter().enumerate() {
            match parameter {
                ParameterPattern::AnyTrailing => return true,
                ParameterPattern::Trailing(element) => {
                    return types[i.min(types.len())..].iter().all(|t| element.is_match(t));
                }
                ParameterPattern::Any => {
                    if i >= types.len() {
                        return false;
                    }
                }
                ParameterPattern::Exact(expected) => {
                    if !types.get(i).is_some_and(|t| expected.is_match(t)) {
                        return false;
                    }
                }
                ParameterPattern::Varargs(element) => {
                    let is_array_of = types
                        .get(i)
                        .and_then(|t| t.strip_suffix("[]"))
                        .is_some_and(|t| element.is_match(t));
                    if !is_array_of {
                        return false;
                    }
                }
            }
        }
        self.parameters.len() == types.len()
    }

    /// Whether a call with `count` arguments could bind to the pattern's parameters.
    fn arity_fits(&self, count: usize) -> bool {
        match self.parameters.last() {
            Some(last) if last.is_trailing() => count >= self.parameters.len() - 1,
            // A varargs array may receive no arguments or several
            Some(ParameterPattern::Varargs(_)) => count >= self.parameters.len() - 1,
            _ => count == self.parameters.len(),
        }
    }
}

fn compile(pattern: &str) -> Result<MethodMatcher, Vec<PatternError>> {
    let (type_pattern, method_name, raw_parameters) = split(pattern).map_err(|e| vec![e])?;
    let mut errors = Vec::new();

    let type_regex = compile_type(type_pattern);
    if type_regex.is_none() {
        errors.push(PatternError::InvalidType(type_pattern.to_string()));
    }
    let name_regex = compile_name(method_name);
    if name_regex.is_none() {
        errors.push(PatternError::InvalidName(method_name.to_string()));
    }

    let raw_parameters: Vec<String> = if raw_parameters.trim().is_empty() {
        Vec::new()
    } else {
        raw_parameters.split(',').map(|p| p.trim().to_string()).collect()
    };
    let mut parameters = Vec::with_capacity(raw_parameters.len());
    for (i, raw) in raw_parameters.iter().enumerate() {
        match ParameterPattern::parse(raw) {
            Ok(parameter) => {
                if parameter.is_trailing() && i + 1 < raw_parameters.len() {
                    errors.push(PatternError::MisplacedWildcard(raw.clone()));
                }
                parameters.push(parameter);
            }
            Err(e) => errors.push(e),
        }
    }

    match (type_regex, name_regex) {
        (Some(type_regex), Some(name_regex)) if errors.is_empty() => Ok(MethodMatcher {
            pattern: pattern.trim().to_string(),
            components: PatternComponents {
                type_pattern: type_pattern.to_string(),
                method_name: method_name.to_string(),
                parameters: raw_parameters,
            },
            type_regex,
            name_regex,
            parameters,
            match_overrides: true,
            fallback: FallbackPolicy::default(),
        }),
        _ => Err(errors),
    }
}

/// Splits `Type name(params)` into its three parts.
fn split(pattern: &str) -> Result<(&str, &str, &str), PatternError> {
    let trimmed = pattern.trim();
    if trimmed.is_empty() {
        return Err(PatternError::Empty);
    }
    let malformed = || PatternError::Malformed(trimmed.to_string());
    let (type_pattern, rest) = trimmed.split_once(char::is_whitespace).ok_or_else(malformed)?;
    let rest = rest.trim_start();
    let open = rest.find('(').ok_or_else(malformed)?;
    let parameters = rest[open + 1..].strip_suffix(')').ok_or_else(malformed)?;
    Ok((type_pattern, rest[..open].trim_end(), parameters))
}

fn compile_type(pattern: &str) -> Option<Regex> {
    Regex::new(&type_regex_source(pattern)?).ok()
}

fn type_regex_source(pattern: &str) -> Option<String> {
    if pattern == "*" || pattern == "*..*" {
        return Some("^.*$".to_string());
    }
    let normalized = pattern.replace('$', ".");
    let mut base = normalized.as_str();
    let mut dimensions = 0;
    while let Some(element) = base.strip_suffix("[]") {
        base = element;
        dimensions += 1;
    }
    if !TYPE_PATTERN_CHARS.is_match(base) {
        return None;
    }

    let mut source = String::from("^");
    if !base.contains(['.', '*']) && !PRIMITIVES.contains(&base) {
        source.push_str(r"(?:java\.lang\.)?");
    }
    for (i, segment) in base.split("..").enumerate() {
        if segment.split('.').any(str::is_empty) {
            return None;
        }
        if i > 0 {
            source.push_str(r"\.(?:[^.]+\.)*");
        }
        for c in segment.chars() {
            match c {
                '*' => source.push_str("[^.]*"),
                '.' => source.push_str(r"\."),
                c => source.push(c),
            }
        }
    }
    for _ in 0..dimensions {
        source.push_str(r"\[\]");
    }
    source.push('$');
    Some(source)
}

fn compile_name(pattern: &str) -> Option<Regex> {
    if pattern == MethodType::CONSTRUCTOR_NAME {
        return Regex::new(&format!("^{}$", regex::escape(pattern))).ok();
    }
    if !NAME_PATTERN_CHARS.is_match(pattern) {
        return None;
    }
    let mut source = String::from("^");
    for c in pattern.chars() {
        match c {
            '*' => source.push_str(r"[\w$]*"),
            '$' => source.push_str(r"\$"),
            c => source.push(c),
        }
    }
    source.push('$');
    Regex::new(&source).ok()
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use super::*;
    use crate::ir::java_node::{
        Container, Empty, Identifier, Markers, MethodDeclaration, MethodInvocation, RightPadded, Space, TreeId,
    };
    use crate::ir::java_type::{ClassType, Primitive};

    fn foo() -> Arc<ClassType> {
        Arc::new(ClassType::new("com.acme.Foo"))
    }

    fn bar(declaring_type: Arc<ClassType>, parameters: Vec<JavaType>) -> MethodType {
        parameters
            .into_iter()
            .enumerate()
            .fold(MethodType::new(declaring_type, "bar"), |m, (i, t)| m.with_parameter(format!("arg{}", i), t))
    }

    fn int() -> JavaType {
        JavaType::Primitive(Primitive::Int)
    }

    fn string() -> JavaType {
        JavaType::class("java.lang.String")
    }

    #[test]
    fn test_exact_signature() {
        let matcher = MethodMatcher::new("com.acme.Foo bar(int, String)").unwrap();
        assert!(matcher.matches_method_type(&bar(foo(), vec![int(), string()])));
        assert!(!matcher.matches_method_type(&bar(foo(), vec![int(), int()])));
        assert!(!matcher.matches_method_type(&bar(foo(), vec![int()])));
        assert!(!matcher.matches_method_type(&bar(Arc::new(ClassType::new("com.acme.Other")), vec![int(), string()])));
    }

    #[test]
    fn test_supertype_walk() {
        let sub = Arc::new(ClassType::new("com.acme.SubFoo").with_supertype(foo()));
        let call = bar(sub, vec![int(), string()]);

        let matcher = MethodMatcher::new("com.acme.Foo bar(int, String)").unwrap();
        assert!(matcher.matches_method_type(&call));
        assert!(!matcher.with_match_overrides(false).matches_method_type(&call));
    }

    #[test]
    fn test_wildcards() {
        let call = bar(foo(), vec![int(), string()]);
        assert!(MethodMatcher::new("com..Foo bar(..)").unwrap().matches_method_type(&call));
        assert!(MethodMatcher::new("com.*.Foo b*(int, *)").unwrap().matches_method_type(&call));
        assert!(MethodMatcher::new("* *(int, ..)").unwrap().matches_method_type(&call));
        assert!(!MethodMatcher::new("org..Foo bar(..)").unwrap().matches_method_type(&call));
        assert!(!MethodMatcher::new("com.acme.Foo bar(*)").unwrap().matches_method_type(&call));
    }

    #[test]
    fn test_trailing_and_varargs_parameters() {
        let ints = bar(foo(), vec![int(), int(), int()]);
        assert!(MethodMatcher::new("com.acme.Foo bar(int..)").unwrap().matches_method_type(&ints));
        assert!(!MethodMatcher::new("com.acme.Foo bar(String..)").unwrap().matches_method_type(&ints));

        let varargs = bar(foo(), vec![int(), JavaType::Array(Arc::new(string()))]);
        assert!(MethodMatcher::new("com.acme.Foo bar(int, String...)").unwrap().matches_method_type(&varargs));
        assert!(MethodMatcher::new("com.acme.Foo bar(int, java.lang.String[])").unwrap().matches_method_type(&varargs));
    }

    fn empty_list() -> Container<J> {
        Container::from_padded(Space::EMPTY, vec![RightPadded::build(J::Empty(Empty::build(Space::EMPTY)))])
    }

    #[test]
    fn test_name_only_skips_empty_placeholders() {
        let declaration = J::MethodDeclaration(Arc::new(MethodDeclaration {
            id: TreeId::random(),
            prefix: Space::EMPTY,
            markers: Markers::empty(),
            modifiers: rpds::Vector::new_with_ptr_kind(),
            return_type: None,
            name: Identifier::build("m", None),
            parameters: empty_list(),
            body: None,
            method_type: None,
        }));
        let call = J::MethodInvocation(Arc::new(MethodInvocation {
            id: TreeId::random(),
            prefix: Space::EMPTY,
            markers: Markers::empty(),
            select: None,
            name: Identifier::build("m", None),
            arguments: empty_list(),
            method_type: None,
        }));

        let no_args = MethodMatcher::new("*..* m()").unwrap().with_fallback(FallbackPolicy::NameOnly);
        assert!(no_args.matches(&declaration));
        assert!(no_args.matches(&call));

        let one_arg = MethodMatcher::new("*..* m(int)").unwrap().with_fallback(FallbackPolicy::NameOnly);
        assert!(!one_arg.matches(&declaration));
        assert!(!one_arg.matches(&call));
    }

    #[test]
    fn test_constructor_pattern() {
        let constructor = MethodType::constructor(foo()).with_parameter("x", int());
        assert!(MethodMatcher::new("com.acme.Foo <constructor>(int)").unwrap().matches_method_type(&constructor));
        assert!(!MethodMatcher::new("com.acme.Foo bar(int)").unwrap().matches_method_type(&constructor));
    }

    #[test]
    fn test_validate_reports_every_error() {
        let Validated::Fail(errors) = MethodMatcher::validate("com.acme.Foo! ba-r(.., int)") else {
            panic!("pattern should be invalid");
        };
        let errors: Vec<PatternError> = errors.into_iter().collect();
        assert_eq!(
            errors,
            vec![
                PatternError::InvalidType("com.acme.Foo!".to_string()),
                PatternError::InvalidName("ba-r".to_string()),
                PatternError::MisplacedWildcard("..".to_string()),
            ]
        );

        assert_eq!(MethodMatcher::new("   ").unwrap_err(), PatternError::Empty);
        assert!(matches!(MethodMatcher::new("bar(int)"), Err(PatternError::Malformed(_))));
        assert!(matches!(MethodMatcher::new("a..b..c foo()"), Ok(_)));
        assert!(matches!(MethodMatcher::new("a...b foo()"), Err(PatternError::InvalidType(_))));
    }

    #[test]
    fn test_components() {
        let Validated::Good(components) = MethodMatcher::validate("com.acme.Foo bar( int , String... )") else {
            panic!("pattern should be valid");
        };
        assert_eq!(components.type_pattern, "com.acme.Foo");
        assert_eq!(components.method_name, "bar");
        assert_eq!(components.parameters, vec!["int", "String..."]);
    }

    #[test]
    fn test_name_only_fallback_on_partial_attribution() {
        let partial = bar(foo(), vec![int(), JavaType::Unknown]);
        let strict = MethodMatcher::new("com.acme.Foo bar(int, String)").unwrap();
        assert!(!strict.matches_method_type(&partial));

        let lenient = strict.with_fallback(FallbackPolicy::NameOnly);
        assert!(lenient.matches_attributed(&partial, "bar", Some(2)));
        assert!(!lenient.matches_attributed(&partial, "bar", Some(3)));
        assert!(!lenient.fallback_match("baz", 2));
    }

    #[test]
    fn test_fallback_policy_serde() {
        assert_eq!(serde_json::to_string(&FallbackPolicy::NameOnly).unwrap(), "\"name_only\"");
        let policy: FallbackPolicy = serde_json::from_str("\"fail_closed\"").unwrap();
        assert_eq!(policy, FallbackPolicy::FailClosed);
    }
}
