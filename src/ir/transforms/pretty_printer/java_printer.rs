use std::sync::Arc;

use crate::ir::java_node::*;

/// Re-emits Java-like trees token by token.
#[derive(Default)]
pub struct JavaPrinter {
    result: String,
}

impl JavaPrinter {
    pub fn new() -> Self {
        JavaPrinter::default()
    }

    pub fn get_result(self) -> String {
        self.result
    }

    fn append(&mut self, s: &str) {
        self.result.push_str(s);
    }

    fn space(&mut self, space: &Space) {
        self.result.push_str(space.as_str());
    }

    pub fn print(&mut self, tree: &J) {
        match tree {
            J::CompilationUnit(node) => self.print_compilation_unit(node),
            J::Package(node) => self.print_package(node),
            J::Import(node) => self.print_import(node),
            J::ClassDeclaration(node) => self.print_class_declaration(node),
            J::MethodDeclaration(node) => self.print_method_declaration(node),
            J::Block(node) => self.print_block(node),
            J::VariableDeclarations(node) => self.print_variable_declarations(node),
            J::Return(node) => {
                self.space(&node.prefix);
                self.append("return");
                if let Some(expression) = &node.expression {
                    self.print(expression);
                }
            }
            J::MethodInvocation(node) => self.print_method_invocation(node),
            J::NewClass(node) => {
                self.space(&node.prefix);
                self.append("new");
                self.print(&node.clazz);
                self.print_container(&node.arguments, "(", ",", ")");
            }
            J::Identifier(node) => self.print_identifier(node),
            J::FieldAccess(node) => self.print_field_access(node),
            J::Literal(node) => {
                self.space(&node.prefix);
                self.append(&node.value_source);
            }
            J::Binary(node) => {
                self.space(&node.prefix);
                self.print(&node.left);
                self.space(&node.operator.before);
                self.append(node.operator.element.symbol());
                self.print(&node.right);
            }
            J::Empty(node) => self.space(&node.prefix),
        }
    }

    fn print_compilation_unit(&mut self, node: &CompilationUnit) {
        self.space(&node.prefix);
        if let Some(package) = &node.package {
            self.print_package(&package.element);
            self.space(&package.after);
            self.append(";");
        }
        for import in node.imports.iter() {
            self.print_import(&import.element);
            self.space(&import.after);
            self.append(";");
        }
        for class in node.classes.iter() {
            self.print_class_declaration(class);
        }
        self.space(&node.eof);
    }

    fn print_package(&mut self, node: &Package) {
        self.space(&node.prefix);
        self.append("package");
        self.print(&node.expression);
    }

    fn print_import(&mut self, node: &Import) {
        self.space(&node.prefix);
        self.append("import");
        if let Some(statik) = &node.statik {
            self.space(statik);
            self.append("static");
        }
        self.print_field_access(&node.qualid);
    }

    fn print_modifiers(&mut self, modifiers: &rpds::Vector<Modifier, archery::ArcK>) {
        for modifier in modifiers.iter() {
            self.space(&modifier.prefix);
            self.append(&modifier.keyword);
        }
    }

    fn print_class_declaration(&mut self, node: &ClassDeclaration) {
        self.space(&node.prefix);
        self.print_modifiers(&node.modifiers);
        self.space(&node.kind_prefix);
        self.append(match node.kind {
            ClassKind::Class => "class",
            ClassKind::Interface => "interface",
            ClassKind::Enum => "enum",
            ClassKind::Record => "record",
            ClassKind::Annotation => "@interface",
        });
        self.print_identifier(&node.name);
        if let Some(extends) = &node.extends {
            self.space(&extends.before);
            self.append("extends");
            self.print(&extends.element);
        }
        self.print_block(&node.body);
    }

    fn print_method_declaration(&mut self, node: &MethodDeclaration) {
        self.space(&node.prefix);
        self.print_modifiers(&node.modifiers);
        if let Some(return_type) = &node.return_type {
            self.print(return_type);
        }
        self.print_identifier(&node.name);
        self.print_container(&node.parameters, "(", ",", ")");
        if let Some(body) = &node.body {
            self.print_block(body);
        }
    }

    fn print_block(&mut self, node: &Block) {
        self.space(&node.prefix);
        self.append("{");
        for statement in node.statements.iter() {
            self.print(&statement.element);
            self.space(&statement.after);
            if statement.element.needs_statement_terminator() {
                self.append(";");
            }
        }
        self.space(&node.end);
        self.append("}");
    }

    fn print_variable_declarations(&mut self, node: &VariableDeclarations) {
        self.space(&node.prefix);
        self.print_modifiers(&node.modifiers);
        if let Some(type_expression) = &node.type_expression {
            self.print(type_expression);
        }
        self.print_identifier(&node.name);
        if let Some(initializer) = &node.initializer {
            self.space(&initializer.before);
            self.append("=");
            self.print(&initializer.element);
        }
    }

    fn print_method_invocation(&mut self, node: &MethodInvocation) {
        self.space(&node.prefix);
        if let Some(select) = &node.select {
            self.print(&select.element);
            self.space(&select.after);
            self.append(".");
        }
        self.print_identifier(&node.name);
        self.print_container(&node.arguments, "(", ",", ")");
    }

    fn print_identifier(&mut self, node: &Arc<Identifier>) {
        self.space(&node.prefix);
        self.append(&node.simple_name);
    }

    fn print_field_access(&mut self, node: &FieldAccess) {
        self.space(&node.prefix);
        self.print(&node.target);
        self.space(&node.name.before);
        self.append(".");
        self.print_identifier(&node.name.element);
    }

    fn print_container(&mut self, container: &Container<J>, open: &str, separator: &str, close: &str) {
        self.space(&container.before);
        self.append(open);
        let last = container.len().saturating_sub(1);
        for (i, padded) in container.padding().enumerate() {
            self.print(&padded.element);
            self.space(&padded.after);
            if i < last {
                self.append(separator);
            }
        }
        self.append(close);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ir::transforms::pretty_printer::print_java;

    fn literal(source: &str, prefix: &str) -> J {
        J::Literal(Arc::new(Literal {
            id: TreeId::random(),
            prefix: Space::format(prefix),
            markers: Markers::empty(),
            value_source: source.to_string(),
            ty: Primitive::Int,
        }))
    }

    #[test]
    fn test_prints_call_with_padding_and_comments() {
        let arguments = Container::from_padded(
            Space::EMPTY,
            vec![
                RightPadded::new(literal("1", "/*a*/ "), Space::EMPTY),
                RightPadded::new(literal("2", " "), Space::single()),
            ],
        );
        let select = J::Identifier(Identifier::build("list", None));
        let call = J::MethodInvocation(Arc::new(MethodInvocation {
            id: TreeId::random(),
            prefix: Space::EMPTY,
            markers: Markers::empty(),
            select: Some(RightPadded::new(select, Space::EMPTY)),
            name: Identifier::build("add", None),
            arguments,
            method_type: None,
        }));
        assert_eq!(print_java(&call), "list.add(/*a*/ 1, 2 )");
    }

    #[test]
    fn test_prints_empty_argument_placeholder() {
        let arguments = Container::from_padded(
            Space::EMPTY,
            vec![RightPadded::build(J::Empty(Empty::build(Space::format(" "))))],
        );
        let call = J::NewClass(Arc::new(NewClass {
            id: TreeId::random(),
            prefix: Space::EMPTY,
            markers: Markers::empty(),
            clazz: J::Identifier(Arc::new(Identifier { prefix: Space::single(), ..(*Identifier::build("Foo", None)).clone() })),
            arguments,
            constructor_type: None,
        }));
        assert_eq!(print_java(&call), "new Foo( )");
    }
}
