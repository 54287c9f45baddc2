use std::sync::Arc;

use tracing::{debug, warn};

use crate::ir::cursor::Cursor;
use crate::ir::java_node::*;

/// The recursion callback handed to the `walk_*` functions.
///
/// Walkers never call a visitor directly; they call this, so the same walkers
/// serve both the polymorphic and the isomorphic visitor.
pub type VisitFn<'a, P> = dyn FnMut(&J, &mut P, &mut Cursor<J>) -> Option<J> + 'a;

macro_rules! recurse {
    ($visitor:ident) => {
        &mut |tree: &J, p: &mut P, cursor: &mut Cursor<J>| $visitor.visit(tree, p, cursor)
    };
}

/// Polymorphic visitor over the Java-like tree.
///
/// `visit` pushes the node on the cursor, dispatches to the `visit_<kind>` method
/// and pops it again. Each per-kind method may return a node of any kind, or
/// `None` to delete the node from its parent. The defaults descend through the
/// matching `walk_<kind>` function; an override that never calls the walker stops
/// descent at that node.
///
/// Nothing is rebuilt unless a child changed, so visiting a subtree where no
/// override fires hands back the very same allocation.
pub trait JavaVisitor<P> {
    fn visit(&mut self, tree: &J, p: &mut P, cursor: &mut Cursor<J>) -> Option<J> {
        if !self.pre_visit(tree, p) {
            return Some(tree.clone());
        }
        for ty in attributed_types(tree) {
            self.visit_type(&ty, p);
        }
        cursor.push(tree.clone());
        let visited = match tree {
            J::CompilationUnit(node) => self.visit_compilation_unit(node, p, cursor),
            J::Package(node) => self.visit_package(node, p, cursor),
            J::Import(node) => self.visit_import(node, p, cursor),
            J::ClassDeclaration(node) => self.visit_class_declaration(node, p, cursor),
            J::MethodDeclaration(node) => self.visit_method_declaration(node, p, cursor),
            J::Block(node) => self.visit_block(node, p, cursor),
            J::VariableDeclarations(node) => self.visit_variable_declarations(node, p, cursor),
            J::Return(node) => self.visit_return(node, p, cursor),
            J::MethodInvocation(node) => self.visit_method_invocation(node, p, cursor),
            J::NewClass(node) => self.visit_new_class(node, p, cursor),
            J::Identifier(node) => self.visit_identifier(node, p, cursor),
            J::FieldAccess(node) => self.visit_field_access(node, p, cursor),
            J::Literal(node) => self.visit_literal(node, p, cursor),
            J::Binary(node) => self.visit_binary(node, p, cursor),
            J::Empty(node) => self.visit_empty(node, p, cursor),
        };
        cursor.pop();
        visited
    }

    /// Runs before a node is entered; returning false leaves the node and its
    /// subtree untouched.
    fn pre_visit(&mut self, _tree: &J, _p: &mut P) -> bool {
        true
    }

    /// Called with the type attribution of every node before the node itself is visited.
    fn visit_type(&mut self, _ty: &JavaType, _p: &mut P) {}

    fn visit_compilation_unit(&mut self, node: &Arc<CompilationUnit>, p: &mut P, cursor: &mut Cursor<J>) -> Option<J> {
        Some(J::CompilationUnit(walk_compilation_unit(node, p, cursor, recurse!(self))))
    }

    fn visit_package(&mut self, node: &Arc<Package>, p: &mut P, cursor: &mut Cursor<J>) -> Option<J> {
        Some(J::Package(walk_package(node, p, cursor, recurse!(self))))
    }

    fn visit_import(&mut self, node: &Arc<Import>, p: &mut P, cursor: &mut Cursor<J>) -> Option<J> {
        Some(J::Import(walk_import(node, p, cursor, recurse!(self))))
    }

    fn visit_class_declaration(&mut self, node: &Arc<ClassDeclaration>, p: &mut P, cursor: &mut Cursor<J>) -> Option<J> {
        Some(J::ClassDeclaration(walk_class_declaration(node, p, cursor, recurse!(self))))
    }

    fn visit_method_declaration(&mut self, node: &Arc<MethodDeclaration>, p: &mut P, cursor: &mut Cursor<J>) -> Option<J> {
        Some(J::MethodDeclaration(walk_method_declaration(node, p, cursor, recurse!(self))))
    }

    fn visit_block(&mut self, node: &Arc<Block>, p: &mut P, cursor: &mut Cursor<J>) -> Option<J> {
        Some(J::Block(walk_block(node, p, cursor, recurse!(self))))
    }

    fn visit_variable_declarations(
        &mut self,
        node: &Arc<VariableDeclarations>,
        p: &mut P,
        cursor: &mut Cursor<J>,
    ) -> Option<J> {
        Some(J::VariableDeclarations(walk_variable_declarations(node, p, cursor, recurse!(self))))
    }

    fn visit_return(&mut self, node: &Arc<Return>, p: &mut P, cursor: &mut Cursor<J>) -> Option<J> {
        Some(J::Return(walk_return(node, p, cursor, recurse!(self))))
    }

    fn visit_method_invocation(&mut self, node: &Arc<MethodInvocation>, p: &mut P, cursor: &mut Cursor<J>) -> Option<J> {
        Some(J::MethodInvocation(walk_method_invocation(node, p, cursor, recurse!(self))))
    }

    fn visit_new_class(&mut self, node: &Arc<NewClass>, p: &mut P, cursor: &mut Cursor<J>) -> Option<J> {
        Some(J::NewClass(walk_new_class(node, p, cursor, recurse!(self))))
    }

    fn visit_identifier(&mut self, node: &Arc<Identifier>, _p: &mut P, _cursor: &mut Cursor<J>) -> Option<J> {
        Some(J::Identifier(Arc::clone(node)))
    }

    fn visit_field_access(&mut self, node: &Arc<FieldAccess>, p: &mut P, cursor: &mut Cursor<J>) -> Option<J> {
        Some(J::FieldAccess(walk_field_access(node, p, cursor, recurse!(self))))
    }

    fn visit_literal(&mut self, node: &Arc<Literal>, _p: &mut P, _cursor: &mut Cursor<J>) -> Option<J> {
        Some(J::Literal(Arc::clone(node)))
    }

    fn visit_binary(&mut self, node: &Arc<Binary>, p: &mut P, cursor: &mut Cursor<J>) -> Option<J> {
        Some(J::Binary(walk_binary(node, p, cursor, recurse!(self))))
    }

    fn visit_empty(&mut self, node: &Arc<Empty>, _p: &mut P, _cursor: &mut Cursor<J>) -> Option<J> {
        Some(J::Empty(Arc::clone(node)))
    }
}

/// Isomorphic visitor: every per-kind method returns the same kind it was given.
///
/// Use it through [`Iso`], which turns it into a [`JavaVisitor`].
pub trait JavaIsoVisitor<P> {
    fn visit(&mut self, tree: &J, p: &mut P, cursor: &mut Cursor<J>) -> Option<J> {
        if !self.pre_visit(tree, p) {
            return Some(tree.clone());
        }
        for ty in attributed_types(tree) {
            self.visit_type(&ty, p);
        }
        cursor.push(tree.clone());
        let visited = match tree {
            J::CompilationUnit(node) => J::CompilationUnit(self.visit_compilation_unit(node, p, cursor)),
            J::Package(node) => J::Package(self.visit_package(node, p, cursor)),
            J::Import(node) => J::Import(self.visit_import(node, p, cursor)),
            J::ClassDeclaration(node) => J::ClassDeclaration(self.visit_class_declaration(node, p, cursor)),
            J::MethodDeclaration(node) => J::MethodDeclaration(self.visit_method_declaration(node, p, cursor)),
            J::Block(node) => J::Block(self.visit_block(node, p, cursor)),
            J::VariableDeclarations(node) => J::VariableDeclarations(self.visit_variable_declarations(node, p, cursor)),
            J::Return(node) => J::Return(self.visit_return(node, p, cursor)),
            J::MethodInvocation(node) => J::MethodInvocation(self.visit_method_invocation(node, p, cursor)),
            J::NewClass(node) => J::NewClass(self.visit_new_class(node, p, cursor)),
            J::Identifier(node) => J::Identifier(self.visit_identifier(node, p, cursor)),
            J::FieldAccess(node) => J::FieldAccess(self.visit_field_access(node, p, cursor)),
            J::Literal(node) => J::Literal(self.visit_literal(node, p, cursor)),
            J::Binary(node) => J::Binary(self.visit_binary(node, p, cursor)),
            J::Empty(node) => J::Empty(self.visit_empty(node, p, cursor)),
        };
        cursor.pop();
        Some(visited)
    }

    fn pre_visit(&mut self, _tree: &J, _p: &mut P) -> bool {
        true
    }

    fn visit_type(&mut self, _ty: &JavaType, _p: &mut P) {}

    fn visit_compilation_unit(&mut self, node: &Arc<CompilationUnit>, p: &mut P, cursor: &mut Cursor<J>) -> Arc<CompilationUnit> {
        walk_compilation_unit(node, p, cursor, recurse!(self))
    }

    fn visit_package(&mut self, node: &Arc<Package>, p: &mut P, cursor: &mut Cursor<J>) -> Arc<Package> {
        walk_package(node, p, cursor, recurse!(self))
    }

    fn visit_import(&mut self, node: &Arc<Import>, p: &mut P, cursor: &mut Cursor<J>) -> Arc<Import> {
        walk_import(node, p, cursor, recurse!(self))
    }

    fn visit_class_declaration(
        &mut self,
        node: &Arc<ClassDeclaration>,
        p: &mut P,
        cursor: &mut Cursor<J>,
    ) -> Arc<ClassDeclaration> {
        walk_class_declaration(node, p, cursor, recurse!(self))
    }

    fn visit_method_declaration(
        &mut self,
        node: &Arc<MethodDeclaration>,
        p: &mut P,
        cursor: &mut Cursor<J>,
    ) -> Arc<MethodDeclaration> {
        walk_method_declaration(node, p, cursor, recurse!(self))
    }

    fn visit_block(&mut self, node: &Arc<Block>, p: &mut P, cursor: &mut Cursor<J>) -> Arc<Block> {
        walk_block(node, p, cursor, recurse!(self))
    }

    fn visit_variable_declarations(
        &mut self,
        node: &Arc<VariableDeclarations>,
        p: &mut P,
        cursor: &mut Cursor<J>,
    ) -> Arc<VariableDeclarations> {
        walk_variable_declarations(node, p, cursor, recurse!(self))
    }

    fn visit_return(&mut self, node: &Arc<Return>, p: &mut P, cursor: &mut Cursor<J>) -> Arc<Return> {
        walk_return(node, p, cursor, recurse!(self))
    }

    fn visit_method_invocation(
        &mut self,
        node: &Arc<MethodInvocation>,
        p: &mut P,
        cursor: &mut Cursor<J>,
    ) -> Arc<MethodInvocation> {
        walk_method_invocation(node, p, cursor, recurse!(self))
    }

    fn visit_new_class(&mut self, node: &Arc<NewClass>, p: &mut P, cursor: &mut Cursor<J>) -> Arc<NewClass> {
        walk_new_class(node, p, cursor, recurse!(self))
    }

    fn visit_identifier(&mut self, node: &Arc<Identifier>, _p: &mut P, _cursor: &mut Cursor<J>) -> Arc<Identifier> {
        Arc::clone(node)
    }

    fn visit_field_access(&mut self, node: &Arc<FieldAccess>, p: &mut P, cursor: &mut Cursor<J>) -> Arc<FieldAccess> {
        walk_field_access(node, p, cursor, recurse!(self))
    }

    fn visit_literal(&mut self, node: &Arc<Literal>, _p: &mut P, _cursor: &mut Cursor<J>) -> Arc<Literal> {
        Arc::clone(node)
    }

    fn visit_binary(&mut self, node: &Arc<Binary>, p: &mut P, cursor: &mut Cursor<J>) -> Arc<Binary> {
        walk_binary(node, p, cursor, recurse!(self))
    }

    fn visit_empty(&mut self, node: &Arc<Empty>, _p: &mut P, _cursor: &mut Cursor<J>) -> Arc<Empty> {
        Arc::clone(node)
    }
}

/// Adapts a [`JavaIsoVisitor`] to the polymorphic [`JavaVisitor`] interface.
pub struct Iso<V>(pub V);

impl<P, V: JavaIsoVisitor<P>> JavaVisitor<P> for Iso<V> {
    fn visit(&mut self, tree: &J, p: &mut P, cursor: &mut Cursor<J>) -> Option<J> {
        self.0.visit(tree, p, cursor)
    }
}

/// Runs `visitor` over `tree` only for its effect on `p`, then hands `p` back.
pub fn reduce<P, V: JavaVisitor<P> + ?Sized>(visitor: &mut V, tree: &J, mut p: P) -> P {
    let mut cursor = Cursor::new();
    visitor.visit(tree, &mut p, &mut cursor);
    p
}

fn attributed_types(tree: &J) -> Vec<JavaType> {
    let mut types = Vec::new();
    match tree {
        J::Identifier(ident) => {
            types.extend(ident.ty.clone());
            types.extend(ident.field_type.as_ref().map(|v| JavaType::Variable(Arc::clone(v))));
        }
        J::FieldAccess(field) => types.extend(field.ty.clone()),
        J::MethodInvocation(m) => types.extend(m.method_type.as_ref().map(|t| JavaType::Method(Arc::clone(t)))),
        J::NewClass(n) => types.extend(n.constructor_type.as_ref().map(|t| JavaType::Method(Arc::clone(t)))),
        J::MethodDeclaration(m) => types.extend(m.method_type.as_ref().map(|t| JavaType::Method(Arc::clone(t)))),
        J::ClassDeclaration(c) => types.extend(c.class_type.as_ref().map(|t| JavaType::Class(Arc::clone(t)))),
        J::Binary(b) => types.extend(b.ty.clone()),
        _ => {}
    }
    types
}

// Child visiting helpers. Each returns `None`/the original when nothing changed so
// the walkers can hand back the parent allocation untouched.

/// Visits a child of fixed kind; `None` means the visitor deleted it.
fn visit_fixed_opt<T: JNode, P>(node: &Arc<T>, p: &mut P, cursor: &mut Cursor<J>, visit: &mut VisitFn<'_, P>) -> Option<Arc<T>> {
    let tree = T::into_j(Arc::clone(node));
    let visited = visit(&tree, p, cursor)?;
    if visited.is_same_tree(&tree) {
        return Some(Arc::clone(node));
    }
    match visited.cast::<T>() {
        Some(replaced) => Some(replaced),
        None => {
            warn!("Visitor returned {:?} where a {:?} is required; keeping the original", visited.kind(), T::KIND);
            Some(Arc::clone(node))
        }
    }
}

/// Visits a child of fixed kind that cannot be removed from its parent.
fn visit_fixed<T: JNode, P>(node: &Arc<T>, p: &mut P, cursor: &mut Cursor<J>, visit: &mut VisitFn<'_, P>) -> Arc<T> {
    visit_fixed_opt(node, p, cursor, visit).unwrap_or_else(|| {
        debug!("Ignoring deletion of required {:?}", T::KIND);
        Arc::clone(node)
    })
}

fn visit_required<P>(tree: &J, p: &mut P, cursor: &mut Cursor<J>, visit: &mut VisitFn<'_, P>) -> J {
    visit(tree, p, cursor).unwrap_or_else(|| {
        debug!("Ignoring deletion of required {:?}", tree.kind());
        tree.clone()
    })
}

fn visit_padded<P>(
    list: &PaddedVector<J>,
    p: &mut P,
    cursor: &mut Cursor<J>,
    visit: &mut VisitFn<'_, P>,
) -> Option<PaddedVector<J>> {
    let mut changed = false;
    let mut visited = Vec::with_capacity(list.len());
    for padded in list.iter() {
        match visit(&padded.element, p, cursor) {
            Some(element) => {
                changed |= !element.is_same_tree(&padded.element);
                visited.push(padded.clone().with_element(element));
            }
            None => changed = true,
        }
    }
    changed.then(|| visited.into_iter().collect())
}

fn visit_padded_fixed<T: JNode, P>(
    list: &PaddedVector<Arc<T>>,
    p: &mut P,
    cursor: &mut Cursor<J>,
    visit: &mut VisitFn<'_, P>,
) -> Option<PaddedVector<Arc<T>>> {
    let mut changed = false;
    let mut visited = Vec::with_capacity(list.len());
    for padded in list.iter() {
        match visit_fixed_opt(&padded.element, p, cursor, visit) {
            Some(element) => {
                changed |= !Arc::ptr_eq(&element, &padded.element);
                visited.push(padded.clone().with_element(element));
            }
            None => changed = true,
        }
    }
    changed.then(|| visited.into_iter().collect())
}

fn visit_container<P>(
    container: &Container<J>,
    p: &mut P,
    cursor: &mut Cursor<J>,
    visit: &mut VisitFn<'_, P>,
) -> Option<Container<J>> {
    visit_padded(&container.elements, p, cursor, visit).map(|elements| container.with_padded(elements))
}

fn same_optional(before: Option<&J>, after: Option<&J>) -> bool {
    match (before, after) {
        (Some(a), Some(b)) => a.is_same_tree(b),
        (None, None) => true,
        _ => false,
    }
}

pub fn walk_compilation_unit<P>(
    node: &Arc<CompilationUnit>,
    p: &mut P,
    cursor: &mut Cursor<J>,
    visit: &mut VisitFn<'_, P>,
) -> Arc<CompilationUnit> {
    let package = node.package.as_ref().map(|padded| {
        visit_fixed_opt(&padded.element, p, cursor, visit).map(|package| padded.clone().with_element(package))
    });
    let imports = visit_padded_fixed(&node.imports, p, cursor, visit);

    let mut classes_changed = false;
    let mut classes = Vec::with_capacity(node.classes.len());
    for class in node.classes.iter() {
        match visit_fixed_opt(class, p, cursor, visit) {
            Some(visited) => {
                classes_changed |= !Arc::ptr_eq(&visited, class);
                classes.push(visited);
            }
            None => classes_changed = true,
        }
    }

    let package_changed = match (&node.package, &package) {
        (Some(before), Some(Some(after))) => !Arc::ptr_eq(&before.element, &after.element),
        (None, None) => false,
        _ => true,
    };
    if !package_changed && imports.is_none() && !classes_changed {
        return Arc::clone(node);
    }
    Arc::new(CompilationUnit {
        package: package.flatten(),
        imports: imports.unwrap_or_else(|| node.imports.clone()),
        classes: if classes_changed { classes.into_iter().collect() } else { node.classes.clone() },
        ..(**node).clone()
    })
}

pub fn walk_package<P>(node: &Arc<Package>, p: &mut P, cursor: &mut Cursor<J>, visit: &mut VisitFn<'_, P>) -> Arc<Package> {
    let expression = visit_required(&node.expression, p, cursor, visit);
    if expression.is_same_tree(&node.expression) {
        Arc::clone(node)
    } else {
        Arc::new(Package { expression, ..(**node).clone() })
    }
}

pub fn walk_import<P>(node: &Arc<Import>, p: &mut P, cursor: &mut Cursor<J>, visit: &mut VisitFn<'_, P>) -> Arc<Import> {
    let qualid = visit_fixed(&node.qualid, p, cursor, visit);
    if Arc::ptr_eq(&qualid, &node.qualid) {
        Arc::clone(node)
    } else {
        Arc::new(Import { qualid, ..(**node).clone() })
    }
}

pub fn walk_class_declaration<P>(
    node: &Arc<ClassDeclaration>,
    p: &mut P,
    cursor: &mut Cursor<J>,
    visit: &mut VisitFn<'_, P>,
) -> Arc<ClassDeclaration> {
    let name = visit_fixed(&node.name, p, cursor, visit);
    let extends = node
        .extends
        .as_ref()
        .and_then(|padded| visit(&padded.element, p, cursor).map(|e| padded.clone().with_element(e)));
    let body = visit_fixed(&node.body, p, cursor, visit);

    if Arc::ptr_eq(&name, &node.name)
        && same_optional(node.extends.as_ref().map(|e| &e.element), extends.as_ref().map(|e| &e.element))
        && Arc::ptr_eq(&body, &node.body)
    {
        return Arc::clone(node);
    }
    Arc::new(ClassDeclaration { name, extends, body, ..(**node).clone() })
}

pub fn walk_method_declaration<P>(
    node: &Arc<MethodDeclaration>,
    p: &mut P,
    cursor: &mut Cursor<J>,
    visit: &mut VisitFn<'_, P>,
) -> Arc<MethodDeclaration> {
    let return_type = node.return_type.as_ref().and_then(|t| visit(t, p, cursor));
    let name = visit_fixed(&node.name, p, cursor, visit);
    let parameters = visit_container(&node.parameters, p, cursor, visit);
    let body = node.body.as_ref().and_then(|b| visit_fixed_opt(b, p, cursor, visit));

    let body_same = match (&node.body, &body) {
        (Some(a), Some(b)) => Arc::ptr_eq(a, b),
        (None, None) => true,
        _ => false,
    };
    if same_optional(node.return_type.as_ref(), return_type.as_ref())
        && Arc::ptr_eq(&name, &node.name)
        && parameters.is_none()
        && body_same
    {
        return Arc::clone(node);
    }
    Arc::new(MethodDeclaration {
        return_type,
        name,
        parameters: parameters.unwrap_or_else(|| node.parameters.clone()),
        body,
        ..(**node).clone()
    })
}

pub fn walk_block<P>(node: &Arc<Block>, p: &mut P, cursor: &mut Cursor<J>, visit: &mut VisitFn<'_, P>) -> Arc<Block> {
    match visit_padded(&node.statements, p, cursor, visit) {
        Some(statements) => Arc::new(Block { statements, ..(**node).clone() }),
        None => Arc::clone(node),
    }
}

pub fn walk_variable_declarations<P>(
    node: &Arc<VariableDeclarations>,
    p: &mut P,
    cursor: &mut Cursor<J>,
    visit: &mut VisitFn<'_, P>,
) -> Arc<VariableDeclarations> {
    let type_expression = node.type_expression.as_ref().and_then(|t| visit(t, p, cursor));
    let name = visit_fixed(&node.name, p, cursor, visit);
    let initializer = node
        .initializer
        .as_ref()
        .and_then(|padded| visit(&padded.element, p, cursor).map(|e| padded.clone().with_element(e)));

    if same_optional(node.type_expression.as_ref(), type_expression.as_ref())
        && Arc::ptr_eq(&name, &node.name)
        && same_optional(node.initializer.as_ref().map(|i| &i.element), initializer.as_ref().map(|i| &i.element))
    {
        return Arc::clone(node);
    }
    Arc::new(VariableDeclarations { type_expression, name, initializer, ..(**node).clone() })
}

pub fn walk_return<P>(node: &Arc<Return>, p: &mut P, cursor: &mut Cursor<J>, visit: &mut VisitFn<'_, P>) -> Arc<Return> {
    let expression = node.expression.as_ref().and_then(|e| visit(e, p, cursor));
    if same_optional(node.expression.as_ref(), expression.as_ref()) {
        Arc::clone(node)
    } else {
        Arc::new(Return { expression, ..(**node).clone() })
    }
}

pub fn walk_method_invocation<P>(
    node: &Arc<MethodInvocation>,
    p: &mut P,
    cursor: &mut Cursor<J>,
    visit: &mut VisitFn<'_, P>,
) -> Arc<MethodInvocation> {
    let select = node
        .select
        .as_ref()
        .and_then(|padded| visit(&padded.element, p, cursor).map(|e| padded.clone().with_element(e)));
    let name = visit_fixed(&node.name, p, cursor, visit);
    let arguments = visit_container(&node.arguments, p, cursor, visit);

    if same_optional(node.select(), select.as_ref().map(|s| &s.element))
        && Arc::ptr_eq(&name, &node.name)
        && arguments.is_none()
    {
        return Arc::clone(node);
    }
    Arc::new(MethodInvocation {
        select,
        name,
        arguments: arguments.unwrap_or_else(|| node.arguments.clone()),
        ..(**node).clone()
    })
}

pub fn walk_new_class<P>(node: &Arc<NewClass>, p: &mut P, cursor: &mut Cursor<J>, visit: &mut VisitFn<'_, P>) -> Arc<NewClass> {
    let clazz = visit_required(&node.clazz, p, cursor, visit);
    let arguments = visit_container(&node.arguments, p, cursor, visit);
    if clazz.is_same_tree(&node.clazz) && arguments.is_none() {
        return Arc::clone(node);
    }
    Arc::new(NewClass {
        clazz,
        arguments: arguments.unwrap_or_else(|| node.arguments.clone()),
        ..(**node).clone()
    })
}

pub fn walk_field_access<P>(
    node: &Arc<FieldAccess>,
    p: &mut P,
    cursor: &mut Cursor<J>,
    visit: &mut VisitFn<'_, P>,
) -> Arc<FieldAccess> {
    let target = visit_required(&node.target, p, cursor, visit);
    let name = visit_fixed(&node.name.element, p, cursor, visit);
    if target.is_same_tree(&node.target) && Arc::ptr_eq(&name, &node.name.element) {
        return Arc::clone(node);
    }
    Arc::new(FieldAccess { target, name: node.name.clone().with_element(name), ..(**node).clone() })
}

pub fn walk_binary<P>(node: &Arc<Binary>, p: &mut P, cursor: &mut Cursor<J>, visit: &mut VisitFn<'_, P>) -> Arc<Binary> {
    let left = visit_required(&node.left, p, cursor, visit);
    let right = visit_required(&node.right, p, cursor, visit);
    if left.is_same_tree(&node.left) && right.is_same_tree(&node.right) {
        Arc::clone(node)
    } else {
        Arc::new(Binary { left, right, ..(**node).clone() })
    }
}
