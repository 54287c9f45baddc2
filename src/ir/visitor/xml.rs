use std::sync::Arc;

use tracing::{debug, warn};

use crate::ir::cursor::Cursor;
use crate::ir::xml_node::*;

pub type XmlVisitFn<'a, P> = dyn FnMut(&Xml, &mut P, &mut Cursor<Xml>) -> Option<Xml> + 'a;

macro_rules! recurse {
    ($visitor:ident) => {
        &mut |tree: &Xml, p: &mut P, cursor: &mut Cursor<Xml>| $visitor.visit(tree, p, cursor)
    };
}

/// Polymorphic visitor over XML trees, built the same way as the Java visitor.
pub trait XmlVisitor<P> {
    fn visit(&mut self, tree: &Xml, p: &mut P, cursor: &mut Cursor<Xml>) -> Option<Xml> {
        cursor.push(tree.clone());
        let visited = match tree {
            Xml::Document(node) => self.visit_document(node, p, cursor),
            Xml::Prolog(node) => self.visit_prolog(node, p, cursor),
            Xml::XmlDecl(node) => self.visit_xml_decl(node, p, cursor),
            Xml::Tag(node) => self.visit_tag(node, p, cursor),
            Xml::Attribute(node) => self.visit_attribute(node, p, cursor),
            Xml::CharData(node) => self.visit_char_data(node, p, cursor),
            Xml::Comment(node) => self.visit_comment(node, p, cursor),
        };
        cursor.pop();
        visited
    }

    fn visit_document(&mut self, node: &Arc<XmlDocument>, p: &mut P, cursor: &mut Cursor<Xml>) -> Option<Xml> {
        Some(Xml::Document(walk_document(node, p, cursor, recurse!(self))))
    }

    fn visit_prolog(&mut self, node: &Arc<Prolog>, p: &mut P, cursor: &mut Cursor<Xml>) -> Option<Xml> {
        Some(Xml::Prolog(walk_prolog(node, p, cursor, recurse!(self))))
    }

    fn visit_xml_decl(&mut self, node: &Arc<XmlDecl>, p: &mut P, cursor: &mut Cursor<Xml>) -> Option<Xml> {
        Some(Xml::XmlDecl(walk_xml_decl(node, p, cursor, recurse!(self))))
    }

    fn visit_tag(&mut self, node: &Arc<Tag>, p: &mut P, cursor: &mut Cursor<Xml>) -> Option<Xml> {
        Some(Xml::Tag(walk_tag(node, p, cursor, recurse!(self))))
    }

    fn visit_attribute(&mut self, node: &Arc<Attribute>, _p: &mut P, _cursor: &mut Cursor<Xml>) -> Option<Xml> {
        Some(Xml::Attribute(Arc::clone(node)))
    }

    fn visit_char_data(&mut self, node: &Arc<CharData>, _p: &mut P, _cursor: &mut Cursor<Xml>) -> Option<Xml> {
        Some(Xml::CharData(Arc::clone(node)))
    }

    fn visit_comment(&mut self, node: &Arc<Comment>, _p: &mut P, _cursor: &mut Cursor<Xml>) -> Option<Xml> {
        Some(Xml::Comment(Arc::clone(node)))
    }
}

fn visit_fixed_opt<T: XmlNode, P>(
    node: &Arc<T>,
    p: &mut P,
    cursor: &mut Cursor<Xml>,
    visit: &mut XmlVisitFn<'_, P>,
) -> Option<Arc<T>> {
    let tree = T::into_xml(Arc::clone(node));
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

fn visit_list<P>(list: &XmlVector, p: &mut P, cursor: &mut Cursor<Xml>, visit: &mut XmlVisitFn<'_, P>) -> Option<XmlVector> {
    let mut changed = false;
    let mut visited = Vec::with_capacity(list.len());
    for child in list.iter() {
        match visit(child, p, cursor) {
            Some(v) => {
                changed |= !v.is_same_tree(child);
                visited.push(v);
            }
            None => changed = true,
        }
    }
    changed.then(|| visited.into_iter().collect())
}

fn visit_attributes<P>(
    list: &AttributeVector,
    p: &mut P,
    cursor: &mut Cursor<Xml>,
    visit: &mut XmlVisitFn<'_, P>,
) -> Option<AttributeVector> {
    let mut changed = false;
    let mut visited = Vec::with_capacity(list.len());
    for attribute in list.iter() {
        match visit_fixed_opt(attribute, p, cursor, visit) {
            Some(v) => {
                changed |= !Arc::ptr_eq(&v, attribute);
                visited.push(v);
            }
            None => changed = true,
        }
    }
    changed.then(|| visited.into_iter().collect())
}

pub fn walk_document<P>(
    node: &Arc<XmlDocument>,
    p: &mut P,
    cursor: &mut Cursor<Xml>,
    visit: &mut XmlVisitFn<'_, P>,
) -> Arc<XmlDocument> {
    let prolog = node.prolog.as_ref().and_then(|prolog| visit_fixed_opt(prolog, p, cursor, visit));
    let root = visit_fixed_opt(&node.root, p, cursor, visit).unwrap_or_else(|| {
        debug!("Ignoring deletion of the root tag <{}>", node.root.name);
        Arc::clone(&node.root)
    });

    let prolog_same = match (&node.prolog, &prolog) {
        (Some(a), Some(b)) => Arc::ptr_eq(a, b),
        (None, None) => true,
        _ => false,
    };
    if prolog_same && Arc::ptr_eq(&root, &node.root) {
        return Arc::clone(node);
    }
    Arc::new(XmlDocument { prolog, root, ..(**node).clone() })
}

pub fn walk_prolog<P>(node: &Arc<Prolog>, p: &mut P, cursor: &mut Cursor<Xml>, visit: &mut XmlVisitFn<'_, P>) -> Arc<Prolog> {
    let xml_decl = node.xml_decl.as_ref().and_then(|decl| visit_fixed_opt(decl, p, cursor, visit));
    let misc = visit_list(&node.misc, p, cursor, visit);

    let decl_same = match (&node.xml_decl, &xml_decl) {
        (Some(a), Some(b)) => Arc::ptr_eq(a, b),
        (None, None) => true,
        _ => false,
    };
    if decl_same && misc.is_none() {
        return Arc::clone(node);
    }
    Arc::new(Prolog { xml_decl, misc: misc.unwrap_or_else(|| node.misc.clone()), ..(**node).clone() })
}

pub fn walk_xml_decl<P>(node: &Arc<XmlDecl>, p: &mut P, cursor: &mut Cursor<Xml>, visit: &mut XmlVisitFn<'_, P>) -> Arc<XmlDecl> {
    match visit_attributes(&node.attributes, p, cursor, visit) {
        Some(attributes) => Arc::new(XmlDecl { attributes, ..(**node).clone() }),
        None => Arc::clone(node),
    }
}

pub fn walk_tag<P>(node: &Arc<Tag>, p: &mut P, cursor: &mut Cursor<Xml>, visit: &mut XmlVisitFn<'_, P>) -> Arc<Tag> {
    let attributes = visit_attributes(&node.attributes, p, cursor, visit);
    let content = node.content.as_ref().and_then(|content| visit_list(content, p, cursor, visit));
    if attributes.is_none() && content.is_none() {
        return Arc::clone(node);
    }
    Arc::new(Tag {
        attributes: attributes.unwrap_or_else(|| node.attributes.clone()),
        content: content.or_else(|| node.content.clone()),
        ..(**node).clone()
    })
}
