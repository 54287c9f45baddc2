use std::sync::Arc;

use tracing::warn;

use crate::ir::cursor::Cursor;
use crate::ir::visitor::XmlVisitor;
use crate::ir::xml_node::Xml;

use super::document::MavenDocument;

/// XML visitor with a dedicated entry point for Maven documents.
///
/// When [`crate::ir::visitor::accept`] meets a Maven document and the visitor
/// offers this capability, it calls [`MavenVisitor::visit_maven`] instead of
/// visiting the bare XML tree. Implementors typically capture the model there
/// and then call [`walk_maven`].
pub trait MavenVisitor<P>: XmlVisitor<P> {
    fn visit_maven(&mut self, maven: &MavenDocument, p: &mut P, cursor: &mut Cursor<Xml>) -> Option<MavenDocument> {
        walk_maven(self, maven, p, cursor)
    }

    /// Whether the current tag is an entry of `/project/properties`.
    fn is_property_tag(&self, cursor: &Cursor<Xml>) -> bool {
        let path = cursor.tag_path();
        path.len() == 3 && path[0] == "project" && path[1] == "properties"
    }

    /// Whether the current tag is `/project/dependencies/dependency`.
    fn is_dependency_tag(&self, cursor: &Cursor<Xml>) -> bool {
        cursor.tag_path() == ["project", "dependencies", "dependency"]
    }
}

/// Visits the XML body of `maven` and wraps the result as a Maven document again.
pub fn walk_maven<P, V: XmlVisitor<P> + ?Sized>(
    visitor: &mut V,
    maven: &MavenDocument,
    p: &mut P,
    cursor: &mut Cursor<Xml>,
) -> Option<MavenDocument> {
    let tree = Xml::Document(Arc::clone(maven.document()));
    match visitor.visit(&tree, p, cursor)? {
        Xml::Document(document) => Some(maven.with_document(document)),
        other => {
            warn!("Visitor replaced a Maven document with {:?}; keeping the original", other.kind());
            Some(maven.clone())
        }
    }
}
