//! Traversal and transformation of source trees.
//!
//! # Architecture
//!
//! - `java`: [`JavaVisitor`] (polymorphic), [`JavaIsoVisitor`] (kind-preserving)
//!   and the `walk_*` functions that implement default recursion for both
//! - `xml`: [`XmlVisitor`] and its walkers
//! - this module: [`SourceFile`], the language-neutral [`TreeVisitor`] that
//!   recipes hand out, and [`accept`], which routes a source file to whichever
//!   language capability the visitor offers
//!
//! # Pattern
//!
//! Each visitor method:
//! 1. Visits the children through the walker
//! 2. Checks whether any child changed using `Arc::ptr_eq()`
//! 3. Returns the original node if unchanged, a rebuilt node otherwise
//!
//! so a traversal that changes nothing returns the input allocation.

use std::path::Path;
use std::sync::Arc;

use tracing::{trace, warn};

use super::cursor::Cursor;
use super::java_node::{CompilationUnit, J};
use super::markers::Markers;
use super::node::TreeId;
use super::transforms::pretty_printer::{print_java, print_xml};
use super::xml_node::{Xml, XmlDocument};
use crate::maven::{MavenDocument, MavenVisitor};

mod java;
mod xml;

pub use java::*;
pub use xml::*;

/// A parsed source file of any supported language.
#[derive(Debug, Clone)]
pub enum SourceFile {
    Java(Arc<CompilationUnit>),
    Xml(Arc<XmlDocument>),
    Maven(MavenDocument),
}

impl SourceFile {
    pub fn id(&self) -> TreeId {
        match self {
            SourceFile::Java(cu) => cu.id,
            SourceFile::Xml(doc) => doc.id,
            SourceFile::Maven(maven) => maven.document().id,
        }
    }

    pub fn source_path(&self) -> &Path {
        match self {
            SourceFile::Java(cu) => &cu.source_path,
            SourceFile::Xml(doc) => &doc.source_path,
            SourceFile::Maven(maven) => &maven.document().source_path,
        }
    }

    pub fn markers(&self) -> &Markers {
        match self {
            SourceFile::Java(cu) => &cu.markers,
            SourceFile::Xml(doc) => &doc.markers,
            SourceFile::Maven(maven) => &maven.document().markers,
        }
    }

    pub fn language(&self) -> &'static str {
        match self {
            SourceFile::Java(_) => "java",
            SourceFile::Xml(_) => "xml",
            SourceFile::Maven(_) => "maven",
        }
    }

    /// Whether both values hold the very same tree allocation.
    pub fn is_same_tree(&self, other: &SourceFile) -> bool {
        match (self, other) {
            (SourceFile::Java(a), SourceFile::Java(b)) => Arc::ptr_eq(a, b),
            (SourceFile::Xml(a), SourceFile::Xml(b)) => Arc::ptr_eq(a, b),
            (SourceFile::Maven(a), SourceFile::Maven(b)) => Arc::ptr_eq(a.document(), b.document()),
            _ => false,
        }
    }

    /// Re-emits the source text.
    pub fn print(&self) -> String {
        match self {
            SourceFile::Java(cu) => print_java(&J::CompilationUnit(Arc::clone(cu))),
            SourceFile::Xml(doc) => print_xml(&Xml::Document(Arc::clone(doc))),
            SourceFile::Maven(maven) => print_xml(&Xml::Document(Arc::clone(maven.document()))),
        }
    }

    pub fn as_java(&self) -> Option<&Arc<CompilationUnit>> {
        match self {
            SourceFile::Java(cu) => Some(cu),
            _ => None,
        }
    }

    pub fn as_maven(&self) -> Option<&MavenDocument> {
        match self {
            SourceFile::Maven(maven) => Some(maven),
            _ => None,
        }
    }
}

impl From<Arc<CompilationUnit>> for SourceFile {
    fn from(cu: Arc<CompilationUnit>) -> Self {
        SourceFile::Java(cu)
    }
}

impl From<MavenDocument> for SourceFile {
    fn from(maven: MavenDocument) -> Self {
        SourceFile::Maven(maven)
    }
}

/// Outcome of visiting a whole source file.
#[derive(Debug, Clone)]
pub enum Visited {
    Tree(SourceFile),
    Deleted,
    /// The visitor has no capability for this kind of source file.
    Unsupported,
}

impl Visited {
    pub fn into_tree(self) -> Option<SourceFile> {
        match self {
            Visited::Tree(tree) => Some(tree),
            _ => None,
        }
    }
}

/// Language-neutral visitor handed out by recipes.
///
/// A visitor declares what it can traverse by overriding the capability
/// accessors; [`accept`] picks the one matching the source file. Wrappers such
/// as preconditions override [`TreeVisitor::visit_source`] instead.
pub trait TreeVisitor<P> {
    fn is_acceptable(&self, _source: &SourceFile, _p: &mut P) -> bool {
        true
    }

    fn as_java(&mut self) -> Option<&mut dyn JavaVisitor<P>> {
        None
    }

    fn as_xml(&mut self) -> Option<&mut dyn XmlVisitor<P>> {
        None
    }

    fn as_maven(&mut self) -> Option<&mut dyn MavenVisitor<P>> {
        None
    }

    fn visit_source(&mut self, source: &SourceFile, p: &mut P) -> Visited {
        if !self.is_acceptable(source, p) {
            trace!("Visitor skips {} source {}", source.language(), source.source_path().display());
            return Visited::Tree(source.clone());
        }
        dispatch(self, source, p)
    }
}

/// Routes `source` to the capability of `visitor` matching its language.
///
/// A Maven document goes to the Maven capability when offered, otherwise to the
/// XML capability on its base document, and the result is re-wrapped so it stays
/// a Maven document.
pub fn dispatch<P, V: TreeVisitor<P> + ?Sized>(visitor: &mut V, source: &SourceFile, p: &mut P) -> Visited {
    match source {
        SourceFile::Java(cu) => {
            let Some(java) = visitor.as_java() else {
                return Visited::Unsupported;
            };
            let tree = J::CompilationUnit(Arc::clone(cu));
            match java.visit(&tree, p, &mut Cursor::new()) {
                Some(J::CompilationUnit(visited)) => Visited::Tree(SourceFile::Java(visited)),
                Some(other) => {
                    warn!("Visitor replaced a compilation unit with {:?}; keeping the original", other.kind());
                    Visited::Tree(source.clone())
                }
                None => Visited::Deleted,
            }
        }
        SourceFile::Xml(doc) => match visitor.as_xml() {
            Some(xml) => visit_xml_document(xml, doc, p)
                .map_or(Visited::Deleted, |visited| Visited::Tree(SourceFile::Xml(visited))),
            None => Visited::Unsupported,
        },
        SourceFile::Maven(maven) => {
            if let Some(maven_visitor) = visitor.as_maven() {
                return maven_visitor
                    .visit_maven(maven, p, &mut Cursor::new())
                    .map_or(Visited::Deleted, |visited| Visited::Tree(SourceFile::Maven(visited)));
            }
            match visitor.as_xml() {
                Some(xml) => visit_xml_document(xml, maven.document(), p).map_or(Visited::Deleted, |visited| {
                    Visited::Tree(SourceFile::Maven(maven.with_document(visited)))
                }),
                None => Visited::Unsupported,
            }
        }
    }
}

/// Visits `source` with `visitor`; see [`TreeVisitor::visit_source`].
pub fn accept<P>(source: &SourceFile, visitor: &mut dyn TreeVisitor<P>, p: &mut P) -> Visited {
    visitor.visit_source(source, p)
}

/// Offers a [`JavaVisitor`] as a [`TreeVisitor`]; other languages are unsupported.
pub struct JavaSource<V>(pub V);

impl<P, V: JavaVisitor<P>> TreeVisitor<P> for JavaSource<V> {
    fn as_java(&mut self) -> Option<&mut dyn JavaVisitor<P>> {
        Some(&mut self.0)
    }
}

/// Offers an [`XmlVisitor`] for plain XML and Maven documents alike.
pub struct XmlSource<V>(pub V);

impl<P, V: XmlVisitor<P>> TreeVisitor<P> for XmlSource<V> {
    fn as_xml(&mut self) -> Option<&mut dyn XmlVisitor<P>> {
        Some(&mut self.0)
    }
}

/// Offers a [`MavenVisitor`]; plain XML documents are unsupported.
pub struct MavenSource<V>(pub V);

impl<P, V: MavenVisitor<P>> TreeVisitor<P> for MavenSource<V> {
    fn as_maven(&mut self) -> Option<&mut dyn MavenVisitor<P>> {
        Some(&mut self.0)
    }
}

/// Visits nothing.
pub struct Noop;

impl<P> TreeVisitor<P> for Noop {}

fn visit_xml_document<P>(xml: &mut dyn XmlVisitor<P>, doc: &Arc<XmlDocument>, p: &mut P) -> Option<Arc<XmlDocument>> {
    let tree = Xml::Document(Arc::clone(doc));
    match xml.visit(&tree, p, &mut Cursor::new())? {
        Xml::Document(visited) => Some(visited),
        other => {
            warn!("Visitor replaced a document with {:?}; keeping the original", other.kind());
            Some(Arc::clone(doc))
        }
    }
}
