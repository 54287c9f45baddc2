use std::path::PathBuf;
use std::sync::Arc;

use archery::ArcK;
use rpds::Vector;

pub use super::super::markers::Markers;
pub use super::super::node::{Space, TreeId};

pub type XmlVector = Vector<Xml, ArcK>;
pub type AttributeVector = Vector<Arc<Attribute>, ArcK>;

/// Represents every construct of the lossless XML tree.
///
/// # Examples
/// - `Tag`: `<version>1.0</version>` or `<br/>`
/// - `CharData`: the `1.0` inside the tag above
/// - `Comment`: `<!-- note -->`
#[derive(Debug, Clone, PartialEq)]
pub enum Xml {
    Document(Arc<XmlDocument>),
    Prolog(Arc<Prolog>),
    XmlDecl(Arc<XmlDecl>),
    Tag(Arc<Tag>),
    Attribute(Arc<Attribute>),
    CharData(Arc<CharData>),
    Comment(Arc<Comment>),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum XmlKind {
    Document,
    Prolog,
    XmlDecl,
    Tag,
    Attribute,
    CharData,
    Comment,
}

#[derive(Debug, Clone, PartialEq)]
pub struct XmlDocument {
    pub id: TreeId,
    pub prefix: Space,
    pub markers: Markers,
    pub source_path: PathBuf,
    pub prolog: Option<Arc<Prolog>>,
    pub root: Arc<Tag>,
    pub eof: Space,
}

/// Everything ahead of the root tag: the declaration and any comments.
#[derive(Debug, Clone, PartialEq)]
pub struct Prolog {
    pub id: TreeId,
    pub prefix: Space,
    pub markers: Markers,
    pub xml_decl: Option<Arc<XmlDecl>>,
    pub misc: XmlVector,
}

/// `<?xml version="1.0" encoding="UTF-8"?>`
#[derive(Debug, Clone, PartialEq)]
pub struct XmlDecl {
    pub id: TreeId,
    pub prefix: Space,
    pub markers: Markers,
    pub name: String,
    pub attributes: AttributeVector,
    /// Space before `?>`.
    pub before_close: Space,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Tag {
    pub id: TreeId,
    pub prefix: Space,
    pub markers: Markers,
    pub name: String,
    pub attributes: AttributeVector,
    /// `None` for a self-closing tag.
    pub content: Option<XmlVector>,
    /// Space before `>` or `/>` of the opening tag.
    pub before_close: Space,
    pub closing: Option<Closing>,
}

/// `</name>` of a tag with content.
#[derive(Debug, Clone, PartialEq)]
pub struct Closing {
    pub prefix: Space,
    pub name: String,
    pub before_close: Space,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Quote {
    Double,
    Single,
}

impl Quote {
    pub fn as_char(&self) -> char {
        match self {
            Quote::Double => '"',
            Quote::Single => '\'',
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct AttributeValue {
    pub before: Space,
    pub quote: Quote,
    pub value: String,
}

/// `key = "value"`
#[derive(Debug, Clone, PartialEq)]
pub struct Attribute {
    pub id: TreeId,
    pub prefix: Space,
    pub markers: Markers,
    pub key: String,
    pub before_equals: Space,
    pub value: AttributeValue,
}

#[derive(Debug, Clone, PartialEq)]
pub struct CharData {
    pub id: TreeId,
    pub prefix: Space,
    pub markers: Markers,
    pub cdata: bool,
    pub text: String,
    pub after_text: Space,
}

/// `<!--text-->`
#[derive(Debug, Clone, PartialEq)]
pub struct Comment {
    pub id: TreeId,
    pub prefix: Space,
    pub markers: Markers,
    pub text: String,
}
