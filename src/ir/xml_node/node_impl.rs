use std::sync::Arc;

use tracing::trace;

use super::node_types::*;

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

/// Links a concrete XML node struct with its [`Xml`] variant.
pub trait XmlNode: Sized {
    const KIND: XmlKind;

    fn from_xml(tree: &Xml) -> Option<Arc<Self>>;

    fn into_xml(node: Arc<Self>) -> Xml;
}

macro_rules! xml_node {
    ($($variant:ident => $kind:ident),* $(,)?) => {
        $(
            impl XmlNode for $kind {
                const KIND: XmlKind = XmlKind::$variant;

                fn from_xml(tree: &Xml) -> Option<Arc<Self>> {
                    match tree {
                        Xml::$variant(node) => Some(Arc::clone(node)),
                        _ => None,
                    }
                }

                fn into_xml(node: Arc<Self>) -> Xml {
                    Xml::$variant(node)
                }
            }

            impl From<Arc<$kind>> for Xml {
                fn from(node: Arc<$kind>) -> Xml {
                    Xml::$variant(node)
                }
            }

            with_fields!($kind {
                with_prefix => prefix: Space,
                with_markers => markers: Markers,
            });
        )*
    };
}

xml_node!(
    Document => XmlDocument,
    Prolog => Prolog,
    XmlDecl => XmlDecl,
    Tag => Tag,
    Attribute => Attribute,
    CharData => CharData,
    Comment => Comment,
);

with_fields!(XmlDocument {
    with_prolog => prolog: Option<Arc<Prolog>>,
    with_root => root: Arc<Tag>,
    with_eof => eof: Space,
});

with_fields!(Prolog {
    with_xml_decl => xml_decl: Option<Arc<XmlDecl>>,
    with_misc => misc: XmlVector,
});

with_fields!(Tag {
    with_name => name: String,
    with_attributes => attributes: AttributeVector,
    with_content => content: Option<XmlVector>,
});

with_fields!(CharData {
    with_text => text: String,
});

with_fields!(Attribute {
    with_value => value: AttributeValue,
});

impl Xml {
    pub fn id(&self) -> TreeId {
        match self {
            Xml::Document(n) => n.id,
            Xml::Prolog(n) => n.id,
            Xml::XmlDecl(n) => n.id,
            Xml::Tag(n) => n.id,
            Xml::Attribute(n) => n.id,
            Xml::CharData(n) => n.id,
            Xml::Comment(n) => n.id,
        }
    }

    pub fn prefix(&self) -> &Space {
        match self {
            Xml::Document(n) => &n.prefix,
            Xml::Prolog(n) => &n.prefix,
            Xml::XmlDecl(n) => &n.prefix,
            Xml::Tag(n) => &n.prefix,
            Xml::Attribute(n) => &n.prefix,
            Xml::CharData(n) => &n.prefix,
            Xml::Comment(n) => &n.prefix,
        }
    }

    pub fn markers(&self) -> &Markers {
        match self {
            Xml::Document(n) => &n.markers,
            Xml::Prolog(n) => &n.markers,
            Xml::XmlDecl(n) => &n.markers,
            Xml::Tag(n) => &n.markers,
            Xml::Attribute(n) => &n.markers,
            Xml::CharData(n) => &n.markers,
            Xml::Comment(n) => &n.markers,
        }
    }

    pub fn with_prefix(&self, prefix: Space) -> Xml {
        match self {
            Xml::Document(n) => Xml::Document(n.with_prefix(prefix)),
            Xml::Prolog(n) => Xml::Prolog(n.with_prefix(prefix)),
            Xml::XmlDecl(n) => Xml::XmlDecl(n.with_prefix(prefix)),
            Xml::Tag(n) => Xml::Tag(n.with_prefix(prefix)),
            Xml::Attribute(n) => Xml::Attribute(n.with_prefix(prefix)),
            Xml::CharData(n) => Xml::CharData(n.with_prefix(prefix)),
            Xml::Comment(n) => Xml::Comment(n.with_prefix(prefix)),
        }
    }

    pub fn kind(&self) -> XmlKind {
        match self {
            Xml::Document(_) => XmlKind::Document,
            Xml::Prolog(_) => XmlKind::Prolog,
            Xml::XmlDecl(_) => XmlKind::XmlDecl,
            Xml::Tag(_) => XmlKind::Tag,
            Xml::Attribute(_) => XmlKind::Attribute,
            Xml::CharData(_) => XmlKind::CharData,
            Xml::Comment(_) => XmlKind::Comment,
        }
    }

    pub fn is_same_tree(&self, other: &Xml) -> bool {
        match (self, other) {
            (Xml::Document(a), Xml::Document(b)) => Arc::ptr_eq(a, b),
            (Xml::Prolog(a), Xml::Prolog(b)) => Arc::ptr_eq(a, b),
            (Xml::XmlDecl(a), Xml::XmlDecl(b)) => Arc::ptr_eq(a, b),
            (Xml::Tag(a), Xml::Tag(b)) => Arc::ptr_eq(a, b),
            (Xml::Attribute(a), Xml::Attribute(b)) => Arc::ptr_eq(a, b),
            (Xml::CharData(a), Xml::CharData(b)) => Arc::ptr_eq(a, b),
            (Xml::Comment(a), Xml::Comment(b)) => Arc::ptr_eq(a, b),
            _ => false,
        }
    }

    pub fn cast<T: XmlNode>(&self) -> Option<Arc<T>> {
        T::from_xml(self)
    }

    pub fn as_tag(&self) -> Option<&Arc<Tag>> {
        match self {
            Xml::Tag(tag) => Some(tag),
            _ => None,
        }
    }
}

impl Tag {
    /// Child tags in document order.
    pub fn child_tags(&self) -> Vec<Arc<Tag>> {
        self.content
            .as_ref()
            .map(|content| content.iter().filter_map(|c| c.as_tag().cloned()).collect())
            .unwrap_or_default()
    }

    pub fn child(&self, name: &str) -> Option<Arc<Tag>> {
        self.child_tags().into_iter().find(|t| t.name == name)
    }

    pub fn children(&self, name: &str) -> Vec<Arc<Tag>> {
        self.child_tags().into_iter().filter(|t| t.name == name).collect()
    }

    /// Text of a tag whose only content is character data.
    pub fn value(&self) -> Option<String> {
        let content = self.content.as_ref()?;
        match (content.len(), content.first()) {
            (1, Some(Xml::CharData(chars))) => Some(chars.text.clone()),
            (0, _) => Some(String::new()),
            _ => None,
        }
    }

    /// Text of the first descendant reached through `path`, e.g. `["parent", "version"]`.
    pub fn child_value(&self, path: &[&str]) -> Option<String> {
        let (first, rest) = path.split_first()?;
        let child = self.child(first)?;
        if rest.is_empty() { child.value() } else { child.child_value(rest) }
    }

    /// Replaces the content with a single character data node holding `value`.
    ///
    /// A self-closing tag gains a closing tag. Existing character data keeps its
    /// identity and surrounding formatting.
    pub fn with_value(self: &Arc<Self>, value: &str) -> Arc<Tag> {
        if self.value().as_deref() == Some(value) {
            return Arc::clone(self);
        }
        trace!("Setting value of <{}> to {:?}", self.name, value);
        let chars = match self.content.as_ref().and_then(|c| c.first()) {
            Some(Xml::CharData(existing)) if self.content.as_ref().is_some_and(|c| c.len() == 1) => {
                existing.with_text(value.to_string())
            }
            _ => Arc::new(CharData {
                id: TreeId::random(),
                prefix: Space::EMPTY,
                markers: Markers::empty(),
                cdata: false,
                text: value.to_string(),
                after_text: Space::EMPTY,
            }),
        };
        let content: XmlVector = std::iter::once(Xml::CharData(chars)).collect();
        let closing = self.closing.clone().unwrap_or_else(|| Closing {
            prefix: Space::EMPTY,
            name: self.name.clone(),
            before_close: Space::EMPTY,
        });
        Arc::new(Tag { content: Some(content), closing: Some(closing), ..(**self).clone() })
    }

    /// Replaces the first direct child that is the very same allocation as `old`.
    pub fn with_child_replaced(self: &Arc<Self>, old: &Arc<Tag>, new: Arc<Tag>) -> Arc<Tag> {
        if Arc::ptr_eq(old, &new) {
            return Arc::clone(self);
        }
        let Some(content) = &self.content else {
            return Arc::clone(self);
        };
        let replaced: XmlVector = content
            .iter()
            .map(|c| match c {
                Xml::Tag(t) if Arc::ptr_eq(t, old) => Xml::Tag(Arc::clone(&new)),
                other => other.clone(),
            })
            .collect();
        self.with_content(Some(replaced))
    }

    pub fn attribute_value(&self, key: &str) -> Option<&str> {
        self.attributes.iter().find(|a| a.key == key).map(|a| a.value.value.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn tag(name: &str, content: Option<XmlVector>) -> Arc<Tag> {
        Arc::new(Tag {
            id: TreeId::random(),
            prefix: Space::EMPTY,
            markers: Markers::empty(),
            name: name.to_string(),
            attributes: AttributeVector::new_with_ptr_kind(),
            closing: content.as_ref().map(|_| Closing {
                prefix: Space::EMPTY,
                name: name.to_string(),
                before_close: Space::EMPTY,
            }),
            content,
            before_close: Space::EMPTY,
        })
    }

    #[test]
    fn test_with_value_on_self_closing_tag_adds_closing() {
        let empty = tag("version", None);
        let valued = empty.with_value("1.0");
        assert_eq!(valued.value().as_deref(), Some("1.0"));
        assert!(valued.closing.is_some());
        assert!(valued.id.is_same(&empty.id));
    }

    #[test]
    fn test_with_same_value_is_identity() {
        let valued = tag("version", None).with_value("1.0");
        assert!(Arc::ptr_eq(&valued, &valued.with_value("1.0")));
    }

    #[test]
    fn test_child_value_follows_path() {
        let version = tag("version", None).with_value("2.0");
        let parent = tag("parent", Some(std::iter::once(Xml::Tag(version)).collect()));
        let project = tag("project", Some(std::iter::once(Xml::Tag(parent)).collect()));
        assert_eq!(project.child_value(&["parent", "version"]).as_deref(), Some("2.0"));
        assert_eq!(project.child_value(&["parent", "groupId"]), None);
    }
}
