use crate::ir::xml_node::*;

/// Re-emits XML trees token by token.
#[derive(Default)]
pub struct XmlPrinter {
    result: String,
}

impl XmlPrinter {
    pub fn new() -> Self {
        XmlPrinter::default()
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

    pub fn print(&mut self, tree: &Xml) {
        match tree {
            Xml::Document(node) => {
                self.space(&node.prefix);
                if let Some(prolog) = &node.prolog {
                    self.print_prolog(prolog);
                }
                self.print_tag(&node.root);
                self.space(&node.eof);
            }
            Xml::Prolog(node) => self.print_prolog(node),
            Xml::XmlDecl(node) => self.print_xml_decl(node),
            Xml::Tag(node) => self.print_tag(node),
            Xml::Attribute(node) => self.print_attribute(node),
            Xml::CharData(node) => {
                self.space(&node.prefix);
                if node.cdata {
                    self.append("<![CDATA[");
                    self.append(&node.text);
                    self.append("]]>");
                } else {
                    self.append(&node.text);
                }
                self.space(&node.after_text);
            }
            Xml::Comment(node) => {
                self.space(&node.prefix);
                self.append("<!--");
                self.append(&node.text);
                self.append("-->");
            }
        }
    }

    fn print_prolog(&mut self, node: &Prolog) {
        self.space(&node.prefix);
        if let Some(decl) = &node.xml_decl {
            self.print_xml_decl(decl);
        }
        for misc in node.misc.iter() {
            self.print(misc);
        }
    }

    fn print_xml_decl(&mut self, node: &XmlDecl) {
        self.space(&node.prefix);
        self.append("<?");
        self.append(&node.name);
        for attribute in node.attributes.iter() {
            self.print_attribute(attribute);
        }
        self.space(&node.before_close);
        self.append("?>");
    }

    fn print_tag(&mut self, node: &Tag) {
        self.space(&node.prefix);
        self.append("<");
        self.append(&node.name);
        for attribute in node.attributes.iter() {
            self.print_attribute(attribute);
        }
        self.space(&node.before_close);
        let Some(content) = &node.content else {
            self.append("/>");
            return;
        };
        self.append(">");
        for child in content.iter() {
            self.print(child);
        }
        match &node.closing {
            Some(closing) => {
                self.space(&closing.prefix);
                self.append("</");
                self.append(&closing.name);
                self.space(&closing.before_close);
                self.append(">");
            }
            None => {
                self.append("</");
                self.append(&node.name);
                self.append(">");
            }
        }
    }

    fn print_attribute(&mut self, node: &Attribute) {
        self.space(&node.prefix);
        self.append(&node.key);
        self.space(&node.before_equals);
        self.append("=");
        self.space(&node.value.before);
        let quote = node.value.quote.as_char();
        self.result.push(quote);
        self.append(&node.value.value);
        self.result.push(quote);
    }
}
