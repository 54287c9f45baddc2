use std::sync::Arc;

use serde::{Deserialize, Serialize};
use tracing::debug;

use super::document::MavenDocument;
use super::visitor::{MavenVisitor, walk_maven};
use crate::ir::cursor::Cursor;
use crate::ir::visitor::{MavenSource, TreeVisitor, XmlVisitor, walk_tag};
use crate::ir::xml_node::{Tag, Xml};
use crate::recipe::{ExecutionContext, OptionDescriptor, Recipe};

/// Sets the value of a property declared in a POM's `<properties>` section.
///
/// Only properties the document itself declares are edited; inherited ones are
/// left to the parent. The model marker is kept in sync with the new value.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChangePropertyValue {
    pub key: String,
    pub new_value: String,
}

impl ChangePropertyValue {
    pub fn new(key: impl Into<String>, new_value: impl Into<String>) -> Self {
        ChangePropertyValue { key: key.into(), new_value: new_value.into() }
    }
}

impl Recipe for ChangePropertyValue {
    fn name(&self) -> &'static str {
        "maven.ChangePropertyValue"
    }

    fn display_name(&self) -> String {
        "Change Maven project property value".to_string()
    }

    fn description(&self) -> String {
        "Changes the specified Maven project property value leaving the key intact.".to_string()
    }

    fn instance_name(&self) -> String {
        format!("Change property `{}` to `{}`", self.key, self.new_value)
    }

    fn options(&self) -> Vec<OptionDescriptor> {
        vec![
            OptionDescriptor::new("key", "Key", "The name of the property key whose value is to be changed.", &self.key)
                .with_example("junit.version"),
            OptionDescriptor::new("newValue", "Value", "Value to apply to the matching property.", &self.new_value)
                .with_example("4.13"),
        ]
    }

    fn visitor(&self) -> Box<dyn TreeVisitor<ExecutionContext>> {
        Box::new(MavenSource(ChangeProperty { key: self.key.clone(), new_value: self.new_value.clone() }))
    }
}

struct ChangeProperty {
    key: String,
    new_value: String,
}

impl XmlVisitor<ExecutionContext> for ChangeProperty {
    fn visit_tag(&mut self, node: &Arc<Tag>, ctx: &mut ExecutionContext, cursor: &mut Cursor<Xml>) -> Option<Xml> {
        let tag = walk_tag(node, ctx, cursor, &mut |tree: &Xml, p: &mut ExecutionContext, c: &mut Cursor<Xml>| {
            self.visit(tree, p, c)
        });
        if tag.name == self.key && self.is_property_tag(cursor) && tag.value().as_deref() != Some(self.new_value.as_str()) {
            debug!("Property {} set to {}", self.key, self.new_value);
            return Some(Xml::Tag(tag.with_value(&self.new_value)));
        }
        Some(Xml::Tag(tag))
    }
}

impl MavenVisitor<ExecutionContext> for ChangeProperty {
    fn visit_maven(
        &mut self,
        maven: &MavenDocument,
        ctx: &mut ExecutionContext,
        cursor: &mut Cursor<Xml>,
    ) -> Option<MavenDocument> {
        let visited = walk_maven(self, maven, ctx, cursor)?;
        if Arc::ptr_eq(visited.document(), maven.document()) {
            return Some(visited);
        }
        let model = visited.model().with_property(&self.key, &self.new_value);
        Some(visited.with_model(model))
    }
}
