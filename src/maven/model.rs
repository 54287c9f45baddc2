//! Resolved POM model carried as a marker on Maven documents.

use std::collections::BTreeMap;
use std::fmt;
use std::sync::Arc;

use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::ir::xml_node::Tag;

use super::downloader::MavenDownloader;

static PROPERTY_REFERENCE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\$\{([^}]+)\}").expect("Property reference pattern must compile"));

/// Group, artifact and version coordinates.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Gav {
    pub group_id: String,
    pub artifact_id: String,
    pub version: Option<String>,
}

impl Gav {
    pub fn new(group_id: impl Into<String>, artifact_id: impl Into<String>, version: Option<&str>) -> Self {
        Gav {
            group_id: group_id.into(),
            artifact_id: artifact_id.into(),
            version: version.map(str::to_string),
        }
    }
}

impl fmt::Display for Gav {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.group_id, self.artifact_id)?;
        if let Some(version) = &self.version {
            write!(f, ":{}", version)?;
        }
        Ok(())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Dependency {
    pub gav: Gav,
    pub scope: Option<String>,
}

/// The semantic model of a `pom.xml`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Pom {
    pub gav: Gav,
    pub parent: Option<Gav>,
    pub packaging: String,
    /// Own properties merged over the inherited ones.
    pub properties: BTreeMap<String, String>,
    pub dependencies: Vec<Dependency>,
}

impl Pom {
    /// Builds the model of a `<project>` element, asking `downloader` for the parent
    /// so inherited properties and coordinates resolve.
    pub fn resolve(project: &Tag, downloader: &dyn MavenDownloader) -> Pom {
        let parent = project.child("parent").map(|parent| coordinates(&parent, None));
        let parent_pom = parent.as_ref().and_then(|gav| {
            let resolved = downloader.download_pom(gav);
            if resolved.is_none() {
                debug!("Parent {} could not be downloaded; resolving without it", gav);
            }
            resolved
        });

        let mut properties = parent_pom.as_ref().map(|p| p.properties.clone()).unwrap_or_default();
        if let Some(own) = project.child("properties") {
            for property in own.child_tags() {
                properties.insert(property.name.clone(), property.value().unwrap_or_default());
            }
        }

        let gav = coordinates(project, parent.as_ref());
        let dependencies = project
            .child("dependencies")
            .map(|deps| {
                deps.children("dependency")
                    .iter()
                    .map(|dep| Dependency { gav: coordinates(dep, None), scope: dep.child_value(&["scope"]) })
                    .collect()
            })
            .unwrap_or_default();

        let mut pom = Pom {
            gav,
            parent,
            packaging: project.child_value(&["packaging"]).unwrap_or_else(|| "jar".to_string()),
            properties,
            dependencies,
        };
        pom.gav.version = pom.gav.version.as_deref().map(|v| pom.value(v));
        pom
    }

    pub fn property(&self, key: &str) -> Option<&str> {
        self.properties.get(key).map(String::as_str)
    }

    pub fn with_property(&self, key: &str, value: &str) -> Pom {
        let mut properties = self.properties.clone();
        properties.insert(key.to_string(), value.to_string());
        Pom { properties, ..self.clone() }
    }

    /// Substitutes `${...}` references with property values; unknown keys stay as written.
    pub fn value(&self, text: &str) -> String {
        PROPERTY_REFERENCE
            .replace_all(text, |caps: &regex::Captures<'_>| {
                let key = &caps[1];
                match key {
                    "project.groupId" => self.gav.group_id.clone(),
                    "project.artifactId" => self.gav.artifact_id.clone(),
                    _ => self.property(key).map(str::to_string).unwrap_or_else(|| caps[0].to_string()),
                }
            })
            .into_owned()
    }

    pub fn find_dependency(&self, group_id: &str, artifact_id: &str) -> Option<&Dependency> {
        self.dependencies
            .iter()
            .find(|d| d.gav.group_id == group_id && d.gav.artifact_id == artifact_id)
    }
}

/// Sub-module models of a multi-module build.
#[derive(Debug, Clone, PartialEq)]
pub struct Modules {
    pub modules: Vec<Arc<Pom>>,
}

fn coordinates(tag: &Tag, inherited: Option<&Gav>) -> Gav {
    let group_id = tag
        .child_value(&["groupId"])
        .or_else(|| inherited.map(|p| p.group_id.clone()))
        .unwrap_or_default();
    let version = tag.child_value(&["version"]).or_else(|| inherited.and_then(|p| p.version.clone()));
    Gav {
        group_id,
        artifact_id: tag.child_value(&["artifactId"]).unwrap_or_default(),
        version,
    }
}
