use std::fmt;
use std::sync::Arc;

use tracing::debug;

use crate::ir::markers::Markers;
use crate::ir::node::Space;
use crate::ir::xml_node::{Prolog, Tag, XmlDocument};

use super::downloader::MavenDownloader;
use super::model::{Modules, Pom};

/// A `pom.xml` document: the XML tree plus its resolved model.
///
/// Holds the generic document rather than extending it. Every mutator delegates
/// to the [`XmlDocument`] operation and wraps the result again, carrying the
/// downloader handle forward and re-reading model and modules from the markers,
/// so a Maven document stays a Maven document through any chain of edits.
#[derive(Clone)]
pub struct MavenDocument {
    document: Arc<XmlDocument>,
    model: Arc<Pom>,
    modules: Arc<[Arc<Pom>]>,
    downloader: Arc<dyn MavenDownloader>,
}

impl MavenDocument {
    /// Wraps a document that already carries its [`Pom`] marker.
    ///
    /// # Panics
    /// When the document has no `Pom` marker. Such a document was never resolved
    /// as a POM and wrapping it would hand out a tree with no model.
    pub fn new(document: Arc<XmlDocument>, downloader: Arc<dyn MavenDownloader>) -> Self {
        let model = match document.markers.find_first::<Pom>() {
            Some(model) => Arc::new(model.clone()),
            None => panic!(
                "Maven document {} has no Pom marker",
                document.source_path.display()
            ),
        };
        let modules: Arc<[Arc<Pom>]> = document
            .markers
            .find_first::<Modules>()
            .map(|m| m.modules.iter().cloned().collect())
            .unwrap_or_else(|| Arc::from(Vec::new()));
        MavenDocument { document, model, modules, downloader }
    }

    /// Resolves the model of a plain XML document, attaches it as a marker and wraps it.
    pub fn resolve(document: Arc<XmlDocument>, downloader: Arc<dyn MavenDownloader>) -> Self {
        let model = Pom::resolve(&document.root, downloader.as_ref());
        debug!("Resolved {} from {}", model.gav, document.source_path.display());
        let document = document.with_markers(document.markers.set_by_type(model));
        MavenDocument::new(document, downloader)
    }

    /// Whether `document` can be wrapped with [`MavenDocument::new`].
    pub fn is_maven(document: &XmlDocument) -> bool {
        document.markers.contains::<Pom>()
    }

    pub fn document(&self) -> &Arc<XmlDocument> {
        &self.document
    }

    pub fn model(&self) -> &Arc<Pom> {
        &self.model
    }

    pub fn modules(&self) -> &[Arc<Pom>] {
        &self.modules
    }

    pub fn downloader(&self) -> &Arc<dyn MavenDownloader> {
        &self.downloader
    }

    pub fn root(&self) -> &Arc<Tag> {
        &self.document.root
    }

    pub fn markers(&self) -> &Markers {
        &self.document.markers
    }

    /// Wraps `document` with this document's downloader.
    pub fn with_document(&self, document: Arc<XmlDocument>) -> MavenDocument {
        if Arc::ptr_eq(&document, &self.document) {
            return self.clone();
        }
        MavenDocument::new(document, Arc::clone(&self.downloader))
    }

    pub fn with_root(&self, root: Arc<Tag>) -> MavenDocument {
        self.with_document(self.document.with_root(root))
    }

    pub fn with_markers(&self, markers: Markers) -> MavenDocument {
        self.with_document(self.document.with_markers(markers))
    }

    pub fn with_prefix(&self, prefix: Space) -> MavenDocument {
        self.with_document(self.document.with_prefix(prefix))
    }

    pub fn with_prolog(&self, prolog: Option<Arc<Prolog>>) -> MavenDocument {
        self.with_document(self.document.with_prolog(prolog))
    }

    /// Replaces the `Pom` marker.
    pub fn with_model(&self, model: Pom) -> MavenDocument {
        self.with_markers(self.document.markers.compute(model, |_old, new| new))
    }

    pub fn into_document(self) -> Arc<XmlDocument> {
        self.document
    }
}

impl From<MavenDocument> for Arc<XmlDocument> {
    fn from(maven: MavenDocument) -> Self {
        maven.document
    }
}

impl fmt::Debug for MavenDocument {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("MavenDocument")
            .field("source_path", &self.document.source_path)
            .field("model", &self.model.gav)
            .field("modules", &self.modules.len())
            .finish_non_exhaustive()
    }
}
