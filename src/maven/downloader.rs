use std::sync::Arc;

use dashmap::DashMap;
use tracing::trace;

use super::model::{Gav, Pom};

/// Resolves POMs that are not part of the current source set, such as parents
/// published to a repository.
///
/// The engine calls it only while building a document's model; afterwards the
/// handle is carried along untouched.
pub trait MavenDownloader: Send + Sync {
    fn download_pom(&self, gav: &Gav) -> Option<Arc<Pom>>;
}

/// Resolves nothing; every lookup reports a missing POM.
#[derive(Debug, Default, Clone, Copy)]
pub struct OfflineDownloader;

impl MavenDownloader for OfflineDownloader {
    fn download_pom(&self, gav: &Gav) -> Option<Arc<Pom>> {
        trace!("Offline; not downloading {}", gav);
        None
    }
}

/// Serves POMs registered up front, keyed by coordinates without version.
#[derive(Debug, Default)]
pub struct InMemoryDownloader {
    poms: DashMap<(String, String), Arc<Pom>>,
}

impl InMemoryDownloader {
    pub fn new() -> Self {
        InMemoryDownloader::default()
    }

    pub fn register(&self, pom: Pom) {
        let key = (pom.gav.group_id.clone(), pom.gav.artifact_id.clone());
        self.poms.insert(key, Arc::new(pom));
    }
}

impl MavenDownloader for InMemoryDownloader {
    fn download_pom(&self, gav: &Gav) -> Option<Arc<Pom>> {
        let key = (gav.group_id.clone(), gav.artifact_id.clone());
        self.poms.get(&key).map(|entry| Arc::clone(entry.value()))
    }
}
