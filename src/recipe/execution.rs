use std::any::Any;
use std::fmt;
use std::sync::{Arc, Weak};
use std::sync::atomic::{AtomicBool, Ordering};

use dashmap::DashMap;
use rustc_hash::FxHashMap;
use tracing::{debug, trace};
use uuid::Uuid;

use crate::ir::java_node::CompilationUnit;
use crate::ir::xml_node::XmlDocument;
use crate::ir::visitor::SourceFile;

/// Decides which imports are still referenced once a recipe has edited a file.
///
/// Recipes never remove imports themselves; they only record candidates through
/// [`ExecutionContext::maybe_remove_import`]. The run hands those candidates to
/// this collaborator after visiting each Java source.
pub trait ImportRemover: Send + Sync {
    fn remove_unused(&self, cu: &Arc<CompilationUnit>, candidates: &[String]) -> Arc<CompilationUnit>;
}

/// Leaves every import in place.
#[derive(Debug, Default, Clone, Copy)]
pub struct KeepImports;

impl ImportRemover for KeepImports {
    fn remove_unused(&self, cu: &Arc<CompilationUnit>, candidates: &[String]) -> Arc<CompilationUnit> {
        trace!("Keeping {} candidate import(s) in {}", candidates.len(), cu.source_path.display());
        Arc::clone(cu)
    }
}

/// The allocation a memoized answer belongs to, without keeping the tree alive.
///
/// A live `Weak` keeps its allocation reserved, so no other tree can take the
/// address while the entry exists.
enum PinnedTree {
    Java(Weak<CompilationUnit>),
    Xml(Weak<XmlDocument>),
    Maven(Weak<XmlDocument>),
}

impl PinnedTree {
    fn pin(source: &SourceFile) -> Self {
        match source {
            SourceFile::Java(cu) => PinnedTree::Java(Arc::downgrade(cu)),
            SourceFile::Xml(doc) => PinnedTree::Xml(Arc::downgrade(doc)),
            SourceFile::Maven(maven) => PinnedTree::Maven(Arc::downgrade(maven.document())),
        }
    }

    fn is_tree(&self, source: &SourceFile) -> bool {
        match (self, source) {
            (PinnedTree::Java(pinned), SourceFile::Java(cu)) => std::ptr::eq(pinned.as_ptr(), Arc::as_ptr(cu)),
            (PinnedTree::Xml(pinned), SourceFile::Xml(doc)) => std::ptr::eq(pinned.as_ptr(), Arc::as_ptr(doc)),
            (PinnedTree::Maven(pinned), SourceFile::Maven(maven)) => {
                std::ptr::eq(pinned.as_ptr(), Arc::as_ptr(maven.document()))
            }
            _ => false,
        }
    }

    fn is_dropped(&self) -> bool {
        match self {
            PinnedTree::Java(pinned) => pinned.strong_count() == 0,
            PinnedTree::Xml(pinned) | PinnedTree::Maven(pinned) => pinned.strong_count() == 0,
        }
    }
}

type PreconditionMemo = DashMap<(Uuid, String), (PinnedTree, bool)>;

/// Per-source state threaded through a recipe's visitors.
///
/// Messages and import requests belong to one context. Forks made with
/// [`ExecutionContext::fork`] share the cancellation flag, the precondition memo
/// and the import remover, so one run can cancel every worker and reuse scans.
pub struct ExecutionContext {
    messages: FxHashMap<String, Arc<dyn Any + Send + Sync>>,
    import_requests: Vec<String>,
    cancelled: Arc<AtomicBool>,
    precondition_memo: Arc<PreconditionMemo>,
    import_remover: Arc<dyn ImportRemover>,
}

impl Default for ExecutionContext {
    fn default() -> Self {
        ExecutionContext::new(Arc::new(KeepImports))
    }
}

impl ExecutionContext {
    pub fn new(import_remover: Arc<dyn ImportRemover>) -> Self {
        ExecutionContext {
            messages: FxHashMap::default(),
            import_requests: Vec::new(),
            cancelled: Arc::new(AtomicBool::new(false)),
            precondition_memo: Arc::new(DashMap::new()),
            import_remover,
        }
    }

    /// A fresh context for another source of the same run.
    pub fn fork(&self) -> Self {
        ExecutionContext {
            messages: FxHashMap::default(),
            import_requests: Vec::new(),
            cancelled: Arc::clone(&self.cancelled),
            precondition_memo: Arc::clone(&self.precondition_memo),
            import_remover: Arc::clone(&self.import_remover),
        }
    }

    pub fn put_message<V: Any + Send + Sync>(&mut self, key: impl Into<String>, value: V) {
        self.messages.insert(key.into(), Arc::new(value));
    }

    pub fn get_message<V: Any + Send + Sync>(&self, key: &str) -> Option<&V> {
        self.messages.get(key)?.downcast_ref::<V>()
    }

    /// Requests removal of the import of `fully_qualified_name` if nothing else uses it.
    pub fn maybe_remove_import(&mut self, fully_qualified_name: impl Into<String>) {
        let name = fully_qualified_name.into();
        if !self.import_requests.contains(&name) {
            debug!("Import {} may no longer be used", name);
            self.import_requests.push(name);
        }
    }

    pub fn import_requests(&self) -> &[String] {
        &self.import_requests
    }

    pub fn take_import_requests(&mut self) -> Vec<String> {
        std::mem::take(&mut self.import_requests)
    }

    pub fn import_remover(&self) -> &Arc<dyn ImportRemover> {
        &self.import_remover
    }

    pub fn cancel(&self) {
        self.cancelled.store(true, Ordering::Relaxed);
    }

    pub fn is_cancelled(&self) -> bool {
        self.cancelled.load(Ordering::Relaxed)
    }

    pub fn cancellation_flag(&self) -> Arc<AtomicBool> {
        Arc::clone(&self.cancelled)
    }

    /// Earlier answer of precondition `key` for exactly this tree value.
    pub fn memoized_precondition(&self, key: &str, source: &SourceFile) -> Option<bool> {
        let entry = self.precondition_memo.get(&(source.id().as_uuid(), key.to_string()))?;
        let (scanned, applies) = entry.value();
        // An edited tree keeps its id but is a different allocation
        scanned.is_tree(source).then_some(*applies)
    }

    pub fn memoize_precondition(&self, key: &str, source: &SourceFile, applies: bool) {
        self.precondition_memo
            .insert((source.id().as_uuid(), key.to_string()), (PinnedTree::pin(source), applies));
    }

    /// Drops memoized answers whose trees no longer exist.
    pub fn prune_precondition_memo(&self) {
        let before = self.precondition_memo.len();
        self.precondition_memo.retain(|_, (scanned, _)| !scanned.is_dropped());
        trace!("Pruned {} stale precondition answer(s)", before - self.precondition_memo.len());
    }

    pub fn memoized_precondition_count(&self) -> usize {
        self.precondition_memo.len()
    }
}

impl fmt::Debug for ExecutionContext {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ExecutionContext")
            .field("messages", &self.messages.keys().collect::<Vec<_>>())
            .field("import_requests", &self.import_requests)
            .field("cancelled", &self.is_cancelled())
            .field("memoized_preconditions", &self.precondition_memo.len())
            .finish()
    }
}
