//! Maven POM documents.
//!
//! A [`MavenDocument`] wraps an [`crate::ir::xml_node::XmlDocument`] whose
//! markers carry the resolved [`Pom`] model. Visitors reach it through
//! [`MavenVisitor`]; plain XML visitors still see the underlying tree.

pub mod change_property_value;
pub mod document;
pub mod downloader;
pub mod model;
pub mod visitor;

pub use change_property_value::ChangePropertyValue;
pub use document::MavenDocument;
pub use downloader::{InMemoryDownloader, MavenDownloader, OfflineDownloader};
pub use model::{Dependency, Gav, Modules, Pom};
pub use visitor::{MavenVisitor, walk_maven};
