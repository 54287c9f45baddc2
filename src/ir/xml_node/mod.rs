// XML lossless tree
//
// - node_types: the `Xml` enum, its kinds and the concrete node structs
// - node_impl: persistent `with_*` updates, kind dispatch and tag navigation helpers

pub mod node_types;
pub mod node_impl;

pub use node_types::*;
pub use node_impl::XmlNode;
