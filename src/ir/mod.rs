pub mod cursor;
pub mod java_node;
pub mod java_type;
pub mod markers;
pub mod node;
pub mod transforms;
pub mod visitor;
pub mod xml_node;
