//! Lossless text re-emission.
//!
//! Printing concatenates every prefix, delimiter padding and token a tree holds,
//! so an unmodified tree prints back to exactly the text it was parsed from and
//! an edited one differs only inside the edited spans.

use tracing::trace;

use crate::ir::java_node::J;
use crate::ir::xml_node::Xml;

pub mod java_printer;
pub mod xml_printer;

pub use java_printer::JavaPrinter;
pub use xml_printer::XmlPrinter;

/// Prints any node of the Java-like tree, the whole compilation unit included.
pub fn print_java(tree: &J) -> String {
    let mut printer = JavaPrinter::new();
    printer.print(tree);
    let result = printer.get_result();
    trace!("Printed {:?} ({} bytes)", tree.kind(), result.len());
    result
}

pub fn print_xml(tree: &Xml) -> String {
    let mut printer = XmlPrinter::new();
    printer.print(tree);
    let result = printer.get_result();
    trace!("Printed {:?} ({} bytes)", tree.kind(), result.len());
    result
}
