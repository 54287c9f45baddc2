pub mod pretty_printer;
