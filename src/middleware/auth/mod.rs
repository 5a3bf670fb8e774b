pub mod access;

pub use access::AccessFilter;
