mod node;

pub use node::{node_descriptors, node_registry};
