//! Graph-style resolution over an ADB artifact store.
//!
//! Every stored record is exposed as a node with an opaque global id. Lists
//! are exposed as cursor-paginated connections.
//!
//! - [`global_id`] -- `encode` / `decode` of `"Type:id"` ids
//! - [`connection`] -- `first` / `after` / `last` / `before` slicing
//! - [`GraphResolver`] -- node lookup and typed accessors over a shared store

pub mod connection;
pub mod error;
pub mod global_id;
pub mod resolver;

pub use connection::{connection_from_vec, Connection, ConnectionArgs, Edge, PageInfo};
pub use error::{GraphError, GraphResult};
pub use global_id::{decode, encode, GlobalId};
pub use resolver::{
    global_id_of, BytecodeNode, CompilationNode, GraphResolver, Node, NodeRef, SourceNode,
};
