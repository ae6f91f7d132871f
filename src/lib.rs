//! BIRGGIT - a graph-based commit engine
//!
//! This crate maps plain domain values to a property graph using static
//! metadata, and builds a small git-like commit graph on top of that
//! mapping: projects, branches, commits, parent links, merges, logs and
//! garbage collection of orphaned commits.
//!
//! # Layout
//!
//! - [`schema`]: mapping metadata and the resolvers deriving labels,
//!   relationship types, properties, endpoints and identities from it
//! - [`cypher`]: Cypher pattern rendering of domain values
//! - [`graph`]: the graph store surface and an in-memory store
//! - [`domain`]: projects, commits, branches and parent links
//! - [`birggit`]: the commit-graph engine
//!
//! # Example
//!
//! ```
//! use birggit::cypher;
//! use birggit::domain::{Branch, Commit, Project};
//!
//! let branch = Branch::new(
//!     Project::new("BIRGGIT").unwrap(),
//!     Commit::new("0xbwahahaha", "Breaks!").unwrap(),
//! );
//! assert_eq!(
//!     cypher::serialize(&branch).unwrap(),
//!     "(n:PROJECT {name:'BIRGGIT'})-[:HAS_BRANCH {name:'munster'}]->(n:COMMIT {identifier:'0xbwahahaha',message:'Breaks!'})"
//! );
//! ```

pub mod birggit;
pub mod cypher;
pub mod domain;
pub mod graph;
pub mod schema;

pub use birggit::{Birggit, BirggitConfig, BirggitError, BirggitResult};
