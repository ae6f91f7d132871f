//! BIRGGIT: Barely-Implemented and Roughly Graph-Based GIT.
//!
//! Projects, commits and branches live directly in a graph:
//!
//! ```text
//! (:PROJECT)-[:HAS_BRANCH {name}]->(:COMMIT)        branch head
//! (:COMMIT)-[:HAS_PARENT {identifier}]->(:COMMIT)   parent to child
//! ```
//!
//! # Usage
//!
//! ```
//! use birggit::birggit::Birggit;
//! use birggit::domain::{Branch, Commit, Project};
//!
//! let birggit = Birggit::in_memory();
//! let project = Project::new("BIRGGIT")?;
//! let root = Commit::new("0xcafebabe", "Initial commit")?;
//!
//! birggit.init(
//!     &Branch::new(project, root),
//!     &[Commit::new("00124e98ca", "Second commit")?],
//! )?;
//! assert_eq!(birggit.log("munster")?.len(), 2);
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```

mod ancestry;
mod config;
mod engine;
mod error;
mod mapping;

pub use config::{AncestorStrategy, BirggitConfig, OrphanRule};
pub use engine::Birggit;
pub use error::{BirggitError, BirggitResult};
