//! Fiber renderer: turns successive VNode trees into host tree mutations.
//!
//! Each render builds a new fiber tree whose positions are paired with the
//! last committed tree. The work loop from `fibra-core` walks it one fiber at
//! a time across idle slices; once the walk completes the tree is committed
//! in one go and becomes the baseline for the next render.

pub mod commit;
pub mod create;
pub mod error;
pub mod fiber;
pub mod reconcile;
pub mod root;

pub use commit::{apply, plan, CommitStats, Container, Mutation};
pub use create::create_host_node;
pub use error::RenderError;
pub use fiber::{Fiber, FiberArena, FiberId};
pub use reconcile::reconcile;
pub use root::{render, FiberRoot, OverlapPolicy, RenderConfig, Renderer};
