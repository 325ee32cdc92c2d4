use fibra_dom::HostError;
use thiserror::Error;

use crate::fiber::FiberId;

#[derive(Debug, Error)]
pub enum RenderError {
    #[error("malformed node: {0}")]
    Malformed(String),
    #[error(transparent)]
    Host(#[from] HostError),
    #[error("fiber {0} has no host node")]
    MissingHostNode(FiberId),
    #[error("a render is already in flight")]
    Busy,
}
