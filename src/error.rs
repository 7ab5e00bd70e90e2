use thiserror::Error;

/// Validation failures raised by [`GraphBuilder::build`](crate::GraphBuilder::build).
///
/// Both conditions mean the accumulated mapping is not a valid dependency
/// graph; no partial result is returned alongside either of them.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum IntegrityError {
    /// A dependency identifier was never declared as a node.
    #[error("integrity error: missing dependency \"{0}\"")]
    MissingDependency(String),

    /// A dependency chain returns to its own starting node.
    #[error("integrity error: cycle detected: {chain}", chain = format_chain(chain))]
    Cycle {
        /// Identifiers from the starting node to the node whose edge closes
        /// the cycle.
        chain: Vec<String>,
    },
}

impl IntegrityError {
    /// The traced chain, if this is a cycle error.
    pub fn chain(&self) -> Option<&[String]> {
        match self {
            IntegrityError::Cycle { chain } => Some(chain),
            IntegrityError::MissingDependency(_) => None,
        }
    }
}

fn format_chain(chain: &[String]) -> String {
    chain.join(" -> ")
}

/// Result type alias
pub type Result<T> = std::result::Result<T, IntegrityError>;
