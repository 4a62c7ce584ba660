//! Pipeline stages

use serde::{Deserialize, Serialize};

/// One step of a build-and-run pipeline, in execution order
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Stage {
    Materialize,
    Build,
    Publish,
    Authenticate,
    Submit,
    Wait,
    Retrieve,
    Reap,
}

impl std::fmt::Display for Stage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Stage::Materialize => write!(f, "materialize"),
            Stage::Build => write!(f, "build"),
            Stage::Publish => write!(f, "publish"),
            Stage::Authenticate => write!(f, "authenticate"),
            Stage::Submit => write!(f, "submit"),
            Stage::Wait => write!(f, "wait"),
            Stage::Retrieve => write!(f, "retrieve"),
            Stage::Reap => write!(f, "reap"),
        }
    }
}
