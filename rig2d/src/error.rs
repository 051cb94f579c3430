use thiserror::Error;

use crate::BoneId;

#[derive(Debug, Error)]
pub enum Error {
    #[error("unknown bone id: {id}")]
    UnknownBone { id: BoneId },

    #[error("unknown animation: {name}")]
    UnknownAnimation { name: String },

    #[error("IK chains of length {length} are not supported (only two-bone chains)")]
    UnsupportedIkChain { length: u32 },

    #[error("IK target bone '{bone}' has no parent to form a two-bone chain")]
    IkChainTooShort { bone: String },

    #[error("cannot parent '{bone}' to '{parent}': '{parent}' is a descendant of '{bone}'")]
    ReparentWouldCycle { bone: String, parent: String },

    #[error("insufficient silhouette data: {message}")]
    InsufficientSilhouette { message: String },
}
