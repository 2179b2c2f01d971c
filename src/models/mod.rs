pub mod candidate;
pub mod context;
pub mod range;
pub mod topic;
pub mod utterance;

pub use candidate::*;
pub use context::*;
pub use range::*;
pub use topic::*;
pub use utterance::*;
