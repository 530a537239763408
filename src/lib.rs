pub mod config;
pub mod errors;
pub mod logging;
pub mod policy;
pub mod pull;
pub mod reviewer;

pub use errors::{LookupError, ReviewerError};
pub use reviewer::find_random_requesters;
