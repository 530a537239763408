//! CLI command implementations.
//!
//! | Module   | Commands handled     |
//! |----------|----------------------|
//! | `select` | `Select`, `Leaves`   |
//! | `config` | `Config`             |

pub mod config;
pub mod select;

pub use config::cmd_config;
pub use select::{Source, cmd_leaves, cmd_select};
