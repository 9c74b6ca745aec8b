//! `polrecon-recon`: insurance-policy renewal reconciliation engine.
//!
//! Pure engine crate: receives pre-loaded tables, returns the classified
//! report. No CLI or IO dependencies.

pub mod classify;
pub mod columns;
pub mod comment;
pub mod config;
pub mod conflict;
pub mod engine;
pub mod error;
pub mod matcher;
pub mod model;
pub mod normalize;
pub mod owner;
pub mod prepare;
pub mod summary;
pub mod table;
pub mod window;

pub use config::LookupConfig;
pub use engine::run;
pub use error::ReconError;
pub use model::{Flavor, ReconInput, ReconReport};
pub use table::Table;
