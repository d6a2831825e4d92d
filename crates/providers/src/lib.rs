//! Provider implementations for vahed.
//!
//! All providers implement the `vahed_core::Provider` trait.
//! The router selects the correct provider based on configuration.

pub mod deadline;
pub mod hashing;
#[cfg(feature = "local")]
pub mod local;
pub mod openai_compat;
pub mod pooling;
pub mod router;

pub use deadline::DeadlineProvider;
pub use hashing::HashingEmbedder;
#[cfg(feature = "local")]
pub use local::LocalEmbedder;
pub use openai_compat::OpenAiCompatProvider;
pub use router::{build_from_config, ProviderRouter};
