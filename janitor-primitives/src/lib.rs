//! Core shared types for the cloud janitor.

#![warn(missing_docs, clippy::pedantic)]

mod error;
mod kind;
mod resource;

/// Error type and result alias shared across the janitor.
pub use error::{Error, Result};
/// Discriminator identifying the kind of a cloud resource.
pub use kind::ResourceType;
/// Cloud resources as handed over by crawlers and inspected by rules.
pub use resource::{Resource, ResourceBuilder, TerminationSchedule};
