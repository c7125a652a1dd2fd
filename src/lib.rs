//! Durable shadow copy of a service's known peer addresses.
//!
//! The live set is owned by a [`registry::Registry`]. At startup
//! [`recovery::load_nodes`] feeds the last saved list back into it, and a
//! [`scheduler::SaveScheduler`] then writes a fresh snapshot through the
//! [`store::Store`] on a fixed interval until its [`shutdown::ThreadGroup`]
//! is stopped.

pub mod codec;
pub mod config;
pub mod error;
pub mod recovery;
pub mod registry;
pub mod scheduler;
pub mod shutdown;
pub mod store;
pub mod types;

pub use error::PersistError;
