use crate::types::Address;
use anyhow::Result;
use async_trait::async_trait;

pub mod peer_book;
pub use peer_book::PeerBook;

/// Owner of the live address set.
#[async_trait]
pub trait Registry: Send + Sync {
    /// Copy the current set out. The lock guarding the set must only be held
    /// for the copy, never across anything slower.
    async fn snapshot(&self) -> Vec<Address>;

    /// Offer a recovered address back. The registry may reject it.
    async fn restore(&self, addr: Address) -> Result<()>;
}
