pub mod actionset;
mod client;

pub use actionset::{decode, Decoded, SkipReason};
pub use client::{KubeClient, TokenSource};
