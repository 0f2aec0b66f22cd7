#[path = "core/error.rs"]
pub mod error;

#[path = "core/prng.rs"]
pub mod prng;

#[path = "core/spec.rs"]
pub mod spec;

#[path = "core/patterns.rs"]
pub mod patterns;

#[path = "core/storage.rs"]
pub mod storage;

#[path = "core/network.rs"]
pub mod network;
