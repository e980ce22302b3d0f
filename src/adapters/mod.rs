//! Adapters implementing the domain ports against the operating system and
//! the local filesystem.

pub mod process;
pub mod storage;
