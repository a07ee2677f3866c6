//! Utilities shared by the Tunebox server and client.

pub mod logger;
pub mod time;
