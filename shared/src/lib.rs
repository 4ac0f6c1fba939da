//! Types shared between the inventory server and anything that talks to it:
//! product records, request bodies and their validation, the live event
//! envelope, and the TOML configuration.

pub mod config;
pub mod types;
