//! Subcommand handlers.

pub(crate) mod config;
pub(crate) mod devices;
pub(crate) mod pairing;
pub(crate) mod recovery;
