//! Command implementations behind the CLI

pub mod build;
pub mod init;
pub mod new;
