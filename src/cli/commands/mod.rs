//! CLI command implementations

pub mod init;
pub mod locate;
pub mod run;
pub mod seed;
pub mod status;
pub mod validate;
