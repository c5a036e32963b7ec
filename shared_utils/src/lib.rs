//! Small helpers shared by the workspace binaries and libraries.

pub mod env;
pub mod logging;
