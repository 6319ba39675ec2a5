mod build;
mod init;
mod verify;

pub use build::cmd_build;
pub use init::cmd_init;
pub use verify::cmd_verify;
