pub mod command;
pub mod nix;
pub mod setup;

pub use nix::NixProfileBackend;
pub use setup::ToolchainSetup;
