// Adapters layer: concrete implementations of the domain ports.

pub mod locator;
pub mod provisioner;
pub mod runner;

pub use locator::PathLocator;
pub use provisioner::VenvProvisioner;
pub use runner::ProcessRunner;
