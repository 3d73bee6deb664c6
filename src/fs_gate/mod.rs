//! Filesystem Access Gate: the only filesystem path open to the sandbox.

pub mod gate;

pub use gate::FsGate;
