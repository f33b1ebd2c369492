// Domain layer - session state and credentials
// No dependencies on media or transport adapters

pub mod session;

pub use session::*;
