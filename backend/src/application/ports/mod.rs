// Application ports - Driven ports (output ports implemented by infrastructure)
//
// The control-plane port lives in `shared` so the browser-side controller
// can implement it against the gateway.

pub mod completion_port;

pub use completion_port::{CompletionError, CompletionPort};
pub use shared::{ControlPlane, ControlPlaneError};
