mod control_plane;
mod protocol;

pub use control_plane::{ControlPlane, ControlPlaneError};
pub use protocol::*;
