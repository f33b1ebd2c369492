// Application layer - use cases behind the gateway endpoints
// Orchestrates ports, never touches HTTP or provider wire details

pub mod ask;
pub mod gateway;
pub mod ports;
