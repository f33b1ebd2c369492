// Domain layer - value objects guarding provider credentials
// No dependencies on other layers

pub mod value_objects;

pub use value_objects::*;
