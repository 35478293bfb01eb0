// Domain layer: value objects and the ports the core talks through.

pub mod model;
pub mod ports;
