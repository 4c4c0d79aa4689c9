// Domain layer: lead models and the ports the workflow talks to.

pub mod model;
pub mod ports;
