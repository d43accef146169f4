// Domain layer: harness value types and ports (interfaces). Wire types live in `proto`.

pub mod model;
pub mod ports;
