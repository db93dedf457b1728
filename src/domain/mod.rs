// Domain layer: plain records and ports. No catalog behavior lives here.

pub mod model;
pub mod ports;
