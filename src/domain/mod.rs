// Domain layer: plain data and the ports the launcher drives.

pub mod model;
pub mod ports;
