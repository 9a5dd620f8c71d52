// Domain layer: models, catalogs and ports (interfaces). No I/O here.

pub mod catalog;
pub mod geo;
pub mod model;
pub mod params;
pub mod ports;
