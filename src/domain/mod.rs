// Domain layer: content models and ports (interfaces) to the content store.

pub mod model;
pub mod ports;
