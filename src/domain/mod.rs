// Domain layer: core models and ports (interfaces). Concrete HTTP/HTML adapters live in `crate::adapters`.

pub mod model;
pub mod ports;
