//! Problems bundled with the engine.

pub mod relief;
