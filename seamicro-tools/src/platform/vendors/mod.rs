//! Built-in platform definitions.

pub mod seamicro;
