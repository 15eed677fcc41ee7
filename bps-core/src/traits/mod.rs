//! Abstract interfaces for the BPS engine

pub mod backend;

pub use backend::ByteSource;
