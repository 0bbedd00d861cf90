pub mod codec;
pub mod error;
