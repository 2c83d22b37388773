pub mod codec;
pub mod key;
pub mod policy;
