pub mod codec;
pub mod collector;
pub mod manager;
pub mod status;
pub mod transport;
pub mod url;
