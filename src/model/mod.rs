pub mod credentials;
pub mod entry;
pub mod kind;
pub mod remote;
