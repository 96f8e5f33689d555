pub mod archive;
pub mod notify;
