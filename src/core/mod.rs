pub mod environment;
pub mod launcher;
pub mod timing;
