pub mod cache;
pub mod poller;
