pub mod client;
pub mod gateway;
pub mod types;
pub mod worker;
