pub mod connector;
pub mod hook;
