pub mod endpoints;
pub mod fetch;
pub mod publish;
