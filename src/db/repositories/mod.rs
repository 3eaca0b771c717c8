pub mod project;
pub mod secret;
pub mod token;
pub mod user;
