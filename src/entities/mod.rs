pub mod prelude;

pub mod access_tokens;
pub mod project_permissions;
pub mod projects;
pub mod secrets;
pub mod users;
