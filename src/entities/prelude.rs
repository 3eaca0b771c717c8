pub use super::access_tokens::Entity as AccessTokens;
pub use super::project_permissions::Entity as ProjectPermissions;
pub use super::projects::Entity as Projects;
pub use super::secrets::Entity as Secrets;
pub use super::users::Entity as Users;
