pub use super::digests::Entity as Digests;
pub use super::packs::Entity as Packs;
pub use super::users::Entity as Users;
