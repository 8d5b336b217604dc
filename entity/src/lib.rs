pub mod digests;
pub mod packs;
pub mod prelude;
pub mod users;
