//! Repository layer.
//!
//! Each repository is a zero-sized struct providing async query methods.
//! Methods that must run inside a caller's transaction take
//! `&mut PgConnection`; the rest take `&PgPool`.

pub mod meta_user_repo;
pub mod wa_configuration_repo;

pub use meta_user_repo::MetaUserRepo;
pub use wa_configuration_repo::WaConfigurationRepo;
