//! `SeaORM` Entity prelude

pub use super::starsystems::Entity as Starsystems;
