pub mod identity;
pub mod registry;
