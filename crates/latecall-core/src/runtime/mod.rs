pub mod value;
pub mod args;
