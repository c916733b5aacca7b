pub mod client;
pub mod surahs;

pub use client::QuranClient;
pub use surahs::{check_number, name_of, search};
