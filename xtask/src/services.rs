pub mod docker;
pub mod utils;
