pub mod dev;
pub mod list;
pub mod run;
pub mod testing;
