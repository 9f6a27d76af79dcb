pub mod app;
pub mod seek_bar;


pub use app::*;
