pub mod backend;
pub mod backend_worker;
pub mod catalog_monitor;
pub mod config;
pub mod item;


pub use backend::*;
pub use backend_worker::*;
pub use catalog_monitor::*;
pub use config::*;
pub use item::*;
