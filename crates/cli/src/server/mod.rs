pub mod web;

pub use web::start_control_server;
