#![allow(dead_code)]
mod app;

pub use app::*;
