#![allow(dead_code)]
mod mocks;

pub use mocks::*;
