#![warn(clippy::pedantic)]

pub mod local_storage;
pub mod memory;
pub mod rest;
