#![allow(dead_code)]

pub mod dashsync_env;
pub mod stub_server;
