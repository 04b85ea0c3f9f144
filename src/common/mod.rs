pub mod jpeg_utils;
pub mod logging_setup;
