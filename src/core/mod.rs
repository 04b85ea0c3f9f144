pub mod frame_buffer;
pub mod source_selector;
