pub mod capture_op;
pub mod serve_op;
