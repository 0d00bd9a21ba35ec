pub mod constants;
pub mod detection;
pub mod frame;
pub mod labels;
pub mod scan_config;
pub mod source_metadata;
