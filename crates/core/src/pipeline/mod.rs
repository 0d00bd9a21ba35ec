pub mod infrastructure;
pub mod pipeline_executor;
pub mod scan_frames_use_case;
