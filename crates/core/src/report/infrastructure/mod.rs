pub mod annotated_frame_sink;
pub mod fanout_sink;
pub mod json_lines_sink;
pub mod log_sink;
