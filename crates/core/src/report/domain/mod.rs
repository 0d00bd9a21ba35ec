pub mod detection_sink;
