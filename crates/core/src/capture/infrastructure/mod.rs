pub mod image_dir_source;
