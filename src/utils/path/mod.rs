pub mod fs;

pub use fs::{is_temp_file, is_within, normalize_path};
