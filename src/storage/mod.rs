mod json_file;

pub use json_file::{
    backup_corrupt, default_data_dir, read_json, write_json_atomic, Result, StorageError,
};
