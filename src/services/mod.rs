pub mod exif_probe;
pub mod remote_store;
pub mod tree_service;
pub mod upload_service;
