pub mod entry;
pub mod folder_node;
