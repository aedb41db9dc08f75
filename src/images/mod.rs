// Images module: on-disk listing photos and their references in details JSON.

pub mod details;
pub mod store;

pub use details::image_filenames;
pub use store::ImageStore;
