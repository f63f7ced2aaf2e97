pub mod services;

pub use services::{discard_upload, save_upload, UploadItem, PROFILE_PICTURE_FIELD};
