pub mod files;
pub mod media_download;
pub mod media_upload;
pub mod users;
