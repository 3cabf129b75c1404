pub mod gallery_service;
pub mod upload_service;
