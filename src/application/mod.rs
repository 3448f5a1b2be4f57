pub mod auth_service;
pub mod library_service;
