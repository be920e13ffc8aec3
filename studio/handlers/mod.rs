pub mod clip;
pub mod media;
pub mod page;
pub mod upload;
