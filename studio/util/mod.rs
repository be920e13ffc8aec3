pub mod cookie;
pub mod form;
pub mod multipart;
