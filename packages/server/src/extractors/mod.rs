pub mod json;
pub mod multipart;
