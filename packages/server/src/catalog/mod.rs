pub mod folder;
pub mod images;
pub mod locks;
pub mod service;
pub mod variants;
