pub mod app;
pub mod error;
pub mod fs_utils;
pub mod image_utils;
pub mod pipeline;
pub mod selection;
pub mod session;
pub mod ui;
