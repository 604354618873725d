pub mod client;
pub mod image;
pub mod text;
pub mod types;

pub use image::OpenAiImageClient;
pub use text::OpenAiTextClient;
