pub mod ctf;
pub mod image;
pub mod traits;

pub use ctf::CtfDeserializer;
pub use image::{ImageDecoder, ImageDeserializer};
pub use traits::Deserializer;
