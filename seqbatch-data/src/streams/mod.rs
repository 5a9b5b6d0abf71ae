pub mod stream_def;
pub mod stream_info;

pub use stream_def::{StreamDef, StreamDefs};
pub use stream_info::StreamInformation;
