// Sweep-aware minibatch sources: deserializers turn CTF text and image map
// files into sequences, the source packs them into padded, masked
// minibatches under a sample budget.
pub mod config;
pub mod deserializers;
pub mod minibatch;
pub mod packer;
pub mod samplers;
pub mod sequence;
pub mod source;
pub mod streams;
pub mod sweep;
pub mod text_format;
pub mod transforms;
pub mod user_source;

// Re-export main components
pub use config::{EpochSize, MinibatchSourceConfig, ReaderConfig, FULL_DATA_SWEEP, INFINITELY_REPEAT};
pub use deserializers::{CtfDeserializer, Deserializer, ImageDecoder, ImageDeserializer};
pub use minibatch::{Minibatch, MinibatchData};
pub use source::{MinibatchProvider, MinibatchSource};
pub use streams::{StreamDef, StreamDefs, StreamInformation};
pub use sweep::SweepState;
pub use text_format::sequence_to_text_format;
pub use transforms::Transform;
pub use user_source::{UserMinibatchSource, UserSource};
