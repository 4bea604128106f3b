mod deserializer;
mod serializer;

pub use deserializer::{DeserializeError, Deserializer, ReaderDeserializer, SliceDeserializer};
pub use serializer::{DynamicSerializer, Serializer};
