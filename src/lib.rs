pub mod decoder;
pub mod encoder;
pub mod error;
pub mod layout;
pub mod num48;
pub mod signature;

pub use decoder::{Decoder, ObjectReader};
pub use encoder::Encoder;
pub use error::{Error, Result};
pub use num48::{join_48, split_48, MAX_ARCHIVE_SIZE};
pub use signature::{Primary, Secondary};
