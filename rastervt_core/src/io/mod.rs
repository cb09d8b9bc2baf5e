//! Little-endian value readers and writers with the protobuf helpers the vector tile codec uses.

mod value_reader;
mod value_reader_slice;
mod value_writer;
mod value_writer_blob;

pub use value_reader::*;
pub use value_reader_slice::*;
pub use value_writer::*;
pub use value_writer_blob::*;
