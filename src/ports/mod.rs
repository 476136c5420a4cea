pub mod batch_writer_port;
pub mod source_port;
