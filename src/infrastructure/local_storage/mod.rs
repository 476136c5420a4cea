pub mod csv_file_writer;
