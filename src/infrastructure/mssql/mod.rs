pub mod odbc_source_adapter;
pub mod sql_utils;
