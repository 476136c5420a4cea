//! Adapters for SQL Server (ODBC) and local CSV files.

pub mod local_storage;
pub mod mssql;
