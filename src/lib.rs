// Declare all our modules
mod client;
mod config;
mod error;
mod models;
pub mod parsers;
mod transport;

// Publicly export the parts of our library that users will need
pub use client::{CagrClient, Session};
pub use config::ClientConfig;
pub use error::{Result, ScraperError};
pub use models::*; // Exposes all structs like Subject, Class, Student, etc.
pub use parsers::class_table::{ClassRow, ColumnIndex, extract_class_list, parse_class_row};
pub use parsers::schedule::parse_schedule;
pub use parsers::student::parse_student_profile;
pub use parsers::subject::aggregate_subject;
pub use transport::{HttpTransport, Page, Transport};
