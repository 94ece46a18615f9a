pub mod catalog;
pub mod class_table;
pub mod form;
pub mod forum;
pub mod schedule;
pub mod student;
pub mod subject;
pub mod text;
