//! liftsheet - Personal workout sheets and exercise log
//!
//! Print a sheet, write results by hand, let a chatbot turn the photo into
//! CSV, import it, pick the next workout.

pub mod catalog;
pub mod db;
pub mod import;
pub mod paste;
pub mod sets;
pub mod sheet;
pub mod web;

pub use db::Database;
