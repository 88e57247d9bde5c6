//! Core types for qbreview.

mod grade;
mod records;

pub use grade::AnswerGrade;
pub use records::*;
