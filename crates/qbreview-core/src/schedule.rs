//! Review date policy.
//!
//! Turns the day of a new answer, the day of the previous answer, the due date
//! that was scheduled after the previous answer, and the quality of the new
//! answer into the next due date.
//!
//! - First answer: a fixed offset by grade.
//! - On time or late: the gap between the two answers is stretched by a
//!   grade-dependent factor and added to today.
//! - Early: the previous due date is pushed back by the same gap, so answering
//!   early never shortens the effective interval.
//!
//! Everything is day-granular; no time of day participates.

use chrono::{Days, NaiveDate};

use crate::types::AnswerGrade;

/// Days until the next review after the first answer to a question.
pub fn first_interval_days(grade: AnswerGrade) -> u64 {
    match grade {
        AnswerGrade::None | AnswerGrade::Wrong => 1,
        AnswerGrade::Difficult => 2,
        AnswerGrade::Correct => 3,
        AnswerGrade::Easy => 4,
    }
}

/// Stretch the previous gap according to the grade (on-time or late answers).
///
/// Correct grows the gap by half (rounded down), Easy doubles it.
pub fn grown_interval_days(gap_days: i64, grade: AnswerGrade) -> i64 {
    match grade {
        AnswerGrade::None | AnswerGrade::Wrong => 1,
        AnswerGrade::Difficult => gap_days,
        AnswerGrade::Correct => (gap_days * 3).div_euclid(2),
        AnswerGrade::Easy => gap_days * 2,
    }
}

/// Calculate the next review date.
///
/// # Arguments
/// * `today` - Day of the answer being processed
/// * `prev_answer_date` - Day of the most recent earlier answer (None on first answer)
/// * `prior_due_date` - Due date scheduled after that answer (None on first answer)
/// * `grade` - Quality of today's answer
pub fn next_review_date(
    today: NaiveDate,
    prev_answer_date: Option<NaiveDate>,
    prior_due_date: Option<NaiveDate>,
    grade: AnswerGrade,
) -> NaiveDate {
    let (prev_answer_date, prior_due_date) = match (prev_answer_date, prior_due_date) {
        (Some(prev), Some(due)) => (prev, due),
        _ => return add_days(today, first_interval_days(grade) as i64),
    };

    let gap = (today - prev_answer_date).num_days();

    if grade.is_failure() {
        return add_days(today, 1);
    }

    if today >= prior_due_date {
        add_days(today, grown_interval_days(gap, grade))
    } else {
        add_days(prior_due_date, gap)
    }
}

/// Signed day arithmetic that saturates at the calendar bounds.
fn add_days(date: NaiveDate, days: i64) -> NaiveDate {
    let shifted = if days >= 0 {
        date.checked_add_days(Days::new(days as u64))
    } else {
        date.checked_sub_days(Days::new(days.unsigned_abs()))
    };
    shifted.unwrap_or(if days >= 0 { NaiveDate::MAX } else { NaiveDate::MIN })
}
