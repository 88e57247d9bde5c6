use std::io::Write;
use std::path::Path;

use anyhow::{Context, Result};
use chrono::NaiveDate;
use qbreview_core::schema::codec::format_iso_date;
use qbreview_core::{
    due_reviews, export_backup, import_backup, upsert_answer_result_and_review_plan, AnswerGrade,
};

use crate::app::App;
use crate::OutputFormat;

pub fn init<W: Write>(app: &App, out: &mut W) -> Result<()> {
    writeln!(
        out,
        "Store ready at {} (schema version {})",
        app.config.storage.data_path().display(),
        app.version
    )?;
    Ok(())
}

pub async fn answer<W: Write>(
    app: &App,
    question_id: &str,
    set_id: &str,
    result: AnswerGrade,
    date: NaiveDate,
    out: &mut W,
) -> Result<()> {
    let id =
        upsert_answer_result_and_review_plan(&app.store, question_id, set_id, date, result).await?;
    let plan = app
        .store
        .get_review_plan_by_answer_result_id(id)
        .await?
        .context("Review plan missing after reconciliation")?;

    writeln!(
        out,
        "{} answered {} on {}; next review {}",
        question_id,
        result,
        format_iso_date(date),
        format_iso_date(plan.next_date)
    )?;
    Ok(())
}

pub async fn due<W: Write>(
    app: &App,
    until: NaiveDate,
    format: &OutputFormat,
    out: &mut W,
) -> Result<()> {
    let reviews = due_reviews(&app.store, until, &app.config.question_url_template).await?;

    match format {
        OutputFormat::Json => {
            writeln!(out, "{}", serde_json::to_string_pretty(&reviews)?)?;
        }
        OutputFormat::Plain => {
            if reviews.is_empty() {
                writeln!(out, "Nothing due by {}.", format_iso_date(until))?;
                return Ok(());
            }
            let id_w = reviews
                .iter()
                .map(|r| r.question_id.len())
                .max()
                .unwrap_or(8)
                .max(8);
            writeln!(out, "{:<id_w$} {:<10} URL", "Question", "Due", id_w = id_w)?;
            for review in &reviews {
                writeln!(
                    out,
                    "{:<id_w$} {:<10} {}",
                    review.question_id,
                    review.review_limit.format("%Y/%m/%d"),
                    review.url,
                    id_w = id_w
                )?;
            }
        }
    }
    Ok(())
}

pub async fn history<W: Write>(app: &App, question_id: &str, out: &mut W) -> Result<()> {
    let answers = app
        .store
        .get_answer_results_by_question_id(question_id)
        .await?;
    if answers.is_empty() {
        writeln!(out, "No answers recorded for {}.", question_id)?;
        return Ok(());
    }

    for answer in answers {
        let plan = app
            .store
            .get_review_plan_by_answer_result_id(answer.id)
            .await?;
        let schedule = match plan {
            Some(plan) if plan.completed => {
                format!("reviewed (was due {})", format_iso_date(plan.next_date))
            }
            Some(plan) => format!("due {}", format_iso_date(plan.next_date)),
            None => "-".to_string(),
        };
        writeln!(
            out,
            "{}  {:<9} {}",
            format_iso_date(answer.answer_date),
            answer.result.as_str(),
            schedule
        )?;
    }
    Ok(())
}

pub async fn dump<W: Write>(app: &App, output: Option<&Path>, out: &mut W) -> Result<()> {
    match output {
        Some(path) => {
            let bytes = export_backup(&app.store, path)
                .await
                .with_context(|| format!("Failed to write backup {}", path.display()))?;
            writeln!(out, "Wrote {} bytes to {}", bytes, path.display())?;
        }
        None => {
            writeln!(out, "{}", app.store.dump().await?)?;
        }
    }
    Ok(())
}

pub async fn load<W: Write>(app: &App, file: &Path, out: &mut W) -> Result<()> {
    import_backup(&app.store, file)
        .await
        .with_context(|| format!("Failed to load backup {}", file.display()))?;
    let version = app.store.validate_version().await?;
    writeln!(
        out,
        "Loaded {} (schema version {})",
        file.display(),
        version
    )?;
    Ok(())
}
