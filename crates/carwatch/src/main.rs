mod bootstrap;
mod export;
mod settings;

use anyhow::Result;
use carwatch_data::study::StudyLog;
use clap::Parser;

use crate::settings::Settings;

fn main() -> Result<()> {
    let settings = Settings::parse();
    bootstrap::setup_logging(&settings.log_level)?;

    tracing::info!(
        "CARWatch log processor v{} starting",
        env!("CARGO_PKG_VERSION")
    );

    let config = settings.study_config();
    let study = StudyLog::from_folder(
        &settings.study_folder,
        &config,
        settings.extract,
        settings.overwrite_unzipped,
    )?;

    print_summary(&study);

    if let Some(field) = &settings.metadata_stats {
        let stats = study.get_metadata_stats(field)?;
        println!();
        println!("{} across the cohort:", field);
        for (value, count) in stats {
            println!("  {:<30} {}", value, count);
        }
    }

    if settings.wide {
        let table = study.export_times_wide()?;
        export::write_times_wide_csv(&settings.out, &table)?;
    } else {
        let table = study.export_times()?;
        export::write_times_csv(&settings.out, &table)?;
    }
    println!();
    println!("Times table written to {}", settings.out.display());

    if let Some(events_out) = &settings.events_out {
        export::write_events_csv(events_out, &study.data_as_table())?;
        println!("Event log written to {}", events_out.display());
    }

    Ok(())
}

/// Cohort summary: every included participant, then every excluded export
/// with the reason it was skipped.
fn print_summary(study: &StudyLog) {
    println!("Participants included: {}", study.len());
    for (subject_id, log) in study.iter() {
        let span = match (log.start_date(), log.end_date()) {
            (Some(start), Some(end)) => format!("{}..{}", start, end),
            _ => "no dates".to_string(),
        };
        let malformed = log.parse_report().malformed_count();
        if malformed > 0 {
            println!(
                "  {:<8} {} ({} events, {} malformed rows skipped)",
                subject_id,
                span,
                log.events().len(),
                malformed
            );
        } else {
            println!(
                "  {:<8} {} ({} events)",
                subject_id,
                span,
                log.events().len()
            );
        }
    }

    if !study.failures().is_empty() {
        println!("Participants excluded: {}", study.failures().len());
        for failure in study.failures() {
            println!("  {}: {}", failure.path.display(), failure.error);
        }
    }
}
