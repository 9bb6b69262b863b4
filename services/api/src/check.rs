use appointment_desk::booking::{AdmissionPolicy, AdmissionRejection, Clock, SystemClock};
use appointment_desk::config::AppConfig;
use appointment_desk::error::AppError;
use chrono::{DateTime, FixedOffset, NaiveDate, Utc};
use clap::Args;

#[derive(Args, Debug)]
pub(crate) struct CheckArgs {
    /// Proposed appointment time (RFC 3339, e.g. 2025-07-22T10:00:00+05:30)
    #[arg(long, value_parser = parse_timestamp)]
    time: DateTime<FixedOffset>,
    /// Evaluate as of this instant instead of the current time (RFC 3339)
    #[arg(long, value_parser = parse_timestamp)]
    now: Option<DateTime<FixedOffset>>,
}

pub(crate) fn parse_timestamp(raw: &str) -> Result<DateTime<FixedOffset>, String> {
    DateTime::parse_from_rfc3339(raw.trim())
        .map_err(|err| format!("failed to parse '{raw}' as an RFC 3339 timestamp ({err})"))
}

#[derive(Debug)]
pub(crate) struct CheckReport {
    pub(crate) time: DateTime<FixedOffset>,
    pub(crate) earliest: NaiveDate,
    pub(crate) latest: NaiveDate,
    pub(crate) verdict: Result<(), AdmissionRejection>,
}

pub(crate) fn evaluate(
    policy: &AdmissionPolicy,
    time: DateTime<FixedOffset>,
    now: DateTime<Utc>,
) -> CheckReport {
    let (earliest, latest) = policy.window(now);
    CheckReport {
        time,
        earliest,
        latest,
        verdict: policy.check_schedule(&time, now),
    }
}

pub(crate) fn run_check(args: CheckArgs) -> Result<(), AppError> {
    let config = AppConfig::load()?;
    let policy = AdmissionPolicy::from_config(&config.booking)?;
    let now = args
        .now
        .map(|instant| instant.with_timezone(&Utc))
        .unwrap_or_else(|| SystemClock.now());

    let report = evaluate(&policy, args.time, now);
    render_report(&report);
    Ok(())
}

fn render_report(report: &CheckReport) {
    println!("Proposed time: {}", report.time.to_rfc3339());
    println!(
        "Booking window: {} -> {} (inclusive)",
        report.earliest, report.latest
    );
    match &report.verdict {
        Ok(()) => println!("Verdict: bookable, subject to id and slot availability"),
        Err(rejection) => println!("Verdict: {} ({})", rejection.code(), rejection),
    }
}
