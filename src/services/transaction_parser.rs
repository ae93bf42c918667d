use crate::entities::DepositKind;
use crate::error::{AppError, AppResult};
use crate::models::ParsedDeposit;
use chrono::{Datelike, NaiveDate, NaiveTime, Utc};
use regex::Regex;
use std::sync::OnceLock;

// line 1: [입금] 50000원 홍길동
fn header_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(r"^\[(입금|출금)\]\s*([0-9][0-9,]*)원\s+(.+)$").expect("hardcoded regex")
    })
}

// line 3: 12/17 14:30 /잔액 150000원
fn tail_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(r"^(\d{1,2})/(\d{1,2})\s+(\d{1,2}):(\d{2})\s*/잔액\s*([0-9][0-9,]*)원$")
            .expect("hardcoded regex")
    })
}

fn parse_amount(raw: &str) -> AppResult<i64> {
    raw.replace(',', "")
        .parse::<i64>()
        .map_err(|_| AppError::MalformedInput(format!("unparseable amount: {raw}")))
}

/// Parse one bank-transfer notification.
///
/// Expected shape, exactly three lines:
/// 1. `[입금|출금] <amount>원 <depositor name>`
/// 2. masked account number (ignored)
/// 3. `MM/DD HH:MM /잔액 <balance>원`
///
/// The notification carries no year, so the current calendar year is
/// assumed; a December transfer processed after January 1st ends up dated a
/// year late. Malformed input is a permanent rejection, never retried.
pub fn parse(raw: &str) -> AppResult<ParsedDeposit> {
    let lines: Vec<&str> = raw.trim().lines().map(str::trim).collect();
    if lines.len() != 3 {
        return Err(AppError::MalformedInput(format!(
            "expected 3 lines, got {}",
            lines.len()
        )));
    }

    let header = header_re()
        .captures(lines[0])
        .ok_or_else(|| AppError::MalformedInput(format!("unrecognized header line: {}", lines[0])))?;

    let kind = match &header[1] {
        "입금" => DepositKind::Deposit,
        _ => DepositKind::Withdrawal,
    };
    let amount = parse_amount(&header[2])?;
    let depositor_name = header[3].trim().to_string();
    if depositor_name.is_empty() {
        return Err(AppError::MalformedInput(
            "missing depositor name".to_string(),
        ));
    }

    let tail = tail_re()
        .captures(lines[2])
        .ok_or_else(|| AppError::MalformedInput(format!("unrecognized tail line: {}", lines[2])))?;

    let month: u32 = tail[1].parse().map_err(|_| bad_date(&tail[1], &tail[2]))?;
    let day: u32 = tail[2].parse().map_err(|_| bad_date(&tail[1], &tail[2]))?;
    let hour: u32 = tail[3].parse().map_err(|_| bad_time(&tail[3], &tail[4]))?;
    let minute: u32 = tail[4].parse().map_err(|_| bad_time(&tail[3], &tail[4]))?;
    let balance_after = parse_amount(&tail[5])?;

    let year = Utc::now().year();
    let date = NaiveDate::from_ymd_opt(year, month, day).ok_or_else(|| bad_date(&tail[1], &tail[2]))?;
    let time = NaiveTime::from_hms_opt(hour, minute, 0).ok_or_else(|| bad_time(&tail[3], &tail[4]))?;

    Ok(ParsedDeposit {
        kind,
        amount,
        depositor_name,
        balance_after,
        deposited_at: date.and_time(time),
    })
}

fn bad_date(month: &str, day: &str) -> AppError {
    AppError::MalformedInput(format!("invalid date: {month}/{day}"))
}

fn bad_time(hour: &str, minute: &str) -> AppError {
    AppError::MalformedInput(format!("invalid time: {hour}:{minute}"))
}
