// Validation of caller-supplied query parameters

use backend_domain::{
    current_year, parse_date, resolve_date_range, CommanderPair, Cursor, DateRange,
    EnemyGranularity, LoadoutGranularity, PageRequest, PairingQuery, PeriodQuery,
    ReportListQuery, RuntimeConfig,
};

use crate::AppError;

const MIN_YEAR: i32 = 1970;
const MAX_YEAR: i32 = 9999;
/// Longest explicit `start`..`end` span, both days included.
pub const MAX_RANGE_DAYS: i64 = 366;

fn present(raw: Option<&str>) -> Option<&str> {
    raw.map(str::trim).filter(|value| !value.is_empty())
}

fn parse_integer(raw: &str, name: &str) -> Result<i64, AppError> {
    raw.trim()
        .parse::<f64>()
        .ok()
        .filter(|value| value.is_finite())
        .map(|value| value.trunc() as i64)
        .ok_or_else(|| AppError::bad_request(format!("invalid {name}: {raw}")))
}

pub fn parse_governor_id(raw: &str) -> Result<i64, AppError> {
    let id = parse_integer(raw, "governor id")?;
    if id <= 0 {
        return Err(AppError::bad_request(format!("invalid governor id: {raw}")));
    }
    Ok(id)
}

/// A required self pairing: positive primary, non-negative secondary
/// (absent secondary means none).
pub fn parse_self_pair(
    primary: Option<&str>,
    secondary: Option<&str>,
) -> Result<CommanderPair, AppError> {
    let primary = present(primary)
        .ok_or_else(|| AppError::bad_request("primary commander is required"))
        .and_then(|raw| parse_integer(raw, "primary commander"))?;
    let secondary = match present(secondary) {
        Some(raw) => parse_integer(raw, "secondary commander")?,
        None => 0,
    };
    if primary <= 0 || secondary < 0 {
        return Err(AppError::bad_request(format!(
            "invalid pairing: {primary}:{secondary}"
        )));
    }
    Ok(CommanderPair::new(primary, secondary))
}

pub fn parse_year(raw: Option<&str>) -> Result<i32, AppError> {
    let Some(raw) = present(raw) else {
        return Ok(current_year());
    };
    raw.parse::<i32>()
        .ok()
        .filter(|year| (MIN_YEAR..=MAX_YEAR).contains(year))
        .ok_or_else(|| AppError::bad_request(format!("invalid year: {raw}")))
}

/// Resolves `year`/`start`/`end`. Dates present must be well formed, and an
/// explicit range may not end before it starts or span more than
/// `MAX_RANGE_DAYS` days.
pub fn resolve_period(query: &PeriodQuery) -> Result<DateRange, AppError> {
    let year = parse_year(query.year.as_deref())?;
    let start = present(query.start.as_deref());
    let end = present(query.end.as_deref());

    let check = |raw: &str, name: &str| {
        parse_date(raw).map_err(|_| AppError::bad_request(format!("invalid {name} date: {raw}")))
    };
    let start_date = start.map(|raw| check(raw, "start")).transpose()?;
    let end_date = end.map(|raw| check(raw, "end")).transpose()?;
    if let (Some(start_date), Some(end_date)) = (start_date, end_date) {
        if end_date < start_date {
            return Err(AppError::bad_request("end date is before start date"));
        }
        let days = (end_date - start_date).num_days() + 1;
        if days > MAX_RANGE_DAYS {
            return Err(AppError::bad_request(format!(
                "date range spans {days} days, at most {MAX_RANGE_DAYS} allowed"
            )));
        }
    }

    Ok(resolve_date_range(start, end, year))
}

pub fn parse_loadout_granularity(raw: Option<&str>) -> Result<LoadoutGranularity, AppError> {
    match present(raw) {
        Some(raw) => raw
            .parse()
            .map_err(|err| AppError::bad_request(format!("{err}"))),
        None => Ok(LoadoutGranularity::default()),
    }
}

/// Enemy grouping plus the loadout key it is restricted to, if any.
pub fn parse_enemy_breakdown(
    query: &PairingQuery,
) -> Result<(EnemyGranularity, Option<String>), AppError> {
    let granularity = match present(query.granularity.as_deref()) {
        Some(raw) => raw
            .parse::<EnemyGranularity>()
            .map_err(|err| AppError::bad_request(format!("{err}")))?,
        None => EnemyGranularity::default(),
    };
    match granularity {
        EnemyGranularity::Overall => Ok((granularity, None)),
        EnemyGranularity::Loadout(_) => {
            let key = present(query.loadout_key.as_deref()).ok_or_else(|| {
                AppError::bad_request("loadoutKey is required for a loadout breakdown")
            })?;
            Ok((granularity, Some(key.to_string())))
        }
    }
}

/// Optional report filters: governor, primary and secondary commander.
pub fn parse_report_filters(
    query: &ReportListQuery,
) -> Result<(Option<i64>, Option<i64>, Option<i64>), AppError> {
    let governor = present(query.governor.as_deref())
        .map(parse_governor_id)
        .transpose()?;
    let primary = present(query.primary.as_deref())
        .map(|raw| parse_integer(raw, "primary commander"))
        .transpose()?;
    let secondary = present(query.secondary.as_deref())
        .map(|raw| parse_integer(raw, "secondary commander"))
        .transpose()?;
    if primary.is_some_and(|id| id <= 0) || secondary.is_some_and(|id| id < 0) {
        return Err(AppError::bad_request("invalid commander filter"));
    }
    Ok((governor, primary, secondary))
}

/// Page size defaults to the configured size and is clamped to the maximum.
pub fn parse_page_request(
    config: &RuntimeConfig,
    query: &ReportListQuery,
) -> Result<PageRequest, AppError> {
    let page_size = match present(query.limit.as_deref()) {
        Some(raw) => {
            let limit = parse_integer(raw, "limit")?;
            if limit <= 0 {
                return Err(AppError::bad_request(format!("invalid limit: {raw}")));
            }
            (limit as usize).min(config.max_page_size)
        }
        None => config.default_page_size,
    };
    let cursor = |raw: Option<&str>| {
        present(raw)
            .map(|raw| raw.parse::<Cursor>())
            .transpose()
            .map_err(|err| AppError::bad_request(format!("{err}")))
    };
    let after = cursor(query.after.as_deref())?;
    let before = cursor(query.before.as_deref())?;
    PageRequest::new(page_size, after, before)
        .map_err(|err| AppError::bad_request(format!("{err}")))
}
