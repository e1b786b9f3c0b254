// src/normalize.rs
// Pure normalization helpers: unit conversion and timezone-aware timestamp
// parsing. No I/O, no state; validation happens here at the parse boundary.

use anyhow::{anyhow, ensure, Context, Result};
use chrono::{DateTime, FixedOffset, NaiveDateTime, TimeZone, Utc};
use once_cell::sync::OnceCell;
use regex::Regex;
use rust_decimal::Decimal;
use rust_decimal_macros::dec;

pub const GRAMS_PER_TROY_OUNCE: Decimal = dec!(31.1035);

/// Convert an ounce-denominated quote to a gram-denominated one.
/// Exact `Decimal` division; malformed input is rejected upstream.
pub fn convert_oz_price_to_gram(oz_price: Decimal) -> Decimal {
    oz_price / GRAMS_PER_TROY_OUNCE
}

/// Parse a raw price string as extracted from a page: strips currency sign,
/// thousands separators and whitespace. Rejects non-positive values so a
/// sentinel can never masquerade as a real price.
pub fn parse_price_text(raw: &str) -> Result<Decimal> {
    let cleaned = raw.trim().replace(['$', ','], "");
    let price: Decimal = cleaned
        .parse()
        .with_context(|| format!("not a decimal price: {raw:?}"))?;
    ensure!(price > Decimal::ZERO, "non-positive price: {raw:?}");
    Ok(price)
}

/// How a source's timestamp text maps to an absolute instant.
/// Both the format string and the zone rule are fixed per-source
/// configuration, never inferred from the text.
#[derive(Debug, Clone)]
pub struct TimestampRules {
    /// `chrono` strftime format of the local timestamp text.
    pub format: &'static str,
    pub zone: ZoneRule,
}

#[derive(Debug, Clone)]
pub enum ZoneRule {
    /// Timestamp is local to a fixed IANA zone.
    Fixed(chrono_tz::Tz),
    /// Timestamp carries an optional `(GMT±HH:MM)` annotation; absent
    /// annotation means UTC, not a failure.
    GmtAnnotation,
}

fn gmt_offset_re() -> &'static Regex {
    static RE: OnceCell<Regex> = OnceCell::new();
    RE.get_or_init(|| Regex::new(r"\(GMT([+-]\d{2}):(\d{2})\)").unwrap())
}

fn gmt_strip_re() -> &'static Regex {
    static RE: OnceCell<Regex> = OnceCell::new();
    RE.get_or_init(|| Regex::new(r"\s*\(GMT[+-]\d{2}:\d{2}\)").unwrap())
}

/// Parse a source-local timestamp into a UTC instant according to `rules`.
pub fn parse_timestamp(raw: &str, rules: &TimestampRules) -> Result<DateTime<Utc>> {
    match &rules.zone {
        ZoneRule::GmtAnnotation => {
            let offset = match gmt_offset_re().captures(raw) {
                Some(caps) => {
                    let hours: i32 = caps[1].parse().context("offset hours")?;
                    let minutes: i32 = caps[2].parse().context("offset minutes")?;
                    // Sign applies to the whole offset, minutes included.
                    let secs = hours * 3600 + hours.signum() * minutes * 60;
                    FixedOffset::east_opt(secs)
                        .ok_or_else(|| anyhow!("offset out of range in {raw:?}"))?
                }
                None => FixedOffset::east_opt(0).expect("zero offset"),
            };
            let cleaned = gmt_strip_re().replace_all(raw, "");
            let naive = NaiveDateTime::parse_from_str(cleaned.trim(), rules.format)
                .with_context(|| format!("timestamp {cleaned:?} != format {:?}", rules.format))?;
            Ok(offset
                .from_local_datetime(&naive)
                .single()
                .ok_or_else(|| anyhow!("unresolvable local time {naive}"))?
                .with_timezone(&Utc))
        }
        ZoneRule::Fixed(tz) => {
            let naive = NaiveDateTime::parse_from_str(raw.trim(), rules.format)
                .with_context(|| format!("timestamp {raw:?} != format {:?}", rules.format))?;
            tz.from_local_datetime(&naive)
                .earliest()
                .ok_or_else(|| anyhow!("nonexistent local time {naive} in {tz}"))
                .map(|dt| dt.with_timezone(&Utc))
        }
    }
}
