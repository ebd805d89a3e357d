//! WASM bindings for taskdesk.
//!
//! Exposes leave-conflict blocking to a browser date picker via
//! `wasm-bindgen`. A picker's "disabled date" callback calls `isDateBlocked`
//! once per rendered cell; leave listings cross the boundary as the backend's
//! JSON string, untouched.
//!
//! ## Build process
//!
//! ```sh
//! cargo build -p taskdesk-wasm --target wasm32-unknown-unknown --release
//! wasm-bindgen --target web --out-dir packages/taskdesk-js/wasm/ \
//!   target/wasm32-unknown-unknown/release/taskdesk_wasm.wasm
//! ```

use chrono::{DateTime, NaiveDate, NaiveDateTime, Utc};
use taskdesk::interval::DATE_FORMAT;
use taskdesk::{is_date_blocked, parse_intervals, Clock, LeaveConflictCalculator, LocalClock};
use wasm_bindgen::prelude::*;

// ---------------------------------------------------------------------------
// Helpers: plain Rust so they can be tested off-wasm
// ---------------------------------------------------------------------------

/// Parse a candidate date from a picker.
///
/// Accepts `YYYY-MM-DD`, a naive `YYYY-MM-DDTHH:MM:SS`, or RFC 3339. Only the
/// calendar day is kept. An RFC 3339 instant (e.g. `Date.toISOString()`) is
/// placed on the browser's local day, the same day "today" is read from.
fn parse_candidate(s: &str) -> Result<NaiveDate, String> {
    let s = s.trim();
    if let Ok(day) = NaiveDate::parse_from_str(s, DATE_FORMAT) {
        return Ok(day);
    }
    if let Ok(dt) = DateTime::parse_from_rfc3339(s) {
        return Ok(LocalClock.day_of(dt.with_timezone(&Utc)));
    }
    NaiveDateTime::parse_from_str(s, "%Y-%m-%dT%H:%M:%S")
        .map(|ndt| ndt.date())
        .map_err(|e| format!("Invalid date '{}': {}", s, e))
}

fn blocked_on(candidate: &str, intervals_json: &str, today: NaiveDate) -> Result<bool, String> {
    let day = parse_candidate(candidate)?;
    let set = parse_intervals(intervals_json).map_err(|e| e.to_string())?;
    Ok(is_date_blocked(day, &set.intervals, today))
}

fn leave_days_json(intervals_json: &str) -> Result<String, String> {
    let set = parse_intervals(intervals_json).map_err(|e| e.to_string())?;
    let calc = LeaveConflictCalculator::new(&set.intervals);
    let days: Vec<String> = calc
        .leave_days()
        .map(|d| d.format(DATE_FORMAT).to_string())
        .collect();
    serde_json::to_string(&days).map_err(|e| format!("Serialization error: {}", e))
}

fn rejected_json(intervals_json: &str) -> Result<String, String> {
    let set = parse_intervals(intervals_json).map_err(|e| e.to_string())?;
    let messages: Vec<String> = set.rejected.iter().map(ToString::to_string).collect();
    serde_json::to_string(&messages).map_err(|e| format!("Serialization error: {}", e))
}

// ---------------------------------------------------------------------------
// WASM exports
// ---------------------------------------------------------------------------

/// Whether a date picker must disable `candidate` for an assignee whose
/// approved leave is `intervals_json`. "Today" is the browser's local day.
///
/// `intervals_json` is the backend's array of `{start_date, end_date}`
/// objects. Malformed entries are skipped.
#[wasm_bindgen(js_name = "isDateBlocked")]
pub fn is_date_blocked_js(candidate: &str, intervals_json: &str) -> Result<bool, JsValue> {
    blocked_on(candidate, intervals_json, LocalClock.today()).map_err(|e| JsValue::from_str(&e))
}

/// Same as `isDateBlocked`, with "today" given explicitly as `YYYY-MM-DD`.
#[wasm_bindgen(js_name = "isDateBlockedOn")]
pub fn is_date_blocked_on_js(
    candidate: &str,
    intervals_json: &str,
    today: &str,
) -> Result<bool, JsValue> {
    let today = parse_candidate(today).map_err(|e| JsValue::from_str(&e))?;
    blocked_on(candidate, intervals_json, today).map_err(|e| JsValue::from_str(&e))
}

/// Every leave day in `intervals_json` as a JSON array of `YYYY-MM-DD`
/// strings, sorted and without duplicates.
#[wasm_bindgen(js_name = "blockedDays")]
pub fn blocked_days_js(intervals_json: &str) -> Result<String, JsValue> {
    leave_days_json(intervals_json).map_err(|e| JsValue::from_str(&e))
}

/// Messages for every leave entry that was skipped as malformed, as a JSON
/// array of strings.
#[wasm_bindgen(js_name = "rejectedIntervals")]
pub fn rejected_intervals_js(intervals_json: &str) -> Result<String, JsValue> {
    rejected_json(intervals_json).map_err(|e| JsValue::from_str(&e))
}
