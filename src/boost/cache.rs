//! Read-only historical statistic cache with specific-to-generic fallback.
//!
//! The cache file is a flat JSON object keyed by
//! `left_id|right_id|window|track_code|surface|distance_bucket|class_bucket`
//! (empty strings for absent context). Records stay in raw JSON form until a
//! lookup hits them, so a corrupt record only fails the lookup that finds it.
//!
//! A missing or unparsable source loads as an empty cache: every runner then
//! gets zero boosts and the run carries on.

use std::collections::HashMap;
use std::io::ErrorKind;
use std::path::Path;
use std::sync::Arc;

use serde_json::Value;
use tracing::{debug, info, warn};

use super::stats::StatLine;
use crate::error::{BoostError, Result};

/// Context narrowing a relationship lookup. Empty strings mean "any".
#[derive(Debug, Clone, Copy, Default)]
pub struct StatContext<'a> {
    pub window: &'a str,
    pub track_code: &'a str,
    pub surface: &'a str,
    pub distance_bucket: &'a str,
    pub class_bucket: &'a str,
}

/// Immutable snapshot of one relationship cache. Cloning shares the map.
#[derive(Debug, Clone, Default)]
pub struct StatCache {
    records: Arc<HashMap<String, Value>>,
}

impl StatCache {
    pub fn from_map(records: HashMap<String, Value>) -> Self {
        StatCache {
            records: Arc::new(records),
        }
    }

    /// Load a cache file. Never fails: a missing file, an unreadable file or
    /// a document that is not a JSON object all yield an empty cache.
    pub fn load(path: impl AsRef<Path>) -> Self {
        let path = path.as_ref();
        let text = match std::fs::read_to_string(path) {
            Ok(t) => t,
            Err(e) if e.kind() == ErrorKind::NotFound => {
                warn!("Stat cache {} not found; relationship boosts disabled", path.display());
                return Self::default();
            }
            Err(e) => {
                warn!("Stat cache {} unreadable ({}); using empty cache", path.display(), e);
                return Self::default();
            }
        };
        let cache = Self::from_json_str(&text);
        info!("Stat cache {}: {} records", path.display(), cache.len());
        cache
    }

    /// Parse a cache document, degrading to an empty cache on invalid JSON.
    pub fn from_json_str(text: &str) -> Self {
        match serde_json::from_str::<HashMap<String, Value>>(text) {
            Ok(records) => Self::from_map(records),
            Err(e) => {
                warn!("Stat cache is not a valid JSON object ({}); using empty cache", e);
                Self::default()
            }
        }
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Find the most specific non-empty record for `left → right`.
    ///
    /// Keys are tried in [`fallback_keys`] order; the first hit is parsed and
    /// returned. A hit that fails to parse is a [`BoostError::CacheCorruption`].
    pub fn lookup(
        &self,
        left_id: &str,
        right_id: &str,
        ctx: &StatContext<'_>,
    ) -> Result<Option<StatLine>> {
        for key in fallback_keys(left_id, right_id, ctx) {
            let Some(record) = self.records.get(&key) else {
                continue;
            };
            if is_empty_record(record) {
                continue;
            }
            debug!("Stat cache hit: {}", key);
            return parse_record(&key, record).map(Some);
        }
        Ok(None)
    }
}

/// Pipe-join the seven key fields.
pub fn cache_key(left_id: &str, right_id: &str, ctx: &StatContext<'_>) -> String {
    [
        left_id,
        right_id,
        ctx.window,
        ctx.track_code,
        ctx.surface,
        ctx.distance_bucket,
        ctx.class_bucket,
    ]
    .join("|")
}

/// Lookup keys, most specific first: full context, then without class,
/// distance, surface and finally track.
pub fn fallback_keys(left_id: &str, right_id: &str, ctx: &StatContext<'_>) -> [String; 5] {
    let full = *ctx;
    let no_class = StatContext {
        class_bucket: "",
        ..full
    };
    let no_dist = StatContext {
        distance_bucket: "",
        ..no_class
    };
    let no_surface = StatContext {
        surface: "",
        ..no_dist
    };
    let no_track = StatContext {
        track_code: "",
        ..no_surface
    };
    [
        cache_key(left_id, right_id, &full),
        cache_key(left_id, right_id, &no_class),
        cache_key(left_id, right_id, &no_dist),
        cache_key(left_id, right_id, &no_surface),
        cache_key(left_id, right_id, &no_track),
    ]
}

/// Falsy JSON values are treated as "no record at this granularity".
fn is_empty_record(v: &Value) -> bool {
    match v {
        Value::Null => true,
        Value::Bool(b) => !b,
        Value::Number(n) => n.as_f64() == Some(0.0),
        Value::String(s) => s.is_empty(),
        Value::Array(a) => a.is_empty(),
        Value::Object(o) => o.is_empty(),
    }
}

fn parse_record(key: &str, record: &Value) -> Result<StatLine> {
    let corrupt = |field: &'static str, detail: String| BoostError::CacheCorruption {
        key: key.to_string(),
        field,
        detail,
    };

    let Value::Object(fields) = record else {
        return Err(corrupt("record", format!("is not an object: {record}")));
    };

    let starts = coerce_count(fields.get("starts")).map_err(|d| corrupt("starts", d))?;
    let wins = coerce_count(fields.get("wins")).map_err(|d| corrupt("wins", d))?;
    let win_pct = match fields.get("win_pct") {
        None => 0.0,
        Some(v) => coerce_float(v).map_err(|d| corrupt("win_pct", d))?,
    };
    let roi = match fields.get("roi") {
        None | Some(Value::Null) => None,
        Some(v) => Some(coerce_float(v).map_err(|d| corrupt("roi", d))?),
    };

    StatLine::new(starts, wins, win_pct, roi).map_err(|e| corrupt("record", e.to_string()))
}

/// Counts may arrive as integers, floats (truncated) or numeric strings.
/// An absent field counts as zero.
fn coerce_count(v: Option<&Value>) -> std::result::Result<u32, String> {
    let raw: i64 = match v {
        None => return Ok(0),
        Some(Value::Number(n)) => {
            if let Some(i) = n.as_i64() {
                i
            } else if let Some(f) = n.as_f64().filter(|f| f.is_finite()) {
                let t = f.trunc();
                if t < i64::MIN as f64 || t > i64::MAX as f64 {
                    return Err(format!("{n} is out of range"));
                }
                t as i64
            } else {
                return Err(format!("{n} is out of range"));
            }
        }
        Some(Value::String(s)) => s
            .trim()
            .parse::<i64>()
            .map_err(|_| format!("{s:?} is not an integer"))?,
        Some(other) => return Err(format!("{other} is not numeric")),
    };
    u32::try_from(raw).map_err(|_| format!("{raw} is not a valid count"))
}

fn coerce_float(v: &Value) -> std::result::Result<f64, String> {
    let f = match v {
        Value::Number(n) => n.as_f64().ok_or_else(|| format!("{n} is not a float"))?,
        Value::String(s) => s
            .trim()
            .parse::<f64>()
            .map_err(|_| format!("{s:?} is not a number"))?,
        other => return Err(format!("{other} is not numeric")),
    };
    if f.is_finite() {
        Ok(f)
    } else {
        Err(format!("{f} is not finite"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use serde_json::json;

    const TJ: &str = "trainer:todd pletcher";
    const JK: &str = "jockey:irad ortiz jr";

    fn ctx() -> StatContext<'static> {
        StatContext {
            window: "365d",
            track_code: "SAR",
            surface: "dirt",
            distance_bucket: "route",
            class_bucket: "stk",
        }
    }

    fn cache(entries: Vec<(String, Value)>) -> StatCache {
        StatCache::from_map(entries.into_iter().collect())
    }

    fn rec(starts: u32, wins: u32) -> Value {
        let pct = f64::from(wins) / f64::from(starts);
        json!({ "starts": starts, "wins": wins, "win_pct": pct })
    }

    #[test]
    fn fallback_order_drops_trailing_context() {
        let keys = fallback_keys(TJ, JK, &ctx());
        assert_eq!(keys[0], format!("{TJ}|{JK}|365d|SAR|dirt|route|stk"));
        assert_eq!(keys[1], format!("{TJ}|{JK}|365d|SAR|dirt|route|"));
        assert_eq!(keys[2], format!("{TJ}|{JK}|365d|SAR|dirt||"));
        assert_eq!(keys[3], format!("{TJ}|{JK}|365d|SAR|||"));
        assert_eq!(keys[4], format!("{TJ}|{JK}|365d||||"));
    }

    #[test]
    fn most_specific_match_wins() {
        let keys = fallback_keys(TJ, JK, &ctx());
        let c = cache(vec![
            (keys[4].clone(), rec(400, 80)),
            (keys[2].clone(), rec(120, 30)),
            (keys[3].clone(), rec(200, 44)),
        ]);
        let s = c.lookup(TJ, JK, &ctx()).unwrap().unwrap();
        assert_eq!(s.starts(), 120);
        assert_eq!(s.wins(), 30);
    }

    #[test]
    fn falls_back_to_track_agnostic_record() {
        let keys = fallback_keys(TJ, JK, &ctx());
        let c = cache(vec![(keys[4].clone(), rec(400, 80))]);
        let s = c.lookup(TJ, JK, &ctx()).unwrap().unwrap();
        assert_eq!(s.starts(), 400);
    }

    #[test]
    fn empty_records_are_skipped() {
        let keys = fallback_keys(TJ, JK, &ctx());
        let c = cache(vec![
            (keys[0].clone(), json!({})),
            (keys[1].clone(), Value::Null),
            (keys[2].clone(), rec(90, 9)),
        ]);
        assert_eq!(c.lookup(TJ, JK, &ctx()).unwrap().unwrap().starts(), 90);
    }

    #[test]
    fn miss_is_none() {
        let c = cache(vec![(format!("{TJ}|jockey:other|365d||||"), rec(50, 5))]);
        assert!(c.lookup(TJ, JK, &ctx()).unwrap().is_none());
        assert!(StatCache::default().lookup(TJ, JK, &ctx()).unwrap().is_none());
    }

    #[test]
    fn numeric_strings_and_floats_are_coerced() {
        let keys = fallback_keys(TJ, JK, &ctx());
        let c = cache(vec![(
            keys[0].clone(),
            json!({ "starts": "150", "wins": 30.0, "win_pct": "0.2", "roi": 1.35 }),
        )]);
        let s = c.lookup(TJ, JK, &ctx()).unwrap().unwrap();
        assert_eq!(s.starts(), 150);
        assert_eq!(s.wins(), 30);
        assert_relative_eq!(s.win_pct(), 0.2);
        assert_eq!(s.roi(), Some(1.35));
    }

    #[test]
    fn missing_fields_default_to_zero() {
        let keys = fallback_keys(TJ, JK, &ctx());
        let c = cache(vec![(keys[0].clone(), json!({ "roi": null }))]);
        let s = c.lookup(TJ, JK, &ctx()).unwrap().unwrap();
        assert_eq!(s.starts(), 0);
        assert!(s.roi().is_none());
    }

    #[test]
    fn non_numeric_field_is_corruption() {
        let keys = fallback_keys(TJ, JK, &ctx());
        let c = cache(vec![(
            keys[0].clone(),
            json!({ "starts": "lots", "wins": 3, "win_pct": 0.1 }),
        )]);
        match c.lookup(TJ, JK, &ctx()) {
            Err(BoostError::CacheCorruption { field, key, .. }) => {
                assert_eq!(field, "starts");
                assert_eq!(key, keys[0]);
            }
            other => panic!("expected corruption, got {other:?}"),
        }
    }

    #[test]
    fn corrupt_specific_record_is_not_masked_by_fallback() {
        let keys = fallback_keys(TJ, JK, &ctx());
        let c = cache(vec![
            (keys[0].clone(), json!({ "starts": 10, "wins": 2, "win_pct": "n/a" })),
            (keys[4].clone(), rec(400, 80)),
        ]);
        assert!(matches!(
            c.lookup(TJ, JK, &ctx()),
            Err(BoostError::CacheCorruption { field: "win_pct", .. })
        ));
    }

    #[test]
    fn inconsistent_counts_are_corruption() {
        let keys = fallback_keys(TJ, JK, &ctx());
        let c = cache(vec![(keys[0].clone(), json!({ "starts": 5, "wins": 9, "win_pct": 0.5 }))]);
        assert!(matches!(
            c.lookup(TJ, JK, &ctx()),
            Err(BoostError::CacheCorruption { field: "record", .. })
        ));

        let c = cache(vec![(keys[0].clone(), json!({ "starts": -4, "wins": 0 }))]);
        assert!(matches!(
            c.lookup(TJ, JK, &ctx()),
            Err(BoostError::CacheCorruption { field: "starts", .. })
        ));
    }

    #[test]
    fn invalid_json_degrades_to_empty() {
        assert!(StatCache::from_json_str("{not json").is_empty());
        assert!(StatCache::from_json_str("[1, 2, 3]").is_empty());
        let c = StatCache::from_json_str(r#"{"a|b|365d||||": {"starts": 1, "wins": 0, "win_pct": 0}}"#);
        assert_eq!(c.len(), 1);
    }

    #[test]
    fn missing_file_degrades_to_empty() {
        let c = StatCache::load("/definitely/not/here/tj_cache.json");
        assert!(c.is_empty());
    }

    #[test]
    fn fractional_counts_truncate_toward_zero() {
        let keys = fallback_keys(TJ, JK, &ctx());
        let c = cache(vec![(
            keys[0].clone(),
            json!({ "starts": 30.7, "wins": 3.9, "win_pct": 0.1 }),
        )]);
        let s = c.lookup(TJ, JK, &ctx()).unwrap().unwrap();
        assert_eq!(s.starts(), 30);
        assert_eq!(s.wins(), 3);

        let c = cache(vec![(keys[0].clone(), json!({ "starts": 12, "wins": -0.5 }))]);
        assert_eq!(c.lookup(TJ, JK, &ctx()).unwrap().unwrap().wins(), 0);
    }

    #[test]
    fn boolean_or_null_count_is_corruption() {
        let keys = fallback_keys(TJ, JK, &ctx());
        let c = cache(vec![(
            keys[0].clone(),
            json!({ "starts": true, "wins": 1, "win_pct": 0.1 }),
        )]);
        assert!(matches!(
            c.lookup(TJ, JK, &ctx()),
            Err(BoostError::CacheCorruption { field: "starts", .. })
        ));

        let c = cache(vec![(
            keys[0].clone(),
            json!({ "starts": 40, "wins": null, "win_pct": 0.1 }),
        )]);
        assert!(matches!(
            c.lookup(TJ, JK, &ctx()),
            Err(BoostError::CacheCorruption { field: "wins", .. })
        ));
    }

    #[test]
    fn non_numeric_roi_is_corruption() {
        let keys = fallback_keys(TJ, JK, &ctx());
        let c = cache(vec![(
            keys[0].clone(),
            json!({ "starts": 40, "wins": 4, "win_pct": 0.1, "roi": "x" }),
        )]);
        assert!(matches!(
            c.lookup(TJ, JK, &ctx()),
            Err(BoostError::CacheCorruption { field: "roi", .. })
        ));
    }

    #[test]
    fn falsy_records_fall_through() {
        let keys = fallback_keys(TJ, JK, &ctx());
        let falsy = vec![
            (keys[0].clone(), json!(false)),
            (keys[1].clone(), json!(0)),
            (keys[2].clone(), json!("")),
            (keys[3].clone(), json!([])),
        ];
        assert!(cache(falsy.clone()).lookup(TJ, JK, &ctx()).unwrap().is_none());

        let mut with_general = falsy;
        with_general.push((keys[4].clone(), rec(300, 45)));
        let s = cache(with_general).lookup(TJ, JK, &ctx()).unwrap().unwrap();
        assert_eq!(s.starts(), 300);
    }

    #[test]
    fn non_object_record_is_corruption() {
        let keys = fallback_keys(TJ, JK, &ctx());
        for record in [json!([1]), json!("abc"), json!(true), json!(12)] {
            let c = cache(vec![(keys[0].clone(), record)]);
            assert!(matches!(
                c.lookup(TJ, JK, &ctx()),
                Err(BoostError::CacheCorruption { field: "record", .. })
            ));
        }
    }

    #[test]
    fn unreadable_file_degrades_to_empty() {
        use std::io::Write;

        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(&[0xff, 0xfe, 0x7b]).unwrap();
        file.flush().unwrap();
        assert!(StatCache::load(file.path()).is_empty());
    }
}
