//! Aligns the three reshaped metric tables on (country, sub-region, date).
//!
//! The confirmed table drives the join; deaths and recovered are lookups.
//! What happens to a confirmed row whose key is missing from a lookup is a
//! caller decision expressed as a [`JoinPolicy`].

use std::collections::hash_map::Entry;
use std::collections::{BTreeSet, HashMap};

use covid_dashboard_series_models::{JoinKey, JoinedRow, LongRow, Metric};
use serde::{Deserialize, Serialize};
use strum_macros::{AsRefStr, Display, EnumString};

use crate::IngestError;

/// How driving rows without a match in a lookup table are handled.
#[derive(
    Debug,
    Clone,
    Copy,
    Default,
    PartialEq,
    Eq,
    Hash,
    Serialize,
    Deserialize,
    Display,
    EnumString,
    AsRefStr,
)]
#[serde(rename_all = "kebab-case")]
#[strum(serialize_all = "kebab-case")]
pub enum JoinPolicy {
    /// Drop the driving row.
    #[default]
    Inner,
    /// Keep the driving row and fill the missing counts with 0.
    LeftWithFill,
    /// Fail with [`IngestError::JoinKeyMismatch`].
    Strict,
}

/// Joins confirmed rows with deaths and recovered lookups.
///
/// Output order follows `confirmed`. When a lookup table holds the same key
/// more than once, the first occurrence is used.
///
/// # Errors
///
/// Returns [`IngestError::JoinKeyMismatch`] under [`JoinPolicy::Strict`] for
/// the first confirmed key that is missing from a lookup.
pub fn join(
    confirmed: &[LongRow],
    deaths: &[LongRow],
    recovered: &[LongRow],
    policy: JoinPolicy,
) -> Result<Vec<JoinedRow>, IngestError> {
    let deaths_by_key = build_lookup(deaths, Metric::Deaths);
    let recovered_by_key = build_lookup(recovered, Metric::Recovered);

    let mut out = Vec::with_capacity(confirmed.len());
    let mut unmatched_rows: u64 = 0;
    let mut unmatched_locations: BTreeSet<(String, Option<String>)> = BTreeSet::new();

    for row in confirmed {
        let key = row.key();
        let death_count = deaths_by_key.get(&key).copied();
        let recovered_count = recovered_by_key.get(&key).copied();

        let (deaths, recovered) = match (death_count, recovered_count) {
            (Some(d), Some(r)) => (d, r),
            (d, r) => {
                if policy == JoinPolicy::Strict {
                    let metric = if d.is_none() {
                        Metric::Deaths
                    } else {
                        Metric::Recovered
                    };
                    return Err(IngestError::JoinKeyMismatch { metric, key });
                }

                unmatched_rows += 1;
                unmatched_locations.insert((key.country, key.sub_region));

                if policy == JoinPolicy::Inner {
                    continue;
                }
                (d.unwrap_or(0), r.unwrap_or(0))
            }
        };

        out.push(JoinedRow {
            sub_region: row.sub_region.clone(),
            country: row.country.clone(),
            date: row.date,
            confirmed: row.value,
            deaths,
            recovered,
        });
    }

    if unmatched_rows > 0 {
        let action = if policy == JoinPolicy::Inner {
            "dropped"
        } else {
            "filled with 0"
        };
        let locations: Vec<String> = unmatched_locations
            .iter()
            .map(|(country, sub)| {
                sub.as_ref()
                    .map_or_else(|| country.clone(), |s| format!("{country} / {s}"))
            })
            .collect();
        log::warn!(
            "Join ({policy}): {unmatched_rows} confirmed rows across {} locations had no \
             deaths/recovered match and were {action}: {}",
            locations.len(),
            locations.join(", ")
        );
    }

    log::info!(
        "Joined {} of {} confirmed rows ({policy})",
        out.len(),
        confirmed.len()
    );

    Ok(out)
}

/// Indexes a lookup table by join key, keeping the first value per key.
fn build_lookup(rows: &[LongRow], metric: Metric) -> HashMap<JoinKey, u64> {
    let mut map = HashMap::with_capacity(rows.len());
    let mut duplicates: u64 = 0;

    for row in rows {
        match map.entry(row.key()) {
            Entry::Vacant(entry) => {
                entry.insert(row.value);
            }
            Entry::Occupied(entry) => {
                duplicates += 1;
                log::debug!("Duplicate {metric} key {}, keeping first value", entry.key());
            }
        }
    }

    if duplicates > 0 {
        log::debug!("{metric} lookup: {duplicates} duplicate keys ignored");
    }

    map
}
