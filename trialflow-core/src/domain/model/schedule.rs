// trialflow-core/src/domain/model/schedule.rs

use chrono::{DateTime, NaiveDate};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::str::FromStr;

use crate::domain::error::ScheduleError;

/// One segment of a schedule, covering `[start, end)`.
/// A phase without `end` stays open forever.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Phase {
    pub label: String,
    pub start: i64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub end: Option<i64>,
}

impl Phase {
    pub fn new(label: impl Into<String>, start: i64, end: i64) -> Self {
        Self {
            label: label.into(),
            start,
            end: Some(end),
        }
    }

    pub fn open(label: impl Into<String>, start: i64) -> Self {
        Self {
            label: label.into(),
            start,
            end: None,
        }
    }

    pub fn is_open(&self) -> bool {
        self.end.is_none()
    }

    pub fn contains(&self, instant: i64) -> bool {
        instant >= self.start && self.end.is_none_or(|end| instant < end)
    }
}

/// Ordered, non-overlapping phases of one entity.
///
/// Built once, then only queried. Every `Schedule` value upholds:
/// phases sorted by strictly increasing `start`, each closed phase ends after
/// it starts and no later than the next one starts, and only the last phase
/// may be open.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Schedule {
    phases: Vec<Phase>,
}

impl Schedule {
    pub fn new(mut phases: Vec<Phase>) -> Result<Self, ScheduleError> {
        phases.sort_by_key(|p| p.start);

        for phase in &phases {
            if let Some(end) = phase.end
                && end <= phase.start
            {
                return Err(ScheduleError::InvertedPhase {
                    label: phase.label.clone(),
                    start: phase.start,
                    end,
                });
            }
        }

        for pair in phases.windows(2) {
            let (previous, next) = (&pair[0], &pair[1]);
            if previous.start == next.start {
                return Err(ScheduleError::DuplicateStart {
                    first: previous.label.clone(),
                    second: next.label.clone(),
                    start: next.start,
                });
            }
            match previous.end {
                None => {
                    return Err(ScheduleError::OpenPhaseNotLast {
                        label: previous.label.clone(),
                    });
                }
                Some(end) if end > next.start => {
                    return Err(ScheduleError::Overlap {
                        previous: previous.label.clone(),
                        next: next.label.clone(),
                    });
                }
                Some(_) => {}
            }
        }

        Ok(Self { phases })
    }

    /// Reads phases from a raw schedule value: either a sequence of
    /// `{label, start, end}` entries or a mapping `label -> {start, end}`.
    pub fn from_raw(value: &Value) -> Result<Self, ScheduleError> {
        let phases = match value {
            Value::Array(entries) => entries
                .iter()
                .enumerate()
                .map(|(index, entry)| {
                    let label = entry.get("label").and_then(Value::as_str).ok_or_else(|| {
                        ScheduleError::MalformedEntry {
                            index,
                            reason: "missing 'label'".into(),
                        }
                    })?;
                    phase_from_raw(index, label, entry)
                })
                .collect::<Result<Vec<_>, _>>()?,
            Value::Object(entries) => entries
                .iter()
                .enumerate()
                .map(|(index, (label, entry))| phase_from_raw(index, label, entry))
                .collect::<Result<Vec<_>, _>>()?,
            other => {
                return Err(ScheduleError::MalformedEntry {
                    index: 0,
                    reason: format!("expected a sequence or mapping of phases, found {}", other),
                });
            }
        };
        Self::new(phases)
    }

    pub fn phases(&self) -> &[Phase] {
        &self.phases
    }

    pub fn len(&self) -> usize {
        self.phases.len()
    }

    pub fn is_empty(&self) -> bool {
        self.phases.is_empty()
    }

    /// Whether the schedule runs on indefinitely (its last phase is open).
    pub fn is_open_ended(&self) -> bool {
        self.phases.last().is_some_and(Phase::is_open)
    }

    /// Finds the phase active at `as_of`.
    ///
    /// Intervals are half-open: an instant equal to one phase's end and the
    /// next phase's start belongs to the next phase. Returns `None` before the
    /// first phase, inside gaps, and after a closed final phase.
    pub fn resolve_phase(&self, as_of: i64) -> Option<&Phase> {
        let idx = self.phases.partition_point(|p| p.start <= as_of);
        if idx == 0 {
            return None;
        }
        let candidate = &self.phases[idx - 1];
        candidate.contains(as_of).then_some(candidate)
    }
}

fn phase_from_raw(index: usize, label: &str, entry: &Value) -> Result<Phase, ScheduleError> {
    if !entry.is_object() {
        return Err(ScheduleError::MalformedEntry {
            index,
            reason: format!("phase '{}' is not a mapping", label),
        });
    }
    let start = match entry.get("start") {
        None | Some(Value::Null) => {
            return Err(ScheduleError::MalformedEntry {
                index,
                reason: format!("phase '{}' has no 'start'", label),
            });
        }
        Some(v) => instant_from_raw(label, "start", v)?,
    };
    let end = match entry.get("end") {
        None | Some(Value::Null) => None,
        Some(v) => Some(instant_from_raw(label, "end", v)?),
    };
    Ok(Phase {
        label: label.to_string(),
        start,
        end,
    })
}

fn instant_from_raw(label: &str, bound: &'static str, value: &Value) -> Result<i64, ScheduleError> {
    let parsed = match value {
        Value::Number(n) => n.as_i64(),
        Value::String(s) => parse_instant(s),
        _ => None,
    };
    parsed.ok_or_else(|| ScheduleError::InvalidInstant {
        label: label.to_string(),
        bound,
        value: value.to_string(),
    })
}

/// Parses a timeline instant.
///
/// Integers are taken as-is (study day, sequence number, epoch seconds).
/// Dates (`YYYY-MM-DD`, midnight UTC) and RFC 3339 timestamps become Unix
/// seconds.
pub fn parse_instant(raw: &str) -> Option<i64> {
    let raw = raw.trim();
    if let Ok(offset) = raw.parse::<i64>() {
        return Some(offset);
    }
    if let Ok(ts) = DateTime::parse_from_rfc3339(raw) {
        return Some(ts.timestamp());
    }
    NaiveDate::parse_from_str(raw, "%Y-%m-%d")
        .ok()
        .and_then(|d| d.and_hms_opt(0, 0, 0))
        .map(|dt| dt.and_utc().timestamp())
}

/// An instant as written in configuration: `as-of: 12` or
/// `as-of: "2024-03-01"`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum InstantSpec {
    Offset(i64),
    Text(String),
}

impl InstantSpec {
    pub fn resolve(&self) -> Option<i64> {
        match self {
            Self::Offset(offset) => Some(*offset),
            Self::Text(text) => parse_instant(text),
        }
    }
}

impl FromStr for InstantSpec {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let spec = match s.trim().parse::<i64>() {
            Ok(offset) => Self::Offset(offset),
            Err(_) => Self::Text(s.trim().to_string()),
        };
        match spec.resolve() {
            Some(_) => Ok(spec),
            None => Err(format!("Unreadable instant: {}", s)),
        }
    }
}
