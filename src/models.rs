use chrono::{DateTime, FixedOffset, NaiveDate};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

// Rule deciding which calendar dates a habit is scheduled on.
// Tagged on "type" so each kind carries only its own fields;
// an unknown tag falls into Unknown, which is never scheduled.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum RepeatPattern {
    Daily,
    Weekly {
        days_of_week: Vec<u8>, // 0 = Sunday .. 6 = Saturday
    },
    Monthly {
        day_of_month: u32, // 1..=31
    },
    Yearly {
        month_of_year: u32, // 1..=12
        day_of_month: u32,  // 1..=31
    },
    #[serde(other)]
    Unknown,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum GoalUnit {
    Times,
    Minutes,
    Hours,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum GoalTimeframe {
    Total,
    PerDay,
    PerWeek,
    PerMonth,
}

// Target quantity a habit aims to satisfy over a timeframe.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Goal {
    pub value: f64, // positive; enforced at the API boundary
    pub unit: GoalUnit,
    pub timeframe: GoalTimeframe,
}

// How strictly the goal must be met. Carried through the API for
// completeness; the status engine does not read it.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum CompletionTargetKind {
    EveryTime,
    TimesPerTimeframe,
    DaysPerTimeframe,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum TargetTimeframe {
    Day,
    Week,
    Month,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CompletionTarget {
    #[serde(rename = "type")]
    pub kind: CompletionTargetKind,
    pub value: Option<f64>, // >= 1 when present
    pub timeframe: Option<TargetTimeframe>,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum TimeOfDay {
    AnyTime,
    Morning,
    Afternoon,
    Evening,
    SpecificTime,
}

// Dated record of an action taken (or skipped) on a habit.
// Dates are whole calendar days; flags default to false when absent.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LogEntry {
    pub date: NaiveDate,
    #[serde(default)]
    pub completed: bool,
    #[serde(default)]
    pub skipped: bool,
    #[serde(default)]
    pub value: f64, // progress amount for minutes/hours goals
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Habit {
    pub id: Uuid,
    pub name: String,
    pub emoji: Option<String>,
    pub goal: Goal,
    pub repeat_pattern: RepeatPattern,
    pub completion_target: Option<CompletionTarget>,
    #[serde(default)]
    pub time_of_day: Vec<TimeOfDay>,
    pub specific_time: Option<DateTime<FixedOffset>>, // with TimeOfDay::SpecificTime
    pub start_date: NaiveDate,       // inclusive lower bound of tracking
    pub end_date: Option<NaiveDate>, // inclusive; None = unbounded
    pub area_id: Option<Uuid>,
    #[serde(default)]
    pub log: Vec<LogEntry>,
    pub created_at: DateTime<FixedOffset>,
}

impl Habit {
    // One authoritative entry per calendar day: recording removes every
    // existing entry for that day before appending the new one, so stale
    // duplicates in stored data can never shadow a fresh record.
    pub fn record(&mut self, entry: LogEntry) {
        self.log.retain(|e| e.date != entry.date);
        self.log.push(entry);
    }
}

// Grouping category for habits. Membership lives on Habit.area_id;
// the area itself only carries its name.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Area {
    pub id: Uuid,
    pub name: String,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Db {
    #[serde(default)]
    pub areas: Vec<Area>,
    #[serde(default)]
    pub habits: Vec<Habit>,
}
