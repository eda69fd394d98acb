//! Pact records, timestamps, and the request bodies sent to the collection API.

use chrono::{
    DateTime, FixedOffset, Local, NaiveDate, NaiveDateTime, NaiveTime, Offset, SecondsFormat,
    TimeZone, Utc,
};
use serde::{Deserialize, Deserializer, Serialize};

use crate::error::ValidationError;

/// A tracked commitment as returned by the server.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Pact {
    pub id: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub name: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub description: String,
    /// Raw timestamp text. Kept as sent so an unparsable value survives a
    /// round trip; use [`Pact::timestamp`] to interpret it.
    #[serde(default, deserialize_with = "string_or_none")]
    pub date: Option<String>,
    #[serde(default)]
    pub category: Option<String>,
}

impl Pact {
    /// Parsed `date`, or `None` when absent or unparsable.
    pub fn timestamp(&self) -> Option<PactTimestamp> {
        self.date.as_deref().and_then(PactTimestamp::parse)
    }

    /// Calendar day this pact falls on in the given zone.
    pub fn day_key(&self, zone: &CalendarZone) -> Option<NaiveDate> {
        self.timestamp().map(|ts| ts.day_key(zone))
    }
}

fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}

fn string_or_none<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    match serde_json::Value::deserialize(deserializer)? {
        serde_json::Value::String(s) => Ok(Some(s)),
        _ => Ok(None),
    }
}

/// Zone used to turn instants into calendar days, and local wall-clock input
/// into instants.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum CalendarZone {
    #[default]
    Local,
    Fixed(FixedOffset),
}

impl CalendarZone {
    pub fn utc() -> Self {
        Self::Fixed(Utc.fix())
    }

    /// Fixed offset in minutes east of UTC, or the local zone when unset or
    /// out of range.
    pub fn from_offset_minutes(minutes: Option<i32>) -> Self {
        minutes
            .and_then(|m| m.checked_mul(60))
            .and_then(FixedOffset::east_opt)
            .map(Self::Fixed)
            .unwrap_or(Self::Local)
    }

    pub fn date_of(&self, instant: &DateTime<FixedOffset>) -> NaiveDate {
        match self {
            Self::Local => instant.with_timezone(&Local).date_naive(),
            Self::Fixed(offset) => instant.with_timezone(offset).date_naive(),
        }
    }

    pub fn today(&self) -> NaiveDate {
        match self {
            Self::Local => Local::now().date_naive(),
            Self::Fixed(offset) => Utc::now().with_timezone(offset).date_naive(),
        }
    }

    /// Interpret a wall-clock time in this zone. `None` inside a DST gap.
    pub fn resolve(&self, naive: &NaiveDateTime) -> Option<DateTime<Utc>> {
        match self {
            Self::Local => Local
                .from_local_datetime(naive)
                .earliest()
                .map(|dt| dt.with_timezone(&Utc)),
            Self::Fixed(offset) => offset
                .from_local_datetime(naive)
                .single()
                .map(|dt| dt.with_timezone(&Utc)),
        }
    }
}

/// A parsed pact date.
///
/// Timestamps carrying an offset are instants; ones without are wall-clock
/// times read in whatever zone the viewer uses.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PactTimestamp {
    Zoned(DateTime<FixedOffset>),
    Floating(NaiveDateTime),
}

const FLOATING_FORMATS: [&str; 4] = [
    "%Y-%m-%dT%H:%M:%S%.f",
    "%Y-%m-%dT%H:%M:%S",
    "%Y-%m-%dT%H:%M",
    "%Y-%m-%d %H:%M:%S",
];

impl PactTimestamp {
    /// Accepts RFC 3339, `YYYY-MM-DDTHH:MM[:SS[.fff]]` and `YYYY-MM-DD`.
    pub fn parse(input: &str) -> Option<Self> {
        let s = input.trim();
        if s.is_empty() {
            return None;
        }

        if let Ok(dt) = DateTime::parse_from_rfc3339(s) {
            return Some(Self::Zoned(dt));
        }

        for format in FLOATING_FORMATS {
            if let Ok(naive) = NaiveDateTime::parse_from_str(s, format) {
                return Some(Self::Floating(naive));
            }
        }

        NaiveDate::parse_from_str(s, "%Y-%m-%d")
            .ok()
            .map(|d| Self::Floating(d.and_time(NaiveTime::MIN)))
    }

    /// The calendar date with time of day discarded.
    pub fn day_key(&self, zone: &CalendarZone) -> NaiveDate {
        match self {
            Self::Zoned(dt) => zone.date_of(dt),
            Self::Floating(naive) => naive.date(),
        }
    }

    pub fn to_utc(&self, zone: &CalendarZone) -> Option<DateTime<Utc>> {
        match self {
            Self::Zoned(dt) => Some(dt.with_timezone(&Utc)),
            Self::Floating(naive) => zone.resolve(naive),
        }
    }

    /// UTC RFC 3339 with milliseconds, e.g. `2025-03-10T07:00:00.000Z`.
    pub fn to_iso_string(&self, zone: &CalendarZone) -> Option<String> {
        self.to_utc(zone)
            .map(|dt| dt.to_rfc3339_opts(SecondsFormat::Millis, true))
    }
}

fn normalize_date_input(input: &str, zone: &CalendarZone) -> Result<String, ValidationError> {
    PactTimestamp::parse(input)
        .and_then(|ts| ts.to_iso_string(zone))
        .ok_or_else(|| ValidationError::InvalidDate(input.to_string()))
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SortDirection {
    Asc,
    #[default]
    Desc,
}

impl SortDirection {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Asc => "asc",
            Self::Desc => "desc",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "asc" => Some(Self::Asc),
            "desc" => Some(Self::Desc),
            _ => None,
        }
    }
}

/// Filter for `GET /pacts`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PactQuery {
    pub name_prefix: String,
    pub category: String,
    pub sort: SortDirection,
    pub limit: u32,
}

impl Default for PactQuery {
    fn default() -> Self {
        Self {
            name_prefix: String::new(),
            category: String::new(),
            sort: SortDirection::Desc,
            limit: 100,
        }
    }
}

impl PactQuery {
    /// Most recent `limit` pacts, unfiltered.
    pub fn recent(limit: u32) -> Self {
        Self {
            limit,
            ..Self::default()
        }
    }

    /// Query-string pairs. Empty filters are left out.
    pub fn to_query_pairs(&self) -> Vec<(&'static str, String)> {
        let mut pairs = Vec::with_capacity(4);
        if !self.name_prefix.is_empty() {
            pairs.push(("name", self.name_prefix.clone()));
        }
        if !self.category.is_empty() {
            pairs.push(("category", self.category.clone()));
        }
        pairs.push(("sort", self.sort.as_str().to_string()));
        pairs.push(("limit", self.limit.to_string()));
        pairs
    }
}

/// Raw create-form input.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PactDraft {
    pub name: String,
    pub description: String,
    /// Empty for "no date".
    pub date: String,
    pub category: String,
}

impl PactDraft {
    /// Check required fields and normalize the date.
    ///
    /// # Errors
    /// `MissingFields` when name, description or category is blank;
    /// `InvalidDate` when a date was entered but cannot be parsed.
    pub fn validate(&self, zone: &CalendarZone) -> Result<PactCreateRequest, ValidationError> {
        let name = self.name.trim();
        let description = self.description.trim();
        let category = self.category.trim();

        let missing: Vec<&'static str> = [
            ("name", name),
            ("description", description),
            ("category", category),
        ]
        .into_iter()
        .filter(|(_, value)| value.is_empty())
        .map(|(field, _)| field)
        .collect();

        if !missing.is_empty() {
            return Err(ValidationError::MissingFields(missing));
        }

        let date = match self.date.trim() {
            "" => None,
            input => Some(normalize_date_input(input, zone)?),
        };

        Ok(PactCreateRequest {
            name: name.to_string(),
            description: description.to_string(),
            date,
            category: category.to_string(),
        })
    }
}

/// Body of `POST /pacts`. `date` is sent as `null` when absent.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PactCreateRequest {
    pub name: String,
    pub description: String,
    pub date: Option<String>,
    pub category: String,
}

/// Body of `PUT /pacts/{id}`: only the fields that changed.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct PactUpdateRequest {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub date: Option<String>,
    /// `Some("")` clears the category on the server.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub category: Option<String>,
}

impl PactUpdateRequest {
    pub fn is_empty(&self) -> bool {
        self.name.is_none()
            && self.description.is_none()
            && self.date.is_none()
            && self.category.is_none()
    }
}

/// Edit-form values for an existing pact, prefilled from the displayed record.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PactEdit {
    pub name: String,
    pub description: String,
    /// Empty clears the category.
    pub category: String,
    /// Empty leaves the date unchanged.
    pub date: String,
}

impl PactEdit {
    pub fn from_pact(pact: &Pact, zone: &CalendarZone) -> Self {
        Self {
            name: pact.name.clone(),
            description: pact.description.clone(),
            category: pact.category.clone().unwrap_or_default(),
            date: pact
                .timestamp()
                .and_then(|ts| ts.to_iso_string(zone))
                .unwrap_or_default(),
        }
    }

    /// Build an update containing only the fields that differ from `original`.
    ///
    /// # Errors
    /// `InvalidDate` when the date field is non-empty and unparsable.
    pub fn diff(
        &self,
        original: &Pact,
        zone: &CalendarZone,
    ) -> Result<PactUpdateRequest, ValidationError> {
        let mut update = PactUpdateRequest::default();

        if self.name != original.name {
            update.name = Some(self.name.clone());
        }
        if self.description != original.description {
            update.description = Some(self.description.clone());
        }
        if self.category != original.category.as_deref().unwrap_or("") {
            update.category = Some(self.category.clone());
        }
        if !self.date.trim().is_empty() {
            let date = normalize_date_input(&self.date, zone)?;
            let current = original.timestamp().and_then(|ts| ts.to_iso_string(zone));
            if current.as_deref() != Some(date.as_str()) {
                update.date = Some(date);
            }
        }

        Ok(update)
    }
}
