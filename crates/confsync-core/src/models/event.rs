use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::dates::parse_schedule_date;

/// Event `type` value for regular conference talks, the only votable kind.
pub const EVENT_TYPE_CONFERENCE: i64 = 2;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Event {
    pub id: i64,
    pub title: String,
    #[serde(rename = "apiDescription", default)]
    pub description: Option<String>,
    #[serde(rename = "type", default)]
    pub event_type: i64,
    #[serde(rename = "startTime", default)]
    pub start_time: Option<String>,
    #[serde(rename = "endTime", default)]
    pub end_time: Option<String>,
    #[serde(default)]
    pub date: Option<String>,
    #[serde(default)]
    pub track: Option<Track>,
    #[serde(default)]
    pub location: Option<Location>,
    #[serde(default)]
    pub speakers: Vec<Speaker>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Track {
    #[serde(default)]
    pub id: i64,
    pub name: String,
    #[serde(default)]
    pub host: Option<String>,
    #[serde(rename = "shortdescription", default)]
    pub short_description: Option<String>,
    #[serde(rename = "apiDescription", default)]
    pub description: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Location {
    #[serde(default)]
    pub id: i64,
    pub name: String,
    #[serde(rename = "mapUrl", default)]
    pub map_url: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Speaker {
    pub name: String,
    #[serde(default)]
    pub bio: Option<String>,
    #[serde(default)]
    pub company: Option<String>,
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub picture: Option<String>,
    #[serde(default)]
    pub twitter: Option<String>,
}

impl Event {
    pub fn starts_at(&self) -> Option<DateTime<Utc>> {
        self.start_time.as_deref().and_then(parse_schedule_date)
    }

    pub fn ends_at(&self) -> Option<DateTime<Utc>> {
        self.end_time.as_deref().and_then(parse_schedule_date)
    }

    /// True while `now` falls between the event's start and end.
    pub fn is_active_at(&self, now: DateTime<Utc>) -> bool {
        match (self.starts_at(), self.ends_at()) {
            (Some(start), Some(end)) => start <= now && now <= end,
            _ => false,
        }
    }

    /// Votes open once a conference talk has finished.
    pub fn is_votable_at(&self, now: DateTime<Utc>) -> bool {
        self.event_type == EVENT_TYPE_CONFERENCE
            && self.ends_at().map(|end| end <= now).unwrap_or(false)
    }

    pub fn speaker_names(&self) -> String {
        self.speakers
            .iter()
            .map(|s| s.name.as_str())
            .collect::<Vec<_>>()
            .join(", ")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn talk(event_type: i64) -> Event {
        Event {
            id: 1,
            title: "Talk".to_string(),
            description: None,
            event_type,
            start_time: Some("2020-06-02T09:00:00Z".to_string()),
            end_time: Some("2020-06-02T10:00:00Z".to_string()),
            date: None,
            track: None,
            location: None,
            speakers: vec![],
        }
    }

    #[test]
    fn test_is_active_at() {
        let event = talk(EVENT_TYPE_CONFERENCE);
        assert!(event.is_active_at(Utc.with_ymd_and_hms(2020, 6, 2, 9, 30, 0).unwrap()));
        assert!(!event.is_active_at(Utc.with_ymd_and_hms(2020, 6, 2, 10, 30, 0).unwrap()));
    }

    #[test]
    fn test_is_votable_only_after_end() {
        let event = talk(EVENT_TYPE_CONFERENCE);
        assert!(!event.is_votable_at(Utc.with_ymd_and_hms(2020, 6, 2, 9, 30, 0).unwrap()));
        assert!(event.is_votable_at(Utc.with_ymd_and_hms(2020, 6, 2, 10, 0, 0).unwrap()));
    }

    #[test]
    fn test_non_conference_events_are_not_votable() {
        let later = Utc.with_ymd_and_hms(2021, 1, 1, 0, 0, 0).unwrap();
        for other in [0, 1, 3] {
            assert!(!talk(other).is_votable_at(later), "type {other}");
        }
    }

    #[test]
    fn test_decoded_talk_is_votable_after_end() {
        let json = r#"{"id": 1, "title": "Talk", "type": 2,
            "startTime": "2020-06-02T09:00:00Z", "endTime": "2020-06-02T10:00:00Z"}"#;
        let event: Event = serde_json::from_str(json).unwrap();
        assert_eq!(event.event_type, EVENT_TYPE_CONFERENCE);
        assert!(event.is_votable_at(Utc.with_ymd_and_hms(2021, 1, 1, 0, 0, 0).unwrap()));
    }

    #[test]
    fn test_missing_times() {
        let mut event = talk(EVENT_TYPE_CONFERENCE);
        event.end_time = None;
        assert!(!event.is_active_at(Utc::now()));
        assert!(!event.is_votable_at(Utc::now()));
    }
}
