use serde::{Deserialize, Serialize};

use super::event::{Event, Speaker};

/// The full decoded payload served by the schedule endpoint.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct Dataset {
    pub conferences: Vec<Conference>,
}

impl Dataset {
    /// Decode a payload, rejecting anything that is not a complete dataset.
    pub fn from_json(bytes: &[u8]) -> serde_json::Result<Self> {
        serde_json::from_slice(bytes)
    }

    pub fn conference(&self, index: usize) -> Option<&Conference> {
        self.conferences.get(index)
    }

    pub fn conference_by_id(&self, id: i64) -> Option<&Conference> {
        self.conferences.iter().find(|c| c.info.id == id)
    }

    pub fn len(&self) -> usize {
        self.conferences.len()
    }

    pub fn is_empty(&self) -> bool {
        self.conferences.is_empty()
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Conference {
    pub info: ConferenceInfo,
    #[serde(default)]
    pub schedule: Vec<Event>,
    #[serde(default)]
    pub speakers: Vec<Speaker>,
    #[serde(default)]
    pub sponsors: Vec<Sponsor>,
}

impl Conference {
    pub fn id(&self) -> i64 {
        self.info.id
    }

    /// Find a scheduled event by id
    pub fn event(&self, event_id: i64) -> Option<&Event> {
        self.schedule.iter().find(|e| e.id == event_id)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ConferenceInfo {
    pub id: i64,
    pub name: String,
    #[serde(rename = "longName", default)]
    pub long_name: Option<String>,
    #[serde(rename = "nameAndLocation", default)]
    pub name_and_location: Option<String>,
    #[serde(rename = "firstDay", default)]
    pub first_day: Option<String>,
    #[serde(rename = "lastDay", default)]
    pub last_day: Option<String>,
    #[serde(rename = "normalSite", default)]
    pub normal_site: Option<String>,
    #[serde(rename = "registrationSite", default)]
    pub registration_site: Option<String>,
    #[serde(rename = "utcTimezoneOffset", default)]
    pub utc_timezone_offset: Option<String>,
    #[serde(rename = "utcTimezoneOffsetMillis", default)]
    pub utc_timezone_offset_millis: Option<i64>,
    #[serde(default)]
    pub hashtag: Option<String>,
    #[serde(default)]
    pub query: Option<String>,
}

impl ConferenceInfo {
    pub fn display_name(&self) -> &str {
        self.long_name.as_deref().unwrap_or(&self.name)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Sponsor {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub url: Option<String>,
    #[serde(default)]
    pub logo: Option<String>,
}
