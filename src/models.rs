use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::error::StoreError;

pub type ApplicationId = String;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Status {
    Applied,
    Interviewing,
    Offer,
    Rejected,
    Accepted,
}

impl Status {
    /// Board column order.
    pub const ALL: [Status; 5] = [
        Status::Applied,
        Status::Interviewing,
        Status::Offer,
        Status::Rejected,
        Status::Accepted,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            Status::Applied => "applied",
            Status::Interviewing => "interviewing",
            Status::Offer => "offer",
            Status::Rejected => "rejected",
            Status::Accepted => "accepted",
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Status::Applied => "Applied",
            Status::Interviewing => "Interviewing",
            Status::Offer => "Offer",
            Status::Rejected => "Rejected",
            Status::Accepted => "Accepted",
        }
    }

    /// Position in `Status::ALL`.
    pub fn index(self) -> usize {
        self as usize
    }

    /// No further follow-up is expected once an application is closed out.
    pub fn is_closed(self) -> bool {
        matches!(self, Status::Rejected | Status::Accepted)
    }
}

impl fmt::Display for Status {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Status {
    type Err = StoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Status::ALL
            .into_iter()
            .find(|status| status.as_str().eq_ignore_ascii_case(s.trim()))
            .ok_or_else(|| StoreError::UnknownStatus(s.to_string()))
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Interview {
    pub id: String,
    #[serde(rename = "type")]
    pub kind: String,
    pub date: String, // "YYYY-MM-DD" or empty
    pub time: String, // "HH:MM" or empty
    pub notes: String,
}

/// Empty strings mean "not set".
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct OfferDetails {
    pub salary: String,
    pub equity: String,
    pub bonus: String,
    pub location: String,
    pub start_date: String,
    pub deadline: String,
}

impl OfferDetails {
    pub fn fields(&self) -> [(&'static str, &str); 6] {
        [
            ("Salary", &self.salary),
            ("Equity", &self.equity),
            ("Bonus", &self.bonus),
            ("Location", &self.location),
            ("Start date", &self.start_date),
            ("Deadline", &self.deadline),
        ]
    }

    pub fn has_any(&self) -> bool {
        self.fields().iter().any(|(_, value)| !value.is_empty())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Application {
    pub id: ApplicationId,
    pub company: String,
    pub role: String,
    pub status: Status,
    pub date_applied: NaiveDate,
    #[serde(default)]
    pub job_url: String,
    #[serde(default)]
    pub notes: String,
    #[serde(default)]
    pub interviews: Vec<Interview>,
    #[serde(default)]
    pub offer_details: OfferDetails,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_follow_up: Option<NaiveDate>,
}

impl Application {
    pub fn from_new(id: ApplicationId, new: NewApplication) -> Self {
        Self {
            id,
            company: new.company,
            role: new.role,
            status: new.status,
            date_applied: new.date_applied,
            job_url: new.job_url,
            notes: new.notes,
            interviews: new.interviews,
            offer_details: new.offer_details,
            last_follow_up: new.last_follow_up,
        }
    }

    /// Editable copy, the way the edit form is pre-filled.
    pub fn to_new(&self) -> NewApplication {
        NewApplication {
            company: self.company.clone(),
            role: self.role.clone(),
            status: self.status,
            date_applied: self.date_applied,
            job_url: self.job_url.clone(),
            notes: self.notes.clone(),
            interviews: self.interviews.clone(),
            offer_details: self.offer_details.clone(),
            last_follow_up: self.last_follow_up,
        }
    }

    /// Offer-stage heuristic: explicit status, or any offer detail filled in.
    pub fn is_offer_like(&self) -> bool {
        self.status == Status::Offer || self.offer_details.has_any()
    }
}

/// An application before the store has assigned it an id.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewApplication {
    pub company: String,
    pub role: String,
    pub status: Status,
    pub date_applied: NaiveDate,
    pub job_url: String,
    pub notes: String,
    pub interviews: Vec<Interview>,
    pub offer_details: OfferDetails,
    pub last_follow_up: Option<NaiveDate>,
}

impl NewApplication {
    pub fn new(company: &str, role: &str, date_applied: NaiveDate) -> Self {
        Self {
            company: company.to_string(),
            role: role.to_string(),
            status: Status::Applied,
            date_applied,
            job_url: String::new(),
            notes: String::new(),
            interviews: Vec::new(),
            offer_details: OfferDetails::default(),
            last_follow_up: None,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Stats {
    pub total: usize,
    pub by_status: [usize; 5],
    pub needs_follow_up: usize,
}

impl Stats {
    pub fn count(&self, status: Status) -> usize {
        self.by_status[status.index()]
    }
}
