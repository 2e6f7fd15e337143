use anyhow::{anyhow, bail, Context, Result};
use chrono::{DateTime, Duration, NaiveDate, NaiveTime, TimeZone, Utc};

use crate::models::Interview;

#[derive(Debug, Clone, Copy, PartialEq, Eq, clap::ValueEnum)]
pub enum CalendarService {
    Google,
    Outlook,
    /// iCalendar file (Apple Calendar and most desktop clients)
    Ics,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CalendarEvent {
    pub uid: String,
    pub title: String,
    pub details: String,
    pub start: DateTime<Utc>,
    pub end: DateTime<Utc>,
}

impl CalendarEvent {
    /// Interviews last an hour. A date with a time is read in `tz`; a bare
    /// date means midnight UTC.
    pub fn from_interview<Tz: TimeZone>(
        interview: &Interview,
        company: &str,
        role: &str,
        tz: &Tz,
    ) -> Result<Self> {
        if interview.date.trim().is_empty() {
            bail!("Interview '{}' has no date set", interview.kind);
        }
        let date = NaiveDate::parse_from_str(interview.date.trim(), "%Y-%m-%d")
            .with_context(|| format!("Invalid interview date: {}", interview.date))?;

        let start = if interview.time.trim().is_empty() {
            date.and_time(NaiveTime::MIN).and_utc()
        } else {
            let time = parse_time(interview.time.trim())?;
            tz.from_local_datetime(&date.and_time(time))
                .earliest()
                .ok_or_else(|| anyhow!("{} {} does not exist in the local time zone", interview.date, interview.time))?
                .with_timezone(&Utc)
        };

        Ok(Self {
            uid: format!("{}@jobtracker", interview.id),
            title: format!("Interview: {} at {}", role, company),
            details: format!("Interview Type: {}\nNotes: {}", interview.kind, interview.notes),
            start,
            end: start + Duration::hours(1),
        })
    }

    pub fn render(&self, service: CalendarService) -> String {
        match service {
            CalendarService::Google => self.google_url(),
            CalendarService::Outlook => self.outlook_url(),
            CalendarService::Ics => self.ics(),
        }
    }

    pub fn google_url(&self) -> String {
        format!(
            "https://calendar.google.com/calendar/render?action=TEMPLATE&text={}&dates={}/{}&details={}",
            encode_component(&self.title),
            compact_stamp(self.start),
            compact_stamp(self.end),
            encode_component(&self.details)
        )
    }

    pub fn outlook_url(&self) -> String {
        format!(
            "https://outlook.office.com/calendar/0/deeplink/compose?subject={}&startdt={}&enddt={}&body={}",
            encode_component(&self.title),
            iso_stamp(self.start),
            iso_stamp(self.end),
            encode_component(&self.details)
        )
    }

    pub fn ics(&self) -> String {
        [
            "BEGIN:VCALENDAR".to_string(),
            "VERSION:2.0".to_string(),
            "BEGIN:VEVENT".to_string(),
            format!("UID:{}", self.uid),
            format!("DTSTART:{}", compact_stamp(self.start)),
            format!("DTEND:{}", compact_stamp(self.end)),
            format!("SUMMARY:{}", escape_ics(&self.title)),
            format!("DESCRIPTION:{}", escape_ics(&self.details)),
            "END:VEVENT".to_string(),
            "END:VCALENDAR".to_string(),
        ]
        .join("\n")
    }
}

/// Percent-encodes everything but unreserved characters; spaces become %20.
pub fn encode_component(s: &str) -> String {
    url::form_urlencoded::byte_serialize(s.as_bytes())
        .collect::<String>()
        .replace('+', "%20")
}

fn parse_time(raw: &str) -> Result<NaiveTime> {
    NaiveTime::parse_from_str(raw, "%H:%M")
        .or_else(|_| NaiveTime::parse_from_str(raw, "%H:%M:%S"))
        .with_context(|| format!("Invalid interview time: {}", raw))
}

fn compact_stamp(at: DateTime<Utc>) -> String {
    at.format("%Y%m%dT%H%M%SZ").to_string()
}

fn iso_stamp(at: DateTime<Utc>) -> String {
    at.format("%Y-%m-%dT%H:%M:%S%.3fZ").to_string()
}

fn escape_ics(text: &str) -> String {
    text.replace('\\', "\\\\")
        .replace(';', "\\;")
        .replace(',', "\\,")
        .replace('\n', "\\n")
}
