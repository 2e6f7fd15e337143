use chrono::NaiveDate;

use crate::models::Application;

pub const DEFAULT_FOLLOW_UP_DAYS: i64 = 14;

/// Whole days since the last follow-up, or since applying if there was none.
pub fn days_since(app: &Application, today: NaiveDate) -> i64 {
    let last = app.last_follow_up.unwrap_or(app.date_applied);
    (today - last).num_days()
}

pub fn needs_follow_up(app: &Application, today: NaiveDate, days: i64) -> bool {
    if app.status.is_closed() {
        return false;
    }
    days_since(app, today) >= days
}

/// Applications due a nudge, longest-waiting first.
pub fn queue(apps: &[Application], today: NaiveDate, days: i64) -> Vec<&Application> {
    let mut due: Vec<&Application> = apps
        .iter()
        .filter(|app| needs_follow_up(app, today, days))
        .collect();
    due.sort_by_key(|app| std::cmp::Reverse(days_since(app, today)));
    due
}

/// Pre-filled email draft asking about the application.
pub fn mailto(app: &Application) -> String {
    let subject = format!("Following up on {} application", app.role);
    let body = format!(
        "Hi,\n\n\
         I wanted to follow up on my application for the {} position that I submitted on {}.\n\n\
         I'm very interested in this opportunity and would love to discuss how my skills and \
         experience align with your team's needs.\n\n\
         Thank you for your time and consideration.\n\n\
         Best regards,\n\
         [Your Name]",
        app.role,
        app.date_applied.format("%-m/%-d/%Y"),
    );
    format!(
        "mailto:?subject={}&body={}",
        crate::calendar::encode_component(&subject),
        crate::calendar::encode_component(&body)
    )
}
