use regex::Regex;
use std::sync::OnceLock;
use url::Url;

/// Company and role recovered from a pasted job-posting URL.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct JobLead {
    pub company: Option<String>,
    pub role: Option<String>,
    pub url: String,
}

fn linkedin_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(r"linkedin\.com/jobs/view/([^\s/?#]+)-(\d+)").expect("valid regex")
    })
}

/// Returns `None` unless the text is a recognised posting that names a
/// company or role.
pub fn parse_job_url(text: &str) -> Option<JobLead> {
    let text = text.trim();

    let (company, role) = if let Some(caps) = linkedin_re().captures(text) {
        // company is not part of LinkedIn's URL
        (None, Some(caps[1].replace('-', " ")))
    } else if text.contains("indeed.com/") {
        (query_param(text, "company"), query_param(text, "jobtitle"))
    } else if text.contains("glassdoor.com/") && text.contains("jobListing") {
        (query_param(text, "employer"), query_param(text, "jobTitle"))
    } else {
        return None;
    };

    if company.is_none() && role.is_none() {
        return None;
    }
    tracing::debug!(?company, ?role, "recognised job url");
    Some(JobLead {
        company,
        role,
        url: text.to_string(),
    })
}

fn query_param(text: &str, name: &str) -> Option<String> {
    let parsed = Url::parse(text)
        .or_else(|_| Url::parse(&format!("https://{}", text)))
        .ok()?;
    parsed
        .query_pairs()
        .find(|(key, _)| key == name)
        .map(|(_, value)| value.trim().to_string())
        .filter(|value| !value.is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn linkedin_slug_becomes_role() {
        let lead = parse_job_url("https://www.linkedin.com/jobs/view/senior-rust-engineer-3912345678/")
            .unwrap();
        assert_eq!(lead.role.as_deref(), Some("senior rust engineer"));
        assert_eq!(lead.company, None);
    }

    #[test]
    fn linkedin_numeric_only_link_has_nothing_to_offer() {
        assert_eq!(parse_job_url("https://www.linkedin.com/jobs/view/3912345678"), None);
    }

    #[test]
    fn indeed_query_params() {
        let lead = parse_job_url(
            "https://www.indeed.com/viewjob?jobtitle=Data%20Analyst&company=Acme+Corp&jk=abc",
        )
        .unwrap();
        assert_eq!(lead.role.as_deref(), Some("Data Analyst"));
        assert_eq!(lead.company.as_deref(), Some("Acme Corp"));
    }

    #[test]
    fn glassdoor_listing_without_scheme() {
        let lead = parse_job_url(
            "glassdoor.com/job-listing/jobListing.htm?jobTitle=Product%20Designer&employer=Globex",
        )
        .unwrap();
        assert_eq!(lead.role.as_deref(), Some("Product Designer"));
        assert_eq!(lead.company.as_deref(), Some("Globex"));
        assert!(lead.url.starts_with("glassdoor.com/"));
    }

    #[test]
    fn other_text_is_ignored() {
        assert_eq!(parse_job_url("https://example.com/careers/42"), None);
        assert_eq!(parse_job_url("Acme is hiring"), None);
    }
}
