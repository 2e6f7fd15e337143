use chrono::{NaiveDate, Utc};
use rand::Rng;
use serde::de::DeserializeOwned;

use crate::error::{StoreError, StoreResult};
use crate::followup;
use crate::kv::{KvStore, APPLICATIONS_KEY, COMPANIES_KEY};
use crate::models::{Application, ApplicationId, NewApplication, Stats, Status};

/// Every change to the record collection goes through one of these.
#[derive(Debug, Clone)]
pub enum Mutation {
    Create(NewApplication),
    Update {
        id: ApplicationId,
        application: NewApplication,
    },
    Delete(ApplicationId),
    SetStatus {
        id: ApplicationId,
        status: Status,
    },
    MarkFollowedUp {
        id: ApplicationId,
        date: NaiveDate,
    },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Outcome {
    Created(ApplicationId),
    Updated(ApplicationId),
    Deleted(ApplicationId),
    /// Target id was absent; nothing changed and nobody was notified.
    Unchanged,
}

/// State handed to subscribers after a mutation.
pub struct Snapshot<'a> {
    pub applications: &'a [Application],
    pub companies: &'a [String],
}

pub trait Subscriber {
    fn notify(&mut self, snapshot: &Snapshot<'_>) -> StoreResult<()>;
}

impl<F> Subscriber for F
where
    F: FnMut(&Snapshot<'_>) -> StoreResult<()>,
{
    fn notify(&mut self, snapshot: &Snapshot<'_>) -> StoreResult<()> {
        self(snapshot)
    }
}

/// Writes both stored values through to key-value storage on every change.
pub struct Persister<K: KvStore> {
    kv: K,
}

impl<K: KvStore> Persister<K> {
    pub fn new(kv: K) -> Self {
        Self { kv }
    }
}

impl<K: KvStore> Subscriber for Persister<K> {
    fn notify(&mut self, snapshot: &Snapshot<'_>) -> StoreResult<()> {
        let applications = serde_json::to_string(snapshot.applications)?;
        let companies = serde_json::to_string(snapshot.companies)?;
        self.kv.set(APPLICATIONS_KEY, &applications)?;
        self.kv.set(COMPANIES_KEY, &companies)?;
        tracing::debug!(
            applications = snapshot.applications.len(),
            companies = snapshot.companies.len(),
            "persisted records"
        );
        Ok(())
    }
}

pub struct RecordStore {
    applications: Vec<Application>,
    companies: Vec<String>,
    subscribers: Vec<Box<dyn Subscriber>>,
}

impl RecordStore {
    pub fn new() -> Self {
        Self {
            applications: Vec::new(),
            companies: Vec::new(),
            subscribers: Vec::new(),
        }
    }

    /// Reads both stored values. Missing keys start empty; values that no
    /// longer parse are logged and replaced with empty defaults.
    pub fn load(kv: &dyn KvStore) -> StoreResult<Self> {
        let applications: Vec<Application> = read_json(kv, APPLICATIONS_KEY)?;
        let companies: Vec<String> = read_json(kv, COMPANIES_KEY)?;
        tracing::info!(
            applications = applications.len(),
            companies = companies.len(),
            "loaded records"
        );
        Ok(Self {
            applications,
            companies,
            subscribers: Vec::new(),
        })
    }

    pub fn subscribe(&mut self, subscriber: impl Subscriber + 'static) {
        self.subscribers.push(Box::new(subscriber));
    }

    pub fn applications(&self) -> &[Application] {
        &self.applications
    }

    pub fn companies(&self) -> &[String] {
        &self.companies
    }

    pub fn get(&self, id: &str) -> Option<&Application> {
        self.applications.iter().find(|a| a.id == id)
    }

    pub fn require(&self, id: &str) -> StoreResult<&Application> {
        self.get(id).ok_or_else(|| StoreError::NotFound(id.to_string()))
    }

    pub fn create(&mut self, application: NewApplication) -> StoreResult<ApplicationId> {
        match self.apply(Mutation::Create(application))? {
            Outcome::Created(id) => Ok(id),
            other => Err(StoreError::Invalid(format!("unexpected outcome {:?}", other))),
        }
    }

    pub fn update(&mut self, id: &str, application: NewApplication) -> StoreResult<Outcome> {
        self.apply(Mutation::Update {
            id: id.to_string(),
            application,
        })
    }

    pub fn delete(&mut self, id: &str) -> StoreResult<Outcome> {
        self.apply(Mutation::Delete(id.to_string()))
    }

    pub fn set_status(&mut self, id: &str, status: Status) -> StoreResult<Outcome> {
        self.apply(Mutation::SetStatus {
            id: id.to_string(),
            status,
        })
    }

    pub fn mark_followed_up(&mut self, id: &str, date: NaiveDate) -> StoreResult<Outcome> {
        self.apply(Mutation::MarkFollowedUp {
            id: id.to_string(),
            date,
        })
    }

    /// Single mutation entry point. Subscribers run after every change.
    /// If one of them fails, the in-memory change is rolled back and its
    /// error is returned, so memory never holds a change that was reported
    /// as failed.
    pub fn apply(&mut self, mutation: Mutation) -> StoreResult<Outcome> {
        let previous = (self.applications.clone(), self.companies.clone());

        let outcome = match mutation {
            Mutation::Create(new) => {
                validate(&new)?;
                self.remember_company(&new.company);
                let id = self.fresh_id();
                self.applications.push(Application::from_new(id.clone(), new));
                tracing::info!(%id, "created application");
                Outcome::Created(id)
            }
            Mutation::Update { id, application } => {
                validate(&application)?;
                match self.position(&id) {
                    Some(idx) => {
                        self.remember_company(&application.company);
                        self.applications[idx] = Application::from_new(id.clone(), application);
                        tracing::info!(%id, "updated application");
                        Outcome::Updated(id)
                    }
                    None => Outcome::Unchanged,
                }
            }
            Mutation::Delete(id) => match self.position(&id) {
                Some(idx) => {
                    self.applications.remove(idx);
                    tracing::info!(%id, "deleted application");
                    Outcome::Deleted(id)
                }
                None => Outcome::Unchanged,
            },
            Mutation::SetStatus { id, status } => match self.position(&id) {
                Some(idx) => {
                    let app = &mut self.applications[idx];
                    tracing::info!(%id, from = %app.status, to = %status, "status changed");
                    app.status = status;
                    Outcome::Updated(id)
                }
                None => Outcome::Unchanged,
            },
            Mutation::MarkFollowedUp { id, date } => match self.position(&id) {
                Some(idx) => {
                    self.applications[idx].last_follow_up = Some(date);
                    Outcome::Updated(id)
                }
                None => Outcome::Unchanged,
            },
        };

        if outcome == Outcome::Unchanged {
            tracing::debug!("mutation targeted a missing application; ignored");
            return Ok(outcome);
        }

        if let Err(e) = self.publish() {
            tracing::warn!(error = %e, "change was not saved; rolled back");
            (self.applications, self.companies) = previous;
            return Err(e);
        }
        Ok(outcome)
    }

    pub fn stats(&self, today: NaiveDate, follow_up_days: i64) -> Stats {
        let mut stats = Stats {
            total: self.applications.len(),
            ..Stats::default()
        };
        for app in &self.applications {
            stats.by_status[app.status.index()] += 1;
            if followup::needs_follow_up(app, today, follow_up_days) {
                stats.needs_follow_up += 1;
            }
        }
        stats
    }

    /// Known companies ranked by similarity to `query`, best first.
    pub fn suggest_companies(&self, query: &str, limit: usize) -> Vec<(&str, f64)> {
        let query = query.to_lowercase();
        let mut scored: Vec<(&str, f64)> = self
            .companies
            .iter()
            .map(|name| {
                let lower = name.to_lowercase();
                let mut score = strsim::jaro_winkler(&query, &lower);
                if lower.starts_with(&query) {
                    score = score.max(0.95);
                }
                (name.as_str(), score)
            })
            .filter(|(_, score)| *score >= 0.7)
            .collect();
        scored.sort_by(|a, b| b.1.partial_cmp(&a.1).unwrap_or(std::cmp::Ordering::Equal));
        scored.truncate(limit);
        scored
    }

    fn publish(&mut self) -> StoreResult<()> {
        let snapshot = Snapshot {
            applications: &self.applications,
            companies: &self.companies,
        };
        for subscriber in self.subscribers.iter_mut() {
            subscriber.notify(&snapshot)?;
        }
        Ok(())
    }

    fn position(&self, id: &str) -> Option<usize> {
        self.applications.iter().position(|a| a.id == id)
    }

    fn remember_company(&mut self, company: &str) {
        if !company.is_empty() && !self.companies.iter().any(|c| c == company) {
            self.companies.push(company.to_string());
        }
    }

    fn fresh_id(&self) -> ApplicationId {
        let mut rng = rand::thread_rng();
        loop {
            let id = format!(
                "{}{:03}",
                Utc::now().timestamp_millis(),
                rng.gen_range(0..1000)
            );
            if self.position(&id).is_none() {
                return id;
            }
        }
    }
}

impl Default for RecordStore {
    fn default() -> Self {
        Self::new()
    }
}

fn validate(application: &NewApplication) -> StoreResult<()> {
    if application.company.trim().is_empty() {
        return Err(StoreError::Invalid("company is required".into()));
    }
    if application.role.trim().is_empty() {
        return Err(StoreError::Invalid("role is required".into()));
    }
    Ok(())
}

fn read_json<T: DeserializeOwned + Default>(kv: &dyn KvStore, key: &str) -> StoreResult<T> {
    let Some(raw) = kv.get(key)? else {
        return Ok(T::default());
    };
    match serde_json::from_str(&raw) {
        Ok(value) => Ok(value),
        Err(e) => {
            tracing::warn!(key, error = %e, "stored value is malformed; starting empty");
            Ok(T::default())
        }
    }
}
