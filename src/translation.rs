use crate::cache::TranslationCache;
use crate::error::{Result, TranslationError};
use crate::record::{
    clean_source_name, NewTranslation, TranslationRecord, TranslationUpdate, STATUS_DELETED,
};
use crate::remote::{
    BulkContributionRequest, ContributionClient, ContributionRequest, TranslationMap,
    MSG_ADDED, MSG_ALREADY_EXISTS, MSG_CONTRIBUTION_DELETED,
};
use serde::Serialize;
use std::sync::Arc;
use tracing::{info, warn};

pub const NOTICE_ALREADY_EXISTS: &str = "Translation already exists";
pub const NOTICE_CONTRIBUTED: &str = "Translation successfully contributed";

/// The authenticated user a request runs as
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Session {
    /// Login e-mail
    pub user: String,
    pub full_name: Option<String>,
}

impl Session {
    pub fn new(user: impl Into<String>) -> Self {
        Self {
            user: user.into(),
            full_name: None,
        }
    }

    pub fn with_full_name(mut self, full_name: impl Into<String>) -> Self {
        self.full_name = Some(full_name.into()).filter(|n: &String| !n.is_empty());
        self
    }

    /// Full name if known, otherwise the login
    pub fn display_name(&self) -> &str {
        self.full_name.as_deref().unwrap_or(&self.user)
    }
}

/// A record as returned by [`TranslationService::load`]
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Loaded {
    pub record: TranslationRecord,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub notice: Option<String>,
}

/// Arguments of [`TranslationService::contribute_translation`]
#[derive(Debug, Clone, PartialEq, Eq, serde::Deserialize)]
pub struct ContributeArgs {
    pub language: String,
    pub contributor: String,
    pub source_name: String,
    pub target_name: String,
    /// Local record to link to the contribution
    pub doc_name: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "outcome", rename_all = "snake_case")]
pub enum ContributionOutcome {
    AlreadyExists,
    Contributed { doc_name: String },
    /// The service answered with a message this client doesn't act on
    Unrecognized { message: Option<String> },
}

impl ContributionOutcome {
    pub fn notice(&self) -> Option<&'static str> {
        match self {
            Self::AlreadyExists => Some(NOTICE_ALREADY_EXISTS),
            Self::Contributed { .. } => Some(NOTICE_CONTRIBUTED),
            Self::Unrecognized { .. } => None,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct BulkImportReport {
    pub created: usize,
    pub updated: usize,
    /// Whether the batch reached the bulk contribution endpoint
    pub forwarded: bool,
}

impl BulkImportReport {
    pub fn notice(&self) -> Option<&'static str> {
        (!self.forwarded).then_some(crate::error::REMOTE_FAILURE_NOTICE)
    }
}

/// Lifecycle and operations of translation records.
///
/// Every write goes through validation, then the store, then one cache
/// invalidation.
#[derive(Clone)]
pub struct TranslationService {
    store: Arc<dyn crate::store::TranslationStore>,
    cache: Arc<dyn TranslationCache>,
    remote: ContributionClient,
}

impl TranslationService {
    pub fn new(
        store: Arc<dyn crate::store::TranslationStore>,
        cache: Arc<dyn TranslationCache>,
        remote: ContributionClient,
    ) -> Self {
        Self {
            store,
            cache,
            remote,
        }
    }

    pub async fn insert(&self, mut new: NewTranslation) -> Result<TranslationRecord> {
        new.validate();
        new.context = new.context.filter(|c| !c.is_empty());
        let record = self.store.insert(new).await?;
        self.on_update();
        info!("Inserted translation {} ({})", record.name, record.language);
        Ok(record)
    }

    /// Fetch a record without running the load hook
    pub async fn get(&self, name: &str) -> Result<TranslationRecord> {
        self.store
            .get(name)
            .await?
            .ok_or_else(|| TranslationError::NotFound(name.to_string()))
    }

    /// Apply a user edit and save
    pub async fn save(&self, name: &str, update: TranslationUpdate) -> Result<TranslationRecord> {
        self.modify(name, |record| record.apply(update)).await
    }

    pub async fn delete(&self, name: &str) -> Result<()> {
        if !self.store.delete(name).await? {
            return Err(TranslationError::NotFound(name.to_string()));
        }
        self.on_trash();
        info!("Deleted translation {}", name);
        Ok(())
    }

    /// Fetch a record and refresh its contribution status
    pub async fn load(&self, name: &str) -> Result<Loaded> {
        let record = self.get(name).await?;
        self.onload(record).await
    }

    /// Refresh the contribution status of a contributed record.
    ///
    /// If the service can't be reached or answers garbage the record is
    /// returned as stored, with a notice.
    pub async fn onload(&self, mut record: TranslationRecord) -> Result<Loaded> {
        let Some(remote_name) = record
            .contributed_translation_doctype_name
            .clone()
            .filter(|n| !n.is_empty())
        else {
            return Ok(Loaded {
                record,
                notice: None,
            });
        };

        let reply = match self.remote.fetch_status(&remote_name).await {
            Ok(reply) => reply,
            Err(e @ (TranslationError::Remote { .. } | TranslationError::MalformedResponse(_))) => {
                warn!(
                    "Status refresh for {} ({}) skipped: {}",
                    record.name, remote_name, e
                );
                return Ok(Loaded {
                    record,
                    notice: Some(crate::error::REMOTE_FAILURE_NOTICE.to_string()),
                });
            }
            Err(e) => return Err(e),
        };

        if reply.message.as_deref() == Some(MSG_CONTRIBUTION_DELETED) {
            info!(
                "Contributed translation {} was deleted upstream, unlinking {}",
                remote_name, record.name
            );
            record.status = Some(STATUS_DELETED.to_string());
            record.contributed_translation_doctype_name = None;
        } else {
            record.status = reply.status;
        }

        self.persist(&mut record).await?;
        Ok(Loaded {
            record,
            notice: None,
        })
    }

    /// Submit a translation to the contribution service and link the local
    /// record to the accepted contribution.
    pub async fn contribute_translation(&self, args: ContributeArgs) -> Result<ContributionOutcome> {
        // Fail before contacting the service if there is nothing to link
        self.get(&args.doc_name).await?;

        let request = ContributionRequest {
            language: args.language,
            contributor: args.contributor,
            source_name: args.source_name,
            target_name: args.target_name,
            posting_date: chrono::Local::now().format("%Y-%m-%d").to_string(),
        };

        let reply = self.remote.contribute(&request).await?;

        match reply.message.as_deref() {
            Some(MSG_ALREADY_EXISTS) => {
                info!("Translation for {} already contributed", args.doc_name);
                Ok(ContributionOutcome::AlreadyExists)
            }
            Some(MSG_ADDED) => {
                let remote_name = reply.doc_name.filter(|n| !n.is_empty()).ok_or_else(|| {
                    TranslationError::MalformedResponse(
                        "contribution accepted without doc_name".to_string(),
                    )
                })?;

                let linked = remote_name.clone();
                self.modify(&args.doc_name, move |record| {
                    record.contributed_translation_doctype_name = Some(linked);
                })
                .await?;

                info!("Translation {} contributed as {}", args.doc_name, remote_name);
                Ok(ContributionOutcome::Contributed {
                    doc_name: remote_name,
                })
            }
            other => {
                warn!(
                    "Unrecognized contribution reply for {}: {:?}",
                    args.doc_name, other
                );
                Ok(ContributionOutcome::Unrecognized {
                    message: reply.message,
                })
            }
        }
    }

    /// Upsert translations from a JSON map of
    /// `source text -> {context, translated_text}`, then forward the map to
    /// the bulk contribution endpoint.
    ///
    /// Records are matched on `(source_name, context)`.
    pub async fn create_translations(
        &self,
        translation_map: &str,
        language: &str,
        session: &Session,
    ) -> Result<BulkImportReport> {
        let raw: serde_json::Value = serde_json::from_str(translation_map)
            .map_err(|e| TranslationError::InvalidTranslationMap(e.to_string()))?;
        let entries: TranslationMap = serde_json::from_value(raw.clone())
            .map_err(|e| TranslationError::InvalidTranslationMap(e.to_string()))?;

        let mut report = BulkImportReport::default();

        for (source_text, entry) in &entries {
            // Stored sources are already markup-free
            let source_name = clean_source_name(source_text);
            let context = entry.context.as_deref().filter(|c| !c.is_empty());

            match self.store.find_by_source(&source_name, context).await? {
                Some(existing) => {
                    let target = entry.translated_text.clone();
                    self.modify(&existing, move |record| record.target_name = target)
                        .await?;
                    report.updated += 1;
                }
                None => {
                    self.insert(NewTranslation {
                        source_name,
                        target_name: entry.translated_text.clone(),
                        language: language.to_string(),
                        context: context.map(str::to_string),
                    })
                    .await?;
                    report.created += 1;
                }
            }
        }

        info!(
            "Imported {} translations for {} ({} created, {} updated)",
            entries.len(),
            language,
            report.created,
            report.updated
        );

        let request = BulkContributionRequest {
            language,
            contributor_email: &session.user,
            contributor_name: session.display_name(),
            translation_map: &raw,
        };

        match self.remote.contribute_bulk(&request).await {
            Ok(()) => report.forwarded = true,
            Err(e) => warn!("Bulk contribution for {} not forwarded: {}", language, e),
        }

        Ok(report)
    }

    async fn modify<F>(&self, name: &str, change: F) -> Result<TranslationRecord>
    where
        F: FnOnce(&mut TranslationRecord),
    {
        let mut record = self.get(name).await?;
        change(&mut record);
        self.persist(&mut record).await?;
        Ok(record)
    }

    /// Validate, write, and replace `record` with the stored copy
    async fn persist(&self, record: &mut TranslationRecord) -> Result<()> {
        record.validate();
        *record = self
            .store
            .update(record)
            .await?
            .ok_or_else(|| TranslationError::NotFound(record.name.clone()))?;
        self.on_update();
        Ok(())
    }

    fn on_update(&self) {
        self.cache.clear();
    }

    fn on_trash(&self) {
        self.cache.clear();
    }
}
