//! # External Collaborators
//!
//! Interfaces to whatever fetches revision payloads and document metadata
//! (a REST API, a browser extension bridge, a file on disk). The playback
//! core only ever sees raw payloads through [`RevisionSource`].
//!
//! Credentials travel in an explicit [`AuthContext`]; there is no global
//! auth state.

use crate::engine::PlaybackEngine;
use crate::error::{PlaybackError, PlaybackResult, SourceError};
use crate::options::PlaybackOptions;
use rewind_commands::{parse_revision, ParseError};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::HashMap;
use std::future::Future;
use tracing::{info, instrument, warn};

/// Credentials for a collaborator call
#[derive(Clone, Default)]
pub struct AuthContext {
    access_token: Option<String>,
}

impl AuthContext {
    pub fn anonymous() -> Self {
        Self::default()
    }

    pub fn with_token(access_token: impl Into<String>) -> Self {
        Self {
            access_token: Some(access_token.into()),
        }
    }

    pub fn access_token(&self) -> Option<&str> {
        self.access_token.as_deref()
    }
}

impl std::fmt::Debug for AuthContext {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AuthContext")
            .field(
                "access_token",
                &self.access_token.as_ref().map(|_| "<redacted>"),
            )
            .finish()
    }
}

/// Half-open range `[start, end)` of positions in a document's revision log
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct RevisionRange {
    pub start: u64,
    pub end: u64,
}

impl RevisionRange {
    pub fn new(start: u64, end: u64) -> Result<Self, SourceError> {
        if start > end {
            return Err(SourceError::InvalidRange { start, end });
        }
        Ok(Self { start, end })
    }

    /// Every revision from the first one on
    pub fn all() -> Self {
        Self {
            start: 0,
            end: u64::MAX,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserInfo {
    pub display_name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
}

/// Document-level metadata, for display only
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DocumentInfo {
    pub id: String,
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_time: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub modified_time: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_modifying_user: Option<UserInfo>,
}

/// One entry in a document's revision list
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RevisionInfo {
    pub id: String,
    pub timestamp: i64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_modifying_user: Option<UserInfo>,
}

/// Supplies raw revision payloads for a document
pub trait RevisionSource {
    fn fetch_revisions(
        &self,
        auth: &AuthContext,
        document_id: &str,
        range: RevisionRange,
    ) -> impl Future<Output = Result<Vec<Value>, SourceError>> + Send;
}

/// Supplies document metadata and the revision list
pub trait MetadataSource {
    fn document_info(
        &self,
        auth: &AuthContext,
        document_id: &str,
    ) -> impl Future<Output = Result<DocumentInfo, SourceError>> + Send;

    fn revision_list(
        &self,
        auth: &AuthContext,
        document_id: &str,
    ) -> impl Future<Output = Result<Vec<RevisionInfo>, SourceError>> + Send;
}

/// Fetch, parse and wrap a document's history in a playback engine.
///
/// A structurally unusable payload fails the whole load.
#[instrument(skip(source, auth, options))]
pub async fn load_engine<S: RevisionSource>(
    source: &S,
    auth: &AuthContext,
    document_id: &str,
    range: RevisionRange,
    options: PlaybackOptions,
) -> PlaybackResult<PlaybackEngine> {
    let payloads = source.fetch_revisions(auth, document_id, range).await?;

    let revisions = payloads
        .iter()
        .enumerate()
        .map(|(index, payload)| {
            parse_revision(payload).map_err(|e| ParseError::at_index(index, e))
        })
        .collect::<Result<Vec<_>, _>>()
        .map_err(PlaybackError::from)?;

    info!(
        "Loaded {} revisions for document {}",
        revisions.len(),
        document_id
    );

    PlaybackEngine::with_options(revisions, options)
}

/// In-memory collaborator, keyed by document id
#[derive(Debug, Clone, Default)]
pub struct MemoryRevisionSource {
    documents: HashMap<String, StoredDocument>,
}

#[derive(Debug, Clone)]
struct StoredDocument {
    info: DocumentInfo,
    payloads: Vec<Value>,
}

impl MemoryRevisionSource {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, info: DocumentInfo, payloads: Vec<Value>) {
        self.documents
            .insert(info.id.clone(), StoredDocument { info, payloads });
    }

    fn document(&self, document_id: &str) -> Result<&StoredDocument, SourceError> {
        self.documents
            .get(document_id)
            .ok_or_else(|| SourceError::DocumentNotFound(document_id.to_string()))
    }
}

impl RevisionSource for MemoryRevisionSource {
    async fn fetch_revisions(
        &self,
        _auth: &AuthContext,
        document_id: &str,
        range: RevisionRange,
    ) -> Result<Vec<Value>, SourceError> {
        let document = self.document(document_id)?;
        let len = document.payloads.len();
        let start = usize::try_from(range.start).unwrap_or(usize::MAX).min(len);
        let end = usize::try_from(range.end).unwrap_or(usize::MAX).min(len);

        Ok(document.payloads[start..end.max(start)].to_vec())
    }
}

impl MetadataSource for MemoryRevisionSource {
    async fn document_info(
        &self,
        _auth: &AuthContext,
        document_id: &str,
    ) -> Result<DocumentInfo, SourceError> {
        Ok(self.document(document_id)?.info.clone())
    }

    async fn revision_list(
        &self,
        _auth: &AuthContext,
        document_id: &str,
    ) -> Result<Vec<RevisionInfo>, SourceError> {
        let document = self.document(document_id)?;

        // Entries without an id or timestamp are not revisions we could play
        Ok(document
            .payloads
            .iter()
            .enumerate()
            .filter_map(|(index, payload)| {
                let revision = match parse_revision(payload) {
                    Ok(revision) => revision,
                    Err(e) => {
                        warn!("Skipping revision list entry {}: {}", index, e);
                        return None;
                    }
                };
                Some(RevisionInfo {
                    id: revision.revision_id,
                    timestamp: revision.timestamp,
                    last_modifying_user: None,
                })
            })
            .collect())
    }
}
