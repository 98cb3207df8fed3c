use std::marker::PhantomData;
use std::sync::atomic::AtomicBool;
use std::sync::Arc;

use log::{debug, info, warn};
use serde::Serialize;

use crate::errors::CoreError;
use crate::schema::mapper::RemoteRecord;
use crate::schema::page::{
    ArchivePageRequest, CreatePageRequest, Page, Parent, QueryRequest, QueryResponse,
    UpdatePageRequest, MAX_PAGE_SIZE,
};
use crate::schema::Collection;
use crate::transport::retry::{send_with_retry, RetryPolicy};
use crate::transport::traits::{ApiRequest, ApiResponse, NotionTransport};

/// List/create/update/delete over one Notion collection.
///
/// Every call is a self-contained request sequence: nothing is cached
/// between calls and no local state changes unless the store confirms.
/// Concurrent writers are last-write-wins at the store.
pub struct Repository<R: RemoteRecord> {
    transport: Arc<dyn NotionTransport>,
    database_id: String,
    retry: RetryPolicy,
    _record: PhantomData<fn() -> R>,
}

impl<R: RemoteRecord> std::fmt::Debug for Repository<R> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Repository")
            .field("collection", &R::COLLECTION)
            .field("database_id", &self.database_id)
            .field("retry", &self.retry)
            .finish()
    }
}

impl<R: RemoteRecord> Repository<R> {
    /// Fails with `Configuration` when the database id is blank.
    pub fn new(
        transport: Arc<dyn NotionTransport>,
        database_id: impl Into<String>,
        retry: RetryPolicy,
    ) -> Result<Self, CoreError> {
        let database_id = database_id.into().trim().to_string();
        if database_id.is_empty() {
            return Err(CoreError::Configuration(format!(
                "{} is not set",
                R::COLLECTION.env_key()
            )));
        }
        Ok(Self {
            transport,
            database_id,
            retry,
            _record: PhantomData,
        })
    }

    #[must_use]
    pub fn collection(&self) -> Collection {
        R::COLLECTION
    }

    #[must_use]
    pub fn database_id(&self) -> &str {
        &self.database_id
    }

    // ── Reads ───────────────────────────────────────────────────────

    /// Fetch every row, following pagination cursors until exhausted.
    /// Rows keep the order the store returns them in.
    pub async fn list_all(&self) -> Result<Vec<R>, CoreError> {
        self.list_pages(None).await
    }

    /// Like [`list_all`](Self::list_all), but stops with `Cancelled` once
    /// `cancel_flag` is set. Checked before each page and each retry wait.
    pub async fn list_all_cancellable(&self, cancel_flag: &AtomicBool) -> Result<Vec<R>, CoreError> {
        self.list_pages(Some(cancel_flag)).await
    }

    /// Fetch a single row by its page id.
    pub async fn get(&self, remote_id: &str) -> Result<R, CoreError> {
        check_remote_id(remote_id)?;
        let page = self.fetch_page(remote_id).await?;
        if page.is_deleted() || !self.owns(&page) {
            return Err(CoreError::NotFound(remote_id.to_string()));
        }
        R::from_remote_page(&page)
    }

    async fn list_pages(&self, cancel_flag: Option<&AtomicBool>) -> Result<Vec<R>, CoreError> {
        let path = format!("/databases/{}/query", self.database_id);
        let sorts = R::list_sorts();
        let mut cursor: Option<String> = None;
        let mut records = Vec::new();
        let mut page_count = 0usize;

        loop {
            let body = to_body(&QueryRequest {
                page_size: MAX_PAGE_SIZE,
                start_cursor: cursor.as_deref(),
                sorts: &sorts,
            })?;
            let response = self.send(&ApiRequest::post(&path, body), cancel_flag).await?;
            if !response.is_success() {
                return Err(Self::rejection(&response, &self.database_id));
            }

            let batch: QueryResponse = response.json()?;
            page_count += 1;
            debug!(
                "{}: query page {} returned {} row(s), has_more={}",
                R::COLLECTION,
                page_count,
                batch.results.len(),
                batch.has_more
            );

            for raw in batch.results {
                match serde_json::from_value::<Page>(raw) {
                    Ok(page) if page.is_deleted() => {}
                    Ok(page) => match R::from_remote_page(&page) {
                        Ok(record) => records.push(record),
                        Err(e) => warn!("{}: skipping row {}: {e}", R::COLLECTION, page.id),
                    },
                    Err(e) => warn!("{}: skipping malformed row: {e}", R::COLLECTION),
                }
            }

            match (batch.has_more, batch.next_cursor) {
                (true, Some(next)) => {
                    if cursor.as_deref() == Some(next.as_str()) {
                        return Err(CoreError::Deserialization(format!(
                            "{}: store returned the same pagination cursor twice",
                            R::COLLECTION
                        )));
                    }
                    cursor = Some(next);
                }
                _ => break,
            }
        }

        Ok(records)
    }

    // ── Writes ──────────────────────────────────────────────────────

    /// Validate, then persist a new row. Returns the record with its
    /// store-assigned `remote_id`. Invalid records never reach the store.
    pub async fn create(&self, record: &R) -> Result<R, CoreError> {
        let properties = record.to_remote_properties()?;
        let body = to_body(&CreatePageRequest {
            parent: Parent {
                database_id: &self.database_id,
            },
            properties: &properties,
        })?;

        let response = self.send(&ApiRequest::post("/pages", body), None).await?;
        if !response.is_success() {
            let err = response.error_body();
            return Err(CoreError::RemoteRejected {
                status: response.status,
                code: err.code,
                message: err.message,
            });
        }

        let page: Page = response.json()?;
        if page.id.trim().is_empty() {
            return Err(CoreError::Deserialization(
                "store created a page without an id".into(),
            ));
        }
        info!("{}: created row {}", R::COLLECTION, page.id);

        let mut created = record.clone();
        created.set_remote_id(page.id);
        Ok(created)
    }

    /// Replace every property of an existing row.
    ///
    /// The row must be live and belong to this collection; anything else
    /// is `NotFound` and nothing is written.
    pub async fn update(&self, remote_id: &str, record: &R) -> Result<R, CoreError> {
        check_remote_id(remote_id)?;
        let properties = record.to_remote_properties()?;
        let body = to_body(&UpdatePageRequest {
            properties: &properties,
        })?;

        let page = self.fetch_page(remote_id).await?;
        if page.is_deleted() || !self.owns(&page) {
            return Err(CoreError::NotFound(remote_id.to_string()));
        }

        let request = ApiRequest::patch(format!("/pages/{remote_id}"), body);
        let response = self.send(&request, None).await?;
        if !response.is_success() {
            return Err(Self::rejection(&response, remote_id));
        }
        info!("{}: updated row {remote_id}", R::COLLECTION);

        let mut updated = record.clone();
        updated.set_remote_id(remote_id.to_string());
        Ok(updated)
    }

    /// Archive a row. Deleting a row that is already gone succeeds; a row
    /// from another collection is `NotFound` and is left untouched.
    pub async fn delete(&self, remote_id: &str) -> Result<(), CoreError> {
        check_remote_id(remote_id)?;
        let body = to_body(&ArchivePageRequest { archived: true })?;

        match self.fetch_page(remote_id).await {
            Ok(page) if !self.owns(&page) => {
                warn!(
                    "{}: refusing to archive row {remote_id} from another collection",
                    R::COLLECTION
                );
                return Err(CoreError::NotFound(remote_id.to_string()));
            }
            Ok(page) if page.is_deleted() => {
                debug!("{}: row {remote_id} already archived", R::COLLECTION);
                return Ok(());
            }
            Ok(_) => {}
            Err(CoreError::NotFound(_)) => {
                debug!("{}: row {remote_id} already gone", R::COLLECTION);
                return Ok(());
            }
            Err(err) => return Err(err),
        }

        let request = ApiRequest::patch(format!("/pages/{remote_id}"), body);
        let response = self.send(&request, None).await?;
        if response.is_success() {
            info!("{}: archived row {remote_id}", R::COLLECTION);
            return Ok(());
        }

        match Self::rejection(&response, remote_id) {
            CoreError::NotFound(_) => {
                debug!("{}: row {remote_id} already gone", R::COLLECTION);
                Ok(())
            }
            err => Err(err),
        }
    }

    // ── Internal ────────────────────────────────────────────────────

    /// GET a page, whatever its collection or archive state.
    /// A missing page is `NotFound`.
    async fn fetch_page(&self, remote_id: &str) -> Result<Page, CoreError> {
        let request = ApiRequest::get(format!("/pages/{remote_id}"));
        let response = self.send(&request, None).await?;
        if !response.is_success() {
            return Err(Self::rejection(&response, remote_id));
        }
        response.json()
    }

    fn owns(&self, page: &Page) -> bool {
        page.belongs_to(&self.database_id)
    }

    async fn send(
        &self,
        request: &ApiRequest,
        cancel_flag: Option<&AtomicBool>,
    ) -> Result<ApiResponse, CoreError> {
        send_with_retry(self.transport.as_ref(), request, &self.retry, cancel_flag).await
    }

    /// Classify a non-success, non-transient response.
    /// A missing page and an already archived page are both `NotFound`.
    fn rejection(response: &ApiResponse, target: &str) -> CoreError {
        let err = response.error_body();
        let archived = response.status == 400 && err.message.to_lowercase().contains("archived");
        if response.status == 404 || archived {
            return CoreError::NotFound(target.to_string());
        }
        CoreError::RemoteRejected {
            status: response.status,
            code: err.code,
            message: err.message,
        }
    }
}

fn to_body<T: Serialize>(value: &T) -> Result<serde_json::Value, CoreError> {
    serde_json::to_value(value).map_err(|e| CoreError::Serialization(e.to_string()))
}

/// Page ids are UUIDs, with or without dashes. Anything else never
/// reaches a request path.
fn check_remote_id(remote_id: &str) -> Result<(), CoreError> {
    if remote_id.trim().is_empty() {
        return Err(CoreError::validation("remote_id", "must not be empty"));
    }
    if !remote_id.chars().all(|c| c.is_ascii_alphanumeric() || c == '-') {
        return Err(CoreError::validation(
            "remote_id",
            format!("'{remote_id}' is not a valid page id"),
        ));
    }
    Ok(())
}
