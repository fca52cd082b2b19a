//! Firestore REST implementation of FeedRepository

use async_trait::async_trait;
use reqwest::{Client, RequestBuilder, StatusCode};
use serde::de::DeserializeOwned;
use serde::Serialize;
use urlencoding::encode;

use super::value::{
    new_post_fields, update_fields, Document, RunQueryRequest, RunQueryResponse, StructuredQuery,
};
use crate::config::Config;
use crate::domain::entities::{FeedItem, FeedItemId, NewPost, PageCursor, PostUpdate};
use crate::domain::ports::FeedRepository;
use crate::error::{DomainError, FirestoreError};

/// A post collection in a Firestore database, accessed over REST
pub struct FirestoreFeedRepository {
    http: Client,
    base_url: String,
    project_id: String,
    database: String,
    collection: String,
    api_key: Option<String>,
}

#[derive(Serialize)]
struct WriteDocument<'a> {
    fields: &'a std::collections::HashMap<String, super::value::Value>,
}

impl FirestoreFeedRepository {
    pub fn new(
        base_url: &str,
        project_id: &str,
        database: &str,
        collection: &str,
        api_key: Option<String>,
    ) -> Self {
        Self {
            http: Client::new(),
            base_url: base_url.trim_end_matches('/').to_string(),
            project_id: project_id.to_string(),
            database: database.to_string(),
            collection: collection.to_string(),
            api_key,
        }
    }

    pub fn from_config(config: &Config) -> Self {
        Self::new(
            &config.firestore_base_url,
            &config.firestore_project_id,
            &config.firestore_database,
            &config.collection,
            config.firebase_api_key.clone(),
        )
    }

    /// Resource path of the database's document root
    fn documents_path(&self) -> String {
        format!(
            "projects/{}/databases/{}/documents",
            self.project_id, self.database
        )
    }

    /// Full resource name of a post, as used in cursors
    fn document_name(&self, id: &FeedItemId) -> String {
        format!("{}/{}/{}", self.documents_path(), self.collection, id)
    }

    fn api_url(&self, path: &str) -> String {
        format!("{}/{}{}", self.base_url, self.documents_path(), path)
    }

    fn document_url(&self, id: &FeedItemId) -> String {
        self.api_url(&format!("/{}/{}", self.collection, encode(id.as_str())))
    }

    fn authorize(&self, request: RequestBuilder, id_token: Option<&str>) -> RequestBuilder {
        let request = match &self.api_key {
            Some(key) => request.query(&[("key", key.as_str())]),
            None => request,
        };
        match id_token {
            Some(token) => request.bearer_auth(token),
            None => request,
        }
    }

    async fn handle_response<T: DeserializeOwned>(
        &self,
        response: reqwest::Response,
    ) -> Result<T, FirestoreError> {
        let status = response.status();

        if status.is_success() {
            response
                .json()
                .await
                .map_err(|e| FirestoreError::Deserialization(e.to_string()))
        } else {
            Err(Self::error_for(status, response).await)
        }
    }

    async fn handle_empty_response(
        &self,
        response: reqwest::Response,
    ) -> Result<(), FirestoreError> {
        let status = response.status();

        if status.is_success() {
            Ok(())
        } else {
            Err(Self::error_for(status, response).await)
        }
    }

    async fn error_for(status: StatusCode, response: reqwest::Response) -> FirestoreError {
        let url = response.url().path().to_string();
        let message = response.text().await.unwrap_or_default();
        match status {
            StatusCode::UNAUTHORIZED => FirestoreError::Unauthorized,
            StatusCode::FORBIDDEN => FirestoreError::PermissionDenied(message),
            StatusCode::NOT_FOUND => FirestoreError::DocumentNotFound(url),
            _ => FirestoreError::Api {
                status: status.as_u16(),
                message,
            },
        }
    }

    async fn run_query(
        &self,
        cursor: Option<&PageCursor>,
        limit: usize,
    ) -> Result<Vec<FeedItem>, FirestoreError> {
        let after = cursor.map(|c| (c.order_key, self.document_name(&c.id)));
        let body = RunQueryRequest {
            structured_query: StructuredQuery::newest_first(&self.collection, after, limit),
        };

        let request = self.http.post(self.api_url(":runQuery")).json(&body);
        let response = self.authorize(request, None).send().await?;
        let rows: Vec<RunQueryResponse> = self.handle_response(response).await?;

        rows.into_iter()
            .filter_map(|row| row.document)
            .map(FeedItem::try_from)
            .collect()
    }

    async fn get_document(&self, id: &FeedItemId) -> Result<Option<FeedItem>, FirestoreError> {
        let request = self.http.get(self.document_url(id));
        let response = self.authorize(request, None).send().await?;
        if response.status() == StatusCode::NOT_FOUND {
            return Ok(None);
        }
        let doc: Document = self.handle_response(response).await?;
        FeedItem::try_from(doc).map(Some)
    }
}

#[async_trait]
impl FeedRepository for FirestoreFeedRepository {
    async fn fetch_page(
        &self,
        cursor: Option<&PageCursor>,
        limit: usize,
    ) -> Result<Vec<FeedItem>, DomainError> {
        let page = self.run_query(cursor, limit).await?;
        tracing::debug!(collection = %self.collection, count = page.len(), "Fetched page");
        Ok(page)
    }

    async fn find_by_id(&self, id: &FeedItemId) -> Result<Option<FeedItem>, DomainError> {
        Ok(self.get_document(id).await?)
    }

    async fn create(
        &self,
        post: &NewPost,
        id_token: Option<&str>,
    ) -> Result<FeedItem, DomainError> {
        let fields = new_post_fields(post);
        let request = self
            .http
            .post(self.api_url(&format!("/{}", self.collection)))
            .json(&WriteDocument { fields: &fields });
        let response = self
            .authorize(request, id_token)
            .send()
            .await
            .map_err(FirestoreError::from)?;
        let doc: Document = self.handle_response(response).await?;
        Ok(FeedItem::try_from(doc)?)
    }

    async fn update(
        &self,
        id: &FeedItemId,
        update: &PostUpdate,
        id_token: Option<&str>,
    ) -> Result<FeedItem, DomainError> {
        let (fields, mask) = update_fields(update);
        let mut query: Vec<(&str, &str)> = mask
            .iter()
            .map(|path| ("updateMask.fieldPaths", *path))
            .collect();
        // Fail instead of creating the document when it is gone
        query.push(("currentDocument.exists", "true"));

        let request = self
            .http
            .patch(self.document_url(id))
            .query(&query)
            .json(&WriteDocument { fields: &fields });
        let response = self
            .authorize(request, id_token)
            .send()
            .await
            .map_err(FirestoreError::from)?;
        let doc: Document = self.handle_response(response).await?;
        Ok(FeedItem::try_from(doc)?)
    }

    async fn delete(&self, id: &FeedItemId, id_token: Option<&str>) -> Result<(), DomainError> {
        let request = self.http.delete(self.document_url(id));
        let response = self
            .authorize(request, id_token)
            .send()
            .await
            .map_err(FirestoreError::from)?;
        self.handle_empty_response(response).await?;
        Ok(())
    }
}
