//! Client management service

use validator::Validate;

use crate::{
    error::{AppError, AppResult},
    models::client::{Client, ClientDetails, ClientQuery, NewClient},
    repository::Repository,
};

/// Page size used when a listing gives an offset without a limit
const DEFAULT_PAGE_SIZE: usize = 20;

#[derive(Clone)]
pub struct ClientsService {
    repository: Repository,
}

fn check_fields(client: &NewClient) -> AppResult<()> {
    if client.name.trim().is_empty() {
        return Err(AppError::Validation("The name is required".to_string()));
    }
    if client.email.trim().is_empty() {
        return Err(AppError::Validation("The email is required".to_string()));
    }
    if client.phone.trim().is_empty() {
        return Err(AppError::Validation("The phone is required".to_string()));
    }
    client.validate()?;
    Ok(())
}

impl ClientsService {
    pub fn new(repository: Repository) -> Self {
        Self { repository }
    }

    /// Register a new client; the email must not be in use
    pub async fn create(&self, client: NewClient) -> AppResult<Client> {
        check_fields(&client)?;

        if self.repository.clients.exists_by_email(&client.email, None).await? {
            return Err(AppError::Conflict(format!(
                "There is already a client with the email: {}",
                client.email
            )));
        }

        let created = self.repository.clients.insert(&client).await?;
        tracing::info!("Client {} created", created.id);
        Ok(created)
    }

    /// Replace a client's data; the email must not belong to another client
    pub async fn update(&self, id: i64, client: NewClient) -> AppResult<Client> {
        check_fields(&client)?;

        if self.repository.clients.exists_by_email(&client.email, Some(id)).await? {
            return Err(AppError::Conflict(format!(
                "There is already another client with the email: {}",
                client.email
            )));
        }

        let updated = self.repository.clients.update(id, &client).await?;
        tracing::info!("Client {} updated", id);
        Ok(updated)
    }

    /// Delete a client together with all of its reservations
    pub async fn delete(&self, id: i64) -> AppResult<()> {
        let removed = self
            .repository
            .clients
            .delete(id)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Client not found with ID: {}", id)))?;

        tracing::info!("Client {} deleted with {} reservations", id, removed);
        Ok(())
    }

    pub async fn find_by_id(&self, id: i64) -> AppResult<Option<Client>> {
        self.repository.clients.find_by_id(id).await
    }

    pub async fn get_by_id(&self, id: i64) -> AppResult<Client> {
        self.find_by_id(id)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Client not found with ID: {}", id)))
    }

    /// Client with its reservations
    pub async fn get_details(&self, id: i64) -> AppResult<ClientDetails> {
        let client = self.get_by_id(id).await?;
        let reservations = self.repository.reservations.find_by_client(id).await?;
        Ok(ClientDetails { client, reservations })
    }

    pub async fn find_by_email(&self, email: &str) -> AppResult<Option<Client>> {
        self.repository.clients.find_by_email(email).await
    }

    /// Partial name search; a blank name lists every client
    pub async fn find_by_name(&self, name: &str) -> AppResult<Vec<Client>> {
        let name = name.trim();
        if name.is_empty() {
            return self.find_all().await;
        }
        self.repository.clients.find_by_name(name).await
    }

    pub async fn find_all(&self) -> AppResult<Vec<Client>> {
        self.repository.clients.find_all().await
    }

    /// Slice of the client list ordered by name
    pub async fn find_page(&self, offset: usize, limit: usize) -> AppResult<Vec<Client>> {
        let all = self.find_all().await?;
        Ok(all.into_iter().skip(offset).take(limit).collect())
    }

    /// Name search when a name is given, otherwise a page of all clients
    pub async fn list(&self, query: &ClientQuery) -> AppResult<Vec<Client>> {
        if let Some(name) = query.name.as_deref().filter(|n| !n.trim().is_empty()) {
            return self.find_by_name(name).await;
        }

        match (query.offset, query.limit) {
            (None, None) => self.find_all().await,
            (offset, limit) => {
                self.find_page(offset.unwrap_or(0), limit.unwrap_or(DEFAULT_PAGE_SIZE))
                    .await
            }
        }
    }

    /// Whether `email` is free, optionally ignoring the client being edited
    pub async fn is_email_available(&self, email: &str, exclude_id: Option<i64>) -> AppResult<bool> {
        Ok(!self.repository.clients.exists_by_email(email, exclude_id).await?)
    }

    pub async fn count(&self) -> AppResult<i64> {
        self.repository.clients.count().await
    }
}
