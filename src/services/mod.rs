//! Business logic services

pub mod auth;
pub mod catalog;
pub mod dashboard;
pub mod members;
pub mod search;

use crate::{config::AuthConfig, error::AppResult, repository::Repository};

/// Container for all services
#[derive(Clone)]
pub struct Services {
    pub auth: auth::AuthService,
    pub catalog: catalog::CatalogService,
    pub dashboard: dashboard::DashboardService,
    pub members: members::MembersService,
    pub search: search::SearchService,
    repository: Repository,
}

impl Services {
    /// Create all services with the given repository
    pub fn new(repository: Repository, auth_config: AuthConfig) -> Self {
        Self {
            auth: auth::AuthService::new(repository.clone(), auth_config),
            catalog: catalog::CatalogService::new(repository.clone()),
            dashboard: dashboard::DashboardService::new(repository.clone()),
            members: members::MembersService::new(repository.clone()),
            search: search::SearchService::new(repository.clone()),
            repository,
        }
    }

    /// Database connectivity check for readiness probes
    pub async fn ping(&self) -> AppResult<()> {
        self.repository.ping().await
    }
}
