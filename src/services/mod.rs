//! Business logic services

pub mod availability;
pub mod clients;
pub mod reservations;
pub mod validation;

use crate::repository::Repository;

/// Container for all services
#[derive(Clone)]
pub struct Services {
    pub clients: clients::ClientsService,
    pub reservations: reservations::ReservationsService,
}

impl Services {
    /// Create all services with the given repository
    pub fn new(repository: Repository) -> Self {
        Self {
            clients: clients::ClientsService::new(repository.clone()),
            reservations: reservations::ReservationsService::new(repository),
        }
    }
}
