//! Application state shared across handlers

use std::sync::Arc;

use packing::PackingService;
use packing::store::{EntityStore, PgStore};

use crate::middleware::JwtVerifier;

#[derive(Clone)]
pub struct AppState<S: EntityStore = PgStore> {
    pub service: Arc<PackingService<S>>,
    pub jwt: Arc<JwtVerifier>,
}

impl<S: EntityStore> AppState<S> {
    pub fn new(service: PackingService<S>, jwt: JwtVerifier) -> Self {
        Self {
            service: Arc::new(service),
            jwt: Arc::new(jwt),
        }
    }
}
