pub mod api;
pub mod model;
pub mod nis;
pub mod service;

use std::sync::Arc;

use axum::Router;
use pondok_core::Module;

use service::PesantrenService;

/// Pesantren module — santri roster, classes, schedules, blog, carousel.
pub struct PesantrenModule {
    service: Arc<PesantrenService>,
}

impl PesantrenModule {
    pub fn new(service: PesantrenService) -> Self {
        Self {
            service: Arc::new(service),
        }
    }
}

impl Module for PesantrenModule {
    fn name(&self) -> &str {
        "pesantren"
    }

    fn routes(&self) -> Router {
        api::router(self.service.clone())
    }
}
