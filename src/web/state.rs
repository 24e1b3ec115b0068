use std::sync::Arc;

use crate::model::ModelManager;
use crate::payments::PaymentProvider;

#[derive(Debug, Clone)]
pub struct AppState {
    mm: ModelManager,
    payments: Arc<dyn PaymentProvider>,
}

impl AppState {
    pub fn new(mm: ModelManager, payments: Arc<dyn PaymentProvider>) -> Self {
        Self { mm, payments }
    }

    pub fn pool(&self) -> &ModelManager {
        &self.mm
    }

    pub fn payments(&self) -> &dyn PaymentProvider {
        self.payments.as_ref()
    }
}
