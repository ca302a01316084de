use std::sync::Arc;

use council::{
    job::JobStore,
    model_catalog::ModelCatalog,
    router::Router,
    runner::{AsyncRunner, CouncilDefaults},
    webhook::WebhookDispatcher,
};
use secrecy::SecretString;

#[derive(Clone)]
pub struct AppState {
    pub router: Arc<Router>,
    pub jobs: JobStore,
    pub runner: Arc<AsyncRunner>,
    pub model_catalog: Arc<ModelCatalog>,
    pub council_models: Vec<String>,
    pub chairman_model: String,
    pub api_key: Option<Arc<SecretString>>,
}

impl AppState {
    pub fn new(config: &config::Config) -> Self {
        let router = Arc::new(Router::new(config));
        let jobs = JobStore::new();
        let webhooks = Arc::new(WebhookDispatcher::new());

        let defaults = CouncilDefaults {
            council_models: config.council_models.clone(),
            chairman_model: config.chairman_model.clone(),
        };

        let runner = Arc::new(AsyncRunner::new(router.clone(), jobs.clone(), webhooks, defaults));

        let model_catalog = Arc::new(ModelCatalog::new(
            config.cache_dir.clone(),
            config.providers.openrouter_api_key.clone(),
            config.providers.cerebras_api_key.clone(),
        ));

        Self {
            router,
            jobs,
            runner,
            model_catalog,
            council_models: config.council_models.clone(),
            chairman_model: config.chairman_model.clone(),
            api_key: config.server.api_key.clone().map(Arc::new),
        }
    }
}
