//! Concurrent fan-out over the council panel, mirroring
//! `query_models_parallel`'s `asyncio.gather` semantics: every model is
//! queried concurrently, one failure never cancels the others, and the
//! returned map covers exactly the input id set (absent entries are `None`).

use std::collections::HashMap;

use futures::future::join_all;

use crate::{
    provider::{ChatParams, Provider},
    router::Router,
    types::{Message, ModelResponse},
};

pub async fn query_models_parallel(
    router: &Router,
    model_ids: &[String],
    messages: &[Message],
    max_tokens: u32,
    temperature: f32,
) -> HashMap<String, Option<ModelResponse>> {
    let calls = model_ids.iter().map(|model_id| {
        let params = ChatParams {
            model_id: model_id.clone(),
            messages: messages.to_vec(),
            max_tokens,
            temperature,
        };
        async move {
            let response = router.call(params).await;
            (model_id.clone(), response)
        }
    });

    join_all(calls).await.into_iter().collect()
}

/// Query a single model directly through a concrete provider, bypassing
/// routing — used by the Stage 3 chairman call, which always targets one
/// specific model.
pub async fn query_single(provider: &dyn Provider, params: ChatParams) -> Option<ModelResponse> {
    provider.chat_completion(params).await
}
