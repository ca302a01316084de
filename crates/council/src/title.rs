//! Short conversation titles for the SSE `title_complete` event, ported
//! from `council.py::generate_conversation_title`.

use crate::{provider::ChatParams, prompts, router::Router, types::Message};

const TITLE_MODEL: &str = "google/gemini-2.0-flash";
const FALLBACK_TITLE: &str = "New Conversation";

pub async fn generate(router: &Router, user_query: &str) -> String {
    let prompt = prompts::title_prompt(user_query);
    let params = ChatParams {
        model_id: TITLE_MODEL.to_string(),
        messages: vec![Message::user(prompt)],
        max_tokens: 50,
        temperature: 0.7,
    };

    let Some(response) = router.call(params).await else {
        return FALLBACK_TITLE.to_string();
    };

    let title = response.content.trim().trim_matches(|c| c == '"' || c == '\'').to_string();

    if title.is_empty() {
        return FALLBACK_TITLE.to_string();
    }

    if title.chars().count() > 50 {
        title.chars().take(47).collect::<String>() + "..."
    } else {
        title
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn truncates_overlong_titles() {
        let long = "x".repeat(80);
        let result = if long.chars().count() > 50 {
            long.chars().take(47).collect::<String>() + "..."
        } else {
            long
        };
        assert_eq!(result.len(), 50);
        assert!(result.ends_with("..."));
    }
}
