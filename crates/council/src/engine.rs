//! Three-stage deliberation orchestration, ported from `council.py`:
//! Stage 1 collects independent answers, Stage 2 has every model rank the
//! anonymized Stage 1 responses, Stage 3 has a chairman model synthesize a
//! final answer. `final_only` skips Stage 2 entirely.

use std::collections::{HashMap, HashSet};

use regex::Regex;
use std::sync::OnceLock;

use crate::{
    fanout::query_models_parallel,
    prompts,
    router::Router,
    types::{
        AggregateRanking, DeliberationResult, LabelMap, Message, Stage1Entry, Stage2Entry, Stage3Result,
        label_for_index,
    },
};

pub async fn stage1_collect_responses(router: &Router, user_query: &str, models: &[String]) -> Vec<Stage1Entry> {
    let messages = vec![Message::user(user_query)];
    let responses = query_models_parallel(router, models, &messages, 4096, 0.7).await;

    models
        .iter()
        .filter_map(|model| responses.get(model).cloned().flatten().map(|response| (model, response)))
        .map(|(model, response)| Stage1Entry {
            model: model.clone(),
            response: response.content,
            usage: response.usage,
            provider: response.provider,
        })
        .collect()
}

pub async fn stage2_collect_rankings(
    router: &Router,
    user_query: &str,
    stage1_results: &[Stage1Entry],
    models: &[String],
) -> (Vec<Stage2Entry>, LabelMap) {
    let mut label_map = LabelMap::new();
    let mut responses_text = String::new();

    for (index, result) in stage1_results.iter().enumerate() {
        let label = label_for_index(index);
        label_map.insert(format!("Response {label}"), result.model.clone());
        if index > 0 {
            responses_text.push_str("\n\n");
        }
        responses_text.push_str(&format!("Response {label}:\n{}", result.response));
    }

    let prompt = prompts::ranking_prompt(user_query, &responses_text);
    let messages = vec![Message::user(prompt)];
    let responses = query_models_parallel(router, models, &messages, 4096, 0.7).await;

    let stage2_results = models
        .iter()
        .filter_map(|model| responses.get(model).cloned().flatten().map(|response| (model, response)))
        .map(|(model, response)| {
            let parsed = parse_ranking_from_text(&response.content);
            Stage2Entry {
                model: model.clone(),
                ranking: response.content,
                parsed_ranking: parsed,
                usage: response.usage,
                provider: response.provider,
            }
        })
        .collect();

    (stage2_results, label_map)
}

pub async fn stage3_synthesize_final(
    router: &Router,
    user_query: &str,
    stage1_results: &[Stage1Entry],
    stage2_results: &[Stage2Entry],
    chairman_model: &str,
) -> Stage3Result {
    let stage1_text = stage1_results
        .iter()
        .map(|r| format!("Model: {}\nResponse: {}", r.model, r.response))
        .collect::<Vec<_>>()
        .join("\n\n");

    let stage2_text = if stage2_results.is_empty() {
        String::new()
    } else {
        let body = stage2_results
            .iter()
            .map(|r| format!("Model: {}\nRanking: {}", r.model, r.ranking))
            .collect::<Vec<_>>()
            .join("\n\n");
        format!("\n\nSTAGE 2 - Peer Rankings:\n{body}")
    };

    let prompt = prompts::chairman_prompt(user_query, &stage1_text, &stage2_text);
    let messages = vec![Message::user(prompt)];
    let chairman_models = vec![chairman_model.to_string()];

    let responses = query_models_parallel(router, &chairman_models, &messages, 4096, 0.7).await;

    match responses.into_iter().next().and_then(|(_, response)| response) {
        Some(response) => Stage3Result {
            model: chairman_model.to_string(),
            response: response.content,
            usage: response.usage,
            provider: Some(response.provider),
        },
        None => Stage3Result {
            model: chairman_model.to_string(),
            response: "Error: Unable to generate final synthesis.".to_string(),
            usage: Default::default(),
            provider: None,
        },
    }
}

fn numbered_response_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"\d+\.\s*Response [A-Z]").unwrap())
}

fn response_label_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"Response [A-Z]").unwrap())
}

/// Parse the `FINAL RANKING:` section out of a model's free-form reply.
/// Falls back to scanning the whole text for `Response X` tokens when the
/// marker or the numbered-list shape is missing — matching `council.py`'s
/// `parse_ranking_from_text` exactly, including its fallbacks.
pub fn parse_ranking_from_text(ranking_text: &str) -> Vec<String> {
    if let Some(marker_index) = ranking_text.find("FINAL RANKING:") {
        let ranking_section = &ranking_text[marker_index + "FINAL RANKING:".len()..];

        let numbered_matches: Vec<&str> = numbered_response_re().find_iter(ranking_section).map(|m| m.as_str()).collect();
        if !numbered_matches.is_empty() {
            return numbered_matches
                .iter()
                .filter_map(|m| response_label_re().find(m).map(|mat| mat.as_str().to_string()))
                .collect();
        }

        return response_label_re().find_iter(ranking_section).map(|m| m.as_str().to_string()).collect();
    }

    response_label_re().find_iter(ranking_text).map(|m| m.as_str().to_string()).collect()
}

pub fn calculate_aggregate_rankings(stage2_results: &[Stage2Entry], label_map: &LabelMap) -> Vec<AggregateRanking> {
    let mut positions: HashMap<&str, Vec<usize>> = HashMap::new();

    for entry in stage2_results {
        for (position, label) in entry.parsed_ranking.iter().enumerate() {
            if let Some(model) = label_map.model_for_label(label) {
                positions.entry(model).or_default().push(position + 1);
            }
        }
    }

    let mut aggregate: Vec<AggregateRanking> = positions
        .into_iter()
        .map(|(model, ranks)| {
            let average_rank = ranks.iter().sum::<usize>() as f64 / ranks.len() as f64;
            AggregateRanking {
                model: model.to_string(),
                average_rank: (average_rank * 100.0).round() / 100.0,
                rankings_count: ranks.len(),
            }
        })
        .collect();

    aggregate.sort_by(|a, b| {
        a.average_rank
            .partial_cmp(&b.average_rank)
            .unwrap()
            .then_with(|| b.rankings_count.cmp(&a.rankings_count))
            .then_with(|| a.model.cmp(&b.model))
    });
    aggregate
}

pub struct DeliberationInputs<'a> {
    pub user_query: &'a str,
    pub final_only: bool,
    pub models: &'a [String],
    pub chairman_model: &'a str,
}

/// Run the full three-stage process, matching `run_full_council`'s sentinel
/// behaviour when every Stage 1 call fails.
pub async fn run_full_council(router: &Router, inputs: DeliberationInputs<'_>) -> DeliberationResult {
    let stage1_results = stage1_collect_responses(router, inputs.user_query, inputs.models).await;

    if stage1_results.is_empty() {
        return DeliberationResult {
            stage1: vec![],
            stage2: vec![],
            stage3: Stage3Result {
                model: inputs.chairman_model.to_string(),
                response: "All models failed to respond. Please try again.".to_string(),
                usage: Default::default(),
                provider: None,
            },
            aggregate_rankings: vec![],
            label_to_model: HashMap::new(),
            final_only: inputs.final_only,
        };
    }

    if inputs.final_only {
        let stage3 = stage3_synthesize_final(router, inputs.user_query, &stage1_results, &[], inputs.chairman_model).await;
        return DeliberationResult {
            stage1: stage1_results,
            stage2: vec![],
            stage3,
            aggregate_rankings: vec![],
            label_to_model: HashMap::new(),
            final_only: true,
        };
    }

    let (stage2_results, label_map) = stage2_collect_rankings(router, inputs.user_query, &stage1_results, inputs.models).await;
    let aggregate_rankings = calculate_aggregate_rankings(&stage2_results, &label_map);
    let stage3 = stage3_synthesize_final(router, inputs.user_query, &stage1_results, &stage2_results, inputs.chairman_model).await;

    DeliberationResult {
        stage1: stage1_results,
        stage2: stage2_results,
        stage3,
        aggregate_rankings,
        label_to_model: label_map.as_map().iter().map(|(k, v)| (k.clone(), v.clone())).collect(),
        final_only: false,
    }
}

/// Every ranker must also be a responder (spec invariant): Stage 2 only
/// ever dispatches to models that produced a Stage 1 response.
pub fn ranker_set_matches_responder_set(stage1_results: &[Stage1Entry], ranking_models: &[String]) -> bool {
    let responders: HashSet<&str> = stage1_results.iter().map(|r| r.model.as_str()).collect();
    ranking_models.iter().all(|m| responders.contains(m.as_str()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use indoc::indoc;

    #[test]
    fn parses_canonical_final_ranking_block() {
        let text = indoc! {"
            Response A is solid.
            Response B is verbose.

            FINAL RANKING:
            1. Response A
            2. Response B
        "};
        assert_eq!(parse_ranking_from_text(text), vec!["Response A", "Response B"]);
    }

    #[test]
    fn falls_back_to_bare_response_tokens_without_marker() {
        let text = "I'd rank them: Response C then Response A then Response B.";
        assert_eq!(parse_ranking_from_text(text), vec!["Response C", "Response A", "Response B"]);
    }

    #[test]
    fn aggregate_rankings_average_and_sort() {
        let mut labels = LabelMap::new();
        labels.insert("Response A", "model-a");
        labels.insert("Response B", "model-b");

        let stage2 = vec![
            Stage2Entry {
                model: "model-a".to_string(),
                ranking: String::new(),
                parsed_ranking: vec!["Response B".to_string(), "Response A".to_string()],
                usage: Default::default(),
                provider: "test".to_string(),
            },
            Stage2Entry {
                model: "model-b".to_string(),
                ranking: String::new(),
                parsed_ranking: vec!["Response A".to_string(), "Response B".to_string()],
                usage: Default::default(),
                provider: "test".to_string(),
            },
        ];

        let aggregate = calculate_aggregate_rankings(&stage2, &labels);
        assert_eq!(aggregate[0].model, "model-a");
        assert_eq!(aggregate[0].average_rank, 1.5);
    }

    #[test]
    fn ties_break_by_higher_rankings_count_then_model_id() {
        let mut labels = LabelMap::new();
        labels.insert("Response A", "model-a");
        labels.insert("Response B", "model-b");
        labels.insert("Response C", "model-c");

        // model-a and model-b both average rank 1.0, but model-b was ranked
        // by two voters against model-a's one: model-b should sort first.
        // model-c averages 1.0 too, ranked once like model-a, and should
        // sort after it by model id.
        let stage2 = vec![
            Stage2Entry {
                model: "voter-1".to_string(),
                ranking: String::new(),
                parsed_ranking: vec!["Response A".to_string()],
                usage: Default::default(),
                provider: "test".to_string(),
            },
            Stage2Entry {
                model: "voter-2".to_string(),
                ranking: String::new(),
                parsed_ranking: vec!["Response B".to_string()],
                usage: Default::default(),
                provider: "test".to_string(),
            },
            Stage2Entry {
                model: "voter-3".to_string(),
                ranking: String::new(),
                parsed_ranking: vec!["Response B".to_string()],
                usage: Default::default(),
                provider: "test".to_string(),
            },
            Stage2Entry {
                model: "voter-4".to_string(),
                ranking: String::new(),
                parsed_ranking: vec!["Response C".to_string()],
                usage: Default::default(),
                provider: "test".to_string(),
            },
        ];

        let aggregate = calculate_aggregate_rankings(&stage2, &labels);
        let order: Vec<&str> = aggregate.iter().map(|a| a.model.as_str()).collect();
        assert_eq!(order, vec!["model-b", "model-a", "model-c"]);
    }
}
