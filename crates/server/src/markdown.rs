//! Renders a [`council::types::DeliberationResult`] as the structured
//! markdown `POST /api/council` returns alongside the raw stages, ported
//! from `opencode_integration.py::format_council_markdown`. Kept in the
//! server crate rather than the engine so `council` stays a pure
//! deliberation library with no presentation concerns.

use council::types::DeliberationResult;

pub fn render(query: &str, result: &DeliberationResult, include_details: bool, elapsed_seconds: f64) -> String {
    let mut lines = Vec::new();

    lines.push("## LLM Council Deliberation\n".to_string());
    lines.push(format!("**Query**: {query}\n"));
    lines.push("---\n".to_string());

    if include_details && !result.stage1.is_empty() {
        lines.push("### Stage 1: Individual Responses\n".to_string());
        for entry in &result.stage1 {
            lines.push("<details>".to_string());
            lines.push(format!(
                "<summary><strong>{}</strong> ({}, {} tokens)</summary>\n",
                entry.model, entry.provider, entry.usage.total_tokens
            ));
            lines.push(format!("{}\n", entry.response));
            lines.push("</details>\n".to_string());
        }
    }

    if include_details && !result.stage2.is_empty() {
        lines.push("### Stage 2: Peer Rankings\n".to_string());

        if !result.aggregate_rankings.is_empty() {
            lines.push("| Rank | Model | Score | Votes |".to_string());
            lines.push("|------|-------|-------|-------|".to_string());
            for (index, ranking) in result.aggregate_rankings.iter().enumerate() {
                lines.push(format!(
                    "| {} | {} | {} | {} |",
                    index + 1,
                    ranking.model,
                    ranking.average_rank,
                    ranking.rankings_count
                ));
            }
            lines.push(String::new());
        }

        lines.push("<details>".to_string());
        lines.push("<summary><strong>Peer Evaluation Details</strong></summary>\n".to_string());
        for ranking in &result.stage2 {
            lines.push(format!("\n**{}'s evaluation**:", ranking.model));
            let parsed = if ranking.parsed_ranking.is_empty() {
                "Could not parse".to_string()
            } else {
                ranking.parsed_ranking.join(" > ")
            };
            lines.push(format!("Ranking: {parsed}"));
            lines.push(format!("\n{}\n", ranking.ranking));
        }
        lines.push("</details>\n".to_string());
    }

    lines.push("### Stage 3: Chairman's Final Synthesis\n".to_string());
    lines.push(format!("**Synthesized by**: {}\n", result.stage3.model));
    lines.push(format!("{}\n", result.stage3.response));
    lines.push("---\n".to_string());

    let total_tokens: u64 = result
        .stage1
        .iter()
        .map(|e| e.usage.total_tokens)
        .chain(result.stage2.iter().map(|e| e.usage.total_tokens))
        .chain(std::iter::once(result.stage3.usage.total_tokens))
        .sum();

    lines.push(format!(
        "*Council completed in {elapsed_seconds:.1}s using {} models | ~{total_tokens} tokens*",
        result.stage1.len()
    ));

    lines.join("\n")
}

#[cfg(test)]
mod tests {
    use super::*;
    use council::types::{AggregateRanking, Stage1Entry, Stage3Result, Usage};
    use std::collections::HashMap;

    #[test]
    fn renders_all_three_stages() {
        let result = DeliberationResult {
            stage1: vec![Stage1Entry {
                model: "model-a".to_string(),
                response: "alpha".to_string(),
                usage: Usage::default(),
                provider: "test".to_string(),
            }],
            stage2: vec![],
            stage3: Stage3Result {
                model: "chairman".to_string(),
                response: "synth".to_string(),
                usage: Usage::default(),
                provider: Some("test".to_string()),
            },
            aggregate_rankings: Vec::<AggregateRanking>::new(),
            label_to_model: HashMap::new(),
            final_only: true,
        };

        let rendered = render("what is rust", &result, true, 1.2);
        assert!(rendered.contains("model-a"));
        assert!(rendered.contains("synth"));
        assert!(rendered.contains("Council completed in 1.2s"));
    }
}
