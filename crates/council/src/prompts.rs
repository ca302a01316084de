//! Prompt templates ported line-for-line from `council.py`. The ranking
//! prompt's exact wording matters: [`crate::engine::parse_ranking_from_text`]
//! depends on the model actually producing the "FINAL RANKING:" / numbered
//! "Response X" shape this prompt asks for.

pub fn ranking_prompt(user_query: &str, responses_text: &str) -> String {
    format!(
        "You are evaluating different responses to the following question:\n\n\
Question: {user_query}\n\n\
Here are the responses from different models (anonymized):\n\n\
{responses_text}\n\n\
Your task:\n\
1. First, evaluate each response individually. For each response, explain what it does well and what it does poorly.\n\
2. Then, at the very end of your response, provide a final ranking.\n\n\
IMPORTANT: Your final ranking MUST be formatted EXACTLY as follows:\n\
- Start with the line \"FINAL RANKING:\" (all caps, with colon)\n\
- Then list the responses from best to worst as a numbered list\n\
- Each line should be: number, period, space, then ONLY the response label (e.g., \"1. Response A\")\n\
- Do not add any other text or explanations in the ranking section\n\n\
Example of the correct format for your ENTIRE response:\n\n\
Response A provides good detail on X but misses Y...\n\
Response B is accurate but lacks depth on Z...\n\
Response C offers the most comprehensive answer...\n\n\
FINAL RANKING:\n\
1. Response C\n\
2. Response A\n\
3. Response B\n\n\
Now provide your evaluation and ranking:"
    )
}

pub fn chairman_prompt(user_query: &str, stage1_text: &str, stage2_text: &str) -> String {
    let has_rankings = !stage2_text.is_empty();

    let ranked_clause = if has_rankings { ", and then ranked each other's responses" } else { "" };
    let rankings_bullet = if has_rankings {
        "\n- The peer rankings and what they reveal about response quality"
    } else {
        ""
    };

    format!(
        "You are the Chairman of an LLM Council. Multiple AI models have provided responses to a user's question{ranked_clause}.\n\n\
Original Question: {user_query}\n\n\
STAGE 1 - Individual Responses:\n\
{stage1_text}\n\
{stage2_text}\n\n\
Your task as Chairman is to synthesize all of this information into a single, comprehensive, accurate answer to the user's original question. Consider:\n\
- The individual responses and their insights{rankings_bullet}\n\
- Any patterns of agreement or disagreement\n\n\
Provide a clear, well-reasoned final answer that represents the council's collective wisdom:"
    )
}

pub fn title_prompt(user_query: &str) -> String {
    format!(
        "Generate a very short title (3-5 words maximum) that summarizes the following question.\n\
The title should be concise and descriptive. Do not use quotes or punctuation in the title.\n\n\
Question: {user_query}\n\n\
Title:"
    )
}

#[cfg(test)]
mod tests {
    use insta::assert_snapshot;

    use super::*;

    #[test]
    fn chairman_prompt_includes_rankings_section_when_present() {
        assert_snapshot!(
            chairman_prompt("What is the capital of France?", "Response A: Paris.", "Response A ranked first."),
            @r###"
        You are the Chairman of an LLM Council. Multiple AI models have provided responses to a user's question, and then ranked each other's responses.

        Original Question: What is the capital of France?

        STAGE 1 - Individual Responses:
        Response A: Paris.
        Response A ranked first.

        Your task as Chairman is to synthesize all of this information into a single, comprehensive, accurate answer to the user's original question. Consider:
        - The individual responses and their insights
        - The peer rankings and what they reveal about response quality
        - Any patterns of agreement or disagreement

        Provide a clear, well-reasoned final answer that represents the council's collective wisdom:
        "###
        );
    }

    #[test]
    fn chairman_prompt_omits_rankings_section_when_empty() {
        let rendered = chairman_prompt("What is the capital of France?", "Response A: Paris.", "");
        assert!(!rendered.contains("ranked each other's"));
        assert!(!rendered.contains("peer rankings"));
    }

    #[test]
    fn ranking_prompt_asks_for_final_ranking_line() {
        assert!(ranking_prompt("q", "Response A: x").contains("FINAL RANKING:"));
    }
}
