//! Prompt contract with the reranking model.

/// Start of the optional reasoning segment
pub const THINK_OPEN: &str = "<think>";
/// End of the optional reasoning segment
pub const THINK_CLOSE: &str = "</think>";

/// Selection rules shared by both prompts
macro_rules! selection_rules {
    () => {
        r#"You are a book recommender. From the books given to you as a JSON array (Available Books), you recommend AT MOST 2 that fit the user's query.

Rules:
- Only use ids that appear in Available Books. Never invent or alter an id.
- Weigh CategoryName most. Recommend a book only if its CategoryName matches what the query asks for.
- If the query mentions a price, books in the nearest price range are acceptable.
- If you are not confident that a book satisfies every requirement of the query, do not recommend it. Recommending nothing is better than a weak match.
"#
    };
}

/// Used when the caller wants ids only
pub const IDS_ONLY_PROMPT: &str = concat!(
    selection_rules!(),
    r#"
Output format:
- Only the ids of the recommended books, separated by commas with no spaces.
- No reasoning, no explanation, no other text.
- If nothing fits, reply with an empty message.

Example: 0196f2d0-6b43-7c61-9d0a-3c1f5e2a8b10,0196f2d0-6b43-7c61-9d0a-3c1f5e2a8b11"#
);

/// Used when the caller asked for an explanation
pub const EXPLAINED_PROMPT: &str = concat!(
    selection_rules!(),
    r#"
Output format:
- First, your reasoning inside <think></think>, written as a book expert talking directly to the user. Keep it to two sentences.
- Then the ids of the recommended books, separated by commas with no spaces, and nothing else.
- If nothing fits, write nothing after </think>.

Example: <think>Both are finance books close to your budget.</think>0196f2d0-6b43-7c61-9d0a-3c1f5e2a8b10,0196f2d0-6b43-7c61-9d0a-3c1f5e2a8b11"#
);

pub fn system_prompt(explanation_needed: bool) -> &'static str {
    if explanation_needed {
        EXPLAINED_PROMPT
    } else {
        IDS_ONLY_PROMPT
    }
}

/// User turn: the raw query followed by the candidate JSON
pub fn user_message(query: &str, books_json: &str) -> String {
    format!("User Query: {} \nAvailable Books: {}", query, books_json)
}
