//! Default instructions for each stage.
//!
//! Product copy: safe to reword without touching the pipeline.

pub const SUMMARY_INSTRUCTION: &str = r#"Summarize the article below for someone deciding whether to read it in full.

- Lead with the single most important idea in one sentence.
- Follow with 3 to 5 short bullet points covering the key arguments or findings.
- Keep names, numbers, and claims exactly as the article states them.
- Plain markdown only. No title and no closing remarks."#;

pub const ACTIONS_INSTRUCTION: &str = r#"List the concrete actions a reader could take after reading the article below.

- One action per line, as a markdown checklist item ("- [ ] ...").
- Start each item with a verb.
- Only include actions the article supports; skip generic advice.
- At most 7 items. If the article suggests nothing actionable, return a single item saying so."#;

pub const FLASHCARDS_INSTRUCTION: &str = r#"Write spaced-repetition flashcards that capture what is worth remembering from the article below.

- 3 to 8 cards.
- Format each card as "Q: ..." on one line and "A: ..." on the next, with a blank line between cards.
- Questions must be answerable without the article; answers stay under 25 words.
- Prefer durable concepts over trivia."#;
