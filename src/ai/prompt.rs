use std::fmt::Write as _;

use crate::error::Result;
use crate::models::TrendSummary;

const PERSONA: &str = "You are Alyssa Harper, a career and negotiation expert who helps professionals level up through practical, data-driven advice.";

/// Build the single generation prompt for `count` resources starting at
/// `next_day`. The template block mirrors the labels the parser reads.
pub fn generation_prompt(trends: &[TrendSummary], next_day: u32, count: u32) -> Result<String> {
    let trends_json = serde_json::to_string_pretty(trends)?;
    let last_existing = next_day.saturating_sub(1);
    let count = count.max(1);

    let mut prompt = String::new();
    let _ = writeln!(prompt, "{}", PERSONA);
    prompt.push('\n');
    let _ = writeln!(
        prompt,
        "CONTEXT: You already have resources for Days 1-{}. You need to create {} NEW unique resources.",
        last_existing, count
    );
    prompt.push('\n');
    let _ = writeln!(prompt, "TRENDING TIKTOK CONTENT (for inspiration):\n{}", trends_json);
    prompt.push('\n');
    let _ = writeln!(
        prompt,
        "TASK: Generate {} brand new career resources in EXACTLY this format:",
        count
    );
    prompt.push('\n');
    prompt.push_str(&section_template(next_day));
    prompt.push('\n');

    if count > 1 {
        let rest: Vec<String> = (1..count).map(|i| format!("Day {}", next_day.saturating_add(i))).collect();
        let _ = writeln!(prompt, "[Repeat for {}]", rest.join(" and "));
        prompt.push('\n');
    }

    let _ = writeln!(prompt, "REQUIREMENTS:");
    let _ = writeln!(
        prompt,
        "- Each resource must be UNIQUE (different from Days 1-{} and from each other)",
        last_existing
    );
    prompt.push_str(
        "- Focus on trending topics from the TikTok data
- Include specific numbers, frameworks, and examples
- Make it immediately actionable
- Use Alyssa Harper's voice: confident, direct, empowering
- Each password should be ONE WORD related to the topic
",
    );
    prompt.push('\n');
    let _ = write!(prompt, "Generate {} complete resources now:", count);

    Ok(prompt)
}

fn section_template(day: u32) -> String {
    format!(
        "---
DAY: {day}
CATEGORY: [One word: Negotiation/LinkedIn/Interview/Career/Communication/etc]
TITLE: [Catchy 3-5 word title]
HOOK: [7-15 word attention-grabbing hook that makes people want to learn more]
DESCRIPTION: [One sentence value proposition]
KEY_POINT_1: [Specific, actionable bullet point]
KEY_POINT_2: [Specific, actionable bullet point]
KEY_POINT_3: [Specific, actionable bullet point]
PASSWORD: [ONE WORD in ALLCAPS, relevant to topic]
FULL_CONTENT:
[Write a 400-600 word detailed guide in this structure:
- Start with the problem/pain point
- Introduce the framework/method
- Break down 3-5 specific steps with examples
- Include real numbers/stats where possible
- End with call to action to implement
- Write in Alyssa Harper's confident, direct, no-BS voice]
---
"
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    fn trend() -> TrendSummary {
        TrendSummary {
            text: "Never say your number first".to_string(),
            engagement: 1234.5,
            hashtags: vec!["salary".to_string()],
        }
    }

    #[test]
    fn test_prompt_names_day_range_and_count() {
        let prompt = generation_prompt(&[trend()], 11, 3).unwrap();

        assert!(prompt.contains("resources for Days 1-10. You need to create 3 NEW"));
        assert!(prompt.contains("DAY: 11\n"));
        assert!(prompt.contains("[Repeat for Day 12 and Day 13]"));
        assert!(prompt.contains("\"Never say your number first\""));
        assert!(prompt.ends_with("Generate 3 complete resources now:"));
    }

    #[test]
    fn test_single_resource_prompt_has_no_repeat_line() {
        let prompt = generation_prompt(&[], 1, 1).unwrap();
        assert!(!prompt.contains("[Repeat for"));
    }
}
