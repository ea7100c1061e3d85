//! Prompt template builders for the generative endpoint.
//!
//! Every prompt demands a bare JSON object so the response parser can run
//! the same greedy extraction over all of them.

/// Cap content embedded in a prompt. Must land on a UTF-8 char boundary;
/// slicing at an arbitrary byte panics.
pub(crate) fn truncate_at_boundary(content: &str, max_bytes: usize) -> &str {
    if content.len() <= max_bytes {
        return content;
    }
    let mut end = max_bytes;
    while end > 0 && !content.is_char_boundary(end) {
        end -= 1;
    }
    &content[..end]
}

/// Natural-language task parsing (title, due date, type, duration, urgency).
pub fn parse_task(text: &str) -> String {
    format!(
        r#"You are an intelligent task parser. Analyze the following natural language text and extract structured task information.

Consider urgency indicators like: "ASAP", "urgent", "emergency", "immediately", "rush", "critical"
Consider time indicators like: "today", "tomorrow", "next week", "Monday", "by 5pm", "deadline"
Consider context clues for categorization.

Text: "{}"

Extract and return ONLY a valid JSON object with these exact fields:
{{
  "title": "Brief, clear task title",
  "description": "Additional details if any, empty string if none",
  "dueDate": "ISO 8601 date-time if a time is mentioned, null otherwise",
  "type": "task|event|reminder",
  "estimatedMinutes": number,
  "urgency": "low|medium|high",
  "category": "work|personal|health|finance|education|shopping|travel|entertainment|household|emergency",
  "reasoning": "Brief explanation of your analysis"
}}

Respond with ONLY the JSON object:"#,
        truncate_at_boundary(text, 4_000)
    )
}

/// Comprehensive note analysis: summary, sentiment, category, tags.
pub fn analyze_note(title: &str, content: &str) -> String {
    format!(
        r#"You are an intelligent note analysis assistant. Analyze the following note and provide comprehensive insights.

Title: "{}"
Content: "{}"

Return ONLY a valid JSON object with these exact fields:
{{
  "summary": "Brief 2-3 sentence summary of the note",
  "sentiment": "positive|negative|neutral",
  "mood": "excited|calm|frustrated|focused|creative|analytical|stressed|optimistic",
  "suggestedCategory": "work|personal|health|finance|education|shopping|travel|entertainment|household|general",
  "suggestedTags": ["tag1", "tag2", "tag3"],
  "keyPoints": ["important point 1", "important point 2"],
  "readingTimeMinutes": number,
  "complexity": "simple|medium|complex"
}}

Respond with ONLY the JSON object:"#,
        title,
        truncate_at_boundary(content, 8_000)
    )
}

/// Voice-note cleanup: grammar, filler removal, structure, title.
pub fn clean_voice_note(transcript: &str, language: &str) -> String {
    format!(
        r#"You are a voice note processing specialist. Clean up and enhance the following transcribed voice note.

Original transcription: "{}"
Language: {}

Your tasks:
1. Fix grammar, punctuation, and formatting
2. Remove filler words (um, uh, like, you know, etc.)
3. Structure the content with proper paragraphs
4. Preserve the speaker's intent and meaning
5. Suggest a concise title for the note

Return ONLY a valid JSON object:
{{
  "cleanedText": "Cleaned and formatted version of the transcription",
  "suggestedTitle": "A concise title for this note",
  "detectedTopics": ["topic1", "topic2"],
  "confidence": number_between_0_and_1
}}

Respond with ONLY the JSON object:"#,
        truncate_at_boundary(transcript, 8_000),
        language
    )
}

/// Insights over a batch distribution summary plus sample task lines.
pub fn batch_insights(
    total: usize,
    category_distribution: &str,
    priority_distribution: &str,
    average_minutes: f64,
    sample_lines: &str,
) -> String {
    format!(
        r#"Analyze this task data and provide insights:

Total tasks: {}
Categories: {}
Priorities: {}
Average time estimate: {:.0} minutes

Sample tasks:
{}

Provide insights and recommendations. Return ONLY a JSON object:
{{
  "insights": ["insight 1", "insight 2"],
  "recommendations": ["recommendation 1", "recommendation 2"]
}}"#,
        total, category_distribution, priority_distribution, average_minutes, sample_lines
    )
}
