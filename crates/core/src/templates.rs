use chrono::{DateTime, Duration, Utc};

use crate::models::{ChatMessage, Role};

pub const ABOUT_RESPONSE: &str = "Developed by: Sravan Penugonda. QuickPrompt is an AI-powered prompt discovery and enhancement tool that helps users find, refine, and save high-quality prompts for any task. Its purpose is to make prompt crafting fast, clear, and effective for Lovable.dev, ChatGPT, Claude, and other AI tools. You can start exploring prompts now!";

/// Structured prompt produced by the built-in rewriter. The task is the
/// user's text with surrounding whitespace dropped.
pub fn build_rewrite_prompt(task: &str) -> String {
    format!(
        "Create a detailed and specific prompt for [YOUR TASK: {}]. Include: [CONTEXT: relevant background information], [OBJECTIVES: clear goals and expected outcomes], [CONSTRAINTS: any limitations or requirements], [FORMAT: desired output structure], and [EXAMPLES: if applicable]. Be specific about tone, style, and any technical requirements needed for optimal AI response.",
        task.trim()
    )
}

/// Two user/assistant pairs shown when demo mode is on.
pub fn demo_transcript(now: DateTime<Utc>) -> Vec<ChatMessage> {
    let entries = [
        (
            Role::User,
            "Help me write an email to my boss",
            300,
        ),
        (
            Role::Assistant,
            "Write a professional email to your supervisor requesting approval for a specific project, time off, or discussing work-related concerns. Include: [CONTEXT: Your specific request], [TONE: Professional and respectful], [PURPOSE: Clear statement of what you need], [TIMELINE: When you need a response], and [NEXT STEPS: What happens after approval].",
            250,
        ),
        (Role::User, "Make a workout plan", 120),
        (
            Role::Assistant,
            "Create a comprehensive fitness program tailored to [YOUR FITNESS LEVEL: beginner/intermediate/advanced] with [GOAL: weight loss/muscle gain/endurance/strength]. Include: weekly schedule with specific exercises, sets and reps, progression plan over 8-12 weeks, rest day activities, and nutrition guidelines. Consider any [LIMITATIONS: injuries, time constraints, available equipment] and provide modifications for home/gym workouts.",
            70,
        ),
    ];

    entries
        .into_iter()
        .map(|(role, content, seconds_ago)| {
            ChatMessage::new(role, content, now - Duration::seconds(seconds_ago))
        })
        .collect()
}
