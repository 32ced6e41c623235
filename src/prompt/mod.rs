//! Prompt Builder System
//!
//! Section-based prompt construction plus the two fixed templates the
//! pipeline sends to agents:
//!
//! - review prompt: expert persona, three review criteria, target file
//! - optimize prompt: read every review file, merge, rewrite, report
//!
//! Rendering is pure. Inputs are substituted literally (empty strings
//! included) and identical inputs always render byte-identical text.

use crate::agent::AgentSpec;
use crate::config::OptimizerConfig;
use crate::constants::artifacts;

/// Prompt section types
#[derive(Debug, Clone)]
pub enum PromptSection {
    /// Role definition with expertise area
    Role { expertise: String, task: String },
    /// Numbered objectives
    Objectives(Vec<String>),
    /// Raw text section with optional header
    Text {
        header: Option<String>,
        content: String,
    },
    /// Fenced block with language tag
    Code { language: String, content: String },
    /// Bulleted list under a header
    Bullets { header: String, items: Vec<String> },
}

/// Prompt builder for consistent prompt construction
#[derive(Debug, Clone, Default)]
pub struct PromptBuilder {
    sections: Vec<PromptSection>,
}

impl PromptBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a role definition section
    pub fn role(mut self, expertise: &str, task: &str) -> Self {
        self.sections.push(PromptSection::Role {
            expertise: expertise.to_string(),
            task: task.to_string(),
        });
        self
    }

    /// Add objectives section
    pub fn objectives<S: AsRef<str>>(mut self, objectives: &[S]) -> Self {
        self.sections.push(PromptSection::Objectives(
            objectives.iter().map(|o| o.as_ref().to_string()).collect(),
        ));
        self
    }

    /// Add text section with header
    pub fn section(mut self, header: &str, content: &str) -> Self {
        self.sections.push(PromptSection::Text {
            header: Some(header.to_string()),
            content: content.to_string(),
        });
        self
    }

    /// Add text section
    pub fn text(mut self, content: &str) -> Self {
        self.sections.push(PromptSection::Text {
            header: None,
            content: content.to_string(),
        });
        self
    }

    /// Add fenced block
    pub fn code(mut self, language: &str, content: &str) -> Self {
        self.sections.push(PromptSection::Code {
            language: language.to_string(),
            content: content.to_string(),
        });
        self
    }

    /// Add bulleted list section
    pub fn bullets<S: AsRef<str>>(mut self, header: &str, items: &[S]) -> Self {
        self.sections.push(PromptSection::Bullets {
            header: header.to_string(),
            items: items.iter().map(|i| i.as_ref().to_string()).collect(),
        });
        self
    }

    /// Build the final prompt string
    pub fn build(self) -> String {
        let mut prompt = String::new();

        for section in self.sections {
            match section {
                PromptSection::Role { expertise, task } => {
                    prompt.push_str(&format!("You are a leading expert in {}.\n", expertise));
                    if !task.is_empty() {
                        prompt.push_str(&task);
                        prompt.push('\n');
                    }
                    prompt.push('\n');
                }
                PromptSection::Objectives(objectives) => {
                    for (i, obj) in objectives.iter().enumerate() {
                        prompt.push_str(&format!("{}. {}\n", i + 1, obj));
                    }
                    prompt.push('\n');
                }
                PromptSection::Text { header, content } => {
                    if let Some(h) = header {
                        prompt.push_str(&format!("## {}\n\n", h));
                    }
                    prompt.push_str(&content);
                    prompt.push_str("\n\n");
                }
                PromptSection::Code { language, content } => {
                    prompt.push_str(&format!("```{}\n", language));
                    prompt.push_str(&content);
                    prompt.push_str("\n```\n\n");
                }
                PromptSection::Bullets { header, items } => {
                    if !header.is_empty() {
                        prompt.push_str(&format!("{}\n", header));
                    }
                    for item in items {
                        prompt.push_str(&format!("- {}\n", item));
                    }
                    prompt.push('\n');
                }
            }
        }

        prompt.trim_end().to_string()
    }
}

// =============================================================================
// Templates
// =============================================================================

/// Join a directory and file name the way the agent will see it
fn target_file(dir: &str, file: &str) -> String {
    format!("{}/{}", dir, file)
}

/// Instructions for one reviewing agent
///
/// The agent reviews the tutorial at `content_path` and writes its report to
/// `output_path/<agent.output_file>`.
pub fn build_review_prompt(
    topic: &str,
    content_path: &str,
    output_path: &str,
    agent: &AgentSpec,
) -> String {
    PromptBuilder::new()
        .role(topic, "")
        .text(&format!(
            "{} contains a tutorial we wrote to teach {} to complete beginners.",
            content_path, topic
        ))
        .text("Review this tutorial with an expert eye, focusing on:")
        .objectives(&[
            "Knowledge completeness - does it cover the core concepts of the field? \
             Is anything important missing?",
            "Accessibility for beginners - are explanations easy to follow? \
             Are the examples apt? Is the learning curve reasonable?",
            "Factual accuracy - is anything wrong or imprecise?",
        ])
        .text("Summarize the problems you find and your suggested improvements in a review report.")
        .text(&format!(
            "**IMPORTANT**: write your review report to the file {}",
            target_file(output_path, &agent.output_file)
        ))
        .build()
}

/// Instructions for the optimization agent
///
/// Lists every expected review file by name so the agent never has to
/// discover the directory contents itself.
pub fn build_optimize_prompt(
    topic: &str,
    content_path: &str,
    reviews_path: &str,
    agents: &[AgentSpec],
    optimizer: &OptimizerConfig,
) -> String {
    let review_files: Vec<&str> = agents.iter().map(|a| a.output_file.as_str()).collect();

    let mut summary_format = String::from(
        "# Review Summary\n\n## High-priority issues (raised by several reviewers)\n- ...\n",
    );
    for agent in agents {
        summary_format.push_str(&format!(
            "\n## {} expert findings\n- ...\n",
            agent.display_name()
        ));
    }
    summary_format.push_str("\n## Improvement checklist\n- [ ] ...");

    PromptBuilder::new()
        .role(topic, "You are also an excellent technical writer.")
        .section(
            "Task",
            &format!(
                "Using the review feedback from several AI experts, improve the tutorial content in {}.",
                content_path
            ),
        )
        .section(
            "Review files",
            &format!("Read all of the review files in the {} directory:", reviews_path),
        )
        .bullets("", &review_files)
        .section(
            "Steps",
            &format!(
                "### Step 1: Summarize the review feedback\n\n\
                 Read every review file and consolidate the feedback:\n\
                 - Identify issues raised by more than one reviewer (high priority)\n\
                 - Collect the concrete improvement suggestions\n\
                 - Write the consolidated summary to {}\n\n\
                 Summary format:",
                target_file(reviews_path, &optimizer.summary_file)
            ),
        )
        .code("markdown", &summary_format)
        .text(&format!(
            "### Step 2: Improve the tutorial\n\n\
             Work through the summarized feedback and improve the tutorial in {}:\n\n\
             1. **Completeness issues**: add the missing core concepts\n\
             2. **Accessibility issues**: clarify explanations, add better analogies and examples\n\
             3. **Accuracy issues**: correct anything wrong or imprecise\n\
             4. **Update {}**: if you added new content, keep it in sync",
            content_path,
            artifacts::README_FILE
        ))
        .text(&format!(
            "### Step 3: Write the optimization report\n\n\
             When you are done, record in {}:\n\
             - the main issues that were summarized\n\
             - the improvements you made\n\
             - how the tutorial structure changed",
            target_file(reviews_path, &optimizer.report_file)
        ))
        .build()
}
