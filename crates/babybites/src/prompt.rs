//! Structured prompt builders.
//!
//! [`SystemPromptBuilder`] assembles multi-section prompts; [`BulletList`]
//! assembles the `- item` lists inside a section, with optional items.
//! Skipped pieces leave no trace in the output: no empty heading, no blank
//! bullet.

/// Builder for multi-section system prompts.
///
/// The preamble comes first as-is; every later section gets a `## ` heading.
/// Sections are joined with double newlines and empty ones are skipped.
///
/// # Example
///
/// ```
/// use babybites::prompt::SystemPromptBuilder;
///
/// let prompt = SystemPromptBuilder::new("You are a nutritionist.")
///     .section("Task", "Write a recipe.")
///     .section("Empty", "")
///     .build();
///
/// assert_eq!(prompt, "You are a nutritionist.\n\n## Task\nWrite a recipe.");
/// ```
pub struct SystemPromptBuilder {
    sections: Vec<String>,
}

impl SystemPromptBuilder {
    pub fn new(preamble: impl Into<String>) -> Self {
        Self {
            sections: vec![preamble.into()],
        }
    }

    /// Append a named section. Skipped if `content` is empty.
    pub fn section(mut self, heading: &str, content: impl Into<String>) -> Self {
        let content = content.into();
        if !content.is_empty() {
            self.sections.push(format!("## {heading}\n{content}"));
        }
        self
    }

    /// Join all sections with double newlines.
    pub fn build(self) -> String {
        self.sections.join("\n\n")
    }
}

/// Builder for a `- item` list.
///
/// ```
/// use babybites::prompt::BulletList;
///
/// let allergy: Option<&str> = None;
/// let list = BulletList::new()
///     .item("No salt.")
///     .item_opt(allergy.map(|a| format!("Never use {a}.")))
///     .build();
/// assert_eq!(list, "- No salt.");
/// ```
#[derive(Default)]
pub struct BulletList {
    items: Vec<String>,
}

impl BulletList {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append an item. Skipped if `text` is empty.
    pub fn item(mut self, text: impl Into<String>) -> Self {
        let text = text.into();
        if !text.is_empty() {
            self.items.push(text);
        }
        self
    }

    /// Append an item only if it is `Some`.
    pub fn item_opt(self, text: Option<impl Into<String>>) -> Self {
        match text {
            Some(t) => self.item(t),
            None => self,
        }
    }

    /// Render as newline-separated `- item` lines.
    pub fn build(self) -> String {
        self.items
            .iter()
            .map(|i| format!("- {i}"))
            .collect::<Vec<_>>()
            .join("\n")
    }
}
