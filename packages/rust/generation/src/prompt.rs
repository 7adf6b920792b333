//! Instruction text sent to the generation service.

use contentfactory_shared::RelatedLink;

/// Which piece of content a prompt asks for.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PromptMode {
    /// A short standalone definition of the topic.
    Definition,
    /// A full HTML article following the outline.
    Article,
}

impl PromptMode {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Definition => "definition",
            Self::Article => "article",
        }
    }
}

/// Build the prompt for `topic`.
///
/// `sections` and `related` only shape article prompts; definition prompts
/// accept and ignore them.
pub fn build_prompt(
    mode: PromptMode,
    topic: &str,
    sections: &[String],
    related: &[RelatedLink],
) -> String {
    match mode {
        PromptMode::Definition => definition_prompt(topic),
        PromptMode::Article => article_prompt(topic, sections, related),
    }
}

fn definition_prompt(topic: &str) -> String {
    format!(
        "Write a short, clear and concise definition of \"{topic}\". \
         Answer with the definition only, in one or two sentences of plain text."
    )
}

fn article_prompt(topic: &str, sections: &[String], related: &[RelatedLink]) -> String {
    let mut prompt = format!(
        "Write an article about \"{topic}\". Follow this outline in order, \
         one section per line:\n\n{}\n\n",
        sections.join("\n")
    );

    prompt.push_str(
        "Format the article as semantic HTML using only <h2>, <h3>, <h4>, <p>, \
         <ul>, <ol> and <li> tags. Do not include the top-level <h1> heading, \
         and do not wrap the output in <html>, <head> or <body> tags.",
    );

    if !related.is_empty() {
        prompt.push_str(
            "\n\nWhere it fits naturally, link to the following related topics, \
             using the topic name as anchor text:\n",
        );
        for link in related {
            prompt.push_str(&format!("- {}: {}\n", link.label, link.url));
        }
        prompt.push_str(
            "If a related topic cannot be woven into the text, list it with its \
             link under a final \"Related terms\" section instead.",
        );
    }

    prompt
}
