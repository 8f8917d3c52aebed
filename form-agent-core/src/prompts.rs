//! Prompt builders. The output formats asked for here are never parsed
//! locally; they are instructions to the model only.

/// Reply the model is told to give when the context holds no answer.
pub const NO_ANSWER_SENTINEL: &str = "No answer found";

/// Reply the model is told to give when a document has fewer than three facts.
pub const IRRELEVANT_SENTINEL: &str = "document is irrelevant";

/// Placeholder put into the synthesis prompt for a document whose fact
/// extraction failed, so the failure reason itself never reaches the model.
pub const NO_FACTS_PLACEHOLDER: &str = "No facts could be extracted from this document.";

pub fn document_label(index: usize) -> String {
    format!("Document {}", index + 1)
}

pub fn question_prompt(context: &str, question: &str) -> String {
    format!(
        "Document content: '''{context}'''\n\
         User question: {question}\n\
         Use only the document content above. Extract the exact information asked \
         or reply '{NO_ANSWER_SENTINEL}' if it is unavailable."
    )
}

pub fn summary_prompt(context: &str, max_length: usize) -> String {
    format!(
        "Summarize this document with a short introduction followed by 3-5 bullet points \
         with key facts (dates, names, topics). Aim for at most {max_length} words.\n\
         Document Text: '''{context}'''"
    )
}

pub fn fact_extraction_prompt(label: &str, context: &str, holistic_prompt: &str) -> String {
    format!(
        "{label}: '''{context}'''\n\
         Question: {holistic_prompt}\n\
         Extract exactly three key facts from {label} that are relevant to the question, \
         as a numbered list (1., 2., 3.). If the document contains fewer than three distinct \
         relevant facts, reply only with '{IRRELEVANT_SENTINEL}'."
    )
}

/// Combined phase-2 prompt. `facts` holds `(label, facts)` pairs in document
/// order. The mandated format names only the first two labels, whatever the
/// number of documents.
pub fn synthesis_prompt(facts: &[(String, &str)], holistic_prompt: &str) -> String {
    let first = document_label(0);
    let second = document_label(1);

    let mut prompt = String::from("Key facts extracted from multiple documents:\n");
    for (label, text) in facts {
        prompt.push_str(label);
        prompt.push_str(":\n");
        prompt.push_str(text);
        prompt.push('\n');
    }
    prompt.push_str(&format!(
        "\nHolistic question: {holistic_prompt}\n\
         Answer in exactly five lines using this format:\n\
         Comparison 1: <a point comparing {first} and {second}>\n\
         Comparison 2: <a point comparing {first} and {second}>\n\
         Comparison 3: <a point comparing {first} and {second}>\n\
         {first}: <one-line summary of {first}>\n\
         {second}: <one-line summary of {second}>\n\
         No other text may appear in your answer."
    ));
    prompt
}
