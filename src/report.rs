//! Markdown rendering of an assistant reply.

use crate::assistant::{Answer, Reply};
use crate::model::{Field, ScoredCandidate};

const MAX_DESCRIPTION_CHARS: usize = 400;

pub fn format_reply(reply: &Reply, question: &str) -> String {
    match reply {
        Reply::Unsupported { message } => format!("# {}\n\n{message}\n", sanitize_heading(question)),
        Reply::Answered(answer) => format_answer(answer, question),
    }
}

fn format_answer(answer: &Answer, question: &str) -> String {
    let mut output = format!("# {}\n\n", sanitize_heading(question));
    output.push_str(&format!(
        "_{} · confidence {:.2} · {}_\n\n",
        answer.language_name,
        answer.detection.confidence,
        answer.detection.method.label()
    ));

    let c = &answer.constraints;
    if !c.is_empty() {
        output.push_str("**Filters:**");
        let mut filters = Vec::new();
        if let Some(v) = &c.place_type {
            filters.push(format!("type `{v}`"));
        }
        if let Some(v) = &c.region {
            filters.push(format!("region `{v}`"));
        }
        if !c.keywords.is_empty() {
            filters.push(format!("keywords `{}`", c.keywords.join(", ")));
        }
        if let Some(v) = &c.price_tier {
            filters.push(format!("price `{v}`"));
        }
        output.push(' ');
        output.push_str(&filters.join("; "));
        output.push_str("\n\n");
    }

    if answer.results.is_empty() {
        output.push_str("No matching places found.\n\n");
    }
    for (i, entry) in answer.results.iter().enumerate() {
        format_place(&mut output, i + 1, entry);
    }

    if !answer.suggested_activities.is_empty() {
        output.push_str("## Suggested\n\n");
        for name in &answer.suggested_activities {
            output.push_str(&format!("- {name}\n"));
        }
        output.push('\n');
    }

    output.push_str("## Follow-up\n\n");
    for q in &answer.follow_up_questions {
        output.push_str(&format!("- {q}\n"));
    }

    output
}

fn format_place(output: &mut String, rank: usize, entry: &ScoredCandidate) {
    let place = &entry.candidate;
    let language = entry.language.map_or("unknown", |l| l.code());
    output.push_str(&format!(
        "## {rank}. {} ({:.2}, {language})\n\n",
        sanitize_heading(&place.name()),
        entry.score
    ));

    let details = [
        ("Type", Field::PlaceType),
        ("Area", Field::Region),
        ("Address", Field::Address),
        ("Hours", Field::OpeningHours),
        ("Price", Field::Price),
    ];
    for (label, field) in details {
        if let Some(value) = place.get(field) {
            output.push_str(&format!("- **{label}:** {}\n", value.trim()));
        }
    }

    if let Some(description) = place.get(Field::Description) {
        let description = description.trim();
        output.push('\n');
        match description.char_indices().nth(MAX_DESCRIPTION_CHARS) {
            Some((end, _)) => {
                output.push_str(&description[..end]);
                output.push_str("...");
            }
            None => output.push_str(description),
        }
        output.push('\n');
    }
    output.push('\n');
}

/// Replaces newlines, which would break heading structure, with spaces.
fn sanitize_heading(s: &str) -> String {
    s.chars()
        .map(|c| if c == '\n' || c == '\r' { ' ' } else { c })
        .collect()
}
