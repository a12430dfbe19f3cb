//! TS catalog writer.

use quick_xml::escape::escape;

use super::model::{
    Catalog,
    Message,
    Translation,
};

/// Indentation used by `lupdate`.
const INDENT: &str = "    ";

/// Serialize a catalog to TS XML.
///
/// Locations are written with absolute line numbers. Characters XML 1.0 cannot
/// carry are written as `<byte value="x.."/>`.
#[must_use]
pub fn write(catalog: &Catalog) -> String {
    let mut out = String::with_capacity(catalog.message_count() * 256);

    out.push_str("<?xml version=\"1.0\" encoding=\"utf-8\"?>\n<!DOCTYPE TS>\n<TS");
    push_attribute(&mut out, "version", catalog.version.as_deref().unwrap_or("2.1"));
    if !catalog.language.is_empty() {
        push_attribute(&mut out, "language", &catalog.language);
    }
    if let Some(source_language) = &catalog.source_language {
        push_attribute(&mut out, "sourcelanguage", source_language);
    }
    out.push_str(">\n");

    for context in &catalog.contexts {
        out.push_str("<context>\n");
        push_element(&mut out, 1, "name", &context.name);
        for message in &context.messages {
            write_message(&mut out, message);
        }
        out.push_str("</context>\n");
    }

    out.push_str("</TS>\n");
    out
}

/// One `<message>` element.
fn write_message(out: &mut String, message: &Message) {
    out.push_str(INDENT);
    out.push_str("<message");
    if let Some(id) = &message.id {
        push_attribute(out, "id", id);
    }
    if message.is_plural() {
        push_attribute(out, "numerus", "yes");
    }
    out.push_str(">\n");

    for location in &message.locations {
        out.push_str(INDENT);
        out.push_str(INDENT);
        out.push_str("<location");
        push_attribute(out, "filename", &location.filename);
        if let Some(line) = location.line {
            push_attribute(out, "line", &line.to_string());
        }
        out.push_str("/>\n");
    }

    push_element(out, 2, "source", &message.source);
    if let Some(old_source) = &message.old_source {
        push_element(out, 2, "oldsource", old_source);
    }
    if let Some(disambiguator) = &message.disambiguator {
        push_element(out, 2, "comment", disambiguator);
    }
    if let Some(extra_comment) = &message.extra_comment {
        push_element(out, 2, "extracomment", extra_comment);
    }
    if let Some(translator_comment) = &message.translator_comment {
        push_element(out, 2, "translatorcomment", translator_comment);
    }

    out.push_str(INDENT);
    out.push_str(INDENT);
    out.push_str("<translation");
    if let Some(kind) = message.status.type_attribute() {
        push_attribute(out, "type", kind);
    }
    match &message.translation {
        Translation::Single(text) if text.is_empty() => out.push_str("/>\n"),
        Translation::Single(text) => {
            out.push('>');
            push_text(out, text);
            out.push_str("</translation>\n");
        }
        Translation::Plural(forms) if forms.is_empty() => {
            out.push_str("><numerusform></numerusform></translation>\n");
        }
        Translation::Plural(forms) => {
            out.push('>');
            for form in forms {
                out.push_str("<numerusform>");
                push_text(out, form);
                out.push_str("</numerusform>");
            }
            out.push_str("</translation>\n");
        }
    }

    out.push_str(INDENT);
    out.push_str("</message>\n");
}

/// `<tag>text</tag>` on its own line.
fn push_element(out: &mut String, depth: usize, tag: &str, text: &str) {
    for _ in 0..depth {
        out.push_str(INDENT);
    }
    out.push('<');
    out.push_str(tag);
    out.push('>');
    push_text(out, text);
    out.push_str("</");
    out.push_str(tag);
    out.push_str(">\n");
}

/// ` key="value"` with the value escaped.
fn push_attribute(out: &mut String, key: &str, value: &str) {
    out.push(' ');
    out.push_str(key);
    out.push_str("=\"");
    out.push_str(&escape(value));
    out.push('"');
}

/// Escapes text content, emitting `<byte>` for control characters and `\r`.
fn push_text(out: &mut String, text: &str) {
    let mut rest = text;
    while let Some(position) = rest.find(is_unrepresentable) {
        let (plain, tail) = rest.split_at(position);
        out.push_str(&escape(plain));
        let mut chars = tail.chars();
        if let Some(ch) = chars.next() {
            out.push_str(&format!("<byte value=\"x{:x}\"/>", u32::from(ch)));
        }
        rest = chars.as_str();
    }
    out.push_str(&escape(rest));
}

/// Characters that XML 1.0 forbids, plus `\r`, which readers fold into `\n`.
const fn is_unrepresentable(ch: char) -> bool {
    ch.is_ascii_control() && !matches!(ch, '\t' | '\n')
}
