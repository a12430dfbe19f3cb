//! TS catalog reader.
//!
//! Streams the document with `quick-xml` and keeps a stack of open elements so
//! that `<context>` and `<message>` nesting can be validated. Unknown elements
//! and attributes are skipped.

use std::collections::HashMap;

use quick_xml::Reader;
use quick_xml::events::{
    BytesStart,
    Event,
};

use super::error::{
    ParseError,
    ParseErrorKind,
};
use super::model::{
    Catalog,
    Context,
    Message,
    MessageStatus,
    Translation,
};
use crate::types::Location;

/// Parse a serialized TS catalog.
///
/// # Errors
/// - [`ParseErrorKind::Malformed`]: invalid XML, unclosed elements, or wrong nesting
///   of `<context>` / `<message>`
/// - [`ParseErrorKind::MissingPluralForms`]: a plural message without variants
pub fn parse(bytes: &[u8]) -> Result<Catalog, ParseError> {
    let catalog = CatalogReader::new(bytes).read()?;
    tracing::debug!(
        language = %catalog.language,
        contexts = catalog.contexts.len(),
        messages = catalog.message_count(),
        "Parsed catalog"
    );
    Ok(catalog)
}

/// Kind of an open element; only the ones the reader acts on are distinguished.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Element {
    /// `<TS>`
    Root,
    /// `<context>`
    Context,
    /// `<name>` of a context
    ContextName,
    /// `<message>`
    Message,
    /// A text child of `<message>`
    Field(Field),
    /// `<translation>`
    Translation,
    /// `<numerusform>`
    NumerusForm,
    /// `<lengthvariant>`
    LengthVariant,
    /// Anything that is skipped
    Other,
}

/// Text children of `<message>` that end up on [`Message`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Field {
    /// `<source>`
    Source,
    /// `<comment>` (the disambiguator)
    Comment,
    /// `<oldsource>`
    OldSource,
    /// `<extracomment>`
    ExtraComment,
    /// `<translatorcomment>`
    TranslatorComment,
}

impl Field {
    /// Maps a tag name to a field, `None` for anything else.
    fn from_tag(tag: &[u8]) -> Option<Self> {
        match tag {
            b"source" => Some(Self::Source),
            b"comment" => Some(Self::Comment),
            b"oldsource" => Some(Self::OldSource),
            b"extracomment" => Some(Self::ExtraComment),
            b"translatorcomment" => Some(Self::TranslatorComment),
            _ => None,
        }
    }
}

/// Text collected for the innermost text-bearing element.
#[derive(Debug, Default)]
struct TextCapture {
    /// Text and `<byte>` characters seen so far.
    text: String,
    /// First `<lengthvariant>` child, which takes precedence over `text`.
    first_variant: Option<String>,
    /// The last character appended from document text was `\r`.
    after_cr: bool,
}

impl TextCapture {
    /// Appends document text with `\r\n` and a lone `\r` folded into `\n` (XML 1.0 §2.11).
    fn push_text(&mut self, text: &str) {
        for ch in text.chars() {
            match ch {
                '\r' => self.text.push('\n'),
                '\n' if self.after_cr => {}
                _ => self.text.push(ch),
            }
            self.after_cr = ch == '\r';
        }
    }

    /// Appends a character given by `<byte>`, which is never folded.
    fn push_char(&mut self, ch: char) {
        self.text.push(ch);
        self.after_cr = false;
    }

    /// Final text of the element.
    fn into_text(self) -> String {
        self.first_variant.unwrap_or(self.text)
    }
}

/// Message being assembled between `<message>` and `</message>`.
#[derive(Debug)]
struct MessageDraft {
    /// Everything but the translation.
    message: Message,
    /// `numerus="yes"`
    numerus: bool,
    /// Whether a `<translation>` element was seen.
    has_translation: bool,
    /// Text of a non-plural `<translation>`.
    single: Option<String>,
    /// `<numerusform>` texts in order.
    forms: Vec<String>,
    /// Byte offset of the `<message>` start tag.
    offset: u64,
}

/// Resolves `lupdate`'s relative location notation to absolute positions.
///
/// `<location line="+3"/>` without a filename refers to the previous file, and
/// signed lines are relative to the previous line seen for that file.
#[derive(Debug, Default)]
struct LocationTracker {
    /// File of the previous location.
    current_file: Option<String>,
    /// Last absolute line per file.
    lines: HashMap<String, i64>,
}

impl LocationTracker {
    /// Absolute location for one `<location>` element, `None` when no file is known yet.
    fn resolve(&mut self, filename: Option<String>, line: Option<&str>) -> Option<Location> {
        let file = filename.or_else(|| self.current_file.clone())?;
        self.current_file = Some(file.clone());

        let line = line.map(str::trim).and_then(|raw| {
            let value = raw.parse::<i64>().ok()?;
            let absolute = if raw.starts_with(['+', '-']) {
                self.lines.get(&file).copied().unwrap_or(0) + value
            } else {
                value
            };
            self.lines.insert(file.clone(), absolute);
            u32::try_from(absolute).ok()
        });

        Some(Location { filename: file, line })
    }
}

/// Streaming reader state.
struct CatalogReader<'a> {
    /// Underlying XML reader.
    reader: Reader<&'a [u8]>,
    /// Open elements with their tag names, innermost last.
    open: Vec<(Element, String)>,
    /// Text buffers of the open text-bearing elements.
    captures: Vec<TextCapture>,
    /// Set once `<TS>` is seen.
    catalog: Option<Catalog>,
    /// Context being read.
    context: Option<Context>,
    /// Message being read.
    message: Option<MessageDraft>,
    /// Relative `<location>` state, shared by the whole document.
    locations: LocationTracker,
}

impl<'a> CatalogReader<'a> {
    /// Reader over `bytes` that keeps whitespace in text.
    fn new(bytes: &'a [u8]) -> Self {
        let mut reader = Reader::from_reader(bytes);
        reader.config_mut().trim_text(false);
        Self {
            reader,
            open: Vec::new(),
            captures: Vec::new(),
            catalog: None,
            context: None,
            message: None,
            locations: LocationTracker::default(),
        }
    }

    /// Consumes the whole document.
    fn read(mut self) -> Result<Catalog, ParseError> {
        loop {
            let event = self.reader.read_event().map_err(|e| {
                ParseError::malformed(format!("invalid XML: {e}"), self.reader.error_position())
            })?;

            match event {
                Event::Start(start) => self.open_element(&start)?,
                Event::Empty(start) => {
                    self.open_element(&start)?;
                    self.close_element()?;
                }
                Event::End(_) => self.close_element()?,
                Event::Text(text) => {
                    if !self.captures.is_empty() {
                        let decoded = text
                            .unescape()
                            .map_err(|e| self.malformed(format!("invalid text content: {e}")))?;
                        self.push_text(&decoded);
                    }
                }
                Event::CData(data) => {
                    if !self.captures.is_empty() {
                        let raw = data.into_inner();
                        let decoded = std::str::from_utf8(&raw)
                            .map_err(|e| self.malformed(format!("invalid CDATA content: {e}")))?;
                        self.push_text(decoded);
                    }
                }
                Event::Eof => break,
                _ => {}
            }
        }

        if let Some((_, tag)) = self.open.last() {
            return Err(self.malformed(format!("unexpected end of input: <{tag}> is not closed")));
        }

        self.catalog.ok_or_else(|| {
            ParseError::malformed("missing <TS> root element", self.reader.buffer_position())
        })
    }

    /// Malformed error at the current reader position.
    fn malformed(&self, reason: impl Into<String>) -> ParseError {
        ParseError::malformed(reason, self.reader.buffer_position())
    }

    /// Appends to the innermost capture.
    fn push_text(&mut self, text: &str) {
        if let Some(capture) = self.captures.last_mut() {
            capture.push_text(text);
        }
    }

    /// Starts collecting text for a new element.
    fn begin_capture(&mut self) {
        self.captures.push(TextCapture::default());
    }

    /// Stops collecting and returns the element's text.
    fn end_capture(&mut self) -> String {
        self.captures.pop().map(TextCapture::into_text).unwrap_or_default()
    }

    /// Handles a start tag, validating where it may appear.
    fn open_element(&mut self, start: &BytesStart<'_>) -> Result<(), ParseError> {
        let qname = start.name();
        let tag = qname.as_ref();
        let parent = self.open.last().map(|(element, _)| *element);

        let element = match (parent, tag) {
            (None, b"TS") => {
                if self.catalog.is_some() {
                    return Err(self.malformed("multiple root elements"));
                }
                self.catalog = Some(Catalog {
                    language: self.attribute(start, b"language")?.unwrap_or_default(),
                    source_language: self.attribute(start, b"sourcelanguage")?,
                    version: self.attribute(start, b"version")?,
                    contexts: Vec::new(),
                });
                Element::Root
            }
            (None, _) => {
                return Err(self.malformed(format!(
                    "expected <TS> root element, found <{}>",
                    String::from_utf8_lossy(tag)
                )));
            }
            (Some(Element::Root), b"context") => {
                self.context = Some(Context::default());
                Element::Context
            }
            (_, b"context") => {
                return Err(self.malformed("<context> must be a direct child of <TS>"));
            }
            (Some(Element::Context), b"name") => {
                self.begin_capture();
                Element::ContextName
            }
            (Some(Element::Context), b"message") => {
                self.message = Some(self.start_message(start)?);
                Element::Message
            }
            (_, b"message") => {
                return Err(self.malformed("<message> must be a direct child of <context>"));
            }
            (Some(Element::Message), b"location") => {
                let filename = self.attribute(start, b"filename")?;
                let line = self.attribute(start, b"line")?;
                if let Some(location) = self.locations.resolve(filename, line.as_deref())
                    && let Some(draft) = self.message.as_mut()
                {
                    draft.message.locations.push(location);
                }
                Element::Other
            }
            (Some(Element::Message), b"translation") => {
                let status = self
                    .attribute(start, b"type")?
                    .map_or(MessageStatus::Translated, |value| {
                        MessageStatus::from_type_attribute(&value)
                    });
                if let Some(draft) = self.message.as_mut() {
                    draft.has_translation = true;
                    draft.message.status = status;
                }
                self.begin_capture();
                Element::Translation
            }
            (Some(Element::Message), _) => match Field::from_tag(tag) {
                Some(field) => {
                    self.begin_capture();
                    Element::Field(field)
                }
                None => Element::Other,
            },
            (Some(Element::Translation), b"numerusform") => {
                self.begin_capture();
                Element::NumerusForm
            }
            (Some(Element::Translation | Element::NumerusForm), b"lengthvariant") => {
                self.begin_capture();
                Element::LengthVariant
            }
            (_, b"byte") if !self.captures.is_empty() => {
                let raw = self.attribute(start, b"value")?.unwrap_or_default();
                let ch = decode_byte_value(&raw)
                    .ok_or_else(|| self.malformed(format!("invalid <byte> value '{raw}'")))?;
                if let Some(capture) = self.captures.last_mut() {
                    capture.push_char(ch);
                }
                Element::Other
            }
            _ => Element::Other,
        };

        self.open.push((element, String::from_utf8_lossy(tag).into_owned()));
        Ok(())
    }

    /// Handles an end tag, moving collected data into its parent.
    fn close_element(&mut self) -> Result<(), ParseError> {
        let Some((element, _)) = self.open.pop() else {
            return Err(self.malformed("unexpected closing tag"));
        };

        match element {
            Element::Root | Element::Other => {}
            Element::Context => {
                if let (Some(context), Some(catalog)) = (self.context.take(), self.catalog.as_mut())
                {
                    catalog.contexts.push(context);
                }
            }
            Element::ContextName => {
                let name = self.end_capture();
                if let Some(context) = self.context.as_mut() {
                    context.name = name;
                }
            }
            Element::Message => {
                if let Some(draft) = self.message.take() {
                    let message = self.finish_message(draft)?;
                    if let Some(context) = self.context.as_mut() {
                        context.messages.push(message);
                    }
                }
            }
            Element::Field(field) => {
                let text = self.end_capture();
                if let Some(draft) = self.message.as_mut() {
                    let message = &mut draft.message;
                    match field {
                        Field::Source => message.source = text,
                        Field::Comment => message.disambiguator = Some(text),
                        Field::OldSource => message.old_source = Some(text),
                        Field::ExtraComment => message.extra_comment = Some(text),
                        Field::TranslatorComment => message.translator_comment = Some(text),
                    }
                }
            }
            Element::Translation => {
                let text = self.end_capture();
                if let Some(draft) = self.message.as_mut()
                    && !draft.numerus
                {
                    draft.single = Some(text);
                }
            }
            Element::NumerusForm => {
                let text = self.end_capture();
                if let Some(draft) = self.message.as_mut() {
                    draft.forms.push(text);
                }
            }
            Element::LengthVariant => {
                let text = self.end_capture();
                if let Some(parent) = self.captures.last_mut()
                    && parent.first_variant.is_none()
                {
                    parent.first_variant = Some(text);
                }
            }
        }

        Ok(())
    }

    /// Draft for a `<message>` start tag.
    fn start_message(&self, start: &BytesStart<'_>) -> Result<MessageDraft, ParseError> {
        let numerus = self.attribute(start, b"numerus")?.is_some_and(|value| value == "yes");
        let id = self.attribute(start, b"id")?;
        Ok(MessageDraft {
            message: Message { id, ..Message::default() },
            numerus,
            has_translation: false,
            single: None,
            forms: Vec::new(),
            offset: self.reader.buffer_position(),
        })
    }

    /// Builds the message once `</message>` is reached.
    fn finish_message(&self, draft: MessageDraft) -> Result<Message, ParseError> {
        let MessageDraft { mut message, numerus, has_translation, single, forms, offset } = draft;

        message.translation = if numerus {
            if forms.is_empty() {
                return Err(ParseError {
                    kind: ParseErrorKind::MissingPluralForms {
                        context: self.context.as_ref().map(|c| c.name.clone()).unwrap_or_default(),
                        source_text: message.source,
                    },
                    offset,
                });
            }
            Translation::Plural(forms)
        } else {
            Translation::Single(single.unwrap_or_default())
        };

        if !has_translation {
            message.status = MessageStatus::Unfinished;
        }

        Ok(message)
    }

    /// Returns the unescaped value of an attribute, ignoring every other attribute.
    fn attribute(&self, start: &BytesStart<'_>, key: &[u8]) -> Result<Option<String>, ParseError> {
        for attribute in start.attributes() {
            let attribute =
                attribute.map_err(|e| self.malformed(format!("invalid attribute: {e}")))?;
            if attribute.key.as_ref() == key {
                let value = attribute
                    .unescape_value()
                    .map_err(|e| self.malformed(format!("invalid attribute value: {e}")))?;
                return Ok(Some(value.into_owned()));
            }
        }
        Ok(None)
    }
}

/// Decodes `<byte value="..">`: hexadecimal with an `x` prefix, decimal otherwise.
fn decode_byte_value(raw: &str) -> Option<char> {
    let raw = raw.trim();
    let code = match raw.strip_prefix(['x', 'X']) {
        Some(hex) => u32::from_str_radix(hex, 16).ok()?,
        None => raw.parse::<u32>().ok()?,
    };
    char::from_u32(code)
}
