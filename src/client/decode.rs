//! Atom feed decoder for arXiv API responses.
//!
//! One streaming pass with a namespace-aware reader. Every element the decoder
//! cares about is listed in a static table keyed by `(namespace, local name)`
//! and the direct parent it may appear under; anything else, including
//! elements whose local name collides with a bound one from another
//! namespace, is skipped with its whole subtree.

use quick_xml::events::{BytesStart, Event};
use quick_xml::name::ResolveResult;
use quick_xml::NsReader;
use std::io::BufRead;

use crate::models::{Author, Category, Entry, Feed, Link};

pub const ATOM_NS: &[u8] = b"http://www.w3.org/2005/Atom";
pub const OPENSEARCH_NS: &[u8] = b"http://a9.com/-/spec/opensearch/1.1/";
pub const ARXIV_NS: &[u8] = b"http://arxiv.org/schemas/atom";

/// Errors that can occur while decoding a feed
#[derive(Debug, thiserror::Error)]
pub enum DecodeError {
    /// Malformed XML: mismatched tags, bad entities, broken markup
    #[error("XML: {0}")]
    Xml(#[from] quick_xml::Error),

    #[error("Invalid UTF-8 in {0}")]
    Utf8(&'static str),

    #[error("Invalid integer in <{element}>: {value:?}")]
    InvalidInteger {
        element: &'static str,
        value: String,
    },

    #[error("Expected <feed> root element, found <{0}>")]
    UnexpectedRoot(String),

    #[error("Unexpected end of document inside <{0}>")]
    UnexpectedEof(String),

    #[error("Document has no root element")]
    Empty,
}

impl From<quick_xml::events::attributes::AttrError> for DecodeError {
    fn from(err: quick_xml::events::attributes::AttrError) -> Self {
        DecodeError::Xml(err.into())
    }
}

/// Namespace an element resolved to
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Ns {
    Atom,
    OpenSearch,
    Arxiv,
    /// No namespace in scope; treated as Atom
    None,
    Other,
}

impl Ns {
    fn classify(resolved: &ResolveResult<'_>) -> Self {
        match resolved {
            ResolveResult::Bound(ns) if ns.0 == ATOM_NS => Ns::Atom,
            ResolveResult::Bound(ns) if ns.0 == OPENSEARCH_NS => Ns::OpenSearch,
            ResolveResult::Bound(ns) if ns.0 == ARXIV_NS => Ns::Arxiv,
            ResolveResult::Unbound => Ns::None,
            _ => Ns::Other,
        }
    }

    fn matches(self, want: Ns) -> bool {
        self == want || (want == Ns::Atom && self == Ns::None)
    }
}

/// Character-data fields
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Text {
    FeedTitle,
    FeedId,
    FeedUpdated,
    TotalResults,
    StartIndex,
    ItemsPerPage,
    EntryId,
    EntryPublished,
    EntryUpdated,
    EntryTitle,
    EntrySummary,
    Comment,
    JournalRef,
    Doi,
    AuthorName,
    Affiliation,
}

/// What a bound element decodes into
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Slot {
    Entry,
    Author,
    FeedLink,
    EntryLink,
    PrimaryCategory,
    Category,
    Text(Text),
}

struct Binding {
    ns: Ns,
    local: &'static [u8],
    slot: Slot,
}

const fn bind(ns: Ns, local: &'static [u8], slot: Slot) -> Binding {
    Binding { ns, local, slot }
}

const FEED_CHILDREN: &[Binding] = &[
    bind(Ns::Atom, b"title", Slot::Text(Text::FeedTitle)),
    bind(Ns::Atom, b"id", Slot::Text(Text::FeedId)),
    bind(Ns::Atom, b"updated", Slot::Text(Text::FeedUpdated)),
    bind(Ns::Atom, b"link", Slot::FeedLink),
    bind(Ns::Atom, b"entry", Slot::Entry),
    bind(Ns::OpenSearch, b"totalResults", Slot::Text(Text::TotalResults)),
    bind(Ns::OpenSearch, b"startIndex", Slot::Text(Text::StartIndex)),
    bind(Ns::OpenSearch, b"itemsPerPage", Slot::Text(Text::ItemsPerPage)),
];

const ENTRY_CHILDREN: &[Binding] = &[
    bind(Ns::Atom, b"id", Slot::Text(Text::EntryId)),
    bind(Ns::Atom, b"published", Slot::Text(Text::EntryPublished)),
    bind(Ns::Atom, b"updated", Slot::Text(Text::EntryUpdated)),
    bind(Ns::Atom, b"title", Slot::Text(Text::EntryTitle)),
    bind(Ns::Atom, b"summary", Slot::Text(Text::EntrySummary)),
    bind(Ns::Atom, b"author", Slot::Author),
    bind(Ns::Atom, b"link", Slot::EntryLink),
    bind(Ns::Arxiv, b"primary_category", Slot::PrimaryCategory),
    bind(Ns::Arxiv, b"category", Slot::Category),
    bind(Ns::Arxiv, b"comment", Slot::Text(Text::Comment)),
    bind(Ns::Arxiv, b"journal_ref", Slot::Text(Text::JournalRef)),
    bind(Ns::Arxiv, b"doi", Slot::Text(Text::Doi)),
];

const AUTHOR_CHILDREN: &[Binding] = &[
    bind(Ns::Atom, b"name", Slot::Text(Text::AuthorName)),
    bind(Ns::Arxiv, b"affiliation", Slot::Text(Text::Affiliation)),
];

fn lookup(table: &[Binding], ns: Ns, local: &[u8]) -> Option<Slot> {
    table
        .iter()
        .find(|b| b.local == local && ns.matches(b.ns))
        .map(|b| b.slot)
}

/// Open element on the decode stack
#[derive(Debug, Clone, Copy)]
enum Scope {
    Feed,
    Entry,
    Author,
    Text(Text),
    /// Unbound element, or any element nested inside a text field
    Skip,
}

struct Decoder {
    feed: Feed,
    entry: Entry,
    author: Author,
    text: String,
    stack: Vec<Scope>,
    /// Qualified name of each open element, for error reporting
    names: Vec<String>,
    done: bool,
}

impl Decoder {
    fn new() -> Self {
        Self {
            feed: Feed::default(),
            entry: Entry::default(),
            author: Author::default(),
            text: String::new(),
            stack: Vec::new(),
            names: Vec::new(),
            done: false,
        }
    }

    fn open(&mut self, ns: Ns, e: &BytesStart<'_>) -> Result<(), DecodeError> {
        let local = e.local_name();
        let local = local.as_ref();

        let scope = match self.stack.last().copied() {
            None => {
                if local != b"feed" || !ns.matches(Ns::Atom) {
                    return Err(DecodeError::UnexpectedRoot(
                        String::from_utf8_lossy(e.name().as_ref()).into_owned(),
                    ));
                }
                Scope::Feed
            }
            Some(Scope::Feed) => self.open_child(FEED_CHILDREN, ns, e)?,
            Some(Scope::Entry) => self.open_child(ENTRY_CHILDREN, ns, e)?,
            Some(Scope::Author) => self.open_child(AUTHOR_CHILDREN, ns, e)?,
            Some(Scope::Text(_)) | Some(Scope::Skip) => Scope::Skip,
        };

        self.names
            .push(String::from_utf8_lossy(e.name().as_ref()).into_owned());
        self.stack.push(scope);
        Ok(())
    }

    fn open_child(
        &mut self,
        table: &[Binding],
        ns: Ns,
        e: &BytesStart<'_>,
    ) -> Result<Scope, DecodeError> {
        let Some(slot) = lookup(table, ns, e.local_name().as_ref()) else {
            return Ok(Scope::Skip);
        };

        Ok(match slot {
            Slot::Entry => {
                self.entry = Entry::default();
                Scope::Entry
            }
            Slot::Author => {
                self.author = Author::default();
                Scope::Author
            }
            Slot::FeedLink => {
                self.feed.links.push(read_link(e)?);
                Scope::Skip
            }
            Slot::EntryLink => {
                self.entry.links.push(read_link(e)?);
                Scope::Skip
            }
            Slot::PrimaryCategory => {
                self.entry.primary_category = read_category(e)?;
                Scope::Skip
            }
            Slot::Category => {
                self.entry.categories.push(read_category(e)?);
                Scope::Skip
            }
            Slot::Text(field) => {
                self.text.clear();
                Scope::Text(field)
            }
        })
    }

    fn close(&mut self) -> Result<(), DecodeError> {
        self.names.pop();
        match self.stack.pop() {
            Some(Scope::Feed) => self.done = true,
            Some(Scope::Entry) => {
                let entry = std::mem::take(&mut self.entry);
                self.feed.entries.push(entry);
            }
            Some(Scope::Author) => {
                let author = std::mem::take(&mut self.author);
                self.entry.authors.push(author);
            }
            Some(Scope::Text(field)) => {
                let text = std::mem::take(&mut self.text);
                self.store(field, text)?;
            }
            Some(Scope::Skip) | None => {}
        }
        Ok(())
    }

    fn store(&mut self, field: Text, text: String) -> Result<(), DecodeError> {
        match field {
            Text::FeedTitle => self.feed.title = text,
            Text::FeedId => self.feed.id = text,
            Text::FeedUpdated => self.feed.updated = text,
            Text::TotalResults => self.feed.total_results = parse_int("totalResults", &text)?,
            Text::StartIndex => self.feed.start_index = parse_int("startIndex", &text)?,
            Text::ItemsPerPage => self.feed.items_per_page = parse_int("itemsPerPage", &text)?,
            Text::EntryId => self.entry.id = text,
            Text::EntryPublished => self.entry.published = text,
            Text::EntryUpdated => self.entry.updated = text,
            Text::EntryTitle => self.entry.title = text,
            Text::EntrySummary => self.entry.summary = text,
            Text::Comment => self.entry.comment = text,
            Text::JournalRef => self.entry.journal_ref = text,
            Text::Doi => self.entry.doi = text,
            Text::AuthorName => self.author.name = text,
            Text::Affiliation => self.author.affiliation = text,
        }
        Ok(())
    }

    /// Character data only counts directly inside a text field
    fn capturing(&self) -> bool {
        matches!(self.stack.last(), Some(Scope::Text(_)))
    }
}

fn parse_int(element: &'static str, text: &str) -> Result<i64, DecodeError> {
    let trimmed = text.trim();
    if trimmed.is_empty() {
        return Ok(0);
    }
    trimmed
        .parse()
        .map_err(|_| DecodeError::InvalidInteger {
            element,
            value: text.to_string(),
        })
}

fn read_link(e: &BytesStart<'_>) -> Result<Link, DecodeError> {
    let mut link = Link::default();
    for attr in e.attributes() {
        let attr = attr?;
        let target = match attr.key.local_name().as_ref() {
            b"href" => &mut link.href,
            b"rel" => &mut link.rel,
            b"type" => &mut link.media_type,
            b"title" => &mut link.title,
            _ => continue,
        };
        *target = attr.unescape_value()?.into_owned();
    }
    Ok(link)
}

fn read_category(e: &BytesStart<'_>) -> Result<Category, DecodeError> {
    let mut category = Category::default();
    for attr in e.attributes() {
        let attr = attr?;
        let target = match attr.key.local_name().as_ref() {
            b"term" => &mut category.term,
            b"scheme" => &mut category.scheme,
            _ => continue,
        };
        *target = attr.unescape_value()?.into_owned();
    }
    Ok(category)
}

/// Decode an arXiv Atom feed from a buffered reader.
///
/// Either the whole feed decodes or an error is returned; no partial results.
/// Reading stops once the root element closes.
pub fn decode_feed<R: BufRead>(input: R) -> Result<Feed, DecodeError> {
    let mut reader = NsReader::from_reader(input);
    let mut decoder = Decoder::new();
    let mut buf = Vec::new();

    while !decoder.done {
        let (resolved, event) = reader.read_resolved_event_into(&mut buf)?;
        let ns = Ns::classify(&resolved);

        match event {
            Event::Start(e) => decoder.open(ns, &e)?,
            Event::Empty(e) => {
                decoder.open(ns, &e)?;
                decoder.close()?;
            }
            Event::End(_) => decoder.close()?,
            Event::Text(e) if decoder.capturing() => {
                decoder.text.push_str(&e.unescape()?);
            }
            Event::CData(e) if decoder.capturing() => {
                let raw = e.into_inner();
                let text =
                    std::str::from_utf8(&raw).map_err(|_| DecodeError::Utf8("CDATA section"))?;
                decoder.text.push_str(text);
            }
            Event::Eof => {
                return Err(match decoder.names.last() {
                    Some(open) => DecodeError::UnexpectedEof(open.clone()),
                    None => DecodeError::Empty,
                });
            }
            _ => {}
        }
        buf.clear();
    }

    Ok(decoder.feed)
}

/// [`decode_feed`] over an in-memory document
pub fn decode_feed_str(xml: &str) -> Result<Feed, DecodeError> {
    decode_feed(xml.as_bytes())
}
