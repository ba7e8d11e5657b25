//! Reading and writing sitemap XML documents
//!
//! The on-disk format is the minimal sitemap protocol shape: a `urlset` (or
//! `sitemapindex`) root in the sitemap namespace containing `<url><loc>` (or
//! `<sitemap><loc>`) entries. The in-memory model is a typed ordered list of
//! loc strings, so a single-entry file is just a one-element list and never
//! ambiguous with an empty one.
//!
//! Loading never fails: a missing, unreadable, or malformed file yields a
//! fresh empty document so the next write re-derives the file. Saving is
//! best-effort: a failed write is logged and not propagated, and the next
//! run's read reveals the true on-disk state.

use quick_xml::events::{BytesDecl, BytesEnd, BytesStart, BytesText, Event};
use quick_xml::{Reader, Writer};
use std::path::Path;

/// Namespace required by the sitemap protocol.
pub const SITEMAP_XMLNS: &str = "http://www.sitemaps.org/schemas/sitemap/0.9";

/// The two sitemap document shapes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DocumentKind {
    /// `<urlset>` containing `<url><loc>` entries.
    UrlSet,
    /// `<sitemapindex>` containing `<sitemap><loc>` entries.
    SitemapIndex,
}

impl DocumentKind {
    fn root_tag(&self) -> &'static str {
        match self {
            DocumentKind::UrlSet => "urlset",
            DocumentKind::SitemapIndex => "sitemapindex",
        }
    }

    fn entry_tag(&self) -> &'static str {
        match self {
            DocumentKind::UrlSet => "url",
            DocumentKind::SitemapIndex => "sitemap",
        }
    }
}

/// An ordered sequence of loc entries with a fixed document shape.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SitemapDocument {
    kind: DocumentKind,
    entries: Vec<String>,
}

impl SitemapDocument {
    /// Create an empty document of the given shape.
    pub fn empty(kind: DocumentKind) -> Self {
        Self {
            kind,
            entries: Vec::new(),
        }
    }

    pub fn kind(&self) -> DocumentKind {
        self.kind
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn entries(&self) -> &[String] {
        &self.entries
    }

    pub fn contains(&self, loc: &str) -> bool {
        self.entries.iter().any(|e| e == loc)
    }

    /// Append a loc entry, preserving insertion order.
    pub fn push(&mut self, loc: impl Into<String>) {
        self.entries.push(loc.into());
    }

    /// Load the document at `path`, or an empty one of the requested shape
    /// if the file is missing, unreadable, or malformed.
    pub fn load(path: &Path, kind: DocumentKind) -> Self {
        match Self::parse_file(path, kind) {
            Ok(doc) => doc,
            Err(e) => {
                tracing::debug!(
                    "treating {} as empty {}: {e:#}",
                    path.display(),
                    kind.root_tag()
                );
                Self::empty(kind)
            }
        }
    }

    fn parse_file(path: &Path, kind: DocumentKind) -> anyhow::Result<Self> {
        let xml = std::fs::read_to_string(path)?;
        Self::parse_str(&xml, kind)
    }

    fn parse_str(xml: &str, kind: DocumentKind) -> anyhow::Result<Self> {
        let mut reader = Reader::from_str(xml);
        reader.config_mut().trim_text(true);

        let mut entries = Vec::new();
        let mut saw_root = false;
        let mut in_entry = false;
        let mut in_loc = false;
        let mut current: Option<String> = None;

        loop {
            match reader.read_event()? {
                Event::Start(e) => {
                    let name = e.name();
                    let tag = name.as_ref();
                    if !saw_root {
                        if tag != kind.root_tag().as_bytes() {
                            anyhow::bail!(
                                "unexpected root element <{}>",
                                String::from_utf8_lossy(tag)
                            );
                        }
                        saw_root = true;
                    } else if tag == kind.entry_tag().as_bytes() {
                        in_entry = true;
                        current = None;
                    } else if tag == b"loc" && in_entry {
                        in_loc = true;
                    }
                }
                Event::Text(t) if in_loc => {
                    current = Some(t.unescape()?.into_owned());
                }
                Event::End(e) => {
                    let name = e.name();
                    let tag = name.as_ref();
                    if tag == b"loc" {
                        in_loc = false;
                    } else if tag == kind.entry_tag().as_bytes() && in_entry {
                        in_entry = false;
                        if let Some(loc) = current.take() {
                            entries.push(loc);
                        }
                    }
                }
                Event::Eof => break,
                _ => {}
            }
        }

        if !saw_root {
            anyhow::bail!("missing <{}> root element", kind.root_tag());
        }

        Ok(Self { kind, entries })
    }

    /// Write the document to `path` as indented XML, overwriting any
    /// existing file. Failure is logged and not propagated.
    pub fn save(&self, path: &Path) {
        if let Err(e) = self.write_file(path) {
            tracing::warn!("failed to write sitemap {}: {e:#}", path.display());
        }
    }

    fn write_file(&self, path: &Path) -> anyhow::Result<()> {
        std::fs::write(path, self.to_xml()?)?;
        Ok(())
    }

    fn to_xml(&self) -> anyhow::Result<Vec<u8>> {
        let mut writer = Writer::new_with_indent(Vec::new(), b' ', 2);
        writer.write_event(Event::Decl(BytesDecl::new("1.0", Some("UTF-8"), None)))?;

        let mut root = BytesStart::new(self.kind.root_tag());
        root.push_attribute(("xmlns", SITEMAP_XMLNS));
        writer.write_event(Event::Start(root))?;

        for loc in &self.entries {
            writer.write_event(Event::Start(BytesStart::new(self.kind.entry_tag())))?;
            writer.write_event(Event::Start(BytesStart::new("loc")))?;
            writer.write_event(Event::Text(BytesText::new(loc)))?;
            writer.write_event(Event::End(BytesEnd::new("loc")))?;
            writer.write_event(Event::End(BytesEnd::new(self.kind.entry_tag())))?;
        }

        writer.write_event(Event::End(BytesEnd::new(self.kind.root_tag())))?;
        Ok(writer.into_inner())
    }
}
