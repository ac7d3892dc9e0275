use crate::sitemap::SitemapEntry;
use crate::StockpileError;
use quick_xml::events::Event;
use quick_xml::Reader;

/// Which element's character data we are currently inside
enum Field {
    None,
    Loc,
    LastMod,
}

/// Parses sitemap XML into an ordered list of entries
///
/// Walks the document event-by-event, collecting `<loc>` and optional
/// `<lastmod>` for every `<url>` element. Document order is preserved; a
/// `<url>` without a `<loc>` is dropped. A well-formed document with no
/// `<url>` elements yields an empty list.
///
/// # Arguments
///
/// * `xml` - The raw sitemap document
///
/// # Returns
///
/// * `Ok(Vec<SitemapEntry>)` - Entries in document order
/// * `Err(StockpileError::SitemapParse)` - The document is not well-formed XML
pub fn parse_sitemap(xml: &str) -> Result<Vec<SitemapEntry>, StockpileError> {
    let mut reader = Reader::from_str(xml);

    let mut entries = Vec::new();
    let mut field = Field::None;
    let mut text = String::new();
    let mut loc: Option<String> = None;
    let mut lastmod: Option<String> = None;

    loop {
        match reader.read_event() {
            Ok(Event::Start(e)) => {
                // Compare against the local name suffix so a namespace
                // prefix on the sitemap tags does not break matching
                let name = e.name();
                let name = name.as_ref();
                if name.ends_with(b"lastmod") {
                    field = Field::LastMod;
                    text.clear();
                } else if name.ends_with(b"loc") {
                    field = Field::Loc;
                    text.clear();
                } else if name.ends_with(b"url") {
                    loc = None;
                    lastmod = None;
                }
            }
            Ok(Event::End(e)) => {
                let name = e.name();
                let name = name.as_ref();
                if name.ends_with(b"lastmod") || name.ends_with(b"loc") {
                    let value = text.trim();
                    if !value.is_empty() {
                        match field {
                            Field::Loc => loc = Some(value.to_string()),
                            Field::LastMod => lastmod = Some(value.to_string()),
                            Field::None => {}
                        }
                    }
                    field = Field::None;
                    text.clear();
                } else if name.ends_with(b"url") {
                    if let Some(location) = loc.take() {
                        entries.push(SitemapEntry {
                            location,
                            last_modified: lastmod.take(),
                        });
                    }
                    lastmod = None;
                }
            }
            // Character data may arrive in more than one chunk
            Ok(Event::Text(t)) => {
                if !matches!(field, Field::None) {
                    text.push_str(
                        &t.unescape()
                            .map_err(|e| StockpileError::SitemapParse(e.to_string()))?,
                    );
                }
            }
            Ok(Event::Eof) => break,
            Err(e) => return Err(StockpileError::SitemapParse(e.to_string())),
            _ => {}
        }
    }

    Ok(entries)
}
