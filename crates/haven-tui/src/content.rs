//! Rich-content model for assistant responses.
//!
//! Response text is markdown-like with a few conventions layered on top:
//! image galleries wrapped in a `<div class="carousel">`, map links whose
//! path starts with the reserved `map` segment, and listing links whose host
//! is a known agency domain. [`format_content`] turns raw text into a
//! structural block list; it is a pure function of its inputs, so it can run
//! on every render frame while the text is still streaming.

use pulldown_cmark::{Event, Options, Parser, Tag, TagEnd};
use url::Url;

/// Hosts whose links represent lettings listings and get a like toggle
pub const LISTING_DOMAINS: [&str; 7] = [
    "www.winkworth.co.uk",
    "search.savills.com",
    "www.knightfrank.co.uk",
    "www.hamptons.co.uk",
    "www.kfh.co.uk",
    "www.chestertons.co.uk",
    "www.dexters.co.uk",
];

/// One block-level piece of a response
#[derive(Debug, Clone, PartialEq)]
pub enum ContentBlock {
    Paragraph(Vec<Inline>),
    Heading { level: u8, text: String },
    /// Bullet list; one inline run per item
    List(Vec<Vec<Inline>>),
    /// An image rendered as a gallery link carrying its caption
    Image { url: String, caption: String },
    /// A paged image gallery; one slide visible at a time
    Carousel { slides: Vec<ImageSlide> },
    Table { header: Vec<String>, rows: Vec<Vec<String>> },
}

/// A slide inside a carousel
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImageSlide {
    pub url: String,
    pub caption: String,
}

/// One inline-level piece of a paragraph or list item
#[derive(Debug, Clone, PartialEq)]
pub enum Inline {
    Text(String),
    Strong(String),
    Emphasis(String),
    Code(String),
    Link {
        text: String,
        url: String,
        kind: LinkKind,
    },
}

/// What a link means, decided at format time
#[derive(Debug, Clone, PartialEq)]
pub enum LinkKind {
    Plain,
    /// A lettings listing; `liked` mirrors whether the exact URL is saved
    Listing { liked: bool },
    /// A map link, already parsed to coordinates
    MapPin { latitude: f64, longitude: f64 },
}

/// Parse the coordinates out of a map link (`…/map/<lat>,<lon>`)
pub fn parse_map_link(url: &str) -> Option<(f64, f64)> {
    let parsed = Url::parse(url).ok()?;
    let mut segments = parsed.path_segments()?;
    if segments.next()? != "map" {
        return None;
    }
    let (lat, lon) = segments.next()?.split_once(',')?;
    Some((lat.trim().parse().ok()?, lon.trim().parse().ok()?))
}

fn classify_link(url: &str, saved_urls: &[String], domains: &[&str]) -> LinkKind {
    if let Some((latitude, longitude)) = parse_map_link(url) {
        return LinkKind::MapPin {
            latitude,
            longitude,
        };
    }
    if let Ok(parsed) = Url::parse(url)
        && let Some(host) = parsed.host_str()
        && domains.contains(&host)
    {
        return LinkKind::Listing {
            liked: saved_urls.iter().any(|s| s == url),
        };
    }
    LinkKind::Plain
}

/// Pull `<img src alt>` tags out of a raw HTML fragment
fn extract_img_tags(html: &str) -> Vec<ImageSlide> {
    let mut slides = vec![];
    let mut rest = html;
    while let Some(pos) = rest.find("<img") {
        rest = &rest[pos + 4..];
        let end = rest.find('>').unwrap_or(rest.len());
        let tag = &rest[..end];
        if let Some(url) = html_attr(tag, "src") {
            slides.push(ImageSlide {
                url,
                caption: html_attr(tag, "alt").unwrap_or_default(),
            });
        }
        rest = &rest[end.min(rest.len())..];
    }
    slides
}

fn html_attr(tag: &str, name: &str) -> Option<String> {
    let needle = format!("{name}=\"");
    let start = tag.find(&needle)? + needle.len();
    let end = tag[start..].find('"')? + start;
    Some(tag[start..end].to_string())
}

struct Formatter<'a> {
    saved_urls: &'a [String],
    domains: &'a [&'a str],
    blocks: Vec<ContentBlock>,
    inlines: Vec<Inline>,
    // carousel region, collecting slides instead of blocks
    carousel: Option<Vec<ImageSlide>>,
    // in-flight inline state
    link: Option<(String, String)>,
    image: Option<(String, String)>,
    strong: bool,
    emphasis: bool,
    heading: Option<(u8, String)>,
    // list state
    list_items: Option<Vec<Vec<Inline>>>,
    // table state
    in_table: bool,
    in_head: bool,
    header: Vec<String>,
    rows: Vec<Vec<String>>,
    row: Vec<String>,
    cell: String,
}

impl<'a> Formatter<'a> {
    fn new(saved_urls: &'a [String], domains: &'a [&'a str]) -> Self {
        Self {
            saved_urls,
            domains,
            blocks: vec![],
            inlines: vec![],
            carousel: None,
            link: None,
            image: None,
            strong: false,
            emphasis: false,
            heading: None,
            list_items: None,
            in_table: false,
            in_head: false,
            header: vec![],
            rows: vec![],
            row: vec![],
            cell: String::new(),
        }
    }

    fn flush_paragraph(&mut self) {
        let meaningful = self.inlines.iter().any(|i| match i {
            Inline::Text(t) => !t.trim().is_empty(),
            _ => true,
        });
        if !meaningful {
            self.inlines.clear();
            return;
        }
        let inlines = std::mem::take(&mut self.inlines);
        if let Some(items) = self.list_items.as_mut() {
            items.push(inlines);
        } else {
            self.blocks.push(ContentBlock::Paragraph(inlines));
        }
    }

    fn push_image(&mut self, url: String, caption: String) {
        if let Some(slides) = self.carousel.as_mut() {
            slides.push(ImageSlide { url, caption });
        } else {
            self.flush_paragraph();
            self.blocks.push(ContentBlock::Image { url, caption });
        }
    }

    fn push_text(&mut self, text: &str) {
        if let Some((_, caption)) = self.image.as_mut() {
            caption.push_str(text);
        } else if let Some((_, label)) = self.link.as_mut() {
            label.push_str(text);
        } else if let Some((_, heading)) = self.heading.as_mut() {
            heading.push_str(text);
        } else if self.in_table {
            self.cell.push_str(text);
        } else if self.strong {
            self.inlines.push(Inline::Strong(text.to_string()));
        } else if self.emphasis {
            self.inlines.push(Inline::Emphasis(text.to_string()));
        } else {
            self.inlines.push(Inline::Text(text.to_string()));
        }
    }

    fn on_html(&mut self, html: &str) {
        if html.contains("<div class=\"carousel\"") && self.carousel.is_none() {
            self.flush_paragraph();
            self.carousel = Some(vec![]);
        }
        // Images may sit inside the raw region itself.
        let slides = extract_img_tags(html);
        if let Some(collecting) = self.carousel.as_mut() {
            collecting.extend(slides);
        } else {
            for slide in slides {
                self.push_image(slide.url, slide.caption);
            }
        }
        if html.contains("</div>")
            && let Some(slides) = self.carousel.take()
        {
            if !slides.is_empty() {
                self.blocks.push(ContentBlock::Carousel { slides });
            }
        }
    }

    fn run(mut self, text: &str) -> Vec<ContentBlock> {
        let options = Options::ENABLE_TABLES | Options::ENABLE_STRIKETHROUGH;
        for event in Parser::new_ext(text, options) {
            match event {
                Event::Start(tag) => match tag {
                    Tag::Paragraph => {}
                    Tag::Heading { level, .. } => {
                        self.flush_paragraph();
                        self.heading = Some((level as u8, String::new()));
                    }
                    Tag::List(_) => {
                        self.flush_paragraph();
                        if self.list_items.is_none() {
                            self.list_items = Some(vec![]);
                        }
                    }
                    Tag::Item => {}
                    Tag::Emphasis => self.emphasis = true,
                    Tag::Strong => self.strong = true,
                    Tag::Link { dest_url, .. } => {
                        self.link = Some((dest_url.to_string(), String::new()));
                    }
                    Tag::Image { dest_url, .. } => {
                        self.image = Some((dest_url.to_string(), String::new()));
                    }
                    Tag::Table(_) => {
                        self.flush_paragraph();
                        self.in_table = true;
                        self.header.clear();
                        self.rows.clear();
                    }
                    Tag::TableHead => self.in_head = true,
                    Tag::TableRow => self.row.clear(),
                    Tag::TableCell => self.cell.clear(),
                    _ => {}
                },
                Event::End(tag) => match tag {
                    TagEnd::Paragraph => self.flush_paragraph(),
                    TagEnd::Heading(_) => {
                        if let Some((level, text)) = self.heading.take() {
                            self.blocks.push(ContentBlock::Heading { level, text });
                        }
                    }
                    TagEnd::List(_) => {
                        self.flush_paragraph();
                        if let Some(items) = self.list_items.take()
                            && !items.is_empty()
                        {
                            self.blocks.push(ContentBlock::List(items));
                        }
                    }
                    TagEnd::Item => self.flush_paragraph(),
                    TagEnd::Emphasis => self.emphasis = false,
                    TagEnd::Strong => self.strong = false,
                    TagEnd::Link => {
                        if let Some((url, label)) = self.link.take() {
                            let text = if label.is_empty() { url.clone() } else { label };
                            if self.in_table {
                                self.cell.push_str(&text);
                            } else {
                                let kind = classify_link(&url, self.saved_urls, self.domains);
                                self.inlines.push(Inline::Link { text, url, kind });
                            }
                        }
                    }
                    TagEnd::Image => {
                        if let Some((url, caption)) = self.image.take() {
                            self.push_image(url, caption);
                        }
                    }
                    TagEnd::Table => {
                        self.in_table = false;
                        self.blocks.push(ContentBlock::Table {
                            header: std::mem::take(&mut self.header),
                            rows: std::mem::take(&mut self.rows),
                        });
                    }
                    TagEnd::TableHead => self.in_head = false,
                    TagEnd::TableRow => {
                        if !self.in_head {
                            self.rows.push(std::mem::take(&mut self.row));
                        }
                    }
                    TagEnd::TableCell => {
                        let cell = std::mem::take(&mut self.cell);
                        if self.in_head {
                            self.header.push(cell);
                        } else {
                            self.row.push(cell);
                        }
                    }
                    _ => {}
                },
                Event::Text(text) => self.push_text(&text),
                Event::Code(code) => {
                    if self.in_table {
                        self.cell.push_str(&code);
                    } else if let Some((_, label)) = self.link.as_mut() {
                        label.push_str(&code);
                    } else {
                        self.inlines.push(Inline::Code(code.to_string()));
                    }
                }
                Event::Html(html) | Event::InlineHtml(html) => self.on_html(&html),
                Event::SoftBreak | Event::HardBreak => self.push_text(" "),
                _ => {}
            }
        }
        self.flush_paragraph();
        // An unterminated carousel region while text is still streaming:
        // show the slides received so far.
        if let Some(slides) = self.carousel.take()
            && !slides.is_empty()
        {
            self.blocks.push(ContentBlock::Carousel { slides });
        }
        self.blocks
    }
}

/// Format response text into content blocks.
///
/// `saved_urls` drives the initial state of listing like toggles; `domains`
/// is the listing-host set, [`LISTING_DOMAINS`] in production.
pub fn format_content(text: &str, saved_urls: &[String], domains: &[&str]) -> Vec<ContentBlock> {
    Formatter::new(saved_urls, domains).run(text)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn format(text: &str) -> Vec<ContentBlock> {
        format_content(text, &[], &LISTING_DOMAINS)
    }

    #[test]
    fn test_plain_paragraph() {
        let blocks = format("Two bedroom flats in Camden.");
        assert_eq!(
            blocks,
            vec![ContentBlock::Paragraph(vec![Inline::Text(
                "Two bedroom flats in Camden.".to_string()
            )])]
        );
    }

    #[test]
    fn test_formatting_is_idempotent() {
        let text = "# Results\n\nA [flat](https://www.dexters.co.uk/p/1) with a \
                    [map](https://x.test/map/51.5,-0.13)\n\n|a|b|\n|-|-|\n|1|2|\n";
        assert_eq!(format(text), format(text));
    }

    #[test]
    fn test_image_becomes_gallery_block_with_caption() {
        let blocks = format("![Bright kitchen](https://img.test/1.jpg)");
        assert_eq!(
            blocks,
            vec![ContentBlock::Image {
                url: "https://img.test/1.jpg".to_string(),
                caption: "Bright kitchen".to_string(),
            }]
        );
    }

    #[test]
    fn test_listing_link_gets_like_toggle_from_saved_set() {
        let saved = vec!["https://www.dexters.co.uk/p/1".to_string()];
        let text = "[one](https://www.dexters.co.uk/p/1) [two](https://www.kfh.co.uk/p/2)";
        let blocks = format_content(text, &saved, &LISTING_DOMAINS);
        let ContentBlock::Paragraph(inlines) = &blocks[0] else {
            panic!("expected paragraph");
        };
        let kinds: Vec<_> = inlines
            .iter()
            .filter_map(|i| match i {
                Inline::Link { kind, .. } => Some(kind.clone()),
                _ => None,
            })
            .collect();
        assert_eq!(
            kinds,
            vec![
                LinkKind::Listing { liked: true },
                LinkKind::Listing { liked: false },
            ]
        );
    }

    #[test]
    fn test_non_listing_host_is_plain() {
        let blocks = format("[news](https://www.bbc.co.uk/x)");
        let ContentBlock::Paragraph(inlines) = &blocks[0] else {
            panic!("expected paragraph");
        };
        assert!(matches!(
            &inlines[0],
            Inline::Link { kind: LinkKind::Plain, .. }
        ));
    }

    #[test]
    fn test_map_link_parses_coordinates() {
        assert_eq!(
            parse_map_link("https://x.test/map/51.5,-0.13"),
            Some((51.5, -0.13))
        );
        assert_eq!(parse_map_link("https://x.test/maps/51.5,-0.13"), None);
        assert_eq!(parse_map_link("https://x.test/map/notacoord"), None);
    }

    #[test]
    fn test_map_link_becomes_pin() {
        let blocks = format("[here](https://x.test/map/51.5,-0.13)");
        let ContentBlock::Paragraph(inlines) = &blocks[0] else {
            panic!("expected paragraph");
        };
        assert!(matches!(
            &inlines[0],
            Inline::Link {
                kind: LinkKind::MapPin { latitude, longitude },
                ..
            } if *latitude == 51.5 && *longitude == -0.13
        ));
    }

    #[test]
    fn test_carousel_groups_markdown_images() {
        let text = "<div class=\"carousel\">\n\n![a](https://img.test/a.jpg)\n![b](https://img.test/b.jpg)\n\n</div>";
        let blocks = format(text);
        let carousel = blocks
            .iter()
            .find(|b| matches!(b, ContentBlock::Carousel { .. }));
        let Some(ContentBlock::Carousel { slides }) = carousel else {
            panic!("expected carousel, got {blocks:?}");
        };
        assert_eq!(slides.len(), 2);
        assert_eq!(slides[0].url, "https://img.test/a.jpg");
    }

    #[test]
    fn test_carousel_groups_raw_img_tags() {
        let text = "<div class=\"carousel\"><img src=\"https://img.test/a.jpg\" alt=\"front\"><img src=\"https://img.test/b.jpg\"></div>";
        let blocks = format(text);
        assert_eq!(
            blocks,
            vec![ContentBlock::Carousel {
                slides: vec![
                    ImageSlide {
                        url: "https://img.test/a.jpg".to_string(),
                        caption: "front".to_string(),
                    },
                    ImageSlide {
                        url: "https://img.test/b.jpg".to_string(),
                        caption: String::new(),
                    },
                ]
            }]
        );
    }

    #[test]
    fn test_unterminated_carousel_shows_received_slides() {
        // Streaming cut off mid-region.
        let text = "<div class=\"carousel\">\n\n![a](https://img.test/a.jpg)";
        let blocks = format(text);
        assert!(matches!(
            blocks.last(),
            Some(ContentBlock::Carousel { slides }) if slides.len() == 1
        ));
    }

    #[test]
    fn test_table_rows_and_header() {
        let text = "| Property | Rent |\n|---|---|\n| Flat A | £1800 |\n| Flat B | £2100 |\n";
        let blocks = format(text);
        assert_eq!(
            blocks,
            vec![ContentBlock::Table {
                header: vec!["Property".to_string(), "Rent".to_string()],
                rows: vec![
                    vec!["Flat A".to_string(), "£1800".to_string()],
                    vec!["Flat B".to_string(), "£2100".to_string()],
                ],
            }]
        );
    }

    #[test]
    fn test_heading_and_list() {
        let blocks = format("## Top picks\n\n- first\n- second\n");
        assert_eq!(
            blocks[0],
            ContentBlock::Heading {
                level: 2,
                text: "Top picks".to_string()
            }
        );
        let ContentBlock::List(items) = &blocks[1] else {
            panic!("expected list");
        };
        assert_eq!(items.len(), 2);
    }
}
