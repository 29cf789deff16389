//! Renders content blocks to styled ratatui lines.

use crate::carousel::CarouselState;
use crate::content::{ContentBlock, Inline, LinkKind};
use crate::theme::Theme;
use ratatui::{
    style::Modifier,
    text::{Line, Span},
};
use unicode_width::UnicodeWidthStr;

/// Convert formatted content blocks to styled lines.
///
/// `carousel` and `table_offset` are per-message view state: which slide each
/// carousel shows and how many leading table columns are scrolled out.
pub fn render_blocks<'a>(
    blocks: &[ContentBlock],
    theme: &Theme,
    width: usize,
    carousel: CarouselState,
    table_offset: usize,
) -> Vec<Line<'a>> {
    let mut lines: Vec<Line<'a>> = Vec::new();

    for block in blocks {
        match block {
            ContentBlock::Paragraph(inlines) => {
                lines.push(Line::from(render_inlines(inlines, theme)));
                lines.push(Line::from(""));
            }
            ContentBlock::Heading { level, text } => {
                let style = match level {
                    1 => theme
                        .accent_style()
                        .add_modifier(Modifier::BOLD | Modifier::UNDERLINED),
                    2 => theme.accent_style().add_modifier(Modifier::BOLD),
                    _ => theme.accent_style(),
                };
                lines.push(Line::from(Span::styled(text.clone(), style)));
                lines.push(Line::from(""));
            }
            ContentBlock::List(items) => {
                for item in items {
                    let mut spans = vec![Span::styled("• ", theme.dim_style())];
                    spans.extend(render_inlines(item, theme));
                    lines.push(Line::from(spans));
                }
                lines.push(Line::from(""));
            }
            ContentBlock::Image { url, caption } => {
                lines.push(image_line(url, caption, theme));
                lines.push(Line::from(""));
            }
            ContentBlock::Carousel { slides } => {
                if slides.is_empty() {
                    continue;
                }
                let pos = carousel.position(slides.len());
                let slide = &slides[pos];
                lines.push(image_line(&slide.url, &slide.caption, theme));
                lines.push(Line::from(Span::styled(
                    format!("◂ {}/{} ▸", pos + 1, slides.len()),
                    theme.dim_style(),
                )));
                lines.push(Line::from(""));
            }
            ContentBlock::Table { header, rows } => {
                lines.extend(render_table(header, rows, theme, width, table_offset));
                lines.push(Line::from(""));
            }
        }
    }

    // Remove trailing empty lines
    while lines.last().is_some_and(|l| {
        l.spans.is_empty() || (l.spans.len() == 1 && l.spans[0].content.is_empty())
    }) {
        lines.pop();
    }

    lines
}

fn render_inlines<'a>(inlines: &[Inline], theme: &Theme) -> Vec<Span<'a>> {
    let mut spans = Vec::new();
    for inline in inlines {
        match inline {
            Inline::Text(text) => spans.push(Span::styled(text.clone(), theme.base_style())),
            Inline::Strong(text) => spans.push(Span::styled(
                text.clone(),
                theme.base_style().add_modifier(Modifier::BOLD),
            )),
            Inline::Emphasis(text) => spans.push(Span::styled(
                text.clone(),
                theme.base_style().add_modifier(Modifier::ITALIC),
            )),
            Inline::Code(code) => spans.push(Span::styled(
                format!("`{code}`"),
                theme.code_style().add_modifier(Modifier::BOLD),
            )),
            Inline::Link { text, url: _, kind } => match kind {
                LinkKind::Plain => {
                    spans.push(Span::styled(text.clone(), theme.link_style()));
                }
                LinkKind::Listing { liked } => {
                    let heart = if *liked { "♥ " } else { "♡ " };
                    spans.push(Span::styled(heart.to_string(), theme.like_style(*liked)));
                    spans.push(Span::styled(text.clone(), theme.link_style()));
                }
                LinkKind::MapPin {
                    latitude,
                    longitude,
                } => {
                    spans.push(Span::styled("⌖ ".to_string(), theme.pin_style()));
                    spans.push(Span::styled(text.clone(), theme.pin_style()));
                    spans.push(Span::styled(
                        format!(" ({latitude}, {longitude})"),
                        theme.dim_style(),
                    ));
                }
            },
        }
    }
    spans
}

fn image_line<'a>(url: &str, caption: &str, theme: &Theme) -> Line<'a> {
    let label = if caption.is_empty() { url } else { caption };
    Line::from(vec![
        Span::styled("▣ ".to_string(), theme.accent_style()),
        Span::styled(label.to_string(), theme.link_style()),
    ])
}

/// Render a table, skipping the first `offset` columns.
///
/// Tables are never wrapped; columns past the right edge are cut and the edge
/// markers show which direction holds more.
fn render_table<'a>(
    header: &[String],
    rows: &[Vec<String>],
    theme: &Theme,
    width: usize,
    offset: usize,
) -> Vec<Line<'a>> {
    let columns = header.len().max(rows.iter().map(Vec::len).max().unwrap_or(0));
    if columns == 0 {
        return vec![];
    }
    let offset = offset.min(columns.saturating_sub(1));

    let mut widths = vec![0usize; columns];
    for (i, cell) in header.iter().enumerate() {
        widths[i] = widths[i].max(cell.width());
    }
    for row in rows {
        for (i, cell) in row.iter().enumerate() {
            widths[i] = widths[i].max(cell.width());
        }
    }

    let left_marker = if offset > 0 { "◂ " } else { "  " };
    let budget = width.saturating_sub(4);
    let mut visible = 0;
    let mut used = 0;
    for &w in widths.iter().skip(offset) {
        let needed = w + 2;
        if visible > 0 && used + needed > budget {
            break;
        }
        used += needed;
        visible += 1;
    }
    let cut_right = offset + visible < columns;

    let fmt_row = |row: &[String]| -> String {
        let mut out = String::new();
        for i in offset..offset + visible {
            let cell = row.get(i).map(String::as_str).unwrap_or("");
            let pad = widths[i].saturating_sub(cell.width());
            out.push_str(cell);
            out.push_str(&" ".repeat(pad + 2));
        }
        out.trim_end().to_string()
    };

    let right_marker = |line: &str| -> String {
        if cut_right {
            format!("{left_marker}{line} ▸")
        } else {
            format!("{left_marker}{line}")
        }
    };

    let mut lines = Vec::new();
    if !header.is_empty() {
        lines.push(Line::from(Span::styled(
            right_marker(&fmt_row(header)),
            theme.base_style().add_modifier(Modifier::BOLD),
        )));
        let rule: usize = widths[offset..offset + visible]
            .iter()
            .map(|w| w + 2)
            .sum::<usize>()
            .saturating_sub(2);
        lines.push(Line::from(Span::styled(
            format!("  {}", "─".repeat(rule)),
            theme.dim_style(),
        )));
    }
    for row in rows {
        lines.push(Line::from(Span::styled(
            right_marker(&fmt_row(row)),
            theme.base_style(),
        )));
    }
    lines
}
