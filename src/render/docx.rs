//! Packing rendered template text into DOCX bytes.
//!
//! Template assets use a small line-oriented markup subset:
//! `#`/`##`/`###` headings, `- ` bullets, `**bold**` runs, `---` page
//! breaks; everything else becomes a plain paragraph.

use std::io::Cursor;

use docx_rs::{
    AlignmentType, BreakType, Docx, Paragraph, Run, RunFonts, Style, StyleType,
};

use super::RenderError;

const BODY_FONT: &str = "Times New Roman";

/// Build a DOCX document from rendered template text.
pub fn pack_docx(rendered: &str) -> Result<Vec<u8>, RenderError> {
    let mut docx = Docx::new()
        .add_style(heading_style("Heading1", "heading 1", 16))
        .add_style(heading_style("Heading2", "heading 2", 14))
        .add_style(heading_style("Heading3", "heading 3", 12));

    for line in rendered.lines() {
        let trimmed = line.trim_end();
        if trimmed.trim().is_empty() {
            docx = docx.add_paragraph(Paragraph::new());
            continue;
        }
        let trimmed = trimmed.trim_start();

        if let Some(text) = trimmed.strip_prefix("### ") {
            docx = docx.add_paragraph(heading_paragraph(text, "Heading3"));
        } else if let Some(text) = trimmed.strip_prefix("## ") {
            docx = docx.add_paragraph(heading_paragraph(text, "Heading2"));
        } else if let Some(text) = trimmed.strip_prefix("# ") {
            docx = docx.add_paragraph(heading_paragraph(text, "Heading1"));
        } else if let Some(text) = trimmed.strip_prefix("- ") {
            docx = docx.add_paragraph(bullet_paragraph(text));
        } else if trimmed == "---" {
            docx = docx
                .add_paragraph(Paragraph::new().add_run(Run::new().add_break(BreakType::Page)));
        } else {
            docx = docx.add_paragraph(body_paragraph(trimmed));
        }
    }

    let mut buf = Cursor::new(Vec::new());
    docx.build()
        .pack(&mut buf)
        .map_err(|e| RenderError::Docx(e.to_string()))?;

    Ok(buf.into_inner())
}

fn heading_style(style_id: &str, name: &str, size_pt: usize) -> Style {
    // OOXML sizes are half-points.
    Style::new(style_id, StyleType::Paragraph)
        .name(name)
        .size(size_pt * 2)
}

fn heading_paragraph(text: &str, style_id: &str) -> Paragraph {
    Paragraph::new()
        .style(style_id)
        .add_run(Run::new().add_text(text))
}

fn bullet_paragraph(text: &str) -> Paragraph {
    let mut para = Paragraph::new()
        .align(AlignmentType::Left)
        .add_run(body_run("\u{2022} "));
    for run in inline_runs(text) {
        para = para.add_run(run);
    }
    para
}

fn body_paragraph(text: &str) -> Paragraph {
    let mut para = Paragraph::new().align(AlignmentType::Left);
    for run in inline_runs(text) {
        para = para.add_run(run);
    }
    para
}

fn body_run(text: &str) -> Run {
    Run::new()
        .add_text(text)
        .fonts(RunFonts::new().ascii(BODY_FONT))
}

/// Split a line into runs, honoring `**bold**` segments.
fn inline_runs(text: &str) -> Vec<Run> {
    inline_segments(text)
        .into_iter()
        .map(|(segment, bold)| {
            let run = body_run(segment);
            if bold {
                run.bold()
            } else {
                run
            }
        })
        .collect()
}

/// (text, is_bold) segments of one line. Concatenating the segments of a
/// line without a closed `**` pair yields the line verbatim.
fn inline_segments(text: &str) -> Vec<(&str, bool)> {
    let mut segments = Vec::new();
    let mut remaining = text;

    while let Some(start) = remaining.find("**") {
        let after_start = &remaining[start + 2..];
        let Some(end) = after_start.find("**") else {
            // Unclosed marker: the marker and everything after it stay
            // verbatim.
            break;
        };

        let before = &remaining[..start];
        if !before.is_empty() {
            segments.push((before, false));
        }
        segments.push((&after_start[..end], true));
        remaining = &after_start[end + 2..];
    }

    if !remaining.is_empty() {
        segments.push((remaining, false));
    }

    segments
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_pack_produces_zip_container() {
        let bytes = pack_docx("# Title\n\nBody with **bold** text.\n- item\n---\nlast").unwrap();
        // DOCX is a ZIP archive.
        assert_eq!(&bytes[..2], b"PK");
    }

    #[test]
    fn test_inline_runs_bold_split() {
        let runs = inline_runs("pay **now** please");
        assert_eq!(runs.len(), 3);
    }

    #[test]
    fn test_inline_segments_bold_split() {
        assert_eq!(
            inline_segments("pay **now** please"),
            vec![("pay ", false), ("now", true), (" please", false)]
        );
    }

    #[test]
    fn test_inline_segments_unclosed_marker_stays_verbatim() {
        // A stray marker in a field value must neither bold nor duplicate
        // any of the surrounding text.
        assert_eq!(inline_segments("pay **now"), vec![("pay **now", false)]);
        assert_eq!(inline_segments("** only"), vec![("** only", false)]);
    }

    #[test]
    fn test_inline_segments_concatenation_is_verbatim() {
        for line in ["pay **now", "**", "** only", "plain"] {
            let joined: String = inline_segments(line)
                .iter()
                .map(|(s, _)| *s)
                .collect();
            assert_eq!(joined, line);
        }
    }
}
