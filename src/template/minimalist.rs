//! Minimalist: oversized title, quiet label/value grid

use super::{Canvas, TemplateKind};
use crate::document::{Color, FontFace, Rect, RenderedDocument, TextStyle};
use crate::fields::CoverFields;
use crate::layout::{wrap_text, CANONICAL_HEIGHT, CANONICAL_WIDTH};

const PADDING: f64 = 80.0;
const RIGHT: f64 = CANONICAL_WIDTH - PADDING;
const BOTTOM: f64 = CANONICAL_HEIGHT - PADDING;
const ROW_HEIGHT: f64 = 18.0;
const VALUE_X: f64 = PADDING + 192.0;

pub(super) fn render(fields: &CoverFields) -> RenderedDocument {
    let mut canvas = Canvas::new(TemplateKind::Minimalist, Color::WHITE);

    // Header row
    let eyebrow = TextStyle::new(FontFace::SansBold, 9.0, Color::SKY).tracking_em(0.3);
    let y = canvas.label("OFFICIAL SUBMISSION", PADDING, PADDING, eyebrow) + 4.0;
    let institution = TextStyle::new(FontFace::SansBold, 16.0, Color::NAVY);
    let header_bottom = canvas.paragraph(&fields.institution, PADDING, y, 480.0, institution);
    canvas.image(Rect::new(RIGHT - 40.0, PADDING, 40.0, 40.0), fields, 0.5);

    // Details grid, anchored to the bottom margin
    let rows = [
        ("PRESENTER", format!("{} (Roll #{})", fields.author, fields.roll_number)),
        ("DEGREE", format!("{} \u{2022} {}", fields.program, fields.semester)),
        ("SUPERVISOR", fields.supervisor.clone()),
    ];
    let label = TextStyle::new(FontFace::SansBold, 9.0, Color::SKY).tracking_em(0.1);
    let value = TextStyle::new(FontFace::Sans, 12.0, Color::BLACK);
    let grid_top = BOTTOM - rows.len() as f64 * ROW_HEIGHT;
    for (i, (name, text)) in rows.iter().enumerate() {
        let top = grid_top + i as f64 * ROW_HEIGHT;
        canvas.label(name, PADDING, top + 1.5, label);
        canvas.label(text, VALUE_X, top, value);
    }

    let rule_y = grid_top - 12.0;
    canvas.line((PADDING, rule_y), (PADDING + 384.0, rule_y), Color::SLATE_100, 1.0);

    let subject = TextStyle::new(FontFace::SansBold, 30.0, Color::BLACK).leading(1.0);
    let subject_lines =
        wrap_text(&fields.subject, subject.face, subject.size, subject.tracking, 384.0)
            .len()
            .max(1);
    let subject_top = rule_y - 12.0 - subject_lines as f64 * subject.line_height;
    canvas.paragraph(&fields.subject, PADDING, subject_top, 384.0, subject);

    let caption = TextStyle::new(FontFace::SansBold, 9.0, Color::SKY)
        .right()
        .tracking_em(0.2);
    let date = TextStyle::new(FontFace::SansBold, 18.0, Color::NAVY).right();
    let date_top = BOTTOM - date.line_height;
    canvas.label("ISSUE DATE", RIGHT, date_top - 4.0 - caption.line_height, caption);
    canvas.label(&fields.submission_date, RIGHT, date_top, date);

    // Title, centered between header and subject
    let title = TextStyle::new(FontFace::SansBold, 72.0, Color::BLACK)
        .tracking_em(-0.05)
        .leading(0.85);
    let title_lines = wrap_text(&fields.topic, title.face, title.size, title.tracking, 640.0).len();
    let block_height = title_lines as f64 * title.line_height + 32.0 + 12.0;
    let slack = (subject_top - header_bottom - block_height).max(0.0);
    let y = header_bottom + slack / 2.0;
    let y = canvas.paragraph(&fields.topic, PADDING, y, 640.0, title) + 32.0;
    canvas.fill(Rect::new(PADDING, y, 128.0, 12.0), Color::NAVY);

    canvas.finish()
}
