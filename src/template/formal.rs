//! Formal: serif type inside a double navy border, details in two columns

use super::{Canvas, TemplateKind, CENTER_X};
use crate::document::{Color, FontFace, Rect, RenderedDocument, TextStyle};
use crate::fields::CoverFields;
use crate::layout::{CANONICAL_HEIGHT, CANONICAL_WIDTH};

const BORDER: f64 = 20.0;
const PADDING: f64 = BORDER + 64.0;
const GRID_TOP: f64 = 760.0;
const COLUMN_WIDTH: f64 = 264.0;

pub(super) fn render(fields: &CoverFields) -> RenderedDocument {
    let mut canvas = Canvas::new(TemplateKind::Formal, Color::WHITE);

    // Double rule: two 7-unit strokes with a 6-unit gap
    canvas.boxed(
        Rect::new(3.5, 3.5, CANONICAL_WIDTH - 7.0, CANONICAL_HEIGHT - 7.0),
        None,
        Color::NAVY,
        7.0,
    );
    canvas.boxed(
        Rect::new(16.5, 16.5, CANONICAL_WIDTH - 33.0, CANONICAL_HEIGHT - 33.0),
        None,
        Color::NAVY,
        7.0,
    );

    let mut y = PADDING;
    let emblem_bottom = canvas.emblem(fields, CENTER_X, y, 140.0, true);
    if emblem_bottom > y {
        y = emblem_bottom + 24.0;
    }

    let institution = TextStyle::new(FontFace::SerifBold, 30.0, Color::NAVY)
        .centered()
        .tracking_em(0.2)
        .leading(1.25);
    y = canvas.paragraph(&fields.institution, CENTER_X, y, 512.0, institution);
    y += 16.0;
    canvas.line((CENTER_X - 256.0, y), (CENTER_X + 256.0, y), Color::NAVY, 2.0);

    y += 64.0;
    let kicker = TextStyle::new(FontFace::SerifItalic, 20.0, Color::SLATE_500).centered();
    y = canvas.label("An Assignment on", CENTER_X, y, kicker);
    y += 16.0;
    let title = TextStyle::new(FontFace::SerifBold, 48.0, Color::NAVY)
        .centered()
        .leading(1.1);
    canvas.paragraph(&fields.topic, CENTER_X, y, 600.0, title);

    column(
        &mut canvas,
        CENTER_X - 288.0,
        "SUBMITTED BY",
        &fields.author,
        &[
            format!("Roll No: {}", fields.roll_number),
            format!("Program: {}", fields.program),
            format!("Semester: {}", fields.semester),
        ],
    );
    column(
        &mut canvas,
        CENTER_X + 24.0,
        "SUBMITTED TO",
        &fields.supervisor,
        &[
            "Professor & Head".to_string(),
            format!("Department: {}", fields.subject),
        ],
    );

    let date_top = CANONICAL_HEIGHT - PADDING - 80.0;
    canvas.line(
        (CANONICAL_WIDTH / 6.0, date_top),
        (CANONICAL_WIDTH * 5.0 / 6.0, date_top),
        Color::SLATE_300,
        1.0,
    );
    let caption = TextStyle::new(FontFace::SerifBold, 10.0, Color::SKY)
        .centered()
        .tracking_em(0.4);
    let y = canvas.label("DATE OF SUBMISSION", CENTER_X, date_top + 32.0, caption);
    let date = TextStyle::new(FontFace::SerifBold, 24.0, Color::NAVY).centered();
    canvas.label(&fields.submission_date, CENTER_X, y + 4.0, date);

    canvas.finish()
}

fn column(canvas: &mut Canvas, x: f64, heading: &str, name: &str, details: &[String]) {
    let heading_style = TextStyle::new(FontFace::SerifBold, 12.0, Color::SKY).tracking_em(0.1);
    let mut y = canvas.label(heading, x, GRID_TOP, heading_style);
    canvas.line((x, y + 4.0), (x + COLUMN_WIDTH, y + 4.0), Color::SKY, 1.0);

    y += 16.0;
    let name_style = TextStyle::new(FontFace::SerifBold, 20.0, Color::NAVY).leading(1.25);
    y = canvas.paragraph(name, x, y, COLUMN_WIDTH, name_style) + 4.0;

    let detail_style = TextStyle::new(FontFace::Serif, 14.0, Color::SLATE_700).leading(1.4);
    for detail in details {
        y = canvas.paragraph(detail, x, y, COLUMN_WIDTH, detail_style);
    }
}
