//! Academic: centered serif layout, faint watermark emblem, details card

use super::{Canvas, TemplateKind, CENTER_X};
use crate::document::{Color, FontFace, Rect, RenderedDocument, TextStyle};
use crate::fields::CoverFields;
use crate::layout::{estimate_text_width, wrap_text, CANONICAL_HEIGHT, CANONICAL_WIDTH};

const PADDING: f64 = 64.0;
const CARD_HEIGHT: f64 = 190.0;
const CARD_TOP: f64 = CANONICAL_HEIGHT - PADDING - CARD_HEIGHT;
const WATERMARK: f64 = 360.0;
const FACULTY: &str = "FACULTY OF COMPUTER SCIENCE & IT";

pub(super) fn render(fields: &CoverFields) -> RenderedDocument {
    let mut canvas = Canvas::new(TemplateKind::Academic, Color::PAPER);

    canvas.fill(Rect::new(0.0, 0.0, CANONICAL_WIDTH, 8.0), Color::NAVY);
    canvas.fill(
        Rect::new(0.0, CANONICAL_HEIGHT - 8.0, CANONICAL_WIDTH, 8.0),
        Color::SKY_BRIGHT,
    );
    canvas.image(
        Rect::new(
            CENTER_X - WATERMARK / 2.0,
            (CANONICAL_HEIGHT - WATERMARK) / 2.0,
            WATERMARK,
            WATERMARK,
        ),
        fields,
        0.05,
    );

    // Header
    let mut y = PADDING;
    let emblem_bottom = canvas.emblem(fields, CENTER_X, y, 150.0, true);
    if emblem_bottom > y {
        y = emblem_bottom + 32.0;
    }
    let institution = TextStyle::new(FontFace::SerifBold, 30.0, Color::NAVY).centered();
    y = canvas.paragraph(&fields.institution, CENTER_X, y, 512.0, institution) + 12.0;

    let faculty = TextStyle::new(FontFace::SansBold, 10.0, Color::SKY)
        .centered()
        .tracking_em(0.4);
    let half = estimate_text_width(FACULTY, faculty.face, faculty.size, faculty.tracking) / 2.0;
    let rule_y = y + faculty.line_height / 2.0;
    for (from, to) in [(-half - 56.0, -half - 16.0), (half + 16.0, half + 56.0)] {
        canvas.line((CENTER_X + from, rule_y), (CENTER_X + to, rule_y), Color::SLATE_300, 1.0);
    }
    let header_bottom = canvas.label(FACULTY, CENTER_X, y, faculty) + 48.0;

    // Title block, vertically centered in the space above the card
    let pill = TextStyle::new(FontFace::SansBold, 12.0, Color::SKY)
        .centered()
        .tracking_em(0.1);
    let title = TextStyle::new(FontFace::SerifBold, 48.0, Color::SLATE_900)
        .centered()
        .leading(1.1);
    let subject_text = format!("Subject: {}", fields.subject);
    let subject = TextStyle::new(FontFace::SerifItalic, 20.0, Color::NAVY)
        .centered()
        .tracking_em(0.05);

    let title_lines = wrap_text(&fields.topic, title.face, title.size, title.tracking, 672.0).len();
    let subject_lines =
        wrap_text(&subject_text, subject.face, subject.size, subject.tracking, 600.0).len();
    let block_height = 28.0
        + 16.0
        + title_lines as f64 * title.line_height
        + 24.0
        + subject_lines as f64 * subject.line_height;
    let slack = (CARD_TOP - 32.0 - header_bottom - block_height).max(0.0);
    let mut y = header_bottom + slack / 2.0;

    let pill_text = "ACADEMIC PROJECT SUBMISSION";
    let pill_width = estimate_text_width(pill_text, pill.face, pill.size, pill.tracking) + 40.0;
    canvas.boxed(
        Rect::new(CENTER_X - pill_width / 2.0, y, pill_width, 28.0),
        Some(Color::WHITE),
        Color::SLATE_200,
        1.0,
    );
    canvas.label(pill_text, CENTER_X, y + 7.0, pill);
    y += 28.0 + 16.0;

    y = canvas.paragraph(&fields.topic, CENTER_X, y, 672.0, title) + 24.0;
    y = canvas.paragraph(&subject_text, CENTER_X, y, 600.0, subject) + 8.0;
    let subject_width =
        estimate_text_width(&subject_text, subject.face, subject.size, subject.tracking);
    let underline = subject_width.min(600.0) / 2.0 + 32.0;
    canvas.line((CENTER_X - underline, y), (CENTER_X + underline, y), Color::NAVY_LIGHT, 2.0);

    // Details card
    let card = Rect::new(PADDING, CARD_TOP, CANONICAL_WIDTH - 2.0 * PADDING, CARD_HEIGHT);
    canvas.boxed(
        Rect::new(card.x - 4.0, card.y - 4.0, card.width + 8.0, card.height + 8.0),
        None,
        Color::SLATE_50,
        4.0,
    );
    canvas.boxed(card, Some(Color::WHITE), Color::SLATE_100, 1.0);
    canvas.line(
        (CENTER_X, card.y + 32.0),
        (CENTER_X, card.bottom() - 32.0),
        Color::SLATE_100,
        1.0,
    );

    let left_x = card.x + card.width / 4.0;
    let right_x = card.x + card.width * 3.0 / 4.0;
    let column_width = card.width / 2.0 - 56.0;

    let y = person(&mut canvas, left_x, card.y + 40.0, column_width, "PREPARED BY", &fields.author);
    let detail = TextStyle::new(FontFace::Sans, 12.0, Color::SLATE_500).centered();
    let y = canvas.label(&format!("Roll No: {}", fields.roll_number), left_x, y, detail);
    canvas.label(
        &format!("{} ({} Semester)", fields.program, fields.semester),
        left_x,
        y,
        detail,
    );

    let y = person(
        &mut canvas,
        right_x,
        card.y + 40.0,
        column_width,
        "SUPERVISED BY",
        &fields.supervisor,
    );
    let y = canvas.label("Course Supervisor", right_x, y, detail) + 12.0;
    let badge = TextStyle::new(FontFace::SansBold, 9.0, Color::WHITE)
        .centered()
        .tracking_em(0.1);
    let badge_width =
        estimate_text_width(&fields.submission_date, badge.face, badge.size, badge.tracking) + 24.0;
    canvas.fill(
        Rect::new(right_x - badge_width / 2.0, y, badge_width, 22.0),
        Color::NAVY,
    );
    canvas.label(&fields.submission_date, right_x, y + 5.6, badge);

    canvas.finish()
}

fn person(canvas: &mut Canvas, x: f64, top: f64, width: f64, heading: &str, name: &str) -> f64 {
    let heading_style = TextStyle::new(FontFace::SansBold, 10.0, Color::SKY)
        .centered()
        .tracking_em(0.15);
    let y = canvas.label(heading, x, top, heading_style) + 8.0;
    let name_style = TextStyle::new(FontFace::SerifBold, 20.0, Color::SLATE_800).centered();
    canvas.paragraph(name, x, y, width, name_style) + 6.0
}
