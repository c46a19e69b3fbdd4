//! Modern: dark emblem sidebar, oversized sans title, detail cards

use super::{Canvas, TemplateKind};
use crate::document::{Color, FontFace, Rect, RenderedDocument, TextStyle};
use crate::fields::CoverFields;
use crate::layout::{CANONICAL_HEIGHT, CANONICAL_WIDTH};

const SIDEBAR: f64 = 80.0;
const LEFT: f64 = SIDEBAR + 64.0;
const RIGHT: f64 = CANONICAL_WIDTH - 64.0;
const CONTENT_WIDTH: f64 = RIGHT - LEFT;
const CARD_TOP: f64 = 800.0;
const CARD_HEIGHT: f64 = 140.0;
const CARD_GAP: f64 = 32.0;

pub(super) fn render(fields: &CoverFields) -> RenderedDocument {
    let mut canvas = Canvas::new(TemplateKind::Modern, Color::NAVY);

    canvas.fill(Rect::new(0.0, 0.0, SIDEBAR, CANONICAL_HEIGHT), Color::NAVY_DARK);
    canvas.fill(
        Rect::new(SIDEBAR, 0.0, CANONICAL_WIDTH - SIDEBAR, CANONICAL_HEIGHT),
        Color::WHITE,
    );
    canvas.fill(Rect::new(CANONICAL_WIDTH - 152.0, 0.0, 152.0, 152.0), Color::NAVY_PALE);

    if fields.show_logo {
        canvas.fill(Rect::new(7.0, 48.0, 66.0, 66.0), Color::WHITE);
        canvas.image(Rect::new(15.0, 56.0, 50.0, 50.0), fields, 1.0);
    }

    let eyebrow = TextStyle::new(FontFace::SansBold, 12.0, Color::SKY).tracking_em(0.3);
    let mut y = canvas.paragraph(&fields.institution, LEFT, 64.0, CONTENT_WIDTH, eyebrow);
    y += 16.0;
    canvas.fill(Rect::new(LEFT, y, 96.0, 8.0), Color::SKY_BRIGHT);
    y += 8.0 + 48.0;

    let title = TextStyle::new(FontFace::SansBold, 60.0, Color::NAVY).leading(1.0);
    y = canvas.paragraph(&fields.topic, LEFT, y, CONTENT_WIDTH, title) + 24.0;
    let subject = TextStyle::new(FontFace::Sans, 24.0, Color::SLATE_500);
    canvas.paragraph(&fields.subject, LEFT, y, CONTENT_WIDTH, subject);

    let card_width = (CONTENT_WIDTH - CARD_GAP) / 2.0;
    card(
        &mut canvas,
        Rect::new(LEFT, CARD_TOP, card_width, CARD_HEIGHT),
        "CANDIDATE",
        &fields.author,
        &[
            format!("Reg ID: {}", fields.roll_number),
            format!("{} | {}", fields.program, fields.semester),
        ],
    );
    card(
        &mut canvas,
        Rect::new(LEFT + card_width + CARD_GAP, CARD_TOP, card_width, CARD_HEIGHT),
        "SUPERVISOR",
        &fields.supervisor,
        &["Course Supervisor".to_string()],
    );

    let footer_top = CARD_TOP + CARD_HEIGHT + 47.0;
    canvas.line((LEFT, footer_top), (RIGHT, footer_top), Color::SLATE_100, 2.0);
    let caption = TextStyle::new(FontFace::SansBold, 10.0, Color::SLATE_400).tracking_em(0.1);
    let y = canvas.label("SUBMISSION DEADLINE", LEFT, footer_top + 32.0, caption);
    let date = TextStyle::new(FontFace::SansBold, 20.0, Color::SKY);
    canvas.label(&fields.submission_date, LEFT, y + 4.0, date);

    let badge = Rect::new(RIGHT - 48.0, footer_top + 28.0, 48.0, 48.0);
    canvas.boxed(badge, None, Color::NAVY_LIGHT, 4.0);
    canvas.fill(Rect::new(RIGHT - 36.0, footer_top + 40.0, 24.0, 24.0), Color::NAVY);

    canvas.finish()
}

fn card(canvas: &mut Canvas, frame: Rect, heading: &str, name: &str, details: &[String]) {
    canvas.boxed(frame, Some(Color::SLATE_50), Color::SLATE_100, 1.0);

    let x = frame.x + 24.0;
    let width = frame.width - 48.0;
    let heading_style = TextStyle::new(FontFace::SansBold, 10.0, Color::SKY).tracking_em(0.1);
    let mut y = canvas.label(heading, x, frame.y + 24.0, heading_style) + 8.0;

    let name_style = TextStyle::new(FontFace::SansBold, 20.0, Color::NAVY);
    y = canvas.paragraph(name, x, y, width, name_style) + 4.0;

    let detail_style = TextStyle::new(FontFace::Sans, 14.0, Color::SLATE_500).leading(1.3);
    for detail in details {
        y = canvas.paragraph(detail, x, y, width, detail_style);
    }
}
