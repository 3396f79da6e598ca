use super::tokens::{quote, quote_if_needed};
use super::{DEFAULT_STROKE_COLOR, FORMAT_VERSION, HEADER_KEYWORD};
use crate::document::{Document, Layer, Stroke};
use std::fmt::Write;

/// Serialize a document to InkScript text.
///
/// Coordinates are written with two decimals. Erased strokes keep their
/// geometry and are followed by an `erase ref=` line so a reload restores
/// them in the erased state.
pub fn serialize(doc: &Document) -> String {
    let mut out = String::new();
    // Writing into a String cannot fail.
    let _ = write_document(&mut out, doc);
    out
}

fn write_document(out: &mut String, doc: &Document) -> std::fmt::Result {
    writeln!(out, "{HEADER_KEYWORD} {FORMAT_VERSION}")?;
    writeln!(out)?;
    writeln!(out, "canvas {} {}", doc.canvas_width, doc.canvas_height)?;
    writeln!(out, "background {}", doc.background)?;
    writeln!(out)?;
    for layer in &doc.layers {
        write_layer(out, layer)?;
    }
    Ok(())
}

fn write_layer(out: &mut String, layer: &Layer) -> std::fmt::Result {
    writeln!(
        out,
        "layer id={} name={} visible={} {{",
        layer.id,
        quote(&layer.name),
        layer.visible
    )?;
    for stroke in &layer.strokes {
        write_stroke(out, stroke)?;
    }
    writeln!(out, "}}")?;
    writeln!(out)
}

fn write_stroke(out: &mut String, stroke: &Stroke) -> std::fmt::Result {
    let id = quote_if_needed(stroke.id.as_str());
    writeln!(out, "  draw path id={id} {{")?;
    for (i, p) in stroke.points.iter().enumerate() {
        let command = if i == 0 { "move" } else { "line" };
        writeln!(out, "    {command} {:.2} {:.2}", p.x, p.y)?;
    }
    write!(out, "  }} stroke={}", stroke.color.unwrap_or(DEFAULT_STROKE_COLOR))?;
    if let Some(fill) = stroke.fill {
        write!(out, " fill={fill}")?;
    }
    writeln!(out, " strokeWidth={}", format_width(stroke.width))?;
    if stroke.erased {
        writeln!(out, "  erase ref={id}")?;
    }
    Ok(())
}

/// Integral widths are written without a fractional part.
fn format_width(width: f64) -> String {
    if width.fract() == 0.0 && width.abs() < 1e15 {
        format!("{}", width as i64)
    } else {
        format!("{width}")
    }
}

#[cfg(test)]
mod tests {
    use super::super::parse;
    use super::*;
    use crate::color::Color;
    use crate::document::{LayerId, StrokeId};
    use kurbo::Point;

    fn sample() -> Document {
        let mut doc = Document::new();
        doc.canvas_width = 640;
        doc.canvas_height = 480;
        doc.background = Color::new(0x10, 0x20, 0x30);

        let lower = doc.add_layer(Some("Sketch \"rough\"")).unwrap().id;
        let upper = doc.add_layer(None).unwrap().id;
        doc.set_layer_visible(lower, false);

        let a = doc.next_stroke_id().unwrap();
        let b = doc.next_stroke_id().unwrap();
        let tri = Stroke::new(
            a,
            Color::new(255, 0, 0),
            4.0,
            vec![Point::new(0.0, 0.0), Point::new(10.5, 0.0), Point::new(5.25, 8.75)],
        )
        .with_fill(Some(Color::new(0, 0, 255)));
        let mut scribble = Stroke::new(b, Color::WHITE, 2.5, vec![Point::new(1.0, 1.0), Point::new(2.0, 3.0)]);
        scribble.erased = true;

        doc.find_layer_mut(upper).unwrap().strokes.push(tri);
        doc.find_layer_mut(lower).unwrap().strokes.push(scribble);
        doc
    }

    #[test]
    fn test_output_layout() {
        let text = serialize(&sample());
        let lines: Vec<&str> = text.lines().collect();
        assert_eq!(lines[0], "inkscript 1.0");
        assert_eq!(lines[2], "canvas 640 480");
        assert_eq!(lines[3], "background #102030");
        assert_eq!(lines[5], "layer id=2 name=\"Layer 2\" visible=true {");
        assert_eq!(lines[6], "  draw path id=stroke_1 {");
        assert_eq!(lines[7], "    move 0.00 0.00");
        assert_eq!(lines[8], "    line 10.50 0.00");
        assert_eq!(lines[10], "  } stroke=#ff0000 fill=#0000ff strokeWidth=4");
        assert!(text.contains("layer id=1 name=\"Sketch \\\"rough\\\"\" visible=false {"));
        assert!(text.contains("  } stroke=#ffffff strokeWidth=2.5\n  erase ref=stroke_2\n"));
    }

    #[test]
    fn test_round_trip() {
        let doc = sample();
        let reloaded = parse(&serialize(&doc)).unwrap();
        assert_eq!(reloaded, doc);
        assert_eq!(serialize(&reloaded), serialize(&doc));
    }

    #[test]
    fn test_round_trip_keeps_counters_ahead() {
        let mut doc = Document::with_default_layer();
        let id = StrokeId::sequential(41);
        assert!(doc.note_stroke_id(&id));
        doc.layers[0].strokes.push(Stroke::new(id, Color::BLACK, 1.0, vec![Point::ZERO]));

        let mut reloaded = parse(&serialize(&doc)).unwrap();
        assert_eq!(reloaded.next_stroke_id(), Some(StrokeId::sequential(42)));
        assert_eq!(reloaded.add_layer(None).unwrap().id, LayerId(2));
    }

    #[test]
    fn test_ids_with_spaces_are_quoted() {
        let mut doc = Document::with_default_layer();
        doc.layers[0]
            .strokes
            .push(Stroke::new(StrokeId::new("my stroke"), Color::BLACK, 2.0, vec![Point::ZERO]));
        let text = serialize(&doc);
        assert!(text.contains("draw path id=\"my stroke\" {"));
        let reloaded = parse(&text).unwrap();
        assert_eq!(reloaded.layers[0].strokes[0].id, "my stroke");
    }

    #[test]
    fn test_width_formatting() {
        assert_eq!(format_width(3.0), "3");
        assert_eq!(format_width(0.5), "0.5");
        assert_eq!(format_width(12.25), "12.25");
    }
}
