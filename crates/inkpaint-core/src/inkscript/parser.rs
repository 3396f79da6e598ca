//! Salvage-oriented InkScript parser.
//!
//! Only a missing header aborts parsing. Every other problem (bad
//! coordinates, unknown directives, dangling erase references, unterminated
//! blocks) is logged and skipped so that partially written autosave files
//! still load.

use super::tokens::{
    Attr, RESERVED_KEYWORDS, attr, find_unquoted, is_blank_or_comment, is_style_line, leading_word, parse_attrs,
    split_tokens,
};
use super::{FormatError, HEADER_KEYWORD};
use crate::color::Color;
use crate::document::{Document, Layer, LayerId, Stroke, StrokeId};
use crate::geometry::{MIN_ELLIPSE_SEGMENTS, rect_outline, tessellate_ellipse};
use kurbo::Point;

/// Stroke color used when a path has no `stroke=` attribute.
pub const DEFAULT_STROKE_COLOR: Color = Color::BLACK;
/// Stroke width used when a path has no valid `strokeWidth=` attribute.
pub const DEFAULT_STROKE_WIDTH: f64 = 2.0;

/// Parse the full text of an `.inks` file.
pub fn parse(text: &str) -> Result<Document, FormatError> {
    let text = text.strip_prefix('\u{feff}').unwrap_or(text);
    let mut parser = Parser::new(text);
    parser.read_header()?;
    parser.read_body();
    Ok(parser.doc)
}

/// Layer-scoped defaults for paths that omit style attributes.
#[derive(Debug, Clone, Copy)]
struct StyleDefaults {
    stroke: Color,
    fill: Option<Color>,
    width: f64,
}

impl Default for StyleDefaults {
    fn default() -> Self {
        Self {
            stroke: DEFAULT_STROKE_COLOR,
            fill: None,
            width: DEFAULT_STROKE_WIDTH,
        }
    }
}

/// Where the style of a finished path came from.
enum StyleSource {
    Tokens(Vec<Attr>),
    Defaults,
}

struct Parser<'a> {
    lines: Vec<&'a str>,
    pos: usize,
    doc: Document,
}

impl<'a> Parser<'a> {
    fn new(text: &'a str) -> Self {
        Self {
            lines: text.lines().collect(),
            pos: 0,
            doc: Document::new(),
        }
    }

    /// 1-based number of the line most recently returned by `next_line`.
    fn line_no(&self) -> usize {
        self.pos
    }

    fn next_line(&mut self) -> Option<&'a str> {
        let line = self.lines.get(self.pos).copied()?;
        self.pos += 1;
        Some(line)
    }

    /// Next line that carries content, without consuming it.
    fn peek_content(&self) -> Option<(usize, &'a str)> {
        self.lines
            .iter()
            .enumerate()
            .skip(self.pos)
            .find(|(_, line)| !is_blank_or_comment(line))
            .map(|(i, line)| (i, *line))
    }

    fn read_header(&mut self) -> Result<(), FormatError> {
        while let Some(line) = self.next_line() {
            let trimmed = line.trim();
            if trimmed.is_empty() {
                continue;
            }
            let mut words = trimmed.split_whitespace();
            if words.next() != Some(HEADER_KEYWORD) {
                return Err(FormatError::MissingHeader {
                    line: self.line_no(),
                    found: trimmed.to_string(),
                });
            }
            if words.next().is_none() {
                log::debug!("line {}: header has no version token", self.line_no());
            }
            return Ok(());
        }
        Err(FormatError::Empty)
    }

    fn read_body(&mut self) {
        while let Some(line) = self.next_line() {
            if is_blank_or_comment(line) {
                continue;
            }
            let trimmed = line.trim();
            match leading_word(trimmed) {
                "canvas" => self.read_canvas(trimmed),
                "background" => self.read_background(trimmed),
                "layer" => self.read_layer(trimmed),
                "draw" => {
                    log::warn!("line {}: draw outside of a layer ignored", self.line_no());
                    let mut scratch = Layer::new(LayerId(0), "");
                    self.read_draw(trimmed, &mut scratch, StyleDefaults::default());
                }
                _ if trimmed.starts_with('}') => {
                    log::debug!("line {}: stray closing brace", self.line_no());
                }
                word => {
                    log::debug!("line {}: skipping unknown directive `{}`", self.line_no(), word);
                }
            }
        }
    }

    fn read_canvas(&mut self, line: &str) {
        let parts: Vec<&str> = line.split_whitespace().collect();
        let dims = match parts.as_slice() {
            [_, w, h, ..] => w.parse::<u32>().ok().zip(h.parse::<u32>().ok()),
            _ => None,
        };
        match dims {
            Some((w, h)) if w > 0 && h > 0 => {
                self.doc.canvas_width = w;
                self.doc.canvas_height = h;
            }
            _ => log::warn!("line {}: invalid canvas size `{}`", self.line_no(), line),
        }
    }

    fn read_background(&mut self, line: &str) {
        let value = line["background".len()..].trim();
        match Color::from_hex(value) {
            Ok(color) => self.doc.background = color,
            Err(e) => log::warn!("line {}: {}", self.line_no(), e),
        }
    }

    fn read_layer(&mut self, header: &str) {
        let header_line = self.line_no();
        let brace = find_unquoted(header, '{');
        let attr_text = &header["layer".len()..brace.unwrap_or(header.len())];
        let attrs = parse_attrs(attr_text);

        let requested = match attr(&attrs, "id").map(str::parse::<u32>) {
            Some(Ok(n)) => Some(LayerId(n)),
            Some(Err(_)) => {
                log::warn!("line {header_line}: invalid layer id, assigning a new one");
                None
            }
            None => None,
        };
        let id = match requested {
            Some(id) if self.doc.find_layer(id).is_none() && self.doc.note_layer_id(id) => Some(id),
            Some(id) => {
                log::warn!("line {header_line}: layer id {id} is taken or out of range, assigning a new one");
                self.doc.allocate_layer_id()
            }
            None => self.doc.allocate_layer_id(),
        };

        // `layer id=1 { }` on one line has no body to read.
        let closed_inline = brace.is_some_and(|b| find_unquoted(&header[b + 1..], '}').is_some());
        if brace.is_none() {
            log::debug!("line {header_line}: layer header without `{{`");
        }

        let Some(id) = id else {
            log::warn!("line {header_line}: no layer ids left, layer dropped");
            if !closed_inline {
                let mut scratch = Layer::new(LayerId(0), "");
                self.read_layer_body(&mut scratch);
            }
            return;
        };

        let name = attr(&attrs, "name").map_or_else(|| format!("Layer {id}"), str::to_string);
        let mut layer = Layer::new(id, name);
        layer.visible = attr(&attrs, "visible").map_or(true, |v| parse_bool(v, header_line));
        if !closed_inline {
            self.read_layer_body(&mut layer);
        }
        self.doc.layers.push(layer);
    }

    fn read_layer_body(&mut self, layer: &mut Layer) {
        let mut defaults = StyleDefaults::default();
        loop {
            let Some((index, line)) = self.peek_content() else {
                log::debug!("layer {} not closed before end of file", layer.id);
                self.pos = self.lines.len();
                return;
            };
            let trimmed = line.trim();
            if leading_word(trimmed) == "layer" {
                log::warn!("line {}: layer {} not closed before next layer", index + 1, layer.id);
                self.pos = index;
                return;
            }
            self.pos = index + 1;

            if trimmed.starts_with('}') {
                return;
            }
            match leading_word(trimmed) {
                "draw" => self.read_draw(trimmed, layer, defaults),
                "erase" => self.read_erase(trimmed, layer),
                "set" => self.read_set(trimmed, &mut defaults),
                word => {
                    log::debug!("line {}: skipping `{}` in layer body", self.line_no(), word);
                }
            }
        }
    }

    fn read_set(&mut self, line: &str, defaults: &mut StyleDefaults) {
        let attrs = parse_attrs(&line["set".len()..]);
        let line_no = self.line_no();
        if let Some(v) = attr(&attrs, "stroke") {
            match Color::from_hex(v) {
                Ok(c) => defaults.stroke = c,
                Err(e) => log::warn!("line {line_no}: {e}"),
            }
        }
        if let Some(v) = attr(&attrs, "fill") {
            match Color::parse_optional(v) {
                Ok(c) => defaults.fill = c,
                Err(e) => log::warn!("line {line_no}: {e}"),
            }
        }
        if let Some(v) = attr(&attrs, "strokeWidth") {
            match parse_width(v) {
                Some(w) => defaults.width = w,
                None => log::warn!("line {line_no}: invalid strokeWidth `{v}`"),
            }
        }
    }

    fn read_erase(&mut self, line: &str, layer: &mut Layer) {
        let attrs = parse_attrs(&line["erase".len()..]);
        match attr(&attrs, "ref") {
            Some(id) => match layer.find_stroke_mut(id) {
                Some(stroke) => stroke.erased = true,
                None => log::debug!("line {}: erase of unknown stroke `{}` ignored", self.line_no(), id),
            },
            None => log::debug!("line {}: erase without ref", self.line_no()),
        }
    }

    fn read_draw(&mut self, line: &str, layer: &mut Layer, defaults: StyleDefaults) {
        let words = split_tokens(line);
        let kind = words.get(1).map(String::as_str).unwrap_or("");
        let stroke = match kind {
            "path" => self.read_path(line, layer, defaults),
            "rect" | "circle" | "ellipse" => self.read_shape(kind, line, layer, defaults),
            _ => {
                log::debug!("line {}: unsupported draw kind `{}`", self.line_no(), kind);
                None
            }
        };
        if let Some(stroke) = stroke {
            layer.strokes.push(stroke);
        }
    }

    fn read_path(&mut self, header: &str, layer: &Layer, defaults: StyleDefaults) -> Option<Stroke> {
        let header_line = self.line_no();
        let after_kind = header.trim_start()["draw".len()..].trim_start();
        let after_kind = after_kind.strip_prefix("path").unwrap_or(after_kind);

        let mut points = Vec::new();
        let (attr_text, style) = match find_unquoted(after_kind, '{') {
            Some(open) => {
                let rest = &after_kind[open + 1..];
                let style = match find_unquoted(rest, '}') {
                    Some(close) => {
                        read_commands(&rest[..close], header_line, &mut points);
                        Some(self.style_after_close(&rest[close + 1..]))
                    }
                    None => {
                        read_commands(rest, header_line, &mut points);
                        None
                    }
                };
                (&after_kind[..open], style)
            }
            None => (after_kind, None),
        };
        let header_attrs = parse_attrs(attr_text);
        let style = match style {
            Some(style) => style,
            None => self.read_path_body(&mut points),
        };

        let id = self.assign_stroke_id(attr(&header_attrs, "id"), layer, header_line)?;
        if points.is_empty() {
            log::debug!("line {header_line}: path `{id}` has no points, dropped");
            return None;
        }
        let mut attrs = header_attrs;
        if let StyleSource::Tokens(tail) = style {
            attrs.extend(tail);
        }
        Some(styled_stroke(id, points, &attrs, defaults, header_line))
    }

    /// Collect path commands up to the closing brace. Returns the style found
    /// after the brace, or defaults if the block never closes.
    fn read_path_body(&mut self, points: &mut Vec<Point>) -> StyleSource {
        loop {
            let Some((index, line)) = self.peek_content() else {
                log::debug!("unterminated path block at end of file, keeping {} points", points.len());
                self.pos = self.lines.len();
                return StyleSource::Defaults;
            };
            if RESERVED_KEYWORDS.contains(&leading_word(line)) {
                log::warn!("line {}: path block not closed, keeping {} points", index + 1, points.len());
                self.pos = index;
                return StyleSource::Defaults;
            }
            self.pos = index + 1;

            match find_unquoted(line, '}') {
                Some(close) => {
                    read_commands(&line[..close], self.line_no(), points);
                    return self.style_after_close(&line[close + 1..]);
                }
                None => read_commands(line, self.line_no(), points),
            }
        }
    }

    /// Style tokens after a closing brace: inline on the same line, or on the
    /// next content line if that line holds nothing but attributes.
    fn style_after_close(&mut self, tail: &str) -> StyleSource {
        let tail = tail.trim();
        if !tail.is_empty() {
            return StyleSource::Tokens(parse_attrs(tail));
        }
        match self.peek_content() {
            Some((index, next)) if is_style_line(next) => {
                self.pos = index + 1;
                StyleSource::Tokens(parse_attrs(next))
            }
            _ => StyleSource::Tokens(Vec::new()),
        }
    }

    fn read_shape(&mut self, kind: &str, line: &str, layer: &Layer, defaults: StyleDefaults) -> Option<Stroke> {
        let line_no = self.line_no();
        let attrs = parse_attrs(line);
        let num = |key: &str| attr(&attrs, key).and_then(parse_coord);

        let points = match kind {
            "rect" => {
                let (x, y, w, h) = (num("x")?, num("y")?, num("w")?, num("h")?);
                rect_outline(Point::new(x, y), Point::new(x + w, y + h))
            }
            "circle" => {
                let (cx, cy, r) = (num("cx")?, num("cy")?, num("r")?);
                tessellate_ellipse(Point::new(cx, cy), r, r, MIN_ELLIPSE_SEGMENTS)
            }
            _ => {
                let (cx, cy, rx, ry) = (num("cx")?, num("cy")?, num("rx")?, num("ry")?);
                tessellate_ellipse(Point::new(cx, cy), rx, ry, MIN_ELLIPSE_SEGMENTS)
            }
        };

        let id = self.assign_stroke_id(attr(&attrs, "id"), layer, line_no)?;
        Some(styled_stroke(id, points, &attrs, defaults, line_no))
    }

    /// Use the explicit id when it is free and the counter can move past it,
    /// otherwise synthesize one. `None` once no fresh id is left.
    fn assign_stroke_id(&mut self, explicit: Option<&str>, layer: &Layer, line_no: usize) -> Option<StrokeId> {
        let id = match explicit.filter(|s| !s.is_empty()).map(StrokeId::new) {
            Some(id)
                if !self.doc.contains_stroke(id.as_str())
                    && layer.find_stroke(id.as_str()).is_none()
                    && self.doc.note_stroke_id(&id) =>
            {
                Some(id)
            }
            Some(id) => {
                log::warn!("line {line_no}: stroke id `{id}` is taken or out of range, assigning a new one");
                self.doc.next_stroke_id()
            }
            None => self.doc.next_stroke_id(),
        };
        if id.is_none() {
            log::warn!("line {line_no}: no stroke ids left, stroke dropped");
        }
        id
    }
}

/// Build a stroke from its attributes, falling back to the layer defaults.
fn styled_stroke(id: StrokeId, points: Vec<Point>, attrs: &[Attr], defaults: StyleDefaults, line_no: usize) -> Stroke {
    let color = match attr(attrs, "stroke").or_else(|| attr(attrs, "color")) {
        Some(v) => Color::from_hex(v).unwrap_or_else(|e| {
            log::warn!("line {line_no}: {e}, using default stroke");
            defaults.stroke
        }),
        None => defaults.stroke,
    };
    let fill = match attr(attrs, "fill") {
        Some(v) => Color::parse_optional(v).unwrap_or_else(|e| {
            log::warn!("line {line_no}: {e}, fill dropped");
            None
        }),
        None => defaults.fill,
    };
    let width = match attr(attrs, "strokeWidth").or_else(|| attr(attrs, "width")) {
        Some(v) => parse_width(v).unwrap_or_else(|| {
            log::warn!("line {line_no}: invalid strokeWidth `{v}`");
            defaults.width
        }),
        None => defaults.width,
    };
    Stroke::new(id, color, width, points).with_fill(fill)
}

/// Read `move`/`line`/`curve`/`close` commands from a fragment of a path
/// body. Malformed commands are dropped individually.
fn read_commands(text: &str, line_no: usize, points: &mut Vec<Point>) {
    let words: Vec<&str> = text.split_whitespace().collect();
    let mut i = 0;
    while i < words.len() {
        let word = words[i];
        let arity = match word.to_ascii_lowercase().as_str() {
            "move" | "line" => 2,
            "curve" => 6,
            "close" => 0,
            _ => {
                log::debug!("line {line_no}: unknown path token `{word}`");
                i += 1;
                continue;
            }
        };
        let args = &words[(i + 1).min(words.len())..(i + 1 + arity).min(words.len())];
        i += 1 + args.len();

        if arity == 0 {
            continue;
        }
        let coords: Option<Vec<f64>> = args.iter().map(|a| parse_coord(a)).collect();
        match coords {
            Some(c) if c.len() == arity => points.push(Point::new(c[arity - 2], c[arity - 1])),
            _ => log::warn!("line {line_no}: malformed `{word}` command dropped"),
        }
    }
}

fn parse_coord(text: &str) -> Option<f64> {
    text.parse::<f64>().ok().filter(|v| v.is_finite())
}

fn parse_width(text: &str) -> Option<f64> {
    parse_coord(text).filter(|w| *w > 0.0)
}

fn parse_bool(text: &str, line_no: usize) -> bool {
    match text.to_ascii_lowercase().as_str() {
        "true" | "1" | "yes" => true,
        "false" | "0" | "no" => false,
        other => {
            log::warn!("line {line_no}: invalid visibility `{other}`, assuming visible");
            true
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn only_stroke(doc: &Document) -> &Stroke {
        assert_eq!(doc.layers.len(), 1);
        assert_eq!(doc.layers[0].strokes.len(), 1);
        &doc.layers[0].strokes[0]
    }

    #[test]
    fn test_missing_header_is_fatal() {
        let err = parse("\n\ncanvas 10 10\n").unwrap_err();
        assert_eq!(err.line(), Some(3));
        assert!(matches!(err, FormatError::MissingHeader { .. }));
        assert_eq!(parse("   \n\n").unwrap_err(), FormatError::Empty);
    }

    #[test]
    fn test_header_and_canvas() {
        let doc = parse("inkscript 1.0\ncanvas 100 50\nbackground #FFF\n").unwrap();
        assert_eq!((doc.canvas_width, doc.canvas_height), (100, 50));
        assert_eq!(doc.background, Color::WHITE);
        assert!(doc.layers.is_empty());
    }

    #[test]
    fn test_bad_canvas_is_skipped() {
        let doc = parse("inkscript 1\ncanvas wide 50\ncanvas 0 10\nbackground teal\n").unwrap();
        assert_eq!((doc.canvas_width, doc.canvas_height), (1000, 700));
        assert_eq!(doc.background, crate::document::DEFAULT_BACKGROUND);
    }

    #[test]
    fn test_brace_tail_and_lookahead_are_equivalent() {
        let inline = "inkscript 1.0\nlayer id=1 {\n draw path id=stroke_1 {\n  move 0 0\n  line 5 5\n } stroke=#ff0000 strokeWidth=4\n}\n";
        let lookahead = "inkscript 1.0\nlayer id=1 {\n draw path id=stroke_1 {\n  move 0 0\n  line 5 5\n }\n stroke=#ff0000 strokeWidth=4\n}\n";
        let a = parse(inline).unwrap();
        let b = parse(lookahead).unwrap();
        let (sa, sb) = (only_stroke(&a), only_stroke(&b));
        assert_eq!(sa.color, Some(Color::new(255, 0, 0)));
        assert_eq!(sa.width, 4.0);
        assert_eq!(sa.color, sb.color);
        assert_eq!(sa.width, sb.width);
        assert_eq!(sa.points, sb.points);
    }

    #[test]
    fn test_lookahead_skips_blank_and_comment_lines() {
        let text = "inkscript 1.0\nlayer id=1 {\ndraw path {\nmove 1 1\n}\n\n# style\nfill=#00ff00 stroke=#0000ff\n}\n";
        let doc = parse(text).unwrap();
        let s = only_stroke(&doc);
        assert_eq!(s.fill, Some(Color::new(0, 255, 0)));
        assert_eq!(s.color, Some(Color::new(0, 0, 255)));
    }

    #[test]
    fn test_lookahead_leaves_keyword_lines() {
        let text = "inkscript 1.0\nlayer id=1 {\ndraw path id=stroke_1 {\nmove 1 1\n}\nerase ref=stroke_1\n}\n";
        let doc = parse(text).unwrap();
        let s = only_stroke(&doc);
        assert!(s.erased);
        assert_eq!(s.color, Some(DEFAULT_STROKE_COLOR));
        assert_eq!(s.width, DEFAULT_STROKE_WIDTH);
    }

    #[test]
    fn test_missing_style_defaults() {
        let doc = parse("inkscript 1.0\nlayer {\ndraw path {\nmove 1 2\nline 3 4\n}\n}\n").unwrap();
        let s = only_stroke(&doc);
        assert_eq!(s.color, Some(Color::BLACK));
        assert_eq!(s.width, 2.0);
        assert_eq!(s.fill, None);
        assert_eq!(s.points, vec![Point::new(1.0, 2.0), Point::new(3.0, 4.0)]);
    }

    #[test]
    fn test_synthesized_ids_and_counters() {
        let text = "inkscript 1.0\nlayer id=12 {\ndraw path id=stroke_77 {\nmove 0 0\n}\ndraw path {\nmove 1 1\n}\n}\n";
        let doc = parse(text).unwrap();
        let strokes = &doc.layers[0].strokes;
        assert_eq!(strokes[0].id, "stroke_77");
        assert_eq!(strokes[1].id, "stroke_78");
        assert!(doc.next_stroke_sequence() > Some(78));
        assert!(doc.next_layer_id() > Some(12));
    }

    #[test]
    fn test_layer_attributes() {
        let text = "inkscript 1.0\nlayer id=3 name=\"Back Ground\" visible=false {\n}\nlayer {\n}\n";
        let doc = parse(text).unwrap();
        assert_eq!(doc.layers[0].id, LayerId(3));
        assert_eq!(doc.layers[0].name, "Back Ground");
        assert!(!doc.layers[0].visible);
        assert_eq!(doc.layers[1].id, LayerId(4));
        assert_eq!(doc.layers[1].name, "Layer 4");
        assert!(doc.layers[1].visible);
    }

    #[test]
    fn test_erase_is_layer_scoped() {
        let text = "inkscript 1.0\n\
            layer id=1 {\ndraw path id=stroke_1 {\nmove 0 0\n}\n}\n\
            layer id=2 {\nerase ref=stroke_1\nerase ref=stroke_999\n}\n";
        let doc = parse(text).unwrap();
        assert!(!doc.layers[0].strokes[0].erased);
        assert!(doc.layers[1].strokes.is_empty());
    }

    #[test]
    fn test_unknown_lines_skipped() {
        let text = "inkscript 1.0\nfuturistic on\nlayer id=1 {\ntransform rotate=45\nset blend=multiply\ndraw text \"hi\" x=1 y=1\ndraw path {\nmove 1 1\nwiggle 3\n}\n}\n";
        let doc = parse(text).unwrap();
        assert_eq!(only_stroke(&doc).points, vec![Point::new(1.0, 1.0)]);
    }

    #[test]
    fn test_malformed_coordinate_drops_single_point() {
        let text = "inkscript 1.0\nlayer id=1 {\ndraw path {\nmove 0 0\nline 10 abc\nline 20 20\nline 30\n}\n}\n";
        let doc = parse(text).unwrap();
        assert_eq!(only_stroke(&doc).points, vec![Point::new(0.0, 0.0), Point::new(20.0, 20.0)]);
    }

    #[test]
    fn test_unterminated_path_at_eof_is_salvaged() {
        let text = "inkscript 1.0\nlayer id=1 {\ndraw path id=stroke_4 {\nmove 0 0\nline 1 1\n";
        let doc = parse(text).unwrap();
        let s = only_stroke(&doc);
        assert_eq!(s.id, "stroke_4");
        assert_eq!(s.points.len(), 2);
        assert_eq!(s.color, Some(DEFAULT_STROKE_COLOR));
        assert_eq!(doc.next_stroke_sequence(), Some(5));
    }

    #[test]
    fn test_unterminated_path_before_next_draw() {
        let text = "inkscript 1.0\nlayer id=1 {\ndraw path {\nmove 0 0\ndraw path {\nmove 5 5\n} stroke=#fff\n}\n";
        let doc = parse(text).unwrap();
        let strokes = &doc.layers[0].strokes;
        assert_eq!(strokes.len(), 2);
        assert_eq!(strokes[0].color, Some(DEFAULT_STROKE_COLOR));
        assert_eq!(strokes[1].color, Some(Color::WHITE));
    }

    #[test]
    fn test_unterminated_path_before_transform() {
        let text = "inkscript 1.0\nlayer id=1 {\ndraw path id=a {\nmove 0 0\nline 1 1\n\
            transform translate 5 5\nline 7 7\n} stroke=#fff\n}\n";
        let doc = parse(text).unwrap();
        let s = only_stroke(&doc);
        assert_eq!(s.points, vec![Point::new(0.0, 0.0), Point::new(1.0, 1.0)]);
        assert_eq!(s.color, Some(DEFAULT_STROKE_COLOR));
    }

    #[test]
    fn test_single_line_path_block() {
        let text = "inkscript 1.0\nlayer id=1 {\ndraw path id=p { move 1 2 line 3 4 curve 0 0 0 0 5 6 close } stroke=#00f fill=none\n}\n";
        let doc = parse(text).unwrap();
        let s = only_stroke(&doc);
        assert_eq!(s.points, vec![Point::new(1.0, 2.0), Point::new(3.0, 4.0), Point::new(5.0, 6.0)]);
        assert_eq!(s.color, Some(Color::new(0, 0, 255)));
        assert_eq!(s.fill, None);
    }

    #[test]
    fn test_points_before_closing_brace() {
        let text = "inkscript 1.0\nlayer id=1 {\ndraw path { move 1 1\nline 2 2 } strokeWidth=7\n}\n";
        let doc = parse(text).unwrap();
        let s = only_stroke(&doc);
        assert_eq!(s.points.len(), 2);
        assert_eq!(s.width, 7.0);
    }

    #[test]
    fn test_set_changes_layer_defaults() {
        let text = "inkscript 1.0\nlayer id=1 {\nset stroke=#00ff00\nset strokeWidth=5\ndraw path {\nmove 0 0\n}\n}\nlayer id=2 {\ndraw path {\nmove 0 0\n}\n}\n";
        let doc = parse(text).unwrap();
        let green = &doc.layers[0].strokes[0];
        assert_eq!(green.color, Some(Color::new(0, 255, 0)));
        assert_eq!(green.width, 5.0);
        let plain = &doc.layers[1].strokes[0];
        assert_eq!(plain.color, Some(DEFAULT_STROKE_COLOR));
    }

    #[test]
    fn test_rect_and_circle_shapes() {
        let text = "inkscript 1.0\nlayer id=1 {\ndraw rect x=0 y=0 w=10 h=5 fill=#fff\ndraw circle cx=5 cy=5 r=2 stroke=#f00\ndraw rect x=1\n}\n";
        let doc = parse(text).unwrap();
        let strokes = &doc.layers[0].strokes;
        assert_eq!(strokes.len(), 2);
        assert_eq!(strokes[0].points.len(), 5);
        assert_eq!(strokes[0].points[2], Point::new(10.0, 5.0));
        assert_eq!(strokes[0].fill, Some(Color::WHITE));
        assert_eq!(strokes[1].points.first(), strokes[1].points.last());
    }

    #[test]
    fn test_duplicate_ids_are_reassigned() {
        let text = "inkscript 1.0\nlayer id=1 {\ndraw path id=stroke_3 {\nmove 0 0\n}\n}\nlayer id=1 {\ndraw path id=stroke_3 {\nmove 1 1\n}\n}\n";
        let doc = parse(text).unwrap();
        assert_eq!(doc.layers.len(), 2);
        assert_ne!(doc.layers[0].id, doc.layers[1].id);
        assert_eq!(doc.layers[0].strokes[0].id, "stroke_3");
        assert_eq!(doc.layers[1].strokes[0].id, "stroke_4");
    }

    #[test]
    fn test_ids_at_the_limit_are_reassigned() {
        let text = "inkscript 1.0\nlayer id=4294967295 {\n\
            draw path id=stroke_18446744073709551615 {\nmove 0 0\n}\n}\nlayer {\n}\n";
        let mut doc = parse(text).unwrap();
        let ids: Vec<LayerId> = doc.layers.iter().map(|l| l.id).collect();
        assert_eq!(ids, vec![LayerId(1), LayerId(2)]);
        assert_eq!(doc.layers[0].strokes[0].id, "stroke_1");
        assert_eq!(doc.next_stroke_id(), Some(StrokeId::sequential(2)));
    }

    #[test]
    fn test_layer_dropped_when_ids_run_out() {
        let text = "inkscript 1.0\nlayer id=4294967294 {\n}\nlayer {\n}\n\
            layer {\ndraw path {\nmove 1 1\n}\n}\nlayer id=7 {\n}\n";
        let doc = parse(text).unwrap();
        let ids: Vec<LayerId> = doc.layers.iter().map(|l| l.id).collect();
        assert_eq!(ids, vec![LayerId(u32::MAX - 1), LayerId(u32::MAX), LayerId(7)]);
        assert_eq!(doc.stroke_count(), 0);
        assert_eq!(doc.next_layer_id(), None);
    }

    #[test]
    fn test_huge_circle_is_bounded() {
        let text = "inkscript 1.0\nlayer id=1 {\ndraw circle cx=0 cy=0 r=1e12\n}\n";
        let doc = parse(text).unwrap();
        let s = only_stroke(&doc);
        assert_eq!(s.points.len(), crate::geometry::MAX_ELLIPSE_SEGMENTS + 1);
    }

    #[test]
    fn test_empty_path_dropped() {
        let doc = parse("inkscript 1.0\nlayer id=1 {\ndraw path id=stroke_9 { }\n}\n").unwrap();
        assert!(doc.layers[0].strokes.is_empty());
        assert_eq!(doc.next_stroke_sequence(), Some(10));
    }

    #[test]
    fn test_unclosed_layer_before_next_layer() {
        let text = "inkscript 1.0\nlayer id=1 {\ndraw path {\nmove 0 0\n}\nlayer id=2 {\n}\n";
        let doc = parse(text).unwrap();
        assert_eq!(doc.layers.len(), 2);
        assert_eq!(doc.layers[0].strokes.len(), 1);
    }

    #[test]
    fn test_draw_outside_layer_ignored() {
        let text = "inkscript 1.0\ndraw path {\nmove 0 0\n} stroke=#fff\nlayer id=1 {\n}\n";
        let doc = parse(text).unwrap();
        assert_eq!(doc.layers.len(), 1);
        assert!(doc.is_empty());
    }
}
