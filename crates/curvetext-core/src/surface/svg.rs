//! In-memory SVG element tree.

use super::{ElementId, Surface};
use crate::error::{EditorError, EditorResult};
use kurbo::{BezPath, PathEl, Point, Rect, Shape as KurboShape};
use std::collections::HashMap;
use std::fmt::Write;

const SVG_NAMESPACE: &str = "http://www.w3.org/2000/svg";
/// Default canvas position in the page (container padding).
const DEFAULT_ORIGIN: Point = Point::new(24.0, 24.0);
/// Font size used when an element has none set.
const DEFAULT_FONT_SIZE: f64 = 16.0;
/// Average glyph advance as a fraction of the font size.
const GLYPH_ADVANCE: f64 = 0.6;
/// How far glyphs reach away from the baseline, as a fraction of the font size.
const GLYPH_EXTENT: f64 = 0.8;
const FLATTEN_TOLERANCE: f64 = 0.25;

#[derive(Debug, Clone)]
struct Node {
    tag: String,
    attributes: Vec<(String, String)>,
    style: Vec<(String, String)>,
    classes: Vec<String>,
    text: Option<String>,
    children: Vec<ElementId>,
    parent: Option<ElementId>,
}

impl Node {
    fn new(tag: &str) -> Self {
        Self {
            tag: tag.to_string(),
            attributes: Vec::new(),
            style: Vec::new(),
            classes: Vec::new(),
            text: None,
            children: Vec::new(),
            parent: None,
        }
    }

    fn attribute(&self, name: &str) -> Option<&str> {
        self.attributes
            .iter()
            .find(|(key, _)| key == name)
            .map(|(_, value)| value.as_str())
    }

    fn style(&self, property: &str) -> Option<&str> {
        self.style
            .iter()
            .find(|(key, _)| key == property)
            .map(|(_, value)| value.as_str())
    }

    fn number(&self, name: &str) -> Option<f64> {
        self.attribute(name)?.trim().parse().ok()
    }

    fn font_size(&self) -> f64 {
        self.style("fontSize")
            .and_then(|v| v.trim().trim_end_matches("px").parse().ok())
            .unwrap_or(DEFAULT_FONT_SIZE)
    }

    fn is_hidden(&self) -> bool {
        self.style("display") == Some("none")
    }
}

/// Retained SVG document implementing [`Surface`].
///
/// Text layout is approximate: glyphs get a fixed advance and extent
/// relative to the font size. That is enough for cropping and hit testing.
#[derive(Debug, Clone)]
pub struct SvgSurface {
    nodes: HashMap<ElementId, Node>,
    next_id: u64,
    root: ElementId,
    origin: Point,
}

impl Default for SvgSurface {
    fn default() -> Self {
        Self::new(DEFAULT_ORIGIN)
    }
}

impl SvgSurface {
    /// Create an empty document whose canvas sits at `origin` in the page.
    pub fn new(origin: Point) -> Self {
        let root = ElementId(0);
        let mut node = Node::new("svg");
        node.attributes
            .push(("xmlns".to_string(), SVG_NAMESPACE.to_string()));
        let mut nodes = HashMap::new();
        nodes.insert(root, node);
        Self {
            nodes,
            next_id: 1,
            root,
            origin,
        }
    }

    fn node(&self, element: ElementId) -> EditorResult<&Node> {
        self.nodes
            .get(&element)
            .ok_or(EditorError::UnknownElement(element))
    }

    fn node_mut(&mut self, element: ElementId) -> EditorResult<&mut Node> {
        self.nodes
            .get_mut(&element)
            .ok_or(EditorError::UnknownElement(element))
    }

    pub fn contains(&self, element: ElementId) -> bool {
        self.nodes.contains_key(&element)
    }

    /// Number of live elements, root included.
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    pub fn tag(&self, element: ElementId) -> Option<&str> {
        self.nodes.get(&element).map(|n| n.tag.as_str())
    }

    pub fn attribute(&self, element: ElementId, name: &str) -> Option<&str> {
        self.nodes.get(&element)?.attribute(name)
    }

    pub fn style(&self, element: ElementId, property: &str) -> Option<&str> {
        self.nodes.get(&element)?.style(property)
    }

    pub fn style_len(&self, element: ElementId) -> usize {
        self.nodes.get(&element).map_or(0, |n| n.style.len())
    }

    pub fn has_class(&self, element: ElementId, class: &str) -> bool {
        self.nodes
            .get(&element)
            .is_some_and(|n| n.classes.iter().any(|c| c == class))
    }

    pub fn text(&self, element: ElementId) -> Option<&str> {
        self.nodes.get(&element)?.text.as_deref()
    }

    pub fn children(&self, element: ElementId) -> &[ElementId] {
        self.nodes
            .get(&element)
            .map_or(&[], |n| n.children.as_slice())
    }

    /// First element (in creation order) with `name="value"`.
    pub fn find_by_attribute(&self, name: &str, value: &str) -> Option<ElementId> {
        self.nodes
            .iter()
            .filter(|(_, node)| node.attribute(name) == Some(value))
            .map(|(&id, _)| id)
            .min()
    }

    /// Bounds in canvas-local coordinates.
    fn local_bounds(&self, element: ElementId) -> Option<Rect> {
        let node = self.nodes.get(&element)?;
        if node.is_hidden() {
            return None;
        }
        match node.tag.as_str() {
            "circle" => {
                let center = Point::new(node.number("cx")?, node.number("cy")?);
                let r = node.number("r").unwrap_or(0.0);
                Some(Rect::from_center_size(center, (2.0 * r, 2.0 * r)))
            }
            "path" => {
                let path = BezPath::from_svg(node.attribute("d")?).ok()?;
                Some(path.bounding_box())
            }
            "text" => match node.children.iter().find(|&&c| self.tag(c) == Some("textPath")) {
                Some(&text_path) => self.text_on_path_bounds(node, text_path),
                None => self.plain_text_bounds(node),
            },
            "g" => node
                .children
                .iter()
                .filter_map(|&c| self.local_bounds(c))
                .reduce(|a, b| a.union(b)),
            _ => None,
        }
    }

    fn plain_text_bounds(&self, node: &Node) -> Option<Rect> {
        let content = node.text.as_deref().filter(|t| !t.is_empty())?;
        let font_size = node.font_size();
        let x = node.number("x").unwrap_or(0.0);
        let y = node.number("y").unwrap_or(0.0);
        let width = content.chars().count() as f64 * font_size * GLYPH_ADVANCE;
        Some(Rect::new(x, y - font_size * GLYPH_EXTENT, x + width, y))
    }

    fn text_on_path_bounds(&self, text: &Node, text_path: ElementId) -> Option<Rect> {
        let content = self.text(text_path).filter(|t| !t.is_empty())?;
        let href = self.attribute(text_path, "href")?;
        let target = self.find_by_attribute("id", href.strip_prefix('#')?)?;
        let path = BezPath::from_svg(self.attribute(target, "d")?).ok()?;

        let font_size = text.font_size();
        let start = text.number("x").unwrap_or(0.0);
        let end = start + content.chars().count() as f64 * font_size * GLYPH_ADVANCE;
        let extent = font_size * GLYPH_EXTENT;
        baseline_bounds(&path, start, end).map(|r| r.inflate(extent, extent))
    }

    /// Serialize the document as SVG markup.
    pub fn to_svg(&self) -> String {
        let mut out = String::new();
        self.write_node(&mut out, self.root);
        out
    }

    fn write_node(&self, out: &mut String, element: ElementId) {
        let Some(node) = self.nodes.get(&element) else {
            return;
        };
        // Writing to a String cannot fail.
        let _ = write!(out, "<{}", node.tag);
        for (name, value) in &node.attributes {
            let _ = write!(out, " {}=\"{}\"", name, escape(value));
        }
        if !node.classes.is_empty() {
            let _ = write!(out, " class=\"{}\"", escape(&node.classes.join(" ")));
        }
        if !node.style.is_empty() {
            let style = node
                .style
                .iter()
                .map(|(k, v)| format!("{}: {}", kebab_case(k), v))
                .collect::<Vec<_>>()
                .join("; ");
            let _ = write!(out, " style=\"{}\"", escape(&style));
        }
        if node.children.is_empty() && node.text.is_none() {
            out.push_str("/>");
            return;
        }
        out.push('>');
        if let Some(text) = &node.text {
            out.push_str(&escape(text));
        }
        for &child in &node.children {
            self.write_node(out, child);
        }
        let _ = write!(out, "</{}>", node.tag);
    }
}

impl Surface for SvgSurface {
    fn root(&self) -> ElementId {
        self.root
    }

    fn origin(&self) -> Point {
        self.origin
    }

    fn create_element(&mut self, tag: &str) -> ElementId {
        let id = ElementId(self.next_id);
        self.next_id += 1;
        self.nodes.insert(id, Node::new(tag));
        id
    }

    fn set_attribute(&mut self, element: ElementId, name: &str, value: &str) -> EditorResult<()> {
        let node = self.node_mut(element)?;
        match node.attributes.iter_mut().find(|(key, _)| key == name) {
            Some((_, existing)) => *existing = value.to_string(),
            None => node.attributes.push((name.to_string(), value.to_string())),
        }
        Ok(())
    }

    fn set_style(&mut self, element: ElementId, property: &str, value: &str) -> EditorResult<()> {
        let node = self.node_mut(element)?;
        match node.style.iter_mut().find(|(key, _)| key == property) {
            Some((_, existing)) => *existing = value.to_string(),
            None => node.style.push((property.to_string(), value.to_string())),
        }
        Ok(())
    }

    fn clear_style(&mut self, element: ElementId) -> EditorResult<()> {
        self.node_mut(element)?.style.clear();
        Ok(())
    }

    fn set_class(&mut self, element: ElementId, class: &str, enabled: bool) -> EditorResult<()> {
        let node = self.node_mut(element)?;
        let present = node.classes.iter().any(|c| c == class);
        if enabled && !present {
            node.classes.push(class.to_string());
        } else if !enabled {
            node.classes.retain(|c| c != class);
        }
        Ok(())
    }

    fn set_text(&mut self, element: ElementId, text: &str) -> EditorResult<()> {
        self.node_mut(element)?.text = Some(text.to_string());
        Ok(())
    }

    fn append_child(&mut self, parent: ElementId, child: ElementId) -> EditorResult<()> {
        self.node(parent)?;
        let old_parent = self.node(child)?.parent;
        if let Some(old) = old_parent.and_then(|p| self.nodes.get_mut(&p)) {
            old.children.retain(|&c| c != child);
        }
        self.node_mut(child)?.parent = Some(parent);
        self.node_mut(parent)?.children.push(child);
        Ok(())
    }

    fn remove(&mut self, element: ElementId) -> EditorResult<()> {
        if element == self.root {
            log::warn!("Refusing to remove the canvas root");
            return Ok(());
        }
        let node = self
            .nodes
            .remove(&element)
            .ok_or(EditorError::UnknownElement(element))?;
        if let Some(parent) = node.parent.and_then(|p| self.nodes.get_mut(&p)) {
            parent.children.retain(|&c| c != element);
        }
        let mut pending = node.children;
        while let Some(id) = pending.pop() {
            if let Some(child) = self.nodes.remove(&id) {
                pending.extend(child.children);
            }
        }
        Ok(())
    }

    fn bounding_box(&self, element: ElementId) -> Option<Rect> {
        if element == self.root {
            let node = self.nodes.get(&element)?;
            let width = node.number("width").unwrap_or(0.0);
            let height = node.number("height").unwrap_or(0.0);
            return Some(Rect::from_origin_size(self.origin, (width, height)));
        }
        self.local_bounds(element)
            .map(|r| r + self.origin.to_vec2())
    }
}

/// Bounds of the stretch of `path` between arc lengths `start` and `end`.
fn baseline_bounds(path: &BezPath, start: f64, end: f64) -> Option<Rect> {
    if !crate::geometry::is_layout_safe(path) {
        log::debug!("Skipping text layout on an oversized or non-finite path");
        return None;
    }
    let mut polyline: Vec<Point> = Vec::new();
    kurbo::flatten(path.iter(), FLATTEN_TOLERANCE, |el| match el {
        PathEl::MoveTo(p) | PathEl::LineTo(p) => polyline.push(p),
        PathEl::ClosePath => {
            if let Some(&first) = polyline.first() {
                polyline.push(first);
            }
        }
        _ => {}
    });

    let mut bounds: Option<Rect> = None;
    let mut include = |p: Point| {
        bounds = Some(match bounds {
            Some(r) => r.union_pt(p),
            None => Rect::from_points(p, p),
        });
    };

    let mut walked = 0.0;
    for pair in polyline.windows(2) {
        let (a, b) = (pair[0], pair[1]);
        let len = (b - a).hypot();
        let (s0, s1) = (walked, walked + len);
        walked = s1;
        if len <= f64::EPSILON || s1 < start || s0 > end {
            continue;
        }
        let from = ((start - s0) / len).clamp(0.0, 1.0);
        let to = ((end - s0) / len).clamp(0.0, 1.0);
        include(a.lerp(b, from));
        include(a.lerp(b, to));
    }
    bounds
}

fn kebab_case(property: &str) -> String {
    let mut out = String::with_capacity(property.len() + 4);
    for c in property.chars() {
        if c.is_uppercase() {
            out.push('-');
            out.extend(c.to_lowercase());
        } else {
            out.push(c);
        }
    }
    out
}

fn escape(value: &str) -> String {
    value
        .replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_append_and_serialize() {
        let mut svg = SvgSurface::default();
        let root = svg.root();
        let circle = svg.create_element("circle");
        svg.set_attribute(circle, "cx", "10").unwrap();
        svg.set_style(circle, "fillOpacity", "0.7").unwrap();
        svg.set_class(circle, "marker", true).unwrap();
        svg.append_child(root, circle).unwrap();

        let markup = svg.to_svg();
        assert_eq!(
            markup,
            "<svg xmlns=\"http://www.w3.org/2000/svg\"><circle cx=\"10\" class=\"marker\" style=\"fill-opacity: 0.7\"/></svg>"
        );
    }

    #[test]
    fn test_text_is_escaped() {
        let mut svg = SvgSurface::default();
        let text = svg.create_element("text");
        svg.set_text(text, "a < b & \"c\"").unwrap();
        svg.append_child(svg.root(), text).unwrap();
        assert!(svg.to_svg().contains("a &lt; b &amp; &quot;c&quot;"));
    }

    #[test]
    fn test_remove_drops_subtree() {
        let mut svg = SvgSurface::default();
        let group = svg.create_element("g");
        let child = svg.create_element("path");
        svg.append_child(svg.root(), group).unwrap();
        svg.append_child(group, child).unwrap();
        assert_eq!(svg.len(), 3);

        svg.remove(group).unwrap();
        assert_eq!(svg.len(), 1);
        assert!(!svg.contains(child));
        assert!(svg.children(svg.root()).is_empty());
        assert_eq!(svg.remove(group), Err(EditorError::UnknownElement(group)));
    }

    #[test]
    fn test_reparenting_detaches() {
        let mut svg = SvgSurface::default();
        let a = svg.create_element("g");
        let b = svg.create_element("g");
        let leaf = svg.create_element("circle");
        svg.append_child(a, leaf).unwrap();
        svg.append_child(b, leaf).unwrap();
        assert!(svg.children(a).is_empty());
        assert_eq!(svg.children(b), &[leaf]);
    }

    #[test]
    fn test_circle_bounds_in_client_space() {
        let mut svg = SvgSurface::new(Point::new(100.0, 50.0));
        let circle = svg.create_element("circle");
        svg.set_attribute(circle, "cx", "10").unwrap();
        svg.set_attribute(circle, "cy", "20").unwrap();
        svg.set_attribute(circle, "r", "5").unwrap();
        let bounds = svg.bounding_box(circle).unwrap();
        assert!((bounds.x0 - 105.0).abs() < f64::EPSILON);
        assert!((bounds.y0 - 65.0).abs() < f64::EPSILON);
        assert!((bounds.x1 - 115.0).abs() < f64::EPSILON);
    }

    #[test]
    fn test_hidden_has_no_bounds() {
        let mut svg = SvgSurface::default();
        let circle = svg.create_element("circle");
        svg.set_attribute(circle, "cx", "10").unwrap();
        svg.set_attribute(circle, "cy", "20").unwrap();
        svg.set_style(circle, "display", "none").unwrap();
        assert!(svg.bounding_box(circle).is_none());
    }

    #[test]
    fn test_text_on_straight_path_bounds() {
        let mut svg = SvgSurface::new(Point::ZERO);
        let path = svg.create_element("path");
        svg.set_attribute(path, "id", "ctg-test").unwrap();
        svg.set_attribute(path, "d", "M 0 100 L 1000 100").unwrap();
        let text = svg.create_element("text");
        svg.set_style(text, "fontSize", "10px").unwrap();
        svg.set_attribute(text, "x", "50").unwrap();
        let text_path = svg.create_element("textPath");
        svg.set_attribute(text_path, "href", "#ctg-test").unwrap();
        svg.set_text(text_path, "abcde").unwrap();
        svg.append_child(text, text_path).unwrap();

        // 5 glyphs * 10px * 0.6 = 30px of baseline starting at 50
        let bounds = svg.bounding_box(text).unwrap();
        assert!((bounds.x0 - 42.0).abs() < 1e-9);
        assert!((bounds.x1 - 88.0).abs() < 1e-9);
        assert!((bounds.y0 - 92.0).abs() < 1e-9);
        assert!((bounds.y1 - 108.0).abs() < 1e-9);
    }

    #[test]
    fn test_text_past_path_end_has_no_bounds() {
        let mut svg = SvgSurface::new(Point::ZERO);
        let path = svg.create_element("path");
        svg.set_attribute(path, "id", "p").unwrap();
        svg.set_attribute(path, "d", "M 0 0 L 10 0").unwrap();
        let text = svg.create_element("text");
        svg.set_attribute(text, "x", "500").unwrap();
        let text_path = svg.create_element("textPath");
        svg.set_attribute(text_path, "href", "#p").unwrap();
        svg.set_text(text_path, "hi").unwrap();
        svg.append_child(text, text_path).unwrap();
        assert!(svg.bounding_box(text).is_none());
    }

    #[test]
    fn test_text_on_huge_path_has_no_bounds() {
        let mut svg = SvgSurface::new(Point::ZERO);
        let path = svg.create_element("path");
        svg.set_attribute(path, "id", "p").unwrap();
        let d = format!("M 100 250 C 150 {} 340 100 390 250", 1e200);
        svg.set_attribute(path, "d", &d).unwrap();
        let text = svg.create_element("text");
        let text_path = svg.create_element("textPath");
        svg.set_attribute(text_path, "href", "#p").unwrap();
        svg.set_text(text_path, "hi").unwrap();
        svg.append_child(text, text_path).unwrap();
        assert!(svg.bounding_box(text).is_none());
    }

    #[test]
    fn test_kebab_case() {
        assert_eq!(kebab_case("fontSize"), "font-size");
        assert_eq!(kebab_case("WebkitTextStroke"), "-webkit-text-stroke");
    }
}
