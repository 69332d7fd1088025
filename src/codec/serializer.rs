// SVG rendering of animated documents

use chrono::{DateTime, SecondsFormat, Utc};
use log::debug;
use serde::{Deserialize, Serialize};

use super::encoder::{AnimatedDocument, Segment};
use crate::capture::Point;

pub const SVG_NS: &str = "http://www.w3.org/2000/svg";
pub const SIGNATURE_METADATA_ID: &str = "signature-metadata";
pub const PERFORMANCE_GROUP_ID: &str = "signature-performance";

const INDENT: &str = "  ";

/// Who signs the drawing and why. Only laid out in the document, never signed here.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct SignatureMetadata {
    pub signer: String,
    pub signed_at: DateTime<Utc>,
    pub intent: String,
}

impl SignatureMetadata {
    /// Metadata stamped with the current time
    pub fn new(signer: impl Into<String>, intent: impl Into<String>) -> Self {
        Self {
            signer: signer.into(),
            signed_at: Utc::now(),
            intent: intent.into(),
        }
    }
}

/// Shape of the rendered document
#[derive(Clone, Debug, Default, PartialEq)]
pub enum DocumentLayout {
    /// Root, segment group and segments only
    #[default]
    Plain,
    /// Adds a metadata block and a trailing placeholder where an external
    /// enveloped signature over the metadata and the segment group belongs
    Signable(SignatureMetadata),
}

/// Renders animated documents as SVG with SMIL visibility animations.
///
/// Output is deterministic: the same document and layout always produce the same
/// text. Coordinates use 2 decimals, key times 4 and durations 2.
#[derive(Clone, Debug, Default)]
pub struct DocumentSerializer {
    layout: DocumentLayout,
}

impl DocumentSerializer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_layout(layout: DocumentLayout) -> Self {
        Self { layout }
    }

    pub fn serialize(&self, doc: &AnimatedDocument) -> String {
        let mut svg = String::with_capacity(512 + doc.segments.len() * 320);

        svg.push_str(&format!(
            r#"<svg width="{w}" height="{h}" viewBox="0 0 {w} {h}" xmlns="{ns}">"#,
            w = doc.style.width,
            h = doc.style.height,
            ns = SVG_NS,
        ));
        svg.push('\n');

        let group_id = match &self.layout {
            DocumentLayout::Plain => String::new(),
            DocumentLayout::Signable(metadata) => {
                push_metadata(&mut svg, metadata);
                format!(r#" id="{}""#, PERFORMANCE_GROUP_ID)
            }
        };

        svg.push_str(&format!(
            r#"{INDENT}<g{} stroke="{}" stroke-width="{}" fill="none">"#,
            group_id,
            escape_xml(&doc.style.stroke_color),
            doc.style.stroke_width,
        ));
        svg.push('\n');
        for segment in &doc.segments {
            push_segment(&mut svg, segment, doc.total_duration);
        }
        svg.push_str(INDENT);
        svg.push_str("</g>\n");

        if let DocumentLayout::Signable(_) = self.layout {
            svg.push_str(&format!(
                "{INDENT}<!-- signature placeholder: an enveloped signature over #{} and #{} is inserted here -->\n",
                SIGNATURE_METADATA_ID, PERFORMANCE_GROUP_ID
            ));
        }

        svg.push_str("</svg>");
        debug!(
            "Serialized {} segments into {} bytes",
            doc.segments.len(),
            svg.len()
        );
        svg
    }
}

/// Serialize with the plain layout
pub fn serialize(doc: &AnimatedDocument) -> String {
    DocumentSerializer::new().serialize(doc)
}

/// Polyline path data through the given points, `M x0 y0 L x1 y1 ...`
pub fn path_data(points: &[Point]) -> String {
    let mut d = String::with_capacity(points.len() * 16);
    for (i, point) in points.iter().enumerate() {
        let command = if i == 0 { "M" } else { " L" };
        d.push_str(&format!(
            "{} {:.2} {:.2}",
            command,
            coordinate(point.x),
            coordinate(point.y)
        ));
    }
    d
}

/// Values that would print as `-0.00` print as `0.00`
fn coordinate(value: f64) -> f64 {
    if value.abs() < 0.005 { 0. } else { value }
}

fn push_segment(svg: &mut String, segment: &Segment, total_duration: f64) {
    let indent = INDENT.repeat(2);
    svg.push_str(&format!(
        "{indent}<path d=\"{}\" visibility=\"hidden\">\n",
        path_data(&segment.points)
    ));
    svg.push_str(&format!(
        "{indent}{INDENT}<animate attributeName=\"visibility\" values=\"hidden;visible;visible;visible\" keyTimes=\"0;{:.4};{:.4};1\" dur=\"{:.2}s\" fill=\"freeze\"/>\n",
        segment.window.start, segment.window.end, total_duration
    ));
    svg.push_str(&format!("{indent}</path>\n"));
}

fn push_metadata(svg: &mut String, metadata: &SignatureMetadata) {
    let indent = INDENT.repeat(2);
    svg.push_str(&format!(
        "{INDENT}<metadata id=\"{}\">\n",
        SIGNATURE_METADATA_ID
    ));
    svg.push_str(&format!(
        "{indent}<signer>{}</signer>\n",
        escape_xml(&metadata.signer)
    ));
    svg.push_str(&format!(
        "{indent}<signedAt>{}</signedAt>\n",
        metadata
            .signed_at
            .to_rfc3339_opts(SecondsFormat::Secs, true)
    ));
    svg.push_str(&format!(
        "{indent}<intent>{}</intent>\n",
        escape_xml(&metadata.intent)
    ));
    svg.push_str(INDENT);
    svg.push_str("</metadata>\n");
}

fn escape_xml(raw: &str) -> String {
    let mut escaped = String::with_capacity(raw.len());
    for c in raw.chars() {
        match c {
            '&' => escaped.push_str("&amp;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            '"' => escaped.push_str("&quot;"),
            '\'' => escaped.push_str("&apos;"),
            _ => escaped.push(c),
        }
    }
    escaped
}
