//! Shape template archive handling
//!
//! A shape template is a zip archive whose `Document.xml` declares the
//! typed properties tools of that shape may carry. The host writes
//! these archives itself; here they are read and written natively so
//! the codec works without the host application installed. Only the
//! property declarations are interpreted; everything else in the
//! document is ignored.

use crate::template::{PropertyDescriptor, TemplateProperty};
use regex::Regex;
use std::fs;
use std::io::{Read, Write};
use std::path::Path;
use toolcrib_core::error::StoreError;
use toolcrib_core::shape::{ParamValue, Shape};
use toolcrib_core::units::{Quantity, Unit};
use zip::write::SimpleFileOptions;
use zip::{ZipArchive, ZipWriter};

const DOCUMENT_NAME: &str = "Document.xml";

fn template_err(path: &Path, reason: impl ToString) -> StoreError {
    StoreError::TemplateRead {
        path: path.to_path_buf(),
        reason: reason.to_string(),
    }
}

fn escape_attr(value: &str) -> String {
    value
        .replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
}

fn unescape_attr(value: &str) -> String {
    value
        .replace("&quot;", "\"")
        .replace("&gt;", ">")
        .replace("&lt;", "<")
        .replace("&amp;", "&")
}

/// Read the ordered property schema out of a template archive.
pub fn read_template(path: &Path) -> Result<Vec<TemplateProperty>, StoreError> {
    let file = fs::File::open(path)?;
    let mut archive = ZipArchive::new(file).map_err(|e| template_err(path, e))?;
    let mut xml = String::new();
    archive
        .by_name(DOCUMENT_NAME)
        .map_err(|e| template_err(path, e))?
        .read_to_string(&mut xml)?;
    parse_properties(path, &xml)
}

fn parse_properties(path: &Path, xml: &str) -> Result<Vec<TemplateProperty>, StoreError> {
    // Regexes are infallible for these literal patterns.
    let property_re =
        Regex::new(r#"(?s)<Property\s+name="([^"]+)"\s+type="([^"]+)"\s*>(.*?)</Property>"#)
            .map_err(|e| template_err(path, e))?;
    let quantity_re = Regex::new(r#"<Quantity\s+value="([^"]*)"\s+unit="([^"]*)""#)
        .map_err(|e| template_err(path, e))?;
    let scalar_re = Regex::new(r#"<(Integer|Float|String)\s+value="([^"]*)""#)
        .map_err(|e| template_err(path, e))?;

    let mut properties = Vec::new();
    for caps in property_re.captures_iter(xml) {
        let name = unescape_attr(&caps[1]);
        let host_type = &caps[2];
        let body = &caps[3];

        let (descriptor, default) = if host_type.contains("PropertyInteger") {
            let default = scalar_re
                .captures(body)
                .and_then(|c| c[2].parse::<i64>().ok())
                .map(ParamValue::Integer);
            (PropertyDescriptor::Integer, default)
        } else if host_type.contains("PropertyFloat") || host_type.contains("PropertyPrecision") {
            let default = scalar_re
                .captures(body)
                .and_then(|c| c[2].parse::<f64>().ok())
                .map(ParamValue::Real);
            (PropertyDescriptor::Real, default)
        } else if host_type.contains("PropertyString") || host_type.contains("PropertyEnumeration")
        {
            let default = scalar_re
                .captures(body)
                .map(|c| ParamValue::Text(unescape_attr(&c[2])));
            (PropertyDescriptor::Text, default)
        } else if host_type.contains("PropertyAngle")
            || host_type.contains("PropertyLength")
            || host_type.contains("PropertyDistance")
            || host_type.contains("PropertyQuantity")
        {
            let fallback = if host_type.contains("PropertyAngle") {
                Unit::Degree
            } else {
                Unit::Millimeter
            };
            let mut unit = fallback;
            let default = quantity_re.captures(body).and_then(|c| {
                unit = c[2].parse::<Unit>().unwrap_or(fallback);
                c[1].parse::<f64>()
                    .ok()
                    .map(|v| ParamValue::Quantity(Quantity::new(v, unit)))
            });
            (PropertyDescriptor::Quantity(unit), default)
        } else {
            // Unknown host property types are not part of the schema.
            continue;
        };

        properties.push(TemplateProperty {
            name,
            descriptor,
            default,
        });
    }
    Ok(properties)
}

/// Write a shape's current parameters as a template archive.
pub fn write_template(path: &Path, shape: &Shape) -> Result<(), StoreError> {
    let mut xml = String::from("<?xml version='1.0' encoding='utf-8'?>\n");
    xml.push_str("<Document SchemaVersion=\"4\">\n");
    xml.push_str("  <Object name=\"Attributes\">\n");
    xml.push_str(&format!(
        "    <Properties Count=\"{}\">\n",
        shape.params().count()
    ));
    for (name, value) in shape.params() {
        let (host_type, element) = match value {
            ParamValue::Integer(v) => (
                "App::PropertyInteger".to_string(),
                format!("<Integer value=\"{}\"/>", v),
            ),
            ParamValue::Real(v) => (
                "App::PropertyFloat".to_string(),
                format!("<Float value=\"{}\"/>", v),
            ),
            ParamValue::Text(t) => (
                "App::PropertyString".to_string(),
                format!("<String value=\"{}\"/>", escape_attr(t)),
            ),
            ParamValue::Quantity(q) => {
                let host_type = match q.unit {
                    Unit::Degree => "App::PropertyAngle",
                    _ => "App::PropertyLength",
                };
                (
                    host_type.to_string(),
                    format!("<Quantity value=\"{}\" unit=\"{}\"/>", q.value, q.unit),
                )
            }
        };
        xml.push_str(&format!(
            "      <Property name=\"{}\" type=\"{}\">\n        {}\n      </Property>\n",
            escape_attr(name),
            host_type,
            element
        ));
    }
    xml.push_str("    </Properties>\n  </Object>\n</Document>\n");

    let file = fs::File::create(path)?;
    let mut writer = ZipWriter::new(file);
    writer
        .start_file(DOCUMENT_NAME, SimpleFileOptions::default())
        .map_err(|e| template_err(path, e))?;
    writer.write_all(xml.as_bytes())?;
    writer.finish().map_err(|e| template_err(path, e))?;
    Ok(())
}

/// Render the companion preview image from the shape's current
/// parameters. A plain side-profile silhouette: shank on top, cutter
/// below, proportions taken from the template parameters when present.
pub fn render_preview(shape: &Shape) -> String {
    let param_mm = |name: &str, fallback: f64| -> f64 {
        match shape.get_param(name) {
            Some(ParamValue::Quantity(q)) => q
                .to_unit(Unit::Millimeter)
                .map(|q| q.value)
                .unwrap_or(fallback),
            Some(other) => other.as_f64().unwrap_or(fallback),
            None => fallback,
        }
    };
    let diameter = param_mm("Diameter", 6.0).max(0.1);
    let length = param_mm("Length", 50.0).max(1.0);
    let shank = param_mm("ShankDiameter", diameter).max(0.1);
    let edge = param_mm("CuttingEdgeHeight", length / 3.0)
        .clamp(0.0, length);

    let width = diameter.max(shank);
    format!(
        concat!(
            "<svg xmlns=\"http://www.w3.org/2000/svg\" ",
            "viewBox=\"0 0 {w} {l}\" width=\"{w}mm\" height=\"{l}mm\">\n",
            "  <title>{name}</title>\n",
            "  <rect x=\"{sx}\" y=\"0\" width=\"{sw}\" height=\"{sl}\" fill=\"#9a9a9a\"/>\n",
            "  <rect x=\"{cx}\" y=\"{sl}\" width=\"{cw}\" height=\"{ce}\" fill=\"#4a4a4a\"/>\n",
            "</svg>\n"
        ),
        w = width,
        l = length,
        name = escape_attr(shape.name()),
        sx = (width - shank) / 2.0,
        sw = shank,
        sl = length - edge,
        cx = (width - diameter) / 2.0,
        cw = diameter,
        ce = edge,
    )
}
