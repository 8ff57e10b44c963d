//! Shape template schemas and per-property value conversion
//!
//! Which parameters a tool may carry, and how each is typed, is
//! determined by the tool's shape template rather than by the tool
//! document itself. Every property descriptor carries its own
//! encode/decode rule; the comma-for-decimal-point substitution the
//! host UI performs is the quantity rule's encode step, not a generic
//! numeric behavior.

use toolcrib_core::error::ParamError;
use toolcrib_core::shape::ParamValue;
use toolcrib_core::units::{Quantity, Unit};

/// The closed set of property types a shape template may declare
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum PropertyDescriptor {
    /// Whole-number property. Unset values encode as `"0"`.
    Integer,
    /// Plain real-number property. Unset values are omitted.
    Real,
    /// Free-text property. Unset values are omitted.
    Text,
    /// Unit-bearing property. Encodes through its display string with
    /// the host UI's comma decimal separator.
    Quantity(Unit),
}

impl PropertyDescriptor {
    /// Render a parameter value into its on-file string form.
    ///
    /// Returns `None` when the property must be omitted from the
    /// document: float/text properties with no value, and any value
    /// the descriptor cannot coerce. Absence is preserved as absence
    /// so an unset property decodes back to unset.
    pub fn encode(&self, value: Option<&ParamValue>) -> Option<String> {
        match self {
            Self::Integer => Some(match value {
                Some(ParamValue::Integer(v)) => v.to_string(),
                Some(ParamValue::Text(t)) => t.clone(),
                Some(other) => other.as_f64().map_or_else(|| "0".to_string(), |v| (v as i64).to_string()),
                None => "0".to_string(),
            }),
            Self::Real => match value? {
                ParamValue::Real(v) => Some(v.to_string()),
                ParamValue::Integer(v) => Some(v.to_string()),
                ParamValue::Quantity(q) => Some(q.value.to_string()),
                ParamValue::Text(t) => Some(t.clone()),
            },
            Self::Text => Some(value?.to_string()),
            Self::Quantity(unit) => {
                let quantity = match value? {
                    ParamValue::Quantity(q) => q.to_unit(*unit).unwrap_or(*q),
                    ParamValue::Real(v) => Quantity::new(*v, *unit),
                    ParamValue::Integer(v) => Quantity::new(*v as f64, *unit),
                    // The template rejects non-numeric assignments;
                    // the property is omitted rather than failing the
                    // whole tool.
                    ParamValue::Text(_) => return None,
                };
                // The host UI writes quantity strings with the locale
                // decimal separator. Files written here must be
                // interchangeable with files the UI writes.
                Some(quantity.to_string().replace('.', ","))
            }
        }
    }

    /// Parse an on-file string back into the internal representation.
    /// A comma decimal separator is accepted throughout.
    pub fn decode(&self, name: &str, raw: &str) -> Result<ParamValue, ParamError> {
        match self {
            Self::Integer => raw
                .trim()
                .parse::<i64>()
                .map(ParamValue::Integer)
                .map_err(|_| ParamError::InvalidInteger {
                    name: name.to_string(),
                    value: raw.to_string(),
                }),
            Self::Real => raw
                .trim()
                .replace(',', ".")
                .parse::<f64>()
                .map(ParamValue::Real)
                .map_err(|_| ParamError::InvalidNumber {
                    name: name.to_string(),
                    value: raw.to_string(),
                }),
            Self::Text => Ok(ParamValue::Text(raw.to_string())),
            Self::Quantity(unit) => Quantity::parse_with_unit(raw, *unit)
                .map(ParamValue::Quantity)
                .map_err(|_| {
                    // A parseable magnitude with an unrecognized
                    // suffix is a different failure than a garbled
                    // number.
                    let (number, suffix) = Quantity::split_suffix(raw);
                    if number.replace(',', ".").parse::<f64>().is_ok()
                        && suffix.parse::<Unit>().is_err()
                    {
                        ParamError::UnknownUnit(suffix.to_string())
                    } else {
                        ParamError::InvalidQuantity {
                            name: name.to_string(),
                            value: raw.to_string(),
                        }
                    }
                }),
        }
    }

    /// The host document property type this descriptor maps to
    pub fn host_type(&self) -> &'static str {
        match self {
            Self::Integer => "App::PropertyInteger",
            Self::Real => "App::PropertyFloat",
            Self::Text => "App::PropertyString",
            Self::Quantity(Unit::Degree) => "App::PropertyAngle",
            Self::Quantity(_) => "App::PropertyLength",
        }
    }
}

/// One named property of a shape template, with its template default
#[derive(Debug, Clone, PartialEq)]
pub struct TemplateProperty {
    /// The property name as it appears in tool documents.
    pub name: String,
    /// The property's type and conversion rule.
    pub descriptor: PropertyDescriptor,
    /// The default value the template declares, if any.
    pub default: Option<ParamValue>,
}

impl TemplateProperty {
    /// Convenience constructor
    pub fn new(
        name: impl Into<String>,
        descriptor: PropertyDescriptor,
        default: Option<ParamValue>,
    ) -> Self {
        Self {
            name: name.into(),
            descriptor,
            default,
        }
    }
}

fn mm(name: &str, value: f64) -> TemplateProperty {
    TemplateProperty::new(
        name,
        PropertyDescriptor::Quantity(Unit::Millimeter),
        Some(ParamValue::Quantity(Quantity::mm(value))),
    )
}

fn deg(name: &str, value: f64) -> TemplateProperty {
    TemplateProperty::new(
        name,
        PropertyDescriptor::Quantity(Unit::Degree),
        Some(ParamValue::Quantity(Quantity::degrees(value))),
    )
}

fn int(name: &str, value: i64) -> TemplateProperty {
    TemplateProperty::new(
        name,
        PropertyDescriptor::Integer,
        Some(ParamValue::Integer(value)),
    )
}

fn text(name: &str) -> TemplateProperty {
    TemplateProperty::new(name, PropertyDescriptor::Text, None)
}

/// The ordered parameter schema of a builtin shape, or `None` for a
/// name outside the reserved set. These mirror the templates the host
/// application ships; builtin shapes have no file in the store.
pub fn builtin_properties(name: &str) -> Option<Vec<TemplateProperty>> {
    let props = match name {
        "endmill" | "ballend" => vec![
            mm("Chipload", 0.0),
            mm("CuttingEdgeHeight", 15.0),
            mm("Diameter", 5.0),
            int("Flutes", 2),
            mm("Length", 50.0),
            text("Material"),
            mm("ShankDiameter", 3.0),
            text("SpindleDirection"),
        ],
        "bullnose" => vec![
            mm("Chipload", 0.0),
            mm("CuttingEdgeHeight", 15.0),
            mm("Diameter", 5.0),
            mm("FluteRadius", 1.0),
            int("Flutes", 2),
            mm("Length", 50.0),
            text("Material"),
            mm("ShankDiameter", 3.0),
        ],
        "v-bit" => vec![
            deg("CuttingEdgeAngle", 90.0),
            mm("CuttingEdgeHeight", 1.0),
            mm("Diameter", 10.0),
            int("Flutes", 2),
            mm("Length", 50.0),
            text("Material"),
            mm("ShankDiameter", 5.0),
            mm("TipDiameter", 1.0),
        ],
        "chamfer" => vec![
            deg("CuttingEdgeAngle", 60.0),
            mm("CuttingEdgeHeight", 6.0),
            mm("Diameter", 12.0),
            int("Flutes", 4),
            mm("Length", 50.0),
            text("Material"),
            mm("ShankDiameter", 6.0),
            mm("TipDiameter", 5.0),
        ],
        "drill" => vec![
            mm("Chipload", 0.0),
            mm("Diameter", 3.0),
            int("Flutes", 2),
            mm("Length", 50.0),
            text("Material"),
            deg("TipAngle", 119.0),
        ],
        "probe" => vec![
            mm("Diameter", 6.0),
            mm("Length", 50.0),
            mm("ShaftDiameter", 4.0),
        ],
        "slittingsaw" => vec![
            mm("BladeThickness", 3.0),
            mm("CapDiameter", 8.0),
            mm("CapHeight", 3.0),
            mm("Diameter", 76.0),
            int("Flutes", 30),
            mm("Length", 50.0),
            text("Material"),
            mm("ShankDiameter", 19.0),
        ],
        "thread-mill" => vec![
            mm("Crest", 0.0),
            deg("CuttingAngle", 60.0),
            mm("Diameter", 5.0),
            int("Flutes", 10),
            mm("Length", 50.0),
            text("Material"),
            mm("NeckDiameter", 3.0),
            mm("NeckLength", 3.0),
            mm("ShankDiameter", 5.0),
        ],
        _ => return None,
    };
    Some(props)
}
