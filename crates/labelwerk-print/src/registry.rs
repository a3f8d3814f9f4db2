// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Label template registry.
//
// A closed, compile-time set of label geometries. Each entry carries its
// descriptive metadata (physical size, print resolution) and a fixed layout
// of positioned blocks with baked-in coordinates and font sizes, in printer
// dots. Adding a label size means adding one entry here; selection and
// dispatch are untouched.

use labelwerk_core::error::{LabelwerkError, Result};

/// Format used when nothing more specific applies (network printers, generic USB).
pub const DEFAULT_FORMAT_ID: &str = "62mm";

/// Format dedicated to the narrow USB tape printer family.
pub const NARROW_USB_FORMAT_ID: &str = "24mm";

/// Job data a text block can print.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LabelField {
    SerialNumber,
    Model,
    ModelAuxPartNumber,
    TypeLabel,
    OperatorName,
    PrintDate,
}

/// One positioned element of a label layout.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Block {
    /// Scalable font text: `caption` followed by the field value.
    Text {
        x: u32,
        y: u32,
        font_height: u32,
        font_width: u32,
        caption: &'static str,
        field: LabelField,
    },
    /// Code 128 barcode encoding the serial number.
    Barcode {
        x: u32,
        y: u32,
        height: u32,
        /// Print the human-readable line under the bars.
        interpretation_line: bool,
    },
}

/// An immutable label geometry and its layout.
#[derive(Debug, PartialEq, Eq)]
pub struct LabelFormat {
    /// Stable key, e.g. `"62mm"`.
    pub id: &'static str,
    /// Numeric code the browser tool used before string ids existed.
    pub legacy_code: &'static str,
    pub physical_size: &'static str,
    pub render_resolution: &'static str,
    pub layout: &'static [Block],
}

impl LabelFormat {
    /// Whether any text block of this layout prints `field`.
    pub fn prints_field(&self, field: LabelField) -> bool {
        self.layout
            .iter()
            .any(|block| matches!(block, Block::Text { field: f, .. } if *f == field))
    }

    fn matches(&self, key: &str) -> bool {
        let key = key.trim();
        self.id.eq_ignore_ascii_case(key) || self.legacy_code == key
    }
}

const fn text(
    x: u32,
    y: u32,
    font: u32,
    caption: &'static str,
    field: LabelField,
) -> Block {
    Block::Text {
        x,
        y,
        font_height: font,
        font_width: font,
        caption,
        field,
    }
}

// ---------------------------------------------------------------------------
// Registered formats
// ---------------------------------------------------------------------------

/// 24 mm tape for the PT-P7 series (USB only, 180 dpi).
pub static FORMAT_24MM: LabelFormat = LabelFormat {
    id: "24mm",
    legacy_code: "2",
    physical_size: "24mm",
    render_resolution: "180x180",
    layout: &[
        text(20, 10, 20, "", LabelField::SerialNumber),
        Block::Barcode {
            x: 20,
            y: 35,
            height: 40,
            interpretation_line: false,
        },
        text(20, 80, 15, "", LabelField::Model),
    ],
};

pub static FORMAT_36MM: LabelFormat = LabelFormat {
    id: "36mm",
    legacy_code: "3",
    physical_size: "36mm",
    render_resolution: "300x300",
    layout: &[
        text(30, 10, 25, "", LabelField::SerialNumber),
        Block::Barcode {
            x: 30,
            y: 40,
            height: 60,
            interpretation_line: false,
        },
        text(30, 110, 20, "", LabelField::Model),
    ],
};

pub static FORMAT_62MM: LabelFormat = LabelFormat {
    id: "62mm",
    legacy_code: "6",
    physical_size: "62mm",
    render_resolution: "300x300",
    layout: &[
        text(50, 50, 50, "", LabelField::SerialNumber),
        Block::Barcode {
            x: 50,
            y: 120,
            height: 100,
            interpretation_line: true,
        },
        text(50, 250, 30, "Model: ", LabelField::Model),
        text(50, 290, 30, "APN: ", LabelField::ModelAuxPartNumber),
        text(50, 330, 30, "Type: ", LabelField::TypeLabel),
        text(50, 370, 20, "Printed by: ", LabelField::OperatorName),
        text(50, 400, 20, "Date: ", LabelField::PrintDate),
    ],
};

/// Full A4 sheet, for asset tags printed on office printers.
pub static FORMAT_A4_SHEET: LabelFormat = LabelFormat {
    id: "A4-sheet",
    legacy_code: "4",
    physical_size: "A4",
    render_resolution: "300x300",
    layout: &[
        text(100, 100, 70, "", LabelField::SerialNumber),
        Block::Barcode {
            x: 100,
            y: 200,
            height: 150,
            interpretation_line: true,
        },
        text(100, 400, 40, "Model: ", LabelField::Model),
        text(100, 450, 40, "APN: ", LabelField::ModelAuxPartNumber),
        text(100, 500, 40, "Type: ", LabelField::TypeLabel),
        text(100, 550, 30, "Printed by: ", LabelField::OperatorName),
        text(100, 600, 30, "Date: ", LabelField::PrintDate),
    ],
};

static STANDARD: TemplateRegistry = TemplateRegistry {
    formats: &[&FORMAT_24MM, &FORMAT_36MM, &FORMAT_62MM, &FORMAT_A4_SHEET],
    default_format: &FORMAT_62MM,
    narrow_usb_format: &FORMAT_24MM,
};

// ---------------------------------------------------------------------------
// TemplateRegistry
// ---------------------------------------------------------------------------

/// Read-only mapping from format id to label format.
#[derive(Debug)]
pub struct TemplateRegistry {
    formats: &'static [&'static LabelFormat],
    default_format: &'static LabelFormat,
    narrow_usb_format: &'static LabelFormat,
}

impl TemplateRegistry {
    /// The registry compiled into this build.
    pub fn standard() -> &'static TemplateRegistry {
        &STANDARD
    }

    /// Find a format by id (case-insensitive) or legacy numeric code.
    pub fn find(&self, format_id: &str) -> Option<&'static LabelFormat> {
        self.formats.iter().copied().find(|f| f.matches(format_id))
    }

    /// Like [`find`](Self::find) but unknown ids are an error.
    pub fn lookup(&self, format_id: &str) -> Result<&'static LabelFormat> {
        self.find(format_id)
            .ok_or_else(|| LabelwerkError::UnknownFormat(format_id.to_string()))
    }

    /// Physical size for display. Unknown ids report the default format's size.
    pub fn size_of(&self, format_id: &str) -> &'static str {
        self.find(format_id)
            .unwrap_or(self.default_format)
            .physical_size
    }

    pub fn default_format(&self) -> &'static LabelFormat {
        self.default_format
    }

    pub fn narrow_usb_format(&self) -> &'static LabelFormat {
        self.narrow_usb_format
    }

    pub fn formats(&self) -> impl Iterator<Item = &'static LabelFormat> + '_ {
        self.formats.iter().copied()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn standard_registry_has_four_formats() {
        let ids: Vec<_> = TemplateRegistry::standard().formats().map(|f| f.id).collect();
        assert_eq!(ids, ["24mm", "36mm", "62mm", "A4-sheet"]);
    }

    #[test]
    fn defaults_point_at_registered_entries() {
        let registry = TemplateRegistry::standard();
        assert_eq!(registry.default_format().id, DEFAULT_FORMAT_ID);
        assert_eq!(registry.narrow_usb_format().id, NARROW_USB_FORMAT_ID);
    }

    #[test]
    fn lookup_by_id_and_legacy_code() {
        let registry = TemplateRegistry::standard();
        assert_eq!(registry.lookup("A4-sheet").unwrap().id, "A4-sheet");
        assert_eq!(registry.lookup("a4-SHEET").unwrap().id, "A4-sheet");
        assert_eq!(registry.lookup("6").unwrap().id, "62mm");
        assert_eq!(registry.lookup("2").unwrap().id, "24mm");
    }

    #[test]
    fn lookup_unknown_fails() {
        let err = TemplateRegistry::standard().lookup("5").unwrap_err();
        assert!(matches!(err, LabelwerkError::UnknownFormat(ref id) if id == "5"));
    }

    #[test]
    fn size_of_never_fails() {
        let registry = TemplateRegistry::standard();
        assert_eq!(registry.size_of("24mm"), "24mm");
        assert_eq!(registry.size_of("A4-sheet"), "A4");
        assert_eq!(registry.size_of("nonsense"), "62mm");
        assert_eq!(registry.size_of(""), "62mm");
    }

    #[test]
    fn every_layout_has_exactly_one_barcode() {
        for format in TemplateRegistry::standard().formats() {
            let barcodes = format
                .layout
                .iter()
                .filter(|b| matches!(b, Block::Barcode { .. }))
                .count();
            assert_eq!(barcodes, 1, "{} should have one barcode", format.id);
            assert!(format.prints_field(LabelField::SerialNumber));
        }
    }

    #[test]
    fn narrow_formats_have_no_aux_part_number() {
        assert!(!FORMAT_24MM.prints_field(LabelField::ModelAuxPartNumber));
        assert!(!FORMAT_36MM.prints_field(LabelField::ModelAuxPartNumber));
        assert!(FORMAT_62MM.prints_field(LabelField::ModelAuxPartNumber));
    }
}
