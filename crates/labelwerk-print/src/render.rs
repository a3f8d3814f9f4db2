// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// ZPL label renderer.
//
// Walks a format's layout and emits one ZPL command group per block. Field
// values are caller-controlled, so they are sanitised before they reach the
// printer: control characters are dropped and the ZPL command prefixes
// (`^`, `~`) plus the hex escape indicator (`_`) are hex-escaped under
// `^FH`. A value can therefore never open a new command or end the label
// early, and every payload carries exactly one `^XZ`.

use chrono::NaiveDate;
use tracing::debug;

use labelwerk_core::error::{LabelwerkError, Result};
use labelwerk_core::types::PrintJobRequest;

use crate::registry::{Block, LabelField, LabelFormat, TemplateRegistry};

/// Start-of-label command.
pub const START_OF_LABEL: &str = "^XA";

/// End-of-job command. Appears exactly once, as the final bytes of a payload.
pub const END_OF_JOB: &str = "^XZ";

/// The job data a label layout can draw from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LabelFields {
    pub serial_number: String,
    pub model: String,
    pub model_aux_part_number: String,
    pub type_label: String,
    pub operator_name: String,
    pub print_date: NaiveDate,
}

impl LabelFields {
    /// Collect fields from a request. Absent optional values render empty.
    pub fn from_request(request: &PrintJobRequest) -> Self {
        Self {
            serial_number: request.serial_number.trim().to_string(),
            model: request.model.clone().unwrap_or_default(),
            model_aux_part_number: request.model_aux_part_number.clone().unwrap_or_default(),
            type_label: request.type_label.clone().unwrap_or_default(),
            operator_name: request.operator_name().to_string(),
            print_date: request.requested_at.date_naive(),
        }
    }

    fn value(&self, field: LabelField) -> String {
        match field {
            LabelField::SerialNumber => self.serial_number.clone(),
            LabelField::Model => self.model.clone(),
            LabelField::ModelAuxPartNumber => self.model_aux_part_number.clone(),
            LabelField::TypeLabel => self.type_label.clone(),
            LabelField::OperatorName => self.operator_name.clone(),
            LabelField::PrintDate => self.print_date.format("%Y-%m-%d").to_string(),
        }
    }
}

/// Render a label payload. Fails only when the serial number is empty.
///
/// Same format and same fields always give byte-identical output.
pub fn render(format: &LabelFormat, fields: &LabelFields) -> Result<Vec<u8>> {
    let serial = sanitize(&fields.serial_number);
    if serial.trim().is_empty() {
        return Err(LabelwerkError::Render(format!(
            "cannot render {} label without a serial number",
            format.id
        )));
    }

    let mut zpl = String::with_capacity(64 * (format.layout.len() + 2));
    zpl.push_str(START_OF_LABEL);
    zpl.push('\n');

    for block in format.layout {
        match *block {
            Block::Text {
                x,
                y,
                font_height,
                font_width,
                caption,
                field,
            } => {
                let value = match field {
                    LabelField::SerialNumber => serial.clone(),
                    other => sanitize(&fields.value(other)),
                };
                zpl.push_str(&format!("^FO{x},{y}^A0N,{font_height},{font_width}"));
                push_field_data(&mut zpl, caption, &value);
            }
            Block::Barcode {
                x,
                y,
                height,
                interpretation_line,
            } => {
                let line = if interpretation_line { 'Y' } else { 'N' };
                zpl.push_str(&format!("^FO{x},{y}^BCN,{height},{line},N,N"));
                push_field_data(&mut zpl, "", &serial);
            }
        }
        zpl.push('\n');
    }

    zpl.push_str(END_OF_JOB);
    debug!(format = format.id, bytes = zpl.len(), "label rendered");
    Ok(zpl.into_bytes())
}

/// Render by format id (canonical or legacy code) from the standard registry.
pub fn render_by_id(format_id: &str, fields: &LabelFields) -> Result<Vec<u8>> {
    let format = TemplateRegistry::standard().lookup(format_id)?;
    render(format, fields)
}

/// Check that bytes are a single well-formed label: they start with `^XA`
/// and the end-of-job marker occurs exactly once, at the very end.
pub fn validate_payload(payload: &[u8]) -> Result<()> {
    if !payload.starts_with(START_OF_LABEL.as_bytes()) {
        return Err(LabelwerkError::Render(
            "payload does not start with ^XA".into(),
        ));
    }
    if !payload.ends_with(END_OF_JOB.as_bytes()) {
        return Err(LabelwerkError::Render(
            "payload is not terminated by ^XZ".into(),
        ));
    }
    let terminators = payload
        .windows(END_OF_JOB.len())
        .filter(|w| *w == END_OF_JOB.as_bytes())
        .count();
    if terminators != 1 {
        return Err(LabelwerkError::Render(format!(
            "payload contains {terminators} end-of-job markers, expected exactly one"
        )));
    }
    Ok(())
}

fn sanitize(value: &str) -> String {
    value.chars().filter(|c| !c.is_control()).collect()
}

fn needs_escape(c: char) -> bool {
    matches!(c, '^' | '~' | '_')
}

/// Append `^FD{caption}{value}^FS`, switching on `^FH` hex escapes when the
/// value holds characters ZPL would interpret.
fn push_field_data(zpl: &mut String, caption: &str, value: &str) {
    if !value.contains(needs_escape) {
        zpl.push_str(&format!("^FD{caption}{value}^FS"));
        return;
    }
    zpl.push_str("^FH^FD");
    zpl.push_str(caption);
    for c in value.chars() {
        match c {
            '^' => zpl.push_str("_5E"),
            '~' => zpl.push_str("_7E"),
            '_' => zpl.push_str("_5F"),
            c => zpl.push(c),
        }
    }
    zpl.push_str("^FS");
}
