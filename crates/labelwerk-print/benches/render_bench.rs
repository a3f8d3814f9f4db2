// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Criterion benchmarks for format selection, label rendering, and payload
// validation in the labelwerk-print crate.

use chrono::NaiveDate;
use criterion::{Criterion, black_box, criterion_group, criterion_main};
use sha2::{Digest, Sha256};

use labelwerk_core::types::ConnectionMode;
use labelwerk_print::registry::{FORMAT_62MM, FORMAT_A4_SHEET};
use labelwerk_print::{
    LabelFields, TemplateRegistry, render, render_by_id, select_format, validate_payload,
};

fn sample_fields(serial: &str) -> LabelFields {
    LabelFields {
        serial_number: serial.to_string(),
        model: "Optiplex 7090".to_string(),
        model_aux_part_number: "APN-7".to_string(),
        type_label: "Desktop".to_string(),
        operator_name: "bench".to_string(),
        print_date: NaiveDate::from_ymd_opt(2026, 3, 14).unwrap_or_default(),
    }
}

// ---------------------------------------------------------------------------
// Selection
// ---------------------------------------------------------------------------

fn bench_select_format(c: &mut Criterion) {
    let registry = TemplateRegistry::standard();

    c.bench_function("select_format_usb_family", |b| {
        b.iter(|| {
            select_format(
                registry,
                black_box(ConnectionMode::Usb),
                black_box("Brother PT-P750W"),
                black_box(None),
            )
        })
    });

    c.bench_function("select_format_legacy_hint", |b| {
        b.iter(|| {
            select_format(
                registry,
                black_box(ConnectionMode::Network),
                black_box("192.168.1.50"),
                black_box(Some("4")),
            )
        })
    });
}

// ---------------------------------------------------------------------------
// Rendering
// ---------------------------------------------------------------------------

fn bench_render(c: &mut Criterion) {
    let plain = sample_fields("SN12345");
    let mut escaped = sample_fields("SN^12~34_5");
    escaped.model = "A^FS~B_C".to_string();

    c.bench_function("render_24mm", |b| {
        b.iter(|| render_by_id(black_box("24mm"), black_box(&plain)))
    });

    c.bench_function("render_62mm", |b| {
        b.iter(|| render(black_box(&FORMAT_62MM), black_box(&plain)))
    });

    c.bench_function("render_a4_escaped", |b| {
        b.iter(|| render(black_box(&FORMAT_A4_SHEET), black_box(&escaped)))
    });
}

// ---------------------------------------------------------------------------
// Payload checks
// ---------------------------------------------------------------------------

fn bench_payload(c: &mut Criterion) {
    let payload = render(&FORMAT_A4_SHEET, &sample_fields("SN12345")).unwrap_or_default();

    c.bench_function("validate_payload_a4", |b| {
        b.iter(|| validate_payload(black_box(&payload)))
    });

    c.bench_function("sha256_payload_a4", |b| {
        b.iter(|| Sha256::digest(black_box(&payload)))
    });
}

criterion_group!(benches, bench_select_format, bench_render, bench_payload);
criterion_main!(benches);
