// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Labelwerk Print: label template registry, format selection, ZPL rendering,
// and delivery to network (raw TCP) and USB printers. The coordinator ties
// these together into one request pipeline on top of `labelwerk-core`.

pub mod coordinator;
pub mod dispatch;
pub mod network_sender;
pub mod registry;
pub mod render;
pub mod selector;
pub mod usb_sender;

pub use coordinator::{PrintCoordinator, ServiceSwitch};
pub use dispatch::{Dispatcher, Transport};
pub use network_sender::NetworkSender;
pub use registry::{LabelFormat, TemplateRegistry};
pub use render::{LabelFields, render, render_by_id, validate_payload};
pub use selector::select_format;
pub use usb_sender::UsbSender;
