// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Print job coordinator.
//
// Runs one request through the pipeline: service check, validation, format
// selection, render, dispatch. Each stage either hands its output to the
// next or stops with an error tagged with that stage. Nothing is retried
// and nothing is kept between requests.

use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use sha2::{Digest, Sha256};
use tracing::{debug, info, warn};

use labelwerk_bridge::{UsbDeviceId, is_printer_node};
use labelwerk_core::config::AppConfig;
use labelwerk_core::error::{LabelwerkError, Result};
use labelwerk_core::types::{
    ConnectionMode, JobId, LabelSizeQuery, NetworkDestination, PrintJobRequest, PrintReceipt,
};

use crate::dispatch::{Dispatcher, Transport};
use crate::network_sender::NetworkSender;
use crate::registry::TemplateRegistry;
use crate::render::{LabelFields, render};
use crate::selector::select_format;
use crate::usb_sender::UsbSender;

/// Format id reported for caller-supplied layouts.
pub const RAW_FORMAT_ID: &str = "raw";

// ---------------------------------------------------------------------------
// ServiceSwitch
// ---------------------------------------------------------------------------

/// Whether the service accepts print jobs.
///
/// Owned by whoever controls the service lifecycle and shared with the
/// coordinator, which checks it before doing any work.
#[derive(Debug)]
pub struct ServiceSwitch {
    accepting: AtomicBool,
}

impl ServiceSwitch {
    pub fn new(accepting: bool) -> Self {
        Self {
            accepting: AtomicBool::new(accepting),
        }
    }

    pub fn is_accepting(&self) -> bool {
        self.accepting.load(Ordering::SeqCst)
    }

    pub fn start(&self) {
        self.accepting.store(true, Ordering::SeqCst);
        info!("label printing started");
    }

    pub fn stop(&self) {
        self.accepting.store(false, Ordering::SeqCst);
        info!("label printing stopped");
    }

    fn ensure_accepting(&self) -> Result<()> {
        if self.is_accepting() {
            Ok(())
        } else {
            Err(LabelwerkError::ServiceDisabled)
        }
    }
}

impl Default for ServiceSwitch {
    fn default() -> Self {
        Self::new(true)
    }
}

// ---------------------------------------------------------------------------
// PrintCoordinator
// ---------------------------------------------------------------------------

/// Turns print requests into delivered labels.
#[derive(Debug)]
pub struct PrintCoordinator<N = NetworkSender, U = UsbSender> {
    registry: &'static TemplateRegistry,
    dispatcher: Dispatcher<N, U>,
    switch: Arc<ServiceSwitch>,
    strict_format_hint: bool,
    usb_device_nodes: Vec<PathBuf>,
}

impl PrintCoordinator {
    /// Build the production coordinator: raw TCP for network printers and
    /// the configured USB transport.
    pub fn from_config(config: &AppConfig, switch: Arc<ServiceSwitch>) -> Result<Self> {
        let usb = labelwerk_bridge::usb_transport(&config.usb)?;
        let dispatcher = Dispatcher::new(NetworkSender::new(), UsbSender::new(usb));
        Ok(PrintCoordinator::new(dispatcher, switch)
            .with_strict_format_hint(config.strict_format_hint)
            .with_usb_device_nodes(config.usb.device_nodes.values().cloned()))
    }
}

impl<N: Transport, U: Transport> PrintCoordinator<N, U> {
    pub fn new(dispatcher: Dispatcher<N, U>, switch: Arc<ServiceSwitch>) -> Self {
        Self {
            registry: TemplateRegistry::standard(),
            dispatcher,
            switch,
            strict_format_hint: true,
            usb_device_nodes: Vec::new(),
        }
    }

    /// When strict (the default), a format hint that names no registered
    /// format fails the job instead of falling back to inference.
    pub fn with_strict_format_hint(mut self, strict: bool) -> Self {
        self.strict_format_hint = strict;
        self
    }

    /// Device nodes a USB destination may name by path, besides the
    /// kernel printer nodes under `/dev/usb`.
    pub fn with_usb_device_nodes(mut self, nodes: impl IntoIterator<Item = PathBuf>) -> Self {
        self.usb_device_nodes = nodes.into_iter().collect();
        self
    }

    pub fn service(&self) -> &ServiceSwitch {
        &self.switch
    }

    pub fn dispatcher(&self) -> &Dispatcher<N, U> {
        &self.dispatcher
    }

    /// Print one label.
    pub async fn handle(&self, request: &PrintJobRequest) -> Result<PrintReceipt> {
        let job_id = JobId::new();
        self.switch.ensure_accepting()?;
        request.validate()?;

        let hint = request.format_hint();
        let unknown_hint = hint.filter(|h| self.registry.find(h).is_none());
        if let Some(unknown) = unknown_hint.filter(|_| self.strict_format_hint) {
            warn!(%job_id, hint = unknown, "rejecting unknown format hint");
            return Err(LabelwerkError::UnknownFormat(unknown.to_string()));
        }

        let selection = select_format(
            self.registry,
            request.connection_mode,
            &request.destination,
            hint,
        );
        info!(
            %job_id,
            mode = %request.connection_mode,
            destination = %request.destination,
            format = selection.format.id,
            rule = ?selection.rule,
            "label format selected"
        );

        let payload = render(selection.format, &LabelFields::from_request(request))?;
        let destination = self.normalize_destination(request.connection_mode, &request.destination)?;

        let mut receipt = self
            .deliver(job_id, request.connection_mode, &destination, &payload)
            .await?;
        receipt.format_id = selection.format.id.to_string();
        receipt.label_size = selection.format.physical_size.to_string();
        Ok(receipt)
    }

    /// Send a caller-built label layout. Surrounding whitespace is trimmed;
    /// the rest goes out byte for byte.
    ///
    /// The layout must still be a single `^XA ... ^XZ` label.
    pub async fn handle_raw(
        &self,
        mode: ConnectionMode,
        destination: &str,
        layout: &str,
    ) -> Result<PrintReceipt> {
        let job_id = JobId::new();
        self.switch.ensure_accepting()?;
        if destination.trim().is_empty() {
            return Err(LabelwerkError::Validation("no printer specified".into()));
        }
        let layout = layout.trim();
        if layout.is_empty() {
            return Err(LabelwerkError::Validation("no label layout provided".into()));
        }

        let destination = self.normalize_destination(mode, destination)?;
        info!(%job_id, %mode, destination = %destination, "raw label layout received");

        self.deliver(job_id, mode, &destination, layout.as_bytes())
            .await
    }

    /// Physical size of the label a job like `query` would print on.
    pub fn label_size(&self, query: &LabelSizeQuery) -> String {
        let hint = query
            .format_hint
            .as_deref()
            .map(str::trim)
            .filter(|h| !h.is_empty());
        let selection = select_format(
            self.registry,
            query.mode.unwrap_or(ConnectionMode::Network),
            query.destination.as_deref().unwrap_or(""),
            hint,
        );
        self.registry.size_of(selection.format.id).to_string()
    }

    /// Network destinations become `host:port`. USB names pass through,
    /// except that a device path must be a printer node this service knows.
    fn normalize_destination(&self, mode: ConnectionMode, destination: &str) -> Result<String> {
        match mode {
            ConnectionMode::Network => Ok(NetworkDestination::parse(destination)?.to_string()),
            ConnectionMode::Usb => {
                let destination = destination.trim();
                if let Some(UsbDeviceId::Path(path)) = UsbDeviceId::parse(destination) {
                    if !self.is_known_usb_node(&path) {
                        warn!(path = %path.display(), "rejecting USB path that is not a printer node");
                        return Err(LabelwerkError::Validation(format!(
                            "{} is not a USB printer device node",
                            path.display()
                        )));
                    }
                }
                Ok(destination.to_string())
            }
        }
    }

    fn is_known_usb_node(&self, path: &Path) -> bool {
        is_printer_node(path) || self.usb_device_nodes.iter().any(|node| node == path)
    }

    async fn deliver(
        &self,
        job_id: JobId,
        mode: ConnectionMode,
        destination: &str,
        payload: &[u8],
    ) -> Result<PrintReceipt> {
        let payload_sha256 = hex::encode(Sha256::digest(payload));
        debug!(%job_id, sha256 = %payload_sha256, bytes = payload.len(), "dispatching payload");

        self.dispatcher
            .dispatch(mode, destination, payload)
            .await?
            .into_result()?;

        info!(%job_id, destination, "print job complete");
        Ok(PrintReceipt {
            job_id,
            format_id: RAW_FORMAT_ID.to_string(),
            label_size: String::new(),
            payload_bytes: payload.len(),
            payload_sha256,
            destination: destination.to_string(),
        })
    }
}

#[cfg(test)]
mod tests {
    use labelwerk_core::error::Stage;
    use labelwerk_core::types::FailureReason;

    use super::*;
    use crate::dispatch::testing::RecordingTransport;

    type TestCoordinator = PrintCoordinator<RecordingTransport, RecordingTransport>;

    fn coordinator_with(network: RecordingTransport, usb: RecordingTransport) -> TestCoordinator {
        PrintCoordinator::new(Dispatcher::new(network, usb), Arc::new(ServiceSwitch::default()))
    }

    fn coordinator() -> TestCoordinator {
        coordinator_with(RecordingTransport::ok(), RecordingTransport::ok())
    }

    fn network_request(serial: &str) -> PrintJobRequest {
        let mut req = PrintJobRequest::new(ConnectionMode::Network, "192.168.1.50", serial);
        req.model = Some("Optiplex 7090".into());
        req.model_aux_part_number = Some("APN-7".into());
        req.type_label = Some("Desktop".into());
        req
    }

    fn network_calls(c: &TestCoordinator) -> Vec<(String, Vec<u8>)> {
        c.dispatcher().network().calls()
    }

    fn usb_calls(c: &TestCoordinator) -> Vec<(String, Vec<u8>)> {
        c.dispatcher().usb().calls()
    }

    // -- End-to-end scenarios --

    #[tokio::test]
    async fn network_job_prints_wide_label() {
        let c = coordinator();

        let receipt = c.handle(&network_request("SN12345")).await.unwrap();

        assert_eq!(receipt.format_id, "62mm");
        assert_eq!(receipt.label_size, "62mm");
        assert_eq!(receipt.destination, "192.168.1.50:9100");

        let calls = network_calls(&c);
        assert_eq!(calls.len(), 1);
        assert_eq!(calls[0].0, "192.168.1.50:9100");
        let zpl = String::from_utf8(calls[0].1.clone()).unwrap();
        assert!(zpl.starts_with("^XA"));
        assert!(zpl.ends_with("^XZ"));
        assert_eq!(zpl.matches("SN12345").count(), 2);
        assert!(usb_calls(&c).is_empty());
    }

    #[tokio::test]
    async fn narrow_usb_family_prints_narrow_label() {
        let c = coordinator();
        let req = PrintJobRequest::new(ConnectionMode::Usb, "Brother PT-P750W", "SN1");

        let receipt = c.handle(&req).await.unwrap();

        assert_eq!(receipt.format_id, "24mm");
        let calls = usb_calls(&c);
        assert_eq!(calls.len(), 1);
        assert_eq!(calls[0].0, "Brother PT-P750W");
        let zpl = String::from_utf8(calls[0].1.clone()).unwrap();
        assert!(zpl.contains("^FO20,35^BCN,40,N,N,N^FDSN1^FS"));
    }

    #[tokio::test]
    async fn hint_overrides_inference() {
        let c = coordinator();
        let mut req = PrintJobRequest::new(ConnectionMode::Usb, "Brother PT-P750W", "SN1");
        req.format_hint = Some("A4-sheet".into());

        let receipt = c.handle(&req).await.unwrap();

        assert_eq!(receipt.format_id, "A4-sheet");
        assert_eq!(receipt.label_size, "A4");
        let zpl = String::from_utf8(usb_calls(&c)[0].1.clone()).unwrap();
        assert!(zpl.contains("^FO100,200^BCN,150,Y,N,N"));
    }

    #[tokio::test]
    async fn empty_serial_fails_before_any_io() {
        let c = coordinator();

        let err = c.handle(&network_request("")).await.unwrap_err();

        assert_eq!(err.stage(), Stage::Validation);
        assert!(network_calls(&c).is_empty());
        assert!(usb_calls(&c).is_empty());
    }

    // -- Other paths --

    #[tokio::test]
    async fn unknown_hint_is_rejected_when_strict() {
        let c = coordinator();
        let mut req = network_request("SN1");
        req.format_hint = Some("99mm".into());

        let err = c.handle(&req).await.unwrap_err();

        assert!(matches!(err, LabelwerkError::UnknownFormat(ref h) if h == "99mm"));
        assert!(network_calls(&c).is_empty());
    }

    #[tokio::test]
    async fn unknown_hint_falls_back_when_lenient() {
        let c = coordinator().with_strict_format_hint(false);
        let mut req = network_request("SN1");
        req.format_hint = Some("99mm".into());

        let receipt = c.handle(&req).await.unwrap();
        assert_eq!(receipt.format_id, "62mm");
    }

    #[tokio::test]
    async fn delivery_failure_maps_to_error() {
        let c = coordinator_with(
            RecordingTransport::failing(FailureReason::Timeout),
            RecordingTransport::ok(),
        );

        let err = c.handle(&network_request("SN1")).await.unwrap_err();

        assert!(matches!(err, LabelwerkError::Timeout(_)));
        assert_eq!(err.stage(), Stage::Dispatch);
        assert_eq!(network_calls(&c).len(), 1, "exactly one attempt, no retry");
    }

    #[tokio::test]
    async fn stopped_service_refuses_jobs() {
        let c = coordinator();
        c.service().stop();

        let err = c.handle(&network_request("SN1")).await.unwrap_err();
        assert!(matches!(err, LabelwerkError::ServiceDisabled));
        assert!(network_calls(&c).is_empty());

        c.service().start();
        assert!(c.handle(&network_request("SN1")).await.is_ok());
    }

    #[tokio::test]
    async fn receipt_fingerprints_payload() {
        let c = coordinator();
        let receipt = c.handle(&network_request("SN1")).await.unwrap();

        let calls = network_calls(&c);
        let sent = &calls[0].1;
        assert_eq!(receipt.payload_bytes, sent.len());
        assert_eq!(receipt.payload_sha256, hex::encode(Sha256::digest(sent)));
    }

    #[tokio::test]
    async fn network_destination_keeps_explicit_port() {
        let c = coordinator();
        let mut req = network_request("SN1");
        req.destination = "printer-3.lab:9101".into();

        c.handle(&req).await.unwrap();
        assert_eq!(network_calls(&c)[0].0, "printer-3.lab:9101");
    }

    // -- Raw layouts --

    #[tokio::test]
    async fn raw_layout_is_sent_unchanged() {
        let c = coordinator();
        let layout = "^XA^FO10,10^FDhello^FS^XZ";

        let receipt = c
            .handle_raw(ConnectionMode::Network, "10.0.0.5", layout)
            .await
            .unwrap();

        assert_eq!(receipt.format_id, RAW_FORMAT_ID);
        assert_eq!(network_calls(&c), vec![("10.0.0.5:9100".to_string(), layout.as_bytes().to_vec())]);
    }

    #[tokio::test]
    async fn raw_layout_is_trimmed_of_surrounding_whitespace() {
        let c = coordinator();
        let layout = "^XA\n^FO10,10^FD hello ^FS\n^XZ";

        c.handle_raw(ConnectionMode::Usb, "Brother QL-800", &format!("\n  {layout}\r\n"))
            .await
            .unwrap();

        assert_eq!(usb_calls(&c)[0].1, layout.as_bytes());
    }

    #[tokio::test]
    async fn raw_layout_must_be_single_label() {
        let c = coordinator();

        let err = c
            .handle_raw(ConnectionMode::Usb, "Brother QL-800", "^XA^FDa^FS^XZ^XA^FDb^FS^XZ")
            .await
            .unwrap_err();
        assert!(matches!(err, LabelwerkError::Render(_)));

        let err = c
            .handle_raw(ConnectionMode::Usb, "Brother QL-800", "  ")
            .await
            .unwrap_err();
        assert!(matches!(err, LabelwerkError::Validation(_)));
        assert!(usb_calls(&c).is_empty());
    }

    // -- USB device paths --

    #[tokio::test]
    async fn usb_path_outside_printer_nodes_is_rejected() {
        let c = coordinator();

        for path in ["/tmp/victim.conf", "/etc/passwd", "/dev/usb/../sda", "/dev/sda"] {
            let req = PrintJobRequest::new(ConnectionMode::Usb, path, "SN1");
            let err = c.handle(&req).await.unwrap_err();
            assert!(matches!(err, LabelwerkError::Validation(_)), "{path}: {err:?}");

            let err = c
                .handle_raw(ConnectionMode::Usb, path, "^XA^XZ")
                .await
                .unwrap_err();
            assert!(matches!(err, LabelwerkError::Validation(_)), "{path}: {err:?}");
        }
        assert!(usb_calls(&c).is_empty());
    }

    #[tokio::test]
    async fn usb_printer_node_and_configured_paths_are_accepted() {
        let c = coordinator().with_usb_device_nodes([PathBuf::from("/run/labels/ql800")]);

        for path in ["/dev/usb/lp0", "/run/labels/ql800"] {
            let req = PrintJobRequest::new(ConnectionMode::Usb, path, "SN1");
            c.handle(&req).await.unwrap();
        }

        let targets: Vec<String> = usb_calls(&c).into_iter().map(|(d, _)| d).collect();
        assert_eq!(targets, ["/dev/usb/lp0", "/run/labels/ql800"]);
    }

    // -- Label size --

    #[test]
    fn label_size_follows_selection() {
        let c = coordinator();
        assert_eq!(c.label_size(&LabelSizeQuery::default()), "62mm");
        assert_eq!(
            c.label_size(&LabelSizeQuery {
                mode: Some(ConnectionMode::Usb),
                destination: Some("Brother PT-P750W".into()),
                format_hint: None,
            }),
            "24mm"
        );
        assert_eq!(
            c.label_size(&LabelSizeQuery {
                mode: Some(ConnectionMode::Network),
                destination: Some("10.0.0.5".into()),
                format_hint: Some("4".into()),
            }),
            "A4"
        );
        assert_eq!(
            c.label_size(&LabelSizeQuery {
                format_hint: Some("bogus".into()),
                ..Default::default()
            }),
            "62mm"
        );
    }
}
