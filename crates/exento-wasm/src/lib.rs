//! WASM bindings for FEL exemption certificate reports.
//!
//! Browsers hand over the text of each XML document and get back either the
//! extracted record as a JS object or the bytes of `Exenciones.xlsx`.

use js_sys::{Array, Uint8Array};
use wasm_bindgen::prelude::*;

use exento_core::batch::{BatchPolicy, DocumentResult, assemble, build_batch_report};
use exento_core::report::{FILE_NAME, HEADERS, ReportBuilder, TabularArtifact, to_xlsx_bytes};

/// Initialize panic hook for better error messages in console.
#[wasm_bindgen(start)]
pub fn init() {
    #[cfg(feature = "console_error_panic_hook")]
    console_error_panic_hook::set_once();
}

/// Version information.
#[wasm_bindgen]
pub fn version() -> String {
    env!("CARGO_PKG_VERSION").to_string()
}

/// Extract the exemption fields of one XML document.
#[wasm_bindgen(js_name = extractExemption)]
pub fn extract_exemption(xml: &str) -> Result<JsValue, JsValue> {
    let record = exento_core::extract(xml).map_err(to_js_error)?;

    serde_wasm_bindgen::to_value(&record).map_err(|e| JsValue::from_str(&e.to_string()))
}

/// Build the report workbook from XML documents, failing on the first bad one.
#[wasm_bindgen(js_name = buildReport)]
pub fn build_report(xmls: Vec<String>) -> Result<Uint8Array, JsValue> {
    let documents = xmls
        .into_iter()
        .enumerate()
        .map(|(index, xml)| (format!("document {}", index), xml));

    let (_, artifact) = build_batch_report(documents, BatchPolicy::FailFast, &ReportBuilder::new())
        .map_err(to_js_error)?;

    render(&artifact).map_err(to_js_error)
}

/// The column labels of the report, in order.
#[wasm_bindgen(js_name = reportHeaders)]
pub fn report_headers() -> Array {
    HEADERS.iter().map(|h| JsValue::from_str(h)).collect()
}

/// File name browsers should use when saving the report.
#[wasm_bindgen(js_name = reportFileName)]
pub fn report_file_name() -> String {
    FILE_NAME.to_string()
}

/// Collects documents one at a time and builds the report on demand.
#[wasm_bindgen(js_name = ReportBuilder)]
pub struct ReportSession {
    documents: Vec<DocumentResult>,
    skip_failed: bool,
}

#[wasm_bindgen(js_class = ReportBuilder)]
impl ReportSession {
    /// Create an empty builder.
    #[wasm_bindgen(constructor)]
    pub fn new() -> Self {
        Self {
            documents: Vec::new(),
            skip_failed: false,
        }
    }

    /// Skip documents that fail to extract instead of failing the build.
    #[wasm_bindgen(js_name = setSkipFailed)]
    pub fn set_skip_failed(&mut self, skip: bool) {
        self.skip_failed = skip;
    }

    /// Add a document; returns whether it extracted cleanly.
    #[wasm_bindgen(js_name = addDocument)]
    pub fn add_document(&mut self, name: &str, xml: &str) -> bool {
        let index = self.documents.len();
        let result = DocumentResult::extract(index, name, xml.as_bytes());
        let ok = result.result.is_ok();
        self.documents.push(result);
        ok
    }

    /// Drop every collected document.
    #[wasm_bindgen]
    pub fn clear(&mut self) {
        self.documents.clear();
    }

    /// Number of collected documents.
    #[wasm_bindgen]
    pub fn len(&self) -> usize {
        self.documents.len()
    }

    #[wasm_bindgen(js_name = isEmpty)]
    pub fn is_empty(&self) -> bool {
        self.documents.is_empty()
    }

    /// Names and errors of documents that failed to extract.
    #[wasm_bindgen]
    pub fn failures(&self) -> Array {
        self.documents
            .iter()
            .filter_map(|doc| {
                doc.result
                    .as_ref()
                    .err()
                    .map(|e| JsValue::from_str(&format!("{}: {}", doc.name, e)))
            })
            .collect()
    }

    /// Build the workbook from the collected documents.
    #[wasm_bindgen]
    pub fn build(&self) -> Result<Uint8Array, JsValue> {
        let policy = if self.skip_failed {
            BatchPolicy::SkipFailed
        } else {
            BatchPolicy::FailFast
        };

        self.render(policy).map_err(to_js_error)
    }

    /// Totals over the collected documents that extracted cleanly.
    #[wasm_bindgen]
    pub fn summary(&self) -> Result<JsValue, JsValue> {
        let batch =
            assemble(self.documents.iter().cloned(), BatchPolicy::SkipFailed).map_err(to_js_error)?;

        serde_wasm_bindgen::to_value(&batch.summary())
            .map_err(|e| JsValue::from_str(&e.to_string()))
    }
}

impl ReportSession {
    fn render(&self, policy: BatchPolicy) -> exento_core::Result<Uint8Array> {
        let batch = assemble(self.documents.iter().cloned(), policy)?;
        let artifact = ReportBuilder::new().build(batch.records())?;
        render(&artifact)
    }
}

impl Default for ReportSession {
    fn default() -> Self {
        Self::new()
    }
}

fn render(artifact: &TabularArtifact) -> exento_core::Result<Uint8Array> {
    let bytes = to_xlsx_bytes(artifact)?;
    Ok(Uint8Array::from(bytes.as_slice()))
}

fn to_js_error(e: impl std::fmt::Display) -> JsValue {
    JsValue::from_str(&e.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use wasm_bindgen_test::*;

    wasm_bindgen_test_configure!(run_in_browser);

    const FIRST: &str = include_str!("../../exento-core/tests/fixtures/exemption.xml");
    const SECOND: &str = include_str!("../../exento-core/tests/fixtures/exemption_second.xml");

    #[wasm_bindgen_test]
    fn test_report_headers() {
        let headers = report_headers();
        assert_eq!(headers.length(), 11);
        assert_eq!(headers.get(0).as_string().unwrap(), "Fecha de Emisión");
    }

    #[wasm_bindgen_test]
    fn test_build_report_returns_xlsx() {
        let bytes = build_report(vec![FIRST.to_string(), SECOND.to_string()]).unwrap();
        let bytes = bytes.to_vec();
        // xlsx files are zip archives
        assert_eq!(&bytes[..2], b"PK");
    }

    #[wasm_bindgen_test]
    fn test_build_report_rejects_empty_batch() {
        assert!(build_report(Vec::new()).is_err());
    }

    #[wasm_bindgen_test]
    fn test_build_report_names_bad_document() {
        let err = build_report(vec![FIRST.to_string(), "<dte:GTDocumento>".to_string()])
            .unwrap_err()
            .as_string()
            .unwrap();
        assert!(err.contains("document #1 (document 1)"));
    }

    #[wasm_bindgen_test]
    fn test_builder_skips_failed_documents() {
        let mut builder = ReportSession::new();
        assert!(builder.add_document("a.xml", FIRST));
        assert!(!builder.add_document("broken.xml", "not xml"));
        assert_eq!(builder.len(), 2);
        assert_eq!(builder.failures().length(), 1);

        assert!(builder.build().is_err());
        builder.set_skip_failed(true);
        assert!(builder.build().is_ok());

        builder.clear();
        assert!(builder.is_empty());
        assert!(builder.build().is_err());
    }
}
