//! End-to-end integration tests for edgequake-pdf2xml.
//!
//! These tests use real PDF files in `./test_cases/` and need a pdfium
//! library. They are gated behind the `E2E_ENABLED` environment variable so
//! they do not run in CI unless explicitly requested.
//!
//! Run with:
//!   E2E_ENABLED=1 PDFIUM_LIB_PATH=/path/to/pdfium cargo test --test e2e -- --nocapture
//!
//! To restrict to a specific test:
//!   E2E_ENABLED=1 cargo test --test e2e test_inspect -- --nocapture

use edgequake_pdf2xml::{
    convert, convert_from_bytes, convert_to_file, inspect, parse_document, ConversionConfig,
    ConversionOutput, Pdf2XmlError,
};
use std::path::PathBuf;
use std::sync::Once;

// ── Test helpers ─────────────────────────────────────────────────────────────

static TRACING: Once = Once::new();

/// Route library logs through the test harness; `RUST_LOG` picks the level.
fn init_tracing() {
    TRACING.call_once(|| {
        let _ = tracing_subscriber::fmt()
            .with_env_filter(
                tracing_subscriber::EnvFilter::try_from_default_env()
                    .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
            )
            .with_test_writer()
            .try_init();
    });
}

fn test_cases_dir() -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("test_cases")
}

fn output_dir() -> PathBuf {
    let d = PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("test_cases/output");
    std::fs::create_dir_all(&d).ok();
    d
}

/// Skip this test if E2E_ENABLED is not set *or* no PDF file at `path`.
macro_rules! e2e_skip_unless_ready {
    ($path:expr) => {{
        init_tracing();
        if std::env::var("E2E_ENABLED").is_err() {
            println!("SKIP — set E2E_ENABLED=1 to run e2e tests");
            return;
        }
        let p: PathBuf = $path;
        if !p.exists() {
            println!("SKIP — test file not found: {}", p.display());
            return;
        }
        p
    }};
}

/// Assert the XML is well-formed, parses back, and agrees with the tree.
fn assert_xml_quality(out: &ConversionOutput, context: &str) {
    assert!(
        out.xml.starts_with("<?xml"),
        "[{context}] XML must start with a declaration"
    );
    let back = parse_document(&out.xml)
        .unwrap_or_else(|e| panic!("[{context}] XML does not parse back: {e}"));
    assert_eq!(
        back.content, out.document.content,
        "[{context}] Parsed content differs from the in-memory tree"
    );
    assert_eq!(back.metadata, out.document.metadata);
    assert_eq!(
        out.stats.heading_count + out.stats.paragraph_count,
        out.document.content.len()
    );

    // No node should carry leading whitespace; headings carry none at all.
    for node in &out.document.content {
        assert!(!node.text().starts_with(char::is_whitespace));
        if node.is_heading() {
            assert_eq!(node.text(), node.text().trim());
        }
    }

    println!(
        "[{context}] ✓  {} bytes, {} headings, {} paragraphs",
        out.xml.len(),
        out.stats.heading_count,
        out.stats.paragraph_count
    );
}

// ── Input errors (no pdfium needed) ──────────────────────────────────────────

#[tokio::test]
async fn test_convert_nonexistent() {
    let err = convert("/definitely/not/a/real/file.pdf", &ConversionConfig::default())
        .await
        .unwrap_err();
    assert!(matches!(err, Pdf2XmlError::FileNotFound { .. }), "got {err:?}");
}

#[tokio::test]
async fn test_convert_rejects_non_pdf_file() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("fake.pdf");
    std::fs::write(&path, b"<html>not a pdf</html>").unwrap();

    let err = convert(&path, &ConversionConfig::default()).await.unwrap_err();
    assert!(matches!(err, Pdf2XmlError::NotAPdf { .. }), "got {err:?}");

    let err = inspect(&path, &ConversionConfig::default()).await.unwrap_err();
    assert!(matches!(err, Pdf2XmlError::NotAPdf { .. }), "got {err:?}");
}

#[tokio::test]
async fn test_convert_from_bytes_rejects_empty() {
    let err = convert_from_bytes(Vec::new(), "empty.pdf", &ConversionConfig::default())
        .await
        .unwrap_err();
    assert!(matches!(err, Pdf2XmlError::EmptyInput { .. }), "got {err:?}");
}

// ── Inspect tests ────────────────────────────────────────────────────────────

#[tokio::test]
async fn test_inspect_sample() {
    let path = e2e_skip_unless_ready!(test_cases_dir().join("sample.pdf"));

    let info = inspect(&path, &ConversionConfig::default())
        .await
        .expect("inspect() should succeed");

    assert!(info.page_count >= 1);
    assert_eq!(info.file_name, "sample.pdf");
    println!("Info: {:?}", info);
}

// ── Conversion tests ─────────────────────────────────────────────────────────

#[tokio::test]
async fn test_convert_sample() {
    let path = e2e_skip_unless_ready!(test_cases_dir().join("sample.pdf"));
    let out_path = output_dir().join("sample.xml");

    let result = convert(&path, &ConversionConfig::default())
        .await
        .expect("conversion should succeed");

    assert!(result.stats.page_count >= 1);
    assert_eq!(result.document.metadata.file_name, "sample.pdf");
    assert_xml_quality(&result, "sample");

    std::fs::write(&out_path, &result.xml).ok();
    println!("[sample] Saved to {}", out_path.display());
}

#[tokio::test]
async fn test_convert_to_file_is_atomic() {
    let path = e2e_skip_unless_ready!(test_cases_dir().join("sample.pdf"));
    let dir = tempfile::tempdir().unwrap();
    let out_path = dir.path().join("nested/sample.xml");

    let stats = convert_to_file(&path, &out_path, &ConversionConfig::default())
        .await
        .expect("conversion should succeed");

    let written = std::fs::read_to_string(&out_path).unwrap();
    assert_eq!(written.len(), stats.xml_bytes);
    assert!(!out_path.with_extension("xml.tmp").exists());
}

#[tokio::test]
async fn test_convert_encrypted_needs_password() {
    let path = e2e_skip_unless_ready!(test_cases_dir().join("encrypted.pdf"));

    let err = convert(&path, &ConversionConfig::default())
        .await
        .unwrap_err();
    assert!(
        matches!(
            err,
            Pdf2XmlError::PasswordRequired { .. } | Pdf2XmlError::WrongPassword { .. }
        ),
        "got {err:?}"
    );
}

/// Verify JSON output is well-formed
#[tokio::test]
async fn test_convert_json_serialisable() {
    let path = e2e_skip_unless_ready!(test_cases_dir().join("sample.pdf"));

    let config = ConversionConfig::builder()
        .pretty(false)
        .build()
        .expect("valid config");
    let result = convert(&path, &config)
        .await
        .expect("conversion should succeed");

    let json =
        serde_json::to_string_pretty(&result).expect("ConversionOutput must serialise to JSON");
    let back: ConversionOutput =
        serde_json::from_str(&json).expect("JSON must deserialize back to ConversionOutput");
    assert_eq!(back.stats, result.stats);

    let out_path = output_dir().join("sample.json");
    std::fs::write(&out_path, &json).ok();
    println!("[json] Saved to {}", out_path.display());
}
