use pdf_compositor::{
    CompositeMode, Compositor, CompositorConfig, PlanTier, RequestPayload, ScopedUpload,
};
use serde_json::json;
use std::{fs::File, io::Write, path::Path};

/// Usage: `compose_doc <input.pdf> <output.pdf> [signature.png] [pro]`
fn main() {
    let args = std::env::args().collect::<Vec<_>>();
    if args.len() < 3 {
        eprintln!("Usage: compose_doc <input.pdf> <output.pdf> [signature.png] [pro]");
        std::process::exit(2);
    }
    let pdf_data = std::fs::read(&args[1]).unwrap();
    let signature_png = args
        .get(3)
        .filter(|arg| arg.as_str() != "pro")
        .map(|path| std::fs::read(path).unwrap());
    let tier = if args.iter().skip(3).any(|arg| arg == "pro") {
        PlanTier::Pro
    } else {
        PlanTier::Free
    };

    // Kept on disk only while the request is handled.
    let upload = ScopedUpload::persist(&std::env::temp_dir().join("compose_doc"), &pdf_data).unwrap();

    let placements = json!([
        {"id": "p1", "pageIndex": 0, "xPct": 0.1, "yPct": 0.75, "wPct": 0.25, "hPct": 0.08},
        {"id": "p2", "signerId": "272", "pageIndex": 0, "xPct": 0.55, "yPct": 0.75, "wPct": 0.25, "hPct": 0.08}
    ]);
    let text_placements = json!([
        {"id": "t1", "pageIndex": 0, "xPct": 0.1, "yPct": 0.85, "text": "Alice\nalice@test.com"}
    ]);
    let signers = json!([
        {"id": "272", "name": "Charlie", "email": "charlie@test.com", "signatureMethod": "draw"}
    ]);

    let payload = RequestPayload {
        pdf: Some(upload.read().unwrap()),
        legacy_signature: signature_png,
        placements: Some(placements.to_string()),
        text_placements: Some(text_placements.to_string()),
        signer_meta_json: Some(signers.to_string()),
        signatures_json: Some("{}".to_owned()),
        audit_field_lines: Some("Contract: Demo\nCity: Ghent".to_owned()),
        ..Default::default()
    };

    let compositor = Compositor::new(CompositorConfig::default());
    let result = compositor
        .composite_payload(payload, tier, CompositeMode::Full)
        .unwrap();
    for diagnostic in &result.diagnostics {
        println!("note: {}", diagnostic);
    }
    println!(
        "{} page(s), original SHA-256 {}",
        result.page_count, result.original_hash
    );

    let mut pdf_file = File::create(Path::new(&args[2])).unwrap();
    pdf_file.write_all(&result.pdf).unwrap();
}
