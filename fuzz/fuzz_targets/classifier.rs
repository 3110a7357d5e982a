#![no_main]

use bytes::Bytes;
use libfuzzer_sys::fuzz_target;
use prettylog_pipeline::{KeywordClassifier, LogPipeline, RenderOptions};

fuzz_target!(|data: &[u8]| {
    let entry = KeywordClassifier::default().classify(1, Bytes::copy_from_slice(data));

    let pipeline = LogPipeline::builder()
        .options(RenderOptions {
            color: false,
            ..RenderOptions::default()
        })
        .build();
    let output = pipeline.renderer().output(&entry);
    let _ = pipeline.renderer().format(&entry);

    // unparsed lines are written back byte for byte
    if !entry.is_parsed {
        assert_eq!(entry.original_line.as_ref(), data);
        assert!(output.starts_with(data));
        assert!(output.len() - data.len() <= 1);
    }
    assert!(output.ends_with(b"\n"));
});
