#![no_main]

use arbitrary::Arbitrary;
use bytes::Bytes;
use libfuzzer_sys::fuzz_target;

use prettylog_core::types::SeverityTable;
use prettylog_pipeline::{FilterEngine, FilterSpec, KeywordClassifier};

/// Raw flag values as a user could type them.
#[derive(Arbitrary, Debug)]
struct FuzzInput {
    fields: String,
    except: String,
    level: String,
    min_level: String,
    where_clauses: String,
    trunc: String,
    ignore: Vec<String>,
    line: Vec<u8>,
}

fuzz_target!(|input: FuzzInput| {
    let severities = SeverityTable::default();

    // invalid flag values must be rejected, never panic
    let Ok(spec) = FilterSpec::builder()
        .fields(&input.fields)
        .except(&input.except)
        .level(input.level)
        .min_level(input.min_level)
        .where_clauses(input.where_clauses)
        .truncate(input.trunc)
        .ignore_messages(input.ignore.into_iter().take(8))
        .build(&severities)
    else {
        return;
    };

    let entry = KeywordClassifier::default().classify(1, Bytes::from(input.line));
    let engine = FilterEngine::new(spec.clone(), severities);
    let _ = engine.check(&entry);
    let _ = engine.visible_fields(&entry).count();

    if let Some(rule) = &spec.truncate {
        let shortened = rule.apply(rule.field(), &entry.message);
        assert!(entry.message.starts_with(shortened));
    }
});
