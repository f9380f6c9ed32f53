//! Benchmarks for the sentence pipeline behind topic answers.
//!
//! Measures cleanup, dedupe and ranking over a realistic gather of one
//! encyclopedia summary plus a handful of web snippets.

use std::time::Duration;

use criterion::{criterion_group, criterion_main, Criterion};
use nik_core::config::SearchConfig;
use nik_search::text::{rank, topic_keywords, working_sentences, MarkerSet, Scoring};

/// A paragraph of history-flavoured prose with citation markers.
fn generate_body(index: usize) -> String {
    format!(
        "Bulgaria is a country in southeast Europe on the Black Sea coast.[{index}] \
         The First Bulgarian Empire was founded in the 7th century and rivalled \
         Byzantium for centuries. During the medieval period the Bulgarian state \
         adopted Christianity and the Cyrillic script spread from its schools. \
         Ottoman rule lasted nearly five centuries [citation needed]. Modern \
         Bulgaria declared independence in 1908 and joined the European Union in \
         2007. Snippet number {index} repeats some of the same facts."
    )
}

fn bench_ranking(c: &mut Criterion) {
    let config = SearchConfig::default();
    let bodies: Vec<String> = (0..20).map(generate_body).collect();
    let keywords = topic_keywords("history of bulgaria");
    let era = MarkerSet::new(&config.era_markers).expect("default era markers compile");
    let scoring = Scoring {
        keywords: &keywords,
        era_markers: &era,
        keyword_weight: config.keyword_weight,
        era_bonus: config.era_bonus,
    };

    let mut group = c.benchmark_group("sentence_ranking");
    group.sample_size(100);
    group.measurement_time(Duration::from_secs(5));

    group.bench_function("working_sentences_20_bodies", |b| {
        b.iter(|| working_sentences(bodies.iter().map(String::as_str), config.min_sentence_chars));
    });

    let working = working_sentences(bodies.iter().map(String::as_str), config.min_sentence_chars);
    let texts: Vec<&str> = working.iter().map(|(s, _)| s.as_str()).collect();

    group.bench_function("rank_working_set", |b| {
        b.iter(|| rank(&texts, &scoring));
    });

    group.bench_function("full_pipeline", |b| {
        b.iter(|| {
            let working =
                working_sentences(bodies.iter().map(String::as_str), config.min_sentence_chars);
            let texts: Vec<&str> = working.iter().map(|(s, _)| s.as_str()).collect();
            rank(&texts, &scoring).len()
        });
    });

    group.finish();
}

criterion_group!(benches, bench_ranking);
criterion_main!(benches);
