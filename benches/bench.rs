//! Benchmarks for the evaluation engine over synthetic postings.

use criterion::{Criterion, criterion_group, criterion_main};
use std::hint::black_box;

use kontos::index::MemoryIndex;
use kontos::query::{QueryNode, RetrievalModel, evaluate};

/// A synthetic corpus where the vocabulary rotates per document, so
/// proximity merges do real sliding work.
fn synthetic_index(docs: u64, tokens_per_doc: usize) -> MemoryIndex {
    let mut index = MemoryIndex::new();
    let vocab = ["alpha", "beta", "gamma", "delta", "epsilon"];

    for doc_id in 0..docs {
        let tokens: Vec<&str> = (0..tokens_per_doc)
            .map(|i| vocab[(i + doc_id as usize) % vocab.len()])
            .collect();
        index.add_document(doc_id, "body", &tokens);
    }
    index
}

fn bench_near_merge(c: &mut Criterion) {
    let index = synthetic_index(500, 200);
    let query = QueryNode::Near {
        n: 2,
        children: vec![QueryNode::term("alpha"), QueryNode::term("beta")],
    };
    let model = RetrievalModel::RankedBoolean;

    c.bench_function("near_merge_500_docs", |b| {
        b.iter(|| {
            let results = evaluate(black_box(&query), &model, &index).unwrap();
            black_box(results)
        })
    });
}

fn bench_bm25_conjunction(c: &mut Criterion) {
    let index = synthetic_index(500, 200);
    let query = QueryNode::And(vec![
        QueryNode::term("alpha"),
        QueryNode::term("gamma"),
        QueryNode::term("epsilon"),
    ]);
    let model = RetrievalModel::bm25(1.2, 0.75, 0.0).unwrap();

    c.bench_function("bm25_and_500_docs", |b| {
        b.iter(|| {
            let mut results = evaluate(black_box(&query), &model, &index).unwrap();
            results.sort();
            results.truncate(100);
            black_box(results)
        })
    });
}

fn bench_dirichlet_scoring(c: &mut Criterion) {
    let index = synthetic_index(500, 200);
    let query = QueryNode::And(vec![
        QueryNode::term("alpha"),
        QueryNode::term("missing-term"),
    ]);
    let model = RetrievalModel::dirichlet(2500.0, 0.4).unwrap();

    c.bench_function("dirichlet_and_with_defaults", |b| {
        b.iter(|| {
            let results = evaluate(black_box(&query), &model, &index).unwrap();
            black_box(results)
        })
    });
}

criterion_group!(
    benches,
    bench_near_merge,
    bench_bm25_conjunction,
    bench_dirichlet_scoring
);
criterion_main!(benches);
