#![allow(missing_docs)]

use std::sync::{Arc, LazyLock};

use divan::{Bencher, black_box};
use nettrans::{
    batching::PaddedBatch,
    decoding::DecoderOptions,
    oracle::{BigramOracle, BigramOracleOptions},
    transliterator::{Transliterate, Transliterator, TransliteratorOptions},
    vocab::{SymbolTable, corpus::read_corpus},
};

#[global_allocator]
static ALLOC: divan::AllocProfiler = divan::AllocProfiler::system();

fn main() {
    divan::main();
}

static NAMES_CORPUS: &str = include_str!("data/kor_names.txt");

type T = u32;

struct Fixture {
    model: Transliterator<T, BigramOracle>,
    sources: Vec<String>,
}

static FIXTURE: LazyLock<Fixture> = LazyLock::new(|| {
    let records = read_corpus(NAMES_CORPUS.as_bytes()).unwrap();
    let (source, target) = SymbolTable::<T>::build_pair(&records).unwrap();
    let oracle = BigramOracleOptions::default()
        .train(&records, &target)
        .unwrap();

    let options = TransliteratorOptions::default()
        .with_decoder(DecoderOptions::default().with_greedy_fast_path(false));
    Fixture {
        model: options.build(Arc::new(source), Arc::new(target), oracle),
        sources: records.iter().map(|r| r.source_word()).collect(),
    }
});

#[divan::bench(args = [1, 3, 5, 10])]
fn beam_search(
    bencher: Bencher,
    beam_size: usize,
) {
    let fixture = &*FIXTURE;
    bencher.bench(|| {
        for source in &fixture.sources {
            black_box(fixture.model.transliterate(source, beam_size, 16).unwrap());
        }
    });
}

#[divan::bench]
fn greedy(bencher: Bencher) {
    let fixture = &*FIXTURE;
    let options = DecoderOptions::default().with_beam_size(1).with_max_pred_len(16);
    let cancel = Default::default();
    bencher.bench(|| {
        for source in &fixture.sources {
            black_box(fixture.model.decode_with(source, options, &cancel).unwrap());
        }
    });
}

#[divan::bench(args = [8, 64, 512])]
fn pad_batch(
    bencher: Bencher,
    batch_size: usize,
) {
    let sequences: Vec<Vec<T>> = (0..batch_size)
        .map(|i| (0..(i % 24) as T + 1).collect())
        .collect();
    bencher.bench(|| PaddedBatch::pad(black_box(&sequences), 0));
}
