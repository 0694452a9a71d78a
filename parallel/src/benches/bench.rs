use criterion::criterion_main;


criterion_main!(filter::benches, fold::benches);
