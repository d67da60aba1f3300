use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use storefront::money::{calculate_cart_total, format_cents, item_count, PricedQuantity};

fn cart_of(lines: usize) -> Vec<PricedQuantity> {
  (0..lines)
    .map(|i| PricedQuantity {
      quantity: (i % 5 + 1) as i64,
      price_cents: 250 + (i as i64 * 137) % 10_000,
    })
    .collect()
}

fn bench_cart_total(c: &mut Criterion) {
  let mut group = c.benchmark_group("CartTotal");
  for lines in [1usize, 16, 256] {
    let cart = cart_of(lines);
    group.bench_with_input(BenchmarkId::from_parameter(lines), &cart, |b, cart| {
      b.iter(|| (calculate_cart_total(black_box(cart)), item_count(black_box(cart))))
    });
  }
  group.finish();
}

fn bench_format_cents(c: &mut Criterion) {
  c.bench_function("FormatCents", |b| b.iter(|| format_cents(black_box(1_234_567))));
}

criterion_group!(benches, bench_cart_total, bench_format_cents);
criterion_main!(benches);
