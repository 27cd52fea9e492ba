use criterion::{black_box, criterion_group, criterion_main, Criterion};

use quizmark_core::filter::collect_participant_ids;
use quizmark_core::grid::{CellGrid, CellValue};
use quizmark_core::scanner::{scan_answer_key, scan_responses, ScanOptions};

fn raw_data(participants: u32, questions: u32) -> CellGrid {
    let mut rows = vec![vec![
        CellValue::from("user_id"),
        CellValue::from("currentQuizNumber"),
        CellValue::from("option_number"),
    ]];
    for p in 1..=participants {
        for q in 1..=questions {
            let answer = if (p + q) % 7 == 0 { -1.0 } else { f64::from(p % 4 + 1) };
            rows.push(vec![
                CellValue::Number(f64::from(p)),
                CellValue::Number(f64::from(q)),
                CellValue::Number(answer),
            ]);
        }
    }
    CellGrid::from_rows(rows)
}

fn bench_scan_responses(c: &mut Criterion) {
    let mut group = c.benchmark_group("scan_responses");
    let options = ScanOptions::default();

    for (participants, questions) in [(100, 20), (1000, 50)] {
        let grid = raw_data(participants, questions);
        group.bench_function(format!("{participants}x{questions}"), |b| {
            b.iter(|| scan_responses(black_box(&grid), black_box(&options)))
        });
    }

    group.finish();
}

fn bench_participant_ids(c: &mut Criterion) {
    let grid = raw_data(1000, 50);
    c.bench_function("collect_participant_ids/1000x50", |b| {
        b.iter(|| collect_participant_ids(black_box(&grid)))
    });
}

fn bench_answer_key(c: &mut Criterion) {
    let grid = CellGrid::from_rows((1..=200).map(|q| {
        vec![
            CellValue::Number(f64::from(q)),
            CellValue::Number(f64::from(q % 5 + 1)),
            CellValue::Number(2.5),
        ]
    }));
    let options = ScanOptions::default();
    c.bench_function("scan_answer_key/200", |b| {
        b.iter(|| scan_answer_key(black_box(&grid), black_box(&options)))
    });
}

criterion_group!(
    benches,
    bench_scan_responses,
    bench_participant_ids,
    bench_answer_key
);
criterion_main!(benches);
