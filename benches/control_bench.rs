// Benchmark for control state switching and command resolution
// Run with: cargo bench

use armctl::control::{ControlAction, ControlStateMachine};
use armctl::program::Program;
use criterion::{criterion_group, criterion_main, Criterion};

fn bench_pause_resume_cycle(c: &mut Criterion) {
    let control = ControlStateMachine::new();
    c.bench_function("pause/resume/ack cycle x1000", |b| {
        b.iter(|| {
            for _ in 0..1000 {
                control.switch(ControlAction::Pause).unwrap();
                control.switch(ControlAction::MotionPaused).unwrap();
                control.switch(ControlAction::Resume).unwrap();
                control.switch(ControlAction::MotionResumed).unwrap();
            }
        });
    });
}

fn bench_resolve_program(c: &mut Criterion) {
    let mut src = String::new();
    for i in 0..1000 {
        src.push_str(&format!(
            "[[command]]\ntype = \"ptp\"\ngoal = [{}, 0.0, 0.0, 0.0, 0.0, 0.0]\n",
            i as f64 * 0.001
        ));
    }
    let program: Program = src.parse().unwrap();
    c.bench_function("resolve 1k ptp commands", |b| {
        b.iter(|| {
            let ok_count = program
                .commands
                .iter()
                .filter(|spec| spec.to_command().is_ok())
                .count();
            assert_eq!(ok_count, 1000);
        });
    });
}

criterion_group!(benches, bench_pause_resume_cycle, bench_resolve_program);
criterion_main!(benches);
