//! Criterion benchmarks for the per-frame ring work.
//!
//! Benchmarks:
//!   - one full rotation step (30 animated frames plus the settling frame)
//!   - an idle frame on a settled ring
//!   - formula evaluation when a ring is placed
//!
//! Run with: cargo bench --bench ring_update

use criterion::{black_box, criterion_group, criterion_main, Criterion};

use ringmenu_tui::app::{CueChannel, TerminalInput};
use ringmenu_tui::menu::{
    Formula, FormulaContext, Icon, Point, RingMenu, RingMenuOptions, StaticCommands,
};

fn ring(commands: usize) -> RingMenu {
    let (audio, _cues) = CueChannel::new();
    let mut ring = RingMenu::new(
        RingMenuOptions {
            centre: Point::new(60.0, 20.0),
            radius: Point::new(30.0, 8.0),
            starting_angle: -std::f64::consts::FRAC_PI_2,
            scale: 0.2,
            ..RingMenuOptions::default()
        },
        Box::new(StaticCommands),
        Box::new(audio),
    );
    for i in 0..commands {
        ring.add_command(
            format!("Command {}", i),
            format!("command:{}", i),
            i % 3 != 0,
            Some(Icon::Index(64 + i as u32)),
        );
    }
    ring
}

fn bench_rotation(c: &mut Criterion) {
    let mut group = c.benchmark_group("ring_rotation");

    for commands in [8, 32] {
        let mut menu = ring(commands);
        let mut input = TerminalInput::default();
        group.bench_function(format!("turn_{}_commands", commands), |b| {
            b.iter(|| {
                menu.turn_right(Some(30));
                for _ in 0..31 {
                    menu.update(black_box(&mut input));
                }
                black_box(menu.index())
            });
        });
    }

    group.finish();
}

fn bench_idle_frame(c: &mut Criterion) {
    let mut menu = ring(8);
    let mut input = TerminalInput::default();
    c.bench_function("ring_idle_frame", |b| {
        b.iter(|| {
            menu.update(black_box(&mut input));
            black_box(menu.buttons().len())
        });
    });
}

fn bench_formula(c: &mut Criterion) {
    let formula = Formula::parse("player_y - (if in_airship { 3 } else { 1 }) + screen_height / 4")
        .expect("benchmark formula parses");
    let context = FormulaContext::new(120.0, 40.0).with_player(60.0, 20.0, true);
    c.bench_function("formula_eval", |b| {
        b.iter(|| black_box(formula.eval(black_box(&context))));
    });
}

criterion_group!(benches, bench_rotation, bench_idle_frame, bench_formula);
criterion_main!(benches);
