use actuator_core::{TimingCfg, build_homing};
use actuator_hardware::{SimTrack, TrackLayout};
use criterion::{Criterion, black_box, criterion_group, criterion_main};

fn bench_poll(c: &mut Criterion) {
    c.bench_function("poll_full_homing_run", |b| {
        b.iter(|| {
            let track = SimTrack::new(TrackLayout::default());
            let mut core = build_homing(track.switches(), track.actuator(), TimingCfg::default())
                .expect("build");
            core.start();
            let mut tick = 0u64;
            while !core.poll(black_box(tick)).expect("poll").is_terminal() {
                track.advance(1);
                tick += 1;
            }
            black_box(core.calibration())
        })
    });

    c.bench_function("poll_parked", |b| {
        let track = SimTrack::new(TrackLayout::default());
        let mut core = build_homing(track.switches(), track.actuator(), TimingCfg::default())
            .expect("build");
        core.start();
        let mut tick = 0u64;
        while !core.poll(tick).expect("poll").is_terminal() {
            track.advance(1);
            tick += 1;
        }
        b.iter(|| {
            tick += 1;
            black_box(core.poll(black_box(tick)).expect("poll"))
        })
    });
}

criterion_group!(benches, bench_poll);
criterion_main!(benches);
