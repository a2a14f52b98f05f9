use criterion::{Criterion, black_box, criterion_group, criterion_main};
use raceplay::dataset::{DriverPosition, Frame, RaceDataset, TrackOutline};
use raceplay::playback::PlaybackClock;
use raceplay::projection::{self, Point2D, Projector};
use raceplay::standings;
use std::collections::{BTreeMap, HashMap};
use std::time::Duration;

const DRIVERS: [&str; 20] = [
    "VER", "PER", "HAM", "RUS", "LEC", "SAI", "NOR", "PIA", "ALO", "STR", "GAS", "OCO", "ALB",
    "SAR", "TSU", "RIC", "BOT", "ZHO", "MAG", "HUL",
];

fn oval_track(points: usize) -> TrackOutline {
    let (x, y): (Vec<f64>, Vec<f64>) = (0..points)
        .map(|i| {
            let angle = i as f64 / points as f64 * std::f64::consts::TAU;
            (4000. * angle.cos(), 2500. * angle.sin())
        })
        .unzip();
    TrackOutline { x, y }
}

fn create_frame(index: usize) -> Frame {
    let positions: BTreeMap<String, DriverPosition> = DRIVERS
        .iter()
        .enumerate()
        .map(|(i, code)| {
            let angle = (index + i * 10) as f64 * 0.01;
            let position = DriverPosition {
                x: Some(4000. * angle.cos()),
                y: Some(2500. * angle.sin()),
                position: Some(((i + index / 100) % DRIVERS.len()) as u32 + 1),
                status: "OnTrack".to_string(),
                compound: "MEDIUM".to_string(),
                speed: Some(280.),
                gear: Some(7),
                drs: Some(0),
            };
            (code.to_string(), position)
        })
        .collect();
    Frame {
        time: index as f64 / 30.,
        lap: (index / 2700) as u32 + 1,
        positions: Some(positions),
    }
}

fn bench_projection(c: &mut Criterion) {
    let mut group = c.benchmark_group("projection");
    let track = oval_track(5000);
    let frame = create_frame(0);

    group.bench_function("projector_new_5000_points", |b| {
        b.iter(|| black_box(Projector::new(black_box(&track), 92.)));
    });

    let projector = Projector::new(&track, 92.);
    group.bench_function("canvas_track_outline", |b| {
        b.iter(|| {
            let transform = projector.canvas(1280., 800., 50.);
            let points: Vec<Point2D> = projection::decimate(&track, 5)
                .iter()
                .map(|p| transform.apply(&projector, p.x, p.y))
                .collect();
            black_box(points)
        });
    });

    group.bench_function("driver_markers_20_drivers", |b| {
        let transform = projector.canvas(1280., 800., 50.);
        b.iter(|| {
            black_box(projection::driver_markers(black_box(&frame), |x, y| {
                transform.apply(&projector, x, y)
            }))
        });
    });

    group.finish();
}

fn bench_playback(c: &mut Criterion) {
    let mut group = c.benchmark_group("playback");

    group.bench_function("tick_full_race_60hz", |b| {
        b.iter(|| {
            let mut clock = PlaybackClock::new(black_box(5000));
            clock.play();
            let mut now = 0.;
            while clock.is_playing() {
                clock.tick(now);
                now += 1000. / 60.;
            }
            black_box(clock.current_frame())
        });
    });

    let frame = create_frame(1234);
    let drivers = HashMap::new();
    group.bench_function("standings_20_drivers", |b| {
        b.iter(|| black_box(standings::standings(black_box(&frame), &drivers)));
    });

    group.finish();
}

fn bench_dataset_parsing(c: &mut Criterion) {
    let mut group = c.benchmark_group("dataset");

    let dataset = RaceDataset {
        track: oval_track(2000),
        frames: (0..1000).map(create_frame).collect(),
        ..Default::default()
    };
    let json = serde_json::to_vec(&dataset).unwrap();

    group.bench_function("parse_1000_frames", |b| {
        b.iter(|| black_box(raceplay::dataset::loader::parse_dataset(black_box(&json)).unwrap()));
    });

    group.finish();
}

criterion_group! {
    name = benches;
    config = Criterion::default()
        .measurement_time(Duration::from_secs(10))
        .sample_size(50);
    targets = bench_projection, bench_playback, bench_dataset_parsing
}
criterion_main!(benches);
