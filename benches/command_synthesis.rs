//! Benchmarks for negotiation and command synthesis.
//!
//! Both run on every stream request, so they should stay well below the
//! cost of spawning the transcoder.

use criterion::{black_box, criterion_group, criterion_main, Criterion};
use mc_core::{MediaType, StreamType};
use mc_transcode::{
    AcceleratorKind, AudioStream, Backend, CapabilityProfile, Catalog, HardwareAccelerator,
    SegmentRequest, SourceMedia, StreamPaths, SubtitleStream, Synthesizer, TranscodeProfile,
    VideoStream,
};
use std::path::PathBuf;
use std::sync::Arc;

fn movie() -> SourceMedia {
    SourceMedia {
        path: PathBuf::from("/media/movies/feature.mkv"),
        media_type: MediaType::Video,
        bitrate: Some(24_000),
        video: Some(VideoStream {
            codec: "hevc".into(),
            bitrate: Some(20_000),
            width: Some(3840),
            height: Some(2160),
        }),
        audio: vec![
            AudioStream {
                codec: "truehd".into(),
                bitrate: Some(4000),
                sample_rate: Some(48_000),
                configuration: Some("7.1".into()),
            },
            AudioStream {
                codec: "aac".into(),
                bitrate: Some(192),
                sample_rate: Some(48_000),
                configuration: Some("stereo".into()),
            },
        ],
        subtitles: vec![
            SubtitleStream {
                format: "subrip".into(),
                forced: false,
                index: 3,
            },
            SubtitleStream {
                format: "hdmv_pgs_subtitle".into(),
                forced: true,
                index: 4,
            },
        ],
    }
}

fn client() -> CapabilityProfile {
    CapabilityProfile {
        client: Some("generic".into()),
        quality: Some(3),
        codecs: vec!["h264".into(), "aac".into(), "mp3".into(), "webvtt".into()],
        mch_codecs: Some(vec!["ac3".into()]),
        format: Some("hls".into()),
        offset: 120,
        ..Default::default()
    }
}

fn synthesizer() -> Synthesizer {
    let backend = Backend::new(PathBuf::from("/usr/bin/ffmpeg")).with_accelerators(vec![
        HardwareAccelerator::new(
            AcceleratorKind::Vaapi,
            Some(PathBuf::from("/dev/dri/renderD128")),
        ),
        HardwareAccelerator::new(AcceleratorKind::Cuda, None),
    ]);
    Synthesizer::new(
        Arc::new(backend),
        StreamPaths::new("/var/cache/mediacast", "/var/lib/mediacast"),
    )
}

fn bench_negotiation(c: &mut Criterion) {
    let catalog = Catalog::standard();
    let source = movie();
    let caps = client();

    c.bench_function("negotiate_4k_movie", |b| {
        b.iter(|| mc_transcode::negotiate(black_box(&source), black_box(&caps), &catalog))
    });
}

fn bench_synthesis(c: &mut Criterion) {
    let synthesizer = synthesizer();
    let profile = match TranscodeProfile::negotiate(movie(), client(), &Catalog::standard()) {
        Ok(profile) => profile,
        Err(e) => panic!("negotiation failed: {e}"),
    };

    let mut group = c.benchmark_group("synthesis");
    group.bench_function("full_command", |b| {
        b.iter(|| synthesizer.full_command(black_box(&profile)))
    });

    let request = SegmentRequest::new("42", StreamType::Video, 1);
    group.bench_function("video_segment", |b| {
        b.iter(|| synthesizer.segment_command(black_box(&request), Some(&profile)))
    });
    group.finish();
}

criterion_group!(benches, bench_negotiation, bench_synthesis);
criterion_main!(benches);
