//! Video decode hints, filter chains and encoder arguments shared by the
//! full-file and segment commands.

use crate::backend::{AcceleratorKind, HardwareAccelerator};
use crate::catalog::{normalize_codec, Catalog};
use crate::source::Resolution;

use super::CommandBuilder;

/// Encoder for `codec` on `accelerator`, if the accelerator has one.
fn hardware_encoder(accelerator: Option<&HardwareAccelerator>, codec: &str) -> Option<&'static str> {
    accelerator.and_then(|a| a.encoder(codec))
}

/// Hardware decoding hints, placed before the input.
///
/// Frames stay in device memory only for a vaapi encode without overlay.
pub(super) fn push_decode(
    b: &mut CommandBuilder,
    accelerator: Option<&HardwareAccelerator>,
    codec: &str,
    overlay: bool,
) {
    let Some(accel) = accelerator else {
        return;
    };
    let keep_on_device = !overlay && hardware_encoder(Some(accel), codec).is_some();
    b.extend(accel.decode_args(keep_on_device));
}

/// Filter steps for scaling and, for vaapi, uploading to the device.
fn filter_chain(
    accelerator: Option<&HardwareAccelerator>,
    codec: &str,
    resolution: Option<Resolution>,
) -> Vec<String> {
    let mut chain = Vec::new();
    match accelerator {
        Some(accel)
            if accel.kind == AcceleratorKind::Vaapi && accel.encoder(codec).is_some() =>
        {
            chain.push("format=nv12|vaapi".to_string());
            chain.push("hwupload".to_string());
            if let Some(res) = resolution {
                chain.push(format!("scale_vaapi=w={}:h={}", res.width, res.height));
            }
        }
        _ => {
            if let Some(res) = resolution {
                chain.push(format!("scale=w={}:h={}", res.width, res.height));
            }
        }
    }
    chain
}

/// Filters and encoder arguments for a converted video stream.
///
/// With `overlay` set to a subtitle stream, the subtitle is burned in
/// through a filter graph which also maps the output; otherwise the caller
/// has already mapped the video.
pub(super) fn push_video_encode(
    b: &mut CommandBuilder,
    catalog: &Catalog,
    accelerator: Option<&HardwareAccelerator>,
    codec: &str,
    resolution: Option<Resolution>,
    overlay: Option<usize>,
) {
    let chain = filter_chain(accelerator, codec, resolution);

    match overlay {
        Some(track) => {
            let mut graph = format!("[0:v][0:s:{track}]overlay");
            for step in &chain {
                graph.push(',');
                graph.push_str(step);
            }
            graph.push_str("[v]");
            b.param("-filter_complex", graph).param("-map", "[v]");
        }
        None if !chain.is_empty() => {
            b.param("-vf", chain.join(","));
        }
        None => {}
    }

    if let Some(encoder) = hardware_encoder(accelerator, codec) {
        b.param("-c:v", encoder);
        return;
    }

    match normalize_codec(codec).as_str() {
        "h264" => {
            b.param("-c:v", "libx264")
                .param("-crf", 23)
                .param("-preset", "superfast")
                .param("-pix_fmt", "yuv420p")
                .param("-profile:v", "baseline");
        }
        "vp8" => {
            b.param("-c:v", "libvpx")
                .param("-crf", 25)
                .param("-b:v", 0)
                .param("-quality", "realtime")
                .param("-cpu-used", 5);
        }
        other => {
            b.param("-c:v", catalog.video_encoder(other));
        }
    }
}
