use std::io::Cursor;

use super::*;

fn solid(name: &str, w: u32, h: u32, rgba: [u8; 4]) -> FrameRaster {
    FrameRaster {
        name: name.to_owned(),
        image: image::RgbaImage::from_pixel(w, h, image::Rgba(rgba)),
    }
}

struct DecodedFrame {
    width: u16,
    height: u16,
    delay: u16,
    dispose: gif::DisposalMethod,
}

fn decode_gif(bytes: &[u8]) -> (u16, u16, gif::Repeat, Vec<DecodedFrame>) {
    let mut opts = gif::DecodeOptions::new();
    opts.set_color_output(gif::ColorOutput::RGBA);
    let mut decoder = opts.read_info(Cursor::new(bytes)).unwrap();
    let (w, h) = (decoder.width(), decoder.height());
    let mut frames = Vec::new();
    while let Some(frame) = decoder.read_next_frame().unwrap() {
        frames.push(DecodedFrame {
            width: frame.width,
            height: frame.height,
            delay: frame.delay,
            dispose: frame.dispose,
        });
    }
    (w, h, decoder.repeat(), frames)
}

#[test]
fn gif_sink_writes_looping_gif_with_delays() {
    let mut sink = GifSink::new();
    sink.begin(SinkConfig {
        width: 4,
        height: 3,
        frame_count: 2,
    })
    .unwrap();
    sink.push_frame(0, solid("a", 4, 3, [255, 0, 0, 255]), 10)
        .unwrap();
    sink.push_frame(1, solid("b", 4, 3, [0, 0, 255, 255]), 15)
        .unwrap();
    sink.end().unwrap();
    let bytes = sink.into_bytes().unwrap();

    let (w, h, repeat, frames) = decode_gif(&bytes);
    assert_eq!((w, h), (4, 3));
    assert_eq!(repeat, gif::Repeat::Infinite);
    assert_eq!(frames.len(), 2);
    assert_eq!(frames[0].delay, 10);
    assert_eq!(frames[1].delay, 15);
    assert!(
        frames
            .iter()
            .all(|f| f.dispose == gif::DisposalMethod::Background)
    );
}

#[test]
fn gif_sink_crops_oversized_frames_to_canvas() {
    let mut sink = GifSink::new();
    sink.begin(SinkConfig {
        width: 2,
        height: 2,
        frame_count: 2,
    })
    .unwrap();
    sink.push_frame(0, solid("a", 2, 2, [0, 0, 0, 255]), 5).unwrap();
    sink.push_frame(1, solid("b", 5, 1, [9, 9, 9, 255]), 5).unwrap();
    sink.end().unwrap();

    let (_, _, _, frames) = decode_gif(&sink.into_bytes().unwrap());
    assert_eq!((frames[1].width, frames[1].height), (2, 1));
}

#[test]
fn gif_sink_rejects_out_of_order_frames() {
    let mut sink = GifSink::new();
    sink.begin(SinkConfig {
        width: 1,
        height: 1,
        frame_count: 2,
    })
    .unwrap();
    sink.push_frame(1, solid("a", 1, 1, [0; 4]), 1).unwrap();
    assert!(sink.push_frame(0, solid("b", 1, 1, [0; 4]), 1).is_err());
}

#[test]
fn gif_sink_refuses_to_finish_short() {
    let mut sink = GifSink::new();
    sink.begin(SinkConfig {
        width: 1,
        height: 1,
        frame_count: 2,
    })
    .unwrap();
    sink.push_frame(0, solid("a", 1, 1, [0; 4]), 1).unwrap();
    assert!(matches!(sink.end(), Err(RelayError::Encode(_))));
}

#[test]
fn gif_sink_requires_begin() {
    let mut sink = GifSink::new();
    assert!(sink.push_frame(0, solid("a", 1, 1, [0; 4]), 1).is_err());
    assert!(sink.end().is_err());
    assert!(GifSink::new().into_bytes().is_err());
}

#[test]
fn in_memory_sink_records_everything() {
    let mut sink = InMemorySink::new();
    sink.begin(SinkConfig {
        width: 1,
        height: 1,
        frame_count: 1,
    })
    .unwrap();
    sink.push_frame(0, solid("a", 1, 1, [1, 2, 3, 4]), 7).unwrap();
    sink.end().unwrap();
    assert!(sink.is_ended());
    assert_eq!(sink.config().unwrap().frame_count, 1);
    assert_eq!(sink.frames()[0].2, 7);
    assert_eq!(sink.frames()[0].1.name, "a");
}
