//! End-to-end tests of rendering through the streaming PNG reader and writer.

use std::fs::File;
use std::io::{BufReader, BufWriter};

use image::{ImageBuffer, Rgba};
use projection::WorldProjection;
use renderer::{render_in_memory, render_png, RenderConfig, RenderError, StripePlan, TileOrderIndex};
use test_utils::{gradient_image, random_sparse_store, read_rgb_png, small_world, write_rgb_png};

fn small_config(stripe_height: u32) -> RenderConfig {
    RenderConfig {
        world: small_world(),
        stripe_height,
        ..RenderConfig::default()
    }
}

#[test]
fn test_png_render_matches_in_memory_render() {
    let world = small_world();
    let projection = WorldProjection::new(world).unwrap();
    let store = random_sparse_store(5, 50, 300, &world);
    let base = gradient_image(48, 30);

    let dir = tempfile::tempdir().unwrap();
    let input = dir.path().join("base.png");
    let output = dir.path().join("heat.png");
    write_rgb_png(&input, 48, 30, base.clone()).unwrap();

    let config = small_config(6);
    let source = BufReader::new(File::open(&input).unwrap());
    let sink = BufWriter::new(File::create(&output).unwrap());
    let index = TileOrderIndex::build(&store, &projection);
    let (_, summary) = render_png(source, sink, index, &config).unwrap();
    assert_eq!(summary.chunks, 5);
    assert_eq!(summary.tiles.painted, store.size());
    assert_eq!(summary.unvisited, 0);

    let mut expected = base;
    let plan = StripePlan::from_stripe_height(48, 30, 6).unwrap();
    render_in_memory(
        &mut expected,
        &plan,
        TileOrderIndex::build(&store, &projection),
        &config,
    )
    .unwrap();

    let (width, height, rendered) = read_rgb_png(&output).unwrap();
    assert_eq!((width, height), (48, 30));
    assert_eq!(rendered, expected);
}

#[test]
fn test_rgba_base_is_rendered_as_rgb() {
    let world = small_world();
    let projection = WorldProjection::new(world).unwrap();
    let store = random_sparse_store(8, 10, 30, &world);

    let rgba: ImageBuffer<Rgba<u8>, Vec<u8>> =
        ImageBuffer::from_fn(48, 30, |x, y| Rgba([x as u8 * 5, y as u8 * 8, 40, 128]));
    let mut encoded = Vec::new();
    rgba.write_to(
        &mut std::io::Cursor::new(&mut encoded),
        image::ImageOutputFormat::Png,
    )
    .unwrap();

    let index = TileOrderIndex::build(&store, &projection);
    let (out, summary) =
        render_png(encoded.as_slice(), Vec::new(), index, &small_config(30)).unwrap();
    assert_eq!(summary.tiles.painted, store.size());

    let decoded = image::load_from_memory(&out).unwrap();
    assert_eq!(decoded.color(), image::ColorType::Rgb8);

    // An unpainted pixel keeps the RGB part of the base
    let rgb = decoded.to_rgb8();
    let painted: std::collections::HashSet<(u32, u32)> = store
        .iter()
        .filter_map(|(coord, _)| projection.to_image(coord))
        .flat_map(|p| {
            (0..3).flat_map(move |dy| (0..3).map(move |dx| ((p.x + dx) as u32, (p.y + dy) as u32)))
        })
        .collect();
    for (x, y, pixel) in rgb.enumerate_pixels() {
        if !painted.contains(&(x, y)) {
            assert_eq!(pixel.0, [x as u8 * 5, y as u8 * 8, 40]);
        }
    }
}

#[test]
fn test_indivisible_stripe_height_fails_before_output() {
    let world = small_world();
    let projection = WorldProjection::new(world).unwrap();
    let base = gradient_image(48, 30);
    let dir = tempfile::tempdir().unwrap();
    let input = dir.path().join("base.png");
    write_rgb_png(&input, 48, 30, base).unwrap();

    let index = TileOrderIndex::build(&random_sparse_store(1, 5, 5, &world), &projection);
    let source = BufReader::new(File::open(&input).unwrap());
    let result = render_png(source, Vec::new(), index, &small_config(7));
    assert!(matches!(result, Err(RenderError::Configuration(_))));
}

#[test]
fn test_truncated_base_is_decode_error() {
    let dir = tempfile::tempdir().unwrap();
    let input = dir.path().join("base.png");
    write_rgb_png(&input, 48, 30, gradient_image(48, 30)).unwrap();
    let mut bytes = std::fs::read(&input).unwrap();
    bytes.truncate(bytes.len() / 2);

    let projection = WorldProjection::new(small_world()).unwrap();
    let index = TileOrderIndex::build(&heat_store::HeatStore::new(), &projection);
    let result = render_png(bytes.as_slice(), Vec::new(), index, &small_config(6));
    assert!(matches!(
        result,
        Err(RenderError::Decode(_)) | Err(RenderError::Io(_))
    ));
}
