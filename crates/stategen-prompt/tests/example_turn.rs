use std::path::Path;

use base64::engine::general_purpose::STANDARD as BASE64;
use base64::Engine as _;
use image::{ImageFormat, Rgba, RgbaImage};
use stategen_core::{Content, ContentPart, Role};
use stategen_prompt::{conversation, example_message, Example, PromptError, ScaleBounds, SourceFile};

fn write_png(path: &Path, width: u32, height: u32) {
    let img = RgbaImage::from_fn(width, height, |x, y| {
        Rgba([(x % 256) as u8, (y % 256) as u8, 128, 255])
    });
    img.save_with_format(path, ImageFormat::Png).unwrap();
}

fn decode(part: &ContentPart) -> image::DynamicImage {
    let (mime, data) = part.image_data().expect("image part");
    assert_eq!(mime, "image/png");
    let bytes = BASE64.decode(data).unwrap();
    image::load_from_memory_with_format(&bytes, ImageFormat::Png).unwrap()
}

fn sources() -> Vec<SourceFile> {
    vec![
        SourceFile::new("A.cpp", "void A::run() {}"),
        SourceFile::new("B.cpp", "void B::stop() {}"),
    ]
}

#[test]
fn wide_image_is_scaled_to_800() {
    let dir = tempfile::tempdir().unwrap();
    let image = dir.path().join("diagram.png");
    write_png(&image, 1600, 900);

    let m = example_message(&sources(), &image, &ScaleBounds::width(800)).unwrap();
    assert_eq!(m.role, Role::User);

    let Content::Parts(parts) = &m.content else {
        panic!("expected multi-part content");
    };
    assert_eq!(parts.len(), 2);

    let text = parts[0].as_text().unwrap();
    assert!(text.starts_with("<Example>\n"));
    assert!(text.contains("<File A.cpp>:\n```\nvoid A::run() {}\n```\n</File A.cpp>\n"));
    assert!(text.contains("<File B.cpp>:"));
    assert!(text.ends_with("# Here is the state machine as an image\n"));

    let decoded = decode(&parts[1]);
    assert_eq!((decoded.width(), decoded.height()), (800, 450));
}

#[test]
fn small_image_keeps_size() {
    let dir = tempfile::tempdir().unwrap();
    let image = dir.path().join("small.png");
    write_png(&image, 320, 240);

    let m = example_message(&sources()[..1], &image, &ScaleBounds::default()).unwrap();
    let decoded = decode(&m.parts()[1]);
    assert_eq!((decoded.width(), decoded.height()), (320, 240));
}

#[test]
fn directory_is_not_an_image() {
    let dir = tempfile::tempdir().unwrap();
    let err = example_message(&sources(), dir.path(), &ScaleBounds::default()).unwrap_err();
    assert!(matches!(err, PromptError::InvalidArgument(_)));
}

#[test]
fn unreadable_image_is_an_image_error() {
    let dir = tempfile::tempdir().unwrap();
    let image = dir.path().join("broken.png");
    std::fs::write(&image, b"not a png").unwrap();
    let err = example_message(&sources(), &image, &ScaleBounds::default()).unwrap_err();
    assert!(matches!(err, PromptError::Image(_)));
}

#[test]
fn conversation_orders_turns() {
    let dir = tempfile::tempdir().unwrap();
    let image = dir.path().join("diagram.png");
    write_png(&image, 100, 50);

    let examples = vec![
        Example {
            files: sources(),
            image: image.clone(),
        },
        Example {
            files: sources(),
            image,
        },
    ];
    let target = vec![SourceFile::new("Door.cpp", "enum State { Open, Closed };")];
    let msgs = conversation(&target, &examples, &ScaleBounds::default()).unwrap();

    assert_eq!(msgs.len(), 4);
    assert_eq!(msgs[0].role, Role::System);
    assert_eq!(msgs[1].parts().len(), 2);
    assert_eq!(msgs[2].parts().len(), 2);
    assert!(msgs[3].content.text().contains("<File Door.cpp>:"));
}

#[test]
fn bad_example_aborts_conversation() {
    let examples = vec![Example {
        files: sources(),
        image: "missing.png".into(),
    }];
    let err = conversation(&sources(), &examples, &ScaleBounds::default()).unwrap_err();
    assert!(matches!(err, PromptError::InvalidArgument(_)));
}
