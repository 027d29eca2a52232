//! Request handling end to end over on-disk fixture resources.

mod fixtures;

use fixtures::fixture_dir;
use unidex::UnicodeService;
use unidex::server::protocol::{Request, Response};

#[test]
fn test_open_reads_no_chunks() {
    let dir = fixture_dir();
    let service = UnicodeService::open_dir(dir.path(), false).unwrap();

    let status = service.status();
    assert_eq!(status.chunks_loaded, 0);
    assert_eq!(status.chunk_reads, 0);
    assert!(status.resources.ends_with(&dir.path().display().to_string()));
}

#[test]
fn test_init_bootstrap() {
    let dir = fixture_dir();
    let service = UnicodeService::open_dir(dir.path(), false).unwrap();

    let init = service.init();
    assert_eq!(init.blocks.len(), 5);
    assert_eq!(init.emoji, vec![0x1F44D]);
    assert_eq!(init.sequences.len(), 3);
    assert!(init.palettes.is_empty());
    assert_eq!(service.blocks().listed().count(), 4);
}

#[test]
fn test_char_info_labels() {
    let dir = fixture_dir();
    let service = UnicodeService::open_dir(dir.path(), false).unwrap();

    let info = service.char_info(0xE9).unwrap();
    assert_eq!(info.block.as_deref(), Some("Latin-1 Supplement"));
    assert_eq!(info.age_label.as_deref(), Some("Unicode 1.1 (1993)"));
    assert_eq!(info.category_label.as_deref(), Some("Lowercase Letter"));
    assert_eq!(info.char.cross_references, vec![0x65]);

    let name = service.char_name(0x1F44D).unwrap();
    assert_eq!(name.name.as_deref(), Some("THUMBS UP SIGN"));
    assert!(name.is_emoji);

    // unassigned code points still answer, with no block
    let info = service.char_info(0x10FFFD).unwrap();
    assert_eq!(info.char.general_category, "Co");
    assert!(info.block.is_none());
}

#[test]
fn test_variant_families() {
    let dir = fixture_dir();
    let service = UnicodeService::open_dir(dir.path(), false).unwrap();

    let variants = service.variants(&[0x1F44D, 0x1F3FB]).unwrap();
    assert_eq!(variants.len(), 1);
    assert_eq!(variants[0].codes, vec![0x1F44D, 0x1F3FC]);

    // the bare base lists every toned member
    assert_eq!(service.variants(&[0x1F44D]).unwrap().len(), 2);

    assert!(service.variants(&[0x23, 0xFE0F, 0x20E3]).is_none());
    assert!(service.variants(&[0x41]).is_none());
}

#[test]
fn test_handle_requests() {
    let dir = fixture_dir();
    let service = UnicodeService::open_dir(dir.path(), true).unwrap();

    match service.handle(Request::GetRow { code: 0x41 }) {
        Response::Row { chars } => {
            assert_eq!(chars.len(), 16);
            assert_eq!(chars[1].code, 0x41);
        }
        other => panic!("unexpected response {:?}", other),
    }

    match service.handle(Request::GetChar { code: 0xD800 }) {
        Response::Error { message } => assert!(message.contains("surrogate")),
        other => panic!("unexpected response {:?}", other),
    }

    assert!(matches!(service.handle(Request::Ping), Response::Pong));
    assert!(matches!(
        service.handle(Request::InitSearch),
        Response::SearchReady { .. }
    ));

    let status = service.status();
    assert_eq!(status.chunks_loaded, 0x1100);
    assert_eq!(status.chunk_reads, 0x1100);

    // warm data is not read again
    match service.handle(Request::Search { query: "two".to_string() }) {
        Response::Search(search) => {
            assert_eq!(search.results.len(), 2);
            assert!(!search.cached);
        }
        other => panic!("unexpected response {:?}", other),
    }
    assert_eq!(service.status().chunk_reads, 0x1100);
}
