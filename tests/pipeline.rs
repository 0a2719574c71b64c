//! End-to-end searches against an in-memory catalog.

use dexcards::client::fakes::MemoryFetcher;
use dexcards::models::{RandomConfig, parse_identifiers, random_identifiers};
use dexcards::{CardBoard, Config, RenderItem, SearchRequest, SearchSession};
use rand::SeedableRng;
use rand::rngs::StdRng;
use serde_json::{Value, json};
use std::collections::HashSet;
use std::sync::Arc;

const BASE: &str = "https://pokeapi.co/api/v2/pokemon";

fn sub(kind: &str, n: usize) -> String {
    format!("https://pokeapi.co/api/v2/{kind}/{n}/")
}

fn names(es: &str, en: &str) -> Value {
    json!({
        "names": [
            { "language": { "name": "ja" }, "name": "?" },
            { "language": { "name": "es" }, "name": es },
            { "language": { "name": "en" }, "name": en }
        ]
    })
}

fn creature(id: u32, name: &str, moves: &[usize]) -> Value {
    let moves: Vec<_> = moves
        .iter()
        .map(|n| json!({ "move": { "name": format!("move-{n}"), "url": sub("move", *n) } }))
        .collect();

    json!({
        "id": id,
        "name": name,
        "height": 10,
        "weight": 130,
        "sprites": { "front_default": format!("https://img/{id}.png"), "front_shiny": null },
        "types": [{ "slot": 1, "type": { "name": "fire", "url": sub("type", 10) } }],
        "abilities": [{ "ability": { "name": "blaze", "url": sub("ability", 66) } }],
        "moves": moves
    })
}

fn catalog(move_count: usize) -> MemoryFetcher {
    let fetcher = MemoryFetcher::new().with_yields(1);
    let all_moves: Vec<usize> = (0..move_count).collect();
    fetcher
        .insert(format!("{BASE}/1"), creature(1, "bulbasaur", &all_moves[..move_count.min(3)]))
        .insert(format!("{BASE}/4"), creature(4, "charmander", &all_moves))
        .insert(sub("type", 10), names("Fuego", "Fire"))
        .insert(sub("ability", 66), names("Mar Llamas", "Blaze"));
    for n in all_moves {
        fetcher.insert(sub("move", n), names(&format!("Mov-{n}"), &format!("Move-{n}")));
    }
    fetcher
}

fn session(fetcher: &Arc<MemoryFetcher>) -> SearchSession {
    SearchSession::from_config(fetcher.clone(), &Config::default()).unwrap()
}

#[tokio::test]
async fn test_mixed_batch_keeps_order() {
    let fetcher = Arc::new(catalog(3));
    let mut board = CardBoard::default();

    let report = session(&fetcher)
        .search(&SearchRequest::explicit("1, 99999, 4"), &mut board)
        .await
        .unwrap()
        .unwrap();

    assert_eq!(report.resolved, 2);
    assert_eq!(report.tombstoned, 1);

    let items = board.items();
    assert_eq!(items.len(), 3);
    assert_eq!(items[0].as_resolved().unwrap().name, "bulbasaur");
    match &items[1] {
        RenderItem::Tombstone(t) => assert_eq!(t.reason, "Pokemon with ID 99999 not found"),
        other => panic!("expected tombstone, got {other:?}"),
    }

    let charmander = items[2].as_resolved().unwrap();
    assert_eq!(charmander.types, vec!["Fuego"]);
    assert_eq!(charmander.abilities, vec!["Mar Llamas"]);
    assert_eq!(charmander.moves, vec!["Mov-0", "Mov-1", "Mov-2"]);
    assert_eq!(board.loading_history(), &[true, false]);
}

#[tokio::test]
async fn test_failed_move_keeps_record() {
    let fetcher = catalog(4);
    fetcher.fail(sub("move", 1), 500).garbage(sub("move", 3));
    let fetcher = Arc::new(fetcher);
    let mut board = CardBoard::default();

    session(&fetcher)
        .search(&SearchRequest::explicit("4"), &mut board)
        .await
        .unwrap();

    let record = board.items()[0].as_resolved().unwrap();
    assert_eq!(
        record.moves,
        vec!["Mov-0", "Nombre no encontrado", "Mov-2", "Nombre no encontrado"]
    );
}

#[tokio::test]
async fn test_long_move_list_is_batched() {
    let fetcher = Arc::new(catalog(101));
    let mut board = CardBoard::default();

    session(&fetcher)
        .search(&SearchRequest::explicit("4"), &mut board)
        .await
        .unwrap();

    let record = board.items()[0].as_resolved().unwrap();
    assert_eq!(record.moves.len(), 101);
    assert_eq!(record.moves[0], "Mov-0");
    assert_eq!(record.moves[100], "Mov-100");

    // one type and one ability may overlap the first group of ten moves
    assert!(fetcher.max_in_flight() <= 12);
}

#[tokio::test]
async fn test_append_and_replace() {
    let fetcher = Arc::new(catalog(0));
    let session = session(&fetcher);
    let mut board = CardBoard::default();

    session
        .search(&SearchRequest::explicit("1"), &mut board)
        .await
        .unwrap();
    session
        .search(&SearchRequest::explicit("4, 7").appending(), &mut board)
        .await
        .unwrap();
    assert_eq!(board.items().len(), 3);
    assert!(board.items()[2].as_tombstone().is_some());

    session
        .search(&SearchRequest::explicit("4"), &mut board)
        .await
        .unwrap();
    assert_eq!(board.items().len(), 1);
    assert_eq!(board.items()[0].as_resolved().unwrap().id, 4);
}

#[test]
fn test_parse_identifiers_drops_blanks() {
    let ids = parse_identifiers("1, , 4,");
    let ids: Vec<&str> = ids.iter().map(|id| id.as_str()).collect();
    assert_eq!(ids, vec!["1", "4"]);
    assert!(parse_identifiers(" , ").is_empty());
}

#[test]
fn test_random_draw_distinct_and_in_range() {
    let random = RandomConfig::default();
    let mut rng = StdRng::seed_from_u64(7);

    for _ in 0..50 {
        let ids = random_identifiers(&mut rng, random.min_id, random.max_id, random.count).unwrap();
        assert_eq!(ids.len(), 4);

        let unique: HashSet<_> = ids.iter().collect();
        assert_eq!(unique.len(), 4);
        for id in &ids {
            let n: u32 = id.as_str().parse().unwrap();
            assert!((1..=1302).contains(&n));
        }
    }
}
