//! Exploration runs against simulated mazes.

use labyrinth_core::testing::{CountingCrawler, RecordingObserver};
use labyrinth_core::{
    BfsExplorer, CancelSignal, CancelSource, Explorer, Maze, SharedInventory, SimulatedCrawler,
};
use labyrinth_proto::{
    Crawler, CrawlerSnapshot, Direction, Inventory, ParticipantId, Position, RaceEvent, Tile,
    TileKind,
};
use std::sync::Arc;

const ENCLOSED: [&str; 5] = ["#####", "#   #", "# x #", "#   #", "#####"];

const WINDING: [&str; 5] = ["#####", "#x  #", "### #", "#   #", "# ###"];

fn maze(rows: &[&str]) -> Arc<Maze> {
    Arc::new(Maze::from_rows(rows).unwrap())
}

/// Checks that every turn and move follows from the previous state.
fn assert_causal(events: &[RaceEvent], start: CrawlerSnapshot) {
    let mut last = start;
    for event in events {
        match event {
            RaceEvent::DirectionChanged(update) => {
                assert_eq!(update.crawler.position, last.position);
                assert!(
                    update.crawler.direction == last.direction.turn_left()
                        || update.crawler.direction == last.direction.turn_right(),
                    "{:?} does not follow {:?}",
                    update.crawler.direction,
                    last.direction
                );
                last = update.crawler;
            }
            RaceEvent::PositionChanged(update) => {
                assert_eq!(update.crawler.direction, last.direction);
                assert_eq!(update.crawler.position, last.position.moved(last.direction));
                last = update.crawler;
            }
            other => panic!("unexpected event {other:?}"),
        }
    }
}

#[tokio::test]
async fn test_exit_in_sight_costs_nothing() {
    let recorder = RecordingObserver::new();
    let mut explorer = BfsExplorer::new(SimulatedCrawler::new(maze(&["x"])), 9)
        .observed_by(ParticipantId::new(1), recorder.sink());

    let left = explorer
        .explore(123, &SharedInventory::new(), &CancelSignal::never())
        .await
        .unwrap();

    assert_eq!(left, 123);
    assert!(recorder.events().is_empty());
}

#[tokio::test]
async fn test_already_cancelled_costs_nothing() {
    let source = CancelSource::new();
    source.cancel();
    let recorder = RecordingObserver::new();
    let counting = CountingCrawler::new(SimulatedCrawler::new(maze(&ENCLOSED)));
    let stats = counting.stats();
    let mut explorer =
        BfsExplorer::new(counting, 9).observed_by(ParticipantId::new(1), recorder.sink());

    let left = explorer
        .explore(77, &SharedInventory::new(), &source.signal())
        .await
        .unwrap();

    assert_eq!(left, 77);
    assert!(recorder.events().is_empty());
    assert_eq!(stats.observations(), 0);
}

#[tokio::test]
async fn test_enclosed_room_is_mapped_and_given_up() {
    let mut explorer = BfsExplorer::new(SimulatedCrawler::new(maze(&ENCLOSED)), 11);

    let left = tokio::time::timeout(
        std::time::Duration::from_secs(5),
        explorer.explore(3000, &SharedInventory::new(), &CancelSignal::never()),
    )
    .await
    .expect("exploration should terminate")
    .unwrap();

    assert!(left > 0 && left < 3000);
    assert_ne!(
        explorer.crawler().facing_tile().await.unwrap(),
        TileKind::Outside
    );

    // Maze (x, y) is local (x + 3, y + 3): the start (2, 2) sits on the centre (5, 5).
    let map = explorer.map();
    for y in 4..=6 {
        for x in 4..=6 {
            assert_eq!(map.tile(Position::new(x, y)), Some(Tile::Room), "({x}, {y})");
        }
    }
    for i in 4..=6 {
        for wall in [
            Position::new(i, 3),
            Position::new(i, 7),
            Position::new(3, i),
            Position::new(7, i),
        ] {
            assert_eq!(map.tile(wall), Some(Tile::Wall), "{wall}");
        }
    }
}

#[tokio::test]
async fn test_every_step_is_accounted_for() {
    let recorder = RecordingObserver::new();
    let counting = CountingCrawler::new(SimulatedCrawler::new(maze(&ENCLOSED)));
    let stats = counting.stats();
    let start = counting.snapshot();
    let mut explorer =
        BfsExplorer::new(counting, 11).observed_by(ParticipantId::new(4), recorder.sink());

    let left = explorer
        .explore(3000, &SharedInventory::new(), &CancelSignal::never())
        .await
        .unwrap();

    assert_eq!(3000 - left, stats.turns() + stats.walks());
    assert_eq!(recorder.count("crawler.direction"), stats.turns() as usize);
    assert_eq!(recorder.count("crawler.position"), stats.moves() as usize);
    assert!(stats.moves() > 0);
    assert!(stats.moves() < stats.walks());
    assert_causal(&recorder.events(), start);
}

#[tokio::test]
async fn test_budget_runs_out() {
    let counting = CountingCrawler::new(SimulatedCrawler::new(Arc::new(
        Maze::training_default().unwrap(),
    )));
    let stats = counting.stats();
    let mut explorer = BfsExplorer::with_default_map(counting);

    let left = explorer
        .explore(5, &SharedInventory::new(), &CancelSignal::never())
        .await
        .unwrap();

    assert_eq!(left, 0);
    assert_eq!(stats.turns() + stats.walks(), 5);
}

#[tokio::test]
async fn test_finds_exit_through_winding_corridor() {
    let recorder = RecordingObserver::new();
    let crawler = SimulatedCrawler::new(maze(&WINDING));
    let start = crawler.snapshot();
    let mut explorer =
        BfsExplorer::new(crawler, 15).observed_by(ParticipantId::new(1), recorder.sink());

    let left = explorer
        .explore(500, &SharedInventory::new(), &CancelSignal::never())
        .await
        .unwrap();

    assert!(left > 0);
    assert_eq!(explorer.crawler().position(), Position::new(1, 4));
    assert_eq!(explorer.crawler().direction(), Direction::South);
    assert_eq!(
        explorer.crawler().facing_tile().await.unwrap(),
        TileKind::Outside
    );
    assert_causal(&recorder.events(), start);
}

#[tokio::test]
async fn test_key_opens_door_to_exit() {
    let maze = maze(&["###/#", "#xk #", "#####"]);
    let crawler = SimulatedCrawler::new(Arc::clone(&maze)).with_direction(Direction::East);
    let mut explorer = BfsExplorer::new(crawler, 11);
    let bag = SharedInventory::new();

    explorer
        .explore(500, &bag, &CancelSignal::never())
        .await
        .unwrap();

    assert_eq!(explorer.crawler().position(), Position::new(3, 0));
    assert_eq!(
        explorer.crawler().facing_tile().await.unwrap(),
        TileKind::Outside
    );
    assert!(maze.is_door_open(Position::new(3, 0)).await);
    assert!(bag.item_types().await.is_empty());
    // Maze (3, 0) is local (7, 4).
    assert_eq!(
        explorer.map().tile(Position::new(7, 4)),
        Some(Tile::Door { open: true })
    );
}

#[tokio::test]
async fn test_locked_door_without_key_is_not_retried() {
    let maze = maze(&["#/#", "#x#", "###"]);
    let counting = CountingCrawler::new(
        SimulatedCrawler::new(Arc::clone(&maze)).with_direction(Direction::South),
    );
    let stats = counting.stats();
    let mut explorer = BfsExplorer::new(counting, 9);

    let left = explorer
        .explore(100, &SharedInventory::new(), &CancelSignal::never())
        .await
        .unwrap();

    assert!(left > 0);
    assert!(!maze.is_door_open(Position::new(1, 0)).await);
    assert_eq!(
        explorer.map().tile(Position::new(4, 3)),
        Some(Tile::Door { open: false })
    );
    // One blocked attempt per side at most.
    assert!(stats.walks() <= 3);
}
