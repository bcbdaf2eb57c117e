//! Test doubles for deterministic exploration and race tests.

pub mod counting_crawler;
pub mod recording_observer;
pub mod scripted_crawler;

pub use counting_crawler::{CountingCrawler, CrawlerStats};
pub use recording_observer::RecordingObserver;
pub use scripted_crawler::ScriptedCrawler;
