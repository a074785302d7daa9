pub mod entries;
pub mod opener;
pub mod reader;
pub mod watcher;
