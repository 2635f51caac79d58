pub mod a001_watch_remnant;
