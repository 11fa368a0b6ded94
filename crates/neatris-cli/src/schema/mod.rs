pub mod play_summary;
