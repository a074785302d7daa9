pub mod entries;
pub mod menubar;
pub mod status_bar;
