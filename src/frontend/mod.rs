pub mod text_menu;
#[cfg(feature = "tui")]
pub mod tui;
