pub mod config;
pub mod core;
pub mod domain;
pub mod frontend;
pub mod utils;

#[cfg(feature = "cli")]
pub use config::{cli::Frontend, CliConfig};

pub use config::{policy::LendingPolicy, toml_config::LibraryConfig};
pub use core::{catalog::Library, system::LibrarySystem};
pub use domain::model::{Book, BookFormat, Fine, NewBook, ReturnReceipt, SearchBy, User};
pub use domain::ports::{Clock, ManualClock, SystemClock};
pub use frontend::text_menu::TextMenu;
pub use utils::error::{LibraryError, Result};
