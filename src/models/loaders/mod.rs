pub mod toml_loader;

pub use toml_loader::{load_all_paper_specs, load_toml_to_paper_spec};
