pub mod loaders;
pub mod multimodal;
pub mod paper;
pub mod question;

pub use loaders::{load_all_paper_specs, load_toml_to_paper_spec};
pub use multimodal::{ExtractedImage, TextImagePair};
pub use paper::{Paper, PaperSpec, SectionSpec, TopicSpec};
pub use question::{Difficulty, Question};
