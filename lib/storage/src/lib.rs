pub mod loader;

pub use loader::CorpusLoader;
