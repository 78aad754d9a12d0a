pub mod translator;

pub use translator::GeminiTranslator;
