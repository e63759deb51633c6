pub mod openai;

pub use openai::OpenAICompletionModel;
